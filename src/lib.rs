//! Keepsake: "memory story" generation for a personal photo library.
//!
//! A story job picks a few random photos, captions them with a local vision
//! model, lays them out as a collage over a generated background, adds a
//! soundtrack and writes the result as a JSON artifact.
//!
//! | Stage | Failure policy |
//! |-------|----------------|
//! | Selection and captioning | Fatal when nothing usable remains |
//! | Collage | Soft: the story is written without it |
//! | Music | Soft: no soundtrack |
//! | Assembly and persistence | Fatal |
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from TOML files and environment variables
//! - [`error`]: Pipeline and service error types
//! - [`services`]: Caption and background capability traits and their HTTP clients
//! - [`story`]: Story model, selection, music, assembly and persistence
//! - [`collage`]: Colour extraction, prompts, frames, layout and composition
//! - [`jobs`]: Job registry and the orchestrator that runs the pipeline
//! - [`api`]: axum routes for the job control surface
//! - [`server`]: HTTP server bootstrap

pub mod api;
pub mod collage;
pub mod config;
pub mod error;
pub mod jobs;
pub mod server;
pub mod services;
pub mod story;
