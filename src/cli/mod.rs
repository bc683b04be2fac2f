pub mod doctor;
pub mod generate;
pub mod stories;

pub use doctor::doctor;
pub use generate::generate;
pub use stories::stories;
