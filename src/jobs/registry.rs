//! Job registry: the id → [`Job`] map polled by callers.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::StoryError;
use crate::story::types::Job;

/// Storage for job state. Each job is written only by the task running it.
pub trait JobStore: Send + Sync {
    /// Register a new job. Fails if the id is already taken.
    fn insert(&self, job: Job) -> Result<(), StoryError>;

    /// Snapshot of the job with `id`, if any.
    fn get(&self, id: &str) -> Result<Option<Job>, StoryError>;

    /// Apply `change` to the stored job and return the updated snapshot.
    ///
    /// If `change` fails the stored job is left as it was.
    fn update(
        &self,
        id: &str,
        change: &mut dyn FnMut(&mut Job) -> Result<(), StoryError>,
    ) -> Result<Job, StoryError>;
}

/// Process-lifetime registry. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemoryJobStore {
    jobs: RwLock<HashMap<String, Job>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.jobs.read().map(|jobs| jobs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned(e: impl std::fmt::Display) -> StoryError {
    StoryError::Task(format!("job registry lock poisoned: {e}"))
}

impl JobStore for InMemoryJobStore {
    fn insert(&self, job: Job) -> Result<(), StoryError> {
        let mut jobs = self.jobs.write().map_err(poisoned)?;
        if jobs.contains_key(&job.id) {
            return Err(StoryError::JobExists(job.id));
        }
        jobs.insert(job.id.clone(), job);
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<Job>, StoryError> {
        let jobs = self.jobs.read().map_err(poisoned)?;
        Ok(jobs.get(id).cloned())
    }

    fn update(
        &self,
        id: &str,
        change: &mut dyn FnMut(&mut Job) -> Result<(), StoryError>,
    ) -> Result<Job, StoryError> {
        let mut jobs = self.jobs.write().map_err(poisoned)?;
        let job = jobs
            .get_mut(id)
            .ok_or_else(|| StoryError::JobNotFound(id.to_string()))?;
        let mut draft = job.clone();
        change(&mut draft)?;
        *job = draft.clone();
        Ok(draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::types::JobStatus;

    #[test]
    fn insert_then_get() {
        let store = InMemoryJobStore::new();
        store.insert(Job::new("a")).unwrap();
        let job = store.get("a").unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Starting);
        assert!(store.get("b").unwrap().is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let store = InMemoryJobStore::new();
        store.insert(Job::new("a")).unwrap();
        assert!(matches!(
            store.insert(Job::new("a")),
            Err(StoryError::JobExists(id)) if id == "a"
        ));
    }

    #[test]
    fn failed_update_keeps_previous_state() {
        let store = InMemoryJobStore::new();
        store.insert(Job::new("a")).unwrap();
        let err = store
            .update("a", &mut |job| {
                job.message = "changed".into();
                job.advance(JobStatus::Complete, "done")
            })
            .unwrap_err();
        assert!(matches!(err, StoryError::InvalidTransition { .. }));
        let job = store.get("a").unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Starting);
        assert_eq!(job.message, "Queued");
    }

    #[test]
    fn update_unknown_job() {
        let store = InMemoryJobStore::new();
        let err = store.update("ghost", &mut |_| Ok(())).unwrap_err();
        assert!(matches!(err, StoryError::JobNotFound(id) if id == "ghost"));
    }
}
