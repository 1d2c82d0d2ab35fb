//! The repository: the authoritative, ordered collection of workouts.
//!
//! Order is insertion order and nothing else; sorting happens on a
//! projection (see `order`). Every mutation is written through to the blob
//! store under [`WORKOUTS_KEY`] before the call returns.

mod blob;

use crate::model::{ValidationError, Workout, WorkoutId};
use crate::storage::{BlobStore, Result, StorageError};

/// Key of the blob holding the whole collection.
pub const WORKOUTS_KEY: &str = "workouts";

/// Why an edit did not go through.
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    #[error("workout not found: {0}")]
    NotFound(WorkoutId),

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Ordered workouts, bound to the store they persist to.
pub struct Repository<S> {
    store: S,
    workouts: Vec<Workout>,
}

impl<S: BlobStore> Repository<S> {
    /// Loads the collection from the store.
    ///
    /// A missing or unreadable blob is treated as no prior data.
    pub fn load(store: S) -> Result<Self> {
        let workouts = match store.get(WORKOUTS_KEY)? {
            Some(text) => blob::deserialize(&text),
            None => Vec::new(),
        };
        tracing::debug!(count = workouts.len(), "loaded workouts");
        Ok(Self { store, workouts })
    }

    /// Appends a workout and persists.
    pub fn add(&mut self, workout: Workout) -> Result<()> {
        tracing::info!(id = %workout.id(), activity = %workout.activity(), "adding workout");
        self.workouts.push(workout);
        self.persist()
    }

    pub fn find_by_id(&self, id: &WorkoutId) -> Option<&Workout> {
        self.workouts.iter().find(|w| w.id() == id)
    }

    /// Replaces a workout's metrics and persists.
    ///
    /// Nothing changes, in memory or on disk, unless the input is valid.
    pub fn edit(
        &mut self,
        id: &WorkoutId,
        distance_km: f64,
        duration_min: f64,
        value: f64,
    ) -> core::result::Result<&Workout, EditError> {
        let index = self
            .position(id)
            .ok_or_else(|| EditError::NotFound(id.clone()))?;
        self.workouts[index].apply_edit(distance_km, duration_min, value)?;
        tracing::info!(%id, "edited workout");
        self.persist()?;
        Ok(&self.workouts[index])
    }

    /// Counts a selection of the workout and persists.
    /// Returns `None` if there is no such workout.
    pub fn touch(&mut self, id: &WorkoutId) -> Result<Option<&Workout>> {
        let Some(index) = self.position(id) else {
            return Ok(None);
        };
        self.workouts[index].record_interaction();
        self.persist()?;
        Ok(Some(&self.workouts[index]))
    }

    /// Removes a workout and persists, handing the removed record back.
    /// Returns `None` if there is no such workout.
    pub fn remove_by_id(&mut self, id: &WorkoutId) -> Result<Option<Workout>> {
        let Some(index) = self.position(id) else {
            return Ok(None);
        };
        let removed = self.workouts.remove(index);
        tracing::info!(%id, "removed workout");
        self.persist()?;
        Ok(Some(removed))
    }

    /// Empties the collection and removes the persisted blob.
    pub fn clear(&mut self) -> Result<()> {
        tracing::info!(count = self.workouts.len(), "clearing all workouts");
        self.workouts.clear();
        self.store.remove(WORKOUTS_KEY)
    }

    /// The blob this collection persists as.
    pub fn serialize(&self) -> Result<String> {
        Ok(blob::serialize(&self.workouts)?)
    }

    /// All workouts, in insertion order.
    pub fn workouts(&self) -> &[Workout] {
        &self.workouts
    }

    pub fn len(&self) -> usize {
        self.workouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workouts.is_empty()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn position(&self, id: &WorkoutId) -> Option<usize> {
        self.workouts.iter().position(|w| w.id() == id)
    }

    fn persist(&self) -> Result<()> {
        let blob = self.serialize()?;
        self.store.set(WORKOUTS_KEY, &blob)?;
        tracing::debug!(count = self.workouts.len(), "persisted workouts");
        Ok(())
    }
}
