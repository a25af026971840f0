//! Persistence boundary for occurrences, the action log and the school roster.
//!
//! [`OccurrenceStore::apply_transition`] is the only write path for status
//! changes: it appends the action and moves the status as one unit, and refuses
//! the write when the status no longer matches the one the caller decided on.

#[cfg(test)]
mod memory;
mod sqlite;

#[cfg(test)]
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use uuid::Uuid;

use crate::error::Result;
use crate::lifecycle::{
    Action, Occurrence, OccurrenceFilter, Profile, RosterEntity, StatusChange, Student,
};

/// Read-only view of staff profiles.
pub trait ProfileDirectory {
    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>>;

    /// Active vice-directors, by name.
    async fn list_vice_directors(&self) -> Result<Vec<Profile>>;
}

pub trait OccurrenceStore: ProfileDirectory {
    async fn get_student(&self, id: Uuid) -> Result<Option<Student>>;

    async fn get_occurrence(&self, id: Uuid) -> Result<Option<Occurrence>>;

    async fn insert_occurrence(&self, occurrence: &Occurrence) -> Result<()>;

    /// Appends `change.action` and moves the occurrence to `change.to`.
    ///
    /// Fails with `InvalidTransition` (nothing written) when the stored status
    /// is no longer `change.from`, and with `NotFound` if the row is gone.
    async fn apply_transition(&self, change: &StatusChange) -> Result<Occurrence>;

    /// Actions for one occurrence in creation order.
    async fn list_actions(&self, occurrence_id: Uuid) -> Result<Vec<Action>>;

    /// Newest first.
    async fn list_occurrences(&self, filter: &OccurrenceFilter) -> Result<Vec<Occurrence>>;

    /// Removes the occurrence and its actions. Returns false when nothing matched.
    async fn delete_occurrence(&self, id: Uuid) -> Result<bool>;

    /// Sets or clears the student's tutor. Occurrences already filed keep the
    /// tutor they were created with. Returns false for an unknown student.
    async fn set_student_tutor(&self, student_id: Uuid, tutor_id: Option<Uuid>) -> Result<bool>;

    /// Soft (de)activation of a roster row. Returns false when nothing matched.
    async fn set_active(&self, entity: RosterEntity, id: Uuid, active: bool) -> Result<bool>;
}
