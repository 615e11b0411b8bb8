//! Contracts with the collaborators the engine does not own: slot storage,
//! the facility and academic catalogs, and the audit trail.

use thiserror::Error;
use types::{
    ActorId, AssignmentId, CareerId, Group, NewSlot, Room, ScheduledSlot, SlotId, SlotState,
    TeachingAssignment, Term, TermId,
};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("another schedule operation already holds term {0}")]
    TermBusy(TermId),
    #[error("slot {0} not found")]
    SlotNotFound(SlotId),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit sink unavailable: {0}")]
    Unavailable(String),
}

/// Durable storage of placed slots.
pub trait ScheduleRepository: Send + Sync {
    /// Opens an exclusive transaction over one term's slots. A second
    /// transaction for the same term fails with [`RepositoryError::TermBusy`]
    /// while the first is open.
    fn begin(&self, term: &TermId) -> Result<Box<dyn SlotTransaction + '_>, RepositoryError>;

    fn find_slot(&self, id: &SlotId) -> Result<Option<ScheduledSlot>, RepositoryError>;

    /// Committed slots of a term, including inactive and cancelled ones.
    fn list_slots(&self, term: &TermId) -> Result<Vec<ScheduledSlot>, RepositoryError>;
}

/// Writes made through a transaction become visible to other readers on
/// [`SlotTransaction::commit`]. Dropping it without committing rolls back.
pub trait SlotTransaction {
    fn term(&self) -> &TermId;

    fn list_slots(&self) -> Result<Vec<ScheduledSlot>, RepositoryError>;

    fn list_active_slots(&self) -> Result<Vec<ScheduledSlot>, RepositoryError> {
        Ok(self
            .list_slots()?
            .into_iter()
            .filter(ScheduledSlot::occupies)
            .collect())
    }

    fn get(&self, id: &SlotId) -> Result<ScheduledSlot, RepositoryError> {
        self.list_slots()?
            .into_iter()
            .find(|s| &s.id == id)
            .ok_or_else(|| RepositoryError::SlotNotFound(id.clone()))
    }

    fn insert(&mut self, slot: NewSlot) -> Result<ScheduledSlot, RepositoryError>;

    fn update_state(&mut self, id: &SlotId, state: SlotState) -> Result<(), RepositoryError>;

    /// Replaces the stored slot with the same id.
    fn save(&mut self, slot: &ScheduledSlot) -> Result<(), RepositoryError>;

    fn commit(self: Box<Self>) -> Result<(), RepositoryError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoomFilter {
    pub active_only: bool,
    pub exclude_maintenance: bool,
}

impl RoomFilter {
    /// Rooms the allocator may pick from.
    pub const fn eligible() -> Self {
        Self {
            active_only: true,
            exclude_maintenance: true,
        }
    }

    pub const fn all() -> Self {
        Self {
            active_only: false,
            exclude_maintenance: false,
        }
    }

    pub fn accepts(&self, room: &Room) -> bool {
        (!self.active_only || room.active) && (!self.exclude_maintenance || !room.maintenance)
    }
}

pub trait RoomCatalog: Send + Sync {
    fn list_rooms(&self, filter: RoomFilter) -> Result<Vec<Room>, CatalogError>;
}

pub trait AssignmentCatalog: Send + Sync {
    fn find_term(&self, id: &TermId) -> Result<Option<Term>, CatalogError>;

    fn active_term(&self) -> Result<Option<Term>, CatalogError>;

    fn career_exists(&self, id: &CareerId) -> Result<bool, CatalogError>;

    fn find_assignment(&self, id: &AssignmentId) -> Result<Option<TeachingAssignment>, CatalogError>;

    /// Every assignment of the term, active or not.
    fn list_assignments(&self, term: &TermId) -> Result<Vec<TeachingAssignment>, CatalogError>;

    fn list_active_assignments(
        &self,
        term: &TermId,
        career: Option<&CareerId>,
    ) -> Result<Vec<TeachingAssignment>, CatalogError> {
        Ok(self
            .list_assignments(term)?
            .into_iter()
            .filter(|a| a.active)
            .filter(|a| career.map_or(true, |c| a.career.as_ref() == Some(c)))
            .collect())
    }

    fn list_groups(&self) -> Result<Vec<Group>, CatalogError>;
}

/// Fire-and-forget action log.
pub trait AuditSink: Send + Sync {
    fn record(
        &self,
        action: &str,
        description: &str,
        actor: Option<&ActorId>,
    ) -> Result<(), AuditError>;
}
