use serde::Serialize;
use thiserror::Error;
use types::{
    AssignmentId, BlockId, CareerId, GroupId, IncompleteSlot, RoomId, SlotId, SlotState,
    TeacherId, TermId, UnscheduledAssignment,
};

use crate::allocator::AllocationError;
use crate::conflict::Conflict;
use crate::ports::{CatalogError, RepositoryError};

/// Malformed requests, rejected before any work starts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("unknown term {0}")]
    UnknownTerm(TermId),
    #[error("unknown career {0}")]
    UnknownCareer(CareerId),
    #[error("unknown teaching assignment {0}")]
    UnknownAssignment(AssignmentId),
    #[error("teaching assignment {0} is inactive")]
    InactiveAssignment(AssignmentId),
    #[error("unknown room {0}")]
    UnknownRoom(RoomId),
    #[error("unknown time block {0}")]
    UnknownBlock(BlockId),
    #[error("unknown group {0}")]
    UnknownGroup(GroupId),
    #[error("teacher {0} has no teaching assignments in this term")]
    UnknownTeacher(TeacherId),
    #[error("unknown slot {0}")]
    UnknownSlot(SlotId),
    #[error("assignment {assignment} belongs to term {found}, not {expected}")]
    TermMismatch {
        assignment: AssignmentId,
        expected: TermId,
        found: TermId,
    },
    #[error("term {0} has no active teaching assignments to schedule")]
    NoAssignments(TermId),
}

/// Every reason a publish was refused, collected in one pass.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[error(
    "publish blocked: {} incomplete approved slots, {} assignments without slots",
    .incomplete.len(),
    .unscheduled.len()
)]
pub struct IntegrityError {
    pub incomplete: Vec<IncompleteSlot>,
    pub unscheduled: Vec<UnscheduledAssignment>,
}

impl IntegrityError {
    pub fn is_empty(&self) -> bool {
        self.incomplete.is_empty() && self.unscheduled.is_empty()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("there is no active term")]
    NoActiveTerm,
    #[error("term {0} is not the active term")]
    TermNotActive(TermId),
    #[error("term {0} has no approved slots to publish")]
    NothingToPublish(TermId),
    #[error("slot {0} is published; unpublish it with a reason instead")]
    SlotPublished(SlotId),
    #[error("slot {0} is not published")]
    NotPublished(SlotId),
    #[error("slot {0} is already cancelled")]
    AlreadyCancelled(SlotId),
    #[error("slot {0} is already active")]
    AlreadyActive(SlotId),
    #[error("slot {slot} cannot be edited while {state}")]
    Immutable { slot: SlotId, state: SlotState },
}

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Conflict(#[from] Conflict),
    #[error(transparent)]
    Integrity(#[from] IntegrityError),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("generation exceeded its time budget after {processed} of {total} assignments; nothing was saved")]
    BudgetExceeded { processed: usize, total: usize },
}

impl From<AllocationError> for ScheduleError {
    fn from(value: AllocationError) -> Self {
        match value {
            AllocationError::Repository(err) => Self::Repository(err),
            AllocationError::BudgetExceeded { processed, total } => {
                Self::BudgetExceeded { processed, total }
            }
        }
    }
}
