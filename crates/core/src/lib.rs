pub mod allocator;
pub mod conflict;
pub mod error;
pub mod lifecycle;
pub mod lookup;
pub mod planner;
pub mod ports;
pub mod service;
pub mod views;

#[cfg(test)]
pub(crate) mod testing;

pub use allocator::{AllocationError, AllocationInput, Allocator, GreedyAllocator};
pub use conflict::{Conflict, ConflictValidator};
pub use error::{IntegrityError, LifecycleError, ScheduleError, ValidationError};
pub use lifecycle::ScheduleLifecycle;
pub use lookup::{Lookup, Placement};
pub use planner::{DayPattern, Strategy, StrategyPlanner};
pub use ports::{
    AssignmentCatalog, AuditError, AuditSink, CatalogError, RepositoryError, RoomCatalog,
    RoomFilter, ScheduleRepository, SlotTransaction,
};
pub use service::{EngineSettings, ScheduleService, DEFAULT_BUDGET, MAX_BUDGET};

pub use types::{
    Room, ScheduledSlot, SlotCandidate, SlotState, TeachingAssignment, TermId, TimeGrid,
};
