use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};
use types::{
    ActorId, ApprovalReport, CareerId, GenerationReport, GridFilter, PublishReport, ScheduledSlot,
    SlotCandidate, SlotId, SlotPatch, TeacherId, TeacherWorkload, Term, TermId, TimeGrid,
    WeeklyGrid,
};

use crate::allocator::{AllocationInput, Allocator, GreedyAllocator};
use crate::error::{LifecycleError, ScheduleError, ValidationError};
use crate::lifecycle::ScheduleLifecycle;
use crate::lookup::Lookup;
use crate::planner::{StrategyPlanner, DEFAULT_STRATEGY_LIMIT};
use crate::ports::{AssignmentCatalog, AuditSink, RoomCatalog, RoomFilter, ScheduleRepository};
use crate::views;

pub const DEFAULT_BUDGET: Duration = Duration::from_secs(120);
/// Longer budgets are cut to this.
pub const MAX_BUDGET: Duration = Duration::from_secs(86_400);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineSettings {
    /// `None` keeps every ranked strategy.
    pub strategy_limit: Option<usize>,
    pub budget: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            strategy_limit: Some(DEFAULT_STRATEGY_LIMIT),
            budget: DEFAULT_BUDGET,
        }
    }
}

/// Entry point for every schedule operation. Each mutating call runs inside
/// one repository transaction for the affected term.
pub struct ScheduleService<R, C, A> {
    repository: Arc<R>,
    catalog: Arc<C>,
    audit: Arc<A>,
    grid: TimeGrid,
    settings: EngineSettings,
    allocator: Arc<dyn Allocator>,
    lifecycle: ScheduleLifecycle,
}

impl<R, C, A> ScheduleService<R, C, A>
where
    R: ScheduleRepository + 'static,
    C: RoomCatalog + AssignmentCatalog + 'static,
    A: AuditSink + 'static,
{
    pub fn new(
        repository: Arc<R>,
        catalog: Arc<C>,
        audit: Arc<A>,
        grid: TimeGrid,
        settings: EngineSettings,
    ) -> Self {
        let allocator = Arc::new(GreedyAllocator::new(StrategyPlanner::new(
            settings.strategy_limit,
        )));
        Self {
            repository,
            catalog,
            audit,
            grid,
            settings,
            allocator,
            lifecycle: ScheduleLifecycle::default(),
        }
    }

    pub fn with_allocator(mut self, allocator: Arc<dyn Allocator>) -> Self {
        self.allocator = allocator;
        self
    }

    /// Places every active assignment of the term, largest first. Any fatal
    /// error discards all placements of the run.
    pub fn generate(
        &self,
        term: &TermId,
        career: Option<&CareerId>,
        actor: Option<&ActorId>,
    ) -> Result<GenerationReport, ScheduleError> {
        let term = self.term(term)?;
        if let Some(career) = career {
            if !self.catalog.career_exists(career)? {
                return Err(ValidationError::UnknownCareer(career.clone()).into());
            }
        }
        let mut assignments = self.catalog.list_active_assignments(&term.id, career)?;
        if assignments.is_empty() {
            return Err(ValidationError::NoAssignments(term.id).into());
        }
        assignments.sort_by(|a, b| b.required_hours.cmp(&a.required_hours));

        let rooms = self.catalog.list_rooms(RoomFilter::eligible())?;
        let lookup = Lookup::load(self.catalog.as_ref(), &self.grid, &term.id)?;
        let input = AllocationInput {
            lookup: &lookup,
            assignments: &assignments,
            rooms: &rooms,
            deadline: Instant::now() + self.settings.budget.min(MAX_BUDGET),
        };

        let mut tx = self.repository.begin(&term.id)?;
        let report = match self.allocator.allocate(&input, tx.as_mut()) {
            Ok(report) => report,
            Err(err) => {
                warn!(term = %term.id, error = %err, "generation rolled back");
                return Err(err.into());
            }
        };
        tx.commit()?;

        self.record(
            "generate",
            format!(
                "generated term {}: {} of {} assignments placed",
                term.label(),
                report.summary.succeeded,
                report.summary.total
            ),
            actor,
        );
        Ok(report)
    }

    pub fn approve_all(
        &self,
        term: &TermId,
        actor: Option<&ActorId>,
    ) -> Result<ApprovalReport, ScheduleError> {
        let term = self.term(term)?;
        let mut tx = self.repository.begin(&term.id)?;
        let approved = self.lifecycle.approve_all(tx.as_mut())?;
        tx.commit()?;

        self.record(
            "approve",
            format!("approved {approved} slots of term {}", term.label()),
            actor,
        );
        Ok(ApprovalReport {
            term: term.id,
            approved,
        })
    }

    pub fn publish_all(
        &self,
        term: &TermId,
        actor: Option<&ActorId>,
    ) -> Result<PublishReport, ScheduleError> {
        let term = self.term(term)?;
        let active = self.catalog.active_term()?;
        let assignments = self.catalog.list_active_assignments(&term.id, None)?;
        let lookup = Lookup::load(self.catalog.as_ref(), &self.grid, &term.id)?;

        let mut tx = self.repository.begin(&term.id)?;
        let report =
            self.lifecycle
                .publish_all(tx.as_mut(), &lookup, active.as_ref(), &assignments)?;
        tx.commit()?;

        self.record(
            "publish",
            format!(
                "published {} slots of term {} for {} teachers",
                report.published,
                term.label(),
                report.teachers_affected
            ),
            actor,
        );
        Ok(report)
    }

    pub fn cancel_slot(
        &self,
        id: &SlotId,
        actor: Option<&ActorId>,
    ) -> Result<ScheduledSlot, ScheduleError> {
        let stored = self.get_slot(id)?;
        let mut tx = self.repository.begin(&stored.term)?;
        let slot = self.lifecycle.cancel(tx.as_mut(), id)?;
        tx.commit()?;

        self.record("cancel", format!("cancelled slot {id}"), actor);
        Ok(slot)
    }

    pub fn unpublish_slot(
        &self,
        id: &SlotId,
        reason: &str,
        actor: Option<&ActorId>,
    ) -> Result<ScheduledSlot, ScheduleError> {
        let stored = self.get_slot(id)?;
        let mut tx = self.repository.begin(&stored.term)?;
        let slot = self.lifecycle.unpublish(tx.as_mut(), id)?;
        tx.commit()?;

        self.record(
            "unpublish",
            format!("unpublished slot {id}: {reason}"),
            actor,
        );
        Ok(slot)
    }

    pub fn reactivate_slot(
        &self,
        id: &SlotId,
        actor: Option<&ActorId>,
    ) -> Result<ScheduledSlot, ScheduleError> {
        let stored = self.get_slot(id)?;
        let lookup = Lookup::load(self.catalog.as_ref(), &self.grid, &stored.term)?;
        let mut tx = self.repository.begin(&stored.term)?;
        let slot = self.lifecycle.reactivate(tx.as_mut(), &lookup, id)?;
        tx.commit()?;

        self.record("reactivate", format!("reactivated slot {id}"), actor);
        Ok(slot)
    }

    pub fn create_slot(
        &self,
        candidate: &SlotCandidate,
        actor: Option<&ActorId>,
    ) -> Result<ScheduledSlot, ScheduleError> {
        let assignment = self
            .catalog
            .find_assignment(&candidate.assignment)?
            .ok_or_else(|| ValidationError::UnknownAssignment(candidate.assignment.clone()))?;
        let lookup = Lookup::load(self.catalog.as_ref(), &self.grid, &assignment.term)?;
        let mut tx = self.repository.begin(&assignment.term)?;
        let slot = self.lifecycle.create(tx.as_mut(), &lookup, candidate)?;
        tx.commit()?;

        self.record(
            "create",
            format!(
                "placed assignment {} in room {} on {} block {}",
                candidate.assignment, candidate.room, candidate.weekday, candidate.block
            ),
            actor,
        );
        Ok(slot)
    }

    pub fn update_slot(
        &self,
        id: &SlotId,
        patch: &SlotPatch,
        actor: Option<&ActorId>,
    ) -> Result<ScheduledSlot, ScheduleError> {
        let stored = self.get_slot(id)?;
        let lookup = Lookup::load(self.catalog.as_ref(), &self.grid, &stored.term)?;
        let mut tx = self.repository.begin(&stored.term)?;
        let slot = self.lifecycle.update(tx.as_mut(), &lookup, id, patch)?;
        tx.commit()?;

        self.record("update", format!("moved slot {id}"), actor);
        Ok(slot)
    }

    pub fn get_slot(&self, id: &SlotId) -> Result<ScheduledSlot, ScheduleError> {
        Ok(self
            .repository
            .find_slot(id)?
            .ok_or_else(|| ValidationError::UnknownSlot(id.clone()))?)
    }

    pub fn list_slots(&self, term: &TermId) -> Result<Vec<ScheduledSlot>, ScheduleError> {
        let term = self.term(term)?;
        Ok(self.repository.list_slots(&term.id)?)
    }

    /// Weekly grid of the active term.
    pub fn weekly_grid(&self, filter: Option<GridFilter>) -> Result<WeeklyGrid, ScheduleError> {
        let term = self.active_term()?;
        let lookup = Lookup::load(self.catalog.as_ref(), &self.grid, &term.id)?;
        if let Some(filter) = &filter {
            if let GridFilter::Career(career) = filter {
                if !self.catalog.career_exists(career)? {
                    return Err(ValidationError::UnknownCareer(career.clone()).into());
                }
            }
            views::check_filter(&lookup, filter)?;
        }
        let slots = self.repository.list_slots(&term.id)?;
        Ok(views::weekly_grid(&lookup, &term, &slots, filter))
    }

    /// Published load of a teacher in the active term.
    pub fn teacher_workload(&self, teacher: &TeacherId) -> Result<TeacherWorkload, ScheduleError> {
        let term = self.active_term()?;
        let lookup = Lookup::load(self.catalog.as_ref(), &self.grid, &term.id)?;
        if !lookup.teaches(teacher) {
            return Err(ValidationError::UnknownTeacher(teacher.clone()).into());
        }
        let slots = self.repository.list_slots(&term.id)?;
        Ok(views::teacher_workload(&lookup, &term, &slots, teacher))
    }

    fn term(&self, id: &TermId) -> Result<Term, ScheduleError> {
        Ok(self
            .catalog
            .find_term(id)?
            .ok_or_else(|| ValidationError::UnknownTerm(id.clone()))?)
    }

    fn active_term(&self) -> Result<Term, ScheduleError> {
        Ok(self
            .catalog
            .active_term()?
            .ok_or(LifecycleError::NoActiveTerm)?)
    }

    fn record(&self, action: &str, description: String, actor: Option<&ActorId>) {
        match self.audit.record(action, &description, actor) {
            Ok(()) => info!(action, "{description}"),
            Err(err) => warn!(action, error = %err, "audit record dropped"),
        }
    }
}
