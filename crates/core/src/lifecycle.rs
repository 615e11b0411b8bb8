//! State transitions of placed slots, batch and single.

use std::collections::{BTreeSet, HashSet};

use tracing::info;
use types::{
    IncompleteSlot, PublishReport, ScheduledSlot, SlotCandidate, SlotId, SlotPatch, SlotState,
    TeachingAssignment, Term, UnscheduledAssignment,
};

use crate::conflict::ConflictValidator;
use crate::error::{IntegrityError, LifecycleError, ScheduleError, ValidationError};
use crate::lookup::Lookup;
use crate::ports::{RepositoryError, SlotTransaction};

#[derive(Clone, Copy, Debug, Default)]
pub struct ScheduleLifecycle {
    validator: ConflictValidator,
}

impl ScheduleLifecycle {
    pub fn new(validator: ConflictValidator) -> Self {
        Self { validator }
    }

    /// Moves every occupying draft of the transaction's term to approved.
    pub fn approve_all(&self, tx: &mut dyn SlotTransaction) -> Result<usize, RepositoryError> {
        let drafts: Vec<SlotId> = tx
            .list_active_slots()?
            .into_iter()
            .filter(|s| s.state.can_transition_to(SlotState::Approved))
            .map(|s| s.id)
            .collect();
        for id in &drafts {
            tx.update_state(id, SlotState::Approved)?;
        }
        info!(term = %tx.term(), approved = drafts.len(), "slots approved");
        Ok(drafts.len())
    }

    /// Publishes every approved slot once the whole term passes the integrity
    /// check. Nothing changes when any check fails.
    pub fn publish_all(
        &self,
        tx: &mut dyn SlotTransaction,
        lookup: &Lookup,
        active_term: Option<&Term>,
        active_assignments: &[TeachingAssignment],
    ) -> Result<PublishReport, ScheduleError> {
        let term = tx.term().clone();
        let active = active_term.ok_or(LifecycleError::NoActiveTerm)?;
        if active.id != term {
            return Err(LifecycleError::TermNotActive(term).into());
        }

        let slots = tx.list_active_slots()?;
        let approved: Vec<&ScheduledSlot> = slots
            .iter()
            .filter(|s| s.state.can_transition_to(SlotState::Published))
            .collect();
        if approved.is_empty() {
            return Err(LifecycleError::NothingToPublish(term).into());
        }

        let integrity = IntegrityError {
            incomplete: approved
                .iter()
                .filter_map(|s| incomplete(s, lookup))
                .collect(),
            unscheduled: unscheduled(&slots, active_assignments),
        };
        if !integrity.is_empty() {
            return Err(integrity.into());
        }

        let mut teachers = HashSet::new();
        let mut assignments = HashSet::new();
        for slot in &approved {
            tx.update_state(&slot.id, SlotState::Published)?;
            teachers.insert(&slot.teacher);
            assignments.insert(&slot.assignment);
        }

        let report = PublishReport {
            term,
            published: approved.len(),
            teachers_affected: teachers.len(),
            assignments_covered: assignments.len(),
        };
        info!(
            term = %report.term,
            published = report.published,
            teachers = report.teachers_affected,
            "term published"
        );
        Ok(report)
    }

    /// Cancels a draft or approved slot. Published slots go through
    /// [`ScheduleLifecycle::unpublish`].
    pub fn cancel(
        &self,
        tx: &mut dyn SlotTransaction,
        id: &SlotId,
    ) -> Result<ScheduledSlot, ScheduleError> {
        let mut slot = fetch(tx, id)?;
        if slot.state == SlotState::Published {
            return Err(LifecycleError::SlotPublished(slot.id).into());
        }
        transition(&mut slot, SlotState::Cancelled, LifecycleError::AlreadyCancelled)?;
        slot.active = false;
        tx.save(&slot)?;
        Ok(slot)
    }

    pub fn unpublish(
        &self,
        tx: &mut dyn SlotTransaction,
        id: &SlotId,
    ) -> Result<ScheduledSlot, ScheduleError> {
        let mut slot = fetch(tx, id)?;
        if slot.state != SlotState::Published {
            return Err(LifecycleError::NotPublished(slot.id).into());
        }
        transition(&mut slot, SlotState::Cancelled, LifecycleError::NotPublished)?;
        slot.active = false;
        tx.save(&slot)?;
        Ok(slot)
    }

    /// Brings an inactive slot back if its placement is still free. A
    /// cancelled slot returns as a draft.
    pub fn reactivate(
        &self,
        tx: &mut dyn SlotTransaction,
        lookup: &Lookup,
        id: &SlotId,
    ) -> Result<ScheduledSlot, ScheduleError> {
        let mut slot = fetch(tx, id)?;
        if slot.active {
            return Err(LifecycleError::AlreadyActive(slot.id).into());
        }
        let candidate = candidate_of(&slot, &SlotPatch::default(), lookup)?;
        let placement = lookup.resolve(&candidate)?;
        self.validator
            .check(&placement, &tx.list_active_slots()?, Some(&slot.id))?;

        slot.active = true;
        if slot.state.can_transition_to(SlotState::Draft) {
            slot.state = SlotState::Draft;
        }
        tx.save(&slot)?;
        Ok(slot)
    }

    /// Places a single slot by hand, always as a draft.
    pub fn create(
        &self,
        tx: &mut dyn SlotTransaction,
        lookup: &Lookup,
        candidate: &SlotCandidate,
    ) -> Result<ScheduledSlot, ScheduleError> {
        let placement = lookup.resolve(candidate)?;
        if !placement.assignment.active {
            return Err(ValidationError::InactiveAssignment(placement.assignment.id.clone()).into());
        }
        self.validator
            .check(&placement, &tx.list_active_slots()?, None)?;
        Ok(tx.insert(placement.draft())?)
    }

    /// Moves a draft or approved slot; its state is kept.
    pub fn update(
        &self,
        tx: &mut dyn SlotTransaction,
        lookup: &Lookup,
        id: &SlotId,
        patch: &SlotPatch,
    ) -> Result<ScheduledSlot, ScheduleError> {
        let mut slot = fetch(tx, id)?;
        if !slot.active || !slot.state.is_mutable() {
            return Err(LifecycleError::Immutable {
                slot: slot.id,
                state: slot.state,
            }
            .into());
        }
        let candidate = candidate_of(&slot, patch, lookup)?;
        let placement = lookup.resolve(&candidate)?;
        self.validator
            .check(&placement, &tx.list_active_slots()?, Some(&slot.id))?;

        slot.room = Some(placement.room.id.clone());
        slot.weekday = Some(placement.weekday);
        slot.block = Some(placement.block.id.clone());
        slot.kind = Some(placement.kind);
        tx.save(&slot)?;
        Ok(slot)
    }
}

fn fetch(tx: &dyn SlotTransaction, id: &SlotId) -> Result<ScheduledSlot, ScheduleError> {
    tx.get(id).map_err(|err| match err {
        RepositoryError::SlotNotFound(id) => ValidationError::UnknownSlot(id).into(),
        other => other.into(),
    })
}

/// Stored placement with the patch applied. Fields missing from both make the
/// slot incomplete.
fn candidate_of(
    slot: &ScheduledSlot,
    patch: &SlotPatch,
    lookup: &Lookup,
) -> Result<SlotCandidate, IntegrityError> {
    let room = patch.room.clone().or_else(|| slot.room.clone());
    let weekday = patch.weekday.or(slot.weekday);
    let block = patch.block.clone().or_else(|| slot.block.clone());
    match (room, weekday, block) {
        (Some(room), Some(weekday), Some(block)) => Ok(SlotCandidate {
            assignment: slot.assignment.clone(),
            room,
            weekday,
            block,
            kind: patch.kind.or(slot.kind),
        }),
        _ => {
            let mut merged = slot.clone();
            merged.room = merged.room.or_else(|| patch.room.clone());
            merged.weekday = merged.weekday.or(patch.weekday);
            merged.block = merged.block.or_else(|| patch.block.clone());
            Err(IntegrityError {
                incomplete: incomplete(&merged, lookup).into_iter().collect(),
                unscheduled: Vec::new(),
            })
        }
    }
}

fn incomplete(slot: &ScheduledSlot, lookup: &Lookup) -> Option<IncompleteSlot> {
    let mut problems: Vec<String> = slot
        .missing_fields()
        .into_iter()
        .map(|field| format!("missing {field}"))
        .collect();
    if let Some(room) = &slot.room {
        if lookup.room(room).is_none() {
            problems.push(format!("unknown room {room}"));
        }
    }
    if let Some(block) = &slot.block {
        if lookup.block(block).is_none() {
            problems.push(format!("unknown block {block}"));
        }
    }
    if problems.is_empty() {
        return None;
    }
    Some(IncompleteSlot {
        slot: slot.id.clone(),
        assignment: slot.assignment.clone(),
        subject: lookup.assignment(&slot.assignment).map(|a| a.subject.clone()),
        group: slot.group.clone(),
        problems,
    })
}

/// Active assignments with no approved or published slot.
fn unscheduled(
    slots: &[ScheduledSlot],
    assignments: &[TeachingAssignment],
) -> Vec<UnscheduledAssignment> {
    let covered: BTreeSet<_> = slots
        .iter()
        .filter(|s| matches!(s.state, SlotState::Approved | SlotState::Published))
        .map(|s| &s.assignment)
        .collect();
    assignments
        .iter()
        .filter(|a| a.active && !covered.contains(&a.id))
        .map(|a| UnscheduledAssignment {
            assignment: a.id.clone(),
            subject: a.subject.clone(),
            group: a.group.clone(),
            teacher: a.teacher.clone(),
        })
        .collect()
}

/// Moves the slot to `target` when its current state allows it.
fn transition(
    slot: &mut ScheduledSlot,
    target: SlotState,
    refused: fn(SlotId) -> LifecycleError,
) -> Result<(), LifecycleError> {
    if !slot.state.can_transition_to(target) {
        return Err(refused(slot.id.clone()));
    }
    slot.state = target;
    Ok(())
}
