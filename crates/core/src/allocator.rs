//! Greedy placement of teaching assignments into draft slots.

use std::time::Instant;

use thiserror::Error;
use tracing::{debug, info};
use types::{
    AllocationFailure, AllocationResult, Completion, FailureReason, GenerationDetails,
    GenerationReport, GenerationSummary, PlacedSlot, Room, ScheduledSlot, TeachingAssignment,
};

use crate::conflict::ConflictValidator;
use crate::lookup::{Lookup, Placement};
use crate::planner::{Strategy, StrategyPlanner};
use crate::ports::{RepositoryError, RoomFilter, SlotTransaction};

/// Slots staged by one strategy attempt before the walk stops. Counts
/// staged placements, not adjacent blocks. Only the four-day pattern can hit
/// it, and only when that pattern outranks Mon-Wed-Fri, which takes blocks
/// longer than ten hours.
pub const MAX_BLOCKS_PER_ATTEMPT: usize = 3;

/// Placed hours this close to the target count as complete.
pub const COMPLETION_TOLERANCE: f64 = 0.1;

#[derive(Debug, Error)]
pub enum AllocationError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("time budget exhausted after {processed} of {total} assignments")]
    BudgetExceeded { processed: usize, total: usize },
}

pub struct AllocationInput<'a> {
    pub lookup: &'a Lookup,
    /// Processed in the given order.
    pub assignments: &'a [TeachingAssignment],
    pub rooms: &'a [Room],
    pub deadline: Instant,
}

/// Places assignments into the open transaction and reports per-assignment
/// outcomes. Only storage failures and budget exhaustion are errors; the
/// caller drops the transaction on error.
pub trait Allocator: Send + Sync {
    fn allocate(
        &self,
        input: &AllocationInput<'_>,
        tx: &mut dyn SlotTransaction,
    ) -> Result<GenerationReport, AllocationError>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct GreedyAllocator {
    planner: StrategyPlanner,
    validator: ConflictValidator,
}

enum Outcome {
    Placed {
        placed_minutes: u64,
        slots: Vec<PlacedSlot>,
    },
    Rejected(FailureReason),
}

impl GreedyAllocator {
    pub fn new(planner: StrategyPlanner) -> Self {
        Self {
            planner,
            validator: ConflictValidator::new(),
        }
    }

    /// Active, maintenance-free rooms that fit the group and the subject's
    /// room type, smallest first.
    pub fn eligible_rooms<'r>(
        rooms: &'r [Room],
        assignment: &TeachingAssignment,
        group_capacity: u32,
    ) -> Vec<&'r Room> {
        let filter = RoomFilter::eligible();
        let mut eligible: Vec<&Room> = rooms
            .iter()
            .filter(|r| filter.accepts(r))
            .filter(|r| !assignment.needs_practical_room() || r.room_type.is_practical())
            .filter(|r| r.capacity >= group_capacity)
            .collect();
        eligible.sort_by_key(|r| r.capacity);
        eligible
    }

    fn place_one(
        &self,
        input: &AllocationInput<'_>,
        assignment: &TeachingAssignment,
        occupied: &mut Vec<ScheduledSlot>,
        tx: &mut dyn SlotTransaction,
        progress: (usize, usize),
    ) -> Result<Outcome, AllocationError> {
        if assignment.required_hours == 0 {
            return Ok(Outcome::Rejected(FailureReason::NoRequiredHours));
        }
        let Some(group) = input.lookup.group(&assignment.group) else {
            return Ok(Outcome::Rejected(FailureReason::UnknownGroup {
                group: assignment.group.clone(),
            }));
        };
        let Some(room) = Self::eligible_rooms(input.rooms, assignment, group.capacity)
            .into_iter()
            .next()
        else {
            return Ok(Outcome::Rejected(FailureReason::NoEligibleRoom {
                required_capacity: group.capacity,
            }));
        };

        let required_minutes = u64::from(assignment.required_hours) * 60;
        let mut placed_minutes = 0u64;
        let mut slots = Vec::new();

        for strategy in self.planner.plan(assignment.required_hours, input.lookup.grid()) {
            if placed_minutes >= required_minutes {
                break;
            }
            if Instant::now() >= input.deadline {
                return Err(AllocationError::BudgetExceeded {
                    processed: progress.0,
                    total: progress.1,
                });
            }

            let staged = match self.stage(
                &strategy,
                assignment,
                group,
                room,
                occupied,
                placed_minutes,
                required_minutes,
            ) {
                Ok(staged) => staged,
                Err(conflict) => {
                    debug!(
                        assignment = %assignment.id,
                        pattern = strategy.pattern.label(),
                        block = %strategy.block.id,
                        kind = conflict.kind(),
                        "strategy abandoned: {conflict}"
                    );
                    continue;
                }
            };

            for placement in staged {
                let slot = tx.insert(placement.draft())?;
                placed_minutes += u64::from(placement.block.minutes);
                slots.push(PlacedSlot {
                    slot_id: slot.id.clone(),
                    weekday: placement.weekday,
                    block: placement.block.id.clone(),
                    block_name: placement.block.name.clone(),
                    room: room.id.clone(),
                    room_name: room.name.clone(),
                    hours: placement.block.hours(),
                });
                occupied.push(slot);
            }
        }

        Ok(Outcome::Placed {
            placed_minutes,
            slots,
        })
    }

    /// Walks the strategy's weekdays and collects conflict-free placements.
    /// A single conflict abandons the whole attempt.
    #[allow(clippy::too_many_arguments)]
    fn stage<'a>(
        &self,
        strategy: &Strategy<'a>,
        assignment: &'a TeachingAssignment,
        group: &'a types::Group,
        room: &'a Room,
        occupied: &[ScheduledSlot],
        placed_minutes: u64,
        required_minutes: u64,
    ) -> Result<Vec<Placement<'a>>, crate::conflict::Conflict> {
        let mut staged = Vec::new();
        let block_minutes = u64::from(strategy.block.minutes);
        let mut minutes = placed_minutes;
        for &weekday in strategy.weekdays() {
            if staged.len() >= MAX_BLOCKS_PER_ATTEMPT
                || minutes >= required_minutes
                || minutes + block_minutes > required_minutes
            {
                break;
            }
            let placement = Placement {
                assignment,
                group,
                room,
                block: strategy.block,
                weekday,
                kind: assignment.class_kind(),
            };
            self.validator.check(&placement, occupied, None)?;
            minutes += block_minutes;
            staged.push(placement);
        }
        Ok(staged)
    }
}

impl Allocator for GreedyAllocator {
    fn allocate(
        &self,
        input: &AllocationInput<'_>,
        tx: &mut dyn SlotTransaction,
    ) -> Result<GenerationReport, AllocationError> {
        let total = input.assignments.len();
        let mut occupied = tx.list_active_slots()?;
        let mut details = GenerationDetails::default();

        for (processed, assignment) in input.assignments.iter().enumerate() {
            if Instant::now() >= input.deadline {
                return Err(AllocationError::BudgetExceeded { processed, total });
            }
            let group_name = input.lookup.group_name(&assignment.group);
            let outcome = self.place_one(
                input,
                assignment,
                &mut occupied,
                tx,
                (processed, total),
            )?;

            let (placed_minutes, slots, reason) = match outcome {
                Outcome::Rejected(reason) => (0, Vec::new(), Some(reason)),
                Outcome::Placed {
                    placed_minutes,
                    slots,
                } => (placed_minutes, slots, None),
            };
            let placed_hours = placed_minutes as f64 / 60.0;
            let completion = classify(placed_hours, assignment.required_hours);

            if placed_minutes > 0 {
                details.succeeded.push(AllocationResult {
                    assignment: assignment.id.clone(),
                    subject: assignment.subject.clone(),
                    group: group_name.clone(),
                    required_hours: assignment.required_hours,
                    placed_hours,
                    completion,
                    percentage: percentage(placed_hours, assignment.required_hours),
                    slots: slots.clone(),
                });
            }
            if completion != Completion::Completed {
                let reason = reason.unwrap_or(FailureReason::InsufficientPlacement {
                    placed_hours,
                    required_hours: assignment.required_hours,
                });
                details.failed.push(AllocationFailure {
                    assignment: assignment.id.clone(),
                    subject: assignment.subject.clone(),
                    group: group_name,
                    message: reason.to_string(),
                    reason,
                    required_hours: assignment.required_hours,
                    placed_hours,
                    partial_slots: slots,
                });
            }
        }

        let report = summarize(total, details);
        info!(
            total = report.summary.total,
            succeeded = report.summary.succeeded,
            failed = report.summary.failed,
            "allocation finished"
        );
        Ok(report)
    }
}

pub fn classify(placed_hours: f64, required_hours: u32) -> Completion {
    if required_hours > 0 && (placed_hours - f64::from(required_hours)).abs() < COMPLETION_TOLERANCE
    {
        Completion::Completed
    } else if placed_hours > 0.0 {
        Completion::Partial
    } else {
        Completion::Failed
    }
}

fn percentage(placed_hours: f64, required_hours: u32) -> f64 {
    if required_hours == 0 {
        return 0.0;
    }
    round_to(placed_hours / f64::from(required_hours) * 100.0, 1)
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn summarize(total: usize, details: GenerationDetails) -> GenerationReport {
    let succeeded = details.succeeded.len();
    let success_rate = if total == 0 {
        0.0
    } else {
        round_to(succeeded as f64 / total as f64 * 100.0, 2)
    };
    GenerationReport {
        summary: GenerationSummary {
            total,
            succeeded,
            failed: details.failed.len(),
            success_rate,
        },
        details,
    }
}
