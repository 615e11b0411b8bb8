//! Read-only arrangements of a term's slots.

use std::collections::BTreeSet;

use types::{
    GridCell, GridDay, GridEntry, GridFilter, ScheduledSlot, SlotState, TeacherId,
    TeacherWorkload, Term, WeeklyGrid,
};

use crate::allocator::round_to;
use crate::error::ValidationError;
use crate::lookup::Lookup;

/// Checks that the filter names something this term knows about.
pub fn check_filter(lookup: &Lookup, filter: &GridFilter) -> Result<(), ValidationError> {
    match filter {
        GridFilter::Career(_) => Ok(()),
        GridFilter::Group(id) => lookup
            .group(id)
            .map(|_| ())
            .ok_or_else(|| ValidationError::UnknownGroup(id.clone())),
        GridFilter::Teacher(id) => {
            if lookup.teaches(id) {
                Ok(())
            } else {
                Err(ValidationError::UnknownTeacher(id.clone()))
            }
        }
    }
}

fn matches(lookup: &Lookup, filter: Option<&GridFilter>, slot: &ScheduledSlot) -> bool {
    match filter {
        None => true,
        Some(GridFilter::Teacher(id)) => &slot.teacher == id,
        Some(GridFilter::Group(id)) => &slot.group == id,
        Some(GridFilter::Career(id)) => lookup
            .assignment(&slot.assignment)
            .is_some_and(|a| a.career.as_ref() == Some(id)),
    }
}

/// Occupying slots of the term arranged weekday by block.
pub fn weekly_grid(
    lookup: &Lookup,
    term: &Term,
    slots: &[ScheduledSlot],
    filter: Option<GridFilter>,
) -> WeeklyGrid {
    let selected: Vec<&ScheduledSlot> = slots
        .iter()
        .filter(|s| s.occupies() && s.term == term.id)
        .filter(|s| matches(lookup, filter.as_ref(), s))
        .collect();
    let days = arrange(lookup, &selected);
    WeeklyGrid {
        term: term.id.clone(),
        term_label: term.label(),
        filter,
        total_slots: count(&days),
        days,
    }
}

/// Published load of one teacher in the term.
pub fn teacher_workload(
    lookup: &Lookup,
    term: &Term,
    slots: &[ScheduledSlot],
    teacher: &TeacherId,
) -> TeacherWorkload {
    let published: Vec<&ScheduledSlot> = slots
        .iter()
        .filter(|s| s.occupies() && s.term == term.id)
        .filter(|s| s.state == SlotState::Published && &s.teacher == teacher)
        .collect();

    let weekly_hours: f64 = published
        .iter()
        .filter_map(|s| s.block.as_ref().and_then(|b| lookup.block(b)))
        .map(|b| b.hours())
        .sum();
    let subjects: BTreeSet<String> = published
        .iter()
        .map(|s| {
            lookup
                .assignment(&s.assignment)
                .map(|a| a.subject.clone())
                .unwrap_or_else(|| s.assignment.to_string())
        })
        .collect();

    TeacherWorkload {
        teacher: teacher.clone(),
        term: term.id.clone(),
        term_label: term.label(),
        total_slots: published.len(),
        weekly_hours: round_to(weekly_hours, 2),
        distinct_subjects: subjects.len(),
        grid: arrange(lookup, &published),
    }
}

fn count(days: &[GridDay]) -> usize {
    days.iter()
        .flat_map(|d| &d.cells)
        .map(|c| c.entries.len())
        .sum()
}

/// One day per grid weekday, one cell per active block; slots outside the
/// grid or with a missing placement are left out.
fn arrange(lookup: &Lookup, slots: &[&ScheduledSlot]) -> Vec<GridDay> {
    let blocks = lookup.grid().ordered_blocks();
    lookup
        .grid()
        .weekdays
        .iter()
        .map(|&weekday| GridDay {
            weekday,
            cells: blocks
                .iter()
                .map(|block| GridCell {
                    block: block.id.clone(),
                    block_name: block.name.clone(),
                    entries: slots
                        .iter()
                        .filter(|s| s.at(weekday, &block.id))
                        .map(|s| entry(lookup, s))
                        .collect(),
                })
                .collect(),
        })
        .collect()
}

fn entry(lookup: &Lookup, slot: &ScheduledSlot) -> GridEntry {
    let room = slot.room.as_ref().and_then(|r| lookup.room(r));
    let block = slot.block.as_ref().and_then(|b| lookup.block(b));
    GridEntry {
        slot: slot.id.clone(),
        assignment: slot.assignment.clone(),
        subject: lookup
            .assignment(&slot.assignment)
            .map(|a| a.subject.clone())
            .unwrap_or_default(),
        group: lookup.group_name(&slot.group),
        teacher: slot.teacher.clone(),
        room: slot.room.clone(),
        room_name: room.map(|r| r.name.clone()),
        room_type: room.map(|r| r.room_type),
        room_capacity: room.map(|r| r.capacity),
        kind: slot.kind,
        state: slot.state,
        start: block.map(|b| b.start),
        end: block.map(|b| b.end),
    }
}
