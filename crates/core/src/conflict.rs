use thiserror::Error;
use types::{
    AssignmentId, BlockId, GroupId, RoomId, RoomType, ScheduledSlot, SlotId, TeacherId, Weekday,
};

use crate::lookup::Placement;

/// A hard constraint the candidate would violate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Conflict {
    #[error("room {room} seats {room_capacity}, fewer than the {group_capacity} students of group {group}")]
    Capacity {
        room: RoomId,
        room_capacity: u32,
        group: GroupId,
        group_capacity: u32,
    },
    #[error("room {room} is already taken on {weekday} in block {block} by slot {slot} of assignment {assignment}")]
    Room {
        room: RoomId,
        weekday: Weekday,
        block: BlockId,
        slot: SlotId,
        assignment: AssignmentId,
    },
    #[error("teacher {teacher} already teaches slot {slot} of assignment {assignment} on {weekday} in block {block}")]
    Teacher {
        teacher: TeacherId,
        weekday: Weekday,
        block: BlockId,
        slot: SlotId,
        assignment: AssignmentId,
    },
    #[error("group {group} already attends slot {slot} of assignment {assignment} on {weekday} in block {block}")]
    Group {
        group: GroupId,
        weekday: Weekday,
        block: BlockId,
        slot: SlotId,
        assignment: AssignmentId,
    },
    #[error("room {room} is under maintenance")]
    Maintenance { room: RoomId },
    #[error("assignment {assignment} needs a laboratory or workshop but room {room} is a {room_type}")]
    RoomType {
        assignment: AssignmentId,
        room: RoomId,
        room_type: RoomType,
    },
}

impl Conflict {
    pub fn kind(&self) -> &'static str {
        match self {
            Conflict::Capacity { .. } => "capacity",
            Conflict::Room { .. } => "room",
            Conflict::Teacher { .. } => "teacher",
            Conflict::Group { .. } => "group",
            Conflict::Maintenance { .. } => "maintenance",
            Conflict::RoomType { .. } => "roomType",
        }
    }

    /// The already placed slot the candidate collides with, if any.
    pub fn competing_slot(&self) -> Option<&SlotId> {
        match self {
            Conflict::Room { slot, .. }
            | Conflict::Teacher { slot, .. }
            | Conflict::Group { slot, .. } => Some(slot),
            _ => None,
        }
    }
}

/// Decides whether a resolved candidate can be placed next to the slots
/// already occupying its term.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConflictValidator;

impl ConflictValidator {
    pub fn new() -> Self {
        Self
    }

    /// Checks run in a fixed order and the first violation wins: capacity,
    /// co-occupancy (room, then teacher, then group of the first clashing
    /// slot), maintenance, room type.
    pub fn check(
        &self,
        candidate: &Placement<'_>,
        occupied: &[ScheduledSlot],
        exclude: Option<&SlotId>,
    ) -> Result<(), Conflict> {
        let Placement {
            assignment,
            group,
            room,
            block,
            weekday,
            ..
        } = *candidate;

        if room.capacity < group.capacity {
            return Err(Conflict::Capacity {
                room: room.id.clone(),
                room_capacity: room.capacity,
                group: group.id.clone(),
                group_capacity: group.capacity,
            });
        }

        let clash = occupied
            .iter()
            .filter(|s| s.occupies() && s.term == assignment.term)
            .filter(|s| exclude.map_or(true, |id| &s.id != id))
            .filter(|s| s.at(weekday, &block.id))
            .find(|s| {
                s.room.as_ref() == Some(&room.id)
                    || s.teacher == assignment.teacher
                    || s.group == assignment.group
            });

        if let Some(other) = clash {
            let slot = other.id.clone();
            let other_assignment = other.assignment.clone();
            let block = block.id.clone();
            return Err(if other.room.as_ref() == Some(&room.id) {
                Conflict::Room {
                    room: room.id.clone(),
                    weekday,
                    block,
                    slot,
                    assignment: other_assignment,
                }
            } else if other.teacher == assignment.teacher {
                Conflict::Teacher {
                    teacher: assignment.teacher.clone(),
                    weekday,
                    block,
                    slot,
                    assignment: other_assignment,
                }
            } else {
                Conflict::Group {
                    group: assignment.group.clone(),
                    weekday,
                    block,
                    slot,
                    assignment: other_assignment,
                }
            });
        }

        if room.maintenance {
            return Err(Conflict::Maintenance {
                room: room.id.clone(),
            });
        }

        if assignment.needs_practical_room() && !room.room_type.is_practical() {
            return Err(Conflict::RoomType {
                assignment: assignment.id.clone(),
                room: room.id.clone(),
                room_type: room.room_type,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use types::{SlotCandidate, SlotState, SubjectKind, TermId};

    fn candidate(assignment: &str, room: &str, weekday: Weekday, block: &str) -> SlotCandidate {
        SlotCandidate {
            assignment: AssignmentId::new(assignment),
            room: RoomId::new(room),
            weekday,
            block: BlockId::new(block),
            kind: None,
        }
    }

    fn base_lookup() -> crate::lookup::Lookup {
        let mut practical = assignment("A3", "T3", "G3", 4);
        practical.subject_kind = SubjectKind::Laboratory;
        lookup(
            vec![block("B1", 7, 90), block("B2", 9, 90)],
            vec![room("R1", 30), room("R2", 50), lab("L1", 50)],
            vec![group("G1", 40), group("G2", 25), group("G3", 20)],
            vec![
                assignment("A1", "T1", "G2", 6),
                assignment("A2", "T1", "G3", 6),
                assignment("A4", "T4", "G2", 6),
                assignment("A5", "T5", "G1", 6),
                practical,
            ],
        )
    }

    #[test]
    fn room_smaller_than_group_is_a_capacity_conflict() {
        let lookup = base_lookup();
        let placement = lookup
            .resolve(&candidate("A5", "R1", Weekday::Mon, "B1"))
            .expect("ids resolve");

        let err = ConflictValidator::new()
            .check(&placement, &[], None)
            .expect_err("room too small");

        assert!(matches!(
            err,
            Conflict::Capacity {
                room_capacity: 30,
                group_capacity: 40,
                ..
            }
        ));
        insta::assert_snapshot!(err.to_string(), @"room R1 seats 30, fewer than the 40 students of group G1");
    }

    #[test]
    fn same_teacher_same_block_is_a_teacher_conflict() {
        let lookup = base_lookup();
        let a1 = lookup.assignment(&AssignmentId::new("A1")).unwrap().clone();
        let placed = vec![slot("S1", &a1, "R2", Weekday::Mon, "B2")];
        let placement = lookup
            .resolve(&candidate("A2", "R1", Weekday::Mon, "B2"))
            .unwrap();

        let err = ConflictValidator::new()
            .check(&placement, &placed, None)
            .expect_err("teacher busy");

        assert_eq!(err.kind(), "teacher");
        assert_eq!(err.competing_slot(), Some(&SlotId::new("S1")));
        insta::assert_snapshot!(err.to_string(), @"teacher T1 already teaches slot S1 of assignment A1 on Monday in block B2");
    }

    #[test]
    fn room_match_is_reported_before_teacher_and_group() {
        let lookup = base_lookup();
        let a1 = lookup.assignment(&AssignmentId::new("A1")).unwrap().clone();
        let placed = vec![slot("S1", &a1, "R2", Weekday::Tue, "B1")];
        let placement = lookup
            .resolve(&candidate("A2", "R2", Weekday::Tue, "B1"))
            .unwrap();

        let err = ConflictValidator::new()
            .check(&placement, &placed, None)
            .unwrap_err();

        assert_eq!(err.kind(), "room");
    }

    #[test]
    fn shared_group_is_a_group_conflict() {
        let lookup = base_lookup();
        let a1 = lookup.assignment(&AssignmentId::new("A1")).unwrap().clone();
        let placed = vec![slot("S1", &a1, "R2", Weekday::Wed, "B1")];
        let placement = lookup
            .resolve(&candidate("A4", "L1", Weekday::Wed, "B1"))
            .unwrap();

        let err = ConflictValidator::new()
            .check(&placement, &placed, None)
            .unwrap_err();

        insta::assert_snapshot!(err.to_string(), @"group G2 already attends slot S1 of assignment A1 on Wednesday in block B1");
    }

    #[test]
    fn different_block_day_or_term_does_not_clash() {
        let lookup = base_lookup();
        let a1 = lookup.assignment(&AssignmentId::new("A1")).unwrap().clone();
        let mut other_term = slot("S3", &a1, "R2", Weekday::Mon, "B1");
        other_term.term = TermId::new("2024-1");
        let placed = vec![
            slot("S1", &a1, "R2", Weekday::Mon, "B2"),
            slot("S2", &a1, "R2", Weekday::Tue, "B1"),
            other_term,
        ];
        let placement = lookup
            .resolve(&candidate("A2", "R2", Weekday::Mon, "B1"))
            .unwrap();

        assert_eq!(ConflictValidator::new().check(&placement, &placed, None), Ok(()));
    }

    #[test]
    fn cancelled_and_inactive_slots_do_not_occupy() {
        let lookup = base_lookup();
        let a1 = lookup.assignment(&AssignmentId::new("A1")).unwrap().clone();
        let mut cancelled = slot("S1", &a1, "R2", Weekday::Mon, "B1");
        cancelled.state = SlotState::Cancelled;
        cancelled.active = false;
        let mut inactive = slot("S2", &a1, "R2", Weekday::Mon, "B1");
        inactive.active = false;
        let placement = lookup
            .resolve(&candidate("A2", "R2", Weekday::Mon, "B1"))
            .unwrap();

        assert!(ConflictValidator::new()
            .check(&placement, &[cancelled, inactive], None)
            .is_ok());
    }

    #[test]
    fn excluded_slot_is_ignored_when_revalidating_itself() {
        let lookup = base_lookup();
        let a1 = lookup.assignment(&AssignmentId::new("A1")).unwrap().clone();
        let placed = vec![slot("S1", &a1, "R2", Weekday::Mon, "B1")];
        let placement = lookup
            .resolve(&candidate("A1", "R2", Weekday::Mon, "B1"))
            .unwrap();
        let validator = ConflictValidator::new();

        assert!(validator.check(&placement, &placed, None).is_err());
        assert!(validator
            .check(&placement, &placed, Some(&SlotId::new("S1")))
            .is_ok());
    }

    #[test]
    fn maintenance_is_checked_after_co_occupancy() {
        let mut lookup_rooms = vec![room("R2", 50)];
        lookup_rooms[0].maintenance = true;
        let a1 = assignment("A1", "T1", "G2", 6);
        let a2 = assignment("A2", "T1", "G3", 6);
        let lookup = lookup(
            vec![block("B1", 7, 90)],
            lookup_rooms,
            vec![group("G2", 25), group("G3", 20)],
            vec![a1.clone(), a2],
        );
        let placement = lookup
            .resolve(&candidate("A2", "R2", Weekday::Mon, "B1"))
            .unwrap();
        let validator = ConflictValidator::new();

        let busy = vec![slot("S1", &a1, "R9", Weekday::Mon, "B1")];
        assert_eq!(validator.check(&placement, &busy, None).unwrap_err().kind(), "teacher");

        let err = validator.check(&placement, &[], None).unwrap_err();
        assert_eq!(
            err,
            Conflict::Maintenance {
                room: RoomId::new("R2")
            }
        );
    }

    #[test]
    fn practical_assignment_in_plain_classroom_is_rejected() {
        let lookup = base_lookup();
        let validator = ConflictValidator::new();

        let in_classroom = lookup
            .resolve(&candidate("A3", "R2", Weekday::Thu, "B1"))
            .unwrap();
        assert_eq!(
            validator.check(&in_classroom, &[], None).unwrap_err().kind(),
            "roomType"
        );

        let in_lab = lookup
            .resolve(&candidate("A3", "L1", Weekday::Thu, "B1"))
            .unwrap();
        assert!(validator.check(&in_lab, &[], None).is_ok());
    }

    #[test]
    fn validation_is_repeatable() {
        let lookup = base_lookup();
        let a1 = lookup.assignment(&AssignmentId::new("A1")).unwrap().clone();
        let placed = vec![slot("S1", &a1, "R2", Weekday::Fri, "B2")];
        let snapshot = placed.clone();
        let validator = ConflictValidator::new();
        let placement = lookup
            .resolve(&candidate("A2", "R1", Weekday::Fri, "B2"))
            .unwrap();

        let first = validator.check(&placement, &placed, None);
        let second = validator.check(&placement, &placed, None);

        assert_eq!(first, second);
        assert_eq!(placed, snapshot);
    }

    #[test]
    fn unknown_ids_are_validation_errors() {
        let lookup = base_lookup();
        assert!(matches!(
            lookup.resolve(&candidate("A1", "R404", Weekday::Mon, "B1")),
            Err(crate::error::ValidationError::UnknownRoom(_))
        ));
        assert!(matches!(
            lookup.resolve(&candidate("A404", "R1", Weekday::Mon, "B1")),
            Err(crate::error::ValidationError::UnknownAssignment(_))
        ));
        assert!(matches!(
            lookup.resolve(&candidate("A1", "R1", Weekday::Mon, "B9")),
            Err(crate::error::ValidationError::UnknownBlock(_))
        ));
    }
}
