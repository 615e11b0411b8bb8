use chrono::NaiveTime;
use types::{
    AssignmentId, BlockId, ClassKind, Group, GroupId, NewSlot, Room, RoomId, RoomType,
    ScheduledSlot, SlotId, SlotState, SubjectGroupId, SubjectKind, TeacherId, TeachingAssignment,
    TermId, TimeBlock, TimeGrid, Weekday,
};

use crate::lookup::Lookup;
use crate::ports::{RepositoryError, SlotTransaction};

pub(crate) const TERM: &str = "2025-2";

pub(crate) fn term() -> TermId {
    TermId::new(TERM)
}

pub(crate) fn block(id: &str, start_hour: u32, minutes: u32) -> TimeBlock {
    let start = NaiveTime::from_hms_opt(start_hour, 0, 0).expect("valid hour");
    TimeBlock {
        id: BlockId::new(id),
        name: format!("Block {id}"),
        start,
        end: start + chrono::Duration::minutes(i64::from(minutes)),
        minutes,
        active: true,
    }
}

pub(crate) fn weekdays() -> Vec<Weekday> {
    vec![
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
    ]
}

pub(crate) fn grid(blocks: Vec<TimeBlock>) -> TimeGrid {
    TimeGrid::new(weekdays(), blocks)
}

pub(crate) fn room(id: &str, capacity: u32) -> Room {
    Room {
        id: RoomId::new(id),
        name: format!("Room {id}"),
        capacity,
        room_type: RoomType::Classroom,
        maintenance: false,
        active: true,
    }
}

pub(crate) fn lab(id: &str, capacity: u32) -> Room {
    Room {
        room_type: RoomType::Laboratory,
        ..room(id, capacity)
    }
}

pub(crate) fn group(id: &str, capacity: u32) -> Group {
    Group {
        id: GroupId::new(id),
        name: format!("Group {id}"),
        capacity,
    }
}

pub(crate) fn assignment(id: &str, teacher: &str, group: &str, hours: u32) -> TeachingAssignment {
    TeachingAssignment {
        id: AssignmentId::new(id),
        term: term(),
        career: None,
        teacher: TeacherId::new(teacher),
        subject_group: SubjectGroupId::new(format!("sg-{id}")),
        subject: format!("Subject {id}"),
        subject_kind: SubjectKind::Theoretical,
        group: GroupId::new(group),
        required_hours: hours,
        active: true,
    }
}

pub(crate) fn slot(
    id: &str,
    assignment: &TeachingAssignment,
    room: &str,
    weekday: Weekday,
    block: &str,
) -> ScheduledSlot {
    ScheduledSlot {
        id: SlotId::new(id),
        term: assignment.term.clone(),
        assignment: assignment.id.clone(),
        teacher: assignment.teacher.clone(),
        group: assignment.group.clone(),
        room: Some(RoomId::new(room)),
        weekday: Some(weekday),
        block: Some(BlockId::new(block)),
        kind: Some(ClassKind::Theoretical),
        state: SlotState::Draft,
        active: true,
    }
}

pub(crate) fn lookup(
    blocks: Vec<TimeBlock>,
    rooms: Vec<Room>,
    groups: Vec<Group>,
    assignments: Vec<TeachingAssignment>,
) -> Lookup {
    Lookup::from_parts(term(), grid(blocks), rooms, groups, assignments)
}

/// Monday to Friday only, so Saturday patterns never apply.
pub(crate) fn weekday_lookup(
    blocks: Vec<TimeBlock>,
    rooms: Vec<Room>,
    groups: Vec<Group>,
    assignments: Vec<TeachingAssignment>,
) -> Lookup {
    let mut grid = grid(blocks);
    grid.weekdays.retain(|d| *d != Weekday::Sat);
    Lookup::from_parts(term(), grid, rooms, groups, assignments)
}

/// Transaction over a plain vector; commit is a no-op.
#[derive(Debug)]
pub(crate) struct VecTx {
    pub term: TermId,
    pub slots: Vec<ScheduledSlot>,
    pub fail_inserts: bool,
}

impl VecTx {
    pub fn new(slots: Vec<ScheduledSlot>) -> Self {
        Self {
            term: term(),
            slots,
            fail_inserts: false,
        }
    }
}

impl SlotTransaction for VecTx {
    fn term(&self) -> &TermId {
        &self.term
    }

    fn list_slots(&self) -> Result<Vec<ScheduledSlot>, RepositoryError> {
        Ok(self.slots.clone())
    }

    fn insert(&mut self, slot: NewSlot) -> Result<ScheduledSlot, RepositoryError> {
        if self.fail_inserts {
            return Err(RepositoryError::Unavailable("insert refused".into()));
        }
        let stored = slot.into_slot(SlotId::new(format!("s{}", self.slots.len() + 1)));
        self.slots.push(stored.clone());
        Ok(stored)
    }

    fn update_state(&mut self, id: &SlotId, state: SlotState) -> Result<(), RepositoryError> {
        let slot = self
            .slots
            .iter_mut()
            .find(|s| &s.id == id)
            .ok_or_else(|| RepositoryError::SlotNotFound(id.clone()))?;
        slot.state = state;
        Ok(())
    }

    fn save(&mut self, slot: &ScheduledSlot) -> Result<(), RepositoryError> {
        let stored = self
            .slots
            .iter_mut()
            .find(|s| s.id == slot.id)
            .ok_or_else(|| RepositoryError::SlotNotFound(slot.id.clone()))?;
        *stored = slot.clone();
        Ok(())
    }

    fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        Ok(())
    }
}
