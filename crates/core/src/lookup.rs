use std::collections::HashMap;

use types::{
    AssignmentId, BlockId, ClassKind, Group, GroupId, NewSlot, Room, RoomId, SlotCandidate,
    SlotState, TeacherId, TeachingAssignment, TermId, TimeBlock, TimeGrid, Weekday,
};

use crate::error::ValidationError;
use crate::ports::{AssignmentCatalog, CatalogError, RoomCatalog, RoomFilter};

/// Reference data for one term, loaded once per operation and passed down
/// explicitly.
#[derive(Clone, Debug)]
pub struct Lookup {
    term: TermId,
    grid: TimeGrid,
    rooms: HashMap<RoomId, Room>,
    groups: HashMap<GroupId, Group>,
    blocks: HashMap<BlockId, TimeBlock>,
    assignments: HashMap<AssignmentId, TeachingAssignment>,
}

impl Lookup {
    pub fn load<C>(catalog: &C, grid: &TimeGrid, term: &TermId) -> Result<Self, CatalogError>
    where
        C: RoomCatalog + AssignmentCatalog + ?Sized,
    {
        Ok(Self::from_parts(
            term.clone(),
            grid.clone(),
            catalog.list_rooms(RoomFilter::all())?,
            catalog.list_groups()?,
            catalog.list_assignments(term)?,
        ))
    }

    pub fn from_parts(
        term: TermId,
        grid: TimeGrid,
        rooms: Vec<Room>,
        groups: Vec<Group>,
        assignments: Vec<TeachingAssignment>,
    ) -> Self {
        let blocks = grid
            .blocks
            .iter()
            .map(|b| (b.id.clone(), b.clone()))
            .collect();
        Self {
            term,
            grid,
            rooms: rooms.into_iter().map(|r| (r.id.clone(), r)).collect(),
            groups: groups.into_iter().map(|g| (g.id.clone(), g)).collect(),
            blocks,
            assignments: assignments
                .into_iter()
                .map(|a| (a.id.clone(), a))
                .collect(),
        }
    }

    pub fn term(&self) -> &TermId {
        &self.term
    }

    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    pub fn room(&self, id: &RoomId) -> Option<&Room> {
        self.rooms.get(id)
    }

    pub fn group(&self, id: &GroupId) -> Option<&Group> {
        self.groups.get(id)
    }

    pub fn block(&self, id: &BlockId) -> Option<&TimeBlock> {
        self.blocks.get(id)
    }

    pub fn assignment(&self, id: &AssignmentId) -> Option<&TeachingAssignment> {
        self.assignments.get(id)
    }

    /// Whether any assignment of the term belongs to the teacher.
    pub fn teaches(&self, teacher: &TeacherId) -> bool {
        self.assignments.values().any(|a| &a.teacher == teacher)
    }

    pub fn group_name(&self, id: &GroupId) -> String {
        self.group(id)
            .map(|g| g.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Resolves every id of the candidate against this term's reference data.
    pub fn resolve(&self, candidate: &SlotCandidate) -> Result<Placement<'_>, ValidationError> {
        let assignment = self
            .assignment(&candidate.assignment)
            .ok_or_else(|| ValidationError::UnknownAssignment(candidate.assignment.clone()))?;
        if assignment.term != self.term {
            return Err(ValidationError::TermMismatch {
                assignment: assignment.id.clone(),
                expected: self.term.clone(),
                found: assignment.term.clone(),
            });
        }
        let group = self
            .group(&assignment.group)
            .ok_or_else(|| ValidationError::UnknownGroup(assignment.group.clone()))?;
        let room = self
            .room(&candidate.room)
            .ok_or_else(|| ValidationError::UnknownRoom(candidate.room.clone()))?;
        let block = self
            .block(&candidate.block)
            .ok_or_else(|| ValidationError::UnknownBlock(candidate.block.clone()))?;
        Ok(Placement {
            assignment,
            group,
            room,
            block,
            weekday: candidate.weekday,
            kind: candidate.kind.unwrap_or_else(|| assignment.class_kind()),
        })
    }
}

/// A candidate whose ids all resolved.
#[derive(Clone, Copy, Debug)]
pub struct Placement<'a> {
    pub assignment: &'a TeachingAssignment,
    pub group: &'a Group,
    pub room: &'a Room,
    pub block: &'a TimeBlock,
    pub weekday: Weekday,
    pub kind: ClassKind,
}

impl Placement<'_> {
    pub fn draft(&self) -> NewSlot {
        NewSlot {
            term: self.assignment.term.clone(),
            assignment: self.assignment.id.clone(),
            teacher: self.assignment.teacher.clone(),
            group: self.assignment.group.clone(),
            room: self.room.id.clone(),
            weekday: self.weekday,
            block: self.block.id.clone(),
            kind: self.kind,
            state: SlotState::Draft,
        }
    }
}
