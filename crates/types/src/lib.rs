pub mod report;

use chrono::NaiveTime;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

pub use report::*;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Clone,
            Debug,
            Serialize,
            Deserialize,
            ToSchema,
            JsonSchema,
            Eq,
            PartialEq,
            Ord,
            PartialOrd,
            Hash,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}
id_newtype!(TermId);
id_newtype!(CareerId);
id_newtype!(TeacherId);
id_newtype!(GroupId);
id_newtype!(SubjectGroupId);
id_newtype!(AssignmentId);
id_newtype!(RoomId);
id_newtype!(BlockId);
id_newtype!(SlotId);
id_newtype!(ActorId);

impl SlotId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

/// ISO weekday, Monday = 1 … Sunday = 7.
#[derive(
    Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Ord, PartialOrd, Hash,
)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    pub const fn code(self) -> u8 {
        match self {
            Weekday::Mon => 1,
            Weekday::Tue => 2,
            Weekday::Wed => 3,
            Weekday::Thu => 4,
            Weekday::Fri => 5,
            Weekday::Sat => 6,
            Weekday::Sun => 7,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|d| d.code() == code)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Weekday::Mon => "Monday",
            Weekday::Tue => "Tuesday",
            Weekday::Wed => "Wednesday",
            Weekday::Thu => "Thursday",
            Weekday::Fri => "Friday",
            Weekday::Sat => "Saturday",
            Weekday::Sun => "Sunday",
        }
    }

    /// Sunday is never offered to the automatic allocator.
    pub const fn auto_eligible(self) -> bool {
        !matches!(self, Weekday::Sun)
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    #[default]
    Classroom,
    Laboratory,
    Workshop,
    Auditorium,
}

impl RoomType {
    /// Laboratories and workshops host practical classes.
    pub const fn is_practical(self) -> bool {
        matches!(self, RoomType::Laboratory | RoomType::Workshop)
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RoomType::Classroom => "classroom",
            RoomType::Laboratory => "laboratory",
            RoomType::Workshop => "workshop",
            RoomType::Auditorium => "auditorium",
        })
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubjectKind {
    #[default]
    Theoretical,
    Practical,
    Laboratory,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    Theoretical,
    Practical,
}

impl SubjectKind {
    pub const fn needs_practical_room(self) -> bool {
        matches!(self, SubjectKind::Practical | SubjectKind::Laboratory)
    }

    pub const fn class_kind(self) -> ClassKind {
        if self.needs_practical_room() {
            ClassKind::Practical
        } else {
            ClassKind::Theoretical
        }
    }
}

/// Lifecycle of a scheduled slot.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum SlotState {
    #[default]
    Draft,
    Approved,
    Published,
    Cancelled,
}

impl SlotState {
    pub const fn as_str(self) -> &'static str {
        match self {
            SlotState::Draft => "draft",
            SlotState::Approved => "approved",
            SlotState::Published => "published",
            SlotState::Cancelled => "cancelled",
        }
    }

    /// Transitions allowed by the lifecycle:
    /// - Draft → Approved → Published
    /// - Draft | Approved → Cancelled
    /// - Published → Cancelled (explicit unpublish only)
    /// - Cancelled → Draft (reactivation)
    pub const fn can_transition_to(self, target: SlotState) -> bool {
        matches!(
            (self, target),
            (SlotState::Draft, SlotState::Approved)
                | (SlotState::Approved, SlotState::Published)
                | (SlotState::Draft, SlotState::Cancelled)
                | (SlotState::Approved, SlotState::Cancelled)
                | (SlotState::Published, SlotState::Cancelled)
                | (SlotState::Cancelled, SlotState::Draft)
        )
    }

    /// Placement fields may only be edited in these states.
    pub const fn is_mutable(self) -> bool {
        matches!(self, SlotState::Draft | SlotState::Approved)
    }
}

impl fmt::Display for SlotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
pub struct Term {
    pub id: TermId,
    pub year: u16,
    pub semester: u8,
    #[serde(default)]
    pub active: bool,
}

impl Term {
    pub fn label(&self) -> String {
        format!("{}-{}", self.year, self.semester)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Career {
    pub id: CareerId,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub capacity: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub capacity: u32,
    #[serde(default)]
    pub room_type: RoomType,
    #[serde(default)]
    pub maintenance: bool,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimeBlock {
    pub id: BlockId,
    pub name: String,
    #[schema(value_type = String, example = "07:00:00")]
    pub start: NaiveTime,
    #[schema(value_type = String, example = "08:30:00")]
    pub end: NaiveTime,
    pub minutes: u32,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl TimeBlock {
    pub fn hours(&self) -> f64 {
        f64::from(self.minutes) / 60.0
    }
}

/// Static weekday/block configuration the planner works against.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Default)]
pub struct TimeGrid {
    pub weekdays: Vec<Weekday>,
    pub blocks: Vec<TimeBlock>,
}

impl TimeGrid {
    pub fn new(weekdays: Vec<Weekday>, blocks: Vec<TimeBlock>) -> Self {
        Self { weekdays, blocks }
    }

    pub fn offers(&self, day: Weekday) -> bool {
        self.weekdays.contains(&day)
    }

    /// Active blocks ordered by start time; equal starts keep catalog order.
    pub fn ordered_blocks(&self) -> Vec<&TimeBlock> {
        let mut blocks: Vec<&TimeBlock> = self.blocks.iter().filter(|b| b.active).collect();
        blocks.sort_by_key(|b| b.start);
        blocks
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TeachingAssignment {
    pub id: AssignmentId,
    pub term: TermId,
    #[serde(default)]
    pub career: Option<CareerId>,
    pub teacher: TeacherId,
    pub subject_group: SubjectGroupId,
    pub subject: String,
    #[serde(default)]
    pub subject_kind: SubjectKind,
    pub group: GroupId,
    pub required_hours: u32,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl TeachingAssignment {
    pub fn needs_practical_room(&self) -> bool {
        self.subject_kind.needs_practical_room()
    }

    pub fn class_kind(&self) -> ClassKind {
        self.subject_kind.class_kind()
    }
}

/// A placed occupation of a teaching assignment.
///
/// Placement fields are optional in storage so that incomplete imported rows
/// can be represented; slots created by the engine always carry all four.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledSlot {
    pub id: SlotId,
    pub term: TermId,
    pub assignment: AssignmentId,
    pub teacher: TeacherId,
    pub group: GroupId,
    #[serde(default)]
    pub room: Option<RoomId>,
    #[serde(default)]
    pub weekday: Option<Weekday>,
    #[serde(default)]
    pub block: Option<BlockId>,
    #[serde(default)]
    pub kind: Option<ClassKind>,
    #[serde(default)]
    pub state: SlotState,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl ScheduledSlot {
    /// Whether the slot holds its teacher, group and room.
    pub fn occupies(&self) -> bool {
        self.active && self.state != SlotState::Cancelled
    }

    pub fn at(&self, weekday: Weekday, block: &BlockId) -> bool {
        self.weekday == Some(weekday) && self.block.as_ref() == Some(block)
    }

    /// Names of placement fields that are missing.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.room.is_none() {
            missing.push("room");
        }
        if self.weekday.is_none() {
            missing.push("weekday");
        }
        if self.block.is_none() {
            missing.push("block");
        }
        if self.kind.is_none() {
            missing.push("kind");
        }
        missing
    }
}

/// Slot data handed to the repository; the repository assigns the id.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewSlot {
    pub term: TermId,
    pub assignment: AssignmentId,
    pub teacher: TeacherId,
    pub group: GroupId,
    pub room: RoomId,
    pub weekday: Weekday,
    pub block: BlockId,
    pub kind: ClassKind,
    pub state: SlotState,
}

impl NewSlot {
    pub fn into_slot(self, id: SlotId) -> ScheduledSlot {
        ScheduledSlot {
            id,
            term: self.term,
            assignment: self.assignment,
            teacher: self.teacher,
            group: self.group,
            room: Some(self.room),
            weekday: Some(self.weekday),
            block: Some(self.block),
            kind: Some(self.kind),
            state: self.state,
            active: true,
        }
    }
}

/// Candidate tuple submitted for validation or manual placement.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SlotCandidate {
    pub assignment: AssignmentId,
    pub room: RoomId,
    pub weekday: Weekday,
    pub block: BlockId,
    #[serde(default)]
    pub kind: Option<ClassKind>,
}

/// Fields of a manual slot update; absent fields keep their stored value.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SlotPatch {
    #[serde(default)]
    pub room: Option<RoomId>,
    #[serde(default)]
    pub weekday: Option<Weekday>,
    #[serde(default)]
    pub block: Option<BlockId>,
    #[serde(default)]
    pub kind: Option<ClassKind>,
}
