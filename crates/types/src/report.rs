use chrono::NaiveTime;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    AssignmentId, BlockId, CareerId, ClassKind, GroupId, RoomId, RoomType, SlotId, SlotState,
    TeacherId, TermId, Weekday,
};

/// How far an assignment got towards its weekly hours.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Completion {
    Completed,
    Partial,
    Failed,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlacedSlot {
    pub slot_id: SlotId,
    pub weekday: Weekday,
    pub block: BlockId,
    pub block_name: String,
    pub room: RoomId,
    pub room_name: String,
    pub hours: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AllocationResult {
    pub assignment: AssignmentId,
    pub subject: String,
    pub group: String,
    pub required_hours: u32,
    pub placed_hours: f64,
    pub completion: Completion,
    pub percentage: f64,
    pub slots: Vec<PlacedSlot>,
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FailureReason {
    /// No active, maintenance-free room of the right type fits the group.
    #[serde(rename_all = "camelCase")]
    NoEligibleRoom { required_capacity: u32 },
    /// Strategies ran out before the weekly hours were reached.
    #[serde(rename_all = "camelCase")]
    InsufficientPlacement { placed_hours: f64, required_hours: u32 },
    /// The assignment asks for zero weekly hours.
    NoRequiredHours,
    /// The assignment's group is not in the catalog.
    #[serde(rename_all = "camelCase")]
    UnknownGroup { group: GroupId },
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::NoEligibleRoom { required_capacity } => write!(
                f,
                "no eligible room with capacity >= {required_capacity}"
            ),
            FailureReason::InsufficientPlacement {
                placed_hours,
                required_hours,
            } => write!(
                f,
                "only {placed_hours} of {required_hours} required hours were placed"
            ),
            FailureReason::NoRequiredHours => f.write_str("assignment requires no weekly hours"),
            FailureReason::UnknownGroup { group } => write!(f, "group {group} is not in the catalog"),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AllocationFailure {
    pub assignment: AssignmentId,
    pub subject: String,
    pub group: String,
    #[schema(value_type = Object)]
    pub reason: FailureReason,
    pub message: String,
    pub required_hours: u32,
    pub placed_hours: f64,
    pub partial_slots: Vec<PlacedSlot>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub success_rate: f64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq)]
pub struct GenerationDetails {
    pub succeeded: Vec<AllocationResult>,
    pub failed: Vec<AllocationFailure>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq)]
pub struct GenerationReport {
    pub summary: GenerationSummary,
    pub details: GenerationDetails,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalReport {
    pub term: TermId,
    pub approved: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublishReport {
    pub term: TermId,
    pub published: usize,
    pub teachers_affected: usize,
    pub assignments_covered: usize,
}

/// An approved slot that cannot be published as stored.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IncompleteSlot {
    pub slot: SlotId,
    pub assignment: AssignmentId,
    pub subject: Option<String>,
    pub group: GroupId,
    pub problems: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UnscheduledAssignment {
    pub assignment: AssignmentId,
    pub subject: String,
    pub group: GroupId,
    pub teacher: TeacherId,
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(tag = "by", content = "id", rename_all = "lowercase")]
pub enum GridFilter {
    Career(CareerId),
    Teacher(TeacherId),
    Group(GroupId),
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GridEntry {
    pub slot: SlotId,
    pub assignment: AssignmentId,
    pub subject: String,
    pub group: String,
    pub teacher: TeacherId,
    pub room: Option<RoomId>,
    pub room_name: Option<String>,
    pub room_type: Option<RoomType>,
    pub room_capacity: Option<u32>,
    pub kind: Option<ClassKind>,
    pub state: SlotState,
    #[schema(value_type = Option<String>)]
    pub start: Option<NaiveTime>,
    #[schema(value_type = Option<String>)]
    pub end: Option<NaiveTime>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GridCell {
    pub block: BlockId,
    pub block_name: String,
    pub entries: Vec<GridEntry>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GridDay {
    pub weekday: Weekday,
    pub cells: Vec<GridCell>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyGrid {
    pub term: TermId,
    pub term_label: String,
    #[schema(value_type = Option<Object>)]
    pub filter: Option<GridFilter>,
    pub total_slots: usize,
    pub days: Vec<GridDay>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TeacherWorkload {
    pub teacher: TeacherId,
    pub term: TermId,
    pub term_label: String,
    pub total_slots: usize,
    pub weekly_hours: f64,
    pub distinct_subjects: usize,
    pub grid: Vec<GridDay>,
}
