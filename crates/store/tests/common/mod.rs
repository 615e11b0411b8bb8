#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveTime;
use sched_core::{EngineSettings, ScheduleService};
use store::{CatalogSnapshot, InMemCatalog, InMemSchedule, MemoryAudit};
use types::{
    AssignmentId, BlockId, Career, CareerId, Group, GroupId, Room, RoomId, RoomType,
    SubjectGroupId, SubjectKind, TeacherId, TeachingAssignment, Term, TermId, TimeBlock, Weekday,
};

pub const TERM: &str = "2025-2";

pub type Service = ScheduleService<InMemSchedule, InMemCatalog, MemoryAudit>;

pub struct Harness {
    pub service: Service,
    pub repo: Arc<InMemSchedule>,
    pub catalog: Arc<InMemCatalog>,
    pub audit: Arc<MemoryAudit>,
}

pub fn term() -> TermId {
    TermId::new(TERM)
}

pub fn block(id: &str, hour: u32, minutes: u32) -> TimeBlock {
    let start = NaiveTime::from_hms_opt(hour, 0, 0).unwrap();
    TimeBlock {
        id: BlockId::new(id),
        name: format!("{hour:02}:00"),
        start,
        end: start + chrono::Duration::minutes(i64::from(minutes)),
        minutes,
        active: true,
    }
}

pub fn room(id: &str, capacity: u32, room_type: RoomType) -> Room {
    Room {
        id: RoomId::new(id),
        name: format!("Room {id}"),
        capacity,
        room_type,
        maintenance: false,
        active: true,
    }
}

pub fn group(id: &str, capacity: u32) -> Group {
    Group {
        id: GroupId::new(id),
        name: format!("Group {id}"),
        capacity,
    }
}

pub fn assignment(
    id: &str,
    career: &str,
    teacher: &str,
    group: &str,
    hours: u32,
    kind: SubjectKind,
) -> TeachingAssignment {
    TeachingAssignment {
        id: AssignmentId::new(id),
        term: term(),
        career: Some(CareerId::new(career)),
        teacher: TeacherId::new(teacher),
        subject_group: SubjectGroupId::new(format!("SG-{id}")),
        subject: format!("Subject {id}"),
        subject_kind: kind,
        group: GroupId::new(group),
        required_hours: hours,
        active: true,
    }
}

/// Three assignments that all fit: A1 (6h, T1, G1), A2 (4h lab, T2, G2) and
/// A3 (4h, T1, G3).
pub fn snapshot() -> CatalogSnapshot {
    let mut maintenance = room("M1", 100, RoomType::Auditorium);
    maintenance.maintenance = true;
    CatalogSnapshot {
        terms: vec![
            Term {
                id: TermId::new("2025-1"),
                year: 2025,
                semester: 1,
                active: false,
            },
            Term {
                id: term(),
                year: 2025,
                semester: 2,
                active: true,
            },
        ],
        careers: vec![
            Career {
                id: CareerId::new("SYS"),
                name: "Systems".into(),
                code: None,
            },
            Career {
                id: CareerId::new("MED"),
                name: "Medicine".into(),
                code: None,
            },
        ],
        groups: vec![group("G1", 30), group("G2", 25), group("G3", 40)],
        rooms: vec![
            room("R1", 30, RoomType::Classroom),
            room("R2", 45, RoomType::Classroom),
            room("L1", 30, RoomType::Laboratory),
            maintenance,
        ],
        blocks: vec![block("B1", 7, 120), block("B2", 9, 120), block("B3", 11, 90)],
        weekdays: Weekday::ALL[..6].to_vec(),
        assignments: vec![
            assignment("A1", "SYS", "T1", "G1", 6, SubjectKind::Theoretical),
            assignment("A2", "SYS", "T2", "G2", 4, SubjectKind::Laboratory),
            assignment("A3", "MED", "T1", "G3", 4, SubjectKind::Theoretical),
        ],
        slots: Vec::new(),
    }
}

pub fn harness_with(
    snapshot: CatalogSnapshot,
    audit: MemoryAudit,
    settings: EngineSettings,
) -> Harness {
    let repo = Arc::new(InMemSchedule::with_slots(snapshot.slots.clone()));
    let grid = snapshot.grid();
    let catalog = Arc::new(InMemCatalog::new(snapshot));
    let audit = Arc::new(audit);
    let service = ScheduleService::new(
        repo.clone(),
        catalog.clone(),
        audit.clone(),
        grid,
        settings,
    );
    Harness {
        service,
        repo,
        catalog,
        audit,
    }
}

pub fn harness() -> Harness {
    harness_with(snapshot(), MemoryAudit::new(), EngineSettings::default())
}
