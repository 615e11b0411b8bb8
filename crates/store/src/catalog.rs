use std::path::Path;

use parking_lot::RwLock;
use sched_core::{AssignmentCatalog, CatalogError, RoomCatalog, RoomFilter};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use types::{
    AssignmentId, Career, CareerId, Group, Room, ScheduledSlot, TeachingAssignment, Term, TermId,
    TimeBlock, TimeGrid, Weekday,
};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("catalog {path} is not valid JSON: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("catalog marks {0} terms as active; at most one may be")]
    SeveralActiveTerms(usize),
}

fn default_weekdays() -> Vec<Weekday> {
    Weekday::ALL
        .into_iter()
        .filter(|d| d.auto_eligible())
        .collect()
}

/// Everything the engine reads, as one serializable document.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub terms: Vec<Term>,
    #[serde(default)]
    pub careers: Vec<Career>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub blocks: Vec<TimeBlock>,
    #[serde(default = "default_weekdays")]
    pub weekdays: Vec<Weekday>,
    #[serde(default)]
    pub assignments: Vec<TeachingAssignment>,
    /// Slots already placed when the snapshot was taken.
    #[serde(default)]
    pub slots: Vec<ScheduledSlot>,
}

impl CatalogSnapshot {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let shown = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: shown.clone(),
            source,
        })?;
        let snapshot: Self = serde_json::from_str(&raw).map_err(|source| LoadError::Json {
            path: shown.clone(),
            source,
        })?;
        let active = snapshot.terms.iter().filter(|t| t.active).count();
        if active > 1 {
            return Err(LoadError::SeveralActiveTerms(active));
        }
        info!(
            path = %shown,
            rooms = snapshot.rooms.len(),
            assignments = snapshot.assignments.len(),
            "catalog loaded"
        );
        Ok(snapshot)
    }

    pub fn grid(&self) -> TimeGrid {
        TimeGrid::new(self.weekdays.clone(), self.blocks.clone())
    }
}

/// Read-only catalogs over a snapshot.
#[derive(Default)]
pub struct InMemCatalog {
    inner: RwLock<CatalogSnapshot>,
}

impl InMemCatalog {
    pub fn new(snapshot: CatalogSnapshot) -> Self {
        Self {
            inner: RwLock::new(snapshot),
        }
    }

    /// Replaces the room list, e.g. when a room goes into maintenance.
    pub fn set_rooms(&self, rooms: Vec<Room>) {
        self.inner.write().rooms = rooms;
    }
}

impl RoomCatalog for InMemCatalog {
    fn list_rooms(&self, filter: RoomFilter) -> Result<Vec<Room>, CatalogError> {
        Ok(self
            .inner
            .read()
            .rooms
            .iter()
            .filter(|r| filter.accepts(r))
            .cloned()
            .collect())
    }
}

impl AssignmentCatalog for InMemCatalog {
    fn find_term(&self, id: &TermId) -> Result<Option<Term>, CatalogError> {
        Ok(self.inner.read().terms.iter().find(|t| &t.id == id).cloned())
    }

    fn active_term(&self) -> Result<Option<Term>, CatalogError> {
        Ok(self.inner.read().terms.iter().find(|t| t.active).cloned())
    }

    fn career_exists(&self, id: &CareerId) -> Result<bool, CatalogError> {
        Ok(self.inner.read().careers.iter().any(|c| &c.id == id))
    }

    fn find_assignment(&self, id: &AssignmentId) -> Result<Option<TeachingAssignment>, CatalogError> {
        Ok(self
            .inner
            .read()
            .assignments
            .iter()
            .find(|a| &a.id == id)
            .cloned())
    }

    fn list_assignments(&self, term: &TermId) -> Result<Vec<TeachingAssignment>, CatalogError> {
        Ok(self
            .inner
            .read()
            .assignments
            .iter()
            .filter(|a| &a.term == term)
            .cloned()
            .collect())
    }

    fn list_groups(&self) -> Result<Vec<Group>, CatalogError> {
        Ok(self.inner.read().groups.clone())
    }
}
