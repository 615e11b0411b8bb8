use std::sync::Arc;

use http::HeaderMap;
use sched_core::{ScheduleError, ScheduleService};
use store::{CatalogSnapshot, InMemCatalog, InMemSchedule, LoadError, TracingAudit};
use types::ActorId;

use crate::config::AppConfig;
use crate::error::ApiError;

pub type Service = ScheduleService<InMemSchedule, InMemCatalog, TracingAudit>;

pub const ACTOR_HEADER: &str = "x-actor-id";

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<Service>,
}

impl AppState {
    pub fn new(service: Service) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    /// Builds the service over the configured catalog snapshot, seeding the
    /// schedule with any slots the snapshot carries.
    pub fn from_config(config: &AppConfig) -> Result<Self, LoadError> {
        let snapshot = match &config.catalog {
            Some(path) => CatalogSnapshot::from_path(path)?,
            None => CatalogSnapshot::default(),
        };
        Ok(Self::from_snapshot(snapshot, config))
    }

    pub fn from_snapshot(mut snapshot: CatalogSnapshot, config: &AppConfig) -> Self {
        let grid = snapshot.grid();
        let repository = InMemSchedule::with_slots(std::mem::take(&mut snapshot.slots));
        Self::new(ScheduleService::new(
            Arc::new(repository),
            Arc::new(InMemCatalog::new(snapshot)),
            Arc::new(TracingAudit),
            grid,
            config.engine.clone(),
        ))
    }

    /// Runs a service call on the blocking pool; the engine is synchronous.
    pub async fn run<T, F>(&self, call: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&Service) -> Result<T, ScheduleError> + Send + 'static,
    {
        let service = self.service.clone();
        Ok(tokio::task::spawn_blocking(move || call(&service)).await??)
    }
}

/// The caller named in `x-actor-id`, if any.
pub fn actor(headers: &HeaderMap) -> Option<ActorId> {
    headers
        .get(ACTOR_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ActorId::new)
}
