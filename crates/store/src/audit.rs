use parking_lot::Mutex;
use sched_core::{AuditError, AuditSink};
use serde::Serialize;
use tracing::info;
use types::ActorId;

/// Writes every audit record as a structured `audit` event.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingAudit;

impl AuditSink for TracingAudit {
    fn record(
        &self,
        action: &str,
        description: &str,
        actor: Option<&ActorId>,
    ) -> Result<(), AuditError> {
        info!(
            target: "audit",
            action,
            actor = actor.map(ActorId::as_str).unwrap_or("system"),
            "{description}"
        );
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AuditEntry {
    pub action: String,
    pub description: String,
    pub actor: Option<ActorId>,
}

/// Keeps records in memory; can be switched to refuse every write.
#[derive(Debug, Default)]
pub struct MemoryAudit {
    entries: Mutex<Vec<AuditEntry>>,
    unavailable: bool,
}

impl MemoryAudit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            entries: Mutex::default(),
            unavailable: true,
        }
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().clone()
    }
}

impl AuditSink for MemoryAudit {
    fn record(
        &self,
        action: &str,
        description: &str,
        actor: Option<&ActorId>,
    ) -> Result<(), AuditError> {
        if self.unavailable {
            return Err(AuditError::Unavailable("audit log offline".into()));
        }
        self.entries.lock().push(AuditEntry {
            action: action.to_string(),
            description: description.to_string(),
            actor: actor.cloned(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_audit_keeps_entries_in_order() {
        let audit = MemoryAudit::new();
        audit.record("approve", "approved 3", None).unwrap();
        audit
            .record("publish", "published 3", Some(&ActorId::new("u1")))
            .unwrap();

        let actions: Vec<_> = audit.entries().into_iter().map(|e| e.action).collect();
        assert_eq!(actions, vec!["approve", "publish"]);
    }

    #[test]
    fn failing_audit_refuses_writes() {
        let audit = MemoryAudit::failing();
        assert!(audit.record("approve", "x", None).is_err());
        assert!(audit.entries().is_empty());
        assert!(TracingAudit.record("approve", "x", None).is_ok());
    }
}
