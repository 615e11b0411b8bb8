use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use sched_core::{RepositoryError, ScheduleRepository, SlotTransaction};
use tracing::debug;
use types::{NewSlot, ScheduledSlot, SlotId, SlotState, TermId};

/// Slots grouped by term. Writers work on a private copy of their term and
/// publish it on commit; at most one writer per term at a time.
#[derive(Clone, Default)]
pub struct InMemSchedule {
    inner: Arc<RwLock<BTreeMap<TermId, Vec<ScheduledSlot>>>>,
    locks: Arc<Mutex<HashSet<TermId>>>,
}

impl InMemSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slots(slots: impl IntoIterator<Item = ScheduledSlot>) -> Self {
        let mut by_term: BTreeMap<TermId, Vec<ScheduledSlot>> = BTreeMap::new();
        for slot in slots {
            by_term.entry(slot.term.clone()).or_default().push(slot);
        }
        Self {
            inner: Arc::new(RwLock::new(by_term)),
            locks: Default::default(),
        }
    }

    pub fn is_locked(&self, term: &TermId) -> bool {
        self.locks.lock().contains(term)
    }
}

impl ScheduleRepository for InMemSchedule {
    fn begin(&self, term: &TermId) -> Result<Box<dyn SlotTransaction + '_>, RepositoryError> {
        if !self.locks.lock().insert(term.clone()) {
            return Err(RepositoryError::TermBusy(term.clone()));
        }
        let working = self.inner.read().get(term).cloned().unwrap_or_default();
        Ok(Box::new(InMemTx {
            store: self,
            term: term.clone(),
            working,
            committed: false,
        }))
    }

    fn find_slot(&self, id: &SlotId) -> Result<Option<ScheduledSlot>, RepositoryError> {
        Ok(self
            .inner
            .read()
            .values()
            .flatten()
            .find(|s| &s.id == id)
            .cloned())
    }

    fn list_slots(&self, term: &TermId) -> Result<Vec<ScheduledSlot>, RepositoryError> {
        Ok(self.inner.read().get(term).cloned().unwrap_or_default())
    }
}

struct InMemTx<'a> {
    store: &'a InMemSchedule,
    term: TermId,
    working: Vec<ScheduledSlot>,
    committed: bool,
}

impl InMemTx<'_> {
    fn slot_mut(&mut self, id: &SlotId) -> Result<&mut ScheduledSlot, RepositoryError> {
        self.working
            .iter_mut()
            .find(|s| &s.id == id)
            .ok_or_else(|| RepositoryError::SlotNotFound(id.clone()))
    }
}

impl SlotTransaction for InMemTx<'_> {
    fn term(&self) -> &TermId {
        &self.term
    }

    fn list_slots(&self) -> Result<Vec<ScheduledSlot>, RepositoryError> {
        Ok(self.working.clone())
    }

    fn get(&self, id: &SlotId) -> Result<ScheduledSlot, RepositoryError> {
        self.working
            .iter()
            .find(|s| &s.id == id)
            .cloned()
            .ok_or_else(|| RepositoryError::SlotNotFound(id.clone()))
    }

    fn insert(&mut self, slot: NewSlot) -> Result<ScheduledSlot, RepositoryError> {
        if slot.term != self.term {
            return Err(RepositoryError::Unavailable(format!(
                "slot for term {} written through a transaction on {}",
                slot.term, self.term
            )));
        }
        let stored = slot.into_slot(SlotId::generate());
        self.working.push(stored.clone());
        Ok(stored)
    }

    fn update_state(&mut self, id: &SlotId, state: SlotState) -> Result<(), RepositoryError> {
        self.slot_mut(id)?.state = state;
        Ok(())
    }

    fn save(&mut self, slot: &ScheduledSlot) -> Result<(), RepositoryError> {
        *self.slot_mut(&slot.id)? = slot.clone();
        Ok(())
    }

    fn commit(mut self: Box<Self>) -> Result<(), RepositoryError> {
        let working = std::mem::take(&mut self.working);
        self.store.inner.write().insert(self.term.clone(), working);
        self.committed = true;
        Ok(())
    }
}

impl Drop for InMemTx<'_> {
    fn drop(&mut self) {
        if !self.committed {
            debug!(term = %self.term, "transaction rolled back");
        }
        self.store.locks.lock().remove(&self.term);
    }
}
