use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

/// Tracks which applications currently have a write in flight.
///
/// At most one turn (or submission) per application is allowed at a time;
/// a second concurrent caller is refused instead of queued. The permit is
/// released when dropped, including on early return.
#[derive(Clone, Debug, Default)]
pub struct TurnGuard {
    in_flight: Arc<Mutex<HashSet<Uuid>>>,
}

#[derive(Debug)]
pub struct TurnPermit {
    application_id: Uuid,
    in_flight: Arc<Mutex<HashSet<Uuid>>>,
}

impl TurnGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self, application_id: Uuid) -> Option<TurnPermit> {
        let mut set = lock(&self.in_flight);
        if !set.insert(application_id) {
            return None;
        }
        Some(TurnPermit {
            application_id,
            in_flight: Arc::clone(&self.in_flight),
        })
    }
}

impl Drop for TurnPermit {
    fn drop(&mut self) {
        lock(&self.in_flight).remove(&self.application_id);
    }
}

fn lock(set: &Mutex<HashSet<Uuid>>) -> MutexGuard<'_, HashSet<Uuid>> {
    set.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
