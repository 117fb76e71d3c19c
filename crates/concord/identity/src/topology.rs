use crate::error::{IdentityError, Rejection};
use crate::history::History;
use crate::seed::IdentitySeed;
use crate::types::{HistoryEntry, IdentityState, KeyState};
use chrono::Utc;
use concord_types::ProposedChange;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, info, warn};

/// Owner of the identity state.
///
/// Reads clone the current `Arc` snapshot. Every mutation takes the writer
/// lock, builds the next state from the current one and publishes it in a
/// single swap, so readers never see a partial write.
pub struct IdentityTopology {
    current: RwLock<Arc<IdentityState>>,
    writer: Mutex<()>,
}

impl IdentityTopology {
    pub fn from_seed(seed: IdentitySeed) -> Result<Self, IdentityError> {
        seed.validate()?;
        let state = IdentityState {
            stable: seed.flexible.clone(),
            invariants: seed.invariants,
            flexible: seed.flexible,
            version: seed.version,
            history: History::new(),
            baselines: seed.baselines,
            repair_pending: BTreeSet::new(),
        };
        Ok(Self {
            current: RwLock::new(Arc::new(state)),
            writer: Mutex::new(()),
        })
    }

    pub fn snapshot(&self) -> Arc<IdentityState> {
        self.current.read().expect("lock not poisoned").clone()
    }

    pub fn version(&self) -> u64 {
        self.snapshot().version
    }

    /// Check a change against the current constraints without applying it.
    pub fn check(&self, change: &ProposedChange) -> Result<(), Rejection> {
        check_against(&self.snapshot(), change)
    }

    pub fn validate(&self, change: &ProposedChange) -> bool {
        self.check(change).is_ok()
    }

    /// Apply one change: set the flexible key, bump the version by one and
    /// append a history entry. A rejection leaves the state unchanged.
    pub fn apply(&self, change: &ProposedChange) -> Result<Arc<IdentityState>, Rejection> {
        let _guard = self.writer.lock().expect("lock not poisoned");
        let current = self.snapshot();
        debug!(key = %change.target, state = %KeyState::ProposalReceived, "identity change received");

        if let Err(rejection) = check_against(&current, change) {
            warn!(
                key = %change.target,
                origin = %change.origin,
                state = %KeyState::Rejected,
                reason = %rejection,
                "identity change rejected"
            );
            return Err(rejection);
        }

        let mut next = (*current).clone();
        let before = next
            .flexible
            .insert(change.target.clone(), change.value.clone())
            .unwrap_or(serde_json::Value::Null);
        next.version += 1;
        next.history.push(HistoryEntry {
            key: change.target.clone(),
            before,
            after: change.value.clone(),
            version: next.version,
            timestamp: Utc::now(),
            origin: change.origin,
            rationale: change.rationale.clone(),
        });
        if change.is_repair() {
            next.repair_pending.remove(&change.target);
        }

        let next = Arc::new(next);
        self.publish(next.clone());
        info!(
            key = %change.target,
            version = next.version,
            origin = %change.origin,
            state = %KeyState::Applied,
            "identity change applied"
        );
        Ok(next)
    }

    /// Flag a flexible key as awaiting a corrective change.
    pub fn mark_repair_pending(&self, key: &str) -> Result<(), Rejection> {
        let _guard = self.writer.lock().expect("lock not poisoned");
        let current = self.snapshot();
        if current.is_invariant(key) {
            return Err(Rejection::InvariantKey(key.to_string()));
        }
        if !current.is_flexible(key) {
            return Err(Rejection::UnknownRegion(key.to_string()));
        }
        if current.repair_pending.contains(key) {
            return Ok(());
        }
        let mut next = (*current).clone();
        next.repair_pending.insert(key.to_string());
        self.publish(Arc::new(next));
        debug!(key, state = %KeyState::RepairPending, "repair pending");
        Ok(())
    }

    /// Drop a pending repair without applying anything. Returns whether one was pending.
    pub fn clear_repair(&self, key: &str) -> bool {
        let _guard = self.writer.lock().expect("lock not poisoned");
        let current = self.snapshot();
        if !current.repair_pending.contains(key) {
            return false;
        }
        let mut next = (*current).clone();
        next.repair_pending.remove(key);
        self.publish(Arc::new(next));
        true
    }

    /// Resting state of a flexible key; `None` for invariant or unknown keys.
    pub fn key_state(&self, key: &str) -> Option<KeyState> {
        let state = self.snapshot();
        if !state.is_flexible(key) {
            return None;
        }
        if state.repair_pending.contains(key) {
            Some(KeyState::RepairPending)
        } else {
            Some(KeyState::Stable)
        }
    }

    /// Promote the current flexible values to last-known-stable.
    pub fn checkpoint_stable(&self) {
        let _guard = self.writer.lock().expect("lock not poisoned");
        let current = self.snapshot();
        if current.stable == current.flexible {
            return;
        }
        let mut next = (*current).clone();
        next.stable = next.flexible.clone();
        self.publish(Arc::new(next));
        debug!(version = current.version, "stable checkpoint recorded");
    }

    fn publish(&self, next: Arc<IdentityState>) {
        *self.current.write().expect("lock not poisoned") = next;
    }
}

fn check_against(state: &IdentityState, change: &ProposedChange) -> Result<(), Rejection> {
    if change.target.trim().is_empty() {
        return Err(Rejection::BlankTarget);
    }
    if state.is_invariant(&change.target) {
        return Err(Rejection::InvariantKey(change.target.clone()));
    }
    if !state.is_flexible(&change.target) {
        return Err(Rejection::UnknownRegion(change.target.clone()));
    }
    Ok(())
}

impl std::fmt::Debug for IdentityTopology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.snapshot();
        f.debug_struct("IdentityTopology")
            .field("version", &state.version)
            .field("flexible", &state.flexible.len())
            .field("invariants", &state.invariants.len())
            .finish()
    }
}
