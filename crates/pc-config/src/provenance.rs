//! Provenance tracking for tracked configs.
//!
//! The ledger records, per live config, an ordered history of where its
//! contents came from (`"dict"` for in-memory data, an absolute path for
//! files) and whether each step set or updated them.
//!
//! The ledger is keyed by [`ConfigId`], not stored inside the config, so the
//! config's own key space only ever holds user keys. Entries are removed when
//! the config is dropped; an id is never reused, but a dropped config must
//! still leave no trace or the ledger would grow with every config ever made.
//!
//! # Bookkeeping
//!
//! ```text
//! records:  ConfigId -> [Provenance, ...]   enabled configs only
//! enabled:  {ConfigId}                      enabled configs only
//! disabled: {ConfigId}                      configs that opted out
//! ```

use pc_common::ConfigId;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;
use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};
use tracing::trace;

/// Source label for in-memory data.
pub const DICT_SOURCE: &str = "dict";

/// What a provenance step did to the config's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvenanceOp {
    /// Contents were (re)established from the source.
    Set,
    /// Contents from the source were merged in.
    Update,
}

impl fmt::Display for ProvenanceOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvenanceOp::Set => write!(f, "set"),
            ProvenanceOp::Update => write!(f, "update"),
        }
    }
}

/// One step in a config's history.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Provenance {
    pub source: String,
    pub operation: ProvenanceOp,
}

impl Provenance {
    pub fn new(source: impl Into<String>, operation: ProvenanceOp) -> Self {
        Self {
            source: source.into(),
            operation,
        }
    }

    /// A step sourced from in-memory data.
    pub fn dict(operation: ProvenanceOp) -> Self {
        Self::new(DICT_SOURCE, operation)
    }

    /// A step sourced from a file.
    pub fn file(path: &Path, operation: ProvenanceOp) -> Self {
        Self::new(path.display().to_string(), operation)
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} from {}", self.operation, self.source)
    }
}

#[derive(Debug, Default)]
struct LedgerState {
    records: HashMap<ConfigId, Vec<Provenance>>,
    enabled: HashSet<ConfigId>,
    disabled: HashSet<ConfigId>,
}

impl LedgerState {
    fn is_enabled(&self, id: ConfigId) -> bool {
        !self.disabled.contains(&id)
    }

    fn history_mut(&mut self, id: ConfigId) -> Option<&mut Vec<Provenance>> {
        if !self.is_enabled(id) {
            return None;
        }
        self.enabled.insert(id);
        Some(self.records.entry(id).or_default())
    }
}

/// Registry of provenance histories for live configs.
///
/// Every operation takes the internal lock once, so the ledger can be shared
/// across threads.
#[derive(Debug, Default)]
pub struct ProvenanceLedger {
    state: Mutex<LedgerState>,
}

static LEDGER: LazyLock<ProvenanceLedger> = LazyLock::new(ProvenanceLedger::new);

/// The process-wide ledger used by every [`Config`](crate::Config).
pub fn ledger() -> &'static ProvenanceLedger {
    &LEDGER
}

impl ProvenanceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enable or disable tracking for `id`. Disabling drops any history.
    pub fn set_enabled(&self, id: ConfigId, enabled: bool) {
        let mut state = self.lock();
        if enabled {
            state.disabled.remove(&id);
            state.enabled.insert(id);
            state.records.entry(id).or_default();
        } else {
            state.enabled.remove(&id);
            state.records.remove(&id);
            state.disabled.insert(id);
        }
    }

    /// Tracking is on unless `id` opted out.
    pub fn is_enabled(&self, id: ConfigId) -> bool {
        self.lock().is_enabled(id)
    }

    /// Append one step. No-op when tracking is disabled.
    pub fn append(&self, id: ConfigId, record: Provenance) {
        if let Some(history) = self.lock().history_mut(id) {
            trace!(config = %id, %record, "provenance appended");
            history.push(record);
        }
    }

    /// Replace the whole history with a single step.
    pub fn set(&self, id: ConfigId, record: Provenance) {
        if let Some(history) = self.lock().history_mut(id) {
            history.clear();
            history.push(record);
        }
    }

    /// The history of `id`, empty when disabled or unknown.
    pub fn get(&self, id: ConfigId) -> Vec<Provenance> {
        self.lock().records.get(&id).cloned().unwrap_or_default()
    }

    /// Append a history taken from another config.
    pub fn extend(&self, id: ConfigId, records: impl IntoIterator<Item = Provenance>) {
        if let Some(history) = self.lock().history_mut(id) {
            history.extend(records);
        }
    }

    /// Remove every trace of `id`.
    pub fn delete(&self, id: ConfigId) {
        let mut state = self.lock();
        state.records.remove(&id);
        state.enabled.remove(&id);
        state.disabled.remove(&id);
    }

    /// Empty the history of `id` but keep its enabled flag.
    pub fn clear(&self, id: ConfigId) {
        if let Some(history) = self.lock().records.get_mut(&id) {
            history.clear();
        }
    }

    /// Whether the ledger holds anything at all for `id`.
    pub fn contains(&self, id: ConfigId) -> bool {
        let state = self.lock();
        state.records.contains_key(&id) || state.enabled.contains(&id) || state.disabled.contains(&id)
    }

    /// Whether `id` has a history entry (possibly empty).
    pub fn has_history(&self, id: ConfigId) -> bool {
        self.lock().records.contains_key(&id)
    }

    /// Whether `id` is registered in the enabled set.
    pub fn is_registered_enabled(&self, id: ConfigId) -> bool {
        self.lock().enabled.contains(&id)
    }

    /// Number of ids the ledger holds anything for.
    pub fn len(&self) -> usize {
        let state = self.lock();
        let mut ids: HashSet<ConfigId> = state.records.keys().copied().collect();
        ids.extend(state.enabled.iter().copied());
        ids.extend(state.disabled.iter().copied());
        ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
