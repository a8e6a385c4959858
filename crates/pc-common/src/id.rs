//! Config instance identity.
//!
//! Every tracked config owns a `ConfigId` for its whole lifetime. The id keys
//! the provenance ledger, so two live configs never share one. Ids are
//! allocated from a process-wide counter and are never reused.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one live config instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigId(pub u64);

impl ConfigId {
    /// Allocate a fresh identity.
    pub fn next() -> Self {
        ConfigId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ConfigId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cfg-{}", self.0)
    }
}
