//! Field trial registry port
//!
//! Exposes the experiment groups this process instance was assigned to.

use serde::{Deserialize, Serialize};

/// Hashed experiment name paired with the hashed group it was assigned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NameGroupId {
    pub name: u32,
    pub group: u32,
}

impl NameGroupId {
    pub fn new(name: u32, group: u32) -> Self {
        Self { name, group }
    }
}

/// Port trait for the experiment registry
pub trait IFieldTrialRegistry {
    /// Captures the active trials in registration order
    ///
    /// The returned snapshot is owned by the caller and does not change if
    /// the registry changes afterwards.
    fn snapshot(&self) -> Vec<NameGroupId>;
}

/// A fixed set of trials, for callers without a live registry
impl IFieldTrialRegistry for Vec<NameGroupId> {
    fn snapshot(&self) -> Vec<NameGroupId> {
        self.clone()
    }
}
