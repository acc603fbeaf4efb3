//! Per-user settings aggregate owned by the host

use crate::discovery::{DiscoveryState, DomainBoard};
use crate::skills::SkillsLedger;
use serde::{Deserialize, Serialize};

/// Everything the engine mutates for one user
///
/// `discovery` stays `None` until the first discovery call so that older
/// settings blobs can be told apart from users who simply answered nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub domains: DomainBoard,
    pub discovery: Option<DiscoveryState>,
    pub skills: SkillsLedger,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discovery state, created on first access
    pub fn discovery_mut(&mut self) -> &mut DiscoveryState {
        self.discovery.get_or_insert_with(DiscoveryState::new)
    }

    /// Disjoint borrows for building a tracker
    pub fn discovery_parts(&mut self) -> (&mut DiscoveryState, &mut DomainBoard) {
        let discovery = self.discovery.get_or_insert_with(DiscoveryState::new);
        (discovery, &mut self.domains)
    }
}
