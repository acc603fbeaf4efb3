//! Life domains and their scores

use crate::core::types::DomainId;
use serde::{Deserialize, Serialize};

/// One life area with its current 0-100 score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub id: DomainId,
    pub name: String,
    pub icon: String,
    pub score: u8,
}

impl Domain {
    pub fn new(id: DomainId, score: u8) -> Self {
        Self {
            id,
            name: id.display_name().to_string(),
            icon: id.icon().to_string(),
            score: score.min(100),
        }
    }
}

/// The user's full set of domains
///
/// Created from the fixed catalog on first run; domains are never removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DomainBoard {
    domains: Vec<Domain>,
}

impl DomainBoard {
    /// Every catalog domain at the starting score
    pub fn from_catalog(default_score: u8) -> Self {
        Self {
            domains: DomainId::ALL
                .iter()
                .map(|id| Domain::new(*id, default_score))
                .collect(),
        }
    }

    /// Add catalog domains missing from an older saved board
    pub fn ensure_catalog(&mut self, default_score: u8) {
        for id in DomainId::ALL {
            if self.get(id).is_none() {
                self.domains.push(Domain::new(id, default_score));
            }
        }
    }

    pub fn get(&self, id: DomainId) -> Option<&Domain> {
        self.domains.iter().find(|d| d.id == id)
    }

    pub fn score_of(&self, id: DomainId) -> Option<u8> {
        self.get(id).map(|d| d.score)
    }

    /// Set a domain's score, adding the domain if it is missing
    pub(crate) fn set_score(&mut self, id: DomainId, score: u8) {
        let score = score.min(100);
        match self.domains.iter_mut().find(|d| d.id == id) {
            Some(domain) => domain.score = score,
            None => self.domains.push(Domain::new(id, score)),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Domain> {
        self.domains.iter()
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

impl Default for DomainBoard {
    fn default() -> Self {
        Self::from_catalog(50)
    }
}
