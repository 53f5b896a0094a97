//! Aggregator: per-repository, per-action event counts.
//!
//! [`RepoCounts`] remembers the order in which repositories were first seen so
//! that downstream rendering is deterministic before sorting. Lookups of
//! actions that never occurred yield zero rather than an absent value.

use std::collections::HashMap;

use crate::{AuditEvent, RepositoryId};

// ---------------------------------------------------------------------------
// Per-repository counts
// ---------------------------------------------------------------------------

/// Occurrence counts for each action observed against one repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionCounts(HashMap<String, u64>);

impl ActionCounts {
    /// Returns how often `action` occurred, or `0` if it never did.
    pub fn get(&self, action: &str) -> u64 {
        self.0.get(action).copied().unwrap_or(0)
    }

    fn increment(&mut self, action: &str) {
        *self.0.entry(action.to_owned()).or_insert(0) += 1;
    }
}

// ---------------------------------------------------------------------------
// Whole-run counts
// ---------------------------------------------------------------------------

/// Mapping from repository full name to its [`ActionCounts`].
///
/// Iteration yields repositories in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct RepoCounts {
    entries: Vec<(RepositoryId, ActionCounts)>,
    index: HashMap<RepositoryId, usize>,
}

impl RepoCounts {
    /// Creates an empty count map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one occurrence of `event`'s action against its repository.
    pub fn record(&mut self, event: &AuditEvent) {
        let slot = match self.index.get(&event.repo) {
            Some(&slot) => slot,
            None => {
                self.entries
                    .push((event.repo.clone(), ActionCounts::default()));
                let slot = self.entries.len() - 1;
                self.index.insert(event.repo.clone(), slot);
                slot
            }
        };
        self.entries[slot].1.increment(event.action.as_str());
    }

    /// Returns the counts recorded for `repo`, if any event targeted it.
    pub fn get(&self, repo: &RepositoryId) -> Option<&ActionCounts> {
        self.index.get(repo).map(|&slot| &self.entries[slot].1)
    }

    /// Iterates over repositories in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&RepositoryId, &ActionCounts)> {
        self.entries.iter().map(|(repo, counts)| (repo, counts))
    }

    /// Number of distinct repositories.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no event was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Counts every event by `(repo, action)`.
///
/// Actions are counted under their literal name; deciding which actions are
/// reported is left to the reporter.
pub fn aggregate<'a, I>(events: I) -> RepoCounts
where
    I: IntoIterator<Item = &'a AuditEvent>,
{
    let mut counts = RepoCounts::new();
    for event in events {
        counts.record(event);
    }
    counts
}
