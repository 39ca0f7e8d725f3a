//! Last observed live status per creator.

use std::collections::{BTreeMap, HashMap};

use crate::config::CreatorId;

use super::types::LiveStatus;

/// Remembers the last observed [`LiveStatus`] of each creator so that only
/// the not-live to live transition triggers a notification.
///
/// A creator with no entry counts as not live, so a creator already live on
/// the first observation is announced.
#[derive(Debug, Default)]
pub struct LiveStatusStore {
    statuses: HashMap<CreatorId, LiveStatus>,
}

impl LiveStatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, uid: &str) -> Option<LiveStatus> {
        self.statuses.get(uid).copied()
    }

    pub fn set(&mut self, uid: &str, status: LiveStatus) {
        self.statuses.insert(uid.to_string(), status);
    }

    /// Record `status` and report whether it is a go-live edge.
    pub fn observe(&mut self, uid: &str, status: LiveStatus) -> bool {
        let previous = self.statuses.insert(uid.to_string(), status);
        status.is_live() && !previous.is_some_and(LiveStatus::is_live)
    }

    /// Drop creators that are no longer live-subscribed. Returns how many were dropped.
    pub fn evict_except<V>(&mut self, subscribed: &BTreeMap<CreatorId, V>) -> usize {
        let before = self.statuses.len();
        self.statuses.retain(|uid, _| subscribed.contains_key(uid));
        before - self.statuses.len()
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_only_on_go_live() {
        use LiveStatus::*;

        let mut store = LiveStatusStore::new();
        let edges: Vec<usize> = [NotLive, Live, Live, NotLive, Live]
            .into_iter()
            .enumerate()
            .filter(|(_, status)| store.observe("7", *status))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(edges, vec![1, 4]);
        assert_eq!(store.get("7"), Some(Live));
    }

    #[test]
    fn test_first_observation_live_is_edge() {
        let mut store = LiveStatusStore::new();
        assert!(store.observe("7", LiveStatus::Live));
        assert!(!store.observe("7", LiveStatus::Live));
    }

    #[test]
    fn test_evict_except() {
        let mut store = LiveStatusStore::new();
        store.set("1", LiveStatus::Live);
        store.set("2", LiveStatus::NotLive);

        let mut subscribed = BTreeMap::new();
        subscribed.insert("1".to_string(), ());
        assert_eq!(store.evict_except(&subscribed), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("2"), None);

        // A re-subscribed creator that is live gets announced again.
        assert!(store.observe("2", LiveStatus::Live));
    }
}
