//! Subscription table normalization.
//!
//! Turns the human-authored `push` table into four flat lookup tables, one per
//! content type. Anything that does not look like a valid entry is skipped.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Bilibili user id, kept in its config string form.
pub type CreatorId = String;

/// A delivery destination plus its broadcast-mention flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PushTarget {
    /// Group chat id.
    pub group_id: i64,
    /// Mention everyone in the group.
    pub at_all: bool,
}

/// A dynamic subscription target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DynamicTarget {
    pub target: PushTarget,
    /// Only push video posts.
    pub video_only: bool,
}

/// Structured multi-episode collection kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    Season,
    Series,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 2] = [CollectionKind::Season, CollectionKind::Series];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Season => "season",
            Self::Series => "series",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized push subscriptions.
///
/// Season and series tables are keyed by `"<creator>:<collection id>"`.
/// A key is only present when it has at least one target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushConfig {
    pub dynamic: BTreeMap<CreatorId, Vec<DynamicTarget>>,
    pub live: BTreeMap<CreatorId, Vec<PushTarget>>,
    pub season: BTreeMap<String, Vec<PushTarget>>,
    pub series: BTreeMap<String, Vec<PushTarget>>,
}

impl PushConfig {
    /// Normalize a raw `push` table. Pure and deterministic.
    pub fn from_raw(raw: &Value) -> Self {
        let mut config = Self::default();
        let Some(table) = raw.as_object() else {
            return config;
        };

        for (uid, confs) in table {
            let entries: &[Value] = match confs {
                Value::Array(list) => list.as_slice(),
                single => std::slice::from_ref(single),
            };
            for entry in entries {
                config.add_entry(uid, entry);
            }
        }

        config
    }

    fn add_entry(&mut self, uid: &str, entry: &Value) {
        match entry {
            Value::Number(_) => {
                let Some(group_id) = entry.as_i64() else {
                    return;
                };
                let target = PushTarget {
                    group_id,
                    at_all: false,
                };
                self.dynamic.entry(uid.to_string()).or_default().push(DynamicTarget {
                    target,
                    video_only: false,
                });
                self.live.entry(uid.to_string()).or_default().push(target);
            }
            Value::Object(conf) => {
                let Some(group_id) = conf.get("gid").and_then(Value::as_i64) else {
                    return;
                };
                let target = |flag: &str| PushTarget {
                    group_id,
                    at_all: is_true(conf, flag),
                };

                if is_true(conf, "dynamic") {
                    self.dynamic.entry(uid.to_string()).or_default().push(DynamicTarget {
                        target: target("dynamicAtAll"),
                        video_only: false,
                    });
                } else if is_true(conf, "video") {
                    self.dynamic.entry(uid.to_string()).or_default().push(DynamicTarget {
                        target: target("dynamicAtAll"),
                        video_only: true,
                    });
                }
                if is_true(conf, "live") {
                    self.live
                        .entry(uid.to_string())
                        .or_default()
                        .push(target("liveAtAll"));
                }
                for sid in collection_ids(conf, "seasons") {
                    self.season
                        .entry(format!("{uid}:{sid}"))
                        .or_default()
                        .push(target("seasonAtAll"));
                }
                for sid in collection_ids(conf, "series") {
                    self.series
                        .entry(format!("{uid}:{sid}"))
                        .or_default()
                        .push(target("seriesAtAll"));
                }
            }
            _ => {}
        }
    }

    /// Table for a collection kind.
    pub fn collections(&self, kind: CollectionKind) -> &BTreeMap<String, Vec<PushTarget>> {
        match kind {
            CollectionKind::Season => &self.season,
            CollectionKind::Series => &self.series,
        }
    }

    pub fn has_dynamic_or_live(&self) -> bool {
        !self.dynamic.is_empty() || !self.live.is_empty()
    }

    pub fn has_collections(&self) -> bool {
        !self.season.is_empty() || !self.series.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_dynamic_or_live() && !self.has_collections()
    }
}

fn is_true(conf: &Map<String, Value>, key: &str) -> bool {
    conf.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn collection_ids<'a>(
    conf: &'a Map<String, Value>,
    key: &str,
) -> impl Iterator<Item = String> + 'a {
    conf.get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|id| match id {
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            _ => None,
        })
}
