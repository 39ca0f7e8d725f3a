//! Domain types shared by the push checks and the acquisition adapters.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of a dynamic (short-form post).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PostKind {
    /// Text or image post.
    Standard,
    /// Video upload.
    Video,
    /// Column article.
    Article,
    /// Repost of another dynamic.
    Repost,
}

impl PostKind {
    /// Whether a video-only subscription accepts this post.
    pub fn is_video(self) -> bool {
        matches!(self, PostKind::Video)
    }
}

impl fmt::Display for PostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PostKind::Standard => "standard",
            PostKind::Video => "video",
            PostKind::Article => "article",
            PostKind::Repost => "repost",
        };
        f.write_str(name)
    }
}

/// A new dynamic returned by a polling source, already rendered to text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicPost {
    pub kind: PostKind,
    pub text: String,
}

/// A rendered feed item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedDynamic {
    /// Dynamic id, for logging.
    pub id: String,
    pub kind: PostKind,
    pub text: String,
}

/// Live room status as last observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LiveStatus {
    NotLive,
    Live,
}

impl LiveStatus {
    pub fn is_live(self) -> bool {
        matches!(self, LiveStatus::Live)
    }
}

/// Live room information for one creator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveRoom {
    pub status: LiveStatus,
    /// Creator display name.
    pub name: String,
    /// Room link.
    pub url: String,
    /// Stream title.
    pub title: String,
    /// Cover image URL.
    pub cover: String,
}
