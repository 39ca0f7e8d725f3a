//! Notification text composition.
//!
//! Messages use CQ codes for images and mentions.

use url::Url;

use super::types::LiveRoom;

/// Mention everyone in a group.
pub const AT_ALL: &str = "[CQ:at,qq=all]";

/// Escape a value for use inside a CQ code parameter.
pub fn cq_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '[' => out.push_str("&#91;"),
            ']' => out.push_str("&#93;"),
            ',' => out.push_str("&#44;"),
            _ => out.push(c),
        }
    }
    out
}

/// Image segment for `url`.
pub fn cq_image(url: &str) -> String {
    format!("[CQ:image,file={}]", cq_escape(url))
}

/// Strip query and fragment from a web link.
///
/// Input that does not parse as an absolute http(s) URL is returned as-is.
pub fn purge_link(link: &str) -> String {
    match Url::parse(link) {
        Ok(mut url) if matches!(url.scheme(), "http" | "https") => {
            url.set_query(None);
            url.set_fragment(None);
            url.to_string()
        }
        _ => link.to_string(),
    }
}

/// Append the broadcast mention, separated by a blank line.
pub fn with_at_all(text: &str, at_all: bool) -> String {
    if at_all {
        format!("{text}\n\n{AT_ALL}")
    } else {
        text.to_string()
    }
}

/// Go-live announcement for a room.
pub fn live_message(room: &LiveRoom, at_all: bool) -> String {
    let mut lines = Vec::with_capacity(4);
    if !room.cover.is_empty() {
        lines.push(cq_image(&room.cover));
    }
    lines.push(format!("【{}】{}", room.name, room.title));
    lines.push(purge_link(&room.url));
    if at_all {
        lines.push(AT_ALL.to_string());
    }
    lines.join("\n")
}
