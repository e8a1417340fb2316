use serde::{Deserialize, Serialize};

/// A manuscript chapter as supplied by the caller.
///
/// Chapters are immutable inputs: the engine never mutates or persists them.
/// Narrative sequence is derived solely from `order_index`, which callers
/// must keep unique across a manuscript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    pub id: String,
    pub order_index: u32,
    pub content: String,
    pub summary: Option<String>,
}

impl Chapter {
    pub fn new(id: impl Into<String>, order_index: u32, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            order_index,
            content: content.into(),
            summary: None,
        }
    }

    /// Whether this chapter carries any analyzable text.
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// Sort chapters into narrative order. Ties on `order_index` fall back to id
/// so the ordering stays total even on malformed input.
pub fn sort_chapters(chapters: &mut [Chapter]) {
    chapters.sort_by(|a, b| {
        a.order_index
            .cmp(&b.order_index)
            .then_with(|| a.id.cmp(&b.id))
    });
}
