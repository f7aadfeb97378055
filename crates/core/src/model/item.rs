//! Hacker News items and the narrowed `Story` view.

use serde::{Deserialize, Serialize};

/// Kind of an upstream item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Story,
    Comment,
    Job,
    Poll,
    #[serde(rename = "pollopt", alias = "poll-option")]
    PollOption,
}

impl ItemKind {
    /// Wire name, as in the item's `type` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Story => "story",
            ItemKind::Comment => "comment",
            ItemKind::Job => "job",
            ItemKind::Poll => "poll",
            ItemKind::PollOption => "pollopt",
        }
    }
}

/// Raw item record as returned by `GET /item/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub score: u64,
    #[serde(default)]
    pub by: Option<String>,
    /// Creation time in unix seconds.
    #[serde(default)]
    pub time: Option<i64>,
    #[serde(default)]
    pub descendants: Option<u64>,
    #[serde(default)]
    pub kids: Option<Vec<u64>>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub dead: bool,
}

/// An item narrowed to a rankable story.
///
/// The only way to build one is `Story::try_from(Item)`, so every story is
/// also a valid item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub id: u64,
    pub title: String,
    pub url: String,
    pub score: u64,
    pub by: String,
    pub time: i64,
    pub descendants: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub kids: Vec<u64>,
}

/// Why an item did not narrow to a story.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotAStory {
    #[error("item {id} is a {kind:?}, not a story")]
    WrongKind { id: u64, kind: ItemKind },

    #[error("item {id} is deleted or dead")]
    Removed { id: u64 },

    #[error("item {id} has no {field}")]
    Missing { id: u64, field: &'static str },
}

impl Item {
    /// Whether this item satisfies the story predicate.
    pub fn is_story(&self) -> bool {
        self.kind == ItemKind::Story
            && !self.deleted
            && !self.dead
            && self.title.is_some()
            && self.url.is_some()
            && self.by.is_some()
            && self.time.is_some()
            && self.descendants.is_some()
    }
}

impl TryFrom<Item> for Story {
    type Error = NotAStory;

    fn try_from(item: Item) -> Result<Self, Self::Error> {
        let id = item.id;
        if item.kind != ItemKind::Story {
            return Err(NotAStory::WrongKind { id, kind: item.kind });
        }
        if item.deleted || item.dead {
            return Err(NotAStory::Removed { id });
        }

        Ok(Story {
            id,
            title: item.title.ok_or(NotAStory::Missing { id, field: "title" })?,
            url: item.url.ok_or(NotAStory::Missing { id, field: "url" })?,
            score: item.score,
            by: item.by.ok_or(NotAStory::Missing { id, field: "by" })?,
            time: item.time.ok_or(NotAStory::Missing { id, field: "time" })?,
            descendants: item.descendants.ok_or(NotAStory::Missing { id, field: "descendants" })?,
            kids: item.kids.unwrap_or_default(),
        })
    }
}
