//! Shared data model.

pub mod item;
pub mod upload;

pub use item::{Item, ItemKind, NotAStory, Story};
pub use upload::{ContentUpload, UploadReceipt};
