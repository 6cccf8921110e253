//! Voider Core Library
//!
//! Core library for Voider - a fullscreen overlay for throwing short
//! thoughts into "the void".
//! Provides the following capabilities:
//! - Append `.`-separated fragments to the active file (`0.txt`)
//! - Archive the active file with the `0` / `0<name>` command syntax
//! - Index archived lines in the background and recall one at random
//! - Watch the void directory and reindex when archives change
//!
//! Pipeline: Commit (append or archive) -> Watch -> Index -> Recall

pub mod config;
pub mod entry;
pub mod error;
pub mod index;
pub mod indexer;
pub mod layout;
pub mod selection;
pub mod void;
pub mod watcher;

// Re-export main types
pub use config::{Config, OverlayConfig};
pub use entry::{ArchiveTarget, Entry};
pub use error::{Result, VoidError};
pub use index::LineIndex;
pub use indexer::{Indexer, Recall};
pub use layout::OverlayLayout;
pub use selection::{keep_selection, Selection};
pub use void::{Commit, Void, VoidStats};
pub use watcher::{FileWatcher, VoidWatch};
