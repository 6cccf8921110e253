//! Keep-selection: drop everything in the field except the selected text.

use crate::error::{Result, VoidError};
use serde::{Deserialize, Serialize};

/// Field contents after keeping a selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub text: String,
    /// Character index where the selection starts
    pub start: usize,
    /// Character index where the selection ends (exclusive)
    pub end: usize,
}

/// Replace `text` with its `start..end` character range.
///
/// The kept text stays fully selected. An empty, inverted, or out-of-range
/// selection is an error and leaves nothing to keep.
pub fn keep_selection(text: &str, start: usize, end: usize) -> Result<Selection> {
    let len = text.chars().count();
    if start >= end || end > len {
        return Err(VoidError::InvalidSelection { start, end, len });
    }

    let kept: String = text.chars().skip(start).take(end - start).collect();
    let kept_len = end - start;
    Ok(Selection {
        text: kept,
        start: 0,
        end: kept_len,
    })
}
