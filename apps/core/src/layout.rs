//! Overlay geometry: the ring and the entry field centered inside it.

use crate::config::OverlayConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayLayout {
    pub center_x: u32,
    pub center_y: u32,
    pub radius: u32,
    pub ring_thickness: u32,
    /// Entry field width in characters
    pub entry_chars: u32,
}

impl OverlayLayout {
    /// Fit the ring to the screen and size the entry field to its diameter.
    ///
    /// `avg_char_width` is the measured width of one character in the
    /// entry font; zero is treated as one pixel.
    pub fn compute(
        screen_width: u32,
        screen_height: u32,
        avg_char_width: u32,
        overlay: &OverlayConfig,
    ) -> Self {
        let radius = (screen_width.min(screen_height) / 2)
            .saturating_sub(overlay.ring_thickness)
            .saturating_sub(overlay.ring_margin);
        let diameter = radius.saturating_mul(2);
        let entry_chars = (diameter.saturating_sub(overlay.entry_padding) / avg_char_width.max(1))
            .max(1);

        Self {
            center_x: screen_width / 2,
            center_y: screen_height / 2,
            radius,
            ring_thickness: overlay.ring_thickness,
            entry_chars,
        }
    }

    pub fn diameter(&self) -> u32 {
        self.radius.saturating_mul(2)
    }
}
