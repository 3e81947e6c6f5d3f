//! Row-based scroll position over the message list.
//!
//! One message is one row, so row offsets and message indices coincide and
//! a [`ScrollDirective`] translates directly into an offset change.

use std::ops::Range;

use turf_core::{ScrollDirective, ScrollMetrics};

/// Visible window into the message list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    scroll_top: usize,
    height: usize,
}

impl Viewport {
    /// A viewport `height` rows tall, scrolled to the top.
    pub fn new(height: usize) -> Self {
        Self { scroll_top: 0, height }
    }

    /// Index of the first visible row.
    pub fn scroll_top(&self) -> usize {
        self.scroll_top
    }

    /// Visible rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Rows of `len` messages currently on screen.
    pub fn visible(&self, len: usize) -> Range<usize> {
        let start = self.scroll_top.min(len);
        start..(start + self.height).min(len)
    }

    /// Position report for the session.
    pub fn metrics(&self, len: usize) -> ScrollMetrics {
        ScrollMetrics {
            scroll_top: to_u32(self.scroll_top),
            scroll_height: to_u32(len),
            client_height: to_u32(self.height),
        }
    }

    /// Follow a directive after the list changed to `len` rows.
    pub fn apply(&mut self, directive: &ScrollDirective, len: usize) {
        match directive {
            ScrollDirective::StickToBottom => self.scroll_top = max_top(len, self.height),
            ScrollDirective::PreserveAnchor(anchor) => self.scroll_top += anchor.inserted,
            ScrollDirective::FrontEvicted { count } => {
                self.scroll_top = self.scroll_top.saturating_sub(*count);
            },
        }
        self.clamp(len);
    }

    /// Scroll by `rows` (negative is up). Returns whether the offset moved.
    pub fn scroll_by(&mut self, rows: isize, len: usize) -> bool {
        let before = self.scroll_top;
        self.scroll_top = self.scroll_top.saturating_add_signed(rows);
        self.clamp(len);
        self.scroll_top != before
    }

    /// Jump to the newest message.
    pub fn to_bottom(&mut self, len: usize) {
        self.scroll_top = max_top(len, self.height);
    }

    /// Change the height, keeping the bottom row in place when it was at the
    /// bottom.
    pub fn set_height(&mut self, height: usize, len: usize) {
        let was_at_bottom = self.scroll_top >= max_top(len, self.height);
        self.height = height;
        if was_at_bottom {
            self.to_bottom(len);
        } else {
            self.clamp(len);
        }
    }

    fn clamp(&mut self, len: usize) {
        self.scroll_top = self.scroll_top.min(max_top(len, self.height));
    }
}

fn max_top(len: usize, height: usize) -> usize {
    len.saturating_sub(height)
}

fn to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
