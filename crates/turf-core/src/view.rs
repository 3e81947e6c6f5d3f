//! View state coordination.
//!
//! The [`ViewCoordinator`] exclusively owns the [`MessageBuffer`]. History
//! pages and live messages are *proposed* to it; it merges them, keeps the
//! [`HistoryLoader`] cursor in step, and tells the view how to move
//! ([`ScrollDirective`]).
//!
//! Scroll policy:
//! - A prepend never moves what the user is looking at. The view shifts by the
//!   inserted rows so the previous oldest message stays in place.
//! - A live append scrolls to the bottom only if the viewer was already within
//!   the bottom threshold before the change.
//! - Backfill is requested when the viewport is near the top, history is not
//!   exhausted, and no load is in flight.

use turf_proto::{Message, MessageId, RoomId};

use crate::{
    AppendOutcome, DEFAULT_CAPACITY, DEFAULT_PAGE_SIZE, HistoryLoader, HistoryRequest,
    MessageBuffer,
};

/// Distance from the top that triggers backfill, in view units.
pub const NEAR_TOP_THRESHOLD: u32 = 50;

/// Distance from the bottom that counts as following the conversation.
pub const NEAR_BOTTOM_THRESHOLD: u32 = 100;

/// Coordinator tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewConfig {
    /// Messages per history page.
    pub page_size: usize,
    /// Live buffer capacity.
    pub capacity: usize,
    /// Backfill trigger distance from the top.
    pub near_top_threshold: u32,
    /// Stick-to-bottom distance from the bottom.
    pub near_bottom_threshold: u32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            capacity: DEFAULT_CAPACITY,
            near_top_threshold: NEAR_TOP_THRESHOLD,
            near_bottom_threshold: NEAR_BOTTOM_THRESHOLD,
        }
    }
}

/// Scroll position reported by the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollMetrics {
    /// Offset of the viewport's top edge.
    pub scroll_top: u32,
    /// Total content height.
    pub scroll_height: u32,
    /// Viewport height.
    pub client_height: u32,
}

impl ScrollMetrics {
    /// Space between the viewport's bottom edge and the end of the content.
    pub fn distance_from_bottom(&self) -> u32 {
        self.scroll_height.saturating_sub(self.scroll_top).saturating_sub(self.client_height)
    }
}

/// Anchor to hold in place across a prepend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollAnchor {
    /// Message that was oldest before the prepend.
    pub message_id: MessageId,
    /// Messages inserted above it.
    pub inserted: usize,
}

/// How the view should move after a merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrollDirective {
    /// Scroll to the newest message.
    StickToBottom,
    /// Keep the anchor message at its current screen position.
    PreserveAnchor(ScrollAnchor),
    /// `count` messages were evicted from the front; shift up to keep the
    /// same messages on screen.
    FrontEvicted {
        /// Messages removed from the front
        count: usize,
    },
}

/// Merged view over history and live messages.
#[derive(Debug, Clone)]
pub struct ViewCoordinator {
    buffer: MessageBuffer,
    loader: HistoryLoader,
    config: ViewConfig,
    near_bottom: bool,
}

impl ViewCoordinator {
    /// Create an empty view for `room_id`.
    pub fn new(room_id: RoomId, config: ViewConfig) -> Self {
        Self {
            buffer: MessageBuffer::new(config.capacity),
            loader: HistoryLoader::new(room_id, config.page_size),
            config,
            near_bottom: true,
        }
    }

    /// Replace the buffer with the initial page and snap to the newest
    /// message.
    ///
    /// The buffer is only ever non-empty here when live messages arrived
    /// after the reset but before the page; those are kept after the page
    /// unless the page already has them.
    pub fn seed_history(&mut self, page: Vec<Message>) -> ScrollDirective {
        let len = page.len();
        let early: Vec<Message> = self.buffer.iter().cloned().collect();
        self.buffer.replace(page);
        for message in early {
            self.buffer.append(message);
        }
        self.loader.record_seed(len);
        self.near_bottom = true;
        ScrollDirective::StickToBottom
    }

    /// Insert an older page above the current oldest message.
    ///
    /// Ids already buffered are skipped. Returns the anchor to preserve, or
    /// `None` if nothing was inserted.
    pub fn prepend_history(&mut self, page: Vec<Message>) -> Option<ScrollDirective> {
        let len = page.len();
        let anchor = self.buffer.oldest().map(|m| m.id.clone());
        let inserted = self.buffer.prepend(page);
        self.loader.record_backfill(len);

        match anchor {
            Some(message_id) if inserted > 0 => {
                Some(ScrollDirective::PreserveAnchor(ScrollAnchor { message_id, inserted }))
            },
            // Empty view: nothing on screen to anchor, show newest.
            None if inserted > 0 => Some(ScrollDirective::StickToBottom),
            _ => None,
        }
    }

    /// Append a pushed message.
    ///
    /// Returns the buffer outcome and the directive for the view, if any.
    pub fn append_live(&mut self, message: Message) -> (AppendOutcome, Option<ScrollDirective>) {
        let previous = self.buffer.len();
        let outcome = self.buffer.append(message);

        let directive = match outcome {
            AppendOutcome::Duplicate => None,
            // Compare against the pre-eviction count: a full buffer still
            // grew by one arrival.
            AppendOutcome::Appended { evicted } => {
                if self.should_auto_scroll_to_bottom(previous, previous + 1) {
                    Some(ScrollDirective::StickToBottom)
                } else if evicted > 0 {
                    Some(ScrollDirective::FrontEvicted { count: evicted })
                } else {
                    None
                }
            },
        };
        (outcome, directive)
    }

    /// Whether scrolling to `scroll_top` should fetch older history.
    pub fn should_backfill(&self, scroll_top: u32) -> bool {
        scroll_top < self.config.near_top_threshold
            && !self.loader.is_exhausted()
            && !self.loader.is_loading()
    }

    /// Whether a count change should scroll the view to the bottom.
    ///
    /// True only when the count grew and the viewer was near the bottom
    /// before the change.
    pub fn should_auto_scroll_to_bottom(&self, previous_count: usize, new_count: usize) -> bool {
        new_count > previous_count && self.near_bottom
    }

    /// Record a scroll position. Returns whether backfill should start.
    pub fn on_scroll(&mut self, metrics: ScrollMetrics) -> bool {
        self.near_bottom = metrics.distance_from_bottom() < self.config.near_bottom_threshold;
        self.should_backfill(metrics.scroll_top)
    }

    /// Request the initial page.
    pub fn begin_seed(&mut self) -> Option<HistoryRequest> {
        self.loader.begin_seed()
    }

    /// Request the next older page.
    pub fn begin_backfill(&mut self) -> Option<HistoryRequest> {
        self.loader.begin_backfill()
    }

    /// Clear everything for `room_id`: buffer, cursor, exhausted flag, and
    /// any in-flight request.
    pub fn reset(&mut self, room_id: RoomId) {
        self.buffer.clear();
        self.loader.reset(room_id);
        self.near_bottom = true;
    }

    /// Merged messages.
    pub fn buffer(&self) -> &MessageBuffer {
        &self.buffer
    }

    /// Pagination state.
    pub fn loader(&self) -> &HistoryLoader {
        &self.loader
    }

    /// Mutable pagination state (completion matching, cancellation).
    pub fn loader_mut(&mut self) -> &mut HistoryLoader {
        &mut self.loader
    }

    /// Whether the viewer was following the newest message at the last
    /// scroll report.
    pub fn is_near_bottom(&self) -> bool {
        self.near_bottom
    }

    /// Tuning in effect.
    pub fn config(&self) -> &ViewConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(id: &str) -> Message {
        Message {
            id: MessageId::new(id),
            sender_id: "u".into(),
            sender_handle: None,
            room_id: None,
            body: String::new(),
            attachment_url: None,
            attachment_type: None,
            created_at: String::new(),
        }
    }

    fn page(prefix: &str, n: usize) -> Vec<Message> {
        (0..n).map(|i| msg(&format!("{prefix}{i}"))).collect()
    }

    fn view() -> ViewCoordinator {
        ViewCoordinator::new(RoomId::new("r").unwrap(), ViewConfig::default())
    }

    fn scrolled_up(view: &mut ViewCoordinator) {
        view.on_scroll(ScrollMetrics { scroll_top: 400, scroll_height: 2000, client_height: 500 });
    }

    #[test]
    fn auto_scroll_requires_growth_and_near_bottom() {
        let mut view = view();
        assert!(view.should_auto_scroll_to_bottom(10, 11));
        assert!(!view.should_auto_scroll_to_bottom(10, 9));
        assert!(!view.should_auto_scroll_to_bottom(10, 10));

        scrolled_up(&mut view);
        assert!(!view.should_auto_scroll_to_bottom(10, 11));
    }

    #[test]
    fn near_bottom_uses_threshold() {
        let mut view = view();
        view.on_scroll(ScrollMetrics { scroll_top: 1401, scroll_height: 2000, client_height: 500 });
        assert!(view.is_near_bottom());
        view.on_scroll(ScrollMetrics { scroll_top: 1400, scroll_height: 2000, client_height: 500 });
        assert!(!view.is_near_bottom());
    }

    #[test]
    fn backfill_gated_by_threshold_and_flight() {
        let mut view = view();
        let seed = view.begin_seed().unwrap();
        assert!(!view.should_backfill(10), "seed in flight");

        view.loader_mut().finish(seed.id);
        view.seed_history(page("m", 50));
        assert!(view.should_backfill(10));
        assert!(!view.should_backfill(50));
    }

    #[test]
    fn prepend_preserves_anchor() {
        let mut view = view();
        view.seed_history(vec![msg("m3"), msg("m4")]);

        let directive = view.prepend_history(vec![msg("m1"), msg("m2"), msg("m3")]);

        assert_eq!(
            directive,
            Some(ScrollDirective::PreserveAnchor(ScrollAnchor {
                message_id: MessageId::new("m3"),
                inserted: 2,
            }))
        );
    }

    #[test]
    fn prepend_of_known_messages_moves_nothing() {
        let mut view = view();
        view.seed_history(vec![msg("m1"), msg("m2")]);
        assert_eq!(view.prepend_history(vec![msg("m1")]), None);
    }

    #[test]
    fn live_append_follows_when_near_bottom() {
        let mut view = view();
        view.seed_history(page("h", 3));

        let (outcome, directive) = view.append_live(msg("x1"));
        assert_eq!(outcome, AppendOutcome::Appended { evicted: 0 });
        assert_eq!(directive, Some(ScrollDirective::StickToBottom));
    }

    #[test]
    fn live_append_while_scrolled_up_stays() {
        let mut view = view();
        view.seed_history(page("h", 3));
        scrolled_up(&mut view);

        let (_, directive) = view.append_live(msg("x1"));
        assert_eq!(directive, None);
    }

    #[test]
    fn eviction_while_scrolled_up_shifts_view() {
        let mut view = ViewCoordinator::new(RoomId::new("r").unwrap(), ViewConfig {
            capacity: 3,
            ..ViewConfig::default()
        });
        view.seed_history(page("h", 3));
        scrolled_up(&mut view);

        let (_, directive) = view.append_live(msg("x1"));
        assert_eq!(directive, Some(ScrollDirective::FrontEvicted { count: 1 }));
    }

    #[test]
    fn full_buffer_still_follows_bottom() {
        let mut view = ViewCoordinator::new(RoomId::new("r").unwrap(), ViewConfig {
            capacity: 3,
            ..ViewConfig::default()
        });
        view.seed_history(page("h", 3));

        let (_, directive) = view.append_live(msg("x1"));
        assert_eq!(directive, Some(ScrollDirective::StickToBottom));
    }

    #[test]
    fn reset_clears_everything() {
        let mut view = view();
        view.seed_history(page("a", 12));
        let _ = view.begin_backfill();

        view.reset(RoomId::new("b").unwrap());

        assert!(view.buffer().is_empty());
        assert_eq!(view.loader().cursor(), 0);
        assert!(!view.loader().is_exhausted());
        assert!(!view.loader().is_loading());
    }
}
