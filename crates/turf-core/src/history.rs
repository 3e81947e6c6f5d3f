//! History pagination state.
//!
//! [`HistoryLoader`] decides *whether* a page may be requested and at which
//! offset; the actual fetch is performed by the caller through a
//! [`HistorySource`]. Offsets count backwards from the newest message: offset
//! 0 is the most recent page, each further page is `page_size` older.
//!
//! # Invariants
//!
//! - At most one request is in flight.
//! - Request ids are never reused, so a completion that arrives after
//!   [`HistoryLoader::cancel`] or [`HistoryLoader::reset`] is recognised as
//!   stale and discarded.
//! - A failed fetch leaves `cursor` and `exhausted` untouched.

use std::future::Future;

use turf_proto::{Message, RoomId};

use crate::TransportError;

/// Messages requested per page.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Fetches one page of history.
///
/// Implementations return the `limit` messages immediately older than
/// `offset`, oldest first. A non-success response is an error, never a
/// partial page.
pub trait HistorySource: Send + Sync {
    /// Load a page.
    fn load_page(
        &self,
        room_id: &RoomId,
        offset: usize,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Message>, TransportError>> + Send;
}

/// Identifies one history request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl RequestId {
    /// Raw counter value.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Why a page is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// Initial most-recent page for a room; replaces the buffer.
    Seed,
    /// Older page requested by scrolling up; prepended.
    Backfill,
}

/// A page request for the caller to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    /// Completion must be reported with this id.
    pub id: RequestId,
    /// Seed or backfill.
    pub kind: PageKind,
    /// Room to fetch from.
    pub room_id: RoomId,
    /// Messages to skip, counted from the newest.
    pub offset: usize,
    /// Page size.
    pub limit: usize,
}

/// Pagination cursor for one room.
#[derive(Debug, Clone)]
pub struct HistoryLoader {
    room_id: RoomId,
    page_size: usize,
    cursor: usize,
    exhausted: bool,
    in_flight: Option<(RequestId, PageKind)>,
    next_request: u64,
}

impl HistoryLoader {
    /// Create a loader at offset 0. A page size of 0 is treated as 1.
    pub fn new(room_id: RoomId, page_size: usize) -> Self {
        Self {
            room_id,
            page_size: page_size.max(1),
            cursor: 0,
            exhausted: false,
            in_flight: None,
            next_request: 0,
        }
    }

    /// Request the most recent page.
    ///
    /// Returns `None` if a request is already in flight.
    pub fn begin_seed(&mut self) -> Option<HistoryRequest> {
        self.begin(PageKind::Seed, 0)
    }

    /// Request the next older page.
    ///
    /// Returns `None` if history is exhausted or a request is in flight;
    /// overlapping triggers are no-ops.
    pub fn begin_backfill(&mut self) -> Option<HistoryRequest> {
        if self.exhausted {
            return None;
        }
        self.begin(PageKind::Backfill, self.cursor)
    }

    fn begin(&mut self, kind: PageKind, offset: usize) -> Option<HistoryRequest> {
        if self.in_flight.is_some() {
            tracing::trace!(room = %self.room_id, ?kind, "history request already in flight");
            return None;
        }

        let id = RequestId(self.next_request);
        self.next_request += 1;
        self.in_flight = Some((id, kind));

        tracing::debug!(room = %self.room_id, ?kind, offset, limit = self.page_size, "requesting history page");
        Some(HistoryRequest {
            id,
            kind,
            room_id: self.room_id.clone(),
            offset,
            limit: self.page_size,
        })
    }

    /// Match a completion against the in-flight request.
    ///
    /// Returns the request kind and clears the in-flight flag, or `None` if
    /// `id` is not the current request (cancelled or from a previous room).
    pub fn finish(&mut self, id: RequestId) -> Option<PageKind> {
        match self.in_flight {
            Some((current, kind)) if current == id => {
                self.in_flight = None;
                Some(kind)
            },
            _ => {
                tracing::debug!(room = %self.room_id, request = id.get(), "discarding stale history result");
                None
            },
        }
    }

    /// Record a successful seed of `len` messages.
    pub fn record_seed(&mut self, len: usize) {
        self.cursor = len;
        self.exhausted = len < self.page_size;
    }

    /// Record a successful backfill of `len` messages.
    pub fn record_backfill(&mut self, len: usize) {
        self.cursor += self.page_size;
        self.exhausted = len < self.page_size;
    }

    /// Forget the in-flight request; its completion will be discarded.
    pub fn cancel(&mut self) {
        if let Some((id, _)) = self.in_flight.take() {
            tracing::debug!(room = %self.room_id, request = id.get(), "cancelled history request");
        }
    }

    /// Start over for `room_id`: offset 0, not exhausted, nothing in flight.
    pub fn reset(&mut self, room_id: RoomId) {
        self.cancel();
        self.room_id = room_id;
        self.cursor = 0;
        self.exhausted = false;
    }

    /// Room being paged.
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Offset of the next backfill.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// No older history exists.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// A request is in flight.
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Messages per page.
    pub fn page_size(&self) -> usize {
        self.page_size
    }
}
