//! Per-marker animation and info-window state.
//!
//! At most one info window is open across the whole marker set. The open
//! marker is stored once, at store level, so two open markers cannot be
//! represented.

use std::collections::BTreeMap;
use std::time::Duration;

use poimap_core::MarkerKind;
use serde::Serialize;
use tokio::time::Instant;

pub const USER_POSITION_ID: &str = "user-position";
pub const DEFAULT_ANIMATION_WINDOW: Duration = Duration::from_millis(600);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum OpenWindow {
    #[default]
    None,
    Open(String),
}

#[derive(Debug, Clone)]
struct MarkerEntry {
    kind: MarkerKind,
    /// Set while the marker is still in its entering animation.
    entering_since: Option<Instant>,
}

/// Render-ready snapshot of one marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkerState {
    pub id: String,
    pub kind: MarkerKind,
    pub animating: bool,
    pub open: bool,
}

#[derive(Debug, Clone)]
pub struct MarkerStateStore {
    markers: BTreeMap<String, MarkerEntry>,
    open: OpenWindow,
    window: Duration,
}

impl Default for MarkerStateStore {
    fn default() -> Self {
        Self::new(DEFAULT_ANIMATION_WINDOW)
    }
}

impl MarkerStateStore {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            markers: BTreeMap::new(),
            open: OpenWindow::None,
            window,
        }
    }

    /// Start a fresh cycle: every id enters as `Entering × Closed`.
    ///
    /// Previous POI markers are discarded and any open window is closed. The
    /// user-position marker survives.
    pub fn replace<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = String>,
    {
        let now = Instant::now();
        self.markers.retain(|_, m| m.kind == MarkerKind::UserPosition);
        for id in ids {
            self.markers.insert(
                id,
                MarkerEntry {
                    kind: MarkerKind::Single,
                    entering_since: Some(now),
                },
            );
        }
        self.open = OpenWindow::None;
    }

    /// Track the visitor's own position marker. It never animates or opens.
    pub fn show_user_position(&mut self) {
        self.markers.insert(
            USER_POSITION_ID.to_owned(),
            MarkerEntry {
                kind: MarkerKind::UserPosition,
                entering_since: None,
            },
        );
    }

    /// Toggle the info window of `id`, returning whether it is now open.
    ///
    /// Opening one marker closes whichever marker was open before, in the same
    /// step. Unknown ids and non-POI markers are ignored.
    pub fn toggle_open(&mut self, id: &str) -> bool {
        match self.markers.get(id) {
            Some(entry) if entry.kind == MarkerKind::Single => {}
            _ => return false,
        }
        self.open = match &self.open {
            OpenWindow::Open(current) if current == id => OpenWindow::None,
            _ => OpenWindow::Open(id.to_owned()),
        };
        matches!(&self.open, OpenWindow::Open(current) if current == id)
    }

    #[must_use]
    pub fn is_open(&self, id: &str) -> bool {
        matches!(&self.open, OpenWindow::Open(current) if current == id)
    }

    #[must_use]
    pub fn open_id(&self) -> Option<&str> {
        match &self.open {
            OpenWindow::Open(id) => Some(id.as_str()),
            OpenWindow::None => None,
        }
    }

    pub fn close_all(&mut self) {
        self.open = OpenWindow::None;
    }

    #[must_use]
    pub fn is_animating(&self, id: &str) -> bool {
        self.markers
            .get(id)
            .is_some_and(|m| self.still_entering(m, Instant::now()))
    }

    /// Move every marker whose animation window has elapsed to settled.
    /// Returns how many markers settled.
    pub fn settle_expired(&mut self) -> usize {
        let now = Instant::now();
        let window = self.window;
        let mut settled = 0;
        for entry in self.markers.values_mut() {
            if let Some(since) = entry.entering_since {
                if now.duration_since(since) >= window {
                    entry.entering_since = None;
                    settled += 1;
                }
            }
        }
        settled
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Snapshot of every tracked marker, ordered by id.
    #[must_use]
    pub fn states(&self) -> Vec<MarkerState> {
        let now = Instant::now();
        self.markers
            .iter()
            .map(|(id, entry)| MarkerState {
                id: id.clone(),
                kind: entry.kind,
                animating: self.still_entering(entry, now),
                open: self.is_open(id),
            })
            .collect()
    }

    fn still_entering(&self, entry: &MarkerEntry, now: Instant) -> bool {
        entry
            .entering_since
            .is_some_and(|since| now.duration_since(since) < self.window)
    }
}
