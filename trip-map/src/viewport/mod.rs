//! Viewport-driven stop refetching.
//!
//! Stop data is fetched for a box larger than the visible map. While the
//! view's corners stay inside that box, panning and zooming reuse the data
//! already on the map; once a corner escapes, a new extended box is
//! computed around the view and a refetch is requested.

use tracing::{debug, trace};

use crate::domain::BoundingBox;

/// Default margin around the view, as a fraction of each span.
pub const DEFAULT_BUFFER_FACTOR: f64 = 0.5;

/// Reconciliation phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewportPhase {
    /// Nothing pending.
    #[default]
    Idle,
    /// The view just stopped moving and is being reconciled.
    Settled,
}

/// Query state for one map instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewportQueryState {
    /// The box the last stop fetch covered, if any.
    pub current_query_bounds: Option<BoundingBox>,
}

/// A stop refetch for a new query box.
#[derive(Debug, Clone, PartialEq)]
pub struct RefetchRequest {
    pub bounds: BoundingBox,
    /// `bounds` as `"swLat,swLon,neLat,neLon"`.
    pub bbox: String,
}

impl RefetchRequest {
    fn new(bounds: BoundingBox) -> Self {
        Self {
            bbox: bounds.to_query_string(),
            bounds,
        }
    }
}

/// Decides, each time the view settles, whether cached stops still cover it.
///
/// ```
/// use trip_map::domain::BoundingBox;
/// use trip_map::viewport::ViewportQueryManager;
///
/// let mut manager = ViewportQueryManager::default();
/// let view = BoundingBox::from_degrees(51.0, 12.0, 52.0, 13.0).unwrap();
///
/// let first = manager.on_move_end(view).unwrap();
/// assert_eq!(first.bbox, "50.75,11.75,52.25,13.25");
///
/// // A small pan stays inside the extended box.
/// let panned = BoundingBox::from_degrees(51.1, 12.1, 52.1, 13.1).unwrap();
/// assert!(manager.on_move_end(panned).is_none());
/// ```
#[derive(Debug, Clone)]
pub struct ViewportQueryManager {
    buffer_factor: f64,
    phase: ViewportPhase,
    state: ViewportQueryState,
}

impl Default for ViewportQueryManager {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_FACTOR)
    }
}

impl ViewportQueryManager {
    /// Negative factors are clamped to zero; a NaN factor uses the default.
    pub fn new(buffer_factor: f64) -> Self {
        let buffer_factor = if buffer_factor.is_nan() {
            DEFAULT_BUFFER_FACTOR
        } else {
            buffer_factor.max(0.0)
        };
        Self {
            buffer_factor,
            phase: ViewportPhase::Idle,
            state: ViewportQueryState::default(),
        }
    }

    pub fn buffer_factor(&self) -> f64 {
        self.buffer_factor
    }

    pub fn phase(&self) -> ViewportPhase {
        self.phase
    }

    pub fn state(&self) -> &ViewportQueryState {
        &self.state
    }

    pub fn current_query_bounds(&self) -> Option<BoundingBox> {
        self.state.current_query_bounds
    }

    /// Whether the cached box covers both corners of `view`.
    pub fn covers(&self, view: &BoundingBox) -> bool {
        self.state
            .current_query_bounds
            .is_some_and(|query| query.contains(view))
    }

    /// The query box for `view`: centered on it, each span scaled by
    /// `1 + buffer_factor`, and never smaller than the view itself.
    pub fn extended_bounds(&self, view: &BoundingBox) -> BoundingBox {
        view.scaled(1.0 + self.buffer_factor).union(view)
    }

    /// Reconcile after the view settles.
    ///
    /// Returns a refetch request when there is no cached box or a corner of
    /// `view` lies outside it. Afterwards the cached box contains `view`.
    pub fn on_move_end(&mut self, view: BoundingBox) -> Option<RefetchRequest> {
        self.phase = ViewportPhase::Settled;

        let request = if self.covers(&view) {
            trace!(view = %view, "view inside query bounds");
            None
        } else {
            let bounds = self.extended_bounds(&view);
            debug!(view = %view, query = %bounds, "view escaped query bounds, refetching");
            self.state.current_query_bounds = Some(bounds);
            Some(RefetchRequest::new(bounds))
        };

        self.phase = ViewportPhase::Idle;
        request
    }

    /// Forget the cached box so the next settle refetches.
    pub fn invalidate(&mut self) {
        self.state.current_query_bounds = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(s: f64, w: f64, n: f64, e: f64) -> BoundingBox {
        BoundingBox::from_degrees(s, w, n, e).unwrap()
    }

    #[test]
    fn first_settle_always_fetches() {
        let mut manager = ViewportQueryManager::default();
        let view = bbox(51.0, 12.0, 52.0, 13.0);
        let request = manager.on_move_end(view).unwrap();

        assert_eq!(request.bounds, bbox(50.75, 11.75, 52.25, 13.25));
        assert_eq!(manager.current_query_bounds(), Some(request.bounds));
        assert_eq!(manager.phase(), ViewportPhase::Idle);
    }

    #[test]
    fn escaping_corner_refetches_around_new_view() {
        let mut manager = ViewportQueryManager::default();
        manager.on_move_end(bbox(51.0, 12.0, 52.0, 13.0));

        let moved = bbox(51.5, 12.5, 52.5, 13.5);
        let request = manager.on_move_end(moved).unwrap();
        assert_eq!(request.bounds, bbox(51.25, 12.25, 52.75, 13.75));
        assert!(request.bounds.contains(&moved));
    }

    #[test]
    fn zooming_out_past_the_box_refetches() {
        let mut manager = ViewportQueryManager::default();
        manager.on_move_end(bbox(51.0, 12.0, 52.0, 13.0));
        assert!(manager.on_move_end(bbox(50.0, 11.0, 53.0, 14.0)).is_some());
    }

    #[test]
    fn zooming_in_reuses_data() {
        let mut manager = ViewportQueryManager::default();
        manager.on_move_end(bbox(51.0, 12.0, 52.0, 13.0));
        assert!(manager.on_move_end(bbox(51.4, 12.4, 51.6, 12.6)).is_none());
    }

    #[test]
    fn larger_buffer_widens_box() {
        let mut manager = ViewportQueryManager::new(1.0);
        let request = manager.on_move_end(bbox(51.0, 12.0, 52.0, 13.0)).unwrap();
        assert_eq!(request.bbox, "50.5,11.5,52.5,13.5");
    }

    #[test]
    fn invalid_buffers_are_sanitized() {
        assert_eq!(ViewportQueryManager::new(-2.0).buffer_factor(), 0.0);
        assert_eq!(
            ViewportQueryManager::new(f64::NAN).buffer_factor(),
            DEFAULT_BUFFER_FACTOR
        );
    }

    #[test]
    fn invalidate_forces_refetch() {
        let mut manager = ViewportQueryManager::default();
        let view = bbox(51.0, 12.0, 52.0, 13.0);
        manager.on_move_end(view);
        manager.invalidate();
        assert!(manager.on_move_end(view).is_some());
    }

    #[test]
    fn zero_area_view() {
        let mut manager = ViewportQueryManager::default();
        let point = bbox(51.0, 12.0, 51.0, 12.0);
        let request = manager.on_move_end(point).unwrap();
        assert!(request.bounds.contains(&point));
        assert!(manager.on_move_end(point).is_none());
    }
}
