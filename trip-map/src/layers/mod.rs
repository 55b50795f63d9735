//! Map layer synchronization.
//!
//! The map engine is an external collaborator behind [`MapEngine`]. The
//! [`LayerSynchronizer`] keeps its own [`LayerRegistry`] of what exists on
//! the map and applies changes idempotently, so callers can re-apply the
//! full desired state on every render. [`apply_view_mode`] is that desired
//! state for each [`ViewMode`].

mod engine;
mod registry;
mod spec;
mod sync;
mod view;

pub use engine::{EngineError, HeadlessEngine, MapEngine, MapEvent};
pub use registry::LayerRegistry;
pub use spec::{
    ITINERARY_LAYER_IDS, ITINERARY_SOURCE, LayerKind, LayerSpec, STOP_LAYER_IDS, STOPS_LABELS_LAYER,
    STOPS_LAYER, STOPS_SOURCE, itinerary_layers, stop_layers,
};
pub use sync::{LayerError, LayerSynchronizer};
pub use view::{ViewMode, apply_view_mode, hide_itinerary, hide_stops, show_itinerary, show_stops};
