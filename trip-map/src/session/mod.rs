//! One map instance: events in, stop fetches out, layers kept in sync.
//!
//! [`MapSession`] owns everything that lives as long as the map does: the
//! viewport query state, the layer registry, the fetch sequencer, the view
//! mode and the data currently on screen. The host feeds it engine events
//! and fetch results; it answers with the fetches to run.
//!
//! ```
//! use trip_map::domain::BoundingBox;
//! use trip_map::layers::{HeadlessEngine, MapEvent};
//! use trip_map::session::{MapSession, SessionOutcome};
//!
//! let view = BoundingBox::from_degrees(51.30, 12.33, 51.36, 12.41).unwrap();
//! let mut engine = HeadlessEngine::new(view);
//! let mut session = MapSession::default();
//!
//! let outcome = session.on_event(MapEvent::StyleLoaded, &mut engine).unwrap();
//! assert!(matches!(outcome, SessionOutcome::Fetch(_)));
//! ```

use std::time::Duration;

use futures::future::AbortRegistration;
use geojson::FeatureCollection;
use tracing::{debug, info, trace, warn};

use crate::annotate::{Classifier, ItineraryTimeline};
use crate::config::SessionConfig;
use crate::domain::Itinerary;
use crate::fetch::{FetchError, FetchStatus, RequestSequencer, RequestTicket, run_fetch};
use crate::layers::{
    LayerError, LayerRegistry, LayerSynchronizer, MapEngine, MapEvent, STOPS_LAYER, ViewMode,
    apply_view_mode,
};
use crate::stops::{StopRecord, StopService, stops_to_feature_collection};
use crate::viewport::ViewportQueryManager;

#[cfg(test)]
mod session_tests;

/// A stop fetch the host should run, e.g. with [`run_stop_fetch`].
#[derive(Debug)]
pub struct StopFetch {
    pub ticket: RequestTicket,
    /// `"swLat,swLon,neLat,neLon"`
    pub bbox: String,
    pub registration: AbortRegistration,
}

/// What the host should do after an event.
#[derive(Debug)]
pub enum SessionOutcome {
    None,
    Fetch(StopFetch),
    /// A stop was clicked on the map.
    StopSelected(String),
}

/// Per-map-instance state.
#[derive(Debug)]
pub struct MapSession {
    config: SessionConfig,
    classifier: Classifier,
    viewport: ViewportQueryManager,
    sync: LayerSynchronizer,
    sequencer: RequestSequencer,
    view_mode: ViewMode,
    selected: Option<Itinerary>,
    stops: Option<FeatureCollection>,
    stop_status: FetchStatus,
    style_loaded: bool,
    pointer: bool,
}

impl Default for MapSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl MapSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            classifier: Classifier::new(config.transfer_walk_max_m),
            viewport: ViewportQueryManager::new(config.buffer_factor),
            sync: LayerSynchronizer::new(),
            sequencer: RequestSequencer::new(),
            view_mode: ViewMode::default(),
            selected: None,
            stops: None,
            stop_status: FetchStatus::Idle,
            style_loaded: false,
            pointer: false,
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn viewport(&self) -> &ViewportQueryManager {
        &self.viewport
    }

    pub fn registry(&self) -> &LayerRegistry {
        self.sync.registry()
    }

    pub fn stop_status(&self) -> &FetchStatus {
        &self.stop_status
    }

    /// The last stop collection applied, if any.
    pub fn stops(&self) -> Option<&FeatureCollection> {
        self.stops.as_ref()
    }

    pub fn selected_itinerary(&self) -> Option<&Itinerary> {
        self.selected.as_ref()
    }

    pub fn is_style_loaded(&self) -> bool {
        self.style_loaded
    }

    /// Whether the pointer is over an interactive layer.
    pub fn pointer_active(&self) -> bool {
        self.pointer
    }

    /// Timeline of the selected itinerary, classified with this session's
    /// settings.
    pub fn timeline(&self) -> Option<ItineraryTimeline<'_>> {
        let itinerary = self.selected.as_ref()?;
        Some(ItineraryTimeline::build_with_gap(
            itinerary,
            &self.classifier,
            self.config.min_wait_gap_millis(),
        ))
    }

    /// Handle one engine event.
    ///
    /// Events that arrive before the style has loaded are ignored.
    pub fn on_event(
        &mut self,
        event: MapEvent,
        engine: &mut dyn MapEngine,
    ) -> Result<SessionOutcome, LayerError> {
        match event {
            MapEvent::StyleLoaded => {
                info!("map style loaded");
                self.style_loaded = true;
                self.sync_layers(engine)?;
                Ok(self.reconcile(engine))
            }
            _ if !self.style_loaded => {
                trace!(?event, "ignoring event before style load");
                Ok(SessionOutcome::None)
            }
            MapEvent::MoveEnd => Ok(self.reconcile(engine)),
            MapEvent::Click { layer, properties } => {
                if layer != STOPS_LAYER {
                    return Ok(SessionOutcome::None);
                }
                match properties.get("stop_id").and_then(|v| v.as_str()) {
                    Some(stop_id) => {
                        debug!(stop_id, "stop selected");
                        Ok(SessionOutcome::StopSelected(stop_id.to_string()))
                    }
                    None => {
                        warn!("clicked stop feature has no stop_id");
                        Ok(SessionOutcome::None)
                    }
                }
            }
            MapEvent::Hover { layer } => {
                self.pointer = layer.is_some();
                Ok(SessionOutcome::None)
            }
        }
    }

    fn reconcile(&mut self, engine: &dyn MapEngine) -> SessionOutcome {
        let Some(refetch) = self.viewport.on_move_end(engine.bounds()) else {
            return SessionOutcome::None;
        };
        let (ticket, registration) = self.sequencer.dispatch();
        self.stop_status = FetchStatus::Loading(ticket);
        SessionOutcome::Fetch(StopFetch {
            ticket,
            bbox: refetch.bbox,
            registration,
        })
    }

    /// Apply the result of the fetch identified by `ticket`.
    ///
    /// Returns `Ok(false)` for a stale ticket, whose result is dropped. A
    /// failed fetch keeps the stops already on screen and clears the cached
    /// query box, so the next settle of the view retries.
    pub fn apply_stops(
        &mut self,
        ticket: RequestTicket,
        result: Result<Vec<StopRecord>, FetchError>,
        engine: &mut dyn MapEngine,
    ) -> Result<bool, LayerError> {
        if !self.sequencer.complete(ticket) {
            debug!(%ticket, latest = ?self.sequencer.latest(), "discarding stale stop result");
            return Ok(false);
        }

        match result {
            Ok(records) => {
                let collection = stops_to_feature_collection(&records);
                debug!(%ticket, stops = collection.features.len(), "stops applied");
                self.stops = Some(collection);
                self.stop_status = FetchStatus::Ready;
                self.sync_layers(engine)?;
            }
            Err(e) => {
                warn!(%ticket, error = %e, "stop fetch failed");
                self.stop_status = FetchStatus::Failed(e);
                self.viewport.invalidate();
            }
        }
        Ok(true)
    }

    pub fn set_view_mode(
        &mut self,
        mode: ViewMode,
        engine: &mut dyn MapEngine,
    ) -> Result<(), LayerError> {
        if mode != self.view_mode {
            debug!(from = ?self.view_mode, to = ?mode, "view mode changed");
        }
        self.view_mode = mode;
        self.sync_layers(engine)
    }

    /// Select an itinerary (entering the itinerary view) or clear the
    /// selection (returning to the plan view).
    pub fn select_itinerary(
        &mut self,
        itinerary: Option<Itinerary>,
        engine: &mut dyn MapEngine,
    ) -> Result<(), LayerError> {
        let mode = match (&itinerary, self.view_mode) {
            (Some(_), _) => ViewMode::Itinerary,
            (None, ViewMode::Itinerary) => ViewMode::Plan,
            (None, mode) => mode,
        };
        self.selected = itinerary;
        self.set_view_mode(mode, engine)
    }

    /// Re-apply the desired layer set for the current state.
    pub fn sync_layers(&mut self, engine: &mut dyn MapEngine) -> Result<(), LayerError> {
        if !self.style_loaded {
            return Ok(());
        }
        apply_view_mode(
            &mut self.sync,
            engine,
            self.view_mode,
            self.stops.as_ref(),
            self.selected.as_ref(),
        )
    }

    /// Abort the in-flight stop fetch.
    pub fn cancel_fetch(&mut self) {
        self.sequencer.cancel();
    }
}

/// Run `fetch` against `service` with a timeout.
///
/// The fetch resolves to [`FetchError::Cancelled`] once the session
/// dispatches a newer one.
pub async fn run_stop_fetch<S: StopService>(
    service: &S,
    fetch: StopFetch,
    timeout: Duration,
) -> (RequestTicket, Result<Vec<StopRecord>, FetchError>) {
    let result = run_fetch(service.stops(&fetch.bbox), fetch.registration, timeout).await;
    (fetch.ticket, result)
}
