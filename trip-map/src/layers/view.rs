//! Which layers each view mode shows.

use geojson::FeatureCollection;
use tracing::debug;

use crate::domain::Itinerary;
use crate::geo::ToGeoJson;

use super::engine::MapEngine;
use super::spec::{
    ITINERARY_LAYER_IDS, ITINERARY_SOURCE, STOP_LAYER_IDS, STOPS_SOURCE, itinerary_layers,
    stop_layers,
};
use super::sync::{LayerError, LayerSynchronizer};

/// Top-level screen the map is shown under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Default,
    Plan,
    Itinerary,
    Station,
    /// Typing a search; the map is a backdrop.
    Search,
}

impl ViewMode {
    /// Modes in which nearby stops are drawn.
    pub fn shows_stops(self) -> bool {
        matches!(
            self,
            ViewMode::Default | ViewMode::Plan | ViewMode::Itinerary | ViewMode::Station
        )
    }

    pub fn shows_itinerary(self) -> bool {
        self == ViewMode::Itinerary
    }
}

/// Bring the map in line with `mode`.
///
/// - Stop-bearing modes refresh the stop source (when data is available)
///   and ensure the stop layers exist; other modes remove the stop layers.
/// - The itinerary view refreshes the itinerary source and ensures its
///   layers exist; every other mode removes them and the source.
pub fn apply_view_mode(
    sync: &mut LayerSynchronizer,
    engine: &mut dyn MapEngine,
    mode: ViewMode,
    stops: Option<&FeatureCollection>,
    itinerary: Option<&Itinerary>,
) -> Result<(), LayerError> {
    if mode.shows_stops() {
        if let Some(stops) = stops {
            show_stops(sync, engine, stops)?;
        }
    } else {
        hide_stops(sync, engine)?;
    }

    if mode.shows_itinerary() {
        if let Some(itinerary) = itinerary {
            show_itinerary(sync, engine, itinerary)?;
        }
    } else {
        hide_itinerary(sync, engine)?;
    }

    Ok(())
}

pub fn show_stops(
    sync: &mut LayerSynchronizer,
    engine: &mut dyn MapEngine,
    stops: &FeatureCollection,
) -> Result<(), LayerError> {
    sync.update_source(engine, STOPS_SOURCE, stops)?;
    for spec in stop_layers() {
        sync.add_layer_if_not_exists(engine, &spec)?;
    }
    Ok(())
}

/// Remove the stop layers. The source keeps its data for the next show.
pub fn hide_stops(
    sync: &mut LayerSynchronizer,
    engine: &mut dyn MapEngine,
) -> Result<(), LayerError> {
    for id in STOP_LAYER_IDS {
        sync.remove_layer(engine, id)?;
    }
    Ok(())
}

pub fn show_itinerary(
    sync: &mut LayerSynchronizer,
    engine: &mut dyn MapEngine,
    itinerary: &Itinerary,
) -> Result<(), LayerError> {
    sync.update_source(engine, ITINERARY_SOURCE, &itinerary.to_feature_collection())?;
    for spec in itinerary_layers() {
        sync.add_layer_if_not_exists(engine, &spec)?;
    }
    Ok(())
}

/// Remove exactly the itinerary layer set, then the itinerary source.
pub fn hide_itinerary(
    sync: &mut LayerSynchronizer,
    engine: &mut dyn MapEngine,
) -> Result<(), LayerError> {
    let mut removed = 0;
    for id in ITINERARY_LAYER_IDS {
        if sync.remove_layer(engine, id)? {
            removed += 1;
        }
    }
    if sync.remove_source(engine, ITINERARY_SOURCE)? || removed > 0 {
        debug!(removed, "itinerary layers cleared");
    }
    Ok(())
}
