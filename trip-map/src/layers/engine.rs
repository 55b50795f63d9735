//! The map rendering engine as seen by the synchronizer.

use std::collections::BTreeMap;

use geojson::{FeatureCollection, JsonObject};
use tracing::trace;

use crate::domain::BoundingBox;

use super::spec::LayerSpec;

/// Errors reported by a rendering engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("source already exists: {0}")]
    DuplicateSource(String),

    #[error("layer already exists: {0}")]
    DuplicateLayer(String),

    #[error("no such source: {0}")]
    MissingSource(String),

    #[error("no such layer: {0}")]
    MissingLayer(String),

    /// The engine refused the call for its own reasons.
    #[error("engine rejected call: {0}")]
    Rejected(String),
}

/// Mutation and query surface of a map rendering engine.
///
/// Implementations talk to a real renderer; [`HeadlessEngine`] keeps
/// everything in memory for tests and the command-line driver.
pub trait MapEngine {
    fn add_source(&mut self, id: &str, data: &FeatureCollection) -> Result<(), EngineError>;

    /// Replace the data of an existing source.
    fn set_source_data(&mut self, id: &str, data: &FeatureCollection) -> Result<(), EngineError>;

    fn remove_source(&mut self, id: &str) -> Result<(), EngineError>;

    fn add_layer(&mut self, spec: &LayerSpec) -> Result<(), EngineError>;

    fn remove_layer(&mut self, id: &str) -> Result<(), EngineError>;

    /// The currently visible area.
    fn bounds(&self) -> BoundingBox;
}

/// Events the engine delivers to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// The style finished loading; layers may now be added.
    StyleLoaded,
    /// The view stopped moving.
    MoveEnd,
    /// A feature was clicked on a layer.
    Click {
        layer: String,
        properties: JsonObject,
    },
    /// The pointer entered (`Some`) or left (`None`) an interactive layer.
    Hover { layer: Option<String> },
}

/// In-memory engine.
///
/// Behaves like a strict renderer: adding something that exists or
/// removing something that does not is an error. A failure can be queued
/// with [`HeadlessEngine::fail_next`] to exercise error paths.
#[derive(Debug, Clone)]
pub struct HeadlessEngine {
    bounds: BoundingBox,
    sources: BTreeMap<String, FeatureCollection>,
    layers: Vec<LayerSpec>,
    layers_created: usize,
    fail_next: Option<String>,
}

impl HeadlessEngine {
    pub fn new(bounds: BoundingBox) -> Self {
        Self {
            bounds,
            sources: BTreeMap::new(),
            layers: Vec::new(),
            layers_created: 0,
            fail_next: None,
        }
    }

    /// Move the view. The caller delivers [`MapEvent::MoveEnd`] afterwards.
    pub fn set_bounds(&mut self, bounds: BoundingBox) {
        self.bounds = bounds;
    }

    /// Make the next mutating call fail with [`EngineError::Rejected`].
    pub fn fail_next(&mut self, reason: impl Into<String>) {
        self.fail_next = Some(reason.into());
    }

    pub fn source(&self, id: &str) -> Option<&FeatureCollection> {
        self.sources.get(id)
    }

    pub fn source_ids(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }

    /// Layer ids in drawing order.
    pub fn layer_ids(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.id.as_str()).collect()
    }

    pub fn has_layer(&self, id: &str) -> bool {
        self.layers.iter().any(|l| l.id == id)
    }

    /// Total `add_layer` calls that succeeded.
    pub fn layers_created(&self) -> usize {
        self.layers_created
    }

    fn check_failure(&mut self) -> Result<(), EngineError> {
        match self.fail_next.take() {
            Some(reason) => Err(EngineError::Rejected(reason)),
            None => Ok(()),
        }
    }
}

impl MapEngine for HeadlessEngine {
    fn add_source(&mut self, id: &str, data: &FeatureCollection) -> Result<(), EngineError> {
        self.check_failure()?;
        if self.sources.contains_key(id) {
            return Err(EngineError::DuplicateSource(id.to_string()));
        }
        trace!(source = id, features = data.features.len(), "add source");
        self.sources.insert(id.to_string(), data.clone());
        Ok(())
    }

    fn set_source_data(&mut self, id: &str, data: &FeatureCollection) -> Result<(), EngineError> {
        self.check_failure()?;
        let slot = self
            .sources
            .get_mut(id)
            .ok_or_else(|| EngineError::MissingSource(id.to_string()))?;
        *slot = data.clone();
        Ok(())
    }

    fn remove_source(&mut self, id: &str) -> Result<(), EngineError> {
        self.check_failure()?;
        if self.layers.iter().any(|l| l.source == id) {
            return Err(EngineError::Rejected(format!(
                "source {id} is still used by a layer"
            )));
        }
        self.sources
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| EngineError::MissingSource(id.to_string()))
    }

    fn add_layer(&mut self, spec: &LayerSpec) -> Result<(), EngineError> {
        self.check_failure()?;
        if self.has_layer(&spec.id) {
            return Err(EngineError::DuplicateLayer(spec.id.clone()));
        }
        if !self.sources.contains_key(&spec.source) {
            return Err(EngineError::MissingSource(spec.source.clone()));
        }
        self.layers.push(spec.clone());
        self.layers_created += 1;
        Ok(())
    }

    fn remove_layer(&mut self, id: &str) -> Result<(), EngineError> {
        self.check_failure()?;
        let position = self
            .layers
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| EngineError::MissingLayer(id.to_string()))?;
        self.layers.remove(position);
        Ok(())
    }

    fn bounds(&self) -> BoundingBox {
        self.bounds
    }
}
