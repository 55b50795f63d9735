//! Idempotent source and layer synchronization.
//!
//! Every operation calls the engine first and touches the registry only
//! after the engine accepted the call. A rejected call therefore leaves
//! the registry describing what the engine really holds.

use geojson::FeatureCollection;
use tracing::{debug, warn};

use super::engine::{EngineError, MapEngine};
use super::registry::LayerRegistry;
use super::spec::LayerSpec;

/// Errors from layer synchronization.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayerError {
    #[error("engine failed to {op} {id}: {source}")]
    Engine {
        op: &'static str,
        id: String,
        #[source]
        source: EngineError,
    },

    /// A layer referenced a source that has not been registered.
    #[error("layer {layer} references unknown source {source_id}")]
    UnknownSource { layer: String, source_id: String },

    /// A source was removed while layers still draw from it.
    #[error("source {source_id} is still used by layers {layers:?}")]
    SourceInUse {
        source_id: String,
        layers: Vec<String>,
    },
}

/// Applies desired source and layer state to a [`MapEngine`].
#[derive(Debug, Clone, Default)]
pub struct LayerSynchronizer {
    registry: LayerRegistry,
}

impl LayerSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &LayerRegistry {
        &self.registry
    }

    /// Replace the data of source `id`, creating it if unregistered.
    pub fn update_source(
        &mut self,
        engine: &mut dyn MapEngine,
        id: &str,
        data: &FeatureCollection,
    ) -> Result<(), LayerError> {
        if self.registry.has_source(id) {
            engine
                .set_source_data(id, data)
                .map_err(|source| engine_error("update source", id, source))?;
        } else {
            engine
                .add_source(id, data)
                .map_err(|source| engine_error("add source", id, source))?;
            self.registry.insert_source(id);
            debug!(source = id, "source added");
        }
        Ok(())
    }

    /// Create the layer unless its id is already registered.
    ///
    /// Returns whether a layer was created.
    pub fn add_layer_if_not_exists(
        &mut self,
        engine: &mut dyn MapEngine,
        spec: &LayerSpec,
    ) -> Result<bool, LayerError> {
        if self.registry.has_layer(&spec.id) {
            return Ok(false);
        }
        if !self.registry.has_source(&spec.source) {
            return Err(LayerError::UnknownSource {
                layer: spec.id.clone(),
                source_id: spec.source.clone(),
            });
        }

        engine
            .add_layer(spec)
            .map_err(|source| engine_error("add layer", &spec.id, source))?;
        self.registry.insert_layer(&spec.id, &spec.source);
        debug!(layer = %spec.id, source = %spec.source, "layer added");
        Ok(true)
    }

    /// Destroy the layer if registered.
    ///
    /// Returns whether a layer was removed.
    pub fn remove_layer(
        &mut self,
        engine: &mut dyn MapEngine,
        id: &str,
    ) -> Result<bool, LayerError> {
        if !self.registry.has_layer(id) {
            return Ok(false);
        }

        engine
            .remove_layer(id)
            .map_err(|source| engine_error("remove layer", id, source))?;
        self.registry.remove_layer(id);
        debug!(layer = id, "layer removed");
        Ok(true)
    }

    /// Destroy the source if registered.
    ///
    /// Every layer drawing from it must have been removed first.
    pub fn remove_source(
        &mut self,
        engine: &mut dyn MapEngine,
        id: &str,
    ) -> Result<bool, LayerError> {
        if !self.registry.has_source(id) {
            return Ok(false);
        }

        let users = self.registry.layers_using(id);
        if !users.is_empty() {
            let layers: Vec<String> = users.into_iter().map(str::to_owned).collect();
            warn!(source = id, ?layers, "refusing to remove source in use");
            return Err(LayerError::SourceInUse {
                source_id: id.to_string(),
                layers,
            });
        }

        engine
            .remove_source(id)
            .map_err(|source| engine_error("remove source", id, source))?;
        self.registry.remove_source(id);
        debug!(source = id, "source removed");
        Ok(true)
    }
}

fn engine_error(op: &'static str, id: &str, source: EngineError) -> LayerError {
    warn!(op, id, error = %source, "engine rejected layer operation");
    LayerError::Engine {
        op,
        id: id.to_string(),
        source,
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::BoundingBox;
    use crate::geo::empty_collection;
    use crate::layers::engine::HeadlessEngine;
    use crate::layers::spec::{LayerKind, STOPS_SOURCE};
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Op {
        Add(u8),
        Remove(u8),
        Fail,
    }

    fn arb_op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u8..5).prop_map(Op::Add),
            (0u8..5).prop_map(Op::Remove),
            Just(Op::Fail),
        ]
    }

    proptest! {
        /// Property: after any sequence of adds, removes and engine
        /// failures, the registry lists exactly the engine's layers.
        #[test]
        fn registry_mirrors_engine(ops in prop::collection::vec(arb_op(), 0..60)) {
            let mut engine =
                HeadlessEngine::new(BoundingBox::from_degrees(0.0, 0.0, 1.0, 1.0).unwrap());
            let mut sync = LayerSynchronizer::new();
            sync.update_source(&mut engine, STOPS_SOURCE, &empty_collection()).unwrap();

            for op in ops {
                match op {
                    Op::Add(n) => {
                        let spec = LayerSpec::new(format!("l{n}"), LayerKind::Circle, STOPS_SOURCE);
                        let _ = sync.add_layer_if_not_exists(&mut engine, &spec);
                    }
                    Op::Remove(n) => {
                        let _ = sync.remove_layer(&mut engine, &format!("l{n}"));
                    }
                    Op::Fail => engine.fail_next("injected"),
                }
            }

            let mut registered: Vec<&str> = sync.registry().layer_ids().collect();
            let mut live = engine.layer_ids();
            registered.sort_unstable();
            live.sort_unstable();
            prop_assert_eq!(registered, live);
        }
    }
}
