//! Bookkeeping of what exists on the rendered map.

use std::collections::BTreeSet;

/// Active sources, and active layers with the source each one draws from.
///
/// Only [`super::LayerSynchronizer`] mutates a registry, and only after the
/// engine accepted the matching call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerRegistry {
    sources: BTreeSet<String>,
    /// `(layer id, source id)` in creation order.
    layers: Vec<(String, String)>,
}

impl LayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_source(&self, id: &str) -> bool {
        self.sources.contains(id)
    }

    pub fn has_layer(&self, id: &str) -> bool {
        self.layers.iter().any(|(layer, _)| layer == id)
    }

    pub fn source_ids(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(String::as_str)
    }

    /// Layer ids in creation order.
    pub fn layer_ids(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().map(|(layer, _)| layer.as_str())
    }

    /// Layers drawing from `source`, in creation order.
    pub fn layers_using(&self, source: &str) -> Vec<&str> {
        self.layers
            .iter()
            .filter(|(_, s)| s == source)
            .map(|(layer, _)| layer.as_str())
            .collect()
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub(super) fn insert_source(&mut self, id: &str) {
        self.sources.insert(id.to_string());
    }

    pub(super) fn remove_source(&mut self, id: &str) {
        self.sources.remove(id);
    }

    pub(super) fn insert_layer(&mut self, id: &str, source: &str) {
        if !self.has_layer(id) {
            self.layers.push((id.to_string(), source.to_string()));
        }
    }

    pub(super) fn remove_layer(&mut self, id: &str) {
        self.layers.retain(|(layer, _)| layer != id);
    }
}
