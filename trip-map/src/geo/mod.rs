//! GeoJSON projection of domain entities.
//!
//! Every entity the map draws implements [`ToGeoJson`]. Projection is pure:
//! the same entity always yields the same feature structure. Positions are
//! emitted longitude first, as GeoJSON requires.
//!
//! [`GeoEntity`] is the tagged union over all projectable entities, for
//! callers that handle them uniformly.

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value};

use crate::domain::{Alert, Itinerary, Leg, Location, ZoneInfo};

/// Capability to project an entity into GeoJSON features.
pub trait ToGeoJson {
    /// The features for this entity, in drawing order.
    fn to_features(&self) -> Vec<Feature>;

    /// The features wrapped in a collection.
    fn to_feature_collection(&self) -> FeatureCollection {
        feature_collection(self.to_features())
    }
}

/// Role of a point feature, written to its `type` property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointKind {
    Location,
    LegStart,
    LegEnd,
    IntermediateStop,
}

impl PointKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PointKind::Location => "Location",
            PointKind::LegStart => "Leg Start",
            PointKind::LegEnd => "Leg End",
            PointKind::IntermediateStop => "Intermediate Stop",
        }
    }
}

/// Any entity the map can draw.
#[derive(Debug, Clone, Copy)]
pub enum GeoEntity<'a> {
    Location(&'a Location, PointKind),
    Leg(&'a Leg),
    Itinerary(&'a Itinerary),
    ZoneInfo(&'a ZoneInfo),
    Alert(&'a Alert),
}

impl ToGeoJson for GeoEntity<'_> {
    fn to_features(&self) -> Vec<Feature> {
        match *self {
            GeoEntity::Location(location, kind) => vec![location_feature(location, kind)],
            GeoEntity::Leg(leg) => leg.to_features(),
            GeoEntity::Itinerary(itinerary) => itinerary.to_features(),
            GeoEntity::ZoneInfo(zone_info) => zone_info.to_features(),
            GeoEntity::Alert(alert) => alert.to_features(),
        }
    }
}

/// Point feature with `{name, type}` properties.
pub fn location_feature(location: &Location, kind: PointKind) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("name".into(), location.name().into());
    properties.insert("type".into(), kind.as_str().into());
    feature(
        Some(Geometry::new(Value::Point(location.position().to_position()))),
        properties,
    )
}

impl ToGeoJson for Location {
    fn to_features(&self) -> Vec<Feature> {
        vec![location_feature(self, PointKind::Location)]
    }
}

impl ToGeoJson for Leg {
    /// Start point, end point, the path line when the leg has recorded
    /// points, then one point per intermediate stop.
    fn to_features(&self) -> Vec<Feature> {
        let stops = self.intermediate_stops().unwrap_or(&[]);
        let mut features = Vec::with_capacity(3 + stops.len());

        features.push(location_feature(self.from(), PointKind::LegStart));
        features.push(location_feature(self.to(), PointKind::LegEnd));

        if !self.geometry_points().is_empty() {
            let coordinates = self
                .geometry_points()
                .iter()
                .map(|p| p.to_position())
                .collect();

            let mut properties = JsonObject::new();
            properties.insert("mode".into(), self.mode().as_str().into());
            properties.insert(
                "route".into(),
                self.route().map_or(JsonValue::Null, JsonValue::from),
            );
            properties.insert(
                "distance".into(),
                self.distance().map_or(JsonValue::Null, JsonValue::from),
            );
            properties.insert("duration".into(), self.duration_secs().into());

            features.push(feature(
                Some(Geometry::new(Value::LineString(coordinates))),
                properties,
            ));
        }

        features.extend(
            stops
                .iter()
                .map(|stop| location_feature(stop, PointKind::IntermediateStop)),
        );

        features
    }
}

impl ToGeoJson for Itinerary {
    fn to_features(&self) -> Vec<Feature> {
        self.legs().iter().flat_map(|leg| leg.to_features()).collect()
    }
}

impl ToGeoJson for ZoneInfo {
    fn to_features(&self) -> Vec<Feature> {
        let mut properties = JsonObject::new();
        properties.insert("zones".into(), self.zones.clone().into());
        properties.insert("orderedZones".into(), self.ordered_zones.clone().into());
        properties.insert(
            "shortDistanceTicket".into(),
            self.short_distance_ticket.into(),
        );
        vec![feature(None, properties)]
    }
}

impl ToGeoJson for Alert {
    fn to_features(&self) -> Vec<Feature> {
        let mut properties = JsonObject::new();
        properties.insert(
            "effectiveStartDate".into(),
            self.effective_start.as_millis().into(),
        );
        properties.insert(
            "effectiveEndDate".into(),
            self.effective_end.as_millis().into(),
        );
        properties.insert("alertDescriptionText".into(), self.description.clone().into());
        properties.insert("alertCategory".into(), self.category.into());
        properties.insert(
            "alertUrl".into(),
            self.url.clone().map_or(JsonValue::Null, JsonValue::from),
        );
        properties.insert(
            "alertHeaderText".into(),
            self.header.clone().map_or(JsonValue::Null, JsonValue::from),
        );
        vec![feature(None, properties)]
    }
}

/// Wrap features in a collection with no bbox or foreign members.
pub fn feature_collection(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// An empty collection, the initial data of every source.
pub fn empty_collection() -> FeatureCollection {
    feature_collection(Vec::new())
}

fn feature(geometry: Option<Geometry>, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry,
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}
