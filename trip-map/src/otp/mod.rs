//! Routing service (OpenTripPlanner) adapter.
//!
//! The routing service is an opaque producer of itineraries. This module
//! builds its requests, parses its `/plan` responses, and converts them
//! into a [`Plan`]:
//! - leg endpoints that are missing or malformed become "Unknown location"
//! - leg geometry may arrive as explicit points or as an encoded polyline
//! - itineraries that fail validation are flagged, never rendered silently

mod client;
mod convert;
mod error;
mod mock;
mod request;
mod types;

use std::future::Future;

use crate::domain::Plan;

pub use client::{DEFAULT_BASE_URL, RoutingClient, RoutingConfig, parse_plan};
pub use convert::{
    ConversionError, convert_geometry, convert_itinerary, convert_leg, convert_place, convert_plan,
    convert_response,
};
pub use error::OtpError;
pub use mock::{MOCK_PLAN_FILE, MockRoutingClient};
pub use request::{DEFAULT_NUM_ITINERARIES, RoutingRequest, SHIFT_MINUTES};
pub use types::{
    AlertDto, GeometryPointsDto, ItineraryDto, LatLonDto, LegDto, LegGeometryDto, OtpErrorDto,
    OtpResponse, PlaceDto, PlanDto, ZoneInfoDto,
};

/// Anything that can answer a routing request.
///
/// This abstraction allows the pipeline to run against recorded data.
pub trait RoutingService {
    fn plan(
        &self,
        request: &RoutingRequest,
    ) -> impl Future<Output = Result<Plan, OtpError>> + Send;
}
