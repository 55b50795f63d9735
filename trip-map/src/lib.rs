//! Transit trip map.
//!
//! Turns routing and stop-monitor responses into an annotated itinerary
//! model and keeps an interactive map's layers and stop data in step with
//! the viewport.

pub mod annotate;
pub mod cache;
pub mod config;
pub mod domain;
pub mod fetch;
pub mod geo;
pub mod layers;
pub mod otp;
pub mod session;
pub mod stops;
pub mod viewport;
