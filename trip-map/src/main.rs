use std::process::ExitCode;

use chrono::FixedOffset;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use trip_map::annotate::{Classifier, ItineraryTimeline};
use trip_map::cache::{CacheConfig, CachedRoutingClient};
use trip_map::config::{ConfigError, ServiceConfig, SessionConfig};
use trip_map::domain::{
    BoundingBox, DomainError, LatLon, format_duration, format_duration_rounded,
};
use trip_map::layers::{HeadlessEngine, LayerError, MapEvent};
use trip_map::otp::{
    MockRoutingClient, OtpError, RoutingClient, RoutingConfig, RoutingRequest, RoutingService,
};
use trip_map::session::{MapSession, SessionOutcome, run_stop_fetch};
use trip_map::stops::{MockStopClient, StopClient, StopClientConfig, StopError, StopService};

const USAGE: &str = "usage: trip-map FROM TO   (each as lat,lon)";

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error("{0}")]
    Usage(String),

    #[error("invalid coordinate: {0}")]
    Coordinate(#[from] DomainError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("routing failed: {0}")]
    Routing(#[from] OtpError),

    #[error("stop service unavailable: {0}")]
    Stops(#[from] StopError),

    #[error("map layers out of sync: {0}")]
    Layers(#[from] LayerError),
}

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(AppError::Usage(message)) => {
            eprintln!("{message}");
            eprintln!("{USAGE}");
            ExitCode::from(2)
        }
        Err(e) => {
            error!(error = %e, "trip-map failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), AppError> {
    let mut args = std::env::args().skip(1);
    let (Some(from), Some(to)) = (args.next(), args.next()) else {
        return Err(AppError::Usage("missing FROM or TO".to_string()));
    };
    let from: LatLon = from.parse()?;
    let to: LatLon = to.parse()?;

    let services = ServiceConfig::from_env()?;
    let session_config = SessionConfig::default().with_fetch_timeout(services.fetch_timeout);
    info!(style = services.map_style(), "map style selected");

    let request =
        RoutingRequest::new(from, to).with_num_itineraries(session_config.num_itineraries);
    let cache_config = CacheConfig::default();

    match std::env::var("TRIP_MAP_MOCK_DIR") {
        Ok(dir) => {
            info!(%dir, "using recorded responses");
            let routing =
                CachedRoutingClient::new(MockRoutingClient::from_dir(&dir)?, &cache_config);
            let stops = MockStopClient::from_dir(&dir).unwrap_or_else(|e| {
                warn!(error = %e, "no recorded stops, map will show none");
                MockStopClient::new(Vec::new())
            });
            show_trip(&routing, &stops, &request, session_config).await
        }
        Err(_) => {
            let routing = RoutingClient::new(RoutingConfig::new(&services.otp_base_url))?;
            let routing = CachedRoutingClient::new(routing, &cache_config);
            let timeout_secs = services.fetch_timeout.as_secs();
            let stops = StopClient::new(
                StopClientConfig::new(&services.stops_base_url).with_timeout(timeout_secs),
            )?;
            show_trip(&routing, &stops, &request, session_config).await
        }
    }
}

async fn show_trip<R, S>(
    routing: &CachedRoutingClient<R>,
    stops: &S,
    request: &RoutingRequest,
    config: SessionConfig,
) -> Result<(), AppError>
where
    R: RoutingService + Sync,
    S: StopService,
{
    let plan = routing.get_plan(request).await?;
    if !plan.flagged.is_empty() {
        warn!(count = plan.flagged.len(), "itineraries withheld after validation");
    }

    let offset = *chrono::Local::now().offset();
    let classifier = Classifier::new(config.transfer_walk_max_m);
    let listed = plan.listed(config.max_listed_itineraries);
    if listed.is_empty() {
        println!("No itineraries from {} to {}", plan.from.name(), plan.to.name());
        return Ok(());
    }

    println!("{} → {}", plan.from.name(), plan.to.name());
    for (index, itinerary) in &listed {
        println!();
        println!(
            "[{index}] {} - {}  ({})",
            itinerary.start_time().format_hhmm(offset),
            itinerary.end_time().format_hhmm(offset),
            format_duration(itinerary.end_time().millis_since(itinerary.start_time()) / 1000),
        );
        let timeline =
            ItineraryTimeline::build_with_gap(itinerary, &classifier, config.min_wait_gap_millis());
        print_timeline(&timeline, offset);
    }

    let mut session = MapSession::new(config);
    let mut engine = HeadlessEngine::new(trip_bounds(request)?);
    if let SessionOutcome::Fetch(fetch) = session.on_event(MapEvent::StyleLoaded, &mut engine)? {
        let timeout = session.config().fetch_timeout;
        let (ticket, result) = run_stop_fetch(stops, fetch, timeout).await;
        session.apply_stops(ticket, result, &mut engine)?;
    }

    let (_, first) = listed[0];
    session.select_itinerary(Some(first.clone()), &mut engine)?;

    println!();
    println!("stops: {:?}", session.stop_status());
    println!("layers: {}", engine.layer_ids().join(", "));
    Ok(())
}

fn print_timeline(timeline: &ItineraryTimeline<'_>, offset: FixedOffset) {
    for entry in timeline.entries() {
        println!(
            "    {} {}{}  {} -> {} {}{}",
            entry.leg.start_time().format_hhmm(offset),
            entry.label,
            deviation_suffix(&entry.departure.label()),
            entry.leg.from().name(),
            entry.leg.to().name(),
            entry.leg.end_time().format_hhmm(offset),
            deviation_suffix(&entry.arrival.label()),
        );
        for estimate in entry.stop_estimates() {
            println!(
                "        ~{} {}{}",
                estimate.estimated.format_hhmm(offset),
                estimate.stop.name(),
                deviation_suffix(&estimate.deviation.label()),
            );
        }
        if let Some(gap) = entry.wait_after {
            println!("    Wait ({})", format_duration_rounded(gap / 1000));
        }
    }
}

fn deviation_suffix(label: &str) -> String {
    if label.is_empty() {
        String::new()
    } else {
        format!(" [{label}]")
    }
}

/// The box spanned by the trip's endpoints.
fn trip_bounds(request: &RoutingRequest) -> Result<BoundingBox, DomainError> {
    BoundingBox::from_degrees(
        request.from.lat.min(request.to.lat),
        request.from.lon.min(request.to.lon),
        request.from.lat.max(request.to.lat),
        request.from.lon.max(request.to.lon),
    )
}
