//! Scenario tests for the map session.

use super::*;
use crate::domain::{BoundingBox, Leg, Location, Mode, Timestamp};
use crate::layers::{
    HeadlessEngine, ITINERARY_LAYER_IDS, ITINERARY_SOURCE, STOP_LAYER_IDS, STOPS_SOURCE,
};
use crate::stops::{MockStopClient, StopError};
use geojson::JsonObject;

fn view() -> BoundingBox {
    BoundingBox::from_degrees(51.30, 12.33, 51.36, 12.41).unwrap()
}

fn far_view() -> BoundingBox {
    BoundingBox::from_degrees(51.00, 13.70, 51.06, 13.78).unwrap()
}

fn stop(id: &str, name: &str, lat: f64, lon: f64) -> StopRecord {
    StopRecord {
        stop_id: id.to_string(),
        stop_name: name.to_string(),
        lat,
        lon,
    }
}

fn markt() -> StopRecord {
    stop("de:14713:10818", "Markt", 51.3397, 12.3731)
}

fn augustusplatz() -> StopRecord {
    stop("de:14713:27001", "Augustusplatz", 51.3390, 12.3810)
}

fn itinerary() -> Itinerary {
    let markt = Location::from_coords("Markt", 51.3397, 12.3731).unwrap();
    let hbf = Location::from_coords("Hauptbahnhof", 51.3455, 12.3821).unwrap();
    let zoo = Location::from_coords("Zoo", 51.3485, 12.3710).unwrap();
    let ride = Leg::new(
        Mode::Tram,
        markt,
        hbf.clone(),
        Timestamp::from_millis(0),
        Timestamp::from_millis(420_000),
    )
    .unwrap()
    .with_route("4");
    let walk = Leg::new(
        Mode::Walk,
        hbf,
        zoo,
        Timestamp::from_millis(420_000),
        Timestamp::from_millis(900_000),
    )
    .unwrap()
    .with_distance(650.0);
    Itinerary::from_legs(vec![ride, walk]).unwrap()
}

/// A session whose style is loaded and whose first fetch was applied.
fn loaded(engine: &mut HeadlessEngine, stops: Vec<StopRecord>) -> MapSession {
    let mut session = MapSession::default();
    let SessionOutcome::Fetch(fetch) = session.on_event(MapEvent::StyleLoaded, engine).unwrap()
    else {
        panic!("style load should fetch stops");
    };
    assert!(session.apply_stops(fetch.ticket, Ok(stops), engine).unwrap());
    session
}

fn expect_fetch(outcome: SessionOutcome) -> StopFetch {
    match outcome {
        SessionOutcome::Fetch(fetch) => fetch,
        other => panic!("expected a fetch, got {other:?}"),
    }
}

fn click(layer: &str, stop_id: Option<&str>) -> MapEvent {
    let mut properties = JsonObject::new();
    if let Some(id) = stop_id {
        properties.insert("stop_id".into(), id.into());
    }
    MapEvent::Click {
        layer: layer.to_string(),
        properties,
    }
}

#[test]
fn events_before_style_load_are_ignored() {
    let mut engine = HeadlessEngine::new(view());
    let mut session = MapSession::default();

    let outcome = session.on_event(MapEvent::MoveEnd, &mut engine).unwrap();
    assert!(matches!(outcome, SessionOutcome::None));
    assert!(session.viewport().current_query_bounds().is_none());
    assert_eq!(session.stop_status(), &FetchStatus::Idle);
}

#[test]
fn style_load_fetches_extended_box() {
    let mut engine = HeadlessEngine::new(view());
    let mut session = MapSession::default();

    let fetch = expect_fetch(session.on_event(MapEvent::StyleLoaded, &mut engine).unwrap());
    let query = session.viewport().current_query_bounds().unwrap();
    assert_eq!(fetch.bbox, query.to_query_string());
    assert!(query.contains(&view()));
    assert_eq!(session.stop_status(), &FetchStatus::Loading(fetch.ticket));
}

#[test]
fn applied_stops_render_in_default_view() {
    let mut engine = HeadlessEngine::new(view());
    let session = loaded(&mut engine, vec![markt(), augustusplatz()]);

    assert_eq!(session.stop_status(), &FetchStatus::Ready);
    assert_eq!(engine.layer_ids(), STOP_LAYER_IDS.to_vec());
    assert_eq!(engine.source(STOPS_SOURCE).unwrap().features.len(), 2);
}

#[test]
fn small_pan_inside_query_box_does_not_refetch() {
    let mut engine = HeadlessEngine::new(view());
    let mut session = loaded(&mut engine, vec![markt()]);

    engine.set_bounds(BoundingBox::from_degrees(51.31, 12.34, 51.37, 12.42).unwrap());
    let outcome = session.on_event(MapEvent::MoveEnd, &mut engine).unwrap();
    assert!(matches!(outcome, SessionOutcome::None));
}

#[test]
fn stale_result_is_discarded() {
    let mut engine = HeadlessEngine::new(view());
    let mut session = MapSession::default();

    let first = expect_fetch(session.on_event(MapEvent::StyleLoaded, &mut engine).unwrap());
    engine.set_bounds(far_view());
    let second = expect_fetch(session.on_event(MapEvent::MoveEnd, &mut engine).unwrap());

    // The newer box resolves first; the older response arrives late.
    let postplatz = stop("dd", "Postplatz", 51.03, 13.73);
    let newer = session.apply_stops(second.ticket, Ok(vec![postplatz]), &mut engine);
    assert!(newer.unwrap());
    let older = session.apply_stops(first.ticket, Ok(vec![markt(), augustusplatz()]), &mut engine);
    assert!(!older.unwrap());

    let applied = engine.source(STOPS_SOURCE).unwrap();
    assert_eq!(applied.features.len(), 1);
    let props = applied.features[0].properties.as_ref().unwrap();
    assert_eq!(props["stop_name"], "Postplatz");
}

#[test]
fn older_ticket_cannot_overwrite_after_newer_dispatch() {
    let mut engine = HeadlessEngine::new(view());
    let mut session = MapSession::default();

    let first = expect_fetch(session.on_event(MapEvent::StyleLoaded, &mut engine).unwrap());
    engine.set_bounds(far_view());
    let _second = expect_fetch(session.on_event(MapEvent::MoveEnd, &mut engine).unwrap());

    assert!(!session.apply_stops(first.ticket, Ok(vec![markt()]), &mut engine).unwrap());
    assert!(session.stops().is_none());
    assert!(matches!(session.stop_status(), FetchStatus::Loading(_)));
}

#[test]
fn failure_keeps_data_and_retries_on_next_settle() {
    let mut engine = HeadlessEngine::new(view());
    let mut session = loaded(&mut engine, vec![markt()]);

    engine.set_bounds(far_view());
    let fetch = expect_fetch(session.on_event(MapEvent::MoveEnd, &mut engine).unwrap());
    let timeout = FetchError::Timeout(Duration::from_secs(10));
    assert!(session.apply_stops(fetch.ticket, Err(timeout.clone()), &mut engine).unwrap());

    assert_eq!(session.stop_status(), &FetchStatus::Failed(timeout));
    assert_eq!(engine.source(STOPS_SOURCE).unwrap().features.len(), 1);
    assert!(session.viewport().current_query_bounds().is_none());

    // Settling again on the same view is the retry.
    let retry = session.on_event(MapEvent::MoveEnd, &mut engine).unwrap();
    assert!(matches!(retry, SessionOutcome::Fetch(_)));
}

#[test]
fn selecting_itinerary_layers_it_above_stops() {
    let mut engine = HeadlessEngine::new(view());
    let mut session = loaded(&mut engine, vec![markt()]);

    session.select_itinerary(Some(itinerary()), &mut engine).unwrap();
    assert_eq!(session.view_mode(), ViewMode::Itinerary);

    let mut expected: Vec<&str> = STOP_LAYER_IDS.to_vec();
    expected.extend(ITINERARY_LAYER_IDS);
    assert_eq!(engine.layer_ids(), expected);
    assert!(engine.source(ITINERARY_SOURCE).is_some());
}

#[test]
fn clearing_selection_returns_to_plan_view() {
    let mut engine = HeadlessEngine::new(view());
    let mut session = loaded(&mut engine, vec![markt()]);

    session.select_itinerary(Some(itinerary()), &mut engine).unwrap();
    session.select_itinerary(None, &mut engine).unwrap();

    assert_eq!(session.view_mode(), ViewMode::Plan);
    assert_eq!(engine.layer_ids(), STOP_LAYER_IDS.to_vec());
    assert!(engine.source(ITINERARY_SOURCE).is_none());
    assert!(!session.registry().has_source(ITINERARY_SOURCE));
}

#[test]
fn search_view_hides_stops_until_a_stop_bearing_view() {
    let mut engine = HeadlessEngine::new(view());
    let mut session = loaded(&mut engine, vec![markt()]);

    session.set_view_mode(ViewMode::Search, &mut engine).unwrap();
    assert!(engine.layer_ids().is_empty());
    assert!(engine.source(STOPS_SOURCE).is_some());

    session.set_view_mode(ViewMode::Station, &mut engine).unwrap();
    assert_eq!(engine.layer_ids(), STOP_LAYER_IDS.to_vec());
}

#[test]
fn rejected_engine_call_leaves_registry_matching_engine() {
    let mut engine = HeadlessEngine::new(view());
    let mut session = loaded(&mut engine, vec![markt()]);

    engine.fail_next("context lost");
    let err = session
        .select_itinerary(Some(itinerary()), &mut engine)
        .unwrap_err();
    assert!(matches!(err, LayerError::Engine { .. }));

    let registry_layers: Vec<&str> = session.registry().layer_ids().collect();
    assert_eq!(registry_layers, engine.layer_ids());

    // The next render completes the transition.
    session.sync_layers(&mut engine).unwrap();
    assert_eq!(engine.layer_ids().len(), STOP_LAYER_IDS.len() + ITINERARY_LAYER_IDS.len());
}

#[test]
fn clicking_a_stop_selects_it() {
    let mut engine = HeadlessEngine::new(view());
    let mut session = loaded(&mut engine, vec![markt()]);

    let outcome = session
        .on_event(click(STOPS_LAYER, Some("de:14713:10818")), &mut engine)
        .unwrap();
    assert!(matches!(outcome, SessionOutcome::StopSelected(ref id) if id == "de:14713:10818"));

    let outcome = session.on_event(click("tram-layer", Some("x")), &mut engine).unwrap();
    assert!(matches!(outcome, SessionOutcome::None));

    let outcome = session.on_event(click(STOPS_LAYER, None), &mut engine).unwrap();
    assert!(matches!(outcome, SessionOutcome::None));
}

#[test]
fn hover_toggles_pointer() {
    let mut engine = HeadlessEngine::new(view());
    let mut session = loaded(&mut engine, Vec::new());

    session
        .on_event(MapEvent::Hover { layer: Some(STOPS_LAYER.to_string()) }, &mut engine)
        .unwrap();
    assert!(session.pointer_active());

    session.on_event(MapEvent::Hover { layer: None }, &mut engine).unwrap();
    assert!(!session.pointer_active());
}

#[test]
fn timeline_uses_session_classifier() {
    let mut engine = HeadlessEngine::new(view());
    let mut session = loaded(&mut engine, Vec::new());
    assert!(session.timeline().is_none());

    session.select_itinerary(Some(itinerary()), &mut engine).unwrap();
    let timeline = session.timeline().unwrap();
    assert_eq!(timeline.entries().len(), 2);
    assert_eq!(timeline.total_walk_secs(), 480);
}

#[tokio::test]
async fn run_stop_fetch_serves_box() {
    let mut engine = HeadlessEngine::new(view());
    let mut session = MapSession::default();
    let service = MockStopClient::new(vec![markt(), stop("dd", "Postplatz", 51.05, 13.73)]);

    let fetch = expect_fetch(session.on_event(MapEvent::StyleLoaded, &mut engine).unwrap());
    let (ticket, result) = run_stop_fetch(&service, fetch, Duration::from_secs(1)).await;
    assert_eq!(result.as_ref().map(Vec::len), Ok(1));

    assert!(session.apply_stops(ticket, result, &mut engine).unwrap());
    assert_eq!(engine.source(STOPS_SOURCE).unwrap().features.len(), 1);
}

#[tokio::test]
async fn superseded_fetch_is_cancelled() {
    let mut engine = HeadlessEngine::new(view());
    let mut session = MapSession::default();
    let service = MockStopClient::new(vec![markt()]);

    let first = expect_fetch(session.on_event(MapEvent::StyleLoaded, &mut engine).unwrap());
    engine.set_bounds(far_view());
    let _second = expect_fetch(session.on_event(MapEvent::MoveEnd, &mut engine).unwrap());

    let (_, result) = run_stop_fetch(&service, first, Duration::from_secs(1)).await;
    assert_eq!(result, Err(FetchError::Cancelled));
}

struct SlowStops;

impl StopService for SlowStops {
    async fn stops(&self, _bbox: &str) -> Result<Vec<StopRecord>, StopError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn slow_fetch_times_out() {
    let mut engine = HeadlessEngine::new(view());
    let mut session = MapSession::default();

    let fetch = expect_fetch(session.on_event(MapEvent::StyleLoaded, &mut engine).unwrap());
    let timeout = Duration::from_millis(20);
    let (ticket, result) = run_stop_fetch(&SlowStops, fetch, timeout).await;
    assert_eq!(result, Err(FetchError::Timeout(timeout)));

    session.apply_stops(ticket, result, &mut engine).unwrap();
    assert!(matches!(session.stop_status(), FetchStatus::Failed(FetchError::Timeout(_))));
}
