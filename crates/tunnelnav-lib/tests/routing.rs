mod common;

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tempfile::tempdir;
use tunnelnav_lib::{
    load_campus, ErrorKind, InstructionKind, Result, RouteComposer, RouteRequest, RoutingConfig,
    RoutingPreference, SegmentType, StraightLineDirections, ThrottledVisitCounter,
};

fn composer() -> Result<RouteComposer> {
    let campus = load_campus(&common::campus_fixture())?;
    Ok(RouteComposer::new(
        Arc::new(campus),
        Arc::new(StraightLineDirections::default()),
    ))
}

#[test]
fn route_to_connected_building() -> Result<()> {
    let route = composer()?.compose(&RouteRequest::new("Northrop", 44.9725, -93.2350))?;

    assert_eq!(
        route.segment_types(),
        vec![SegmentType::Outdoor, SegmentType::Indoor]
    );
    let indoor = &route.segments[1].steps;
    assert_eq!(indoor.first().map(|s| s.node.building_name.as_str()), Some("Coffman Union"));
    assert_eq!(indoor.last().map(|s| s.node.building_name.as_str()), Some("Northrop"));
    assert!(indoor
        .iter()
        .any(|s| s.instruction.as_ref().map(|i| i.kind) == Some(InstructionKind::Elevator)));
    assert!(route.total_distance_meters > 384.0);
    Ok(())
}

#[test]
fn route_to_disconnected_building_from_sqlite_campus() -> Result<()> {
    let dir = tempdir()?;
    let db_path = dir.path().join("campus.db");
    common::write_sqlite_campus(&db_path);

    let composer = RouteComposer::new(
        Arc::new(load_campus(&db_path)?),
        Arc::new(StraightLineDirections::default()),
    );
    let route = composer.compose(
        &RouteRequest::new("pillsbury hall", 44.9725, -93.2350)
            .with_preference(RoutingPreference::Indoor),
    )?;

    assert_eq!(
        route.segment_types(),
        vec![SegmentType::Outdoor, SegmentType::Indoor, SegmentType::Outdoor]
    );
    let arrival = route.segments[2]
        .steps
        .last()
        .and_then(|s| s.instruction.clone())
        .expect("final instruction");
    assert_eq!(arrival.kind, InstructionKind::Final);
    assert_eq!(arrival.label, "Arrive at Pillsbury Hall");
    Ok(())
}

#[test]
fn every_step_after_the_first_has_an_instruction() -> Result<()> {
    let route = composer()?.compose(&RouteRequest::new("Morrill Hall", 44.9725, -93.2350))?;
    let steps: Vec<_> = route.segments.iter().flat_map(|s| s.steps.iter()).collect();
    assert!(steps.iter().skip(1).all(|s| s.instruction.is_some()));
    Ok(())
}

#[test]
fn configuration_changes_direct_walk_threshold() -> Result<()> {
    let config = RoutingConfig {
        min_direct_walk_meters: 1_000.0,
        ..RoutingConfig::default()
    };
    let route = composer()?
        .with_config(config)
        .compose(&RouteRequest::new("Northrop", 44.9725, -93.2350))?;
    assert_eq!(route.segment_types(), vec![SegmentType::Outdoor]);
    Ok(())
}

#[test]
fn unknown_building_is_target_not_found() -> Result<()> {
    let err = composer()?
        .compose(&RouteRequest::new("Walter Libary", 44.9725, -93.2350))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TargetNotFound);
    assert!(err.to_string().contains("Walter Library"));
    Ok(())
}

#[test]
fn route_result_serializes_for_transport() -> Result<()> {
    let visits = Arc::new(ThrottledVisitCounter::default());
    let route = composer()?
        .with_visit_counter(visits.clone())
        .compose(&RouteRequest::new("Northrop", 44.9725, -93.2350))?;

    let value = serde_json::to_value(&route)?;
    assert_eq!(value["segments"][0]["segmentType"], "outdoor");
    assert_eq!(value["segments"][1]["steps"][0]["buildingName"], "Coffman Union");
    assert!(value["totalDistanceMeters"].as_f64().unwrap_or_default() > 0.0);
    let deadline = Instant::now() + Duration::from_secs(5);
    while visits.popular(5).is_empty() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(10));
    }
    assert_eq!(visits.popular(5), vec![("Northrop".to_string(), 1)]);
    Ok(())
}
