use std::sync::Arc;
use std::thread;

use tracing::{debug, info, warn};

use super::{aggregate, RouteRequest, RouteResult};
use crate::classify::{
    classify, resolve_connected_candidates, resolve_disconnected_candidates, TargetClassification,
};
use crate::config::RoutingConfig;
use crate::directions::DirectionsProvider;
use crate::error::{Error, Result};
use crate::geo;
use crate::segment::{Instruction, InstructionKind, IndoorSegmentBuilder, OutdoorSegmentBuilder};
use crate::selection::{find_user_inside_building, rank_start_nodes, select_exit_node};
use crate::store::{BuildingNode, GraphStore};
use crate::visits::{NoopVisitCounter, VisitCounter};

/// Stitches outdoor and indoor segments into a [`RouteResult`].
///
/// Collaborators are injected once and shared by every request; the composer
/// itself holds no per-request state and can be used from many threads.
#[derive(Clone)]
pub struct RouteComposer {
    store: Arc<dyn GraphStore>,
    directions: Arc<dyn DirectionsProvider>,
    visits: Arc<dyn VisitCounter>,
    config: RoutingConfig,
}

impl RouteComposer {
    pub fn new(store: Arc<dyn GraphStore>, directions: Arc<dyn DirectionsProvider>) -> Self {
        Self {
            store,
            directions,
            visits: Arc::new(NoopVisitCounter),
            config: RoutingConfig::default(),
        }
    }

    pub fn with_visit_counter(mut self, visits: Arc<dyn VisitCounter>) -> Self {
        self.visits = visits;
        self
    }

    pub fn with_config(mut self, config: RoutingConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    /// Compute a route for `request`.
    ///
    /// Fails without a partial result when input is invalid, the target is
    /// unknown, no candidate or indoor path exists, or the store errors.
    /// Outdoor legs are optional and silently dropped when the directions
    /// provider fails.
    pub fn compose(&self, request: &RouteRequest) -> Result<RouteResult> {
        let user = request.user_location();
        let target = request.target_building_name.trim();
        if target.is_empty() {
            return Err(Error::invalid_input("target building name must not be empty"));
        }
        if !user.is_valid() {
            return Err(Error::invalid_input(format!(
                "user coordinates ({}, {}) are out of range",
                request.user_latitude, request.user_longitude
            )));
        }

        let store = self.store.as_ref();
        let target = classify(store, target)?;
        let candidates = if target.is_disconnected {
            resolve_disconnected_candidates(store, &target.name)?
        } else {
            resolve_connected_candidates(store, &target.name, self.config.max_connected_hops)?
        };

        let inside =
            find_user_inside_building(&candidates, user, self.config.inside_building_meters)
                .cloned();
        if let Some(node) = &inside {
            debug!(building = %node.building_name, node = %node.id, "user is inside the network");
        }

        if let Some(route) = self.try_direct_walk(&target, request, inside.is_some()) {
            self.record_visit(&target.name);
            return Ok(route);
        }

        let routing_target = if target.is_disconnected {
            let preference = request
                .preference
                .unwrap_or(self.config.default_preference);
            select_exit_node(&candidates, target.coordinates, user, preference, &self.config)
                .map(|exit| exit.building_name)
                .ok_or_else(|| Error::NoCandidates {
                    target: target.name.clone(),
                })?
        } else {
            target.name.clone()
        };

        let start_inside = inside.is_some();
        let start = match inside {
            Some(node) => node,
            None => self.select_start_node(request, &routing_target, &candidates)?,
        };
        debug!(
            start = %start.building_name,
            routing_target = %routing_target,
            "routing through the indoor network"
        );

        let outdoor = OutdoorSegmentBuilder::new(self.directions.as_ref());
        let indoor = IndoorSegmentBuilder::new(store, self.config.forward_turn_threshold_degrees);

        let (first, indoor, second) = thread::scope(|scope| {
            let first_leg = (!start_inside).then(|| {
                let enter = Instruction::new(
                    InstructionKind::Enter,
                    format!("Enter {}", start.building_name),
                );
                let destination = start.coordinates();
                let outdoor = &outdoor;
                scope.spawn(move || outdoor.build(user, destination, enter))
            });

            let indoor = indoor.build(&start.building_name, &routing_target);

            let second = match &indoor {
                Ok(segment) if target.is_disconnected => {
                    segment.steps.last().and_then(|exit| {
                        outdoor.build(exit.coordinates(), target.coordinates, arrive_at(&target))
                    })
                }
                _ => None,
            };

            let first = first_leg.and_then(|handle| {
                handle.join().unwrap_or_else(|_| {
                    warn!("outdoor leg worker panicked, dropping first leg");
                    None
                })
            });

            (first, indoor, second)
        });

        let indoor = indoor?;
        if target.is_disconnected && second.is_none() {
            warn!(target = %target.name, "final outdoor leg unavailable");
        }

        let route = aggregate(first, indoor, second, self.config.indoor_walking_speed);
        info!(
            target = %target.name,
            segments = route.segments.len(),
            distance_m = route.total_distance_meters,
            time_s = route.total_time_seconds,
            "route composed"
        );
        self.record_visit(&target.name);
        Ok(route)
    }

    /// Plain outdoor walk when the user is already close to the target.
    ///
    /// Skipped when the user stands inside the network on the way to a
    /// connected building. A provider failure falls through to tunnel routing.
    fn try_direct_walk(
        &self,
        target: &TargetClassification,
        request: &RouteRequest,
        user_inside: bool,
    ) -> Option<RouteResult> {
        let user = request.user_location();
        let meters = geo::distance_meters(user, target.coordinates);
        if meters >= self.config.min_direct_walk_meters {
            return None;
        }
        if user_inside && !target.is_disconnected {
            return None;
        }

        debug!(target = %target.name, meters, "attempting direct walk");
        let segment = OutdoorSegmentBuilder::new(self.directions.as_ref()).build(
            user,
            target.coordinates,
            arrive_at(target),
        );
        if segment.is_none() {
            warn!(target = %target.name, "direct walk unavailable, falling back to tunnel routing");
        }
        segment.map(RouteResult::direct)
    }

    fn select_start_node(
        &self,
        request: &RouteRequest,
        routing_target: &str,
        candidates: &[BuildingNode],
    ) -> Result<BuildingNode> {
        rank_start_nodes(
            request.user_location(),
            routing_target,
            candidates,
            &self.config,
            self.config.max_start_nodes,
        )?
        .into_iter()
        .next()
        .map(|ranked| ranked.node)
        .ok_or_else(|| Error::NoCandidates {
            target: routing_target.to_string(),
        })
    }

    /// Fire-and-forget visit increment on a detached worker.
    fn record_visit(&self, building: &str) {
        let visits = Arc::clone(&self.visits);
        let building = building.to_string();
        let spawned = thread::Builder::new()
            .name("visit-counter".to_string())
            .spawn(move || {
                if let Err(err) = visits.increment_visit(&building) {
                    warn!(building = %building, error = %err, "failed to record building visit");
                }
            });
        if let Err(err) = spawned {
            warn!(error = %err, "failed to dispatch visit increment");
        }
    }
}

fn arrive_at(target: &TargetClassification) -> Instruction {
    Instruction::new(InstructionKind::Final, format!("Arrive at {}", target.name))
}
