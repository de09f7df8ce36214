//! Start and exit node ranking.
//!
//! Two related heuristics pick where a route enters and leaves the indoor
//! network:
//!
//! - [`rank_start_nodes`] orders candidate entrances for a connected target.
//!   Candidates that would take the user farther from the destination than
//!   the leeway allows are dropped; the rest are scored by distance from the
//!   user, inflated by how far off the user-to-destination heading they lie.
//! - [`select_exit_node`] picks the tunnel exit for a disconnected target by
//!   trading an estimated tunnel length against the outdoor walk that
//!   remains, weighted by the caller's [`RoutingPreference`].

use std::cmp::Ordering;

use tracing::debug;

use crate::config::{RoutingConfig, RoutingPreference};
use crate::error::{Error, Result};
use crate::geo::{self, Coordinates};
use crate::store::BuildingNode;

/// A start-node candidate with the values used to rank it.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidate {
    pub node: BuildingNode,
    /// Weighted cost, lower is better.
    pub cost: f64,
    /// Misalignment with the user-to-destination heading, in `[0, 1]`.
    pub angle_ratio: f64,
    /// Straight-line distance from the user, in kilometers.
    pub distance_km: f64,
    pub is_target: bool,
}

/// Rank entry candidates for a route from `user` to the building `target`.
///
/// Returns at most `limit` candidates, best first. Fails with
/// [`Error::TargetNotInCandidates`] when no candidate belongs to `target`.
pub fn rank_start_nodes(
    user: Coordinates,
    target: &str,
    candidates: &[BuildingNode],
    config: &RoutingConfig,
    limit: usize,
) -> Result<Vec<RankedCandidate>> {
    let destination = candidates
        .iter()
        .find(|candidate| candidate.building_name == target)
        .ok_or_else(|| Error::TargetNotInCandidates {
            name: target.to_string(),
        })?
        .coordinates();

    let user_to_destination = geo::distance(user, destination);
    let max_remaining = user_to_destination * config.forward_leeway_factor;
    let heading = geo::bearing(user, destination);

    let mut ranked: Vec<RankedCandidate> = candidates
        .iter()
        .filter(|candidate| geo::distance(candidate.coordinates(), destination) <= max_remaining)
        .map(|candidate| {
            let position = candidate.coordinates();
            let distance_km = geo::distance(user, position);
            let angle = geo::angular_difference(heading, geo::bearing(user, position));
            let angle_ratio = angle / 180.0;
            RankedCandidate {
                node: candidate.clone(),
                cost: distance_km * (1.0 + config.direction_angle_weight * angle_ratio),
                angle_ratio,
                distance_km,
                is_target: candidate.building_name == target,
            }
        })
        .collect();

    if ranked.len() > 1 {
        for candidate in ranked.iter_mut().filter(|candidate| candidate.is_target) {
            candidate.cost *= config.target_penalty_multiplier;
        }
    }

    ranked.sort_by(compare_ranked);
    ranked.truncate(limit);

    if let Some(best) = ranked.first() {
        debug!(
            target,
            start = %best.node.building_name,
            node = %best.node.id,
            cost = best.cost,
            "ranked start nodes"
        );
    }
    Ok(ranked)
}

fn compare_ranked(a: &RankedCandidate, b: &RankedCandidate) -> Ordering {
    total(a.cost, b.cost)
        .then_with(|| total(a.angle_ratio, b.angle_ratio))
        .then_with(|| a.is_target.cmp(&b.is_target))
        .then_with(|| total(a.distance_km, b.distance_km))
        .then_with(|| a.node.building_name.cmp(&b.node.building_name))
        .then_with(|| a.node.id.cmp(&b.node.id))
}

fn total(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}

/// Pick the indoor exit to use on the way to a disconnected building.
///
/// Only nodes strictly within the configured radius of `target` compete; when
/// none do, the single node closest to `target` is used instead. Returns
/// `None` only for an empty node list.
pub fn select_exit_node(
    nodes: &[BuildingNode],
    target: Coordinates,
    user: Coordinates,
    preference: RoutingPreference,
    config: &RoutingConfig,
) -> Option<BuildingNode> {
    let nearby: Vec<&BuildingNode> = nodes
        .iter()
        .filter(|node| geo::distance(node.coordinates(), target) < config.max_exit_radius_km)
        .collect();

    let pool = if nearby.is_empty() {
        let closest = nodes.iter().min_by(|a, b| {
            total(
                geo::distance(a.coordinates(), target),
                geo::distance(b.coordinates(), target),
            )
        })?;
        debug!(
            exit = %closest.building_name,
            "no exit within radius, falling back to closest node"
        );
        vec![closest]
    } else {
        nearby
    };

    let penalty = config.outdoor_penalty(preference);
    let exit = pool
        .into_iter()
        .map(|node| {
            let tunnel_estimate =
                geo::distance(user, node.coordinates()) * config.tunnel_estimate_factor;
            let outdoor = geo::distance(node.coordinates(), target);
            (tunnel_estimate + outdoor * penalty, node)
        })
        .min_by(|(cost_a, a), (cost_b, b)| {
            total(*cost_a, *cost_b)
                .then_with(|| a.building_name.cmp(&b.building_name))
                .then_with(|| a.id.cmp(&b.id))
        })
        .map(|(_, node)| node.clone());

    if let Some(exit) = &exit {
        debug!(exit = %exit.building_name, node = %exit.id, %preference, "selected exit node");
    }
    exit
}

/// The candidate closest to `user`, provided it lies within `threshold_meters`.
pub fn find_user_inside_building(
    candidates: &[BuildingNode],
    user: Coordinates,
    threshold_meters: f64,
) -> Option<&BuildingNode> {
    candidates
        .iter()
        .map(|node| (geo::distance_meters(user, node.coordinates()), node))
        .filter(|(meters, _)| *meters <= threshold_meters)
        .min_by(|(a, _), (b, _)| total(*a, *b))
        .map(|(_, node)| node)
}
