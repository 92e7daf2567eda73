//! The reset/filter stage: clears scratch state left over from the
//! previous query, rebuilds the trip-enabled mask from the active
//! scenario and query-level include/exclude sets, and resolves the
//! access/egress footpaths the sweep will start from.
//!
//! Grounded on the original calculator's reset pass (`resets.cpp`): a
//! scenario's include sets narrow the universe, its exclude sets then
//! carve out of it, and a node exclusion is checked against the trip's
//! actual path membership rather than its mode — the source compared
//! excluded nodes against `modeIdx`, which this crate does not repeat.

use crate::error::{Error, NoRoutingReason, Result};
use crate::loader::WalkTimeOracle;
use crate::network::{Network, NodeIndex, Scenario, Seconds};
use crate::params::QueryParameters;
use crate::scratch::{ArrivalSource, QueryScratch};
use crate::utils;

fn trip_allowed_by_scenario(network: &Network, scenario: &Scenario, trip_idx: u32) -> bool {
    let trip = network.trip(trip_idx);

    if !scenario.only_lines.is_empty() && !scenario.only_lines.contains(&trip.line_idx) {
        return false;
    }
    if !scenario.only_agencies.is_empty() && !scenario.only_agencies.contains(&trip.agency_idx) {
        return false;
    }
    if !scenario.only_modes.is_empty() && !scenario.only_modes.contains(&trip.mode_idx) {
        return false;
    }
    if !scenario.only_nodes.is_empty() && !scenario.only_nodes.iter().any(|&n| network.trip_visits_node(trip_idx, n)) {
        return false;
    }

    if scenario.except_lines.contains(&trip.line_idx) {
        return false;
    }
    if scenario.except_agencies.contains(&trip.agency_idx) {
        return false;
    }
    if scenario.except_modes.contains(&trip.mode_idx) {
        return false;
    }
    if scenario.except_nodes.iter().any(|&n| network.trip_visits_node(trip_idx, n)) {
        return false;
    }

    true
}

/// Rebuilds `scratch.trips_enabled` from the scenario referenced by
/// `params`, plus the service the trip belongs to being part of the
/// scenario's service universe.
pub fn rebuild_trip_mask(network: &Network, scenario_idx: u32, scratch: &mut QueryScratch) {
    let scenario = &network.scenarios[scenario_idx as usize];
    for (trip_idx, trip) in network.trips.iter().enumerate() {
        let trip_idx = trip_idx as u32;
        let in_service = scenario.services.contains(&trip.service_idx);
        let enabled = in_service && trip_allowed_by_scenario(network, scenario, trip_idx);
        if enabled {
            scratch.touch_enabled_trip(trip_idx);
        }
        scratch.trips_enabled[trip_idx as usize] = enabled;
    }
}

fn resolve_walk_list(
    precomputed: Option<&[(NodeIndex, Seconds)]>,
    explicit: Option<&[(NodeIndex, Seconds)]>,
    oracle: &dyn WalkTimeOracle,
    point: crate::network::Point,
    walking_speed_factor: f64,
    max_travel_time: Seconds,
) -> Result<Vec<(NodeIndex, Seconds)>> {
    let raw: Vec<(NodeIndex, Seconds)> = if let Some(list) = precomputed {
        list.to_vec()
    } else if let Some(list) = explicit {
        list.to_vec()
    } else {
        oracle.walkable_nodes_from(point)?
    };

    Ok(raw
        .into_iter()
        .map(|(node, seconds)| (node, utils::ceil_div_speed(seconds, walking_speed_factor)))
        .filter(|&(_, seconds)| seconds <= max_travel_time)
        .collect())
}

/// Clears scratch, rebuilds the trip mask, and seeds access/egress travel
/// times from the origin/destination. Returns the resolved access and
/// egress lists so the caller can seed the forward/reverse sweeps.
pub fn prepare_query(
    network: &Network,
    params: &QueryParameters,
    oracle: &dyn WalkTimeOracle,
    scratch: &mut QueryScratch,
) -> Result<(Vec<(NodeIndex, Seconds)>, Vec<(NodeIndex, Seconds)>)> {
    scratch.reset();
    rebuild_trip_mask(network, params.scenario_idx, scratch);
    seed_access_egress(network, params, oracle, scratch)
}

/// Resolves and seeds access/egress travel times from the origin/
/// destination without touching the trip-enabled mask. Used directly by a
/// batch run that rebuilds the mask once and resets only node/usability
/// scratch between OD trips (see `batch.rs`).
pub fn seed_access_egress(
    network: &Network,
    params: &QueryParameters,
    oracle: &dyn WalkTimeOracle,
    scratch: &mut QueryScratch,
) -> Result<(Vec<(NodeIndex, Seconds)>, Vec<(NodeIndex, Seconds)>)> {
    let (od_access, od_egress) = match params.od_trip_idx {
        Some(idx) => {
            let od_trip = &network.od_trips[idx as usize];
            (Some(od_trip.origin_nodes.as_slice()), Some(od_trip.destination_nodes.as_slice()))
        }
        None => (None, None),
    };

    let access = resolve_walk_list(
        od_access,
        params.access_nodes.as_deref(),
        oracle,
        params.origin,
        params.walking_speed_factor,
        params.max_access_travel_time_seconds,
    )?;
    let egress = resolve_walk_list(
        od_egress,
        params.egress_nodes.as_deref(),
        oracle,
        params.destination,
        params.walking_speed_factor,
        params.max_egress_travel_time_seconds,
    )?;

    if access.is_empty() {
        return Err(Error::NoRoutingFound(NoRoutingReason::NoAccessAtOrigin));
    }
    if egress.is_empty() {
        return Err(Error::NoRoutingFound(NoRoutingReason::NoEgressAtDestination));
    }

    let any_enabled_trip_visits = |nodes: &[(NodeIndex, Seconds)]| {
        network
            .trips
            .iter()
            .enumerate()
            .any(|(trip_idx, _)| scratch.trips_enabled[trip_idx] && nodes.iter().any(|&(node, _)| network.trip_visits_node(trip_idx as u32, node)))
    };
    if !any_enabled_trip_visits(&access) {
        return Err(Error::NoRoutingFound(NoRoutingReason::NoServiceFromOrigin));
    }
    if !any_enabled_trip_visits(&egress) {
        return Err(Error::NoRoutingFound(NoRoutingReason::NoServiceToDestination));
    }

    for &(node_idx, seconds) in &access {
        scratch.touch_node(node_idx);
        scratch.nodes_access_travel_time[node_idx as usize] = seconds;
    }
    for &(node_idx, seconds) in &egress {
        scratch.touch_node(node_idx);
        scratch.nodes_egress_travel_time[node_idx as usize] = seconds;
    }

    if params.is_forward() {
        for &(node_idx, seconds) in &access {
            let arrival = params.time_of_trip + seconds + params.min_waiting_time_seconds;
            if arrival < scratch.nodes_tentative_time[node_idx as usize] {
                scratch.set_forward_tentative_time(node_idx, arrival, ArrivalSource::Access);
            }
        }
    } else {
        for &(node_idx, seconds) in &egress {
            let departure = params.time_of_trip.saturating_sub(seconds);
            if departure > scratch.nodes_reverse_tentative_time[node_idx as usize] {
                scratch.set_reverse_tentative_time(node_idx, departure, ArrivalSource::Access);
            }
        }
    }

    Ok((access, egress))
}
