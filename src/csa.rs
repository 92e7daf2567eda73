//! Component D: the connection scan kernel itself — a single pass over a
//! time-sorted connection array, forward (earliest arrival) or reverse
//! (latest departure).
//!
//! Grounded on the teacher crate's `csa.rs`, which already walks
//! `network.connections` in departure order updating a `tau` array; this
//! rewrite completes it with trip state, footpath propagation, a reverse
//! sweep, and journey reconstruction via back-pointers recorded in
//! [`QueryScratch`] instead of a flat `tau`/`Boarding` pair.

use crate::error::{Error, NoRoutingReason, Result};
use crate::journey::Journey;
use crate::loader::WalkTimeOracle;
use crate::network::{Network, NodeIndex, Seconds, INFINITE_SECONDS};
use crate::params::QueryParameters;
use crate::reset;
use crate::scratch::{ArrivalSource, QueryScratch};
use crate::utils::ceil_div_speed;

fn propagate_transfers_forward(network: &Network, params: &QueryParameters, scratch: &mut QueryScratch, from_node: NodeIndex, base_time: Seconds) {
    for footpath in network.footpaths_from(from_node) {
        let duration = ceil_div_speed(footpath.walk_seconds, params.walking_speed_factor);
        if duration > params.max_transfer_travel_time_seconds {
            continue;
        }
        let to_node = footpath.to_node_idx;
        let candidate = base_time + duration + params.min_waiting_time_seconds;
        if candidate < scratch.nodes_tentative_time[to_node as usize] {
            scratch.touch_node(to_node);
            scratch.set_forward_tentative_time(to_node, candidate, ArrivalSource::Transfer(from_node));
        }
    }
}

fn propagate_transfers_reverse(network: &Network, params: &QueryParameters, scratch: &mut QueryScratch, dep_node: NodeIndex, dep_time: Seconds) {
    for footpath in network.footpaths_from(dep_node) {
        let duration = ceil_div_speed(footpath.walk_seconds, params.walking_speed_factor);
        if duration > params.max_transfer_travel_time_seconds {
            continue;
        }
        let via_node = footpath.to_node_idx;
        let candidate = dep_time.saturating_sub(duration).saturating_sub(params.min_waiting_time_seconds);
        if candidate > scratch.nodes_reverse_tentative_time[via_node as usize] {
            scratch.touch_node(via_node);
            scratch.set_reverse_tentative_time(via_node, candidate, ArrivalSource::Transfer(dep_node));
        }
    }
}

/// Runs one forward sweep (earliest arrival) over `network.forward_order`,
/// improving `scratch.nodes_tentative_time` in place.
pub fn run_forward_sweep(network: &Network, params: &QueryParameters, scratch: &mut QueryScratch) {
    for &idx in &network.forward_order {
        let connection = &network.connections[idx as usize];
        let trip_idx = connection.trip_idx;
        if !scratch.trips_enabled[trip_idx as usize] {
            continue;
        }

        if !scratch.trips_usable[trip_idx as usize] && connection.can_board {
            let dep_node_time = scratch.nodes_tentative_time[connection.dep_node_idx as usize];
            if dep_node_time <= connection.dep_time && dep_node_time != INFINITE_SECONDS {
                let wait = connection.dep_time - dep_node_time;
                let boarding_from_access = scratch.nodes_arrival_source[connection.dep_node_idx as usize] == ArrivalSource::Access;
                let allowed =
                    if boarding_from_access { wait <= params.max_first_waiting_time_seconds } else { wait >= params.min_waiting_time_seconds };
                if allowed {
                    scratch.touch_trip(trip_idx);
                    scratch.trips_usable[trip_idx as usize] = true;
                    scratch.trips_enter_connection[trip_idx as usize] = Some(idx);
                }
            }
        }

        if scratch.trips_usable[trip_idx as usize] && connection.can_unboard {
            let arr_node = connection.arr_node_idx;
            if connection.arr_time < scratch.nodes_tentative_time[arr_node as usize] {
                scratch.touch_node(arr_node);
                scratch.set_forward_tentative_time(arr_node, connection.arr_time, ArrivalSource::Connection(idx));
                scratch.trips_exit_connection[trip_idx as usize] = Some(idx);
                propagate_transfers_forward(network, params, scratch, arr_node, connection.arr_time);
            }
        }
    }
}

/// Runs one reverse sweep (latest departure) over `network.reverse_order`.
pub fn run_reverse_sweep(network: &Network, params: &QueryParameters, scratch: &mut QueryScratch) {
    for &idx in &network.reverse_order {
        let connection = &network.connections[idx as usize];
        let trip_idx = connection.trip_idx;
        if !scratch.trips_enabled[trip_idx as usize] {
            continue;
        }

        if !scratch.trips_usable[trip_idx as usize] && connection.can_unboard {
            let arr_node_time = scratch.nodes_reverse_tentative_time[connection.arr_node_idx as usize];
            if arr_node_time > 0 && connection.arr_time <= arr_node_time {
                let wait = arr_node_time - connection.arr_time;
                let unboarding_to_egress = scratch.nodes_reverse_arrival_source[connection.arr_node_idx as usize] == ArrivalSource::Access;
                let allowed =
                    if unboarding_to_egress { wait <= params.max_first_waiting_time_seconds } else { wait >= params.min_waiting_time_seconds };
                if allowed {
                    scratch.touch_trip(trip_idx);
                    scratch.trips_usable[trip_idx as usize] = true;
                    scratch.trips_exit_connection[trip_idx as usize] = Some(idx);
                }
            }
        }

        if scratch.trips_usable[trip_idx as usize] && connection.can_board {
            let dep_node = connection.dep_node_idx;
            if connection.dep_time > scratch.nodes_reverse_tentative_time[dep_node as usize] {
                scratch.touch_node(dep_node);
                scratch.set_reverse_tentative_time(dep_node, connection.dep_time, ArrivalSource::Connection(idx));
                scratch.trips_enter_connection[trip_idx as usize] = Some(idx);
                propagate_transfers_reverse(network, params, scratch, dep_node, connection.dep_time);
            }
        }
    }
}

fn best_forward_egress(scratch: &QueryScratch, egress: &[(NodeIndex, Seconds)]) -> Option<(NodeIndex, Seconds, Seconds)> {
    egress
        .iter()
        .filter(|&&(node, _)| scratch.nodes_tentative_time[node as usize] != INFINITE_SECONDS)
        .map(|&(node, duration)| (node, duration, scratch.nodes_tentative_time[node as usize] + duration))
        .min_by_key(|&(_, _, arrival)| arrival)
}

fn best_reverse_access(scratch: &QueryScratch, access: &[(NodeIndex, Seconds)]) -> Option<(NodeIndex, Seconds, Seconds)> {
    access
        .iter()
        .filter(|&&(node, _)| scratch.nodes_reverse_tentative_time[node as usize] > 0)
        .map(|&(node, duration)| (node, duration, scratch.nodes_reverse_tentative_time[node as usize].saturating_sub(duration)))
        .max_by_key(|&(_, _, departure)| departure)
}

/// Sweeps in the requested direction over an already-prepared scratch
/// (access/egress seeded, trip mask built) and reconstructs the winning
/// itinerary. Shared by a standalone query and a batch run, which prepares
/// scratch differently (trip mask rebuilt once, not per OD trip).
pub fn sweep_and_reconstruct(
    network: &Network,
    params: &QueryParameters,
    scratch: &mut QueryScratch,
    access: &[(NodeIndex, Seconds)],
    egress: &[(NodeIndex, Seconds)],
) -> Result<Journey> {
    let journey = if params.is_forward() {
        run_forward_sweep(network, params, scratch);
        let (node, duration, _) = best_forward_egress(scratch, egress).ok_or(Error::NoRoutingFound(NoRoutingReason::NoRoutingFound))?;
        Journey::reconstruct_forward(network, scratch, node, duration).map_err(|e| Error::Internal(e.to_string()))?
    } else {
        run_reverse_sweep(network, params, scratch);
        let (node, duration, _) = best_reverse_access(scratch, access).ok_or(Error::NoRoutingFound(NoRoutingReason::NoRoutingFound))?;
        Journey::reconstruct_reverse(network, scratch, node, duration).map_err(|e| Error::Internal(e.to_string()))?
    };

    if journey.travel_time() > params.max_total_travel_time_seconds {
        return Err(Error::NoRoutingFound(NoRoutingReason::NoRoutingFound));
    }

    Ok(journey)
}

/// Runs a complete query: resets scratch, resolves access/egress, sweeps in
/// the requested direction, and reconstructs the winning itinerary.
pub fn calculate_journey(network: &Network, params: &QueryParameters, oracle: &dyn WalkTimeOracle, scratch: &mut QueryScratch) -> Result<Journey> {
    let (access, egress) = reset::prepare_query(network, params, oracle, scratch)?;
    sweep_and_reconstruct(network, params, scratch, &access, &egress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::NoWalkOracle;
    use crate::network::{Agency, Connection, Footpath, Line, Mode, Node, Path, Point, Scenario, Service, Trip};
    use crate::params::TimeType;
    use std::collections::HashMap;
    use uuid::Uuid;

    /// A single line S1 -> S2 -> S3 with one trip departing S1 at 09:50:00.
    fn single_line_network() -> Network {
        let nodes = vec![
            Node { uuid: Uuid::nil(), point: Point { longitude: 0.0, latitude: 0.0 } },
            Node { uuid: Uuid::nil(), point: Point { longitude: 0.0, latitude: 1.0 } },
            Node { uuid: Uuid::nil(), point: Point { longitude: 0.0, latitude: 2.0 } },
        ];
        let connections = vec![
            Connection { index: 0, dep_node_idx: 0, arr_node_idx: 1, dep_time: 35400, arr_time: 35550, trip_idx: 0, can_board: true, can_unboard: true, sequence_in_trip: 0 },
            Connection { index: 1, dep_node_idx: 1, arr_node_idx: 2, dep_time: 35580, arr_time: 35700, trip_idx: 0, can_board: true, can_unboard: true, sequence_in_trip: 1 },
        ];
        let mut network = Network {
            nodes,
            node_uuid_index: HashMap::new(),
            agencies: vec![Agency { uuid: Uuid::nil(), acronym: "A".into() }],
            modes: vec![Mode { uuid: Uuid::nil(), short_name: "bus".into() }],
            services: vec![Service { uuid: Uuid::nil(), name: "weekday".into(), date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() }],
            lines: vec![Line { uuid: Uuid::nil(), short_name: "1".into(), long_name: "Line 1".into(), agency_idx: 0, mode_idx: 0 }],
            paths: vec![Path { uuid: Uuid::nil(), line_idx: 0, nodes: vec![0, 1, 2] }],
            trips: vec![Trip { uuid: Uuid::nil(), line_idx: 0, path_idx: 0, service_idx: 0, agency_idx: 0, mode_idx: 0, first_connection_idx: 0, num_segments: 2 }],
            connections,
            forward_order: Vec::new(),
            reverse_order: Vec::new(),
            footpaths_from: vec![Vec::new(), Vec::new(), Vec::new()],
            scenarios: vec![Scenario { services: vec![0], ..Scenario::default() }],
            scenario_uuid_index: HashMap::new(),
            od_trips: Vec::new(),
        };
        network.build_connection_orders();
        network
    }

    fn params_for(network: &Network, time_of_trip: Seconds, time_type: TimeType) -> QueryParameters {
        QueryParameters {
            origin: network.nodes[0].point,
            destination: network.nodes[2].point,
            scenario_idx: 0,
            time_of_trip,
            time_type,
            with_alternatives: false,
            min_waiting_time_seconds: 180,
            max_total_travel_time_seconds: INFINITE_SECONDS,
            max_access_travel_time_seconds: 1200,
            max_egress_travel_time_seconds: 1200,
            max_transfer_travel_time_seconds: 1200,
            max_first_waiting_time_seconds: 1800,
            walking_speed_factor: 1.0,
            access_nodes: Some(vec![(0, 0)]),
            egress_nodes: Some(vec![(2, 0)]),
            od_trip_idx: None,
        }
    }

    #[test]
    fn node_to_node_forward_query_finds_transit_departure() {
        let network = single_line_network();
        // 35220 + 0 (access) + 180 (min_waiting_time_seconds) = 35400, the
        // connection's own departure, for exact zero-slack boarding.
        let params = params_for(&network, 35220, TimeType::Departure);
        let mut scratch = QueryScratch::new(&network);
        let journey = calculate_journey(&network, &params, &NoWalkOracle, &mut scratch).unwrap();
        assert_eq!(journey.departure_time, 35220);
        assert_eq!(journey.arrival_time, 35700);
        assert_eq!(journey.number_of_boardings(), 1);
    }

    #[test]
    fn too_early_access_waits_for_first_departure() {
        let network = single_line_network();
        let mut params = params_for(&network, 35000, TimeType::Departure);
        params.access_nodes = Some(vec![(0, 0)]);
        let mut scratch = QueryScratch::new(&network);
        let journey = calculate_journey(&network, &params, &NoWalkOracle, &mut scratch).unwrap();
        assert_eq!(journey.arrival_time, 35700);
    }

    #[test]
    fn reverse_query_finds_latest_feasible_departure() {
        let network = single_line_network();
        let params = params_for(&network, 36000, TimeType::Arrival);
        let mut scratch = QueryScratch::new(&network);
        let journey = calculate_journey(&network, &params, &NoWalkOracle, &mut scratch).unwrap();
        assert_eq!(journey.arrival_time, 35700);
        assert_eq!(journey.departure_time, 35400);
    }

    #[test]
    fn no_service_in_scenario_reports_no_service_from_origin() {
        let mut network = single_line_network();
        network.scenarios[0].services = Vec::new();
        let params = params_for(&network, 35400, TimeType::Departure);
        let mut scratch = QueryScratch::new(&network);
        let err = calculate_journey(&network, &params, &NoWalkOracle, &mut scratch).unwrap_err();
        assert!(matches!(err, Error::NoRoutingFound(NoRoutingReason::NoServiceFromOrigin)));
    }

    /// Two independent lines joined by a 60-second footpath: node 0 -> 1 on
    /// trip 0, a walk from 1 to 2, then node 2 -> 3 on trip 1.
    fn footpath_transfer_network() -> Network {
        let nodes = vec![
            Node { uuid: Uuid::nil(), point: Point { longitude: 0.0, latitude: 0.0 } },
            Node { uuid: Uuid::nil(), point: Point { longitude: 0.0, latitude: 1.0 } },
            Node { uuid: Uuid::nil(), point: Point { longitude: 0.0, latitude: 2.0 } },
            Node { uuid: Uuid::nil(), point: Point { longitude: 0.0, latitude: 3.0 } },
        ];
        let connections = vec![
            Connection { index: 0, dep_node_idx: 0, arr_node_idx: 1, dep_time: 35400, arr_time: 35550, trip_idx: 0, can_board: true, can_unboard: true, sequence_in_trip: 0 },
            Connection { index: 1, dep_node_idx: 2, arr_node_idx: 3, dep_time: 36000, arr_time: 36150, trip_idx: 1, can_board: true, can_unboard: true, sequence_in_trip: 0 },
        ];
        let mut network = Network {
            nodes,
            node_uuid_index: HashMap::new(),
            agencies: vec![Agency { uuid: Uuid::nil(), acronym: "A".into() }],
            modes: vec![Mode { uuid: Uuid::nil(), short_name: "bus".into() }],
            services: vec![Service { uuid: Uuid::nil(), name: "weekday".into(), date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() }],
            lines: vec![Line { uuid: Uuid::nil(), short_name: "1".into(), long_name: "Line 1".into(), agency_idx: 0, mode_idx: 0 }],
            paths: vec![Path { uuid: Uuid::nil(), line_idx: 0, nodes: vec![0, 1] }, Path { uuid: Uuid::nil(), line_idx: 0, nodes: vec![2, 3] }],
            trips: vec![
                Trip { uuid: Uuid::nil(), line_idx: 0, path_idx: 0, service_idx: 0, agency_idx: 0, mode_idx: 0, first_connection_idx: 0, num_segments: 1 },
                Trip { uuid: Uuid::nil(), line_idx: 0, path_idx: 1, service_idx: 0, agency_idx: 0, mode_idx: 0, first_connection_idx: 1, num_segments: 1 },
            ],
            connections,
            forward_order: Vec::new(),
            reverse_order: Vec::new(),
            footpaths_from: vec![Vec::new(), vec![Footpath { from_node_idx: 1, to_node_idx: 2, walk_seconds: 60 }], Vec::new(), Vec::new()],
            scenarios: vec![Scenario { services: vec![0], ..Scenario::default() }],
            scenario_uuid_index: HashMap::new(),
            od_trips: Vec::new(),
        };
        network.build_connection_orders();
        network
    }

    #[test]
    fn footpath_transfer_with_enough_slack_succeeds() {
        let network = footpath_transfer_network();
        // 35220 + 0 + 180 = 35400: zero-slack access boarding onto trip 0.
        // Arriving at node 1 at 35550, the footpath relaxation stores
        // 35550 + 60 + 180 = 35790 at node 2, well under trip 1's 36000
        // departure, so the non-access min-waiting-time check on top of it
        // still has 210 seconds of room.
        let mut params = params_for(&network, 35220, TimeType::Departure);
        params.access_nodes = Some(vec![(0, 0)]);
        params.egress_nodes = Some(vec![(3, 0)]);
        let mut scratch = QueryScratch::new(&network);
        let journey = calculate_journey(&network, &params, &NoWalkOracle, &mut scratch).unwrap();
        assert_eq!(journey.number_of_boardings(), 2);
        assert_eq!(journey.arrival_time, 36150);
    }

    #[test]
    fn footpath_transfer_one_second_short_of_slack_fails() {
        let mut network = footpath_transfer_network();
        // Node 2's stored tentative time is 35790; giving trip 1 a departure
        // one second under the 180-second floor above that (35969) leaves
        // the re-boarding min-waiting-time check unsatisfied.
        network.connections[1].dep_time = 35969;
        network.connections[1].arr_time = 36119;
        network.build_connection_orders();
        let mut params = params_for(&network, 35220, TimeType::Departure);
        params.access_nodes = Some(vec![(0, 0)]);
        params.egress_nodes = Some(vec![(3, 0)]);
        let mut scratch = QueryScratch::new(&network);
        let err = calculate_journey(&network, &params, &NoWalkOracle, &mut scratch).unwrap_err();
        assert!(matches!(err, Error::NoRoutingFound(NoRoutingReason::NoRoutingFound)));
    }
}
