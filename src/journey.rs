//! Journey reconstruction: walks the back-pointers a sweep left in
//! [`QueryScratch`] and turns them into an ordered sequence of steps.
//!
//! Grounded on the teacher crate's own `journey.rs` (`Leg`, `Journey`,
//! `JourneyError`, `from_tau`) — the shape of a `Leg`/`Journey` sequence
//! plus a `Display` impl survives, generalized from RAPTOR round labels to
//! the connection-by-connection back-pointers a connection scan produces.

use std::fmt;

use thiserror::Error;

use crate::network::{ConnectionIndex, Network, NodeIndex, Seconds, TripIndex};
use crate::scratch::{ArrivalSource, QueryScratch};
use crate::utils::get_time_str;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JourneyError {
    #[error("node {0} has no recorded arrival source to reconstruct from")]
    MissingArrivalSource(NodeIndex),
    #[error("trip {0} was marked usable but has no recorded boarding connection")]
    MissingBoardingConnection(TripIndex),
    #[error("journey reconstruction did not terminate within {0} legs")]
    TooManyLegs(usize),
}

const MAX_LEGS: usize = 64;

/// One step of a reconstructed itinerary, in chronological order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Walking from the query origin to `node`.
    Access { node: NodeIndex, departure_time: Seconds, arrival_time: Seconds },
    /// Boarding `trip_idx` at `node`, at its `connection_idx`-th segment
    /// (the entering connection — demand accumulation walks forward from
    /// here to the matching `Alight`'s connection).
    Board { node: NodeIndex, trip_idx: TripIndex, time: Seconds, connection_idx: ConnectionIndex },
    /// Alighting from `trip_idx` at `node`, at its exiting connection.
    Alight { node: NodeIndex, trip_idx: TripIndex, time: Seconds, connection_idx: ConnectionIndex },
    /// Walking between two network nodes.
    Transfer { from_node: NodeIndex, to_node: NodeIndex, departure_time: Seconds, arrival_time: Seconds },
    /// Walking from `node` to the query destination.
    Egress { node: NodeIndex, departure_time: Seconds, arrival_time: Seconds },
}

/// A complete, ordered itinerary from origin to destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Journey {
    pub steps: Vec<Step>,
    pub departure_time: Seconds,
    pub arrival_time: Seconds,
}

impl Journey {
    pub fn travel_time(&self) -> Seconds {
        self.arrival_time.saturating_sub(self.departure_time)
    }

    pub fn number_of_boardings(&self) -> usize {
        self.steps.iter().filter(|s| matches!(s, Step::Board { .. })).count()
    }

    pub fn number_of_transfers(&self) -> usize {
        self.number_of_boardings().saturating_sub(1)
    }

    /// Reconstructs the forward itinerary arriving at `destination_node`
    /// (an egress-reachable node) from the back-pointers a forward sweep
    /// left in `scratch`.
    pub fn reconstruct_forward(
        network: &Network,
        scratch: &QueryScratch,
        destination_node: NodeIndex,
        egress_duration: Seconds,
    ) -> std::result::Result<Journey, JourneyError> {
        let mut steps = Vec::new();
        let mut node = destination_node;
        let node_arrival_time = scratch.nodes_tentative_time[node as usize];
        steps.push(Step::Egress { node, departure_time: node_arrival_time, arrival_time: node_arrival_time + egress_duration });

        let mut legs = 0;
        loop {
            legs += 1;
            if legs > MAX_LEGS {
                return Err(JourneyError::TooManyLegs(MAX_LEGS));
            }
            let arrival_time = scratch.nodes_tentative_time[node as usize];
            match scratch.nodes_arrival_source[node as usize] {
                ArrivalSource::Access => {
                    let duration = scratch.nodes_access_travel_time[node as usize];
                    steps.push(Step::Access { node, departure_time: arrival_time.saturating_sub(duration), arrival_time });
                    break;
                }
                ArrivalSource::Transfer(from_node) => {
                    let from_arrival = scratch.nodes_tentative_time[from_node as usize];
                    steps.push(Step::Transfer { from_node, to_node: node, departure_time: from_arrival, arrival_time });
                    node = from_node;
                }
                ArrivalSource::Connection(conn_idx) => {
                    let connection = &network.connections[conn_idx as usize];
                    let trip_idx = connection.trip_idx;
                    steps.push(Step::Alight { node, trip_idx, time: arrival_time, connection_idx: conn_idx });

                    let enter_idx = scratch.trips_enter_connection[trip_idx as usize]
                        .ok_or(JourneyError::MissingBoardingConnection(trip_idx))?;
                    let enter_connection = &network.connections[enter_idx as usize];
                    steps.push(Step::Board {
                        node: enter_connection.dep_node_idx,
                        trip_idx,
                        time: enter_connection.dep_time,
                        connection_idx: enter_idx,
                    });
                    node = enter_connection.dep_node_idx;
                }
                ArrivalSource::None => return Err(JourneyError::MissingArrivalSource(node)),
            }
        }

        steps.reverse();
        let departure_time = match steps.first() {
            Some(Step::Access { departure_time, .. }) => *departure_time,
            _ => 0,
        };
        let arrival_time = match steps.last() {
            Some(Step::Egress { arrival_time, .. }) => *arrival_time,
            _ => node_arrival_time,
        };

        Ok(Journey { steps, departure_time, arrival_time })
    }

    /// Reconstructs the reverse itinerary departing from `origin_node` (an
    /// access-reachable node) from the back-pointers a reverse sweep left
    /// in `scratch`. Mirrors `reconstruct_forward`: a reverse sweep tracks
    /// latest-departure instead of earliest-arrival, so steps are built in
    /// chronological order directly rather than reversed at the end.
    pub fn reconstruct_reverse(
        network: &Network,
        scratch: &QueryScratch,
        origin_node: NodeIndex,
        access_duration: Seconds,
    ) -> std::result::Result<Journey, JourneyError> {
        let mut steps = Vec::new();
        let mut node = origin_node;
        let node_departure_time = scratch.nodes_reverse_tentative_time[node as usize];
        steps.push(Step::Access {
            node,
            departure_time: node_departure_time.saturating_sub(access_duration),
            arrival_time: node_departure_time,
        });

        let mut legs = 0;
        loop {
            legs += 1;
            if legs > MAX_LEGS {
                return Err(JourneyError::TooManyLegs(MAX_LEGS));
            }
            let departure_time = scratch.nodes_reverse_tentative_time[node as usize];
            match scratch.nodes_reverse_arrival_source[node as usize] {
                ArrivalSource::Access => {
                    let duration = scratch.nodes_egress_travel_time[node as usize];
                    steps.push(Step::Egress { node, departure_time, arrival_time: departure_time + duration });
                    break;
                }
                ArrivalSource::Transfer(to_node) => {
                    let to_departure = scratch.nodes_reverse_tentative_time[to_node as usize];
                    steps.push(Step::Transfer { from_node: node, to_node, departure_time, arrival_time: to_departure });
                    node = to_node;
                }
                ArrivalSource::Connection(conn_idx) => {
                    let connection = &network.connections[conn_idx as usize];
                    let trip_idx = connection.trip_idx;
                    steps.push(Step::Board { node, trip_idx, time: departure_time, connection_idx: conn_idx });

                    let exit_idx =
                        scratch.trips_exit_connection[trip_idx as usize].ok_or(JourneyError::MissingBoardingConnection(trip_idx))?;
                    let exit_connection = &network.connections[exit_idx as usize];
                    steps.push(Step::Alight {
                        node: exit_connection.arr_node_idx,
                        trip_idx,
                        time: exit_connection.arr_time,
                        connection_idx: exit_idx,
                    });
                    node = exit_connection.arr_node_idx;
                }
                ArrivalSource::None => return Err(JourneyError::MissingArrivalSource(node)),
            }
        }

        let departure_time = match steps.first() {
            Some(Step::Access { departure_time, .. }) => *departure_time,
            _ => 0,
        };
        let arrival_time = match steps.last() {
            Some(Step::Egress { arrival_time, .. }) => *arrival_time,
            _ => node_departure_time,
        };

        Ok(Journey { steps, departure_time, arrival_time })
    }
}

impl fmt::Display for Journey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "journey: {} -> {} ({} boardings)", get_time_str(self.departure_time), get_time_str(self.arrival_time), self.number_of_boardings())?;
        for step in &self.steps {
            match step {
                Step::Access { node, departure_time, arrival_time } => {
                    writeln!(f, "  access to node {node}: {} -> {}", get_time_str(*departure_time), get_time_str(*arrival_time))?
                }
                Step::Board { node, trip_idx, time, .. } => writeln!(f, "  board trip {trip_idx} at node {node} at {}", get_time_str(*time))?,
                Step::Alight { node, trip_idx, time, .. } => writeln!(f, "  alight trip {trip_idx} at node {node} at {}", get_time_str(*time))?,
                Step::Transfer { from_node, to_node, departure_time, arrival_time } => writeln!(
                    f,
                    "  transfer {from_node} -> {to_node}: {} -> {}",
                    get_time_str(*departure_time),
                    get_time_str(*arrival_time)
                )?,
                Step::Egress { node, departure_time, arrival_time } => {
                    writeln!(f, "  egress from node {node}: {} -> {}", get_time_str(*departure_time), get_time_str(*arrival_time))?
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{Connection, Network, Scenario};
    use std::collections::HashMap;

    fn network_with_one_connection() -> Network {
        Network {
            nodes: Vec::new(),
            node_uuid_index: HashMap::new(),
            agencies: Vec::new(),
            modes: Vec::new(),
            services: Vec::new(),
            lines: Vec::new(),
            paths: Vec::new(),
            trips: Vec::new(),
            connections: vec![Connection {
                index: 0,
                dep_node_idx: 0,
                arr_node_idx: 1,
                dep_time: 36060,
                arr_time: 36300,
                trip_idx: 0,
                can_board: true,
                can_unboard: true,
                sequence_in_trip: 0,
            }],
            forward_order: vec![0],
            reverse_order: vec![0],
            footpaths_from: vec![Vec::new(), Vec::new()],
            scenarios: vec![Scenario::default()],
            scenario_uuid_index: HashMap::new(),
            od_trips: Vec::new(),
        }
    }

    #[test]
    fn reconstructs_single_leg_forward_journey() {
        let network = network_with_one_connection();
        let mut scratch = QueryScratch::new(&network);
        scratch.nodes_tentative_time = vec![36060, 36300];
        scratch.nodes_arrival_source = vec![ArrivalSource::Access, ArrivalSource::Connection(0)];
        scratch.nodes_access_travel_time = vec![60, u32::MAX];
        scratch.trips_enter_connection = vec![Some(0)];
        scratch.trips_exit_connection = vec![Some(0)];

        let journey = Journey::reconstruct_forward(&network, &scratch, 1, 30).unwrap();
        assert_eq!(journey.departure_time, 36000);
        assert_eq!(journey.arrival_time, 36330);
        assert_eq!(journey.number_of_boardings(), 1);
        assert_eq!(
            journey.steps,
            vec![
                Step::Access { node: 0, departure_time: 36000, arrival_time: 36060 },
                Step::Board { node: 0, trip_idx: 0, time: 36060, connection_idx: 0 },
                Step::Alight { node: 1, trip_idx: 0, time: 36300, connection_idx: 0 },
                Step::Egress { node: 1, departure_time: 36300, arrival_time: 36330 },
            ]
        );
    }
}
