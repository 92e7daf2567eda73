//! Shared fixtures for tests, benches, and demos: a small synthetic network
//! built directly in memory (no GTFS file, no external loader) implementing
//! [`transit_csa::NetworkLoader`].
//!
//! The network is a single south-to-north line `S1..S7` running every 30
//! minutes from 07:00 to 20:00, crossed by a perpendicular line at `S4`.

use std::collections::HashMap;

use chrono::NaiveDate;
use uuid::Uuid;

use transit_csa::network::{
    Agency, Connection, Line, LineIndex, Mode, Network, Node, NodeIndex, OdTrip, Path, Point, Scenario, ScenarioIndex, Service, ServiceIndex, Trip,
};
use transit_csa::{NetworkLoader, Result};

pub const SEGMENT_SECONDS: u32 = 210;
pub const HEADWAY_SECONDS: u32 = 1800;
pub const FIRST_DEPARTURE_SECONDS: u32 = 25200; // 07:00:00
pub const LAST_DEPARTURE_SECONDS: u32 = 72000; // 20:00:00

/// Node/line/service/scenario indices of the fixture network, handed back
/// so callers don't need to re-derive them from node order.
#[derive(Debug, Clone, Copy)]
pub struct ToyNetworkHandles {
    /// S1..S7, south to north.
    pub stops: [NodeIndex; 7],
    pub crossing_west: NodeIndex,
    pub crossing_east: NodeIndex,
    pub north_south_line: LineIndex,
    pub east_west_line: LineIndex,
    pub weekday_service: ServiceIndex,
    pub default_scenario: ScenarioIndex,
}

fn push_node(nodes: &mut Vec<Node>, index: &mut HashMap<Uuid, NodeIndex>, longitude: f64, latitude: f64) -> NodeIndex {
    let uuid = Uuid::new_v4();
    let idx = nodes.len() as NodeIndex;
    nodes.push(Node { uuid, point: Point { longitude, latitude } });
    index.insert(uuid, idx);
    idx
}

/// Builds the toy network described in the concrete test scenarios: a
/// single straight line `S1..S7` with 210-second segments, departing every
/// 30 minutes from 07:00 to 20:00, crossed by a second line at `S4`.
pub fn build_toy_network() -> (Network, ToyNetworkHandles) {
    let mut nodes = Vec::new();
    let mut node_uuid_index = HashMap::new();

    let stops: [NodeIndex; 7] = std::array::from_fn(|i| push_node(&mut nodes, &mut node_uuid_index, 0.0, i as f64 * 0.01));
    let crossing_west = push_node(&mut nodes, &mut node_uuid_index, -0.01, 3.0 * 0.01);
    let crossing_east = push_node(&mut nodes, &mut node_uuid_index, 0.01, 3.0 * 0.01);

    let agencies = vec![Agency { uuid: Uuid::new_v4(), acronym: "TOY".into() }];
    let modes = vec![Mode { uuid: Uuid::new_v4(), short_name: "bus".into() }];

    let weekday_service_uuid = Uuid::new_v4();
    let services =
        vec![Service { uuid: weekday_service_uuid, name: "weekday".into(), date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() }];
    let weekday_service: ServiceIndex = 0;

    let north_south_line = Line { uuid: Uuid::new_v4(), short_name: "NS".into(), long_name: "North-South".into(), agency_idx: 0, mode_idx: 0 };
    let east_west_line = Line { uuid: Uuid::new_v4(), short_name: "EW".into(), long_name: "East-West".into(), agency_idx: 0, mode_idx: 0 };
    let lines = vec![north_south_line, east_west_line];

    let north_south_path = Path { uuid: Uuid::new_v4(), line_idx: 0, nodes: stops.to_vec() };
    let east_west_path = Path { uuid: Uuid::new_v4(), line_idx: 1, nodes: vec![crossing_west, stops[3], crossing_east] };
    let paths = vec![north_south_path, east_west_path];

    let mut trips = Vec::new();
    let mut connections = Vec::new();

    let mut departure = FIRST_DEPARTURE_SECONDS;
    while departure <= LAST_DEPARTURE_SECONDS {
        let trip_idx = trips.len() as u32;
        let first_connection_idx = connections.len() as u32;
        let num_segments = (stops.len() - 1) as u32;
        trips.push(Trip {
            uuid: Uuid::new_v4(),
            line_idx: 0,
            path_idx: 0,
            service_idx: weekday_service,
            agency_idx: 0,
            mode_idx: 0,
            first_connection_idx,
            num_segments,
        });
        for seg in 0..num_segments {
            let dep_time = departure + seg * SEGMENT_SECONDS;
            let arr_time = departure + (seg + 1) * SEGMENT_SECONDS;
            let index = connections.len() as u32;
            connections.push(Connection {
                index,
                dep_node_idx: stops[seg as usize],
                arr_node_idx: stops[seg as usize + 1],
                dep_time,
                arr_time,
                trip_idx,
                can_board: true,
                can_unboard: true,
                sequence_in_trip: seg,
            });
        }
        departure += HEADWAY_SECONDS;
    }

    // A handful of east-west crossing trips so scenario filters (only_lines,
    // only_nodes) have a second line to exclude/include.
    let mut crossing_departure = FIRST_DEPARTURE_SECONDS;
    while crossing_departure <= LAST_DEPARTURE_SECONDS {
        let trip_idx = trips.len() as u32;
        let first_connection_idx = connections.len() as u32;
        trips.push(Trip {
            uuid: Uuid::new_v4(),
            line_idx: 1,
            path_idx: 1,
            service_idx: weekday_service,
            agency_idx: 0,
            mode_idx: 0,
            first_connection_idx,
            num_segments: 2,
        });
        let crossing_nodes = [crossing_west, stops[3], crossing_east];
        for seg in 0..2u32 {
            let dep_time = crossing_departure + seg * SEGMENT_SECONDS;
            let arr_time = crossing_departure + (seg + 1) * SEGMENT_SECONDS;
            let index = connections.len() as u32;
            connections.push(Connection {
                index,
                dep_node_idx: crossing_nodes[seg as usize],
                arr_node_idx: crossing_nodes[seg as usize + 1],
                dep_time,
                arr_time,
                trip_idx,
                can_board: true,
                can_unboard: true,
                sequence_in_trip: seg,
            });
        }
        crossing_departure += HEADWAY_SECONDS * 2;
    }

    let default_scenario_uuid = Uuid::new_v4();
    let default_scenario = Scenario { uuid: default_scenario_uuid, name: "default".into(), services: vec![weekday_service], ..Scenario::default() };
    let mut scenario_uuid_index = HashMap::new();
    scenario_uuid_index.insert(default_scenario_uuid, 0u32);

    let num_nodes = nodes.len();
    let mut network = Network {
        nodes,
        node_uuid_index,
        agencies,
        modes,
        services,
        lines,
        paths,
        trips,
        connections,
        forward_order: Vec::new(),
        reverse_order: Vec::new(),
        footpaths_from: vec![Vec::new(); num_nodes],
        scenarios: vec![default_scenario],
        scenario_uuid_index,
        od_trips: Vec::new(),
    };
    network.build_connection_orders();

    let handles = ToyNetworkHandles {
        stops,
        crossing_west,
        crossing_east,
        north_south_line: 0,
        east_west_line: 1,
        weekday_service,
        default_scenario: 0,
    };

    (network, handles)
}

/// A synthetic OD trip riding the full length of the toy line, for
/// exercising the batch engine without a real survey population.
pub fn add_sample_od_trip(network: &mut Network, handles: &ToyNetworkHandles, declared_departure: u32) -> u32 {
    let origin = network.nodes[handles.stops[0] as usize].point;
    let destination = network.nodes[handles.stops[6] as usize].point;
    let idx = network.od_trips.len() as u32;
    network.od_trips.push(OdTrip {
        uuid: Uuid::new_v4(),
        internal_id: format!("toy-od-{idx}"),
        origin,
        destination,
        declared_departure,
        declared_arrival: declared_departure + SEGMENT_SECONDS * 6,
        mode: "transit".into(),
        origin_activity: "home".into(),
        destination_activity: "work".into(),
        age_group: transit_csa::network::AgeGroup::Age18To64,
        gender: transit_csa::network::Gender::Unknown,
        occupation: "worker".into(),
        expansion_factor: 1.0,
        data_source: "toy_survey".into(),
        origin_nodes: vec![(handles.stops[0], 0)],
        destination_nodes: vec![(handles.stops[6], 0)],
        only_walking_travel_time_seconds: None,
        only_cycling_travel_time_seconds: None,
        only_driving_travel_time_seconds: None,
    });
    idx
}

/// A [`NetworkLoader`] that always returns a freshly-built toy network,
/// for call sites (demos, benches) that only know the trait.
pub struct ToyNetworkLoader;

impl NetworkLoader for ToyNetworkLoader {
    fn load(&self) -> Result<Network> {
        Ok(build_toy_network().0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toy_network_has_expected_shape() {
        let (network, handles) = build_toy_network();
        assert_eq!(network.nodes.len(), 9);
        assert_eq!(network.lines.len(), 2);
        assert!(network.trips.len() > 20);
        assert_eq!(handles.stops[0], 0);
        assert_eq!(handles.stops[6], 6);
    }

    #[test]
    fn ten_am_departure_exists_on_first_segment() {
        let (network, handles) = build_toy_network();
        let found = network.connections.iter().any(|c| c.dep_node_idx == handles.stops[0] && c.dep_time == 36000 && c.arr_time == 36210);
        assert!(found);
    }
}
