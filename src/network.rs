//! The immutable, indexed network model.
//!
//! Every collection here is a dense array assigned once at load time and
//! never mutated again — the same "arena + index, no owning pointers" shape
//! the teacher crate uses for routes/stops/stop_times (`network.rs`), just
//! generalized from a GTFS-derived route/trip graph to the connection-scan
//! data model (nodes, lines, paths, trips, connections, footpaths,
//! scenarios, OD trips).

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

/// Seconds since service-day start. May exceed 86400 for overnight trips.
pub type Seconds = u32;
pub type NodeIndex = u32;
pub type LineIndex = u32;
pub type PathIndex = u32;
pub type TripIndex = u32;
pub type ServiceIndex = u32;
pub type AgencyIndex = u32;
pub type ModeIndex = u32;
pub type ConnectionIndex = u32;
pub type ScenarioIndex = u32;
pub type OdTripIndex = u32;

pub const INFINITE_SECONDS: Seconds = Seconds::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub longitude: f64,
    pub latitude: f64,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub uuid: Uuid,
    pub point: Point,
}

#[derive(Debug, Clone)]
pub struct Agency {
    pub uuid: Uuid,
    pub acronym: String,
}

#[derive(Debug, Clone)]
pub struct Mode {
    pub uuid: Uuid,
    pub short_name: String,
}

#[derive(Debug, Clone)]
pub struct Service {
    pub uuid: Uuid,
    pub name: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct Line {
    pub uuid: Uuid,
    pub short_name: String,
    pub long_name: String,
    pub agency_idx: AgencyIndex,
    pub mode_idx: ModeIndex,
}

/// An ordered node sequence of a line. Defines `k = nodes.len() - 1` segments;
/// segment `i` is the connection from `nodes[i]` to `nodes[i + 1]`.
#[derive(Debug, Clone)]
pub struct Path {
    pub uuid: Uuid,
    pub line_idx: LineIndex,
    pub nodes: Vec<NodeIndex>,
}

impl Path {
    pub fn num_segments(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }
}

/// One timetabled traversal of a path on a service day.
#[derive(Debug, Clone)]
pub struct Trip {
    pub uuid: Uuid,
    pub line_idx: LineIndex,
    pub path_idx: PathIndex,
    pub service_idx: ServiceIndex,
    pub agency_idx: AgencyIndex,
    pub mode_idx: ModeIndex,
    /// Canonical connection index of this trip's first segment; segments are
    /// contiguous and dense from there (`sequence_in_trip` 0..num_segments).
    pub first_connection_idx: ConnectionIndex,
    pub num_segments: u32,
}

/// One timetabled edge: one segment of one trip at one scheduled time.
#[derive(Debug, Clone)]
pub struct Connection {
    pub index: ConnectionIndex,
    pub dep_node_idx: NodeIndex,
    pub arr_node_idx: NodeIndex,
    pub dep_time: Seconds,
    pub arr_time: Seconds,
    pub trip_idx: TripIndex,
    pub can_board: bool,
    pub can_unboard: bool,
    pub sequence_in_trip: u32,
}

/// A precomputed, symmetric walk between two network nodes.
#[derive(Debug, Clone, Copy)]
pub struct Footpath {
    pub from_node_idx: NodeIndex,
    pub to_node_idx: NodeIndex,
    pub walk_seconds: Seconds,
}

/// A named subset specification resolving to a boolean mask on trips.
/// `services` is the scenario's defining universe: a scenario with no
/// services is invalid (`ParameterError::EmptyScenario`).
#[derive(Debug, Clone, Default)]
pub struct Scenario {
    pub uuid: Uuid,
    pub name: String,
    pub services: Vec<ServiceIndex>,
    pub only_lines: Vec<LineIndex>,
    pub only_agencies: Vec<AgencyIndex>,
    pub only_modes: Vec<ModeIndex>,
    pub only_nodes: Vec<NodeIndex>,
    pub except_lines: Vec<LineIndex>,
    pub except_agencies: Vec<AgencyIndex>,
    pub except_modes: Vec<ModeIndex>,
    pub except_nodes: Vec<NodeIndex>,
}

impl Scenario {
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeGroup {
    Under18,
    Age18To64,
    Over64,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Female,
    Male,
    Other,
    Unknown,
}

/// A synthetic person-trip from an origin–destination survey.
#[derive(Debug, Clone)]
pub struct OdTrip {
    pub uuid: Uuid,
    pub internal_id: String,
    pub origin: Point,
    pub destination: Point,
    pub declared_departure: Seconds,
    pub declared_arrival: Seconds,
    pub mode: String,
    pub origin_activity: String,
    pub destination_activity: String,
    pub age_group: AgeGroup,
    pub gender: Gender,
    pub occupation: String,
    pub expansion_factor: f64,
    pub data_source: String,
    /// Nodes reachable on foot from the origin, with seconds, precomputed.
    pub origin_nodes: Vec<(NodeIndex, Seconds)>,
    /// Nodes from which the destination is reachable on foot, precomputed.
    pub destination_nodes: Vec<(NodeIndex, Seconds)>,
    pub only_walking_travel_time_seconds: Option<Seconds>,
    pub only_cycling_travel_time_seconds: Option<Seconds>,
    pub only_driving_travel_time_seconds: Option<Seconds>,
}

/// The immutable, load-once network.
///
/// Connections are stored once in canonical (load) order — `connections[i]`
/// is addressed by its stable `index` everywhere else in the crate (trip
/// enter/exit back-pointers, per-connection demand counters) — plus two
/// permutations of that canonical order: `forward_order` (sorted by
/// departure time ascending, `(trip_idx, sequence_in_trip)` tie-break) and
/// `reverse_order` (sorted by arrival time descending, tie-break reversed).
/// The CSA kernel walks `forward_order`/`reverse_order`; nothing else
/// mutates either array after load.
pub struct Network {
    pub nodes: Vec<Node>,
    pub node_uuid_index: HashMap<Uuid, NodeIndex>,
    pub agencies: Vec<Agency>,
    pub modes: Vec<Mode>,
    pub services: Vec<Service>,
    pub lines: Vec<Line>,
    pub paths: Vec<Path>,
    pub trips: Vec<Trip>,
    pub connections: Vec<Connection>,
    pub forward_order: Vec<ConnectionIndex>,
    pub reverse_order: Vec<ConnectionIndex>,
    pub footpaths_from: Vec<Vec<Footpath>>,
    pub scenarios: Vec<Scenario>,
    pub scenario_uuid_index: HashMap<Uuid, ScenarioIndex>,
    pub od_trips: Vec<OdTrip>,
}

impl Network {
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_trips(&self) -> usize {
        self.trips.len()
    }

    pub fn get_node_idx(&self, uuid: &Uuid) -> Option<NodeIndex> {
        self.node_uuid_index.get(uuid).copied()
    }

    pub fn get_scenario_idx(&self, uuid: &Uuid) -> Option<ScenarioIndex> {
        self.scenario_uuid_index.get(uuid).copied()
    }

    pub fn footpaths_from(&self, node_idx: NodeIndex) -> &[Footpath] {
        &self.footpaths_from[node_idx as usize]
    }

    pub fn trip(&self, trip_idx: TripIndex) -> &Trip {
        &self.trips[trip_idx as usize]
    }

    pub fn line(&self, line_idx: LineIndex) -> &Line {
        &self.lines[line_idx as usize]
    }

    pub fn path(&self, path_idx: PathIndex) -> &Path {
        &self.paths[path_idx as usize]
    }

    /// Builds the canonical connection array plus the forward/reverse
    /// orderings from a set of already-indexed trips. Intended to be called
    /// once by a `NetworkLoader` implementation (see `loader.rs`) after
    /// nodes/lines/paths/trips have been assigned dense indices.
    pub fn build_connection_orders(&mut self) {
        let mut forward_order: Vec<ConnectionIndex> = (0..self.connections.len() as ConnectionIndex).collect();
        forward_order.sort_unstable_by_key(|&idx| {
            let c = &self.connections[idx as usize];
            (c.dep_time, c.trip_idx, c.sequence_in_trip)
        });

        let mut reverse_order: Vec<ConnectionIndex> = (0..self.connections.len() as ConnectionIndex).collect();
        reverse_order.sort_unstable_by_key(|&idx| {
            let c = &self.connections[idx as usize];
            (std::cmp::Reverse(c.arr_time), std::cmp::Reverse(c.trip_idx), std::cmp::Reverse(c.sequence_in_trip))
        });

        self.forward_order = forward_order;
        self.reverse_order = reverse_order;
        log::debug!(
            "network has {} nodes, {} lines, {} trips and {} connections",
            self.nodes.len(),
            self.lines.len(),
            self.trips.len(),
            self.connections.len()
        );
    }

    /// Does `trip_idx`'s path visit `node_idx`? Used by scenario node
    /// filtering — checks actual path membership rather than reusing
    /// `mode_idx`, which the node filter must not be compared against.
    pub fn trip_visits_node(&self, trip_idx: TripIndex, node_idx: NodeIndex) -> bool {
        let trip = self.trip(trip_idx);
        self.path(trip.path_idx).nodes.contains(&node_idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_segment_count() {
        let path = Path { uuid: Uuid::nil(), line_idx: 0, nodes: vec![0, 1, 2, 3] };
        assert_eq!(path.num_segments(), 3);
    }

    #[test]
    fn scenario_emptiness() {
        let scenario = Scenario::default();
        assert!(scenario.is_empty());
        let with_service = Scenario { services: vec![0], ..Scenario::default() };
        assert!(!with_service.is_empty());
    }
}
