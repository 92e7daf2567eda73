//! `QueryScratch`: the mutable working state a single routing query reads
//! and writes during a sweep. Sized once against the loaded [`Network`];
//! `reset()` only refills sentinel values, it never reallocates — the same
//! shape as the teacher crate's RAPTOR label arrays, generalized from
//! per-round labels to the single tentative-time arrays a connection scan
//! needs.

use crate::network::{ConnectionIndex, Network, NodeIndex, Seconds, TripIndex, INFINITE_SECONDS};

/// How a node's tentative time was last improved, for journey reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrivalSource {
    /// No improvement recorded yet.
    None,
    /// Reached directly from the origin/destination by walking.
    Access,
    /// Reached by alighting from a connection.
    Connection(ConnectionIndex),
    /// Reached by a footpath transfer from another node.
    Transfer(NodeIndex),
}

impl Default for ArrivalSource {
    fn default() -> Self {
        ArrivalSource::None
    }
}

/// Mutable per-query scratch space, reused across queries in a batch.
pub struct QueryScratch {
    /// Earliest known arrival time at each node in the forward sweep.
    pub nodes_tentative_time: Vec<Seconds>,
    /// Latest known departure time at each node in the reverse sweep.
    pub nodes_reverse_tentative_time: Vec<Seconds>,
    /// How `nodes_tentative_time[node]` was last set.
    pub nodes_arrival_source: Vec<ArrivalSource>,
    /// How `nodes_reverse_tentative_time[node]` was last set.
    pub nodes_reverse_arrival_source: Vec<ArrivalSource>,
    /// Walking seconds from the origin to each node, `INFINITE_SECONDS` if
    /// unreachable on foot.
    pub nodes_access_travel_time: Vec<Seconds>,
    /// Walking seconds from each node to the destination.
    pub nodes_egress_travel_time: Vec<Seconds>,
    /// Whether a trip is included by the active scenario and query filters.
    pub trips_enabled: Vec<bool>,
    /// Whether a trip has been boarded (or could still be boarded) in the
    /// current sweep.
    pub trips_usable: Vec<bool>,
    /// Connection index at which a trip was boarded, for reconstruction.
    pub trips_enter_connection: Vec<Option<ConnectionIndex>>,
    /// Connection index at which a trip was (last) exited, for reconstruction.
    pub trips_exit_connection: Vec<Option<ConnectionIndex>>,
    /// Extra transfer time still owed before a trip may be re-boarded, used
    /// to enforce `min_waiting_time` between the alight and the next board.
    pub trips_enter_transfer_travel_time: Vec<Seconds>,
    touched_nodes: Vec<NodeIndex>,
    /// Trips touched by the trip-enabled mask rebuild (scenario/filters).
    touched_enabled_trips: Vec<TripIndex>,
    /// Trips touched by a sweep's boarding/usability bookkeeping.
    touched_usable_trips: Vec<TripIndex>,
}

impl QueryScratch {
    /// Allocates scratch sized to `network`. Call once per loaded network,
    /// then `reset()` before each query.
    pub fn new(network: &Network) -> Self {
        let num_nodes = network.num_nodes();
        let num_trips = network.num_trips();
        QueryScratch {
            nodes_tentative_time: vec![INFINITE_SECONDS; num_nodes],
            nodes_reverse_tentative_time: vec![0; num_nodes],
            nodes_arrival_source: vec![ArrivalSource::None; num_nodes],
            nodes_reverse_arrival_source: vec![ArrivalSource::None; num_nodes],
            nodes_access_travel_time: vec![INFINITE_SECONDS; num_nodes],
            nodes_egress_travel_time: vec![INFINITE_SECONDS; num_nodes],
            trips_enabled: vec![false; num_trips],
            trips_usable: vec![false; num_trips],
            trips_enter_connection: vec![None; num_trips],
            trips_exit_connection: vec![None; num_trips],
            trips_enter_transfer_travel_time: vec![0; num_trips],
            touched_nodes: Vec::new(),
            touched_enabled_trips: Vec::new(),
            touched_usable_trips: Vec::new(),
        }
    }

    /// Refills node scratch (tentative times, arrival sources, access/egress
    /// travel times) to their sentinel values without reallocating.
    pub fn reset_nodes(&mut self) {
        for &node in &self.touched_nodes {
            let i = node as usize;
            self.nodes_tentative_time[i] = INFINITE_SECONDS;
            self.nodes_reverse_tentative_time[i] = 0;
            self.nodes_arrival_source[i] = ArrivalSource::None;
            self.nodes_reverse_arrival_source[i] = ArrivalSource::None;
            self.nodes_access_travel_time[i] = INFINITE_SECONDS;
            self.nodes_egress_travel_time[i] = INFINITE_SECONDS;
        }
        self.touched_nodes.clear();
    }

    /// Refills per-query trip usability/boarding bookkeeping, leaving
    /// `trips_enabled` untouched. Call between queries that share a
    /// trip-enabled mask (a batch run, see `batch.rs`).
    pub fn reset_trip_usability(&mut self) {
        for &trip in &self.touched_usable_trips {
            let i = trip as usize;
            self.trips_usable[i] = false;
            self.trips_enter_connection[i] = None;
            self.trips_exit_connection[i] = None;
            self.trips_enter_transfer_travel_time[i] = 0;
        }
        self.touched_usable_trips.clear();
    }

    /// Refills the trip-enabled mask. Call before rebuilding it from a
    /// (possibly new) scenario and query filters.
    pub fn reset_trip_mask(&mut self) {
        for &trip in &self.touched_enabled_trips {
            self.trips_enabled[trip as usize] = false;
        }
        self.touched_enabled_trips.clear();
    }

    /// Full reset for a standalone query: nodes, trip usability, and the
    /// trip-enabled mask. Equivalent to calling all three `reset_*` methods.
    pub fn reset(&mut self) {
        self.reset_nodes();
        self.reset_trip_usability();
        self.reset_trip_mask();
    }

    pub fn touch_node(&mut self, node_idx: NodeIndex) {
        self.touched_nodes.push(node_idx);
    }

    pub fn touch_trip(&mut self, trip_idx: TripIndex) {
        self.touched_usable_trips.push(trip_idx);
    }

    pub fn touch_enabled_trip(&mut self, trip_idx: TripIndex) {
        self.touched_enabled_trips.push(trip_idx);
    }

    pub fn set_forward_tentative_time(&mut self, node_idx: NodeIndex, time: Seconds, source: ArrivalSource) {
        let i = node_idx as usize;
        if self.nodes_tentative_time[i] == INFINITE_SECONDS && self.nodes_arrival_source[i] == ArrivalSource::None {
            self.touch_node(node_idx);
        }
        self.nodes_tentative_time[i] = time;
        self.nodes_arrival_source[i] = source;
    }

    pub fn set_reverse_tentative_time(&mut self, node_idx: NodeIndex, time: Seconds, source: ArrivalSource) {
        let i = node_idx as usize;
        self.nodes_reverse_tentative_time[i] = time;
        self.nodes_reverse_arrival_source[i] = source;
    }
}
