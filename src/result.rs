//! Result schemas: serializable summaries of a calculated [`Journey`],
//! grounded on the original calculator's `ResultToOdTripJsonVisitor` and
//! `noRoutingFoundResultToJson` (`od_trips_routing.cpp`) — same field set,
//! `serde::Serialize` standing in for the original's `nlohmann::json`
//! construction.

use serde::Serialize;

use crate::journey::{Journey, Step};
use crate::network::{Network, Point, Seconds};

/// A successful single-query result: the journey plus the travel-time
/// breakdown a caller's UI would want without re-deriving it from steps.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingResult {
    pub status: &'static str,
    pub origin: Point,
    pub destination: Point,
    pub travel_time_seconds: Seconds,
    pub initial_lost_time_at_departure_seconds: Seconds,
    pub departure_time_seconds: Seconds,
    pub arrival_time_seconds: Seconds,
    pub number_of_transfers: usize,
    pub in_vehicle_travel_time_seconds: Seconds,
    pub transfer_travel_time_seconds: Seconds,
    pub waiting_time_seconds: Seconds,
    pub access_travel_time_seconds: Seconds,
    pub egress_travel_time_seconds: Seconds,
    pub non_transit_travel_time_seconds: Seconds,
    pub lines_shortnames: Vec<String>,
    pub agencies_acronyms: Vec<String>,
    pub modes_shortnames: Vec<String>,
}

impl RoutingResult {
    /// Builds a result from a calculated journey, walking its steps to
    /// derive the access/egress/waiting/in-vehicle breakdown and the
    /// involved lines/agencies/modes (in boarding order, not deduplicated,
    /// mirroring the original's per-step visitor).
    pub fn from_journey(network: &Network, journey: &Journey, requested_departure: Seconds) -> Self {
        let mut access_travel_time_seconds = 0;
        let mut egress_travel_time_seconds = 0;
        let mut transfer_travel_time_seconds = 0;
        let mut in_vehicle_travel_time_seconds = 0;
        let mut waiting_time_seconds = 0;
        let mut lines_shortnames = Vec::new();
        let mut agencies_acronyms = Vec::new();
        let mut modes_shortnames = Vec::new();

        let mut last_alight_time = journey.departure_time;
        let mut pending_board_time: Option<Seconds> = None;

        for step in &journey.steps {
            match step {
                Step::Access { departure_time, arrival_time, .. } => {
                    access_travel_time_seconds += arrival_time.saturating_sub(*departure_time);
                }
                Step::Egress { departure_time, arrival_time, .. } => {
                    egress_travel_time_seconds += arrival_time.saturating_sub(*departure_time);
                }
                Step::Transfer { departure_time, arrival_time, .. } => {
                    transfer_travel_time_seconds += arrival_time.saturating_sub(*departure_time);
                }
                Step::Board { trip_idx, time, .. } => {
                    waiting_time_seconds += time.saturating_sub(last_alight_time);
                    pending_board_time = Some(*time);

                    let trip = network.trip(*trip_idx);
                    let line = network.line(trip.line_idx);
                    lines_shortnames.push(line.short_name.clone());
                    agencies_acronyms.push(network.agencies[trip.agency_idx as usize].acronym.clone());
                    modes_shortnames.push(network.modes[trip.mode_idx as usize].short_name.clone());
                }
                Step::Alight { time, .. } => {
                    if let Some(board_time) = pending_board_time.take() {
                        in_vehicle_travel_time_seconds += time.saturating_sub(board_time);
                    }
                    last_alight_time = *time;
                }
            }
        }

        let non_transit_travel_time_seconds = access_travel_time_seconds + egress_travel_time_seconds + transfer_travel_time_seconds;

        RoutingResult {
            status: "success",
            origin: network.nodes.first().map(|n| n.point).unwrap_or(Point { longitude: 0.0, latitude: 0.0 }),
            destination: network.nodes.last().map(|n| n.point).unwrap_or(Point { longitude: 0.0, latitude: 0.0 }),
            travel_time_seconds: journey.travel_time(),
            initial_lost_time_at_departure_seconds: journey.departure_time.saturating_sub(requested_departure),
            departure_time_seconds: journey.departure_time,
            arrival_time_seconds: journey.arrival_time,
            number_of_transfers: journey.number_of_transfers(),
            in_vehicle_travel_time_seconds,
            transfer_travel_time_seconds,
            waiting_time_seconds,
            access_travel_time_seconds,
            egress_travel_time_seconds,
            non_transit_travel_time_seconds,
            lines_shortnames,
            agencies_acronyms,
            modes_shortnames,
        }
    }
}

/// A failed single-query result: no itinerary could be found.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoRoutingFoundResult {
    pub status: &'static str,
    pub origin: Point,
    pub destination: Point,
    pub departure_time_seconds: Seconds,
}

impl NoRoutingFoundResult {
    pub fn new(origin: Point, destination: Point, departure_time_seconds: Seconds) -> Self {
        NoRoutingFoundResult { status: "no_routing_found", origin, destination, departure_time_seconds }
    }
}

/// A batch run's serializable summary: per-OD-trip outcomes plus the
/// aggregate demand profiles, mirroring the original's top-level
/// `odTrips`/`lineProfiles`/`pathProfiles` JSON object.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub count_od_trips_calculated: usize,
    pub count_od_trips_with_no_routing_found: usize,
    pub maximum_segment_hourly_demand: f64,
    pub maximum_segment_total_demand: f64,
    pub total_travel_time_seconds: f64,
}

impl From<&crate::batch::BatchResult> for BatchSummary {
    fn from(result: &crate::batch::BatchResult) -> Self {
        let with_no_routing =
            result.od_trip_results.iter().filter(|r| matches!(r.outcome, crate::batch::OdTripOutcome::NoRoutingFound)).count();
        BatchSummary {
            count_od_trips_calculated: result.od_trip_results.len(),
            count_od_trips_with_no_routing_found: with_no_routing,
            maximum_segment_hourly_demand: result.max_segment_hourly_demand,
            maximum_segment_total_demand: result.max_segment_total_demand,
            total_travel_time_seconds: result.total_travel_time_seconds,
        }
    }
}
