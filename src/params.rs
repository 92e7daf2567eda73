//! The query parameter surface: `QueryParameters` for a single routing
//! query, `BatchParameters` for the batch-only surface layered on top of it.
//!
//! `QueryParameters::from_pairs` mirrors the shape of a `name -> value`
//! list the out-of-scope query front-end would hand in — unknown names
//! are ignored, known ones are validated against the enumerated
//! `ParameterError` variants.

use crate::error::ParameterError;
use crate::network::{AgeGroup, Gender, Network, NodeIndex, OdTripIndex, Point, ScenarioIndex, Seconds, INFINITE_SECONDS};
use crate::utils;
use uuid::Uuid;

pub const DEFAULT_MIN_WAITING_TIME_SECONDS: Seconds = 180;
pub const DEFAULT_MAX_ACCESS_TRAVEL_TIME_SECONDS: Seconds = 1200;
pub const DEFAULT_MAX_EGRESS_TRAVEL_TIME_SECONDS: Seconds = 1200;
pub const DEFAULT_MAX_TRANSFER_TRAVEL_TIME_SECONDS: Seconds = 1200;
pub const DEFAULT_MAX_FIRST_WAITING_TIME_SECONDS: Seconds = 1800;
pub const DEFAULT_MAX_TOTAL_TRAVEL_TIME_SECONDS: Seconds = INFINITE_SECONDS;
pub const DEFAULT_WALKING_SPEED_FACTOR: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeType {
    Departure,
    Arrival,
}

impl TimeType {
    pub fn is_forward(self) -> bool {
        matches!(self, TimeType::Departure)
    }
}

/// A single routing query.
#[derive(Debug, Clone)]
pub struct QueryParameters {
    pub origin: Point,
    pub destination: Point,
    pub scenario_idx: ScenarioIndex,
    pub time_of_trip: Seconds,
    pub time_type: TimeType,
    pub with_alternatives: bool,
    pub min_waiting_time_seconds: Seconds,
    pub max_total_travel_time_seconds: Seconds,
    pub max_access_travel_time_seconds: Seconds,
    pub max_egress_travel_time_seconds: Seconds,
    pub max_transfer_travel_time_seconds: Seconds,
    pub max_first_waiting_time_seconds: Seconds,
    pub walking_speed_factor: f64,
    /// Explicit access footpaths supplied by the caller instead of the walk
    /// oracle.
    pub access_nodes: Option<Vec<(NodeIndex, Seconds)>>,
    /// Explicit egress footpaths supplied by the caller.
    pub egress_nodes: Option<Vec<(NodeIndex, Seconds)>>,
    /// When set, this query originates from an OD trip: its precomputed
    /// access/egress lists and declared departure/arrival time take
    /// precedence over the fields above.
    pub od_trip_idx: Option<OdTripIndex>,
}

impl QueryParameters {
    pub fn is_forward(&self) -> bool {
        self.time_type.is_forward()
    }

    /// Builds query parameters from a `name -> value` surface. Unknown
    /// names are ignored.
    pub fn from_pairs(pairs: &[(&str, &str)], network: &Network) -> std::result::Result<Self, ParameterError> {
        let mut origin_raw: Option<&str> = None;
        let mut destination_raw: Option<&str> = None;
        let mut scenario_raw: Option<&str> = None;
        let mut time_of_trip_raw: Option<&str> = None;
        let mut time_type = TimeType::Departure;
        let mut with_alternatives = false;
        let mut min_waiting_time_seconds = DEFAULT_MIN_WAITING_TIME_SECONDS;
        let mut max_total_travel_time_seconds = DEFAULT_MAX_TOTAL_TRAVEL_TIME_SECONDS;
        let mut max_access_travel_time_seconds = DEFAULT_MAX_ACCESS_TRAVEL_TIME_SECONDS;
        let mut max_egress_travel_time_seconds = DEFAULT_MAX_EGRESS_TRAVEL_TIME_SECONDS;
        let mut max_transfer_travel_time_seconds = DEFAULT_MAX_TRANSFER_TRAVEL_TIME_SECONDS;
        let mut max_first_waiting_time_seconds = DEFAULT_MAX_FIRST_WAITING_TIME_SECONDS;

        let parse_numerical = |name: &str, value: &str| -> std::result::Result<Seconds, ParameterError> {
            value.trim().parse::<Seconds>().map_err(|_| ParameterError::InvalidNumericalData(name.to_owned()))
        };

        for &(name, value) in pairs {
            match name {
                "origin" => origin_raw = Some(value),
                "destination" => destination_raw = Some(value),
                "scenario_id" => scenario_raw = Some(value),
                "time_of_trip" => time_of_trip_raw = Some(value),
                "time_type" => time_type = if value.trim() == "1" { TimeType::Arrival } else { TimeType::Departure },
                "alternatives" => with_alternatives = value.trim() == "1",
                "min_waiting_time" => min_waiting_time_seconds = parse_numerical(name, value)?,
                "max_travel_time" => max_total_travel_time_seconds = parse_numerical(name, value)?,
                "max_access_travel_time" => max_access_travel_time_seconds = parse_numerical(name, value)?,
                "max_egress_travel_time" => max_egress_travel_time_seconds = parse_numerical(name, value)?,
                "max_transfer_travel_time" => max_transfer_travel_time_seconds = parse_numerical(name, value)?,
                "max_first_waiting_time" => max_first_waiting_time_seconds = parse_numerical(name, value)?,
                _ => {} // unknown names are ignored
            }
        }

        let origin = utils::parse_point(origin_raw.unwrap_or(""), ParameterError::MissingOrigin, ParameterError::InvalidOrigin)?;
        let destination =
            utils::parse_point(destination_raw.unwrap_or(""), ParameterError::MissingDestination, ParameterError::InvalidDestination)?;

        let scenario_raw = scenario_raw.filter(|s| !s.trim().is_empty()).ok_or(ParameterError::MissingScenario)?;
        let scenario_uuid = Uuid::parse_str(scenario_raw.trim()).map_err(|_| ParameterError::InvalidScenario)?;
        let scenario_idx = network.get_scenario_idx(&scenario_uuid).ok_or(ParameterError::InvalidScenario)?;
        if network.scenarios[scenario_idx as usize].is_empty() {
            return Err(ParameterError::EmptyScenario);
        }

        let time_of_trip_raw = time_of_trip_raw.ok_or(ParameterError::MissingTimeOfTrip)?;
        let time_of_trip: i64 = time_of_trip_raw.trim().parse().map_err(|_| ParameterError::MissingTimeOfTrip)?;
        if time_of_trip < 0 {
            return Err(ParameterError::MissingTimeOfTrip);
        }

        Ok(QueryParameters {
            origin,
            destination,
            scenario_idx,
            time_of_trip: time_of_trip as Seconds,
            time_type,
            with_alternatives,
            min_waiting_time_seconds,
            max_total_travel_time_seconds,
            max_access_travel_time_seconds,
            max_egress_travel_time_seconds,
            max_transfer_travel_time_seconds,
            max_first_waiting_time_seconds,
            walking_speed_factor: DEFAULT_WALKING_SPEED_FACTOR,
            access_nodes: None,
            egress_nodes: None,
            od_trip_idx: None,
        })
    }

    /// Derives the parameters an individual OD trip's query should run with,
    /// inheriting scenario/caps from a base (usually batch-wide) set of
    /// parameters.
    pub fn for_od_trip(base: &QueryParameters, od_trip_idx: OdTripIndex, network: &Network) -> Self {
        let od_trip = &network.od_trips[od_trip_idx as usize];
        let time_of_trip = if base.is_forward() { od_trip.declared_departure } else { od_trip.declared_arrival };
        QueryParameters {
            origin: od_trip.origin,
            destination: od_trip.destination,
            time_of_trip,
            od_trip_idx: Some(od_trip_idx),
            access_nodes: None,
            egress_nodes: None,
            ..base.clone()
        }
    }
}

/// The batch-only parameter surface layered on a base [`QueryParameters`].
#[derive(Debug, Clone)]
pub struct BatchParameters {
    pub base: QueryParameters,
    pub od_trips_sample_ratio: f64,
    pub od_trips_sample_size: usize,
    pub batches_count: u32,
    pub batch_number: u32,
    pub seed: u64,
    pub calculate_profiles: bool,
    pub od_trips_age_groups: Vec<AgeGroup>,
    pub od_trips_genders: Vec<Gender>,
    pub od_trips_occupations: Vec<String>,
    pub od_trips_activities: Vec<String>,
    pub od_trips_modes: Vec<String>,
    pub od_trips_periods: Vec<(Seconds, Seconds)>,
    pub only_data_source: Option<String>,
}

impl BatchParameters {
    pub fn new(base: QueryParameters) -> Self {
        BatchParameters {
            base,
            od_trips_sample_ratio: 1.0,
            od_trips_sample_size: 0,
            batches_count: 1,
            batch_number: 1,
            seed: 42,
            calculate_profiles: false,
            od_trips_age_groups: Vec::new(),
            od_trips_genders: Vec::new(),
            od_trips_occupations: Vec::new(),
            od_trips_activities: Vec::new(),
            od_trips_modes: Vec::new(),
            od_trips_periods: Vec::new(),
            only_data_source: None,
        }
    }
}
