//! Component F: the batch origin-destination engine. Runs every OD trip in
//! a scenario's survey population through the same kernel a single query
//! uses, accumulating per-line and per-path-segment demand.
//!
//! Grounded on the original calculator's `odTripsRouting()`: a seeded
//! shuffle for sampling, modulo sharding across parallel workers, attribute
//! and period filtering, a corrected expansion factor, and a trip-enabled
//! mask rebuilt once for the whole batch rather than per OD trip (the
//! original reused its `resetFilters` flag the same way — scenario and
//! query-level filters don't vary across a batch's OD trips, only origin
//! and destination do).

use std::collections::HashMap;

use uuid::Uuid;

use crate::csa;
use crate::error::{Error, Result};
use crate::journey::{Journey, Step};
use crate::loader::WalkTimeOracle;
use crate::network::{Network, Seconds};
use crate::params::{BatchParameters, QueryParameters};
use crate::reset;
use crate::scratch::QueryScratch;
use crate::utils::{hour_of_day, HOUR_BUCKETS};

/// Per-segment demand-by-hour-of-day accumulator for one path.
#[derive(Debug, Clone)]
pub struct PathProfile {
    pub demand_by_hour: Vec<[f64; HOUR_BUCKETS]>,
    pub total_demand: Vec<f64>,
}

impl PathProfile {
    fn new(num_segments: usize) -> Self {
        PathProfile { demand_by_hour: vec![[0.0; HOUR_BUCKETS]; num_segments], total_demand: vec![0.0; num_segments] }
    }
}

#[derive(Debug, Clone)]
pub enum OdTripOutcome {
    Success(Journey),
    NoRoutingFound,
}

/// One OD trip's calculated (or failed) itinerary, with the survey fields
/// a consuming report would want alongside the routing result.
#[derive(Debug, Clone)]
pub struct OdTripResult {
    pub uuid: Uuid,
    pub internal_id: String,
    pub origin_activity: String,
    pub destination_activity: String,
    pub declared_mode: String,
    /// `od_trip.expansion_factor` corrected for the sampling ratio.
    pub expansion_factor: f64,
    pub declared_departure: Seconds,
    pub declared_arrival: Seconds,
    pub only_walking_travel_time_seconds: Option<Seconds>,
    pub only_cycling_travel_time_seconds: Option<Seconds>,
    pub only_driving_travel_time_seconds: Option<Seconds>,
    pub outcome: OdTripOutcome,
}

#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    pub od_trip_results: Vec<OdTripResult>,
    pub max_segment_hourly_demand: f64,
    pub max_segment_total_demand: f64,
    pub total_travel_time_seconds: f64,
    pub line_profiles: Option<HashMap<Uuid, f64>>,
    pub path_profiles: Option<HashMap<Uuid, PathProfile>>,
}

fn matches_attributes(od_trip: &crate::network::OdTrip, batch: &BatchParameters) -> bool {
    if !batch.od_trips_age_groups.is_empty() && !batch.od_trips_age_groups.contains(&od_trip.age_group) {
        return false;
    }
    if !batch.od_trips_genders.is_empty() && !batch.od_trips_genders.contains(&od_trip.gender) {
        return false;
    }
    if !batch.od_trips_occupations.is_empty() && !batch.od_trips_occupations.contains(&od_trip.occupation) {
        return false;
    }
    if !batch.od_trips_activities.is_empty() && !batch.od_trips_activities.contains(&od_trip.destination_activity) {
        return false;
    }
    if !batch.od_trips_modes.is_empty() && !batch.od_trips_modes.contains(&od_trip.mode) {
        return false;
    }
    if let Some(only_source) = &batch.only_data_source {
        if &od_trip.data_source != only_source {
            return false;
        }
    }
    true
}

fn matches_period(od_trip: &crate::network::OdTrip, batch: &BatchParameters) -> bool {
    if batch.od_trips_periods.is_empty() {
        return true;
    }
    batch
        .od_trips_periods
        .iter()
        .any(|&(start, end)| od_trip.declared_departure >= start && od_trip.declared_departure < end)
}

/// Builds the sample order: a stable sort by declared departure time, then a
/// Fisher-Yates shuffle seeded deterministically when `0.0 < sample_ratio <
/// 1.0` (natural sorted order otherwise, matching the original only
/// shuffling when actually subsampling). Sorting before shuffling keeps
/// sample membership independent of the OD population's insertion order.
fn sample_order(network: &Network, sample_ratio: f64, seed: u64) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..network.od_trips.len()).collect();
    if sample_ratio > 0.0 && sample_ratio < 1.0 {
        indices.sort_by_key(|&i| network.od_trips[i].declared_departure);
        let rng = fastrand::Rng::with_seed(seed);
        for i in (1..indices.len()).rev() {
            let j = rng.usize(0..=i);
            indices.swap(i, j);
        }
    }
    indices
}

fn accumulate_demand(network: &Network, journey: &Journey, expansion_factor: f64, result: &mut BatchResult) {
    let mut boarding: Option<(crate::network::TripIndex, crate::network::ConnectionIndex)> = None;
    for step in &journey.steps {
        match step {
            Step::Board { trip_idx, connection_idx, .. } => boarding = Some((*trip_idx, *connection_idx)),
            Step::Alight { connection_idx: exit_idx, .. } => {
                let (trip_idx, enter_idx) = boarding.take().expect("Alight without a preceding Board");
                let trip = network.trip(trip_idx);
                let line_uuid = network.line(trip.line_idx).uuid;
                let path = network.path(trip.path_idx);
                *result.line_profiles.get_or_insert_with(HashMap::new).entry(line_uuid).or_insert(0.0) += expansion_factor;

                let profile = result.path_profiles.get_or_insert_with(HashMap::new).entry(path.uuid).or_insert_with(|| PathProfile::new(path.num_segments()));

                let start_seq = network.connections[enter_idx as usize].sequence_in_trip;
                let end_seq = network.connections[*exit_idx as usize].sequence_in_trip;
                for seq in start_seq..=end_seq {
                    let connection_idx = (trip.first_connection_idx + seq) as usize;
                    let connection = &network.connections[connection_idx];
                    let Some(hour) = hour_of_day(connection.dep_time) else { continue };
                    let segment = seq as usize;
                    if segment >= profile.demand_by_hour.len() {
                        continue;
                    }
                    profile.demand_by_hour[segment][hour] += expansion_factor;
                    profile.total_demand[segment] += expansion_factor;
                    result.max_segment_hourly_demand = result.max_segment_hourly_demand.max(profile.demand_by_hour[segment][hour]);
                    result.max_segment_total_demand = result.max_segment_total_demand.max(profile.total_demand[segment]);
                }
            }
            _ => {}
        }
    }
}

/// Runs every (sampled, sharded, filter-matching) OD trip in the network
/// through the kernel, accumulating demand profiles when requested.
pub fn run_batch(network: &Network, batch: &BatchParameters, oracle: &dyn WalkTimeOracle, scratch: &mut QueryScratch) -> Result<BatchResult> {
    let mut result = BatchResult::default();
    let od_count = network.od_trips.len();
    if od_count == 0 {
        return Ok(result);
    }

    let indices = sample_order(network, batch.od_trips_sample_ratio, batch.seed);
    let sample_size = ((od_count as f64) * batch.od_trips_sample_ratio).ceil() as usize;
    let sample_size = sample_size.min(od_count);

    let mut mask_built = false;

    for i in 0..sample_size {
        if batch.od_trips_sample_size > 0 && i >= batch.od_trips_sample_size {
            break;
        }

        if (i as u32) % batch.batches_count != batch.batch_number.saturating_sub(1) {
            continue;
        }

        let od_trip_idx = indices[i] as u32;
        let od_trip = &network.od_trips[od_trip_idx as usize];

        if !matches_attributes(od_trip, batch) || !matches_period(od_trip, batch) {
            continue;
        }

        let od_params = QueryParameters::for_od_trip(&batch.base, od_trip_idx, network);

        if !mask_built {
            scratch.reset();
            reset::rebuild_trip_mask(network, od_params.scenario_idx, scratch);
            mask_built = true;
        } else {
            scratch.reset_nodes();
            scratch.reset_trip_usability();
        }

        let corrected_expansion_factor =
            if batch.od_trips_sample_ratio > 0.0 { od_trip.expansion_factor / batch.od_trips_sample_ratio } else { od_trip.expansion_factor };

        let outcome = match reset::seed_access_egress(network, &od_params, oracle, scratch)
            .and_then(|(access, egress)| csa::sweep_and_reconstruct(network, &od_params, scratch, &access, &egress))
        {
            Ok(journey) => {
                result.total_travel_time_seconds += corrected_expansion_factor * journey.travel_time() as f64;
                if batch.calculate_profiles {
                    accumulate_demand(network, &journey, corrected_expansion_factor, &mut result);
                }
                OdTripOutcome::Success(journey)
            }
            Err(Error::NoRoutingFound(_)) => OdTripOutcome::NoRoutingFound,
            Err(other) => return Err(other),
        };

        result.od_trip_results.push(OdTripResult {
            uuid: od_trip.uuid,
            internal_id: od_trip.internal_id.clone(),
            origin_activity: od_trip.origin_activity.clone(),
            destination_activity: od_trip.destination_activity.clone(),
            declared_mode: od_trip.mode.clone(),
            expansion_factor: corrected_expansion_factor,
            declared_departure: od_trip.declared_departure,
            declared_arrival: od_trip.declared_arrival,
            only_walking_travel_time_seconds: od_trip.only_walking_travel_time_seconds,
            only_cycling_travel_time_seconds: od_trip.only_cycling_travel_time_seconds,
            only_driving_travel_time_seconds: od_trip.only_driving_travel_time_seconds,
            outcome,
        });
    }

    Ok(result)
}
