//! Runs a small batch of synthetic OD trips against the toy network and
//! prints the aggregate demand summary.

use transit_csa::loader::NoWalkOracle;
use transit_csa::network::INFINITE_SECONDS;
use transit_csa::params::{BatchParameters, QueryParameters, TimeType};
use transit_csa::result::BatchSummary;
use transit_csa::{run_batch, QueryScratch};

fn main() {
    env_logger::init();

    let (mut network, handles) = dev_utils::build_toy_network();
    for departure in [34200, 36000, 37800, 39600] {
        dev_utils::add_sample_od_trip(&mut network, &handles, departure);
    }

    let base = QueryParameters {
        origin: network.nodes[handles.stops[0] as usize].point,
        destination: network.nodes[handles.stops[6] as usize].point,
        scenario_idx: handles.default_scenario,
        time_of_trip: 0,
        time_type: TimeType::Departure,
        with_alternatives: false,
        min_waiting_time_seconds: 180,
        max_total_travel_time_seconds: INFINITE_SECONDS,
        max_access_travel_time_seconds: 1200,
        max_egress_travel_time_seconds: 1200,
        max_transfer_travel_time_seconds: 1200,
        max_first_waiting_time_seconds: 1800,
        walking_speed_factor: 1.0,
        access_nodes: None,
        egress_nodes: None,
        od_trip_idx: None,
    };

    let mut batch = BatchParameters::new(base);
    batch.calculate_profiles = true;

    let mut scratch = QueryScratch::new(&network);
    let result = run_batch(&network, &batch, &NoWalkOracle, &mut scratch).expect("batch run should not error out");

    println!("{} OD trips processed", result.od_trip_results.len());
    let summary = BatchSummary::from(&result);
    println!("{}", serde_json::to_string_pretty(&summary).unwrap());
}
