use criterion::{criterion_group, criterion_main, Criterion};

use transit_csa::loader::NoWalkOracle;
use transit_csa::network::INFINITE_SECONDS;
use transit_csa::params::{BatchParameters, QueryParameters, TimeType};
use transit_csa::{run_batch, QueryScratch};

fn bench_batch_run(c: &mut Criterion) {
    let (mut network, handles) = dev_utils::build_toy_network();
    for i in 0..200 {
        let departure = 25200 + (i % 24) * 1800;
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

    c.bench_function("batch od run, 200 toy trips", |b| b.iter(|| run_batch(&network, &batch, &NoWalkOracle, &mut scratch).unwrap()));
}

criterion_group!(benches, bench_batch_run);
criterion_main!(benches);
