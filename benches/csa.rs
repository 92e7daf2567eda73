use criterion::{criterion_group, criterion_main, Criterion};

use transit_csa::loader::NoWalkOracle;
use transit_csa::network::INFINITE_SECONDS;
use transit_csa::params::{QueryParameters, TimeType};
use transit_csa::{calculate_journey, QueryScratch};

fn bench_single_query(c: &mut Criterion) {
    let (network, handles) = dev_utils::build_toy_network();
    let params = QueryParameters {
        origin: network.nodes[handles.stops[0] as usize].point,
        destination: network.nodes[handles.stops[6] as usize].point,
        scenario_idx: handles.default_scenario,
        time_of_trip: 35400,
        time_type: TimeType::Departure,
        with_alternatives: false,
        min_waiting_time_seconds: 180,
        max_total_travel_time_seconds: INFINITE_SECONDS,
        max_access_travel_time_seconds: 1200,
        max_egress_travel_time_seconds: 1200,
        max_transfer_travel_time_seconds: 1200,
        max_first_waiting_time_seconds: 1800,
        walking_speed_factor: 1.0,
        access_nodes: Some(vec![(handles.stops[0], 0)]),
        egress_nodes: Some(vec![(handles.stops[6], 0)]),
        od_trip_idx: None,
    };
    let mut scratch = QueryScratch::new(&network);

    c.bench_function("csa forward query, toy network", |b| {
        b.iter(|| calculate_journey(&network, &params, &NoWalkOracle, &mut scratch).unwrap())
    });
}

criterion_group!(benches, bench_single_query);
criterion_main!(benches);
