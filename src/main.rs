use std::io::{stdin, stdout, Write};

use transit_csa::loader::NoWalkOracle;
use transit_csa::params::{QueryParameters, TimeType};
use transit_csa::result::{NoRoutingFoundResult, RoutingResult};
use transit_csa::{calculate_journey, Error, QueryScratch};

fn read_line(prompt: &str) -> std::io::Result<String> {
    print!("{prompt}");
    stdout().flush()?;
    let mut line = String::new();
    stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let (network, handles) = dev_utils::build_toy_network();
    println!(
        "toy network loaded with {} nodes, {} lines, {} trips",
        network.nodes.len(),
        network.lines.len(),
        network.trips.len()
    );
    println!("origin/destination default to S1/S2; enter a time of day to query");

    let mut scratch = QueryScratch::new(&network);

    loop {
        let time_str = read_line("time of trip (HH:MM, blank to quit): ")?;
        if time_str.is_empty() {
            break;
        }
        let Some(time_of_trip) = transit_csa::utils::parse_time(&format!("{time_str}:00")) else {
            println!("could not parse time, try again");
            continue;
        };

        let params = QueryParameters {
            origin: network.nodes[handles.stops[0] as usize].point,
            destination: network.nodes[handles.stops[1] as usize].point,
            scenario_idx: handles.default_scenario,
            time_of_trip,
            time_type: TimeType::Departure,
            with_alternatives: false,
            min_waiting_time_seconds: 180,
            max_total_travel_time_seconds: transit_csa::network::INFINITE_SECONDS,
            max_access_travel_time_seconds: 1200,
            max_egress_travel_time_seconds: 1200,
            max_transfer_travel_time_seconds: 1200,
            max_first_waiting_time_seconds: 1800,
            walking_speed_factor: 1.0,
            access_nodes: Some(vec![(handles.stops[0], 0)]),
            egress_nodes: Some(vec![(handles.stops[1], 0)]),
            od_trip_idx: None,
        };

        match calculate_journey(&network, &params, &NoWalkOracle, &mut scratch) {
            Ok(journey) => {
                println!("{journey}");
                let result = RoutingResult::from_journey(&network, &journey, time_of_trip);
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
            Err(Error::NoRoutingFound(reason)) => {
                println!("no routing found: {reason}");
                let result = NoRoutingFoundResult::new(params.origin, params.destination, time_of_trip);
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
            Err(other) => println!("query failed: {other}"),
        }
    }

    Ok(())
}
