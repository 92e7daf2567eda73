//! A connection-scan-based public transit journey planner: loads an
//! immutable, indexed network once, then answers single earliest-arrival /
//! latest-departure queries and batch origin-destination demand runs
//! against it.

pub mod batch;
pub mod csa;
pub mod error;
pub mod journey;
pub mod loader;
pub mod network;
pub mod params;
pub mod reset;
pub mod result;
pub mod scratch;
pub mod utils;

pub use batch::{run_batch, BatchResult, OdTripOutcome, OdTripResult, PathProfile};
pub use csa::calculate_journey;
pub use error::{Error, NoRoutingReason, ParameterError, Result};
pub use journey::{Journey, JourneyError, Step};
pub use loader::{NetworkLoader, NoWalkOracle, WalkTimeOracle};
pub use network::Network;
pub use params::{BatchParameters, QueryParameters, TimeType};
pub use result::{BatchSummary, NoRoutingFoundResult, RoutingResult};
pub use scratch::QueryScratch;
