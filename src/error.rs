use thiserror::Error;

/// Reason a routing query failed to find any itinerary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoRoutingReason {
    NoAccessAtOrigin,
    NoEgressAtDestination,
    NoServiceFromOrigin,
    NoServiceToDestination,
    NoRoutingFound,
}

impl std::fmt::Display for NoRoutingReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NoRoutingReason::NoAccessAtOrigin => "NO_ACCESS_AT_ORIGIN",
            NoRoutingReason::NoEgressAtDestination => "NO_EGRESS_AT_DESTINATION",
            NoRoutingReason::NoServiceFromOrigin => "NO_SERVICE_FROM_ORIGIN",
            NoRoutingReason::NoServiceToDestination => "NO_SERVICE_TO_DESTINATION",
            NoRoutingReason::NoRoutingFound => "NO_ROUTING_FOUND",
        };
        f.write_str(s)
    }
}

/// Parameter validation failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParameterError {
    #[error("origin is required")]
    MissingOrigin,
    #[error("destination is required")]
    MissingDestination,
    #[error("scenario_id is required")]
    MissingScenario,
    #[error("time_of_trip is required")]
    MissingTimeOfTrip,
    #[error("origin is not a valid \"lon,lat\" point")]
    InvalidOrigin,
    #[error("destination is not a valid \"lon,lat\" point")]
    InvalidDestination,
    #[error("scenario_id does not resolve to a loaded scenario")]
    InvalidScenario,
    #[error("scenario is empty (defines no services)")]
    EmptyScenario,
    #[error("numerical parameter \"{0}\" could not be parsed")]
    InvalidNumericalData(String),
}

/// Top-level error kinds surfaced by the core.
#[derive(Error, Debug)]
pub enum Error {
    #[error("required data is missing: {0}")]
    MissingData(String),
    #[error("invalid query: {0}")]
    InvalidQuery(#[from] ParameterError),
    #[error("no routing found: {0}")]
    NoRoutingFound(NoRoutingReason),
    #[error("query deadline exceeded")]
    Timeout,
    #[error("internal invariant violated: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
