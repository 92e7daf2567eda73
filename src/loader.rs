//! Trait boundary for two external collaborators this crate treats as
//! out of scope: the network loader and the street-network walk-time
//! oracle. This crate only fixes the *interface*; an implementation
//! reading GTFS-derived cache files or calling a routing service over
//! HTTP lives outside this crate.

use crate::error::Result;
use crate::network::{Network, NodeIndex, Point, Seconds};

/// Reads a fully-resolved [`Network`] from wherever the cache lives.
///
/// A typical cache file format is a set of length-prefixed records per
/// entity type (stops, routes, trips, connections — two pre-sorted streams,
/// forward and reverse — footpaths, OD trips), each record carrying its
/// UUID, an index already resolved to a dense integer at write time, and the
/// entity's primitive fields. This crate does not parse that format; it
/// consumes the [`Network`] a loader implementation produces.
pub trait NetworkLoader {
    fn load(&self) -> Result<Network>;
}

/// Returns the nodes walkable from an arbitrary point, with seconds, at
/// full walking speed (before `walkingSpeedFactor` is applied — the caller
/// divides the raw seconds this returns).
pub trait WalkTimeOracle {
    fn walkable_nodes_from(&self, point: Point) -> Result<Vec<(NodeIndex, Seconds)>>;
}

/// A [`WalkTimeOracle`] that always reports nothing reachable. Useful as a
/// default when neither an OD trip nor explicit access/egress nodes were
/// supplied and no real oracle is wired in (tests, offline batch replays
/// against a pre-resolved OD population).
pub struct NoWalkOracle;

impl WalkTimeOracle for NoWalkOracle {
    fn walkable_nodes_from(&self, _point: Point) -> Result<Vec<(NodeIndex, Seconds)>> {
        Ok(Vec::new())
    }
}
