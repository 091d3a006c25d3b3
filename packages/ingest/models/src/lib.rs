#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Reconciled accident aggregates and ingestion result types.

use std::path::PathBuf;
use std::time::Duration;

use baac_accident_models::{
    AtmosphericConditions, Collision, Curvature, DedicatedLane, Intersection, Light,
    LocationRegime, Profile, RoadCategory, TrafficRegime,
};
use baac_source_models::{AccidentId, Characteristic, Location, Person, Vehicle};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One accident with everything the four survey files say about it.
///
/// Serialized as one JSON object per line: characteristic and location
/// fields at the top level, then the vehicles with their persons nested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Accident {
    pub accident_id: AccidentId,

    pub timestamp: NaiveDateTime,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub light: Option<Light>,
    pub intersection: Option<Intersection>,
    pub atmospheric_conditions: Option<AtmosphericConditions>,
    pub collision: Option<Collision>,
    pub location: Option<LocationRegime>,
    pub department: String,
    pub commune: String,

    pub road_category: RoadCategory,
    pub road: Option<String>,
    pub road_index_number: Option<u32>,
    pub road_index_alpha: Option<String>,
    pub traffic_regime: Option<TrafficRegime>,
    pub lanes_count: Option<u32>,
    pub dedicated_lane: Option<DedicatedLane>,
    pub profile: Option<Profile>,
    pub upstream_terminal: Option<u32>,
    pub upstream_terminal_distance_meters: Option<f64>,
    pub curvature: Option<Curvature>,
    pub central_reservation_width_meters: f64,
    pub road_traffic_width_meters: f64,

    /// Vehicles in key order, each with its occupants.
    pub vehicles: Vec<AccidentVehicle>,
}

impl Accident {
    /// Merges the characteristic and location of one accident with its
    /// vehicles.
    ///
    /// The caller guarantees both records belong to the same accident; the
    /// id is taken from the characteristic.
    #[must_use]
    pub fn assemble(
        characteristic: Characteristic,
        location: Location,
        vehicles: Vec<AccidentVehicle>,
    ) -> Self {
        debug_assert_eq!(characteristic.accident_id, location.accident_id);

        let Characteristic {
            accident_id,
            timestamp,
            latitude,
            longitude,
            address,
            light,
            intersection,
            atmospheric_conditions,
            collision,
            location: location_regime,
            department,
            commune,
        } = characteristic;

        let Location {
            accident_id: _,
            road_category,
            road,
            road_index_number,
            road_index_alpha,
            traffic_regime,
            lanes_count,
            dedicated_lane,
            profile,
            upstream_terminal,
            upstream_terminal_distance_meters,
            curvature,
            central_reservation_width_meters,
            road_traffic_width_meters,
        } = location;

        Self {
            accident_id,
            timestamp,
            latitude,
            longitude,
            address,
            light,
            intersection,
            atmospheric_conditions,
            collision,
            location: location_regime,
            department,
            commune,
            road_category,
            road,
            road_index_number,
            road_index_alpha,
            traffic_regime,
            lanes_count,
            dedicated_lane,
            profile,
            upstream_terminal,
            upstream_terminal_distance_meters,
            curvature,
            central_reservation_width_meters,
            road_traffic_width_meters,
            vehicles,
        }
    }

    /// Number of persons across all vehicles.
    #[must_use]
    pub fn person_count(&self) -> usize {
        self.vehicles.iter().map(|v| v.persons.len()).sum()
    }
}

/// A vehicle and the persons recorded against it, in file order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccidentVehicle {
    #[serde(flatten)]
    pub vehicle: Vehicle,
    pub persons: Vec<Person>,
}

/// Result of a completed ingestion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestSummary {
    /// Number of survey files decoded.
    pub files: usize,
    /// Number of accidents written.
    pub accidents: usize,
    /// Number of vehicles written, placeholders included.
    pub vehicles: usize,
    /// Number of persons written.
    pub persons: usize,
    /// Number of vehicles synthesized for persons whose vehicle row is
    /// missing.
    pub placeholder_vehicles: usize,
    /// File the accidents were written to.
    pub output: PathBuf,
    /// How long the run took.
    pub duration: Duration,
}
