#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Survey file families and the typed records decoded from them.
//!
//! The BAAC survey is published as four families of yearly CSV files. Each
//! row decodes into one of the record types below, using the closed domains
//! from [`baac_accident_models`].

use std::collections::BTreeSet;
use std::fmt;

use baac_accident_models::{
    AtmosphericConditions, Collision, Curvature, DedicatedLane, Engine, FixedObstacle,
    Intersection, Light, LocationRegime, Manoeuvre, MobileObstacle, PedestrianAction,
    PedestrianCompany, PedestrianLocation, PersonCategory, Place, Profile, RoadCategory,
    SafetyEquipment, Severity, Sex, ShockPoint, TrafficDirection, TrafficRegime, TravelReason,
    VehicleCategory,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// One of the four families of survey files.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Family {
    /// Accident characteristics (`caracteristiques-YYYY.csv`).
    Characteristics,
    /// Accident locations (`lieux-YYYY.csv`).
    Locations,
    /// Vehicles involved (`vehicules-YYYY.csv`).
    Vehicles,
    /// Persons involved (`usagers-YYYY.csv`).
    Persons,
}

impl Family {
    /// Every family, in the order the pipeline decodes them.
    pub const ALL: &[Self] = &[
        Self::Characteristics,
        Self::Locations,
        Self::Vehicles,
        Self::Persons,
    ];

    /// Returns the file name prefix of this family.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Characteristics => "caracteristiques",
            Self::Locations => "lieux",
            Self::Vehicles => "vehicules",
            Self::Persons => "usagers",
        }
    }
}

/// The survey year a file belongs to, inferred from its name.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SurveyYear(pub u16);

impl SurveyYear {
    /// Returns the numeric year.
    #[must_use]
    pub const fn value(self) -> u16 {
        self.0
    }
}

impl fmt::Display for SurveyYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Globally unique accident identifier (`Num_Acc`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AccidentId(pub u64);

impl fmt::Display for AccidentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies a vehicle within an accident.
///
/// Files from 2019 onward carry a stable numeric `id_vehicule`; every year
/// carries the alphanumeric slot label `num_veh` (`A01`, `B01`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleId {
    /// Stable numeric id, when the survey year provides one.
    pub vehicle_id: Option<u64>,
    /// Slot label within the accident.
    pub vehicle_name: String,
}

impl VehicleId {
    /// Returns the canonical join key: the stable id when present, the slot
    /// label otherwise.
    #[must_use]
    pub fn key(&self) -> VehicleKey {
        self.vehicle_id.map_or_else(
            || VehicleKey::Slot(self.vehicle_name.clone()),
            VehicleKey::Stable,
        )
    }
}

/// Canonical, comparable vehicle key used for joins.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VehicleKey {
    /// Stable numeric id (2019 onward).
    Stable(u64),
    /// Slot label (all years).
    Slot(String),
}

impl fmt::Display for VehicleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stable(id) => write!(f, "#{id}"),
            Self::Slot(label) => write!(f, "{label}"),
        }
    }
}

/// Accident-level characteristics, one per accident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Characteristic {
    /// Accident identifier.
    pub accident_id: AccidentId,
    /// When the accident happened (local time, minute precision).
    pub timestamp: NaiveDateTime,
    /// Latitude in decimal degrees, `None` when absent or out of range.
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees, `None` when absent or out of range.
    pub longitude: Option<f64>,
    /// Free-text postal address, `None` when absent or blank.
    pub address: Option<String>,
    pub light: Option<Light>,
    pub intersection: Option<Intersection>,
    pub atmospheric_conditions: Option<AtmosphericConditions>,
    pub collision: Option<Collision>,
    /// Urban/rural regime.
    pub location: Option<LocationRegime>,
    /// Department code (`dep`).
    pub department: String,
    /// Commune code (`com`).
    pub commune: String,
}

/// Road description of the accident site, one per accident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Accident identifier.
    pub accident_id: AccidentId,
    pub road_category: RoadCategory,
    /// Road number or name (`voie`), `None` when blank.
    pub road: Option<String>,
    /// Numeric index of the route (`v1`).
    pub road_index_number: Option<u32>,
    /// Alphanumeric index of the route (`v2`).
    pub road_index_alpha: Option<String>,
    pub traffic_regime: Option<TrafficRegime>,
    pub lanes_count: Option<u32>,
    pub dedicated_lane: Option<DedicatedLane>,
    pub profile: Option<Profile>,
    /// Number of the upstream terminal marker (`pr`).
    pub upstream_terminal: Option<u32>,
    /// Distance to the upstream terminal marker (`pr1`).
    pub upstream_terminal_distance_meters: Option<f64>,
    pub curvature: Option<Curvature>,
    /// Width of the central reservation, `0` when not recorded.
    pub central_reservation_width_meters: f64,
    /// Width of the roadway, `0` when not recorded.
    pub road_traffic_width_meters: f64,
}

/// Attributes of one vehicle involved in an accident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    #[serde(flatten)]
    pub id: VehicleId,
    pub traffic_direction: Option<TrafficDirection>,
    pub vehicle_category: Option<VehicleCategory>,
    pub fixed_obstacle: Option<FixedObstacle>,
    pub mobile_obstacle: Option<MobileObstacle>,
    pub shock_point: Option<ShockPoint>,
    pub primary_manoeuvre: Option<Manoeuvre>,
    pub engine: Option<Engine>,
    /// Number of occupants of a bus or coach.
    pub occupancy: Option<u32>,
}

impl Vehicle {
    /// Builds the stand-in for a vehicle that persons reference but the
    /// vehicle files omit: category [`VehicleCategory::Other`], every other
    /// attribute absent.
    #[must_use]
    pub const fn placeholder(id: VehicleId) -> Self {
        Self {
            id,
            traffic_direction: None,
            vehicle_category: Some(VehicleCategory::Other),
            fixed_obstacle: None,
            mobile_obstacle: None,
            shock_point: None,
            primary_manoeuvre: None,
            engine: None,
            occupancy: None,
        }
    }
}

/// A decoded vehicle row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleRecord {
    pub accident_id: AccidentId,
    pub vehicle: Vehicle,
}

/// Attributes of one person involved in an accident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub place: Option<Place>,
    pub category: Option<PersonCategory>,
    pub severity: Severity,
    pub sex: Sex,
    pub birth_year: Option<u16>,
    pub travel_reason: Option<TravelReason>,
    /// Every piece of equipment worn; order carries no meaning.
    pub safety_equipment: BTreeSet<SafetyEquipment>,
    pub pedestrian_location: Option<PedestrianLocation>,
    pub pedestrian_action: Option<PedestrianAction>,
    pub pedestrian_company: Option<PedestrianCompany>,
}

/// A decoded person row, keyed by the vehicle the person was in (or hit by).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonRecord {
    pub accident_id: AccidentId,
    pub vehicle_id: VehicleId,
    pub person: Person,
}
