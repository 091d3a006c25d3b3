#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Closed categorical domains of the BAAC road-accident survey.
//!
//! Every coded attribute of the survey (lighting, road category, vehicle
//! category, injury severity, ...) is a closed enumeration whose variants
//! carry the numeric survey code as their discriminant. Raw codes are turned
//! into these types by the domain registry in `baac_source`, which owns the
//! per-field sentinel and alias rules. This crate only knows the domains.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A closed enumeration backed by numeric survey codes.
pub trait CodedCategory: Sized + Copy + 'static {
    /// Every variant of the domain, in declaration order.
    const ALL: &'static [Self];

    /// Returns the survey code of this variant.
    fn code(self) -> u8;

    /// Looks up the variant for a survey code. Returns `None` if the code is
    /// outside the domain.
    #[must_use]
    fn from_code(code: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|variant| variant.code() == code)
    }
}

macro_rules! coded_category {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $code:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
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
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        #[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
        #[repr(u8)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                $variant = $code
            ),+
        }

        impl CodedCategory for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn code(self) -> u8 {
                self as u8
            }
        }
    };
}

// ── Characteristics ──────────────────────────────────────────────────────

coded_category! {
    /// Lighting conditions at the time of the accident (`lum`).
    pub enum Light {
        Daylight = 1,
        DuskOrDawn = 2,
        NightWithoutPublicLighting = 3,
        NightWithPublicLightingOff = 4,
        NightWithPublicLightingOn = 5,
    }
}

coded_category! {
    /// Intersection type (`int`).
    pub enum Intersection {
        OutOfIntersection = 1,
        XIntersection = 2,
        TIntersection = 3,
        YIntersection = 4,
        #[serde(rename = "INTERSECTION_WITH_MORE_THAN_4_BRANCHES")]
        #[strum(serialize = "INTERSECTION_WITH_MORE_THAN_4_BRANCHES")]
        IntersectionWithMoreThanFourBranches = 5,
        Roundabout = 6,
        Place = 7,
        LevelCrossing = 8,
        OtherIntersection = 9,
    }
}

coded_category! {
    /// Atmospheric conditions (`atm`).
    pub enum AtmosphericConditions {
        Normal = 1,
        LightRain = 2,
        HeavyRain = 3,
        SnowHail = 4,
        FogSmoke = 5,
        StrongWindStorm = 6,
        DazzlingWeather = 7,
        OvercastWeather = 8,
        Other = 9,
    }
}

coded_category! {
    /// Collision type (`col`).
    pub enum Collision {
        TwoVehiclesFront = 1,
        TwoVehiclesFromTheRear = 2,
        TwoVehiclesFromTheSide = 3,
        ThreeOrMoreVehiclesInAChain = 4,
        ThreeOrMoreVehiclesMultipleCollisions = 5,
        OtherCollision = 6,
        WithoutCollision = 7,
    }
}

coded_category! {
    /// Urban/rural regime of the accident site (`agg`).
    pub enum LocationRegime {
        InBuiltUpAreas = 1,
        OutOfTown = 2,
    }
}

// ── Locations ────────────────────────────────────────────────────────────

coded_category! {
    /// Administrative road classification (`catr`).
    pub enum RoadCategory {
        Motorway = 1,
        NationalRoad = 2,
        DepartmentalRoad = 3,
        MunicipalRoad = 4,
        OffPublicNetwork = 5,
        PublicParkingLot = 6,
        MetropolitanRoad = 7,
        Other = 9,
    }
}

coded_category! {
    /// Traffic regime of the road (`circ`).
    pub enum TrafficRegime {
        OneWay = 1,
        Bidirectional = 2,
        SeparatedCarriageways = 3,
        VariableAssignmentLanes = 4,
    }
}

coded_category! {
    /// Dedicated lane at the accident site (`vosp`). Code `0` is a real
    /// value here, meaning no dedicated lane.
    pub enum DedicatedLane {
        NotApplicable = 0,
        CyclePath = 1,
        CycleLane = 2,
        ReservedLane = 3,
    }
}

coded_category! {
    /// Longitudinal road profile (`prof`).
    pub enum Profile {
        Flat = 1,
        Slope = 2,
        HillTop = 3,
        HillBottom = 4,
    }
}

coded_category! {
    /// Road layout curvature (`plan`).
    pub enum Curvature {
        Straight = 1,
        LeftCurve = 2,
        RightCurve = 3,
        SShaped = 4,
    }
}

// ── Vehicles ─────────────────────────────────────────────────────────────

coded_category! {
    /// Direction of travel relative to the road markers (`senc`).
    pub enum TrafficDirection {
        IncreasingMarkers = 1,
        DecreasingMarkers = 2,
        NoReference = 3,
    }
}

coded_category! {
    /// Vehicle category (`catv`).
    ///
    /// Several codes only exist in the pre-2019 nomenclature. The legacy
    /// tramway code `19` has no variant: it is aliased to [`Self::Tramway`]
    /// by the domain registry.
    pub enum VehicleCategory {
        Bicycle = 1,
        Moped = 2,
        Microcar = 3,
        RegisteredScooter = 4,
        Motorcycle = 5,
        Sidecar = 6,
        Car = 7,
        CarWithCaravan = 8,
        CarWithTrailer = 9,
        Van = 10,
        VanWithCaravan = 11,
        VanWithTrailer = 12,
        LightTruck = 13,
        HeavyTruck = 14,
        TruckWithTrailer = 15,
        RoadTractor = 16,
        RoadTractorWithSemiTrailer = 17,
        PublicTransport = 18,
        SpecialVehicle = 20,
        AgriculturalTractor = 21,
        SmallScooter = 30,
        MediumMotorcycle = 31,
        MediumScooter = 32,
        LargeMotorcycle = 33,
        LargeScooter = 34,
        LightQuad = 35,
        HeavyQuad = 36,
        Bus = 37,
        Coach = 38,
        Train = 39,
        Tramway = 40,
        SmallThreeWheeler = 41,
        MediumThreeWheeler = 42,
        LargeThreeWheeler = 43,
        MotorizedPersonalTransporter = 50,
        UnmotorizedPersonalTransporter = 60,
        ElectricBicycle = 80,
        Other = 99,
    }
}

coded_category! {
    /// Fixed obstacle struck (`obs`).
    pub enum FixedObstacle {
        ParkedVehicle = 1,
        Tree = 2,
        MetalBarrier = 3,
        ConcreteBarrier = 4,
        OtherBarrier = 5,
        BuildingWallBridgePier = 6,
        SignSupportOrEmergencyPhone = 7,
        Pole = 8,
        StreetFurniture = 9,
        Parapet = 10,
        IslandRefugeBollard = 11,
        SidewalkEdge = 12,
        DitchEmbankmentRockFace = 13,
        OtherObstacleOnRoad = 14,
        OtherObstacleOnSidewalkOrShoulder = 15,
        RunOffWithoutObstacle = 16,
        CulvertHead = 17,
    }
}

coded_category! {
    /// Mobile obstacle struck (`obsm`).
    pub enum MobileObstacle {
        Pedestrian = 1,
        Vehicle = 2,
        RailVehicle = 4,
        DomesticAnimal = 5,
        WildAnimal = 6,
        Other = 9,
    }
}

coded_category! {
    /// Initial impact point on the vehicle (`choc`).
    pub enum ShockPoint {
        Front = 1,
        FrontRight = 2,
        FrontLeft = 3,
        Rear = 4,
        RearRight = 5,
        RearLeft = 6,
        RightSide = 7,
        LeftSide = 8,
        MultipleImpacts = 9,
    }
}

coded_category! {
    /// Primary manoeuvre before the accident (`manv`).
    pub enum Manoeuvre {
        NoDirectionChange = 1,
        SameDirectionSameLane = 2,
        BetweenTwoLanes = 3,
        Reversing = 4,
        WrongWay = 5,
        CrossingMedian = 6,
        InBusLaneSameDirection = 7,
        InBusLaneOppositeDirection = 8,
        Merging = 9,
        UTurn = 10,
        ChangingLaneLeft = 11,
        ChangingLaneRight = 12,
        ShiftedLeft = 13,
        ShiftedRight = 14,
        TurningLeft = 15,
        TurningRight = 16,
        OvertakingLeft = 17,
        OvertakingRight = 18,
        CrossingRoad = 19,
        Parking = 20,
        Avoiding = 21,
        OpeningDoor = 22,
        Stopped = 23,
        Parked = 24,
        OnSidewalk = 25,
        OtherManoeuvre = 26,
    }
}

coded_category! {
    /// Engine type (`motor`, 2019 onward).
    pub enum Engine {
        Hydrocarbon = 1,
        HybridElectric = 2,
        Electric = 3,
        Hydrogen = 4,
        Human = 5,
        Other = 6,
    }
}

// ── Persons ──────────────────────────────────────────────────────────────

coded_category! {
    /// Seat occupied in the vehicle (`place`).
    pub enum Place {
        Driver = 1,
        FrontRight = 2,
        RearRight = 3,
        RearLeft = 4,
        RearCenter = 5,
        FrontCenter = 6,
        MiddleLeft = 7,
        MiddleCenter = 8,
        MiddleRight = 9,
        Pedestrian = 10,
    }
}

coded_category! {
    /// Person category (`catu`).
    pub enum PersonCategory {
        Driver = 1,
        Passenger = 2,
        Pedestrian = 3,
    }
}

coded_category! {
    /// Injury severity (`grav`).
    pub enum Severity {
        Unharmed = 1,
        Killed = 2,
        Hospitalized = 3,
        LightlyInjured = 4,
    }
}

coded_category! {
    /// Sex of the person (`sexe`).
    pub enum Sex {
        Male = 1,
        Female = 2,
    }
}

coded_category! {
    /// Purpose of the trip (`trajet`).
    pub enum TravelReason {
        HomeWork = 1,
        HomeSchool = 2,
        Shopping = 3,
        Professional = 4,
        Leisure = 5,
        Other = 9,
    }
}

coded_category! {
    /// Safety equipment worn (`secu`, `secu1`..`secu3`).
    pub enum SafetyEquipment {
        Belt = 1,
        Helmet = 2,
        ChildDevice = 3,
        ReflectiveVest = 4,
        Airbag = 5,
        Gloves = 6,
        Other = 9,
    }
}

coded_category! {
    /// Pedestrian position on the road (`locp`).
    pub enum PedestrianLocation {
        OnRoadFarFromCrossing = 1,
        OnRoadNearCrossing = 2,
        OnCrossingWithoutLights = 3,
        OnCrossingWithLights = 4,
        OnSidewalk = 5,
        OnShoulder = 6,
        OnRefuge = 7,
        OnServiceRoad = 8,
    }
}

coded_category! {
    /// Pedestrian action (`actp`). The survey codes getting on or off a
    /// vehicle as the letter `A`, aliased to code `10` by the registry.
    pub enum PedestrianAction {
        SameDirectionAsVehicle = 1,
        OppositeDirection = 2,
        Crossing = 3,
        Masked = 4,
        PlayingRunning = 5,
        WithAnimal = 6,
        Other = 9,
        GettingOnOffVehicle = 10,
    }
}

coded_category! {
    /// Whether the pedestrian was alone (`etatp`).
    pub enum PedestrianCompany {
        Alone = 1,
        Accompanied = 2,
        InGroup = 3,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn assert_codes_unique<T: CodedCategory + std::fmt::Debug>() {
        let codes: BTreeSet<u8> = T::ALL.iter().map(|v| v.code()).collect();
        assert_eq!(codes.len(), T::ALL.len(), "duplicate code in {:?}", T::ALL);
    }

    #[test]
    fn codes_are_unique_per_domain() {
        assert_codes_unique::<Light>();
        assert_codes_unique::<Intersection>();
        assert_codes_unique::<AtmosphericConditions>();
        assert_codes_unique::<Collision>();
        assert_codes_unique::<LocationRegime>();
        assert_codes_unique::<RoadCategory>();
        assert_codes_unique::<TrafficRegime>();
        assert_codes_unique::<DedicatedLane>();
        assert_codes_unique::<Profile>();
        assert_codes_unique::<Curvature>();
        assert_codes_unique::<TrafficDirection>();
        assert_codes_unique::<VehicleCategory>();
        assert_codes_unique::<FixedObstacle>();
        assert_codes_unique::<MobileObstacle>();
        assert_codes_unique::<ShockPoint>();
        assert_codes_unique::<Manoeuvre>();
        assert_codes_unique::<Engine>();
        assert_codes_unique::<Place>();
        assert_codes_unique::<PersonCategory>();
        assert_codes_unique::<Severity>();
        assert_codes_unique::<Sex>();
        assert_codes_unique::<TravelReason>();
        assert_codes_unique::<SafetyEquipment>();
        assert_codes_unique::<PedestrianLocation>();
        assert_codes_unique::<PedestrianAction>();
        assert_codes_unique::<PedestrianCompany>();
    }

    #[test]
    fn from_code_roundtrip() {
        for category in VehicleCategory::ALL {
            assert_eq!(VehicleCategory::from_code(category.code()), Some(*category));
        }
        assert_eq!(VehicleCategory::from_code(19), None);
        assert_eq!(VehicleCategory::from_code(0), None);
        assert_eq!(Light::from_code(6), None);
    }

    #[test]
    fn zero_is_a_real_dedicated_lane_code() {
        assert_eq!(DedicatedLane::from_code(0), Some(DedicatedLane::NotApplicable));
    }

    #[test]
    fn serializes_symbolic_names() {
        assert_eq!(
            serde_json::to_string(&Light::Daylight).unwrap(),
            "\"DAYLIGHT\""
        );
        assert_eq!(
            serde_json::to_string(&Intersection::IntersectionWithMoreThanFourBranches).unwrap(),
            "\"INTERSECTION_WITH_MORE_THAN_4_BRANCHES\""
        );
        assert_eq!(
            serde_json::to_string(&Intersection::XIntersection).unwrap(),
            "\"X_INTERSECTION\""
        );
        assert_eq!(
            serde_json::to_string(&LocationRegime::InBuiltUpAreas).unwrap(),
            "\"IN_BUILT_UP_AREAS\""
        );
        assert_eq!(VehicleCategory::Other.to_string(), "OTHER");
    }
}
