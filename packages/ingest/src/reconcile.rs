//! Joins the four record streams into accident aggregates.
//!
//! Every stream is drained into a function-local index before anything is
//! checked, since no prefix of one stream says whether an accident is
//! complete. The cross-stream invariants are then verified, persons whose
//! vehicle row is missing get a placeholder vehicle, and one [`Accident`]
//! is assembled per characteristics record, in accident id order.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use baac_ingest_models::{Accident, AccidentVehicle};
use baac_source_models::{
    AccidentId, Characteristic, Family, Location, Person, PersonRecord, Vehicle, VehicleId,
    VehicleKey, VehicleRecord,
};

/// A broken link between two record streams.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    #[error("accident {0} has characteristics but no location")]
    MissingLocation(AccidentId),

    #[error("accident {0} has a location but no characteristics")]
    MissingCharacteristics(AccidentId),

    #[error("vehicle {vehicle} belongs to accident {accident_id}, which has no characteristics")]
    OrphanVehicle {
        accident_id: AccidentId,
        vehicle: VehicleKey,
    },

    #[error("persons reference accident {0}, which has no vehicles")]
    OrphanPersons(AccidentId),
}

/// Errors that abort reconciliation.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// A key occurs twice within one stream.
    #[error("duplicate {family} key {key}")]
    DuplicateKey {
        /// Stream the duplicate was found in.
        family: Family,
        /// The repeated key.
        key: String,
    },

    /// The streams disagree about which accidents or vehicles exist.
    #[error("referential integrity violation: {violation}")]
    ReferentialIntegrity {
        /// The first violation found.
        violation: Violation,
    },
}

impl From<Violation> for ReconcileError {
    fn from(violation: Violation) -> Self {
        Self::ReferentialIntegrity { violation }
    }
}

/// Output of [`reconcile`].
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// One aggregate per accident, in accident id order.
    pub accidents: Vec<Accident>,
    /// Vehicles synthesized for persons whose vehicle row is missing.
    pub placeholders: Vec<(AccidentId, VehicleKey)>,
}

type PersonsByVehicle = BTreeMap<VehicleKey, (VehicleId, Vec<Person>)>;

/// Indexes the four streams, checks their consistency and assembles the
/// accidents.
///
/// # Errors
///
/// Returns [`ReconcileError::DuplicateKey`] if an accident appears twice in
/// the characteristics or locations, or a vehicle twice in the vehicles.
/// Returns [`ReconcileError::ReferentialIntegrity`] if characteristics and
/// locations cover different accidents, a vehicle belongs to an unknown
/// accident, or persons belong to an accident without vehicles.
pub fn reconcile(
    characteristics: impl IntoIterator<Item = Characteristic>,
    locations: impl IntoIterator<Item = Location>,
    vehicles: impl IntoIterator<Item = VehicleRecord>,
    persons: impl IntoIterator<Item = PersonRecord>,
) -> Result<Reconciliation, ReconcileError> {
    let mut characteristic_index = BTreeMap::new();
    for characteristic in characteristics {
        insert_unique(
            &mut characteristic_index,
            Family::Characteristics,
            characteristic.accident_id,
            characteristic,
        )?;
    }

    let mut location_index = BTreeMap::new();
    for location in locations {
        insert_unique(
            &mut location_index,
            Family::Locations,
            location.accident_id,
            location,
        )?;
    }

    let mut vehicle_index: BTreeMap<AccidentId, BTreeMap<VehicleKey, Vehicle>> = BTreeMap::new();
    for VehicleRecord {
        accident_id,
        vehicle,
    } in vehicles
    {
        let key = vehicle.id.key();
        match vehicle_index.entry(accident_id).or_default().entry(key) {
            Entry::Occupied(entry) => {
                return Err(ReconcileError::DuplicateKey {
                    family: Family::Vehicles,
                    key: format!("{accident_id}/{}", entry.key()),
                });
            }
            Entry::Vacant(entry) => {
                entry.insert(vehicle);
            }
        }
    }

    let mut person_index: BTreeMap<AccidentId, PersonsByVehicle> = BTreeMap::new();
    for PersonRecord {
        accident_id,
        vehicle_id,
        person,
    } in persons
    {
        person_index
            .entry(accident_id)
            .or_default()
            .entry(vehicle_id.key())
            .or_insert_with(|| (vehicle_id, Vec::new()))
            .1
            .push(person);
    }

    log::debug!(
        "Indexed {} characteristics, {} locations, {} accidents with vehicles, {} with persons",
        characteristic_index.len(),
        location_index.len(),
        vehicle_index.len(),
        person_index.len()
    );

    check_integrity(
        &characteristic_index,
        &location_index,
        &vehicle_index,
        &person_index,
    )?;

    let placeholders = fill_missing_vehicles(&mut vehicle_index, &person_index);

    let mut accidents = Vec::with_capacity(characteristic_index.len());
    for (accident_id, characteristic) in characteristic_index {
        let location = location_index
            .remove(&accident_id)
            .ok_or(Violation::MissingLocation(accident_id))?;
        let mut persons = person_index.remove(&accident_id).unwrap_or_default();

        let vehicles = vehicle_index
            .remove(&accident_id)
            .unwrap_or_default()
            .into_iter()
            .map(|(key, vehicle)| AccidentVehicle {
                vehicle,
                persons: persons.remove(&key).map(|(_, p)| p).unwrap_or_default(),
            })
            .collect();

        accidents.push(Accident::assemble(characteristic, location, vehicles));
    }

    Ok(Reconciliation {
        accidents,
        placeholders,
    })
}

fn insert_unique<T>(
    index: &mut BTreeMap<AccidentId, T>,
    family: Family,
    accident_id: AccidentId,
    record: T,
) -> Result<(), ReconcileError> {
    match index.entry(accident_id) {
        Entry::Occupied(_) => Err(ReconcileError::DuplicateKey {
            family,
            key: accident_id.to_string(),
        }),
        Entry::Vacant(entry) => {
            entry.insert(record);
            Ok(())
        }
    }
}

fn check_integrity(
    characteristics: &BTreeMap<AccidentId, Characteristic>,
    locations: &BTreeMap<AccidentId, Location>,
    vehicles: &BTreeMap<AccidentId, BTreeMap<VehicleKey, Vehicle>>,
    persons: &BTreeMap<AccidentId, PersonsByVehicle>,
) -> Result<(), Violation> {
    if let Some(id) = characteristics.keys().find(|id| !locations.contains_key(id)) {
        return Err(Violation::MissingLocation(*id));
    }
    if let Some(id) = locations.keys().find(|id| !characteristics.contains_key(id)) {
        return Err(Violation::MissingCharacteristics(*id));
    }
    for (accident_id, by_key) in vehicles {
        if !characteristics.contains_key(accident_id)
            && let Some(key) = by_key.keys().next()
        {
            return Err(Violation::OrphanVehicle {
                accident_id: *accident_id,
                vehicle: key.clone(),
            });
        }
    }
    if let Some(id) = persons.keys().find(|id| !vehicles.contains_key(id)) {
        return Err(Violation::OrphanPersons(*id));
    }
    Ok(())
}

fn fill_missing_vehicles(
    vehicles: &mut BTreeMap<AccidentId, BTreeMap<VehicleKey, Vehicle>>,
    persons: &BTreeMap<AccidentId, PersonsByVehicle>,
) -> Vec<(AccidentId, VehicleKey)> {
    let mut placeholders = Vec::new();

    for (accident_id, by_key) in persons {
        let accident_vehicles = vehicles.entry(*accident_id).or_default();
        for (key, (vehicle_id, _)) in by_key {
            if let Entry::Vacant(entry) = accident_vehicles.entry(key.clone()) {
                log::debug!("Accident {accident_id}: placeholder for vehicle {key}");
                entry.insert(Vehicle::placeholder(vehicle_id.clone()));
                placeholders.push((*accident_id, key.clone()));
            }
        }
    }

    if !placeholders.is_empty() {
        log::info!(
            "Synthesized {} placeholder vehicle(s) referenced only by persons",
            placeholders.len()
        );
    }

    placeholders
}
