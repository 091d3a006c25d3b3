//! Decoder for `vehicules-YYYY.csv`.

use baac_source_models::{Family, SurveyYear, Vehicle, VehicleId, VehicleRecord};

use crate::FieldError;
use crate::parsing::{parse_accident_id, parse_unsigned, parse_vehicle_id};
use crate::reader::RowDecoder;
use crate::registry::DomainRegistry;
use crate::row::Row;

/// Decodes vehicle rows.
#[derive(Debug, Clone, Copy)]
pub struct VehiclesDecoder<'r> {
    registry: &'r DomainRegistry,
}

impl<'r> VehiclesDecoder<'r> {
    #[must_use]
    pub const fn new(registry: &'r DomainRegistry) -> Self {
        Self { registry }
    }
}

/// Reads the vehicle identity of a vehicle or person row. The numeric
/// `id_vehicule` only exists from 2019 onward.
///
/// # Errors
///
/// Returns [`FieldError::MissingColumn`] without `num_veh`, or
/// [`FieldError::InvalidNumber`] for a malformed `id_vehicule`.
pub fn vehicle_id(row: &Row) -> Result<VehicleId, FieldError> {
    Ok(VehicleId {
        vehicle_id: row
            .get_opt("id_vehicule")
            .map(parse_vehicle_id)
            .transpose()?,
        vehicle_name: row.get("num_veh")?.to_owned(),
    })
}

impl RowDecoder for VehiclesDecoder<'_> {
    type Record = VehicleRecord;
    const FAMILY: Family = Family::Vehicles;

    fn decode(&self, row: &Row, year: SurveyYear) -> Result<VehicleRecord, FieldError> {
        let view = self.registry.view(Self::FAMILY, year);

        Ok(VehicleRecord {
            accident_id: parse_accident_id(row.get("Num_Acc")?)?,
            vehicle: Vehicle {
                id: vehicle_id(row)?,
                traffic_direction: view.category(row, "senc")?,
                vehicle_category: view.category(row, "catv")?,
                fixed_obstacle: view.category(row, "obs")?,
                mobile_obstacle: view.category(row, "obsm")?,
                shock_point: view.category(row, "choc")?,
                primary_manoeuvre: view.category(row, "manv")?,
                engine: view.optional_category(row, "motor")?,
                occupancy: view
                    .optional_value(row, "occutc")
                    .map(|raw| parse_unsigned("occutc", raw))
                    .transpose()?,
            },
        })
    }
}
