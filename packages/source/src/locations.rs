//! Decoder for `lieux-YYYY.csv`.

use baac_source_models::{Family, Location, SurveyYear};

use crate::FieldError;
use crate::corrections::corrected;
use crate::parsing::{
    non_empty, parse_accident_id, parse_non_negative_decimal, parse_unsigned,
    strip_parentheses,
};
use crate::reader::RowDecoder;
use crate::registry::DomainRegistry;
use crate::row::Row;

/// Decodes location rows.
#[derive(Debug, Clone, Copy)]
pub struct LocationsDecoder<'r> {
    registry: &'r DomainRegistry,
}

impl<'r> LocationsDecoder<'r> {
    #[must_use]
    pub const fn new(registry: &'r DomainRegistry) -> Self {
        Self { registry }
    }
}

impl RowDecoder for LocationsDecoder<'_> {
    type Record = Location;
    const FAMILY: Family = Family::Locations;

    fn decode(&self, row: &Row, year: SurveyYear) -> Result<Location, FieldError> {
        let view = self.registry.view(Self::FAMILY, year);
        let accident_id = parse_accident_id(row.get("Num_Acc")?)?;

        let road_category = corrected(Self::FAMILY, accident_id, "catr", row.get("catr")?);

        // Some files swap the marker number and the distance to it.
        let (mut marker, mut distance) = (row.get("pr")?, row.get("pr1")?);
        if marker.contains('.') {
            std::mem::swap(&mut marker, &mut distance);
        }

        let width = |column: &str| -> Result<f64, FieldError> {
            view.value(row, column)?
                .map_or(Ok(0.0), |raw| parse_non_negative_decimal(column, raw))
        };

        Ok(Location {
            accident_id,
            road_category: view.require("catr", road_category)?,
            road: non_empty(row.get("voie")?),
            road_index_number: view
                .value(row, "v1")?
                .map(|raw| parse_unsigned("v1", raw))
                .transpose()?,
            road_index_alpha: view.value(row, "v2")?.map(str::to_owned),
            traffic_regime: view.category(row, "circ")?,
            lanes_count: view
                .value(row, "nbv")?
                .map(|raw| parse_unsigned("nbv", raw))
                .transpose()?,
            dedicated_lane: view.category(row, "vosp")?,
            profile: view.category(row, "prof")?,
            upstream_terminal: view
                .present("pr", marker)
                .map(|raw| parse_unsigned("pr", strip_parentheses(raw)))
                .transpose()?,
            upstream_terminal_distance_meters: view
                .present("pr1", distance)
                .map(|raw| parse_non_negative_decimal("pr1", strip_parentheses(raw)))
                .transpose()?,
            curvature: view.category(row, "plan")?,
            central_reservation_width_meters: width("lartpc")?,
            road_traffic_width_meters: width("larrout")?,
        })
    }
}
