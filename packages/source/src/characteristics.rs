//! Decoder for `caracteristiques-YYYY.csv`.

use baac_source_models::{Characteristic, Family, SurveyYear};

use crate::FieldError;
use crate::parsing::{
    MAX_LATITUDE, MAX_LONGITUDE, non_empty, parse_accident_id, parse_coordinate,
    parse_timestamp,
};
use crate::reader::RowDecoder;
use crate::registry::{DomainRegistry, DomainView};
use crate::row::Row;

/// Decodes accident characteristics rows.
#[derive(Debug, Clone, Copy)]
pub struct CharacteristicsDecoder<'r> {
    registry: &'r DomainRegistry,
}

impl<'r> CharacteristicsDecoder<'r> {
    #[must_use]
    pub const fn new(registry: &'r DomainRegistry) -> Self {
        Self { registry }
    }
}

impl RowDecoder for CharacteristicsDecoder<'_> {
    type Record = Characteristic;
    const FAMILY: Family = Family::Characteristics;

    fn decode(&self, row: &Row, year: SurveyYear) -> Result<Characteristic, FieldError> {
        let view = self.registry.view(Self::FAMILY, year);

        Ok(Characteristic {
            accident_id: parse_accident_id(row.get("Num_Acc")?)?,
            timestamp: parse_timestamp(
                row.get("an")?,
                row.get("mois")?,
                row.get("jour")?,
                row.get("hrmn")?,
            )?,
            latitude: coordinate(&view, row, "lat", MAX_LATITUDE)?,
            longitude: coordinate(&view, row, "long", MAX_LONGITUDE)?,
            address: row.get_opt("adr").and_then(non_empty),
            light: view.category(row, "lum")?,
            intersection: view.category(row, "int")?,
            atmospheric_conditions: view.category(row, "atm")?,
            collision: view.category(row, "col")?,
            location: view.category(row, "agg")?,
            department: row.get("dep")?.to_owned(),
            commune: row.get("com")?.to_owned(),
        })
    }
}

// Legacy files carry no coordinates, or projected ones.
fn coordinate(
    view: &DomainView<'_>,
    row: &Row,
    column: &str,
    bound: f64,
) -> Result<Option<f64>, FieldError> {
    view.optional_value(row, column)
        .map_or(Ok(None), |raw| parse_coordinate(column, raw, bound))
}

#[cfg(test)]
mod tests {
    use baac_accident_models::{Collision, Intersection, Light, LocationRegime};
    use baac_source_models::AccidentId;
    use chrono::NaiveDate;

    use super::*;

    const SCENARIO: &[(&str, &str)] = &[
        ("Num_Acc", "1"),
        ("an", "2020"),
        ("mois", "3"),
        ("jour", "4"),
        ("hrmn", "930"),
        ("lum", "1"),
        ("int", "0"),
        ("atm", ""),
        ("col", "-1"),
        ("agg", "1"),
        ("lat", "48,85"),
        ("long", "2,35"),
        ("adr", "Rue X"),
        ("dep", "75"),
        ("com", "101"),
    ];

    fn decode(pairs: &[(&str, &str)], year: u16) -> Result<Characteristic, FieldError> {
        let registry = DomainRegistry::builtin().unwrap();
        CharacteristicsDecoder::new(&registry).decode(&Row::from_pairs(pairs), SurveyYear(year))
    }

    fn with(overrides: &[(&'static str, &'static str)]) -> Vec<(&'static str, &'static str)> {
        SCENARIO
            .iter()
            .map(|(column, value)| {
                overrides
                    .iter()
                    .find(|(c, _)| c == column)
                    .map_or((*column, *value), |(c, v)| (*c, *v))
            })
            .collect()
    }

    #[test]
    fn decodes_reference_row() {
        let characteristic = decode(SCENARIO, 2020).unwrap();

        assert_eq!(characteristic.accident_id, AccidentId(1));
        assert_eq!(
            characteristic.timestamp,
            NaiveDate::from_ymd_opt(2020, 3, 4)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap()
        );
        assert_eq!(characteristic.light, Some(Light::Daylight));
        assert_eq!(characteristic.intersection, None);
        assert_eq!(characteristic.atmospheric_conditions, None);
        assert_eq!(characteristic.collision, None);
        assert_eq!(characteristic.location, Some(LocationRegime::InBuiltUpAreas));
        assert_eq!(characteristic.latitude, Some(48.85));
        assert_eq!(characteristic.longitude, Some(2.35));
        assert_eq!(characteristic.address.as_deref(), Some("Rue X"));
        assert_eq!(characteristic.department, "75");
        assert_eq!(characteristic.commune, "101");
    }

    #[test]
    fn legacy_row_without_coordinates() {
        let pairs: Vec<_> = with(&[("an", "12"), ("hrmn", "1745"), ("col", "3"), ("int", "6")])
            .into_iter()
            .filter(|(column, _)| !matches!(*column, "lat" | "long" | "adr"))
            .collect();
        let characteristic = decode(&pairs, 2012).unwrap();

        assert_eq!(characteristic.timestamp.to_string(), "2012-03-04 17:45:00");
        assert_eq!(characteristic.latitude, None);
        assert_eq!(characteristic.longitude, None);
        assert_eq!(characteristic.address, None);

        let blank = decode(&with(&[("adr", "  ")]), 2020).unwrap();
        assert_eq!(blank.address, None);
        assert_eq!(characteristic.collision, Some(Collision::TwoVehiclesFromTheSide));
        assert_eq!(characteristic.intersection, Some(Intersection::Roundabout));
    }

    #[test]
    fn dash_and_projected_coordinates_are_absent() {
        let characteristic = decode(&with(&[("lat", "-"), ("long", "5051500")]), 2020).unwrap();
        assert_eq!(characteristic.latitude, None);
        assert_eq!(characteristic.longitude, None);
    }

    #[test]
    fn long_time_field_fails() {
        let err = decode(&with(&[("hrmn", "12:345")]), 2020).unwrap_err();
        assert!(matches!(err, FieldError::MalformedTimeField { .. }));
    }

    #[test]
    fn unknown_light_code_fails() {
        let err = decode(&with(&[("lum", "9")]), 2020).unwrap_err();
        assert!(matches!(
            err,
            FieldError::InvalidCategoryCode { ref field, ref value } if field == "lum" && value == "9"
        ));
    }
}
