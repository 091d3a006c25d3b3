//! Decoder for `usagers-YYYY.csv`.

use baac_source_models::{Family, Person, PersonRecord, SurveyYear};

use crate::FieldError;
use crate::equipment;
use crate::parsing::{parse_accident_id, parse_unsigned};
use crate::reader::RowDecoder;
use crate::registry::DomainRegistry;
use crate::row::Row;
use crate::vehicles::vehicle_id;

/// Decodes person rows.
#[derive(Debug, Clone, Copy)]
pub struct PersonsDecoder<'r> {
    registry: &'r DomainRegistry,
}

impl<'r> PersonsDecoder<'r> {
    #[must_use]
    pub const fn new(registry: &'r DomainRegistry) -> Self {
        Self { registry }
    }
}

impl RowDecoder for PersonsDecoder<'_> {
    type Record = PersonRecord;
    const FAMILY: Family = Family::Persons;

    fn decode(&self, row: &Row, year: SurveyYear) -> Result<PersonRecord, FieldError> {
        let view = self.registry.view(Self::FAMILY, year);

        Ok(PersonRecord {
            accident_id: parse_accident_id(row.get("Num_Acc")?)?,
            vehicle_id: vehicle_id(row)?,
            person: Person {
                place: view.category(row, "place")?,
                category: view.category(row, "catu")?,
                severity: view.required(row, "grav")?,
                sex: view.required(row, "sexe")?,
                birth_year: view
                    .value(row, "an_nais")?
                    .map(|raw| parse_unsigned("an_nais", raw))
                    .transpose()?,
                travel_reason: view.category(row, "trajet")?,
                safety_equipment: equipment::decode_row(&view, row)?,
                pedestrian_location: view.category(row, "locp")?,
                pedestrian_action: view.category(row, "actp")?,
                pedestrian_company: view.category(row, "etatp")?,
            },
        })
    }
}
