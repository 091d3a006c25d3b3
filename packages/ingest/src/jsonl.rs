//! Line-delimited JSON output.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use baac_ingest_models::Accident;

use crate::IngestError;

/// Writes one JSON object per accident, each followed by a newline.
/// Returns the number of lines written.
///
/// # Errors
///
/// Returns [`IngestError::Json`] if an accident cannot be serialized, or
/// [`IngestError::Io`] if writing fails.
pub fn write_accidents<'a, W: Write>(
    writer: &mut W,
    accidents: impl IntoIterator<Item = &'a Accident>,
) -> Result<usize, IngestError> {
    let mut count = 0;
    for accident in accidents {
        serde_json::to_writer(&mut *writer, accident)?;
        writer.write_all(b"\n")?;
        count += 1;
    }
    writer.flush()?;
    Ok(count)
}

/// Writes the accidents to `path`, replacing any previous content.
///
/// # Errors
///
/// Returns [`IngestError::Io`] if the file cannot be created or written,
/// or [`IngestError::Json`] if an accident cannot be serialized.
pub fn write_file(path: &Path, accidents: &[Accident]) -> Result<usize, IngestError> {
    log::info!("Writing {} accidents to {}", accidents.len(), path.display());
    let mut writer = BufWriter::new(File::create(path)?);
    write_accidents(&mut writer, accidents)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use baac_accident_models::{
        Light, RoadCategory, SafetyEquipment, Severity, Sex, VehicleCategory,
    };
    use baac_source_models::{
        AccidentId, Characteristic, Location, Person, PersonRecord, Vehicle, VehicleId,
        VehicleRecord,
    };
    use chrono::NaiveDate;

    use crate::reconcile::reconcile;

    use super::*;

    fn characteristic(id: u64) -> Characteristic {
        Characteristic {
            accident_id: AccidentId(id),
            timestamp: NaiveDate::from_ymd_opt(2019, 12, 31)
                .unwrap()
                .and_hms_opt(23, 5, 0)
                .unwrap(),
            latitude: Some(43.296_875),
            longitude: Some(5.369_140_625),
            address: Some("Quai du Port".to_string()),
            light: Some(Light::NightWithPublicLightingOn),
            intersection: None,
            atmospheric_conditions: None,
            collision: None,
            location: None,
            department: "13".to_string(),
            commune: "13055".to_string(),
        }
    }

    fn location(id: u64) -> Location {
        Location {
            accident_id: AccidentId(id),
            road_category: RoadCategory::MunicipalRoad,
            road: Some("QUAI DU PORT".to_string()),
            road_index_number: None,
            road_index_alpha: Some("D".to_string()),
            traffic_regime: None,
            lanes_count: Some(2),
            dedicated_lane: None,
            profile: None,
            upstream_terminal: Some(3),
            upstream_terminal_distance_meters: Some(120.5),
            curvature: None,
            central_reservation_width_meters: 0.0,
            road_traffic_width_meters: 9.5,
        }
    }

    fn stable(id: u64, name: &str) -> VehicleId {
        VehicleId {
            vehicle_id: Some(id),
            vehicle_name: name.to_string(),
        }
    }

    fn person(accident: u64, vehicle: VehicleId) -> PersonRecord {
        PersonRecord {
            accident_id: AccidentId(accident),
            vehicle_id: vehicle,
            person: Person {
                place: None,
                category: None,
                severity: Severity::Killed,
                sex: Sex::Male,
                birth_year: Some(1961),
                travel_reason: None,
                safety_equipment: BTreeSet::from([
                    SafetyEquipment::Helmet,
                    SafetyEquipment::Gloves,
                ]),
                pedestrian_location: None,
                pedestrian_action: None,
                pedestrian_company: None,
            },
        }
    }

    fn accidents() -> Vec<Accident> {
        reconcile(
            [characteristic(2), characteristic(1)],
            [location(1), location(2)],
            [VehicleRecord {
                accident_id: AccidentId(1),
                vehicle: Vehicle {
                    vehicle_category: Some(VehicleCategory::LargeMotorcycle),
                    ..Vehicle::placeholder(stable(10, "A01"))
                },
            }],
            [
                person(1, stable(10, "A01")),
                person(1, stable(11, "B01")),
            ],
        )
        .unwrap()
        .accidents
    }

    fn render(accidents: &[Accident]) -> Vec<u8> {
        let mut out = Vec::new();
        write_accidents(&mut out, accidents).unwrap();
        out
    }

    #[test]
    fn writes_one_object_per_line() {
        let out = String::from_utf8(render(&accidents())).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(out.ends_with('\n'));

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["accident_id"], 1);
        assert_eq!(first["timestamp"], "2019-12-31T23:05:00");
        assert_eq!(first["light"], "NIGHT_WITH_PUBLIC_LIGHTING_ON");
        assert!(first["collision"].is_null());
        assert_eq!(first["vehicles"][1]["vehicle_category"], "OTHER");
        assert_eq!(first["vehicles"][1]["vehicle_id"], 11);
        assert!(first["vehicles"][1]["engine"].is_null());
        assert_eq!(
            first["vehicles"][0]["persons"][0]["safety_equipment"],
            serde_json::json!(["HELMET", "GLOVES"])
        );
    }

    #[test]
    fn absent_text_is_null_in_every_text_field() {
        let mut accidents = accidents();
        let accident = &mut accidents[0];
        accident.address = None;
        accident.road = None;
        accident.road_index_alpha = None;

        let out = String::from_utf8(render(&accidents[..1])).unwrap();
        let json: serde_json::Value = serde_json::from_str(out.trim_end()).unwrap();
        for field in ["address", "road", "road_index_alpha"] {
            assert!(json[field].is_null(), "{field} was {}", json[field]);
        }
        assert!(!out.contains("\"\""), "empty string in {out}");
    }

    #[test]
    fn decoding_a_line_recovers_the_accident() {
        let accidents = accidents();
        let out = String::from_utf8(render(&accidents)).unwrap();
        let back: Vec<Accident> = out
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(back, accidents);
        assert_eq!(back[0].upstream_terminal_distance_meters, Some(120.5));
        assert_eq!(back[0].vehicles[0].persons[0].birth_year, Some(1961));
    }

    #[test]
    fn repeated_runs_are_byte_identical() {
        assert_eq!(render(&accidents()), render(&accidents()));
    }

    #[test]
    fn writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accidents.jsonl");
        let accidents = accidents();
        assert_eq!(write_file(&path, &accidents).unwrap(), 2);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }
}
