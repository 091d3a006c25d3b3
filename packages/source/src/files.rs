//! Survey file discovery and schema-version inference.
//!
//! Survey files are named `<prefix>-<year>.csv`, with `_` or no separator
//! in some years.
//! The year drives everything that varies between schema versions: the
//! field delimiter, the registry rules and the available columns.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead as _, BufReader};
use std::path::{Path, PathBuf};

use baac_source_models::{Family, SurveyYear};

use crate::SourceError;

/// Whether `path` is a file of `family`: its name starts with the family
/// prefix, followed by nothing but an optional separator and digits.
///
/// `vehicules-immatricules-baac-2019.csv` is therefore not a vehicle file.
#[must_use]
pub fn matches_family(path: &Path, family: Family) -> bool {
    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        return false;
    };
    let Some(rest) = stem.strip_prefix(family.prefix()) else {
        return false;
    };
    let rest = rest
        .strip_prefix('-')
        .or_else(|| rest.strip_prefix('_'))
        .unwrap_or(rest);
    rest.chars().all(|c| c.is_ascii_digit())
}

/// Returns the files of `family` among `paths`, ordered by survey year.
/// Files whose year cannot be inferred sort first so that decoding fails
/// on them early.
#[must_use]
pub fn matching_files(paths: &[PathBuf], family: Family) -> Vec<PathBuf> {
    let mut matching: Vec<PathBuf> = paths
        .iter()
        .filter(|path| matches_family(path, family))
        .cloned()
        .collect();
    matching.sort_by_key(|path| (infer_year(path).ok(), path.clone()));
    matching
}

/// Scans `dir` (non-recursively) and groups its survey files by family.
///
/// # Errors
///
/// Returns [`SourceError::Io`] if the directory cannot be read.
pub fn discover_family_files(dir: &Path) -> Result<BTreeMap<Family, Vec<PathBuf>>, SourceError> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        {
            paths.push(path);
        }
    }

    let files: BTreeMap<Family, Vec<PathBuf>> = Family::ALL
        .iter()
        .map(|family| (*family, matching_files(&paths, *family)))
        .collect();

    for (family, matched) in &files {
        log::debug!("Found {} {family} file(s) in {}", matched.len(), dir.display());
    }

    Ok(files)
}

/// Infers the survey year from the run of digits ending the file stem, so
/// `lieux-2012.csv`, `lieux_2012.csv` and `lieux2012.csv` all give 2012.
///
/// # Errors
///
/// Returns [`SourceError::SchemaInference`] if that run is not a four-digit
/// year.
pub fn infer_year(path: &Path) -> Result<SurveyYear, SourceError> {
    let inference_error = || SourceError::SchemaInference {
        path: path.to_path_buf(),
    };
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(inference_error)?;
    let suffix = &stem[stem.trim_end_matches(|c: char| c.is_ascii_digit()).len()..];
    if suffix.len() != 4 {
        return Err(inference_error());
    }
    suffix.parse().map(SurveyYear).map_err(|_| inference_error())
}

/// Field delimiter of a survey file.
///
/// Files from 2019 onward use `;`. The 2009 characteristics file is the
/// only tab-separated one; every other legacy file uses `,`.
#[must_use]
pub fn delimiter(family: Family, year: SurveyYear) -> u8 {
    if year.value() >= 2019 {
        b';'
    } else if family == Family::Characteristics && year.value() == 2009 {
        b'\t'
    } else {
        b','
    }
}

/// Counts the data rows (lines after the header) of `paths`, for progress
/// totals.
///
/// # Errors
///
/// Returns [`SourceError::Io`] if a file cannot be read.
pub fn count_rows(paths: &[PathBuf]) -> Result<u64, SourceError> {
    let mut total = 0u64;
    for path in paths {
        let mut reader = BufReader::new(File::open(path)?);
        let mut line = Vec::new();
        let mut lines = 0u64;
        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                break;
            }
            if !line.iter().all(u8::is_ascii_whitespace) {
                lines += 1;
            }
        }
        total += lines.saturating_sub(1);
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn matches_numeric_suffixes_only() {
        let vehicles = Path::new("vehicules-2019.csv");
        assert!(matches_family(vehicles, Family::Vehicles));
        assert!(matches_family(Path::new("caracteristiques_2009.csv"), Family::Characteristics));
        assert!(matches_family(Path::new("lieux2012.csv"), Family::Locations));
        assert!(!matches_family(
            Path::new("vehicules-immatricules-baac-2019.csv"),
            Family::Vehicles
        ));
        assert!(!matches_family(vehicles, Family::Persons));
    }

    #[test]
    fn infers_year_from_file_name() {
        assert_eq!(
            infer_year(Path::new("/data/usagers-2021.csv")).unwrap(),
            SurveyYear(2021)
        );
        assert_eq!(
            infer_year(Path::new("caracteristiques_2009.csv")).unwrap(),
            SurveyYear(2009)
        );
        assert_eq!(infer_year(Path::new("lieux2012.csv")).unwrap(), SurveyYear(2012));
        assert!(matches!(
            infer_year(Path::new("usagers.csv")),
            Err(SourceError::SchemaInference { .. })
        ));
        assert!(infer_year(Path::new("usagers-21.csv")).is_err());
        assert!(infer_year(Path::new("usagers-20192020.csv")).is_err());
    }

    #[test]
    fn every_matching_name_has_a_year() {
        for name in ["lieux2012.csv", "lieux-2012.csv", "lieux_2012.csv"] {
            let path = Path::new(name);
            assert!(matches_family(path, Family::Locations), "{name} not matched");
            assert_eq!(infer_year(path).unwrap(), SurveyYear(2012), "{name}");
        }
    }

    #[test]
    fn picks_delimiter_by_year_and_family() {
        assert_eq!(delimiter(Family::Persons, SurveyYear(2019)), b';');
        assert_eq!(delimiter(Family::Characteristics, SurveyYear(2009)), b'\t');
        assert_eq!(delimiter(Family::Locations, SurveyYear(2009)), b',');
        assert_eq!(delimiter(Family::Vehicles, SurveyYear(2018)), b',');
    }

    #[test]
    fn orders_matching_files_by_year() {
        let paths = vec![
            PathBuf::from("usagers-2020.csv"),
            PathBuf::from("lieux-2005.csv"),
            PathBuf::from("usagers_2007.csv"),
        ];
        assert_eq!(
            matching_files(&paths, Family::Persons),
            vec![PathBuf::from("usagers_2007.csv"), PathBuf::from("usagers-2020.csv")]
        );
    }

    #[test]
    fn discovers_files_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "lieux-2020.csv", "");
        touch(dir.path(), "lieux-2019.csv", "");
        touch(dir.path(), "vehicules-immatricules-baac-2020.csv", "");
        touch(dir.path(), "notes.txt", "");

        let files = discover_family_files(dir.path()).unwrap();
        let locations: Vec<_> = files[&Family::Locations]
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(locations, ["lieux-2019.csv", "lieux-2020.csv"]);
        assert!(files[&Family::Vehicles].is_empty());
        assert_eq!(files.len(), Family::ALL.len());
    }

    #[test]
    fn counts_data_rows() {
        let dir = tempfile::tempdir().unwrap();
        let a = touch(dir.path(), "a.csv", "h1;h2\n1;2\n3;4\n");
        let b = touch(dir.path(), "b.csv", "h1;h2\r\n5;6\r\n\r\n");
        let empty = touch(dir.path(), "c.csv", "");
        assert_eq!(count_rows(&[a, b, empty]).unwrap(), 3);
    }
}
