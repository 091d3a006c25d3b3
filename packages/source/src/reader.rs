//! Streaming reader shared by the four file families.
//!
//! A [`FamilyReader`] walks the files of one family in order, infers each
//! file's survey year and delimiter from its name, and hands every row to a
//! [`RowDecoder`]. The first failure ends the stream.

use std::fs::File;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;

use baac_source_models::{Family, SurveyYear};
use csv::ByteRecord;

use crate::files::{delimiter, infer_year};
use crate::progress::ProgressCallback;
use crate::row::{Row, clean_header, decode_field};
use crate::{FieldError, SourceError};

/// Turns one row of a family's files into a typed record.
pub trait RowDecoder {
    /// Record produced per row.
    type Record;

    /// Family of files this decoder reads.
    const FAMILY: Family;

    /// Decodes `row`, interpreting it with the schema of `year`.
    ///
    /// # Errors
    ///
    /// Returns a [`FieldError`] for the first field that cannot be decoded.
    fn decode(&self, row: &Row, year: SurveyYear) -> Result<Self::Record, FieldError>;
}

struct OpenFile {
    path: PathBuf,
    year: SurveyYear,
    headers: Rc<[String]>,
    reader: csv::Reader<File>,
    rows: u64,
}

impl OpenFile {
    fn open(path: PathBuf, family: Family) -> Result<Self, SourceError> {
        let year = infer_year(&path)?;
        let delimiter = delimiter(family, year);
        log::debug!(
            "Reading {} as {family} {year} (delimiter {:?})",
            path.display(),
            char::from(delimiter)
        );

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .quote(b'"')
            .flexible(true)
            .from_path(&path)
            .map_err(|source| SourceError::Csv {
                path: path.clone(),
                source,
            })?;

        let headers: Rc<[String]> = reader
            .byte_headers()
            .map_err(|source| SourceError::Csv {
                path: path.clone(),
                source,
            })?
            .iter()
            .map(|raw| clean_header(&decode_field(raw)))
            .collect();

        Ok(Self {
            path,
            year,
            headers,
            reader,
            rows: 0,
        })
    }
}

/// Iterator over the decoded records of a family's files.
pub struct FamilyReader<'d, D: RowDecoder> {
    decoder: &'d D,
    paths: std::vec::IntoIter<PathBuf>,
    current: Option<OpenFile>,
    record: ByteRecord,
    progress: Arc<dyn ProgressCallback>,
    failed: bool,
}

impl<'d, D: RowDecoder> FamilyReader<'d, D> {
    /// Creates a reader over `paths`, in the given order.
    #[must_use]
    pub fn new(decoder: &'d D, paths: Vec<PathBuf>, progress: Arc<dyn ProgressCallback>) -> Self {
        Self {
            decoder,
            paths: paths.into_iter(),
            current: None,
            record: ByteRecord::new(),
            progress,
            failed: false,
        }
    }

    fn fail(&mut self, error: SourceError) -> Option<Result<D::Record, SourceError>> {
        self.failed = true;
        self.current = None;
        Some(Err(error))
    }
}

impl<D: RowDecoder> Iterator for FamilyReader<'_, D> {
    type Item = Result<D::Record, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.failed {
                return None;
            }

            if self.current.is_none() {
                let path = self.paths.next()?;
                self.progress
                    .set_message(format!("{} {}", D::FAMILY, path.display()));
                match OpenFile::open(path, D::FAMILY) {
                    Ok(file) => self.current = Some(file),
                    Err(e) => return self.fail(e),
                }
            }
            let Some(file) = self.current.as_mut() else {
                continue;
            };

            match file.reader.read_byte_record(&mut self.record) {
                Ok(false) => {
                    log::info!(
                        "Decoded {} {} rows from {}",
                        file.rows,
                        D::FAMILY,
                        file.path.display()
                    );
                    self.current = None;
                }
                Ok(true) => {
                    file.rows += 1;
                    self.progress.inc(1);

                    let values = self
                        .record
                        .iter()
                        .map(|raw| decode_field(raw).into_owned())
                        .collect();
                    let row = Row::new(Rc::clone(&file.headers), values);

                    return match self.decoder.decode(&row, file.year) {
                        Ok(record) => Some(Ok(record)),
                        Err(source) => {
                            let error = SourceError::Row {
                                path: file.path.clone(),
                                line: self.record.position().map_or(0, csv::Position::line),
                                row: row.to_string(),
                                source,
                            };
                            self.fail(error)
                        }
                    };
                }
                Err(source) => {
                    let error = SourceError::Csv {
                        path: file.path.clone(),
                        source,
                    };
                    return self.fail(error);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use crate::parsing::parse_number;
    use crate::progress::null_progress;

    use super::*;

    struct Pair;

    impl RowDecoder for Pair {
        type Record = (u32, String);
        const FAMILY: Family = Family::Characteristics;

        fn decode(&self, row: &Row, year: SurveyYear) -> Result<Self::Record, FieldError> {
            let n = parse_number("n", row.get("n")?)?;
            Ok((n, format!("{}@{year}", row.get("label")?)))
        }
    }

    fn write(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn read_all(paths: Vec<PathBuf>) -> Vec<Result<(u32, String), SourceError>> {
        FamilyReader::new(&Pair, paths, null_progress()).collect()
    }

    #[test]
    fn reads_each_schema_version_with_its_delimiter() {
        let dir = tempfile::tempdir().unwrap();
        let paths = vec![
            write(dir.path(), "caracteristiques_2009.csv", b"n\tlabel\n1\ta\n"),
            write(dir.path(), "caracteristiques-2010.csv", b"\"n\",\"label\"\n2,\"b, c\"\n"),
            write(dir.path(), "caracteristiques-2021.csv", b"\xef\xbb\xbf\"n\";\"label\"\n\" 3\";\"d\"\n"),
        ];

        let records: Vec<_> = read_all(paths).into_iter().map(Result::unwrap).collect();
        assert_eq!(
            records,
            vec![
                (1, "a@2009".to_string()),
                (2, "b, c@2010".to_string()),
                (3, "d@2021".to_string()),
            ]
        );
    }

    #[test]
    fn decodes_legacy_encoding() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "caracteristiques-2012.csv", b"n,label\n1,All\xe9e\n");
        let records = read_all(vec![path]);
        assert_eq!(records[0].as_ref().unwrap().1, "Allée@2012");
    }

    #[test]
    fn row_failure_carries_file_and_row_then_stops() {
        let dir = tempfile::tempdir().unwrap();
        let bad = write(dir.path(), "caracteristiques-2020.csv", b"n;label\n1;a\nx;b\n2;c\n");
        let never = write(dir.path(), "caracteristiques-2021.csv", b"n;label\n3;d\n");

        let results = read_all(vec![bad.clone(), never]);
        assert_eq!(results.len(), 2, "stream must stop at the first failure");
        assert!(results[0].is_ok());
        match &results[1] {
            Err(SourceError::Row {
                path,
                line,
                row,
                source,
            }) => {
                assert_eq!(path, &bad);
                assert_eq!(*line, 3);
                assert!(row.contains("n=\"x\""), "row was {row}");
                assert!(matches!(source, FieldError::InvalidNumber { .. }));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn unnamed_year_is_a_schema_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "caracteristiques.csv", b"n;label\n1;a\n");
        let results = read_all(vec![path]);
        assert!(matches!(
            results.as_slice(),
            [Err(SourceError::SchemaInference { .. })]
        ));
    }

    #[test]
    fn missing_column_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "caracteristiques-2020.csv", b"n\n1\n");
        let results = read_all(vec![path]);
        assert!(matches!(
            results.as_slice(),
            [Err(SourceError::Row {
                source: FieldError::MissingColumn { .. },
                ..
            })]
        ));
    }
}
