//! A single CSV row, addressed by column name.

use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

use encoding_rs::WINDOWS_1252;

use crate::FieldError;

/// One data row of a survey file. Values are trimmed on construction.
#[derive(Debug, Clone)]
pub struct Row {
    headers: Rc<[String]>,
    values: Vec<String>,
}

impl Row {
    /// Creates a row from shared headers and its raw values.
    #[must_use]
    pub fn new(headers: Rc<[String]>, values: Vec<String>) -> Self {
        let values = values
            .into_iter()
            .map(|value| {
                let trimmed = value.trim();
                if trimmed.len() == value.len() {
                    value
                } else {
                    trimmed.to_owned()
                }
            })
            .collect();
        Self { headers, values }
    }

    /// Creates a row from `(column, value)` pairs.
    #[must_use]
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        let headers: Rc<[String]> = pairs.iter().map(|(k, _)| (*k).to_owned()).collect();
        let values = pairs.iter().map(|(_, v)| (*v).to_owned()).collect();
        Self::new(headers, values)
    }

    /// Returns the value of `column`. Columns beyond the end of a short
    /// record read as empty.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::MissingColumn`] if the file has no such column.
    pub fn get(&self, column: &str) -> Result<&str, FieldError> {
        self.get_opt(column)
            .ok_or_else(|| FieldError::MissingColumn {
                column: column.to_owned(),
            })
    }

    /// Returns the value of `column`, or `None` if the file has no such
    /// column.
    #[must_use]
    pub fn get_opt(&self, column: &str) -> Option<&str> {
        let index = self.headers.iter().position(|h| h == column)?;
        Some(self.values.get(index).map_or("", String::as_str))
    }

    /// Whether the file this row comes from has `column`.
    #[must_use]
    pub fn has(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, header) in self.headers.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            let value = self.values.get(i).map_or("", String::as_str);
            write!(f, "{header}={value:?}")?;
        }
        Ok(())
    }
}

/// Decodes a raw field as UTF-8, falling back to Windows-1252 for legacy
/// byte sequences.
#[must_use]
pub fn decode_field(bytes: &[u8]) -> Cow<'_, str> {
    std::str::from_utf8(bytes).map_or_else(
        |_| WINDOWS_1252.decode_without_bom_handling(bytes).0,
        Cow::Borrowed,
    )
}

/// Normalizes a header name: strips byte-order marks (including one
/// mis-decoded as Windows-1252), quotes and whitespace.
#[must_use]
pub fn clean_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}')
        .trim_start_matches("\u{ef}\u{bb}\u{bf}")
        .trim()
        .trim_matches('"')
        .trim()
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_values_and_reads_by_column() {
        let row = Row::from_pairs(&[("Num_Acc", " 42 "), ("catr", "3")]);
        assert_eq!(row.get("Num_Acc").unwrap(), "42");
        assert_eq!(row.get("catr").unwrap(), "3");
        assert!(row.has("catr"));
        assert!(!row.has("motor"));
    }

    #[test]
    fn missing_column_is_an_error() {
        let row = Row::from_pairs(&[("Num_Acc", "1")]);
        assert!(matches!(
            row.get("lum"),
            Err(FieldError::MissingColumn { column }) if column == "lum"
        ));
        assert_eq!(row.get_opt("lum"), None);
    }

    #[test]
    fn short_record_reads_as_empty() {
        let headers: Rc<[String]> = vec!["a".to_owned(), "b".to_owned()].into();
        let row = Row::new(headers, vec!["1".to_owned()]);
        assert_eq!(row.get("b").unwrap(), "");
    }

    #[test]
    fn displays_as_column_value_pairs() {
        let row = Row::from_pairs(&[("Num_Acc", "1"), ("adr", "Rue X")]);
        assert_eq!(row.to_string(), "Num_Acc=\"1\", adr=\"Rue X\"");
    }

    #[test]
    fn decodes_legacy_bytes() {
        assert_eq!(decode_field(b"caf\xe9"), "café");
        assert_eq!(decode_field("café".as_bytes()), "café");
    }

    #[test]
    fn cleans_headers() {
        assert_eq!(clean_header("\u{feff}Num_Acc"), "Num_Acc");
        assert_eq!(clean_header("\u{ef}\u{bb}\u{bf}\"Num_Acc\""), "Num_Acc");
        assert_eq!(clean_header(" lum "), "lum");
    }
}
