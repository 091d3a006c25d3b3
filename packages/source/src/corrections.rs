//! Known defects in the published survey files.
//!
//! Each entry replaces one value of one row, and only while the row still
//! holds the defective value, so a corrected upstream file passes through
//! untouched.

use baac_source_models::{AccidentId, Family};

/// A single defective value in a published file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowCorrection {
    pub family: Family,
    pub accident_id: AccidentId,
    pub column: &'static str,
    /// Value found in the file.
    pub expected: &'static str,
    /// Value to decode instead.
    pub replacement: &'static str,
}

/// Defects corrected before decoding.
pub const KNOWN_ROW_DEFECTS: &[RowCorrection] = &[
    // Road category left empty in the 2005 locations file.
    RowCorrection {
        family: Family::Locations,
        accident_id: AccidentId(2005_0006_8514),
        column: "catr",
        expected: "",
        replacement: "9",
    },
];

/// Returns the value to decode for `column` of the row of `accident_id`:
/// the replacement when a known defect matches, `value` otherwise.
#[must_use]
pub fn corrected<'a>(
    family: Family,
    accident_id: AccidentId,
    column: &str,
    value: &'a str,
) -> &'a str {
    KNOWN_ROW_DEFECTS
        .iter()
        .find(|c| {
            c.family == family
                && c.accident_id == accident_id
                && c.column == column
                && c.expected == value.trim()
        })
        .map_or(value, |c| {
            log::debug!(
                "Correcting {family} {column} of accident {accident_id}: {:?} -> {:?}",
                c.expected,
                c.replacement
            );
            c.replacement
        })
}
