//! Safety equipment decoding.
//!
//! Files up to 2018 pack the equipment into a single `secu` column, one
//! digit per item. Later files spread it over `secu1`, `secu2` and `secu3`,
//! one code each. Both decode into a set, so duplicates collapse and order
//! carries no meaning.

use std::collections::BTreeSet;

use baac_accident_models::SafetyEquipment;

use crate::FieldError;
use crate::registry::{DomainView, canonical_code};
use crate::row::Row;

/// Code that stands for two items at once.
const AIRBAG_AND_GLOVES: &str = "7";

/// Per-item columns of files from 2019 onward.
pub const EQUIPMENT_COLUMNS: [&str; 3] = ["secu1", "secu2", "secu3"];

/// Packed column of legacy files.
pub const PACKED_COLUMN: &str = "secu";

/// Decodes a single equipment code of `column` into the items it stands for.
///
/// # Errors
///
/// Returns [`FieldError::InvalidCategoryCode`] if the code is neither a
/// sentinel nor a known item.
pub fn decode_code(
    view: &DomainView<'_>,
    column: &str,
    raw: &str,
) -> Result<BTreeSet<SafetyEquipment>, FieldError> {
    if canonical_code(raw) == AIRBAG_AND_GLOVES {
        return Ok(BTreeSet::from([
            SafetyEquipment::Airbag,
            SafetyEquipment::Gloves,
        ]));
    }
    Ok(view
        .decode::<SafetyEquipment>(column, raw)?
        .into_iter()
        .collect())
}

/// Decodes a packed `secu` value digit by digit.
///
/// # Errors
///
/// Returns [`FieldError::InvalidCategoryCode`] carrying the whole value if
/// any digit is not a known item.
pub fn decode_packed(
    view: &DomainView<'_>,
    raw: &str,
) -> Result<BTreeSet<SafetyEquipment>, FieldError> {
    let Some(packed) = view.present(PACKED_COLUMN, raw) else {
        return Ok(BTreeSet::new());
    };

    let invalid = || FieldError::InvalidCategoryCode {
        field: PACKED_COLUMN.to_owned(),
        value: packed.to_owned(),
    };

    let mut items = BTreeSet::new();
    let mut digit = [0u8; 4];
    for c in packed.chars() {
        let code = c.encode_utf8(&mut digit);
        items.extend(decode_code(view, PACKED_COLUMN, code).map_err(|_| invalid())?);
    }
    Ok(items)
}

/// Decodes the equipment of a person row, whichever layout the file uses.
///
/// # Errors
///
/// Returns [`FieldError::MissingColumn`] if the row has neither layout, or
/// [`FieldError::InvalidCategoryCode`] for an unknown code.
pub fn decode_row(
    view: &DomainView<'_>,
    row: &Row,
) -> Result<BTreeSet<SafetyEquipment>, FieldError> {
    if row.has(PACKED_COLUMN) {
        return decode_packed(view, row.get(PACKED_COLUMN)?);
    }

    let mut items = BTreeSet::new();
    for column in EQUIPMENT_COLUMNS {
        items.extend(decode_code(view, column, row.get(column)?)?);
    }
    Ok(items)
}
