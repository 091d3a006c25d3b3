//! Categorical domain registry: per-field sentinel and alias rules.
//!
//! Each file family has a TOML table in `packages/source/domains/`, baked
//! into the binary at compile time via [`include_str!`]. A table is a list
//! of rules keyed by column, optionally bounded to a range of survey years:
//!
//! ```toml
//! [[rule]]
//! column = "catv"
//! sentinels = ["0", "-1"]
//! aliases = { "19" = "40" }
//! ```
//!
//! Decoding a raw value canonicalizes it, applies the alias table, maps
//! sentinels to `None`, and looks the remaining code up in the field's
//! closed domain. Anything else is an [`FieldError::InvalidCategoryCode`].
//! Columns without a rule have no sentinels and no aliases.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

use baac_accident_models::CodedCategory;
use baac_source_models::{Family, SurveyYear};
use serde::Deserialize;

use crate::row::Row;
use crate::{FieldError, SourceError};

/// Domain tables embedded at compile time.
const DOMAIN_TABLES: &[(Family, &str)] = &[
    (
        Family::Characteristics,
        include_str!("../domains/characteristics.toml"),
    ),
    (Family::Locations, include_str!("../domains/locations.toml")),
    (Family::Vehicles, include_str!("../domains/vehicles.toml")),
    (Family::Persons, include_str!("../domains/persons.toml")),
];

#[derive(Debug, Deserialize)]
struct DomainTable {
    #[serde(default, rename = "rule")]
    rules: Vec<FieldRule>,
}

/// Sentinel and alias rule for one column over a range of survey years.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldRule {
    /// Column the rule applies to.
    pub column: String,
    /// First survey year the rule applies to (inclusive, unbounded if unset).
    #[serde(default)]
    pub since: Option<u16>,
    /// Last survey year the rule applies to (inclusive, unbounded if unset).
    #[serde(default)]
    pub until: Option<u16>,
    /// Raw values meaning "not recorded".
    #[serde(default)]
    pub sentinels: BTreeSet<String>,
    /// Raw values rewritten to another code before lookup.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

impl FieldRule {
    fn first_year(&self) -> u16 {
        self.since.unwrap_or(u16::MIN)
    }

    fn last_year(&self) -> u16 {
        self.until.unwrap_or(u16::MAX)
    }

    /// Whether this rule covers `year`.
    #[must_use]
    pub fn applies_to(&self, year: SurveyYear) -> bool {
        (self.first_year()..=self.last_year()).contains(&year.value())
    }

    fn overlaps(&self, other: &Self) -> bool {
        self.first_year() <= other.last_year() && other.first_year() <= self.last_year()
    }

    fn canonicalized(self) -> Self {
        Self {
            sentinels: self
                .sentinels
                .iter()
                .map(|s| canonical_code(s).into_owned())
                .collect(),
            aliases: self
                .aliases
                .iter()
                .map(|(from, to)| {
                    (
                        canonical_code(from).into_owned(),
                        canonical_code(to).into_owned(),
                    )
                })
                .collect(),
            ..self
        }
    }

    fn resolve<'a>(&self, raw: &'a str) -> Cow<'a, str> {
        let code = canonical_code(raw);
        match self.aliases.get(&*code) {
            Some(alias) => Cow::Owned(alias.clone()),
            None => code,
        }
    }
}

/// Returns the comparison form of a raw code: trimmed, and for integers the
/// plain decimal rendering (`"07"` becomes `"7"`).
#[must_use]
pub fn canonical_code(raw: &str) -> Cow<'_, str> {
    let trimmed = raw.trim();
    match trimmed.parse::<i64>() {
        Ok(n) => {
            let rendered = n.to_string();
            if rendered == trimmed {
                Cow::Borrowed(trimmed)
            } else {
                Cow::Owned(rendered)
            }
        }
        Err(_) => Cow::Borrowed(trimmed),
    }
}

/// All sentinel and alias rules, indexed by family and column.
#[derive(Debug, Clone, Default)]
pub struct DomainRegistry {
    rules: BTreeMap<Family, BTreeMap<String, Vec<FieldRule>>>,
}

impl DomainRegistry {
    /// Loads the domain tables embedded in the binary.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Registry`] if a table is malformed.
    pub fn builtin() -> Result<Self, SourceError> {
        Self::from_tables(DOMAIN_TABLES)
    }

    /// Builds a registry from `(family, toml)` tables.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Registry`] if a table does not parse, a rule
    /// has an empty year range, or two rules for the same column cover the
    /// same year.
    pub fn from_tables(tables: &[(Family, &str)]) -> Result<Self, SourceError> {
        let mut rules: BTreeMap<Family, BTreeMap<String, Vec<FieldRule>>> = BTreeMap::new();

        for (family, source) in tables {
            let table: DomainTable =
                toml::de::from_str(source).map_err(|e| SourceError::Registry {
                    name: family.to_string(),
                    message: e.to_string(),
                })?;

            for rule in table.rules {
                if rule.first_year() > rule.last_year() {
                    return Err(SourceError::Registry {
                        name: family.to_string(),
                        message: format!("rule for {} has an empty year range", rule.column),
                    });
                }

                let existing = rules
                    .entry(*family)
                    .or_default()
                    .entry(rule.column.clone())
                    .or_default();
                if existing.iter().any(|other| other.overlaps(&rule)) {
                    return Err(SourceError::Registry {
                        name: family.to_string(),
                        message: format!("overlapping rules for {}", rule.column),
                    });
                }
                existing.push(rule.canonicalized());
            }
        }

        log::debug!(
            "Loaded {} domain rules",
            rules
                .values()
                .flat_map(BTreeMap::values)
                .map(Vec::len)
                .sum::<usize>()
        );

        Ok(Self { rules })
    }

    /// Returns the rule for `column` of `family` in effect for `year`.
    #[must_use]
    pub fn rule(&self, family: Family, column: &str, year: SurveyYear) -> Option<&FieldRule> {
        self.rules
            .get(&family)?
            .get(column)?
            .iter()
            .find(|rule| rule.applies_to(year))
    }

    /// Decodes a raw coded value into its category, or `None` for a
    /// sentinel.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::InvalidCategoryCode`] if the value is neither a
    /// sentinel nor a code of `T`.
    pub fn decode<T: CodedCategory>(
        &self,
        family: Family,
        column: &str,
        raw: &str,
        year: SurveyYear,
    ) -> Result<Option<T>, FieldError> {
        self.view(family, year).decode(column, raw)
    }

    /// Binds the registry to one family and survey year.
    #[must_use]
    pub const fn view(&self, family: Family, year: SurveyYear) -> DomainView<'_> {
        DomainView {
            registry: self,
            family,
            year,
        }
    }
}

/// The registry rules of one family for one survey year.
#[derive(Debug, Clone, Copy)]
pub struct DomainView<'r> {
    registry: &'r DomainRegistry,
    family: Family,
    year: SurveyYear,
}

impl DomainView<'_> {
    /// Survey year this view decodes for.
    #[must_use]
    pub const fn year(&self) -> SurveyYear {
        self.year
    }

    fn rule(&self, column: &str) -> Option<&FieldRule> {
        self.registry.rule(self.family, column, self.year)
    }

    /// See [`DomainRegistry::decode`].
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::InvalidCategoryCode`] if the value is neither a
    /// sentinel nor a code of `T`.
    pub fn decode<T: CodedCategory>(
        &self,
        column: &str,
        raw: &str,
    ) -> Result<Option<T>, FieldError> {
        let rule = self.rule(column);
        let code = rule.map_or_else(|| canonical_code(raw), |rule| rule.resolve(raw));

        if rule.is_some_and(|rule| rule.sentinels.contains(&*code)) {
            return Ok(None);
        }

        code.parse::<u8>()
            .ok()
            .and_then(T::from_code)
            .map(Some)
            .ok_or_else(|| FieldError::InvalidCategoryCode {
                field: column.to_owned(),
                value: raw.trim().to_owned(),
            })
    }

    /// Decodes a coded value that has no "not recorded" form.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::InvalidCategoryCode`] if the value is not a code
    /// of `T`, sentinels included.
    pub fn require<T: CodedCategory>(&self, column: &str, raw: &str) -> Result<T, FieldError> {
        self.decode(column, raw)?
            .ok_or_else(|| FieldError::InvalidCategoryCode {
                field: column.to_owned(),
                value: raw.trim().to_owned(),
            })
    }

    /// Returns the trimmed value unless it is a sentinel of `column`.
    #[must_use]
    pub fn present<'a>(&self, column: &str, raw: &'a str) -> Option<&'a str> {
        let trimmed = raw.trim();
        match self.rule(column) {
            Some(rule) if rule.sentinels.contains(&*rule.resolve(trimmed)) => None,
            _ => Some(trimmed),
        }
    }

    /// Decodes the coded value of `column` in `row`.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::MissingColumn`] if the row has no such column,
    /// or [`FieldError::InvalidCategoryCode`] as for [`Self::decode`].
    pub fn category<T: CodedCategory>(
        &self,
        row: &Row,
        column: &str,
    ) -> Result<Option<T>, FieldError> {
        self.decode(column, row.get(column)?)
    }

    /// Decodes the coded value of `column` in `row`, treating an absent
    /// column as not recorded.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::InvalidCategoryCode`] as for [`Self::decode`].
    pub fn optional_category<T: CodedCategory>(
        &self,
        row: &Row,
        column: &str,
    ) -> Result<Option<T>, FieldError> {
        row.get_opt(column)
            .map_or(Ok(None), |raw| self.decode(column, raw))
    }

    /// Decodes the mandatory coded value of `column` in `row`.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::MissingColumn`] if the row has no such column,
    /// or [`FieldError::InvalidCategoryCode`] as for [`Self::require`].
    pub fn required<T: CodedCategory>(&self, row: &Row, column: &str) -> Result<T, FieldError> {
        self.require(column, row.get(column)?)
    }

    /// Returns the value of `column` in `row` unless it is a sentinel.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::MissingColumn`] if the row has no such column.
    pub fn value<'a>(&self, row: &'a Row, column: &str) -> Result<Option<&'a str>, FieldError> {
        Ok(self.present(column, row.get(column)?))
    }

    /// Returns the value of `column` in `row` unless the column is absent or
    /// the value is a sentinel.
    #[must_use]
    pub fn optional_value<'a>(&self, row: &'a Row, column: &str) -> Option<&'a str> {
        row.get_opt(column)
            .and_then(|raw| self.present(column, raw))
    }
}
