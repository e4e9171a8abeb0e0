//! Expansion of the packed `categories` column into indicator columns.

mod indicator;
mod schema;

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

pub use indicator::{Indicator, IndicatorError};
pub use schema::CategorySchema;

use crate::constants::CATEGORIES_COLUMN;
use crate::error::{PipelineError, Result};
use crate::rowset::RowSet;
use crate::value::Value;

/// How much the decoder trusts rows other than the schema witness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodeMode {
    /// Values are read by position and any integer is accepted.
    #[default]
    Lenient,
    /// Every row needs a packed string, token names must match the witness
    /// and values must lie in `{0, 1, 2}`.
    Strict,
}

#[derive(Debug, Error)]
#[error("unknown decode mode `{0}` (expected `strict` or `lenient`)")]
pub struct ParseDecodeModeError(String);

impl FromStr for DecodeMode {
    type Err = ParseDecodeModeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            _ => Err(ParseDecodeModeError(s.to_owned())),
        }
    }
}

impl fmt::Display for DecodeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Lenient => "lenient",
            Self::Strict => "strict",
        })
    }
}

/// Result of [`decode`].
#[derive(Debug, Clone)]
pub struct DecodeReport {
    /// Input columns minus `categories`, followed by one column per indicator.
    pub decoded: RowSet,
    pub schema: CategorySchema,
    /// Rows removed because their first indicator was `2`.
    pub dropped_invalid: usize,
}

/// Replace the packed `categories` column with one integer column per label
/// and drop rows whose first label is `2`.
///
/// In [`DecodeMode::Strict`] the label names come from row 0 and every row
/// must carry a packed string; a message with no category record fails with
/// [`PipelineError::MissingCategories`].
///
/// [`DecodeMode::Lenient`] relaxes that: the names come from the first row
/// that has a packed string, and rows without one keep `Null` in every
/// indicator column. Such rows are never dropped by the filter.
pub fn decode(combined: RowSet, mode: DecodeMode) -> Result<DecodeReport> {
    let cat_idx = combined.column_index(CATEGORIES_COLUMN).ok_or_else(|| {
        PipelineError::MissingColumn {
            source_name: "combined".to_owned(),
            column: CATEGORIES_COLUMN.to_owned(),
        }
    })?;

    let schema = derive_schema(&combined, cat_idx, mode)?;
    let (columns, rows) = combined.into_parts();

    let mut out_columns: Vec<String> =
        columns.into_iter().enumerate().filter(|&(i, _)| i != cat_idx).map(|(_, c)| c).collect();
    let retained = out_columns.len();
    let mut seen: HashSet<String> = out_columns.iter().cloned().collect();
    for name in schema.names() {
        if !seen.insert(name.clone()) {
            return Err(PipelineError::DuplicateColumn(name.clone()));
        }
        out_columns.push(name.clone());
    }

    let mut decoded = RowSet::new(out_columns);
    let mut dropped_invalid = 0;
    for (row_idx, mut row) in rows.into_iter().enumerate() {
        let packed = row.remove(cat_idx);
        match packed {
            Value::Text(packed) => {
                let indicators = schema.decode_row(&packed, row_idx, mode)?;
                if indicators.first().is_some_and(|first| first.is_invalid()) {
                    dropped_invalid += 1;
                    continue;
                }
                row.extend(indicators.into_iter().map(Value::from));
            },
            Value::Null if mode == DecodeMode::Strict => {
                return Err(PipelineError::MissingCategories { row: row_idx });
            },
            Value::Null => {
                tracing::debug!(row = row_idx, "no packed category string; indicators left null");
                row.resize(retained + schema.len(), Value::Null);
            },
            Value::Integer(i) => {
                return Err(PipelineError::MalformedToken { row: row_idx, token: i.to_string() });
            },
        }
        decoded.push_row(row)?;
    }

    tracing::info!(
        indicators = schema.len(),
        primary = schema.primary().unwrap_or("-"),
        rows = decoded.len(),
        dropped_invalid,
        %mode,
        "decoded categories"
    );

    Ok(DecodeReport { decoded, schema, dropped_invalid })
}

fn derive_schema(combined: &RowSet, cat_idx: usize, mode: DecodeMode) -> Result<CategorySchema> {
    let witness = match mode {
        DecodeMode::Strict => match combined.rows().first() {
            Some(row) => {
                let packed = row[cat_idx]
                    .as_text()
                    .ok_or(PipelineError::MissingCategories { row: 0 })?;
                Some((0, packed))
            },
            None => None,
        },
        DecodeMode::Lenient => combined
            .rows()
            .iter()
            .enumerate()
            .find_map(|(i, row)| row[cat_idx].as_text().map(|packed| (i, packed))),
    };
    match witness {
        Some((row, packed)) => {
            tracing::debug!(row, "deriving category names from witness row");
            CategorySchema::from_packed(packed, row)
        },
        None => {
            tracing::warn!("no row carries a packed category string; no indicators derived");
            Ok(CategorySchema::default())
        },
    }
}
