//! The ordered indicator names shared by every packed category string.

use serde::Serialize;

use super::DecodeMode;
use super::indicator::{Indicator, IndicatorError};
use crate::constants::{NAME_VALUE_SEPARATOR, TOKEN_SEPARATOR};
use crate::error::{PipelineError, Result};

/// Indicator column names, derived once from a single witness row and then
/// applied positionally to every other row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategorySchema {
    names: Vec<String>,
}

impl CategorySchema {
    /// Derive the names from one packed string (`name-value;name-value;...`).
    ///
    /// `row` is only used for error context.
    pub fn from_packed(packed: &str, row: usize) -> Result<Self> {
        let names = packed
            .split(TOKEN_SEPARATOR)
            .map(|token| split_token(token, row).map(|(name, _)| name.to_owned()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { names })
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Name of the first indicator, the one the validity filter looks at.
    #[must_use]
    pub fn primary(&self) -> Option<&str> {
        self.names.first().map(String::as_str)
    }

    /// Decode one packed string against this schema.
    ///
    /// Values are taken by position. In strict mode every token name must
    /// match the schema and values must lie in `{0, 1, 2}`.
    pub fn decode_row(&self, packed: &str, row: usize, mode: DecodeMode) -> Result<Vec<Indicator>> {
        let tokens = packed
            .split(TOKEN_SEPARATOR)
            .map(|token| split_token(token, row))
            .collect::<Result<Vec<_>>>()?;

        if tokens.len() != self.names.len() {
            return Err(PipelineError::TokenCountMismatch {
                row,
                expected: self.names.len(),
                found: tokens.len(),
            });
        }

        if mode == DecodeMode::Strict
            && tokens.iter().zip(&self.names).any(|((name, _), expected)| *name != expected.as_str())
        {
            return Err(PipelineError::SchemaDrift {
                row,
                expected: self.names.clone(),
                found: tokens.iter().map(|(name, _)| (*name).to_owned()).collect(),
            });
        }

        tokens
            .iter()
            .zip(&self.names)
            .map(|((_, raw), column)| {
                let parsed = match mode {
                    DecodeMode::Strict => Indicator::parse_bounded(raw),
                    DecodeMode::Lenient => Indicator::parse(raw),
                };
                parsed.map_err(|e| match e {
                    IndicatorError::NotInteger => PipelineError::InvalidValue {
                        row,
                        column: column.clone(),
                        value: (*raw).to_owned(),
                    },
                    IndicatorError::OutOfDomain(value) => {
                        PipelineError::ValueOutOfDomain { row, column: column.clone(), value }
                    },
                })
            })
            .collect()
    }
}

/// Split `name-value` at the first separator.
fn split_token(token: &str, row: usize) -> Result<(&str, &str)> {
    token
        .split_once(NAME_VALUE_SEPARATOR)
        .ok_or_else(|| PipelineError::MalformedToken { row, token: token.to_owned() })
}
