//! Qualifier expectation tables and their validator.

use std::collections::HashMap;

use crate::error::{MaterialError, Result};
use crate::quantity::ModelQualifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualifierMode {
    /// Value must equal the default.
    Strict,
    /// Value must be one of the listed values.
    Range(&'static [&'static str]),
    /// Any value; the default fills in when absent.
    Free,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualifierSpec {
    pub name: &'static str,
    pub default: &'static str,
    pub mode: QualifierMode,
}

impl QualifierSpec {
    pub const fn strict(name: &'static str, default: &'static str) -> Self {
        Self {
            name,
            default,
            mode: QualifierMode::Strict,
        }
    }

    pub const fn range(
        name: &'static str,
        default: &'static str,
        allowed: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            default,
            mode: QualifierMode::Range(allowed),
        }
    }

    pub const fn free(name: &'static str, default: &'static str) -> Self {
        Self {
            name,
            default,
            mode: QualifierMode::Free,
        }
    }

    fn check(&self, value: &str) -> Result<()> {
        match self.mode {
            QualifierMode::Strict if value != self.default => Err(MaterialError::QualifierMismatch {
                name: self.name.to_string(),
                expected: self.default.to_string(),
                actual: value.to_string(),
            }),
            QualifierMode::Range(allowed) if !allowed.iter().any(|a| *a == value) => {
                Err(MaterialError::QualifierNotAllowed {
                    name: self.name.to_string(),
                    actual: value.to_string(),
                    allowed: allowed.join(", "),
                })
            }
            _ => Ok(()),
        }
    }
}

/// Checks supplied qualifiers against `expected` and fills in missing ones.
///
/// With nothing supplied the defaults are returned in table order. Otherwise
/// the synthesized defaults come first, followed by the supplied qualifiers
/// in their original order; qualifiers the table does not know are kept.
pub fn validate_and_initialize<Q>(
    supplied: impl IntoIterator<Item = Q>,
    expected: &[QualifierSpec],
) -> Result<Vec<ModelQualifier>>
where
    Q: Into<ModelQualifier>,
{
    let supplied: Vec<ModelQualifier> = supplied.into_iter().map(Into::into).collect();
    if supplied.is_empty() {
        return Ok(expected
            .iter()
            .map(|spec| ModelQualifier::new(spec.name, spec.default))
            .collect());
    }

    let by_name: HashMap<&str, &str> = supplied
        .iter()
        .map(|q| (q.name.as_str(), q.value.as_str()))
        .collect();

    let mut result = Vec::with_capacity(expected.len() + supplied.len());
    for spec in expected {
        match by_name.get(spec.name) {
            Some(value) => spec.check(value)?,
            None => result.push(ModelQualifier::new(spec.name, spec.default)),
        }
    }
    result.extend(supplied);
    Ok(result)
}
