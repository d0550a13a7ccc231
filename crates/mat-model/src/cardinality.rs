//! Value-count consistency between a dependent quantity and its field variables.

use crate::error::{MaterialError, Result};
use crate::quantity::{IndependentParameter, Quantity};

/// Checks that `dependent` fits the shape implied by `independent`.
///
/// - no values at all is an error;
/// - N > 1 values need at least one independent parameter, and every
///   parameter series holds exactly N values;
/// - a single value requires every parameter series to hold one value.
pub fn validate(
    dependent_name: &str,
    dependent: &Quantity,
    independent: &[IndependentParameter],
) -> Result<()> {
    if dependent.is_empty() {
        return Err(MaterialError::EmptyValue {
            name: dependent_name.to_string(),
        });
    }

    let n = dependent.len();
    if n > 1 && independent.is_empty() {
        return Err(MaterialError::MissingIndependentParameters {
            dependent: dependent_name.to_string(),
            count: n,
        });
    }

    for param in independent {
        let len = param.values.len();
        if len == 0 {
            return Err(MaterialError::EmptyValue {
                name: param.name.clone(),
            });
        }
        let consistent = if n > 1 { len == n } else { len == 1 };
        if !consistent {
            return Err(MaterialError::CardinalityMismatch {
                dependent: dependent_name.to_string(),
                dependent_len: n,
                independent: param.name.clone(),
                independent_len: len,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temperature(values: Vec<f64>) -> IndependentParameter {
        IndependentParameter::temperature(values, "C")
    }

    #[test]
    fn scalar_without_parameters_is_valid() {
        assert!(validate("Density", &Quantity::scalar(7850.0, "kg*m^-3"), &[]).is_ok());
    }

    #[test]
    fn empty_dependent_fails() {
        let err = validate("Density", &Quantity::new(vec![], ""), &[]).unwrap_err();
        assert!(matches!(err, MaterialError::EmptyValue { .. }));
    }

    #[test]
    fn table_requires_parameters() {
        let q = Quantity::new(vec![1.0, 2.0], "Pa");
        let err = validate("Young's Modulus", &q, &[]).unwrap_err();
        assert!(matches!(err, MaterialError::MissingIndependentParameters { count: 2, .. }));
    }

    #[test]
    fn table_lengths_must_agree() {
        let q = Quantity::new(vec![1.0, 2.0, 3.0], "Pa");
        assert!(validate("E", &q, &[temperature(vec![10.0, 20.0, 30.0])]).is_ok());

        let err = validate("E", &q, &[temperature(vec![10.0])]).unwrap_err();
        assert!(matches!(
            err,
            MaterialError::CardinalityMismatch { dependent_len: 3, independent_len: 1, .. }
        ));

        let err = validate("E", &q, &[temperature(vec![10.0, 20.0])]).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("'E' has 3 values"), "{msg}");
        assert!(msg.contains("'Temperature' has 2"), "{msg}");
    }

    #[test]
    fn single_value_rejects_table_parameters() {
        let q = Quantity::scalar(1.0, "Pa");
        assert!(validate("E", &q, &[temperature(vec![22.0])]).is_ok());
        assert!(validate("E", &q, &[temperature(vec![22.0, 40.0])]).is_err());
    }
}
