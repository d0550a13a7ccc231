//! Value records shared by every material model.

use serde::{Deserialize, Serialize};

/// A physical value: one or more numbers with a unit symbol.
///
/// A single value is a constant; several values form a table along the
/// owning model's independent parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub value: Vec<f64>,
    pub unit: String,
}

impl Quantity {
    pub fn new(value: Vec<f64>, unit: impl Into<String>) -> Self {
        Self {
            value,
            unit: unit.into(),
        }
    }

    pub fn scalar(value: f64, unit: impl Into<String>) -> Self {
        Self::new(vec![value], unit)
    }

    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Value at table row `row`; a constant repeats across all rows.
    pub fn at(&self, row: usize) -> Option<f64> {
        match self.value.len() {
            0 => None,
            1 => Some(self.value[0]),
            _ => self.value.get(row).copied(),
        }
    }

    pub fn min(&self) -> Option<f64> {
        self.value.iter().copied().reduce(f64::min)
    }

    pub fn max(&self) -> Option<f64> {
        self.value.iter().copied().reduce(f64::max)
    }
}

/// Name/value tag that discriminates variants of a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelQualifier {
    pub name: String,
    pub value: String,
}

impl ModelQualifier {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl<N: Into<String>, V: Into<String>> From<(N, V)> for ModelQualifier {
    fn from((name, value): (N, V)) -> Self {
        Self::new(name, value)
    }
}

/// Bound of an independent parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Bound {
    Value(f64),
    /// Resolved to the min/max of the series when written to MAPDL.
    ProgramControlled,
}

pub const PROGRAM_CONTROLLED: &str = "Program Controlled";

impl Bound {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case(PROGRAM_CONTROLLED) {
            return Some(Bound::ProgramControlled);
        }
        raw.parse::<f64>().ok().map(Bound::Value)
    }

    pub fn resolve(self, fallback: Option<f64>) -> Option<f64> {
        match self {
            Bound::Value(v) => Some(v),
            Bound::ProgramControlled => fallback,
        }
    }
}

/// A field variable the dependent values are tabulated against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndependentParameter {
    pub name: String,
    pub values: Quantity,
    pub default_value: Option<f64>,
    pub upper_limit: Option<Bound>,
    pub lower_limit: Option<Bound>,
}

impl IndependentParameter {
    pub fn new(name: impl Into<String>, values: Quantity) -> Self {
        Self {
            name: name.into(),
            values,
            default_value: None,
            upper_limit: None,
            lower_limit: None,
        }
    }

    pub fn temperature(values: Vec<f64>, unit: impl Into<String>) -> Self {
        Self::new(TEMPERATURE, Quantity::new(values, unit))
    }

    pub fn with_default(mut self, value: f64) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn with_limits(mut self, lower: Option<Bound>, upper: Option<Bound>) -> Self {
        self.lower_limit = lower;
        self.upper_limit = upper;
        self
    }

    pub fn is_temperature(&self) -> bool {
        self.name == TEMPERATURE
    }
}

/// Reserved name of the temperature field variable.
pub const TEMPERATURE: &str = "Temperature";

/// Interpolation settings for tabulated data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpolationOptions {
    pub algorithm_type: String,
    pub normalized: bool,
    pub cached: bool,
    pub extrapolation_type: Option<String>,
}

impl InterpolationOptions {
    pub fn new(algorithm_type: impl Into<String>) -> Self {
        Self {
            algorithm_type: algorithm_type.into(),
            normalized: true,
            cached: true,
            extrapolation_type: None,
        }
    }

    pub fn with_extrapolation(mut self, extrapolation_type: impl Into<String>) -> Self {
        self.extrapolation_type = Some(extrapolation_type.into());
        self
    }
}
