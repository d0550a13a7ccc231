//! Generic material model record.

use std::collections::BTreeMap;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::cardinality;
use crate::error::{MaterialError, Result};
use crate::qualifiers::validate_and_initialize;
use crate::quantity::{IndependentParameter, InterpolationOptions, ModelQualifier, Quantity};
use crate::schema::{
    BILINEAR, DEFINITION, FieldShape, FieldSpec, KindSchema, ModelKind, PLASTIC_STRAIN,
    SEPARATED_HILL_POTENTIALS,
};
use crate::units;

/// Number of entries in one anisotropic stiffness column.
pub const ANISOTROPIC_COLUMN_LEN: usize = 6;

/// Constant of a user-defined material (`TB,USER`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserParameter {
    pub name: String,
    pub values: Vec<f64>,
    /// 1-based position in the `TBDATA` constant list.
    pub user_mat_constant: usize,
    pub display: bool,
}

impl UserParameter {
    pub fn new(name: impl Into<String>, values: Vec<f64>, user_mat_constant: usize) -> Self {
        Self {
            name: name.into(),
            values,
            user_mat_constant,
            display: true,
        }
    }
}

/// One property set of a material.
///
/// The kind fixes the name, the field table and the expected qualifiers;
/// field values are stored by attribute name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialModel {
    kind: ModelKind,
    qualifiers: Vec<ModelQualifier>,
    #[serde(default)]
    independent_parameters: Vec<IndependentParameter>,
    #[serde(default)]
    interpolation_options: Option<InterpolationOptions>,
    #[serde(default)]
    fields: BTreeMap<String, Quantity>,
    #[serde(default)]
    user_parameters: Vec<UserParameter>,
}

impl MaterialModel {
    /// Creates an empty model, validating `qualifiers` against the kind's table.
    pub fn new<Q: Into<ModelQualifier>>(
        kind: ModelKind,
        qualifiers: impl IntoIterator<Item = Q>,
    ) -> Result<Self> {
        let qualifiers = validate_and_initialize(qualifiers, kind.schema().qualifiers)?;
        Ok(Self {
            kind,
            qualifiers,
            independent_parameters: Vec::new(),
            interpolation_options: None,
            fields: BTreeMap::new(),
            user_parameters: Vec::new(),
        })
    }

    /// Creates a model carrying the kind's default qualifiers.
    pub fn with_defaults(kind: ModelKind) -> Self {
        Self {
            kind,
            qualifiers: kind
                .schema()
                .qualifiers
                .iter()
                .map(|q| ModelQualifier::new(q.name, q.default))
                .collect(),
            independent_parameters: Vec::new(),
            interpolation_options: None,
            fields: BTreeMap::new(),
            user_parameters: Vec::new(),
        }
    }

    pub fn density(density: Quantity) -> Self {
        Self::with_defaults(ModelKind::Density).field_unchecked("density", density)
    }

    pub fn elasticity_isotropic(youngs_modulus: Quantity, poissons_ratio: Quantity) -> Self {
        Self::with_defaults(ModelKind::ElasticityIsotropic)
            .field_unchecked("youngs_modulus", youngs_modulus)
            .field_unchecked("poissons_ratio", poissons_ratio)
    }

    pub(crate) fn field_unchecked(mut self, attribute: &str, value: Quantity) -> Self {
        self.fields.insert(attribute.to_string(), value);
        self
    }

    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    pub fn schema(&self) -> &'static KindSchema {
        self.kind.schema()
    }

    pub fn name(&self) -> &'static str {
        self.kind.display_name()
    }

    pub fn qualifiers(&self) -> &[ModelQualifier] {
        &self.qualifiers
    }

    pub fn qualifier(&self, name: &str) -> Option<&str> {
        self.qualifiers
            .iter()
            .find(|q| q.name == name)
            .map(|q| q.value.as_str())
    }

    pub fn independent_parameters(&self) -> &[IndependentParameter] {
        &self.independent_parameters
    }

    pub fn independent_parameters_mut(&mut self) -> &mut Vec<IndependentParameter> {
        &mut self.independent_parameters
    }

    pub fn independent_parameter(&self, name: &str) -> Option<&IndependentParameter> {
        self.independent_parameters.iter().find(|p| p.name == name)
    }

    pub fn interpolation_options(&self) -> Option<&InterpolationOptions> {
        self.interpolation_options.as_ref()
    }

    pub fn user_parameters(&self) -> &[UserParameter] {
        &self.user_parameters
    }

    pub fn field(&self, attribute: &str) -> Option<&Quantity> {
        self.fields.get(attribute)
    }

    pub fn set_field(&mut self, attribute: &str, value: Quantity) -> Result<()> {
        if self.schema().field(attribute).is_none() {
            return Err(MaterialError::UnknownField {
                model: self.name().to_string(),
                field: attribute.to_string(),
            });
        }
        self.fields.insert(attribute.to_string(), value);
        Ok(())
    }

    pub fn with_field(mut self, attribute: &str, value: Quantity) -> Result<Self> {
        self.set_field(attribute, value)?;
        Ok(self)
    }

    pub fn with_independent_parameter(mut self, parameter: IndependentParameter) -> Self {
        self.independent_parameters.push(parameter);
        self
    }

    pub fn set_interpolation_options(&mut self, options: Option<InterpolationOptions>) {
        self.interpolation_options = options;
    }

    pub fn with_interpolation_options(mut self, options: InterpolationOptions) -> Self {
        self.interpolation_options = Some(options);
        self
    }

    pub fn with_user_parameter(mut self, parameter: UserParameter) -> Self {
        self.user_parameters.push(parameter);
        self
    }

    pub fn push_user_parameter(&mut self, parameter: UserParameter) {
        self.user_parameters.push(parameter);
    }

    /// Fields that hold a value, in table order.
    pub fn present_fields(&self) -> impl Iterator<Item = (&'static FieldSpec, &Quantity)> + '_ {
        self.schema()
            .fields
            .iter()
            .filter_map(|spec| self.fields.get(spec.attribute).map(|q| (spec, q)))
    }

    /// Number of table rows implied by the dependent fields.
    pub fn row_count(&self) -> usize {
        self.present_fields()
            .filter(|(spec, _)| spec.shape == FieldShape::Tabular)
            .map(|(_, q)| q.len())
            .chain(self.user_parameters.iter().map(|p| p.values.len()))
            .max()
            .unwrap_or(0)
    }

    /// True when the Hill potentials are split into plasticity and creep sets.
    pub fn hill_separated(&self) -> bool {
        self.qualifier(SEPARATED_HILL_POTENTIALS) == Some("Yes")
    }

    pub fn is_bilinear(&self) -> bool {
        self.qualifier(DEFINITION) == Some(BILINEAR)
    }

    /// Attributes this model must carry to be written.
    pub fn required_fields(&self) -> Vec<&'static FieldSpec> {
        let fields = self.schema().fields;
        match self.kind {
            ModelKind::HillYieldCriterion => {
                let count = if self.hill_separated() { 12 } else { 6 };
                fields.iter().take(count).collect()
            }
            ModelKind::IsotropicHardening => {
                let wanted: &[&str] = if self.is_bilinear() {
                    &["yield_strength", "tangent_modulus"]
                } else {
                    &["stress"]
                };
                fields
                    .iter()
                    .filter(|f| wanted.contains(&f.attribute))
                    .collect()
            }
            _ => fields.iter().collect(),
        }
    }

    /// Checks that every required value is present and consistently shaped.
    pub fn validate_model(&self) -> Result<()> {
        for spec in self.required_fields() {
            let Some(quantity) = self.fields.get(spec.attribute) else {
                return Err(MaterialError::MissingValue {
                    model: self.name().to_string(),
                    field: spec.attribute.to_string(),
                });
            };
            match spec.shape {
                FieldShape::Tabular => {
                    cardinality::validate(spec.attribute, quantity, &self.independent_parameters)?
                }
                FieldShape::Column => {
                    if quantity.len() != ANISOTROPIC_COLUMN_LEN {
                        return Err(MaterialError::CardinalityMismatch {
                            dependent: spec.attribute.to_string(),
                            dependent_len: quantity.len(),
                            independent: "stiffness matrix rows".to_string(),
                            independent_len: ANISOTROPIC_COLUMN_LEN,
                        });
                    }
                }
            }
            check_unit(spec, quantity)?;
        }

        match self.kind {
            ModelKind::IsotropicHardening if !self.is_bilinear() => {
                if self.independent_parameter(PLASTIC_STRAIN).is_none() {
                    return Err(MaterialError::MissingValue {
                        model: self.name().to_string(),
                        field: PLASTIC_STRAIN.to_string(),
                    });
                }
            }
            ModelKind::ModelCoefficients => {
                if self.user_parameters.is_empty() {
                    return Err(MaterialError::MissingValue {
                        model: self.name().to_string(),
                        field: "user_parameters".to_string(),
                    });
                }
                for p in &self.user_parameters {
                    let q = Quantity::new(p.values.clone(), "");
                    cardinality::validate(&p.name, &q, &self.independent_parameters)?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}

fn check_unit(spec: &FieldSpec, quantity: &Quantity) -> Result<()> {
    let Some(expected) = spec.unit else {
        return Ok(());
    };
    if quantity.unit.trim().is_empty() {
        return Ok(());
    }
    match (units::dimension_of(&quantity.unit), units::dimension_of(expected)) {
        (Some(actual), Some(reference)) if actual != reference => {
            Err(MaterialError::IncompatibleUnit {
                field: spec.attribute.to_string(),
                actual: quantity.unit.clone(),
                expected: expected.to_string(),
            })
        }
        (None, _) => {
            warn!(
                "unrecognized unit '{}' on '{}', skipping dimension check",
                quantity.unit, spec.attribute
            );
            Ok(())
        }
        _ => Ok(()),
    }
}
