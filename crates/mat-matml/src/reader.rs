//! MatML engineering-data reader.
//!
//! Metadata is resolved first so `property` / `parameter` ids can be mapped
//! back to names. Each `PropertyData` becomes a model whose kind is looked up
//! from the property name and its `Behavior` qualifier; property sets with no
//! known kind are logged and skipped.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::{debug, warn};
use mat_model::schema::{BEHAVIOR, class_name_candidate};
use mat_model::{
    ANISOTROPIC_COLUMN_LEN, Bound, IndependentParameter, InterpolationOptions, Material,
    MaterialModel, ModelKind, ModelQualifier, Quantity, UserParameter,
};
use roxmltree::{Document, Node};

use crate::error::{MatmlError, Result};
use crate::unit_tree::unit_of;
use crate::writer::{
    INTERPOLATION_OPTIONS, OPTIONS_VARIABLE, PLASTICITY_SUFFIX, USER_MAT_CONSTANT, VARIABLE_TYPE,
};

struct ParameterDetails {
    name: String,
    unit: String,
}

#[derive(Default)]
struct Metadata {
    parameters: HashMap<String, ParameterDetails>,
    properties: HashMap<String, String>,
}

impl Metadata {
    fn parse(node: Node<'_, '_>) -> Self {
        let mut parameters = HashMap::new();
        let mut properties = HashMap::new();
        for details in node.children().filter(Node::is_element) {
            let (Some(id), Some(name)) = (details.attribute("id"), child_text(details, "Name"))
            else {
                continue;
            };
            if details.has_tag_name("ParameterDetails") {
                parameters.insert(
                    id.to_string(),
                    ParameterDetails {
                        name: name.to_string(),
                        unit: unit_of(details),
                    },
                );
            } else if details.has_tag_name("PropertyDetails") {
                properties.insert(id.to_string(), name.to_string());
            }
        }
        Self {
            parameters,
            properties,
        }
    }
}

fn child<'a, 'i>(node: Node<'a, 'i>, name: &str) -> Option<Node<'a, 'i>> {
    node.children().find(|n| n.has_tag_name(name))
}

fn child_text<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    child(node, name).and_then(|n| n.text()).map(str::trim)
}

fn require<'a, 'i>(node: Node<'a, 'i>, name: &str) -> Result<Node<'a, 'i>> {
    child(node, name).ok_or_else(|| MatmlError::MissingElement(name.to_string()))
}

/// `Qualifier` children as name/value pairs, in document order.
fn qualifiers_of(node: Node<'_, '_>) -> Vec<ModelQualifier> {
    node.children()
        .filter(|n| n.has_tag_name("Qualifier"))
        .filter_map(|q| {
            let name = q.attribute("name")?;
            Some(ModelQualifier::new(name, q.text().unwrap_or_default().trim()))
        })
        .collect()
}

fn find<'q>(qualifiers: &'q [ModelQualifier], name: &str) -> Option<&'q str> {
    qualifiers
        .iter()
        .find(|q| q.name == name)
        .map(|q| q.value.as_str())
}

fn parse_number(raw: &str, context: &str) -> Result<f64> {
    raw.trim().parse().map_err(|_| MatmlError::InvalidNumber {
        value: raw.to_string(),
        context: context.to_string(),
    })
}

/// Comma-separated `Data` text as numbers.
pub fn parse_numbers(data: &str, context: &str) -> Result<Vec<f64>> {
    data.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_number(s, context))
        .collect()
}

fn parse_bound(raw: &str, context: &str) -> Result<Bound> {
    Bound::parse(raw).ok_or_else(|| MatmlError::InvalidNumber {
        value: raw.to_string(),
        context: context.to_string(),
    })
}

/// One `ParameterValue` with its id resolved.
struct Parameter<'a> {
    name: &'a str,
    unit: &'a str,
    data: &'a str,
    qualifiers: Vec<ModelQualifier>,
}

impl Parameter<'_> {
    fn qualifier(&self, name: &str) -> Option<&str> {
        find(&self.qualifiers, name)
    }

    fn numbers(&self) -> Result<Vec<f64>> {
        parse_numbers(self.data, self.name)
    }

    fn is_options(&self) -> bool {
        self.name == OPTIONS_VARIABLE || self.data == INTERPOLATION_OPTIONS
    }

    fn is_independent(&self) -> bool {
        self.qualifier(VARIABLE_TYPE)
            .is_some_and(|v| v.starts_with("Independent"))
    }

    fn interpolation_options(&self) -> InterpolationOptions {
        let mut options = InterpolationOptions::new(self.qualifier("AlgorithmType").unwrap_or_default());
        options.cached = self.qualifier("Cached") == Some("True");
        options.normalized = self.qualifier("Normalized") == Some("True");
        options.extrapolation_type = self.qualifier("ExtrapolationType").map(str::to_string);
        options
    }

    fn independent(&self) -> Result<IndependentParameter> {
        let unit = self
            .qualifier("Field Units")
            .filter(|u| !u.is_empty())
            .unwrap_or(self.unit);
        let mut parameter = IndependentParameter::new(self.name, Quantity::new(self.numbers()?, unit));
        if let Some(raw) = self.qualifier("Default Data") {
            parameter.default_value = Some(parse_number(raw, "Default Data")?);
        }
        if let Some(raw) = self.qualifier("Upper Limit") {
            parameter.upper_limit = Some(parse_bound(raw, "Upper Limit")?);
        }
        if let Some(raw) = self.qualifier("Lower Limit") {
            parameter.lower_limit = Some(parse_bound(raw, "Lower Limit")?);
        }
        Ok(parameter)
    }

    fn user(&self, constant: &str) -> Result<UserParameter> {
        let index = constant
            .trim()
            .parse()
            .map_err(|_| MatmlError::InvalidNumber {
                value: constant.to_string(),
                context: USER_MAT_CONSTANT.to_string(),
            })?;
        let mut parameter = UserParameter::new(self.name, self.numbers()?, index);
        parameter.display = self.qualifier("Display") != Some("False");
        Ok(parameter)
    }
}

/// Lower-triangle columns of an anisotropic stiffness matrix.
#[derive(Default)]
struct LowerColumns {
    columns: [Option<Quantity>; ANISOTROPIC_COLUMN_LEN],
}

impl LowerColumns {
    fn insert(&mut self, column: usize, quantity: Quantity) {
        if let Some(slot) = self.columns.get_mut(column) {
            *slot = Some(quantity);
        }
    }

    fn entry(&self, row: usize, col: usize) -> Option<f64> {
        let (r, c) = if row >= col { (row, col) } else { (col, row) };
        self.columns[c].as_ref()?.value.get(r - c).copied()
    }

    /// Full symmetric column `col`.
    fn column(&self, col: usize) -> Option<Quantity> {
        let unit = self.columns[col].as_ref()?.unit.clone();
        let values = (0..ANISOTROPIC_COLUMN_LEN)
            .map(|row| self.entry(row, col))
            .collect::<Option<Vec<f64>>>()?;
        Some(Quantity::new(values, unit))
    }
}

fn read_property(node: Node<'_, '_>, metadata: &Metadata) -> Result<Option<MaterialModel>> {
    let property_id = node.attribute("property").unwrap_or_default();
    let Some(property_name) = metadata.properties.get(property_id) else {
        warn!("property id '{property_id}' has no metadata entry, skipping");
        return Ok(None);
    };
    let qualifiers = qualifiers_of(node);
    let candidate = class_name_candidate(property_name, find(&qualifiers, BEHAVIOR));
    let Some(kind) = ModelKind::from_class_name(&candidate) else {
        warn!("no material model for '{candidate}', skipping");
        return Ok(None);
    };
    debug!("reading '{property_name}' as {kind:?}");

    let mut model = MaterialModel::new(kind, qualifiers)?;
    let mut lower = LowerColumns::default();
    for value in node.children().filter(|n| n.has_tag_name("ParameterValue")) {
        let parameter_id = value.attribute("parameter").unwrap_or_default();
        let Some(details) = metadata.parameters.get(parameter_id) else {
            warn!("parameter id '{parameter_id}' has no metadata entry, skipping");
            continue;
        };
        let parameter = Parameter {
            name: &details.name,
            unit: &details.unit,
            data: child_text(value, "Data").unwrap_or_default(),
            qualifiers: qualifiers_of(value),
        };

        if parameter.is_options() {
            model.set_interpolation_options(Some(parameter.interpolation_options()));
        } else if parameter.is_independent() {
            model.independent_parameters_mut().push(parameter.independent()?);
        } else if let Some(constant) = parameter.qualifier(USER_MAT_CONSTANT) {
            model.push_user_parameter(parameter.user(constant)?);
        } else if value.attribute("format") == Some("string") {
            debug!("ignoring string parameter '{}'", parameter.name);
        } else {
            let quantity = Quantity::new(parameter.numbers()?, parameter.unit);
            let name = match kind {
                ModelKind::HillYieldCriterion => parameter
                    .name
                    .strip_suffix(PLASTICITY_SUFFIX)
                    .unwrap_or(parameter.name),
                _ => parameter.name,
            };
            let Some(spec) = model.schema().field_by_matml_name(name) else {
                warn!("'{}' has no field named '{name}', skipping", model.name());
                continue;
            };
            if kind == ModelKind::ElasticityAnisotropic {
                if let Some(column) = model.schema().fields.iter().position(|f| f == spec) {
                    lower.insert(column, quantity);
                }
            } else {
                model.set_field(spec.attribute, quantity)?;
            }
        }
    }

    if kind == ModelKind::ElasticityAnisotropic {
        for (col, spec) in kind.schema().fields.iter().enumerate() {
            match lower.column(col) {
                Some(column) => model.set_field(spec.attribute, column)?,
                None => warn!("stiffness column {} is incomplete, skipping", col + 1),
            }
        }
    }
    Ok(Some(model))
}

fn transfer_ids(doc: &Document<'_>) -> HashMap<String, String> {
    let Some(transfer) = doc
        .descendants()
        .find(|n| n.has_tag_name("ANSYSWBTransferData"))
    else {
        return HashMap::new();
    };
    transfer
        .descendants()
        .filter(|n| n.has_tag_name("Material"))
        .filter_map(|m| {
            let name = child_text(m, "Name")?;
            let id = child_text(m, "DataTransferID")?;
            Some((name.to_string(), id.to_string()))
        })
        .collect()
}

/// Parses a MatML document into materials in document order.
pub fn read_matml_str(text: &str) -> Result<Vec<Material>> {
    let doc = Document::parse(text)?;
    let matml = doc
        .descendants()
        .find(|n| n.has_tag_name("MatML_Doc"))
        .ok_or_else(|| MatmlError::MissingElement("MatML_Doc".to_string()))?;
    let metadata = child(matml, "Metadata")
        .map(Metadata::parse)
        .unwrap_or_default();
    let guids = transfer_ids(&doc);

    let mut materials = Vec::new();
    for node in matml.children().filter(|n| n.has_tag_name("Material")) {
        let bulk = require(node, "BulkDetails")?;
        let name = child_text(bulk, "Name")
            .ok_or_else(|| MatmlError::MissingElement("BulkDetails/Name".to_string()))?;
        let mut models = Vec::new();
        for property in bulk.children().filter(|n| n.has_tag_name("PropertyData")) {
            if let Some(model) = read_property(property, &metadata)? {
                models.push(model);
            }
        }
        let guid = match guids.get(name) {
            Some(guid) => guid.clone(),
            None => uuid::Uuid::new_v4().to_string(),
        };
        debug!("read material '{name}' with {} models", models.len());
        materials.push(Material::new(name, models).with_guid(guid));
    }
    Ok(materials)
}

pub fn read_matml_file(path: impl AsRef<Path>) -> Result<Vec<Material>> {
    let text = fs::read_to_string(path)?;
    read_matml_str(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<EngineeringData version="18.0.0.60" versiondate="29.08.2016 15:02:00">
  <Notes />
  <Materials>
    <MatML_Doc>
      <Material>
        <BulkDetails>
          <Name>Steel</Name>
          <PropertyData property="pr0">
            <Data format="string">-</Data>
            <ParameterValue parameter="pa0" format="float">
              <Data>7850, 7800</Data>
              <Qualifier name="Variable Type">Dependent,Dependent</Qualifier>
            </ParameterValue>
            <ParameterValue parameter="pa1" format="float">
              <Data>20, 100</Data>
              <Qualifier name="Variable Type">Independent,Independent</Qualifier>
              <Qualifier name="Upper Limit">Program Controlled</Qualifier>
            </ParameterValue>
          </PropertyData>
          <PropertyData property="pr1">
            <Data format="string">-</Data>
            <ParameterValue parameter="pa2" format="float">
              <Data>1</Data>
              <Qualifier name="Variable Type">Dependent</Qualifier>
            </ParameterValue>
          </PropertyData>
        </BulkDetails>
      </Material>
      <Metadata>
        <ParameterDetails id="pa0"><Name>Density</Name><Units><Unit><Name>kg</Name></Unit><Unit power="-3"><Name>m</Name></Unit></Units></ParameterDetails>
        <ParameterDetails id="pa1"><Name>Temperature</Name><Units><Unit><Name>C</Name></Unit></Units></ParameterDetails>
        <ParameterDetails id="pa2"><Name>Strength</Name><Unitless /></ParameterDetails>
        <PropertyDetails id="pr0"><Unitless /><Name>Density</Name></PropertyDetails>
        <PropertyDetails id="pr1"><Unitless /><Name>Custom Property</Name></PropertyDetails>
      </Metadata>
    </MatML_Doc>
  </Materials>
</EngineeringData>
"#;

    #[test]
    fn reads_density_table_and_skips_unknown_class() {
        let materials = read_matml_str(DOC).unwrap();
        assert_eq!(materials.len(), 1);
        let steel = &materials[0];
        assert_eq!(steel.name, "Steel");
        let kinds: Vec<ModelKind> = steel.models().iter().map(|m| m.kind()).collect();
        assert_eq!(kinds, vec![ModelKind::Density, ModelKind::ReferenceTemperature]);

        let density = steel.get_model_by_kind(ModelKind::Density).unwrap();
        assert_eq!(density.field("density"), Some(&Quantity::new(vec![7850.0, 7800.0], "kg*m^-3")));
        let temperature = density.independent_parameter("Temperature").unwrap();
        assert_eq!(temperature.values.unit, "C");
        assert_eq!(temperature.upper_limit, Some(Bound::ProgramControlled));
    }

    #[test]
    fn synthesizes_transfer_id_when_absent() {
        let materials = read_matml_str(DOC).unwrap();
        let guid = materials[0].guid.as_deref().unwrap();
        assert!(uuid::Uuid::parse_str(guid).is_ok());
    }

    #[test]
    fn bad_number_is_reported() {
        let doc = DOC.replace("7850, 7800", "7850, abc");
        let err = read_matml_str(&doc).unwrap_err();
        assert!(matches!(err, MatmlError::InvalidNumber { ref value, .. } if value == "abc"));
    }

    #[test]
    fn missing_matml_doc() {
        let err = read_matml_str("<EngineeringData />").unwrap_err();
        assert!(matches!(err, MatmlError::MissingElement(ref e) if e == "MatML_Doc"));
    }

    #[test]
    fn malformed_xml() {
        assert!(matches!(read_matml_str("<a><b></a>"), Err(MatmlError::Xml(_))));
    }

    #[test]
    fn mirrors_lower_triangle() {
        let mut lower = LowerColumns::default();
        for c in 0..ANISOTROPIC_COLUMN_LEN {
            let values = (c..ANISOTROPIC_COLUMN_LEN).map(|r| (10 * r + c) as f64).collect();
            lower.insert(c, Quantity::new(values, "Pa"));
        }
        let column = lower.column(2).unwrap();
        assert_eq!(column.value, vec![20.0, 21.0, 22.0, 32.0, 42.0, 52.0]);
    }
}
