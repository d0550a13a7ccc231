//! MatML engineering-data writer.
//!
//! [`MatmlWriter`] turns every model with at least one dependent value into a
//! `PropertyData` element. Property and parameter names are interned into
//! `pr<N>` / `pa<N>` ids in first-seen order; the ids and the unit recorded at
//! first sight of each parameter are rendered into the closing `Metadata`
//! block. Models are written best effort: fields without a MatML name are
//! left out and no cardinality validation takes place.

use std::fs;
use std::path::Path;

use log::debug;
use mat_model::{
    Bound, ExportConfig, IndependentParameter, InterpolationOptions, Material, MaterialModel,
    ModelKind, PROGRAM_CONTROLLED, Quantity, UserParameter, format_float,
};

use crate::error::Result;
use crate::unit_tree::unit_element;
use crate::xml::{self, Element};

pub const OPTIONS_VARIABLE: &str = "Options Variable";
pub const INTERPOLATION_OPTIONS: &str = "Interpolation Options";
pub const VARIABLE_TYPE: &str = "Variable Type";
pub const USER_MAT_CONSTANT: &str = "UserMat Constant";
pub const PLASTICITY_SUFFIX: &str = " for plasticity";

/// MatML number: shortest round-trip decimal with an uppercase exponent.
pub fn format_number(value: f64) -> String {
    format_float(value).replace('e', "E")
}

fn join_numbers(values: &[f64]) -> String {
    values.iter().map(|v| format_number(*v)).collect::<Vec<_>>().join(", ")
}

fn variable_type(token: &str, count: usize) -> String {
    vec![token; count].join(",")
}

fn qualifier(name: &str, value: impl Into<String>) -> Element {
    Element::with_text("Qualifier", value).attr("name", name)
}

fn bound_text(bound: Bound) -> String {
    match bound {
        Bound::Value(v) => format_number(v),
        Bound::ProgramControlled => PROGRAM_CONTROLLED.to_string(),
    }
}

pub struct MatmlWriter<'a> {
    materials: &'a [Material],
    config: ExportConfig,
    properties: Vec<String>,
    /// Parameter names with the unit seen first.
    parameters: Vec<(String, String)>,
    elements: Vec<Element>,
}

impl<'a> MatmlWriter<'a> {
    pub fn new(materials: &'a [Material]) -> Self {
        Self::with_config(materials, &ExportConfig::default())
    }

    pub fn with_config(materials: &'a [Material], config: &ExportConfig) -> Self {
        Self {
            materials,
            config: config.clone(),
            properties: Vec::new(),
            parameters: Vec::new(),
            elements: Vec::new(),
        }
    }

    /// Builds one `Material` element per material. Interned ids restart
    /// with every pass.
    pub fn visit_materials(&mut self) {
        self.properties.clear();
        self.parameters.clear();
        self.elements.clear();
        for material in self.materials {
            let mut bulk = Element::new("BulkDetails").child(Element::with_text("Name", &material.name));
            for model in material.models() {
                match self.property_data(model) {
                    Some(element) => {
                        debug!("wrote '{}' for material '{}'", model.name(), material.name);
                        bulk.push(element);
                    }
                    None => debug!(
                        "'{}' of material '{}' has no MatML values, skipping",
                        model.name(),
                        material.name
                    ),
                }
            }
            self.elements.push(Element::new("Material").child(bulk));
        }
    }

    /// Id of property set `name`, assigned on first use.
    pub fn property_id(&mut self, name: &str) -> String {
        let index = match self.properties.iter().position(|p| p == name) {
            Some(index) => index,
            None => {
                self.properties.push(name.to_string());
                self.properties.len() - 1
            }
        };
        format!("pr{index}")
    }

    /// Id of parameter `name`; `unit` is kept only the first time.
    pub fn parameter_id(&mut self, name: &str, unit: &str) -> String {
        let index = match self.parameters.iter().position(|(p, _)| p == name) {
            Some(index) => index,
            None => {
                self.parameters.push((name.to_string(), unit.to_string()));
                self.parameters.len() - 1
            }
        };
        format!("pa{index}")
    }

    fn property_data(&mut self, model: &MaterialModel) -> Option<Element> {
        let mut values = Vec::new();
        match model.kind() {
            ModelKind::ElasticityAnisotropic => self.anisotropic_values(model, &mut values),
            ModelKind::HillYieldCriterion => self.hill_values(model, &mut values),
            ModelKind::ModelCoefficients => {
                for parameter in model.user_parameters() {
                    values.push(self.user_value(parameter));
                }
            }
            _ => {
                for (spec, quantity) in model.present_fields() {
                    if let Some(name) = spec.matml_name {
                        values.push(self.dependent_value(name, &quantity.value, &quantity.unit));
                    }
                }
            }
        }
        if values.is_empty() {
            return None;
        }
        if let Some(options) = model.interpolation_options() {
            let element = self.options_value(options);
            values.insert(0, element);
        }
        for parameter in model.independent_parameters() {
            values.push(self.independent_value(parameter));
        }

        let id = self.property_id(model.name());
        let mut element = Element::new("PropertyData")
            .attr("property", id)
            .child(Element::with_text("Data", "-").attr("format", "string"));
        for q in model.qualifiers() {
            element.push(qualifier(&q.name, &q.value));
        }
        element.children.extend(values);
        Some(element)
    }

    fn dependent_value(&mut self, name: &str, values: &[f64], unit: &str) -> Element {
        let id = self.parameter_id(name, unit);
        Element::new("ParameterValue")
            .attr("parameter", id)
            .attr("format", "float")
            .child(Element::with_text("Data", join_numbers(values)))
            .child(qualifier(VARIABLE_TYPE, variable_type("Dependent", values.len())))
    }

    fn anisotropic_values(&mut self, model: &MaterialModel, out: &mut Vec<Element>) {
        for (column, spec) in model.schema().fields.iter().enumerate() {
            let (Some(name), Some(quantity)) = (spec.matml_name, model.field(spec.attribute)) else {
                continue;
            };
            let lower: Vec<f64> = quantity.value.iter().skip(column).copied().collect();
            out.push(self.dependent_value(name, &lower, &quantity.unit));
        }
    }

    fn hill_values(&mut self, model: &MaterialModel, out: &mut Vec<Element>) {
        let separated = model.hill_separated();
        let count = if separated { 12 } else { 6 };
        for (position, spec) in model.schema().fields.iter().enumerate().take(count) {
            let (Some(name), Some(quantity)) = (spec.matml_name, model.field(spec.attribute)) else {
                continue;
            };
            let name = if separated && position < 6 {
                format!("{name}{PLASTICITY_SUFFIX}")
            } else {
                name.to_string()
            };
            out.push(self.dependent_value(&name, &quantity.value, &quantity.unit));
        }
    }

    fn user_value(&mut self, parameter: &UserParameter) -> Element {
        let display = if parameter.display { "True" } else { "False" };
        self.dependent_value(&parameter.name, &parameter.values, "")
            .child(qualifier("Display", display))
            .child(qualifier(USER_MAT_CONSTANT, parameter.user_mat_constant.to_string()))
    }

    fn independent_value(&mut self, parameter: &IndependentParameter) -> Element {
        let Quantity { value, unit } = &parameter.values;
        let id = self.parameter_id(&parameter.name, unit);
        let mut element = Element::new("ParameterValue")
            .attr("parameter", id)
            .attr("format", "float")
            .child(Element::with_text("Data", join_numbers(value)))
            .child(qualifier(VARIABLE_TYPE, variable_type("Independent", value.len())))
            .child(qualifier("Field Variable", &parameter.name));
        if let Some(default) = parameter.default_value {
            element.push(qualifier("Default Data", format_number(default)));
        }
        if !unit.trim().is_empty() {
            element.push(qualifier("Field Units", unit));
        }
        if let Some(upper) = parameter.upper_limit {
            element.push(qualifier("Upper Limit", bound_text(upper)));
        }
        if let Some(lower) = parameter.lower_limit {
            element.push(qualifier("Lower Limit", bound_text(lower)));
        }
        element
    }

    fn options_value(&mut self, options: &InterpolationOptions) -> Element {
        let id = self.parameter_id(OPTIONS_VARIABLE, "");
        let mut element = Element::new("ParameterValue")
            .attr("parameter", id)
            .attr("format", "string")
            .child(Element::with_text("Data", INTERPOLATION_OPTIONS))
            .child(qualifier("AlgorithmType", &options.algorithm_type));
        if options.cached {
            element.push(qualifier("Cached", "True"));
        }
        if options.normalized {
            element.push(qualifier("Normalized", "True"));
        }
        if let Some(extrapolation) = &options.extrapolation_type {
            element.push(qualifier("ExtrapolationType", extrapolation));
        }
        element
    }

    fn metadata(&self) -> Element {
        let mut metadata = Element::new("Metadata");
        for (index, (name, unit)) in self.parameters.iter().enumerate() {
            metadata.push(
                Element::new("ParameterDetails")
                    .attr("id", format!("pa{index}"))
                    .child(Element::with_text("Name", name))
                    .child(unit_element(unit)),
            );
        }
        for (index, name) in self.properties.iter().enumerate() {
            metadata.push(
                Element::new("PropertyDetails")
                    .attr("id", format!("pr{index}"))
                    .child(Element::new("Unitless"))
                    .child(Element::with_text("Name", name)),
            );
        }
        metadata
    }

    fn transfer_data(&self) -> Option<Element> {
        if !self.config.write_transfer_ids {
            return None;
        }
        let mut transfer = Element::new("MaterialTransfer");
        for material in self.materials {
            if let Some(guid) = &material.guid {
                transfer.push(
                    Element::new("Material")
                        .child(Element::with_text("Name", &material.name))
                        .child(Element::with_text("DataTransferID", guid)),
                );
            }
        }
        if transfer.children.is_empty() {
            return None;
        }
        Some(Element::new("ANSYSWBTransferData").child(transfer))
    }

    /// `EngineeringData` root holding the visited materials.
    pub fn to_element(&self) -> Element {
        let mut doc = Element::new("MatML_Doc");
        doc.children.extend(self.elements.iter().cloned());
        doc.push(self.metadata());

        let mut root = Element::new("EngineeringData")
            .attr("version", &self.config.engineering_data_version)
            .attr("versiondate", &self.config.engineering_data_version_date)
            .child(Element::new("Notes"))
            .child(Element::new("Materials").child(doc));
        if let Some(transfer) = self.transfer_data() {
            root.push(transfer);
        }
        root
    }

    pub fn write(&self) -> String {
        xml::document(&self.to_element())
    }

    pub fn write_file(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.write())?;
        Ok(())
    }
}

/// Visits `materials` and returns the XML document.
pub fn write_matml(materials: &[Material], config: &ExportConfig) -> String {
    let mut writer = MatmlWriter::with_config(materials, config);
    writer.visit_materials();
    writer.write()
}

pub fn write_matml_file(
    path: impl AsRef<Path>,
    materials: &[Material],
    config: &ExportConfig,
) -> Result<()> {
    let mut writer = MatmlWriter::with_config(materials, config);
    writer.visit_materials();
    writer.write_file(path)
}
