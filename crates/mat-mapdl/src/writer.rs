//! MAPDL command writer.
//!
//! [`MapdlWriter`] walks materials × models, validates each model and routes
//! it through the encoder registered for its kind in [`encoder_for`].
//! Standard-shape kinds share one encoder that picks the command family
//! from the independent-parameter layout:
//!
//! - no parameters, or a single temperature point: one `MP` line per field
//! - a temperature series: `MPTEMP` followed by `MPDATA` per field
//! - anything else: a `TB` table with one `TBFIELD` group per unique
//!   parameter combination

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use log::debug;
use mat_model::schema::PLASTIC_STRAIN;
use mat_model::{
    ExportConfig, IndependentParameter, InterpolationOptions, Material, MaterialError,
    MaterialModel, ModelKind, Quantity, TEMPERATURE, UserParameter,
};

use crate::error::{MapdlError, Result};
use crate::format::{self, ALGORITHMS, EXTRAPOLATIONS};

pub type EncodeFn = fn(&MaterialModel, u32) -> Result<String>;

/// Encoder for `kind`, or `None` when the kind has no MAPDL form.
pub fn encoder_for(kind: ModelKind) -> Option<EncodeFn> {
    match kind {
        ModelKind::ElasticityAnisotropic => Some(encode_anisotropic),
        ModelKind::HillYieldCriterion => Some(encode_hill),
        ModelKind::IsotropicHardening => Some(encode_hardening),
        ModelKind::ZeroThermalStrainReferenceTemperature => Some(encode_zero_thermal_strain),
        ModelKind::ModelCoefficients => Some(encode_user_material),
        ModelKind::MolecularWeight => None,
        _ => Some(encode_standard),
    }
}

/// Kinds handled by the shared table encoder.
pub(crate) fn is_standard(kind: ModelKind) -> bool {
    !matches!(
        kind,
        ModelKind::ElasticityAnisotropic
            | ModelKind::HillYieldCriterion
            | ModelKind::IsotropicHardening
            | ModelKind::ZeroThermalStrainReferenceTemperature
            | ModelKind::ModelCoefficients
            | ModelKind::MolecularWeight
    )
}

/// Validates `model` and renders its commands, including the `TBIN`
/// trailer. Returns `None` for kinds without a MAPDL form.
pub fn encode_model(model: &MaterialModel, material_id: u32) -> Result<Option<String>> {
    let Some(encode) = encoder_for(model.kind()) else {
        debug!("'{}' has no MAPDL representation, skipping", model.name());
        return Ok(None);
    };
    model.validate_model()?;
    let mut text = encode(model, material_id)?;
    if let Some(options) = model.interpolation_options() {
        text.push_str(&encode_interpolation(options, model.independent_parameters())?);
    }
    Ok(Some(text))
}

/// Output fragments of one material.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialBlock {
    pub name: String,
    pub material_id: u32,
    pub fragments: Vec<String>,
}

pub struct MapdlWriter<'a> {
    materials: &'a [Material],
    first_material_id: u32,
    blocks: Vec<MaterialBlock>,
}

impl<'a> MapdlWriter<'a> {
    pub fn new(materials: &'a [Material]) -> Self {
        Self::with_config(materials, &ExportConfig::default())
    }

    pub fn with_config(materials: &'a [Material], config: &ExportConfig) -> Self {
        Self {
            materials,
            first_material_id: config.first_material_id,
            blocks: Vec::new(),
        }
    }

    /// Encodes every model, replacing the output of a previous pass.
    pub fn visit_materials(&mut self) -> Result<()> {
        self.blocks.clear();
        let ids = assign_material_ids(self.materials, self.first_material_id)?;
        for (material, material_id) in self.materials.iter().zip(ids) {
            let mut fragments = Vec::new();
            for model in material.models() {
                if let Some(text) = encode_model(model, material_id)? {
                    debug!(
                        "encoded '{}' for material '{}' ({material_id})",
                        model.name(),
                        material.name
                    );
                    fragments.push(text);
                }
            }
            self.blocks.push(MaterialBlock {
                name: material.name.clone(),
                material_id,
                fragments,
            });
        }
        Ok(())
    }

    pub fn blocks(&self) -> &[MaterialBlock] {
        &self.blocks
    }

    /// Fragments of `material_name`, joined.
    pub fn material_text(&self, material_name: &str) -> Option<String> {
        self.blocks
            .iter()
            .find(|b| b.name == material_name)
            .map(|b| b.fragments.concat())
    }

    pub fn write(&self) -> String {
        self.blocks.iter().flat_map(|b| b.fragments.iter()).map(String::as_str).collect()
    }

    pub fn write_file(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.write())?;
        Ok(())
    }
}

/// Explicit ids are kept; the others count up from `first` by position,
/// stepping past ids already in use.
fn assign_material_ids(materials: &[Material], first: u32) -> Result<Vec<u32>> {
    let mut taken = HashSet::new();
    for material in materials {
        if let Some(id) = material.material_id
            && !taken.insert(id)
        {
            return Err(MapdlError::MaterialId(format!(
                "{id} is set on more than one material"
            )));
        }
    }

    let exhausted = |name: &str| MapdlError::MaterialId(format!("no free id left for '{name}'"));
    let mut ids = Vec::with_capacity(materials.len());
    for (index, material) in materials.iter().enumerate() {
        if let Some(id) = material.material_id {
            ids.push(id);
            continue;
        }
        let mut id = u32::try_from(index)
            .ok()
            .and_then(|i| first.checked_add(i))
            .ok_or_else(|| exhausted(&material.name))?;
        while taken.contains(&id) {
            id = id.checked_add(1).ok_or_else(|| exhausted(&material.name))?;
        }
        taken.insert(id);
        ids.push(id);
    }
    Ok(ids)
}

/// Visits `materials` and returns the joined command text.
pub fn write_materials(materials: &[Material], config: &ExportConfig) -> Result<String> {
    let mut writer = MapdlWriter::with_config(materials, config);
    writer.visit_materials()?;
    Ok(writer.write())
}

pub fn write_mapdl_file(
    path: impl AsRef<Path>,
    materials: &[Material],
    config: &ExportConfig,
) -> Result<()> {
    let mut writer = MapdlWriter::with_config(materials, config);
    writer.visit_materials()?;
    writer.write_file(path)
}

/// `TEMP` for temperature, `UF01`, `UF02`, ... for the other parameters.
pub fn field_codes(parameters: &[IndependentParameter]) -> Vec<String> {
    let mut user_fields = 0;
    parameters
        .iter()
        .map(|p| {
            if p.is_temperature() {
                "TEMP".to_string()
            } else {
                user_fields += 1;
                format!("UF{user_fields:02}")
            }
        })
        .collect()
}

fn encode_standard(model: &MaterialModel, material_id: u32) -> Result<String> {
    let fields: Vec<(&'static str, &Quantity)> = model
        .present_fields()
        .filter_map(|(spec, q)| spec.mapdl_label.map(|label| (label, q)))
        .collect();
    let parameters = model.independent_parameters();

    match parameters {
        [] => Ok(constant_lines(&fields, material_id)),
        [p] if p.is_temperature() && p.values.len() == 1 => {
            Ok(constant_lines(&fields, material_id))
        }
        [p] if p.is_temperature() => {
            let temperatures = &p.values.value;
            let mut out = format::mptemp_lines(temperatures);
            for (label, quantity) in &fields {
                let values = expand(quantity, temperatures.len());
                out.push_str(&format::mpdata_lines(label, material_id, &values, &quantity.unit));
            }
            Ok(out)
        }
        _ => {
            let table = model.schema().table.ok_or_else(|| {
                MapdlError::unsupported(format!(
                    "'{}' cannot be tabulated over {}",
                    model.name(),
                    parameter_names(parameters)
                ))
            })?;
            let quantities: Vec<&Quantity> = fields.iter().map(|(_, q)| *q).collect();
            let rows = table_rows(&quantities, model.row_count().max(1));
            Ok(field_table(table.label, table.option, material_id, parameters, &rows))
        }
    }
}

fn constant_lines(fields: &[(&'static str, &Quantity)], material_id: u32) -> String {
    fields
        .iter()
        .filter_map(|(label, q)| q.at(0).map(|v| format::mp_line(label, material_id, v, &q.unit)))
        .collect()
}

fn expand(quantity: &Quantity, rows: usize) -> Vec<f64> {
    (0..rows).filter_map(|r| quantity.at(r)).collect()
}

fn table_rows(quantities: &[&Quantity], rows: usize) -> Vec<Vec<f64>> {
    (0..rows)
        .map(|r| quantities.iter().filter_map(|q| q.at(r)).collect())
        .collect()
}

fn parameter_names(parameters: &[IndependentParameter]) -> String {
    let names: Vec<&str> = parameters.iter().map(|p| p.name.as_str()).collect();
    format!("[{}]", names.join(", "))
}

/// `TB` table over arbitrary field variables.
fn field_table(
    label: &str,
    option: &str,
    material_id: u32,
    parameters: &[IndependentParameter],
    rows: &[Vec<f64>],
) -> String {
    let codes = field_codes(parameters);
    let mut out = String::new();
    for (parameter, code) in parameters.iter().zip(&codes) {
        if !parameter.is_temperature() {
            out.push_str(&format::declaration_line(&parameter.name, code, &parameter.values.unit));
        }
    }
    out.push_str(&format::tb_header(label, material_id, option));

    let mut groups: Vec<(Vec<f64>, Vec<f64>)> = Vec::new();
    for (r, row) in rows.iter().enumerate() {
        let key: Vec<f64> = parameters
            .iter()
            .map(|p| p.values.at(r).unwrap_or_default())
            .collect();
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, data)) => data.extend_from_slice(row),
            None => groups.push((key, row.clone())),
        }
    }

    for (key, data) in &groups {
        for (code, value) in codes.iter().zip(key) {
            out.push_str(&format::tbfield_line(code, *value));
        }
        out.push_str(&format::tbdata_lines(data));
    }
    out
}

fn encode_anisotropic(model: &MaterialModel, material_id: u32) -> Result<String> {
    if model.independent_parameters().iter().any(|p| p.values.len() > 1) {
        return Err(MapdlError::unsupported(format!(
            "anisotropic elasticity tabulated over {}",
            parameter_names(model.independent_parameters())
        )));
    }
    let mut values = Vec::with_capacity(21);
    for (j, (_, column)) in model.present_fields().enumerate() {
        values.extend(column.value.iter().skip(j));
    }
    let mut out = format::tb_header("ELASTIC", material_id, "AELS");
    out.push_str(&format::tbdata_lines(&values));
    Ok(out)
}

fn encode_hill(model: &MaterialModel, material_id: u32) -> Result<String> {
    let option = if model.hill_separated() { "PC" } else { "" };
    let quantities: Vec<&Quantity> = model
        .required_fields()
        .iter()
        .filter_map(|spec| model.field(spec.attribute))
        .collect();
    let parameters = model.independent_parameters();

    match parameters {
        [] => Ok(constant_table("HILL", option, material_id, &quantities)),
        [p] if p.is_temperature() && p.values.len() == 1 => {
            Ok(constant_table("HILL", option, material_id, &quantities))
        }
        [p] if p.is_temperature() => {
            let rows = table_rows(&quantities, model.row_count().max(1));
            Ok(field_table("HILL", option, material_id, parameters, &rows))
        }
        _ => Err(MapdlError::unsupported(format!(
            "Hill yield criterion tabulated over {}",
            parameter_names(parameters)
        ))),
    }
}

fn constant_table(label: &str, option: &str, material_id: u32, quantities: &[&Quantity]) -> String {
    let values: Vec<f64> = quantities.iter().filter_map(|q| q.at(0)).collect();
    let mut out = format::tb_header(label, material_id, option);
    out.push_str(&format::tbdata_lines(&values));
    out
}

fn encode_hardening(model: &MaterialModel, material_id: u32) -> Result<String> {
    if model.is_bilinear() {
        encode_bilinear(model, material_id)
    } else {
        encode_multilinear(model, material_id)
    }
}

fn required<'m>(model: &'m MaterialModel, attribute: &str) -> Result<&'m Quantity> {
    model.field(attribute).ok_or_else(|| {
        MaterialError::MissingValue {
            model: model.name().to_string(),
            field: attribute.to_string(),
        }
        .into()
    })
}

fn temperature_only<'m>(
    model: &'m MaterialModel,
    what: &str,
) -> Result<Option<&'m IndependentParameter>> {
    match model.independent_parameters() {
        [] => Ok(None),
        [p] if p.is_temperature() => Ok(Some(p)),
        other => Err(MapdlError::unsupported(format!(
            "{what} tabulated over {}",
            parameter_names(other)
        ))),
    }
}

fn encode_bilinear(model: &MaterialModel, material_id: u32) -> Result<String> {
    let temperature = temperature_only(model, "bilinear isotropic hardening")?;
    let yield_strength = required(model, "yield_strength")?;
    let tangent_modulus = required(model, "tangent_modulus")?;

    let mut out = format::tb_header("PLASTIC", material_id, "BISO");
    for r in 0..model.row_count().max(1) {
        if let Some(t) = temperature.and_then(|p| p.values.at(r)) {
            out.push_str(&format::tbtemp_line(t));
        }
        let row: Vec<f64> = [yield_strength.at(r), tangent_modulus.at(r)]
            .into_iter()
            .flatten()
            .collect();
        out.push_str(&format::tbdata_lines(&row));
    }
    Ok(out)
}

fn encode_multilinear(model: &MaterialModel, material_id: u32) -> Result<String> {
    let mut strain = None;
    let mut temperature = None;
    for parameter in model.independent_parameters() {
        match parameter.name.as_str() {
            PLASTIC_STRAIN => strain = Some(parameter),
            TEMPERATURE => temperature = Some(parameter),
            _ => {
                return Err(MapdlError::unsupported(format!(
                    "multilinear isotropic hardening tabulated over {}",
                    parameter_names(model.independent_parameters())
                )));
            }
        }
    }
    let strain = strain.ok_or_else(|| MaterialError::MissingValue {
        model: model.name().to_string(),
        field: PLASTIC_STRAIN.to_string(),
    })?;
    let stress = required(model, "stress")?;

    let mut out = format::tb_header("PLASTIC", material_id, "MISO");
    let mut current = None;
    for r in 0..stress.len().max(strain.values.len()) {
        if let Some(t) = temperature.and_then(|p| p.values.at(r))
            && current != Some(t)
        {
            out.push_str(&format::tbtemp_line(t));
            current = Some(t);
        }
        if let (Some(x), Some(y)) = (strain.values.at(r), stress.at(r)) {
            out.push_str(&format::tbpt_line("PLASTIC", x, y));
        }
    }
    Ok(out)
}

fn encode_zero_thermal_strain(model: &MaterialModel, material_id: u32) -> Result<String> {
    let value = required(model, "zero_thermal_strain_reference_temperature")?;
    let value = value.at(0).ok_or_else(|| MaterialError::EmptyValue {
        name: "zero_thermal_strain_reference_temperature".to_string(),
    })?;
    Ok(format::mpamod_line(material_id, value))
}

fn constant_at(values: &[f64], row: usize) -> Option<f64> {
    match values.len() {
        1 => values.first().copied(),
        _ => values.get(row).copied(),
    }
}

fn encode_user_material(model: &MaterialModel, material_id: u32) -> Result<String> {
    let temperature = temperature_only(model, "user material")?;
    let mut parameters: Vec<&UserParameter> = model.user_parameters().iter().collect();
    parameters.sort_by_key(|p| p.user_mat_constant);
    let rows = model.row_count().max(1);

    let mut out: String = parameters
        .iter()
        .map(|p| format::usermat_comment(p.user_mat_constant, &p.name))
        .collect();
    out.push_str(&format::tb_user_header(material_id, rows, parameters.len()));
    for r in 0..rows {
        if let Some(t) = temperature.and_then(|p| p.values.at(r)) {
            out.push_str(&format::tbtemp_line(t));
        }
        let row: Vec<f64> = parameters
            .iter()
            .filter_map(|p| constant_at(&p.values, r))
            .collect();
        out.push_str(&format::tbdata_lines(&row));
    }
    Ok(out)
}

/// `TBIN` lines for `options`; `Program Controlled` bounds resolve to the
/// series minimum (lower) and maximum (upper).
fn encode_interpolation(
    options: &InterpolationOptions,
    parameters: &[IndependentParameter],
) -> Result<String> {
    let algorithm = format::code_for(ALGORITHMS, &options.algorithm_type).ok_or_else(|| {
        MapdlError::unsupported(format!(
            "interpolation algorithm '{}'",
            options.algorithm_type
        ))
    })?;
    let mut out = format::tbin_code("ALGO", algorithm);
    out.push_str(&format::tbin_switch("NORM", options.normalized));
    out.push_str(&format::tbin_switch("CACH", options.cached));
    if let Some(extrapolation) = &options.extrapolation_type {
        let code = format::code_for(EXTRAPOLATIONS, extrapolation).ok_or_else(|| {
            MapdlError::unsupported(format!("extrapolation type '{extrapolation}'"))
        })?;
        out.push_str(&format::tbin_code("EXTR", code));
    }

    for (parameter, code) in parameters.iter().zip(field_codes(parameters)) {
        if let Some(default) = parameter.default_value {
            out.push_str(&format::tbin_default(&code, default));
        }
        if parameter.lower_limit.is_some() || parameter.upper_limit.is_some() {
            let lower = parameter
                .lower_limit
                .and_then(|b| b.resolve(parameter.values.min()));
            let upper = parameter
                .upper_limit
                .and_then(|b| b.resolve(parameter.values.max()));
            out.push_str(&format::tbin_bounds(&code, lower, upper));
        }
    }
    Ok(out)
}
