//! MAPDL command reader.
//!
//! Replays a command script into one [`Material`] per material id. `MP` and
//! `MPDATA` labels are matched back to model kinds through the schema
//! tables; `TB` tables are decoded by label and option. Units survive only
//! where the script carries them (`MP`/`MPDATA` trailing comments and
//! field declarations); elsewhere quantities come back unitless. `TBIN`
//! lines apply to the open `TB` table, or else to the `MP`/`MPDATA`
//! property written just before them.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::path::Path;

use log::{debug, warn};
use mat_model::schema::{BILINEAR, DEFINITION, PLASTIC_STRAIN, SEPARATED_HILL_POTENTIALS};
use mat_model::{
    ANISOTROPIC_COLUMN_LEN, Bound, IndependentParameter, InterpolationOptions, Material,
    MaterialModel, ModelKind, Quantity, TEMPERATURE, UserParameter,
};

use crate::commands::{Command, Script, ScriptLine};
use crate::error::{MapdlError, Result};
use crate::format::{self, ALGORITHMS, EXTRAPOLATIONS};
use crate::writer::{field_codes, is_standard};

const ANISOTROPIC_VALUES: usize = ANISOTROPIC_COLUMN_LEN * (ANISOTROPIC_COLUMN_LEN + 1) / 2;

/// Highest starting location accepted on `MPTEMP`, `MPDATA` and `TBDATA`.
const MAX_LOCATION: u32 = 100_000;

/// Field code (`UF01`) → declared parameter name and unit.
type FieldNames = HashMap<String, (String, String)>;

pub fn read_str(raw: &str) -> Result<Vec<Material>> {
    read_script(&Script::parse_str(raw)?)
}

pub fn read_file(path: impl AsRef<Path>) -> Result<Vec<Material>> {
    read_script(&Script::parse_file(path)?)
}

pub fn read_script(script: &Script) -> Result<Vec<Material>> {
    let mut collector = Collector::default();
    for line in &script.lines {
        collector.line(line)?;
    }
    collector.finish()
}

#[derive(Debug)]
struct Entry {
    id: u32,
    blocks: Vec<Block>,
}

#[derive(Debug)]
enum Block {
    Property(Property),
    Table(Table),
    Amod(f64),
}

#[derive(Debug)]
struct Property {
    label: String,
    values: Vec<f64>,
    unit: String,
    /// `MPTEMP` table in effect for `MPDATA`; `None` for `MP`.
    temperatures: Option<Vec<f64>>,
    interpolation: Vec<Command>,
}

#[derive(Debug)]
struct Table {
    label: String,
    option: String,
    line: usize,
    events: Vec<Event>,
    interpolation: Vec<Command>,
    user_names: Vec<(usize, String)>,
}

#[derive(Debug)]
enum Event {
    Field(String, f64),
    Temperature(f64),
    Data(usize, Vec<f64>),
    Point(f64, f64),
}

impl Table {
    fn error(&self, message: impl Into<String>) -> MapdlError {
        MapdlError::Parse {
            line: self.line,
            message: format!("TB,{}: {}", self.label, message.into()),
        }
    }
}

#[derive(Debug, Default)]
struct Collector {
    entries: Vec<Entry>,
    temperatures: Vec<f64>,
    fields: FieldNames,
    user_names: Vec<(usize, String)>,
    /// Entry and block index of the table receiving `TB*` data.
    table: Option<(usize, usize)>,
    /// Entry and block index of the last `MP`/`MPDATA` property.
    property: Option<(usize, usize)>,
}

impl Collector {
    fn entry(&mut self, id: u32) -> usize {
        match self.entries.iter().position(|e| e.id == id) {
            Some(index) => index,
            None => {
                self.entries.push(Entry {
                    id,
                    blocks: Vec::new(),
                });
                self.entries.len() - 1
            }
        }
    }

    fn line(&mut self, line: &ScriptLine) -> Result<()> {
        match line {
            ScriptLine::Comment { text, .. } => {
                if let Some(name) = parse_usermat_comment(text) {
                    self.user_names.push(name);
                }
            }
            ScriptLine::Declaration(decl) => {
                self.fields.insert(
                    decl.value.to_ascii_uppercase(),
                    (decl.name.clone(), decl.comment.clone().unwrap_or_default()),
                );
            }
            ScriptLine::Command(cmd) => self.command(cmd)?,
        }
        Ok(())
    }

    fn command(&mut self, cmd: &Command) -> Result<()> {
        match cmd.keyword.as_str() {
            "MP" => {
                self.table = None;
                let label = label(cmd)?;
                let id = cmd.require_integer(1, "material id")?;
                let value = cmd.require_number(2, "property value")?;
                let index = self.entry(id);
                let blocks = &mut self.entries[index].blocks;
                blocks.push(Block::Property(Property {
                    label,
                    values: vec![value],
                    unit: cmd.comment.clone().unwrap_or_default(),
                    temperatures: None,
                    interpolation: Vec::new(),
                }));
                self.property = Some((index, blocks.len() - 1));
            }
            "MPTEMP" => {
                self.table = None;
                self.property = None;
                match cmd.integer(0)? {
                    None => self.temperatures.clear(),
                    Some(sloc) => {
                        let sloc = location(cmd, sloc)?;
                        if sloc <= 1 {
                            self.temperatures.clear();
                        }
                        place(&mut self.temperatures, sloc, &cmd.numbers_from(1)?);
                    }
                }
            }
            "MPDATA" => {
                self.table = None;
                let label = label(cmd)?;
                let id = cmd.require_integer(1, "material id")?;
                let sloc = location(cmd, cmd.require_integer(2, "starting location")?)?;
                let values = cmd.numbers_from(3)?;
                let index = self.entry(id);
                let blocks = &mut self.entries[index].blocks;
                match blocks.last_mut() {
                    Some(Block::Property(p))
                        if sloc > 1 && p.label == label && p.temperatures.is_some() =>
                    {
                        place(&mut p.values, sloc, &values);
                    }
                    _ => {
                        let mut data = Vec::new();
                        place(&mut data, sloc, &values);
                        blocks.push(Block::Property(Property {
                            label,
                            values: data,
                            unit: cmd.comment.clone().unwrap_or_default(),
                            temperatures: Some(self.temperatures.clone()),
                            interpolation: Vec::new(),
                        }));
                    }
                }
                self.property = Some((index, blocks.len() - 1));
            }
            "MPAMOD" => {
                self.table = None;
                self.property = None;
                let id = cmd.require_integer(0, "material id")?;
                let value = cmd.require_number(1, "reference temperature")?;
                let index = self.entry(id);
                self.entries[index].blocks.push(Block::Amod(value));
            }
            "TB" => {
                self.property = None;
                let label = label(cmd)?;
                let id = cmd.require_integer(1, "material id")?;
                let option = if label == "USER" {
                    String::new()
                } else {
                    cmd.field(4).unwrap_or_default().to_ascii_uppercase()
                };
                let index = self.entry(id);
                let blocks = &mut self.entries[index].blocks;
                blocks.push(Block::Table(Table {
                    label,
                    option,
                    line: cmd.line,
                    events: Vec::new(),
                    interpolation: Vec::new(),
                    user_names: std::mem::take(&mut self.user_names),
                }));
                self.table = Some((index, blocks.len() - 1));
            }
            "TBFIELD" => {
                let code = cmd
                    .field(0)
                    .ok_or_else(|| cmd.error("missing field name"))?
                    .trim_matches('\'')
                    .to_ascii_uppercase();
                let value = cmd.require_number(1, "field value")?;
                self.current_table(cmd)?.events.push(Event::Field(code, value));
            }
            "TBTEMP" => {
                let value = cmd.require_number(0, "temperature")?;
                self.current_table(cmd)?.events.push(Event::Temperature(value));
            }
            "TBDATA" => {
                let sloc = location(cmd, cmd.require_integer(0, "starting location")?)?;
                let values = cmd.numbers_from(1)?;
                self.current_table(cmd)?.events.push(Event::Data(sloc, values));
            }
            "TBPT" => {
                let start = match cmd.field(0) {
                    Some(first) if first.parse::<f64>().is_ok() => 0,
                    _ => 1,
                };
                let x = cmd.require_number(start, "point abscissa")?;
                let y = cmd.require_number(start + 1, "point ordinate")?;
                self.current_table(cmd)?.events.push(Event::Point(x, y));
            }
            "TBIN" => {
                if self.table.is_some() {
                    self.current_table(cmd)?.interpolation.push(cmd.clone());
                } else if let Some(property) = self.current_property() {
                    property.interpolation.push(cmd.clone());
                } else {
                    debug!(
                        "TBIN on line {} follows no table or property, ignoring",
                        cmd.line
                    );
                }
            }
            other => debug!("ignoring {other} on line {}", cmd.line),
        }
        Ok(())
    }

    fn current_table(&mut self, cmd: &Command) -> Result<&mut Table> {
        let located = self
            .table
            .and_then(|(entry, block)| self.entries.get_mut(entry)?.blocks.get_mut(block));
        match located {
            Some(Block::Table(table)) => Ok(table),
            _ => Err(cmd.error("no active TB table")),
        }
    }

    fn current_property(&mut self) -> Option<&mut Property> {
        let (entry, block) = self.property?;
        match self.entries.get_mut(entry)?.blocks.get_mut(block)? {
            Block::Property(property) => Some(property),
            _ => None,
        }
    }

    fn finish(self) -> Result<Vec<Material>> {
        self.entries
            .iter()
            .map(|entry| decode_entry(entry, &self.fields))
            .collect()
    }
}

fn label(cmd: &Command) -> Result<String> {
    cmd.field(0)
        .map(str::to_ascii_uppercase)
        .ok_or_else(|| cmd.error("missing label"))
}

/// `UserMat Constant <n>: <name>`
fn parse_usermat_comment(text: &str) -> Option<(usize, String)> {
    let (number, name) = text.strip_prefix("UserMat Constant ")?.split_once(':')?;
    Some((number.trim().parse().ok()?, name.trim().to_string()))
}

fn location(cmd: &Command, sloc: u32) -> Result<usize> {
    if sloc > MAX_LOCATION {
        return Err(cmd.error(format!(
            "starting location {sloc} is beyond {MAX_LOCATION}"
        )));
    }
    Ok(sloc as usize)
}

/// Writes `values` starting at the 1-based location `sloc`.
fn place(target: &mut Vec<f64>, sloc: usize, values: &[f64]) {
    let start = sloc.saturating_sub(1);
    let end = start + values.len();
    if target.len() < end {
        target.resize(end, 0.0);
    }
    target[start..end].copy_from_slice(values);
}

fn decode_entry(entry: &Entry, fields: &FieldNames) -> Result<Material> {
    let mut constants = Vec::new();
    let mut series = Vec::new();
    let mut models: Vec<(usize, MaterialModel)> = Vec::new();

    for (position, block) in entry.blocks.iter().enumerate() {
        match block {
            Block::Property(p) if p.temperatures.is_some() => series.push((position, p)),
            Block::Property(p) => constants.push((position, p)),
            Block::Table(table) => {
                if let Some(model) = decode_table(table, fields)? {
                    models.push((position, model));
                }
            }
            Block::Amod(value) => models.push((
                position,
                MaterialModel::with_defaults(ModelKind::ZeroThermalStrainReferenceTemperature)
                    .with_field(
                        "zero_thermal_strain_reference_temperature",
                        Quantity::scalar(*value, ""),
                    )?,
            )),
        }
    }
    models.extend(assemble_properties(constants)?);
    models.extend(assemble_properties(series)?);
    models.sort_by_key(|(position, _)| *position);

    let models = models.into_iter().map(|(_, m)| m).collect();
    Ok(Material::new(format!("Material {}", entry.id), models).with_material_id(entry.id))
}

/// Matches property labels to `MP` kinds, largest label set first.
fn assemble_properties(
    mut remaining: Vec<(usize, &Property)>,
) -> Result<Vec<(usize, MaterialModel)>> {
    let mut kinds: Vec<ModelKind> = ModelKind::ALL
        .iter()
        .copied()
        .filter(|k| k.is_mp_property())
        .collect();
    kinds.sort_by_key(|k| Reverse(k.schema().fields.len()));

    let mut models = Vec::new();
    for kind in kinds {
        let schema = kind.schema();
        let complete = schema
            .fields
            .iter()
            .all(|f| remaining.iter().any(|(_, p)| f.mapdl_label == Some(p.label.as_str())));
        if !complete {
            continue;
        }

        let mut model = MaterialModel::with_defaults(kind);
        let mut position = usize::MAX;
        let mut temperatures = None;
        let mut interpolation = Vec::new();
        for spec in schema.fields {
            let Some(index) = remaining
                .iter()
                .position(|(_, p)| spec.mapdl_label == Some(p.label.as_str()))
            else {
                continue;
            };
            let (at, property) = remaining.remove(index);
            position = position.min(at);
            if temperatures.is_none() {
                temperatures = property.temperatures.clone();
            }
            interpolation.extend(property.interpolation.iter().cloned());
            model.set_field(
                spec.attribute,
                Quantity::new(property.values.clone(), property.unit.clone()),
            )?;
        }
        if let Some(mut temperatures) = temperatures {
            temperatures.truncate(model.row_count());
            model
                .independent_parameters_mut()
                .push(IndependentParameter::temperature(temperatures, ""));
        }
        apply_interpolation(&mut model, &interpolation)?;
        models.push((position, model));
    }

    for (_, property) in remaining {
        warn!(
            "no material model uses MAPDL label '{}', skipping",
            property.label
        );
    }
    Ok(models)
}

fn decode_table(table: &Table, fields: &FieldNames) -> Result<Option<MaterialModel>> {
    let mut model = match (table.label.as_str(), table.option.as_str()) {
        ("USER", _) => decode_user_material(table),
        ("ELASTIC", "AELS") => decode_anisotropic(table)?,
        ("HILL", option) => decode_hill(table, option == "PC", fields)?,
        ("PLASTIC", "BISO") => decode_bilinear(table)?,
        ("PLASTIC", "MISO") => decode_multilinear(table)?,
        (label, option) => {
            let groups = field_groups(table);
            let Some(kind) = standard_kind(table, &groups) else {
                warn!(
                    "no material model for TB,{label} option '{option}' (line {}), skipping",
                    table.line
                );
                return Ok(None);
            };
            decode_standard(kind, table, &groups, fields)?
        }
    };
    apply_interpolation(&mut model, &table.interpolation)?;
    Ok(Some(model))
}

#[derive(Debug, Default)]
struct Group {
    fields: Vec<(String, f64)>,
    data: Vec<f64>,
}

/// Splits a table into `TBFIELD` groups, each with its `TBDATA` values.
fn field_groups(table: &Table) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();
    for event in &table.events {
        match event {
            Event::Field(code, value) => {
                if groups.last().is_none_or(|g| !g.data.is_empty()) {
                    groups.push(Group::default());
                }
                if let Some(group) = groups.last_mut() {
                    match group.fields.iter_mut().find(|(c, _)| c == code) {
                        Some(slot) => slot.1 = *value,
                        None => group.fields.push((code.clone(), *value)),
                    }
                }
            }
            Event::Data(sloc, values) => {
                if groups.is_empty() {
                    groups.push(Group::default());
                }
                if let Some(group) = groups.last_mut() {
                    place(&mut group.data, *sloc, values);
                }
            }
            Event::Temperature(_) | Event::Point(..) => {}
        }
    }
    groups
}

fn field_name(code: &str, fields: &FieldNames) -> (String, String) {
    if code == "TEMP" {
        return (TEMPERATURE.to_string(), String::new());
    }
    fields
        .get(code)
        .cloned()
        .unwrap_or_else(|| (code.to_string(), String::new()))
}

/// Splits grouped data into rows of `width` and collects each row's field values.
fn tabulate(
    table: &Table,
    groups: &[Group],
    width: usize,
    fields: &FieldNames,
) -> Result<(Vec<Vec<f64>>, Vec<IndependentParameter>)> {
    if width == 0 {
        return Err(table.error("table has no value columns"));
    }
    let mut codes: Vec<&str> = Vec::new();
    for group in groups {
        for (code, _) in &group.fields {
            if !codes.contains(&code.as_str()) {
                codes.push(code);
            }
        }
    }

    let mut columns = vec![Vec::new(); width];
    let mut series = vec![Vec::new(); codes.len()];
    for group in groups {
        if group.data.len() % width != 0 {
            return Err(table.error(format!(
                "{} values do not fill rows of {width}",
                group.data.len()
            )));
        }
        for row in group.data.chunks(width) {
            for (column, value) in columns.iter_mut().zip(row) {
                column.push(*value);
            }
            for (values, code) in series.iter_mut().zip(&codes) {
                let value = group
                    .fields
                    .iter()
                    .find(|(c, _)| c.as_str() == *code)
                    .map(|(_, v)| *v)
                    .ok_or_else(|| table.error(format!("row without TBFIELD {code}")))?;
                values.push(value);
            }
        }
    }

    let parameters = codes
        .iter()
        .zip(series)
        .map(|(code, values)| {
            let (name, unit) = field_name(code, fields);
            IndependentParameter::new(name, Quantity::new(values, unit))
        })
        .collect();
    Ok((columns, parameters))
}

fn table_width(kind: ModelKind) -> usize {
    kind.schema()
        .fields
        .iter()
        .filter(|f| f.mapdl_label.is_some())
        .count()
}

/// Standard kind written to this `TB` label and option whose field count
/// fills every group, widest first.
fn standard_kind(table: &Table, groups: &[Group]) -> Option<ModelKind> {
    let mut kinds: Vec<ModelKind> = ModelKind::ALL
        .iter()
        .copied()
        .filter(|k| {
            is_standard(*k)
                && k.schema()
                    .table
                    .is_some_and(|t| t.label == table.label && t.option == table.option)
        })
        .collect();
    kinds.sort_by_key(|k| Reverse(table_width(*k)));
    kinds.into_iter().find(|k| {
        let width = table_width(*k);
        width > 0 && groups.iter().all(|g| g.data.len() % width == 0)
    })
}

fn decode_standard(
    kind: ModelKind,
    table: &Table,
    groups: &[Group],
    fields: &FieldNames,
) -> Result<MaterialModel> {
    let specs: Vec<_> = kind
        .schema()
        .fields
        .iter()
        .filter(|f| f.mapdl_label.is_some())
        .collect();
    let (columns, parameters) = tabulate(table, groups, specs.len(), fields)?;

    let mut model = MaterialModel::with_defaults(kind);
    for (spec, values) in specs.iter().zip(columns) {
        model.set_field(spec.attribute, Quantity::new(values, ""))?;
    }
    model.independent_parameters_mut().extend(parameters);
    Ok(model)
}

/// Position of entry (`row`, `col`) in the column-major lower triangle.
fn lower_index(row: usize, col: usize) -> usize {
    let (r, c) = if row >= col { (row, col) } else { (col, row) };
    c * (2 * ANISOTROPIC_COLUMN_LEN + 1 - c) / 2 + (r - c)
}

fn decode_anisotropic(table: &Table) -> Result<MaterialModel> {
    let mut values = Vec::new();
    for event in &table.events {
        if let Event::Data(sloc, data) = event {
            place(&mut values, *sloc, data);
        }
    }
    if values.len() != ANISOTROPIC_VALUES {
        return Err(table.error(format!(
            "expected {ANISOTROPIC_VALUES} stiffness values, found {}",
            values.len()
        )));
    }

    let kind = ModelKind::ElasticityAnisotropic;
    let mut model = MaterialModel::with_defaults(kind);
    for (j, spec) in kind.schema().fields.iter().enumerate() {
        let column = (0..ANISOTROPIC_COLUMN_LEN)
            .map(|i| values[lower_index(i, j)])
            .collect();
        model.set_field(spec.attribute, Quantity::new(column, ""))?;
    }
    Ok(model)
}

fn decode_hill(table: &Table, separated: bool, fields: &FieldNames) -> Result<MaterialModel> {
    let width = if separated { 12 } else { 6 };
    let groups = field_groups(table);
    let (columns, parameters) = tabulate(table, &groups, width, fields)?;
    if let Some(p) = parameters.iter().find(|p| !p.is_temperature()) {
        return Err(MapdlError::unsupported(format!(
            "Hill yield criterion tabulated over '{}'",
            p.name
        )));
    }

    let kind = ModelKind::HillYieldCriterion;
    let separated = if separated { "Yes" } else { "No" };
    let mut model = MaterialModel::new(kind, [(SEPARATED_HILL_POTENTIALS, separated)])?;
    for (spec, values) in kind.schema().fields.iter().zip(columns) {
        model.set_field(spec.attribute, Quantity::new(values, ""))?;
    }
    model.independent_parameters_mut().extend(parameters);
    Ok(model)
}

fn decode_bilinear(table: &Table) -> Result<MaterialModel> {
    let mut temperature = None;
    let mut temperatures = Vec::new();
    let mut yield_strength = Vec::new();
    let mut tangent_modulus = Vec::new();
    for event in &table.events {
        match event {
            Event::Temperature(t) => temperature = Some(*t),
            Event::Data(_, values) => match values.as_slice() {
                [ys, tm] => {
                    yield_strength.push(*ys);
                    tangent_modulus.push(*tm);
                    temperatures.extend(temperature);
                }
                _ => {
                    return Err(table.error(
                        "bilinear data needs a yield strength and a tangent modulus",
                    ));
                }
            },
            _ => {}
        }
    }

    let mut model =
        MaterialModel::new(ModelKind::IsotropicHardening, [(DEFINITION, BILINEAR)])?
            .with_field("yield_strength", Quantity::new(yield_strength, ""))?
            .with_field("tangent_modulus", Quantity::new(tangent_modulus, ""))?;
    if !temperatures.is_empty() {
        model
            .independent_parameters_mut()
            .push(IndependentParameter::temperature(temperatures, ""));
    }
    Ok(model)
}

fn decode_multilinear(table: &Table) -> Result<MaterialModel> {
    let mut temperature = None;
    let mut temperatures = Vec::new();
    let mut strain = Vec::new();
    let mut stress = Vec::new();
    for event in &table.events {
        match event {
            Event::Temperature(t) => temperature = Some(*t),
            Event::Point(x, y) => {
                strain.push(*x);
                stress.push(*y);
                temperatures.extend(temperature);
            }
            _ => {}
        }
    }

    let mut model = MaterialModel::with_defaults(ModelKind::IsotropicHardening)
        .with_field("stress", Quantity::new(stress, ""))?
        .with_independent_parameter(IndependentParameter::new(
            PLASTIC_STRAIN,
            Quantity::new(strain, ""),
        ));
    if !temperatures.is_empty() {
        model
            .independent_parameters_mut()
            .push(IndependentParameter::temperature(temperatures, ""));
    }
    Ok(model)
}

fn decode_user_material(table: &Table) -> MaterialModel {
    let mut temperatures = Vec::new();
    let mut rows: Vec<Vec<f64>> = Vec::new();
    for event in &table.events {
        match event {
            Event::Temperature(t) => {
                temperatures.push(*t);
                rows.push(Vec::new());
            }
            Event::Data(sloc, values) => {
                if rows.is_empty() {
                    rows.push(Vec::new());
                }
                if let Some(row) = rows.last_mut() {
                    place(row, *sloc, values);
                }
            }
            _ => {}
        }
    }

    let mut model = MaterialModel::with_defaults(ModelKind::ModelCoefficients);
    let constants = rows.iter().map(Vec::len).max().unwrap_or(0);
    for index in 0..constants {
        let number = index + 1;
        let name = table
            .user_names
            .iter()
            .find(|(n, _)| *n == number)
            .map(|(_, name)| name.clone())
            .unwrap_or_else(|| format!("Constant {number}"));
        let values = rows
            .iter()
            .map(|row| row.get(index).copied().unwrap_or_default())
            .collect();
        model.push_user_parameter(UserParameter::new(name, values, number));
    }
    if !temperatures.is_empty() {
        model
            .independent_parameters_mut()
            .push(IndependentParameter::temperature(temperatures, ""));
    }
    model
}

fn is_on(cmd: &Command) -> bool {
    cmd.field(1).is_some_and(|v| v.eq_ignore_ascii_case("ON"))
}

fn apply_interpolation(model: &mut MaterialModel, commands: &[Command]) -> Result<()> {
    if commands.is_empty() {
        return Ok(());
    }
    let mut options = InterpolationOptions::new("");
    let codes = field_codes(model.independent_parameters());

    for cmd in commands {
        let key = cmd.field(0).unwrap_or_default().to_ascii_uppercase();
        match key.as_str() {
            "ALGO" => {
                let code = cmd.field(1).unwrap_or_default();
                options.algorithm_type = format::name_for(ALGORITHMS, code)
                    .map_or_else(|| code.to_string(), str::to_string);
            }
            "NORM" => options.normalized = is_on(cmd),
            "CACH" => options.cached = is_on(cmd),
            "EXTR" => {
                let code = cmd.field(1).unwrap_or_default();
                options.extrapolation_type = Some(
                    format::name_for(EXTRAPOLATIONS, code)
                        .map_or_else(|| code.to_string(), str::to_string),
                );
            }
            "DEFA" | "BNDS" => {
                let code = cmd.field(1).unwrap_or_default().to_ascii_uppercase();
                let parameter = codes
                    .iter()
                    .position(|c| *c == code)
                    .and_then(|i| model.independent_parameters_mut().get_mut(i));
                let Some(parameter) = parameter else {
                    warn!("TBIN,{key} refers to unknown field '{code}' (line {})", cmd.line);
                    continue;
                };
                if key == "DEFA" {
                    parameter.default_value = cmd.number(2)?;
                } else {
                    parameter.lower_limit = cmd.number(2)?.map(Bound::Value);
                    parameter.upper_limit = cmd.number(3)?.map(Bound::Value);
                }
            }
            other => debug!("ignoring TBIN,{other} on line {}", cmd.line),
        }
    }
    model.set_interpolation_options(Some(options));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lower_triangle_indices_are_column_major() {
        assert_eq!(lower_index(0, 0), 0);
        assert_eq!(lower_index(5, 0), 5);
        assert_eq!(lower_index(1, 1), 6);
        assert_eq!(lower_index(2, 2), 11);
        assert_eq!(lower_index(5, 5), 20);
        assert_eq!(lower_index(0, 3), lower_index(3, 0));
    }

    #[test]
    fn reads_constant_properties_per_material() {
        let src = "MP,EX,2,1000000.0, , , ,  ! Pa\n\
                   MP,PRXY,2,0.3, , , ,  ! \n\
                   MP,DENS,3,7850.0, , , ,  ! kg*m^-3\n";
        let materials = read_str(src).unwrap();
        assert_eq!(materials.len(), 2);
        assert_eq!(materials[0].name, "Material 2");
        assert_eq!(materials[0].material_id, Some(2));

        let elasticity = materials[0]
            .get_model_by_kind(ModelKind::ElasticityIsotropic)
            .unwrap();
        assert_eq!(
            elasticity.field("youngs_modulus"),
            Some(&Quantity::scalar(1.0e6, "Pa"))
        );
        assert_eq!(elasticity.field("poissons_ratio").unwrap().unit, "");
        assert!(materials[1].get_model_by_kind(ModelKind::Density).is_some());
    }

    #[test]
    fn prefers_largest_matching_label_set() {
        let src = "MP,ALPX,1,1e-05\nMP,ALPY,1,2e-05\nMP,ALPZ,1,3e-05\nMP,KXX,1,40.0\n";
        let materials = read_str(src).unwrap();
        let kinds: Vec<ModelKind> = materials[0].models().iter().map(|m| m.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                ModelKind::CoefficientOfThermalExpansionOrthotropic,
                ModelKind::ThermalConductivityIsotropic,
                ModelKind::ReferenceTemperature,
            ]
        );
    }

    #[test]
    fn unknown_labels_are_skipped() {
        let materials = read_str("MP,MURX,1,1.0\nMP,DENS,1,2.0\n").unwrap();
        assert_eq!(materials[0].models().len(), 2);
    }

    #[test]
    fn tb_data_without_table_is_an_error() {
        let err = read_str("TBDATA,1,1.0\n").unwrap_err();
        assert!(matches!(err, MapdlError::Parse { line: 1, .. }));
    }

    #[test]
    fn tbin_after_a_property_applies_to_its_model() {
        let materials = read_str("MP,DENS,1,2.0\nTBIN,ALGO,LMUL\n").unwrap();
        let options = materials[0]
            .get_model_by_kind(ModelKind::Density)
            .unwrap()
            .interpolation_options()
            .unwrap();
        assert_eq!(options.algorithm_type, "Linear Multivariate");
    }

    #[test]
    fn tbin_before_any_property_is_ignored() {
        let materials = read_str("TBIN,ALGO,LMUL\nMP,DENS,1,2.0\n").unwrap();
        assert!(
            materials[0]
                .get_model_by_kind(ModelKind::Density)
                .unwrap()
                .interpolation_options()
                .is_none()
        );
    }

    #[test]
    fn tbin_after_mpamod_is_ignored() {
        let materials = read_str("MP,DENS,1,2.0\nMPAMOD,1,20.0\nTBIN,ALGO,LMUL\n").unwrap();
        assert!(
            materials[0]
                .get_model_by_kind(ModelKind::Density)
                .unwrap()
                .interpolation_options()
                .is_none()
        );
    }

    #[test]
    fn oversized_starting_locations_are_rejected() {
        for src in [
            "TB,ELASTIC,1,,,ISOT\nTBDATA,4000000000,1.0\n",
            "MPTEMP,1,20.0\nMPDATA,DENS,1,4000000000,1.0\n",
            "MPTEMP,4000000000,20.0\n",
        ] {
            let err = read_str(src).unwrap_err();
            assert!(matches!(err, MapdlError::Parse { .. }), "{src}");
            assert!(err.to_string().contains("starting location"), "{src}");
        }
    }

    #[test]
    fn parses_usermat_comments() {
        assert_eq!(
            parse_usermat_comment("UserMat Constant 3: Bulk Modulus"),
            Some((3, "Bulk Modulus".to_string()))
        );
        assert_eq!(parse_usermat_comment("Material 1"), None);
    }
}
