//! Fixed command templates and the row formatter behind them.
//!
//! Absent numeric slots render as empty strings so that a constant `MP`
//! line keeps all five coefficient positions.

use mat_model::format_float;

/// Values per `MPTEMP`/`MPDATA`/`TBDATA` line.
pub const VALUES_PER_LINE: usize = 6;

const MP_SLOTS: usize = 5;

/// MAPDL interpolation algorithm codes by display name.
pub const ALGORITHMS: &[(&str, &str)] = &[
    ("Linear", "LINEAR"),
    ("Linear Multivariate", "LMUL"),
    ("Sibson Natural Neighbor", "SNNB"),
];

/// MAPDL extrapolation codes by display name.
pub const EXTRAPOLATIONS: &[(&str, &str)] = &[
    ("None", "NONE"),
    ("Projection to the Bounding Box", "BBOX"),
    ("Projection to the Convex Hull", "HULL"),
];

pub fn code_for(table: &[(&'static str, &'static str)], name: &str) -> Option<&'static str> {
    table.iter().find(|(n, _)| *n == name).map(|(_, c)| *c)
}

pub fn name_for(table: &[(&'static str, &'static str)], code: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(_, c)| c.eq_ignore_ascii_case(code))
        .map(|(n, _)| *n)
}

/// Joins `values` padded with blank slots up to `width`.
pub fn join_slots(values: &[f64], width: usize, separator: &str) -> String {
    let mut slots: Vec<String> = values.iter().map(|v| format_float(*v)).collect();
    if slots.len() < width {
        slots.resize(width, String::new());
    }
    slots.join(separator)
}

fn optional_slot(value: Option<f64>) -> String {
    value.map(format_float).unwrap_or_default()
}

/// Chunks of at most [`VALUES_PER_LINE`] values with their 1-based start location.
pub fn chunks(values: &[f64]) -> impl Iterator<Item = (usize, &[f64])> {
    values
        .chunks(VALUES_PER_LINE)
        .enumerate()
        .map(|(i, chunk)| (i * VALUES_PER_LINE + 1, chunk))
}

pub fn mp_line(label: &str, material_id: u32, value: f64, unit: &str) -> String {
    format!(
        "MP,{label},{material_id},{} ! {unit}\n",
        join_slots(&[value], MP_SLOTS, ", ")
    )
}

pub fn mptemp_lines(temperatures: &[f64]) -> String {
    chunks(temperatures)
        .map(|(sloc, chunk)| format!("MPTEMP,{sloc},{}\n", join_slots(chunk, VALUES_PER_LINE, ",")))
        .collect()
}

pub fn mpdata_lines(label: &str, material_id: u32, values: &[f64], unit: &str) -> String {
    chunks(values)
        .map(|(sloc, chunk)| {
            format!(
                "MPDATA,{label},{material_id},{sloc},{} ! {unit}\n",
                join_slots(chunk, VALUES_PER_LINE, ",")
            )
        })
        .collect()
}

pub fn tb_header(label: &str, material_id: u32, option: &str) -> String {
    format!("TB,{label},{material_id},,,{option}\n")
}

pub fn tb_user_header(material_id: u32, temperatures: usize, constants: usize) -> String {
    format!("TB,USER,{material_id},{temperatures},{constants}\n")
}

pub fn tbdata_lines(values: &[f64]) -> String {
    chunks(values)
        .map(|(sloc, chunk)| format!("TBDATA,{sloc},{}\n", join_slots(chunk, VALUES_PER_LINE, ",")))
        .collect()
}

pub fn tbfield_line(code: &str, value: f64) -> String {
    format!("TBFIELD,{code},{}\n", format_float(value))
}

pub fn tbtemp_line(temperature: f64) -> String {
    format!("TBTEMP,{}\n", format_float(temperature))
}

/// `TB,PLASTIC` point lines omit the operation slot.
pub fn tbpt_line(label: &str, x: f64, y: f64) -> String {
    if label == "PLASTIC" {
        format!("TBPT,{},{}\n", format_float(x), format_float(y))
    } else {
        format!("TBPT,,{},{}\n", format_float(x), format_float(y))
    }
}

pub fn mpamod_line(material_id: u32, value: f64) -> String {
    format!("MPAMOD,{material_id},{}\n", format_float(value))
}

pub fn declaration_line(name: &str, code: &str, unit: &str) -> String {
    format!("{name} = '{code}' ! {unit}\n")
}

pub fn usermat_comment(constant: usize, name: &str) -> String {
    format!("! UserMat Constant {constant}: {name}\n")
}

pub fn tbin_switch(key: &str, on: bool) -> String {
    format!("TBIN,{key},{}\n", if on { "ON" } else { "OFF" })
}

pub fn tbin_code(key: &str, code: &str) -> String {
    format!("TBIN,{key},{code}\n")
}

pub fn tbin_default(field: &str, value: f64) -> String {
    format!("TBIN,DEFA,{field},{}\n", format_float(value))
}

pub fn tbin_bounds(field: &str, lower: Option<f64>, upper: Option<f64>) -> String {
    format!(
        "TBIN,BNDS,{field},{},{}\n",
        optional_slot(lower),
        optional_slot(upper)
    )
}
