//! Static unit registry.
//!
//! Maps unit symbols to their physical dimension, expressed as integer
//! exponents over (length, mass, time, temperature, current,
//! luminous intensity, substance, angle). Compound units such as
//! `kg*m^-3` or `W m^-1 C^-1` are resolved factor by factor.

/// Exponents over the eight base dimensions.
pub type Dimension = [i32; 8];

pub const DIMENSIONLESS: Dimension = [0; 8];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasuredUnit {
    pub symbol: &'static str,
    pub name: &'static str,
    pub dimension: Dimension,
}

const fn unit(symbol: &'static str, name: &'static str, dimension: Dimension) -> MeasuredUnit {
    MeasuredUnit {
        symbol,
        name,
        dimension,
    }
}

//                               L   M   T   Θ   I   J   N   A
const LENGTH: Dimension = [1, 0, 0, 0, 0, 0, 0, 0];
const MASS: Dimension = [0, 1, 0, 0, 0, 0, 0, 0];
const TIME: Dimension = [0, 0, 1, 0, 0, 0, 0, 0];
const TEMPERATURE: Dimension = [0, 0, 0, 1, 0, 0, 0, 0];
const CURRENT: Dimension = [0, 0, 0, 0, 1, 0, 0, 0];
const LUMINOUS: Dimension = [0, 0, 0, 0, 0, 1, 0, 0];
const SUBSTANCE: Dimension = [0, 0, 0, 0, 0, 0, 1, 0];
const ANGLE: Dimension = [0, 0, 0, 0, 0, 0, 0, 1];
const FORCE: Dimension = [1, 1, -2, 0, 0, 0, 0, 0];
const STRESS: Dimension = [-1, 1, -2, 0, 0, 0, 0, 0];
const ENERGY: Dimension = [2, 1, -2, 0, 0, 0, 0, 0];
const POWER: Dimension = [2, 1, -3, 0, 0, 0, 0, 0];
const FREQUENCY: Dimension = [0, 0, -1, 0, 0, 0, 0, 0];
const VOLTAGE: Dimension = [2, 1, -3, 0, -1, 0, 0, 0];
const RESISTANCE: Dimension = [2, 1, -3, 0, -2, 0, 0, 0];

static UNITS: &[MeasuredUnit] = &[
    unit("m", "meter", LENGTH),
    unit("mm", "millimeter", LENGTH),
    unit("cm", "centimeter", LENGTH),
    unit("um", "micrometer", LENGTH),
    unit("km", "kilometer", LENGTH),
    unit("in", "inch", LENGTH),
    unit("ft", "foot", LENGTH),
    unit("kg", "kilogram", MASS),
    unit("g", "gram", MASS),
    unit("t", "tonne", MASS),
    unit("lbm", "pound mass", MASS),
    unit("slug", "slug", MASS),
    unit("s", "second", TIME),
    unit("ms", "millisecond", TIME),
    unit("min", "minute", TIME),
    unit("hr", "hour", TIME),
    unit("K", "kelvin", TEMPERATURE),
    unit("C", "degree Celsius", TEMPERATURE),
    unit("F", "degree Fahrenheit", TEMPERATURE),
    unit("R", "degree Rankine", TEMPERATURE),
    unit("A", "ampere", CURRENT),
    unit("mA", "milliampere", CURRENT),
    unit("cd", "candela", LUMINOUS),
    unit("mol", "mole", SUBSTANCE),
    unit("kmol", "kilomole", SUBSTANCE),
    unit("rad", "radian", ANGLE),
    unit("deg", "degree", ANGLE),
    unit("N", "newton", FORCE),
    unit("kN", "kilonewton", FORCE),
    unit("lbf", "pound force", FORCE),
    unit("Pa", "pascal", STRESS),
    unit("kPa", "kilopascal", STRESS),
    unit("MPa", "megapascal", STRESS),
    unit("GPa", "gigapascal", STRESS),
    unit("psi", "pound per square inch", STRESS),
    unit("ksi", "kilopound per square inch", STRESS),
    unit("bar", "bar", STRESS),
    unit("J", "joule", ENERGY),
    unit("kJ", "kilojoule", ENERGY),
    unit("BTU", "british thermal unit", ENERGY),
    unit("W", "watt", POWER),
    unit("Hz", "hertz", FREQUENCY),
    unit("V", "volt", VOLTAGE),
    unit("ohm", "ohm", RESISTANCE),
];

pub fn get_unit_by_symbol(symbol: &str) -> Option<&'static MeasuredUnit> {
    UNITS.iter().find(|u| u.symbol == symbol)
}

/// Splits a unit expression into `(symbol, power)` factors.
///
/// Factors are separated by `*` or whitespace; a single `/` negates the
/// powers of everything after it. Empty strings and `Unitless` yield no
/// factors.
pub fn parse_unit_factors(expr: &str) -> Vec<(String, i32)> {
    let expr = expr.trim();
    if expr.is_empty() || expr.eq_ignore_ascii_case("unitless") {
        return Vec::new();
    }

    let (numerator, denominator) = match expr.split_once('/') {
        Some((n, d)) => (n, Some(d)),
        None => (expr, None),
    };

    let mut factors = Vec::new();
    collect_factors(numerator, 1, &mut factors);
    if let Some(d) = denominator {
        collect_factors(d, -1, &mut factors);
    }
    factors
}

fn collect_factors(part: &str, sign: i32, out: &mut Vec<(String, i32)>) {
    for token in part.split(|c: char| c == '*' || c.is_whitespace()) {
        let token = token.trim().trim_matches(|c| c == '(' || c == ')');
        if token.is_empty() || token == "1" {
            continue;
        }
        let (symbol, power) = match token.split_once('^') {
            Some((s, p)) => (s, p.trim().parse::<i32>().unwrap_or(1)),
            None => (token, 1),
        };
        out.push((symbol.to_string(), sign * power));
    }
}

/// Renders factors back into the canonical `a*b^-2` form.
pub fn format_unit_factors(factors: &[(String, i32)]) -> String {
    factors
        .iter()
        .map(|(symbol, power)| {
            if *power == 1 {
                symbol.clone()
            } else {
                format!("{symbol}^{power}")
            }
        })
        .collect::<Vec<_>>()
        .join("*")
}

/// Dimension of a compound unit expression, or `None` if any symbol is
/// unknown or an exponent leaves the `i32` range.
pub fn dimension_of(expr: &str) -> Option<Dimension> {
    let mut dim = DIMENSIONLESS;
    for (symbol, power) in parse_unit_factors(expr) {
        let unit = get_unit_by_symbol(&symbol)?;
        for (acc, d) in dim.iter_mut().zip(unit.dimension.iter()) {
            *acc = acc.checked_add(d.checked_mul(power)?)?;
        }
    }
    Some(dim)
}

/// Two units are compatible when both resolve and share a dimension.
pub fn are_units_compatible(a: &str, b: &str) -> bool {
    match (dimension_of(a), dimension_of(b)) {
        (Some(da), Some(db)) => da == db,
        _ => false,
    }
}
