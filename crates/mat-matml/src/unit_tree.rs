//! `Units/Unit[power]/Name` sub-trees of MatML metadata.

use mat_model::units::{format_unit_factors, parse_unit_factors};
use roxmltree::Node;

use crate::xml::Element;

/// `<Units>` for `unit`, or `<Unitless />` when it has no factors.
pub fn unit_element(unit: &str) -> Element {
    let factors = parse_unit_factors(unit);
    if factors.is_empty() {
        return Element::new("Unitless");
    }
    let mut units = Element::new("Units");
    for (symbol, power) in factors {
        let mut element = Element::new("Unit");
        if power != 1 {
            element = element.attr("power", power.to_string());
        }
        units.push(element.child(Element::with_text("Name", symbol)));
    }
    units
}

/// Unit expression of a `ParameterDetails` node; empty when unitless.
pub fn unit_of(details: Node<'_, '_>) -> String {
    let Some(units) = details.children().find(|n| n.has_tag_name("Units")) else {
        return String::new();
    };
    let factors: Vec<(String, i32)> = units
        .children()
        .filter(|n| n.has_tag_name("Unit"))
        .filter_map(|unit| {
            let name = unit
                .children()
                .find(|n| n.has_tag_name("Name"))
                .and_then(|n| n.text())?
                .trim()
                .to_string();
            let power = unit
                .attribute("power")
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(1);
            Some((name, power))
        })
        .collect();
    format_unit_factors(&factors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unitless_marker_for_empty_units() {
        assert_eq!(unit_element("").name, "Unitless");
        assert_eq!(unit_element("Unitless").name, "Unitless");
    }

    #[test]
    fn unit_tree_roundtrip() {
        for unit in ["kg*m^-3", "W*m^-1*C^-1", "C", "C^-1", "J*kg^-1*C^-1"] {
            let xml = format!(
                "<ParameterDetails id=\"pa0\"><Name>x</Name>{}</ParameterDetails>",
                unit_element(unit)
            );
            let doc = roxmltree::Document::parse(&xml).unwrap();
            assert_eq!(unit_of(doc.root_element()), unit);
        }
    }

    #[test]
    fn power_one_has_no_attribute() {
        let e = unit_element("kg*m^-3");
        assert_eq!(e.children[0].attribute("power"), None);
        assert_eq!(e.children[1].attribute("power"), Some("-3"));
    }
}
