use mat_matml::{MatmlError, read_matml_str, write_matml};
use mat_model::{
    ExportConfig, IndependentParameter, Material, MaterialError, MaterialModel, Quantity,
};
use roxmltree::{Document, Node};

fn elements<'a, 'i>(doc: &'a Document<'i>, name: &'a str) -> Vec<Node<'a, 'i>> {
    doc.descendants().filter(|n| n.has_tag_name(name)).collect()
}

fn name_of<'a>(node: Node<'a, '_>) -> Option<&'a str> {
    node.children()
        .find(|n| n.has_tag_name("Name"))
        .and_then(|n| n.text())
}

#[test]
fn density_with_single_temperature() {
    let model = MaterialModel::density(Quantity::scalar(1.34, "kg*m^-3"))
        .with_independent_parameter(IndependentParameter::temperature(
            vec![7.888609052210118e-31],
            "C",
        ));
    let materials = vec![Material::new("Resin", vec![model])];
    let text = write_matml(&materials, &ExportConfig::default());
    let doc = Document::parse(&text).expect("well-formed output");

    let properties = elements(&doc, "PropertyData");
    assert_eq!(properties.len(), 1);
    let values: Vec<Node> = properties[0]
        .children()
        .filter(|n| n.has_tag_name("ParameterValue"))
        .collect();
    assert_eq!(values.len(), 2);
    assert_eq!(values[0].attribute("parameter"), Some("pa0"));
    assert_eq!(values[1].attribute("parameter"), Some("pa1"));
    assert!(text.contains("<Data>7.888609052210118E-31</Data>"), "{text}");

    let details = elements(&doc, "ParameterDetails");
    let names: Vec<&str> = details.iter().filter_map(|d| name_of(*d)).collect();
    assert_eq!(names, vec!["Density", "Temperature"]);
}

#[test]
fn document_skeleton_and_header() {
    let materials = vec![Material::new("Empty", vec![])];
    let text = write_matml(&materials, &ExportConfig::default());
    assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));

    let doc = Document::parse(&text).unwrap();
    let root = doc.root_element();
    assert_eq!(root.tag_name().name(), "EngineeringData");
    assert_eq!(root.attribute("version"), Some("18.0.0.60"));
    assert_eq!(root.attribute("versiondate"), Some("29.08.2016 15:02:00"));
    let children: Vec<&str> = root
        .children()
        .filter(Node::is_element)
        .map(|n| n.tag_name().name())
        .collect();
    assert_eq!(children, vec!["Notes", "Materials"]);
    let doc_children: Vec<&str> = elements(&doc, "MatML_Doc")[0]
        .children()
        .filter(Node::is_element)
        .map(|n| n.tag_name().name())
        .collect();
    assert_eq!(doc_children, vec!["Material", "Metadata"]);
}

#[test]
fn ids_are_shared_across_materials() {
    let materials = vec![
        Material::new(
            "Steel",
            vec![
                MaterialModel::density(Quantity::scalar(7850.0, "kg*m^-3")),
                MaterialModel::elasticity_isotropic(
                    Quantity::scalar(2.0e11, "Pa"),
                    Quantity::scalar(0.3, ""),
                ),
            ],
        ),
        Material::new(
            "Aluminium",
            vec![MaterialModel::density(Quantity::scalar(2700.0, "kg*m^-3"))],
        ),
    ];
    let text = write_matml(&materials, &ExportConfig::default());
    let doc = Document::parse(&text).unwrap();

    let property_ids: Vec<&str> = elements(&doc, "PropertyData")
        .iter()
        .filter_map(|p| p.attribute("property"))
        .collect();
    assert_eq!(property_ids, vec!["pr0", "pr1", "pr0"]);

    let parameter_ids: Vec<&str> = elements(&doc, "ParameterValue")
        .iter()
        .filter_map(|p| p.attribute("parameter"))
        .collect();
    assert_eq!(parameter_ids, vec!["pa0", "pa1", "pa2", "pa0"]);

    let property_names: Vec<&str> = elements(&doc, "PropertyDetails")
        .iter()
        .filter_map(|d| name_of(*d))
        .collect();
    assert_eq!(property_names, vec!["Density", "Elasticity"]);
}

#[test]
fn unitless_parameters_are_marked() {
    let materials = vec![Material::new(
        "Steel",
        vec![MaterialModel::elasticity_isotropic(
            Quantity::scalar(2.0e11, "Pa"),
            Quantity::scalar(0.3, ""),
        )],
    )];
    let text = write_matml(&materials, &ExportConfig::default());
    let doc = Document::parse(&text).unwrap();
    let poisson = elements(&doc, "ParameterDetails")
        .into_iter()
        .find(|d| name_of(*d) == Some("Poisson's Ratio"))
        .expect("poisson details");
    assert!(poisson.children().any(|n| n.has_tag_name("Unitless")));
}

#[test]
fn qualifier_outside_range_fails_the_read() {
    let text = r#"<EngineeringData><Materials><MatML_Doc>
      <Material><BulkDetails><Name>X</Name>
        <PropertyData property="pr0">
          <Qualifier name="Definition">Trilinear</Qualifier>
          <ParameterValue parameter="pa0" format="float"><Data>1</Data></ParameterValue>
        </PropertyData>
      </BulkDetails></Material>
      <Metadata>
        <ParameterDetails id="pa0"><Name>Stress</Name><Unitless /></ParameterDetails>
        <PropertyDetails id="pr0"><Unitless /><Name>Isotropic Hardening</Name></PropertyDetails>
      </Metadata>
    </MatML_Doc></Materials></EngineeringData>"#;
    let err = read_matml_str(text).unwrap_err();
    assert!(matches!(
        err,
        MatmlError::Model(MaterialError::QualifierNotAllowed { .. })
    ));
}
