use mat_mapdl::{read_file, read_str, write_mapdl_file, write_materials};
use mat_model::schema::{DEFINITION, PLASTIC_STRAIN, SEPARATED_HILL_POTENTIALS};
use mat_model::{
    Bound, ExportConfig, IndependentParameter, InterpolationOptions, Material, MaterialModel,
    ModelKind, Quantity, UserParameter,
};

const TOL: f64 = 1e-12;

fn roundtrip(model: MaterialModel) -> MaterialModel {
    let materials = vec![Material::new("Source", vec![model.clone()]).with_material_id(4)];
    let text = write_materials(&materials, &ExportConfig::default()).expect("write");
    let read = read_str(&text).expect("read");
    assert_eq!(read.len(), 1, "one material per id:\n{text}");
    assert_eq!(read[0].material_id, Some(4));
    read[0]
        .get_model_by_kind(model.kind())
        .cloned()
        .unwrap_or_else(|| panic!("{:?} missing after read:\n{text}", model.kind()))
}

fn assert_close(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() <= TOL * e.abs().max(1.0), "{actual:?} vs {expected:?}");
    }
}

fn assert_same_values(read: &MaterialModel, original: &MaterialModel) {
    assert_eq!(read.kind(), original.kind());
    assert_eq!(read.qualifiers(), original.qualifiers());
    for (spec, quantity) in original.present_fields() {
        let actual = read
            .field(spec.attribute)
            .unwrap_or_else(|| panic!("{} missing", spec.attribute));
        assert_close(&actual.value, &quantity.value);
    }
    assert_eq!(
        read.independent_parameters().len(),
        original.independent_parameters().len()
    );
    for parameter in original.independent_parameters() {
        let actual = read
            .independent_parameter(&parameter.name)
            .unwrap_or_else(|| panic!("parameter {} missing", parameter.name));
        assert_close(&actual.values.value, &parameter.values.value);
    }
}

#[test]
fn constant_properties_keep_units() {
    let original = MaterialModel::elasticity_isotropic(
        Quantity::scalar(2.0e11, "Pa"),
        Quantity::scalar(0.3, ""),
    );
    let read = roundtrip(original.clone());
    assert_eq!(read, original);
}

#[test]
fn temperature_table() {
    let temperatures: Vec<f64> = (0..8).map(|i| 20.0 + 25.0 * i as f64).collect();
    let densities: Vec<f64> = (0..8).map(|i| 7850.0 - 3.5 * i as f64).collect();
    let original = MaterialModel::density(Quantity::new(densities, "kg*m^-3"))
        .with_independent_parameter(IndependentParameter::temperature(temperatures, "C"));
    let read = roundtrip(original.clone());
    assert_same_values(&read, &original);
    assert_eq!(read.field("density").unwrap().unit, "kg*m^-3");
}

#[test]
fn orthotropic_temperature_table() {
    let mut original = MaterialModel::with_defaults(ModelKind::ThermalConductivityOrthotropic)
        .with_independent_parameter(IndependentParameter::temperature(vec![20.0, 100.0], "C"));
    for (i, attribute) in ["thermal_conductivity_x", "thermal_conductivity_y", "thermal_conductivity_z"]
        .iter()
        .enumerate()
    {
        let base = 10.0 * (i + 1) as f64;
        original
            .set_field(attribute, Quantity::new(vec![base, base + 1.0], "W*m^-1*C^-1"))
            .unwrap();
    }
    let read = roundtrip(original.clone());
    assert_same_values(&read, &original);
}

#[test]
fn multi_field_table_restores_declared_names() {
    let original = MaterialModel::with_defaults(ModelKind::CoefficientOfThermalExpansionIsotropic)
        .with_field(
            "coefficient_of_thermal_expansion",
            Quantity::new(vec![1.1e-5, 1.2e-5, 1.3e-5], "C^-1"),
        )
        .unwrap()
        .with_independent_parameter(IndependentParameter::temperature(
            vec![20.0, 20.0, 100.0],
            "C",
        ))
        .with_independent_parameter(IndependentParameter::new(
            "Moisture",
            Quantity::new(vec![0.0, 0.5, 0.0], "kg*kg^-1"),
        ));
    let read = roundtrip(original.clone());
    assert_same_values(&read, &original);
    assert_eq!(
        read.independent_parameter("Moisture").unwrap().values.unit,
        "kg*kg^-1"
    );
}

#[test]
fn orthotropic_cte_table_is_not_mistaken_for_isotropic() {
    let original =
        MaterialModel::with_defaults(ModelKind::CoefficientOfThermalExpansionOrthotropic)
            .with_field("coefficient_of_thermal_expansion_x", Quantity::new(vec![1e-5, 2e-5], "C^-1"))
            .unwrap()
            .with_field("coefficient_of_thermal_expansion_y", Quantity::new(vec![3e-5, 4e-5], "C^-1"))
            .unwrap()
            .with_field("coefficient_of_thermal_expansion_z", Quantity::new(vec![5e-5, 6e-5], "C^-1"))
            .unwrap()
            .with_independent_parameter(IndependentParameter::new(
                "Fluence",
                Quantity::new(vec![0.0, 1.0], ""),
            ));
    let read = roundtrip(original.clone());
    assert_same_values(&read, &original);
}

#[test]
fn anisotropic_elasticity_is_mirrored() {
    let mut original = MaterialModel::with_defaults(ModelKind::ElasticityAnisotropic);
    let d = |i: usize, j: usize| 1.0e9 * (1 + i.max(j) * 6 + i.min(j)) as f64;
    for (j, spec) in ModelKind::ElasticityAnisotropic.schema().fields.iter().enumerate() {
        original
            .set_field(spec.attribute, Quantity::new((0..6).map(|i| d(i, j)).collect(), "Pa"))
            .unwrap();
    }
    let read = roundtrip(original.clone());
    assert_same_values(&read, &original);
}

#[test]
fn hill_with_temperature_table() {
    let mut original = MaterialModel::new(
        ModelKind::HillYieldCriterion,
        [(SEPARATED_HILL_POTENTIALS, "Yes")],
    )
    .unwrap()
    .with_independent_parameter(IndependentParameter::temperature(vec![20.0, 400.0], "C"));
    for (i, spec) in ModelKind::HillYieldCriterion.schema().fields.iter().enumerate() {
        original
            .set_field(spec.attribute, Quantity::new(vec![1.0, 0.5 + i as f64], ""))
            .unwrap();
    }
    let read = roundtrip(original.clone());
    assert_same_values(&read, &original);
}

#[test]
fn bilinear_hardening() {
    let original = MaterialModel::new(ModelKind::IsotropicHardening, [(DEFINITION, "Bilinear")])
        .unwrap()
        .with_field("yield_strength", Quantity::new(vec![2.5e8, 2.0e8], "Pa"))
        .unwrap()
        .with_field("tangent_modulus", Quantity::new(vec![1.45e9, 1.2e9], "Pa"))
        .unwrap()
        .with_independent_parameter(IndependentParameter::temperature(vec![20.0, 300.0], "C"));
    let read = roundtrip(original.clone());
    assert_same_values(&read, &original);
}

#[test]
fn multilinear_hardening() {
    let original = MaterialModel::with_defaults(ModelKind::IsotropicHardening)
        .with_field(
            "stress",
            Quantity::new(vec![2.0e8, 2.5e8, 2.8e8, 1.5e8, 1.9e8, 2.1e8], "Pa"),
        )
        .unwrap()
        .with_independent_parameter(IndependentParameter::new(
            PLASTIC_STRAIN,
            Quantity::new(vec![0.0, 0.05, 0.2, 0.0, 0.05, 0.2], ""),
        ))
        .with_independent_parameter(IndependentParameter::temperature(
            vec![20.0, 20.0, 20.0, 350.0, 350.0, 350.0],
            "C",
        ));
    let read = roundtrip(original.clone());
    assert_same_values(&read, &original);
    let names: Vec<&str> = read
        .independent_parameters()
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(names, vec![PLASTIC_STRAIN, "Temperature"]);
}

#[test]
fn user_material_constants() {
    let original = MaterialModel::with_defaults(ModelKind::ModelCoefficients)
        .with_user_parameter(UserParameter::new("Modulus", vec![2.1e11, 2.0e11], 1))
        .with_user_parameter(UserParameter::new("Poisson", vec![0.3, 0.31], 2))
        .with_user_parameter(UserParameter::new("Yield", vec![3.0e8, 2.5e8], 3))
        .with_independent_parameter(IndependentParameter::temperature(vec![20.0, 200.0], "C"));
    let read = roundtrip(original.clone());
    assert_same_values(&read, &original);
    assert_eq!(read.user_parameters(), original.user_parameters());
}

#[test]
fn zero_thermal_strain_reference() {
    let original =
        MaterialModel::with_defaults(ModelKind::ZeroThermalStrainReferenceTemperature)
            .with_field(
                "zero_thermal_strain_reference_temperature",
                Quantity::scalar(23.5, "C"),
            )
            .unwrap();
    let read = roundtrip(original.clone());
    assert_same_values(&read, &original);
}

#[test]
fn interpolation_options_on_field_tables() {
    let original = MaterialModel::with_defaults(ModelKind::ElasticityIsotropic)
        .with_field("youngs_modulus", Quantity::new(vec![2.0e11, 1.8e11], "Pa"))
        .unwrap()
        .with_field("poissons_ratio", Quantity::new(vec![0.3, 0.3], ""))
        .unwrap()
        .with_independent_parameter(
            IndependentParameter::temperature(vec![20.0, 500.0], "C")
                .with_default(22.0)
                .with_limits(Some(Bound::ProgramControlled), Some(Bound::ProgramControlled)),
        )
        .with_independent_parameter(IndependentParameter::new(
            "Irradiation",
            Quantity::new(vec![0.0, 1.0], ""),
        ))
        .with_interpolation_options(
            InterpolationOptions::new("Linear Multivariate")
                .with_extrapolation("Projection to the Bounding Box"),
        );
    let read = roundtrip(original.clone());
    assert_same_values(&read, &original);

    let options = read.interpolation_options().expect("options read back");
    assert_eq!(options, original.interpolation_options().unwrap());
    let temperature = read.independent_parameter("Temperature").unwrap();
    assert_eq!(temperature.default_value, Some(22.0));
    assert_eq!(temperature.lower_limit, Some(Bound::Value(20.0)));
    assert_eq!(temperature.upper_limit, Some(Bound::Value(500.0)));
}

#[test]
fn interpolation_options_on_temperature_series() {
    let original = MaterialModel::density(Quantity::new(vec![1.0, 2.0], "kg*m^-3"))
        .with_independent_parameter(
            IndependentParameter::temperature(vec![10.0, 20.0], "C")
                .with_default(22.0)
                .with_limits(Some(Bound::Value(0.0)), Some(Bound::ProgramControlled)),
        )
        .with_interpolation_options(InterpolationOptions::new("Linear Multivariate"));
    let read = roundtrip(original.clone());
    assert_same_values(&read, &original);

    let options = read.interpolation_options().expect("options read back");
    assert_eq!(options, original.interpolation_options().unwrap());
    let temperature = read.independent_parameter("Temperature").unwrap();
    assert_eq!(temperature.default_value, Some(22.0));
    assert_eq!(temperature.lower_limit, Some(Bound::Value(0.0)));
    assert_eq!(temperature.upper_limit, Some(Bound::Value(20.0)));
}

#[test]
fn interpolation_options_cover_every_mp_field() {
    let original = MaterialModel::with_defaults(ModelKind::ElasticityIsotropic)
        .with_field("youngs_modulus", Quantity::new(vec![2.0e11, 1.8e11], "Pa"))
        .unwrap()
        .with_field("poissons_ratio", Quantity::new(vec![0.3, 0.31], ""))
        .unwrap()
        .with_independent_parameter(
            IndependentParameter::temperature(vec![20.0, 500.0], "C").with_default(20.0),
        )
        .with_interpolation_options(
            InterpolationOptions::new("Linear Multivariate")
                .with_extrapolation("Projection to the Bounding Box"),
        );
    let materials = vec![
        Material::new(
            "Steel",
            vec![
                original.clone(),
                MaterialModel::density(Quantity::scalar(7850.0, "kg*m^-3")),
            ],
        )
        .with_material_id(1),
    ];
    let text = write_materials(&materials, &ExportConfig::default()).expect("write");
    let read = read_str(&text).expect("read");

    let elasticity = read[0]
        .get_model_by_kind(ModelKind::ElasticityIsotropic)
        .expect("elasticity read back");
    assert_eq!(
        elasticity.interpolation_options(),
        original.interpolation_options()
    );
    assert_eq!(
        elasticity.independent_parameter("Temperature").unwrap().default_value,
        Some(20.0)
    );
    let density = read[0].get_model_by_kind(ModelKind::Density).unwrap();
    assert!(density.interpolation_options().is_none());
}

#[test]
fn several_materials_through_a_file() {
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
        Material::with_reference_temperature(
            "Copper",
            vec![MaterialModel::density(Quantity::scalar(8960.0, "kg*m^-3"))],
            20.0,
        ),
    ];
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("materials.mac");
    write_mapdl_file(&path, &materials, &ExportConfig::default()).expect("write file");

    let read = read_file(&path).expect("read file");
    assert_eq!(read.len(), 2);
    assert_eq!(read[0].name, "Material 1");
    assert_eq!(read[1].material_id, Some(2));
    assert_eq!(read[1].reference_temperature, 20.0);
    for (r, original) in read.iter().zip(&materials) {
        let kinds: Vec<ModelKind> = r.models().iter().map(|m| m.kind()).collect();
        let expected: Vec<ModelKind> = original.models().iter().map(|m| m.kind()).collect();
        assert_eq!(kinds, expected);
        assert_eq!(r.models(), original.models());
    }
}
