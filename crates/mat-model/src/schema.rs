//! Per-kind field and qualifier tables.
//!
//! Every model kind has one static [`KindSchema`] describing its fields with
//! their MatML display name and MAPDL property label, the qualifiers it
//! expects, and the `TB` table it maps to when tabulated over field
//! variables. Writers and readers of both formats are driven by these tables.

use serde::{Deserialize, Serialize};

use crate::qualifiers::QualifierSpec;

pub const BEHAVIOR: &str = "Behavior";
pub const DEFINITION: &str = "Definition";
pub const SEPARATED_HILL_POTENTIALS: &str = "Separated Hill Potentials for Plasticity and Creep";
pub const USER_MAT: &str = "UserMat";
pub const PLASTIC_STRAIN: &str = "Plastic Strain";

pub const BILINEAR: &str = "Bilinear";
pub const MULTILINEAR: &str = "Multilinear";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModelKind {
    Density,
    ElasticityIsotropic,
    ElasticityOrthotropic,
    ElasticityAnisotropic,
    CoefficientOfThermalExpansionIsotropic,
    CoefficientOfThermalExpansionOrthotropic,
    ThermalConductivityIsotropic,
    ThermalConductivityOrthotropic,
    SpecificHeat,
    ElectricalResistivity,
    ReferenceTemperature,
    ZeroThermalStrainReferenceTemperature,
    MolecularWeight,
    HillYieldCriterion,
    IsotropicHardening,
    ModelCoefficients,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape {
    /// One value per table row.
    Tabular,
    /// A fixed-length matrix column, not tabulated.
    Column,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub attribute: &'static str,
    pub matml_name: Option<&'static str>,
    pub mapdl_label: Option<&'static str>,
    pub unit: Option<&'static str>,
    pub shape: FieldShape,
}

impl FieldSpec {
    const fn tabular(
        attribute: &'static str,
        matml_name: &'static str,
        mapdl_label: &'static str,
        unit: &'static str,
    ) -> Self {
        Self {
            attribute,
            matml_name: Some(matml_name),
            mapdl_label: Some(mapdl_label),
            unit: Some(unit),
            shape: FieldShape::Tabular,
        }
    }

    const fn matml_only(attribute: &'static str, matml_name: &'static str, unit: &'static str) -> Self {
        Self {
            attribute,
            matml_name: Some(matml_name),
            mapdl_label: None,
            unit: Some(unit),
            shape: FieldShape::Tabular,
        }
    }

    const fn mapdl_only(attribute: &'static str, mapdl_label: &'static str, unit: &'static str) -> Self {
        Self {
            attribute,
            matml_name: None,
            mapdl_label: Some(mapdl_label),
            unit: Some(unit),
            shape: FieldShape::Tabular,
        }
    }

    const fn column(attribute: &'static str, matml_name: &'static str) -> Self {
        Self {
            attribute,
            matml_name: Some(matml_name),
            mapdl_label: None,
            unit: Some("Pa"),
            shape: FieldShape::Column,
        }
    }

    const fn ratio(attribute: &'static str, matml_name: &'static str) -> Self {
        Self {
            attribute,
            matml_name: Some(matml_name),
            mapdl_label: None,
            unit: None,
            shape: FieldShape::Tabular,
        }
    }
}

/// `TB,<label>,<matid>,,,<option>` table a kind is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSpec {
    pub label: &'static str,
    pub option: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindSchema {
    pub kind: ModelKind,
    pub class_name: &'static str,
    pub display_name: &'static str,
    pub fields: &'static [FieldSpec],
    pub qualifiers: &'static [QualifierSpec],
    pub table: Option<TableSpec>,
}

impl KindSchema {
    pub fn field(&self, attribute: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.attribute == attribute)
    }

    pub fn field_by_matml_name(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.matml_name == Some(name))
    }

    pub fn field_by_mapdl_label(&self, label: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.mapdl_label == Some(label))
    }

    /// MAPDL labels of all fields, in table order.
    pub fn mapdl_labels(&self) -> Vec<&'static str> {
        self.fields.iter().filter_map(|f| f.mapdl_label).collect()
    }
}

const YES_NO: &[&str] = &["Yes", "No"];
const HARDENING_DEFINITIONS: &[&str] = &[BILINEAR, MULTILINEAR];

const ISOTROPIC: QualifierSpec = QualifierSpec::strict(BEHAVIOR, "Isotropic");
const ORTHOTROPIC: QualifierSpec = QualifierSpec::strict(BEHAVIOR, "Orthotropic");
const ANISOTROPIC: QualifierSpec = QualifierSpec::strict(BEHAVIOR, "Anisotropic");

static DENSITY: KindSchema = KindSchema {
    kind: ModelKind::Density,
    class_name: "Density",
    display_name: "Density",
    fields: &[FieldSpec::tabular("density", "Density", "DENS", "kg*m^-3")],
    qualifiers: &[],
    table: None,
};

static ELASTICITY_ISOTROPIC: KindSchema = KindSchema {
    kind: ModelKind::ElasticityIsotropic,
    class_name: "ElasticityIsotropic",
    display_name: "Elasticity",
    fields: &[
        FieldSpec::tabular("youngs_modulus", "Young's Modulus", "EX", "Pa"),
        FieldSpec::tabular("poissons_ratio", "Poisson's Ratio", "PRXY", ""),
    ],
    qualifiers: &[
        ISOTROPIC,
        QualifierSpec::free("Derive from", "Young's Modulus and Poisson's Ratio"),
    ],
    table: Some(TableSpec {
        label: "ELASTIC",
        option: "ISOT",
    }),
};

static ELASTICITY_ORTHOTROPIC: KindSchema = KindSchema {
    kind: ModelKind::ElasticityOrthotropic,
    class_name: "ElasticityOrthotropic",
    display_name: "Elasticity",
    fields: &[
        FieldSpec::tabular("youngs_modulus_x", "Young's Modulus X direction", "EX", "Pa"),
        FieldSpec::tabular("youngs_modulus_y", "Young's Modulus Y direction", "EY", "Pa"),
        FieldSpec::tabular("youngs_modulus_z", "Young's Modulus Z direction", "EZ", "Pa"),
        FieldSpec::tabular("poissons_ratio_xy", "Poisson's Ratio XY", "PRXY", ""),
        FieldSpec::tabular("poissons_ratio_yz", "Poisson's Ratio YZ", "PRYZ", ""),
        FieldSpec::tabular("poissons_ratio_xz", "Poisson's Ratio XZ", "PRXZ", ""),
        FieldSpec::tabular("shear_modulus_xy", "Shear Modulus XY", "GXY", "Pa"),
        FieldSpec::tabular("shear_modulus_yz", "Shear Modulus YZ", "GYZ", "Pa"),
        FieldSpec::tabular("shear_modulus_xz", "Shear Modulus XZ", "GXZ", "Pa"),
    ],
    qualifiers: &[ORTHOTROPIC],
    table: Some(TableSpec {
        label: "ELASTIC",
        option: "OELM",
    }),
};

static ELASTICITY_ANISOTROPIC: KindSchema = KindSchema {
    kind: ModelKind::ElasticityAnisotropic,
    class_name: "ElasticityAnisotropic",
    display_name: "Elasticity",
    fields: &[
        FieldSpec::column("column_1", "D[*,1]"),
        FieldSpec::column("column_2", "D[*,2]"),
        FieldSpec::column("column_3", "D[*,3]"),
        FieldSpec::column("column_4", "D[*,4]"),
        FieldSpec::column("column_5", "D[*,5]"),
        FieldSpec::column("column_6", "D[*,6]"),
    ],
    qualifiers: &[ANISOTROPIC],
    table: Some(TableSpec {
        label: "ELASTIC",
        option: "AELS",
    }),
};

static CTE_ISOTROPIC: KindSchema = KindSchema {
    kind: ModelKind::CoefficientOfThermalExpansionIsotropic,
    class_name: "CoefficientofThermalExpansionIsotropic",
    display_name: "Coefficient of Thermal Expansion",
    fields: &[FieldSpec::tabular(
        "coefficient_of_thermal_expansion",
        "Coefficient of Thermal Expansion",
        "ALPX",
        "C^-1",
    )],
    qualifiers: &[ISOTROPIC, QualifierSpec::free(DEFINITION, "Secant")],
    table: Some(TableSpec {
        label: "CTE",
        option: "",
    }),
};

static CTE_ORTHOTROPIC: KindSchema = KindSchema {
    kind: ModelKind::CoefficientOfThermalExpansionOrthotropic,
    class_name: "CoefficientofThermalExpansionOrthotropic",
    display_name: "Coefficient of Thermal Expansion",
    fields: &[
        FieldSpec::tabular(
            "coefficient_of_thermal_expansion_x",
            "Coefficient of Thermal Expansion X direction",
            "ALPX",
            "C^-1",
        ),
        FieldSpec::tabular(
            "coefficient_of_thermal_expansion_y",
            "Coefficient of Thermal Expansion Y direction",
            "ALPY",
            "C^-1",
        ),
        FieldSpec::tabular(
            "coefficient_of_thermal_expansion_z",
            "Coefficient of Thermal Expansion Z direction",
            "ALPZ",
            "C^-1",
        ),
    ],
    qualifiers: &[ORTHOTROPIC, QualifierSpec::free(DEFINITION, "Secant")],
    table: Some(TableSpec {
        label: "CTE",
        option: "",
    }),
};

static CONDUCTIVITY_ISOTROPIC: KindSchema = KindSchema {
    kind: ModelKind::ThermalConductivityIsotropic,
    class_name: "ThermalConductivityIsotropic",
    display_name: "Thermal Conductivity",
    fields: &[FieldSpec::tabular(
        "thermal_conductivity",
        "Thermal Conductivity",
        "KXX",
        "W*m^-1*C^-1",
    )],
    qualifiers: &[ISOTROPIC],
    table: Some(TableSpec {
        label: "THERM",
        option: "COND",
    }),
};

static CONDUCTIVITY_ORTHOTROPIC: KindSchema = KindSchema {
    kind: ModelKind::ThermalConductivityOrthotropic,
    class_name: "ThermalConductivityOrthotropic",
    display_name: "Thermal Conductivity",
    fields: &[
        FieldSpec::tabular(
            "thermal_conductivity_x",
            "Thermal Conductivity X direction",
            "KXX",
            "W*m^-1*C^-1",
        ),
        FieldSpec::tabular(
            "thermal_conductivity_y",
            "Thermal Conductivity Y direction",
            "KYY",
            "W*m^-1*C^-1",
        ),
        FieldSpec::tabular(
            "thermal_conductivity_z",
            "Thermal Conductivity Z direction",
            "KZZ",
            "W*m^-1*C^-1",
        ),
    ],
    qualifiers: &[ORTHOTROPIC],
    table: Some(TableSpec {
        label: "THERM",
        option: "COND",
    }),
};

static SPECIFIC_HEAT: KindSchema = KindSchema {
    kind: ModelKind::SpecificHeat,
    class_name: "SpecificHeat",
    display_name: "Specific Heat",
    fields: &[FieldSpec::tabular(
        "specific_heat",
        "Specific Heat",
        "C",
        "J*kg^-1*C^-1",
    )],
    qualifiers: &[QualifierSpec::free(DEFINITION, "Constant Pressure")],
    table: None,
};

static ELECTRICAL_RESISTIVITY: KindSchema = KindSchema {
    kind: ModelKind::ElectricalResistivity,
    class_name: "ElectricalResistivity",
    display_name: "Electrical Resistivity",
    fields: &[FieldSpec::tabular(
        "electrical_resistivity",
        "Electrical Resistivity",
        "RSVX",
        "ohm*m",
    )],
    qualifiers: &[],
    table: None,
};

static REFERENCE_TEMPERATURE: KindSchema = KindSchema {
    kind: ModelKind::ReferenceTemperature,
    class_name: "ReferenceTemperature",
    display_name: "Reference Temperature",
    fields: &[FieldSpec::mapdl_only("reference_temperature", "REFT", "C")],
    qualifiers: &[],
    table: None,
};

static ZERO_THERMAL_STRAIN: KindSchema = KindSchema {
    kind: ModelKind::ZeroThermalStrainReferenceTemperature,
    class_name: "ZeroThermalStrainReferenceTemperature",
    display_name: "Zero Thermal Strain Reference Temperature",
    fields: &[FieldSpec::matml_only(
        "zero_thermal_strain_reference_temperature",
        "Zero Thermal Strain Reference Temperature",
        "C",
    )],
    qualifiers: &[],
    table: None,
};

static MOLECULAR_WEIGHT: KindSchema = KindSchema {
    kind: ModelKind::MolecularWeight,
    class_name: "MolecularWeight",
    display_name: "Molecular Weight",
    fields: &[FieldSpec::matml_only(
        "molecular_weight",
        "Molecular Weight",
        "kg*kmol^-1",
    )],
    qualifiers: &[],
    table: None,
};

static HILL_YIELD: KindSchema = KindSchema {
    kind: ModelKind::HillYieldCriterion,
    class_name: "HillYieldCriterion",
    display_name: "Hill Yield Criterion",
    fields: &[
        FieldSpec::ratio("yield_stress_ratio_x", "Yield stress ratio in X direction"),
        FieldSpec::ratio("yield_stress_ratio_y", "Yield stress ratio in Y direction"),
        FieldSpec::ratio("yield_stress_ratio_z", "Yield stress ratio in Z direction"),
        FieldSpec::ratio("yield_stress_ratio_xy", "Yield stress ratio in XY direction"),
        FieldSpec::ratio("yield_stress_ratio_yz", "Yield stress ratio in YZ direction"),
        FieldSpec::ratio("yield_stress_ratio_xz", "Yield stress ratio in XZ direction"),
        FieldSpec::ratio("creep_stress_ratio_x", "Yield stress ratio in X direction for creep"),
        FieldSpec::ratio("creep_stress_ratio_y", "Yield stress ratio in Y direction for creep"),
        FieldSpec::ratio("creep_stress_ratio_z", "Yield stress ratio in Z direction for creep"),
        FieldSpec::ratio("creep_stress_ratio_xy", "Yield stress ratio in XY direction for creep"),
        FieldSpec::ratio("creep_stress_ratio_yz", "Yield stress ratio in YZ direction for creep"),
        FieldSpec::ratio("creep_stress_ratio_xz", "Yield stress ratio in XZ direction for creep"),
    ],
    qualifiers: &[QualifierSpec::range(SEPARATED_HILL_POTENTIALS, "No", YES_NO)],
    table: Some(TableSpec {
        label: "HILL",
        option: "",
    }),
};

static ISOTROPIC_HARDENING: KindSchema = KindSchema {
    kind: ModelKind::IsotropicHardening,
    class_name: "IsotropicHardening",
    display_name: "Isotropic Hardening",
    fields: &[
        FieldSpec::matml_only("yield_strength", "Yield Strength", "Pa"),
        FieldSpec::matml_only("tangent_modulus", "Tangent Modulus", "Pa"),
        FieldSpec::matml_only("stress", "Stress", "Pa"),
    ],
    qualifiers: &[QualifierSpec::range(DEFINITION, MULTILINEAR, HARDENING_DEFINITIONS)],
    table: Some(TableSpec {
        label: "PLASTIC",
        option: "MISO",
    }),
};

static MODEL_COEFFICIENTS: KindSchema = KindSchema {
    kind: ModelKind::ModelCoefficients,
    class_name: "ModelCoefficients",
    display_name: "Model Coefficients",
    fields: &[],
    qualifiers: &[QualifierSpec::strict(USER_MAT, "USER")],
    table: Some(TableSpec {
        label: "USER",
        option: "",
    }),
};

impl ModelKind {
    pub const ALL: &'static [ModelKind] = &[
        ModelKind::Density,
        ModelKind::ElasticityIsotropic,
        ModelKind::ElasticityOrthotropic,
        ModelKind::ElasticityAnisotropic,
        ModelKind::CoefficientOfThermalExpansionIsotropic,
        ModelKind::CoefficientOfThermalExpansionOrthotropic,
        ModelKind::ThermalConductivityIsotropic,
        ModelKind::ThermalConductivityOrthotropic,
        ModelKind::SpecificHeat,
        ModelKind::ElectricalResistivity,
        ModelKind::ReferenceTemperature,
        ModelKind::ZeroThermalStrainReferenceTemperature,
        ModelKind::MolecularWeight,
        ModelKind::HillYieldCriterion,
        ModelKind::IsotropicHardening,
        ModelKind::ModelCoefficients,
    ];

    pub fn schema(self) -> &'static KindSchema {
        match self {
            ModelKind::Density => &DENSITY,
            ModelKind::ElasticityIsotropic => &ELASTICITY_ISOTROPIC,
            ModelKind::ElasticityOrthotropic => &ELASTICITY_ORTHOTROPIC,
            ModelKind::ElasticityAnisotropic => &ELASTICITY_ANISOTROPIC,
            ModelKind::CoefficientOfThermalExpansionIsotropic => &CTE_ISOTROPIC,
            ModelKind::CoefficientOfThermalExpansionOrthotropic => &CTE_ORTHOTROPIC,
            ModelKind::ThermalConductivityIsotropic => &CONDUCTIVITY_ISOTROPIC,
            ModelKind::ThermalConductivityOrthotropic => &CONDUCTIVITY_ORTHOTROPIC,
            ModelKind::SpecificHeat => &SPECIFIC_HEAT,
            ModelKind::ElectricalResistivity => &ELECTRICAL_RESISTIVITY,
            ModelKind::ReferenceTemperature => &REFERENCE_TEMPERATURE,
            ModelKind::ZeroThermalStrainReferenceTemperature => &ZERO_THERMAL_STRAIN,
            ModelKind::MolecularWeight => &MOLECULAR_WEIGHT,
            ModelKind::HillYieldCriterion => &HILL_YIELD,
            ModelKind::IsotropicHardening => &ISOTROPIC_HARDENING,
            ModelKind::ModelCoefficients => &MODEL_COEFFICIENTS,
        }
    }

    pub fn display_name(self) -> &'static str {
        self.schema().display_name
    }

    pub fn from_class_name(class_name: &str) -> Option<ModelKind> {
        ModelKind::ALL
            .iter()
            .copied()
            .find(|k| k.schema().class_name == class_name)
    }

    /// Kinds whose fields all carry MAPDL labels and are written with `MP`.
    pub fn is_mp_property(self) -> bool {
        let schema = self.schema();
        !schema.fields.is_empty() && schema.fields.iter().all(|f| f.mapdl_label.is_some())
    }
}

/// Class-name candidate for a MatML property set: the property name with
/// spaces removed, followed by the behavior qualifier when present.
pub fn class_name_candidate(property_name: &str, behavior: Option<&str>) -> String {
    let mut candidate: String = property_name.chars().filter(|c| !c.is_whitespace()).collect();
    if let Some(b) = behavior {
        candidate.extend(b.chars().filter(|c| !c.is_whitespace()));
    }
    candidate
}
