//! Engineering material property model.
//!
//! This crate provides:
//! - **Unit registry** with dimension lookup and compatibility checks
//! - **Model records**: quantities, qualifiers, independent parameters,
//!   interpolation options and the generic [`MaterialModel`]
//! - **Validators** for qualifier expectations and table cardinality
//! - **Schema tables** mapping every model kind to its MatML and MAPDL names
//! - **Containers** ([`Material`], [`MaterialManager`]) and JSON persistence

pub mod cardinality;
mod config;
mod error;
mod material;
mod model;
mod number;
pub mod qualifiers;
mod quantity;
pub mod schema;
pub mod units;

pub use config::{ExportConfig, load_config, load_materials, save_config, save_materials};
pub use error::{MaterialError, Result};
pub use material::{Material, MaterialManager};
pub use model::{ANISOTROPIC_COLUMN_LEN, MaterialModel, UserParameter};
pub use number::format_float;
pub use qualifiers::{QualifierMode, QualifierSpec, validate_and_initialize};
pub use quantity::{
    Bound, IndependentParameter, InterpolationOptions, ModelQualifier, PROGRAM_CONTROLLED,
    Quantity, TEMPERATURE,
};
pub use schema::{FieldShape, FieldSpec, KindSchema, ModelKind, TableSpec};
pub use units::{MeasuredUnit, are_units_compatible, get_unit_by_symbol};
