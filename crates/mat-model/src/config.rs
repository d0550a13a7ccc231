//! Export configuration and JSON persistence of material libraries.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::material::Material;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// `version` attribute of the `EngineeringData` root.
    pub engineering_data_version: String,
    /// `versiondate` attribute of the `EngineeringData` root.
    pub engineering_data_version_date: String,
    /// Material id given to the first material without one.
    pub first_material_id: u32,
    /// Emit the `ANSYSWBTransferData` block.
    pub write_transfer_ids: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            engineering_data_version: "18.0.0.60".to_string(),
            engineering_data_version_date: "29.08.2016 15:02:00".to_string(),
            first_material_id: 1,
            write_transfer_ids: true,
        }
    }
}

pub fn load_config(path: impl AsRef<Path>) -> Result<ExportConfig> {
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

pub fn save_config(path: impl AsRef<Path>, config: &ExportConfig) -> Result<()> {
    write_json(path.as_ref(), config)
}

/// Stores materials as pretty-printed JSON.
pub fn save_materials(path: impl AsRef<Path>, materials: &[Material]) -> Result<()> {
    write_json(path.as_ref(), &materials)
}

pub fn load_materials(path: impl AsRef<Path>) -> Result<Vec<Material>> {
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let bytes = serde_json::to_vec_pretty(value)?;
    fs::write(path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MaterialError;
    use crate::model::MaterialModel;
    use crate::quantity::{IndependentParameter, Quantity};

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let cfg: ExportConfig = serde_json::from_str(r#"{"first_material_id": 10}"#).unwrap();
        assert_eq!(cfg.first_material_id, 10);
        assert_eq!(cfg.engineering_data_version, "18.0.0.60");
        assert!(cfg.write_transfer_ids);
    }

    #[test]
    fn config_roundtrip_through_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested/config.json");
        let cfg = ExportConfig {
            write_transfer_ids: false,
            ..ExportConfig::default()
        };
        save_config(&path, &cfg).expect("save config");
        assert_eq!(load_config(&path).expect("load config"), cfg);
    }

    #[test]
    fn materials_roundtrip_through_json() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("library.json");
        let density = MaterialModel::density(Quantity::new(vec![7850.0, 7800.0], "kg*m^-3"))
            .with_independent_parameter(IndependentParameter::temperature(vec![20.0, 200.0], "C"));
        let materials = vec![Material::new("Steel", vec![density]).with_material_id(3)];

        save_materials(&path, &materials).expect("save materials");
        let loaded = load_materials(&path).expect("load materials");
        assert_eq!(loaded, materials);
    }

    #[test]
    fn invalid_json_is_reported() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("bad.json");
        fs::write(&path, "{not json").expect("write payload");
        assert!(matches!(load_materials(&path), Err(MaterialError::Json(_))));
        assert!(matches!(
            load_materials(dir.path().join("missing.json")),
            Err(MaterialError::Io(_))
        ));
    }
}
