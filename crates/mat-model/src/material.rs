//! Material and material-manager containers.

use serde::{Deserialize, Serialize};

use crate::model::MaterialModel;
use crate::quantity::Quantity;
use crate::schema::ModelKind;

/// A named material owning an ordered list of models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub material_id: Option<u32>,
    models: Vec<MaterialModel>,
    pub reference_temperature: f64,
    /// Workbench data-transfer identifier.
    pub guid: Option<String>,
}

impl Material {
    /// Creates a material with a reference temperature of 0.
    pub fn new(name: impl Into<String>, models: Vec<MaterialModel>) -> Self {
        Self::with_reference_temperature(name, models, 0.0)
    }

    /// Creates a material, appending a `Reference Temperature` model unless
    /// `models` already holds one. An existing model wins over the argument.
    pub fn with_reference_temperature(
        name: impl Into<String>,
        mut models: Vec<MaterialModel>,
        reference_temperature: f64,
    ) -> Self {
        let existing = models
            .iter()
            .find(|m| m.kind() == ModelKind::ReferenceTemperature)
            .and_then(|m| m.field("reference_temperature"))
            .and_then(|q| q.at(0));

        let reference_temperature = match existing {
            Some(value) => value,
            None => {
                if !models.iter().any(|m| m.kind() == ModelKind::ReferenceTemperature) {
                    models.push(reference_temperature_model(reference_temperature));
                }
                reference_temperature
            }
        };

        Self {
            name: name.into(),
            material_id: None,
            models,
            reference_temperature,
            guid: None,
        }
    }

    pub fn with_material_id(mut self, id: u32) -> Self {
        self.material_id = Some(id);
        self
    }

    pub fn with_guid(mut self, guid: impl Into<String>) -> Self {
        self.guid = Some(guid.into());
        self
    }

    pub fn models(&self) -> &[MaterialModel] {
        &self.models
    }

    pub fn models_mut(&mut self) -> &mut [MaterialModel] {
        &mut self.models
    }

    pub fn add_model(&mut self, model: MaterialModel) {
        self.models.push(model);
    }

    /// All models whose display name equals `name`.
    pub fn get_model_by_name(&self, name: &str) -> Vec<&MaterialModel> {
        self.models.iter().filter(|m| m.name() == name).collect()
    }

    pub fn get_model_by_kind(&self, kind: ModelKind) -> Option<&MaterialModel> {
        self.models.iter().find(|m| m.kind() == kind)
    }
}

fn reference_temperature_model(value: f64) -> MaterialModel {
    MaterialModel::with_defaults(ModelKind::ReferenceTemperature)
        .field_unchecked("reference_temperature", Quantity::scalar(value, "C"))
}

/// Ordered collection of materials addressed by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialManager {
    materials: Vec<Material>,
}

impl MaterialManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a material, replacing one with the same name.
    pub fn add_material(&mut self, material: Material) {
        match self.materials.iter_mut().find(|m| m.name == material.name) {
            Some(slot) => *slot = material,
            None => self.materials.push(material),
        }
    }

    pub fn get_material(&self, name: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.name == name)
    }

    pub fn get_material_mut(&mut self, name: &str) -> Option<&mut Material> {
        self.materials.iter_mut().find(|m| m.name == name)
    }

    pub fn material_names(&self) -> Vec<String> {
        self.materials.iter().map(|m| m.name.clone()).collect()
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

impl From<Vec<Material>> for MaterialManager {
    fn from(materials: Vec<Material>) -> Self {
        let mut manager = Self::new();
        for m in materials {
            manager.add_material(m);
        }
        manager
    }
}
