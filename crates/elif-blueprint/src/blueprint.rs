//! Blueprint descriptors and the sources they are registered from

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{RegisterBlueprintError, RegisterResult};
use crate::field::FieldSpec;
use crate::model::Modeled;

/// Declarative description of how to populate one model type
#[derive(Clone, Debug)]
pub struct Blueprint {
    target: String,
    fields: Vec<FieldSpec>,
}

impl Blueprint {
    /// Create an empty blueprint for a model type
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            fields: Vec::new(),
        }
    }

    /// Create an empty blueprint for a typed model
    pub fn for_model<T: Modeled>() -> Self {
        Self::new(T::model_type())
    }

    /// Declare a field; fields are resolved in declaration order
    pub fn field(mut self, field: impl Into<FieldSpec>) -> Self {
        self.fields.push(field.into());
        self
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name() == name)
    }
}

/// A type that declares a blueprint
pub trait BlueprintDefinition {
    fn blueprint() -> Blueprint;
}

type BlueprintConstructor = Arc<dyn Fn() -> Result<Blueprint, String> + Send + Sync>;

/// Named blueprint constructors for registration by name
#[derive(Clone, Default)]
pub struct BlueprintCatalog {
    entries: BTreeMap<String, BlueprintConstructor>,
}

impl BlueprintCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a constructor under a name, replacing any previous one
    pub fn insert<F>(&mut self, name: impl Into<String>, constructor: F)
    where
        F: Fn() -> Result<Blueprint, String> + Send + Sync + 'static,
    {
        self.entries.insert(name.into(), Arc::new(constructor));
    }

    /// Add a [`BlueprintDefinition`] under its Rust type name
    pub fn insert_definition<B: BlueprintDefinition + 'static>(&mut self) {
        self.insert(std::any::type_name::<B>(), || Ok(B::blueprint()));
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with<F>(mut self, name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn() -> Result<Blueprint, String> + Send + Sync + 'static,
    {
        self.insert(name, constructor);
        self
    }

    /// Build the named blueprint
    pub fn instantiate(&self, name: &str) -> RegisterResult<Blueprint> {
        let constructor = self
            .entries
            .get(name)
            .ok_or_else(|| RegisterBlueprintError::UnknownBlueprint(name.to_string()))?;

        constructor().map_err(|message| RegisterBlueprintError::Instantiation {
            name: name.to_string(),
            message,
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for BlueprintCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlueprintCatalog")
            .field("names", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Anything a blueprint can be registered from
#[derive(Clone, Debug)]
pub enum BlueprintSource {
    Descriptor(Blueprint),
    Named(String),
}

impl From<Blueprint> for BlueprintSource {
    fn from(blueprint: Blueprint) -> Self {
        BlueprintSource::Descriptor(blueprint)
    }
}

impl From<&str> for BlueprintSource {
    fn from(name: &str) -> Self {
        BlueprintSource::Named(name.to_string())
    }
}

impl From<String> for BlueprintSource {
    fn from(name: String) -> Self {
        BlueprintSource::Named(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{DefaultField, MappedListField};

    struct WheelBlueprint;

    impl BlueprintDefinition for WheelBlueprint {
        fn blueprint() -> Blueprint {
            Blueprint::new("Wheel").field(DefaultField::literal("name", "stock"))
        }
    }

    #[test]
    fn test_blueprint_builder_keeps_declaration_order() {
        let blueprint = Blueprint::new("Car")
            .field(DefaultField::literal("make", "Toyota"))
            .field(MappedListField::new("wheels", "Wheel").size(4));

        let names: Vec<_> = blueprint.fields().iter().map(FieldSpec::name).collect();
        assert_eq!(names, vec!["make", "wheels"]);
        assert!(blueprint.get_field("wheels").is_some());
        assert!(blueprint.get_field("driver").is_none());
    }

    #[test]
    fn test_catalog_instantiates_definitions() {
        let mut catalog = BlueprintCatalog::new();
        catalog.insert_definition::<WheelBlueprint>();

        let name = std::any::type_name::<WheelBlueprint>();
        assert!(catalog.contains(name));
        assert_eq!(catalog.instantiate(name).unwrap().target(), "Wheel");
    }

    #[test]
    fn test_catalog_errors() {
        let catalog = BlueprintCatalog::new().with("Broken", || Err("no default ctor".to_string()));

        assert_eq!(
            catalog.instantiate("Missing").unwrap_err(),
            RegisterBlueprintError::UnknownBlueprint("Missing".to_string())
        );
        assert!(matches!(
            catalog.instantiate("Broken").unwrap_err(),
            RegisterBlueprintError::Instantiation { .. }
        ));
    }
}
