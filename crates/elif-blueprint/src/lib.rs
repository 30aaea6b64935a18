//! # elif-blueprint - Blueprint Model Factory
//!
//! Declarative test fixtures for elif.rs applications. A blueprint describes
//! how each property of a model type is populated, and the [`ModelFactory`]
//! builds whole object graphs from those descriptions while keeping whatever
//! a partially populated seed already sets.
//!
//! ## Features
//!
//! - **Blueprints**: Default values, nested models and collections of models
//! - **Seeds**: Values set by the caller always win over blueprint defaults
//! - **Policies**: Per-model and per-field-type rules that skip injection
//! - **Typed Models**: Any serde struct becomes a model via [`impl_modeled!`]
//! - **Generators**: Sequences and seeded random values for deferred defaults
//!
//! ## Quick Start
//!
//! ```rust
//! use elif_blueprint::prelude::*;
//!
//! let mut factory = ModelFactory::new();
//! factory
//!     .register_blueprint(
//!         Blueprint::new("Wheel").field(DefaultField::literal("name", "stock")),
//!     )
//!     .unwrap();
//! factory
//!     .register_blueprint(
//!         Blueprint::new("Car")
//!             .field(DefaultField::literal("make", "Toyota"))
//!             .field(MappedListField::new("wheels", "Wheel").size(4)),
//!     )
//!     .unwrap();
//!
//! let car = factory.create_model(Model::new("Car").with("make", "Honda")).unwrap();
//! assert_eq!(car.get("make"), Some(&json!("Honda")));
//! assert_eq!(car.get("wheels").and_then(|w| w.as_array()).map(Vec::len), Some(4));
//! ```

pub mod blueprint;
pub mod collection;
pub mod command;
pub mod config;
pub mod engine;
pub mod erector;
pub mod error;
pub mod factory;
pub mod field;
pub mod generators;
pub mod model;
pub mod policy;
pub mod template;

// Re-export commonly used types
pub use blueprint::{Blueprint, BlueprintCatalog, BlueprintDefinition, BlueprintSource};
pub use collection::{Collection, CollectionImpl, CollectionSemantics};
pub use command::{Command, CommandSet, CommandTable};
pub use config::{DuplicateBlueprintMode, FactoryConfig, FactoryConfigBuilder, PolicyErrorMode};
pub use engine::Seed;
pub use erector::Erector;
pub use error::{
    CreateModelError, CreateModelResult, FactoryError, FactoryResult, PolicyError, PolicyKind,
    PolicyResult, RegisterBlueprintError, RegisterResult, TemplateError,
};
pub use factory::ModelFactory;
pub use field::{DefaultField, DefaultValue, FieldSpec, MappedField, MappedListField, MappedSetField};
pub use model::{Model, Modeled, Properties};
pub use policy::{BlueprintPolicy, CommandFieldPolicy, FieldPolicy, Policy, SkipFieldsPolicy};
pub use template::{PropertyTemplate, Template, TemplateResult};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        generators, impl_modeled, Blueprint, BlueprintDefinition, CollectionImpl, Command,
        CommandTable, CreateModelResult, DefaultField, FactoryConfigBuilder, MappedField,
        MappedListField, MappedSetField, Model, ModelFactory, Modeled, Policy, PolicyErrorMode,
        SkipFieldsPolicy,
    };

    // Re-export commonly used external types
    pub use serde_json::{json, Value as JsonValue};
}
