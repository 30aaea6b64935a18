//! Object access for model instances
//!
//! The construction engine never touches model properties directly. It goes
//! through a [`Template`], so applications can plug in their own rules for
//! constructing, reading and writing models.

use serde_json::Value;
use std::fmt;

use crate::error::TemplateError;
use crate::model::Model;

pub type TemplateResult<T> = Result<T, TemplateError>;

/// Construct, read and write model instances
pub trait Template: Send + Sync + fmt::Debug {
    /// Create a zero-valued instance of a model type
    fn construct(&self, model_type: &str) -> TemplateResult<Model>;

    /// Read a property, returning `None` when it is unset
    fn get(&self, model: &Model, property: &str) -> TemplateResult<Option<Value>>;

    /// Write a property; `None` resets it to its zero value
    fn set(&self, model: Model, property: &str, value: Option<Value>) -> TemplateResult<Model>;
}

/// Default template treating models as plain named-property bags
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertyTemplate;

impl Template for PropertyTemplate {
    fn construct(&self, model_type: &str) -> TemplateResult<Model> {
        if model_type.is_empty() {
            return Err(TemplateError::Construct {
                model_type: model_type.to_string(),
                message: "model type name is empty".to_string(),
            });
        }
        Ok(Model::new(model_type))
    }

    fn get(&self, model: &Model, property: &str) -> TemplateResult<Option<Value>> {
        Ok(model.get(property).cloned())
    }

    fn set(&self, mut model: Model, property: &str, value: Option<Value>) -> TemplateResult<Model> {
        match value {
            Some(value) => model.set(property, value),
            None => {
                model.unset(property);
            }
        }
        Ok(model)
    }
}
