//! Model instances the factory builds
//!
//! A [`Model`] is a named property bag. Typed Rust structs take part through
//! the [`Modeled`] trait, which converts them to and from models with serde.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::TemplateError;

/// Property storage of a model
pub type Properties = Map<String, Value>;

/// A model instance: its type name plus named properties
///
/// A property holding `Value::Null` is treated the same as a missing one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    model_type: String,
    #[serde(default)]
    properties: Properties,
}

impl Model {
    /// Create an empty model of the given type
    pub fn new(model_type: impl Into<String>) -> Self {
        Self {
            model_type: model_type.into(),
            properties: Properties::new(),
        }
    }

    /// Create an empty model for a typed struct
    pub fn of<T: Modeled>() -> Self {
        Self::new(T::model_type())
    }

    pub fn with_properties(model_type: impl Into<String>, properties: Properties) -> Self {
        Self {
            model_type: model_type.into(),
            properties,
        }
    }

    /// Wrap a JSON object as a model of the given type
    pub fn from_value(model_type: impl Into<String>, value: Value) -> Result<Self, TemplateError> {
        let model_type = model_type.into();
        match value {
            Value::Object(properties) => Ok(Self::with_properties(model_type, properties)),
            other => Err(TemplateError::NotAnObject {
                model_type,
                found: json_kind(&other).to_string(),
            }),
        }
    }

    /// Convert a typed struct into a model
    pub fn from_typed<T: Modeled>(model: &T) -> Result<Self, crate::error::CreateModelError> {
        let value = serde_json::to_value(model)?;
        Ok(Self::from_value(T::model_type(), value)?)
    }

    /// Convert this model into a typed struct
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.properties))
    }

    pub fn model_type(&self) -> &str {
        &self.model_type
    }

    /// Get a property, treating null as absent
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties.get(name).filter(|value| !value.is_null())
    }

    /// Check if a property holds a non-null value
    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Set a property value
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.properties.insert(name.into(), value.into());
    }

    /// Remove a property, returning its previous value
    pub fn unset(&mut self, name: &str) -> Option<Value> {
        self.properties.remove(name)
    }

    /// Set a property value, builder style
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Convert into the JSON object stored when nesting this model
    pub fn into_value(self) -> Value {
        Value::Object(self.properties)
    }
}

/// Typed structs the factory can build
///
/// Usually implemented with [`impl_modeled!`](crate::impl_modeled). Fields
/// that should be filled from a blueprint are best declared as `Option`s so
/// "unset" survives the round trip through serde.
pub trait Modeled: Serialize + DeserializeOwned {
    /// The model type name blueprints are registered under
    fn model_type() -> &'static str;
}

/// Implement [`Modeled`] for a struct
///
/// ```rust
/// use elif_blueprint::impl_modeled;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Wheel {
///     name: Option<String>,
/// }
///
/// impl_modeled!(Wheel);
/// ```
#[macro_export]
macro_rules! impl_modeled {
    ($model:ty) => {
        $crate::impl_modeled!($model => stringify!($model));
    };
    ($model:ty => $name:expr) => {
        impl $crate::model::Modeled for $model {
            fn model_type() -> &'static str {
                $name
            }
        }
    };
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Wheel {
        name: Option<String>,
        size: Option<i64>,
    }

    crate::impl_modeled!(Wheel);

    #[test]
    fn test_null_is_absent() {
        let model = Model::new("Wheel").with("name", Value::Null).with("size", 16);
        assert!(!model.is_set("name"));
        assert_eq!(model.get("size"), Some(&json!(16)));
    }

    #[test]
    fn test_from_value_rejects_scalars() {
        let error = Model::from_value("Wheel", json!("stock")).unwrap_err();
        assert_eq!(
            error,
            TemplateError::NotAnObject {
                model_type: "Wheel".to_string(),
                found: "string".to_string(),
            }
        );
    }

    #[test]
    fn test_typed_conversion() {
        let wheel = Wheel {
            name: Some("stock".to_string()),
            size: None,
        };

        let model = Model::from_typed(&wheel).unwrap();
        assert_eq!(model.model_type(), "Wheel");
        assert!(model.is_set("name"));
        assert!(!model.is_set("size"));

        let back: Wheel = model.into_typed().unwrap();
        assert_eq!(back, wheel);
    }

    #[test]
    fn test_custom_model_type_name() {
        #[derive(Serialize, Deserialize)]
        struct Tire;
        crate::impl_modeled!(Tire => "tire");

        assert_eq!(Model::of::<Tire>().model_type(), "tire");
    }
}
