//! Error types for the blueprint factory
//!
//! Each stage of the factory has its own error type: registering blueprints,
//! registering and running policies, and creating models. [`FactoryError`]
//! wraps all of them for callers that drive the whole lifecycle.

use std::fmt;
use thiserror::Error;

use crate::collection::{CollectionImpl, CollectionSemantics};

/// Result type alias for blueprint registration
pub type RegisterResult<T> = Result<T, RegisterBlueprintError>;

/// Result type alias for policy registration and execution
pub type PolicyResult<T> = Result<T, PolicyError>;

/// Result type alias for model creation
pub type CreateModelResult<T> = Result<T, CreateModelError>;

/// Result type alias for any factory operation
pub type FactoryResult<T> = Result<T, FactoryError>;

/// Errors raised by the object-access [`Template`](crate::template::Template)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TemplateError {
    #[error("Cannot construct model '{model_type}': {message}")]
    Construct { model_type: String, message: String },

    #[error("Expected an object for model '{model_type}', found {found}")]
    NotAnObject { model_type: String, found: String },

    #[error("Property '{property}' on '{model_type}' is not a collection")]
    NotACollection { model_type: String, property: String },

    #[error("Cannot access property '{property}' on '{model_type}': {message}")]
    Access {
        model_type: String,
        property: String,
        message: String,
    },
}

/// Errors raised while registering a blueprint
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegisterBlueprintError {
    #[error("Blueprint does not declare a target model type")]
    MissingTarget,

    #[error("Blueprint for '{target}' declares field '{field}' more than once")]
    DuplicateField { target: String, field: String },

    #[error("Invalid field '{field}' on blueprint '{target}': {reason}")]
    InvalidField {
        target: String,
        field: String,
        reason: String,
    },

    #[error("Field '{field}' on blueprint '{target}': {implementation} does not implement {expected} semantics")]
    InvalidCollection {
        target: String,
        field: String,
        implementation: CollectionImpl,
        expected: CollectionSemantics,
    },

    #[error("No blueprint named '{0}' is available")]
    UnknownBlueprint(String),

    #[error("Failed to instantiate blueprint '{name}': {message}")]
    Instantiation { name: String, message: String },

    #[error("Blueprint for '{0}' is already registered")]
    Duplicate(String),
}

/// Which kind of policy an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    Blueprint,
    Field,
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyKind::Blueprint => write!(f, "BlueprintPolicy"),
            PolicyKind::Field => write!(f, "FieldPolicy"),
        }
    }
}

/// Errors raised while registering or running a policy
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PolicyError {
    #[error("Blueprint does not exist for {kind} target: {target}")]
    UnregisteredTarget { kind: PolicyKind, target: String },

    #[error("Policy '{policy}' failed: {message}")]
    Execution { policy: String, message: String },
}

impl PolicyError {
    /// Create an execution failure for the named policy
    pub fn execution(policy: impl Into<String>, message: impl Into<String>) -> Self {
        PolicyError::Execution {
            policy: policy.into(),
            message: message.into(),
        }
    }
}

/// Errors raised while creating a model
#[derive(Error, Debug)]
pub enum CreateModelError {
    #[error("Unregistered blueprint for model type '{0}'")]
    UnregisteredBlueprint(String),

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Policy failed while creating '{model_type}': {source}")]
    Policy {
        model_type: String,
        #[source]
        source: PolicyError,
    },

    #[error("Recursion limit of {limit} exceeded while creating '{model_type}'")]
    RecursionLimit { model_type: String, limit: usize },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Umbrella error for callers driving registration and creation together
#[derive(Error, Debug)]
pub enum FactoryError {
    #[error(transparent)]
    Register(#[from] RegisterBlueprintError),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    CreateModel(#[from] CreateModelError),
}
