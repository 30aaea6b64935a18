//! Field specifications declared on a blueprint
//!
//! A blueprint is a list of [`FieldSpec`]s. Each one says how a single model
//! property is populated:
//!
//! - [`DefaultField`]: a literal value or a deferred computation
//! - [`MappedField`]: a nested model synthesized from its own blueprint
//! - [`MappedListField`] / [`MappedSetField`]: collections of nested models

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::collection::{CollectionImpl, CollectionSemantics};
use crate::error::{RegisterBlueprintError, RegisterResult};
use crate::model::{Modeled, Model};

/// Element count used when a collection field does not set one
pub const DEFAULT_COLLECTION_SIZE: usize = 1;

/// Deferred default, evaluated with the seed model on every construction
pub type FieldCallback = Arc<dyn Fn(&Model) -> Value + Send + Sync>;

/// The value a [`DefaultField`] falls back to
#[derive(Clone)]
pub enum DefaultValue {
    Literal(Value),
    Deferred(FieldCallback),
}

impl DefaultValue {
    /// Produce the default for one construction; null resolves to `None`
    pub fn resolve(&self, seed: &Model) -> Option<Value> {
        let value = match self {
            DefaultValue::Literal(value) => value.clone(),
            DefaultValue::Deferred(callback) => callback(seed),
        };
        (!value.is_null()).then_some(value)
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, DefaultValue::Deferred(_))
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            DefaultValue::Deferred(_) => f.write_str("Deferred(<callback>)"),
        }
    }
}

/// A property filled from a literal or computed default
///
/// The declared type starts out as the Rust type name of the value (`&str`,
/// `i32`, ...). Field policies match on it, so give the field a stable name
/// with [`of_type`](DefaultField::of_type) before targeting it with one.
#[derive(Clone, Debug)]
pub struct DefaultField {
    name: String,
    declared_type: String,
    value: DefaultValue,
}

impl DefaultField {
    /// Default to a literal value
    pub fn literal<V: Into<Value>>(name: impl Into<String>, value: V) -> Self {
        Self {
            name: name.into(),
            declared_type: std::any::type_name::<V>().to_string(),
            value: DefaultValue::Literal(value.into()),
        }
    }

    /// Default to a value computed from the seed model
    pub fn deferred<F, V>(name: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&Model) -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        Self {
            name: name.into(),
            declared_type: std::any::type_name::<V>().to_string(),
            value: DefaultValue::Deferred(Arc::new(move |seed| callback(seed).into())),
        }
    }

    /// Default to a freshly generated value that ignores the seed
    pub fn generated<F, V>(name: impl Into<String>, generator: F) -> Self
    where
        F: Fn() -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        Self::deferred(name, move |_seed: &Model| generator())
    }

    /// Override the declared type used for field policy lookup
    pub fn of_type(mut self, declared_type: impl Into<String>) -> Self {
        self.declared_type = declared_type.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared_type(&self) -> &str {
        &self.declared_type
    }

    pub fn value(&self) -> &DefaultValue {
        &self.value
    }
}

/// A nested model synthesized from the target type's blueprint
#[derive(Clone, Debug)]
pub struct MappedField {
    name: String,
    declared_type: String,
    target: Option<String>,
    nullable: bool,
}

impl MappedField {
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            target: None,
            nullable: false,
        }
    }

    /// Declare the field with a typed model as its type
    pub fn of<T: Modeled>(name: impl Into<String>) -> Self {
        Self::new(name, T::model_type())
    }

    /// Synthesize this type instead of the declared one
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Leave the field empty instead of synthesizing a model
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared_type(&self) -> &str {
        &self.declared_type
    }

    pub fn target_type(&self) -> &str {
        self.target.as_deref().unwrap_or(&self.declared_type)
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }
}

macro_rules! mapped_collection_field {
    ($(#[$meta:meta])* $field:ident, $default:expr) => {
        $(#[$meta])*
        #[derive(Clone, Debug)]
        pub struct $field {
            name: String,
            declared_type: String,
            target: Option<String>,
            size: usize,
            implementation: Option<CollectionImpl>,
        }

        impl $field {
            /// Create a field whose declared type is the element type
            pub fn new(name: impl Into<String>, element_type: impl Into<String>) -> Self {
                Self {
                    name: name.into(),
                    declared_type: element_type.into(),
                    target: None,
                    size: DEFAULT_COLLECTION_SIZE,
                    implementation: None,
                }
            }

            /// Declare the field with a typed model as its element type
            pub fn of<T: Modeled>(name: impl Into<String>) -> Self {
                Self::new(name, T::model_type())
            }

            /// Synthesize elements of this type instead of the declared one
            pub fn target(mut self, target: impl Into<String>) -> Self {
                self.target = Some(target.into());
                self
            }

            /// Number of elements created when the seed has no collection
            pub fn size(mut self, size: usize) -> Self {
                self.size = size;
                self
            }

            /// Collection implementation to populate
            pub fn implementation(mut self, implementation: CollectionImpl) -> Self {
                self.implementation = Some(implementation);
                self
            }

            pub fn name(&self) -> &str {
                &self.name
            }

            pub fn declared_type(&self) -> &str {
                &self.declared_type
            }

            pub fn target_type(&self) -> &str {
                self.target.as_deref().unwrap_or(&self.declared_type)
            }

            pub fn element_count(&self) -> usize {
                self.size
            }

            pub fn collection(&self) -> CollectionImpl {
                self.implementation.unwrap_or($default)
            }
        }
    };
}

mapped_collection_field!(
    /// An ordered collection of nested models
    MappedListField,
    CollectionImpl::DEFAULT_LIST
);

mapped_collection_field!(
    /// A deduplicating collection of nested models
    MappedSetField,
    CollectionImpl::DEFAULT_SET
);

/// Kind tag of a [`FieldSpec`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Default,
    Mapped,
    MappedList,
    MappedSet,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Default => write!(f, "default"),
            FieldKind::Mapped => write!(f, "mapped"),
            FieldKind::MappedList => write!(f, "mapped list"),
            FieldKind::MappedSet => write!(f, "mapped set"),
        }
    }
}

/// One field of a blueprint
#[derive(Clone, Debug)]
pub enum FieldSpec {
    Default(DefaultField),
    Mapped(MappedField),
    MappedList(MappedListField),
    MappedSet(MappedSetField),
}

impl FieldSpec {
    pub fn name(&self) -> &str {
        match self {
            FieldSpec::Default(field) => field.name(),
            FieldSpec::Mapped(field) => field.name(),
            FieldSpec::MappedList(field) => field.name(),
            FieldSpec::MappedSet(field) => field.name(),
        }
    }

    pub fn declared_type(&self) -> &str {
        match self {
            FieldSpec::Default(field) => field.declared_type(),
            FieldSpec::Mapped(field) => field.declared_type(),
            FieldSpec::MappedList(field) => field.declared_type(),
            FieldSpec::MappedSet(field) => field.declared_type(),
        }
    }

    /// The type field policies are keyed by
    ///
    /// For list and set fields this is the element type.
    pub fn target(&self) -> &str {
        match self {
            FieldSpec::Default(field) => field.declared_type(),
            FieldSpec::Mapped(field) => field.target_type(),
            FieldSpec::MappedList(field) => field.target_type(),
            FieldSpec::MappedSet(field) => field.target_type(),
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            FieldSpec::Default(_) => FieldKind::Default,
            FieldSpec::Mapped(_) => FieldKind::Mapped,
            FieldSpec::MappedList(_) => FieldKind::MappedList,
            FieldSpec::MappedSet(_) => FieldKind::MappedSet,
        }
    }

    /// Resolve targets and collection implementations at registration time
    pub(crate) fn resolve(self, blueprint: &str) -> RegisterResult<FieldSpec> {
        let invalid = |field: &str, reason: &str| RegisterBlueprintError::InvalidField {
            target: blueprint.to_string(),
            field: field.to_string(),
            reason: reason.to_string(),
        };

        if self.name().trim().is_empty() {
            return Err(invalid(self.name(), "field name is empty"));
        }
        if self.kind() != FieldKind::Default && self.target().trim().is_empty() {
            return Err(invalid(self.name(), "field has no target type"));
        }

        let check = |field: &str, implementation: CollectionImpl, expected: CollectionSemantics| {
            if implementation.semantics() == expected {
                Ok(implementation)
            } else {
                Err(RegisterBlueprintError::InvalidCollection {
                    target: blueprint.to_string(),
                    field: field.to_string(),
                    implementation,
                    expected,
                })
            }
        };

        Ok(match self {
            FieldSpec::Default(field) => FieldSpec::Default(field),
            FieldSpec::Mapped(mut field) => {
                field.target = Some(field.target_type().to_string());
                FieldSpec::Mapped(field)
            }
            FieldSpec::MappedList(mut field) => {
                let implementation =
                    check(field.name(), field.collection(), CollectionSemantics::List)?;
                field.implementation = Some(implementation);
                field.target = Some(field.target_type().to_string());
                FieldSpec::MappedList(field)
            }
            FieldSpec::MappedSet(mut field) => {
                let implementation =
                    check(field.name(), field.collection(), CollectionSemantics::Set)?;
                field.implementation = Some(implementation);
                field.target = Some(field.target_type().to_string());
                FieldSpec::MappedSet(field)
            }
        })
    }
}

impl From<DefaultField> for FieldSpec {
    fn from(field: DefaultField) -> Self {
        FieldSpec::Default(field)
    }
}

impl From<MappedField> for FieldSpec {
    fn from(field: MappedField) -> Self {
        FieldSpec::Mapped(field)
    }
}

impl From<MappedListField> for FieldSpec {
    fn from(field: MappedListField) -> Self {
        FieldSpec::MappedList(field)
    }
}

impl From<MappedSetField> for FieldSpec {
    fn from(field: MappedSetField) -> Self {
        FieldSpec::MappedSet(field)
    }
}
