//! Model construction
//!
//! Building a model walks the erector's fields in declaration order. For each
//! field the commands issued by policies decide where the value comes from:
//!
//! 1. `SkipInjection` leaves the field at its zero value.
//! 2. Otherwise a value already set on the seed wins, unless
//!    `SkipReferenceInjection` hides the seed.
//! 3. Only when the seed supplied nothing does the blueprint step in (default
//!    value, nested model, collection population), unless
//!    `SkipBlueprintInjection` suppresses it.
//!
//! Collection fields always receive a fresh collection. Elements already on
//! the seed are completed one by one against the element type's blueprint;
//! `SkipReferenceInjection` does not hide them.
//!
//! Nested models and collection elements are built with policies enabled,
//! whatever the outer call asked for.

use serde_json::Value;
use std::cell::Cell;

use crate::collection::CollectionImpl;
use crate::command::Command;
use crate::config::PolicyErrorMode;
use crate::erector::Erector;
use crate::error::{CreateModelError, CreateModelResult, PolicyError, TemplateError};
use crate::factory::ModelFactory;
use crate::field::FieldSpec;
use crate::model::{Model, Modeled};

/// Where a construction starts from
#[derive(Debug, Clone)]
pub enum Seed {
    /// A bare model type; the template constructs a zero-valued seed
    Type(String),
    /// A partially populated model whose set properties take precedence
    Instance(Model),
}

impl From<&str> for Seed {
    fn from(model_type: &str) -> Self {
        Seed::Type(model_type.to_string())
    }
}

impl From<String> for Seed {
    fn from(model_type: String) -> Self {
        Seed::Type(model_type)
    }
}

impl From<Model> for Seed {
    fn from(model: Model) -> Self {
        Seed::Instance(model)
    }
}

/// Collection field being populated
struct CollectionPlan<'a> {
    property: &'a str,
    target: &'a str,
    size: usize,
    implementation: CollectionImpl,
}

impl ModelFactory {
    /// Create a model from a type name or seed, running policies
    pub fn create_model(&self, seed: impl Into<Seed>) -> CreateModelResult<Model> {
        self.create_model_with(seed, true)
    }

    /// Create a model from a type name or seed
    pub fn create_model_with(
        &self,
        seed: impl Into<Seed>,
        with_policies: bool,
    ) -> CreateModelResult<Model> {
        let seed = match seed.into() {
            Seed::Type(model_type) => self.template.construct(&model_type)?,
            Seed::Instance(model) => model,
        };
        self.erect(seed, with_policies)
    }

    /// Create several independent models of one type
    pub fn create_models(&self, model_type: &str, count: usize) -> CreateModelResult<Vec<Model>> {
        let mut models = Vec::with_capacity(count);
        for _ in 0..count {
            models.push(self.create_model(model_type)?);
        }
        Ok(models)
    }

    /// Create a typed model, running policies
    pub fn create<T: Modeled>(&self) -> CreateModelResult<T> {
        self.create_with(true)
    }

    /// Create a typed model
    pub fn create_with<T: Modeled>(&self, with_policies: bool) -> CreateModelResult<T> {
        let model = self.create_model_with(T::model_type(), with_policies)?;
        Ok(model.into_typed()?)
    }

    /// Complete a typed seed, keeping the fields it already sets
    pub fn create_from<T: Modeled>(&self, seed: &T) -> CreateModelResult<T> {
        self.create_from_with(seed, true)
    }

    pub fn create_from_with<T: Modeled>(
        &self,
        seed: &T,
        with_policies: bool,
    ) -> CreateModelResult<T> {
        let model = self.create_model_with(Model::from_typed(seed)?, with_policies)?;
        Ok(model.into_typed()?)
    }

    /// Create several independent typed models
    pub fn create_many<T: Modeled>(&self, count: usize) -> CreateModelResult<Vec<T>> {
        let mut models = Vec::with_capacity(count);
        for _ in 0..count {
            models.push(self.create()?);
        }
        Ok(models)
    }

    fn erect(&self, seed: Model, with_policies: bool) -> CreateModelResult<Model> {
        let erector = self
            .erectors
            .get(seed.model_type())
            .ok_or_else(|| CreateModelError::UnregisteredBlueprint(seed.model_type().to_string()))?;

        let _depth = self.enter(erector.target())?;
        let _binding = erector.bind(seed.clone());

        tracing::debug!("Creating model {}", erector.target());

        let mut model = self.template.construct(erector.target())?;

        if with_policies {
            self.apply_blueprint_policies(erector, &model)?;
        }

        for field in erector.fields() {
            if with_policies {
                self.apply_field_policies(erector, field, &model)?;
            }

            let commands = erector.commands(field.name());
            tracing::debug!(
                "  Field {} ({}) commands: {:?}",
                field.name(),
                field.kind(),
                commands
            );

            if commands.contains(&Command::SkipInjection) {
                continue;
            }

            let skip_blueprint = commands.contains(&Command::SkipBlueprintInjection);
            let skip_reference = commands.contains(&Command::SkipReferenceInjection);
            let reference = match field {
                // Seed collections are always completed, never replaced
                FieldSpec::MappedList(_) | FieldSpec::MappedSet(_) => {
                    self.template.get(&seed, field.name())?
                }
                _ if skip_reference => None,
                _ => self.template.get(&seed, field.name())?,
            };

            let value = match field {
                FieldSpec::Default(default) => match reference {
                    Some(value) => Some(value),
                    None if skip_blueprint => None,
                    None => default.value().resolve(&seed),
                },
                FieldSpec::Mapped(mapped) => match reference {
                    Some(value) => Some(value),
                    None if skip_blueprint || mapped.is_nullable() => None,
                    None => Some(self.create_model(mapped.target_type())?.into_value()),
                },
                FieldSpec::MappedList(list) => Some(self.populate_collection(
                    erector.target(),
                    CollectionPlan {
                        property: list.name(),
                        target: list.target_type(),
                        size: list.element_count(),
                        implementation: list.collection(),
                    },
                    reference,
                    skip_blueprint,
                )?),
                FieldSpec::MappedSet(set) => Some(self.populate_collection(
                    erector.target(),
                    CollectionPlan {
                        property: set.name(),
                        target: set.target_type(),
                        size: set.element_count(),
                        implementation: set.collection(),
                    },
                    reference,
                    skip_blueprint,
                )?),
            };

            model = self.template.set(model, field.name(), value)?;
        }

        Ok(model)
    }

    fn populate_collection(
        &self,
        model_type: &str,
        plan: CollectionPlan<'_>,
        reference: Option<Value>,
        skip_blueprint: bool,
    ) -> CreateModelResult<Value> {
        let mut collection = plan.implementation.new_collection();
        if skip_blueprint {
            return Ok(collection.into_value());
        }

        match reference {
            None => {
                for _ in 0..plan.size {
                    let element = self.create_model(plan.target)?;
                    collection.insert(element.into_value());
                }
            }
            Some(Value::Array(items)) => {
                for item in items {
                    let seed = Model::from_value(plan.target, item)?;
                    collection.insert(self.erect(seed, true)?.into_value());
                }
            }
            Some(_) => {
                return Err(TemplateError::NotACollection {
                    model_type: model_type.to_string(),
                    property: plan.property.to_string(),
                }
                .into());
            }
        }

        Ok(collection.into_value())
    }

    fn apply_blueprint_policies(&self, erector: &Erector, model: &Model) -> CreateModelResult<()> {
        let Some(policies) = self.blueprint_policies.get(erector.target()) else {
            return Ok(());
        };

        tracing::debug!("  Running Blueprint policies");
        for policy in policies {
            tracing::debug!("    processing {}", policy.policy_name());
            match policy.process(self, erector, model) {
                Ok(commands) => erector.add_commands(commands),
                Err(error) => self.policy_failed(erector.target(), error)?,
            }
        }
        Ok(())
    }

    fn apply_field_policies(
        &self,
        erector: &Erector,
        field: &FieldSpec,
        model: &Model,
    ) -> CreateModelResult<()> {
        let Some(policies) = self.field_policies.get(field.target()) else {
            return Ok(());
        };

        tracing::debug!("  Running Field policies");
        for policy in policies {
            tracing::debug!("    processing {} for {}", policy.policy_name(), field.target());
            match policy.process(self, erector, field, model) {
                Ok(Some(command)) => erector.add_command(field.name(), command),
                Ok(None) => {}
                Err(error) => self.policy_failed(erector.target(), error)?,
            }
        }
        Ok(())
    }

    fn policy_failed(&self, model_type: &str, error: PolicyError) -> CreateModelResult<()> {
        match self.config.policy_errors {
            PolicyErrorMode::FailFast => Err(CreateModelError::Policy {
                model_type: model_type.to_string(),
                source: error,
            }),
            PolicyErrorMode::Collect => {
                tracing::warn!("Policy failed while creating {}: {}", model_type, error);
                self.policy_failures.borrow_mut().push(error);
                Ok(())
            }
        }
    }

    fn enter(&self, model_type: &str) -> CreateModelResult<DepthGuard<'_>> {
        let depth = self.depth.get() + 1;
        if let Some(limit) = self.config.max_depth {
            if depth > limit {
                return Err(CreateModelError::RecursionLimit {
                    model_type: model_type.to_string(),
                    limit,
                });
            }
        }
        self.depth.set(depth);
        Ok(DepthGuard { depth: &self.depth })
    }
}

/// Tracks nesting of in-flight constructions
struct DepthGuard<'a> {
    depth: &'a Cell<usize>,
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}
