//! Policies customizing injection per construction
//!
//! A [`BlueprintPolicy`] runs once per construction of its target model type
//! and returns commands for any of that model's fields. A [`FieldPolicy`] is
//! keyed by a field's *target* type instead, so it applies to every field that
//! resolves to that type across all blueprints.

use std::fmt;
use std::sync::Arc;

use crate::command::{Command, CommandTable};
use crate::erector::Erector;
use crate::error::{PolicyKind, PolicyResult};
use crate::factory::ModelFactory;
use crate::field::FieldSpec;
use crate::model::Model;

/// Policy applied once per construction of a model type
pub trait BlueprintPolicy: Send + Sync {
    /// Model type the policy applies to
    fn target(&self) -> &str;

    /// Produce commands for the model's fields
    fn process(
        &self,
        factory: &ModelFactory,
        erector: &Erector,
        model: &Model,
    ) -> PolicyResult<CommandTable>;

    /// Name used in logs and errors
    fn policy_name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Policy applied to every field targeting a model type
pub trait FieldPolicy: Send + Sync {
    /// Field target type the policy applies to
    fn target(&self) -> &str;

    /// Produce at most one command for the field
    fn process(
        &self,
        factory: &ModelFactory,
        erector: &Erector,
        field: &FieldSpec,
        model: &Model,
    ) -> PolicyResult<Option<Command>>;

    /// Name used in logs and errors
    fn policy_name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// A policy of either granularity
#[derive(Clone)]
pub enum Policy {
    Blueprint(Arc<dyn BlueprintPolicy>),
    Field(Arc<dyn FieldPolicy>),
}

impl Policy {
    pub fn blueprint(policy: impl BlueprintPolicy + 'static) -> Self {
        Policy::Blueprint(Arc::new(policy))
    }

    pub fn field(policy: impl FieldPolicy + 'static) -> Self {
        Policy::Field(Arc::new(policy))
    }

    /// Blueprint policy from a closure
    pub fn blueprint_fn<F>(target: impl Into<String>, process: F) -> Self
    where
        F: Fn(&ModelFactory, &Erector, &Model) -> PolicyResult<CommandTable> + Send + Sync + 'static,
    {
        Self::blueprint(FnBlueprintPolicy {
            target: target.into(),
            process,
        })
    }

    /// Field policy from a closure
    pub fn field_fn<F>(target: impl Into<String>, process: F) -> Self
    where
        F: Fn(&ModelFactory, &Erector, &FieldSpec, &Model) -> PolicyResult<Option<Command>>
            + Send
            + Sync
            + 'static,
    {
        Self::field(FnFieldPolicy {
            target: target.into(),
            process,
        })
    }

    pub fn kind(&self) -> PolicyKind {
        match self {
            Policy::Blueprint(_) => PolicyKind::Blueprint,
            Policy::Field(_) => PolicyKind::Field,
        }
    }

    pub fn target(&self) -> &str {
        match self {
            Policy::Blueprint(policy) => policy.target(),
            Policy::Field(policy) => policy.target(),
        }
    }

    pub fn policy_name(&self) -> &str {
        match self {
            Policy::Blueprint(policy) => policy.policy_name(),
            Policy::Field(policy) => policy.policy_name(),
        }
    }
}

impl fmt::Debug for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Policy")
            .field("kind", &self.kind())
            .field("target", &self.target())
            .field("name", &self.policy_name())
            .finish()
    }
}

struct FnBlueprintPolicy<F> {
    target: String,
    process: F,
}

impl<F> BlueprintPolicy for FnBlueprintPolicy<F>
where
    F: Fn(&ModelFactory, &Erector, &Model) -> PolicyResult<CommandTable> + Send + Sync,
{
    fn target(&self) -> &str {
        &self.target
    }

    fn process(
        &self,
        factory: &ModelFactory,
        erector: &Erector,
        model: &Model,
    ) -> PolicyResult<CommandTable> {
        (self.process)(factory, erector, model)
    }

    fn policy_name(&self) -> &str {
        "blueprint_fn"
    }
}

struct FnFieldPolicy<F> {
    target: String,
    process: F,
}

impl<F> FieldPolicy for FnFieldPolicy<F>
where
    F: Fn(&ModelFactory, &Erector, &FieldSpec, &Model) -> PolicyResult<Option<Command>> + Send + Sync,
{
    fn target(&self) -> &str {
        &self.target
    }

    fn process(
        &self,
        factory: &ModelFactory,
        erector: &Erector,
        field: &FieldSpec,
        model: &Model,
    ) -> PolicyResult<Option<Command>> {
        (self.process)(factory, erector, field, model)
    }

    fn policy_name(&self) -> &str {
        "field_fn"
    }
}

/// Issue one command for a fixed set of fields on a model type
#[derive(Debug, Clone)]
pub struct SkipFieldsPolicy {
    target: String,
    fields: Vec<String>,
    command: Command,
}

impl SkipFieldsPolicy {
    /// Skip injection entirely for the named fields
    pub fn new<I, S>(target: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            target: target.into(),
            fields: fields.into_iter().map(Into::into).collect(),
            command: Command::SkipInjection,
        }
    }

    /// Issue a different command for the named fields
    pub fn command(mut self, command: Command) -> Self {
        self.command = command;
        self
    }
}

impl BlueprintPolicy for SkipFieldsPolicy {
    fn target(&self) -> &str {
        &self.target
    }

    fn process(
        &self,
        _factory: &ModelFactory,
        _erector: &Erector,
        _model: &Model,
    ) -> PolicyResult<CommandTable> {
        Ok(self
            .fields
            .iter()
            .map(|field| (field.clone(), self.command))
            .collect())
    }

    fn policy_name(&self) -> &str {
        "SkipFieldsPolicy"
    }
}

/// Issue a fixed command for every field targeting a model type
#[derive(Debug, Clone)]
pub struct CommandFieldPolicy {
    target: String,
    command: Command,
}

impl CommandFieldPolicy {
    pub fn new(target: impl Into<String>, command: Command) -> Self {
        Self {
            target: target.into(),
            command,
        }
    }
}

impl FieldPolicy for CommandFieldPolicy {
    fn target(&self) -> &str {
        &self.target
    }

    fn process(
        &self,
        _factory: &ModelFactory,
        _erector: &Erector,
        _field: &FieldSpec,
        _model: &Model,
    ) -> PolicyResult<Option<Command>> {
        Ok(Some(self.command))
    }

    fn policy_name(&self) -> &str {
        "CommandFieldPolicy"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::Blueprint;
    use crate::field::DefaultField;

    #[test]
    fn test_skip_fields_policy_commands() {
        let factory = ModelFactory::new();
        let blueprint = Blueprint::new("Car").field(DefaultField::literal("make", "Toyota"));
        let erector = Erector::new(
            "Car".to_string(),
            Arc::new(blueprint.clone()),
            blueprint.fields().to_vec(),
        );

        let policy = SkipFieldsPolicy::new("Car", ["make", "status"])
            .command(Command::SkipReferenceInjection);
        let table = policy
            .process(&factory, &erector, &Model::new("Car"))
            .unwrap();

        assert!(table.contains("make", Command::SkipReferenceInjection));
        assert!(table.contains("status", Command::SkipReferenceInjection));
        assert!(!table.contains("make", Command::SkipInjection));
    }

    #[test]
    fn test_policy_metadata() {
        let policy = Policy::field(CommandFieldPolicy::new("Wheel", Command::SkipInjection));
        assert_eq!(policy.kind(), PolicyKind::Field);
        assert_eq!(policy.target(), "Wheel");
        assert_eq!(policy.policy_name(), "CommandFieldPolicy");

        let policy = Policy::blueprint_fn("Car", |_, _, _| Ok(CommandTable::new()));
        assert_eq!(policy.kind(), PolicyKind::Blueprint);
        assert_eq!(policy.policy_name(), "blueprint_fn");
    }
}
