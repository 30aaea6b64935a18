//! Model factory: blueprint and policy registry
//!
//! The [`ModelFactory`] owns every registered blueprint (as an [`Erector`])
//! and the policies attached to model types. Model creation lives in the
//! [`engine`](crate::engine) module.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::blueprint::{Blueprint, BlueprintCatalog, BlueprintDefinition, BlueprintSource};
use crate::config::{DuplicateBlueprintMode, FactoryConfig};
use crate::erector::Erector;
use crate::error::{PolicyError, PolicyKind, PolicyResult, RegisterBlueprintError, RegisterResult};
use crate::field::FieldSpec;
use crate::policy::{BlueprintPolicy, FieldPolicy, Policy};
use crate::template::{PropertyTemplate, Template};

/// Registry of blueprints and policies that creates models on demand
///
/// A factory is `Send` but not `Sync`: each erector carries the mutable state
/// of the construction in flight. Use one factory per thread, or wrap it in a
/// `Mutex` when it has to be shared.
pub struct ModelFactory {
    pub(crate) config: FactoryConfig,
    pub(crate) template: Arc<dyn Template>,
    catalog: BlueprintCatalog,
    blueprints: Vec<Arc<Blueprint>>,
    pub(crate) erectors: HashMap<String, Erector>,
    pub(crate) blueprint_policies: HashMap<String, Vec<Arc<dyn BlueprintPolicy>>>,
    pub(crate) field_policies: HashMap<String, Vec<Arc<dyn FieldPolicy>>>,
    pub(crate) depth: Cell<usize>,
    pub(crate) policy_failures: RefCell<Vec<PolicyError>>,
}

impl ModelFactory {
    /// Create a factory with the default configuration
    pub fn new() -> Self {
        Self::with_config(FactoryConfig::default())
    }

    pub fn with_config(config: FactoryConfig) -> Self {
        Self {
            config,
            template: Arc::new(PropertyTemplate),
            catalog: BlueprintCatalog::new(),
            blueprints: Vec::new(),
            erectors: HashMap::new(),
            blueprint_policies: HashMap::new(),
            field_policies: HashMap::new(),
            depth: Cell::new(0),
            policy_failures: RefCell::new(Vec::new()),
        }
    }

    /// Use a custom object-access template
    pub fn with_template(mut self, template: impl Template + 'static) -> Self {
        self.template = Arc::new(template);
        self
    }

    /// Use a catalog for registration by name
    pub fn with_catalog(mut self, catalog: BlueprintCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Register a blueprint descriptor
    pub fn register_blueprint(&mut self, blueprint: Blueprint) -> RegisterResult<()> {
        let target = blueprint.target().trim().to_string();
        if target.is_empty() {
            return Err(RegisterBlueprintError::MissingTarget);
        }

        tracing::info!("Registering blueprint for {}", target);

        let mut seen = HashSet::new();
        let mut fields = Vec::with_capacity(blueprint.fields().len());
        for field in blueprint.fields() {
            if !seen.insert(field.name().to_string()) {
                return Err(RegisterBlueprintError::DuplicateField {
                    target,
                    field: field.name().to_string(),
                });
            }

            let field = field.clone().resolve(&target)?;
            log_field(&field);
            fields.push(field);
        }

        if self.erectors.contains_key(&target) {
            match self.config.duplicate_blueprints {
                DuplicateBlueprintMode::Reject => {
                    return Err(RegisterBlueprintError::Duplicate(target));
                }
                DuplicateBlueprintMode::Replace => {
                    tracing::warn!("Replacing previously registered blueprint for {}", target);
                }
            }
        }

        let blueprint = Arc::new(blueprint);
        self.blueprints.push(Arc::clone(&blueprint));
        self.erectors
            .insert(target.clone(), Erector::new(target, blueprint, fields));
        Ok(())
    }

    /// Register the blueprint a type declares
    pub fn register<B: BlueprintDefinition>(&mut self) -> RegisterResult<()> {
        self.register_blueprint(B::blueprint())
    }

    /// Register a blueprint from the catalog by name
    pub fn register_named(&mut self, name: &str) -> RegisterResult<()> {
        let blueprint = self.catalog.instantiate(name)?;
        self.register_blueprint(blueprint)
    }

    /// Register blueprints in order, stopping at the first failure
    pub fn register_blueprints<I, S>(&mut self, sources: I) -> RegisterResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<BlueprintSource>,
    {
        for source in sources {
            match source.into() {
                BlueprintSource::Descriptor(blueprint) => self.register_blueprint(blueprint)?,
                BlueprintSource::Named(name) => self.register_named(&name)?,
            }
        }
        Ok(())
    }

    /// Add a policy; its target type must already have a blueprint
    ///
    /// Policies run in registration order, so later ones see (and may add
    /// to) the commands issued by earlier ones.
    pub fn add_policy(&mut self, policy: Policy) -> PolicyResult<()> {
        if !self.erectors.contains_key(policy.target()) {
            return Err(PolicyError::UnregisteredTarget {
                kind: policy.kind(),
                target: policy.target().to_string(),
            });
        }

        match policy {
            Policy::Blueprint(policy) => {
                tracing::info!(
                    "Setting BlueprintPolicy {} for {}",
                    policy.policy_name(),
                    policy.target()
                );
                self.blueprint_policies
                    .entry(policy.target().to_string())
                    .or_default()
                    .push(policy);
            }
            Policy::Field(policy) => {
                tracing::info!(
                    "Setting FieldPolicy {} for {}",
                    policy.policy_name(),
                    policy.target()
                );
                self.field_policies
                    .entry(policy.target().to_string())
                    .or_default()
                    .push(policy);
            }
        }
        Ok(())
    }

    pub fn add_blueprint_policy(&mut self, policy: impl BlueprintPolicy + 'static) -> PolicyResult<()> {
        self.add_policy(Policy::blueprint(policy))
    }

    pub fn add_field_policy(&mut self, policy: impl FieldPolicy + 'static) -> PolicyResult<()> {
        self.add_policy(Policy::field(policy))
    }

    /// Every registered blueprint, in registration order
    pub fn blueprints(&self) -> &[Arc<Blueprint>] {
        &self.blueprints
    }

    pub fn erectors(&self) -> &HashMap<String, Erector> {
        &self.erectors
    }

    pub fn erector(&self, model_type: &str) -> Option<&Erector> {
        self.erectors.get(model_type)
    }

    pub fn is_registered(&self, model_type: &str) -> bool {
        self.erectors.contains_key(model_type)
    }

    pub fn blueprint_policies(&self) -> &HashMap<String, Vec<Arc<dyn BlueprintPolicy>>> {
        &self.blueprint_policies
    }

    pub fn field_policies(&self) -> &HashMap<String, Vec<Arc<dyn FieldPolicy>>> {
        &self.field_policies
    }

    pub fn config(&self) -> &FactoryConfig {
        &self.config
    }

    pub fn template(&self) -> &dyn Template {
        self.template.as_ref()
    }

    pub fn catalog(&self) -> &BlueprintCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut BlueprintCatalog {
        &mut self.catalog
    }

    /// Drain policy failures collected under `PolicyErrorMode::Collect`
    pub fn take_policy_failures(&self) -> Vec<PolicyError> {
        self.policy_failures.take()
    }

    pub(crate) fn policy_count(&self, kind: PolicyKind) -> usize {
        match kind {
            PolicyKind::Blueprint => self.blueprint_policies.values().map(Vec::len).sum(),
            PolicyKind::Field => self.field_policies.values().map(Vec::len).sum(),
        }
    }
}

impl Default for ModelFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ModelFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelFactory")
            .field("config", &self.config)
            .field("template", &self.template)
            .field("blueprints", &self.blueprints.len())
            .field("erectors", &self.erectors.keys().collect::<Vec<_>>())
            .field("blueprint_policies", &self.policy_count(PolicyKind::Blueprint))
            .field("field_policies", &self.policy_count(PolicyKind::Field))
            .finish()
    }
}

fn log_field(field: &FieldSpec) {
    match field {
        FieldSpec::Default(default) => {
            tracing::debug!("  Setting default for {} to {:?}", default.name(), default.value())
        }
        FieldSpec::Mapped(mapped) => {
            tracing::debug!("  Setting mapped for {} to {}", mapped.name(), mapped.target_type())
        }
        FieldSpec::MappedList(list) => tracing::debug!(
            "  Setting mapped list for {} as {}<{}>",
            list.name(),
            list.collection(),
            list.target_type()
        ),
        FieldSpec::MappedSet(set) => tracing::debug!(
            "  Setting mapped set for {} as {}<{}>",
            set.name(),
            set.collection(),
            set.target_type()
        ),
    }
}
