//! Per-model-type build context
//!
//! An [`Erector`] binds a registered blueprint to its resolved fields and
//! carries the live state of the construction in flight: the seed model and
//! the commands policies issued for each field. That state lives in a stack
//! of frames, one per active construction of the erector's type, so nested
//! constructions of the same type never see or clobber the outer call's
//! commands. Once a construction finishes its frame is kept as the last
//! completed one and stays readable.
//!
//! The state uses `RefCell`, which makes erectors (and the factory holding
//! them) `!Sync`. Share a factory between threads only behind a lock.

use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

use crate::blueprint::Blueprint;
use crate::command::{Command, CommandSet, CommandTable};
use crate::field::FieldSpec;
use crate::model::Model;

#[derive(Debug, Clone)]
struct BuildFrame {
    seed: Model,
    commands: CommandTable,
}

pub struct Erector {
    target: String,
    blueprint: Arc<Blueprint>,
    fields: Vec<FieldSpec>,
    frames: RefCell<Vec<BuildFrame>>,
    last: RefCell<Option<BuildFrame>>,
}

impl Erector {
    pub(crate) fn new(target: String, blueprint: Arc<Blueprint>, fields: Vec<FieldSpec>) -> Self {
        Self {
            target,
            blueprint,
            fields,
            frames: RefCell::new(Vec::new()),
            last: RefCell::new(None),
        }
    }

    /// Model type this erector builds
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn blueprint(&self) -> &Blueprint {
        &self.blueprint
    }

    /// Resolved fields in declaration order
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name() == name)
    }

    /// Seed bound to the current (or last finished) construction
    pub fn seed(&self) -> Option<Model> {
        self.read(|frame| frame.seed.clone())
    }

    /// Commands accumulated for a field in the current construction
    pub fn commands(&self, field: &str) -> CommandSet {
        self.read(|frame| frame.commands.get(field).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    /// All commands accumulated in the current construction
    pub fn command_table(&self) -> CommandTable {
        self.read(|frame| frame.commands.clone()).unwrap_or_default()
    }

    pub fn has_command(&self, field: &str, command: Command) -> bool {
        self.read(|frame| frame.commands.contains(field, command))
            .unwrap_or(false)
    }

    /// Number of constructions of this type currently in flight
    pub fn active_builds(&self) -> usize {
        self.frames.borrow().len()
    }

    /// Bind a seed for a new construction with an empty command table
    pub(crate) fn bind(&self, seed: Model) -> ErectorBinding<'_> {
        self.frames.borrow_mut().push(BuildFrame {
            seed,
            commands: CommandTable::new(),
        });
        ErectorBinding { erector: self }
    }

    pub(crate) fn add_command(&self, field: &str, command: Command) {
        if let Some(frame) = self.frames.borrow_mut().last_mut() {
            frame.commands.add(field, command);
        }
    }

    pub(crate) fn add_commands(&self, commands: CommandTable) {
        if let Some(frame) = self.frames.borrow_mut().last_mut() {
            frame.commands.merge(commands);
        }
    }

    fn read<R>(&self, f: impl FnOnce(&BuildFrame) -> R) -> Option<R> {
        if let Some(frame) = self.frames.borrow().last() {
            return Some(f(frame));
        }
        self.last.borrow().as_ref().map(f)
    }
}

impl fmt::Debug for Erector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Erector")
            .field("target", &self.target)
            .field("fields", &self.fields)
            .field("active_builds", &self.active_builds())
            .finish()
    }
}

/// Keeps a construction's frame bound until dropped
pub(crate) struct ErectorBinding<'a> {
    erector: &'a Erector,
}

impl Drop for ErectorBinding<'_> {
    fn drop(&mut self) {
        let finished = self.erector.frames.borrow_mut().pop();
        if finished.is_some() {
            *self.erector.last.borrow_mut() = finished;
        }
    }
}
