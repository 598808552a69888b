//! Target domain model
//!
//! A target is a named buildable unit. Targets live in a single
//! [`TargetRegistry`] and everything else refers to them by [`TargetId`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TargetError {
    #[error("Target not found: {0}")]
    NotFound(String),
}

/// Stable handle of a target inside its registry
///
/// Ids are dense and assigned in first-seen order, so they double as
/// vertex indices in the dependency graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(usize);

impl TargetId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind of a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// Externally modifiable; asked whether it changed since the last build
    #[default]
    File,
    /// Virtual; stale only through its dependencies
    Task,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::File => "file",
            TargetKind::Task => "task",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A single buildable unit
#[derive(Debug, Clone, Serialize)]
pub struct Target {
    name: String,
    kind: TargetKind,
    modified: bool,
}

impl Target {
    /// Creates an unmodified target
    pub fn new(name: impl Into<String>, kind: TargetKind) -> Self {
        Self {
            name: name.into(),
            kind,
            modified: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    pub fn is_file(&self) -> bool {
        self.kind == TargetKind::File
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Sets the modification flag, returning the previous value
    pub fn set_modified(&mut self, modified: bool) -> bool {
        std::mem::replace(&mut self.modified, modified)
    }

    pub(crate) fn set_kind(&mut self, kind: TargetKind) {
        self.kind = kind;
    }
}

// Identity is the name alone.
impl PartialEq for Target {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Target {}

impl std::hash::Hash for Target {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

/// Owning registry of targets, addressed by name or by id
#[derive(Debug, Clone, Default)]
pub struct TargetRegistry {
    targets: Vec<Target>,
    by_name: HashMap<String, TargetId>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id for `name`, creating a target of `kind` if it is new
    ///
    /// An existing target keeps its current kind.
    pub fn get_or_insert(&mut self, name: &str, kind: TargetKind) -> TargetId {
        if let Some(id) = self.by_name.get(name) {
            return *id;
        }

        let id = TargetId::new(self.targets.len());
        self.targets.push(Target::new(name, kind));
        self.by_name.insert(name.to_string(), id);
        id
    }

    /// Inserts or re-declares `name` with the given kind
    pub fn declare(&mut self, name: &str, kind: TargetKind) -> TargetId {
        let id = self.get_or_insert(name, kind);
        self.targets[id.index()].set_kind(kind);
        id
    }

    pub fn id_of(&self, name: &str) -> Result<TargetId, TargetError> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| TargetError::NotFound(name.to_string()))
    }

    /// Looks up a target by name
    pub fn find(&self, name: &str) -> Result<&Target, TargetError> {
        self.id_of(name).map(|id| &self.targets[id.index()])
    }

    pub fn get(&self, id: TargetId) -> Option<&Target> {
        self.targets.get(id.index())
    }

    pub fn get_mut(&mut self, id: TargetId) -> Option<&mut Target> {
        self.targets.get_mut(id.index())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Iterates over all targets in id order
    pub fn iter(&self) -> impl Iterator<Item = (TargetId, &Target)> {
        self.targets
            .iter()
            .enumerate()
            .map(|(i, t)| (TargetId::new(i), t))
    }

    pub fn ids(&self) -> impl Iterator<Item = TargetId> {
        (0..self.targets.len()).map(TargetId::new)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Target> {
        self.targets.iter_mut()
    }
}
