//! Parsed declaration model
//!
//! Holds the target registry together with the dependency lists of every
//! target. Dependencies are stored by [`TargetId`], so a target exists once
//! no matter how many lines mention it.

use super::target::{Target, TargetError, TargetId, TargetKind, TargetRegistry};

/// Targets and their declared dependencies
#[derive(Debug, Clone, Default)]
pub struct Declarations {
    targets: TargetRegistry,

    /// Dependency ids, indexed by the dependent's id
    dependencies: Vec<Vec<TargetId>>,
}

impl Declarations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a declaration line: `name` of `kind` depends on `deps`
    ///
    /// Unknown dependencies become implicit file targets. Declaring a name
    /// again replaces its kind and dependency list.
    pub fn declare<'a>(
        &mut self,
        name: &str,
        kind: TargetKind,
        deps: impl IntoIterator<Item = &'a str>,
    ) -> TargetId {
        let id = self.targets.declare(name, kind);

        let mut dep_ids = Vec::new();
        for dep in deps {
            let dep_id = self.targets.get_or_insert(dep, TargetKind::File);
            if !dep_ids.contains(&dep_id) {
                dep_ids.push(dep_id);
            }
        }

        self.dependencies
            .resize_with(self.targets.len(), Vec::new);
        self.dependencies[id.index()] = dep_ids;
        id
    }

    /// Looks up a target by name
    pub fn target(&self, name: &str) -> Result<&Target, TargetError> {
        self.targets.find(name)
    }

    pub fn targets(&self) -> &TargetRegistry {
        &self.targets
    }

    pub fn targets_mut(&mut self) -> &mut TargetRegistry {
        &mut self.targets
    }

    /// Returns the targets `name` directly depends on
    pub fn dependencies_of(&self, name: &str) -> Result<Vec<&Target>, TargetError> {
        let id = self.targets.id_of(name)?;
        Ok(self
            .dependency_ids(id)
            .iter()
            .filter_map(|dep| self.targets.get(*dep))
            .collect())
    }

    /// Dependency ids of a target; empty for unknown ids
    pub fn dependency_ids(&self, id: TargetId) -> &[TargetId] {
        self.dependencies
            .get(id.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Iterates over `(dependent, dependencies)` pairs in id order
    pub fn dependency_map(&self) -> impl Iterator<Item = (TargetId, &[TargetId])> {
        self.targets.ids().map(move |id| (id, self.dependency_ids(id)))
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
