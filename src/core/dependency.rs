//! Incremental add/remove calls for parent-child relations.
//!
//! For each (parent, relation) pair the id list sent last time is kept, so
//! the next snapshot only carries the difference.

use std::collections::{HashMap, HashSet};

use super::descriptor::MethodCall;

/// Kind of child collection a parent manages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Relation {
    Renderers,
    ViewProps,
    Lights,
}

impl Relation {
    pub const fn add_method(self) -> &'static str {
        match self {
            Self::Renderers => "addRenderer",
            Self::ViewProps => "addViewProp",
            Self::Lights => "addLight",
        }
    }

    pub const fn remove_method(self) -> &'static str {
        match self {
            Self::Renderers => "removeRenderer",
            Self::ViewProps => "removeViewProp",
            Self::Lights => "removeLight",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Renderers => "renderers",
            Self::ViewProps => "viewProps",
            Self::Lights => "lights",
        }
    }
}

/// Snapshot slot: one relation of one parent instance.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RelationKey {
    pub parent: String,
    pub relation: Relation,
}

impl RelationKey {
    pub fn new(parent: impl Into<String>, relation: Relation) -> Self {
        Self { parent: parent.into(), relation }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Add,
    Remove,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DependencyOp {
    pub operation: Operation,
    pub child: String,
}

impl DependencyOp {
    pub fn to_call(&self, relation: Relation) -> MethodCall {
        let method = match self.operation {
            Operation::Add => relation.add_method(),
            Operation::Remove => relation.remove_method(),
        };
        MethodCall::with_instance(method, &self.child)
    }
}

/// Last-sent child lists keyed by [`RelationKey`].
#[derive(Debug, Default)]
pub struct DependencyDiffer {
    snapshots: HashMap<RelationKey, Vec<String>>,
}

impl DependencyDiffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Operations turning the stored list into `current`, then store
    /// `current`.
    ///
    /// Adds come first in `current` order, then removes in stored order.
    /// Each id appears at most once per operation. With `ignore_history`
    /// the stored list is treated as empty, but still overwritten.
    pub fn diff(&mut self, key: RelationKey, current: Vec<String>, ignore_history: bool) -> Vec<DependencyOp> {
        let ops = {
            let previous: &[String] = match self.snapshots.get(&key) {
                Some(ids) if !ignore_history => ids,
                _ => &[],
            };
            let before: HashSet<&str> = previous.iter().map(String::as_str).collect();
            let after: HashSet<&str> = current.iter().map(String::as_str).collect();

            let mut seen = HashSet::new();
            let adds = current
                .iter()
                .filter(|id| !before.contains(id.as_str()) && seen.insert(id.as_str()))
                .map(|id| DependencyOp { operation: Operation::Add, child: id.clone() });

            let mut gone = HashSet::new();
            let removes = previous
                .iter()
                .filter(|id| !after.contains(id.as_str()) && gone.insert(id.as_str()))
                .map(|id| DependencyOp { operation: Operation::Remove, child: id.clone() });

            adds.chain(removes).collect::<Vec<_>>()
        };

        self.snapshots.insert(key, current);
        ops
    }

    /// [`diff`](Self::diff) rendered as method calls.
    pub fn calls_for(&mut self, key: RelationKey, current: Vec<String>, ignore_history: bool) -> Vec<MethodCall> {
        let relation = key.relation;
        self.diff(key, current, ignore_history)
            .iter()
            .map(|op| op.to_call(relation))
            .collect()
    }

    pub fn snapshot(&self, key: &RelationKey) -> Option<&[String]> {
        self.snapshots.get(key).map(Vec::as_slice)
    }

    /// Drop the stored list, so the next diff re-adds every child.
    pub fn forget(&mut self, key: &RelationKey) -> Option<Vec<String>> {
        self.snapshots.remove(key)
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn key() -> RelationKey {
        RelationKey::new("r1", Relation::ViewProps)
    }

    #[test]
    fn test_first_diff_adds_everything() {
        let mut differ = DependencyDiffer::new();
        let ops = differ.diff(key(), ids(&["a", "b"]), false);
        assert_eq!(ops, vec![
            DependencyOp { operation: Operation::Add, child: "a".into() },
            DependencyOp { operation: Operation::Add, child: "b".into() },
        ]);
        assert_eq!(differ.snapshot(&key()), Some(&ids(&["a", "b"])[..]));
    }

    #[test]
    fn test_minimal_diff() {
        let mut differ = DependencyDiffer::new();
        differ.diff(key(), ids(&["a", "b", "c"]), false);
        let ops = differ.diff(key(), ids(&["b", "d", "c"]), false);
        assert_eq!(ops, vec![
            DependencyOp { operation: Operation::Add, child: "d".into() },
            DependencyOp { operation: Operation::Remove, child: "a".into() },
        ]);

        assert!(differ.diff(key(), ids(&["b", "d", "c"]), false).is_empty());
    }

    #[test]
    fn test_duplicates_collapse() {
        let mut differ = DependencyDiffer::new();
        let ops = differ.diff(key(), ids(&["a", "a", "b"]), false);
        assert_eq!(ops.len(), 2);
        let ops = differ.diff(key(), Vec::new(), false);
        assert_eq!(ops, vec![
            DependencyOp { operation: Operation::Remove, child: "a".into() },
            DependencyOp { operation: Operation::Remove, child: "b".into() },
        ]);
    }

    #[test]
    fn test_ignore_history_readds_and_overwrites() {
        let mut differ = DependencyDiffer::new();
        differ.diff(key(), ids(&["a"]), false);
        let ops = differ.diff(key(), ids(&["a", "b"]), true);
        assert_eq!(ops.len(), 2);
        assert!(ops.iter().all(|op| op.operation == Operation::Add));
        assert_eq!(differ.snapshot(&key()), Some(&ids(&["a", "b"])[..]));
    }

    #[test]
    fn test_relations_are_independent() {
        let mut differ = DependencyDiffer::new();
        let lights = RelationKey::new("r1", Relation::Lights);
        differ.diff(key(), ids(&["a"]), false);
        let calls = differ.calls_for(lights, ids(&["a"]), false);
        assert_eq!(calls, vec![MethodCall::with_instance("addLight", "a")]);
        assert_eq!(differ.len(), 2);
    }

    #[test]
    fn test_calls_and_forget() {
        let mut differ = DependencyDiffer::new();
        let window = RelationKey::new("w", Relation::Renderers);
        differ.calls_for(window.clone(), ids(&["r"]), false);
        let calls = differ.calls_for(window.clone(), Vec::new(), false);
        assert_eq!(calls, vec![MethodCall::with_instance("removeRenderer", "r")]);

        differ.calls_for(window.clone(), ids(&["r"]), false);
        assert!(differ.forget(&window).is_some());
        let calls = differ.calls_for(window, ids(&["r"]), false);
        assert_eq!(calls, vec![MethodCall::with_instance("addRenderer", "r")]);
    }
}
