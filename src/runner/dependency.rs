//! Dependency closures over step definitions.
//!
//! References are resolved by id, so an item may depend on one defined
//! later in the list. Unknown ids contribute nothing. Every item appears
//! at most once in a closure, in first-discovery (breadth-first, source
//! order) order.
//!
//! The closures keep a visited set and therefore terminate on cyclic
//! input, but the result for a cycle is not meaningful. Catalogs are
//! checked with [`find_cycle`] when loaded.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::steps::{Step, StepDefinition};

/// Anything with an id and a list of ids it depends on.
pub trait DependentItem {
    fn id(&self) -> &str;
    fn depends_on(&self) -> &[String];
}

impl DependentItem for StepDefinition {
    fn id(&self) -> &str {
        &self.id
    }

    fn depends_on(&self) -> &[String] {
        &self.depends_on
    }
}

impl DependentItem for Step {
    fn id(&self) -> &str {
        &self.definition.id
    }

    fn depends_on(&self) -> &[String] {
        &self.definition.depends_on
    }
}

/// Everything `item` depends on, directly or indirectly.
pub fn dependencies<'a, T: DependentItem>(item: &T, all: &'a [T]) -> Vec<&'a T> {
    let by_id: HashMap<&str, &'a T> = all.iter().map(|i| (i.id(), i)).collect();

    let mut seen: HashSet<&str> = HashSet::from([item.id()]);
    let mut queue: VecDeque<&str> = item.depends_on().iter().map(String::as_str).collect();
    let mut result = Vec::new();

    while let Some(id) = queue.pop_front() {
        let Some(&found) = by_id.get(id) else {
            continue;
        };
        if !seen.insert(found.id()) {
            continue;
        }
        result.push(found);
        queue.extend(found.depends_on().iter().map(String::as_str));
    }

    result
}

/// Everything that depends on `item`, directly or indirectly.
pub fn dependents<'a, T: DependentItem>(item: &T, all: &'a [T]) -> Vec<&'a T> {
    let mut seen: HashSet<&str> = HashSet::from([item.id()]);
    let mut queue: VecDeque<&str> = VecDeque::from([item.id()]);
    let mut result = Vec::new();

    while let Some(id) = queue.pop_front() {
        for candidate in all {
            if candidate.depends_on().iter().any(|d| d == id) && seen.insert(candidate.id()) {
                result.push(candidate);
                queue.push_back(candidate.id());
            }
        }
    }

    result
}

/// Find a cycle, returning its path (first id repeated at the end).
///
/// Items are visited in source order so the reported cycle is stable.
pub fn find_cycle<T: DependentItem>(all: &[T]) -> Option<Vec<String>> {
    #[derive(Clone, Copy, PartialEq)]
    enum State {
        Unvisited,
        Visiting,
        Visited,
    }

    let by_id: HashMap<&str, &T> = all.iter().map(|i| (i.id(), i)).collect();
    let mut state: HashMap<&str, State> =
        all.iter().map(|i| (i.id(), State::Unvisited)).collect();
    let mut path: Vec<String> = Vec::new();

    fn dfs<'a, T: DependentItem>(
        node: &'a T,
        by_id: &HashMap<&'a str, &'a T>,
        state: &mut HashMap<&'a str, State>,
        path: &mut Vec<String>,
    ) -> Option<Vec<String>> {
        state.insert(node.id(), State::Visiting);
        path.push(node.id().to_string());

        for dep in node.depends_on() {
            let Some(&next) = by_id.get(dep.as_str()) else {
                continue;
            };
            match state.get(next.id()) {
                Some(State::Visiting) => {
                    let start = path.iter().position(|s| s == dep).unwrap_or(0);
                    let mut cycle: Vec<String> = path[start..].to_vec();
                    cycle.push(dep.clone());
                    return Some(cycle);
                }
                Some(State::Unvisited) | None => {
                    if let Some(cycle) = dfs(next, by_id, state, path) {
                        return Some(cycle);
                    }
                }
                Some(State::Visited) => {}
            }
        }

        path.pop();
        state.insert(node.id(), State::Visited);
        None
    }

    for item in all {
        if state.get(item.id()) == Some(&State::Unvisited) {
            if let Some(cycle) = dfs(item, &by_id, &mut state, &mut path) {
                return Some(cycle);
            }
        }
    }

    None
}
