//! Validation of the object-level dependency graph.
//!
//! The scheduler orders work through `can_build`/`needs_recompilation`
//! gating, which walks unit dependencies recursively. A dependency cycle
//! would make those walks diverge, so assembly rejects cyclic projects
//! up front.

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

use mason_util::errors::{MasonError, MasonResult};

use crate::registry::{UnitId, UnitRegistry};

/// Check that the unit dependency graph is acyclic; on success, return the
/// units in a dependencies-first order.
pub fn validate_acyclic(units: &UnitRegistry) -> MasonResult<Vec<UnitId>> {
    let mut graph: DiGraph<UnitId, ()> = DiGraph::new();
    let mut indices: HashMap<UnitId, NodeIndex> = HashMap::new();

    for id in units.ids() {
        indices.insert(id, graph.add_node(id));
    }
    for id in units.ids() {
        for &dep in &units.unit(id).dependencies {
            graph.add_edge(indices[&dep], indices[&id], ());
        }
    }

    match toposort(&graph, None) {
        Ok(order) => Ok(order.into_iter().map(|idx| graph[idx]).collect()),
        Err(cycle) => {
            let name = &units.unit(graph[cycle.node_id()]).name;
            Err(MasonError::Graph {
                message: format!("dependency cycle involving '{name}'"),
            }
            .into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn registry_with(root: &Path, names: &[&str]) -> (UnitRegistry, Vec<UnitId>) {
        let mut reg = UnitRegistry::new(root, Path::new(".out"), &[]);
        let ids = names
            .iter()
            .map(|n| {
                std::fs::write(root.join(n), "").unwrap();
                reg.intern(n)
            })
            .collect();
        (reg, ids)
    }

    #[test]
    fn acyclic_graph_orders_dependencies_first() {
        let tmp = tempfile::tempdir().unwrap();
        let (mut reg, ids) = registry_with(tmp.path(), &["a.cpp", "b.cpp", "c.cpp"]);
        reg.unit_mut(ids[0]).add_dependency(ids[1]);
        reg.unit_mut(ids[1]).add_dependency(ids[2]);

        let order = validate_acyclic(&reg).unwrap();
        let pos = |id| order.iter().position(|&x| x == id).unwrap();
        assert!(pos(ids[2]) < pos(ids[1]));
        assert!(pos(ids[1]) < pos(ids[0]));
    }

    #[test]
    fn cycle_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let (mut reg, ids) = registry_with(tmp.path(), &["a.cpp", "b.cpp"]);
        reg.unit_mut(ids[0]).add_dependency(ids[1]);
        reg.unit_mut(ids[1]).add_dependency(ids[0]);

        let err = validate_acyclic(&reg).unwrap_err();
        assert!(err.to_string().contains("cycle"));
    }
}
