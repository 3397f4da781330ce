// SPDX-License-Identifier: MIT OR Apache-2.0

//! Graph functions for purpose compatibility.
//!
//! An edge `A -> B` states that data collected for purpose `A` may also be used for purpose `B`.
//! Declared edges are neither assumed to be symmetric nor transitive, transitivity is computed by
//! walking the graph. The graph can contain cycles.
use std::collections::BTreeSet;

use petgraph::graphmap::DiGraphMap;
use petgraph::visit::{Dfs, Reversed};
use purposize_core::PurposeDefinition;
use tracing::warn;

/// Build the compatibility graph from all purpose definitions.
///
/// Edges pointing at purposes which are not defined are ignored.
pub fn compatibility_graph(definitions: &[PurposeDefinition]) -> DiGraphMap<&str, ()> {
    let mut graph = DiGraphMap::new();

    for definition in definitions {
        graph.add_node(definition.id.as_str());
    }

    for definition in definitions {
        for compatible in &definition.compatible_with {
            if !graph.contains_node(compatible.as_str()) {
                warn!(
                    purpose = %definition.id,
                    compatible_with = %compatible,
                    "ignore compatibility with unknown purpose"
                );
                continue;
            }
            graph.add_edge(definition.id.as_str(), compatible.as_str(), ());
        }
    }

    graph
}

/// Returns all purposes whose data may be used for the target purpose, including the target
/// itself.
///
/// These are all purposes from which the target can be reached.
pub fn reachable<'a>(graph: &DiGraphMap<&'a str, ()>, target: &'a str) -> BTreeSet<&'a str> {
    let mut purposes = BTreeSet::new();

    // Data collected for a purpose is always usable for that same purpose.
    purposes.insert(target);

    if !graph.contains_node(target) {
        return purposes;
    }

    // The visited set of the depth-first search guarantees termination on cycles.
    let reversed = Reversed(graph);
    let mut dfs = Dfs::new(&reversed, target);
    while let Some(purpose) = dfs.next(&reversed) {
        purposes.insert(purpose);
    }

    purposes
}

/// Returns `true` if data collected for purpose `from` may be used for purpose `to`.
pub fn has_path(graph: &DiGraphMap<&str, ()>, from: &str, to: &str) -> bool {
    if from == to {
        return true;
    }

    if !graph.contains_node(from) || !graph.contains_node(to) {
        return false;
    }

    let mut dfs = Dfs::new(graph, from);
    while let Some(purpose) = dfs.next(graph) {
        if purpose == to {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use purposize_core::PurposeDefinition;

    use super::{compatibility_graph, has_path, reachable};

    #[test]
    fn transitive_compatibility() {
        // A -> B -> C
        let definitions = vec![
            PurposeDefinition::new("A").compatible_with("B"),
            PurposeDefinition::new("B").compatible_with("C"),
            PurposeDefinition::new("C"),
        ];
        let graph = compatibility_graph(&definitions);

        assert_eq!(reachable(&graph, "C"), BTreeSet::from(["A", "B", "C"]));
        assert_eq!(reachable(&graph, "B"), BTreeSet::from(["A", "B"]));
        assert_eq!(reachable(&graph, "A"), BTreeSet::from(["A"]));

        assert!(has_path(&graph, "A", "C"));
        assert!(!has_path(&graph, "C", "A"));
        assert!(has_path(&graph, "B", "B"));
    }

    #[test]
    fn cycles_terminate() {
        let definitions = vec![
            PurposeDefinition::new("A").compatible_with("B"),
            PurposeDefinition::new("B").compatible_with("C"),
            PurposeDefinition::new("C").compatible_with("A"),
            PurposeDefinition::new("D").compatible_with("D"),
        ];
        let graph = compatibility_graph(&definitions);

        assert_eq!(reachable(&graph, "A"), BTreeSet::from(["A", "B", "C"]));
        assert_eq!(reachable(&graph, "D"), BTreeSet::from(["D"]));
        assert!(has_path(&graph, "C", "B"));
        assert!(!has_path(&graph, "A", "D"));
    }

    #[test]
    fn unknown_purposes() {
        let definitions = vec![PurposeDefinition::new("A").compatible_with("GHOST")];
        let graph = compatibility_graph(&definitions);

        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);

        // The target itself is always part of its closure.
        assert_eq!(reachable(&graph, "GHOST"), BTreeSet::from(["GHOST"]));
        assert!(!has_path(&graph, "A", "GHOST"));
    }
}
