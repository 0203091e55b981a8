use petgraph::graph::{Graph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Directed;
use std::collections::HashMap;

use kongruenz_lang::ValencyEntry;
use kongruenz_protocol::Case;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node {
    Verb(String),
    Slot(Case),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    IsA,      // Separable verb inherits its base frame (zurückgeben IsA geben)
    Requires, // Obligatory case slot
    Permits,  // Optional case slot
}

/// Cases a verb takes, after inheritance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    pub required: Vec<Case>,
    pub optional: Vec<Case>,
}

impl Frame {
    pub fn slots(&self) -> impl Iterator<Item = (Case, bool)> + '_ {
        self.required
            .iter()
            .map(|c| (*c, true))
            .chain(self.optional.iter().map(|c| (*c, false)))
    }
}

/// Valency frames as a graph: verbs point at case slots and at the verbs
/// they inherit from.
#[derive(Debug, Default)]
pub struct ValencyGraph {
    graph: Graph<Node, Relation, Directed>,
    index_map: HashMap<Node, NodeIndex>,
}

impl ValencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: &[ValencyEntry]) -> Self {
        let mut graph = Self::new();
        for entry in entries {
            let verb = Node::Verb(entry.verb.to_lowercase());
            graph.add_node(verb.clone());
            if let Some(base) = &entry.inherits {
                graph.add_relation(verb.clone(), Node::Verb(base.to_lowercase()), Relation::IsA);
            }
            for slot in &entry.frame {
                let relation = if slot.required { Relation::Requires } else { Relation::Permits };
                graph.add_relation(verb.clone(), Node::Slot(slot.case), relation);
            }
        }
        graph
    }

    fn add_node(&mut self, node: Node) -> NodeIndex {
        if let Some(idx) = self.index_map.get(&node) {
            return *idx;
        }
        let idx = self.graph.add_node(node.clone());
        self.index_map.insert(node, idx);
        idx
    }

    pub fn add_relation(&mut self, from: Node, to: Node, rel: Relation) {
        let from_idx = self.add_node(from);
        let to_idx = self.add_node(to);
        self.graph.add_edge(from_idx, to_idx, rel);
    }

    pub fn contains(&self, verb: &str) -> bool {
        self.index_map.contains_key(&Node::Verb(verb.to_lowercase()))
    }

    /// Slots of `verb` and everything it inherits. A slot required
    /// anywhere along the chain is required.
    pub fn frame(&self, verb: &str) -> Option<Frame> {
        let start_idx = *self.index_map.get(&Node::Verb(verb.to_lowercase()))?;

        let mut frame = Frame::default();
        let mut stack = vec![start_idx];
        let mut visited = vec![];

        while let Some(current_idx) = stack.pop() {
            if visited.contains(&current_idx) {
                continue;
            }
            visited.push(current_idx);

            for edge in self.graph.edges(current_idx) {
                let target = edge.target();
                match (edge.weight(), &self.graph[target]) {
                    (Relation::IsA, _) => stack.push(target),
                    (Relation::Requires, Node::Slot(case)) => {
                        frame.optional.retain(|c| c != case);
                        if !frame.required.contains(case) {
                            frame.required.push(*case);
                        }
                    }
                    (Relation::Permits, Node::Slot(case)) => {
                        if !frame.required.contains(case) && !frame.optional.contains(case) {
                            frame.optional.push(*case);
                        }
                    }
                    _ => {}
                }
            }
        }

        // Edges come back newest first
        frame.required.sort();
        frame.optional.sort();
        Some(frame)
    }

    pub fn verb_count(&self) -> usize {
        self.index_map.keys().filter(|n| matches!(n, Node::Verb(_))).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kongruenz_lang::german;

    #[test]
    fn test_inherited_frame() {
        let graph = ValencyGraph::from_entries(german().unwrap().valency());
        let geben = graph.frame("geben").unwrap();
        assert_eq!(geben.required, vec![Case::Nominative, Case::Accusative]);
        assert_eq!(geben.optional, vec![Case::Dative, Case::Genitive]);

        // Separable verbs get the base frame
        assert_eq!(graph.frame("zurückgeben"), Some(geben));
        assert!(graph.frame("laufen").is_none());
        assert!(graph.contains("Helfen"));
    }

    #[test]
    fn test_requirement_overrides_permission() {
        let mut graph = ValencyGraph::new();
        let base = Node::Verb("geben".into());
        let derived = Node::Verb("abgeben".into());
        graph.add_relation(base.clone(), Node::Slot(Case::Dative), Relation::Permits);
        graph.add_relation(derived.clone(), Node::Slot(Case::Dative), Relation::Requires);
        graph.add_relation(derived, base, Relation::IsA);

        let frame = graph.frame("abgeben").unwrap();
        assert_eq!(frame.required, vec![Case::Dative]);
        assert!(frame.optional.is_empty());
        assert_eq!(graph.verb_count(), 2);
    }
}
