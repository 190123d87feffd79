//! Rejects named types that contain themselves by value

use std::collections::BTreeMap;

use crate::types::{Descriptor, NodeId, Resolved};
use crate::utils::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

struct Walk<'a> {
    nodes: &'a [Descriptor],
    marks: Vec<Mark>,
    stack: Vec<NodeId>,
}

impl Walk<'_> {
    fn visit(&mut self, id: NodeId) -> Result<()> {
        match self.marks[id.index()] {
            Mark::Done => return Ok(()),
            Mark::OnStack => return Err(self.cycle_error(id)),
            Mark::Unvisited => {}
        }
        self.marks[id.index()] = Mark::OnStack;
        self.stack.push(id);
        for edge in self.nodes[id.index()].shape.value_edges() {
            if let Resolved::Node(next) = edge {
                self.visit(*next)?;
            }
        }
        self.stack.pop();
        self.marks[id.index()] = Mark::Done;
        Ok(())
    }

    fn cycle_error(&self, id: NodeId) -> Error {
        let start = self.stack.iter().position(|s| *s == id).unwrap_or(0);
        let name = self.nodes[id.index()].name.clone();
        let mut cycle: Vec<String> = self.stack[start..]
            .iter()
            .map(|s| &self.nodes[s.index()].name)
            .filter(|n| !n.is_empty())
            .cloned()
            .collect();
        cycle.push(name.clone());
        Error::RecursiveValueType { name, cycle }
    }
}

/// Depth-first search over value edges (alias targets, array elements and
/// struct fields), starting from each named type in name order
pub(crate) fn check_value_cycles(nodes: &[Descriptor], named: &BTreeMap<String, NodeId>) -> Result<()> {
    let mut walk = Walk {
        nodes,
        marks: vec![Mark::Unvisited; nodes.len()],
        stack: Vec::new(),
    };
    for id in named.values() {
        walk.visit(*id)?;
    }
    Ok(())
}
