//! DAG validation and execution ordering — run this before executing a
//! workflow.
//!
//! Rules enforced:
//! 1. Node IDs must be unique within the workflow.
//! 2. Every edge must reference valid node IDs (both `source` and `target`).
//! 3. The directed graph must be acyclic.
//!
//! Returns the node IDs in execution order on success: a depth-first walk
//! that emits every node after all of its parents, rooted at the input
//! nodes first so entry points and their subtrees run before anything
//! else.

use std::collections::{HashMap, HashSet};

use crate::{models::Workflow, EngineError};
use nodes::model::NodeType;

/// Traversal state for the cycle-detecting depth-first walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    /// On the current traversal path; reaching a `Visiting` node again
    /// means the path loops.
    Visiting,
    Visited,
}

/// Validate the workflow graph and return node IDs in execution order.
///
/// # Errors
/// - [`EngineError::DuplicateNodeId`] if two nodes share an ID.
/// - [`EngineError::UnknownNodeReference`] if an edge references a missing node.
/// - [`EngineError::CycleDetected`] if the graph is not acyclic.
pub fn execution_order(workflow: &Workflow) -> Result<Vec<String>, EngineError> {
    // -----------------------------------------------------------------------
    // 1. Ensure node IDs are unique
    // -----------------------------------------------------------------------
    let mut seen_ids: HashSet<&str> = HashSet::new();
    for node in &workflow.nodes {
        if !seen_ids.insert(node.id.as_str()) {
            return Err(EngineError::DuplicateNodeId(node.id.clone()));
        }
    }

    let node_set: HashSet<&str> = workflow.nodes.iter().map(|n| n.id.as_str()).collect();

    // -----------------------------------------------------------------------
    // 2. Validate edge endpoints
    // -----------------------------------------------------------------------
    for edge in &workflow.edges {
        if !node_set.contains(edge.source.as_str()) {
            return Err(EngineError::UnknownNodeReference {
                node_id: edge.source.clone(),
                side: "source",
            });
        }
        if !node_set.contains(edge.target.as_str()) {
            return Err(EngineError::UnknownNodeReference {
                node_id: edge.target.clone(),
                side: "target",
            });
        }
    }

    // -----------------------------------------------------------------------
    // 3. Dependency-first ordering (cycle-detecting DFS)
    // -----------------------------------------------------------------------
    // parents[x] = sources of every edge into x, in edge order.
    let mut parents: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in &workflow.edges {
        parents
            .entry(edge.target.as_str())
            .or_default()
            .push(edge.source.as_str());
    }

    let mut marks: HashMap<&str, Mark> = HashMap::new();
    let mut order: Vec<String> = Vec::with_capacity(workflow.nodes.len());

    // Input nodes root the traversal so entry points come first; any node
    // unreachable from an input still gets ordered by the second sweep.
    for node in &workflow.nodes {
        if node.node_type() == NodeType::Input {
            visit(node.id.as_str(), &parents, &mut marks, &mut order)?;
        }
    }
    for node in &workflow.nodes {
        visit(node.id.as_str(), &parents, &mut marks, &mut order)?;
    }

    Ok(order)
}

fn visit<'wf>(
    node_id: &'wf str,
    parents: &HashMap<&'wf str, Vec<&'wf str>>,
    marks: &mut HashMap<&'wf str, Mark>,
    order: &mut Vec<String>,
) -> Result<(), EngineError> {
    match marks.get(node_id).copied().unwrap_or(Mark::Unvisited) {
        Mark::Visited => return Ok(()),
        Mark::Visiting => return Err(EngineError::CycleDetected),
        Mark::Unvisited => {}
    }

    marks.insert(node_id, Mark::Visiting);
    if let Some(node_parents) = parents.get(node_id) {
        for parent in node_parents {
            visit(parent, parents, marks, order)?;
        }
    }
    marks.insert(node_id, Mark::Visited);
    order.push(node_id.to_owned());

    Ok(())
}
