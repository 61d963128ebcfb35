//! Generic depth-first traversal of a flow tree.
//!
//! A [`Visitor`] receives begin/end callbacks for every element of one
//! participant's subtree, in document order. Dispatch is closed over the
//! node kinds: `if`, `while` and `return` interactions have their own
//! callback pairs that default to the generic node pair, so a visitor only
//! overrides the kinds it cares about. Then/else branches get their own
//! callbacks; other branch labels traverse children without callbacks.
//! Elements with an unrecognized kind are skipped with a warning, subtree
//! included.
//!
//! The traversal walks a single participant. Crossing into a call's target
//! participant is the visitors' job (each layout pass spawns a recursive
//! sub-visitor per call site), guarded against cyclic call graphs by
//! [`CallPath`].

use indexmap::IndexSet;
use log::{trace, warn};

use crate::error::PlumlineError;
use crate::flow::{Branch, BranchLabel, InteractionType, Node, NodeKind, Participant};
use crate::identifier::Id;

/// Parent handle passed alongside each node callback.
#[derive(Debug, Clone, Copy)]
pub enum Element<'a> {
    /// The node sits directly in a participant's body.
    Participant(&'a Participant),
    /// The node sits inside a labeled branch of a conditional or loop.
    Branch { node: &'a Node, branch: &'a Branch },
}

impl Element<'_> {
    /// True when the node is top-level in its participant.
    pub fn is_participant(&self) -> bool {
        matches!(self, Element::Participant(_))
    }
}

/// Callbacks fired while walking a participant's subtree.
///
/// Every method has a default: participant and branch callbacks default to
/// no-ops, kind-specific node callbacks default to the generic
/// [`begin_visit_node`](Visitor::begin_visit_node) /
/// [`end_visit_node`](Visitor::end_visit_node) pair. Callbacks return a
/// `Result` so a visitor that recurses across participants can surface a
/// cyclic call graph through the walk.
#[allow(unused_variables)]
pub trait Visitor {
    fn begin_visit_participant(&mut self, participant: &Participant) -> Result<(), PlumlineError> {
        Ok(())
    }

    fn end_visit_participant(&mut self, participant: &Participant) -> Result<(), PlumlineError> {
        Ok(())
    }

    fn begin_visit_node(&mut self, node: &Node, parent: Element<'_>) -> Result<(), PlumlineError> {
        Ok(())
    }

    fn end_visit_node(&mut self, node: &Node, parent: Element<'_>) -> Result<(), PlumlineError> {
        Ok(())
    }

    fn begin_visit_if(&mut self, node: &Node, parent: Element<'_>) -> Result<(), PlumlineError> {
        self.begin_visit_node(node, parent)
    }

    fn end_visit_if(&mut self, node: &Node, parent: Element<'_>) -> Result<(), PlumlineError> {
        self.end_visit_node(node, parent)
    }

    fn begin_visit_while(&mut self, node: &Node, parent: Element<'_>) -> Result<(), PlumlineError> {
        self.begin_visit_node(node, parent)
    }

    fn end_visit_while(&mut self, node: &Node, parent: Element<'_>) -> Result<(), PlumlineError> {
        self.end_visit_node(node, parent)
    }

    fn begin_visit_return(&mut self, node: &Node, parent: Element<'_>) -> Result<(), PlumlineError> {
        self.begin_visit_node(node, parent)
    }

    fn end_visit_return(&mut self, node: &Node, parent: Element<'_>) -> Result<(), PlumlineError> {
        self.end_visit_node(node, parent)
    }

    fn begin_visit_then(&mut self, branch: &Branch, parent: &Node) -> Result<(), PlumlineError> {
        Ok(())
    }

    fn end_visit_then(&mut self, branch: &Branch, parent: &Node) -> Result<(), PlumlineError> {
        Ok(())
    }

    fn begin_visit_else(&mut self, branch: &Branch, parent: &Node) -> Result<(), PlumlineError> {
        Ok(())
    }

    fn end_visit_else(&mut self, branch: &Branch, parent: &Node) -> Result<(), PlumlineError> {
        Ok(())
    }
}

/// Walks one participant's subtree depth-first, firing begin/end callbacks
/// in document order.
pub fn traverse_participant<V: Visitor>(
    participant: &Participant,
    visitor: &mut V,
) -> Result<(), PlumlineError> {
    trace!(participant:% = participant.id(); "traverse participant");
    visitor.begin_visit_participant(participant)?;
    for node in participant.nodes() {
        traverse_node(node, Element::Participant(participant), visitor)?;
    }
    visitor.end_visit_participant(participant)
}

/// Walks one node and its branch children.
pub fn traverse_node<V: Visitor>(
    node: &Node,
    parent: Element<'_>,
    visitor: &mut V,
) -> Result<(), PlumlineError> {
    match node.kind() {
        NodeKind::Unknown => {
            warn!(node:% = node.node_id(); "element has no recognized kind, skipping");
            Ok(())
        }
        NodeKind::Interaction => {
            if node.interaction_type() == Some(InteractionType::Return) {
                visitor.begin_visit_return(node, parent)?;
                traverse_branches(node, visitor)?;
                visitor.end_visit_return(node, parent)
            } else {
                visitor.begin_visit_node(node, parent)?;
                traverse_branches(node, visitor)?;
                visitor.end_visit_node(node, parent)
            }
        }
        NodeKind::If => {
            visitor.begin_visit_if(node, parent)?;
            traverse_branches(node, visitor)?;
            visitor.end_visit_if(node, parent)
        }
        NodeKind::While => {
            visitor.begin_visit_while(node, parent)?;
            traverse_branches(node, visitor)?;
            visitor.end_visit_while(node, parent)
        }
    }
}

fn traverse_branches<V: Visitor>(node: &Node, visitor: &mut V) -> Result<(), PlumlineError> {
    for branch in node.branches() {
        match branch.label() {
            BranchLabel::Then => {
                visitor.begin_visit_then(branch, node)?;
                traverse_branch_children(node, branch, visitor)?;
                visitor.end_visit_then(branch, node)?;
            }
            BranchLabel::Else => {
                visitor.begin_visit_else(branch, node)?;
                traverse_branch_children(node, branch, visitor)?;
                visitor.end_visit_else(branch, node)?;
            }
            BranchLabel::Body | BranchLabel::Unknown => {
                traverse_branch_children(node, branch, visitor)?;
            }
        }
    }
    Ok(())
}

fn traverse_branch_children<V: Visitor>(
    node: &Node,
    branch: &Branch,
    visitor: &mut V,
) -> Result<(), PlumlineError> {
    for child in branch.children() {
        traverse_node(child, Element::Branch { node, branch }, visitor)?;
    }
    Ok(())
}

/// Ordered set of participants on the current cross-participant recursion
/// chain.
///
/// The guard is per path, not global: reaching the same participant from two
/// different call sites is legal, re-entering a participant already on the
/// current chain is a cyclic call graph and fails the layout. Descending
/// clones the path, so sibling recursions never see each other's chain.
#[derive(Debug, Clone, Default)]
pub struct CallPath {
    visited: IndexSet<Id>,
}

impl CallPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extends the path with `participant`, failing if it is already on the
    /// chain.
    pub fn descend(&self, participant: Id) -> Result<CallPath, PlumlineError> {
        if self.visited.contains(&participant) {
            let mut rendered: Vec<String> = self.visited.iter().map(|id| id.to_string()).collect();
            rendered.push(participant.to_string());
            return Err(PlumlineError::CyclicCallGraph {
                path: rendered.join(" -> "),
            });
        }
        let mut visited = self.visited.clone();
        visited.insert(participant);
        Ok(CallPath { visited })
    }

    pub fn contains(&self, participant: Id) -> bool {
        self.visited.contains(&participant)
    }

    /// Number of participants on the chain.
    pub fn depth(&self) -> usize {
        self.visited.len()
    }
}
