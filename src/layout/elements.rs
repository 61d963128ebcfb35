//! Third layout pass: renderable element emission.
//!
//! Flattens the positioned tree into the [`Diagram`] lists the rendering
//! host consumes. Per participant: its head box. Per call: the four point
//! markers, a labeled call link, an unlabeled return link, and activation
//! lifelines spanning the call on both the source and target columns. Per
//! conditional: a container labeled with the condition text, plus one
//! unlabeled container per non-empty branch. After the entry traversal the
//! `others` participants and the entry lifeline are appended.
//!
//! Emission follows call order, and the sink deduplicates by element id, so
//! a participant reached from several call sites renders exactly once while
//! every call site keeps its own markers and links.

use indexmap::IndexMap;
use log::{trace, warn};

use crate::diagram::{Diagram, DiagramLink, DiagramNode, LinkVariant};
use crate::error::PlumlineError;
use crate::flow::{Branch, Flow, Node, Participant};
use crate::geometry::Rect;
use crate::identifier::Id;
use crate::traverse::{self, CallPath, Element, Visitor};
use crate::viewstate::{NodeViewState, ViewStates};

/// Output accumulator shared by the factory and its sub-visitors.
///
/// Nodes and links are keyed by id and the first emission wins; insertion
/// order is preserved into the final diagram.
#[derive(Debug, Default)]
pub struct ElementSink {
    nodes: IndexMap<Id, DiagramNode>,
    links: IndexMap<Id, DiagramLink>,
}

impl ElementSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_node(&mut self, node: DiagramNode) {
        self.nodes.entry(node.id()).or_insert(node);
    }

    pub fn push_link(&mut self, link: DiagramLink) {
        self.links.entry(link.id()).or_insert(link);
    }

    pub fn into_diagram(self) -> Diagram {
        Diagram::new(
            self.nodes.into_values().collect(),
            self.links.into_values().collect(),
        )
    }
}

pub struct ElementFactoryVisitor<'a> {
    flow: &'a Flow,
    caller_id: Option<Id>,
    states: &'a ViewStates,
    path: CallPath,
    sink: &'a mut ElementSink,
}

impl<'a> ElementFactoryVisitor<'a> {
    /// Creates a visitor for one traversal context, writing into a shared
    /// sink. `path` must already contain the participant about to be
    /// traversed.
    pub fn new(
        flow: &'a Flow,
        caller_id: Option<Id>,
        states: &'a ViewStates,
        path: CallPath,
        sink: &'a mut ElementSink,
    ) -> Self {
        trace!(caller:? = caller_id.map(|id| id.to_string()); "element factory visitor started");
        Self {
            flow,
            caller_id,
            states,
            path,
            sink,
        }
    }

    /// Element id scoped to this caller context, so a node reached from two
    /// call sites emits distinct markers and links.
    fn context_id(&self, node_id: Id) -> Id {
        match self.caller_id {
            Some(caller) => node_id.create_nested(caller),
            None => node_id,
        }
    }

    fn emit_participant(&mut self, participant: &Participant) {
        let Some(state) = self.states.participant(participant.id()) else {
            warn!(participant:% = participant.id(); "view state not found for participant");
            return;
        };
        self.sink.push_node(DiagramNode::participant(
            participant.id(),
            state.bbox(),
            participant.name(),
            participant.kind(),
        ));
    }

    fn emit_call_elements(&mut self, node: &Node, state: NodeViewState) {
        let ctx = self.context_id(node.node_id());
        let start_id = ctx.create_nested(Id::new("start"));
        let end_id = ctx.create_nested(Id::new("end"));
        let return_start_id = ctx.create_nested(Id::new("return-start"));
        let return_end_id = ctx.create_nested(Id::new("return-end"));

        self.sink.push_node(DiagramNode::point(start_id, state.start().bbox()));
        self.sink.push_node(DiagramNode::point(end_id, state.end().bbox()));
        self.sink
            .push_node(DiagramNode::point(return_start_id, state.return_start().bbox()));
        self.sink
            .push_node(DiagramNode::point(return_end_id, state.return_end().bbox()));

        self.sink.push_link(
            DiagramLink::new(
                ctx.create_nested(Id::new("call")),
                start_id,
                end_id,
                LinkVariant::Call,
            )
            .with_label(node.interaction_label()),
        );
        self.sink.push_link(DiagramLink::new(
            ctx.create_nested(Id::new("return")),
            return_start_id,
            return_end_id,
            LinkVariant::Return,
        ));

        // activation spans on the source and target columns; zero or inverted
        // spans come from soft-failed positioning and render nothing
        let source_height = state.return_end().bbox().y() - state.start().bbox().y();
        if source_height > 0.0 {
            self.sink.push_node(DiagramNode::lifeline(
                ctx.create_nested(Id::new("source-lifeline")),
                Rect::new(
                    state.start().bbox().x(),
                    state.start().bbox().y(),
                    0.0,
                    source_height,
                ),
            ));
        }
        let target_height = state.return_start().bbox().y() - state.end().bbox().y();
        if target_height > 0.0 {
            self.sink.push_node(DiagramNode::lifeline(
                ctx.create_nested(Id::new("target-lifeline")),
                Rect::new(
                    state.end().bbox().x(),
                    state.end().bbox().y(),
                    0.0,
                    target_height,
                ),
            ));
        }
    }

    fn emit_branch_container(&mut self, branch: &Branch, parent: &Node) {
        if branch.children().is_empty() {
            return;
        }
        let branch_id = branch.branch_id(parent);
        let Some(block) = self.states.block(branch_id) else {
            warn!(branch:% = branch_id; "view state not found for branch");
            return;
        };
        self.sink.push_node(DiagramNode::container(
            branch_id,
            block.bbox(),
            None,
            block.breakpoint_percent(),
        ));
    }
}

impl Visitor for ElementFactoryVisitor<'_> {
    fn begin_visit_participant(&mut self, participant: &Participant) -> Result<(), PlumlineError> {
        self.emit_participant(participant);
        Ok(())
    }

    fn end_visit_participant(&mut self, participant: &Participant) -> Result<(), PlumlineError> {
        if self.caller_id.is_some() {
            return Ok(());
        }
        for other in self.flow.others() {
            self.emit_participant(other);
        }

        let Some(state) = self.states.participant(participant.id()) else {
            warn!(participant:% = participant.id(); "view state not found for participant");
            return Ok(());
        };
        let Some(height) = state.lifeline_height() else {
            warn!(participant:% = participant.id(); "lifeline height not set for participant");
            return Ok(());
        };
        let bbox = state.bbox();
        self.sink.push_node(DiagramNode::lifeline(
            participant.id().create_nested(Id::new("lifeline")),
            Rect::new(bbox.x(), bbox.bottom(), 0.0, height),
        ));
        Ok(())
    }

    fn begin_visit_node(&mut self, node: &Node, _parent: Element<'_>) -> Result<(), PlumlineError> {
        let node_id = node.node_id();
        let Some(state) = self.states.node(node_id, self.caller_id) else {
            warn!(
                node:% = node_id,
                caller:? = self.caller_id.map(|id| id.to_string());
                "view state not found for node"
            );
            return Ok(());
        };
        let state = *state;
        self.emit_call_elements(node, state);

        if let Some(target_id) = node.target_id() {
            match self.flow.participant(target_id) {
                Some(target) => {
                    let child_path = self.path.descend(target_id)?;
                    let mut child = ElementFactoryVisitor::new(
                        self.flow,
                        Some(node_id),
                        self.states,
                        child_path,
                        &mut *self.sink,
                    );
                    traverse::traverse_participant(target, &mut child)?;
                }
                None => {
                    warn!(node:% = node_id, target:% = target_id; "target participant not found");
                }
            }
        }
        Ok(())
    }

    fn begin_visit_if(&mut self, node: &Node, _parent: Element<'_>) -> Result<(), PlumlineError> {
        let block_id = node.node_id();
        let Some(block) = self.states.block(block_id) else {
            warn!(node:% = block_id; "view state not found for container");
            return Ok(());
        };
        let label = node.properties().condition().map(String::from);
        self.sink.push_node(DiagramNode::container(
            block_id,
            block.bbox(),
            label,
            block.breakpoint_percent(),
        ));
        Ok(())
    }

    fn begin_visit_then(&mut self, branch: &Branch, parent: &Node) -> Result<(), PlumlineError> {
        self.emit_branch_container(branch, parent);
        Ok(())
    }

    fn begin_visit_else(&mut self, branch: &Branch, parent: &Node) -> Result<(), PlumlineError> {
        self.emit_branch_container(branch, parent);
        Ok(())
    }

    // returns render nothing
    fn begin_visit_return(&mut self, _node: &Node, _parent: Element<'_>) -> Result<(), PlumlineError> {
        Ok(())
    }

    fn end_visit_return(&mut self, _node: &Node, _parent: Element<'_>) -> Result<(), PlumlineError> {
        Ok(())
    }
}
