//! Second layout pass: concrete pixel coordinates.
//!
//! Horizontal placement comes straight from the init pass indices: a
//! participant's x is `x_index * (participant_gap_x + box width)`. Vertical
//! placement runs on a single cursor threaded through the whole call graph:
//! every visitor advances it while walking its participant and, on crossing
//! into a call's target, hands it to a child `PositionVisitor` and folds the
//! child's final cursor back, so interactions stack in call order no matter
//! which participant they belong to.
//!
//! For each call the cursor yields four points: start/end share the call's
//! y, return start/end share the return's y two node-heights further down.
//! Conditionals get padded boxes around their branches, sized horizontally
//! to span every participant the subtree touched. After the entry traversal
//! finishes, the entry participant's total call span becomes the shared
//! lifeline height of all participants.
//!
//! A missing view-state or target logs a warning and skips that element;
//! the pass never fails except on a cyclic call graph.

use log::{debug, trace, warn};

use crate::config::LayoutConfig;
use crate::error::PlumlineError;
use crate::flow::{Branch, BranchLabel, Flow, Node, Participant};
use crate::identifier::Id;
use crate::traverse::{self, CallPath, Element, Visitor};
use crate::viewstate::ViewStates;

pub struct PositionVisitor<'a> {
    flow: &'a Flow,
    caller_id: Option<Id>,
    entry_participant: Option<Id>,
    current_participant: Option<Id>,
    last_interaction_y: f32,
    max_participant_index: usize,
    states: &'a mut ViewStates,
    path: CallPath,
    config: &'a LayoutConfig,
}

impl<'a> PositionVisitor<'a> {
    /// Creates a visitor for one traversal context. `start_y` is the vertical
    /// cursor inherited from the caller; `path` must already contain the
    /// participant about to be traversed.
    pub fn new(
        flow: &'a Flow,
        caller_id: Option<Id>,
        start_y: f32,
        states: &'a mut ViewStates,
        path: CallPath,
        config: &'a LayoutConfig,
    ) -> Self {
        trace!(
            caller:? = caller_id.map(|id| id.to_string()),
            start_y;
            "position visitor started"
        );
        Self {
            flow,
            caller_id,
            entry_participant: flow.entry_participant().map(Participant::id),
            current_participant: None,
            last_interaction_y: start_y,
            max_participant_index: 0,
            states,
            path,
            config,
        }
    }

    /// Vertical cursor after this subtree completed; callers fold it back.
    pub fn last_interaction_y(&self) -> f32 {
        self.last_interaction_y
    }

    /// Highest participant index this subtree touched, recursions included.
    pub fn max_participant_index(&self) -> usize {
        self.max_participant_index
    }

    fn goto_target_participant(&mut self, node: &Node) -> Result<(), PlumlineError> {
        let Some(target_id) = node.target_id() else {
            return Ok(());
        };
        let Some(target) = self.flow.participant(target_id) else {
            return Ok(());
        };
        let child_path = self.path.descend(target_id)?;
        let mut child = PositionVisitor::new(
            self.flow,
            Some(node.node_id()),
            self.last_interaction_y,
            &mut *self.states,
            child_path,
            self.config,
        );
        traverse::traverse_participant(target, &mut child)?;
        self.last_interaction_y = child.last_interaction_y();
        self.max_participant_index = self.max_participant_index.max(child.max_participant_index());
        Ok(())
    }

    /// X of the parent element's box, for container placement.
    fn element_x(&self, element: Element<'_>) -> Option<f32> {
        match element {
            Element::Participant(participant) => self
                .states
                .participant(participant.id())
                .map(|state| state.bbox().x()),
            Element::Branch { node, branch } => self
                .states
                .block(branch.branch_id(node))
                .map(|state| state.bbox().x()),
        }
    }

    /// Places a then/else branch block inside its parent container.
    fn position_branch(&mut self, branch: &Branch, parent: &Node) {
        let branch_id = branch.branch_id(parent);
        if self.states.block(branch_id).is_none() {
            warn!(branch:% = branch_id; "view state not found for branch");
            return;
        }
        let Some(parent_x) = self
            .states
            .block(parent.node_id())
            .map(|state| state.bbox().x())
        else {
            warn!(node:% = parent.node_id(); "view state not found for parent container");
            return;
        };
        self.last_interaction_y += 2.0 * self.config.container_padding();
        let y = self.last_interaction_y - self.config.container_padding();
        if let Some(block) = self.states.block_mut(branch_id) {
            block.bbox_mut().set_x(parent_x);
            block.bbox_mut().set_y(y);
        }
    }

    /// Span of the participant's calls under this caller context: first call
    /// start to last call return-end. Unpositioned calls are skipped.
    fn lifeline_span(&self, participant: &Participant) -> Option<f32> {
        let mut first_start = None;
        let mut last_return_end = None;
        for node in participant.nodes() {
            if !node.is_call() {
                continue;
            }
            let Some(state) = self.states.node(node.node_id(), self.caller_id) else {
                continue;
            };
            if first_start.is_none() {
                first_start = Some(state.start().bbox().y());
            }
            last_return_end = Some(state.return_end().bbox().y());
        }
        let span = last_return_end? - first_start?;
        (span > 0.0).then_some(span)
    }
}

impl Visitor for PositionVisitor<'_> {
    fn begin_visit_participant(&mut self, participant: &Participant) -> Result<(), PlumlineError> {
        let gap_x = self.config.participant_gap_x();
        let Some(state) = self.states.participant_mut(participant.id()) else {
            warn!(participant:% = participant.id(); "view state not found for participant");
            return Ok(());
        };
        let x = state.x_index() as f32 * (gap_x + state.bbox().width());
        state.bbox_mut().set_x(x);
        let x_index = state.x_index();

        if self.current_participant.is_none() {
            self.current_participant = Some(participant.id());
            debug!(participant:% = participant.id(), x; "positioning participant subtree");
        }
        self.max_participant_index = self.max_participant_index.max(x_index);
        Ok(())
    }

    fn end_visit_participant(&mut self, participant: &Participant) -> Result<(), PlumlineError> {
        // others may have been indexed at any point, re-place them every time
        let gap_x = self.config.participant_gap_x();
        for other in self.flow.others() {
            if let Some(state) = self.states.participant_mut(other.id()) {
                let x = state.x_index() as f32 * (gap_x + state.bbox().width());
                state.bbox_mut().set_x(x);
                self.max_participant_index = self.max_participant_index.max(state.x_index());
            }
        }

        if self.caller_id.is_some() {
            return Ok(());
        }
        let Some(span) = self.lifeline_span(participant) else {
            warn!(participant:% = participant.id(); "start or end point not found for lifeline");
            return Ok(());
        };
        let height = span + self.config.interaction_group_gap_y();
        for p in self.flow.participants() {
            if let Some(state) = self.states.participant_mut(p.id()) {
                state.set_lifeline_height(height);
            }
        }
        Ok(())
    }

    fn begin_visit_node(&mut self, node: &Node, parent: Element<'_>) -> Result<(), PlumlineError> {
        let node_id = node.node_id();
        let Some(state) = self.states.node(node_id, self.caller_id) else {
            warn!(
                node:% = node_id,
                caller:? = self.caller_id.map(|id| id.to_string());
                "view state not found for node"
            );
            return Ok(());
        };
        let start_participant = state.start().participant_id();

        self.last_interaction_y += self.config.interaction_gap_y();
        if Some(start_participant) == self.entry_participant && parent.is_participant() {
            self.last_interaction_y += self.config.interaction_group_gap_y();
        }
        let y = self.last_interaction_y;
        if let Some(state) = self.states.node_mut(node_id, self.caller_id) {
            state.start_mut().bbox_mut().set_y(y);
            state.end_mut().bbox_mut().set_y(y);
        }
        self.last_interaction_y += self.config.interaction_node_height();

        self.goto_target_participant(node)
    }

    fn end_visit_node(&mut self, node: &Node, _parent: Element<'_>) -> Result<(), PlumlineError> {
        let node_id = node.node_id();
        let Some(state) = self.states.node(node_id, self.caller_id) else {
            warn!(
                node:% = node_id,
                caller:? = self.caller_id.map(|id| id.to_string());
                "view state not found for node"
            );
            return Ok(());
        };
        let start_participant = state.start().participant_id();

        let Some(target_state) = node
            .target_id()
            .and_then(|id| self.flow.participant(id))
            .and_then(|target| self.states.participant(target.id()))
        else {
            warn!(node:% = node_id; "target participant view state not found");
            return Ok(());
        };
        let target_x = target_state.bbox().x();
        let Some(source_state) = self.states.participant(start_participant) else {
            warn!(participant:% = start_participant; "source participant view state not found");
            return Ok(());
        };
        let source_x = source_state.bbox().x();

        self.last_interaction_y += self.config.interaction_node_height();
        let return_y = self.last_interaction_y;
        if let Some(state) = self.states.node_mut(node_id, self.caller_id) {
            state.start_mut().bbox_mut().set_x(source_x);
            state.end_mut().bbox_mut().set_x(target_x);
            state.return_start_mut().bbox_mut().set_x(target_x);
            state.return_start_mut().bbox_mut().set_y(return_y);
            state.return_end_mut().bbox_mut().set_x(source_x);
            state.return_end_mut().bbox_mut().set_y(return_y);
        }
        self.last_interaction_y += self.config.interaction_node_height();
        Ok(())
    }

    fn begin_visit_if(&mut self, node: &Node, parent: Element<'_>) -> Result<(), PlumlineError> {
        let block_id = node.node_id();
        if self.states.block(block_id).is_none() {
            warn!(node:% = block_id; "view state not found for container");
            return Ok(());
        }

        self.last_interaction_y += self.config.container_padding();
        if let (Some(current), Some(entry)) = (self.current_participant, self.entry_participant)
            && current == entry
        {
            self.last_interaction_y += self.config.interaction_group_gap_y();
        }

        let Some(parent_x) = self.element_x(parent) else {
            warn!(node:% = block_id; "parent view state not found for container");
            return Ok(());
        };
        let x = parent_x + self.config.participant_width() / 4.0;
        let y = self.last_interaction_y;
        if let Some(block) = self.states.block_mut(block_id) {
            block.bbox_mut().set_x(x);
            block.bbox_mut().set_y(y);
        }
        Ok(())
    }

    fn end_visit_if(&mut self, node: &Node, _parent: Element<'_>) -> Result<(), PlumlineError> {
        let block_id = node.node_id();
        let Some(block) = self.states.block(block_id) else {
            warn!(node:% = block_id; "view state not found for container");
            return Ok(());
        };
        let block_y = block.bbox().y();

        let Some(current_state) = self
            .current_participant
            .and_then(|id| self.states.participant(id))
        else {
            warn!(node:% = block_id; "current participant view state not found");
            return Ok(());
        };
        let index_span = self
            .max_participant_index
            .saturating_sub(current_state.x_index());
        let width = index_span as f32
            * (self.config.participant_gap_x() + self.config.participant_width())
            + self.config.participant_width() / 2.0;

        self.last_interaction_y += self.config.container_padding();
        let height = self.last_interaction_y - block_y + self.config.interaction_gap_y();

        let breakpoint = node
            .branches()
            .iter()
            .find(|branch| branch.label() == BranchLabel::Else && !branch.children().is_empty())
            .and_then(|branch| self.states.block(branch.branch_id(node)))
            .map(|else_block| (else_block.bbox().y() - block_y) / height * 100.0);

        if let Some(block) = self.states.block_mut(block_id) {
            block.bbox_mut().set_width(width);
            block.bbox_mut().set_height(height);
            if let Some(percent) = breakpoint {
                block.set_breakpoint_percent(percent);
            }
        }
        Ok(())
    }

    fn begin_visit_then(&mut self, branch: &Branch, parent: &Node) -> Result<(), PlumlineError> {
        self.position_branch(branch, parent);
        Ok(())
    }

    fn begin_visit_else(&mut self, branch: &Branch, parent: &Node) -> Result<(), PlumlineError> {
        if !branch.children().is_empty() {
            self.last_interaction_y += self.config.interaction_gap_y();
        }
        self.position_branch(branch, parent);
        Ok(())
    }

    // returns carry no geometry of their own
    fn begin_visit_return(&mut self, _node: &Node, _parent: Element<'_>) -> Result<(), PlumlineError> {
        Ok(())
    }

    fn end_visit_return(&mut self, _node: &Node, _parent: Element<'_>) -> Result<(), PlumlineError> {
        Ok(())
    }

    // while loops render no container, their body still stacks on the cursor
    fn begin_visit_while(&mut self, _node: &Node, _parent: Element<'_>) -> Result<(), PlumlineError> {
        Ok(())
    }
}
