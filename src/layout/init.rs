//! First layout pass: view-state creation and horizontal ordering.
//!
//! Walks the flow from the entry participant and creates a zeroed view-state
//! for every element it reaches: participants get their box and a horizontal
//! index assigned on first visit, interaction nodes get one record per
//! caller context, conditionals with at least one non-empty branch get block
//! records. Crossing into a call's target spawns a child `InitVisitor`
//! scoped to that call site; the child's highest seen index folds back into
//! the parent so index assignment stays globally monotonic in call order.
//!
//! The pass is idempotent: re-running it over the same store creates
//! nothing, because every insertion is guarded by a lookup.

use log::{trace, warn};

use crate::config::LayoutConfig;
use crate::error::PlumlineError;
use crate::flow::{Branch, Flow, Node, Participant};
use crate::geometry::Rect;
use crate::identifier::Id;
use crate::traverse::{self, CallPath, Element, Visitor};
use crate::viewstate::{BlockViewState, NodeViewState, ParticipantViewState, ViewStates};

pub struct InitVisitor<'a> {
    flow: &'a Flow,
    caller_id: Option<Id>,
    participant_index: usize,
    latest_index: usize,
    active_participant: Option<Id>,
    states: &'a mut ViewStates,
    path: CallPath,
    config: &'a LayoutConfig,
}

impl<'a> InitVisitor<'a> {
    /// Creates a visitor for one traversal context. `participant_index` is
    /// the slot the root participant takes if it has none yet; `path` must
    /// already contain that participant.
    pub fn new(
        flow: &'a Flow,
        caller_id: Option<Id>,
        participant_index: usize,
        states: &'a mut ViewStates,
        path: CallPath,
        config: &'a LayoutConfig,
    ) -> Self {
        trace!(
            caller:? = caller_id.map(|id| id.to_string()),
            index = participant_index;
            "init visitor started"
        );
        Self {
            flow,
            caller_id,
            participant_index,
            latest_index: participant_index,
            active_participant: None,
            states,
            path,
            config,
        }
    }

    /// Highest participant index assigned or seen in this subtree, child
    /// recursions included.
    pub fn latest_index(&self) -> usize {
        self.latest_index
    }

    fn participant_bbox(&self) -> Rect {
        Rect::sized(
            self.config.participant_width(),
            self.config.participant_height(),
        )
    }

    fn ensure_block(&mut self, block_id: Id) {
        if self.states.block(block_id).is_none() {
            self.states.insert_block(block_id, BlockViewState::new());
        }
    }

    /// Containers only get a block record when something will render inside.
    fn ensure_container_block(&mut self, node: &Node) {
        if node.branches().iter().any(|branch| !branch.children().is_empty()) {
            self.ensure_block(node.node_id());
        }
    }
}

impl Visitor for InitVisitor<'_> {
    fn begin_visit_participant(&mut self, participant: &Participant) -> Result<(), PlumlineError> {
        let id = participant.id();
        if self.states.participant(id).is_none() {
            let state = ParticipantViewState::new(self.participant_bbox(), self.participant_index);
            self.states.insert_participant(id, state);
        }
        if let Some(state) = self.states.participant(id) {
            self.latest_index = self.latest_index.max(state.x_index());
        }
        self.active_participant = Some(id);
        Ok(())
    }

    fn end_visit_participant(&mut self, _participant: &Participant) -> Result<(), PlumlineError> {
        // others are indexed once, after the whole entry traversal, so they
        // always land to the right of every participant on the call graph
        if self.caller_id.is_some() {
            return Ok(());
        }
        for other in self.flow.others() {
            if self.states.participant(other.id()).is_none() {
                self.latest_index += 1;
                let state = ParticipantViewState::new(self.participant_bbox(), self.latest_index);
                self.states.insert_participant(other.id(), state);
            }
        }
        Ok(())
    }

    fn begin_visit_node(&mut self, node: &Node, _parent: Element<'_>) -> Result<(), PlumlineError> {
        let Some(active) = self.active_participant else {
            warn!(node:% = node.node_id(); "no active participant for node");
            return Ok(());
        };
        let node_id = node.node_id();
        if self.states.node(node_id, self.caller_id).is_none() {
            let target = node.target_id().unwrap_or(active);
            let state = NodeViewState::new(self.caller_id, active, target);
            self.states.insert_node(node_id, self.caller_id, state);
        }

        let Some(target_id) = node.target_id() else {
            return Ok(());
        };
        let Some(target) = self.flow.participant(target_id) else {
            warn!(node:% = node_id, target:% = target_id; "target participant not found");
            return Ok(());
        };
        let start_index = self
            .states
            .participant(target_id)
            .map(|state| state.x_index())
            .unwrap_or(self.latest_index + 1);
        let child_path = self.path.descend(target_id)?;
        let mut child = InitVisitor::new(
            self.flow,
            Some(node_id),
            start_index,
            &mut *self.states,
            child_path,
            self.config,
        );
        traverse::traverse_participant(target, &mut child)?;
        let child_latest = child.latest_index();
        self.latest_index = self.latest_index.max(child_latest);
        Ok(())
    }

    fn begin_visit_if(&mut self, node: &Node, _parent: Element<'_>) -> Result<(), PlumlineError> {
        self.ensure_container_block(node);
        Ok(())
    }

    fn begin_visit_while(&mut self, node: &Node, _parent: Element<'_>) -> Result<(), PlumlineError> {
        self.ensure_container_block(node);
        Ok(())
    }

    fn begin_visit_then(&mut self, branch: &Branch, parent: &Node) -> Result<(), PlumlineError> {
        if !branch.children().is_empty() {
            self.ensure_block(branch.branch_id(parent));
        }
        Ok(())
    }

    fn begin_visit_else(&mut self, branch: &Branch, parent: &Node) -> Result<(), PlumlineError> {
        if !branch.children().is_empty() {
            self.ensure_block(branch.branch_id(parent));
        }
        Ok(())
    }
}
