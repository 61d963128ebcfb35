//! View-state store holding the computed geometry for every diagram element.
//!
//! Layout never mutates the flow tree. Each pass reads the structure and
//! writes geometry into a [`ViewStates`] table owned by a single layout run:
//! participants are keyed by id, interaction nodes by `(id, caller context)`,
//! and conditional blocks by block id. The caller context is the id of the
//! call node through which the owning participant was reached (`None` on the
//! entry traversal), so a callee node reached from two call sites keeps two
//! independent geometry records.

use indexmap::IndexMap;

use crate::geometry::Rect;
use crate::identifier::Id;

/// Geometry of one interaction point (call start/end, return start/end).
///
/// The bounding box starts zeroed and is filled in by the position pass. The
/// participant id names the lifeline the point anchors to and is fixed when
/// the record is created.
#[derive(Debug, Clone, Copy)]
pub struct PointViewState {
    bbox: Rect,
    participant_id: Id,
}

impl PointViewState {
    pub fn new(participant_id: Id) -> Self {
        Self {
            bbox: Rect::default(),
            participant_id,
        }
    }

    pub fn bbox(&self) -> Rect {
        self.bbox
    }

    pub fn bbox_mut(&mut self) -> &mut Rect {
        &mut self.bbox
    }

    pub fn participant_id(&self) -> Id {
        self.participant_id
    }
}

/// Geometry of a participant: its box, horizontal ordering slot, and the
/// lifeline height shared by the whole diagram once the entry traversal has
/// finished.
#[derive(Debug, Clone, Copy)]
pub struct ParticipantViewState {
    bbox: Rect,
    x_index: usize,
    lifeline_height: Option<f32>,
}

impl ParticipantViewState {
    pub fn new(bbox: Rect, x_index: usize) -> Self {
        Self {
            bbox,
            x_index,
            lifeline_height: None,
        }
    }

    pub fn bbox(&self) -> Rect {
        self.bbox
    }

    pub fn bbox_mut(&mut self) -> &mut Rect {
        &mut self.bbox
    }

    /// Horizontal ordering slot, assigned once on first visit.
    pub fn x_index(&self) -> usize {
        self.x_index
    }

    pub fn lifeline_height(&self) -> Option<f32> {
        self.lifeline_height
    }

    pub fn set_lifeline_height(&mut self, height: f32) -> &mut Self {
        self.lifeline_height = Some(height);
        self
    }
}

/// Geometry of one interaction node under one caller context: four anchored
/// points plus the node's own box.
#[derive(Debug, Clone, Copy)]
pub struct NodeViewState {
    caller_id: Option<Id>,
    bbox: Rect,
    start: PointViewState,
    end: PointViewState,
    return_start: PointViewState,
    return_end: PointViewState,
}

impl NodeViewState {
    /// Creates a zeroed record. `start` and `return_end` anchor to the
    /// participant whose body holds the node, `end` and `return_start` to the
    /// call's target participant.
    pub fn new(caller_id: Option<Id>, source_participant: Id, target_participant: Id) -> Self {
        Self {
            caller_id,
            bbox: Rect::default(),
            start: PointViewState::new(source_participant),
            end: PointViewState::new(target_participant),
            return_start: PointViewState::new(target_participant),
            return_end: PointViewState::new(source_participant),
        }
    }

    pub fn caller_id(&self) -> Option<Id> {
        self.caller_id
    }

    pub fn bbox(&self) -> Rect {
        self.bbox
    }

    pub fn bbox_mut(&mut self) -> &mut Rect {
        &mut self.bbox
    }

    pub fn start(&self) -> &PointViewState {
        &self.start
    }

    pub fn start_mut(&mut self) -> &mut PointViewState {
        &mut self.start
    }

    pub fn end(&self) -> &PointViewState {
        &self.end
    }

    pub fn end_mut(&mut self) -> &mut PointViewState {
        &mut self.end
    }

    pub fn return_start(&self) -> &PointViewState {
        &self.return_start
    }

    pub fn return_start_mut(&mut self) -> &mut PointViewState {
        &mut self.return_start
    }

    pub fn return_end(&self) -> &PointViewState {
        &self.return_end
    }

    pub fn return_end_mut(&mut self) -> &mut PointViewState {
        &mut self.return_end
    }
}

/// Geometry of a conditional or loop container, or of one of its branches.
///
/// Blocks are keyed by block id alone, independent of caller context; when
/// the same block is positioned from several call sites the latest visit
/// wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockViewState {
    bbox: Rect,
    breakpoint_percent: Option<f32>,
}

impl BlockViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bbox(&self) -> Rect {
        self.bbox
    }

    pub fn bbox_mut(&mut self) -> &mut Rect {
        &mut self.bbox
    }

    /// Vertical position of the else branch as a percentage of the container
    /// height. Only set for conditionals with a non-empty else branch.
    pub fn breakpoint_percent(&self) -> Option<f32> {
        self.breakpoint_percent
    }

    pub fn set_breakpoint_percent(&mut self, percent: f32) -> &mut Self {
        self.breakpoint_percent = Some(percent);
        self
    }
}

/// Side table of all view-states for one layout run.
///
/// Lookups return `None` for elements that were never initialized; insertion
/// is unconditional, callers guard against overwriting where first-visit
/// semantics matter. Iteration order follows insertion order, which keeps
/// layout output deterministic.
#[derive(Debug, Default)]
pub struct ViewStates {
    participants: IndexMap<Id, ParticipantViewState>,
    nodes: IndexMap<(Id, Option<Id>), NodeViewState>,
    blocks: IndexMap<Id, BlockViewState>,
}

impl ViewStates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn participant(&self, id: Id) -> Option<&ParticipantViewState> {
        self.participants.get(&id)
    }

    pub fn participant_mut(&mut self, id: Id) -> Option<&mut ParticipantViewState> {
        self.participants.get_mut(&id)
    }

    pub fn insert_participant(&mut self, id: Id, state: ParticipantViewState) {
        self.participants.insert(id, state);
    }

    pub fn node(&self, id: Id, caller: Option<Id>) -> Option<&NodeViewState> {
        self.nodes.get(&(id, caller))
    }

    pub fn node_mut(&mut self, id: Id, caller: Option<Id>) -> Option<&mut NodeViewState> {
        self.nodes.get_mut(&(id, caller))
    }

    pub fn insert_node(&mut self, id: Id, caller: Option<Id>, state: NodeViewState) {
        self.nodes.insert((id, caller), state);
    }

    pub fn block(&self, id: Id) -> Option<&BlockViewState> {
        self.blocks.get(&id)
    }

    pub fn block_mut(&mut self, id: Id) -> Option<&mut BlockViewState> {
        self.blocks.get_mut(&id)
    }

    pub fn insert_block(&mut self, id: Id, state: BlockViewState) {
        self.blocks.insert(id, state);
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    /// Total node records across all caller contexts.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Number of caller contexts holding a record for one node.
    pub fn node_contexts(&self, id: Id) -> usize {
        self.nodes.keys().filter(|(node, _)| *node == id).count()
    }
}
