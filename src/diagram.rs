//! Renderable output descriptors.
//!
//! The layout pipeline flattens the positioned flow into a [`Diagram`]: one
//! ordered node list (participants, point markers, lifelines, containers)
//! and one ordered link list (call and return edges between point markers).
//! Descriptors carry plain geometry and serialize to the rendering host's
//! camelCase JSON; styling is entirely the host's concern.

use serde::Serialize;

use crate::error::PlumlineError;
use crate::flow::ParticipantKind;
use crate::geometry::Rect;
use crate::identifier::Id;

/// Type tag of a renderable node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DiagramNodeKind {
    Participant,
    Point,
    Lifeline,
    Container,
}

/// A renderable shape with a position and size.
///
/// Point markers carry a zero-sized box; lifelines carry a zero width and
/// use `height` as their vertical span.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramNode {
    id: Id,
    kind: DiagramNodeKind,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    participant_kind: Option<ParticipantKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    breakpoint_percent: Option<f32>,
}

impl DiagramNode {
    fn from_bbox(id: Id, kind: DiagramNodeKind, bbox: Rect) -> Self {
        Self {
            id,
            kind,
            x: bbox.x(),
            y: bbox.y(),
            width: bbox.width(),
            height: bbox.height(),
            label: None,
            participant_kind: None,
            breakpoint_percent: None,
        }
    }

    /// Participant head box, labeled with the display name.
    pub fn participant(id: Id, bbox: Rect, name: impl Into<String>, kind: ParticipantKind) -> Self {
        let mut node = Self::from_bbox(id, DiagramNodeKind::Participant, bbox);
        node.label = Some(name.into());
        node.participant_kind = Some(kind);
        node
    }

    /// Interaction point marker.
    pub fn point(id: Id, bbox: Rect) -> Self {
        Self::from_bbox(id, DiagramNodeKind::Point, bbox)
    }

    /// Vertical lifeline segment anchored at `x`.
    pub fn lifeline(id: Id, bbox: Rect) -> Self {
        Self::from_bbox(id, DiagramNodeKind::Lifeline, bbox)
    }

    /// Conditional container, optionally labeled with its condition text.
    pub fn container(
        id: Id,
        bbox: Rect,
        label: Option<String>,
        breakpoint_percent: Option<f32>,
    ) -> Self {
        let mut node = Self::from_bbox(id, DiagramNodeKind::Container, bbox);
        node.label = label;
        node.breakpoint_percent = breakpoint_percent;
        node
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn kind(&self) -> DiagramNodeKind {
        self.kind
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn participant_kind(&self) -> Option<ParticipantKind> {
        self.participant_kind
    }

    pub fn breakpoint_percent(&self) -> Option<f32> {
        self.breakpoint_percent
    }
}

/// Styling variant of a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LinkVariant {
    /// Forward call edge.
    Call,
    /// Return edge, conventionally rendered dashed.
    Return,
}

/// A renderable edge between two point markers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramLink {
    id: Id,
    source: Id,
    target: Id,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    variant: LinkVariant,
}

impl DiagramLink {
    pub fn new(id: Id, source: Id, target: Id, variant: LinkVariant) -> Self {
        Self {
            id,
            source,
            target,
            label: None,
            variant,
        }
    }

    pub fn with_label(mut self, label: Option<String>) -> Self {
        self.label = label;
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn source(&self) -> Id {
        self.source
    }

    pub fn target(&self) -> Id {
        self.target
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn variant(&self) -> LinkVariant {
        self.variant
    }
}

/// Flat renderable model handed to the diagram canvas.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagram {
    nodes: Vec<DiagramNode>,
    links: Vec<DiagramLink>,
}

impl Diagram {
    pub fn new(nodes: Vec<DiagramNode>, links: Vec<DiagramLink>) -> Self {
        Self { nodes, links }
    }

    pub fn nodes(&self) -> &[DiagramNode] {
        &self.nodes
    }

    pub fn links(&self) -> &[DiagramLink] {
        &self.links
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }

    /// Serializes the diagram for the rendering host.
    pub fn to_json(&self) -> Result<String, PlumlineError> {
        Ok(serde_json::to_string(self)?)
    }
}
