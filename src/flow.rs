//! Flow model: the typed tree of participants and nodes handed in by the
//! compiler front-end.
//!
//! # Architecture
//!
//! A [`Flow`] carries the primary `participants` (the first one is the entry
//! participant, the traversal root), optional `others` (externally referenced
//! participants rendered but never traversed into), and an optional source
//! span. Participants own ordered [`Node`]s; conditional and loop nodes own
//! labeled [`Branch`]es which in turn own child nodes.
//!
//! The tree is structurally read-only once built: layout geometry lives in a
//! separate view-state store, never on these types.
//!
//! # Wire format
//!
//! Flows deserialize from the front-end's JSON: camelCase field names,
//! SCREAMING_SNAKE_CASE kind tags. Unrecognized kind tags map to the `Unknown`
//! variants instead of failing deserialization; traversal later skips those
//! elements with a warning. Node identity is derived from the source span, so
//! the same node reached through different call chains keeps a single id and
//! caller contexts tell the visits apart.

use std::fmt;

use serde::Deserialize;

use crate::{error::PlumlineError, identifier::Id};

/// A source span in the file the flow was built from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    file_name: String,
    start_line: u32,
    start_column: u32,
    end_line: u32,
    end_column: u32,
}

impl Location {
    /// Creates a location from a file name and span coordinates
    pub fn new(
        file_name: impl Into<String>,
        start_line: u32,
        start_column: u32,
        end_line: u32,
        end_column: u32,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }

    /// Returns the name of the file this span belongs to
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Returns the one-based line the span starts on
    pub fn start_line(&self) -> u32 {
        self.start_line
    }

    /// Returns the column the span starts on
    pub fn start_column(&self) -> u32 {
        self.start_column
    }

    /// Returns the line the span ends on
    pub fn end_line(&self) -> u32 {
        self.end_line
    }

    /// Returns the column the span ends on
    pub fn end_column(&self) -> u32 {
        self.end_column
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}",
            self.file_name, self.start_line, self.start_column, self.end_line, self.end_column
        )
    }
}

/// Discriminant tag of a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParticipantKind {
    Function,
    Endpoint,
    /// Missing or unrecognized tag; traversal skips these with a warning.
    #[default]
    #[serde(other)]
    Unknown,
}

/// Discriminant tag of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    Interaction,
    If,
    While,
    /// Missing or unrecognized tag; traversal skips these with a warning.
    #[default]
    #[serde(other)]
    Unknown,
}

/// Sub-kind of an interaction node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InteractionType {
    FunctionCall,
    EndpointCall,
    Return,
    #[serde(other)]
    Unknown,
}

/// Label of a branch inside a conditional or loop node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BranchLabel {
    Then,
    Else,
    Body,
    #[serde(other)]
    Unknown,
}

impl BranchLabel {
    /// Returns the lowercase label used in derived branch identifiers
    pub fn as_str(self) -> &'static str {
        match self {
            BranchLabel::Then => "then",
            BranchLabel::Else => "else",
            BranchLabel::Body => "body",
            BranchLabel::Unknown => "unknown",
        }
    }
}

/// Display properties attached to a node by the front-end.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeProperties {
    name: Option<String>,
    params: Vec<String>,
    condition: Option<String>,
}

impl NodeProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the called function or endpoint name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the rendered argument list of a call
    pub fn with_params(mut self, params: Vec<String>) -> Self {
        self.params = params;
        self
    }

    /// Sets the rendered condition text of an `if`/`while`
    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn condition(&self) -> Option<&str> {
        self.condition.as_deref()
    }
}

/// An interaction inside a participant's body: a call, a conditional, or a
/// loop.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    #[serde(default)]
    kind: NodeKind,
    #[serde(default)]
    interaction_type: Option<InteractionType>,
    #[serde(default)]
    target_id: Option<Id>,
    #[serde(default)]
    properties: NodeProperties,
    location: Location,
    #[serde(default)]
    branches: Vec<Branch>,
}

impl Node {
    pub fn new(kind: NodeKind, location: Location) -> Self {
        Self {
            kind,
            interaction_type: None,
            target_id: None,
            properties: NodeProperties::default(),
            location,
            branches: Vec::new(),
        }
    }

    pub fn with_interaction_type(mut self, interaction_type: InteractionType) -> Self {
        self.interaction_type = Some(interaction_type);
        self
    }

    /// Sets the participant this call crosses into
    pub fn with_target(mut self, target: impl Into<Id>) -> Self {
        self.target_id = Some(target.into());
        self
    }

    pub fn with_properties(mut self, properties: NodeProperties) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_branches(mut self, branches: Vec<Branch>) -> Self {
        self.branches = branches;
        self
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn interaction_type(&self) -> Option<InteractionType> {
        self.interaction_type
    }

    pub fn target_id(&self) -> Option<Id> {
        self.target_id
    }

    pub fn properties(&self) -> &NodeProperties {
        &self.properties
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    /// Identity of this node, derived from its source span.
    pub fn node_id(&self) -> Id {
        Id::new(&self.location.to_string())
    }

    /// True for interaction nodes that call somewhere, i.e. everything except
    /// returns and containers.
    pub fn is_call(&self) -> bool {
        self.kind == NodeKind::Interaction
            && self.interaction_type != Some(InteractionType::Return)
    }

    /// Text rendered on the call link: `name(arg1, arg2)` for function calls,
    /// the endpoint name for endpoint calls, nothing otherwise.
    pub fn interaction_label(&self) -> Option<String> {
        match self.interaction_type {
            Some(InteractionType::FunctionCall) => self
                .properties
                .name()
                .map(|name| format!("{}({})", name, self.properties.params().join(", "))),
            Some(InteractionType::EndpointCall) => self.properties.name().map(String::from),
            _ => None,
        }
    }
}

/// A labeled sub-block of a conditional or loop node.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    label: BranchLabel,
    #[serde(default)]
    children: Vec<Node>,
}

impl Branch {
    pub fn new(label: BranchLabel, children: Vec<Node>) -> Self {
        Self { label, children }
    }

    pub fn label(&self) -> BranchLabel {
        self.label
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Identity of this branch, nested under the owning node's id.
    pub fn branch_id(&self, parent: &Node) -> Id {
        parent.node_id().create_nested(Id::new(self.label.as_str()))
    }
}

/// An actor in the sequence diagram, rendered as a lifeline.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    id: Id,
    #[serde(default)]
    kind: ParticipantKind,
    name: String,
    #[serde(default)]
    location: Option<Location>,
    #[serde(default)]
    nodes: Vec<Node>,
}

impl Participant {
    pub fn new(id: impl Into<Id>, kind: ParticipantKind, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            name: name.into(),
            location: None,
            nodes: Vec::new(),
        }
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_nodes(mut self, nodes: Vec<Node>) -> Self {
        self.nodes = nodes;
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn kind(&self) -> ParticipantKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }
}

/// The whole call flow handed to the layout pipeline.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flow {
    #[serde(default)]
    participants: Vec<Participant>,
    #[serde(default)]
    others: Vec<Participant>,
    #[serde(default)]
    location: Option<Location>,
}

impl Flow {
    pub fn new(participants: Vec<Participant>) -> Self {
        Self {
            participants,
            others: Vec::new(),
            location: None,
        }
    }

    /// Attaches externally referenced participants that are rendered but never
    /// traversed into
    pub fn with_others(mut self, others: Vec<Participant>) -> Self {
        self.others = others;
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Parses a flow from the front-end's JSON payload.
    pub fn from_json(text: &str) -> Result<Self, PlumlineError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn others(&self) -> &[Participant] {
        &self.others
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    /// The traversal root: the first participant of the flow.
    pub fn entry_participant(&self) -> Option<&Participant> {
        self.participants.first()
    }

    /// Looks up a primary participant by id. `others` are deliberately not
    /// searched; they are never valid call targets.
    pub fn participant(&self, id: Id) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }
}
