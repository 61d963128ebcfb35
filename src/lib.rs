//! Plumline is a layout engine for call-flow sequence diagrams.
//!
//! It takes a typed flow tree of participants (functions and endpoints) and
//! interaction nodes (calls, conditionals, loops) produced by a compiler
//! front-end, and computes renderable geometry: participant boxes, point
//! markers, lifelines, conditional containers and the links between them.
//! Layout runs as three visitor passes over the entry participant's call
//! graph (init, position, element factory); see [`layout::LayoutEngine`].
//!
//! The flow arrives as JSON ([`Flow::from_json`]) and the resulting
//! [`Diagram`] serializes back to JSON for the rendering host. Malformed
//! flow elements are logged and skipped rather than failing the layout; the
//! only fatal layout error is a cyclic call graph.
//!
//! # Examples
//!
//! ```rust
//! use plumline::{LayoutEngine, flow::{Flow, Participant, ParticipantKind}};
//!
//! let flow = Flow::new(vec![Participant::new(
//!     "main",
//!     ParticipantKind::Function,
//!     "main",
//! )]);
//!
//! let diagram = LayoutEngine::new()
//!     .calculate(&flow)
//!     .expect("layout failed");
//! assert_eq!(diagram.nodes().len(), 1);
//! ```

pub mod config;
pub mod diagram;
pub mod flow;
pub mod geometry;
pub mod identifier;
pub mod layout;
pub mod traverse;
pub mod viewport;
pub mod viewstate;

mod error;

pub use config::LayoutConfig;
pub use diagram::{Diagram, DiagramLink, DiagramNode};
pub use error::PlumlineError;
pub use flow::Flow;
pub use geometry::Rect;
pub use identifier::Id;
pub use layout::LayoutEngine;
pub use viewport::ViewportState;
