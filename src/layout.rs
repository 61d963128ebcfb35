//! Layout pipeline: three sequential passes over the flow tree.
//!
//! [`LayoutEngine`] drives [`InitVisitor`] (view-state creation and
//! horizontal ordering), [`PositionVisitor`] (pixel coordinates) and
//! [`ElementFactoryVisitor`] (renderable element emission), in that order.
//! Each pass finishes before the next starts; later passes read the
//! view-states earlier passes wrote.

mod elements;
mod init;
mod position;

pub use elements::{ElementFactoryVisitor, ElementSink};
pub use init::InitVisitor;
pub use position::PositionVisitor;

use log::debug;

use crate::config::LayoutConfig;
use crate::diagram::Diagram;
use crate::error::PlumlineError;
use crate::flow::Flow;
use crate::traverse::{self, CallPath};
use crate::viewstate::ViewStates;

/// Facade running the full layout pipeline over a flow.
///
/// Every [`calculate`](LayoutEngine::calculate) call works on a fresh
/// view-state store; nothing carries over between runs, so one engine can
/// lay out any number of flows.
#[derive(Debug, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Runs the init, position and element passes and returns the renderable
    /// diagram.
    ///
    /// An empty flow yields an empty diagram. The only failure conditions
    /// are a cyclic call graph and diagram serialization downstream;
    /// malformed elements inside the flow are logged and skipped.
    pub fn calculate(&self, flow: &Flow) -> Result<Diagram, PlumlineError> {
        let Some(entry) = flow.entry_participant() else {
            debug!("flow has no participants, returning empty diagram");
            return Ok(Diagram::default());
        };

        let mut states = ViewStates::new();
        let path = CallPath::new().descend(entry.id())?;

        debug!(entry:% = entry.id(); "layout pass: init");
        let mut init = InitVisitor::new(flow, None, 0, &mut states, path.clone(), &self.config);
        traverse::traverse_participant(entry, &mut init)?;
        debug!(
            participants = states.participant_count(),
            nodes = states.node_count(),
            blocks = states.block_count();
            "init pass complete"
        );

        debug!(entry:% = entry.id(); "layout pass: position");
        let mut position =
            PositionVisitor::new(flow, None, 0.0, &mut states, path.clone(), &self.config);
        traverse::traverse_participant(entry, &mut position)?;

        debug!(entry:% = entry.id(); "layout pass: elements");
        let mut sink = ElementSink::new();
        let mut factory = ElementFactoryVisitor::new(flow, None, &states, path, &mut sink);
        traverse::traverse_participant(entry, &mut factory)?;

        let diagram = sink.into_diagram();
        debug!(
            nodes = diagram.nodes().len(),
            links = diagram.links().len();
            "layout complete"
        );
        Ok(diagram)
    }
}
