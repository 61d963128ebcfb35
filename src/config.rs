//! Layout metrics for the diagram.
//!
//! [`LayoutConfig`] carries every spacing and sizing constant the layout
//! passes use, in diagram pixel space. Values deserialize from the host's
//! camelCase JSON; omitted fields keep their defaults, so a host can
//! override a single metric without restating the rest.

use serde::Deserialize;

/// Spacing and sizing metrics in diagram pixel space.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    participant_width: f32,
    participant_height: f32,
    participant_gap_x: f32,
    interaction_gap_y: f32,
    interaction_group_gap_y: f32,
    interaction_node_height: f32,
    container_padding: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            participant_width: 160.0,
            participant_height: 40.0,
            participant_gap_x: 60.0,
            interaction_gap_y: 20.0,
            interaction_group_gap_y: 40.0,
            interaction_node_height: 10.0,
            container_padding: 16.0,
        }
    }
}

impl LayoutConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Width of a participant's head box.
    pub fn participant_width(&self) -> f32 {
        self.participant_width
    }

    /// Height of a participant's head box.
    pub fn participant_height(&self) -> f32 {
        self.participant_height
    }

    /// Horizontal gap between adjacent participant boxes.
    pub fn participant_gap_x(&self) -> f32 {
        self.participant_gap_x
    }

    /// Vertical gap inserted before every interaction.
    pub fn interaction_gap_y(&self) -> f32 {
        self.interaction_gap_y
    }

    /// Extra vertical gap before interaction groups started at the entry
    /// participant.
    pub fn interaction_group_gap_y(&self) -> f32 {
        self.interaction_group_gap_y
    }

    /// Vertical extent reserved for one interaction edge.
    pub fn interaction_node_height(&self) -> f32 {
        self.interaction_node_height
    }

    /// Inner padding of conditional containers.
    pub fn container_padding(&self) -> f32 {
        self.container_padding
    }

    pub fn set_participant_width(&mut self, width: f32) -> &mut Self {
        self.participant_width = width;
        self
    }

    pub fn set_participant_height(&mut self, height: f32) -> &mut Self {
        self.participant_height = height;
        self
    }

    pub fn set_participant_gap_x(&mut self, gap: f32) -> &mut Self {
        self.participant_gap_x = gap;
        self
    }

    pub fn set_interaction_gap_y(&mut self, gap: f32) -> &mut Self {
        self.interaction_gap_y = gap;
        self
    }

    pub fn set_interaction_group_gap_y(&mut self, gap: f32) -> &mut Self {
        self.interaction_group_gap_y = gap;
        self
    }

    pub fn set_interaction_node_height(&mut self, height: f32) -> &mut Self {
        self.interaction_node_height = height;
        self
    }

    pub fn set_container_padding(&mut self, padding: f32) -> &mut Self {
        self.container_padding = padding;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn default_metrics() {
        let config = LayoutConfig::default();
        assert!(approx_eq!(f32, config.participant_width(), 160.0));
        assert!(approx_eq!(f32, config.participant_height(), 40.0));
        assert!(approx_eq!(f32, config.participant_gap_x(), 60.0));
        assert!(approx_eq!(f32, config.interaction_gap_y(), 20.0));
        assert!(approx_eq!(f32, config.interaction_group_gap_y(), 40.0));
        assert!(approx_eq!(f32, config.interaction_node_height(), 10.0));
        assert!(approx_eq!(f32, config.container_padding(), 16.0));
    }

    #[test]
    fn setters_chain() {
        let mut config = LayoutConfig::new();
        config.set_participant_gap_x(80.0).set_container_padding(8.0);
        assert!(approx_eq!(f32, config.participant_gap_x(), 80.0));
        assert!(approx_eq!(f32, config.container_padding(), 8.0));
    }

    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let config: LayoutConfig =
            serde_json::from_str(r#"{"participantGapX": 100.0, "containerPadding": 24.0}"#)
                .expect("valid config json");
        assert!(approx_eq!(f32, config.participant_gap_x(), 100.0));
        assert!(approx_eq!(f32, config.container_padding(), 24.0));
        assert!(
            approx_eq!(f32, config.participant_width(), 160.0),
            "unspecified fields keep defaults"
        );
    }
}
