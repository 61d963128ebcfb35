//! Persisted viewport state for the diagram canvas.
//!
//! Zoom level and pan offset survive host reloads through the host's
//! key-value storage. This module owns the key names, the value type and
//! the restore rules; reading and writing the store stays with the host.
//! A stored file path marks which source file the values belong to:
//! restoring against a different file resets to defaults instead of reusing
//! stale geometry.

use serde::{Deserialize, Serialize};

/// Storage key for the persisted zoom level.
pub const ZOOM_LEVEL_KEY: &str = "sequence-diagram-zoom-level";
/// Storage key for the persisted horizontal pan offset.
pub const OFFSET_X_KEY: &str = "sequence-diagram-offset-x";
/// Storage key for the persisted vertical pan offset.
pub const OFFSET_Y_KEY: &str = "sequence-diagram-offset-y";
/// Storage key for the source file the persisted values belong to.
pub const FILE_PATH_KEY: &str = "sequence-diagram-file-path";

const DEFAULT_ZOOM: f32 = 1.0;

/// Zoom and pan state of the diagram viewport for one source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportState {
    zoom: f32,
    offset_x: f32,
    offset_y: f32,
    file_path: String,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            offset_x: 0.0,
            offset_y: 0.0,
            file_path: String::new(),
        }
    }
}

impl ViewportState {
    /// Default viewport bound to a source file.
    pub fn for_file(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            ..Self::default()
        }
    }

    /// Restores the viewport for `file_path` from stored key-value entries.
    ///
    /// `read` resolves a storage key to its stored value. A missing or
    /// different stored file path resets everything to defaults; unparseable
    /// or non-finite stored values fall back field by field.
    pub fn restore<F>(file_path: &str, read: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if read(FILE_PATH_KEY).as_deref() != Some(file_path) {
            return Self::for_file(file_path);
        }
        let zoom = read(ZOOM_LEVEL_KEY)
            .and_then(|value| value.parse::<f32>().ok())
            .filter(|zoom| zoom.is_finite() && *zoom > 0.0)
            .unwrap_or(DEFAULT_ZOOM);
        let offset_x = read(OFFSET_X_KEY)
            .and_then(|value| value.parse::<f32>().ok())
            .filter(|offset| offset.is_finite())
            .unwrap_or(0.0);
        let offset_y = read(OFFSET_Y_KEY)
            .and_then(|value| value.parse::<f32>().ok())
            .filter(|offset| offset.is_finite())
            .unwrap_or(0.0);
        Self {
            zoom,
            offset_x,
            offset_y,
            file_path: file_path.to_string(),
        }
    }

    /// Key-value entries for the host to write back to its storage.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            (ZOOM_LEVEL_KEY, self.zoom.to_string()),
            (OFFSET_X_KEY, self.offset_x.to_string()),
            (OFFSET_Y_KEY, self.offset_y.to_string()),
            (FILE_PATH_KEY, self.file_path.clone()),
        ]
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn offset_x(&self) -> f32 {
        self.offset_x
    }

    pub fn offset_y(&self) -> f32 {
        self.offset_y
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    pub fn set_zoom(&mut self, zoom: f32) -> &mut Self {
        self.zoom = zoom;
        self
    }

    pub fn set_offset_x(&mut self, offset: f32) -> &mut Self {
        self.offset_x = offset;
        self
    }

    pub fn set_offset_y(&mut self, offset: f32) -> &mut Self {
        self.offset_y = offset;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn store(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn restores_values_for_the_same_file() {
        let stored = store(&[
            (FILE_PATH_KEY, "main.bal"),
            (ZOOM_LEVEL_KEY, "1.5"),
            (OFFSET_X_KEY, "-120.5"),
            (OFFSET_Y_KEY, "42"),
        ]);
        let state = ViewportState::restore("main.bal", |key| stored.get(key).cloned());

        assert_eq!(state.zoom(), 1.5);
        assert_eq!(state.offset_x(), -120.5);
        assert_eq!(state.offset_y(), 42.0);
        assert_eq!(state.file_path(), "main.bal");
    }

    #[test]
    fn different_file_resets_to_defaults() {
        let stored = store(&[
            (FILE_PATH_KEY, "other.bal"),
            (ZOOM_LEVEL_KEY, "3.0"),
            (OFFSET_X_KEY, "500"),
        ]);
        let state = ViewportState::restore("main.bal", |key| stored.get(key).cloned());

        assert_eq!(state, ViewportState::for_file("main.bal"));
    }

    #[test]
    fn garbage_values_fall_back_field_by_field() {
        let stored = store(&[
            (FILE_PATH_KEY, "main.bal"),
            (ZOOM_LEVEL_KEY, "not-a-number"),
            (OFFSET_X_KEY, "NaN"),
            (OFFSET_Y_KEY, "12.5"),
        ]);
        let state = ViewportState::restore("main.bal", |key| stored.get(key).cloned());

        assert_eq!(state.zoom(), 1.0, "unparseable zoom resets");
        assert_eq!(state.offset_x(), 0.0, "non-finite offset resets");
        assert_eq!(state.offset_y(), 12.5, "valid fields survive");
    }

    #[test]
    fn non_positive_zoom_resets() {
        let stored = store(&[(FILE_PATH_KEY, "main.bal"), (ZOOM_LEVEL_KEY, "0")]);
        let state = ViewportState::restore("main.bal", |key| stored.get(key).cloned());
        assert_eq!(state.zoom(), 1.0);
    }

    #[test]
    fn entries_round_trip_through_restore() {
        let mut state = ViewportState::for_file("main.bal");
        state.set_zoom(2.0).set_offset_x(33.0).set_offset_y(-7.5);

        let written: HashMap<String, String> = state
            .entries()
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect();
        let restored = ViewportState::restore("main.bal", |key| written.get(key).cloned());

        assert_eq!(restored, state);
    }
}
