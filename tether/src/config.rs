// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Engine-wide configuration.

/// Where the session overlay goes in its container's stacking order.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum OverlayPlacement {
    /// Below every sibling; the overlay never occludes content.
    #[default]
    Back,
    /// Above every sibling.
    Front,
}

/// Settings shared by every registration of a [`DragEngine`](crate::DragEngine).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DragConfig {
    /// Stacking position of the capture overlay (pointer modality only).
    pub overlay_placement: OverlayPlacement,
    /// Only the primary button starts a pointer session.
    pub primary_button_only: bool,
    /// Suppress default touch gestures (scrolling, pull-to-refresh) while a
    /// touch session is active.
    pub suppress_touch_gestures: bool,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            overlay_placement: OverlayPlacement::Back,
            primary_button_only: true,
            suppress_touch_gestures: true,
        }
    }
}

impl DragConfig {
    /// Set the overlay placement.
    pub fn with_overlay_placement(mut self, placement: OverlayPlacement) -> Self {
        self.overlay_placement = placement;
        self
    }

    /// Allow any pointer button to start a session.
    pub fn with_any_button(mut self) -> Self {
        self.primary_button_only = false;
        self
    }

    /// Leave default touch gestures enabled during sessions.
    pub fn with_touch_gestures(mut self) -> Self {
        self.suppress_touch_gestures = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_keep_overlay_behind_content() {
        let config = DragConfig::default();
        assert_eq!(config.overlay_placement, OverlayPlacement::Back);
        assert!(config.primary_button_only);
        assert!(config.suppress_touch_gestures);
    }

    #[test]
    fn builders_flip_individual_settings() {
        let config = DragConfig::default()
            .with_overlay_placement(OverlayPlacement::Front)
            .with_any_button()
            .with_touch_gestures();
        assert_eq!(config.overlay_placement, OverlayPlacement::Front);
        assert!(!config.primary_button_only);
        assert!(!config.suppress_touch_gestures);
    }
}
