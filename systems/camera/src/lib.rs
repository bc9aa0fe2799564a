#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Camera controller: integer zoom steps, clamped pan and a smooth follow lock.
//!
//! Pan and viewport sizes are measured in device pixels; character positions
//! and map sizes in world pixels.

use glam::Vec2;
use pixel_office_core::{AgentId, CellCoord, TILE_SIZE};
use serde::Deserialize;
use tracing::debug;

/// Tunables of the camera controller.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    /// Smallest zoom step.
    pub zoom_min: u32,
    /// Largest zoom step.
    pub zoom_max: u32,
    /// Zoom change applied per scroll step.
    pub zoom_step: u32,
    /// Zoom used when the camera is created.
    pub default_zoom: u32,
    /// Accumulated scroll delta required before zoom changes.
    pub scroll_threshold: f32,
    /// Fraction of the remaining distance covered per follow update.
    pub follow_lerp: f32,
    /// Distance below which follow jumps straight to its target.
    pub snap_threshold: f32,
    /// Fraction of the viewport the map edge must stay inside of.
    pub pan_margin_fraction: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            zoom_min: 1,
            zoom_max: 10,
            zoom_step: 1,
            default_zoom: 3,
            scroll_threshold: 50.0,
            follow_lerp: 0.1,
            snap_threshold: 0.5,
            pan_margin_fraction: 0.25,
        }
    }
}

/// Zoom, pan and follow state of the office view.
#[derive(Clone, Debug)]
pub struct Camera {
    config: CameraConfig,
    pan: Vec2,
    zoom: u32,
    follow: Option<AgentId>,
    scroll_accumulator: f32,
    viewport: Vec2,
    map: Vec2,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}

impl Camera {
    /// Creates a centred camera at the configured default zoom.
    #[must_use]
    pub fn new(config: CameraConfig) -> Self {
        let zoom_max = config.zoom_max.max(config.zoom_min);
        Self {
            zoom: config.default_zoom.clamp(config.zoom_min, zoom_max),
            config,
            pan: Vec2::ZERO,
            follow: None,
            scroll_accumulator: 0.0,
            viewport: Vec2::ZERO,
            map: Vec2::ZERO,
        }
    }

    /// Current pan offset in device pixels.
    #[must_use]
    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    /// Current zoom step.
    #[must_use]
    pub fn zoom(&self) -> u32 {
        self.zoom
    }

    /// Character the camera is locked onto, if any.
    #[must_use]
    pub fn following(&self) -> Option<AgentId> {
        self.follow
    }

    /// Viewport size in device pixels.
    #[must_use]
    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Updates the viewport size and re-clamps the pan.
    pub fn set_viewport(&mut self, size: Vec2) {
        self.viewport = size.max(Vec2::ZERO);
        self.pan = self.clamp_pan(self.pan);
    }

    /// Updates the map extent from the grid dimensions and re-clamps the pan.
    pub fn set_map_size(&mut self, columns: u32, rows: u32) {
        let tile = TILE_SIZE as f32;
        self.map = Vec2::new(columns as f32 * tile, rows as f32 * tile);
        self.pan = self.clamp_pan(self.pan);
    }

    /// Pans manually, breaking any follow lock.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.release_follow();
        self.pan = self.clamp_pan(self.pan + delta);
    }

    /// Sets the zoom step, breaking any follow lock. Returns whether it changed.
    pub fn set_zoom(&mut self, zoom: u32) -> bool {
        self.release_follow();
        let zoom_max = self.config.zoom_max.max(self.config.zoom_min);
        let zoom = zoom.clamp(self.config.zoom_min, zoom_max);
        if zoom == self.zoom {
            return false;
        }
        debug!(from = self.zoom, to = zoom, "zoom changed");
        self.zoom = zoom;
        self.pan = self.clamp_pan(self.pan);
        true
    }

    /// Accumulates a scroll delta and steps zoom once the threshold is crossed.
    ///
    /// Negative deltas zoom in. Returns the new zoom when it changed.
    pub fn zoom_by_scroll(&mut self, delta: f32) -> Option<u32> {
        self.scroll_accumulator += delta;
        if self.scroll_accumulator.abs() < self.config.scroll_threshold {
            return None;
        }

        let zoom_in = self.scroll_accumulator < 0.0;
        self.scroll_accumulator = 0.0;
        let target = if zoom_in {
            self.zoom.saturating_add(self.config.zoom_step)
        } else {
            self.zoom.saturating_sub(self.config.zoom_step)
        };
        self.set_zoom(target).then_some(self.zoom)
    }

    /// Locks the camera onto a character.
    pub fn follow(&mut self, id: AgentId) {
        self.follow = Some(id);
    }

    /// Releases the follow lock.
    pub fn release_follow(&mut self) {
        self.follow = None;
    }

    /// Advances the follow lock by one tick.
    ///
    /// `locate` resolves the followed character's world position; when it
    /// returns `None` the lock is released.
    pub fn update<F>(&mut self, locate: F)
    where
        F: FnOnce(AgentId) -> Option<Vec2>,
    {
        let Some(id) = self.follow else {
            return;
        };
        let Some(position) = locate(id) else {
            debug!(agent = id.get(), "followed character vanished");
            self.follow = None;
            return;
        };

        let target = self.follow_target(position);
        let delta = target - self.pan;
        self.pan = if delta.x.abs() < self.config.snap_threshold
            && delta.y.abs() < self.config.snap_threshold
        {
            target
        } else {
            self.pan + delta * self.config.follow_lerp
        };
    }

    /// Pan that centres the world-pixel position in the viewport.
    #[must_use]
    pub fn follow_target(&self, position: Vec2) -> Vec2 {
        (self.map / 2.0 - position) * self.zoom as f32
    }

    /// Bounds the pan so the map edge stays inside the viewport margin.
    #[must_use]
    pub fn clamp_pan(&self, pan: Vec2) -> Vec2 {
        let map = self.map * self.zoom as f32;
        let margin = self.viewport * self.config.pan_margin_fraction;
        let limit = (map / 2.0 + self.viewport / 2.0 - margin).max(Vec2::ZERO);
        pan.clamp(-limit, limit)
    }

    /// Device-pixel position of the map's top-left corner.
    #[must_use]
    pub fn map_offset(&self) -> Vec2 {
        let map = self.map * self.zoom as f32;
        ((self.viewport - map) / 2.0).floor() + self.pan.round()
    }

    /// Converts a device-pixel position into world pixels.
    #[must_use]
    pub fn screen_to_world(&self, device: Vec2) -> Vec2 {
        (device - self.map_offset()) / self.zoom as f32
    }

    /// Converts a world-pixel position into device pixels.
    #[must_use]
    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        world * self.zoom as f32 + self.map_offset()
    }

    /// Tile under a device-pixel position, possibly outside the grid.
    #[must_use]
    pub fn screen_to_tile(&self, device: Vec2) -> CellCoord {
        CellCoord::containing(self.screen_to_world(device))
    }
}
