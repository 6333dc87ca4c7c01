//! Render/resize loop model
//!
//! The drawable surface covers a fixed fraction of the window in both
//! dimensions. Every frame advances the camera; resizes only touch the
//! surface size and aspect ratio.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::camera::CameraControl;

/// Default share of the window covered by the drawable surface
pub const DEFAULT_VIEWPORT_FRACTION: f32 = 0.85;

/// Perspective projection parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Projection {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 1.0,
            far: 1000.0,
        }
    }
}

/// Drawable surface placement inside the window, in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SurfaceRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl SurfaceRect {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[derive(Debug, Clone)]
pub struct RenderLoop {
    fraction: f32,
    window: (u32, u32),
    surface: SurfaceRect,
    aspect: f32,
    frames: u64,
}

impl RenderLoop {
    pub fn new(fraction: f32) -> Self {
        Self {
            fraction: fraction.clamp(0.05, 1.0),
            window: (0, 0),
            surface: SurfaceRect::default(),
            aspect: 1.0,
            frames: 0,
        }
    }

    pub fn fraction(&self) -> f32 {
        self.fraction
    }

    pub fn surface(&self) -> SurfaceRect {
        self.surface
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Lay out the surface for a window size; returns true when it changed.
    ///
    /// The surface is centered in the window. A minimized window keeps the
    /// previous aspect ratio.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if self.window == (width, height) {
            return false;
        }
        self.window = (width, height);

        let surface_width = (width as f32 * self.fraction).round() as u32;
        let surface_height = (height as f32 * self.fraction).round() as u32;
        self.surface = SurfaceRect {
            x: (width - surface_width.min(width)) / 2,
            y: (height - surface_height.min(height)) / 2,
            width: surface_width,
            height: surface_height,
        };
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }

        debug!(width, height, surface = ?self.surface, aspect = self.aspect, "Viewport resized");
        true
    }

    /// Advance the camera one frame
    pub fn frame(&mut self, dt: Duration, camera: &mut impl CameraControl) {
        camera.update(dt);
        self.frames += 1;
    }
}

impl Default for RenderLoop {
    fn default() -> Self {
        Self::new(DEFAULT_VIEWPORT_FRACTION)
    }
}
