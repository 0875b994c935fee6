//! Model-space to destination-space box transforms.
//!
//! A box goes through two affine steps per axis: `scale_*` takes model units
//! to image units, then `view_scale_*` and `start_*` place the image inside
//! the destination canvas. Results are not clamped; boxes reaching past the
//! frame are left for the renderer to clip.

use crate::geometry::Rect;
use crate::util::{DetpostError, DetpostResult};

/// Per-axis coordinate transform parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoordParams {
    /// Model x to image x.
    pub scale_x: f32,
    /// Model y to image y.
    pub scale_y: f32,
    /// Image x to view x.
    pub view_scale_x: f32,
    /// Image y to view y.
    pub view_scale_y: f32,
    /// View x offset of the image origin.
    pub start_x: f32,
    /// View y offset of the image origin.
    pub start_y: f32,
}

impl Default for CoordParams {
    fn default() -> Self {
        Self::identity()
    }
}

impl CoordParams {
    /// Leaves boxes in model units.
    pub const fn identity() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            view_scale_x: 1.0,
            view_scale_y: 1.0,
            start_x: 0.0,
            start_y: 0.0,
        }
    }

    /// Maps pixel coordinates of a square `input_size` model input to [0, 1].
    pub fn normalized(input_size: f32) -> DetpostResult<Self> {
        if !(input_size.is_finite() && input_size > 0.0) {
            return Err(DetpostError::InvalidConfig(
                "input size must be finite and positive",
            ));
        }
        Ok(Self {
            scale_x: 1.0 / input_size,
            scale_y: 1.0 / input_size,
            ..Self::identity()
        })
    }

    /// Maps model pixels onto an image shown centered in a view.
    ///
    /// The image (`image_w x image_h`, resized to `input_size` squared for
    /// inference) is scaled uniformly to fit inside `view_w x view_h` and
    /// centered, leaving bars on the shorter axis.
    pub fn fit_view(
        input_size: f32,
        image_w: f32,
        image_h: f32,
        view_w: f32,
        view_h: f32,
    ) -> DetpostResult<Self> {
        let dims = [input_size, image_w, image_h, view_w, view_h];
        if dims.iter().any(|v| !(v.is_finite() && *v > 0.0)) {
            return Err(DetpostError::InvalidConfig(
                "fit_view dimensions must be finite and positive",
            ));
        }

        let view_scale = (view_w / image_w).min(view_h / image_h);
        Ok(Self {
            scale_x: image_w / input_size,
            scale_y: image_h / input_size,
            view_scale_x: view_scale,
            view_scale_y: view_scale,
            start_x: (view_w - view_scale * image_w) / 2.0,
            start_y: (view_h - view_scale * image_h) / 2.0,
        })
    }

    /// Maps a model-space x coordinate.
    #[inline]
    pub fn map_x(&self, x: f32) -> f32 {
        self.start_x + self.view_scale_x * (self.scale_x * x)
    }

    /// Maps a model-space y coordinate.
    #[inline]
    pub fn map_y(&self, y: f32) -> f32 {
        self.start_y + self.view_scale_y * (self.scale_y * y)
    }

    /// Maps every edge of `rect`.
    pub fn map_rect(&self, rect: &Rect) -> Rect {
        Rect {
            left: self.map_x(rect.left),
            top: self.map_y(rect.top),
            right: self.map_x(rect.right),
            bottom: self.map_y(rect.bottom),
        }
    }

    pub(crate) fn validate(&self) -> DetpostResult<()> {
        let values = [
            self.scale_x,
            self.scale_y,
            self.view_scale_x,
            self.view_scale_y,
            self.start_x,
            self.start_y,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(DetpostError::InvalidConfig(
                "coordinate parameters must be finite",
            ));
        }
        Ok(())
    }
}
