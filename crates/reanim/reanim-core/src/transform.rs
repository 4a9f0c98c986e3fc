//! 2D affine transforms built from scale and independent X/Y skew.
//!
//! The linear part maps image-space axes:
//! `u → (a, b)`, `v → (c, d)` with
//! `a = cos(kx)·sx`, `b = sin(kx)·sx`, `c = -sin(ky)·sy`, `d = cos(ky)·sy`.
//! Equal skews are a rotation; zero skews are a plain scale.

use serde::{Deserialize, Serialize};

use crate::data::Vec2;
use crate::merge::MergedFrame;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Affine2 {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Default for Affine2 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine2 {
    pub const IDENTITY: Affine2 = Affine2 {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    /// Linear part from scales and skews in degrees; no translation.
    pub fn from_scale_skew(scale_x: f32, scale_y: f32, skew_x_deg: f32, skew_y_deg: f32) -> Self {
        if skew_x_deg == 0.0 && skew_y_deg == 0.0 {
            return Self {
                a: scale_x,
                d: scale_y,
                ..Self::IDENTITY
            };
        }
        let (sin_x, cos_x) = skew_x_deg.to_radians().sin_cos();
        let (sin_y, cos_y) = skew_y_deg.to_radians().sin_cos();
        Self {
            a: cos_x * scale_x,
            b: sin_x * scale_x,
            c: -sin_y * scale_y,
            d: cos_y * scale_y,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// Full transform of a merged frame, translated by its own `(x, y)` plus `offset`.
    pub fn from_frame(frame: &MergedFrame, offset: Vec2) -> Self {
        Self::from_scale_skew(frame.scale_x, frame.scale_y, frame.skew_x, frame.skew_y)
            .with_translation(Vec2::new(frame.x + offset.x, frame.y + offset.y))
    }

    #[inline]
    pub fn with_translation(mut self, t: Vec2) -> Self {
        self.tx = t.x;
        self.ty = t.y;
        self
    }

    #[inline]
    pub fn apply(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            self.a * p.x + self.c * p.y + self.tx,
            self.b * p.x + self.d * p.y + self.ty,
        )
    }

    /// Destination corners of a `width × height` image: top-left, top-right,
    /// bottom-right, bottom-left.
    pub fn quad(&self, width: f32, height: f32) -> [Vec2; 4] {
        [
            self.apply(Vec2::new(0.0, 0.0)),
            self.apply(Vec2::new(width, 0.0)),
            self.apply(Vec2::new(width, height)),
            self.apply(Vec2::new(0.0, height)),
        ]
    }
}
