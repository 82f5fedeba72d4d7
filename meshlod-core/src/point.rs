//! Point, vector and attribute element types

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;

/// Texture coordinates (UV mapping)
pub type Uv = [f32; 2];

/// Linear RGBA vertex color
pub type Color = [f32; 4];

/// Influence of a single bone on a vertex
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoneWeight {
    pub bone: u32,
    pub weight: f32,
}

impl BoneWeight {
    pub fn new(bone: u32, weight: f32) -> Self {
        Self { bone, weight }
    }
}

/// Linear interpolation between two points, `t = 0` yields `a`
#[inline]
pub fn lerp_point(a: &Point3f, b: &Point3f, t: f32) -> Point3f {
    a + (b - a) * t
}

/// Linear interpolation between two texture coordinates
#[inline]
pub fn lerp_uv(a: Uv, b: Uv, t: f32) -> Uv {
    [a[0] + (b[0] - a[0]) * t, a[1] + (b[1] - a[1]) * t]
}
