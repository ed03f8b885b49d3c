// Copyright 2026 the Isostasy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transform ops and their matrix composition.
//!
//! The composed stage describes a prim's local transform as an *ordered list*
//! of [`TransformOp`]s (translate, per-axis rotate, scale, raw matrix). The
//! chain builder flattens the static (non-animated) op list into a single
//! [`Matrix4`] when it stamps a host transform node.
//!
//! [`Matrix4`] covers the subset of 4×4 affine math the engine actually needs
//! (identity, multiply, constructors, finite checks) without pulling in a
//! full linear-algebra crate.

use core::ops::Mul;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// A column-major 4×4 affine transform stored as `[[f64; 4]; 4]`.
///
/// Each inner array is one *column* of the matrix, matching the layout most
/// host applications use for their own transform attributes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Matrix4 {
    /// Four columns, each a 4-element array `[x, y, z, w]`.
    pub cols: [[f64; 4]; 4],
}

impl Matrix4 {
    /// The 4×4 identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Creates a transform from a column-major 2-D array.
    #[inline]
    #[must_use]
    pub const fn from_cols_array_2d(cols: [[f64; 4]; 4]) -> Self {
        Self { cols }
    }

    /// Returns column `i` (0-based).
    ///
    /// # Panics
    ///
    /// Panics if `i >= 4`.
    #[inline]
    #[must_use]
    pub const fn col(self, i: usize) -> [f64; 4] {
        self.cols[i]
    }

    /// Creates a pure translation transform.
    #[inline]
    #[must_use]
    pub const fn from_translation(x: f64, y: f64, z: f64) -> Self {
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [x, y, z, 1.0],
            ],
        }
    }

    /// Creates a non-uniform scale transform.
    #[inline]
    #[must_use]
    pub const fn from_scale(sx: f64, sy: f64, sz: f64) -> Self {
        Self {
            cols: [
                [sx, 0.0, 0.0, 0.0],
                [0.0, sy, 0.0, 0.0],
                [0.0, 0.0, sz, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a rotation around the X axis (radians).
    #[inline]
    #[must_use]
    pub fn from_rotation_x(radians: f64) -> Self {
        let (s, c) = sin_cos(radians);
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, c, s, 0.0],
                [0.0, -s, c, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a rotation around the Y axis (radians).
    #[inline]
    #[must_use]
    pub fn from_rotation_y(radians: f64) -> Self {
        let (s, c) = sin_cos(radians);
        Self {
            cols: [
                [c, 0.0, -s, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [s, 0.0, c, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a rotation around the Z axis (radians).
    #[inline]
    #[must_use]
    pub fn from_rotation_z(radians: f64) -> Self {
        let (s, c) = sin_cos(radians);
        Self {
            cols: [
                [c, s, 0.0, 0.0],
                [-s, c, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Returns the translation column as `[x, y, z]`.
    #[inline]
    #[must_use]
    pub const fn translation(&self) -> [f64; 3] {
        [self.cols[3][0], self.cols[3][1], self.cols[3][2]]
    }

    /// Is every element of this transform [finite](f64::is_finite)?
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.cols.iter().flatten().all(|v| v.is_finite())
    }
}

impl Default for Matrix4 {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Matrix4 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let a = &self.cols;
        let b = &rhs.cols;
        let mut out = [[0.0_f64; 4]; 4];
        let mut j = 0;
        while j < 4 {
            let mut i = 0;
            while i < 4 {
                out[j][i] =
                    a[0][i] * b[j][0] + a[1][i] * b[j][1] + a[2][i] * b[j][2] + a[3][i] * b[j][3];
                i += 1;
            }
            j += 1;
        }
        Self { cols: out }
    }
}

#[inline]
fn sin_cos(radians: f64) -> (f64, f64) {
    #[cfg(feature = "std")]
    {
        radians.sin_cos()
    }
    #[cfg(not(feature = "std"))]
    {
        (radians.sin(), radians.cos())
    }
}

/// One entry of a prim's ordered transform-op list.
///
/// Ops are listed outermost-first, the order the stage enumerates them in.
/// Rotations are in radians.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransformOp {
    /// Translation by `[x, y, z]`.
    Translate([f64; 3]),
    /// Rotation around the X axis.
    RotateX(f64),
    /// Rotation around the Y axis.
    RotateY(f64),
    /// Rotation around the Z axis.
    RotateZ(f64),
    /// Non-uniform scale by `[x, y, z]`.
    Scale([f64; 3]),
    /// A raw 4×4 matrix op.
    Matrix(Matrix4),
}

impl TransformOp {
    /// Returns this op as a matrix.
    #[must_use]
    pub fn to_matrix(self) -> Matrix4 {
        match self {
            Self::Translate([x, y, z]) => Matrix4::from_translation(x, y, z),
            Self::RotateX(r) => Matrix4::from_rotation_x(r),
            Self::RotateY(r) => Matrix4::from_rotation_y(r),
            Self::RotateZ(r) => Matrix4::from_rotation_z(r),
            Self::Scale([x, y, z]) => Matrix4::from_scale(x, y, z),
            Self::Matrix(m) => m,
        }
    }
}

/// Composes an ordered op list into a single local transform.
///
/// Ops are outermost-first, so the composed matrix is
/// `ops[0] * ops[1] * … * ops[n-1]` and the last op applies to points first.
#[must_use]
pub fn compose(ops: &[TransformOp]) -> Matrix4 {
    ops.iter()
        .fold(Matrix4::IDENTITY, |acc, op| acc * op.to_matrix())
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn default_is_identity() {
        assert_eq!(Matrix4::default(), Matrix4::IDENTITY);
    }

    #[test]
    fn identity_multiply() {
        let t = Matrix4::from_translation(1.0, 2.0, 3.0);
        assert_eq!(Matrix4::IDENTITY * t, t);
        assert_eq!(t * Matrix4::IDENTITY, t);
    }

    #[test]
    fn translation_composition() {
        let a = Matrix4::from_translation(1.0, 0.0, 0.0);
        let b = Matrix4::from_translation(0.0, 2.0, 0.0);
        assert_eq!((a * b).translation(), [1.0, 2.0, 0.0]);
    }

    #[test]
    fn rotation_z_ninety_degrees() {
        let r = Matrix4::from_rotation_z(core::f64::consts::FRAC_PI_2);
        let eps = 1e-6;
        assert!((r.col(0)[0] - 0.0).abs() < eps, "cos should be 0");
        assert!((r.col(0)[1] - 1.0).abs() < eps, "sin should be 1");
        assert!((r.col(1)[0] + 1.0).abs() < eps, "-sin should be -1");
    }

    #[test]
    fn compose_is_outermost_first() {
        // Translate then scale: the scale applies to points first, so the
        // translation column is unchanged.
        let m = compose(&[
            TransformOp::Translate([3.0, 4.0, 0.0]),
            TransformOp::Scale([2.0, 2.0, 2.0]),
        ]);
        assert_eq!(m.col(0), [2.0, 0.0, 0.0, 0.0]);
        assert_eq!(m.col(3), [3.0, 4.0, 0.0, 1.0]);
    }

    #[test]
    fn compose_empty_is_identity() {
        assert_eq!(compose(&[]), Matrix4::IDENTITY);
    }

    #[test]
    fn matrix_op_passes_through() {
        let m = Matrix4::from_scale(2.0, 3.0, 4.0);
        assert_eq!(compose(&vec![TransformOp::Matrix(m)]), m);
    }

    #[test]
    fn non_finite_detected() {
        let mut m = Matrix4::IDENTITY;
        m.cols[2][1] = f64::NAN;
        assert!(!m.is_finite());
        assert!(Matrix4::IDENTITY.is_finite());
    }
}
