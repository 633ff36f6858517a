// Copyright 2025 the Lumen authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Defines the [`Mat4`] homogeneous transform type and its operations.
//!
//! `Mat4` composes rigid and affine transforms (rotation, translation,
//! non-uniform scale) and the camera matrices of the pipeline. Conventions,
//! fixed crate-wide:
//!
//! - Storage is **row-major**: flat index `i * 4 + j` addresses row `i`,
//!   column `j`.
//! - Points and directions are **column vectors** transformed as `m * v`,
//!   so `a * b` applies `b` first. The first three columns are the images
//!   of the x/y/z basis ([`right`](Mat4::right), [`up`](Mat4::up),
//!   [`fwd`](Mat4::fwd)); the fourth column carries translation.
//! - World space is right-handed; [`look_at`](Mat4::look_at) produces a
//!   view space with x right, y up, and z forward into the screen, and the
//!   projection factories map that space to the `[-1, 1]` clip cube.
//! - Angles are radians.
//!
//! There is no validation anywhere in this type: degenerate input (a
//! zero-length rotation axis, a singular linear part, `fwd` parallel to
//! `up`) fails silently with NaN/Inf propagation or a silently
//! non-invertible result. Callers that need the preconditions hold must
//! check them before calling.

use approx::{AbsDiffEq, RelativeEq};
use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use super::{Vec3, Vec4};
use std::ops::{Index, IndexMut, Mul};

/// A 4x4 row-major matrix representing a transform in homogeneous
/// coordinates.
///
/// The value is immutable by convention: every operation that "modifies" a
/// transform returns a new one. A default-constructed `Mat4` is the
/// identity.
///
/// The layout is `#[repr(C)]` with no padding, so a `Mat4` can be handed to
/// the GPU as 16 consecutive floats (row-major order) via `bytemuck`.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    bytemuck::Pod,
    bytemuck::Zeroable,
    Serialize,
    Deserialize,
    Encode,
    Decode,
)]
#[repr(C)]
pub struct Mat4 {
    m: [f32; 16],
}

impl Mat4 {
    /// The multiplicative identity.
    pub const IDENTITY: Self = Self {
        m: [
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    /// A matrix with all entries set to `0.0`.
    pub const ZERO: Self = Self { m: [0.0; 16] };

    // --- Construction ---

    /// Creates a matrix from all 16 entries in row-major order: `aij` is the
    /// entry at row `i`, column `j`.
    #[allow(clippy::too_many_arguments)]
    #[inline]
    pub const fn new(
        a11: f32,
        a12: f32,
        a13: f32,
        a14: f32,
        a21: f32,
        a22: f32,
        a23: f32,
        a24: f32,
        a31: f32,
        a32: f32,
        a33: f32,
        a34: f32,
        a41: f32,
        a42: f32,
        a43: f32,
        a44: f32,
    ) -> Self {
        Self {
            m: [
                a11, a12, a13, a14, //
                a21, a22, a23, a24, //
                a31, a32, a33, a34, //
                a41, a42, a43, a44,
            ],
        }
    }

    /// Creates a rotation-style matrix whose first three columns are exactly
    /// the given basis vectors, with zero translation and an identity bottom
    /// row.
    ///
    /// The vectors are taken as-is: a non-orthonormal basis yields a skewed
    /// transform and is never checked.
    #[inline]
    pub const fn from_basis(right: Vec3, up: Vec3, fwd: Vec3) -> Self {
        Self::new(
            right.x, up.x, fwd.x, 0.0, //
            right.y, up.y, fwd.y, 0.0, //
            right.z, up.z, fwd.z, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        )
    }

    // --- Structural Queries ---

    /// Returns row `index` of the matrix as a `Vec4`.
    ///
    /// # Panics
    /// Panics if `index` is greater than 3.
    #[inline]
    pub fn row(&self, index: usize) -> Vec4 {
        assert!(index < 4, "Row index out of bounds for Mat4");
        Vec4::new(
            self.m[index * 4],
            self.m[index * 4 + 1],
            self.m[index * 4 + 2],
            self.m[index * 4 + 3],
        )
    }

    /// Returns column `index` of the matrix as a `Vec4`.
    ///
    /// # Panics
    /// Panics if `index` is greater than 3.
    #[inline]
    pub fn col(&self, index: usize) -> Vec4 {
        assert!(index < 4, "Column index out of bounds for Mat4");
        Vec4::new(
            self.m[index],
            self.m[4 + index],
            self.m[8 + index],
            self.m[12 + index],
        )
    }

    /// The image of the x-axis under this transform (first basis column).
    #[inline]
    pub const fn right(&self) -> Vec3 {
        Vec3::new(self.m[0], self.m[4], self.m[8])
    }

    /// The image of the y-axis under this transform (second basis column).
    #[inline]
    pub const fn up(&self) -> Vec3 {
        Vec3::new(self.m[1], self.m[5], self.m[9])
    }

    /// The image of the z-axis under this transform (third basis column).
    #[inline]
    pub const fn fwd(&self) -> Vec3 {
        Vec3::new(self.m[2], self.m[6], self.m[10])
    }

    /// The translation carried in the fourth column.
    #[inline]
    pub const fn translation(&self) -> Vec3 {
        Vec3::new(self.m[3], self.m[7], self.m[11])
    }

    /// Borrows the raw entries as a flat row-major array.
    ///
    /// Entry `i * 4 + j` is row `i`, column `j`, the same storage the named
    /// accessors and `Index` read.
    #[inline]
    pub const fn as_array(&self) -> &[f32; 16] {
        &self.m
    }

    // --- Transpose and Specialized Inverse ---

    /// Returns the transpose of the matrix, swapping rows and columns.
    #[inline]
    pub const fn transpose(&self) -> Self {
        Self::new(
            self.m[0], self.m[4], self.m[8], self.m[12], //
            self.m[1], self.m[5], self.m[9], self.m[13], //
            self.m[2], self.m[6], self.m[10], self.m[14], //
            self.m[3], self.m[7], self.m[11], self.m[15],
        )
    }

    /// Computes the inverse of a rigid transform (rotation plus
    /// translation).
    ///
    /// The rotational part is inverted by transposition, valid only while
    /// the upper-left 3x3 block is orthogonal. Calling this on a matrix
    /// carrying scale, shear, or projection silently yields a matrix that is
    /// not the inverse.
    pub fn pseudo_invert(&self) -> Self {
        let undo_translation = Self::translate(-self.translation());
        // Transposing moves the translation column into the bottom row;
        // clearing it leaves the pure rotation inverse.
        let mut undo_rotation = self.transpose();
        undo_rotation.m[12] = 0.0;
        undo_rotation.m[13] = 0.0;
        undo_rotation.m[14] = 0.0;

        undo_rotation * undo_translation
    }

    // --- Transforms of Vectors ---

    /// Transforms a direction vector: applies the linear 3x3 part only,
    /// ignoring translation.
    ///
    /// Points go through the operator form `m * v`, which does add the
    /// translation column. The two must not be mixed up.
    #[inline]
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        Vec3::new(
            self.m[0] * v.x + self.m[1] * v.y + self.m[2] * v.z,
            self.m[4] * v.x + self.m[5] * v.y + self.m[6] * v.z,
            self.m[8] * v.x + self.m[9] * v.y + self.m[10] * v.z,
        )
    }

    // --- Decomposition / Stripping ---
    //
    // All of these assume the matrix decomposes as translation ∘ rotation ∘
    // scale with no shear; under shear the results are unspecified.

    /// The per-axis scale factors: the lengths of the three basis columns.
    #[inline]
    pub fn extract_scale_vec(&self) -> Vec3 {
        Vec3::new(
            self.right().length(),
            self.up().length(),
            self.fwd().length(),
        )
    }

    /// The scale component as a diagonal matrix.
    #[inline]
    pub fn extract_scale(&self) -> Self {
        Self::scale(self.extract_scale_vec())
    }

    /// The rotation component: basis columns normalized to unit length,
    /// translation zeroed.
    #[inline]
    pub fn extract_rotation(&self) -> Self {
        Self::from_basis(
            self.right().normalize(),
            self.up().normalize(),
            self.fwd().normalize(),
        )
    }

    /// The translation component: identity linear part, fourth column
    /// preserved.
    #[inline]
    pub fn extract_translation(&self) -> Self {
        Self::translate(self.translation())
    }

    /// Removes the rotation component while preserving scale and
    /// translation, reconstructed as `extract_translation() *
    /// extract_scale()`.
    #[inline]
    pub fn strip_rotation(&self) -> Self {
        self.extract_translation() * self.extract_scale()
    }

    /// Zeroes the translation column, preserving rotation and scale.
    #[inline]
    pub fn strip_translation(&self) -> Self {
        let mut m = *self;
        m.m[3] = 0.0;
        m.m[7] = 0.0;
        m.m[11] = 0.0;
        m
    }

    /// Normalizes each basis column to unit length, removing per-axis scale
    /// while preserving rotation and translation.
    #[inline]
    pub fn strip_scale(&self) -> Self {
        let mut m = self.extract_rotation();
        m.m[3] = self.m[3];
        m.m[7] = self.m[7];
        m.m[11] = self.m[11];
        m
    }

    /// The matrix that maps surface normals under this transform: the
    /// inverse-transpose of the upper-left 3x3 block, with zero translation.
    ///
    /// For a no-shear transform `R * S` the inverse-transpose collapses to
    /// `R * S⁻¹`. A zero scale factor on any axis makes the linear part
    /// singular and the result silently contains Inf/NaN.
    #[inline]
    pub fn to_normal_matrix(&self) -> Self {
        let s = self.extract_scale_vec();
        self.extract_rotation() * Self::scale(Vec3::new(1.0 / s.x, 1.0 / s.y, 1.0 / s.z))
    }

    // --- Static Factories ---

    /// Creates a translation matrix.
    #[inline]
    pub const fn translate(v: Vec3) -> Self {
        Self::new(
            1.0, 0.0, 0.0, v.x, //
            0.0, 1.0, 0.0, v.y, //
            0.0, 0.0, 1.0, v.z, //
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Creates a non-uniform scaling matrix.
    #[inline]
    pub const fn scale(s: Vec3) -> Self {
        Self::new(
            s.x, 0.0, 0.0, 0.0, //
            0.0, s.y, 0.0, 0.0, //
            0.0, 0.0, s.z, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Creates a rotation of `angle` radians around the X-axis.
    #[inline]
    pub fn rot_x(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::new(
            1.0, 0.0, 0.0, 0.0, //
            0.0, c, -s, 0.0, //
            0.0, s, c, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Creates a rotation of `angle` radians around the Y-axis.
    #[inline]
    pub fn rot_y(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::new(
            c, 0.0, s, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            -s, 0.0, c, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Creates a rotation of `angle` radians around the Z-axis.
    #[inline]
    pub fn rot_z(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::new(
            c, -s, 0.0, 0.0, //
            s, c, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Creates the composite rotation that applies the X, Y, and Z rotations
    /// of `rot` in that order (angles in radians per axis).
    #[inline]
    pub fn rot_xyz(rot: Vec3) -> Self {
        Self::rot_z(rot.z) * Self::rot_y(rot.y) * Self::rot_x(rot.x)
    }

    /// Creates the composite rotation that applies the Y, Z, and X rotations
    /// of `rot` in that order (angles in radians per axis).
    #[inline]
    pub fn rot_yzx(rot: Vec3) -> Self {
        Self::rot_x(rot.x) * Self::rot_z(rot.z) * Self::rot_y(rot.y)
    }

    /// Creates a rotation of `angle` radians around an arbitrary axis, via
    /// Rodrigues' formula.
    ///
    /// `axis` must be unit length; a non-unit or zero axis silently produces
    /// a skewed or degenerate matrix.
    #[inline]
    pub fn rot_axis(axis: Vec3, angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        let t = 1.0 - c;
        let (x, y, z) = (axis.x, axis.y, axis.z);
        Self::new(
            t * x * x + c,
            t * x * y - s * z,
            t * x * z + s * y,
            0.0,
            t * x * y + s * z,
            t * y * y + c,
            t * y * z - s * x,
            0.0,
            t * x * z - s * y,
            t * y * z + s * x,
            t * z * z + c,
            0.0,
            0.0,
            0.0,
            0.0,
            1.0,
        )
    }

    /// Creates an orthographic projection mapping the box
    /// `[left, right] x [bottom, top] x [near, far]` linearly onto the
    /// `[-1, 1]` clip cube, so `(left, bottom, near)` lands on
    /// `(-1, -1, -1)`.
    #[inline]
    pub fn ortho(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        Self::new(
            2.0 / (right - left),
            0.0,
            0.0,
            -(right + left) / (right - left),
            0.0,
            2.0 / (top - bottom),
            0.0,
            -(top + bottom) / (top - bottom),
            0.0,
            0.0,
            2.0 / (far - near),
            -(far + near) / (far - near),
            0.0,
            0.0,
            0.0,
            1.0,
        )
    }

    /// Creates a symmetric-frustum perspective projection from a vertical
    /// field of view in radians, an aspect ratio (width over height), and
    /// the near/far clip distances.
    ///
    /// The last row is `(0, 0, 1, 0)`: the view-space z of the crate's
    /// z-forward convention becomes clip-space w, and the divide downstream
    /// maps depth `[near, far]` onto `[-1, 1]`.
    #[inline]
    pub fn perspective(fov_y: f32, aspect_ratio: f32, near: f32, far: f32) -> Self {
        let f = 1.0 / (fov_y * 0.5).tan();
        Self::new(
            f / aspect_ratio,
            0.0,
            0.0,
            0.0,
            0.0,
            f,
            0.0,
            0.0,
            0.0,
            0.0,
            (far + near) / (far - near),
            -2.0 * far * near / (far - near),
            0.0,
            0.0,
            1.0,
            0.0,
        )
    }

    /// Creates the world-to-view matrix of a camera at `pos` looking along
    /// `fwd`, with `up` as an approximate up direction.
    ///
    /// The basis is orthonormalized with cross products, so `up` only needs
    /// to be non-parallel to `fwd`; the true up is recomputed. The result
    /// maps `pos` to the origin and `fwd` to +z (view space: x right, y up,
    /// z into the screen). A zero `fwd` or an `up` parallel to `fwd`
    /// silently produces a singular matrix.
    pub fn look_at(pos: Vec3, fwd: Vec3, up: Vec3) -> Self {
        let f = fwd.normalize();
        let r = f.cross(up).normalize();
        let u = r.cross(f);

        Self::new(
            r.x,
            r.y,
            r.z,
            -r.dot(pos),
            u.x,
            u.y,
            u.z,
            -u.dot(pos),
            f.x,
            f.y,
            f.z,
            -f.dot(pos),
            0.0,
            0.0,
            0.0,
            1.0,
        )
    }
}

// --- Operator Overloads ---

impl Default for Mat4 {
    /// Returns the identity matrix.
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul<Mat4> for Mat4 {
    type Output = Self;
    /// Composes two transforms: `(a * b) * v == a * (b * v)`, so `b` is
    /// applied first. Not commutative.
    #[inline]
    fn mul(self, rhs: Mat4) -> Self::Output {
        let mut m = [0.0f32; 16];
        for (idx, entry) in m.iter_mut().enumerate() {
            *entry = self.row(idx / 4).dot(rhs.col(idx % 4));
        }
        Self { m }
    }
}

impl Mul<Vec4> for Mat4 {
    type Output = Vec4;
    /// Transforms a homogeneous 4-vector: each output component is a row of
    /// the matrix dotted with `rhs`, including its w.
    #[inline]
    fn mul(self, rhs: Vec4) -> Self::Output {
        Vec4::new(
            self.row(0).dot(rhs),
            self.row(1).dot(rhs),
            self.row(2).dot(rhs),
            self.row(3).dot(rhs),
        )
    }
}

impl Mul<Vec3> for Mat4 {
    type Output = Vec3;
    /// Transforms a 3-vector as a **point** with implicit `w = 1`: the
    /// linear part is applied and the translation column added. The bottom
    /// row is ignored (no perspective divide). For directions use
    /// [`Mat4::transform_vector`], which skips the translation.
    #[inline]
    fn mul(self, rhs: Vec3) -> Self::Output {
        Vec3::new(
            self.m[0] * rhs.x + self.m[1] * rhs.y + self.m[2] * rhs.z + self.m[3],
            self.m[4] * rhs.x + self.m[5] * rhs.y + self.m[6] * rhs.z + self.m[7],
            self.m[8] * rhs.x + self.m[9] * rhs.y + self.m[10] * rhs.z + self.m[11],
        )
    }
}

impl Index<usize> for Mat4 {
    type Output = f32;
    /// Accesses an entry by flat row-major index (`0..16`).
    ///
    /// # Panics
    /// Panics if `index` is 16 or greater.
    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.m[index]
    }
}

impl IndexMut<usize> for Mat4 {
    /// Mutably accesses an entry by flat row-major index (`0..16`).
    ///
    /// # Panics
    /// Panics if `index` is 16 or greater.
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.m[index]
    }
}

impl AbsDiffEq for Mat4 {
    type Epsilon = f32;

    fn default_epsilon() -> f32 {
        f32::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.m
            .iter()
            .zip(other.m.iter())
            .all(|(a, b)| f32::abs_diff_eq(a, b, epsilon))
    }
}

impl RelativeEq for Mat4 {
    fn default_max_relative() -> f32 {
        f32::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: f32, max_relative: f32) -> bool {
        self.m
            .iter()
            .zip(other.m.iter())
            .all(|(a, b)| f32::relative_eq(a, b, epsilon, max_relative))
    }
}

// --- Tests ---
