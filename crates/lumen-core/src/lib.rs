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

//! # Lumen Core
//!
//! Foundational math crate for the Lumen rendering pipeline: the vector and
//! homogeneous-transform types shared by every stage that positions, orients,
//! or projects geometry.

#![warn(missing_docs)]

pub mod math;

pub use math::{Mat4, Vec2, Vec3, Vec4};
