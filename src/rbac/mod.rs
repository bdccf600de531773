// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Owner, member and read-only Role/RoleBinding pairs for shared global resources.

pub mod resource;
pub mod subjects;
pub mod synthesizer;

pub use resource::{role_name, AccessType, SharedResourceKind};
pub use subjects::build_subject_for_member;
pub use synthesizer::{RbacTarget, RoleSynthesizer};
