// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes access: collaborator traits, their API-backed implementation, CRD discovery and namespaces.

pub mod client;
pub mod crd;
pub mod namespaces;
pub mod store;

pub use client::KubeStore;
pub use crd::wait_for_crd;
pub use namespaces::ensure_namespace_exists;
pub use store::Collaborators;
