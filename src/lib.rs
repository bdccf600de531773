// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
pub mod answers;
pub mod config;
pub mod constants;
pub mod error;
pub mod kubernetes;
pub mod mcapp;
pub mod rbac;
pub mod reconcilers;
pub mod retry;
pub mod types;

#[cfg(test)]
pub mod test_utils;
