// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for client creation, object construction and typed cluster access.

pub mod client;
pub mod gateway;
pub mod resources;

pub use client::{connect, ClusterConnection};
pub use gateway::ClusterGateway;
