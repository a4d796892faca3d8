// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Tenant namespace provisioning and credential extraction.

pub mod credentials;
pub mod provisioner;

pub use credentials::{Credentials, CredentialResolver};
pub use provisioner::{
    NamespaceProvisioner, NamespaceStatus, ProvisionStep, ProvisioningState,
};
