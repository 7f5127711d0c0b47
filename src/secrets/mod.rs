// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
pub mod client;
pub mod transport;
pub mod types;

pub use client::{SecretsClient, SecretsClientBuilder};
pub use transport::{RetryPolicy, RetryingTransport, Transport};
pub use types::{
    Keeper, KeeperAws, KeeperAwsAssumeRole, KeeperSpec, ObjectMetadata, SecureValue,
    SecureValueSpec, SecureValueStatus,
};
