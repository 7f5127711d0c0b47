// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Generic, namespace-scoped resource clients.

pub mod namespaced;
pub mod object;
pub mod registry;
pub mod typed;
pub mod watch;

pub use namespaced::NamespacedClient;
pub use object::{KubeObjectClient, ObjectClient, ResourceIdentifier};
pub use registry::{ClientRegistry, ClientRegistryBuilder};
pub use typed::TypedResourceClient;
pub use watch::{WatchEvent, WatchStream};
