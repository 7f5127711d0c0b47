// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kind-to-client resolution.

use crate::error::{Error, Result};
use crate::namespace::Namespace;
use crate::resources::namespaced::NamespacedClient;
use crate::resources::object::{KubeObjectClient, ObjectClient};
use crate::resources::typed::TypedResourceClient;
use kube::{Client, Resource};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Immutable mapping from kind name to the client serving that kind.
#[derive(Clone, Default)]
pub struct ClientRegistry {
    clients: Arc<HashMap<String, Arc<dyn ObjectClient>>>,
}

#[derive(Default)]
pub struct ClientRegistryBuilder {
    clients: HashMap<String, Arc<dyn ObjectClient>>,
}

impl ClientRegistryBuilder {
    /// Register a client under the kind it serves. A later registration for
    /// the same kind replaces the earlier one.
    pub fn register(mut self, client: Arc<dyn ObjectClient>) -> Self {
        let kind = client.resource().kind.clone();
        debug!("Registering client for kind {}", kind);
        if self.clients.insert(kind.clone(), client).is_some() {
            warn!("Client for kind {} registered twice, keeping the last one", kind);
        }
        self
    }

    /// Register a kube-backed client for a statically known kind.
    pub fn register_kind<K>(self, client: &Client) -> Self
    where
        K: Resource<DynamicType = ()>,
    {
        self.register(Arc::new(KubeObjectClient::for_kind::<K>(client.clone())))
    }

    pub fn build(self) -> ClientRegistry {
        ClientRegistry {
            clients: Arc::new(self.clients),
        }
    }
}

impl ClientRegistry {
    pub fn builder() -> ClientRegistryBuilder {
        ClientRegistryBuilder::default()
    }

    pub fn client_for(&self, kind: &str) -> Result<Arc<dyn ObjectClient>> {
        self.clients
            .get(kind)
            .cloned()
            .ok_or_else(|| Error::UnregisteredKind(kind.to_string()))
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.clients.keys().map(String::as_str)
    }

    /// Typed client for `K`, looked up by `K`'s kind name.
    pub fn typed<K, L>(&self) -> Result<TypedResourceClient<K, L>>
    where
        K: Resource<DynamicType = ()> + Clone + Serialize + DeserializeOwned + Send + 'static,
        L: DeserializeOwned,
    {
        self.client_for(&K::kind(&())).map(TypedResourceClient::new)
    }

    /// Typed client for `K` bound to `namespace`.
    pub fn namespaced<K, L>(&self, namespace: Namespace) -> Result<NamespacedClient<K, L>>
    where
        K: Resource<DynamicType = ()> + Clone + Serialize + DeserializeOwned + Send + 'static,
        L: DeserializeOwned,
    {
        Ok(NamespacedClient::new(self.typed()?, namespace))
    }
}
