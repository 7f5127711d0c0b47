// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Tenant-bound wrapper around [`TypedResourceClient`].

use crate::error::Result;
use crate::namespace::Namespace;
use crate::resources::object::ResourceIdentifier;
use crate::resources::typed::TypedResourceClient;
use crate::resources::watch::WatchStream;
use kube::api::{DeleteParams, ListParams, Patch, PatchParams, PostParams, WatchParams};
use kube::Resource;
use serde::{de::DeserializeOwned, Serialize};

/// A typed client permanently bound to one tenant namespace.
///
/// The namespace is fixed at construction and every call targets it,
/// whatever namespace an input object carries. Use one instance per tenant.
pub struct NamespacedClient<K, L> {
    client: TypedResourceClient<K, L>,
    namespace: Namespace,
}

impl<K, L> Clone for NamespacedClient<K, L> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            namespace: self.namespace.clone(),
        }
    }
}

impl<K, L> NamespacedClient<K, L>
where
    K: Resource + Clone + Serialize + DeserializeOwned + Send + 'static,
    L: DeserializeOwned,
{
    pub fn new(client: TypedResourceClient<K, L>, namespace: Namespace) -> Self {
        Self { client, namespace }
    }

    /// Bind to the namespace of `tenant_id`, in organization mode if `org_mode` is set.
    pub fn for_tenant(client: TypedResourceClient<K, L>, tenant_id: i64, org_mode: bool) -> Self {
        Self::new(client, Namespace::format(tenant_id, org_mode))
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    fn id(&self, name: &str) -> ResourceIdentifier {
        ResourceIdentifier::new(self.namespace.as_str(), name)
    }

    pub async fn list(&self, params: &ListParams) -> Result<L> {
        self.client.list(self.namespace.as_str(), params).await
    }

    pub async fn watch(
        &self,
        params: &WatchParams,
        resource_version: &str,
    ) -> Result<WatchStream<K>> {
        self.client
            .watch(self.namespace.as_str(), params, resource_version)
            .await
    }

    pub async fn get(&self, name: &str) -> Result<K> {
        self.client.get(self.namespace.as_str(), name).await
    }

    pub async fn create(&self, obj: &K, params: &PostParams) -> Result<K> {
        self.client.create(self.namespace.as_str(), obj, params).await
    }

    pub async fn update(&self, obj: &K, params: &PostParams) -> Result<K> {
        self.client.update(self.namespace.as_str(), obj, params).await
    }

    pub async fn patch(
        &self,
        name: &str,
        patch: &Patch<serde_json::Value>,
        params: &PatchParams,
    ) -> Result<K> {
        self.client.patch(&self.id(name), patch, params).await
    }

    pub async fn delete(&self, name: &str, params: &DeleteParams) -> Result<()> {
        self.client.delete(&self.id(name), params).await
    }
}
