// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Object-model client over opaque objects of a single kind.

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use kube::{
    api::{
        ApiResource, DeleteParams, DynamicObject, ListParams, ObjectList, Patch, PatchParams,
        PostParams, WatchEvent, WatchParams,
    },
    Api, Client, Resource, ResourceExt,
};
use std::fmt;
use tracing::{debug, instrument};

/// Unique key of an object of a given kind.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResourceIdentifier {
    pub namespace: String,
    pub name: String,
}

impl ResourceIdentifier {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ResourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

pub type RawWatchStream = BoxStream<'static, kube::Result<WatchEvent<DynamicObject>>>;

/// The capability set every kind's client offers, over untyped objects.
///
/// Implementations own the wire protocol. Delete-of-absent policy, patch
/// semantics and watch reconnection all belong here, not to the typed layers.
#[async_trait]
pub trait ObjectClient: Send + Sync {
    /// The kind served by this client.
    fn resource(&self) -> &ApiResource;

    async fn list(&self, namespace: &str, params: &ListParams)
        -> kube::Result<ObjectList<DynamicObject>>;

    async fn watch(
        &self,
        namespace: &str,
        params: &WatchParams,
        resource_version: &str,
    ) -> kube::Result<RawWatchStream>;

    async fn get(&self, namespace: &str, name: &str) -> kube::Result<DynamicObject>;

    async fn create(
        &self,
        namespace: &str,
        obj: &DynamicObject,
        params: &PostParams,
    ) -> kube::Result<DynamicObject>;

    async fn update(
        &self,
        namespace: &str,
        obj: &DynamicObject,
        params: &PostParams,
    ) -> kube::Result<DynamicObject>;

    async fn patch(
        &self,
        id: &ResourceIdentifier,
        patch: &Patch<serde_json::Value>,
        params: &PatchParams,
    ) -> kube::Result<DynamicObject>;

    async fn delete(&self, id: &ResourceIdentifier, params: &DeleteParams) -> kube::Result<()>;
}

/// `ObjectClient` backed by a kube `Client`.
#[derive(Clone)]
pub struct KubeObjectClient {
    client: Client,
    resource: ApiResource,
}

impl KubeObjectClient {
    pub fn new(client: Client, resource: ApiResource) -> Self {
        Self { client, resource }
    }

    /// Client for a statically known kind.
    pub fn for_kind<K>(client: Client) -> Self
    where
        K: Resource<DynamicType = ()>,
    {
        Self::new(client, ApiResource::erase::<K>(&()))
    }

    fn api(&self, namespace: &str) -> Api<DynamicObject> {
        Api::namespaced_with(self.client.clone(), namespace, &self.resource)
    }
}

#[async_trait]
impl ObjectClient for KubeObjectClient {
    fn resource(&self) -> &ApiResource {
        &self.resource
    }

    #[instrument(skip(self, params), fields(kind = %self.resource.kind))]
    async fn list(
        &self,
        namespace: &str,
        params: &ListParams,
    ) -> kube::Result<ObjectList<DynamicObject>> {
        self.api(namespace).list(params).await
    }

    #[instrument(skip(self, params), fields(kind = %self.resource.kind))]
    async fn watch(
        &self,
        namespace: &str,
        params: &WatchParams,
        resource_version: &str,
    ) -> kube::Result<RawWatchStream> {
        debug!("Opening watch from resource version {:?}", resource_version);
        self.api(namespace)
            .watch(params, resource_version)
            .await
            .map(StreamExt::boxed)
    }

    #[instrument(skip(self), fields(kind = %self.resource.kind))]
    async fn get(&self, namespace: &str, name: &str) -> kube::Result<DynamicObject> {
        self.api(namespace).get(name).await
    }

    #[instrument(skip(self, obj, params), fields(kind = %self.resource.kind, name = %obj.name_any()))]
    async fn create(
        &self,
        namespace: &str,
        obj: &DynamicObject,
        params: &PostParams,
    ) -> kube::Result<DynamicObject> {
        self.api(namespace).create(params, obj).await
    }

    #[instrument(skip(self, obj, params), fields(kind = %self.resource.kind, name = %obj.name_any()))]
    async fn update(
        &self,
        namespace: &str,
        obj: &DynamicObject,
        params: &PostParams,
    ) -> kube::Result<DynamicObject> {
        self.api(namespace)
            .replace(&obj.name_any(), params, obj)
            .await
    }

    #[instrument(skip(self, patch, params), fields(kind = %self.resource.kind))]
    async fn patch(
        &self,
        id: &ResourceIdentifier,
        patch: &Patch<serde_json::Value>,
        params: &PatchParams,
    ) -> kube::Result<DynamicObject> {
        self.api(&id.namespace).patch(&id.name, params, patch).await
    }

    #[instrument(skip(self, params), fields(kind = %self.resource.kind))]
    async fn delete(&self, id: &ResourceIdentifier, params: &DeleteParams) -> kube::Result<()> {
        // Either the object (deletion pending finalizers) or a Status.
        self.api(&id.namespace).delete(&id.name, params).await?;
        Ok(())
    }
}
