// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Generic typed client shared by every resource kind.

use crate::error::{Error, Result};
use crate::resources::object::{ObjectClient, ResourceIdentifier};
use crate::resources::watch::{decode_event, WatchStream};
use futures::StreamExt;
use kube::api::{
    DeleteParams, DynamicObject, ListParams, ObjectList, Patch, PatchParams, PostParams,
    WatchParams,
};
use kube::Resource;
use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, instrument};

pub(crate) fn to_dynamic<K: Serialize>(obj: &K) -> Result<DynamicObject> {
    serde_json::to_value(obj)
        .and_then(serde_json::from_value)
        .map_err(Error::Marshal)
}

pub(crate) fn from_dynamic<K: DeserializeOwned>(obj: DynamicObject) -> Result<K> {
    serde_json::to_value(obj)
        .and_then(serde_json::from_value)
        .map_err(Error::Unmarshal)
}

/// Typed List/Watch/Get/Create/Update/Patch/Delete for one `(object, list)`
/// type pair, over a type-erased [`ObjectClient`].
pub struct TypedResourceClient<K, L> {
    inner: Arc<dyn ObjectClient>,
    _types: PhantomData<fn() -> (K, L)>,
}

impl<K, L> Clone for TypedResourceClient<K, L> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _types: PhantomData,
        }
    }
}

impl<K, L> TypedResourceClient<K, L>
where
    K: Resource + Clone + Serialize + DeserializeOwned + Send + 'static,
    L: DeserializeOwned,
{
    pub fn new(inner: Arc<dyn ObjectClient>) -> Self {
        Self {
            inner,
            _types: PhantomData,
        }
    }

    /// Kind name used in error context.
    pub fn kind(&self) -> &str {
        &self.inner.resource().kind
    }

    #[instrument(skip(self, params), fields(kind = %self.kind()))]
    pub async fn list(&self, namespace: &str, params: &ListParams) -> Result<L> {
        let list = self
            .inner
            .list(namespace, params)
            .await
            .map_err(|e| Error::from(e).context("list", self.kind(), namespace))?;

        let resource = self.inner.resource();
        let items = list
            .items
            .into_iter()
            .map(serde_json::to_value)
            .collect::<serde_json::Result<Vec<_>>>()
            .map_err(Error::Unmarshal)?;
        let raw = serde_json::json!({
            "apiVersion": resource.api_version,
            "kind": format!("{}List", resource.kind),
            "metadata": list.metadata,
            "items": items,
        });

        serde_json::from_value(raw)
            .map_err(|e| Error::Unmarshal(e).context("list", self.kind(), namespace))
    }

    /// Open a watch on the namespace. The stream never ends on its own; drop
    /// it to release the connection.
    #[instrument(skip(self, params), fields(kind = %self.kind()))]
    pub async fn watch(
        &self,
        namespace: &str,
        params: &WatchParams,
        resource_version: &str,
    ) -> Result<WatchStream<K>> {
        let stream = self
            .inner
            .watch(namespace, params, resource_version)
            .await
            .map_err(|e| Error::from(e).context("watch", self.kind(), namespace))?;

        Ok(stream.map(decode_event::<K>).boxed())
    }

    #[instrument(skip(self), fields(kind = %self.kind()))]
    pub async fn get(&self, namespace: &str, name: &str) -> Result<K> {
        self.inner
            .get(namespace, name)
            .await
            .map_err(Error::from)
            .and_then(from_dynamic)
            .map_err(|e| e.context("get", self.kind(), name))
    }

    /// Create `obj` in `namespace`, overriding whatever namespace it carries.
    /// Returns the object as stored, with server-assigned fields filled in.
    #[instrument(skip(self, obj, params), fields(kind = %self.kind()))]
    pub async fn create(&self, namespace: &str, obj: &K, params: &PostParams) -> Result<K> {
        let obj = with_namespace(obj, namespace);
        let name = display_name(&obj);
        debug!("Creating {} {}/{}", self.kind(), namespace, name);

        self.submit(&obj, |raw| async move {
            self.inner.create(namespace, &raw, params).await
        })
        .await
        .map_err(|e| e.context("create", self.kind(), name))
    }

    /// Replace the stored object. `obj` must carry the resource version the
    /// server currently holds, otherwise the server answers with a conflict.
    #[instrument(skip(self, obj, params), fields(kind = %self.kind()))]
    pub async fn update(&self, namespace: &str, obj: &K, params: &PostParams) -> Result<K> {
        let obj = with_namespace(obj, namespace);
        let Some(name) = obj.meta().name.clone() else {
            return Err(Error::InvalidObject(format!(
                "{} update requires metadata.name",
                self.kind()
            )));
        };
        debug!("Updating {} {}/{}", self.kind(), namespace, name);

        self.submit(&obj, |raw| async move {
            self.inner.update(namespace, &raw, params).await
        })
        .await
        .map_err(|e| e.context("update", self.kind(), name))
    }

    /// Apply `patch` to the object; merge vs. apply vs. JSON-patch semantics
    /// come from the patch variant.
    #[instrument(skip(self, patch, params), fields(kind = %self.kind(), id = %id))]
    pub async fn patch(
        &self,
        id: &ResourceIdentifier,
        patch: &Patch<serde_json::Value>,
        params: &PatchParams,
    ) -> Result<K> {
        self.inner
            .patch(id, patch, params)
            .await
            .map_err(Error::from)
            .and_then(from_dynamic)
            .map_err(|e| e.context("patch", self.kind(), &id.name))
    }

    #[instrument(skip(self, params), fields(kind = %self.kind(), id = %id))]
    pub async fn delete(&self, id: &ResourceIdentifier, params: &DeleteParams) -> Result<()> {
        self.inner
            .delete(id, params)
            .await
            .map_err(|e| Error::from(e).context("delete", self.kind(), &id.name))
    }

    async fn submit<F, Fut>(&self, obj: &K, call: F) -> Result<K>
    where
        F: FnOnce(DynamicObject) -> Fut,
        Fut: std::future::Future<Output = kube::Result<DynamicObject>>,
    {
        let raw = to_dynamic(obj)?;
        let stored = call(raw).await?;
        from_dynamic(stored)
    }
}

fn with_namespace<K: Resource + Clone>(obj: &K, namespace: &str) -> K {
    let mut obj = obj.clone();
    obj.meta_mut().namespace = Some(namespace.to_string());
    obj
}

fn display_name<K: Resource>(obj: &K) -> String {
    let meta = obj.meta();
    meta.name
        .clone()
        .or_else(|| meta.generate_name.clone())
        .unwrap_or_default()
}
