// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Typed change events for a watched kind.

use crate::error::{Error, Result};
use crate::resources::typed::from_dynamic;
use futures::stream::BoxStream;
use kube::api::{DynamicObject, WatchEvent as RawWatchEvent};
use serde::de::DeserializeOwned;

/// A change to an object of kind `K`.
#[derive(Clone, Debug, PartialEq)]
pub enum WatchEvent<K> {
    Added(K),
    Modified(K),
    Deleted(K),
    /// Progress marker carrying no object.
    Bookmark { resource_version: String },
}

impl<K> WatchEvent<K> {
    /// The object carried by this event, if any.
    pub fn object(&self) -> Option<&K> {
        match self {
            WatchEvent::Added(obj) | WatchEvent::Modified(obj) | WatchEvent::Deleted(obj) => {
                Some(obj)
            }
            WatchEvent::Bookmark { .. } => None,
        }
    }
}

/// A live, never-ending stream of changes. Dropping it closes the connection.
pub type WatchStream<K> = BoxStream<'static, Result<WatchEvent<K>>>;

pub(crate) fn decode_event<K: DeserializeOwned>(
    event: kube::Result<RawWatchEvent<DynamicObject>>,
) -> Result<WatchEvent<K>> {
    match event? {
        RawWatchEvent::Added(obj) => from_dynamic(obj).map(WatchEvent::Added),
        RawWatchEvent::Modified(obj) => from_dynamic(obj).map(WatchEvent::Modified),
        RawWatchEvent::Deleted(obj) => from_dynamic(obj).map(WatchEvent::Deleted),
        RawWatchEvent::Bookmark(bookmark) => Ok(WatchEvent::Bookmark {
            resource_version: bookmark.metadata.resource_version,
        }),
        RawWatchEvent::Error(resp) => Err(Error::Watch(format!(
            "HTTP {} - {}: {}",
            resp.code, resp.reason, resp.message
        ))),
    }
}
