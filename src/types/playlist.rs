// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::CustomResource;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, PartialEq, schemars::JsonSchema)]
#[kube(group = "playlist.grafana.app", version = "v0alpha1", kind = "Playlist")]
#[kube(namespaced)]
#[kube(derive = "PartialEq")]
#[serde(rename_all = "camelCase")]
pub struct PlaylistSpec {
    pub title: String,
    pub interval: String,
    #[serde(default)]
    pub items: Vec<PlaylistItem>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, schemars::JsonSchema)]
pub struct PlaylistItem {
    #[serde(rename = "type")]
    pub item_type: PlaylistItemType,
    pub value: String,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PlaylistItemType {
    DashboardByUid,
    DashboardByTag,
    DashboardById,
}

impl Playlist {
    /// UIDs of the dashboards referenced directly by this playlist
    pub fn dashboard_uids(&self) -> impl Iterator<Item = &str> {
        self.spec
            .items
            .iter()
            .filter(|i| i.item_type == PlaylistItemType::DashboardByUid)
            .map(|i| i.value.as_str())
    }
}
