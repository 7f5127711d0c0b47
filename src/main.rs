// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use futures::StreamExt;
use kube::api::{ListParams, ObjectList, WatchParams};
use kube::ResourceExt;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tenant_resources::config::Config;
use tenant_resources::resources::{ClientRegistry, WatchEvent};
use tenant_resources::types::playlist::Playlist;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let namespace = config.namespace()?;
    info!("Configuration loaded: url={}, namespace={}", config.url, namespace);

    let client = config
        .kube_client()
        .context("failed to create API server client")?;

    let registry = ClientRegistry::builder()
        .register_kind::<Playlist>(&client)
        .build();
    let playlists = registry.namespaced::<Playlist, ObjectList<Playlist>>(namespace)?;

    let list = playlists.list(&ListParams::default()).await?;
    info!("Found {} playlist(s) in {}", list.items.len(), playlists.namespace());
    for playlist in &list.items {
        info!(
            "Playlist {} ({}) with {} item(s)",
            playlist.name_any(),
            playlist.spec.title,
            playlist.spec.items.len()
        );
    }

    let resource_version = list.metadata.resource_version.unwrap_or_default();
    let mut events = playlists.watch(&WatchParams::default(), &resource_version).await?;
    info!("Watching playlists from resource version {:?}", resource_version);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping watch");
                return Ok(());
            }
            event = events.next() => match event {
                Some(Ok(WatchEvent::Added(p))) => info!("Playlist {} added", p.name_any()),
                Some(Ok(WatchEvent::Modified(p))) => info!("Playlist {} modified", p.name_any()),
                Some(Ok(WatchEvent::Deleted(p))) => info!("Playlist {} deleted", p.name_any()),
                Some(Ok(WatchEvent::Bookmark { resource_version })) => {
                    info!("Bookmark at resource version {}", resource_version)
                }
                Some(Err(e)) => warn!("Watch error: {}", e),
                None => {
                    warn!("Watch stream ended");
                    return Ok(());
                }
            }
        }
    }
}
