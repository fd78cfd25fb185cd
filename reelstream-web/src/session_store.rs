//! In-memory implementations of the boundary collaborators.
//!
//! Production deployments replace these with services backed by the
//! account and statistics stores; the trait contracts are identical. Both
//! implementations serialize their updates behind a lock, so concurrent
//! streams reporting events never lose increments.

use std::collections::HashMap;
use std::time::SystemTime;

use async_trait::async_trait;
use reelstream_core::ResourceId;
use reelstream_core::streaming::{
    AccessDecision, AccessGate, SessionTracker, ViewerId, WatchProgress,
};
use tokio::sync::RwLock;
use tracing::debug;

/// Access gate that admits every authenticated viewer.
///
/// Stands in for the subscription service; anything that reached the
/// server with a viewer identity may stream.
pub struct OpenAccessGate;

#[async_trait]
impl AccessGate for OpenAccessGate {
    async fn may_stream(&self, viewer: &ViewerId, resource_id: ResourceId) -> AccessDecision {
        debug!("Allowing {viewer} to stream {resource_id}");
        AccessDecision::Allow
    }
}

/// Session tracker keeping view counts and watch progress in process memory.
#[derive(Default)]
pub struct InMemorySessionTracker {
    progress: RwLock<HashMap<(ViewerId, ResourceId), WatchProgress>>,
    view_counts: RwLock<HashMap<ResourceId, u64>>,
}

impl InMemorySessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total views recorded for a resource.
    pub async fn view_count(&self, resource_id: ResourceId) -> u64 {
        self.view_counts
            .read()
            .await
            .get(&resource_id)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl SessionTracker for InMemorySessionTracker {
    async fn record_viewed(&self, viewer: &ViewerId, resource_id: ResourceId) {
        let mut counts = self.view_counts.write().await;
        *counts.entry(resource_id).or_insert(0) += 1;
        debug!("Recorded view of {resource_id} by {viewer}");
    }

    async fn record_progress(
        &self,
        viewer: &ViewerId,
        resource_id: ResourceId,
        percent: f64,
        total_duration_secs: Option<u64>,
    ) {
        let entry = WatchProgress {
            percent,
            total_duration_secs,
            updated_at: SystemTime::now(),
        };
        self.progress
            .write()
            .await
            .insert((viewer.clone(), resource_id), entry);
    }

    async fn progress(&self, viewer: &ViewerId, resource_id: ResourceId) -> Option<WatchProgress> {
        self.progress
            .read()
            .await
            .get(&(viewer.clone(), resource_id))
            .cloned()
    }
}
