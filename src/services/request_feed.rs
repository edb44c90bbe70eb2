//! Request change feed
//!
//! The data API offers no push channel, so one background task per process
//! refreshes the request list on a fixed interval while someone is signed
//! in and broadcasts what changed. Views subscribe instead of polling.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::{RequestsApi, SessionStore};
use crate::models::{RequestStatus, RideRequest};

const FEED_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum RequestChange {
    Added {
        request: RideRequest,
    },
    StatusChanged {
        request: RideRequest,
        previous: RequestStatus,
    },
    /// Last known record of a request that left the list
    Removed {
        request: RideRequest,
    },
}

impl RequestChange {
    pub fn request(&self) -> &RideRequest {
        match self {
            RequestChange::Added { request }
            | RequestChange::StatusChanged { request, .. }
            | RequestChange::Removed { request } => request,
        }
    }

    /// Whether the change concerns `uid` as rider or driver
    pub fn involves(&self, uid: &str) -> bool {
        self.request().involves(uid)
    }
}

/// Changes between two snapshots of the request list
pub fn diff_requests(previous: &[RideRequest], next: &[RideRequest]) -> Vec<RequestChange> {
    let before: HashMap<&str, &RideRequest> =
        previous.iter().map(|r| (r.id.as_str(), r)).collect();
    let mut changes = Vec::new();

    for request in next {
        match before.get(request.id.as_str()) {
            None => changes.push(RequestChange::Added {
                request: request.clone(),
            }),
            Some(old) if old.status != request.status => changes.push(RequestChange::StatusChanged {
                request: request.clone(),
                previous: old.status,
            }),
            Some(_) => {}
        }
    }

    let after: HashMap<&str, ()> = next.iter().map(|r| (r.id.as_str(), ())).collect();
    changes.extend(
        previous
            .iter()
            .filter(|r| !after.contains_key(r.id.as_str()))
            .map(|r| RequestChange::Removed { request: r.clone() }),
    );

    changes
}

pub struct RequestFeed {
    requests: Arc<RequestsApi>,
    session: Arc<SessionStore>,
    interval: Duration,
    sender: broadcast::Sender<RequestChange>,
    snapshot: Mutex<Option<Vec<RideRequest>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl RequestFeed {
    pub fn new(requests: Arc<RequestsApi>, session: Arc<SessionStore>, interval: Duration) -> Self {
        let (sender, _) = broadcast::channel(FEED_CAPACITY);
        Self {
            requests,
            session,
            interval,
            sender,
            snapshot: Mutex::new(None),
            task: Mutex::new(None),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RequestChange> {
        self.sender.subscribe()
    }

    /// Spawn the refresher. The first refresh happens one interval after start.
    pub async fn start(self: &Arc<Self>) {
        let mut task = self.task.lock().await;
        if task.is_some() {
            return;
        }

        let weak = Arc::downgrade(self);
        let period = self.interval;
        *task = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(feed) = weak.upgrade() else { break };
                feed.refresh_once().await;
            }
        }));
        log::info!("📡 Request feed refreshing every {:?}", period);
    }

    pub async fn shutdown(&self) {
        if let Some(handle) = self.task.lock().await.take() {
            handle.abort();
            log::info!("📡 Request feed stopped");
        }
    }

    /// One refresh cycle. Returns the number of changes broadcast.
    pub async fn refresh_once(&self) -> usize {
        if self.session.current_user().is_none() {
            return 0;
        }

        let latest = match self.requests.refresh_requests().await {
            Ok(latest) => latest,
            Err(e) => {
                log::warn!("⚠️ Request feed refresh failed: {}", e);
                return 0;
            }
        };

        let mut snapshot = self.snapshot.lock().await;
        let changes = match snapshot.as_deref() {
            Some(previous) => diff_requests(previous, &latest),
            None => Vec::new(),
        };
        *snapshot = Some(latest);
        drop(snapshot);

        for change in &changes {
            // No subscribers is not an error.
            let _ = self.sender.send(change.clone());
        }
        if !changes.is_empty() {
            log::info!("📡 Broadcast {} request change(s)", changes.len());
        }
        changes.len()
    }
}
