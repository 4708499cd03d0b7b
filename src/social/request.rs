//! Request Ledger
//!
//! Generic store for timed, consumable invitations between participants.
//! One ledger instance per flow (duels hold one, parties hold one) — it
//! is a reusable component, not a singleton. At most one outstanding
//! request exists per ordered (sender, target) pair.
//!
//! Expiry timers capture the request **id**, not the pair: a request that
//! was accepted and re-issued can never be swept away by the first
//! request's stale timer. Removing a request drops its timer handle,
//! cancelling the timer outright; a timer that fires anyway finds the id
//! absent and does nothing.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::core::context::EngineContext;
use crate::core::scheduler::TaskHandle;
use crate::session::player::ParticipantId;

/// Stable request identity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Fresh random id.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// A timed invitation from `sender` to `target` carrying flow-specific
/// selection data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request<D> {
    /// Request identity.
    pub id: RequestId,
    /// Inviting participant.
    pub sender: ParticipantId,
    /// Invited participant.
    pub target: ParticipantId,
    /// Flow-specific payload.
    pub payload: D,
    /// When the request was issued.
    pub created_at: DateTime<Utc>,
}

impl<D> Request<D> {
    /// New request issued now.
    pub fn new(sender: ParticipantId, target: ParticipantId, payload: D) -> Self {
        Self {
            id: RequestId::new(),
            sender,
            target,
            payload,
            created_at: Utc::now(),
        }
    }

    /// Whether the participant is the sender or the target.
    pub fn involves(&self, id: ParticipantId) -> bool {
        self.sender == id || self.target == id
    }
}

struct Entry<D> {
    request: Request<D>,
    // Dropping the entry aborts the pending expiry timer.
    _expiry: TaskHandle,
}

struct Inner<D> {
    label: &'static str,
    expiry: Duration,
    requests: RwLock<BTreeMap<RequestId, Entry<D>>>,
    ctx: EngineContext,
}

/// Timed-invitation store with per-instantiation expiry.
///
/// Cloning shares the store; expiry timers hold only weak references, so
/// dropping the last clone drops every pending timer with it.
pub struct RequestLedger<D> {
    inner: Arc<Inner<D>>,
}

impl<D> Clone for RequestLedger<D> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<D> RequestLedger<D>
where
    D: Clone + Send + Sync + 'static,
{
    /// New ledger whose requests expire after `expiry`. The label names
    /// the flow in participant-facing messages ("duel", "party").
    pub fn new(label: &'static str, expiry: Duration, ctx: EngineContext) -> Self {
        Self {
            inner: Arc::new(Inner {
                label,
                expiry,
                requests: RwLock::new(BTreeMap::new()),
                ctx,
            }),
        }
    }

    /// Issue a request unless one is already outstanding for the pair.
    ///
    /// Idempotent per ordered (sender, target) pair: a duplicate send
    /// notifies the sender and stores nothing. Returns whether a request
    /// was created.
    pub async fn send_request(
        &self,
        sender: ParticipantId,
        target: ParticipantId,
        payload: D,
    ) -> bool {
        let directory = &self.inner.ctx.directory;
        if self.find(sender, target).await.is_some() {
            directory.send_message(
                sender,
                &format!(
                    "your {} invite to {} is still pending",
                    self.inner.label,
                    directory.display_name(target)
                ),
            );
            return false;
        }

        self.add(Request::new(sender, target, payload)).await;
        directory.send_message(
            target,
            &format!(
                "{} invited you to a {}",
                directory.display_name(sender),
                self.inner.label
            ),
        );
        directory.send_message(
            sender,
            &format!(
                "{} invite sent to {}",
                self.inner.label,
                directory.display_name(target)
            ),
        );
        true
    }

    /// Store a request and schedule its expiry timer.
    pub async fn add(&self, request: Request<D>) {
        let id = request.id;
        let weak = Arc::downgrade(&self.inner);
        let expiry = self.inner.ctx.scheduler.run_after(
            self.inner.expiry,
            Box::pin(async move {
                if let Some(inner) = weak.upgrade() {
                    Self::expire(&inner, id).await;
                }
            }),
        );
        debug!(label = self.inner.label, request = %id, "request added");
        self.inner
            .requests
            .write()
            .await
            .insert(id, Entry { request, _expiry: expiry });
    }

    /// Remove `id` if still present and notify the sender. Presence is
    /// the whole check — an accepted or replaced request is gone from the
    /// map and the stale timer does nothing.
    async fn expire(inner: &Inner<D>, id: RequestId) {
        let removed = inner.requests.write().await.remove(&id);
        if let Some(entry) = removed {
            let directory = &inner.ctx.directory;
            directory.send_message(
                entry.request.sender,
                &format!(
                    "your {} invite to {} expired",
                    inner.label,
                    directory.display_name(entry.request.target)
                ),
            );
            debug!(label = inner.label, request = %id, "request expired");
        }
    }

    /// The outstanding request for the ordered pair.
    pub async fn find(&self, sender: ParticipantId, target: ParticipantId) -> Option<Request<D>> {
        self.inner
            .requests
            .read()
            .await
            .values()
            .map(|entry| &entry.request)
            .find(|request| request.sender == sender && request.target == target)
            .cloned()
    }

    /// Remove and return the pair's request — the accept path.
    pub async fn take(&self, sender: ParticipantId, target: ParticipantId) -> Option<Request<D>> {
        let mut requests = self.inner.requests.write().await;
        let id = requests
            .values()
            .map(|entry| &entry.request)
            .find(|request| request.sender == sender && request.target == target)?
            .id;
        requests.remove(&id).map(|entry| entry.request)
    }

    /// Silently remove the pair's request.
    pub async fn remove(&self, sender: ParticipantId, target: ParticipantId) -> bool {
        self.take(sender, target).await.is_some()
    }

    /// Cancel the pair's request, notifying both parties — or the sender
    /// alone when there was nothing to cancel.
    pub async fn cancel(&self, sender: ParticipantId, target: ParticipantId) -> bool {
        let directory = &self.inner.ctx.directory;
        match self.take(sender, target).await {
            Some(request) => {
                directory.send_message(
                    request.target,
                    &format!(
                        "the {} invite from {} was cancelled",
                        self.inner.label,
                        directory.display_name(sender)
                    ),
                );
                directory.send_message(
                    sender,
                    &format!(
                        "your {} invite to {} was cancelled",
                        self.inner.label,
                        directory.display_name(target)
                    ),
                );
                true
            }
            None => {
                directory.send_message(
                    sender,
                    &format!(
                        "no {} invite found for {}",
                        self.inner.label,
                        directory.display_name(target)
                    ),
                );
                false
            }
        }
    }

    /// Requests sent by `sender`.
    pub async fn outgoing(&self, sender: ParticipantId) -> Vec<Request<D>> {
        self.matching(|request| request.sender == sender).await
    }

    /// Requests addressed to `target`.
    pub async fn incoming(&self, target: ParticipantId) -> Vec<Request<D>> {
        self.matching(|request| request.target == target).await
    }

    /// Requests the participant is involved in, either side.
    pub async fn all_for(&self, id: ParticipantId) -> Vec<Request<D>> {
        self.matching(|request| request.involves(id)).await
    }

    /// Drop every request touching a disconnecting participant.
    pub async fn remove_all_for(&self, id: ParticipantId) {
        self.inner
            .requests
            .write()
            .await
            .retain(|_, entry| !entry.request.involves(id));
    }

    /// Outstanding request count.
    pub async fn len(&self) -> usize {
        self.inner.requests.read().await.len()
    }

    /// Whether no requests are outstanding.
    pub async fn is_empty(&self) -> bool {
        self.inner.requests.read().await.is_empty()
    }

    async fn matching(&self, predicate: impl Fn(&Request<D>) -> bool) -> Vec<Request<D>> {
        self.inner
            .requests
            .read()
            .await
            .values()
            .map(|entry| &entry.request)
            .filter(|request| predicate(request))
            .cloned()
            .collect()
    }
}
