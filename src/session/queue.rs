//! Join Queue
//!
//! FIFO waitlist for one session. A periodic tick peeks the head; when
//! that participant is online and the session has room, the head is
//! dequeued and joined. An offline head blocks the queue rather than
//! being skipped — promotion is strictly in insertion order.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::core::context::EngineContext;
use crate::core::scheduler::TaskHandle;
use crate::session::player::{ParticipantId, SessionPlayer};
use crate::session::session::SessionHandle;
use crate::session::settings::SessionSettings;
use crate::session::team::SessionTeam;
use crate::QUEUE_PROMOTE_PERIOD;

/// FIFO waitlist promoting participants into a session as capacity
/// allows. Dropping the queue stops its promotion tick.
pub struct JoinQueue {
    entries: Arc<Mutex<VecDeque<ParticipantId>>>,
    _tick: TaskHandle,
}

impl JoinQueue {
    /// Attach a queue to `session`, ticking once per
    /// [`QUEUE_PROMOTE_PERIOD`].
    pub fn new<P, T, S>(session: SessionHandle<P, T, S>, ctx: &EngineContext) -> Self
    where
        P: SessionPlayer,
        T: SessionTeam,
        S: SessionSettings,
    {
        let entries: Arc<Mutex<VecDeque<ParticipantId>>> = Arc::new(Mutex::new(VecDeque::new()));

        let tick_entries = entries.clone();
        let directory = ctx.directory.clone();
        let tick = ctx.scheduler.run_every(
            QUEUE_PROMOTE_PERIOD,
            Box::new(move || {
                let entries = tick_entries.clone();
                let session = session.clone();
                let directory = directory.clone();
                Box::pin(async move {
                    let mut session = session.write().await;
                    let promoted = {
                        let mut entries = entries.lock().unwrap();
                        match entries.front() {
                            // A full session leaves the head queued.
                            Some(head) if directory.is_online(*head) && session.can_join() => {
                                entries.pop_front()
                            }
                            _ => None,
                        }
                    };
                    if let Some(id) = promoted {
                        debug!(
                            session = %session.full_name(),
                            participant = %id,
                            "promoted from queue"
                        );
                        let _ = session.join(id, false);
                    }
                })
            }),
        );

        Self {
            entries,
            _tick: tick,
        }
    }

    /// Append a participant to the back of the queue.
    pub fn add(&self, id: ParticipantId) {
        self.entries.lock().unwrap().push_back(id);
    }

    /// Remove a participant wherever they sit in the queue.
    pub fn remove(&self, id: ParticipantId) -> bool {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|entry| *entry != id);
        entries.len() != before
    }

    /// Whether the participant is queued.
    pub fn contains(&self, id: ParticipantId) -> bool {
        self.entries.lock().unwrap().contains(&id)
    }

    /// 1-based position in the queue.
    pub fn position(&self, id: ParticipantId) -> Option<usize> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .position(|entry| *entry == id)
            .map(|index| index + 1)
    }

    /// The participant next in line.
    pub fn first(&self) -> Option<ParticipantId> {
        self.entries.lock().unwrap().front().copied()
    }

    /// Queued participant count.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::InMemoryDirectory;
    use crate::core::scheduler::TokioScheduler;
    use crate::session::player::BasePlayer;
    use crate::session::session::Session;
    use crate::session::settings::{BaseSettings, SizePolicy, WorldId};
    use crate::session::team::BaseTeam;
    use std::time::Duration;

    struct Fixture {
        directory: Arc<InMemoryDirectory>,
        session: SessionHandle<BasePlayer, BaseTeam, BaseSettings>,
        queue: JoinQueue,
    }

    fn fixture(max_players: usize) -> Fixture {
        let directory = Arc::new(InMemoryDirectory::new());
        let ctx = EngineContext::new(Arc::new(TokioScheduler), directory.clone());
        let session = Session::new(
            "skirmish",
            BaseSettings::new(
                SizePolicy::new("test", 1, max_players, 2, max_players),
                WorldId::new("arena"),
            ),
            ctx.clone(),
        )
        .into_handle();
        let queue = JoinQueue::new(session.clone(), &ctx);
        Fixture {
            directory,
            session,
            queue,
        }
    }

    fn online_participant(directory: &InMemoryDirectory, name: &str) -> ParticipantId {
        let id = ParticipantId::new();
        directory.register(id, name);
        id
    }

    #[tokio::test(start_paused = true)]
    async fn promotes_in_insertion_order() {
        let f = fixture(8);
        let x = online_participant(&f.directory, "x");
        let y = online_participant(&f.directory, "y");
        f.queue.add(x);
        f.queue.add(y);

        assert_eq!(f.queue.position(x), Some(1));
        assert_eq!(f.queue.position(y), Some(2));

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert!(f.session.read().await.contains(x));
        assert!(!f.session.read().await.contains(y));
        assert_eq!(f.queue.position(y), Some(1));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(f.session.read().await.contains(y));
        assert!(f.queue.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn full_session_leaves_head_queued() {
        let f = fixture(1);
        let occupant = online_participant(&f.directory, "occupant");
        f.session.write().await.join(occupant, false).unwrap();

        let waiting = online_participant(&f.directory, "waiting");
        f.queue.add(waiting);

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(!f.session.read().await.contains(waiting));
        assert_eq!(f.queue.position(waiting), Some(1));

        // A slot opens; the next tick promotes.
        f.session.write().await.leave(occupant).unwrap();
        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert!(f.session.read().await.contains(waiting));
    }

    #[tokio::test(start_paused = true)]
    async fn offline_head_blocks_the_queue() {
        let f = fixture(8);
        let offline = ParticipantId::new();
        let online = online_participant(&f.directory, "online");
        f.queue.add(offline);
        f.queue.add(online);

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(f.queue.len(), 2);
        assert!(!f.session.read().await.contains(online));

        f.queue.remove(offline);
        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert!(f.session.read().await.contains(online));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_queue_stops_promotion() {
        let f = fixture(8);
        let id = online_participant(&f.directory, "late");
        f.queue.add(id);

        let session = f.session.clone();
        drop(f.queue);

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(!session.read().await.contains(id));
    }
}
