//! The privileged client thread
//!
//! Live game state may only be read on one thread. [`ClientThread`] owns the
//! [`GameClient`] on a dedicated thread and feeds it work from a queue. Other
//! threads hand it a query and block on a one-shot reply channel until the
//! answer arrives or the timeout passes.

use parking_lot::Mutex;
use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle, ThreadId};
use std::time::Duration;

use crate::cache::{QuestStateLoader, SnapshotSource};
use crate::state::{GameClient, GameSnapshot, GameState, QuestId, QuestState, QuestVar};
use crate::{QuestEngineError, Result};

type Job<C> = Box<dyn FnOnce(&mut C) + Send>;

/// How long `shutdown` waits for queued work before detaching the thread
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// Handle to the thread that owns the live game client
pub struct ClientThread<C: GameClient> {
    sender: Mutex<Option<Sender<Job<C>>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
    finished: Mutex<Option<Receiver<()>>>,
    thread_id: ThreadId,
    timeout: Duration,
}

impl<C: GameClient> ClientThread<C> {
    /// Move `client` onto a new privileged thread
    pub fn spawn(client: C, timeout: Duration) -> Result<Self> {
        let (sender, receiver) = mpsc::channel::<Job<C>>();
        let (finished_tx, finished_rx) = mpsc::sync_channel::<()>(1);

        let handle = thread::Builder::new()
            .name("client-thread".to_string())
            .spawn(move || {
                let mut client = client;
                for job in receiver {
                    job(&mut client);
                }
                log::debug!("Client thread work queue closed");
                let _ = finished_tx.send(());
            })?;

        log::info!("Client thread started (timeout: {} ms)", timeout.as_millis());

        Ok(Self {
            sender: Mutex::new(Some(sender)),
            thread_id: handle.thread().id(),
            handle: Mutex::new(Some(handle)),
            finished: Mutex::new(Some(finished_rx)),
            timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether the calling thread is the privileged thread
    pub fn is_client_thread(&self) -> bool {
        thread::current().id() == self.thread_id
    }

    /// Queue work on the privileged thread without waiting for it
    ///
    /// A panicking job is logged and does not stop the thread.
    pub fn invoke<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce(&mut C) + Send + 'static,
    {
        self.submit(Box::new(move |client: &mut C| {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| job(client))) {
                log::error!("Job panicked on the client thread: {}", panic_message(&*payload));
            }
        }))
    }

    /// Run a query on the privileged thread and wait for its result
    pub fn call<T, F>(&self, query: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&C) -> T + Send + 'static,
    {
        if self.is_client_thread() {
            // the job queue is serviced by this very thread; waiting would hang
            return Err(QuestEngineError::ReentrantCall);
        }

        let (reply_tx, reply_rx) = mpsc::sync_channel(1);
        self.submit(Box::new(move |client: &mut C| {
            let result = panic::catch_unwind(AssertUnwindSafe(|| query(&*client)));
            let _ = reply_tx.send(result);
        }))?;

        match reply_rx.recv_timeout(self.timeout) {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(payload)) => Err(QuestEngineError::QueryPanicked(panic_message(&*payload))),
            Err(RecvTimeoutError::Timeout) => {
                Err(QuestEngineError::BridgeTimeout(self.timeout.as_millis() as u64))
            }
            Err(RecvTimeoutError::Disconnected) => Err(QuestEngineError::BridgeDisconnected),
        }
    }

    /// Run a query on the privileged thread, returning `default` on any failure
    pub fn run<T, F>(&self, query: F, default: T) -> T
    where
        T: Send + 'static,
        F: FnOnce(&C) -> T + Send + 'static,
    {
        match self.call(query) {
            Ok(value) => value,
            Err(e @ QuestEngineError::BridgeTimeout(_)) => {
                log::warn!("Error running operation on client thread: {}", e);
                default
            }
            Err(e) => {
                log::error!("Error running operation on client thread: {}", e);
                default
            }
        }
    }

    /// Current quest state, `NotStarted` if it cannot be read
    pub fn quest_state(&self, quest: &QuestId) -> QuestState {
        let quest = quest.clone();
        self.run(move |client| client.quest_state(&quest), QuestState::NotStarted)
    }

    /// Current value of a progress variable, `i32::MIN` if it cannot be read
    pub fn quest_var(&self, var: QuestVar) -> i32 {
        self.run(move |client| client.quest_var(var), i32::MIN)
    }

    /// Current login state, `default` if it cannot be read
    pub fn game_state(&self, default: GameState) -> GameState {
        self.run(|client| client.game_state(), default)
    }

    /// Full snapshot, empty if it cannot be read
    pub fn snapshot(&self) -> GameSnapshot {
        self.run(|client| client.snapshot(), GameSnapshot::default())
    }

    /// Stop the thread after it drains queued work
    ///
    /// Waits at most one second. A thread still busy after that is detached
    /// and left to finish on its own.
    pub fn shutdown(&self) {
        self.shutdown_within(SHUTDOWN_GRACE);
    }

    fn shutdown_within(&self, grace: Duration) {
        if self.sender.lock().take().is_none() {
            return;
        }

        if self.is_client_thread() {
            return;
        }

        let finished = self.finished.lock().take();
        let drained = match finished {
            Some(rx) => !matches!(rx.recv_timeout(grace), Err(RecvTimeoutError::Timeout)),
            None => true,
        };

        let handle = self.handle.lock().take();
        if !drained {
            log::warn!(
                "Client thread still busy after {} ms; detaching it",
                grace.as_millis()
            );
            return;
        }

        if let Some(handle) = handle {
            if handle.join().is_err() {
                log::error!("Client thread terminated abnormally");
            }
        }
        log::info!("Client thread stopped");
    }

    fn submit(&self, job: Job<C>) -> Result<()> {
        let sender = self.sender.lock();
        match sender.as_ref() {
            Some(tx) => tx.send(job).map_err(|_| QuestEngineError::BridgeDisconnected),
            None => Err(QuestEngineError::BridgeDisconnected),
        }
    }
}

impl<C: GameClient> Drop for ClientThread<C> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl<C: GameClient> QuestStateLoader for ClientThread<C> {
    fn load_state(&self, quest: &QuestId) -> Result<QuestState> {
        let quest = quest.clone();
        self.call(move |client| client.quest_state(&quest))
    }

    /// Read every state in one hop
    ///
    /// If the hop itself panics, each quest is retried on its own so a single
    /// bad quest cannot hide the others. Timeouts and a closed queue fail the
    /// whole batch.
    fn load_states(&self, quests: &[QuestId]) -> HashMap<QuestId, Result<QuestState>> {
        let batch = quests.to_vec();
        let bulk = self.call(move |client| {
            batch
                .into_iter()
                .map(|q| {
                    let state = client.quest_state(&q);
                    (q, state)
                })
                .collect::<HashMap<_, _>>()
        });

        match bulk {
            Ok(states) => states.into_iter().map(|(q, s)| (q, Ok(s))).collect(),
            Err(e) => {
                log::warn!("Bulk quest state load failed: {}", e);
                quests
                    .iter()
                    .map(|quest| {
                        let state = match &e {
                            QuestEngineError::BridgeTimeout(ms) => Err(QuestEngineError::BridgeTimeout(*ms)),
                            QuestEngineError::BridgeDisconnected => Err(QuestEngineError::BridgeDisconnected),
                            QuestEngineError::ReentrantCall => Err(QuestEngineError::ReentrantCall),
                            _ => self.load_state(quest),
                        };
                        (quest.clone(), state)
                    })
                    .collect()
            }
        }
    }
}

impl<C: GameClient> SnapshotSource for ClientThread<C> {
    fn load_snapshot(&self) -> Result<GameSnapshot> {
        self.call(|client| client.snapshot())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
