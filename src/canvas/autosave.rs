//! Debounced auto-save for a plan's canvas.
//!
//! `AutoSaver` owns a background task. Views hand it the element collection
//! whenever it changes; the task compares the serialised collection with the
//! last successfully persisted one, arms a trailing debounce timer and writes
//! the whole collection once the timer runs out undisturbed.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use super::CanvasElement;
use crate::store::CanvasStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AutoSaveConfig {
    pub debounce: Duration,
    /// How long `Saved` is shown before falling back to `Idle`
    pub saved_display: Duration,
}

impl Default for AutoSaveConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(1200),
            saved_display: Duration::from_millis(2500),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Saved,
    Error,
}

impl SaveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaveStatus::Idle => "idle",
            SaveStatus::Saving => "saving",
            SaveStatus::Saved => "saved",
            SaveStatus::Error => "error",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SaveState {
    pub status: SaveStatus,
    pub error: Option<String>,
}

impl SaveState {
    fn with_status(status: SaveStatus) -> Self {
        Self {
            status,
            error: None,
        }
    }

    fn failed(message: String) -> Self {
        Self {
            status: SaveStatus::Error,
            error: Some(message),
        }
    }
}

enum AutoSaveCommand {
    Observe(Vec<CanvasElement>),
    ChangePlan {
        plan_id: i32,
        baseline: Vec<CanvasElement>,
        response: oneshot::Sender<()>,
    },
    Shutdown {
        response: oneshot::Sender<()>,
    },
}

/// Handle to the auto-save task for one canvas view.
///
/// Dropping the handle stops the task and discards any pending write.
pub struct AutoSaver {
    command_tx: mpsc::Sender<AutoSaveCommand>,
    state_rx: watch::Receiver<SaveState>,
    task_handle: tokio::task::JoinHandle<()>,
}

impl AutoSaver {
    /// Starts auto-saving `plan_id`. `baseline` is the collection as loaded,
    /// which counts as already persisted.
    pub fn spawn(
        store: Arc<dyn CanvasStore>,
        plan_id: i32,
        baseline: &[CanvasElement],
        config: AutoSaveConfig,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::channel(256);
        let (state_tx, state_rx) = watch::channel(SaveState::default());
        let baseline = serialise(baseline).unwrap_or_default();

        let task_handle = tokio::spawn(async move {
            let task = AutoSaveTask {
                store,
                plan_id,
                config,
                baseline,
                pending: None,
                idle_at: None,
                state_tx,
            };
            task.run(command_rx).await;
        });

        debug!("AutoSaver spawned for plan {}", plan_id);

        Self {
            command_tx,
            state_rx,
            task_handle,
        }
    }

    /// Reports the current element collection.
    pub async fn observe(&self, elements: &[CanvasElement]) {
        let _ = self
            .command_tx
            .send(AutoSaveCommand::Observe(elements.to_vec()))
            .await;
    }

    pub fn state(&self) -> SaveState {
        self.state_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SaveState> {
        self.state_rx.clone()
    }

    /// Switches to another plan, dropping any write still waiting on the
    /// debounce timer.
    pub async fn change_plan(&self, plan_id: i32, baseline: &[CanvasElement]) {
        let (tx, rx) = oneshot::channel();
        if self
            .command_tx
            .send(AutoSaveCommand::ChangePlan {
                plan_id,
                baseline: baseline.to_vec(),
                response: tx,
            })
            .await
            .is_ok()
        {
            let _ = rx.await;
        }
    }

    /// Stops the task. A pending debounced write is discarded.
    pub async fn shutdown(self) {
        let (tx, rx) = oneshot::channel();
        let _ = self
            .command_tx
            .send(AutoSaveCommand::Shutdown { response: tx })
            .await;
        let _ = rx.await;
        let _ = self.task_handle.await;
    }
}

fn serialise(elements: &[CanvasElement]) -> Result<String, serde_json::Error> {
    serde_json::to_string(elements)
}

struct PendingWrite {
    serialised: String,
    elements: Vec<CanvasElement>,
    deadline: Instant,
}

struct AutoSaveTask {
    store: Arc<dyn CanvasStore>,
    plan_id: i32,
    config: AutoSaveConfig,
    /// Serialised collection last written successfully
    baseline: String,
    pending: Option<PendingWrite>,
    idle_at: Option<Instant>,
    state_tx: watch::Sender<SaveState>,
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}

impl AutoSaveTask {
    async fn run(mut self, mut command_rx: mpsc::Receiver<AutoSaveCommand>) {
        loop {
            let write_at = self.pending.as_ref().map(|pending| pending.deadline);
            let idle_at = self.idle_at;

            tokio::select! {
                command = command_rx.recv() => {
                    let Some(command) = command else {
                        break;
                    };
                    match command {
                        AutoSaveCommand::Observe(elements) => self.observe(elements),
                        AutoSaveCommand::ChangePlan { plan_id, baseline, response } => {
                            self.change_plan(plan_id, &baseline);
                            let _ = response.send(());
                        }
                        AutoSaveCommand::Shutdown { response } => {
                            if self.pending.take().is_some() {
                                debug!("Discarding pending canvas write for plan {}", self.plan_id);
                            }
                            let _ = response.send(());
                            break;
                        }
                    }
                }
                _ = wait_until(write_at), if write_at.is_some() => self.flush().await,
                _ = wait_until(idle_at), if idle_at.is_some() => {
                    self.idle_at = None;
                    if self.state_tx.borrow().status == SaveStatus::Saved {
                        self.set_state(SaveState::with_status(SaveStatus::Idle));
                    }
                }
            }
        }

        debug!("AutoSaver stopped for plan {}", self.plan_id);
    }

    fn set_state(&self, state: SaveState) {
        self.state_tx.send_replace(state);
    }

    fn observe(&mut self, elements: Vec<CanvasElement>) {
        let serialised = match serialise(&elements) {
            Ok(serialised) => serialised,
            Err(e) => {
                self.pending = None;
                self.set_state(SaveState::failed(format!("Failed to encode canvas: {}", e)));
                return;
            }
        };

        if serialised == self.baseline {
            // Edited back to what is already stored
            if self.pending.take().is_some() {
                self.set_state(SaveState::with_status(SaveStatus::Idle));
            }
            return;
        }

        if let Some(pending) = &mut self.pending {
            if pending.serialised == serialised {
                // Same content as the queued write; keep its deadline
                pending.elements = elements;
                return;
            }
        }

        self.pending = Some(PendingWrite {
            serialised,
            elements,
            deadline: Instant::now() + self.config.debounce,
        });
        self.idle_at = None;
        self.set_state(SaveState::with_status(SaveStatus::Saving));
    }

    async fn flush(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };

        match self.store.save_canvas(self.plan_id, &pending.elements).await {
            Ok(()) => {
                info!(
                    "Saved {} canvas elements for plan {}",
                    pending.elements.len(),
                    self.plan_id
                );
                self.baseline = pending.serialised;
                self.idle_at = Some(Instant::now() + self.config.saved_display);
                self.set_state(SaveState::with_status(SaveStatus::Saved));
            }
            Err(e) => {
                warn!("Canvas save failed for plan {}: {}", self.plan_id, e);
                self.set_state(SaveState::failed(format!("Failed to save canvas: {}", e)));
            }
        }
    }

    fn change_plan(&mut self, plan_id: i32, baseline: &[CanvasElement]) {
        if self.pending.take().is_some() {
            debug!("Discarding pending canvas write for plan {}", self.plan_id);
        }
        self.plan_id = plan_id;
        self.baseline = serialise(baseline).unwrap_or_default();
        self.idle_at = None;
        self.set_state(SaveState::default());
    }
}
