use std::{sync::Arc, time::Duration};

use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::debug;

use crate::{
    config::Config,
    core::store::{InstrumentStore, StoreError},
    image::{self, ImageLookup},
    instrument::{InstrumentDraft, InstrumentPatch, InstrumentRecord},
    types::{ImageRef, InstrumentId},
};

use super::events::InstrumentEvent;

/// Errors returned by [`SessionHandle`] requests.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// Store rejected the request.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Session loop has stopped.
    #[error("session channel closed")]
    ChannelClosed,
}

/// Session loop settings.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Bound of the command channel.
    pub command_queue_bound: usize,
    /// Capacity of the event broadcast channel.
    pub event_capacity: usize,
    /// Upper bound on one image lookup.
    pub image_timeout: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            command_queue_bound: 256,
            event_capacity: 1024,
            image_timeout: Duration::from_secs(5),
        }
    }
}

impl From<&Config> for RuntimeConfig {
    fn from(config: &Config) -> Self {
        Self {
            command_queue_bound: config.session.command_queue_bound,
            event_capacity: config.session.event_capacity,
            image_timeout: config.image_timeout(),
        }
    }
}

/// Cloneable handle to the task that owns one session's store.
#[derive(Debug)]
pub struct SessionHandle {
    cmd_tx: mpsc::Sender<Command>,
    events_tx: broadcast::Sender<InstrumentEvent>,
}

impl Clone for SessionHandle {
    fn clone(&self) -> Self {
        Self {
            cmd_tx: self.cmd_tx.clone(),
            events_tx: self.events_tx.clone(),
        }
    }
}

#[derive(Debug)]
enum Command {
    List {
        resp: oneshot::Sender<Vec<InstrumentRecord>>,
    },
    Search {
        query: String,
        resp: oneshot::Sender<Vec<InstrumentRecord>>,
    },
    Get {
        id: InstrumentId,
        resp: oneshot::Sender<Option<InstrumentRecord>>,
    },
    GetByName {
        name: String,
        resp: oneshot::Sender<Result<InstrumentRecord, RuntimeError>>,
    },
    Insert {
        draft: InstrumentDraft,
        resp: oneshot::Sender<Result<InstrumentId, RuntimeError>>,
    },
    Update {
        id: InstrumentId,
        patch: InstrumentPatch,
        resp: oneshot::Sender<Result<(), RuntimeError>>,
    },
    UpdateByName {
        name: String,
        patch: InstrumentPatch,
        resp: oneshot::Sender<Result<InstrumentId, RuntimeError>>,
    },
    FetchImage {
        id: InstrumentId,
        resp: oneshot::Sender<Result<ImageRef, RuntimeError>>,
    },
    FetchImageByName {
        name: String,
        resp: oneshot::Sender<Result<ImageRef, RuntimeError>>,
    },
    Shutdown {
        resp: oneshot::Sender<()>,
    },
}

/// Spawns the task owning `store` and returns a handle to it.
pub fn spawn_session(
    store: InstrumentStore,
    lookup: Arc<dyn ImageLookup>,
    config: RuntimeConfig,
) -> SessionHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(config.command_queue_bound);
    let (events_tx, _) = broadcast::channel::<InstrumentEvent>(config.event_capacity);

    let events_tx_loop = events_tx.clone();

    tokio::spawn(async move {
        let mut store = store;
        while let Some(cmd) = cmd_rx.recv().await {
            let done = handle_command(cmd, &mut store, lookup.as_ref(), &events_tx_loop, &config).await;
            if done {
                break;
            }
        }
        debug!(records = store.len(), "session loop stopped");
    });

    SessionHandle { cmd_tx, events_tx }
}

impl SessionHandle {
    /// New receiver for session events.
    pub fn subscribe(&self) -> broadcast::Receiver<InstrumentEvent> {
        self.events_tx.subscribe()
    }

    /// Every record in collection order.
    pub async fn list(&self) -> Result<Vec<InstrumentRecord>, RuntimeError> {
        self.request(|resp| Command::List { resp }).await
    }

    /// Case-insensitive name search.
    pub async fn search(&self, query: impl Into<String>) -> Result<Vec<InstrumentRecord>, RuntimeError> {
        let query = query.into();
        self.request(|resp| Command::Search { query, resp }).await
    }

    /// Record by id.
    pub async fn get(&self, id: InstrumentId) -> Result<Option<InstrumentRecord>, RuntimeError> {
        self.request(|resp| Command::Get { id, resp }).await
    }

    /// First record named exactly `name`.
    pub async fn get_by_name(&self, name: impl Into<String>) -> Result<InstrumentRecord, RuntimeError> {
        let name = name.into();
        self.request(|resp| Command::GetByName { name, resp }).await?
    }

    /// Inserts a new record.
    pub async fn insert(&self, draft: InstrumentDraft) -> Result<InstrumentId, RuntimeError> {
        self.request(|resp| Command::Insert { draft, resp }).await?
    }

    /// Applies `patch` to record `id`.
    pub async fn update(&self, id: InstrumentId, patch: InstrumentPatch) -> Result<(), RuntimeError> {
        self.request(|resp| Command::Update { id, patch, resp }).await?
    }

    /// Applies `patch` to the first record named `name`.
    pub async fn update_by_name(
        &self,
        name: impl Into<String>,
        patch: InstrumentPatch,
    ) -> Result<InstrumentId, RuntimeError> {
        let name = name.into();
        self.request(|resp| Command::UpdateByName { name, patch, resp })
            .await?
    }

    /// Cached image for `id`, looking one up first if needed.
    pub async fn fetch_image(&self, id: InstrumentId) -> Result<ImageRef, RuntimeError> {
        self.request(|resp| Command::FetchImage { id, resp }).await?
    }

    /// [`Self::fetch_image`] addressed by name.
    pub async fn fetch_image_by_name(&self, name: impl Into<String>) -> Result<ImageRef, RuntimeError> {
        let name = name.into();
        self.request(|resp| Command::FetchImageByName { name, resp })
            .await?
    }

    /// Stops the session loop.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        self.request(|resp| Command::Shutdown { resp }).await
    }

    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(make(tx))
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }
}

async fn handle_command(
    cmd: Command,
    store: &mut InstrumentStore,
    lookup: &dyn ImageLookup,
    events_tx: &broadcast::Sender<InstrumentEvent>,
    config: &RuntimeConfig,
) -> bool {
    match cmd {
        Command::List { resp } => {
            let _ = resp.send(store.records().cloned().collect());
        }
        Command::Search { query, resp } => {
            let _ = resp.send(store.search_cloned(&query));
        }
        Command::Get { id, resp } => {
            let _ = resp.send(store.get_cloned(id));
        }
        Command::GetByName { name, resp } => {
            let res = store
                .get_by_name(&name)
                .cloned()
                .map_err(RuntimeError::from);
            let _ = resp.send(res);
        }
        Command::Insert { draft, resp } => {
            let res = store.insert(draft).map_err(RuntimeError::from);
            if let Ok(id) = res {
                let _ = events_tx.send(InstrumentEvent::Inserted { id });
            }
            let _ = resp.send(res);
        }
        Command::Update { id, patch, resp } => {
            let res = store.update(id, patch).map_err(RuntimeError::from);
            if res.is_ok() {
                let _ = events_tx.send(InstrumentEvent::Updated { id });
            }
            let _ = resp.send(res);
        }
        Command::UpdateByName { name, patch, resp } => {
            let res = store
                .update_by_name(&name, patch)
                .map_err(RuntimeError::from);
            if let Ok(id) = res {
                let _ = events_tx.send(InstrumentEvent::Updated { id });
            }
            let _ = resp.send(res);
        }
        Command::FetchImage { id, resp } => {
            let res = fetch_and_announce(store, id, lookup, events_tx, config).await;
            let _ = resp.send(res);
        }
        Command::FetchImageByName { name, resp } => {
            let res = match store.id_by_name(&name) {
                Ok(id) => fetch_and_announce(store, id, lookup, events_tx, config).await,
                Err(err) => Err(RuntimeError::from(err)),
            };
            let _ = resp.send(res);
        }
        Command::Shutdown { resp } => {
            let _ = resp.send(());
            return true;
        }
    }

    false
}

async fn fetch_and_announce(
    store: &mut InstrumentStore,
    id: InstrumentId,
    lookup: &dyn ImageLookup,
    events_tx: &broadcast::Sender<InstrumentEvent>,
    config: &RuntimeConfig,
) -> Result<ImageRef, RuntimeError> {
    let had_image = store.get(id).is_some_and(|rec| rec.image.is_some());
    let image = image::fetch_image_if_missing(store, id, lookup, config.image_timeout).await?;
    if !had_image {
        let _ = events_tx.send(InstrumentEvent::ImageCached {
            id,
            placeholder: image.is_placeholder(),
        });
    }
    Ok(image)
}
