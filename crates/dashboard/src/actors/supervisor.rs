use std::{collections::HashMap, future::Future, time::Duration};
use tracing::{error, info, warn};

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{self, Instant},
};
use uuid::Uuid;

use common::actors::{Actor, ActorType, ControlMessage};

pub type ActorFactory = Box<dyn Fn() -> Box<dyn Actor> + Send + Sync>;

const CHECK_EVERY: Duration = Duration::from_secs(1);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Keeps the background actors alive: an actor that stops sending heartbeats,
/// or whose `run` returns an error, is aborted and rebuilt from its factory
/// on the next check.
pub struct Supervisor {
    actor_factories: HashMap<ActorType, ActorFactory>,
    pulses: HashMap<ActorType, Instant>,
    handles: HashMap<ActorType, JoinHandle<()>>,
    ids: HashMap<Uuid, ActorType>,
    crashed: Vec<ActorType>,
    heartbeat_timeout: Duration,
    control_tx: mpsc::Sender<ControlMessage>,
    control_rx: Option<mpsc::Receiver<ControlMessage>>,
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl Supervisor {
    pub fn new() -> Self {
        let (control_tx, control_rx) = mpsc::channel::<ControlMessage>(512);
        Self {
            actor_factories: HashMap::new(),
            pulses: HashMap::new(),
            handles: HashMap::new(),
            ids: HashMap::new(),
            crashed: Vec::new(),
            heartbeat_timeout: DEFAULT_TIMEOUT,
            control_tx,
            control_rx: Some(control_rx),
        }
    }

    pub fn with_heartbeat_timeout(mut self, timeout: Duration) -> Self {
        self.heartbeat_timeout = timeout;
        self
    }

    pub fn register_actor(&mut self, actor_type: ActorType, factory: ActorFactory) {
        self.actor_factories.insert(actor_type, factory);
    }

    /// Runs every registered actor until `shutdown` resolves, then aborts them all.
    pub async fn run_until<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let Some(mut control_rx) = self.control_rx.take() else {
            error!("Supervisor is already running");
            return;
        };
        let mut check_interval = time::interval(CHECK_EVERY);
        tokio::pin!(shutdown);

        let actors: Vec<ActorType> = self.actor_factories.keys().copied().collect();
        actors.into_iter().for_each(|actor| self.spawn_actor(actor));

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Supervisor stopping {} actors", self.handles.len());
                    break;
                }

                Some(msg) = control_rx.recv() => self.handle_message(msg),

                _ = check_interval.tick() => self.restart_dead(),
            }
        }

        for (_, handle) in self.handles.drain() {
            handle.abort();
        }
        self.pulses.clear();
        self.ids.clear();
        self.control_rx = Some(control_rx);
    }

    fn handle_message(&mut self, msg: ControlMessage) {
        match msg {
            ControlMessage::Heartbeat(id) => {
                // Pulses from an instance that was already replaced are ignored.
                if let Some(actor_type) = self.ids.get(&id) {
                    self.pulses.insert(*actor_type, Instant::now());
                }
            }
            ControlMessage::Shutdown(id) => {
                if let Some(actor_type) = self.ids.remove(&id) {
                    warn!("{:?} is shutting down gracefully.", actor_type);
                    self.pulses.remove(&actor_type);
                    if let Some(handle) = self.handles.remove(&actor_type) {
                        handle.abort();
                    }
                }
            }
            ControlMessage::Error(id, error_msg) => {
                if let Some(actor_type) = self.ids.remove(&id) {
                    error!("Actor {:?} reported error: {}", actor_type, error_msg);
                    self.pulses.remove(&actor_type);
                    self.crashed.push(actor_type);
                }
            }
        }
    }

    fn restart_dead(&mut self) {
        let dead_timeout = Instant::now()
            .checked_sub(self.heartbeat_timeout)
            .unwrap_or_else(Instant::now);

        let mut dead_actors = std::mem::take(&mut self.crashed);
        for (key, &value) in self.pulses.iter() {
            if value < dead_timeout {
                warn!("{:?} is unresponsive!", key);
                dead_actors.push(*key);
            }
        }

        dead_actors.dedup();
        dead_actors.into_iter().for_each(|actor| self.spawn_actor(actor));
    }

    fn spawn_actor(&mut self, actor_type: ActorType) {
        let Some(factory) = self.actor_factories.get(&actor_type) else {
            return;
        };
        if let Some(old) = self.handles.remove(&actor_type) {
            old.abort();
        }
        self.ids.retain(|_, t| *t != actor_type);

        let mut new_actor = factory();
        let id = new_actor.id();
        info!("Starting {:?} ({})", new_actor.name(), id);
        let tx = self.control_tx.clone();
        let new_actor_handle = tokio::spawn(async move {
            if let Err(e) = new_actor.run(tx.clone()).await {
                error!("Actor {:?} crashed: {}", actor_type, e);
                let _ = tx.send(ControlMessage::Error(id, e.to_string())).await;
            }
        });

        self.ids.insert(id, actor_type);
        self.handles.insert(actor_type, new_actor_handle);
        self.pulses.insert(actor_type, Instant::now());
    }
}
