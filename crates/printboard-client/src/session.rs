//! Client sync session: derive once, keep registered, poll the live list.

use crate::transport::SyncClient;
use crate::view::{ListingState, RegistrationState, View};
use printboard_core::{now_millis, ClientConfig, Fingerprint};
use printboard_identity::DerivationEngine;
use printboard_signals::{collect, CollectorOptions, Environment};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub refresh_interval: Duration,
    pub list_interval: Duration,
    pub initial_list_delay: Duration,
    /// Poll the debug view on this interval. `None` disables it.
    pub debug_interval: Option<Duration>,
    pub collector: CollectorOptions,
}

impl SessionOptions {
    pub fn from_config(config: &ClientConfig, debug: bool) -> Self {
        Self {
            refresh_interval: config.refresh_interval(),
            list_interval: config.list_interval(),
            initial_list_delay: config.initial_list_delay(),
            debug_interval: debug.then(|| config.debug_interval()),
            collector: CollectorOptions::default(),
        }
    }
}

pub struct SyncSession {
    client: SyncClient,
    engine: DerivationEngine,
    options: SessionOptions,
}

impl SyncSession {
    pub fn new(client: SyncClient, engine: DerivationEngine, options: SessionOptions) -> Self {
        Self {
            client,
            engine,
            options,
        }
    }

    /// Start the session on the current runtime. Every timer it owns stops
    /// when the handle is shut down or dropped.
    pub fn spawn(self, env: Arc<dyn Environment>) -> SessionHandle {
        let (tx, rx) = watch::channel(View::default());
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let task = tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => debug!("session cancelled"),
                _ = self.run(env, tx) => {}
            }
        });

        SessionHandle {
            view: rx,
            cancel: cancel.clone(),
            task: Some(task),
            _guard: cancel.drop_guard(),
        }
    }

    async fn run(self, env: Arc<dyn Environment>, view: watch::Sender<View>) {
        view.send_modify(|v| v.registration = RegistrationState::Deriving);

        let collected = collect(env.as_ref(), &self.options.collector).await;
        if !collected.failures.is_empty() {
            debug!(failures = collected.failures.len(), "some signals unavailable");
        }

        let own = match self.engine.derive(&collected.signals) {
            Ok(fp) => fp,
            Err(e) => {
                error!("Failed to derive fingerprint: {}", e);
                view.send_modify(|v| {
                    v.registration = RegistrationState::Idle;
                    v.set_advisory(format!("Failed to derive fingerprint: {}", e));
                });
                return;
            }
        };
        info!(id = %own.short_id(), moniker = %own.moniker, emoji = %own.emoji, "fingerprint derived");
        view.send_modify(|v| v.set_own(own.clone()));

        tokio::join!(
            self.refresh_loop(&own, &view),
            self.list_loop(&view),
            self.debug_loop(&view),
        );
    }

    /// Register immediately, then re-register on every tick.
    async fn refresh_loop(&self, own: &Fingerprint, view: &watch::Sender<View>) {
        let mut ticker = interval(self.options.refresh_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            view.send_modify(|v| {
                v.registration = match v.registration {
                    RegistrationState::Registered => RegistrationState::Refreshing,
                    _ => RegistrationState::Registering,
                }
            });

            let outgoing = own.clone().with_timestamp(now_millis());
            match self.client.register(&outgoing).await {
                Ok(response) => {
                    debug!(count = response.count, storage = %response.storage_type, "registered");
                    view.send_modify(|v| v.apply_registered(&response, now_millis()));
                }
                Err(e) => {
                    warn!("Error registering fingerprint: {}", e);
                    view.send_modify(|v| v.apply_register_error(&e));
                }
            }
        }
    }

    async fn list_loop(&self, view: &watch::Sender<View>) {
        let start = Instant::now() + self.options.initial_list_delay;
        let mut ticker = interval_at(start, self.options.list_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            view.send_modify(|v| v.listing = ListingState::Listing);

            match self.client.list().await {
                Ok(response) => {
                    debug!(live = response.fingerprints.len(), "listed");
                    view.send_modify(|v| v.apply_list(response, now_millis()));
                }
                Err(e) => {
                    warn!("Error fetching fingerprints: {}", e);
                    view.send_modify(|v| v.apply_list_error(&e));
                }
            }
        }
    }

    async fn debug_loop(&self, view: &watch::Sender<View>) {
        let Some(period) = self.options.debug_interval else {
            return;
        };
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            match self.client.debug().await {
                Ok(response) => view.send_modify(|v| v.apply_debug(response)),
                Err(e) => warn!("Error fetching debug info: {}", e),
            }
        }
    }
}

/// Owner of a running session. Dropping it cancels the session.
pub struct SessionHandle {
    view: watch::Receiver<View>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
    _guard: DropGuard,
}

impl SessionHandle {
    pub fn view(&self) -> View {
        self.view.borrow().clone()
    }

    /// Receiver that wakes on every view change.
    pub fn subscribe(&self) -> watch::Receiver<View> {
        self.view.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |t| t.is_finished())
    }

    /// Cancel every timer and wait for the session task to exit.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!("session task failed: {}", e);
            }
        }
    }
}
