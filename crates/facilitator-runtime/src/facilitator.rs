//! # Facilitator Lifecycle
//!
//! ## Startup
//!
//! 1. Unlock both facilitator accounts (a locked account is fatal)
//! 2. Attach the reactive services
//! 3. Seed static rows and run one notification pass
//! 4. Spawn the dispatch loop
//! 5. Subscribe origin, then auxiliary
//! 6. Spawn the restart timer
//!
//! ## Restart
//!
//! Every `restart_interval_secs` both subscribers are torn down and opened
//! again, origin before auxiliary, one after the other. A failed resubscribe
//! is logged; the next tick tries again.
//!
//! ## Shutdown
//!
//! Stop the timer, unsubscribe (in-flight sweeps finish first), shut the
//! dispatch loop down after the queued batches and wait for it.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use fc_03_event_index::Subscriber;
use fc_04_dispatcher::{dispatch_channel, DispatchHandle, DispatchLoop};
use parking_lot::Mutex;
use shared_types::ChainSide;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::container::{ChainPorts, FacilitatorConfig, SubsystemContainer};
use crate::wiring::{attach_services, build_subscriber, seed_static_rows, AttachedServices};
use fc_02_storage::KeyValueStore;

/// The running facilitator.
pub struct Facilitator {
    container: Arc<SubsystemContainer>,
    services: AttachedServices,
    origin: Arc<Subscriber>,
    auxiliary: Arc<Subscriber>,
    dispatch: DispatchHandle,
    dispatch_loop: Mutex<Option<DispatchLoop>>,
    dispatch_task: Mutex<Option<JoinHandle<()>>>,
    restart_task: Mutex<Option<JoinHandle<()>>>,
    shutdown_tx: watch::Sender<bool>,
}

impl Facilitator {
    /// Builds the facilitator over `store` and the given endpoints.
    pub fn new(
        config: FacilitatorConfig,
        store: Arc<dyn KeyValueStore>,
        origin: ChainPorts,
        auxiliary: ChainPorts,
    ) -> Self {
        let capacity = config.index.dispatch_capacity;
        let container = Arc::new(SubsystemContainer::new(config, store, origin, auxiliary));
        let services = attach_services(&container);
        let (dispatch, dispatch_loop) = dispatch_channel(container.dispatcher.clone(), capacity);

        let sink = Arc::new(dispatch.clone());
        let origin = Arc::new(build_subscriber(&container, ChainSide::Origin, sink.clone()));
        let auxiliary = Arc::new(build_subscriber(&container, ChainSide::Auxiliary, sink));
        let (shutdown_tx, _) = watch::channel(false);

        Self {
            container,
            services,
            origin,
            auxiliary,
            dispatch,
            dispatch_loop: Mutex::new(Some(dispatch_loop)),
            dispatch_task: Mutex::new(None),
            restart_task: Mutex::new(None),
            shutdown_tx,
        }
    }

    /// Shared instances.
    pub fn container(&self) -> Arc<SubsystemContainer> {
        Arc::clone(&self.container)
    }

    /// The attached services.
    pub fn services(&self) -> &AttachedServices {
        &self.services
    }

    /// Subscriber of `side`.
    pub fn subscriber(&self, side: ChainSide) -> &Arc<Subscriber> {
        match side {
            ChainSide::Origin => &self.origin,
            ChainSide::Auxiliary => &self.auxiliary,
        }
    }

    /// Starts the facilitator. Fails on a locked account, a storage error
    /// while seeding, a subscription that cannot be opened, or a second call.
    pub async fn start(&self) -> Result<()> {
        let config = &self.container.config;
        info!("===========================================");
        info!("  Facilitator v{}", env!("CARGO_PKG_VERSION"));
        info!("  Auxiliary chain: {}", config.auxiliary_chain_id);
        info!("===========================================");

        let locked = self.container.unlock_accounts().await;
        ensure!(locked.is_empty(), "facilitator account locked on {locked:?}");

        let dispatch_loop = self
            .dispatch_loop
            .lock()
            .take()
            .context("facilitator already started")?;

        seed_static_rows(config, &self.container.repositories)
            .await
            .context("failed to seed static rows")?;
        let failures = self.container.repositories.notify().await;
        if failures > 0 {
            warn!(failures, "Startup notification pass had observer failures");
        }

        *self.dispatch_task.lock() = Some(tokio::spawn(dispatch_loop.run()));

        for subscriber in [&self.origin, &self.auxiliary] {
            subscriber
                .subscribe()
                .await
                .with_context(|| format!("failed to subscribe {}", subscriber.side()))?;
        }

        let interval = Duration::from_secs(config.index.restart_interval_secs);
        *self.restart_task.lock() = Some(tokio::spawn(restart_loop(
            interval,
            [self.origin.clone(), self.auxiliary.clone()],
            self.shutdown_tx.subscribe(),
        )));

        info!(
            origin_targets = self.origin.targets().len(),
            auxiliary_targets = self.auxiliary.targets().len(),
            "Facilitator running"
        );
        Ok(())
    }

    /// Re-opens both subscriptions now.
    pub async fn restart_subscriptions(&self) {
        restart(&[self.origin.clone(), self.auxiliary.clone()]).await;
    }

    /// Stops the facilitator. Safe to call more than once.
    pub async fn stop(&self) {
        info!("Initiating graceful shutdown...");
        self.shutdown_tx.send_replace(true);

        let restart_task = self.restart_task.lock().take();
        if let Some(task) = restart_task {
            if let Err(e) = task.await {
                error!(error = %e, "Restart task ended abnormally");
            }
        }

        self.origin.unsubscribe().await;
        self.auxiliary.unsubscribe().await;

        self.dispatch.shutdown().await;
        let dispatch_task = self.dispatch_task.lock().take();
        if let Some(task) = dispatch_task {
            if let Err(e) = task.await {
                error!(error = %e, "Dispatch loop ended abnormally");
            }
        }
        info!("Shutdown complete");
    }
}

async fn restart(subscribers: &[Arc<Subscriber>]) {
    for subscriber in subscribers {
        subscriber.unsubscribe().await;
        if let Err(e) = subscriber.subscribe().await {
            error!(side = %subscriber.side(), error = %e, "Resubscribe failed; retrying on next restart");
        }
    }
}

async fn restart_loop(
    interval: Duration,
    subscribers: [Arc<Subscriber>; 2],
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                info!("Restarting subscriptions");
                restart(&subscribers).await;
            }
            changed = shutdown.changed() => {
                let stopping = *shutdown.borrow();
                if changed.is_err() || stopping {
                    break;
                }
            }
        }
    }
}
