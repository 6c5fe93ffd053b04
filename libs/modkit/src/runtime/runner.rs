//! ModKit runtime runner.
//!
//! One stable `ModuleCtx` is built up front and reused across all phases
//! (init → db → rest → start → wait → stop). Shutdown is driven by OS signals,
//! an external `CancellationToken`, or an arbitrary future.

use crate::client_hub::ClientHub;
use crate::context::{ConfigProvider, ModuleCtxBuilder};
use crate::registry::{ModuleRegistry, Registrator};
use crate::runtime::shutdown;
use sea_orm::DatabaseConnection;
use std::{future::Future, pin::Pin, sync::Arc};
use tokio_util::sync::CancellationToken;

/// How the runtime provides a database to modules.
pub enum DbOptions {
    /// `ModuleCtx::db()` is `None`; the db phase is skipped.
    None,
    /// An already connected pool shared by every module.
    Connection(DatabaseConnection),
}

/// How the runtime decides when to stop.
pub enum ShutdownOptions {
    /// Listen for OS signals (Ctrl+C / SIGTERM).
    Signals,
    /// An external `CancellationToken` controls the lifecycle.
    Token(CancellationToken),
    /// Shutdown starts when this future completes.
    Future(Pin<Box<dyn Future<Output = ()> + Send>>),
}

pub struct RunOptions {
    /// Provider of module config sections (raw JSON by module name).
    pub modules_cfg: Arc<dyn ConfigProvider>,
    pub db: DbOptions,
    pub shutdown: ShutdownOptions,
    /// Registration functions of the linked modules.
    pub modules: Vec<Registrator>,
    /// Hub shared with the caller; modules publish their clients here.
    pub client_hub: Arc<ClientHub>,
}

/// Full cycle: init → db → rest (sync) → start → wait → stop.
pub async fn run(opts: RunOptions) -> anyhow::Result<()> {
    let cancel = match &opts.shutdown {
        ShutdownOptions::Token(t) => t.clone(),
        _ => CancellationToken::new(),
    };

    match opts.shutdown {
        ShutdownOptions::Signals => {
            let c = cancel.clone();
            tokio::spawn(async move {
                if let Err(e) = shutdown::wait_for_shutdown().await {
                    tracing::warn!(error = %e, "shutdown: signal waiter failed; falling back to ctrl_c()");
                    let _ = tokio::signal::ctrl_c().await;
                }
                tracing::info!("shutdown: signal received");
                c.cancel();
            });
        }
        ShutdownOptions::Future(waiter) => {
            let c = cancel.clone();
            tokio::spawn(async move {
                waiter.await;
                tracing::info!("shutdown: external future completed");
                c.cancel();
            });
        }
        ShutdownOptions::Token(_) => {
            tracing::debug!("shutdown: external token controls lifecycle");
        }
    }

    let registry = ModuleRegistry::build(&opts.modules)?;

    let mut ctx_builder = ModuleCtxBuilder::new(cancel.clone())
        .with_client_hub(opts.client_hub.clone())
        .with_config_provider(opts.modules_cfg.clone());
    let db = match opts.db {
        DbOptions::Connection(conn) => {
            ctx_builder = ctx_builder.with_db(conn.clone());
            Some(conn)
        }
        DbOptions::None => None,
    };
    let base_ctx = ctx_builder.build();

    tracing::info!("Phase: init");
    registry.run_init_phase(&base_ctx).await?;

    if let Some(db) = &db {
        tracing::info!("Phase: db");
        registry.run_db_phase(db).await?;
    }

    tracing::info!("Phase: rest");
    let _ = registry.run_rest_phase(&base_ctx, axum::Router::new())?;

    tracing::info!("Phase: start");
    registry.run_start_phase(cancel.clone()).await?;

    cancel.cancelled().await;

    tracing::info!("Phase: stop");
    registry.run_stop_phase(cancel).await?;
    Ok(())
}
