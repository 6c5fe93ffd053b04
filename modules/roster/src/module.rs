use std::sync::Arc;

use arc_swap::{ArcSwap, ArcSwapOption};
use async_trait::async_trait;
use modkit::{DbModule, Module, ModuleCtx, RestfulModule, StatefulModule};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::api::rest::routes;
use crate::config::RosterConfig;
use crate::contract::client::{DocumentStore, IdentityProvider};
use crate::domain::documents::DocumentService;
use crate::domain::events::StudentDomainEvent;
use crate::domain::identity::{IdentityConfig, IdentityService};
use crate::gateways::local::{LocalDocumentStore, LocalIdentityProvider};
use crate::infra::events::BroadcastEvents;
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::sea_orm_repo::{SeaOrmAccountsRepository, SeaOrmDocumentsRepository};

pub const MODULE_NAME: &str = "roster";

// Ten years; keeps `now + ttl` far from the chrono range limits.
const MAX_SESSION_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Student roster module: identity provider, document store and their REST API.
#[derive(Default)]
pub struct Roster {
    config: ArcSwap<RosterConfig>,
    identity: ArcSwapOption<IdentityService>,
    documents: ArcSwapOption<DocumentService>,
}

/// Registration hook for the module registry.
pub fn register(b: &mut modkit::RegistryBuilder) {
    let m = Arc::new(Roster::default());
    b.register_core_with_meta(MODULE_NAME, &["api_ingress"], m.clone());
    b.register_db_with_meta(MODULE_NAME, m.clone());
    b.register_rest_with_meta(MODULE_NAME, m.clone());
    b.register_stateful_with_meta(MODULE_NAME, m);
}

/// Wire the domain services on top of `db`.
pub fn build_services(
    db: DatabaseConnection,
    cfg: &RosterConfig,
) -> (Arc<IdentityService>, Arc<DocumentService>) {
    let identity = Arc::new(IdentityService::new(
        Arc::new(SeaOrmAccountsRepository::new(db.clone())),
        IdentityConfig {
            min_password_length: cfg.min_password_length,
            session_ttl: chrono::Duration::seconds(
                cfg.session_ttl_secs.min(MAX_SESSION_TTL_SECS) as i64,
            ),
        },
    ));
    let events = Arc::new(BroadcastEvents::<StudentDomainEvent>::new(cfg.event_capacity));
    let documents = Arc::new(DocumentService::new(
        identity.clone(),
        Arc::new(SeaOrmDocumentsRepository::new(db)),
        events.clone(),
        events,
    ));
    (identity, documents)
}

impl Roster {
    fn services(&self) -> anyhow::Result<(Arc<IdentityService>, Arc<DocumentService>)> {
        let identity = self
            .identity
            .load_full()
            .ok_or_else(|| anyhow::anyhow!("Service not initialized"))?;
        let documents = self
            .documents
            .load_full()
            .ok_or_else(|| anyhow::anyhow!("Service not initialized"))?;
        Ok((identity, documents))
    }
}

#[async_trait]
impl Module for Roster {
    async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()> {
        info!("Initializing roster module");

        let cfg: RosterConfig = ctx.module_config();
        debug!(
            min_password_length = cfg.min_password_length,
            session_ttl_secs = cfg.session_ttl_secs,
            event_capacity = cfg.event_capacity,
            bootstrap_admin = cfg.bootstrap_admin.is_some(),
            "Loaded roster config"
        );

        let db = ctx.db_required()?;
        let (identity, documents) = build_services(db, &cfg);
        self.identity.store(Some(identity.clone()));
        self.documents.store(Some(documents.clone()));
        self.config.store(Arc::new(cfg));

        // In-process clients for other modules and embedded front-ends
        let hub = ctx.client_hub();
        let identity_client: Arc<dyn IdentityProvider> =
            Arc::new(LocalIdentityProvider::new(identity));
        let store_client: Arc<dyn DocumentStore> = Arc::new(LocalDocumentStore::new(documents));
        hub.register::<dyn IdentityProvider>(identity_client);
        hub.register::<dyn DocumentStore>(store_client);
        info!("Roster clients exposed to ClientHub");
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[async_trait]
impl DbModule for Roster {
    async fn migrate(&self, db: &DatabaseConnection) -> anyhow::Result<()> {
        info!("Running roster database migrations");
        Migrator::up(db, None).await?;
        info!("Roster database migrations completed successfully");
        Ok(())
    }
}

impl RestfulModule for Roster {
    fn register_rest(&self, _ctx: &ModuleCtx, router: axum::Router) -> anyhow::Result<axum::Router> {
        info!("Registering roster REST routes");
        let (identity, documents) = self.services()?;
        let router = routes::register_routes(router, identity, documents)?;
        info!("Roster REST routes registered successfully");
        Ok(router)
    }
}

#[async_trait]
impl StatefulModule for Roster {
    /// Provision the configured admin and drop expired sessions.
    async fn start(&self, _cancel: CancellationToken) -> anyhow::Result<()> {
        let (identity, documents) = self.services()?;
        identity.purge_expired_sessions().await?;

        let cfg = self.config.load_full();
        if let Some(admin) = &cfg.bootstrap_admin {
            let user = identity.ensure_account(&admin.email, &admin.password).await?;
            documents.grant_admin(user.uid, &user.email).await?;
            info!(uid = %user.uid, email = %user.email, "bootstrap admin ready");
        }
        Ok(())
    }

    async fn stop(&self, _cancel: CancellationToken) -> anyhow::Result<()> {
        debug!("roster module stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modkit::RegistryBuilder;

    #[test]
    fn registers_all_capabilities_after_api_ingress() {
        let mut b = RegistryBuilder::default();
        api_ingress::register(&mut b);
        register(&mut b);
        let reg = b.build_topo_sorted().unwrap();
        let names: Vec<_> = reg.modules().iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["api_ingress", MODULE_NAME]);

        let entry = reg.modules().iter().find(|m| m.name == MODULE_NAME).unwrap();
        assert!(entry.db.is_some());
        assert!(entry.rest.is_some());
        assert!(entry.stateful.is_some());
    }

    #[test]
    fn rest_before_init_is_an_error() {
        let m = Roster::default();
        let ctx = modkit::ModuleCtxBuilder::new(CancellationToken::new()).build();
        assert!(m.register_rest(&ctx, axum::Router::new()).is_err());
    }
}
