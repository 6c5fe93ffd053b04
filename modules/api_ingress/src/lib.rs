//! REST host module: owns the HTTP router assembled by the other modules,
//! wraps it in the global middleware stack and serves it until shutdown.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use arc_swap::ArcSwap;
use async_trait::async_trait;
use axum::{middleware::from_fn, routing::get, Router};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

mod config;
pub mod request_id;
mod web;

pub use config::ApiIngressConfig;

pub const MODULE_NAME: &str = "api_ingress";

pub struct ApiIngress {
    config: ArcSwap<ApiIngressConfig>,
    // Finalized router from the REST phase, taken by `start`.
    final_router: Mutex<Option<Router>>,
    server: Mutex<Option<JoinHandle<Result<()>>>>,
}

impl Default for ApiIngress {
    fn default() -> Self {
        Self::new(ApiIngressConfig::default())
    }
}

/// Registration hook for the module registry.
pub fn register(b: &mut modkit::RegistryBuilder) {
    let m = Arc::new(ApiIngress::default());
    b.register_core_with_meta(MODULE_NAME, &[], m.clone());
    b.register_rest_host_with_meta(MODULE_NAME, m.clone());
    b.register_stateful_with_meta(MODULE_NAME, m);
}

impl ApiIngress {
    pub fn new(config: ApiIngressConfig) -> Self {
        Self {
            config: ArcSwap::from_pointee(config),
            final_router: Mutex::new(None),
            server: Mutex::new(None),
        }
    }

    pub fn get_config(&self) -> ApiIngressConfig {
        (**self.config.load()).clone()
    }

    /// Base router every deployment has, before module routes are merged in.
    pub fn base_router() -> Router {
        Router::new().route("/health", get(web::health_check))
    }

    /// Global middleware, innermost first: body limit, CORS, timeout,
    /// request id extension, trace span, request id propagation/generation.
    pub fn apply_middleware(router: Router, cfg: &ApiIngressConfig) -> Router {
        let x_request_id = request_id::header();

        let mut router = router
            .fallback(web::fallback)
            .layer(RequestBodyLimitLayer::new(cfg.body_limit_bytes));
        if cfg.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }
        if cfg.request_timeout_secs > 0 {
            router = router.layer(TimeoutLayer::new(Duration::from_secs(
                cfg.request_timeout_secs,
            )));
        }
        router
            .layer(from_fn(request_id::push_req_id_to_extensions))
            .layer(request_id::create_trace_layer())
            .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
            .layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId))
    }

    /// Bind and serve `router` until `cancel` fires.
    pub async fn serve(router: Router, bind_addr: &str, cancel: CancellationToken) -> Result<()> {
        let addr: SocketAddr = bind_addr
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid bind address '{bind_addr}': {e}"))?;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(%addr, "HTTP server bound");

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                cancel.cancelled().await;
                tracing::info!("HTTP server shutting down gracefully");
            })
            .await
            .map_err(|e| anyhow::anyhow!(e))
    }
}

#[async_trait]
impl modkit::Module for ApiIngress {
    async fn init(&self, ctx: &modkit::ModuleCtx) -> Result<()> {
        let cfg = ctx.module_config::<ApiIngressConfig>();
        tracing::debug!(bind_addr = %cfg.bind_addr, "api_ingress configured");
        self.config.store(Arc::new(cfg));
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl modkit::RestHostModule for ApiIngress {
    fn rest_prepare(&self, _ctx: &modkit::ModuleCtx, router: Router) -> Result<Router> {
        Ok(router.merge(Self::base_router()))
    }

    fn rest_finalize(&self, _ctx: &modkit::ModuleCtx, router: Router) -> Result<Router> {
        let router = Self::apply_middleware(router, &self.get_config());
        *self.final_router.lock() = Some(router.clone());
        Ok(router)
    }
}

#[async_trait]
impl modkit::StatefulModule for ApiIngress {
    async fn start(&self, cancel: CancellationToken) -> Result<()> {
        let cfg = self.get_config();
        let router = self
            .final_router
            .lock()
            .take()
            .unwrap_or_else(|| Self::apply_middleware(Self::base_router(), &cfg));
        let handle = tokio::spawn(async move { Self::serve(router, &cfg.bind_addr, cancel).await });
        *self.server.lock() = Some(handle);
        Ok(())
    }

    async fn stop(&self, _cancel: CancellationToken) -> Result<()> {
        let handle = self.server.lock().take();
        if let Some(handle) = handle {
            handle.await??;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modkit::{ModuleRegistry, RegistryBuilder};

    #[test]
    fn registers_as_rest_host_and_stateful() {
        let mut b = RegistryBuilder::default();
        register(&mut b);
        let reg = b.build_topo_sorted().unwrap();
        let entry = reg
            .modules()
            .iter()
            .find(|m| m.name == MODULE_NAME)
            .unwrap();
        assert!(entry.rest_host.is_some());
        assert!(entry.stateful.is_some());
        assert!(entry.core.as_any().downcast_ref::<ApiIngress>().is_some());
        assert!(ModuleRegistry::build(&[register]).is_ok());
    }

    #[test]
    fn default_config_is_local_and_bounded() {
        let cfg = ApiIngress::default().get_config();
        assert_eq!(cfg.bind_addr, "127.0.0.1:8087");
        assert_eq!(cfg.request_timeout_secs, 30);
        assert!(!cfg.cors_enabled);
    }
}
