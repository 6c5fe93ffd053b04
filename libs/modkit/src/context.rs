use sea_orm::DatabaseConnection;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::client_hub::ClientHub;

/// Provider of module-specific configuration (raw JSON sections only).
pub trait ConfigProvider: Send + Sync {
    fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value>;
}

#[derive(Clone)]
pub struct ModuleCtx {
    db: Option<DatabaseConnection>,
    config_provider: Option<Arc<dyn ConfigProvider>>,
    client_hub: Arc<ClientHub>,
    cancellation_token: CancellationToken,
    module_name: Option<Arc<str>>,
}

pub struct ModuleCtxBuilder {
    inner: ModuleCtx,
}

impl ModuleCtxBuilder {
    pub fn new(token: CancellationToken) -> Self {
        Self {
            inner: ModuleCtx {
                db: None,
                config_provider: None,
                client_hub: Arc::new(ClientHub::default()),
                cancellation_token: token,
                module_name: None,
            },
        }
    }

    pub fn with_db(mut self, db: DatabaseConnection) -> Self {
        self.inner.db = Some(db);
        self
    }

    pub fn with_config_provider(mut self, p: Arc<dyn ConfigProvider>) -> Self {
        self.inner.config_provider = Some(p);
        self
    }

    pub fn with_client_hub(mut self, hub: Arc<ClientHub>) -> Self {
        self.inner.client_hub = hub;
        self
    }

    pub fn build(self) -> ModuleCtx {
        self.inner
    }
}

impl ModuleCtx {
    /// Scope the context to a module name (used by the registry and tests).
    pub fn for_module(mut self, name: &str) -> Self {
        self.module_name = Some(Arc::<str>::from(name));
        self
    }

    pub fn db(&self) -> Option<&DatabaseConnection> {
        self.db.as_ref()
    }

    pub fn db_required(&self) -> anyhow::Result<DatabaseConnection> {
        self.db
            .clone()
            .ok_or_else(|| anyhow::anyhow!("database is not configured"))
    }

    pub fn client_hub(&self) -> Arc<ClientHub> {
        self.client_hub.clone()
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation_token
    }

    pub fn current_module(&self) -> Option<&str> {
        self.module_name.as_deref()
    }

    /// Best-effort: deserialize the module's config into `T`, falling back to
    /// `T::default()` if the section is missing or invalid.
    pub fn module_config<T: DeserializeOwned + Default>(&self) -> T {
        match self.raw_module_config() {
            Some(v) => serde_json::from_value::<T>(v.clone()).unwrap_or_else(|e| {
                tracing::warn!(
                    module = self.current_module().unwrap_or("?"),
                    error = %e,
                    "invalid module config, using defaults"
                );
                T::default()
            }),
            None => T::default(),
        }
    }

    fn raw_module_config(&self) -> Option<&serde_json::Value> {
        let name = self.module_name.as_deref()?;
        self.config_provider.as_ref()?.get_module_config(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::HashMap;

    struct MapProvider(HashMap<String, serde_json::Value>);

    impl ConfigProvider for MapProvider {
        fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value> {
            self.0.get(module_name)
        }
    }

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Cfg {
        #[serde(default)]
        answer: u32,
    }

    fn ctx_with(value: serde_json::Value) -> ModuleCtx {
        let mut map = HashMap::new();
        map.insert("demo".to_string(), value);
        ModuleCtxBuilder::new(CancellationToken::new())
            .with_config_provider(Arc::new(MapProvider(map)))
            .build()
    }

    #[test]
    fn module_config_reads_scoped_section() {
        let ctx = ctx_with(serde_json::json!({ "answer": 42 })).for_module("demo");
        assert_eq!(ctx.module_config::<Cfg>(), Cfg { answer: 42 });
    }

    #[test]
    fn invalid_or_missing_sections() {
        let ctx = ctx_with(serde_json::json!({ "answer": "nope" })).for_module("demo");
        assert_eq!(ctx.module_config::<Cfg>(), Cfg::default());

        let other = ctx.clone().for_module("other");
        assert_eq!(other.module_config::<Cfg>(), Cfg::default());
        assert!(other.db_required().is_err());
    }
}
