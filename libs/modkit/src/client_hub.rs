//! Type-safe registry of module clients.
//!
//! Providers register an implementation once under its interface type
//! (usually a trait object); consumers fetch it with `get::<dyn my::Api>()`.
//! Re-registering overwrites; Arcs already handed out stay valid.

use parking_lot::RwLock;
use std::{any::Any, collections::HashMap, sync::Arc};

#[derive(Debug, thiserror::Error)]
pub enum ClientHubError {
    #[error("client not found: {0}")]
    NotFound(&'static str),
}

type Boxed = Box<dyn Any + Send + Sync>;

#[derive(Default)]
pub struct ClientHub {
    // key: type_name::<T>(), which also works for `T = dyn Trait`
    map: RwLock<HashMap<&'static str, Boxed>>,
}

impl ClientHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T>(&self, client: Arc<T>)
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.map
            .write()
            .insert(std::any::type_name::<T>(), Box::new(client));
    }

    pub fn get<T>(&self) -> Result<Arc<T>, ClientHubError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let key = std::any::type_name::<T>();
        self.map
            .read()
            .get(key)
            .and_then(|b| b.downcast_ref::<Arc<T>>())
            .cloned()
            .ok_or(ClientHubError::NotFound(key))
    }

    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    struct En;
    impl Greeter for En {
        fn greet(&self) -> String {
            "hello".into()
        }
    }

    struct Fr;
    impl Greeter for Fr {
        fn greet(&self) -> String {
            "bonjour".into()
        }
    }

    #[test]
    fn register_and_fetch_trait_object() {
        let hub = ClientHub::new();
        assert!(hub.get::<dyn Greeter>().is_err());

        hub.register::<dyn Greeter>(Arc::new(En));
        assert_eq!(hub.get::<dyn Greeter>().unwrap().greet(), "hello");

        let held = hub.get::<dyn Greeter>().unwrap();
        hub.register::<dyn Greeter>(Arc::new(Fr));
        assert_eq!(held.greet(), "hello");
        assert_eq!(hub.get::<dyn Greeter>().unwrap().greet(), "bonjour");
        assert_eq!(hub.len(), 1);
    }
}
