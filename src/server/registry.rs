//! Service registry
//!
//! Registration-time descriptors and the method table they populate.

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use crate::context::Context;
use crate::error::{RegistrationError, Result};

/// Opaque service value handed to handlers and interceptors
pub type ServiceHandle = Arc<dyn Any + Send + Sync>;

/// A method implementation.
///
/// Called with the call's context, the service handle and the request body;
/// returns the response body. Must be safe to call concurrently.
pub type Handler = Arc<dyn Fn(&Context, &ServiceHandle, Bytes) -> Result<Bytes> + Send + Sync>;

/// Anything that accepts service registrations
pub trait Registry {
    fn register(&mut self, spec: ServiceSpec);
}

/// A single method: an id unique within its service and a handler
#[derive(Clone)]
pub struct MethodSpec {
    pub id: i64,
    pub handler: Handler,
}

impl MethodSpec {
    pub fn new<F>(id: i64, handler: F) -> Self
    where
        F: Fn(&Context, &ServiceHandle, Bytes) -> Result<Bytes> + Send + Sync + 'static,
    {
        Self {
            id,
            handler: Arc::new(handler),
        }
    }
}

impl fmt::Debug for MethodSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodSpec").field("id", &self.id).finish_non_exhaustive()
    }
}

/// A service: a unique name, the service value and its methods
#[derive(Clone, Default)]
pub struct ServiceSpec {
    pub name: String,
    pub service: Option<ServiceHandle>,
    pub methods: Vec<MethodSpec>,
}

impl ServiceSpec {
    pub fn new<S: Any + Send + Sync>(name: impl Into<String>, service: S) -> Self {
        Self {
            name: name.into(),
            service: Some(Arc::new(service)),
            methods: Vec::new(),
        }
    }

    /// Add a method
    pub fn method<F>(mut self, id: i64, handler: F) -> Self
    where
        F: Fn(&Context, &ServiceHandle, Bytes) -> Result<Bytes> + Send + Sync + 'static,
    {
        self.methods.push(MethodSpec::new(id, handler));
        self
    }
}

impl fmt::Debug for ServiceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceSpec")
            .field("name", &self.name)
            .field("has_service", &self.service.is_some())
            .field("methods", &self.methods)
            .finish()
    }
}

/// Composite key identifying a method: service name plus method id
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodKey {
    pub service: String,
    pub method: i64,
}

impl MethodKey {
    pub fn new(service: impl Into<String>, method: i64) -> Self {
        Self {
            service: service.into(),
            method,
        }
    }
}

impl fmt::Display for MethodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.service, self.method)
    }
}

/// A registered method
#[derive(Clone)]
pub(crate) struct MethodEntry {
    pub(crate) service: ServiceHandle,
    pub(crate) handler: Handler,
}

/// Registered services and methods. Written during startup, read-only once
/// serving begins.
#[derive(Default)]
pub(crate) struct MethodTable {
    /// Set of service names
    services: HashSet<String>,

    methods: HashMap<MethodKey, MethodEntry>,
}

impl MethodTable {
    pub(crate) fn insert(&mut self, spec: ServiceSpec) -> std::result::Result<(), RegistrationError> {
        if spec.name.is_empty() {
            return Err(RegistrationError::MissingName);
        }
        let Some(service) = spec.service else {
            return Err(RegistrationError::MissingService);
        };
        if self.services.contains(&spec.name) {
            return Err(RegistrationError::DuplicateService(spec.name));
        }

        // A repeated id within one spec overwrites the earlier method.
        for method in spec.methods {
            self.methods.insert(
                MethodKey::new(spec.name.as_str(), method.id),
                MethodEntry {
                    service: Arc::clone(&service),
                    handler: method.handler,
                },
            );
        }
        self.services.insert(spec.name);
        Ok(())
    }

    pub(crate) fn get(&self, key: &MethodKey) -> Option<&MethodEntry> {
        self.methods.get(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.methods.len()
    }

    pub(crate) fn has_service(&self, name: &str) -> bool {
        self.services.contains(name)
    }
}
