//! Resource-type-keyed façade registry.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use fhirvault_codec::{ResourceCodec, registry::builtin_codecs};
use fhirvault_core::{VaultError, VaultResult};
use fhirvault_search::SearchConfig;
use fhirvault_storage::DynTableStore;

use crate::service::ResourceService;

/// Holds one façade per resource type, selected by resource-type key.
pub struct ServiceRegistry {
    services: HashMap<String, ResourceService>,
}

impl ServiceRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            services: HashMap::new(),
        }
    }

    /// Creates a registry with a façade for every built-in codec, all backed
    /// by the same injected store.
    #[must_use]
    pub fn with_builtin(tables: DynTableStore, config: SearchConfig) -> Self {
        let mut registry = Self::new();
        for codec in builtin_codecs() {
            registry.register(codec, Arc::clone(&tables), config);
        }
        debug!(
            resource_types = registry.services.len(),
            backend = tables.backend_name(),
            "service registry initialized"
        );
        registry
    }

    /// Registers (or replaces) the façade for one codec.
    pub fn register(
        &mut self,
        codec: Arc<dyn ResourceCodec>,
        tables: DynTableStore,
        config: SearchConfig,
    ) {
        let service = ResourceService::new(codec, tables, config);
        self.services
            .insert(service.resource_type().to_string(), service);
    }

    /// Looks up the façade for a resource type.
    pub fn get(&self, resource_type: &str) -> VaultResult<&ResourceService> {
        self.services
            .get(resource_type)
            .ok_or_else(|| VaultError::unsupported_resource_type(resource_type))
    }

    /// The registered resource-type labels, sorted.
    #[must_use]
    pub fn resource_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.services.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
