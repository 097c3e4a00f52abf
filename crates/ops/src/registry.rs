use calcell_core::CapabilityKey;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::operations::{arithmetic_plugins, ARITHMETIC_NAMESPACE};
use crate::{Plugin, PluginProvider};

/// Why part of a discovery pass was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryFailure {
    /// Nothing is registered at or below the namespace.
    Unresolved { namespace: String },
    /// A provider was found but could not list its plugins.
    Provider { namespace: String, error: String },
}

/// Outcome of one `discover` call. Failures are reported here and logged,
/// never raised.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    pub namespace: String,
    pub registered: Vec<CapabilityKey>,
    pub failures: Vec<DiscoveryFailure>,
}

impl DiscoveryReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Two-level index of capability descriptors: category -> name -> plugin.
///
/// The index is only ever added to. Rediscovering a key replaces its entry;
/// entries whose provider disappeared stay until overwritten.
#[derive(Clone, Default)]
pub struct PluginRegistry {
    providers: BTreeMap<String, Arc<dyn PluginProvider>>,
    plugins: BTreeMap<String, BTreeMap<String, Arc<dyn Plugin>>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in arithmetic provider registered (not yet discovered).
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_provider(ARITHMETIC_NAMESPACE, arithmetic_plugins);
        registry
    }

    /// Register a provider under a dotted namespace, replacing any previous one.
    pub fn register_provider<P>(&mut self, namespace: &str, provider: P)
    where
        P: PluginProvider + 'static,
    {
        debug!(namespace, "Registering plugin provider");
        self.providers.insert(namespace.to_string(), Arc::new(provider));
    }

    /// Discover every plugin at `namespace` and in its sub-namespaces.
    pub fn discover(&mut self, namespace: &str) -> DiscoveryReport {
        let mut report = DiscoveryReport {
            namespace: namespace.to_string(),
            ..Default::default()
        };

        let prefix = format!("{}.", namespace);
        let matching: Vec<(String, Arc<dyn PluginProvider>)> = self
            .providers
            .iter()
            .filter(|(ns, _)| ns.as_str() == namespace || ns.starts_with(&prefix))
            .map(|(ns, provider)| (ns.clone(), provider.clone()))
            .collect();

        if matching.is_empty() {
            warn!(namespace, "Could not resolve plugin namespace");
            report.failures.push(DiscoveryFailure::Unresolved {
                namespace: namespace.to_string(),
            });
            return report;
        }

        for (ns, provider) in matching {
            match provider.plugins() {
                Ok(plugins) => {
                    for plugin in plugins {
                        report.registered.push(self.insert(plugin));
                    }
                }
                Err(e) => {
                    warn!(namespace = %ns, error = %e, "Plugin provider failed, skipping");
                    report.failures.push(DiscoveryFailure::Provider {
                        namespace: ns,
                        error: e.to_string(),
                    });
                }
            }
        }

        debug!(
            namespace,
            registered = report.registered.len(),
            failures = report.failures.len(),
            "Plugin discovery finished"
        );
        report
    }

    fn insert(&mut self, plugin: Arc<dyn Plugin>) -> CapabilityKey {
        let key = plugin.key();
        debug!(key = %key, "Registering plugin");
        self.plugins
            .entry(key.category.clone())
            .or_default()
            .insert(key.name.clone(), plugin);
        key
    }

    pub fn get(&self, category: &str, name: &str) -> Option<&Arc<dyn Plugin>> {
        self.plugins.get(category)?.get(name)
    }

    /// Plugins of one category, or all of them flattened when `category` is `None`.
    ///
    /// In the flattened view categories are visited in lexical order and a
    /// later category's plugin replaces an earlier one with the same name.
    pub fn get_all(&self, category: Option<&str>) -> BTreeMap<String, Arc<dyn Plugin>> {
        match category {
            Some(category) => self.plugins.get(category).cloned().unwrap_or_default(),
            None => {
                let mut all = BTreeMap::new();
                for plugins in self.plugins.values() {
                    for (name, plugin) in plugins {
                        all.insert(name.clone(), plugin.clone());
                    }
                }
                all
            }
        }
    }

    pub fn categories(&self) -> Vec<String> {
        self.plugins.keys().cloned().collect()
    }

    pub fn namespaces(&self) -> Vec<String> {
        self.providers.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
