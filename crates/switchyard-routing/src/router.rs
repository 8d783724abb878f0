use crate::config::{load_routing_config, RoutingConfig};
use crate::credentials::CredentialResolver;
use crate::factory::{ClientFactory, ClientSpec};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use switchyard_core::{SwitchyardError, SwitchyardResult};
use tracing::{debug, info, warn};

/// Config and client cache, guarded together so a reload can swap the
/// config and clear the cache in one step.
struct RouterState<C: ?Sized> {
    config: Option<RoutingConfig>,
    cache: HashMap<String, Arc<C>>,
}

/// Routes calls for one capability `C` to the configured default provider,
/// falling back to a secondary client.
///
/// Clients are built lazily by the [`ClientFactory`] and cached by provider
/// name. When a config path is set, every resolution re-reads it; a config
/// that differs from the held one replaces it and empties the whole cache.
/// Call failures never evict a cached client.
pub struct Router<C: ?Sized> {
    state: RwLock<RouterState<C>>,
    config_path: Option<PathBuf>,
    factory: Arc<dyn ClientFactory<C>>,
    credentials: Arc<dyn CredentialResolver>,
    fallback: Option<Arc<C>>,
    last_reload_error: Mutex<Option<String>>,
}

impl<C: ?Sized + Send + Sync> Router<C> {
    /// Create a router with an initial config and no fallback or hot-reload.
    pub fn new(
        config: Option<RoutingConfig>,
        factory: Arc<dyn ClientFactory<C>>,
        credentials: Arc<dyn CredentialResolver>,
    ) -> Self {
        Self {
            state: RwLock::new(RouterState {
                config,
                cache: HashMap::new(),
            }),
            config_path: None,
            factory,
            credentials,
            fallback: None,
            last_reload_error: Mutex::new(None),
        }
    }

    /// Install the client used when the primary is absent or fails.
    pub fn with_fallback(mut self, fallback: Arc<C>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Enable hot-reload from `path`.
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn fallback(&self) -> Option<&Arc<C>> {
        self.fallback.as_ref()
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Snapshot of the currently held config.
    pub fn current_config(&self) -> Option<RoutingConfig> {
        self.state.read().config.clone()
    }

    /// Names of providers with a cached client, sorted.
    pub fn cached_providers(&self) -> Vec<String> {
        let mut names: Vec<String> = self.state.read().cache.keys().cloned().collect();
        names.sort();
        names
    }

    /// Re-read the config file and apply it if it changed.
    ///
    /// Returns `Ok(true)` when the held config was replaced and the cache
    /// cleared, `Ok(false)` when hot-reload is disabled, the file is absent,
    /// or its content equals the held config. A read or parse failure is
    /// returned and the previous config stays in effect.
    ///
    /// The file is read while the write lock is held, so a caller can never
    /// apply a version older than one another caller already applied.
    pub fn reload(&self) -> SwitchyardResult<bool> {
        let Some(path) = &self.config_path else {
            return Ok(false);
        };

        let mut state = self.state.write();
        let Some(loaded) = load_routing_config(path)? else {
            return Ok(false);
        };
        if state.config.as_ref() == Some(&loaded) {
            return Ok(false);
        }
        let evicted = state.cache.len();
        state.config = Some(loaded);
        state.cache.clear();
        drop(state);

        info!(
            path = %path.display(),
            evicted,
            "Routing config changed, client cache cleared"
        );
        Ok(true)
    }

    /// Log a reload failure once per distinct message.
    ///
    /// Returns whether a warning was emitted. A successful reload (`None`)
    /// resets the memo so the next failure is reported again.
    fn note_reload_result(&self, result: Option<&SwitchyardError>) -> bool {
        let mut last = self.last_reload_error.lock();
        let Some(err) = result else {
            *last = None;
            return false;
        };
        let message = err.to_string();
        if last.as_deref() == Some(message.as_str()) {
            return false;
        }
        warn!(error = %message, "Routing config reload failed, keeping previous config");
        *last = Some(message);
        true
    }

    /// Resolve the default provider's client, building it on first use.
    ///
    /// `Ok(None)` means routing is not configured: no config, no usable
    /// default provider, or missing credentials. Errors come only from the
    /// factory.
    pub(crate) fn resolve_client(&self) -> SwitchyardResult<Option<Arc<C>>> {
        self.note_reload_result(self.reload().err().as_ref());

        {
            let state = self.state.read();
            let Some((name, _)) = state
                .config
                .as_ref()
                .and_then(RoutingConfig::default_descriptor)
            else {
                debug!("No usable default provider configured");
                return Ok(None);
            };
            if let Some(client) = state.cache.get(name) {
                return Ok(Some(Arc::clone(client)));
            }
        }

        let mut state = self.state.write();
        // The config may have been swapped while no lock was held.
        let Some((name, descriptor)) = state
            .config
            .as_ref()
            .and_then(RoutingConfig::default_descriptor)
            .map(|(name, descriptor)| (name.to_string(), descriptor.clone()))
        else {
            return Ok(None);
        };
        if let Some(client) = state.cache.get(&name) {
            return Ok(Some(Arc::clone(client)));
        }

        let base_url = self.credentials.resolve(&descriptor.base_url_env);
        let api_key = self.credentials.resolve(&descriptor.api_key_env);
        if base_url.is_empty() || api_key.is_empty() {
            debug!(
                provider = %name,
                base_url_env = %descriptor.base_url_env,
                api_key_env = %descriptor.api_key_env,
                "Provider credentials not set, treating as unconfigured"
            );
            return Ok(None);
        }

        let spec = ClientSpec::from_descriptor(&name, &descriptor, base_url, api_key);
        let client = self.factory.build(&spec)?;
        debug!(provider = %name, kind = %spec.kind, "Built provider client");
        state.cache.insert(name, Arc::clone(&client));
        Ok(Some(client))
    }

    /// Run `op` against the primary client, or against the fallback when the
    /// primary is unconfigured or fails.
    ///
    /// On primary success the fallback is never touched. With no fallback
    /// installed: a factory failure is returned as-is, a failed primary call
    /// becomes [`SwitchyardError::NoProviderAvailable`], and a merely
    /// unconfigured primary yields `Ok(None)` rather than an error.
    pub async fn call<T, F, Fut>(&self, op: F) -> SwitchyardResult<Option<T>>
    where
        F: Fn(Arc<C>) -> Fut,
        Fut: Future<Output = SwitchyardResult<T>>,
    {
        let mut build_err = None;
        let mut call_err = None;

        match self.resolve_client() {
            Ok(Some(client)) => match op(client).await {
                Ok(value) => return Ok(Some(value)),
                Err(e) => {
                    warn!(
                        error = %e,
                        has_fallback = self.fallback.is_some(),
                        "Primary provider call failed"
                    );
                    call_err = Some(e);
                }
            },
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "Failed to build primary provider client");
                build_err = Some(e);
            }
        }

        if let Some(fallback) = &self.fallback {
            return op(Arc::clone(fallback)).await.map(Some);
        }

        if let Some(e) = build_err {
            return Err(e);
        }
        if let Some(e) = call_err {
            return Err(SwitchyardError::NoProviderAvailable(e.to_string()));
        }
        Ok(None)
    }
}
