use std::collections::HashMap;

/// Maps an environment variable name to its value.
///
/// An empty string means "not set". Implementations do no caching; resolved
/// values live only as long as the client built from them.
pub trait CredentialResolver: Send + Sync {
    /// Resolve `name`, returning an empty string when it has no value.
    fn resolve(&self, name: &str) -> String;
}

/// Reads credentials from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvResolver;

impl CredentialResolver for EnvResolver {
    fn resolve(&self, name: &str) -> String {
        if name.is_empty() {
            return String::new();
        }
        std::env::var(name).unwrap_or_default()
    }
}

/// Resolves credentials from a fixed in-memory mapping.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    values: HashMap<String, String>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a mapping.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StaticResolver {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl CredentialResolver for StaticResolver {
    fn resolve(&self, name: &str) -> String {
        self.values.get(name).cloned().unwrap_or_default()
    }
}
