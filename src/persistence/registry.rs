/*!
 * Filename registry.
 *
 * Resolves the on-disk filename a database handle type is configured to
 * use, by scanning its connection string, and caches the result per handle
 * type for the lifetime of the registry. A name is resolved exactly once;
 * it is never re-derived even if a different connection string is offered
 * later.
 */

use log::debug;
use parking_lot::Mutex;
use std::any::TypeId;
use std::collections::HashMap;

/// Sentinel filename used when a connection string names no file
pub const FALLBACK_FILENAME: &str = "filenotfound.db";

/// Registry mapping logical database handle types to on-disk filenames.
///
/// Constructed once at startup and shared by handle with every component
/// that needs filename resolution.
#[derive(Debug, Default)]
pub struct FilenameRegistry {
    names: Mutex<HashMap<TypeId, String>>,
}

impl FilenameRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the filename for handle type `C`, caching on first call.
    ///
    /// Subsequent calls return the cached name regardless of the
    /// connection string passed.
    pub fn resolve<C: 'static>(&self, connection_string: &str) -> String {
        let mut names = self.names.lock();
        if let Some(name) = names.get(&TypeId::of::<C>()) {
            return name.clone();
        }

        let name = parse_connection_string(connection_string);
        debug!("Resolved database filename: {}", name);
        names.insert(TypeId::of::<C>(), name.clone());
        name
    }

    /// The cached filename for handle type `C`, if already resolved
    pub fn get<C: 'static>(&self) -> Option<String> {
        self.names.lock().get(&TypeId::of::<C>()).cloned()
    }
}

/// Scan a `key=value;key=value` connection string for the first key
/// containing `data source`, `datasource` or `filename` (case-insensitive).
fn parse_connection_string(connection_string: &str) -> String {
    connection_string
        .split(';')
        .filter_map(|pair| pair.split_once('='))
        .map(|(key, value)| (key.trim().to_lowercase(), value.trim()))
        .find(|(key, _)| {
            key.contains("data source") || key.contains("datasource") || key.contains("filename")
        })
        .map(|(_, value)| value.to_string())
        .unwrap_or_else(|| FALLBACK_FILENAME.to_string())
}
