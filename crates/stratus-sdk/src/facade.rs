//! Process-wide configuration.
//!
//! Every reader gets a shared immutable [`Configuration`]. Updates build a
//! new configuration and swap the reference; configurations already handed
//! out are never modified.

use std::sync::Arc;

use parking_lot::RwLock;
use stratus_client::{GlacierClient, ImportExportClient};
use stratus_core::{ConfigError, ConfigOptions, Configuration};

static CURRENT: RwLock<Option<Arc<Configuration>>> = parking_lot::const_rwlock(None);

fn initial() -> Arc<Configuration> {
    tracing::debug!("building default configuration");
    Arc::new(Configuration::from_env())
}

/// Current configuration.
///
/// Built from the environment on first use; the same `Arc` is returned
/// until the configuration is replaced.
pub fn config() -> Arc<Configuration> {
    if let Some(current) = CURRENT.read().as_ref() {
        return Arc::clone(current);
    }
    let mut current = CURRENT.write();
    Arc::clone(current.get_or_insert_with(initial))
}

/// Apply `options` to the current configuration and make the result current.
///
/// Concurrent calls are serialized, so no update is lost.
pub fn configure(options: ConfigOptions) -> Arc<Configuration> {
    let mut current = CURRENT.write();
    let base = current.get_or_insert_with(initial);
    let next = Arc::new(base.with(options));
    *current = Some(Arc::clone(&next));
    tracing::debug!(
        region = next.default_region(),
        stub_requests = next.stub_requests(),
        "configuration replaced"
    );
    next
}

/// Like [`configure`], with options given by name.
///
/// Nothing changes if any name or value is rejected.
pub fn configure_from_pairs<I, K, V>(pairs: I) -> Result<Arc<Configuration>, ConfigError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    let options = ConfigOptions::from_pairs(pairs)?;
    Ok(configure(options))
}

/// Switch to stubbed requests: clients answer locally and never reach a
/// transport.
pub fn stub() -> Arc<Configuration> {
    configure(ConfigOptions::new().stub_requests(true))
}

/// Replace the current configuration outright.
pub fn set_config(config: Configuration) -> Arc<Configuration> {
    let next = Arc::new(config);
    *CURRENT.write() = Some(Arc::clone(&next));
    tracing::debug!("configuration set");
    next
}

/// Forget the current configuration; the next read rebuilds the default.
pub fn reset_config() {
    *CURRENT.write() = None;
    tracing::debug!("configuration reset");
}

/// Glacier client bound to the current configuration.
pub fn glacier() -> GlacierClient {
    GlacierClient::new(config())
}

/// Import/Export client bound to the current configuration.
pub fn import_export() -> ImportExportClient {
    ImportExportClient::new(config())
}
