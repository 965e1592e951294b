//! Curried entry points: a plugin bound ahead of time, and instantiation as
//! a method on any host.

use std::future::Future;

use serde_json::Value;

use crate::compose::{ComposeConfig, instantiate};
use crate::error::ComposeError;
use crate::host::Host;
use crate::plugin::PluginSource;

/// Binds `plugin` so it can be instantiated repeatedly.
///
/// # Example
///
/// ```
/// use futures::executor::block_on;
/// use plinth::{ComposeConfig, Plugin, to_factory};
/// use plinth::server::Server;
/// use serde_json::Value;
///
/// let factory = to_factory(Plugin::<Server>::new("widget", |_server, _options| async {
///     Ok(())
/// }));
///
/// let first = block_on(factory.instance(None, Value::Null, ComposeConfig::new()))
///     .expect("first instance");
/// let second = block_on(factory.instance(None, Value::Null, ComposeConfig::new()))
///     .expect("second instance");
/// assert!(!first.same_server(&second));
/// ```
#[must_use]
pub fn to_factory<H: Host>(plugin: impl Into<PluginSource<H>>) -> Factory<H> {
    Factory {
        plugin: plugin.into(),
    }
}

/// A plugin with instantiation deferred; see [`to_factory`].
#[derive(Debug)]
pub struct Factory<H> {
    plugin: PluginSource<H>,
}

impl<H> Clone for Factory<H> {
    fn clone(&self) -> Self {
        Self {
            plugin: self.plugin.clone(),
        }
    }
}

impl<H: Host> Factory<H> {
    /// Returns the bound plugin argument.
    #[must_use]
    pub const fn plugin(&self) -> &PluginSource<H> {
        &self.plugin
    }

    /// Instantiates the bound plugin, with or without a host.
    ///
    /// # Errors
    ///
    /// Fails exactly as [`instantiate`] does.
    pub async fn instance(
        &self,
        host: Option<&H>,
        options: Value,
        compose: ComposeConfig<H>,
    ) -> Result<H, ComposeError> {
        instantiate(host, self.plugin.clone(), options, compose).await
    }
}

/// Instantiation with the receiver as the supplied host.
pub trait Instantiate: Host {
    /// Same as `instantiate(Some(self), plugin, options, compose)`.
    fn instance<P>(
        &self,
        plugin: P,
        options: Value,
        compose: ComposeConfig<Self>,
    ) -> impl Future<Output = Result<Self, ComposeError>> + Send
    where
        P: Into<PluginSource<Self>> + Send;
}

impl<H: Host> Instantiate for H {
    fn instance<P>(
        &self,
        plugin: P,
        options: Value,
        compose: ComposeConfig<Self>,
    ) -> impl Future<Output = Result<Self, ComposeError>> + Send
    where
        P: Into<PluginSource<Self>> + Send,
    {
        instantiate(Some(self), plugin, options, compose)
    }
}
