//! Plugin descriptors and the registration shapes wrapped around them.
//!
//! A [`Plugin`] is a name, a set of [`PluginAttributes`] and an asynchronous
//! register callback. A [`Registration`] pairs a plugin with the options it
//! receives and the [`RegistrationModifiers`] scoping its realm. Batches of
//! auxiliary plugins are expressed as [`Dependencies`].

mod registration;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::host::BoxError;

pub use self::registration::{
    Dependencies, PluginSource, Registration, RegistrationModifiers, RouteModifiers,
};

/// Future returned by a plugin's register callback.
pub type RegisterFuture = BoxFuture<'static, Result<(), BoxError>>;

type RegisterFn<H> = dyn Fn(H, Value) -> RegisterFuture + Send + Sync;

/// Descriptive attributes carried alongside a plugin's register callback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginAttributes {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    once: bool,
    #[serde(default)]
    multiple: bool,
    #[serde(default)]
    dependencies: Vec<String>,
}

impl PluginAttributes {
    /// Returns the declared plugin version.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Returns `true` when repeated registrations should be skipped.
    #[must_use]
    pub const fn once(&self) -> bool {
        self.once
    }

    /// Returns `true` when the plugin may be registered more than once.
    #[must_use]
    pub const fn multiple(&self) -> bool {
        self.multiple
    }

    /// Returns the names of plugins that must be registered before start.
    #[must_use]
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }
}

/// A named unit of registration for hosts of type `H`.
///
/// # Example
///
/// ```
/// use plinth::Plugin;
/// use plinth::server::Server;
///
/// let plugin = Plugin::<Server>::new("greeter", |server, _options| async move {
///     server.set_app("greeting", "hello".into());
///     Ok(())
/// })
/// .with_version("1.0.0");
///
/// assert_eq!(plugin.name(), "greeter");
/// assert_eq!(plugin.attributes().version(), Some("1.0.0"));
/// ```
pub struct Plugin<H> {
    name: String,
    attributes: PluginAttributes,
    register: Arc<RegisterFn<H>>,
}

impl<H> Clone for Plugin<H> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            attributes: self.attributes.clone(),
            register: Arc::clone(&self.register),
        }
    }
}

impl<H> fmt::Debug for Plugin<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin")
            .field("name", &self.name)
            .field("attributes", &self.attributes)
            .finish_non_exhaustive()
    }
}

impl<H: Send + 'static> Plugin<H> {
    /// Creates a plugin from a name and an asynchronous register callback.
    ///
    /// The callback receives the host handle scoped to the plugin's realm
    /// and the plugin options.
    #[must_use]
    pub fn new<F, Fut>(name: impl Into<String>, register: F) -> Self
    where
        F: Fn(H, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        let register: Arc<RegisterFn<H>> =
            Arc::new(move |host: H, options: Value| -> RegisterFuture {
                Box::pin(register(host, options))
            });
        Self {
            name: name.into(),
            attributes: PluginAttributes::default(),
            register,
        }
    }

    /// Wraps the register callback so `observe` sees the realm-scoped host
    /// before the original callback runs.
    pub(crate) fn intercept<F>(self, observe: F) -> Self
    where
        F: Fn(&H) + Send + Sync + 'static,
    {
        let inner = self.register;
        let register: Arc<RegisterFn<H>> =
            Arc::new(move |host: H, options: Value| -> RegisterFuture {
                observe(&host);
                inner(host, options)
            });
        Self {
            name: self.name,
            attributes: self.attributes,
            register,
        }
    }
}

impl<H> Plugin<H> {
    /// Declares the plugin version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.attributes.version = Some(version.into());
        self
    }

    /// Skips repeated registrations of this plugin instead of failing.
    #[must_use]
    pub const fn with_once(mut self, once: bool) -> Self {
        self.attributes.once = once;
        self
    }

    /// Allows this plugin to be registered more than once.
    #[must_use]
    pub const fn with_multiple(mut self, multiple: bool) -> Self {
        self.attributes.multiple = multiple;
        self
    }

    /// Declares plugins that must be registered before the host starts.
    #[must_use]
    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the plugin name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the plugin attributes.
    #[must_use]
    pub const fn attributes(&self) -> &PluginAttributes {
        &self.attributes
    }

    /// Invokes the register callback.
    pub fn register(&self, host: H, options: Value) -> RegisterFuture {
        (self.register)(host, options)
    }
}

#[cfg(test)]
mod tests;
