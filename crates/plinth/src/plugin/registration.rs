use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Plugin;

/// Route-level scoping applied to a plugin's realm.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteModifiers {
    /// Path prefix prepended to every route the plugin declares.
    #[serde(default)]
    pub prefix: Option<String>,
    /// Virtual host restriction for the plugin's routes.
    #[serde(default)]
    pub vhost: Option<String>,
}

/// Registration-time modifiers, either per item or shared by a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationModifiers {
    /// Route scoping for the registered plugin.
    #[serde(default)]
    pub routes: RouteModifiers,
    /// Skips the registration when the plugin is already registered.
    #[serde(default)]
    pub once: Option<bool>,
}

impl RegistrationModifiers {
    /// Sets the route prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.routes.prefix = Some(prefix.into());
        self
    }

    /// Sets the virtual host.
    #[must_use]
    pub fn with_vhost(mut self, vhost: impl Into<String>) -> Self {
        self.routes.vhost = Some(vhost.into());
        self
    }

    /// Sets the `once` flag.
    #[must_use]
    pub const fn with_once(mut self, once: bool) -> Self {
        self.once = Some(once);
        self
    }

    /// Resolves these item-level modifiers over batch-level `shared` ones.
    ///
    /// Values set on the item win; unset values fall back to `shared`.
    #[must_use]
    pub fn over(&self, shared: &Self) -> Self {
        Self {
            routes: RouteModifiers {
                prefix: self
                    .routes
                    .prefix
                    .clone()
                    .or_else(|| shared.routes.prefix.clone()),
                vhost: self
                    .routes
                    .vhost
                    .clone()
                    .or_else(|| shared.routes.vhost.clone()),
            },
            once: self.once.or(shared.once),
        }
    }
}

/// A plugin bundled with its options and registration modifiers.
#[derive(Debug)]
pub struct Registration<H> {
    plugin: Plugin<H>,
    options: Value,
    modifiers: RegistrationModifiers,
}

impl<H> Clone for Registration<H> {
    fn clone(&self) -> Self {
        Self {
            plugin: self.plugin.clone(),
            options: self.options.clone(),
            modifiers: self.modifiers.clone(),
        }
    }
}

impl<H> Registration<H> {
    /// Wraps a plugin with empty options and no modifiers.
    #[must_use]
    pub fn new(plugin: Plugin<H>) -> Self {
        Self {
            plugin,
            options: Value::Object(Map::new()),
            modifiers: RegistrationModifiers::default(),
        }
    }

    /// Sets the options handed to the plugin's register callback.
    #[must_use]
    pub fn with_options(mut self, options: Value) -> Self {
        self.options = options;
        self
    }

    /// Replaces the registration modifiers.
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: RegistrationModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Sets the route prefix for this registration.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.modifiers = self.modifiers.with_prefix(prefix);
        self
    }

    /// Returns the wrapped plugin.
    #[must_use]
    pub const fn plugin(&self) -> &Plugin<H> {
        &self.plugin
    }

    /// Returns the plugin options.
    #[must_use]
    pub const fn options(&self) -> &Value {
        &self.options
    }

    /// Returns the registration modifiers.
    #[must_use]
    pub const fn modifiers(&self) -> &RegistrationModifiers {
        &self.modifiers
    }

    /// Splits the registration into its parts.
    #[must_use]
    pub fn into_parts(self) -> (Plugin<H>, Value, RegistrationModifiers) {
        (self.plugin, self.options, self.modifiers)
    }
}

impl<H> From<Plugin<H>> for Registration<H> {
    fn from(plugin: Plugin<H>) -> Self {
        Self::new(plugin)
    }
}

/// The primary plugin argument: a bare plugin or a wrapped registration.
///
/// Only the inner plugin is used when a registration is supplied; its
/// options and modifiers are discarded in favour of the invocation options.
#[derive(Debug)]
pub enum PluginSource<H> {
    /// A bare plugin descriptor.
    Plugin(Plugin<H>),
    /// A descriptor wrapped with registration fields.
    Registration(Registration<H>),
}

impl<H> Clone for PluginSource<H> {
    fn clone(&self) -> Self {
        match self {
            Self::Plugin(plugin) => Self::Plugin(plugin.clone()),
            Self::Registration(registration) => Self::Registration(registration.clone()),
        }
    }
}

impl<H> PluginSource<H> {
    /// Unwraps the inner plugin descriptor.
    #[must_use]
    pub fn into_plugin(self) -> Plugin<H> {
        match self {
            Self::Plugin(plugin) => plugin,
            Self::Registration(registration) => registration.plugin,
        }
    }
}

impl<H> From<Plugin<H>> for PluginSource<H> {
    fn from(plugin: Plugin<H>) -> Self {
        Self::Plugin(plugin)
    }
}

impl<H> From<Registration<H>> for PluginSource<H> {
    fn from(registration: Registration<H>) -> Self {
        Self::Registration(registration)
    }
}

/// Auxiliary plugins registered ahead of the primary plugin.
///
/// # Example
///
/// ```
/// use plinth::{Dependencies, Plugin, Registration};
/// use plinth::server::Server;
/// use serde_json::json;
///
/// let auth = Plugin::<Server>::new("auth", |_server, _options| async { Ok(()) });
/// let store = Plugin::<Server>::new("store", |_server, _options| async { Ok(()) });
///
/// let dependencies = Dependencies::new([
///     Registration::new(auth).with_options(json!({ "realm": "internal" })),
///     Registration::new(store),
/// ])
/// .with_prefix("/api");
///
/// assert_eq!(dependencies.len(), 2);
/// ```
#[derive(Debug)]
pub struct Dependencies<H> {
    plugins: Vec<Registration<H>>,
    options: RegistrationModifiers,
}

impl<H> Clone for Dependencies<H> {
    fn clone(&self) -> Self {
        Self {
            plugins: self.plugins.clone(),
            options: self.options.clone(),
        }
    }
}

impl<H> Default for Dependencies<H> {
    fn default() -> Self {
        Self {
            plugins: Vec::new(),
            options: RegistrationModifiers::default(),
        }
    }
}

impl<H> Dependencies<H> {
    /// Collects registrations in the order they will be mounted.
    #[must_use]
    pub fn new<I, R>(plugins: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Registration<H>>,
    {
        Self {
            plugins: plugins.into_iter().map(Into::into).collect(),
            options: RegistrationModifiers::default(),
        }
    }

    /// Sets the modifiers shared by every registration in the batch.
    #[must_use]
    pub fn with_options(mut self, options: RegistrationModifiers) -> Self {
        self.options = options;
        self
    }

    /// Sets a route prefix shared by every registration in the batch.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.options = self.options.with_prefix(prefix);
        self
    }

    /// Returns the registrations in mount order.
    #[must_use]
    pub fn plugins(&self) -> &[Registration<H>] {
        &self.plugins
    }

    /// Returns the shared modifiers.
    #[must_use]
    pub const fn options(&self) -> &RegistrationModifiers {
        &self.options
    }

    /// Returns the number of registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Returns `true` when there is nothing to register.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Splits the batch into registrations and shared modifiers.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Registration<H>>, RegistrationModifiers) {
        (self.plugins, self.options)
    }
}

impl<H> From<Plugin<H>> for Dependencies<H> {
    fn from(plugin: Plugin<H>) -> Self {
        Self::new([plugin])
    }
}

impl<H> From<Registration<H>> for Dependencies<H> {
    fn from(registration: Registration<H>) -> Self {
        Self::new([registration])
    }
}

impl<H> From<Vec<Registration<H>>> for Dependencies<H> {
    fn from(plugins: Vec<Registration<H>>) -> Self {
        Self::new(plugins)
    }
}

impl<H> From<Vec<Plugin<H>>> for Dependencies<H> {
    fn from(plugins: Vec<Plugin<H>>) -> Self {
        Self::new(plugins)
    }
}
