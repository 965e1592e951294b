//! Instantiating a plugin as a standalone, addressable unit.
//!
//! [`instantiate`] runs five phases strictly in order:
//!
//! 1. **normalize**: unwraps the primary descriptor and computes every
//!    defaulted [`ComposeConfig`] flag from whether a host was supplied.
//! 2. **acquire**: reuses the supplied host or creates a new one, rejecting
//!    inconsistent requests and linking lifecycles in controlled mode.
//! 3. **dependencies**: mounts auxiliary plugins ahead of the primary one.
//! 4. **primary**: mounts the primary plugin and captures the host handle
//!    scoped to its realm. That handle is the returned instance.
//! 5. **finalize**: applies the `root` and `controller` decorations and
//!    runs initialization when requested.
//!
//! The decision matrix for a supplied host:
//!
//! | host     | controlled | controlled by | registered into  |
//! |----------|------------|---------------|------------------|
//! | supplied | yes        | supplied host | new host         |
//! | supplied | no         | n/a           | supplied host    |
//! | none     | yes        | rejected      | rejected         |
//! | none     | no         | n/a           | new host         |

mod acquire;
mod dependencies;
mod finalize;
mod normalize;
mod primary;

use std::fmt;

use serde_json::Value;
use tracing::{debug, info};

use crate::error::ComposeError;
use crate::host::Host;
use crate::plugin::{Dependencies, PluginSource};

pub use self::normalize::Flags;

/// Composition options for [`instantiate`].
///
/// Every flag left unset is defaulted from the call context; see
/// [`Flags::resolve`].
pub struct ComposeConfig<H: Host> {
    host: Option<H::Options>,
    register: Option<Dependencies<H>>,
    controlled: Option<bool>,
    initialize: Option<bool>,
    decorate_root: Option<bool>,
    decorate_controller: Option<bool>,
}

impl<H: Host> Default for ComposeConfig<H> {
    fn default() -> Self {
        Self {
            host: None,
            register: None,
            controlled: None,
            initialize: None,
            decorate_root: None,
            decorate_controller: None,
        }
    }
}

impl<H: Host> fmt::Debug for ComposeConfig<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComposeConfig")
            .field("host_options", &self.host.is_some())
            .field(
                "register",
                &self.register.as_ref().map_or(0, Dependencies::len),
            )
            .field("controlled", &self.controlled)
            .field("initialize", &self.initialize)
            .field("decorate_root", &self.decorate_root)
            .field("decorate_controller", &self.decorate_controller)
            .finish()
    }
}

impl<H: Host> ComposeConfig<H> {
    /// Creates a configuration with every flag defaulted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Supplies construction options for the host that will be created.
    ///
    /// Only valid when a new host is created: either no host is supplied or
    /// composition is controlled.
    #[must_use]
    pub fn with_host_options(mut self, options: H::Options) -> Self {
        self.host = Some(options);
        self
    }

    /// Registers auxiliary plugins before the primary plugin.
    #[must_use]
    pub fn with_register(mut self, dependencies: impl Into<Dependencies<H>>) -> Self {
        self.register = Some(dependencies.into());
        self
    }

    /// Sets whether the new host is controlled by the supplied host.
    #[must_use]
    pub fn controlled(mut self, controlled: bool) -> Self {
        self.controlled = Some(controlled);
        self
    }

    /// Sets whether initialization runs as part of the call.
    #[must_use]
    pub fn initialize(mut self, initialize: bool) -> Self {
        self.initialize = Some(initialize);
        self
    }

    /// Sets whether the acquired host is decorated with `root`.
    #[must_use]
    pub fn decorate_root(mut self, decorate_root: bool) -> Self {
        self.decorate_root = Some(decorate_root);
        self
    }

    /// Sets whether the acquired host is decorated with `controller`.
    #[must_use]
    pub fn decorate_controller(mut self, decorate_controller: bool) -> Self {
        self.decorate_controller = Some(decorate_controller);
        self
    }

    /// Resolves the effective flags for a call with or without a host.
    #[must_use]
    pub fn flags(&self, host_supplied: bool) -> Flags {
        Flags::resolve(
            host_supplied,
            self.controlled,
            self.initialize,
            self.decorate_root,
            self.decorate_controller,
        )
    }
}

/// Instantiates `plugin` and returns the host handle scoped to its realm.
///
/// `host` is the optional existing host. `options` are the invocation
/// options: either the plugin options themselves, or an object whose truthy
/// `options` member holds the plugin options next to registration modifiers
/// (`routes`, `once`). `Value::Null` means no options.
///
/// # Errors
///
/// Returns [`ComposeError::Invalid`] or [`ComposeError::Conflict`] when the
/// composition is inconsistent, [`ComposeError::InvalidOptions`] for
/// malformed registration options, [`ComposeError::NotRegistered`] when the
/// host skipped the primary plugin, and [`ComposeError::Host`] carrying any
/// host, plugin or hook failure unchanged. Phases already completed are not
/// rolled back.
///
/// # Example
///
/// ```
/// use futures::executor::block_on;
/// use plinth::{ComposeConfig, Plugin, instantiate};
/// use plinth::server::Server;
/// use serde_json::json;
///
/// let plugin = Plugin::<Server>::new("counter", |server, options| async move {
///     server.set_app("start", options["start"].clone());
///     Ok(())
/// });
///
/// let instance = block_on(instantiate(
///     None,
///     plugin,
///     json!({ "start": 3 }),
///     ComposeConfig::new(),
/// ))
/// .expect("instantiate");
///
/// assert_eq!(instance.app().get("start"), Some(&json!(3)));
/// assert_eq!(instance.realm().plugin(), Some("counter"));
/// ```
pub async fn instantiate<H: Host>(
    host: Option<&H>,
    plugin: impl Into<PluginSource<H>>,
    options: Value,
    compose: ComposeConfig<H>,
) -> Result<H, ComposeError> {
    let plugin = plugin.into().into_plugin();
    let plan = normalize::plan(host.is_some(), compose);
    let flags = plan.flags;
    debug!(
        target: "plinth::compose",
        plugin = plugin.name(),
        host_supplied = host.is_some(),
        controlled = flags.controlled,
        initialize = flags.initialize,
        decorate_root = flags.decorate_root,
        decorate_controller = flags.decorate_controller,
        dependencies = plan.dependencies.len(),
        "instantiating plugin"
    );

    let acquired = acquire::acquire(host, flags.controlled, plan.host_options)?;
    dependencies::register(&acquired, plan.dependencies, &plan.shared).await?;
    let name = plugin.name().to_owned();
    let instance = primary::register(&acquired, plugin, options).await?;
    finalize::decorate(host, &acquired, flags)?;
    finalize::initialize(host, &acquired, flags).await?;

    info!(
        target: "plinth::compose",
        plugin = name.as_str(),
        initialized = flags.initialize,
        "plugin instance ready"
    );
    Ok(instance)
}
