//! Reference in-memory host.
//!
//! [`Server`] implements the [`Host`] capability surface with the semantics
//! plugin composition relies on: a realm tree rooted at each server,
//! server-wide write-once decorations, name-keyed registrations recorded
//! before the plugin callback runs, `on_pre_start` hooks, and controlled
//! servers whose initialization follows their controller's.
//!
//! It carries no routing or transport. Applications with their own host
//! implement [`Host`] instead.

mod error;
mod realm;
mod state;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::host::{BoxError, Decoration, Host};
use crate::plugin::{Registration, RegistrationModifiers};

use self::state::{Core, PreStartHook, Prepared};

pub use self::error::ServerError;
pub use self::realm::Realm;
pub use self::state::{Phase, RegistrationInfo};

/// Construction parameters for a [`Server`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerOptions {
    /// Application settings exposed through [`Server::settings`].
    #[serde(default)]
    pub app: Map<String, Value>,
}

impl ServerOptions {
    /// Adds an application setting.
    #[must_use]
    pub fn with_app(mut self, key: impl Into<String>, value: Value) -> Self {
        self.app.insert(key.into(), value);
        self
    }
}

/// A handle on an in-memory server, scoped to one realm.
///
/// Handles are cheap to clone. All handles of one server share its
/// decorations, registrations, application state and lifecycle; they differ
/// only in the realm they are scoped to.
#[derive(Clone)]
pub struct Server {
    core: Arc<Core>,
    realm: Arc<Realm>,
}

impl fmt::Debug for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server")
            .field("realm", &self.realm.plugin())
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

impl Default for Server {
    fn default() -> Self {
        Self::new(ServerOptions::default())
    }
}

impl Server {
    /// Creates a server scoped to its root realm.
    #[must_use]
    pub fn new(options: ServerOptions) -> Self {
        Self {
            core: Arc::new(Core::new(options)),
            realm: Realm::root(),
        }
    }

    fn scoped(&self, realm: Arc<Realm>) -> Self {
        Self {
            core: Arc::clone(&self.core),
            realm,
        }
    }

    /// Returns the options the server was created with.
    #[must_use]
    pub fn settings(&self) -> &ServerOptions {
        self.core.settings()
    }

    /// Returns the realm this handle is scoped to.
    #[must_use]
    pub const fn realm(&self) -> &Arc<Realm> {
        &self.realm
    }

    /// Returns a snapshot of the server-wide application state.
    #[must_use]
    pub fn app(&self) -> Map<String, Value> {
        self.core.state().app.clone()
    }

    /// Sets a server-wide application state entry.
    pub fn set_app(&self, key: impl Into<String>, value: Value) {
        self.core.state().app.insert(key.into(), value);
    }

    /// Returns registered plugin names in registration order.
    #[must_use]
    pub fn registrations(&self) -> Vec<String> {
        self.core
            .state()
            .registrations
            .iter()
            .map(|record| record.name().to_owned())
            .collect()
    }

    /// Returns the recorded registration for `name`.
    #[must_use]
    pub fn registration(&self, name: &str) -> Option<RegistrationInfo> {
        self.core
            .state()
            .registrations
            .iter()
            .find(|record| record.name() == name)
            .cloned()
    }

    /// Returns the names of all server decorations.
    #[must_use]
    pub fn decorations(&self) -> Vec<String> {
        self.core.state().decorations.keys().cloned().collect()
    }

    /// Returns the decoration stored under `name`.
    ///
    /// A back-reference whose server has been dropped reads as `null`.
    #[must_use]
    pub fn decoration(&self, name: &str) -> Option<Decoration<Self>> {
        self.core.decoration(name)
    }

    /// Attaches a server-wide decoration.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::DecorationExists`] if `name` is taken.
    pub fn decorate(&self, name: &str, value: Decoration<Self>) -> Result<(), ServerError> {
        self.core.decorate(name, value)
    }

    /// Adds a hook run during [`Server::initialize`], in the order added.
    ///
    /// The hook receives a handle scoped to the realm it was added through.
    pub fn on_pre_start<F, Fut>(&self, hook: F)
    where
        F: Fn(Self) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        let run: Arc<dyn Fn(Self) -> BoxFuture<'static, Result<(), BoxError>> + Send + Sync> =
            Arc::new(move |server: Self| -> BoxFuture<'static, Result<(), BoxError>> {
                Box::pin(hook(server))
            });
        self.core.state().pre_start.push(PreStartHook {
            realm: Arc::clone(&self.realm),
            run,
        });
    }

    /// Subordinates `controlled`'s lifecycle to this server.
    pub fn control(&self, controlled: &Self) {
        self.core.state().controlled.push(controlled.clone());
    }

    /// Returns the current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.core.state().phase
    }

    /// Returns `true` when both handles share a server and a realm.
    #[must_use]
    pub fn is_same(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.core, &other.core) && Arc::ptr_eq(&self.realm, &other.realm)
    }

    /// Returns `true` when both handles belong to the same server.
    #[must_use]
    pub fn same_server(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.core, &other.core)
    }

    /// Registers plugins in order below this handle's realm.
    ///
    /// Each item's modifiers take precedence over `shared`. The plugin is
    /// recorded before its callback runs, so the callback already sees its
    /// own name in [`Server::registrations`].
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::AlreadyRegistered`] for duplicates,
    /// [`ServerError::InvalidPrefix`] for malformed prefixes, and
    /// [`ServerError::Callback`] when a plugin callback fails. Earlier
    /// items stay registered.
    pub async fn register(
        &self,
        registrations: Vec<Registration<Self>>,
        shared: &RegistrationModifiers,
    ) -> Result<(), ServerError> {
        for registration in registrations {
            let (plugin, options, modifiers) = registration.into_parts();
            let modifiers = modifiers.over(shared);
            let Prepared::Mount(realm) =
                self.core
                    .prepare(&self.realm, &plugin, &options, &modifiers)?
            else {
                debug!(
                    target: "plinth::server",
                    plugin = plugin.name(),
                    "skipping repeated registration"
                );
                continue;
            };
            debug!(
                target: "plinth::server",
                plugin = plugin.name(),
                prefix = realm.route_prefix(),
                "registering plugin"
            );
            plugin
                .register(self.scoped(realm), options)
                .await
                .map_err(ServerError::Callback)?;
        }
        Ok(())
    }

    /// Runs `on_pre_start` hooks, then initializes controlled servers.
    ///
    /// Initializing an initialized server is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::MissingDependency`] when a declared plugin
    /// dependency is absent, [`ServerError::InvalidPhase`] when called
    /// during initialization or after a failed one, and
    /// [`ServerError::Callback`] when a hook fails.
    pub fn initialize(&self) -> BoxFuture<'_, Result<(), ServerError>> {
        Box::pin(async move {
            let Some(hooks) = self.core.begin_initialize()? else {
                return Ok(());
            };
            for hook in hooks {
                let server = self.scoped(Arc::clone(&hook.realm));
                if let Err(source) = (hook.run)(server).await {
                    self.core.fail_initialize();
                    return Err(ServerError::Callback(source));
                }
            }
            let controlled = self.core.finish_initialize();
            info!(
                target: "plinth::server",
                controlled = controlled.len(),
                "server initialized"
            );
            for server in controlled {
                server.initialize().await?;
            }
            Ok(())
        })
    }
}

impl Host for Server {
    type Options = ServerOptions;

    fn create(options: Self::Options) -> Self {
        Self::new(options)
    }

    fn register(
        &self,
        registrations: Vec<Registration<Self>>,
        shared: &RegistrationModifiers,
    ) -> impl Future<Output = Result<(), BoxError>> + Send {
        async move {
            Self::register(self, registrations, shared)
                .await
                .map_err(ServerError::into_boxed)
        }
    }

    fn decorate(&self, name: &str, value: Decoration<Self>) -> Result<(), BoxError> {
        Self::decorate(self, name, value).map_err(ServerError::into_boxed)
    }

    fn decoration(&self, name: &str) -> Option<Decoration<Self>> {
        Self::decoration(self, name)
    }

    fn has_realm_parent(&self) -> bool {
        self.realm.parent().is_some()
    }

    fn control(&self, controlled: &Self) {
        Self::control(self, controlled);
    }

    fn initialize(&self) -> impl Future<Output = Result<(), BoxError>> + Send {
        async move {
            Self::initialize(self)
                .await
                .map_err(ServerError::into_boxed)
        }
    }

    fn is_same(&self, other: &Self) -> bool {
        Self::is_same(self, other)
    }
}
