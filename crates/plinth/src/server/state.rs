use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use futures::future::BoxFuture;
use serde_json::{Map, Value};

use super::{Realm, Server, ServerError, ServerOptions};
use crate::host::{BoxError, Decoration};
use crate::plugin::{Plugin, RegistrationModifiers};

/// Lifecycle phase of a server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    /// Created, not yet initialized.
    #[default]
    Stopped,
    /// `on_pre_start` hooks are running.
    Initializing,
    /// Initialization completed.
    Initialized,
    /// A hook failed during initialization.
    Invalid,
}

impl Phase {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Initializing => "initializing",
            Self::Initialized => "initialized",
            Self::Invalid => "invalid",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a server recorded about one plugin registration.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationInfo {
    name: String,
    version: Option<String>,
    options: Value,
    dependencies: Vec<String>,
}

impl RegistrationInfo {
    /// Returns the plugin name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the plugin version, when declared.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Returns the options the plugin was registered with.
    #[must_use]
    pub const fn options(&self) -> &Value {
        &self.options
    }

    /// Returns the declared dependencies.
    #[must_use]
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }
}

type HookFn = dyn Fn(Server) -> BoxFuture<'static, Result<(), BoxError>> + Send + Sync;

#[derive(Clone)]
pub(crate) struct PreStartHook {
    pub(crate) realm: Arc<Realm>,
    pub(crate) run: Arc<HookFn>,
}

/// Back-references are held weakly: a root decoration points at its own
/// server and a controller is owned by nobody below it.
pub(crate) enum StoredDecoration {
    Host { core: Weak<Core>, realm: Arc<Realm> },
    Value(Value),
}

pub(crate) enum Prepared {
    Mount(Arc<Realm>),
    Skip,
}

#[derive(Default)]
pub(crate) struct ServerState {
    pub(crate) app: Map<String, Value>,
    pub(crate) decorations: BTreeMap<String, StoredDecoration>,
    pub(crate) registrations: Vec<RegistrationInfo>,
    pub(crate) pre_start: Vec<PreStartHook>,
    pub(crate) controlled: Vec<Server>,
    pub(crate) phase: Phase,
}

pub(crate) struct Core {
    settings: ServerOptions,
    state: Mutex<ServerState>,
}

impl Core {
    pub(crate) fn new(settings: ServerOptions) -> Self {
        Self {
            settings,
            state: Mutex::new(ServerState::default()),
        }
    }

    pub(crate) const fn settings(&self) -> &ServerOptions {
        &self.settings
    }

    /// Locks the state; a panicked writer leaves no partial invariant
    /// behind, so poisoning is ignored.
    pub(crate) fn state(&self) -> MutexGuard<'_, ServerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn decoration(&self, name: &str) -> Option<Decoration<Server>> {
        let state = self.state();
        let stored = state.decorations.get(name)?;
        Some(match stored {
            StoredDecoration::Host { core, realm } => match core.upgrade() {
                Some(core) => Decoration::Host(Server {
                    core,
                    realm: Arc::clone(realm),
                }),
                None => Decoration::Value(Value::Null),
            },
            StoredDecoration::Value(value) => Decoration::Value(value.clone()),
        })
    }

    pub(crate) fn decorate(&self, name: &str, value: Decoration<Server>) -> Result<(), ServerError> {
        let mut state = self.state();
        if state.decorations.contains_key(name) {
            return Err(ServerError::DecorationExists {
                name: name.to_owned(),
            });
        }
        let stored = match value {
            Decoration::Host(server) => StoredDecoration::Host {
                core: Arc::downgrade(&server.core),
                realm: server.realm,
            },
            Decoration::Value(value) => StoredDecoration::Value(value),
        };
        state.decorations.insert(name.to_owned(), stored);
        Ok(())
    }

    /// Validates and records a registration, returning the realm to mount
    /// the plugin into.
    pub(crate) fn prepare(
        &self,
        parent: &Arc<Realm>,
        plugin: &Plugin<Server>,
        options: &Value,
        modifiers: &RegistrationModifiers,
    ) -> Result<Prepared, ServerError> {
        let name = plugin.name();
        let attributes = plugin.attributes();
        let mut state = self.state();

        if state.registrations.iter().any(|record| record.name == name) {
            if modifiers.once.unwrap_or(false) || attributes.once() {
                return Ok(Prepared::Skip);
            }
            if !attributes.multiple() {
                return Err(ServerError::AlreadyRegistered {
                    name: name.to_owned(),
                });
            }
        }

        if let Some(prefix) = &modifiers.routes.prefix
            && !prefix.starts_with('/')
        {
            return Err(ServerError::InvalidPrefix {
                plugin: name.to_owned(),
                prefix: prefix.clone(),
            });
        }

        if !state.registrations.iter().any(|record| record.name == name) {
            state.registrations.push(RegistrationInfo {
                name: name.to_owned(),
                version: attributes.version().map(str::to_owned),
                options: options.clone(),
                dependencies: attributes.dependencies().to_vec(),
            });
        }

        Ok(Prepared::Mount(Realm::child(
            parent,
            name,
            options.clone(),
            &modifiers.routes,
        )))
    }

    /// Moves the server into [`Phase::Initializing`] and returns the hooks to
    /// run, or `None` when it is already initialized.
    pub(crate) fn begin_initialize(&self) -> Result<Option<Vec<PreStartHook>>, ServerError> {
        let mut state = self.state();
        match state.phase {
            Phase::Initialized => return Ok(None),
            Phase::Stopped => {}
            phase @ (Phase::Initializing | Phase::Invalid) => {
                return Err(ServerError::InvalidPhase { phase });
            }
        }
        validate_dependencies(&state.registrations)?;
        state.phase = Phase::Initializing;
        Ok(Some(state.pre_start.clone()))
    }

    pub(crate) fn fail_initialize(&self) {
        self.state().phase = Phase::Invalid;
    }

    /// Marks the server initialized and returns the servers it controls.
    pub(crate) fn finish_initialize(&self) -> Vec<Server> {
        let mut state = self.state();
        state.phase = Phase::Initialized;
        state.controlled.clone()
    }
}

fn validate_dependencies(registrations: &[RegistrationInfo]) -> Result<(), ServerError> {
    for record in registrations {
        for dependency in &record.dependencies {
            if !registrations.iter().any(|other| &other.name == dependency) {
                return Err(ServerError::MissingDependency {
                    plugin: record.name.clone(),
                    dependency: dependency.clone(),
                });
            }
        }
    }
    Ok(())
}
