use thiserror::Error;

use super::Phase;
use crate::host::BoxError;

/// Errors raised by the reference [`Server`](super::Server).
#[derive(Debug, Error)]
pub enum ServerError {
    /// A server decoration with this name already exists.
    #[error("server decoration '{name}' is already defined")]
    DecorationExists {
        /// Decoration name.
        name: String,
    },

    /// A plugin with this name is already registered and is neither `once`
    /// nor `multiple`.
    #[error("plugin '{name}' is already registered")]
    AlreadyRegistered {
        /// Plugin name.
        name: String,
    },

    /// A route prefix did not start with `/`.
    #[error("plugin '{plugin}' has invalid route prefix '{prefix}': prefix must start with '/'")]
    InvalidPrefix {
        /// Plugin name.
        plugin: String,
        /// Rejected prefix.
        prefix: String,
    },

    /// A registered plugin depends on a plugin that is not registered.
    #[error("plugin '{plugin}' missing dependency '{dependency}'")]
    MissingDependency {
        /// Plugin declaring the dependency.
        plugin: String,
        /// Name of the unregistered dependency.
        dependency: String,
    },

    /// Initialization was requested while the server cannot initialize.
    #[error("cannot initialize server in phase '{phase}'")]
    InvalidPhase {
        /// Phase the server was in.
        phase: Phase,
    },

    /// Failure raised by a plugin callback or lifecycle hook.
    #[error(transparent)]
    Callback(BoxError),
}

impl ServerError {
    /// Converts into a [`BoxError`], handing callback failures back as the
    /// original error rather than wrapping them.
    #[must_use]
    pub fn into_boxed(self) -> BoxError {
        match self {
            Self::Callback(source) => source,
            other => Box::new(other),
        }
    }
}
