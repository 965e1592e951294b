//! Errors raised while instantiating a plugin.
//!
//! Precondition violations carry stable, literal messages so callers and
//! tests can match on them. Failures raised by the host or by user callbacks
//! pass through [`ComposeError::Host`] untouched.

use thiserror::Error;

use crate::host::BoxError;

/// A structurally inconsistent composition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidComposition {
    /// Controlled composition was requested without a host to control it.
    #[error("a host must be specified when controlled composition is requested")]
    ControlledWithoutHost,
    /// Host options were given although no new host will be created.
    #[error(
        "host options are not allowed when a host is supplied and controlled composition is \
         disabled, as no new host will be created"
    )]
    HostOptionsWithoutNewHost,
    /// Root decoration was requested from a host that is not a realm root.
    #[error("cannot decorate root without access to a root host")]
    RootWithoutRealmAccess,
    /// Controller decoration was requested without a controlling host.
    #[error("cannot decorate controller when the instance is not controlled")]
    ControllerWithoutControl,
}

/// A decoration that already exists with a different target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConflictingDecoration {
    /// `root` already points at another host or value.
    #[error("cannot decorate root on a host that already has a different root decoration")]
    Root,
    /// `controller` is already decorated.
    #[error("cannot decorate controller on a host that already has a controller decoration")]
    Controller,
}

/// Errors arising from [`instantiate`](crate::instantiate).
#[derive(Debug, Error)]
pub enum ComposeError {
    /// The composition configuration is inconsistent.
    #[error(transparent)]
    Invalid(#[from] InvalidComposition),

    /// A requested decoration conflicts with an existing one.
    #[error(transparent)]
    Conflict(#[from] ConflictingDecoration),

    /// Invocation options in `{ options, routes, once }` form were malformed.
    #[error("invalid registration options: {source}")]
    InvalidOptions {
        /// Underlying deserialisation error.
        #[source]
        source: serde_json::Error,
    },

    /// The host never invoked the primary plugin's register callback.
    #[error("plugin '{plugin}' was not registered, so no instance was captured")]
    NotRegistered {
        /// Name of the primary plugin.
        plugin: String,
    },

    /// Failure reported by the host, a plugin callback or a lifecycle hook.
    #[error(transparent)]
    Host(BoxError),
}

impl ComposeError {
    /// Returns the composition precondition that failed, if any.
    #[must_use]
    pub const fn as_invalid(&self) -> Option<InvalidComposition> {
        match self {
            Self::Invalid(reason) => Some(*reason),
            _ => None,
        }
    }

    /// Returns the conflicting decoration, if any.
    #[must_use]
    pub const fn as_conflict(&self) -> Option<ConflictingDecoration> {
        match self {
            Self::Conflict(conflict) => Some(*conflict),
            _ => None,
        }
    }

    /// Attempts to view a host-reported failure as a concrete error type.
    #[must_use]
    pub fn downcast_host_ref<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        match self {
            Self::Host(source) => source.downcast_ref::<E>(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests;
