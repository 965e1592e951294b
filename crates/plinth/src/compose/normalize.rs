//! Argument normalization: defaulting flags and flattening the dependency
//! batch. Pure reshaping with no side effects.

use crate::host::Host;
use crate::plugin::{Registration, RegistrationModifiers};

use super::ComposeConfig;

/// Effective composition flags after defaulting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flags {
    /// The new host's lifecycle is subordinate to the supplied host.
    pub controlled: bool,
    /// Initialization runs before the call returns.
    pub initialize: bool,
    /// The acquired host is decorated with `root`.
    pub decorate_root: bool,
    /// The acquired host is decorated with `controller`.
    pub decorate_controller: bool,
}

impl Flags {
    /// Fills unset flags from the call context.
    ///
    /// - `controlled` defaults to whether a host was supplied.
    /// - `initialize` defaults to whether no host was supplied.
    /// - `decorate_root` defaults to `controlled || !host_supplied`.
    /// - `decorate_controller` defaults to `controlled`.
    ///
    /// Explicit values are kept even when they contradict the context; the
    /// later phases reject the inconsistent ones.
    #[must_use]
    pub fn resolve(
        host_supplied: bool,
        controlled: Option<bool>,
        initialize: Option<bool>,
        decorate_root: Option<bool>,
        decorate_controller: Option<bool>,
    ) -> Self {
        let controlled = controlled.unwrap_or(host_supplied);
        Self {
            controlled,
            initialize: initialize.unwrap_or(!host_supplied),
            decorate_root: decorate_root.unwrap_or(controlled || !host_supplied),
            decorate_controller: decorate_controller.unwrap_or(controlled),
        }
    }
}

pub(super) struct Plan<H: Host> {
    pub(super) host_options: Option<H::Options>,
    pub(super) dependencies: Vec<Registration<H>>,
    pub(super) shared: RegistrationModifiers,
    pub(super) flags: Flags,
}

pub(super) fn plan<H: Host>(host_supplied: bool, compose: ComposeConfig<H>) -> Plan<H> {
    let flags = compose.flags(host_supplied);
    let (dependencies, shared) = compose
        .register
        .map(crate::plugin::Dependencies::into_parts)
        .unwrap_or_default();
    Plan {
        host_options: compose.host,
        dependencies,
        shared,
        flags,
    }
}
