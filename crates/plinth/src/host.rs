//! Capability surface consumed from the hosting framework.
//!
//! `plinth` never reaches into a host's routing, transport or realm tree. It
//! needs exactly the operations on [`Host`]: build a fresh host, mount
//! plugins, attach and inspect server-wide decorations, subordinate another
//! host's lifecycle, and run the initialization phase.

use std::future::Future;

use crate::plugin::{Registration, RegistrationModifiers};

/// Boxed error produced by host operations and plugin callbacks.
///
/// Errors raised by user code travel through this type unchanged so callers
/// can downcast them back to their concrete type.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Decoration name holding the outermost owning host.
pub const ROOT_DECORATION: &str = "root";

/// Decoration name holding the host that controls this one.
pub const CONTROLLER_DECORATION: &str = "controller";

/// A named capability attached to every realm view of a host.
#[derive(Debug, Clone)]
pub enum Decoration<H> {
    /// Back-reference to a host.
    Host(H),
    /// Arbitrary data, `null` included.
    Value(serde_json::Value),
}

/// A composition node that plugins are registered into.
///
/// Implementations are cheap handles: cloning yields another view of the
/// same node. A host obtained from [`Host::create`] sits at the root of its
/// realm tree; the handle a plugin receives in its register callback is
/// scoped to that plugin's realm.
pub trait Host: Clone + Send + Sync + Sized + 'static {
    /// Construction parameters for a new host.
    type Options: Default + Send;

    /// Builds a new, uncontrolled root host.
    fn create(options: Self::Options) -> Self;

    /// Mounts each registration in order, applying `shared` modifiers to
    /// every item of the batch.
    ///
    /// A failure aborts the remaining items; items already mounted stay
    /// mounted.
    fn register(
        &self,
        registrations: Vec<Registration<Self>>,
        shared: &RegistrationModifiers,
    ) -> impl Future<Output = Result<(), BoxError>> + Send;

    /// Attaches a server-wide decoration.
    ///
    /// # Errors
    ///
    /// Fails when `name` is already decorated.
    fn decorate(&self, name: &str, value: Decoration<Self>) -> Result<(), BoxError>;

    /// Returns the decoration registered under `name`.
    fn decoration(&self, name: &str) -> Option<Decoration<Self>>;

    /// Returns `true` when this handle's realm has a parent realm.
    fn has_realm_parent(&self) -> bool;

    /// Makes `controlled`'s lifecycle subordinate to this host.
    fn control(&self, controlled: &Self);

    /// Runs the pre-start lifecycle, including every controlled host.
    fn initialize(&self) -> impl Future<Output = Result<(), BoxError>> + Send;

    /// Returns `true` when both handles denote the same host realm view.
    fn is_same(&self, other: &Self) -> bool;
}
