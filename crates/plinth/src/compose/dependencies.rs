//! Registration of auxiliary plugins ahead of the primary plugin.

use tracing::debug;

use crate::error::ComposeError;
use crate::host::Host;
use crate::plugin::{Registration, RegistrationModifiers};

/// Mounts `dependencies` in order, sharing `shared` across the batch.
///
/// The first failure is returned unchanged; dependencies mounted before it
/// stay mounted.
pub(super) async fn register<H: Host>(
    host: &H,
    dependencies: Vec<Registration<H>>,
    shared: &RegistrationModifiers,
) -> Result<(), ComposeError> {
    if dependencies.is_empty() {
        return Ok(());
    }
    debug!(
        target: "plinth::compose",
        count = dependencies.len(),
        prefix = shared.routes.prefix.as_deref(),
        "registering dependencies"
    );
    host.register(dependencies, shared)
        .await
        .map_err(ComposeError::Host)
}
