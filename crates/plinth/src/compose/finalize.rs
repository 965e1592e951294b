//! Back-reference decorations and the initialization gate.

use tracing::debug;

use crate::error::{ComposeError, ConflictingDecoration, InvalidComposition};
use crate::host::{CONTROLLER_DECORATION, Decoration, Host, ROOT_DECORATION};

use super::Flags;

/// Applies the `root` and `controller` decorations requested by `flags`.
///
/// Redecorating `root` with the acquired host itself is skipped silently;
/// any other existing `root` is a conflict. An existing `controller` is
/// always a conflict.
pub(super) fn decorate<H: Host>(
    supplied: Option<&H>,
    acquired: &H,
    flags: Flags,
) -> Result<(), ComposeError> {
    if flags.decorate_root {
        decorate_root(acquired)?;
    }
    if flags.decorate_controller {
        decorate_controller(supplied, acquired, flags.controlled)?;
    }
    Ok(())
}

fn decorate_root<H: Host>(acquired: &H) -> Result<(), ComposeError> {
    if acquired.has_realm_parent() {
        return Err(InvalidComposition::RootWithoutRealmAccess.into());
    }
    match acquired.decoration(ROOT_DECORATION) {
        None => {
            debug!(target: "plinth::compose", "decorating root");
            acquired
                .decorate(ROOT_DECORATION, Decoration::Host(acquired.clone()))
                .map_err(ComposeError::Host)
        }
        Some(Decoration::Host(existing)) if existing.is_same(acquired) => {
            debug!(target: "plinth::compose", "root already decorated with this host");
            Ok(())
        }
        Some(_) => Err(ConflictingDecoration::Root.into()),
    }
}

fn decorate_controller<H: Host>(
    supplied: Option<&H>,
    acquired: &H,
    controlled: bool,
) -> Result<(), ComposeError> {
    if !controlled {
        return Err(InvalidComposition::ControllerWithoutControl.into());
    }
    if acquired.decoration(CONTROLLER_DECORATION).is_some() {
        return Err(ConflictingDecoration::Controller.into());
    }
    let controller = supplied.ok_or(InvalidComposition::ControlledWithoutHost)?;
    debug!(target: "plinth::compose", "decorating controller");
    acquired
        .decorate(CONTROLLER_DECORATION, Decoration::Host(controller.clone()))
        .map_err(ComposeError::Host)
}

/// Runs initialization when requested, on the supplied host if there is
/// one, otherwise on the acquired host.
///
/// Initializing a controlling host initializes the hosts it controls, so the
/// acquired host is covered in both cases.
pub(super) async fn initialize<H: Host>(
    supplied: Option<&H>,
    acquired: &H,
    flags: Flags,
) -> Result<(), ComposeError> {
    if !flags.initialize {
        return Ok(());
    }
    let target = supplied.unwrap_or(acquired);
    debug!(
        target: "plinth::compose",
        supplied = supplied.is_some(),
        "initializing host"
    );
    target.initialize().await.map_err(ComposeError::Host)
}
