//! Host acquisition: reuse the supplied host or build a new one.

use tracing::debug;

use crate::error::{ComposeError, InvalidComposition};
use crate::host::Host;

/// Returns the host every later phase registers into.
///
/// The supplied host is reused only for uncontrolled composition. In every
/// other case a new host is built from `host_options`; in controlled mode
/// its lifecycle is handed to the supplied host.
pub(super) fn acquire<H: Host>(
    supplied: Option<&H>,
    controlled: bool,
    host_options: Option<H::Options>,
) -> Result<H, ComposeError> {
    if controlled && supplied.is_none() {
        return Err(InvalidComposition::ControlledWithoutHost.into());
    }
    if host_options.is_some() && !controlled && supplied.is_some() {
        return Err(InvalidComposition::HostOptionsWithoutNewHost.into());
    }

    match supplied {
        Some(host) if !controlled => {
            debug!(target: "plinth::compose", "registering into the supplied host");
            Ok(host.clone())
        }
        _ => {
            let created = H::create(host_options.unwrap_or_default());
            if let Some(controller) = supplied {
                debug!(target: "plinth::compose", "created host controlled by the supplied host");
                controller.control(&created);
            } else {
                debug!(target: "plinth::compose", "created standalone host");
            }
            Ok(created)
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::server::{Server, ServerOptions};

    #[test]
    fn controlled_without_host_is_rejected() {
        let err = acquire::<Server>(None, true, None).expect_err("should reject");
        assert_eq!(
            err.as_invalid(),
            Some(InvalidComposition::ControlledWithoutHost)
        );
    }

    #[test]
    fn host_options_with_uncontrolled_host_are_rejected() {
        let host = Server::default();
        let options = ServerOptions::default().with_app("some", "value".into());
        let err = acquire(Some(&host), false, Some(options)).expect_err("should reject");
        assert_eq!(
            err.as_invalid(),
            Some(InvalidComposition::HostOptionsWithoutNewHost)
        );
    }

    #[test]
    fn uncontrolled_supplied_host_is_reused() {
        let host = Server::default();
        let acquired = acquire(Some(&host), false, None).expect("acquire");
        assert!(acquired.is_same(&host));
    }

    #[rstest]
    #[case::standalone(false)]
    #[case::controlled(true)]
    fn new_host_is_created_from_options(#[case] controlled: bool) {
        let controller = Server::default();
        let supplied = controlled.then_some(&controller);
        let options = ServerOptions::default().with_app("some", "value".into());
        let acquired = acquire(supplied, controlled, Some(options)).expect("acquire");
        assert!(!acquired.same_server(&controller));
        assert_eq!(
            acquired.settings().app.get("some"),
            Some(&serde_json::json!("value"))
        );
    }
}
