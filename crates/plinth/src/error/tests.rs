//! Unit tests for composition error types.

use rstest::rstest;

use super::*;

#[derive(Debug, Error)]
#[error("user callback exploded")]
struct Exploded;

#[rstest]
#[case::controlled(
    InvalidComposition::ControlledWithoutHost,
    "a host must be specified when controlled composition is requested"
)]
#[case::root(
    InvalidComposition::RootWithoutRealmAccess,
    "cannot decorate root without access to a root host"
)]
#[case::controller(
    InvalidComposition::ControllerWithoutControl,
    "cannot decorate controller when the instance is not controlled"
)]
fn invalid_composition_messages_are_literal(
    #[case] reason: InvalidComposition,
    #[case] expected: &str,
) {
    assert_eq!(ComposeError::from(reason).to_string(), expected);
}

#[test]
fn host_options_message_explains_no_new_host() {
    let message = InvalidComposition::HostOptionsWithoutNewHost.to_string();
    assert!(
        message.contains("no new host will be created"),
        "unexpected message: {message}"
    );
}

#[test]
fn conflict_is_exposed_through_accessor() {
    let error = ComposeError::from(ConflictingDecoration::Root);
    assert_eq!(error.as_conflict(), Some(ConflictingDecoration::Root));
    assert_eq!(error.as_invalid(), None);
}

#[test]
fn host_errors_pass_through_verbatim() {
    let error = ComposeError::Host(Box::new(Exploded));
    assert_eq!(error.to_string(), "user callback exploded");
    assert!(error.downcast_host_ref::<Exploded>().is_some());
}

#[test]
fn not_registered_names_the_plugin() {
    let error = ComposeError::NotRegistered {
        plugin: "my-plugin".into(),
    };
    assert!(error.to_string().contains("my-plugin"));
}

#[test]
fn compose_error_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ComposeError>();
}
