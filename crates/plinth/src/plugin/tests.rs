//! Unit tests for plugin descriptors and registration shapes.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::executor::block_on;
use rstest::{fixture, rstest};
use serde_json::json;

use super::*;
use crate::server::Server;

#[fixture]
fn plugin() -> Plugin<Server> {
    Plugin::new("my-plugin", |_server, _options| async { Ok(()) })
}

#[rstest]
fn new_plugin_has_default_attributes(plugin: Plugin<Server>) {
    assert_eq!(plugin.name(), "my-plugin");
    assert_eq!(plugin.attributes(), &PluginAttributes::default());
}

#[rstest]
fn builders_set_attributes(plugin: Plugin<Server>) {
    let plugin = plugin
        .with_version("2.1.0")
        .with_once(true)
        .with_multiple(true)
        .with_dependencies(["auth", "store"]);
    let attributes = plugin.attributes();
    assert_eq!(attributes.version(), Some("2.1.0"));
    assert!(attributes.once());
    assert!(attributes.multiple());
    assert_eq!(attributes.dependencies(), ["auth", "store"]);
}

#[test]
fn register_invokes_callback_with_options() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let plugin = Plugin::<Server>::new("counter", move |_server, options| {
        let seen = Arc::clone(&seen);
        async move {
            assert_eq!(options, json!({ "some": "options" }));
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    });

    block_on(plugin.register(Server::default(), json!({ "some": "options" })))
        .expect("register callback");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[rstest]
fn intercept_observes_host_before_callback(plugin: Plugin<Server>) {
    let observed = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&observed);
    let plugin = plugin.intercept(move |_host: &Server| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    block_on(plugin.register(Server::default(), json!({}))).expect("register callback");
    assert_eq!(observed.load(Ordering::SeqCst), 1);
    assert_eq!(plugin.name(), "my-plugin");
}

#[rstest]
fn plugin_debug_omits_callback(plugin: Plugin<Server>) {
    let rendered = format!("{:?}", plugin.with_version("1.0.0"));
    assert!(rendered.starts_with("Plugin"), "{rendered}");
    assert!(rendered.contains("1.0.0"), "{rendered}");
}

#[rstest]
#[case::item_wins(
    RegistrationModifiers::default().with_prefix("/item").with_once(false),
    RegistrationModifiers::default().with_prefix("/shared").with_once(true),
    Some("/item"),
    Some(false),
)]
#[case::shared_fills_gaps(
    RegistrationModifiers::default(),
    RegistrationModifiers::default().with_prefix("/shared").with_once(true),
    Some("/shared"),
    Some(true),
)]
#[case::neither(
    RegistrationModifiers::default(),
    RegistrationModifiers::default(),
    None,
    None,
)]
fn modifiers_resolve_over_shared(
    #[case] item: RegistrationModifiers,
    #[case] shared: RegistrationModifiers,
    #[case] prefix: Option<&str>,
    #[case] once: Option<bool>,
) {
    let resolved = item.over(&shared);
    assert_eq!(resolved.routes.prefix.as_deref(), prefix);
    assert_eq!(resolved.once, once);
}

#[test]
fn vhost_resolves_independently_of_prefix() {
    let item = RegistrationModifiers::default().with_prefix("/item");
    let shared = RegistrationModifiers::default().with_vhost("example.com");
    let resolved = item.over(&shared);
    assert_eq!(resolved.routes.prefix.as_deref(), Some("/item"));
    assert_eq!(resolved.routes.vhost.as_deref(), Some("example.com"));
}

#[test]
fn modifiers_deserialize_from_registration_shape() {
    let modifiers: RegistrationModifiers =
        serde_json::from_value(json!({ "routes": { "prefix": "/x" }, "once": true }))
            .expect("deserialize modifiers");
    assert_eq!(modifiers, RegistrationModifiers::default().with_prefix("/x").with_once(true));
}

#[rstest]
fn registration_defaults_to_empty_options(plugin: Plugin<Server>) {
    let registration = Registration::new(plugin);
    assert_eq!(registration.options(), &json!({}));
    assert_eq!(registration.modifiers(), &RegistrationModifiers::default());
}

#[rstest]
fn wrapped_source_unwraps_to_inner_plugin(plugin: Plugin<Server>) {
    let source = PluginSource::from(
        Registration::new(plugin)
            .with_options(json!({ "ignored": true }))
            .with_prefix("/ignored"),
    );
    assert_eq!(source.into_plugin().name(), "my-plugin");
}

#[rstest]
fn dependencies_from_single_plugin(plugin: Plugin<Server>) {
    let dependencies = Dependencies::from(plugin);
    assert_eq!(dependencies.len(), 1);
    assert_eq!(dependencies.options(), &RegistrationModifiers::default());
}

#[test]
fn dependencies_keep_order_and_shared_options() {
    let first = Plugin::<Server>::new("first", |_server, _options| async { Ok(()) });
    let second = Plugin::<Server>::new("second", |_server, _options| async { Ok(()) });
    let dependencies = Dependencies::from(vec![first, second]).with_prefix("/x");

    let names: Vec<_> = dependencies
        .plugins()
        .iter()
        .map(|registration| registration.plugin().name())
        .collect();
    assert_eq!(names, ["first", "second"]);
    assert_eq!(dependencies.options().routes.prefix.as_deref(), Some("/x"));
    assert!(!dependencies.is_empty());
    assert!(Dependencies::<Server>::default().is_empty());
}
