//! Registration of the primary plugin and capture of its instance.

use std::num::FpCategory;
use std::sync::{Arc, OnceLock};

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ComposeError;
use crate::host::Host;
use crate::plugin::{Plugin, Registration, RegistrationModifiers};

/// Out-slot filled with the realm-scoped host handed to the primary plugin.
struct InstanceSlot<H>(Arc<OnceLock<H>>);

impl<H> Clone for InstanceSlot<H> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<H: Clone> InstanceSlot<H> {
    fn new() -> Self {
        Self(Arc::new(OnceLock::new()))
    }

    fn fill(&self, host: &H) {
        self.0.get_or_init(|| host.clone());
    }

    fn take(&self) -> Option<H> {
        self.0.get().cloned()
    }
}

#[derive(Deserialize)]
struct WrappedOptions {
    options: Value,
    #[serde(flatten)]
    modifiers: RegistrationModifiers,
}

/// Splits invocation options into plugin options and registration
/// modifiers.
///
/// An object with a truthy `options` member is read as
/// `{ options, routes?, once? }`. Anything else, including an object whose
/// own plugin options merely contain a falsy `options` key, is the plugin
/// options as a whole. A falsy value (`null`, `false`, `0` or `""`) stands
/// for empty options.
pub(super) fn split_options(
    options: Value,
) -> Result<(Value, RegistrationModifiers), ComposeError> {
    match options {
        falsy if !is_truthy(&falsy) => {
            Ok((Value::Object(Map::new()), RegistrationModifiers::default()))
        }
        Value::Object(map) if map.get("options").is_some_and(is_truthy) => {
            let wrapped: WrappedOptions = serde_json::from_value(Value::Object(map))
                .map_err(|source| ComposeError::InvalidOptions { source })?;
            Ok((wrapped.options, wrapped.modifiers))
        }
        other => Ok((other, RegistrationModifiers::default())),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number
            .as_f64()
            .is_some_and(|n| !matches!(n.classify(), FpCategory::Zero | FpCategory::Nan)),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Mounts the primary plugin and returns the handle its callback received.
pub(super) async fn register<H: Host>(
    host: &H,
    plugin: Plugin<H>,
    options: Value,
) -> Result<H, ComposeError> {
    let (plugin_options, modifiers) = split_options(options)?;
    let name = plugin.name().to_owned();

    let slot = InstanceSlot::new();
    let capture = slot.clone();
    let plugin = plugin.intercept(move |scoped: &H| capture.fill(scoped));
    let registration = Registration::new(plugin)
        .with_options(plugin_options)
        .with_modifiers(modifiers);

    debug!(target: "plinth::compose", plugin = name.as_str(), "registering primary plugin");
    host.register(vec![registration], &RegistrationModifiers::default())
        .await
        .map_err(ComposeError::Host)?;

    slot.take()
        .ok_or(ComposeError::NotRegistered { plugin: name })
}
