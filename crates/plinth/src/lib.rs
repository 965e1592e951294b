//! Instantiate composable server plugins as standalone units.
//!
//! A plugin is normally consumed by registering it into a host. `plinth`
//! turns it inside out: [`instantiate`] creates (or reuses) a host, mounts
//! the plugin and hands back the host handle scoped to the plugin's realm.
//! That handle, the *instance*, lets a caller use the plugin's
//! functionality in isolation, with or without a surrounding application.
//!
//! When an existing host is supplied the new instance is *controlled* by
//! default: it lives in its own host whose lifecycle follows the supplied
//! one. Setting [`ComposeConfig::controlled`] to `false` registers the
//! plugin straight into the supplied host instead.
//!
//! The framework side is abstracted by the [`Host`] trait. The
//! [`server::Server`] type is an in-memory reference host implementing it.
//!
//! # Example
//!
//! ```
//! use futures::executor::block_on;
//! use plinth::{ComposeConfig, Instantiate, Plugin};
//! use plinth::server::Server;
//! use serde_json::{Value, json};
//!
//! let cache = Plugin::<Server>::new("cache", |server, options| async move {
//!     let size = options["size"].clone();
//!     server.on_pre_start(move |server| {
//!         let size = size.clone();
//!         async move {
//!             server.set_app("cache-size", size);
//!             Ok(())
//!         }
//!     });
//!     Ok(())
//! });
//!
//! let app = Server::default();
//! let instance = block_on(app.instance(cache, json!({ "size": 64 }), ComposeConfig::new()))
//!     .expect("instantiate");
//!
//! // Controlled instances start with their controller.
//! assert_eq!(instance.app().get("cache-size"), None);
//! block_on(app.initialize()).expect("initialize");
//! assert_eq!(instance.app().get("cache-size"), Some(&json!(64)));
//! assert_eq!(app.app().get("cache-size"), None::<&Value>);
//! ```

mod compose;
mod error;
mod factory;
mod host;
mod plugin;
pub mod server;
pub mod telemetry;

#[cfg(test)]
mod tests;

pub use self::compose::{ComposeConfig, Flags, instantiate};
pub use self::error::{ComposeError, ConflictingDecoration, InvalidComposition};
pub use self::factory::{Factory, Instantiate, to_factory};
pub use self::host::{BoxError, CONTROLLER_DECORATION, Decoration, Host, ROOT_DECORATION};
pub use self::plugin::{
    Dependencies, Plugin, PluginAttributes, PluginSource, RegisterFuture, Registration,
    RegistrationModifiers, RouteModifiers,
};
