use std::sync::Arc;

use serde_json::{Map, Value};

use crate::plugin::RouteModifiers;

/// A position in a server's realm tree.
///
/// The root realm belongs to the server itself. Every registration creates a
/// child realm whose parent is the realm of the handle it was registered
/// through. A realm's parent never changes after creation.
#[derive(Debug)]
pub struct Realm {
    parent: Option<Arc<Self>>,
    plugin: Option<String>,
    plugin_options: Value,
    route: RouteModifiers,
}

impl Realm {
    pub(crate) fn root() -> Arc<Self> {
        Arc::new(Self {
            parent: None,
            plugin: None,
            plugin_options: Value::Object(Map::new()),
            route: RouteModifiers::default(),
        })
    }

    /// Creates a plugin realm below `parent`, nesting the route prefix.
    pub(crate) fn child(
        parent: &Arc<Self>,
        plugin: &str,
        plugin_options: Value,
        route: &RouteModifiers,
    ) -> Arc<Self> {
        let inherited = &parent.route;
        let prefix = match (&inherited.prefix, &route.prefix) {
            (Some(outer), Some(inner)) => Some(format!("{outer}{inner}")),
            (outer, inner) => inner.clone().or_else(|| outer.clone()),
        };
        let vhost = route.vhost.clone().or_else(|| inherited.vhost.clone());
        Arc::new(Self {
            parent: Some(Arc::clone(parent)),
            plugin: Some(plugin.to_owned()),
            plugin_options,
            route: RouteModifiers { prefix, vhost },
        })
    }

    /// Returns the parent realm; `None` for a server's root realm.
    #[must_use]
    pub const fn parent(&self) -> Option<&Arc<Self>> {
        self.parent.as_ref()
    }

    /// Returns the name of the plugin owning this realm.
    #[must_use]
    pub fn plugin(&self) -> Option<&str> {
        self.plugin.as_deref()
    }

    /// Returns the options the owning plugin was registered with.
    #[must_use]
    pub const fn plugin_options(&self) -> &Value {
        &self.plugin_options
    }

    /// Returns the effective route prefix.
    #[must_use]
    pub fn route_prefix(&self) -> Option<&str> {
        self.route.prefix.as_deref()
    }

    /// Returns the effective virtual host, inherited from the parent when
    /// the registration set none.
    #[must_use]
    pub fn route_vhost(&self) -> Option<&str> {
        self.route.vhost.as_deref()
    }
}
