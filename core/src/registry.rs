use crate::element::{element_ref, Element, ElementRef, WindowRef};
use crate::error::Error;
use crate::value::{Lookup, Node};
use core::fmt;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// What element constructors get to see besides their own node.
#[derive(Clone, Copy)]
pub struct BuildContext<'a> {
    /// The window the elements will live in.
    pub window: Option<&'a WindowRef>,
    /// Resolves function and binding references.
    pub lookup: &'a dyn Lookup,
}

impl<'a> BuildContext<'a> {
    pub fn new(window: Option<&'a WindowRef>, lookup: &'a dyn Lookup) -> BuildContext<'a> {
        BuildContext { window, lookup }
    }

    /// An owned handle to the window, for storing in elements.
    pub fn window(&self) -> Option<WindowRef> {
        self.window.cloned()
    }
}

/// Creates an element from its document node.
pub type Constructor =
    Arc<dyn Fn(&BuildContext, &Node) -> anyhow::Result<ElementRef> + Send + Sync>;

/// An element type that can be created from a document node.
pub trait Definable: Element + Sized {
    /// The name documents use in their `type` key.
    const TYPE_NAME: &'static str;

    /// Creates the element. Structural keys (`type`, `id`, `weight`, `children`, `child`) are
    /// handled by the caller; the id is applied after construction.
    fn from_definition(ctx: &BuildContext, node: &Node) -> anyhow::Result<Self>;
}

/// Element constructors by type name.
///
/// Types are registered up front with `&mut` access; definitions are then built against a shared
/// reference, so the table cannot change while documents are being read.
#[derive(Default, Clone)]
pub struct Registry {
    constructors: HashMap<String, Constructor>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Registry {
        Registry::default()
    }

    /// Registers a constructor under a type name, replacing any previous one.
    pub fn register<F>(&mut self, name: &str, constructor: F)
    where
        F: Fn(&BuildContext, &Node) -> anyhow::Result<ElementRef> + Send + Sync + 'static,
    {
        if self
            .constructors
            .insert(name.to_string(), Arc::new(constructor))
            .is_some()
        {
            warn!(type_name = name, "element type registered twice; replacing previous constructor");
        } else {
            debug!(type_name = name, "registered element type");
        }
    }

    /// Registers a [`Definable`] type under its own type name.
    pub fn register_type<T: Definable>(&mut self) {
        self.register(T::TYPE_NAME, |ctx, node| {
            Ok(element_ref(T::from_definition(ctx, node)?))
        });
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Registered type names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.constructors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Creates an element of the named type from a node.
    pub fn instantiate(
        &self,
        ctx: &BuildContext,
        name: &str,
        node: &Node,
    ) -> Result<ElementRef, Error> {
        self.instantiate_at(ctx, name, node, "root")
    }

    /// Same as `instantiate`, with the node path used in errors.
    pub(crate) fn instantiate_at(
        &self,
        ctx: &BuildContext,
        name: &str,
        node: &Node,
        path: &str,
    ) -> Result<ElementRef, Error> {
        let constructor = self.constructors.get(name).ok_or_else(|| Error::UnknownType {
            type_name: name.to_string(),
            path: path.to_string(),
        })?;
        constructor(ctx, node).map_err(|source| Error::Constructor {
            type_name: name.to_string(),
            path: path.to_string(),
            source,
        })
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Registry")
            .field("types", &self.names())
            .finish()
    }
}
