use crate::view_model::ViewModel;
use perch_core::{
    Bindable, BuildContext, Definition, DrawContext, Element, ElementBase, ElementRef,
    EventContext, Function, Lookup, Registry, Size, Source, TypedElement, WindowRef,
};
use cgmath::{Vector2, Zero};
use core::any::Any;
use core::fmt;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors from view initialization and destruction.
#[derive(Debug, Error)]
pub enum ViewError {
    #[error("failed to create definition")]
    Definition(#[from] perch_core::Error),
    #[error("view model failed")]
    ViewModel(#[source] anyhow::Error),
    #[error("host has been closed")]
    Closed,
}

/// What a view gets to see when it is initialized or destroyed.
#[derive(Clone, Copy)]
pub struct ViewContext<'a> {
    pub window: Option<&'a WindowRef>,
    pub registry: &'a Registry,
}

/// A top-level element that a host can show.
///
/// Views resolve the function and binding references of their documents, so they are also a
/// [`Lookup`].
pub trait View: Element + Lookup {
    /// Prepares the view for display. Called by the host before the first frame the view is shown
    /// in, and again if the view is shown anew.
    fn initialize(&mut self, ctx: &ViewContext) -> Result<(), ViewError>;

    /// Called by the host when the view is replaced or the host is closed.
    fn destroy(&mut self, ctx: &ViewContext) -> Result<(), ViewError>;
}

/// A document to build a view from.
#[derive(Clone)]
pub struct ViewScreen {
    pub source: Arc<dyn Source>,
    pub name: String,
}

impl ViewScreen {
    pub fn new(source: Arc<dyn Source>, name: impl Into<String>) -> ViewScreen {
        ViewScreen {
            source,
            name: name.into(),
        }
    }
}

impl fmt::Debug for ViewScreen {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("ViewScreen").field(&self.name).finish()
    }
}

/// A view made of a view model and a document.
///
/// Application views typically wrap one of these, export their callbacks with
/// [`export_function`](ComposedView::export_function), and delegate the element plumbing to it
/// with [`impl_composed_view!`](crate::impl_composed_view).
pub struct ComposedView {
    base: ElementBase,
    view_model: Arc<dyn ViewModel>,
    screen: Option<ViewScreen>,
    definition: Option<Definition>,
    root: Option<ElementRef>,
    functions: HashMap<String, Function>,
}

impl ComposedView {
    /// Creates a view. The view id is the screen name, if there is a screen.
    pub fn new(view_model: Arc<dyn ViewModel>, screen: Option<ViewScreen>) -> ComposedView {
        let id = screen.as_ref().map_or("", |s| s.name.as_str());
        ComposedView {
            base: ElementBase::new(None, id),
            view_model,
            screen,
            definition: None,
            root: None,
            functions: HashMap::new(),
        }
    }

    /// Makes a function available to documents under the given name.
    pub fn export_function(&mut self, name: &str, function: Function) {
        self.functions.insert(name.to_string(), function);
    }

    /// Sets the root element directly, for views without a document.
    pub fn set_root(&mut self, root: ElementRef) {
        self.root = Some(root);
    }

    pub fn root(&self) -> Option<&ElementRef> {
        self.root.as_ref()
    }

    pub fn view_model(&self) -> &Arc<dyn ViewModel> {
        &self.view_model
    }

    /// The built document, once the view has been initialized.
    pub fn definition(&self) -> Option<&Definition> {
        self.definition.as_ref()
    }

    pub fn element_by_id(&self, id: &str) -> Option<ElementRef> {
        self.definition.as_ref()?.element_by_id(id)
    }

    pub fn element_by_id_as<T: Element>(&self, id: &str) -> Option<TypedElement<T>> {
        self.definition.as_ref()?.element_by_id_as(id)
    }
}

impl View for ComposedView {
    fn initialize(&mut self, ctx: &ViewContext) -> Result<(), ViewError> {
        self.base.set_window(ctx.window.cloned());
        self.view_model.initialize().map_err(ViewError::ViewModel)?;

        if let Some(screen) = &self.screen {
            let source = Arc::clone(&screen.source);
            let name = screen.name.clone();
            let definition = {
                let build = BuildContext::new(ctx.window, &*self);
                Definition::load(&build, ctx.registry, &*source, &name)?
            };
            debug!(view = self.base.id(), ids = definition.len(), "built view");
            self.root = Some(Arc::clone(definition.root()));
            self.definition = Some(definition);
        }
        Ok(())
    }

    fn destroy(&mut self, _: &ViewContext) -> Result<(), ViewError> {
        self.view_model.destroy().map_err(ViewError::ViewModel)
    }
}

impl Element for ComposedView {
    fn handle_events(&mut self, ctx: &mut EventContext) {
        if let Some(root) = &self.root {
            root.lock().handle_events(ctx);
        }
    }

    fn draw(&mut self, ctx: &mut DrawContext) -> Size {
        match &self.root {
            Some(root) => root.lock().draw(ctx),
            None => Vector2::zero(),
        }
    }

    fn id(&self) -> &str {
        self.base.id()
    }

    fn set_id(&mut self, id: &str) {
        self.base.set_id(id);
    }

    fn window(&self) -> Option<WindowRef> {
        self.base.window()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl Lookup for ComposedView {
    fn find_function(&self, name: &str) -> Option<Function> {
        self.functions.get(name).cloned()
    }

    fn find_binding(&self, name: &str) -> Option<Arc<dyn Bindable>> {
        self.view_model.binding(name)
    }
}

impl fmt::Debug for ComposedView {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ComposedView")
            .field("id", &self.base.id())
            .field("screen", &self.screen)
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .field("definition", &self.definition)
            .finish()
    }
}

/// Implements [`Element`](perch_core::Element) and [`Lookup`](perch_core::Lookup) for a struct by
/// delegating to a [`ComposedView`] field. The struct still implements [`View`] itself, usually
/// by calling into the field first.
///
/// With `handle_events = method`, frames call `self.method(ctx)` instead, which should forward to
/// the field once it is done. Nothing in the tree is locked yet at that point.
///
/// Syntax:
///
/// ```text
/// impl_composed_view!(StructName, field_name);
/// impl_composed_view!(StructName, field_name, handle_events = method_name);
/// ```
#[macro_export]
macro_rules! impl_composed_view {
    (@impl $struct:ty, $field:ident, $this:ident, $ctx:ident, $handle:block) => {
        impl $crate::perch_core::Element for $struct {
            fn handle_events(&mut self, ctx: &mut $crate::perch_core::EventContext) {
                let $this = self;
                let $ctx = ctx;
                $handle
            }

            fn draw(&mut self, ctx: &mut $crate::perch_core::DrawContext) -> $crate::perch_core::Size {
                $crate::perch_core::Element::draw(&mut self.$field, ctx)
            }

            fn id(&self) -> &str {
                $crate::perch_core::Element::id(&self.$field)
            }

            fn set_id(&mut self, id: &str) {
                $crate::perch_core::Element::set_id(&mut self.$field, id)
            }

            fn window(&self) -> Option<$crate::perch_core::WindowRef> {
                $crate::perch_core::Element::window(&self.$field)
            }

            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::core::any::Any {
                self
            }
        }

        impl $crate::perch_core::Lookup for $struct {
            fn find_function(&self, name: &str) -> Option<$crate::perch_core::Function> {
                $crate::perch_core::Lookup::find_function(&self.$field, name)
            }

            fn find_binding(
                &self,
                name: &str,
            ) -> Option<::std::sync::Arc<dyn $crate::perch_core::Bindable>> {
                $crate::perch_core::Lookup::find_binding(&self.$field, name)
            }
        }
    };
    ($struct:ty, $field:ident) => {
        $crate::impl_composed_view!(@impl $struct, $field, this, ctx, {
            $crate::perch_core::Element::handle_events(&mut this.$field, ctx)
        });
    };
    ($struct:ty, $field:ident, handle_events = $method:ident) => {
        $crate::impl_composed_view!(@impl $struct, $field, this, ctx, { this.$method(ctx) });
    };
}
