use crate::events::{DrawContext, EventContext};
use crate::rect::Size;
use core::any::Any;
use core::fmt;
use core::marker::PhantomData;
use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// Work that has to wait until no element is locked.
pub type Task = Box<dyn FnOnce() + Send>;

/// The host window an element lives in.
pub trait Window: Send + Sync {
    /// Requests a new frame.
    fn invalidate(&self);

    /// The window title.
    fn title(&self) -> String;

    /// Queues `task` to run once the current frame has released the element tree.
    ///
    /// Windows that are not driven by frames never hold the tree, so by default the task runs
    /// right away.
    fn defer(&self, task: Task) {
        task();
    }
}

/// A shared window handle.
pub type WindowRef = Arc<dyn Window>;

/// A shared, lockable element.
///
/// Parents hold their children through these; a [`Definition`](crate::Definition) additionally
/// indexes them weakly by id.
pub type ElementRef = Arc<Mutex<dyn Element>>;

/// Wraps an element into an [`ElementRef`].
pub fn element_ref<E: Element>(element: E) -> ElementRef {
    Arc::new(Mutex::new(element))
}

/// Generates a fresh element id.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// An instantiated UI element.
///
/// The host calls `handle_events` and then `draw` on the root once per frame; containers forward
/// both calls to their children.
pub trait Element: Any + fmt::Debug + Send {
    /// Processes this frame’s input.
    fn handle_events(&mut self, ctx: &mut EventContext);

    /// Draws the element at the context’s origin and returns the size it took up.
    fn draw(&mut self, ctx: &mut DrawContext) -> Size;

    /// The element id. Never empty.
    fn id(&self) -> &str;

    /// Sets the element id. An empty id is replaced with a generated one.
    fn set_id(&mut self, id: &str);

    /// The window this element belongs to, if it is attached to one.
    fn window(&self) -> Option<WindowRef>;

    /// Returns the container capability if this element can take children.
    fn as_container(&mut self) -> Option<&mut dyn Container> {
        None
    }

    /// For downcasting.
    fn as_any(&self) -> &dyn Any;

    /// For downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Why a container refused a child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub reason: String,
}

impl Rejection {
    pub fn new(reason: impl Into<String>) -> Rejection {
        Rejection {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

/// The capability of accepting children.
pub trait Container {
    /// Attaches a child.
    ///
    /// `weight` is `None` for rigid children; layouts that do not distinguish flexible children
    /// ignore it.
    fn add_child(&mut self, child: ElementRef, weight: Option<f32>) -> Result<(), Rejection>;
}

/// Id and window plumbing shared by element implementations.
#[derive(Clone)]
pub struct ElementBase {
    id: String,
    window: Option<WindowRef>,
}

impl ElementBase {
    /// Creates a base with the given id, or a generated one if `id` is empty.
    pub fn new(window: Option<WindowRef>, id: &str) -> ElementBase {
        let mut base = ElementBase {
            id: String::new(),
            window,
        };
        base.set_id(id);
        base
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: &str) {
        self.id = if id.is_empty() {
            generate_id()
        } else {
            id.to_string()
        };
    }

    pub fn window(&self) -> Option<WindowRef> {
        self.window.clone()
    }

    pub fn set_window(&mut self, window: Option<WindowRef>) {
        self.window = window;
    }

    /// Requests a new frame from the window, if any.
    pub fn invalidate(&self) {
        if let Some(window) = &self.window {
            window.invalidate();
        }
    }
}

impl fmt::Debug for ElementBase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ElementBase")
            .field("id", &self.id)
            .field("window", &self.window.as_ref().map(|w| w.title()))
            .finish()
    }
}

/// Implements the id, window and downcasting methods of [`Element`] by delegating to an
/// [`ElementBase`] field.
///
/// Syntax: `impl_element_base!(base_field);` inside an `impl Element for ...` block.
#[macro_export]
macro_rules! impl_element_base {
    ($base:ident) => {
        fn id(&self) -> &str {
            self.$base.id()
        }

        fn set_id(&mut self, id: &str) {
            self.$base.set_id(id);
        }

        fn window(&self) -> Option<$crate::WindowRef> {
            self.$base.window()
        }

        fn as_any(&self) -> &dyn ::core::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn ::core::any::Any {
            self
        }
    };
}

/// An element handle that has been checked to hold a `T`.
///
/// Handles may be taken and used from anywhere, including binding watchers and handlers that run
/// while the frame has the tree locked. [`lock`](TypedElement::lock) never blocks, and
/// [`update`](TypedElement::update) defers its change to the window while the element is busy.
pub struct TypedElement<T> {
    element: ElementRef,
    window: Option<WindowRef>,
    _type: PhantomData<fn() -> T>,
}

impl<T: Element> TypedElement<T> {
    /// Returns a typed handle unless the element is known not to be a `T`.
    ///
    /// The type can only be checked while the element is unlocked. A busy element is checked
    /// again whenever it is locked.
    pub fn new(element: ElementRef) -> Option<TypedElement<T>> {
        let window = match element.try_lock() {
            Some(e) if !e.as_any().is::<T>() => return None,
            Some(e) => e.window(),
            None => None,
        };
        Some(TypedElement {
            element,
            window,
            _type: PhantomData,
        })
    }

    /// Sets the window that deferred updates go to, if the element did not name one.
    pub fn with_window(mut self, window: Option<WindowRef>) -> TypedElement<T> {
        if self.window.is_none() {
            self.window = window;
        }
        self
    }

    /// Locks the element if it is free.
    ///
    /// Returns `None` while the element is locked elsewhere (for instance by the frame that is
    /// handling events) or if it turns out not to be a `T`.
    pub fn lock(&self) -> Option<MappedMutexGuard<'_, T>> {
        let guard = self.element.try_lock()?;
        MutexGuard::try_map(guard, |e| e.as_any_mut().downcast_mut::<T>()).ok()
    }

    /// Runs `f` on the element now if it is free, or on the window's deferred queue otherwise.
    ///
    /// Without a window, an update to a busy element is dropped.
    pub fn update(&self, f: impl FnOnce(&mut T) + Send + 'static) {
        if let Some(mut guard) = self.element.try_lock() {
            apply(&mut *guard, f);
            return;
        }
        match &self.window {
            Some(window) => {
                let element = Arc::clone(&self.element);
                window.defer(Box::new(move || apply(&mut *element.lock(), f)));
            }
            None => warn!(
                element = core::any::type_name::<T>(),
                "element is busy and has no window; update dropped"
            ),
        }
    }

    /// The untyped handle.
    pub fn element(&self) -> &ElementRef {
        &self.element
    }
}

fn apply<T: Element>(element: &mut dyn Element, f: impl FnOnce(&mut T)) {
    if let Some(element) = element.as_any_mut().downcast_mut::<T>() {
        f(element);
        return;
    }
    warn!(
        id = element.id(),
        expected = core::any::type_name::<T>(),
        "element is not of the expected type; update dropped"
    );
}

impl<T> Clone for TypedElement<T> {
    fn clone(&self) -> Self {
        TypedElement {
            element: Arc::clone(&self.element),
            window: self.window.clone(),
            _type: PhantomData,
        }
    }
}

impl<T> fmt::Debug for TypedElement<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "TypedElement<{}>", core::any::type_name::<T>())
    }
}
