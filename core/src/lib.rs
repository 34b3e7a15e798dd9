//! Declarative UI core.
//!
//! # Conceptual overview
//! Perch builds element trees from documents and keeps them in sync with application state.
//!
//! ## Elements
//! Elements are the live objects of a UI: they handle input and draw themselves once per frame.
//! Every element has an id (explicit, or generated if the document does not name one) and may
//! belong to a window. Some elements are containers and accept children; the rest reject them.
//!
//! ## Documents and definitions
//! A document describes an element tree as nested mappings. Each mapping names an element type,
//! which is looked up in a [`Registry`] of constructors, and carries that element’s settings.
//! Constructors read their settings through [`NodeExt`], which never fails: a missing or mistyped
//! value is simply absent, and the constructor picks a default.
//!
//! Building a document yields a [`Definition`]: the root element, which owns the tree, plus a
//! flat index from document ids to elements. Building is all or nothing.
//!
//! Documents refer to application code by name. Function references resolve to one of the
//! [`Function`] signatures exported by the owning view, and binding references resolve to the
//! bindings of its view model. Both go through a [`Lookup`].
//!
//! ## Bindings
//! A [`Binding`] is a named observable value. Setting it to a new value notifies its watchers;
//! setting it to the value it already holds does nothing, so elements can write their state back
//! every frame without causing a cascade of redraws. Notifications that would re-enter a binding
//! while it is still notifying are queued and run after the current round.
//!
//! ## Coordinate System
//! The origin is at the top left corner of the window’s content area and positive y points down.

pub mod binding;
pub mod color;
pub mod definition;
pub mod element;
pub mod error;
pub mod events;
pub mod rect;
pub mod registry;
pub mod style;
pub mod value;

pub use binding::{
    Bindable, BindableList, Binding, BindingTable, BindingWatcher, ListBinding, Mirror, Ordered,
    StructBinding, StructListBinding,
};
pub use color::Color;
pub use definition::{Definition, DirSource, Format, Source, StaticSource};
pub use element::{
    element_ref, Container, Element, ElementBase, ElementRef, Rejection, Task, TypedElement,
    Window, WindowRef,
};
pub use error::Error;
pub use events::{DrawContext, DrawOp, Event, EventContext, PointerPhase, Recording, TextMetrics};
pub use rect::{Constraints, Rect, Size};
pub use registry::{BuildContext, Constructor, Definable, Registry};
pub use value::{
    Filter, Font, Function, Handler, ItemHandler, ItemRenderer, Lookup, NoLookup, Node, NodeExt,
    Painter,
};
