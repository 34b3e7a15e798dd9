//! Declarative UIs from documents.
//!
//! Applications write a [`ViewModel`] holding their state as bindings, a document describing the
//! element tree, and a view that ties the two together (usually a wrapper around
//! [`ComposedView`]). A [`Host`] then runs the view frame by frame.

pub use perch_core;

pub mod config;
mod host;
pub mod icons;
pub mod layout;
#[macro_use]
mod view;
mod view_model;
pub mod widget;
mod worker;

pub use config::{ConfigError, WindowConfig};
pub use host::{EventSender, Frame, Host, HostWindow};
pub use view::{ComposedView, View, ViewContext, ViewError, ViewScreen};
pub use view_model::ViewModel;
pub use worker::Ticker;

use perch_core::Registry;

/// Returns a registry with every built-in layout and widget.
pub fn registry() -> Registry {
    let mut registry = Registry::new();
    registry.register_type::<layout::Flex>();
    registry.register_type::<layout::Inset>();
    registry.register_type::<layout::MinSize>();

    registry.register_type::<widget::Button>();
    registry.register_type::<widget::Checkbox>();
    registry.register_type::<widget::Graphic>();
    registry.register_type::<widget::IconButton>();
    registry.register_type::<widget::Input>();
    registry.register_type::<widget::Label>();
    registry.register_type::<widget::List>();
    registry.register_type::<widget::Loader>();
    registry.register_type::<widget::ProgressBar>();
    registry.register_type::<widget::Slider>();
    registry.register_type::<widget::Spacer>();
    registry
}
