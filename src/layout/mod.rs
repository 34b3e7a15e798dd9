//! Containers that size and place their children.

mod flex;
mod inset;
mod min_size;

pub use flex::Flex;
pub use inset::Inset;
pub use min_size::MinSize;

use cgmath::{Vector2, Zero};
use perch_core::style::Axis;
use perch_core::{DrawContext, ElementRef, EventContext, Size};

/// The component of `size` along the axis.
pub(crate) fn main_of(axis: Axis, size: Size) -> f64 {
    match axis {
        Axis::Horizontal => size.x,
        Axis::Vertical => size.y,
    }
}

/// The component of `size` across the axis.
pub(crate) fn cross_of(axis: Axis, size: Size) -> f64 {
    match axis {
        Axis::Horizontal => size.y,
        Axis::Vertical => size.x,
    }
}

/// Builds a size from its main and cross components.
pub(crate) fn along(axis: Axis, main: f64, cross: f64) -> Size {
    match axis {
        Axis::Horizontal => Vector2::new(main, cross),
        Axis::Vertical => Vector2::new(cross, main),
    }
}

fn child_events(child: &Option<ElementRef>, ctx: &mut EventContext) {
    if let Some(child) = child {
        child.lock().handle_events(ctx);
    }
}

fn draw_child(child: &Option<ElementRef>, ctx: &mut DrawContext) -> Size {
    match child {
        Some(child) => child.lock().draw(ctx),
        None => Vector2::zero(),
    }
}
