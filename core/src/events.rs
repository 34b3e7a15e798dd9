//! Frame input and drawing contexts.
//!
//! The host collects input for a frame, hands it to the element tree through an [`EventContext`]
//! and then asks the tree to draw itself into a [`DrawContext`]. Events are routed by element id;
//! hit testing is the host’s job.

use crate::color::Color;
use crate::element::WindowRef;
use crate::rect::{Constraints, Rect, Size};
use cgmath::{Point2, Vector2};

/// Phases of a pointer interaction with an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerPhase {
    /// The pointer started hovering over the element.
    Enter,
    /// The pointer stopped hovering over the element.
    Leave,
    /// A button was pressed down on the element.
    Press,
    /// The button was released over the element.
    Release,
}

/// An input event targeting one element.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Pointer { target: String, phase: PointerPhase },
    /// Replaces the text of an editable element.
    Text { target: String, text: String },
    /// Sets the value of a value-carrying element such as a slider.
    Value { target: String, value: f64 },
    /// The user confirmed the element’s content (e.g. pressed return in an input).
    Submit { target: String },
}

impl Event {
    /// The id of the element this event is addressed to.
    pub fn target(&self) -> &str {
        match self {
            Event::Pointer { target, .. }
            | Event::Text { target, .. }
            | Event::Value { target, .. }
            | Event::Submit { target } => target,
        }
    }
}

/// Per-frame event handling context.
#[derive(Default)]
pub struct EventContext {
    events: Vec<Event>,
    window: Option<WindowRef>,
}

impl EventContext {
    pub fn new(events: Vec<Event>, window: Option<WindowRef>) -> EventContext {
        EventContext { events, window }
    }

    /// All events of this frame, in arrival order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Events addressed to the element with the given id.
    pub fn events_for<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Event> + 'a {
        self.events.iter().filter(move |e| e.target() == id)
    }

    pub fn window(&self) -> Option<&WindowRef> {
        self.window.as_ref()
    }
}

/// A single entry of the display list.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Fills a rectangle.
    Fill {
        element: String,
        bounds: Rect,
        color: Color,
    },
    /// Outlines a rectangle.
    Stroke {
        element: String,
        bounds: Rect,
        width: f64,
        color: Color,
    },
    /// Draws a run of text.
    Text {
        element: String,
        bounds: Rect,
        text: String,
        size: f64,
        color: Color,
    },
    /// Draws a named icon scaled to the bounds.
    Icon {
        element: String,
        bounds: Rect,
        name: String,
        color: Color,
    },
    /// Strokes part of the ellipse inscribed in the bounds. Angles are in radians, clockwise from
    /// the positive x axis.
    Arc {
        element: String,
        bounds: Rect,
        start: f64,
        sweep: f64,
        width: f64,
        color: Color,
    },
}

impl DrawOp {
    pub fn bounds(&self) -> Rect {
        match self {
            DrawOp::Fill { bounds, .. }
            | DrawOp::Stroke { bounds, .. }
            | DrawOp::Text { bounds, .. }
            | DrawOp::Icon { bounds, .. }
            | DrawOp::Arc { bounds, .. } => *bounds,
        }
    }

    /// Moves the op by `offset`.
    pub fn translate(&mut self, offset: Vector2<f64>) {
        match self {
            DrawOp::Fill { bounds, .. }
            | DrawOp::Stroke { bounds, .. }
            | DrawOp::Text { bounds, .. }
            | DrawOp::Icon { bounds, .. }
            | DrawOp::Arc { bounds, .. } => bounds.origin += offset,
        }
    }
}

/// Ops drawn into a scratch context, positioned relative to the point they were drawn at.
#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    /// The size the drawing reported.
    pub size: Size,
    ops: Vec<DrawOp>,
}

/// Fixed text metrics; a stand-in for real text shaping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    /// Horizontal advance per character, as a fraction of the text size.
    pub advance: f64,
    /// Line height, as a fraction of the text size.
    pub line_height: f64,
}

impl Default for TextMetrics {
    fn default() -> Self {
        TextMetrics {
            advance: 0.5,
            line_height: 1.2,
        }
    }
}

impl TextMetrics {
    /// Measures a single line of text at the given size.
    pub fn measure(&self, text: &str, size: f64) -> Size {
        let chars = text.chars().count() as f64;
        Vector2::new(chars * size * self.advance, size * self.line_height)
    }
}

/// Per-frame drawing context.
///
/// Elements draw at the current origin within the current constraints and return the size they
/// took up. Layouts move the origin and narrow the constraints for their children.
pub struct DrawContext {
    pub constraints: Constraints,
    pub metrics: TextMetrics,
    origin: Point2<f64>,
    ops: Vec<DrawOp>,
}

impl DrawContext {
    /// Creates a context for a frame of the given size. The root element is made to fill it.
    pub fn new(size: Size) -> DrawContext {
        DrawContext {
            constraints: Constraints::tight(size),
            metrics: TextMetrics::default(),
            origin: Point2::new(0., 0.),
            ops: Vec::new(),
        }
    }

    pub fn origin(&self) -> Point2<f64> {
        self.origin
    }

    /// A rectangle of the given size at the current origin.
    pub fn rect(&self, size: Size) -> Rect {
        Rect::new(self.origin, size)
    }

    pub fn push(&mut self, op: DrawOp) {
        self.ops.push(op);
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<DrawOp> {
        self.ops
    }

    /// Runs `f` with the origin moved by `offset`; the origin is restored afterwards.
    pub fn with_offset<R>(&mut self, offset: Vector2<f64>, f: impl FnOnce(&mut Self) -> R) -> R {
        let prev = self.origin;
        self.origin = prev + offset;
        let result = f(self);
        self.origin = prev;
        result
    }

    /// Runs `f` with different constraints; the constraints are restored afterwards.
    pub fn with_constraints<R>(
        &mut self,
        constraints: Constraints,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let prev = self.constraints;
        self.constraints = constraints;
        let result = f(self);
        self.constraints = prev;
        result
    }

    /// Draws with `f` into a scratch context at the origin, under the given constraints, and keeps
    /// the result for [`replay`](Self::replay). Layouts use this to size children before placing
    /// them.
    pub fn record(
        &self,
        constraints: Constraints,
        f: impl FnOnce(&mut DrawContext) -> Size,
    ) -> Recording {
        let mut scratch = DrawContext {
            constraints,
            metrics: self.metrics,
            origin: Point2::new(0., 0.),
            ops: Vec::new(),
        };
        let size = f(&mut scratch);
        Recording {
            size,
            ops: scratch.ops,
        }
    }

    /// Appends recorded ops, placed at the current origin moved by `offset`.
    pub fn replay(&mut self, recording: Recording, offset: Vector2<f64>) {
        let at = self.origin + offset - Point2::new(0., 0.);
        self.ops.extend(recording.ops.into_iter().map(|mut op| {
            op.translate(at);
            op
        }));
    }
}
