use crate::layout::{along, main_of};
use perch_core::style::Axis;
use perch_core::{
    Binding, BuildContext, Color, Definable, DrawContext, DrawOp, Element, ElementBase, Event,
    EventContext, Mirror, Node, NodeExt, Size,
};
use std::sync::Arc;

const THICKNESS: f64 = 20.;
const TRACK: f64 = 4.;
/// Length used when the main axis is unbounded.
const DEFAULT_LENGTH: f64 = 200.;

/// Picks a value between 0 and 1.
///
/// The host sends [`Event::Value`] with the position the user dragged to.
#[derive(Debug)]
pub struct Slider {
    base: ElementBase,
    value: Arc<Mirror<f32>>,
    binding: Option<Arc<Binding<f32>>>,
    pub axis: Axis,
    pub color: Color,
}

impl Slider {
    pub fn new(base: ElementBase, axis: Axis) -> Slider {
        let value = Mirror::new(0., base.window());
        Slider {
            base,
            value,
            binding: None,
            axis,
            color: super::ACCENT_COLOR,
        }
    }

    /// Follows `binding` from now on, taking over its current value. `None` unbinds.
    pub fn bind(&mut self, binding: Option<Arc<Binding<f32>>>) {
        if let Some(old) = self.binding.take() {
            self.value.detach(&old);
        }
        if let Some(binding) = binding {
            self.value.attach(&binding);
            self.binding = Some(binding);
            self.base.invalidate();
        }
    }

    pub fn value(&self) -> f32 {
        self.value.get()
    }

    /// Sets the value, clamped to `0..=1`.
    pub fn set_value(&mut self, value: f32) {
        self.value.set(value.clamp(0., 1.));
        self.base.invalidate();
    }
}

impl Definable for Slider {
    const TYPE_NAME: &'static str = "widget.Slider";

    fn from_definition(ctx: &BuildContext, node: &Node) -> anyhow::Result<Slider> {
        let mut slider = Slider::new(
            ElementBase::new(ctx.window(), ""),
            node.constant("axis").unwrap_or_default(),
        );
        if let Some(color) = node.color("color") {
            slider.color = color;
        }
        slider.bind(node.binding(ctx, "binding"));
        Ok(slider)
    }
}

impl Element for Slider {
    fn handle_events(&mut self, ctx: &mut EventContext) {
        let dragged = ctx
            .events_for(self.base.id())
            .filter_map(|event| match event {
                Event::Value { value, .. } => Some(*value),
                _ => None,
            })
            .last();
        if let Some(value) = dragged {
            self.set_value(value as f32);
        }

        if let Some(binding) = &self.binding {
            self.value.write_back(binding);
        }
    }

    fn draw(&mut self, ctx: &mut DrawContext) -> Size {
        let axis = self.axis;
        let max = main_of(axis, ctx.constraints.max);
        let length = if max.is_finite() { max } else { DEFAULT_LENGTH };
        let size = ctx.constraints.constrain(along(axis, length, THICKNESS));
        let length = main_of(axis, size);

        let mut track = self.color;
        track.a *= 0.4;
        let value = f64::from(self.value.get());
        let track_offset = along(axis, 0., (THICKNESS - TRACK) / 2.);
        let id = self.base.id().to_string();

        ctx.with_offset(track_offset, |ctx| {
            let bounds = ctx.rect(along(axis, length, TRACK));
            ctx.push(DrawOp::Fill {
                element: id.clone(),
                bounds,
                color: track,
            });
            let bounds = ctx.rect(along(axis, length * value, TRACK));
            ctx.push(DrawOp::Fill {
                element: id.clone(),
                bounds,
                color: self.color,
            });
        });

        let thumb_offset = along(axis, ((length - THICKNESS) * value).max(0.), 0.);
        ctx.with_offset(thumb_offset, |ctx| {
            let bounds = ctx.rect(along(axis, THICKNESS, THICKNESS));
            ctx.push(DrawOp::Fill {
                element: id.clone(),
                bounds,
                color: self.color,
            });
        });
        size
    }

    perch_core::impl_element_base!(base);
}
