use perch_core::{
    Binding, BuildContext, Color, Definable, DrawContext, DrawOp, Element, ElementBase,
    EventContext, Mirror, Node, NodeExt, Size,
};
use cgmath::Vector2;
use std::sync::Arc;

const HEIGHT: f64 = 4.;

/// Shows progress between 0 and 1 as a horizontal bar.
#[derive(Debug)]
pub struct ProgressBar {
    base: ElementBase,
    value: Arc<Mirror<f32>>,
    binding: Option<Arc<Binding<f32>>>,
    pub color: Color,
}

impl ProgressBar {
    pub fn new(base: ElementBase, value: f32) -> ProgressBar {
        let value = Mirror::new(value, base.window());
        ProgressBar {
            base,
            value,
            binding: None,
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

    pub fn set_value(&mut self, value: f32) {
        self.value.set(value);
        self.base.invalidate();
    }
}

impl Definable for ProgressBar {
    const TYPE_NAME: &'static str = "widget.ProgressBar";

    fn from_definition(ctx: &BuildContext, node: &Node) -> anyhow::Result<ProgressBar> {
        let mut bar = ProgressBar::new(
            ElementBase::new(ctx.window(), ""),
            node.float32("value").unwrap_or(0.),
        );
        if let Some(color) = node.color("color") {
            bar.color = color;
        }
        bar.bind(node.binding(ctx, "binding"));
        Ok(bar)
    }
}

impl Element for ProgressBar {
    fn handle_events(&mut self, _: &mut EventContext) {
        if let Some(binding) = &self.binding {
            self.value.write_back(binding);
        }
    }

    fn draw(&mut self, ctx: &mut DrawContext) -> Size {
        let max = ctx.constraints.max.x;
        let width = if max.is_finite() { max } else { 0. };
        let size = ctx.constraints.constrain(Vector2::new(width, HEIGHT));
        let progress = f64::from(self.value.get()).clamp(0., 1.);

        let mut track = self.color;
        track.a *= 0.25;
        let id = self.base.id();
        ctx.push(DrawOp::Fill {
            element: id.to_string(),
            bounds: ctx.rect(size),
            color: track,
        });
        ctx.push(DrawOp::Fill {
            element: id.to_string(),
            bounds: ctx.rect(Vector2::new(size.x * progress, size.y)),
            color: self.color,
        });
        size
    }

    perch_core::impl_element_base!(base);
}
