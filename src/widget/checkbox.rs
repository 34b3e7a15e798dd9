use super::{draw_text, PointerHandlers, PointerState, TextStyle};
use cgmath::Vector2;
use perch_core::{
    Binding, BuildContext, Definable, DrawContext, DrawOp, Element, ElementBase, EventContext,
    Mirror, Node, NodeExt, Size,
};
use std::sync::Arc;

const BOX_SIZE: f64 = 18.;
const GAP: f64 = 8.;

/// A labeled check box. Clicking toggles the value.
#[derive(Debug)]
pub struct Checkbox {
    base: ElementBase,
    label: String,
    value: Arc<Mirror<bool>>,
    binding: Option<Arc<Binding<bool>>>,
    pub handlers: PointerHandlers,
    state: PointerState,
}

impl Checkbox {
    pub fn new(base: ElementBase, label: &str, value: bool) -> Checkbox {
        let value = Mirror::new(value, base.window());
        Checkbox {
            base,
            label: label.to_string(),
            value,
            binding: None,
            handlers: PointerHandlers::default(),
            state: PointerState::default(),
        }
    }

    /// Follows `binding` from now on, taking over its current value. `None` unbinds.
    pub fn bind(&mut self, binding: Option<Arc<Binding<bool>>>) {
        if let Some(old) = self.binding.take() {
            self.value.detach(&old);
        }
        if let Some(binding) = binding {
            self.value.attach(&binding);
            self.binding = Some(binding);
        }
    }

    pub fn value(&self) -> bool {
        self.value.get()
    }

    pub fn set_value(&mut self, value: bool) {
        self.value.set(value);
        self.base.invalidate();
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: &str) {
        self.label = label.to_string();
        self.base.invalidate();
    }
}

impl Definable for Checkbox {
    const TYPE_NAME: &'static str = "widget.Checkbox";

    fn from_definition(ctx: &BuildContext, node: &Node) -> anyhow::Result<Checkbox> {
        let mut checkbox = Checkbox::new(
            ElementBase::new(ctx.window(), ""),
            node.string("label").unwrap_or(""),
            node.bool("value").unwrap_or(false),
        );
        checkbox.bind(node.binding(ctx, "binding"));
        checkbox.handlers = PointerHandlers::from_definition(ctx, node);
        Ok(checkbox)
    }
}

impl Element for Checkbox {
    fn handle_events(&mut self, ctx: &mut EventContext) {
        let prev = self.state;
        let clicks = self.state.apply(ctx, self.base.id());
        if clicks % 2 == 1 {
            self.set_value(!self.value());
        }

        if let Some(binding) = &self.binding {
            self.value.write_back(binding);
        }
        self.handlers
            .fire(ctx, self.base.id(), prev, self.state, clicks);
    }

    fn draw(&mut self, ctx: &mut DrawContext) -> Size {
        let id = self.base.id().to_string();
        let text = ctx.metrics.measure(&self.label, super::TEXT_SIZE);
        let natural = Vector2::new(BOX_SIZE + GAP + text.x, BOX_SIZE.max(text.y));
        let size = ctx.constraints.constrain(natural);

        let square = Vector2::new(BOX_SIZE, BOX_SIZE);
        let box_offset = Vector2::new(0., (size.y - BOX_SIZE).max(0.) / 2.);
        ctx.with_offset(box_offset, |ctx| {
            let bounds = ctx.rect(square);
            ctx.push(DrawOp::Stroke {
                element: id.clone(),
                bounds,
                width: 2.,
                color: super::TEXT_COLOR,
            });
            if self.value.get() {
                ctx.push(DrawOp::Fill {
                    element: id.clone(),
                    bounds: bounds.inset(4., 4., 4., 4.),
                    color: super::ACCENT_COLOR,
                });
            }
        });

        let text_offset = Vector2::new(BOX_SIZE + GAP, (size.y - text.y).max(0.) / 2.);
        ctx.with_offset(text_offset, |ctx| {
            draw_text(ctx, &id, &self.label, TextStyle::default())
        });
        size
    }

    perch_core::impl_element_base!(base);
}
