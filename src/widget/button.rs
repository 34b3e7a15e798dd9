use super::{draw_text, PointerHandlers, PointerState, TextStyle};
use cgmath::Vector2;
use perch_core::style::TextAlignment;
use perch_core::{
    BuildContext, Color, Definable, DrawContext, DrawOp, Element, ElementBase, EventContext, Node,
    NodeExt, Size,
};

const PADDING: Vector2<f64> = Vector2 { x: 12., y: 10. };

/// A pressable button with a text label.
#[derive(Debug)]
pub struct Button {
    base: ElementBase,
    label: String,
    pub background: Color,
    pub handlers: PointerHandlers,
    state: PointerState,
}

impl Button {
    pub fn new(base: ElementBase, label: &str) -> Button {
        Button {
            base,
            label: label.to_string(),
            background: super::ACCENT_COLOR,
            handlers: PointerHandlers::default(),
            state: PointerState::default(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: &str) {
        self.label = label.to_string();
        self.base.invalidate();
    }

    pub fn state(&self) -> PointerState {
        self.state
    }
}

impl Definable for Button {
    const TYPE_NAME: &'static str = "widget.Button";

    fn from_definition(ctx: &BuildContext, node: &Node) -> anyhow::Result<Button> {
        let mut button = Button::new(
            ElementBase::new(ctx.window(), ""),
            node.string("label").unwrap_or(""),
        );
        if let Some(color) = node.color("background") {
            button.background = color;
        }
        button.handlers = PointerHandlers::from_definition(ctx, node);
        Ok(button)
    }
}

impl Element for Button {
    fn handle_events(&mut self, ctx: &mut EventContext) {
        let prev = self.state;
        let clicks = self.state.apply(ctx, self.base.id());
        if prev != self.state {
            self.base.invalidate();
        }
        self.handlers
            .fire(ctx, self.base.id(), prev, self.state, clicks);
    }

    fn draw(&mut self, ctx: &mut DrawContext) -> Size {
        let cs = ctx.constraints;
        let text = ctx.metrics.measure(&self.label, super::TEXT_SIZE);
        let size = cs.constrain(text + PADDING * 2.);

        let mut background = self.background;
        if self.state.pressed {
            background.a *= 0.8;
        }
        let bounds = ctx.rect(size);
        ctx.push(DrawOp::Fill {
            element: self.base.id().to_string(),
            bounds,
            color: background,
        });

        let style = TextStyle {
            color: Color::rgb8(255, 255, 255),
            alignment: TextAlignment::Middle,
            ..Default::default()
        };
        let inner = size - PADDING * 2.;
        let offset = Vector2::new(PADDING.x, ((size.y - text.y) / 2.).max(0.));
        let id = self.base.id();
        ctx.with_offset(offset, |ctx| {
            ctx.with_constraints(perch_core::Constraints::tight(inner.map(|v| v.max(0.))), |ctx| {
                draw_text(ctx, id, &self.label, style)
            })
        });
        size
    }

    perch_core::impl_element_base!(base);
}
