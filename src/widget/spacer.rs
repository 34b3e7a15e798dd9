use cgmath::Vector2;
use perch_core::{
    BuildContext, Definable, DrawContext, Element, ElementBase, EventContext, Node, NodeExt, Size,
};

/// Empty space of a fixed size.
#[derive(Debug)]
pub struct Spacer {
    base: ElementBase,
    pub size: Size,
}

impl Spacer {
    pub fn new(base: ElementBase, width: f64, height: f64) -> Spacer {
        Spacer {
            base,
            size: Vector2::new(width, height),
        }
    }
}

impl Definable for Spacer {
    const TYPE_NAME: &'static str = "widget.Spacer";

    fn from_definition(ctx: &BuildContext, node: &Node) -> anyhow::Result<Spacer> {
        Ok(Spacer::new(
            ElementBase::new(ctx.window(), ""),
            node.float("width").unwrap_or(0.),
            node.float("height").unwrap_or(0.),
        ))
    }
}

impl Element for Spacer {
    fn handle_events(&mut self, _: &mut EventContext) {}

    fn draw(&mut self, ctx: &mut DrawContext) -> Size {
        ctx.constraints.constrain(self.size)
    }

    perch_core::impl_element_base!(base);
}
