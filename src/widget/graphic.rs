use anyhow::anyhow;
use core::fmt;
use perch_core::{
    BuildContext, Definable, DrawContext, Element, ElementBase, EventContext, Node, NodeExt,
    Painter, Size,
};

/// Draws with an application-supplied function.
pub struct Graphic {
    base: ElementBase,
    painter: Painter,
}

impl Graphic {
    pub fn new(base: ElementBase, painter: Painter) -> Graphic {
        Graphic { base, painter }
    }
}

impl Definable for Graphic {
    const TYPE_NAME: &'static str = "widget.Graphic";

    fn from_definition(ctx: &BuildContext, node: &Node) -> anyhow::Result<Graphic> {
        let painter = node
            .painter(ctx, "drawFunction")
            .ok_or_else(|| anyhow!("no draw function"))?;
        Ok(Graphic::new(ElementBase::new(ctx.window(), ""), painter))
    }
}

impl Element for Graphic {
    fn handle_events(&mut self, _: &mut EventContext) {}

    fn draw(&mut self, ctx: &mut DrawContext) -> Size {
        (self.painter)(ctx, self.base.id())
    }

    perch_core::impl_element_base!(base);
}

impl fmt::Debug for Graphic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Graphic").field("base", &self.base).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::test_util::Env;
    use cgmath::Vector2;
    use perch_core::{Color, DrawOp, Function};
    use serde_json::json;

    #[test]
    fn requires_a_draw_function() {
        let node: Node = json!({ "drawFunction": "missing" })
            .as_object()
            .cloned()
            .unwrap();
        let env = Env::default();
        let err = Graphic::from_definition(&BuildContext::new(None, &env), &node).unwrap_err();
        assert_eq!(err.to_string(), "no draw function");
    }

    #[test]
    fn draws_through_the_painter() {
        let mut env = Env::default();
        env.functions.insert(
            "dot".into(),
            Function::painter(|ctx, id| {
                let size = Vector2::new(3., 3.);
                let bounds = ctx.rect(size);
                ctx.push(DrawOp::Fill {
                    element: id.to_string(),
                    bounds,
                    color: Color::rgb8(0, 0, 0),
                });
                size
            }),
        );
        let mut graphic: Graphic = env.build(None, json!({ "drawFunction": "dot" }));
        let mut ctx = DrawContext::new(Vector2::new(10., 10.));
        assert_eq!(graphic.draw(&mut ctx), Vector2::new(3., 3.));
        assert_eq!(ctx.ops().len(), 1);
    }
}
