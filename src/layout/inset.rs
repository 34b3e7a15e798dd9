use super::{child_events, draw_child};
use cgmath::Vector2;
use perch_core::{
    BuildContext, Constraints, Container, Definable, DrawContext, Element, ElementBase,
    ElementRef, EventContext, Node, NodeExt, Rejection, Size,
};

/// Surrounds a single child with empty space.
#[derive(Debug)]
pub struct Inset {
    base: ElementBase,
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
    child: Option<ElementRef>,
}

impl Inset {
    pub fn new(base: ElementBase, top: f64, bottom: f64, left: f64, right: f64) -> Inset {
        Inset {
            base,
            top,
            bottom,
            left,
            right,
            child: None,
        }
    }

    /// Replaces the child.
    pub fn set_child(&mut self, child: Option<ElementRef>) {
        self.child = child;
    }

    pub fn child(&self) -> Option<&ElementRef> {
        self.child.as_ref()
    }
}

impl Definable for Inset {
    const TYPE_NAME: &'static str = "layout.Inset";

    fn from_definition(ctx: &BuildContext, node: &Node) -> anyhow::Result<Inset> {
        Ok(Inset::new(
            ElementBase::new(ctx.window(), ""),
            node.float("top").unwrap_or(0.),
            node.float("bottom").unwrap_or(0.),
            node.float("left").unwrap_or(0.),
            node.float("right").unwrap_or(0.),
        ))
    }
}

impl Container for Inset {
    fn add_child(&mut self, child: ElementRef, _: Option<f32>) -> Result<(), Rejection> {
        self.set_child(Some(child));
        Ok(())
    }
}

impl Element for Inset {
    fn handle_events(&mut self, ctx: &mut EventContext) {
        child_events(&self.child, ctx);
    }

    fn draw(&mut self, ctx: &mut DrawContext) -> Size {
        let cs = ctx.constraints;
        let edges = Vector2::new(self.left + self.right, self.top + self.bottom);
        let shrink = |s: Size| Vector2::new((s.x - edges.x).max(0.), (s.y - edges.y).max(0.));
        let inner = Constraints {
            min: shrink(cs.min),
            max: shrink(cs.max),
        };

        let child = &self.child;
        let size = ctx.with_offset(Vector2::new(self.left, self.top), |ctx| {
            ctx.with_constraints(inner, |ctx| draw_child(child, ctx))
        });
        cs.constrain(size + edges)
    }

    fn as_container(&mut self) -> Option<&mut dyn Container> {
        Some(self)
    }

    perch_core::impl_element_base!(base);
}
