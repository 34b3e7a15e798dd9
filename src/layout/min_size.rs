use super::{child_events, draw_child};
use perch_core::{
    BuildContext, Container, Definable, DrawContext, Element, ElementBase, ElementRef,
    EventContext, Node, NodeExt, Rejection, Size,
};

/// Raises the minimum size its single child is drawn at.
///
/// A zero minimum leaves that dimension alone. If a minimum exceeds the incoming maximum, the
/// maximum is raised to match.
#[derive(Debug)]
pub struct MinSize {
    base: ElementBase,
    pub min_width: f64,
    pub min_height: f64,
    child: Option<ElementRef>,
}

impl MinSize {
    pub fn new(base: ElementBase, min_width: f64, min_height: f64) -> MinSize {
        MinSize {
            base,
            min_width,
            min_height,
            child: None,
        }
    }

    /// Replaces the child.
    pub fn set_child(&mut self, child: Option<ElementRef>) {
        self.child = child;
    }
}

impl Definable for MinSize {
    const TYPE_NAME: &'static str = "layout.MinSize";

    fn from_definition(ctx: &BuildContext, node: &Node) -> anyhow::Result<MinSize> {
        Ok(MinSize::new(
            ElementBase::new(ctx.window(), ""),
            node.float("minWidth").unwrap_or(0.),
            node.float("minHeight").unwrap_or(0.),
        ))
    }
}

impl Container for MinSize {
    fn add_child(&mut self, child: ElementRef, _: Option<f32>) -> Result<(), Rejection> {
        self.set_child(Some(child));
        Ok(())
    }
}

impl Element for MinSize {
    fn handle_events(&mut self, ctx: &mut EventContext) {
        child_events(&self.child, ctx);
    }

    fn draw(&mut self, ctx: &mut DrawContext) -> Size {
        let mut cs = ctx.constraints;
        if self.min_width > 0. && cs.min.x < self.min_width {
            cs.min.x = self.min_width;
            cs.max.x = cs.max.x.max(cs.min.x);
        }
        if self.min_height > 0. && cs.min.y < self.min_height {
            cs.min.y = self.min_height;
            cs.max.y = cs.max.y.max(cs.min.y);
        }
        let child = &self.child;
        ctx.with_constraints(cs, |ctx| draw_child(child, ctx))
    }

    fn as_container(&mut self) -> Option<&mut dyn Container> {
        Some(self)
    }

    perch_core::impl_element_base!(base);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::test_util::{block, fills};
    use cgmath::Vector2;
    use perch_core::Constraints;

    #[test]
    fn raises_minimum_and_maximum() {
        let mut min = MinSize::new(ElementBase::new(None, ""), 40., 0.);
        min.add_child(block("a", 10., 10.), None).unwrap();

        let mut ctx = DrawContext::new(Vector2::new(100., 100.));
        ctx.constraints = Constraints::loose(Vector2::new(30., 100.));
        assert_eq!(min.draw(&mut ctx), Vector2::new(40., 10.));
        assert_eq!(fills(ctx.ops())[0].1, [0., 0., 40., 10.]);
        // restored afterwards
        assert_eq!(ctx.constraints, Constraints::loose(Vector2::new(30., 100.)));
    }
}
