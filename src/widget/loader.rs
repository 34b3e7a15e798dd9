use cgmath::Vector2;
use core::f64::consts::TAU;
use perch_core::{
    BuildContext, Color, Definable, DrawContext, DrawOp, Element, ElementBase, EventContext, Node,
    NodeExt, Size,
};
use std::time::Instant;

/// Diameter when the constraints leave the choice to the loader.
const DEFAULT_DIAMETER: f64 = 24.;
/// Part of the circle the spinning arc covers.
const SWEEP: f64 = TAU * 0.75;

/// An indeterminate progress indicator: an arc that keeps spinning.
///
/// A loader requests a new frame every time it is drawn.
#[derive(Debug)]
pub struct Loader {
    base: ElementBase,
    pub color: Color,
    started: Instant,
}

impl Loader {
    pub fn new(base: ElementBase) -> Loader {
        Loader {
            base,
            color: super::ACCENT_COLOR,
            started: Instant::now(),
        }
    }
}

impl Definable for Loader {
    const TYPE_NAME: &'static str = "widget.Loader";

    fn from_definition(ctx: &BuildContext, node: &Node) -> anyhow::Result<Loader> {
        let mut loader = Loader::new(ElementBase::new(ctx.window(), ""));
        if let Some(color) = node.color("color") {
            loader.color = color;
        }
        Ok(loader)
    }
}

impl Element for Loader {
    fn handle_events(&mut self, _: &mut EventContext) {}

    fn draw(&mut self, ctx: &mut DrawContext) -> Size {
        let cs = ctx.constraints;
        let diameter = if cs.min.x > 0. {
            cs.min.x
        } else {
            DEFAULT_DIAMETER
        };
        let size = cs.constrain(Vector2::new(diameter, diameter));

        // one turn per second
        let start = self.started.elapsed().as_secs_f64().fract() * TAU;
        let bounds = ctx.rect(size);
        ctx.push(DrawOp::Arc {
            element: self.base.id().to_string(),
            bounds,
            start,
            sweep: SWEEP,
            width: size.x.min(size.y) / 10.,
            color: self.color,
        });
        self.base.invalidate();
        size
    }

    perch_core::impl_element_base!(base);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::test_util::{CountingWindow, Env};
    use perch_core::WindowRef;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn spins_in_its_color() {
        let window = Arc::new(CountingWindow::default());
        let window_ref: WindowRef = window.clone();
        let mut loader: Loader =
            Env::default().build(Some(&window_ref), json!({ "color": "#ff0000" }));
        assert_eq!(loader.color, Color::rgb8(255, 0, 0));

        let mut ctx = DrawContext::new(Vector2::new(100., 100.));
        ctx.constraints = perch_core::Constraints::loose(Vector2::new(100., 100.));
        let before = window.count();
        assert_eq!(loader.draw(&mut ctx), Vector2::new(24., 24.));
        assert_eq!(window.count(), before + 1);

        match &ctx.ops()[..] {
            [DrawOp::Arc {
                start,
                sweep,
                color,
                ..
            }] => {
                assert!((0. ..TAU).contains(start));
                assert_eq!(*sweep, SWEEP);
                assert_eq!(*color, Color::rgb8(255, 0, 0));
            }
            other => panic!("expected one arc, got {other:?}"),
        }
    }

    #[test]
    fn fills_a_minimum_width() {
        let mut loader = Loader::new(ElementBase::new(None, "l"));
        let mut ctx = DrawContext::new(Vector2::new(48., 48.));
        assert_eq!(loader.draw(&mut ctx), Vector2::new(48., 48.));
    }
}
