use super::{PointerHandlers, PointerState};
use crate::icons::{self, Icon};
use cgmath::Vector2;
use perch_core::{
    BuildContext, Color, Definable, DrawContext, DrawOp, Element, ElementBase, EventContext, Node,
    NodeExt, Size,
};
use tracing::warn;

const ICON_SIZE: f64 = 24.;
const PADDING: f64 = 12.;

/// A pressable button showing an icon.
///
/// The description names the button's action for assistive technology; it is not drawn.
#[derive(Debug)]
pub struct IconButton {
    base: ElementBase,
    icon: Option<Icon>,
    description: String,
    pub background: Color,
    pub color: Color,
    pub handlers: PointerHandlers,
    state: PointerState,
}

impl IconButton {
    pub fn new(base: ElementBase, icon: &str, description: &str) -> IconButton {
        let mut button = IconButton {
            base,
            icon: None,
            description: description.to_string(),
            background: super::ACCENT_COLOR,
            color: Color::rgb8(255, 255, 255),
            handlers: PointerHandlers::default(),
            state: PointerState::default(),
        };
        button.icon = button.find_icon(icon);
        button
    }

    fn find_icon(&self, name: &str) -> Option<Icon> {
        let icon = icons::find(name);
        if icon.is_none() && !name.is_empty() {
            warn!(id = self.base.id(), icon = name, "unknown icon");
        }
        icon
    }

    pub fn icon(&self) -> Option<Icon> {
        self.icon
    }

    /// Shows the named icon. An unknown name shows no icon.
    pub fn set_icon(&mut self, name: &str) {
        self.icon = self.find_icon(name);
        self.base.invalidate();
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: &str) {
        self.description = description.to_string();
        self.base.invalidate();
    }

    pub fn state(&self) -> PointerState {
        self.state
    }
}

impl Definable for IconButton {
    const TYPE_NAME: &'static str = "widget.IconButton";

    fn from_definition(ctx: &BuildContext, node: &Node) -> anyhow::Result<IconButton> {
        let mut button = IconButton::new(
            ElementBase::new(ctx.window(), ""),
            node.string("icon").unwrap_or(""),
            node.string("description").unwrap_or(""),
        );
        if let Some(color) = node.color("background") {
            button.background = color;
        }
        if let Some(color) = node.color("color") {
            button.color = color;
        }
        button.handlers = PointerHandlers::from_definition(ctx, node);
        Ok(button)
    }
}

impl Element for IconButton {
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
        let side = ICON_SIZE + PADDING * 2.;
        let size = ctx.constraints.constrain(Vector2::new(side, side));

        let mut background = self.background;
        if self.state.pressed {
            background.a *= 0.8;
        }
        let id = self.base.id();
        let bounds = ctx.rect(size);
        ctx.push(DrawOp::Fill {
            element: id.to_string(),
            bounds,
            color: background,
        });

        if let Some(icon) = self.icon {
            let icon_size = ICON_SIZE.min(size.x).min(size.y);
            let offset = (size - Vector2::new(icon_size, icon_size)) / 2.;
            let color = self.color;
            ctx.with_offset(offset, |ctx| {
                let bounds = ctx.rect(Vector2::new(icon_size, icon_size));
                ctx.push(DrawOp::Icon {
                    element: id.to_string(),
                    bounds,
                    name: icon.name.to_string(),
                    color,
                });
            });
        }
        size
    }

    perch_core::impl_element_base!(base);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::test_util::{pointer, Env};
    use perch_core::{Function, PointerPhase};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn builds_and_clicks() {
        let clicks = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&clicks);
        let mut env = Env::default();
        env.functions.insert(
            "start".into(),
            Function::handler(move |_, _| {
                c.fetch_add(1, Ordering::SeqCst);
            }),
        );
        let mut button: IconButton = env.build(
            None,
            json!({
                "icon": "play_arrow",
                "description": "Start boiling",
                "onClicked": "start",
                "onHovered": "start",
            }),
        );
        assert_eq!(button.icon().map(|i| i.codepoint), Some('\u{e037}'));
        assert_eq!(button.description(), "Start boiling");
        assert!(button.handlers.on_hovered.is_some());

        let id = button.id().to_string();
        let mut ctx = EventContext::new(
            vec![
                pointer(&id, PointerPhase::Press),
                pointer(&id, PointerPhase::Release),
            ],
            None,
        );
        button.handle_events(&mut ctx);
        // one click plus one frame of hovering
        assert_eq!(clicks.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn draws_the_icon_centered() {
        let mut button = IconButton::new(ElementBase::new(None, "b"), "timer", "");
        let mut ctx = DrawContext::new(Vector2::new(100., 100.));
        ctx.constraints = perch_core::Constraints::loose(Vector2::new(100., 100.));
        assert_eq!(button.draw(&mut ctx), Vector2::new(48., 48.));
        match &ctx.ops()[1] {
            DrawOp::Icon { name, bounds, .. } => {
                assert_eq!(name, "timer");
                assert_eq!(bounds.origin, cgmath::Point2::new(12., 12.));
            }
            other => panic!("expected an icon, got {other:?}"),
        }

        button.set_icon("no_such_icon");
        assert!(button.icon().is_none());
        let mut ctx = DrawContext::new(Vector2::new(48., 48.));
        button.draw(&mut ctx);
        assert_eq!(ctx.ops().len(), 1);
    }
}
