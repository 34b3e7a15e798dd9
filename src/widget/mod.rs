//! Leaf elements.
//!
//! Widgets never take children. Widgets with a `binding` key keep their value in a
//! [`Mirror`](perch_core::Mirror), which follows the binding, and report the value back to the
//! binding every frame in `handle_events`. Only local edits reach the binding, and an edit equal
//! to the bound value notifies nobody.
//!
//! Handlers run during `handle_events`, while the element tree is locked. Elements they reach
//! through a [`TypedElement`](perch_core::TypedElement) cannot be locked from there; changes made
//! with [`TypedElement::update`](perch_core::TypedElement::update) are deferred until the host has
//! finished handling events, and show up in the same frame.

mod button;
mod checkbox;
mod graphic;
mod icon_button;
mod input;
mod label;
mod list;
mod loader;
mod progress_bar;
mod slider;
mod spacer;

pub use button::Button;
pub use checkbox::Checkbox;
pub use graphic::Graphic;
pub use icon_button::IconButton;
pub use input::Input;
pub use label::Label;
pub use list::List;
pub use loader::Loader;
pub use progress_bar::ProgressBar;
pub use slider::Slider;
pub use spacer::Spacer;

use cgmath::Vector2;
use core::fmt;
use perch_core::style::{TextAlignment, WrapPolicy};
use perch_core::{
    Bindable, BindingWatcher, BuildContext, Color, DrawContext, DrawOp, Event, EventContext,
    Handler, Node, NodeExt, PointerPhase, Size, TextMetrics, WindowRef,
};

pub(crate) const TEXT_COLOR: Color = Color {
    r: 0.,
    g: 0.,
    b: 0.,
    a: 1.,
};
/// Default accent, indigo.
pub(crate) const ACCENT_COLOR: Color = Color {
    r: 63. / 255.,
    g: 81. / 255.,
    b: 181. / 255.,
    a: 1.,
};
pub(crate) const BORDER_COLOR: Color = Color {
    r: 0.8,
    g: 0.8,
    b: 0.8,
    a: 1.,
};
pub(crate) const TEXT_SIZE: f64 = 16.;

/// Hover and press state of a pressable widget.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PointerState {
    pub hovered: bool,
    pub pressed: bool,
}

impl PointerState {
    /// Applies this frame’s pointer events for the element and returns how many clicks completed.
    ///
    /// A click is a press followed by a release on the element. Leaving the element cancels a
    /// press.
    fn apply(&mut self, ctx: &EventContext, id: &str) -> usize {
        let mut clicks = 0;
        for event in ctx.events_for(id) {
            let phase = match event {
                Event::Pointer { phase, .. } => *phase,
                _ => continue,
            };
            match phase {
                PointerPhase::Enter => self.hovered = true,
                PointerPhase::Leave => {
                    self.hovered = false;
                    self.pressed = false;
                }
                PointerPhase::Press => {
                    self.hovered = true;
                    self.pressed = true;
                }
                PointerPhase::Release => {
                    if self.pressed {
                        clicks += 1;
                    }
                    self.pressed = false;
                }
            }
        }
        clicks
    }
}

/// Pointer callbacks of a pressable widget.
///
/// State is sampled once per frame, so a press and release within one frame produce a click but
/// no press callbacks.
#[derive(Default, Clone)]
pub struct PointerHandlers {
    pub on_clicked: Option<Handler>,
    pub on_hovered: Option<Handler>,
    pub on_hover_entered: Option<Handler>,
    pub on_hover_exited: Option<Handler>,
    pub on_pressed: Option<Handler>,
    pub on_press_down: Option<Handler>,
    pub on_press_up: Option<Handler>,
}

impl PointerHandlers {
    pub fn from_definition(ctx: &BuildContext, node: &Node) -> PointerHandlers {
        PointerHandlers {
            on_clicked: node.handler(ctx, "onClicked"),
            on_hovered: node.handler(ctx, "onHovered"),
            on_hover_entered: node.handler(ctx, "onHoverEntered"),
            on_hover_exited: node.handler(ctx, "onHoverExited"),
            on_pressed: node.handler(ctx, "onPressed"),
            on_press_down: node.handler(ctx, "onPressDown"),
            on_press_up: node.handler(ctx, "onPressUp"),
        }
    }

    /// Runs the callbacks for the transition from `prev` to `now`.
    fn fire(
        &self,
        ctx: &EventContext,
        id: &str,
        prev: PointerState,
        now: PointerState,
        clicks: usize,
    ) {
        let call = |handler: &Option<Handler>, when: bool| {
            if let (Some(handler), true) = (handler, when) {
                handler(ctx, id);
            }
        };

        call(&self.on_press_down, now.pressed && !prev.pressed);
        call(&self.on_press_up, !now.pressed && prev.pressed);
        call(&self.on_pressed, now.pressed);

        call(&self.on_hover_entered, now.hovered && !prev.hovered);
        call(&self.on_hover_exited, !now.hovered && prev.hovered);
        call(&self.on_hovered, now.hovered);

        for _ in 0..clicks {
            call(&self.on_clicked, true);
        }
    }
}

impl fmt::Debug for PointerHandlers {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let set = [
            ("onClicked", &self.on_clicked),
            ("onHovered", &self.on_hovered),
            ("onHoverEntered", &self.on_hover_entered),
            ("onHoverExited", &self.on_hover_exited),
            ("onPressed", &self.on_pressed),
            ("onPressDown", &self.on_press_down),
            ("onPressUp", &self.on_press_up),
        ];
        f.debug_list()
            .entries(set.iter().filter(|(_, h)| h.is_some()).map(|(name, _)| name))
            .finish()
    }
}

/// Invalidates a window whenever a watched binding changes.
pub(crate) struct Invalidator {
    window: Option<WindowRef>,
}

impl Invalidator {
    pub fn new(window: Option<WindowRef>) -> Invalidator {
        Invalidator { window }
    }
}

impl fmt::Debug for Invalidator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Invalidator")
            .field("window", &self.window.as_ref().map(|w| w.title()))
            .finish()
    }
}

impl BindingWatcher for Invalidator {
    fn binding_changed(&self, _: &dyn Bindable) {
        if let Some(window) = &self.window {
            window.invalidate();
        }
    }
}

/// How to draw a block of text.
#[derive(Debug, Clone)]
pub(crate) struct TextStyle {
    pub size: f64,
    pub color: Color,
    pub alignment: TextAlignment,
    /// Zero means unlimited.
    pub max_lines: usize,
    /// `None` keeps every paragraph on a single line.
    pub wrap: Option<WrapPolicy>,
    /// Distance between lines in points. Zero derives it from the text size.
    pub line_height: f64,
    /// Factor applied to the line height. Zero means 1.
    pub line_height_scale: f64,
    /// Ends the last line when `max_lines` cuts text off.
    pub truncator: String,
}

impl Default for TextStyle {
    fn default() -> Self {
        TextStyle {
            size: TEXT_SIZE,
            color: TEXT_COLOR,
            alignment: TextAlignment::Start,
            max_lines: 0,
            wrap: None,
            line_height: 0.,
            line_height_scale: 0.,
            truncator: DEFAULT_TRUNCATOR.to_string(),
        }
    }
}

pub(crate) const DEFAULT_TRUNCATOR: &str = "…";

impl TextStyle {
    fn line_height(&self, metrics: &TextMetrics) -> f64 {
        let height = if self.line_height > 0. {
            self.line_height
        } else {
            self.size * metrics.line_height
        };
        if self.line_height_scale > 0. {
            height * self.line_height_scale
        } else {
            height
        }
    }
}

/// Draws text line by line at the origin and returns its size within the constraints.
///
/// Lines break at newlines, and also at the maximum width if the style wraps.
pub(crate) fn draw_text(ctx: &mut DrawContext, element: &str, text: &str, style: TextStyle) -> Size {
    let metrics = ctx.metrics;
    let width = ctx.constraints.max.x;
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        match style.wrap {
            Some(policy) if width.is_finite() => {
                wrap_line(&metrics, paragraph, style.size, width, policy, &mut lines)
            }
            _ => lines.push(paragraph.to_string()),
        }
    }
    if style.max_lines > 0 && lines.len() > style.max_lines {
        lines.truncate(style.max_lines);
        if let Some(last) = lines.last_mut() {
            truncate_line(&metrics, last, &style.truncator, style.size, width);
        }
    }

    let line_height = style.line_height(&metrics);
    let widths: Vec<f64> = lines
        .iter()
        .map(|line| metrics.measure(line, style.size).x)
        .collect();
    let natural = Vector2::new(
        widths.iter().copied().fold(0., f64::max),
        line_height * lines.len() as f64,
    );
    let size = ctx.constraints.constrain(natural);

    for (i, (line, w)) in lines.into_iter().zip(widths).enumerate() {
        let x = match style.alignment {
            TextAlignment::Start => 0.,
            TextAlignment::Middle => ((size.x - w) / 2.).max(0.),
            TextAlignment::End => (size.x - w).max(0.),
        };
        let bounds = ctx.rect(Vector2::new(w, line_height));
        let mut op = DrawOp::Text {
            element: element.to_string(),
            bounds,
            text: line,
            size: style.size,
            color: style.color,
        };
        op.translate(Vector2::new(x, line_height * i as f64));
        ctx.push(op);
    }
    size
}

/// Breaks one paragraph into lines no wider than `width`.
///
/// Words break at spaces, which are dropped at line ends. A word wider than a line stays whole
/// with [`WrapPolicy::WrapWords`] and is split with the other policies.
fn wrap_line(
    metrics: &TextMetrics,
    paragraph: &str,
    size: f64,
    width: f64,
    policy: WrapPolicy,
    lines: &mut Vec<String>,
) {
    let fits = |text: &str| metrics.measure(text, size).x <= width;
    if policy == WrapPolicy::WrapGraphemes {
        split_chars(paragraph, &fits, lines);
        return;
    }

    let mut line = String::new();
    for word in paragraph.split(' ') {
        let candidate = if line.is_empty() {
            word.to_string()
        } else {
            format!("{line} {word}")
        };
        if fits(&candidate) {
            line = candidate;
            continue;
        }
        if !line.is_empty() {
            lines.push(std::mem::take(&mut line));
        }
        if fits(word) || policy == WrapPolicy::WrapWords {
            line = word.to_string();
        } else {
            split_chars(word, &fits, lines);
            // the tail of the word starts the next line
            line = lines.pop().unwrap_or_default();
        }
    }
    lines.push(line);
}

/// Fills lines character by character. Every line takes at least one character.
fn split_chars(text: &str, fits: &impl Fn(&str) -> bool, lines: &mut Vec<String>) {
    let mut line = String::new();
    for c in text.chars() {
        line.push(c);
        if line.chars().count() > 1 && !fits(&line) {
            line.pop();
            lines.push(std::mem::replace(&mut line, c.to_string()));
        }
    }
    lines.push(line);
}

/// Shortens `line` until it fits `width` with `truncator` appended, then appends it.
fn truncate_line(metrics: &TextMetrics, line: &mut String, truncator: &str, size: f64, width: f64) {
    while !line.is_empty() && metrics.measure(&format!("{line}{truncator}"), size).x > width {
        line.pop();
    }
    line.push_str(truncator);
}

#[cfg(test)]
pub(crate) mod test_util {
    use perch_core::{
        Bindable, BuildContext, DrawContext, DrawOp, Event, Function, Lookup, Node,
        PointerPhase, Window,
    };
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug, Default)]
    pub struct CountingWindow {
        pub invalidations: AtomicUsize,
    }

    impl CountingWindow {
        pub fn count(&self) -> usize {
            self.invalidations.load(Ordering::SeqCst)
        }
    }

    impl Window for CountingWindow {
        fn invalidate(&self) {
            self.invalidations.fetch_add(1, Ordering::SeqCst);
        }

        fn title(&self) -> String {
            "test".into()
        }
    }

    #[derive(Default)]
    pub struct Env {
        pub functions: HashMap<String, Function>,
        pub bindings: HashMap<String, Arc<dyn Bindable>>,
    }

    impl Lookup for Env {
        fn find_function(&self, name: &str) -> Option<Function> {
            self.functions.get(name).cloned()
        }

        fn find_binding(&self, name: &str) -> Option<Arc<dyn Bindable>> {
            self.bindings.get(name).cloned()
        }
    }

    impl Env {
        pub fn build<T: perch_core::Definable>(
            &self,
            window: Option<&perch_core::WindowRef>,
            node: serde_json::Value,
        ) -> T {
            let node: Node = node.as_object().cloned().unwrap_or_default();
            T::from_definition(&BuildContext::new(window, self), &node).expect("build")
        }
    }

    pub fn pointer(target: &str, phase: PointerPhase) -> Event {
        Event::Pointer {
            target: target.into(),
            phase,
        }
    }

    pub fn texts(ctx: &DrawContext) -> Vec<String> {
        ctx.ops()
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perch_core::Constraints;
    use std::sync::{Arc, Mutex};

    #[test]
    fn pointer_transitions_fire_callbacks() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let handler = |name: &'static str| -> Option<Handler> {
            let log = Arc::clone(&log);
            Some(Arc::new(move |_: &EventContext, id: &str| {
                log.lock().unwrap().push(format!("{name}:{id}"))
            }))
        };
        let handlers = PointerHandlers {
            on_clicked: handler("clicked"),
            on_press_down: handler("down"),
            on_press_up: handler("up"),
            on_hover_entered: handler("entered"),
            on_hover_exited: handler("exited"),
            ..Default::default()
        };

        let mut state = PointerState::default();
        let frame = |state: &mut PointerState, phases: &[PointerPhase]| {
            let events = phases
                .iter()
                .map(|p| test_util::pointer("b", *p))
                .collect();
            let ctx = EventContext::new(events, None);
            let prev = *state;
            let clicks = state.apply(&ctx, "b");
            handlers.fire(&ctx, "b", prev, *state, clicks);
        };

        frame(&mut state, &[PointerPhase::Enter, PointerPhase::Press]);
        frame(&mut state, &[PointerPhase::Release]);
        frame(&mut state, &[PointerPhase::Leave]);

        assert_eq!(
            *log.lock().unwrap(),
            ["down:b", "entered:b", "up:b", "clicked:b", "exited:b"]
        );
    }

    #[test]
    fn leaving_cancels_a_press() {
        let mut state = PointerState::default();
        let ctx = EventContext::new(
            vec![
                test_util::pointer("b", PointerPhase::Press),
                test_util::pointer("b", PointerPhase::Leave),
                test_util::pointer("b", PointerPhase::Release),
                test_util::pointer("other", PointerPhase::Press),
            ],
            None,
        );
        assert_eq!(state.apply(&ctx, "b"), 0);
        assert_eq!(state, PointerState::default());
    }

    #[test]
    fn text_is_aligned_and_limited() {
        let mut ctx = DrawContext::new(Vector2::new(100., 100.));
        ctx.constraints = Constraints::loose(Vector2::new(100., 100.));
        let style = TextStyle {
            size: 10.,
            alignment: TextAlignment::End,
            max_lines: 2,
            ..Default::default()
        };
        // 5 advance and 12 line height at size 10
        let size = draw_text(&mut ctx, "t", "abcd\nab\nhidden", style);
        assert_eq!(size, Vector2::new(20., 24.));
        assert_eq!(test_util::texts(&ctx), ["abcd", "ab…"]);
        assert_eq!(ctx.ops()[1].bounds().origin, cgmath::Point2::new(5., 12.));
    }

    /// Draws with 5 points per character into a 30 point wide box.
    fn lines(text: &str, style: TextStyle) -> Vec<String> {
        let mut ctx = DrawContext::new(Vector2::new(30., 100.));
        ctx.constraints = Constraints::loose(Vector2::new(30., 100.));
        draw_text(&mut ctx, "t", text, TextStyle { size: 10., ..style });
        test_util::texts(&ctx)
    }

    fn wrapping(policy: WrapPolicy) -> TextStyle {
        TextStyle {
            wrap: Some(policy),
            ..Default::default()
        }
    }

    #[test]
    fn wrap_policies() {
        let text = "one two three fourfivesix";
        assert_eq!(
            lines(text, wrapping(WrapPolicy::WrapHeuristically)),
            ["one", "two", "three", "fourfi", "vesix"]
        );
        assert_eq!(
            lines(text, wrapping(WrapPolicy::WrapWords)),
            ["one", "two", "three", "fourfivesix"]
        );
        assert_eq!(
            lines("one two three", wrapping(WrapPolicy::WrapGraphemes)),
            ["one tw", "o thre", "e"]
        );
        assert_eq!(lines("one two", TextStyle::default()), ["one two"]);
    }

    #[test]
    fn truncated_lines_end_with_the_truncator() {
        let style = TextStyle {
            max_lines: 2,
            ..wrapping(WrapPolicy::WrapWords)
        };
        assert_eq!(lines("one two three", style), ["one", "two…"]);

        let style = TextStyle {
            max_lines: 1,
            ..Default::default()
        };
        assert_eq!(lines("abcdef\nx", style), ["abcde…"]);

        let style = TextStyle {
            max_lines: 1,
            truncator: String::new(),
            ..Default::default()
        };
        assert_eq!(lines("abc\nx", style), ["abc"]);
    }

    #[test]
    fn line_height_can_be_set() {
        let mut ctx = DrawContext::new(Vector2::new(100., 100.));
        ctx.constraints = Constraints::loose(Vector2::new(100., 100.));
        let style = TextStyle {
            line_height: 20.,
            line_height_scale: 1.5,
            ..Default::default()
        };
        let size = draw_text(&mut ctx, "t", "a\nb", style);
        assert_eq!(size.y, 60.);
        assert_eq!(ctx.ops()[1].bounds().origin.y, 30.);
    }
}
