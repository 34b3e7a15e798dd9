use super::{draw_text, TextStyle};
use cgmath::Vector2;
use core::fmt;
use perch_core::style::{InputType, TextAlignment, WrapPolicy};
use perch_core::{
    Binding, BuildContext, Constraints, Definable, DrawContext, DrawOp, Element, ElementBase,
    Event, EventContext, Filter, Handler, Mirror, Node, NodeExt, Size,
};
use std::sync::Arc;
use tracing::trace;

const BORDER: f64 = 2.;
const PADDING: f64 = 3.;

/// An editable text field.
///
/// The host sends [`Event::Text`] with the full edited text. Characters are accepted one at a
/// time against the current filter: the filter callback if there is one, otherwise the input
/// type’s filter adjusted for the text accepted so far. An empty filter accepts everything.
pub struct Input {
    base: ElementBase,
    text: Arc<Mirror<String>>,
    binding: Option<Arc<Binding<String>>>,
    pub hint: String,
    pub input_type: InputType,
    pub alignment: TextAlignment,
    /// Zero means unlimited.
    pub max_len: usize,
    pub read_only: bool,
    pub multi_line: bool,
    /// How multi-line text wraps. Single-line text never wraps.
    pub wrap_policy: WrapPolicy,
    /// Whether [`Event::Submit`] is accepted.
    pub submit: bool,
    pub mask: Option<char>,
    filter_callback: Option<Filter>,
    on_submit: Option<Handler>,
}

impl Input {
    pub fn new(base: ElementBase, hint: &str, input_type: InputType) -> Input {
        let text = Mirror::new(String::new(), base.window());
        Input {
            base,
            text,
            binding: None,
            hint: hint.to_string(),
            input_type,
            alignment: TextAlignment::default(),
            max_len: 0,
            read_only: false,
            multi_line: false,
            wrap_policy: WrapPolicy::default(),
            submit: false,
            mask: input_type.default_mask(),
            filter_callback: None,
            on_submit: None,
        }
    }

    /// Follows `binding` from now on, taking over its current value. `None` unbinds.
    pub fn bind(&mut self, binding: Option<Arc<Binding<String>>>) {
        if let Some(old) = self.binding.take() {
            self.text.detach(&old);
        }
        if let Some(binding) = binding {
            self.text.attach(&binding);
            self.binding = Some(binding);
            self.base.invalidate();
        }
    }

    pub fn text(&self) -> String {
        self.text.get()
    }

    /// Sets the text as is, without filtering.
    pub fn set_text(&mut self, text: &str) {
        self.text.set(text.to_string());
        self.base.invalidate();
    }

    pub fn as_integer(&self) -> Result<i64, std::num::ParseIntError> {
        self.text.get().parse()
    }

    pub fn as_float(&self) -> Result<f64, std::num::ParseFloatError> {
        self.text.get().parse()
    }

    /// The characters accepted after `text`.
    pub fn filter(&self, ctx: &EventContext, text: &str) -> String {
        match &self.filter_callback {
            Some(callback) => callback(ctx, self.base.id(), text),
            None => self.input_type.adjusted_filter(text),
        }
    }

    /// Runs `edited` through the filter and length limit.
    fn accept(&self, ctx: &EventContext, edited: &str) -> String {
        let mut accepted = String::new();
        let mut len = 0;
        for c in edited.chars() {
            if self.max_len > 0 && len >= self.max_len {
                break;
            }
            if !self.multi_line && c == '\n' {
                continue;
            }
            let filter = self.filter(ctx, &accepted);
            if filter.is_empty() || filter.contains(c) {
                accepted.push(c);
                len += 1;
            }
        }
        accepted
    }
}

impl Definable for Input {
    const TYPE_NAME: &'static str = "widget.Input";

    fn from_definition(ctx: &BuildContext, node: &Node) -> anyhow::Result<Input> {
        let input_type = node.constant("inputType").unwrap_or_default();
        let mut input = Input::new(
            ElementBase::new(ctx.window(), ""),
            node.string("hint").unwrap_or(""),
            input_type,
        );
        input.alignment = node.constant("alignment").unwrap_or_default();
        input.max_len = node.int("maxLen").unwrap_or(0);
        input.read_only = node.bool("readOnly").unwrap_or(false);
        input.multi_line = node.bool("multiLine").unwrap_or(false);
        input.wrap_policy = node.constant("wrapPolicy").unwrap_or_default();
        input.submit = node.bool("submit").unwrap_or(false);
        if let Some(mask) = node.string("mask").and_then(|m| m.chars().next()) {
            input.mask = Some(mask);
        }
        input.filter_callback = node.filter(ctx, "filterCallback");
        input.on_submit = node.handler(ctx, "onSubmit");
        input.bind(node.binding(ctx, "binding"));
        Ok(input)
    }
}

impl Element for Input {
    fn handle_events(&mut self, ctx: &mut EventContext) {
        let id = self.base.id().to_string();
        let mut submitted = false;
        for event in ctx.events_for(&id) {
            match event {
                Event::Text { text, .. } if !self.read_only => {
                    let accepted = self.accept(ctx, text);
                    trace!(input = %id, rejected = text.chars().count() - accepted.chars().count(), "edited");
                    self.set_text(&accepted);
                }
                Event::Submit { .. } if self.submit => submitted = true,
                _ => (),
            }
        }

        if let Some(binding) = &self.binding {
            self.text.write_back(binding);
        }
        if let (true, Some(on_submit)) = (submitted, &self.on_submit) {
            on_submit(ctx, &id);
        }
    }

    fn draw(&mut self, ctx: &mut DrawContext) -> Size {
        let text = self.text.get();
        let (shown, color) = if text.is_empty() {
            let mut hint = super::TEXT_COLOR;
            hint.a = 0.5;
            (self.hint.clone(), hint)
        } else {
            match self.mask {
                Some(mask) => (text.chars().map(|_| mask).collect(), super::TEXT_COLOR),
                None => (text, super::TEXT_COLOR),
            }
        };
        let style = TextStyle {
            color,
            alignment: self.alignment,
            max_lines: if self.multi_line { 0 } else { 1 },
            wrap: self.multi_line.then_some(self.wrap_policy),
            ..Default::default()
        };

        let cs = ctx.constraints;
        let edge = BORDER + PADDING;
        let shrink = |s: Size| s.map(|v| (v - edge * 2.).max(0.));
        let inner = Constraints {
            min: shrink(cs.min),
            max: shrink(cs.max),
        };
        let id = self.base.id().to_string();
        let content = ctx.with_offset(Vector2::new(edge, edge), |ctx| {
            ctx.with_constraints(inner, |ctx| draw_text(ctx, &id, &shown, style))
        });
        let size = cs.constrain(content + Vector2::new(edge * 2., edge * 2.));

        let bounds = ctx.rect(size);
        ctx.push(DrawOp::Stroke {
            element: id,
            bounds,
            width: BORDER,
            color: super::BORDER_COLOR,
        });
        size
    }

    perch_core::impl_element_base!(base);
}

impl fmt::Debug for Input {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Input")
            .field("base", &self.base)
            .field("text", &self.text)
            .field("input_type", &self.input_type)
            .field("max_len", &self.max_len)
            .field("read_only", &self.read_only)
            .finish_non_exhaustive()
    }
}
