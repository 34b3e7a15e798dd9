use super::{draw_text, TextStyle};
use perch_core::style::{LabelFormat, TextAlignment, WrapPolicy};
use perch_core::{
    Binding, BuildContext, Color, Definable, DrawContext, Element, ElementBase, EventContext,
    Font, Mirror, Node, NodeExt, Size,
};
use std::sync::Arc;

/// Displays text, optionally bound to a string binding.
#[derive(Debug)]
pub struct Label {
    base: ElementBase,
    text: Arc<Mirror<String>>,
    binding: Option<Arc<Binding<String>>>,
    pub format: LabelFormat,
    pub color: Color,
    pub alignment: TextAlignment,
    /// Zero means unlimited.
    pub max_lines: usize,
    pub wrap_policy: WrapPolicy,
    /// Distance between lines in points. Zero derives it from the text size.
    pub line_height: f64,
    /// Zero means 1.
    pub line_height_scale: f64,
    /// Ends the last line when text is cut off at `max_lines`.
    pub truncator: String,
    pub font: Option<Font>,
}

impl Label {
    pub fn new(base: ElementBase, text: &str, format: LabelFormat) -> Label {
        let text = Mirror::new(text.to_string(), base.window());
        Label {
            base,
            text,
            binding: None,
            format,
            color: super::TEXT_COLOR,
            alignment: TextAlignment::default(),
            max_lines: 0,
            wrap_policy: WrapPolicy::default(),
            line_height: 0.,
            line_height_scale: 0.,
            truncator: super::DEFAULT_TRUNCATOR.to_string(),
            font: None,
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

    pub fn set_text(&mut self, text: &str) {
        self.text.set(text.to_string());
        self.base.invalidate();
    }

    pub fn text_size(&self) -> f64 {
        self.format.text_size()
    }
}

impl Definable for Label {
    const TYPE_NAME: &'static str = "widget.Label";

    fn from_definition(ctx: &BuildContext, node: &Node) -> anyhow::Result<Label> {
        let mut label = Label::new(
            ElementBase::new(ctx.window(), ""),
            node.string("text").unwrap_or(""),
            node.constant("labelFormat").unwrap_or_default(),
        );
        if let Some(color) = node.color("color") {
            label.color = color;
        }
        label.alignment = node.constant("alignment").unwrap_or_default();
        label.max_lines = node.int("maxLines").unwrap_or(0);
        label.wrap_policy = node.constant("wrapPolicy").unwrap_or_default();
        label.line_height = node.float("lineHeight").unwrap_or(0.);
        label.line_height_scale = node.float("lineHeightScale").unwrap_or(0.);
        if let Some(truncator) = node.string("truncator") {
            label.truncator = truncator.to_string();
        }
        label.font = node.font("font", "fontStyle", "fontWeight");
        label.bind(node.binding(ctx, "binding"));
        Ok(label)
    }
}

impl Element for Label {
    fn handle_events(&mut self, _: &mut EventContext) {
        if let Some(binding) = &self.binding {
            self.text.write_back(binding);
        }
    }

    fn draw(&mut self, ctx: &mut DrawContext) -> Size {
        let style = TextStyle {
            size: self.text_size(),
            color: self.color,
            alignment: self.alignment,
            max_lines: self.max_lines,
            wrap: Some(self.wrap_policy),
            line_height: self.line_height,
            line_height_scale: self.line_height_scale,
            truncator: self.truncator.clone(),
        };
        draw_text(ctx, self.base.id(), &self.text.get(), style)
    }

    perch_core::impl_element_base!(base);
}
