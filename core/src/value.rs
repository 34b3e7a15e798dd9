//! Typed access to document nodes.
//!
//! Every accessor returns `None` when a key is absent or holds a value of the wrong shape; it is
//! up to the element constructor to pick a default. Named references to functions and bindings
//! are resolved through the [`Lookup`] of the [`BuildContext`], so an unresolved reference is just
//! another `None`.

use crate::binding::{Bindable, BindableList};
use crate::color::Color;
use crate::events::{DrawContext, EventContext};
use crate::rect::Size;
use crate::registry::BuildContext;
use crate::style::{FontStyle, FontWeight, StyleConstant, TableNames};
use core::fmt;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

/// One parsed document node.
pub type Node = Map<String, Value>;

/// Event callback; receives the id of the element that fired.
pub type Handler = Arc<dyn Fn(&EventContext, &str) + Send + Sync>;
/// Text filter; receives the element id and the proposed text and returns the accepted text.
pub type Filter = Arc<dyn Fn(&EventContext, &str, &str) -> String + Send + Sync>;
/// Custom drawing; receives the element id and returns the size drawn.
pub type Painter = Arc<dyn Fn(&mut DrawContext, &str) -> Size + Send + Sync>;
/// Draws the list item at an index.
pub type ItemRenderer = Arc<dyn Fn(&mut DrawContext, usize, &dyn BindableList) -> Size + Send + Sync>;
/// Handles events for the list item at an index.
pub type ItemHandler = Arc<dyn Fn(&EventContext, usize, &dyn BindableList) + Send + Sync>;

/// A function a view exports to its documents.
#[derive(Clone)]
pub enum Function {
    Handler(Handler),
    Filter(Filter),
    Painter(Painter),
    ItemRenderer(ItemRenderer),
    ItemHandler(ItemHandler),
}

impl Function {
    /// Name of the signature, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Function::Handler(_) => "handler",
            Function::Filter(_) => "filter",
            Function::Painter(_) => "painter",
            Function::ItemRenderer(_) => "item renderer",
            Function::ItemHandler(_) => "item handler",
        }
    }

    pub fn handler(f: impl Fn(&EventContext, &str) + Send + Sync + 'static) -> Function {
        Function::Handler(Arc::new(f))
    }

    pub fn filter(f: impl Fn(&EventContext, &str, &str) -> String + Send + Sync + 'static) -> Function {
        Function::Filter(Arc::new(f))
    }

    pub fn painter(f: impl Fn(&mut DrawContext, &str) -> Size + Send + Sync + 'static) -> Function {
        Function::Painter(Arc::new(f))
    }

    pub fn item_renderer(
        f: impl Fn(&mut DrawContext, usize, &dyn BindableList) -> Size + Send + Sync + 'static,
    ) -> Function {
        Function::ItemRenderer(Arc::new(f))
    }

    pub fn item_handler(
        f: impl Fn(&EventContext, usize, &dyn BindableList) + Send + Sync + 'static,
    ) -> Function {
        Function::ItemHandler(Arc::new(f))
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Function({})", self.kind())
    }
}

/// Resolves named references in documents.
pub trait Lookup {
    fn find_function(&self, name: &str) -> Option<Function>;
    fn find_binding(&self, name: &str) -> Option<Arc<dyn Bindable>>;
}

/// A lookup that resolves nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLookup;

impl Lookup for NoLookup {
    fn find_function(&self, _: &str) -> Option<Function> {
        None
    }

    fn find_binding(&self, _: &str) -> Option<Arc<dyn Bindable>> {
        None
    }
}

/// A typeface with its style and weight.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Font {
    pub typeface: String,
    pub style: FontStyle,
    pub weight: FontWeight,
}

/// Interprets a JSON value as a number. Numeric strings are accepted.
fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Interprets a JSON value as an integer. Fractions are truncated.
fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
        }
        _ => None,
    }
}

/// Typed accessors for document nodes.
pub trait NodeExt {
    fn string(&self, key: &str) -> Option<&str>;
    fn bool(&self, key: &str) -> Option<bool>;
    /// Integers, floats (truncated) and numeric strings; `None` if out of range for `T`.
    fn int<T: TryFrom<i64>>(&self, key: &str) -> Option<T>;
    /// Integers, floats and numeric strings.
    fn float(&self, key: &str) -> Option<f64>;
    fn float32(&self, key: &str) -> Option<f32>;
    /// A hex or named color string.
    fn color(&self, key: &str) -> Option<Color>;
    /// A style constant by name.
    fn constant<S: StyleConstant>(&self, key: &str) -> Option<S>;
    /// A font from a typeface key plus optional style and weight keys.
    fn font(&self, font_key: &str, style_key: &str, weight_key: &str) -> Option<Font>;
    /// A nested mapping.
    fn child_node(&self, key: &str) -> Option<&Node>;
    /// The mappings in a nested sequence. Entries that are not mappings are skipped.
    fn child_nodes(&self, key: &str) -> Option<Vec<&Node>>;
    /// A function reference, resolved against the build context.
    fn function(&self, ctx: &BuildContext, key: &str) -> Option<Function>;
    fn handler(&self, ctx: &BuildContext, key: &str) -> Option<Handler>;
    fn filter(&self, ctx: &BuildContext, key: &str) -> Option<Filter>;
    fn painter(&self, ctx: &BuildContext, key: &str) -> Option<Painter>;
    fn item_renderer(&self, ctx: &BuildContext, key: &str) -> Option<ItemRenderer>;
    fn item_handler(&self, ctx: &BuildContext, key: &str) -> Option<ItemHandler>;
    /// A binding reference of a concrete binding type.
    fn binding<B: Bindable>(&self, ctx: &BuildContext, key: &str) -> Option<Arc<B>>;
    /// A reference to any list binding.
    fn list_binding(&self, ctx: &BuildContext, key: &str) -> Option<Arc<dyn BindableList>>;
}

impl NodeExt for Node {
    fn string(&self, key: &str) -> Option<&str> {
        self.get(key)?.as_str()
    }

    fn bool(&self, key: &str) -> Option<bool> {
        self.get(key)?.as_bool()
    }

    fn int<T: TryFrom<i64>>(&self, key: &str) -> Option<T> {
        T::try_from(as_i64(self.get(key)?)?).ok()
    }

    fn float(&self, key: &str) -> Option<f64> {
        as_f64(self.get(key)?)
    }

    fn float32(&self, key: &str) -> Option<f32> {
        self.float(key).map(|f| f as f32)
    }

    fn color(&self, key: &str) -> Option<Color> {
        Color::parse(self.string(key)?)
    }

    fn constant<S: StyleConstant>(&self, key: &str) -> Option<S> {
        let name = self.string(key)?;
        let value = S::from_name(name);
        if value.is_none() {
            debug!(key, value = name, expected = %TableNames::<S>::new(), "unknown style constant");
        }
        value
    }

    fn font(&self, font_key: &str, style_key: &str, weight_key: &str) -> Option<Font> {
        let typeface = self.string(font_key)?;
        Some(Font {
            typeface: typeface.to_string(),
            style: self.constant(style_key).unwrap_or_default(),
            weight: self.constant(weight_key).unwrap_or_default(),
        })
    }

    fn child_node(&self, key: &str) -> Option<&Node> {
        self.get(key)?.as_object()
    }

    fn child_nodes(&self, key: &str) -> Option<Vec<&Node>> {
        let items = self.get(key)?.as_array()?;
        Some(items.iter().filter_map(Value::as_object).collect())
    }

    fn function(&self, ctx: &BuildContext, key: &str) -> Option<Function> {
        let name = self.string(key)?;
        let function = ctx.lookup.find_function(name);
        if function.is_none() {
            debug!(key, reference = name, "unresolved function reference");
        }
        function
    }

    fn handler(&self, ctx: &BuildContext, key: &str) -> Option<Handler> {
        match self.function(ctx, key)? {
            Function::Handler(f) => Some(f),
            _ => None,
        }
    }

    fn filter(&self, ctx: &BuildContext, key: &str) -> Option<Filter> {
        match self.function(ctx, key)? {
            Function::Filter(f) => Some(f),
            _ => None,
        }
    }

    fn painter(&self, ctx: &BuildContext, key: &str) -> Option<Painter> {
        match self.function(ctx, key)? {
            Function::Painter(f) => Some(f),
            _ => None,
        }
    }

    fn item_renderer(&self, ctx: &BuildContext, key: &str) -> Option<ItemRenderer> {
        match self.function(ctx, key)? {
            Function::ItemRenderer(f) => Some(f),
            _ => None,
        }
    }

    fn item_handler(&self, ctx: &BuildContext, key: &str) -> Option<ItemHandler> {
        match self.function(ctx, key)? {
            Function::ItemHandler(f) => Some(f),
            _ => None,
        }
    }

    fn binding<B: Bindable>(&self, ctx: &BuildContext, key: &str) -> Option<Arc<B>> {
        let name = self.string(key)?;
        let binding = ctx.lookup.find_binding(name);
        if binding.is_none() {
            debug!(key, reference = name, "unresolved binding reference");
        }
        binding?.into_any().downcast::<B>().ok()
    }

    fn list_binding(&self, ctx: &BuildContext, key: &str) -> Option<Arc<dyn BindableList>> {
        let name = self.string(key)?;
        ctx.lookup.find_binding(name)?.as_list()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{Binding, ListBinding};
    use crate::style::{Axis, Spacing};
    use serde_json::json;

    fn node(value: Value) -> Node {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    struct TestLookup;

    impl Lookup for TestLookup {
        fn find_function(&self, name: &str) -> Option<Function> {
            match name {
                "clicked" => Some(Function::handler(|_, _| ())),
                "upper" => Some(Function::filter(|_, _, text| text.to_uppercase())),
                _ => None,
            }
        }

        fn find_binding(&self, name: &str) -> Option<Arc<dyn Bindable>> {
            match name {
                "count" => Some(Binding::<i32>::new("count", 3)),
                "items" => Some(ListBinding::<String>::new("items", vec!["a".into()])),
                _ => None,
            }
        }
    }

    #[test]
    fn numbers_accept_ints_floats_and_strings() {
        let n = node(json!({ "a": 3, "b": 2.5, "c": "7", "d": "1.5", "e": "x", "f": true }));
        assert_eq!(n.int::<i32>("a"), Some(3));
        assert_eq!(n.int::<i32>("b"), Some(2));
        assert_eq!(n.int::<u8>("c"), Some(7));
        assert_eq!(n.int::<i32>("d"), Some(1));
        assert_eq!(n.float("a"), Some(3.));
        assert_eq!(n.float("d"), Some(1.5));
        assert_eq!(n.float32("b"), Some(2.5));
        assert_eq!(n.float("e"), None);
        assert_eq!(n.float("f"), None);
        assert_eq!(n.float("missing"), None);
    }

    #[test]
    fn int_out_of_range_is_absent() {
        let n = node(json!({ "big": 300, "neg": -1 }));
        assert_eq!(n.int::<u8>("big"), None);
        assert_eq!(n.int::<u32>("neg"), None);
        assert_eq!(n.int::<i64>("big"), Some(300));
    }

    #[test]
    fn mismatched_shapes_are_absent() {
        let n = node(json!({ "s": 1, "b": "true", "c": "#zz", "child": [1] }));
        assert_eq!(n.string("s"), None);
        assert_eq!(n.bool("b"), None);
        assert_eq!(n.color("c"), None);
        assert!(n.child_node("child").is_none());
    }

    #[test]
    fn constants_resolve_through_tables() {
        let n = node(json!({ "axis": "Vertical", "spacing": "SpaceBetween", "bad": "Sideways" }));
        assert_eq!(n.constant::<Axis>("axis"), Some(Axis::Vertical));
        assert_eq!(n.constant::<Spacing>("spacing"), Some(Spacing::SpaceBetween));
        assert_eq!(n.constant::<Axis>("bad"), None);
    }

    #[test]
    fn font_defaults_style_and_weight() {
        let n = node(json!({ "font": "Inter", "fontWeight": "Bold" }));
        let font = n.font("font", "fontStyle", "fontWeight").expect("font");
        assert_eq!(font.typeface, "Inter");
        assert_eq!(font.style, FontStyle::Regular);
        assert_eq!(font.weight, FontWeight::Bold);
        assert!(n.font("typeface", "fontStyle", "fontWeight").is_none());
    }

    #[test]
    fn child_nodes_skip_non_mappings() {
        let n = node(json!({ "children": [{ "type": "a" }, 3, { "type": "b" }] }));
        assert_eq!(n.child_nodes("children").map(|c| c.len()), Some(2));
    }

    #[test]
    fn functions_resolve_by_signature() {
        let ctx = BuildContext::new(None, &TestLookup);
        let n = node(json!({ "onClicked": "clicked", "filter": "upper", "missing": "nope" }));
        assert!(n.handler(&ctx, "onClicked").is_some());
        assert!(n.filter(&ctx, "onClicked").is_none(), "wrong signature");
        assert!(n.handler(&ctx, "missing").is_none());

        let filter = n.filter(&ctx, "filter").expect("filter");
        assert_eq!(filter(&EventContext::default(), "id", "abc"), "ABC");
    }

    #[test]
    fn bindings_resolve_by_type() {
        let ctx = BuildContext::new(None, &TestLookup);
        let n = node(json!({ "binding": "count", "list": "items" }));
        let count = n.binding::<Binding<i32>>(&ctx, "binding").expect("binding");
        assert_eq!(count.get(), 3);
        assert!(n.binding::<Binding<String>>(&ctx, "binding").is_none());
        assert_eq!(n.list_binding(&ctx, "list").map(|l| l.size()), Some(1));
        assert!(n.list_binding(&ctx, "binding").is_none());
        assert!(NoLookup.find_binding("count").is_none());
    }
}
