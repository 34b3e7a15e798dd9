//! Element trees built from documents.
//!
//! A document is a tree of mappings. Every mapping names its element type in `type` and may carry
//! an `id`, a `weight` and either a `children` sequence or a single `child` mapping; all other keys
//! belong to the element’s constructor.
//!
//! ```json
//! {
//!     "type": "layout.Flex",
//!     "axis": "Vertical",
//!     "children": [
//!         { "type": "widget.Label", "id": "title", "text": "Hello" },
//!         { "type": "widget.Spacer", "weight": 1 }
//!     ]
//! }
//! ```
//!
//! Building is all or nothing: the first error anywhere in the tree aborts the build and the
//! partially built elements are dropped.

use crate::element::{Element, ElementRef, TypedElement, WindowRef};
use crate::error::Error;
use crate::registry::{BuildContext, Registry};
use crate::value::{Node, NodeExt};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use std::{fmt, fs, io};
use tracing::{debug, trace, warn};

/// Document text formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Toml,
    Yaml,
}

impl Format {
    /// Picks the format from a file name’s extension: `.toml`, `.yml` and `.yaml` are recognized,
    /// anything else is JSON.
    pub fn from_name(name: &str) -> Format {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("toml") => Format::Toml,
            Some("yml" | "yaml") => Format::Yaml,
            _ => Format::Json,
        }
    }

    fn parse(self, text: &str) -> Result<Value, String> {
        match self {
            Format::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
            Format::Toml => {
                let value: toml::Value = toml::from_str(text).map_err(|e| e.to_string())?;
                serde_json::to_value(value).map_err(|e| e.to_string())
            }
            Format::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
        }
    }
}

/// Where documents are read from.
pub trait Source: Send + Sync {
    /// Reads a document. A missing document is an [`io::ErrorKind::NotFound`] error.
    fn read(&self, name: &str) -> io::Result<Vec<u8>>;
}

/// Documents stored as files below a directory.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> DirSource {
        DirSource { root: root.into() }
    }
}

impl Source for DirSource {
    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        fs::read(self.root.join(name))
    }
}

/// Documents compiled into the binary, e.g. with `include_str!`.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    files: HashMap<String, &'static str>,
}

impl StaticSource {
    pub fn new() -> StaticSource {
        StaticSource::default()
    }

    /// Adds a document.
    pub fn with(mut self, name: &str, text: &'static str) -> StaticSource {
        self.insert(name, text);
        self
    }

    pub fn insert(&mut self, name: &str, text: &'static str) {
        self.files.insert(name.to_string(), text);
    }
}

impl Source for StaticSource {
    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        match self.files.get(name) {
            Some(text) => Ok(text.as_bytes().to_vec()),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{name} is not embedded"),
            )),
        }
    }
}

/// A built element tree.
///
/// The definition owns the tree through its root. Elements whose document node had an `id` can
/// be looked up by that id, except for the root itself.
pub struct Definition {
    root: ElementRef,
    index: HashMap<String, Weak<Mutex<dyn Element>>>,
    window: Option<WindowRef>,
}

impl Definition {
    /// Reads, parses and builds a document from a source.
    pub fn load(
        ctx: &BuildContext,
        registry: &Registry,
        source: &dyn Source,
        name: &str,
    ) -> Result<Definition, Error> {
        let bytes = source.read(name).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                Error::SourceNotFound {
                    name: name.to_string(),
                    source,
                }
            } else {
                Error::Read {
                    name: name.to_string(),
                    source,
                }
            }
        })?;
        let text = String::from_utf8(bytes).map_err(|e| Error::Syntax {
            path: "root".into(),
            message: e.to_string(),
        })?;
        debug!(document = name, "loading definition");
        Definition::parse(ctx, registry, &text, Format::from_name(name))
    }

    /// Parses and builds a document.
    pub fn parse(
        ctx: &BuildContext,
        registry: &Registry,
        text: &str,
        format: Format,
    ) -> Result<Definition, Error> {
        let value = format.parse(text).map_err(|message| Error::Syntax {
            path: "root".into(),
            message,
        })?;
        match value {
            Value::Object(node) => Definition::build(ctx, registry, &node),
            _ => Err(Error::Syntax {
                path: "root".into(),
                message: "document is not a mapping".into(),
            }),
        }
    }

    /// Builds a parsed document.
    pub fn build(
        ctx: &BuildContext,
        registry: &Registry,
        node: &Node,
    ) -> Result<Definition, Error> {
        let mut builder = Builder {
            ctx,
            registry,
            index: HashMap::new(),
            count: 0,
        };
        match builder.element(node, "root") {
            Ok(root) => {
                debug!(
                    elements = builder.count,
                    indexed = builder.index.len(),
                    "built definition"
                );
                Ok(Definition {
                    root,
                    index: builder.index,
                    window: ctx.window(),
                })
            }
            Err(err) => {
                warn!(error = %err, "failed to build definition");
                Err(err)
            }
        }
    }

    pub fn root(&self) -> &ElementRef {
        &self.root
    }

    /// Looks up an element by its document id.
    pub fn element_by_id(&self, id: &str) -> Option<ElementRef> {
        self.index.get(id)?.upgrade()
    }

    /// Looks up an element by its document id and checks that it is a `T`.
    ///
    /// Updates through the handle are deferred to the window the document was built for.
    pub fn element_by_id_as<T: Element>(&self, id: &str) -> Option<TypedElement<T>> {
        Some(TypedElement::new(self.element_by_id(id)?)?.with_window(self.window.clone()))
    }

    /// All indexed ids, in no particular order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    /// Number of indexed ids.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Definition")
            .field("root", &self.root.try_lock().map(|root| root.id().to_string()))
            .field("ids", &self.index.keys().collect::<Vec<_>>())
            .finish()
    }
}

struct Builder<'a, 'b> {
    ctx: &'a BuildContext<'b>,
    registry: &'a Registry,
    index: HashMap<String, Weak<Mutex<dyn Element>>>,
    count: usize,
}

impl<'a, 'b> Builder<'a, 'b> {
    /// Instantiates a node and, recursively, all of its children.
    fn element(&mut self, node: &Node, path: &str) -> Result<ElementRef, Error> {
        let type_name = node.string("type").ok_or_else(|| Error::MissingType {
            path: path.to_string(),
        })?;
        trace!(path, type_name, "instantiating");

        let element = self
            .registry
            .instantiate_at(self.ctx, type_name, node, path)?;
        if let Some(id) = node.string("id").filter(|id| !id.is_empty()) {
            element.lock().set_id(id);
        }
        self.count += 1;

        for (child_node, child_path) in child_nodes(node, path)? {
            let child = self.element(child_node, &child_path)?;
            let weight = child_node.float32("weight");

            {
                let mut parent = element.lock();
                let container = parent.as_container().ok_or_else(|| Error::ChildRejected {
                    parent: type_name.to_string(),
                    path: child_path.clone(),
                    reason: "element does not accept children".into(),
                })?;
                container
                    .add_child(Arc::clone(&child), weight)
                    .map_err(|rejection| Error::ChildRejected {
                        parent: type_name.to_string(),
                        path: child_path.clone(),
                        reason: rejection.reason,
                    })?;
            }

            if let Some(id) = child_node.string("id").filter(|id| !id.is_empty()) {
                if self
                    .index
                    .insert(id.to_string(), Arc::downgrade(&child))
                    .is_some()
                {
                    trace!(id, path = %child_path, "duplicate id; later element wins");
                }
            }
        }

        Ok(element)
    }
}

/// Collects the child nodes of a node with their paths. `child` takes precedence over `children`.
fn child_nodes<'n>(node: &'n Node, path: &str) -> Result<Vec<(&'n Node, String)>, Error> {
    if let Some(child) = node.get("child") {
        let child_path = format!("{path}.child");
        return match child {
            Value::Object(child) => Ok(vec![(child, child_path)]),
            _ => Err(Error::Syntax {
                path: child_path,
                message: "child is not a mapping".into(),
            }),
        };
    }

    match node.get("children") {
        None => Ok(Vec::new()),
        Some(Value::Array(children)) => children
            .iter()
            .enumerate()
            .map(|(i, child)| {
                let child_path = format!("{path}.children[{i}]");
                match child {
                    Value::Object(child) => Ok((child, child_path)),
                    _ => Err(Error::Syntax {
                        path: child_path,
                        message: "child is not a mapping".into(),
                    }),
                }
            })
            .collect(),
        Some(_) => Err(Error::Syntax {
            path: format!("{path}.children"),
            message: "children is not a sequence".into(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Container, ElementBase, Rejection};
    use crate::events::{DrawContext, EventContext};
    use crate::rect::Size;
    use crate::registry::Definable;
    use crate::value::NoLookup;
    use std::io::Write;

    /// A container that records how its children were attached.
    #[derive(Debug)]
    struct Stack {
        base: ElementBase,
        children: Vec<(ElementRef, Option<f32>)>,
        limit: Option<usize>,
    }

    impl Element for Stack {
        fn handle_events(&mut self, _: &mut EventContext) {}
        fn draw(&mut self, _: &mut DrawContext) -> Size {
            Size::new(0., 0.)
        }
        fn as_container(&mut self) -> Option<&mut dyn Container> {
            Some(self)
        }
        crate::impl_element_base!(base);
    }

    impl Container for Stack {
        fn add_child(&mut self, child: ElementRef, weight: Option<f32>) -> Result<(), Rejection> {
            if self.limit.map_or(false, |l| self.children.len() >= l) {
                return Err(Rejection::new("stack is full"));
            }
            self.children.push((child, weight));
            Ok(())
        }
    }

    impl Definable for Stack {
        const TYPE_NAME: &'static str = "test.Stack";

        fn from_definition(ctx: &BuildContext, node: &Node) -> anyhow::Result<Self> {
            Ok(Stack {
                base: ElementBase::new(ctx.window(), ""),
                children: Vec::new(),
                limit: node.int("limit"),
            })
        }
    }

    #[derive(Debug)]
    struct Leaf {
        base: ElementBase,
    }

    impl Element for Leaf {
        fn handle_events(&mut self, _: &mut EventContext) {}
        fn draw(&mut self, _: &mut DrawContext) -> Size {
            Size::new(0., 0.)
        }
        crate::impl_element_base!(base);
    }

    impl Definable for Leaf {
        const TYPE_NAME: &'static str = "test.Leaf";

        fn from_definition(ctx: &BuildContext, _: &Node) -> anyhow::Result<Self> {
            Ok(Leaf {
                base: ElementBase::new(ctx.window(), ""),
            })
        }
    }

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.register_type::<Stack>();
        registry.register_type::<Leaf>();
        registry
    }

    fn parse(text: &str) -> Result<Definition, Error> {
        let ctx = BuildContext::new(None, &NoLookup);
        Definition::parse(&ctx, &registry(), text, Format::Json)
    }

    #[test]
    fn indexes_named_children() {
        let def = parse(
            r#"{
                "type": "test.Stack",
                "id": "root",
                "children": [
                    { "type": "test.Leaf", "id": "b1", "weight": 2.0 },
                    { "type": "test.Leaf" }
                ]
            }"#,
        )
        .expect("build");

        assert!(def.element_by_id("b1").is_some());
        assert!(def.element_by_id_as::<Leaf>("b1").is_some());
        assert!(def.element_by_id_as::<Stack>("b1").is_none());
        assert!(def.element_by_id("root").is_none(), "the root is not indexed");
        assert_eq!(def.len(), 1);
        assert_eq!(def.root().lock().id(), "root");

        let root = TypedElement::<Stack>::new(Arc::clone(def.root())).expect("stack root");
        let root = root.lock().expect("locked");
        let weights: Vec<_> = root.children.iter().map(|(_, w)| *w).collect();
        assert_eq!(weights, vec![Some(2.0), None]);
        assert_eq!(root.children[0].0.lock().id(), "b1");
        assert!(!root.children[1].0.lock().id().is_empty());
    }

    #[test]
    fn nested_ids_are_indexed_flat() {
        let def = parse(
            r#"{
                "type": "test.Stack",
                "child": {
                    "type": "test.Stack",
                    "id": "inner",
                    "children": [{ "type": "test.Leaf", "id": "deep" }]
                }
            }"#,
        )
        .expect("build");
        let mut ids: Vec<_> = def.ids().collect();
        ids.sort_unstable();
        assert_eq!(ids, vec!["deep", "inner"]);
    }

    #[test]
    fn duplicate_ids_last_write_wins() {
        let def = parse(
            r#"{
                "type": "test.Stack",
                "children": [
                    { "type": "test.Leaf", "id": "dup" },
                    { "type": "test.Stack", "id": "dup" }
                ]
            }"#,
        )
        .expect("build");
        assert_eq!(def.len(), 1);
        assert!(def.element_by_id_as::<Stack>("dup").is_some());
    }

    #[test]
    fn missing_type_is_fatal_at_any_depth() {
        let err = parse(r#"{ "id": "x" }"#).err();
        assert!(matches!(err, Some(Error::MissingType { ref path }) if path == "root"));

        let err = parse(
            r#"{
                "type": "test.Stack",
                "children": [
                    { "type": "test.Leaf" },
                    { "type": "test.Stack", "child": { "id": "no-type" } }
                ]
            }"#,
        )
        .err();
        assert!(
            matches!(err, Some(Error::MissingType { ref path }) if path == "root.children[1].child"),
            "{err:?}"
        );
    }

    #[test]
    fn unknown_type_reports_path() {
        let err = parse(r#"{ "type": "test.Stack", "child": { "type": "test.Nope" } }"#).err();
        match err {
            Some(Error::UnknownType { type_name, path }) => {
                assert_eq!(type_name, "test.Nope");
                assert_eq!(path, "root.child");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn leaf_rejects_children() {
        let err = parse(
            r#"{
                "type": "test.Stack",
                "children": [
                    { "type": "test.Leaf", "id": "ok" },
                    { "type": "test.Leaf", "child": { "type": "test.Leaf" } }
                ]
            }"#,
        )
        .err();
        match err {
            Some(Error::ChildRejected { parent, path, .. }) => {
                assert_eq!(parent, "test.Leaf");
                assert_eq!(path, "root.children[1].child");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn container_rejection_carries_reason() {
        let err = parse(
            r#"{
                "type": "test.Stack",
                "limit": 1,
                "children": [{ "type": "test.Leaf" }, { "type": "test.Leaf" }]
            }"#,
        )
        .err();
        match err {
            Some(Error::ChildRejected { reason, path, .. }) => {
                assert_eq!(reason, "stack is full");
                assert_eq!(path, "root.children[1]");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn child_takes_precedence_over_children() {
        let def = parse(
            r#"{
                "type": "test.Stack",
                "children": [{ "type": "test.Leaf", "id": "many" }],
                "child": { "type": "test.Leaf", "id": "one" }
            }"#,
        )
        .expect("build");
        assert!(def.element_by_id("one").is_some());
        assert!(def.element_by_id("many").is_none());
    }

    #[test]
    fn malformed_structure_is_a_syntax_error() {
        let err = parse(r#"{ "type": "test.Stack", "children": [{ "type": "test.Leaf" }, 3] }"#).err();
        assert!(
            matches!(err, Some(Error::Syntax { ref path, .. }) if path == "root.children[1]"),
            "{err:?}"
        );
        let err = parse(r#"{ "type": "test.Stack", "children": { "type": "test.Leaf" } }"#).err();
        assert!(matches!(err, Some(Error::Syntax { ref path, .. }) if path == "root.children"));
        assert!(matches!(parse("{ \"type\": "), Err(Error::Syntax { .. })));
        assert!(matches!(parse("[1, 2]"), Err(Error::Syntax { .. })));
    }

    #[test]
    fn toml_documents() {
        let ctx = BuildContext::new(None, &NoLookup);
        let def = Definition::parse(
            &ctx,
            &registry(),
            r#"
                type = "test.Stack"

                [[children]]
                type = "test.Leaf"
                id = "first"
                weight = 1

                [[children]]
                type = "test.Leaf"
            "#,
            Format::Toml,
        )
        .expect("build");
        assert!(def.element_by_id_as::<Leaf>("first").is_some());
    }

    #[test]
    fn yaml_documents() {
        let ctx = BuildContext::new(None, &NoLookup);
        let def = Definition::parse(
            &ctx,
            &registry(),
            "
type: test.Stack
limit: 2
children:
  - type: test.Leaf
    id: first
    weight: 1.5
  - type: test.Leaf
",
            Format::Yaml,
        )
        .expect("build");
        assert!(def.element_by_id_as::<Leaf>("first").is_some());

        let root = TypedElement::<Stack>::new(Arc::clone(def.root())).expect("stack root");
        let root = root.lock().expect("free");
        assert_eq!(root.limit, Some(2));
        assert_eq!(root.children[0].1, Some(1.5));
        assert_eq!(root.children[1].1, None);

        let ctx = BuildContext::new(None, &NoLookup);
        let err = Definition::parse(&ctx, &registry(), "type: [", Format::Yaml).err();
        assert!(matches!(err, Some(Error::Syntax { ref path, .. }) if path == "root"));
    }

    #[test]
    fn format_from_name() {
        assert_eq!(Format::from_name("views/main.toml"), Format::Toml);
        assert_eq!(Format::from_name("main.TOML"), Format::Toml);
        assert_eq!(Format::from_name("def/timerview.def.yml"), Format::Yaml);
        assert_eq!(Format::from_name("main.yaml"), Format::Yaml);
        assert_eq!(Format::from_name("main.json"), Format::Json);
        assert_eq!(Format::from_name("main"), Format::Json);
    }

    #[test]
    fn loads_from_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut file = fs::File::create(dir.path().join("main.json")).expect("create");
        file.write_all(br#"{ "type": "test.Stack", "child": { "type": "test.Leaf", "id": "leaf" } }"#)
            .expect("write");

        let source = DirSource::new(dir.path());
        let ctx = BuildContext::new(None, &NoLookup);
        let def = Definition::load(&ctx, &registry(), &source, "main.json").expect("load");
        assert!(def.element_by_id("leaf").is_some());

        let err = Definition::load(&ctx, &registry(), &source, "missing.json").err();
        assert!(matches!(err, Some(Error::SourceNotFound { ref name, .. }) if name == "missing.json"));
    }

    #[test]
    fn loads_from_static_source() {
        let source = StaticSource::new().with("leaf.json", r#"{ "type": "test.Leaf" }"#);
        let ctx = BuildContext::new(None, &NoLookup);
        let def = Definition::load(&ctx, &registry(), &source, "leaf.json").expect("load");
        assert!(def.is_empty());
        assert!(matches!(
            Definition::load(&ctx, &registry(), &source, "other.json"),
            Err(Error::SourceNotFound { .. })
        ));
    }

    #[test]
    fn index_does_not_own_elements() {
        let def = parse(r#"{ "type": "test.Stack", "child": { "type": "test.Leaf", "id": "x" } }"#)
            .expect("build");
        let weak = def.index.get("x").cloned().expect("indexed");
        drop(def);
        assert!(weak.upgrade().is_none());
    }
}
