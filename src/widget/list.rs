use super::Invalidator;
use crate::layout::{along, cross_of, main_of};
use core::fmt;
use perch_core::style::{Alignment, Axis};
use perch_core::{
    BindableList, BindingWatcher, BuildContext, Constraints, Definable, DrawContext, Element,
    ElementBase, EventContext, ItemHandler, ItemRenderer, Node, NodeExt, Size,
};
use std::sync::{Arc, Weak};

/// Slack for rounding when deciding whether an item fits.
const EPSILON: f64 = 1e-9;

/// Shows the items of a list binding, one after another along an axis.
///
/// Items are drawn by the item renderer; the item event handler is called for every item on every
/// frame. Only items that fit entirely within the available space are drawn; an item cut off by
/// the edge is skipped, not clipped. Items of zero size count as fitting. With `scroll_to_end`,
/// the last items are kept in view instead of the first ones.
pub struct List {
    base: ElementBase,
    binding: Option<Arc<dyn BindableList>>,
    invalidator: Arc<Invalidator>,
    pub axis: Axis,
    pub alignment: Alignment,
    pub scroll_to_end: bool,
    item_renderer: Option<ItemRenderer>,
    item_handler: Option<ItemHandler>,
}

impl List {
    pub fn new(base: ElementBase, axis: Axis) -> List {
        let invalidator = Arc::new(Invalidator::new(base.window()));
        List {
            base,
            binding: None,
            invalidator,
            axis,
            alignment: Alignment::default(),
            scroll_to_end: false,
            item_renderer: None,
            item_handler: None,
        }
    }

    fn watcher(&self) -> Weak<dyn BindingWatcher> {
        Arc::downgrade(&self.invalidator) as Weak<Invalidator>
    }

    /// Shows the items of `binding` from now on. `None` unbinds.
    pub fn bind(&mut self, binding: Option<Arc<dyn BindableList>>) {
        if let Some(old) = self.binding.take() {
            old.unwatch(&self.watcher());
        }
        if let Some(binding) = binding {
            binding.watch(self.watcher());
            self.binding = Some(binding);
            self.base.invalidate();
        }
    }

    pub fn set_item_renderer(&mut self, renderer: Option<ItemRenderer>) {
        self.item_renderer = renderer;
    }

    pub fn set_item_handler(&mut self, handler: Option<ItemHandler>) {
        self.item_handler = handler;
    }

    /// Number of items in the bound list.
    pub fn len(&self) -> usize {
        self.binding.as_ref().map_or(0, |b| b.size())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Definable for List {
    const TYPE_NAME: &'static str = "widget.List";

    fn from_definition(ctx: &BuildContext, node: &Node) -> anyhow::Result<List> {
        let mut list = List::new(
            ElementBase::new(ctx.window(), ""),
            node.constant("axis").unwrap_or_default(),
        );
        list.alignment = node.constant("alignment").unwrap_or_default();
        list.scroll_to_end = node.bool("scrollToEnd").unwrap_or(false);
        list.item_renderer = node.item_renderer(ctx, "itemRenderer");
        list.item_handler = node.item_handler(ctx, "itemEventHandler");
        list.bind(node.list_binding(ctx, "binding"));
        Ok(list)
    }
}

impl Element for List {
    fn handle_events(&mut self, ctx: &mut EventContext) {
        if let (Some(binding), Some(handler)) = (&self.binding, &self.item_handler) {
            for index in 0..binding.size() {
                handler(ctx, index, &**binding);
            }
        }
    }

    fn draw(&mut self, ctx: &mut DrawContext) -> Size {
        let axis = self.axis;
        let cs = ctx.constraints;
        let (binding, renderer) = match (&self.binding, &self.item_renderer) {
            (Some(binding), Some(renderer)) => (binding, renderer),
            _ => return cs.constrain(along(axis, 0., 0.)),
        };

        let item_constraints = Constraints {
            min: along(axis, 0., cross_of(axis, cs.min)),
            max: along(axis, f64::INFINITY, cross_of(axis, cs.max)),
        };
        let items: Vec<_> = (0..binding.size())
            .map(|index| ctx.record(item_constraints, |ctx| renderer(ctx, index, &**binding)))
            .collect();

        let total: f64 = items.iter().map(|r| main_of(axis, r.size)).sum();
        let visible = total.min(main_of(axis, cs.max));
        let cross = items
            .iter()
            .map(|r| cross_of(axis, r.size))
            .fold(cross_of(axis, cs.min), f64::max);

        let mut main = if self.scroll_to_end {
            visible - total
        } else {
            0.
        };
        for item in items {
            let item_main = main_of(axis, item.size);
            let item_cross = cross_of(axis, item.size);
            if main >= -EPSILON && main + item_main <= visible + EPSILON {
                let offset = match self.alignment {
                    Alignment::Start | Alignment::Baseline => 0.,
                    Alignment::End => cross - item_cross,
                    Alignment::Middle => (cross - item_cross) / 2.,
                };
                ctx.replay(item, along(axis, main, offset));
            }
            main += item_main;
        }

        cs.constrain(along(axis, visible, cross))
    }

    perch_core::impl_element_base!(base);
}

impl fmt::Debug for List {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("List")
            .field("base", &self.base)
            .field("binding", &self.binding.as_ref().map(|b| b.name().to_string()))
            .field("axis", &self.axis)
            .field("scroll_to_end", &self.scroll_to_end)
            .finish_non_exhaustive()
    }
}
