use super::{along, cross_of, main_of};
use perch_core::style::{Alignment, Axis, Spacing};
use perch_core::{
    BuildContext, Constraints, Container, Definable, DrawContext, Element, ElementBase,
    ElementRef, EventContext, Node, NodeExt, Recording, Rejection, Size,
};

#[derive(Debug)]
struct FlexChild {
    element: ElementRef,
    /// Present only if positive.
    weight: Option<f32>,
}

/// Lays out children in a row or column.
///
/// Children without a weight are rigid and take the space they ask for, in order. Weighted
/// children then share what is left in proportion to their weights. If the children end up
/// smaller than the minimum main size, the leftover space is distributed according to
/// `spacing`.
#[derive(Debug)]
pub struct Flex {
    base: ElementBase,
    pub axis: Axis,
    pub spacing: Spacing,
    pub alignment: Alignment,
    children: Vec<FlexChild>,
}

impl Flex {
    pub fn new(base: ElementBase, axis: Axis) -> Flex {
        Flex {
            base,
            axis,
            spacing: Spacing::default(),
            alignment: Alignment::default(),
            children: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// The weight a child was added with, if it is flexed.
    pub fn weight(&self, index: usize) -> Option<f32> {
        self.children.get(index)?.weight
    }

    /// Leading space before the first child and the gap between children.
    fn distribute(&self, space: f64) -> (f64, f64) {
        let n = self.children.len() as f64;
        if space <= 0. || n == 0. {
            return (0., 0.);
        }
        match self.spacing {
            Spacing::SpaceEnd => (0., 0.),
            Spacing::SpaceStart => (space, 0.),
            Spacing::SpaceSides => (space / 2., 0.),
            Spacing::SpaceAround => (space / (n * 2.), space / n),
            Spacing::SpaceBetween if n > 1. => (0., space / (n - 1.)),
            Spacing::SpaceBetween => (0., 0.),
            Spacing::SpaceEvenly => (space / (n + 1.), space / (n + 1.)),
        }
    }
}

impl Definable for Flex {
    const TYPE_NAME: &'static str = "layout.Flex";

    fn from_definition(ctx: &BuildContext, node: &Node) -> anyhow::Result<Flex> {
        let mut flex = Flex::new(
            ElementBase::new(ctx.window(), ""),
            node.constant("axis").unwrap_or_default(),
        );
        flex.spacing = node.constant("spacing").unwrap_or_default();
        flex.alignment = node.constant("alignment").unwrap_or_default();
        Ok(flex)
    }
}

impl Container for Flex {
    fn add_child(&mut self, child: ElementRef, weight: Option<f32>) -> Result<(), Rejection> {
        self.children.push(FlexChild {
            element: child,
            weight: weight.filter(|w| *w > 0.),
        });
        Ok(())
    }
}

impl Element for Flex {
    fn handle_events(&mut self, ctx: &mut EventContext) {
        for child in &self.children {
            child.element.lock().handle_events(ctx);
        }
    }

    fn draw(&mut self, ctx: &mut DrawContext) -> Size {
        let axis = self.axis;
        let cs = ctx.constraints;
        let (main_min, main_max) = (main_of(axis, cs.min), main_of(axis, cs.max));
        let (cross_min, cross_max) = (cross_of(axis, cs.min), cross_of(axis, cs.max));

        let mut recordings: Vec<Option<Recording>> = self.children.iter().map(|_| None).collect();
        let mut used = 0.0_f64;

        for (i, child) in self.children.iter().enumerate() {
            if child.weight.is_some() {
                continue;
            }
            let remaining = (main_max - used).max(0.);
            let constraints = Constraints {
                min: along(axis, 0., cross_min),
                max: along(axis, remaining, cross_max),
            };
            let recording = ctx.record(constraints, |ctx| child.element.lock().draw(ctx));
            used += main_of(axis, recording.size);
            recordings[i] = Some(recording);
        }

        let total_weight: f32 = self.children.iter().filter_map(|c| c.weight).sum();
        // unbounded space can't be shared out
        let flex_space = if main_max.is_finite() {
            (main_max - used).max(0.)
        } else {
            0.
        };
        for (i, child) in self.children.iter().enumerate() {
            let weight = match child.weight {
                Some(weight) => weight,
                None => continue,
            };
            let share = flex_space * f64::from(weight) / f64::from(total_weight);
            let constraints = Constraints {
                min: along(axis, share, cross_min),
                max: along(axis, share, cross_max),
            };
            let recording = ctx.record(constraints, |ctx| child.element.lock().draw(ctx));
            used += main_of(axis, recording.size);
            recordings[i] = Some(recording);
        }

        let cross = recordings
            .iter()
            .flatten()
            .map(|r| cross_of(axis, r.size))
            .fold(cross_min, f64::max);
        let space = (main_min - used).max(0.);
        let (lead, gap) = self.distribute(space);

        let mut main = lead;
        let count = recordings.len();
        for (i, recording) in recordings.into_iter().flatten().enumerate() {
            let child_main = main_of(axis, recording.size);
            let child_cross = cross_of(axis, recording.size);
            let offset = match self.alignment {
                Alignment::Start | Alignment::Baseline => 0.,
                Alignment::End => cross - child_cross,
                Alignment::Middle => (cross - child_cross) / 2.,
            };
            ctx.replay(recording, along(axis, main, offset));
            main += child_main;
            if i + 1 < count {
                main += gap;
            }
        }

        cs.constrain(along(axis, used.max(main_min), cross))
    }

    fn as_container(&mut self) -> Option<&mut dyn Container> {
        Some(self)
    }

    perch_core::impl_element_base!(base);
}
