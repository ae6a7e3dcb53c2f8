use crate::scale::{format_tick, LinearScale};
use crate::scene::Element;

const DEFAULT_TICK_SIZE: f64 = 6.0;
const TICK_PADDING: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orient {
    Bottom,
    Left,
}

/// Builder for a tick axis: a domain path plus one `g.tick` per tick value.
#[derive(Debug, Clone)]
pub struct Axis {
    orient: Orient,
    scale: LinearScale,
    tick_count: usize,
    tick_size: f64,
    format: fn(f64) -> String,
}

impl Axis {
    pub fn bottom(scale: LinearScale) -> Self {
        Self::new(Orient::Bottom, scale)
    }

    pub fn left(scale: LinearScale) -> Self {
        Self::new(Orient::Left, scale)
    }

    fn new(orient: Orient, scale: LinearScale) -> Self {
        Self {
            orient,
            scale,
            tick_count: 10,
            tick_size: DEFAULT_TICK_SIZE,
            format: format_tick,
        }
    }

    pub fn ticks(mut self, count: usize) -> Self {
        self.tick_count = count;
        self
    }

    /// Negative sizes draw ticks inward, across the plot (gridlines).
    pub fn tick_size(mut self, size: f64) -> Self {
        self.tick_size = size;
        self
    }

    pub fn tick_format(mut self, format: fn(f64) -> String) -> Self {
        self.format = format;
        self
    }

    pub fn tick_values(&self) -> Vec<f64> {
        self.scale.ticks(self.tick_count)
    }

    pub fn build(&self) -> Element {
        let (r0, r1) = self.scale.range;
        let k = self.tick_size;
        let spacing = k.max(0.0) + TICK_PADDING;

        let (anchor, domain_d) = match self.orient {
            Orient::Bottom => ("middle", format!("M{},{}V0H{}V{}", r0, k, r1, k)),
            Orient::Left => ("end", format!("M{},{}H0V{}H{}", -k, r0, r1, -k)),
        };

        let domain = Element::new("path")
            .attr("class", "domain")
            .attr("stroke", "currentColor")
            .attr("d", domain_d);

        let ticks = self.tick_values().into_iter().map(|value| {
            let pos = self.scale.apply(value);
            let label = (self.format)(value);
            let (transform, line, text) = match self.orient {
                Orient::Bottom => (
                    format!("translate({},0)", pos),
                    Element::new("line").attr("stroke", "currentColor").attr("y2", k),
                    Element::new("text")
                        .attr("fill", "currentColor")
                        .attr("y", spacing)
                        .attr("dy", "0.71em")
                        .text(label),
                ),
                Orient::Left => (
                    format!("translate(0,{})", pos),
                    Element::new("line").attr("stroke", "currentColor").attr("x2", -k),
                    Element::new("text")
                        .attr("fill", "currentColor")
                        .attr("x", -spacing)
                        .attr("dy", "0.32em")
                        .text(label),
                ),
            };
            Element::new("g")
                .attr("class", "tick")
                .attr("opacity", 1)
                .attr("transform", transform)
                .attr("data-value", value)
                .child(line)
                .child(text)
        });

        Element::new("g")
            .attr("fill", "none")
            .attr("font-size", 10)
            .attr("font-family", "sans-serif")
            .attr("text-anchor", anchor)
            .child(domain)
            .children(ticks)
    }
}

/// Tick groups of an axis element, in draw order.
pub fn tick_groups_mut(axis: &mut Element) -> impl Iterator<Item = &mut Element> {
    axis.children.iter_mut().filter(|el| el.has_class("tick"))
}

pub fn tick_labels(axis: &Element) -> Vec<String> {
    axis.children
        .iter()
        .filter(|el| el.has_class("tick"))
        .flat_map(|tick| tick.children.iter())
        .filter(|el| el.tag == "text")
        .filter_map(|el| el.text.clone())
        .collect()
}

/// Removes the label of every odd-indexed tick, leaving the tick lines.
/// Label-density control only; no data is dropped. Returns the number removed.
pub fn thin_tick_labels(axis: &mut Element) -> usize {
    let mut removed = 0;
    for (idx, tick) in tick_groups_mut(axis).enumerate() {
        if idx % 2 == 1 {
            let before = tick.children.len();
            tick.children.retain(|el| el.tag != "text");
            removed += before - tick.children.len();
        }
    }
    removed
}

pub fn remove_domain(axis: &mut Element) {
    axis.children.retain(|el| !el.has_class("domain"));
}
