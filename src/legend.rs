use crate::axis::Axis;
use crate::color::ColorScale;
use crate::config::LegendConfig;
use crate::scale::LinearScale;
use crate::scene::{Element, Surface};

pub const GRADIENT_ID: &str = "linear-gradient";
pub const AXIS_CLASS: &str = "legend-axis";

pub const SLOT_DEFS: &str = "legend-defs";
pub const SLOT_BAR: &str = "legend-bar";
pub const SLOT_AXIS: &str = "legend-axis";

/// Draws the gradient swatch and its axis for `scale`, replacing any
/// previous legend on the surface.
pub fn draw_legend(surface: &mut Surface, scale: &ColorScale, layout: &LegendConfig) {
    let ticks = scale.ticks(layout.gradient_ticks);
    let stops = ticks.iter().map(|&t| {
        let offset = (scale.position(t) * 100.0).clamp(0.0, 100.0);
        Element::new("stop")
            .attr("offset", format!("{}%", round2(offset)))
            .attr("stop-color", scale.color(t))
    });
    let gradient = Element::new("linearGradient")
        .attr("id", GRADIENT_ID)
        .children(stops);
    surface.mount(SLOT_DEFS, Element::new("defs").child(gradient));

    let bar = Element::new("g")
        .attr(
            "transform",
            format!("translate(0,{})", layout.offset_y - layout.bar_height),
        )
        .child(
            Element::new("rect")
                .attr("transform", format!("translate({}, 0)", layout.bar_height))
                .attr("width", layout.bar_width)
                .attr("height", layout.bar_height)
                .style("fill", format!("url(#{})", GRADIENT_ID)),
        );
    surface.mount(SLOT_BAR, bar);

    let axis_scale = LinearScale::new(
        (scale.domain.min, scale.domain.max),
        (layout.axis_start, layout.axis_start + layout.bar_width),
    );
    let mut axis = Axis::bottom(axis_scale)
        .ticks(layout.tick_count)
        .tick_size(-layout.bar_height)
        .build()
        .attr("class", AXIS_CLASS)
        .attr(
            "transform",
            format!("translate({},{})", -layout.bar_height, layout.offset_y),
        );
    for tick in crate::axis::tick_groups_mut(&mut axis) {
        for label in tick.children.iter_mut().filter(|el| el.tag == "text") {
            label.set_style("font-size", format!("{}px", layout.font_size));
        }
    }
    surface.mount(SLOT_AXIS, axis);
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
