//! Trend chart for one region with a hover readout.

use crate::axis::{self, Axis};
use crate::error::{AtlasError, AtlasResult};
use crate::map_view::{PointerKind, RenderContext};
use crate::scale::{bisect_left, format_tick, LinearScale};
use crate::scene::{Element, Surface};
use crate::tooltip::{Tooltip, LINE_TOOLTIP_OFFSET};
use serde::Serialize;
use std::fmt::Write;
use tracing::debug;

pub const SLOT_CHART: &str = "line-chart";
pub const SLOT_MARKER: &str = "line-marker";
pub const SLOT_OVERLAY: &str = "line-overlay";

pub const CHART_CLASS: &str = "lineChart";
pub const X_AXIS_CLASS: &str = "xAxis";
pub const LINE_CLASS: &str = "trend";

const TITLE_COLOR: &str = "grey";
const TITLE_FONT_SIZE: &str = "22px";

/// One plotted year. Missing values are drawn at zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub year: String,
    pub year_value: f64,
    pub value: Option<f64>,
    pub plotted: f64,
}

#[derive(Debug, Clone)]
pub struct LineFrame {
    pub region: String,
    pub x: LinearScale,
    pub y: LinearScale,
    pub points: Vec<TrendPoint>,
}

impl LineFrame {
    pub fn years(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.year_value).collect()
    }

    /// Record under a pointer x (overlay pixels): the first year at or after
    /// the inverted position, searching from index 1, clamped to the last year.
    pub fn nearest_index(&self, pointer_x: f64) -> usize {
        let x0 = self.x.invert(pointer_x);
        let i = bisect_left(&self.years(), x0, 1);
        i.min(self.points.len().saturating_sub(1))
    }
}

/// Marker position and label for the hovered year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Readout {
    pub year: String,
    pub value: Option<f64>,
    pub cx: f64,
    pub cy: f64,
}

fn year_label(value: f64) -> String {
    format!("{}", value.round() as i64)
}

fn value_label(value: Option<f64>) -> String {
    value.map(format_tick).unwrap_or_else(|| "no data".to_string())
}

/// Replaces the chart on `surface` with the trend of `region`.
pub fn render_line_chart(
    ctx: RenderContext<'_>,
    surface: &mut Surface,
    region: &str,
) -> AtlasResult<LineFrame> {
    let table = &ctx.dataset.indicators;
    let layout = &ctx.config.line_chart;
    let indicator = &ctx.config.indicator;
    let column = table
        .region_index(region)
        .ok_or_else(|| AtlasError::UnknownRegion(region.to_string()))?;

    let mut points: Vec<TrendPoint> = table
        .records
        .iter()
        .filter_map(|record| {
            let year_value = record.year_value?;
            let value = record.cells.get(column).and_then(|c| c.value);
            Some(TrendPoint {
                year: record.year.clone(),
                year_value,
                value,
                plotted: value.unwrap_or(0.0),
            })
        })
        .collect();
    if points.is_empty() {
        return Err(AtlasError::EmptyTable);
    }
    points.sort_by(|a, b| a.year_value.total_cmp(&b.year_value));

    let inner_width = layout.inner_width();
    let inner_height = layout.inner_height();
    let first_year = points[0].year_value;
    let last_year = points[points.len() - 1].year_value;
    let max_value = points.iter().map(|p| p.plotted).fold(0.0, f64::max);

    let x = LinearScale::new((first_year, last_year), (0.0, inner_width));
    let y = LinearScale::new((0.0, max_value), (inner_height, 0.0));

    let x_title = Element::new("text")
        .style("fill", TITLE_COLOR)
        .style("text-anchor", "middle")
        .style("font-size", TITLE_FONT_SIZE)
        .attr("font-family", "sans-serif")
        .attr(
            "transform",
            format!("translate({},{})", inner_width / 2.0, inner_height + 40.0),
        )
        .text("Year");
    let y_title = Element::new("text")
        .style("fill", TITLE_COLOR)
        .style("font-size", TITLE_FONT_SIZE)
        .style("text-anchor", "end")
        .attr("dy", "-50")
        .attr("dx", -60)
        .attr("font-family", "sans-serif")
        .attr("transform", "rotate(-90)")
        .text(format!(
            "{} for {} ({})",
            indicator.label, region, indicator.unit
        ));

    let mut y_axis = Axis::left(y)
        .tick_size(-inner_width)
        .build()
        .style("font-size", "14px")
        .attr("font-family", "sans-serif")
        .attr("color", "grey");
    axis::remove_domain(&mut y_axis);
    for tick in axis::tick_groups_mut(&mut y_axis).skip(1) {
        for line in tick.children.iter_mut().filter(|el| el.tag == "line") {
            line.set_attr("stroke-opacity", 0.5);
            line.set_attr("stroke-dasharray", "5,10");
        }
    }

    // At most one tick per year so rounded labels never repeat.
    let year_ticks = ((last_year - first_year).round() as usize).clamp(1, 10);
    let mut x_axis = Axis::bottom(x)
        .ticks(year_ticks)
        .tick_format(year_label)
        .build()
        .attr("class", X_AXIS_CLASS)
        .attr("font-family", "sans-serif")
        .attr("color", "grey")
        .style("font-size", "16px")
        .attr("transform", format!("translate(0,{})", inner_height));
    axis::thin_tick_labels(&mut x_axis);

    let mut d = String::new();
    for (i, point) in points.iter().enumerate() {
        let cmd = if i == 0 { 'M' } else { 'L' };
        let _ = write!(
            d,
            "{}{:.2},{:.2}",
            cmd,
            x.apply(point.year_value),
            y.apply(point.plotted)
        );
    }
    let line = Element::new("path")
        .attr("class", LINE_CLASS)
        .attr("d", d)
        .style("stroke-width", 2)
        .style("fill", "none")
        .style("stroke", "black");

    let translate = format!("translate({},{})", layout.margin.left, layout.margin.top);
    let chart = Element::new("g")
        .attr("class", CHART_CLASS)
        .attr("transform", &translate)
        .child(x_title)
        .child(y_title)
        .child(y_axis)
        .child(x_axis)
        .child(line);
    surface.mount(SLOT_CHART, chart);

    let marker = Element::new("g").attr("transform", &translate).child(
        Element::new("circle")
            .style("fill", "none")
            .attr("stroke", "black")
            .attr("stroke-width", 4)
            .attr("r", 10)
            .style("opacity", 0),
    );
    surface.mount(SLOT_MARKER, marker);

    // Covers the inner plot area only, so pointer x maps straight onto the x scale.
    let overlay = Element::new("rect")
        .attr("class", "overlay")
        .style("fill", "none")
        .style("pointer-events", "all")
        .attr("width", inner_width)
        .attr("height", inner_height)
        .attr("transform", &translate);
    surface.mount(SLOT_OVERLAY, overlay);

    surface.set_tooltip(Tooltip::hidden(vec![
        ("position".into(), "absolute".into()),
        ("background-color".into(), "white".into()),
        ("border".into(), "solid".into()),
        ("border-width".into(), "1px".into()),
        ("border-radius".into(), "5px".into()),
        ("padding".into(), "10px".into()),
    ]));

    debug!(region, points = points.len(), max = max_value, "Rendered line chart");

    Ok(LineFrame {
        region: region.to_string(),
        x,
        y,
        points,
    })
}

fn marker_mut(surface: &mut Surface) -> Option<&mut Element> {
    surface
        .slot_mut(SLOT_MARKER)
        .and_then(|g| g.children.iter_mut().find(|el| el.tag == "circle"))
}

/// Applies a pointer event on the chart overlay. `pointer_x` is relative to
/// the overlay's left edge; `page` positions the floating label.
pub fn hover(
    surface: &mut Surface,
    frame: &LineFrame,
    label: &str,
    kind: PointerKind,
    pointer_x: f64,
    page: (f64, f64),
) -> Option<Readout> {
    match kind {
        PointerKind::Enter => {
            if let Some(marker) = marker_mut(surface) {
                marker.set_style("opacity", 1);
            }
            None
        }
        PointerKind::Leave => {
            if let Some(marker) = marker_mut(surface) {
                marker.set_style("opacity", 0);
            }
            if let Some(tooltip) = surface.tooltip_mut() {
                tooltip.hide();
            }
            None
        }
        PointerKind::Move => {
            let point = frame.points.get(frame.nearest_index(pointer_x))?;
            let readout = Readout {
                year: point.year.clone(),
                value: point.value,
                cx: frame.x.apply(point.year_value),
                cy: frame.y.apply(point.plotted),
            };
            if let Some(marker) = marker_mut(surface) {
                marker.set_attr("cx", readout.cx);
                marker.set_attr("cy", readout.cy);
                marker.set_style("opacity", 1);
            }
            if let Some(tooltip) = surface.tooltip_mut() {
                tooltip.show(
                    vec![
                        format!("Year :{}", point.year),
                        format!("{} :{}", label, value_label(point.value)),
                    ],
                    page.0,
                    page.1,
                    LINE_TOOLTIP_OFFSET,
                );
            }
            Some(readout)
        }
        PointerKind::Click => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AtlasConfig;
    use crate::test_support::{dataset, decades_dataset, square_dataset};

    fn config() -> AtlasConfig {
        AtlasConfig::with_inputs("b.geojson", "i.csv")
    }

    fn line_points(surface: &Surface) -> usize {
        surface
            .elements()
            .find(|el| el.has_class(LINE_CLASS))
            .and_then(|el| el.get_attr("d"))
            .map(|d| d.matches(|c| c == 'M' || c == 'L').count())
            .unwrap_or(0)
    }

    #[test]
    fn one_point_per_year_with_missing_as_zero() {
        let data = dataset();
        let config = config();
        let ctx = RenderContext { dataset: &data, config: &config };
        let mut surface = Surface::new(900.0, 400.0);

        let frame = render_line_chart(ctx, &mut surface, "Algeria").unwrap();
        assert_eq!(frame.points.len(), data.indicators.records.len());
        assert_eq!(line_points(&surface), 3);
        assert_eq!(frame.points[2].value, None);
        assert_eq!(frame.points[2].plotted, 0.0);
        assert_eq!(frame.y.domain, (0.0, 1200.0));
        assert_eq!(frame.x.domain, (2000.0, 2002.0));
        // The missing year sits on the baseline.
        assert_eq!(frame.y.apply(frame.points[2].plotted), 320.0);
    }

    #[test]
    fn redraw_keeps_a_single_chart() {
        let data = square_dataset();
        let config = config();
        let ctx = RenderContext { dataset: &data, config: &config };
        let mut surface = Surface::new(900.0, 400.0);

        render_line_chart(ctx, &mut surface, "West").unwrap();
        render_line_chart(ctx, &mut surface, "East").unwrap();
        assert_eq!(surface.count(|el| el.has_class(CHART_CLASS)), 1);
        assert_eq!(surface.count(|el| el.tag == "circle"), 1);
        assert_eq!(surface.count(|el| el.has_class("overlay")), 1);
        let title = surface
            .elements()
            .filter_map(|el| el.text.as_deref())
            .find(|t| t.starts_with("GDP for"))
            .unwrap();
        assert_eq!(title, "GDP for East (based on current USD)");
    }

    #[test]
    fn unknown_region_is_an_error() {
        let data = dataset();
        let config = config();
        let ctx = RenderContext { dataset: &data, config: &config };
        let mut surface = Surface::new(900.0, 400.0);
        let err = render_line_chart(ctx, &mut surface, "Atlantis").unwrap_err();
        assert!(matches!(err, AtlasError::UnknownRegion(_)));
    }

    #[test]
    fn gridlines_are_dashed_after_the_first() {
        let data = square_dataset();
        let config = config();
        let ctx = RenderContext { dataset: &data, config: &config };
        let mut surface = Surface::new(900.0, 400.0);
        render_line_chart(ctx, &mut surface, "East").unwrap();

        let lines: Vec<&Element> = surface
            .elements()
            .filter(|el| el.tag == "line" && el.get_attr("x2") == Some("740"))
            .collect();
        assert!(lines.len() > 2);
        assert_eq!(lines[0].get_attr("stroke-dasharray"), None);
        assert!(lines[1..]
            .iter()
            .all(|l| l.get_attr("stroke-dasharray") == Some("5,10")));
        assert_eq!(surface.count(|el| el.has_class("domain")), 1);
    }

    #[test]
    fn hover_snaps_to_the_bisected_year() {
        let data = decades_dataset();
        let config = config();
        let ctx = RenderContext { dataset: &data, config: &config };
        let mut surface = Surface::new(900.0, 400.0);
        let frame = render_line_chart(ctx, &mut surface, "Chad").unwrap();

        let pointer_x = frame.x.apply(2003.6);
        assert_eq!(frame.points[frame.nearest_index(pointer_x)].year, "2004");

        let readout = hover(
            &mut surface,
            &frame,
            "GDP",
            PointerKind::Move,
            pointer_x,
            (300.0, 300.0),
        )
        .unwrap();
        assert_eq!(readout.year, "2004");
        assert_eq!(readout.value, Some(2004.0 * 2.0));
        assert_eq!(readout.cx, frame.x.apply(2004.0));

        let tip = surface.tooltip().unwrap();
        assert_eq!(tip.lines, vec!["Year :2004", "GDP :4008"]);
        assert_eq!((tip.left, tip.top), (250.0, 230.0));

        let circle = surface.elements().find(|el| el.tag == "circle").unwrap();
        assert_eq!(circle.get_style("opacity"), Some("1"));

        hover(&mut surface, &frame, "GDP", PointerKind::Leave, 0.0, (0.0, 0.0));
        let circle = surface.elements().find(|el| el.tag == "circle").unwrap();
        assert_eq!(circle.get_style("opacity"), Some("0"));
        assert!(!surface.tooltip().unwrap().visible);
    }

    #[test]
    fn hover_past_either_end_is_clamped() {
        let data = decades_dataset();
        let config = config();
        let ctx = RenderContext { dataset: &data, config: &config };
        let mut surface = Surface::new(900.0, 400.0);
        let frame = render_line_chart(ctx, &mut surface, "Chad").unwrap();

        assert_eq!(frame.points[frame.nearest_index(-50.0)].year, "1991");
        assert_eq!(frame.points[frame.nearest_index(10_000.0)].year, "2010");
    }

    #[test]
    fn x_axis_labels_are_thinned() {
        let data = decades_dataset();
        let config = config();
        let ctx = RenderContext { dataset: &data, config: &config };
        let mut surface = Surface::new(900.0, 400.0);
        render_line_chart(ctx, &mut surface, "Chad").unwrap();

        let x_axis = surface
            .elements()
            .find(|el| el.has_class(X_AXIS_CLASS))
            .unwrap();
        let ticks = x_axis.children.iter().filter(|el| el.has_class("tick")).count();
        let labels = axis::tick_labels(x_axis);
        assert_eq!(labels.len(), (ticks + 1) / 2);
        assert_eq!(labels[0], "1990");
    }

    #[test]
    fn short_ranges_tick_whole_years() {
        let data = dataset();
        let config = config();
        let ctx = RenderContext { dataset: &data, config: &config };
        let mut surface = Surface::new(900.0, 400.0);
        render_line_chart(ctx, &mut surface, "Algeria").unwrap();

        let x_axis = surface
            .elements()
            .find(|el| el.has_class(X_AXIS_CLASS))
            .unwrap();
        let values: Vec<&str> = x_axis
            .children
            .iter()
            .filter_map(|el| el.get_attr("data-value"))
            .collect();
        assert_eq!(values, vec!["2000", "2001", "2002"]);
    }
}
