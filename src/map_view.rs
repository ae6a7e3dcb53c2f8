//! Choropleth map: projection, fills, legend and pointer handling.

use crate::color::{ColorScale, ColorScheme};
use crate::config::AtlasConfig;
use crate::error::AtlasResult;
use crate::legend;
use crate::projection::Mercator;
use crate::scale::Extent;
use crate::scene::{Element, Surface};
use crate::tooltip::{Tooltip, MAP_TOOLTIP_OFFSET};
use crate::types::{BoundaryCollection, Dataset, IndicatorTable, YearRecord};
use geo::algorithm::bounding_rect::BoundingRect;
use geo::algorithm::contains::Contains;
use geo::Point;
use rayon::prelude::*;
use rstar::{RTree, RTreeObject, AABB};
use serde::Serialize;
use tracing::debug;

pub const SLOT_MAP: &str = "map";
pub const REGION_CLASS: &str = "countrymap";

const STROKE: &str = "black";
const STROKE_WIDTH: f64 = 1.0;
const HIGHLIGHT_STROKE: &str = "cyan";
const HIGHLIGHT_STROKE_WIDTH: f64 = 4.0;

/// Read-only inputs every render needs.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub dataset: &'a Dataset,
    pub config: &'a AtlasConfig,
}

/// What a region was filled with on the last draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionFill {
    pub name: String,
    pub value: Option<f64>,
    pub raw: Option<String>,
    pub fill: String,
}

struct RegionIndex {
    index: usize,
    aabb: AABB<[f64; 2]>,
}

impl RTreeObject for RegionIndex {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.aabb
    }
}

/// Result of a map draw, kept around to answer pointer events.
pub struct MapFrame {
    pub year: String,
    pub scale: ColorScale,
    pub projection: Mercator,
    pub fills: Vec<RegionFill>,
    tree: RTree<RegionIndex>,
}

impl MapFrame {
    pub fn fill_for(&self, region: &str) -> Option<&RegionFill> {
        self.fills.iter().find(|f| f.name == region)
    }

    /// Region under a surface pixel, if any.
    pub fn region_at<'a>(
        &self,
        boundaries: &'a BoundaryCollection,
        x: f64,
        y: f64,
    ) -> Option<&'a str> {
        let (lon, lat) = self.projection.invert(x, y);
        let point = Point::new(lon, lat);
        let envelope = AABB::from_point([lon, lat]);

        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .filter_map(|candidate| boundaries.features.get(candidate.index))
            .find(|feature| feature.geometry.contains(&point))
            .map(|feature| feature.name.as_str())
    }
}

impl std::fmt::Debug for MapFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapFrame")
            .field("year", &self.year)
            .field("scale", &self.scale)
            .field("projection", &self.projection)
            .field("regions", &self.fills.len())
            .finish()
    }
}

/// Min/max over every numeric cell of the record. Falls back to `[0, 0]`
/// when the year is absent or has no numeric values.
pub fn year_extent(record: Option<&YearRecord>) -> Extent {
    record
        .and_then(|r| Extent::from_values(r.cells.iter().filter_map(|c| c.value)))
        .unwrap_or(Extent::new(0.0, 0.0))
}

fn region_value<'a>(
    table: &IndicatorTable,
    record: Option<&'a YearRecord>,
    region: &str,
) -> (Option<f64>, Option<&'a str>) {
    match record.and_then(|r| table.cell(r, region)) {
        Some(cell) => (cell.value, Some(cell.raw.as_str())),
        None => (None, None),
    }
}

/// Redraws the map, its legend and a fresh hidden tooltip for `year`
/// colored with the scheme named `scheme_name`.
pub fn render_map(
    ctx: RenderContext<'_>,
    surface: &mut Surface,
    year: &str,
    scheme_name: &str,
) -> AtlasResult<MapFrame> {
    let scheme: ColorScheme = scheme_name.parse()?;
    let table = &ctx.dataset.indicators;
    let boundaries = &ctx.dataset.boundaries;
    let map = &ctx.config.map;

    let record = table.record_for_year(year);
    if record.is_none() {
        debug!(year, "No indicator record for year; every region renders as no data");
    }
    let extent = year_extent(record);
    let scale = ColorScale::new(scheme, extent);
    let projection = Mercator::fit(
        boundaries,
        surface.width,
        surface.height,
        map.center_divisor,
        map.scale,
    );

    let drawn: Vec<(RegionFill, String)> = boundaries
        .features
        .par_iter()
        .map(|feature| {
            let (value, raw) = region_value(table, record, &feature.name);
            let fill = match value {
                Some(v) => scale.color(v),
                None => map.no_data_fill.clone(),
            };
            let region = RegionFill {
                name: feature.name.clone(),
                value,
                raw: raw.map(str::to_string),
                fill,
            };
            (region, projection.path(&feature.geometry))
        })
        .collect();

    let paths = drawn.iter().map(|(region, d)| {
        Element::new("path")
            .attr("d", d)
            .attr("id", &region.name)
            .attr("class", REGION_CLASS)
            .style("fill", &region.fill)
            .style("stroke", STROKE)
            .style("stroke-width", STROKE_WIDTH)
    });
    surface.mount(SLOT_MAP, Element::new("g").attr("class", "map").children(paths));

    surface.set_tooltip(Tooltip::hidden(tooltip_styles(&scale)));
    legend::draw_legend(surface, &scale, &map.legend);

    let tree = RTree::bulk_load(
        boundaries
            .features
            .iter()
            .enumerate()
            .filter_map(|(index, feature)| {
                let rect = feature.geometry.bounding_rect()?;
                Some(RegionIndex {
                    index,
                    aabb: AABB::from_corners(
                        [rect.min().x, rect.min().y],
                        [rect.max().x, rect.max().y],
                    ),
                })
            })
            .collect(),
    );

    debug!(
        year,
        scheme = %scheme,
        min = extent.min,
        max = extent.max,
        regions = drawn.len(),
        "Rendered map"
    );

    Ok(MapFrame {
        year: year.to_string(),
        scale,
        projection,
        fills: drawn.into_iter().map(|(region, _)| region).collect(),
        tree,
    })
}

fn tooltip_styles(scale: &ColorScale) -> Vec<(String, String)> {
    let max = scale.domain.max;
    vec![
        ("border-radius".into(), "5px".into()),
        ("color".into(), scale.color(max)),
        ("position".into(), "absolute".into()),
        ("background-color".into(), scale.color(max / 2.0)),
        ("border".into(), "solid".into()),
        ("border-width".into(), "2px".into()),
        ("border-color".into(), scale.color(scale.domain.min)),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Enter,
    Move,
    Leave,
    Click,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapAction {
    None,
    ShowTrend(String),
}

/// Applies one pointer event aimed at `region` to the drawn map.
pub fn handle_pointer(
    surface: &mut Surface,
    frame: &MapFrame,
    label: &str,
    region: &str,
    kind: PointerKind,
    page: (f64, f64),
) -> MapAction {
    match kind {
        PointerKind::Enter => {
            set_outline(surface, region, HIGHLIGHT_STROKE, HIGHLIGHT_STROKE_WIDTH);
            MapAction::None
        }
        PointerKind::Move => {
            let raw = frame
                .fill_for(region)
                .and_then(|f| f.raw.clone())
                .filter(|raw| !raw.is_empty())
                .unwrap_or_else(|| "no data".to_string());
            if let Some(tooltip) = surface.tooltip_mut() {
                tooltip.show(
                    vec![format!("Country : {}", region), format!("{} : {}", label, raw)],
                    page.0,
                    page.1,
                    MAP_TOOLTIP_OFFSET,
                );
            }
            MapAction::None
        }
        PointerKind::Leave => {
            if let Some(tooltip) = surface.tooltip_mut() {
                tooltip.hide();
            }
            set_outline(surface, region, STROKE, STROKE_WIDTH);
            MapAction::None
        }
        PointerKind::Click => {
            debug!(region, "Region clicked");
            MapAction::ShowTrend(region.to_string())
        }
    }
}

fn set_outline(surface: &mut Surface, region: &str, stroke: &str, width: f64) {
    if let Some(path) = surface.find_by_id_mut(region) {
        path.set_style("stroke-width", width);
        path.set_style("stroke", stroke);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{dataset, square_dataset};

    fn config() -> AtlasConfig {
        AtlasConfig::with_inputs("b.geojson", "i.csv")
    }

    fn fill_of(surface: &Surface, region: &str) -> String {
        surface
            .elements()
            .find(|el| el.id() == Some(region))
            .and_then(|el| el.get_style("fill"))
            .unwrap_or_default()
            .to_string()
    }

    #[test]
    fn extent_bounds_every_value_of_the_year() {
        let data = dataset();
        for record in &data.indicators.records {
            let extent = year_extent(Some(record));
            for v in record.cells.iter().filter_map(|c| c.value) {
                assert!(extent.contains(v), "{} outside {:?}", v, extent);
            }
        }
    }

    proptest::proptest! {
        #[test]
        fn extent_contains_every_numeric_cell(
            values in proptest::collection::vec(proptest::option::of(-1e9f64..1e9), 1..40)
        ) {
            let record = YearRecord {
                year: "2000".to_string(),
                year_value: Some(2000.0),
                cells: values
                    .iter()
                    .map(|v| crate::types::Cell {
                        raw: v.map(|v| v.to_string()).unwrap_or_default(),
                        value: *v,
                    })
                    .collect(),
            };
            let extent = year_extent(Some(&record));
            for v in values.iter().flatten() {
                proptest::prop_assert!(extent.contains(*v));
            }
            if values.iter().all(Option::is_none) {
                proptest::prop_assert_eq!(extent, Extent::new(0.0, 0.0));
            }
        }
    }

    #[test]
    fn missing_year_falls_back_to_zero_extent() {
        assert_eq!(year_extent(None), Extent::new(0.0, 0.0));
        let data = dataset();
        let empty = data.indicators.record_for_year("2002").unwrap();
        // Only "Algeria" exists and 2002 is NaN.
        assert!(year_extent(Some(empty)).is_degenerate());
    }

    #[test]
    fn missing_value_renders_no_data_fill() {
        let data = dataset();
        let config = config();
        let ctx = RenderContext { dataset: &data, config: &config };
        let mut surface = Surface::new(800.0, 600.0);

        let frame = render_map(ctx, &mut surface, "2002", "viridis").unwrap();
        assert_eq!(fill_of(&surface, "Algeria"), "white");
        assert_eq!(frame.fill_for("Algeria").unwrap().value, None);
    }

    #[test]
    fn single_value_year_uses_an_interior_color() {
        let data = dataset();
        let config = config();
        let ctx = RenderContext { dataset: &data, config: &config };
        let mut surface = Surface::new(800.0, 600.0);

        render_map(ctx, &mut surface, "2001", "viridis").unwrap();
        let fill = fill_of(&surface, "Algeria");
        assert_ne!(fill, "white");
        assert_ne!(fill, ColorScheme::Viridis.interpolate(0.0));
        assert_ne!(fill, ColorScheme::Viridis.interpolate(1.0));
    }

    #[test]
    fn unknown_year_and_unknown_names_are_no_data() {
        let data = square_dataset();
        let config = config();
        let ctx = RenderContext { dataset: &data, config: &config };
        let mut surface = Surface::new(800.0, 600.0);

        let frame = render_map(ctx, &mut surface, "1850", "blues").unwrap();
        assert!(frame.fills.iter().all(|f| f.fill == "white"));
        assert_eq!(frame.scale.domain, Extent::new(0.0, 0.0));

        render_map(ctx, &mut surface, "2000", "blues").unwrap();
        // "Atlantis" has a boundary but no table column.
        assert_eq!(fill_of(&surface, "Atlantis"), "white");
        assert_ne!(fill_of(&surface, "West"), "white");
    }

    #[test]
    fn unknown_scheme_is_an_error() {
        let data = dataset();
        let config = config();
        let ctx = RenderContext { dataset: &data, config: &config };
        let mut surface = Surface::new(800.0, 600.0);
        assert!(render_map(ctx, &mut surface, "2001", "interpolateNope").is_err());
    }

    #[test]
    fn repeated_redraws_do_not_accumulate() {
        let data = square_dataset();
        let config = config();
        let ctx = RenderContext { dataset: &data, config: &config };
        let mut surface = Surface::new(800.0, 600.0);

        render_map(ctx, &mut surface, "2000", "viridis").unwrap();
        render_map(ctx, &mut surface, "2000", "viridis").unwrap();
        render_map(ctx, &mut surface, "2001", "magma").unwrap();

        assert_eq!(surface.count(|el| el.id() == Some(legend::GRADIENT_ID)), 1);
        assert_eq!(surface.count(|el| el.has_class(legend::AXIS_CLASS)), 1);
        assert_eq!(surface.count(|el| el.has_class("map")), 1);
        assert_eq!(
            surface.count(|el| el.has_class(REGION_CLASS)),
            data.boundaries.len()
        );
    }

    #[test]
    fn pointer_lifecycle_highlights_labels_and_clicks() {
        let data = square_dataset();
        let config = config();
        let ctx = RenderContext { dataset: &data, config: &config };
        let mut surface = Surface::new(800.0, 600.0);
        let frame = render_map(ctx, &mut surface, "2000", "viridis").unwrap();

        handle_pointer(&mut surface, &frame, "GDP", "West", PointerKind::Enter, (0.0, 0.0));
        let west = surface.elements().find(|el| el.id() == Some("West")).unwrap();
        assert_eq!(west.get_style("stroke"), Some("cyan"));
        assert_eq!(west.get_style("stroke-width"), Some("4"));

        handle_pointer(&mut surface, &frame, "GDP", "West", PointerKind::Move, (100.0, 200.0));
        let tip = surface.tooltip().unwrap();
        assert!(tip.visible);
        assert_eq!(tip.lines, vec!["Country : West", "GDP : 500"]);
        assert_eq!((tip.left, tip.top), (125.0, 180.0));

        handle_pointer(&mut surface, &frame, "GDP", "West", PointerKind::Leave, (0.0, 0.0));
        assert!(!surface.tooltip().unwrap().visible);
        let west = surface.elements().find(|el| el.id() == Some("West")).unwrap();
        assert_eq!(west.get_style("stroke"), Some("black"));
        assert_eq!(west.get_style("stroke-width"), Some("1"));

        let action =
            handle_pointer(&mut surface, &frame, "GDP", "West", PointerKind::Click, (0.0, 0.0));
        assert_eq!(action, MapAction::ShowTrend("West".to_string()));
    }

    #[test]
    fn hit_testing_finds_the_region_under_the_pointer() {
        let data = square_dataset();
        let config = config();
        let ctx = RenderContext { dataset: &data, config: &config };
        let mut surface = Surface::new(800.0, 600.0);
        let frame = render_map(ctx, &mut surface, "2000", "viridis").unwrap();

        let (x, y) = frame.projection.project(-5.0, -5.0);
        assert_eq!(frame.region_at(&data.boundaries, x, y), Some("West"));
        let (x, y) = frame.projection.project(5.0, 5.0);
        assert_eq!(frame.region_at(&data.boundaries, x, y), Some("East"));
        let (x, y) = frame.projection.project(60.0, 60.0);
        assert_eq!(frame.region_at(&data.boundaries, x, y), None);
    }

    #[test]
    fn hit_region_name_outlives_the_frame() {
        let data = square_dataset();
        let config = config();
        let ctx = RenderContext { dataset: &data, config: &config };
        let mut surface = Surface::new(800.0, 600.0);

        let name = {
            let frame = render_map(ctx, &mut surface, "2000", "viridis").unwrap();
            let (x, y) = frame.projection.project(5.0, 5.0);
            frame.region_at(&data.boundaries, x, y)
        };
        assert_eq!(name, Some("East"));
    }
}
