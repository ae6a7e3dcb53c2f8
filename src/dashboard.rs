//! The two linked views, their surfaces and the current selection.

use crate::color::ColorScheme;
use crate::config::AtlasConfig;
use crate::error::{AtlasError, AtlasResult};
use crate::line_view::{self, LineFrame, Readout};
use crate::map_view::{self, MapAction, MapFrame, PointerKind, RenderContext};
use crate::scene::Surface;
use crate::tooltip::Tooltip;
use crate::types::{Dataset, Selection};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Pointer events as delivered by the UI; enter/leave on individual
/// regions are derived from consecutive moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerEvent {
    Move,
    Leave,
    Click,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MapPointerOutcome {
    pub region: Option<String>,
    pub tooltip: Option<Tooltip>,
    pub selected: Option<String>,
}

pub struct Dashboard {
    dataset: Dataset,
    config: AtlasConfig,
    selection: Selection,
    scheme: String,
    map_surface: Surface,
    line_surface: Surface,
    map_frame: Option<MapFrame>,
    line_frame: Option<LineFrame>,
    hovered: Option<String>,
}

impl Dashboard {
    /// Starts on the configured year (or the table's first) and scheme.
    /// Nothing is drawn until [`Dashboard::redraw_map`] runs.
    pub fn new(dataset: Dataset, config: AtlasConfig) -> Self {
        let year = config
            .map
            .default_year
            .clone()
            .or_else(|| dataset.indicators.records.first().map(|r| r.year.clone()))
            .unwrap_or_default();
        let scheme = config.map.default_scheme.clone();
        let map_surface = Surface::new(config.map.width, config.map.height);
        let line_surface = Surface::new(config.line_chart.width, config.line_chart.height);

        Self {
            dataset,
            config,
            selection: Selection { year, region: None },
            scheme,
            map_surface,
            line_surface,
            map_frame: None,
            line_frame: None,
            hovered: None,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn config(&self) -> &AtlasConfig {
        &self.config
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn map_surface(&self) -> &Surface {
        &self.map_surface
    }

    pub fn line_surface(&self) -> &Surface {
        &self.line_surface
    }

    pub fn map_frame(&self) -> Option<&MapFrame> {
        self.map_frame.as_ref()
    }

    pub fn line_frame(&self) -> Option<&LineFrame> {
        self.line_frame.as_ref()
    }

    pub fn redraw_map(&mut self) -> AtlasResult<&MapFrame> {
        let ctx = RenderContext {
            dataset: &self.dataset,
            config: &self.config,
        };
        let frame = map_view::render_map(
            ctx,
            &mut self.map_surface,
            &self.selection.year,
            &self.scheme,
        )?;
        self.hovered = None;
        Ok(self.map_frame.insert(frame))
    }

    pub fn set_year(&mut self, year: &str) -> AtlasResult<&MapFrame> {
        info!(year, "Year changed");
        self.selection.year = year.trim().to_string();
        self.redraw_map()
    }

    /// Rejects unknown names before touching the current scheme.
    pub fn set_scheme(&mut self, name: &str) -> AtlasResult<&MapFrame> {
        name.parse::<ColorScheme>()?;
        info!(scheme = name, "Color scale changed");
        self.scheme = name.to_string();
        self.redraw_map()
    }

    pub fn select_region(&mut self, region: &str) -> AtlasResult<&LineFrame> {
        let ctx = RenderContext {
            dataset: &self.dataset,
            config: &self.config,
        };
        let frame = line_view::render_line_chart(ctx, &mut self.line_surface, region)?;
        info!(region, "Region selected");
        self.selection.region = Some(region.to_string());
        Ok(self.line_frame.insert(frame))
    }

    /// Routes a pointer event at map pixel `(x, y)` to the region under it.
    pub fn map_pointer(
        &mut self,
        x: f64,
        y: f64,
        page: (f64, f64),
        event: PointerEvent,
    ) -> AtlasResult<MapPointerOutcome> {
        let Some(frame) = self.map_frame.as_ref() else {
            return Ok(MapPointerOutcome::default());
        };
        let label = self.config.indicator.label.as_str();
        let target = match event {
            PointerEvent::Leave => None,
            _ => frame
                .region_at(&self.dataset.boundaries, x, y)
                .map(str::to_string),
        };

        if self.hovered != target && event != PointerEvent::Click {
            if let Some(previous) = self.hovered.take() {
                map_view::handle_pointer(
                    &mut self.map_surface,
                    frame,
                    label,
                    &previous,
                    PointerKind::Leave,
                    page,
                );
            }
            if let Some(region) = &target {
                map_view::handle_pointer(
                    &mut self.map_surface,
                    frame,
                    label,
                    region,
                    PointerKind::Enter,
                    page,
                );
            }
            self.hovered = target.clone();
        }

        let mut selected = None;
        if let Some(region) = &target {
            let kind = match event {
                PointerEvent::Click => PointerKind::Click,
                _ => PointerKind::Move,
            };
            let action =
                map_view::handle_pointer(&mut self.map_surface, frame, label, region, kind, page);
            if let MapAction::ShowTrend(name) = action {
                selected = Some(name);
            }
        }

        if let Some(name) = &selected {
            match self.select_region(name) {
                Ok(_) => {}
                Err(AtlasError::UnknownRegion(_)) => {
                    warn!(region = %name, "Clicked region has no indicator column");
                    selected = None;
                }
                Err(e) => return Err(e),
            }
        }

        debug!(region = ?target, ?event, "Map pointer");
        Ok(MapPointerOutcome {
            region: target,
            tooltip: self.map_surface.tooltip().cloned(),
            selected,
        })
    }

    /// Routes a pointer event on the line chart overlay.
    pub fn line_pointer(
        &mut self,
        pointer_x: f64,
        page: (f64, f64),
        event: PointerEvent,
    ) -> Option<Readout> {
        let frame = self.line_frame.as_ref()?;
        let label = self.config.indicator.label.as_str();
        let kind = match event {
            PointerEvent::Leave => PointerKind::Leave,
            PointerEvent::Move | PointerEvent::Click => PointerKind::Move,
        };
        line_view::hover(&mut self.line_surface, frame, label, kind, pointer_x, page)
    }

    pub fn line_tooltip(&self) -> Option<&Tooltip> {
        self.line_surface.tooltip()
    }
}
