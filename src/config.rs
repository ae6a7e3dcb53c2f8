use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct AtlasConfig {
    pub input: InputConfig,
    #[serde(default)]
    pub indicator: IndicatorConfig,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub line_chart: LineChartConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    pub boundaries: PathBuf, // .geojson, .json or .shp
    pub indicators: PathBuf,
    #[serde(default = "default_name_property")]
    pub name_property: String,
    #[serde(default = "default_year_column")]
    pub year_column: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IndicatorConfig {
    pub label: String,
    pub unit: String,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            label: "GDP".to_string(),
            unit: "based on current USD".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MapConfig {
    pub width: f64,
    pub height: f64,
    /// Fixed projection scale; fit to the surface when unset.
    pub scale: Option<f64>,
    pub center_divisor: f64,
    pub default_year: Option<String>,
    pub default_scheme: String,
    pub no_data_fill: String,
    pub legend: LegendConfig,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            scale: None,
            center_divisor: 2.3,
            default_year: None,
            default_scheme: "interpolateRdYlGn".to_string(),
            no_data_fill: "white".to_string(),
            legend: LegendConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct LegendConfig {
    pub offset_y: f64,
    pub bar_width: f64,
    pub bar_height: f64,
    pub axis_start: f64,
    pub tick_count: usize,
    pub gradient_ticks: usize,
    pub font_size: f64,
}

impl Default for LegendConfig {
    fn default() -> Self {
        Self {
            offset_y: 320.0,
            bar_width: 200.0,
            bar_height: 20.0,
            axis_start: 40.0,
            tick_count: 5,
            gradient_ticks: 10,
            font_size: 9.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct LineChartConfig {
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
}

impl LineChartConfig {
    pub fn inner_width(&self) -> f64 {
        self.width - self.margin.left - self.margin.right
    }

    pub fn inner_height(&self) -> f64 {
        self.height - self.margin.top - self.margin.bottom
    }
}

impl Default for LineChartConfig {
    fn default() -> Self {
        Self {
            width: 900.0,
            height: 400.0,
            margin: Margin::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 20.0,
            right: 60.0,
            bottom: 60.0,
            left: 100.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            static_dir: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
        }
    }
}

fn default_name_property() -> String {
    "name".to_string()
}

fn default_year_column() -> String {
    "Year".to_string()
}

impl AtlasConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: AtlasConfig =
            toml::from_str(content).with_context(|| "Failed to parse TOML configuration")?;
        Ok(config)
    }

    /// Config with defaults everywhere except the two input paths.
    pub fn with_inputs(boundaries: impl Into<PathBuf>, indicators: impl Into<PathBuf>) -> Self {
        Self {
            input: InputConfig {
                boundaries: boundaries.into(),
                indicators: indicators.into(),
                name_property: default_name_property(),
                year_column: default_year_column(),
            },
            indicator: IndicatorConfig::default(),
            map: MapConfig::default(),
            line_chart: LineChartConfig::default(),
            server: ServerConfig::default(),
            output: OutputConfig::default(),
        }
    }
}
