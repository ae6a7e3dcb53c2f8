use geo::MultiPolygon;
use serde::Serialize;

/// A named region from the boundary file.
#[derive(Debug, Clone)]
pub struct BoundaryFeature {
    pub name: String,
    pub geometry: MultiPolygon<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct BoundaryCollection {
    pub features: Vec<BoundaryFeature>,
}

impl BoundaryCollection {
    pub fn new(features: Vec<BoundaryFeature>) -> Self {
        Self { features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// All geometries merged, used for the projection center.
    pub fn merged_geometry(&self) -> MultiPolygon<f64> {
        MultiPolygon::new(
            self.features
                .iter()
                .flat_map(|f| f.geometry.0.iter().cloned())
                .collect(),
        )
    }
}

/// One table cell: the text as read, plus its numeric value when it has one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cell {
    pub raw: String,
    pub value: Option<f64>,
}

impl Cell {
    /// Empty, non-numeric and non-finite text is "no data".
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let value = trimmed.parse::<f64>().ok().filter(|v| v.is_finite());
        Self {
            raw: trimmed.to_string(),
            value,
        }
    }

    pub fn missing() -> Self {
        Self {
            raw: String::new(),
            value: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct YearRecord {
    pub year: String,
    pub year_value: Option<f64>,
    /// Indexed like `IndicatorTable::regions`.
    pub cells: Vec<Cell>,
}

impl YearRecord {
    /// Year matching: numeric equality when both sides are numbers, text otherwise.
    pub fn matches_year(&self, year: &str) -> bool {
        let year = year.trim();
        match (self.year_value, year.parse::<f64>().ok()) {
            (Some(a), Some(b)) => a == b,
            _ => self.year == year,
        }
    }
}

/// Year-indexed table of per-region values, already normalized to numbers.
#[derive(Debug, Clone, Default)]
pub struct IndicatorTable {
    pub year_column: String,
    pub regions: Vec<String>,
    pub records: Vec<YearRecord>,
}

impl IndicatorTable {
    pub fn region_index(&self, region: &str) -> Option<usize> {
        self.regions.iter().position(|r| r == region)
    }

    pub fn record_for_year(&self, year: &str) -> Option<&YearRecord> {
        self.records.iter().find(|r| r.matches_year(year))
    }

    /// Looks up a region's cell in a record; name mismatches are "no data".
    pub fn cell<'a>(&self, record: &'a YearRecord, region: &str) -> Option<&'a Cell> {
        self.region_index(region).and_then(|idx| record.cells.get(idx))
    }

    pub fn years(&self) -> Vec<String> {
        self.records.iter().map(|r| r.year.clone()).collect()
    }
}

/// The two inputs, loaded once and shared read-only by every view.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub boundaries: BoundaryCollection,
    pub indicators: IndicatorTable,
}

/// Currently displayed year and region.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Selection {
    pub year: String,
    pub region: Option<String>,
}
