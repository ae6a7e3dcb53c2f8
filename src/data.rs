use crate::config::AtlasConfig;
use crate::error::AtlasError;
use crate::types::{BoundaryCollection, BoundaryFeature, Cell, Dataset, IndicatorTable, YearRecord};
use anyhow::{anyhow, Context, Result};
use csv::ReaderBuilder;
use geo::MultiPolygon;
use geojson::GeoJson;
use shapefile::Reader;
use std::convert::TryInto;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

/// Loads both input files concurrently. Rendering may only start once both
/// have loaded; a failure in either is returned as-is.
pub async fn load_dataset(config: &AtlasConfig) -> Result<Dataset> {
    let boundaries_path = config.input.boundaries.clone();
    let name_property = config.input.name_property.clone();
    let indicators_path = config.input.indicators.clone();
    let year_column = config.input.year_column.clone();

    let boundaries = tokio::task::spawn_blocking(move || {
        load_boundaries(&boundaries_path, &name_property)
    });
    let indicators = tokio::task::spawn_blocking(move || {
        load_indicators(&indicators_path, &year_column)
    });

    let (boundaries, indicators) = tokio::try_join!(boundaries, indicators)
        .context("Input loading task failed")?;
    let dataset = Dataset {
        boundaries: boundaries?,
        indicators: indicators?,
    };

    info!(
        features = dataset.boundaries.len(),
        years = dataset.indicators.records.len(),
        regions = dataset.indicators.regions.len(),
        "Loaded dataset"
    );
    Ok(dataset)
}

/// Reads a boundary file, dispatching on its extension.
pub fn load_boundaries(path: &Path, name_property: &str) -> Result<BoundaryCollection> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s: &str| s.to_lowercase())
        .ok_or_else(|| anyhow!("Boundary file has no extension: {:?}", path))?;

    let collection = match extension.as_str() {
        "json" | "geojson" => {
            info!("Loading GeoJSON from {:?}...", path);
            let file = File::open(path)
                .with_context(|| format!("Failed to open GeoJSON file: {:?}", path))?;
            parse_geojson_boundaries(BufReader::new(file), name_property)?
        }
        "shp" => load_shapefile_boundaries(path, name_property)?,
        other => return Err(AtlasError::UnsupportedFormat(other.to_string()).into()),
    };

    info!("Loaded {} boundary features", collection.len());
    Ok(collection)
}

pub fn parse_geojson_boundaries<R: Read>(reader: R, name_property: &str) -> Result<BoundaryCollection> {
    let geojson = GeoJson::from_reader(reader).context("Failed to parse GeoJSON")?;

    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => {
            return Err(AtlasError::InvalidBoundaries(
                "GeoJSON must be a FeatureCollection".to_string(),
            )
            .into())
        }
    };

    let mut features = Vec::new();
    for feature in collection.features {
        let name_val = feature
            .properties
            .as_ref()
            .and_then(|props| props.get(name_property));

        let name = match name_val {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => {
                debug!("Skipping feature without '{}' property", name_property);
                continue;
            }
        };

        let geometry = match feature.geometry {
            Some(geom) => {
                let valid_geo: geo::Geometry<f64> = geom
                    .value
                    .try_into()
                    .map_err(|e| anyhow!("Failed to convert geometry of '{}': {:?}", name, e))?;

                match valid_geo {
                    geo::Geometry::MultiPolygon(mp) => mp,
                    geo::Geometry::Polygon(p) => MultiPolygon::new(vec![p]),
                    _ => {
                        debug!("Skipping non-polygon feature '{}'", name);
                        continue;
                    }
                }
            }
            None => {
                debug!("Skipping feature '{}' without geometry", name);
                continue;
            }
        };

        features.push(BoundaryFeature { name, geometry });
    }

    Ok(BoundaryCollection::new(features))
}

fn load_shapefile_boundaries(path: &Path, name_property: &str) -> Result<BoundaryCollection> {
    info!("Loading Shapefile from {:?}...", path);
    let mut reader = Reader::from_path(path)
        .with_context(|| format!("Failed to open Shapefile: {:?}", path))?;

    let mut features = Vec::new();
    for result in reader.iter_shapes_and_records() {
        let (shape, record) = result?;

        let name = match record.get(name_property) {
            Some(shapefile::dbase::FieldValue::Character(Some(s))) => s.trim().to_string(),
            Some(shapefile::dbase::FieldValue::Character(None)) => continue,
            Some(_) => {
                return Err(AtlasError::InvalidBoundaries(format!(
                    "Shapefile name column '{}' must be a string",
                    name_property
                ))
                .into())
            }
            None => {
                return Err(AtlasError::InvalidBoundaries(format!(
                    "Name column '{}' not found in Shapefile",
                    name_property
                ))
                .into())
            }
        };

        let geometry: MultiPolygon<f64> = match shape {
            shapefile::Shape::Polygon(polygon) => polygon
                .try_into()
                .map_err(|e| anyhow!("Failed to convert polygon: {:?}", e))?,
            shapefile::Shape::PolygonM(polygon) => polygon
                .try_into()
                .map_err(|e| anyhow!("Failed to convert polygonM: {:?}", e))?,
            shapefile::Shape::PolygonZ(polygon) => polygon
                .try_into()
                .map_err(|e| anyhow!("Failed to convert polygonZ: {:?}", e))?,
            _ => continue,
        };

        features.push(BoundaryFeature { name, geometry });
    }

    Ok(BoundaryCollection::new(features))
}

pub fn load_indicators(path: &Path, year_column: &str) -> Result<IndicatorTable> {
    info!("Loading indicator table from {:?}...", path);
    let file = File::open(path)
        .with_context(|| format!("Failed to open CSV file: {:?}", path))?;
    let table = parse_indicators(file, year_column)?;
    info!(
        "Loaded {} years for {} regions",
        table.records.len(),
        table.regions.len()
    );
    Ok(table)
}

/// Reads the indicator CSV and coerces every cell to a number once, here.
pub fn parse_indicators<R: Read>(reader: R, year_column: &str) -> Result<IndicatorTable> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();

    let year_idx = headers
        .iter()
        .position(|h| h.trim() == year_column)
        .ok_or_else(|| AtlasError::MissingYearColumn(year_column.to_string()))?;

    let columns: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != year_idx)
        .map(|(i, h)| (i, h.trim().to_string()))
        .collect();

    let mut records = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let year = record.get(year_idx).unwrap_or("").trim().to_string();
        if year.is_empty() {
            continue;
        }

        let cells = columns
            .iter()
            .map(|(i, _)| record.get(*i).map(Cell::parse).unwrap_or_else(Cell::missing))
            .collect();

        records.push(YearRecord {
            year_value: year.parse().ok(),
            year,
            cells,
        });
    }

    Ok(IndicatorTable {
        year_column: year_column.to_string(),
        regions: columns.into_iter().map(|(_, name)| name).collect(),
        records,
    })
}
