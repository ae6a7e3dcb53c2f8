//! Small in-memory datasets shared by unit tests.

use crate::data::{parse_geojson_boundaries, parse_indicators};
use crate::types::Dataset;

fn square(name: &str, x0: f64, y0: f64, size: f64) -> String {
    let (x1, y1) = (x0 + size, y0 + size);
    format!(
        r#"{{"type": "Feature", "properties": {{"name": "{name}"}},
            "geometry": {{"type": "Polygon", "coordinates":
            [[[{x0},{y0}],[{x1},{y0}],[{x1},{y1}],[{x0},{y1}],[{x0},{y0}]]]}}}}"#
    )
}

fn build(features: &[String], csv: &str) -> Dataset {
    let geojson = format!(
        r#"{{"type": "FeatureCollection", "features": [{}]}}"#,
        features.join(",")
    );
    Dataset {
        boundaries: parse_geojson_boundaries(geojson.as_bytes(), "name").unwrap(),
        indicators: parse_indicators(csv.as_bytes(), "Year").unwrap(),
    }
}

/// One region, "Algeria", valued 1000, 1200 and NaN over 2000..=2002.
pub fn dataset() -> Dataset {
    build(
        &[square("Algeria", -8.0, 19.0, 20.0)],
        "Year,Algeria\n2000,1000\n2001,1200\n2002,NaN\n",
    )
}

/// Two adjacent squares with data, one boundary without a column ("Atlantis")
/// and one column without a boundary ("Ghost").
pub fn square_dataset() -> Dataset {
    build(
        &[
            square("West", -10.0, -10.0, 10.0),
            square("East", 0.0, 0.0, 10.0),
            square("Atlantis", 30.0, 30.0, 5.0),
        ],
        "Year,West,East,Ghost\n2000,500,1500,7\n2001,600,,9\n2002,650,1700,\n",
    )
}

/// "Chad" valued at twice the year for every year 1990..=2010.
pub fn decades_dataset() -> Dataset {
    let mut csv = String::from("Year,Chad\n");
    for year in 1990..=2010 {
        csv.push_str(&format!("{},{}\n", year, year * 2));
    }
    build(&[square("Chad", 14.0, 8.0, 10.0)], &csv)
}
