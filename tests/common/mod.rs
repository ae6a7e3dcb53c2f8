use gdp_atlas::AtlasConfig;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub const INDICATORS: &str = "\
Year,Algeria,Chad,Niger
2000,1000,150.5,
2001,1200,160,90
2002,NaN,170,95
";

pub const BOUNDARIES: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type": "Feature", "properties": {"name": "Algeria"},
     "geometry": {"type": "Polygon", "coordinates": [[[-8,19],[12,19],[12,37],[-8,37],[-8,19]]]}},
    {"type": "Feature", "properties": {"name": "Chad"},
     "geometry": {"type": "Polygon", "coordinates": [[[14,8],[24,8],[24,23],[14,23],[14,8]]]}},
    {"type": "Feature", "properties": {"name": "Niger"},
     "geometry": {"type": "MultiPolygon", "coordinates": [[[[0,12],[14,12],[14,18],[0,18],[0,12]]]]}},
    {"type": "Feature", "properties": {"name": "Cote d'Ivoire"},
     "geometry": {"type": "Polygon", "coordinates": [[[-8,4],[-3,4],[-3,10],[-8,10],[-8,4]]]}}
  ]
}"#;

pub struct Fixture {
    _tmp: TempDir,
    pub config: AtlasConfig,
}

impl Fixture {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let boundaries = write(tmp.path(), "africa.geojson", BOUNDARIES);
        let indicators = write(tmp.path(), "africa_gdp_per_capita.csv", INDICATORS);

        let mut config = AtlasConfig::with_inputs(boundaries, indicators);
        config.map.default_scheme = "interpolateViridis".to_string();
        config.output.dir = tmp.path().join("output");

        Self { _tmp: tmp, config }
    }
}

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("write fixture");
    path
}
