use crate::types::BoundaryCollection;
use geo::algorithm::centroid::Centroid;
use geo::{Coord, LineString, MultiPolygon};
use std::f64::consts::PI;
use std::fmt::Write;

const MAX_LATITUDE: f64 = 85.0;
const FIT_PADDING: f64 = 0.95;

/// Spherical Mercator centered on a lon/lat point and translated to a pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mercator {
    pub scale: f64,
    pub center: (f64, f64),
    pub translate: (f64, f64),
}

fn mercator_y(lat: f64) -> f64 {
    let phi = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    (PI / 4.0 + phi / 2.0).tan().ln()
}

impl Mercator {
    pub fn new(scale: f64, center: (f64, f64), translate: (f64, f64)) -> Self {
        Self {
            scale,
            center,
            translate,
        }
    }

    /// Centers on the collection's centroid and places it at
    /// `(width / 2, height / center_divisor)`. Without an explicit scale the
    /// projection is scaled so every feature lands inside the surface.
    pub fn fit(
        boundaries: &BoundaryCollection,
        width: f64,
        height: f64,
        center_divisor: f64,
        scale: Option<f64>,
    ) -> Self {
        let merged = boundaries.merged_geometry();
        let center = merged
            .centroid()
            .map(|p| (p.x(), p.y()))
            .unwrap_or((0.0, 0.0));
        let translate = (width / 2.0, height / center_divisor);

        let scale = scale.unwrap_or_else(|| fit_scale(&merged, center, translate, width, height));
        Self::new(scale, center, translate)
    }

    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        let x = (lon - self.center.0).to_radians() * self.scale + self.translate.0;
        let y = -(mercator_y(lat) - mercator_y(self.center.1)) * self.scale + self.translate.1;
        (x, y)
    }

    pub fn invert(&self, x: f64, y: f64) -> (f64, f64) {
        let lon = ((x - self.translate.0) / self.scale).to_degrees() + self.center.0;
        let merc = mercator_y(self.center.1) - (y - self.translate.1) / self.scale;
        let lat = (2.0 * merc.exp().atan() - PI / 2.0).to_degrees();
        (lon, lat)
    }

    /// SVG path data for a (multi)polygon, one closed subpath per ring.
    pub fn path(&self, geometry: &MultiPolygon<f64>) -> String {
        let mut d = String::new();
        for polygon in geometry {
            self.ring(&mut d, polygon.exterior());
            for interior in polygon.interiors() {
                self.ring(&mut d, interior);
            }
        }
        d
    }

    fn ring(&self, d: &mut String, ring: &LineString<f64>) {
        let mut coords = ring.coords();
        let Some(first) = coords.next() else {
            return;
        };
        let (x, y) = self.project(first.x, first.y);
        let _ = write!(d, "M{:.2},{:.2}", x, y);
        for Coord { x: lon, y: lat } in coords {
            let (x, y) = self.project(*lon, *lat);
            let _ = write!(d, "L{:.2},{:.2}", x, y);
        }
        d.push('Z');
    }
}

/// Largest scale keeping every vertex inside the surface around `translate`.
fn fit_scale(
    geometry: &MultiPolygon<f64>,
    center: (f64, f64),
    translate: (f64, f64),
    width: f64,
    height: f64,
) -> f64 {
    let unit = Mercator::new(1.0, center, (0.0, 0.0));
    let (mut left, mut right, mut up, mut down) = (0.0f64, 0.0f64, 0.0f64, 0.0f64);
    for polygon in geometry {
        for coord in polygon.exterior().coords() {
            let (x, y) = unit.project(coord.x, coord.y);
            left = left.max(-x);
            right = right.max(x);
            up = up.max(-y);
            down = down.max(y);
        }
    }

    let candidates = [
        (translate.0, left),
        (width - translate.0, right),
        (translate.1, up),
        (height - translate.1, down),
    ];
    let scale = candidates
        .iter()
        .filter(|(room, reach)| *reach > 0.0 && *room > 0.0)
        .map(|(room, reach)| room / reach)
        .fold(f64::INFINITY, f64::min);

    if scale.is_finite() {
        scale * FIT_PADDING
    } else {
        1.0
    }
}
