//! Numeric scales shared by the map legend and the line chart.

use serde::Serialize;

/// The `[min, max]` pair of a set of values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Extent {
    pub min: f64,
    pub max: f64,
}

impl Extent {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Extent of the finite values, or `None` when there are none.
    pub fn from_values<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some(Extent::new(v, v)),
                Some(e) => Some(Extent::new(e.min.min(v), e.max.max(v))),
            })
    }

    pub fn is_degenerate(&self) -> bool {
        self.min == self.max
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Continuous linear mapping from a domain to a range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// A degenerate domain maps everything to the middle of the range.
    pub fn apply(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let t = if d1 == d0 { 0.5 } else { (value - d0) / (d1 - d0) };
        r0 + t * (r1 - r0)
    }

    pub fn invert(&self, pixel: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let t = if r1 == r0 { 0.5 } else { (pixel - r0) / (r1 - r0) };
        d0 + t * (d1 - d0)
    }

    pub fn ticks(&self, count: usize) -> Vec<f64> {
        ticks(self.domain.0, self.domain.1, count)
    }
}

/// Evenly spaced "nice" values (multiples of 1, 2 or 5 times a power of ten)
/// covering `[start, stop]`, roughly `count` of them.
pub fn ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if count == 0 || !start.is_finite() || !stop.is_finite() {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }
    let (lo, hi, reverse) = if stop < start {
        (stop, start, true)
    } else {
        (start, stop, false)
    };

    let raw_step = (hi - lo) / count as f64;
    let power = raw_step.log10().floor();
    let error = raw_step / 10f64.powf(power);
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };

    let mut out: Vec<f64> = if power >= 0.0 {
        let step = factor * 10f64.powf(power);
        let i0 = (lo / step).ceil() as i64;
        let i1 = (hi / step).floor() as i64;
        (i0..=i1).map(|i| i as f64 * step).collect()
    } else {
        // Divide by the inverse step to keep values like 0.3 exact.
        let inc = 10f64.powf(-power) / factor;
        let i0 = (lo * inc).ceil() as i64;
        let i1 = (hi * inc).floor() as i64;
        (i0..=i1).map(|i| i as f64 / inc).collect()
    };

    if reverse {
        out.reverse();
    }
    out
}

/// Index of the first element at or after `lo` that is `>= x`.
pub fn bisect_left(sorted: &[f64], x: f64, lo: usize) -> usize {
    let lo = lo.min(sorted.len());
    lo + sorted[lo..].partition_point(|v| *v < x)
}

/// Tick label text, dropping a trailing `.0` the way integer ticks print.
pub fn format_tick(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        let s = format!("{:.6}", value);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extent_ignores_non_finite_values() {
        let extent = Extent::from_values([3.0, f64::NAN, -1.0, 7.5]).unwrap();
        assert_eq!(extent, Extent::new(-1.0, 7.5));
        assert!(Extent::from_values([f64::NAN]).is_none());
        assert!(Extent::from_values(Vec::<f64>::new()).is_none());
    }

    #[test]
    fn linear_scale_round_trips_and_handles_flat_domain() {
        let scale = LinearScale::new((1990.0, 2010.0), (0.0, 200.0));
        assert_eq!(scale.apply(2000.0), 100.0);
        assert!((scale.invert(136.0) - 2003.6).abs() < 1e-9);

        let flat = LinearScale::new((5.0, 5.0), (0.0, 10.0));
        assert_eq!(flat.apply(5.0), 5.0);
        assert_eq!(flat.apply(123.0), 5.0);
    }

    #[test]
    fn ticks_pick_nice_steps() {
        assert_eq!(ticks(0.0, 10.0, 5), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        assert_eq!(ticks(1960.0, 2011.0, 10).first(), Some(&1960.0));
        assert_eq!(ticks(1960.0, 2011.0, 10).last(), Some(&2010.0));
        assert_eq!(ticks(0.0, 1.0, 10)[3], 0.3);
        assert_eq!(ticks(10.0, 0.0, 5).first(), Some(&10.0));
        assert_eq!(ticks(4.0, 4.0, 5), vec![4.0]);
        assert!(ticks(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn bisect_left_respects_lower_bound() {
        let years: Vec<f64> = (1990..=2010).map(f64::from).collect();
        assert_eq!(years[bisect_left(&years, 2003.6, 1)], 2004.0);
        assert_eq!(bisect_left(&years, 2004.0, 1), 14);
        assert_eq!(bisect_left(&years, 1980.0, 1), 1);
        assert_eq!(bisect_left(&years, 2050.0, 1), years.len());
    }

    #[test]
    fn tick_labels_drop_trailing_zeros() {
        assert_eq!(format_tick(2004.0), "2004");
        assert_eq!(format_tick(0.25), "0.25");
        assert_eq!(format_tick(-3.0), "-3");
    }
}
