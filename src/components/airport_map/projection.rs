//! Spherical Mercator fitted to a screen extent.

use std::f64::consts::{FRAC_PI_4, PI};

use super::error::TopologyError;
use super::topology::{Borders, Feature, Position, Topology};

/// Poles project to infinity; clamp to the square Web Mercator world.
pub const MAX_LATITUDE: f64 = 85.05112878;

const FIT_SCALE: f64 = 150.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mercator {
	scale: f64,
	translate: (f64, f64),
}

impl Mercator {
	pub fn new(scale: f64, translate: (f64, f64)) -> Self {
		Self { scale, translate }
	}

	/// Scales and centres the projection so that every feature fits inside
	/// `[min, max]`.
	pub fn fit_extent(extent: [(f64, f64); 2], features: &[Feature]) -> Self {
		let [(x0, y0), (x1, y1)] = extent;
		let (w, h) = (x1 - x0, y1 - y0);
		let probe = Self::new(FIT_SCALE, (0.0, 0.0));

		let bounds = features
			.iter()
			.flat_map(|f| f.geometry.rings())
			.flatten()
			.map(|&p| probe.project(p))
			.fold(None, |acc: Option<[f64; 4]>, (x, y)| match acc {
				Some([bx0, by0, bx1, by1]) => Some([bx0.min(x), by0.min(y), bx1.max(x), by1.max(y)]),
				None => Some([x, y, x, y]),
			});

		let Some([bx0, by0, bx1, by1]) = bounds.filter(|[bx0, by0, bx1, by1]| bx1 > bx0 && by1 > by0)
		else {
			return Self::new(w / (2.0 * PI), (x0 + w / 2.0, y0 + h / 2.0));
		};
		let k = (w / (bx1 - bx0)).min(h / (by1 - by0));
		let tx = x0 + (w - k * (bx1 + bx0)) / 2.0;
		let ty = y0 + (h - k * (by1 + by0)) / 2.0;
		Self::new(FIT_SCALE * k, (tx, ty))
	}

	pub fn translate(&self) -> (f64, f64) {
		self.translate
	}

	/// (longitude, latitude) in degrees to screen coordinates, y down.
	pub fn project(&self, (lon, lat): Position) -> (f64, f64) {
		let lambda = lon.to_radians();
		let phi = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
		let y = (FRAC_PI_4 + phi / 2.0).tan().ln();
		(
			self.translate.0 + lambda * self.scale,
			self.translate.1 - y * self.scale,
		)
	}

	pub fn project_line(&self, line: &[Position]) -> Vec<(f64, f64)> {
		line.iter().map(|&p| self.project(p)).collect()
	}

	/// Every ring of the feature in screen space, ready for path drawing.
	pub fn project_feature(&self, feature: &Feature) -> Vec<Vec<(f64, f64)>> {
		feature
			.geometry
			.rings()
			.map(|ring| self.project_line(ring))
			.collect()
	}
}

/// Decoded boundary data plus the projection fitted to it.
#[derive(Clone, Debug)]
pub struct MapGeometry {
	pub projection: Mercator,
	pub countries: Vec<Feature>,
	pub borders: Vec<Vec<Position>>,
}

impl MapGeometry {
	pub fn build(
		topology: &Topology,
		object: &str,
		extent: [(f64, f64); 2],
	) -> Result<Self, TopologyError> {
		let countries = topology.features(object)?;
		let borders = topology.mesh(object, Borders::All)?;
		let projection = Mercator::fit_extent(extent, &countries);
		Ok(Self {
			projection,
			countries,
			borders,
		})
	}
}

#[cfg(test)]
mod tests {
	use serde_json::Value;

	use super::*;
	use crate::components::airport_map::topology::Geometry;

	fn square(lon0: f64, lat0: f64, lon1: f64, lat1: f64) -> Feature {
		Feature {
			id: None,
			properties: Value::Null,
			geometry: Geometry::Polygon(vec![vec![
				(lon0, lat0),
				(lon1, lat0),
				(lon1, lat1),
				(lon0, lat1),
				(lon0, lat0),
			]]),
		}
	}

	#[test]
	fn origin_projects_to_translate() {
		let m = Mercator::new(100.0, (200.0, 200.0));
		let (x, y) = m.project((0.0, 0.0));
		assert!((x - 200.0).abs() < 1e-9);
		assert!((y - 200.0).abs() < 1e-9);
		// north is up
		assert!(m.project((0.0, 45.0)).1 < 200.0);
		assert!(m.project((90.0, 0.0)).0 > 200.0);
	}

	#[test]
	fn poles_stay_finite() {
		let m = Mercator::new(100.0, (0.0, 0.0));
		let (_, y) = m.project((0.0, -90.0));
		assert!(y.is_finite());
		assert_eq!(y, m.project((0.0, -MAX_LATITUDE)).1);
	}

	#[test]
	fn fit_extent_keeps_features_inside() {
		let features = vec![square(-120.0, -50.0, 150.0, 70.0), square(10.0, 10.0, 20.0, 20.0)];
		let m = Mercator::fit_extent([(0.0, 0.0), (400.0, 400.0)], &features);
		let points: Vec<_> = features
			.iter()
			.flat_map(|f| m.project_feature(f))
			.flatten()
			.collect();
		for &(x, y) in &points {
			assert!((-1e-6..=400.0 + 1e-6).contains(&x));
			assert!((-1e-6..=400.0 + 1e-6).contains(&y));
		}
		// wider than tall, so the width is filled exactly
		let min_x = points.iter().map(|p| p.0).fold(f64::MAX, f64::min);
		let max_x = points.iter().map(|p| p.0).fold(f64::MIN, f64::max);
		assert!((min_x - 0.0).abs() < 1e-6);
		assert!((max_x - 400.0).abs() < 1e-6);
	}

	#[test]
	fn fit_extent_without_features_centres_the_world() {
		let m = Mercator::fit_extent([(0.0, 0.0), (400.0, 400.0)], &[]);
		assert_eq!(m.translate(), (200.0, 200.0));
	}
}
