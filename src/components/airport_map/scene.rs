//! Visual primitives bound one-to-one to airports, routes and countries.
//!
//! The scene is created once by [`Scene::bind`] and afterwards only
//! mutated: simulation ticks copy positions in through [`Scene::sync`],
//! layout transitions write interpolated [`Frame`]s through
//! [`Scene::apply`].

use super::projection::{MapGeometry, Mercator};
use super::simulation::Simulation;
use super::transition::Interpolate;
use super::types::AirportNode;

pub type Point = (f64, f64);

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Circle {
	pub cx: f64,
	pub cy: f64,
	pub r: f64,
}

impl Circle {
	pub fn contains(&self, (x, y): Point) -> bool {
		let (dx, dy) = (x - self.cx, y - self.cy);
		dx * dx + dy * dy <= self.r * self.r
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Line {
	pub x1: f64,
	pub y1: f64,
	pub x2: f64,
	pub y2: f64,
}

/// A filled country outline in screen coordinates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Area {
	pub rings: Vec<Vec<Point>>,
}

/// Snapshot of every animated attribute of the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
	pub circles: Vec<Point>,
	pub lines: Vec<(Point, Point)>,
	pub map_opacity: f64,
}

impl Interpolate for Frame {
	fn interpolate(&self, to: &Self, t: f64) -> Self {
		Frame {
			circles: self.circles.interpolate(&to.circles, t),
			lines: self.lines.interpolate(&to.lines, t),
			map_opacity: self.map_opacity.interpolate(&to.map_opacity, t),
		}
	}
}

impl Frame {
	/// Positions taken from the live simulation, map hidden.
	pub fn simulated(simulation: &Simulation, links: &[(usize, usize)]) -> Self {
		Frame {
			circles: (0..simulation.nodes().len())
				.map(|i| simulation.position(i))
				.collect(),
			lines: links
				.iter()
				.map(|&(s, t)| (simulation.position(s), simulation.position(t)))
				.collect(),
			map_opacity: 0.0,
		}
	}

	/// Positions taken from each airport's geographic coordinates, map shown.
	pub fn projected(nodes: &[AirportNode], links: &[(usize, usize)], projection: &Mercator) -> Self {
		let at = |i: usize| projection.project((nodes[i].longitude, nodes[i].latitude));
		Frame {
			circles: (0..nodes.len()).map(at).collect(),
			lines: links.iter().map(|&(s, t)| (at(s), at(t))).collect(),
			map_opacity: 1.0,
		}
	}
}

#[derive(Clone, Debug, Default)]
pub struct Scene {
	pub circles: Vec<Circle>,
	pub lines: Vec<Line>,
	pub countries: Vec<Area>,
	pub borders: Vec<Vec<Point>>,
	pub map_opacity: f64,
}

impl Scene {
	pub fn bind(
		simulation: &Simulation,
		radii: &[f64],
		links: &[(usize, usize)],
		geometry: &MapGeometry,
	) -> Self {
		let projection = &geometry.projection;
		let mut scene = Scene {
			circles: radii
				.iter()
				.map(|&r| Circle {
					r,
					..Circle::default()
				})
				.collect(),
			lines: vec![Line::default(); links.len()],
			countries: geometry
				.countries
				.iter()
				.map(|f| Area {
					rings: projection.project_feature(f),
				})
				.collect(),
			borders: geometry
				.borders
				.iter()
				.map(|line| projection.project_line(line))
				.collect(),
			map_opacity: 0.0,
		};
		scene.sync(simulation, links);
		scene
	}

	/// Tick handler: copies simulation coordinates onto circles and lines.
	pub fn sync(&mut self, simulation: &Simulation, links: &[(usize, usize)]) {
		for (i, circle) in self.circles.iter_mut().enumerate() {
			(circle.cx, circle.cy) = simulation.position(i);
		}
		for (line, &(s, t)) in self.lines.iter_mut().zip(links) {
			(line.x1, line.y1) = simulation.position(s);
			(line.x2, line.y2) = simulation.position(t);
		}
	}

	pub fn frame(&self) -> Frame {
		Frame {
			circles: self.circles.iter().map(|c| (c.cx, c.cy)).collect(),
			lines: self
				.lines
				.iter()
				.map(|l| ((l.x1, l.y1), (l.x2, l.y2)))
				.collect(),
			map_opacity: self.map_opacity,
		}
	}

	pub fn apply(&mut self, frame: &Frame) {
		for (circle, &(cx, cy)) in self.circles.iter_mut().zip(&frame.circles) {
			circle.cx = cx;
			circle.cy = cy;
		}
		for (line, &((x1, y1), (x2, y2))) in self.lines.iter_mut().zip(&frame.lines) {
			*line = Line { x1, y1, x2, y2 };
		}
		self.map_opacity = frame.map_opacity;
	}

	/// Topmost circle under a point in logical coordinates.
	pub fn circle_at(&self, p: Point) -> Option<usize> {
		self.circles.iter().rposition(|c| c.contains(p))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn scene_with_circles(centres: &[Point]) -> Scene {
		Scene {
			circles: centres
				.iter()
				.map(|&(cx, cy)| Circle { cx, cy, r: 5.0 })
				.collect(),
			..Scene::default()
		}
	}

	#[test]
	fn hit_test_prefers_topmost_circle() {
		let scene = scene_with_circles(&[(10.0, 10.0), (12.0, 10.0), (100.0, 100.0)]);
		assert_eq!(scene.circle_at((11.0, 10.0)), Some(1));
		assert_eq!(scene.circle_at((6.0, 10.0)), Some(0));
		assert_eq!(scene.circle_at((50.0, 50.0)), None);
	}

	#[test]
	fn frame_round_trips_through_apply() {
		let mut scene = scene_with_circles(&[(1.0, 2.0)]);
		scene.lines.push(Line {
			x1: 1.0,
			y1: 2.0,
			x2: 3.0,
			y2: 4.0,
		});
		let mut frame = scene.frame();
		frame.circles[0] = (7.0, 8.0);
		frame.lines[0].1 = (9.0, 9.0);
		frame.map_opacity = 0.5;
		scene.apply(&frame);
		assert_eq!((scene.circles[0].cx, scene.circles[0].cy), (7.0, 8.0));
		assert_eq!(scene.circles[0].r, 5.0);
		assert_eq!((scene.lines[0].x2, scene.lines[0].y2), (9.0, 9.0));
		assert_eq!(scene.map_opacity, 0.5);
	}

	#[test]
	fn projected_frame_places_link_endpoints_on_their_airports() {
		let nodes = vec![
			AirportNode {
				name: "A".into(),
				passengers: 1.0,
				longitude: -10.0,
				latitude: 20.0,
			},
			AirportNode {
				name: "B".into(),
				passengers: 2.0,
				longitude: 30.0,
				latitude: -5.0,
			},
		];
		let projection = Mercator::new(100.0, (200.0, 200.0));
		let frame = Frame::projected(&nodes, &[(0, 1)], &projection);
		assert_eq!(frame.lines[0].0, frame.circles[0]);
		assert_eq!(frame.lines[0].1, frame.circles[1]);
		assert_eq!(frame.map_opacity, 1.0);
	}
}
