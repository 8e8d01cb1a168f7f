use log::{debug, info};

use super::projection::Mercator;
use super::scene::{Frame, Scene};
use super::simulation::Simulation;
use super::transition::Transition;
use super::types::{AirportNode, LayoutMode};

/// Owns the layout mode and the in-flight transition between layouts.
#[derive(Clone, Debug)]
pub struct LayoutController {
	mode: LayoutMode,
	transition: Option<Transition<Frame>>,
	map_duration_ms: f64,
	force_duration_ms: f64,
}

/// Borrowed inputs for computing a layout's target frame.
pub struct LayoutSources<'a> {
	pub simulation: &'a mut Simulation,
	pub nodes: &'a [AirportNode],
	pub links: &'a [(usize, usize)],
	pub projection: &'a Mercator,
}

impl LayoutController {
	pub fn new(map_duration_ms: f64, force_duration_ms: f64) -> Self {
		Self {
			mode: LayoutMode::Force,
			transition: None,
			map_duration_ms,
			force_duration_ms,
		}
	}

	pub fn mode(&self) -> LayoutMode {
		self.mode
	}

	#[cfg(test)]
	pub fn is_transitioning(&self) -> bool {
		self.transition.is_some()
	}

	/// Drag gestures only apply to the force layout.
	pub fn accepts_drag(&self) -> bool {
		self.mode == LayoutMode::Force
	}

	/// Whether simulation ticks should be copied onto the scene.
	pub fn binds_ticks(&self) -> bool {
		self.mode == LayoutMode::Force && self.transition.is_none()
	}

	/// Starts a transition toward `target`, beginning from whatever the scene
	/// currently shows. Returns `false` when already in that mode.
	pub fn switch(&mut self, target: LayoutMode, scene: &Scene, sources: LayoutSources<'_>) -> bool {
		if target == self.mode {
			return false;
		}
		let LayoutSources {
			simulation,
			nodes,
			links,
			projection,
		} = sources;

		let (to, duration) = match target {
			LayoutMode::Map => {
				simulation.stop();
				(
					Frame::projected(nodes, links, projection),
					self.map_duration_ms,
				)
			}
			LayoutMode::Force => {
				let frame = Frame::simulated(simulation, links);
				simulation.restart();
				(frame, self.force_duration_ms)
			}
		};
		info!("switching layout {} -> {}", self.mode, target);
		if self.transition.is_some() {
			debug!("retargeting in-flight transition");
		}
		self.transition = Some(Transition::new(scene.frame(), to, duration));
		self.mode = target;
		true
	}

	/// Advances the running transition and writes it to the scene. Returns
	/// `true` on the frame the transition completes.
	pub fn advance(&mut self, dt_ms: f64, scene: &mut Scene) -> bool {
		let Some(transition) = self.transition.as_mut() else {
			return false;
		};
		scene.apply(&transition.advance(dt_ms));
		if transition.is_finished() {
			self.transition = None;
			return true;
		}
		false
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::airport_map::projection::MapGeometry;

	fn nodes() -> Vec<AirportNode> {
		[(0.0, 0.0), (20.0, 10.0)]
			.into_iter()
			.enumerate()
			.map(|(i, (longitude, latitude))| AirportNode {
				name: format!("N{i}"),
				passengers: 1.0,
				longitude,
				latitude,
			})
			.collect()
	}

	fn fixture() -> (LayoutController, Simulation, Scene, Vec<AirportNode>, Mercator) {
		let sim = Simulation::new(2);
		let geometry = MapGeometry {
			projection: Mercator::new(100.0, (200.0, 200.0)),
			countries: Vec::new(),
			borders: Vec::new(),
		};
		let scene = Scene::bind(&sim, &[5.0, 5.0], &[(0, 1)], &geometry);
		(
			LayoutController::new(1000.0, 600.0),
			sim,
			scene,
			nodes(),
			geometry.projection,
		)
	}

	#[test]
	fn switching_to_current_mode_is_a_no_op() {
		let (mut ctl, mut sim, scene, nodes, projection) = fixture();
		let sources = LayoutSources {
			simulation: &mut sim,
			nodes: &nodes,
			links: &[(0, 1)],
			projection: &projection,
		};
		assert!(!ctl.switch(LayoutMode::Force, &scene, sources));
		assert!(!ctl.is_transitioning());
		assert!(ctl.binds_ticks());
	}

	#[test]
	fn map_mode_stops_simulation_and_blocks_ticks() {
		let (mut ctl, mut sim, scene, nodes, projection) = fixture();
		let sources = LayoutSources {
			simulation: &mut sim,
			nodes: &nodes,
			links: &[(0, 1)],
			projection: &projection,
		};
		assert!(ctl.switch(LayoutMode::Map, &scene, sources));
		assert!(!sim.is_running());
		assert!(!ctl.binds_ticks());
		assert!(!ctl.accepts_drag());
	}

	#[test]
	fn retargeting_starts_from_displayed_values() {
		let (mut ctl, mut sim, mut scene, nodes, projection) = fixture();
		let start = scene.frame();
		let links = [(0, 1)];
		ctl.switch(
			LayoutMode::Map,
			&scene,
			LayoutSources {
				simulation: &mut sim,
				nodes: &nodes,
				links: &links,
				projection: &projection,
			},
		);
		ctl.advance(500.0, &mut scene);
		let halfway = scene.frame();
		assert_ne!(halfway, start);

		ctl.switch(
			LayoutMode::Force,
			&scene,
			LayoutSources {
				simulation: &mut sim,
				nodes: &nodes,
				links: &links,
				projection: &projection,
			},
		);
		// no jump on retarget
		ctl.advance(0.0, &mut scene);
		assert_eq!(scene.frame(), halfway);

		assert!(ctl.advance(600.0, &mut scene));
		assert_eq!(scene.frame(), start);
		assert!(ctl.binds_ticks());
	}
}
