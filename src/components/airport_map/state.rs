use log::{debug, info};

use super::config::VisConfig;
use super::error::LoadError;
use super::layout::{LayoutController, LayoutSources};
use super::loader::Documents;
use super::projection::MapGeometry;
use super::scale::LinearScale;
use super::scene::Scene;
use super::simulation::{
	Axis, CenterForce, CollideForce, LinkForce, ManyBodyForce, PositionForce, Simulation,
};
use super::types::{AirportData, AirportNode, LayoutMode};

/// Maps the fixed logical extent into the canvas, letterboxed and centred.
#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl ViewTransform {
	pub fn fit(width: f64, height: f64, logical_width: f64, logical_height: f64) -> Self {
		let k = (width / logical_width).min(height / logical_height);
		Self {
			x: (width - logical_width * k) / 2.0,
			y: (height - logical_height * k) / 2.0,
			k,
		}
	}
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	/// Gestures currently in progress.
	pub active: usize,
	pub node_idx: Option<usize>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f64,
	pub node_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<usize>,
	/// Last pointer position over the canvas, in screen pixels.
	pub pointer: Option<(f64, f64)>,
}

/// Tooltip content and its position in canvas CSS pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct Tooltip {
	pub text: String,
	pub left: f64,
	pub top: f64,
}

pub struct AirportMapState {
	pub nodes: Vec<AirportNode>,
	pub links: Vec<(usize, usize)>,
	pub simulation: Simulation,
	pub scene: Scene,
	pub geometry: MapGeometry,
	pub layout: LayoutController,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub hover: HoverState,
	pub width: f64,
	pub height: f64,
	config: VisConfig,
}

impl AirportMapState {
	/// Build stage: decodes the boundaries and fits the projection, then binds.
	pub fn from_documents(
		docs: Documents,
		config: &VisConfig,
		width: f64,
		height: f64,
	) -> Result<Self, LoadError> {
		let extent = [(0.0, 0.0), (config.width, config.height)];
		let geometry = MapGeometry::build(&docs.world, &config.countries_object, extent)?;
		Self::bind(docs.airports, geometry, config, width, height)
	}

	/// Bind stage: creates the simulation and every visual primitive.
	pub fn bind(
		data: AirportData,
		geometry: MapGeometry,
		config: &VisConfig,
		width: f64,
		height: f64,
	) -> Result<Self, LoadError> {
		let links = data.resolve_links()?;
		let n = data.nodes.len();
		let size = LinearScale::from_extent(data.nodes.iter().map(|d| d.passengers), config.radius_range)
			.clamped(true);
		let radii: Vec<f64> = data.nodes.iter().map(|d| size.scale(d.passengers)).collect();
		let (cx, cy) = config.center();

		let simulation = Simulation::new(n)
			.with_force(LinkForce::new(&links, n, config.link_distance))
			.with_force(ManyBodyForce::new(config.charge_strength))
			.with_force(CenterForce::new(cx, cy))
			.with_force(PositionForce::new(Axis::X, cx, config.position_strength))
			.with_force(PositionForce::new(Axis::Y, cy, config.position_strength))
			.with_force(CollideForce::new(
				radii.iter().map(|r| r + config.collide_padding).collect(),
			));
		let scene = Scene::bind(&simulation, &radii, &links, &geometry);
		info!(
			"bound {} airports, {} routes, {} countries",
			n,
			links.len(),
			scene.countries.len()
		);

		Ok(Self {
			nodes: data.nodes,
			links,
			simulation,
			scene,
			geometry,
			layout: LayoutController::new(config.map_duration_ms, config.force_duration_ms),
			transform: ViewTransform::fit(width, height, config.width, config.height),
			drag: DragState::default(),
			hover: HoverState::default(),
			width,
			height,
			config: config.clone(),
		})
	}

	pub fn mode(&self) -> LayoutMode {
		self.layout.mode()
	}

	pub fn switch_layout(&mut self, mode: LayoutMode) -> bool {
		self.layout.switch(
			mode,
			&self.scene,
			LayoutSources {
				simulation: &mut self.simulation,
				nodes: &self.nodes,
				links: &self.links,
				projection: &self.geometry.projection,
			},
		)
	}

	/// One animation frame: a simulation step, then the layout transition.
	pub fn tick(&mut self, dt_ms: f64) {
		let was_running = self.simulation.is_running();
		if self.simulation.step() && self.layout.binds_ticks() {
			self.scene.sync(&self.simulation, &self.links);
		}
		if was_running && !self.simulation.is_running() {
			debug!("simulation at rest (alpha {:.4})", self.simulation.alpha());
		}
		if self.layout.advance(dt_ms, &mut self.scene) {
			// Returning to the force layout hands control back to the simulation.
			if self.layout.binds_ticks() {
				self.scene.sync(&self.simulation, &self.links);
			}
			// circles moved out from under a resting pointer
			self.hover.node = self
				.hover
				.pointer
				.and_then(|(x, y)| self.node_at_position(x, y));
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.transform = ViewTransform::fit(width, height, self.config.width, self.config.height);
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn graph_to_screen(&self, gx: f64, gy: f64) -> (f64, f64) {
		(
			gx * self.transform.k + self.transform.x,
			gy * self.transform.k + self.transform.y,
		)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		self.scene.circle_at(self.screen_to_graph(sx, sy))
	}

	/// Pins the node under the pointer. Filtered out unless the force layout
	/// is active.
	pub fn drag_start(&mut self, sx: f64, sy: f64) -> bool {
		if !self.layout.accepts_drag() {
			return false;
		}
		let Some(idx) = self.node_at_position(sx, sy) else {
			return false;
		};
		if self.drag.active == 0 {
			self.simulation.set_alpha_target(self.config.drag_alpha_target);
			self.simulation.restart();
		}
		let (nx, ny) = self.simulation.position(idx);
		self.drag = DragState {
			active: self.drag.active + 1,
			node_idx: Some(idx),
			start_x: sx,
			start_y: sy,
			node_start_x: nx,
			node_start_y: ny,
		};
		self.simulation.pin(idx, nx, ny);
		debug!("drag start on {}", self.nodes[idx].name);
		true
	}

	pub fn drag_move(&mut self, sx: f64, sy: f64) {
		let Some(idx) = self.drag.node_idx else {
			return;
		};
		let (dx, dy) = (
			(sx - self.drag.start_x) / self.transform.k,
			(sy - self.drag.start_y) / self.transform.k,
		);
		self.simulation
			.pin(idx, self.drag.node_start_x + dx, self.drag.node_start_y + dy);
	}

	pub fn drag_end(&mut self) {
		let Some(idx) = self.drag.node_idx.take() else {
			return;
		};
		self.drag.active = self.drag.active.saturating_sub(1);
		if self.drag.active == 0 {
			self.simulation.set_alpha_target(0.0);
		}
		self.simulation.unpin(idx);
		debug!("drag end on {}", self.nodes[idx].name);
	}

	pub fn is_dragging(&self) -> bool {
		self.drag.node_idx.is_some()
	}

	pub fn set_hover(&mut self, node: Option<usize>) {
		self.hover.node = node;
	}

	/// Records the pointer and hit-tests it. Returns whether the hovered
	/// node changed.
	pub fn pointer_moved(&mut self, sx: f64, sy: f64) -> bool {
		self.hover.pointer = Some((sx, sy));
		let hovered = self.node_at_position(sx, sy);
		if hovered == self.hover.node {
			return false;
		}
		self.set_hover(hovered);
		true
	}

	pub fn pointer_left(&mut self) {
		self.hover = HoverState::default();
	}

	pub fn hovered_name(&self) -> Option<&str> {
		self.hover.node.map(|i| self.nodes[i].name.as_str())
	}

	/// Name tag for the hovered airport; only shown outside the force layout.
	pub fn tooltip(&self) -> Option<Tooltip> {
		if self.mode() == LayoutMode::Force {
			return None;
		}
		let idx = self.hover.node?;
		let circle = &self.scene.circles[idx];
		let (x, y) = self.graph_to_screen(circle.cx, circle.cy);
		let (ox, oy) = self.config.tooltip_offset;
		Some(Tooltip {
			text: self.nodes[idx].name.clone(),
			left: x + ox,
			top: y + oy,
		})
	}
}
