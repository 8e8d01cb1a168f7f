//! Alpha-cooled force simulation.
//!
//! One [`Simulation::step`] per animation frame. Every force scales its
//! contribution by the current alpha, which decays geometrically toward
//! `alpha_target`; once alpha drops below `alpha_min` the simulation stops
//! until it is restarted.

use std::f64::consts::PI;

const INITIAL_RADIUS: f64 = 10.0;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimNode {
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	pub fx: Option<f64>,
	pub fy: Option<f64>,
}

/// Deterministic linear congruential generator (2^32 modulus).
#[derive(Clone, Debug)]
pub struct Lcg(u64);

impl Default for Lcg {
	fn default() -> Self {
		Self(1)
	}
}

impl Lcg {
	const A: u64 = 1_664_525;
	const C: u64 = 1_013_904_223;
	const M: u64 = 1 << 32;

	pub fn next_f64(&mut self) -> f64 {
		self.0 = (Self::A * self.0 + Self::C) % Self::M;
		self.0 as f64 / Self::M as f64
	}

	/// Tiny non-zero offset used to separate coincident points.
	pub fn jiggle(&mut self) -> f64 {
		(self.next_f64() - 0.5) * 1e-6
	}
}

pub trait Force {
	fn apply(&mut self, nodes: &mut [SimNode], alpha: f64, random: &mut Lcg);
}

/// Springs along links, pulling endpoints toward a rest distance.
pub struct LinkForce {
	links: Vec<(usize, usize)>,
	distance: f64,
	strengths: Vec<f64>,
	bias: Vec<f64>,
}

impl LinkForce {
	pub fn new(links: &[(usize, usize)], node_count: usize, distance: f64) -> Self {
		let mut degree = vec![0usize; node_count];
		for &(s, t) in links {
			degree[s] += 1;
			degree[t] += 1;
		}
		let strengths = links
			.iter()
			.map(|&(s, t)| 1.0 / degree[s].min(degree[t]) as f64)
			.collect();
		let bias = links
			.iter()
			.map(|&(s, t)| degree[s] as f64 / (degree[s] + degree[t]) as f64)
			.collect();
		Self {
			links: links.to_vec(),
			distance,
			strengths,
			bias,
		}
	}
}

impl Force for LinkForce {
	fn apply(&mut self, nodes: &mut [SimNode], alpha: f64, random: &mut Lcg) {
		for (i, &(s, t)) in self.links.iter().enumerate() {
			let (src, tgt) = (&nodes[s], &nodes[t]);
			let mut x = tgt.x + tgt.vx - src.x - src.vx;
			let mut y = tgt.y + tgt.vy - src.y - src.vy;
			if x == 0.0 {
				x = random.jiggle();
			}
			if y == 0.0 {
				y = random.jiggle();
			}
			let len = (x * x + y * y).sqrt();
			let l = (len - self.distance) / len * alpha * self.strengths[i];
			let (x, y) = (x * l, y * l);
			let b = self.bias[i];
			nodes[t].vx -= x * b;
			nodes[t].vy -= y * b;
			nodes[s].vx += x * (1.0 - b);
			nodes[s].vy += y * (1.0 - b);
		}
	}
}

/// Pairwise charge between all nodes. Negative strength repels, positive
/// attracts.
pub struct ManyBodyForce {
	strength: f64,
	distance_min2: f64,
}

impl ManyBodyForce {
	pub fn new(strength: f64) -> Self {
		Self {
			strength,
			distance_min2: 1.0,
		}
	}
}

impl Force for ManyBodyForce {
	fn apply(&mut self, nodes: &mut [SimNode], alpha: f64, random: &mut Lcg) {
		let n = nodes.len();
		for i in 0..n {
			for j in 0..n {
				if i == j {
					continue;
				}
				let mut x = nodes[j].x - nodes[i].x;
				let mut y = nodes[j].y - nodes[i].y;
				let mut l = x * x + y * y;
				if x == 0.0 {
					x = random.jiggle();
					l += x * x;
				}
				if y == 0.0 {
					y = random.jiggle();
					l += y * y;
				}
				if l < self.distance_min2 {
					l = (self.distance_min2 * l).sqrt();
				}
				let w = self.strength * alpha / l;
				nodes[i].vx += x * w;
				nodes[i].vy += y * w;
			}
		}
	}
}

/// Translates all nodes so their mean sits on `(x, y)`. Ignores alpha.
pub struct CenterForce {
	x: f64,
	y: f64,
	strength: f64,
}

impl CenterForce {
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y, strength: 1.0 }
	}
}

impl Force for CenterForce {
	fn apply(&mut self, nodes: &mut [SimNode], _alpha: f64, _random: &mut Lcg) {
		if nodes.is_empty() {
			return;
		}
		let n = nodes.len() as f64;
		let (sx, sy) = nodes
			.iter()
			.fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
		let dx = (sx / n - self.x) * self.strength;
		let dy = (sy / n - self.y) * self.strength;
		for node in nodes.iter_mut() {
			node.x -= dx;
			node.y -= dy;
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
	X,
	Y,
}

/// Pulls each node's velocity toward a fixed coordinate on one axis.
pub struct PositionForce {
	axis: Axis,
	target: f64,
	strength: f64,
}

impl PositionForce {
	pub fn new(axis: Axis, target: f64, strength: f64) -> Self {
		Self {
			axis,
			target,
			strength,
		}
	}
}

impl Force for PositionForce {
	fn apply(&mut self, nodes: &mut [SimNode], alpha: f64, _random: &mut Lcg) {
		for node in nodes.iter_mut() {
			match self.axis {
				Axis::X => node.vx += (self.target - node.x) * self.strength * alpha,
				Axis::Y => node.vy += (self.target - node.y) * self.strength * alpha,
			}
		}
	}
}

/// Keeps circles of the given radii from overlapping.
pub struct CollideForce {
	radii: Vec<f64>,
	strength: f64,
}

impl CollideForce {
	pub fn new(radii: Vec<f64>) -> Self {
		Self {
			radii,
			strength: 1.0,
		}
	}
}

impl Force for CollideForce {
	fn apply(&mut self, nodes: &mut [SimNode], _alpha: f64, random: &mut Lcg) {
		let n = nodes.len().min(self.radii.len());
		for i in 0..n {
			let ri = self.radii[i];
			let ri2 = ri * ri;
			let xi = nodes[i].x + nodes[i].vx;
			let yi = nodes[i].y + nodes[i].vy;
			for j in (i + 1)..n {
				let rj = self.radii[j];
				let r = ri + rj;
				let mut x = xi - nodes[j].x - nodes[j].vx;
				let mut y = yi - nodes[j].y - nodes[j].vy;
				let mut l = x * x + y * y;
				if l >= r * r {
					continue;
				}
				if x == 0.0 {
					x = random.jiggle();
					l += x * x;
				}
				if y == 0.0 {
					y = random.jiggle();
					l += y * y;
				}
				let len = l.sqrt();
				let k = (r - len) / len * self.strength;
				let (x, y) = (x * k, y * k);
				let share = rj * rj / (ri2 + rj * rj);
				nodes[i].vx += x * share;
				nodes[i].vy += y * share;
				nodes[j].vx -= x * (1.0 - share);
				nodes[j].vy -= y * (1.0 - share);
			}
		}
	}
}

pub struct Simulation {
	nodes: Vec<SimNode>,
	forces: Vec<Box<dyn Force>>,
	alpha: f64,
	alpha_min: f64,
	alpha_decay: f64,
	alpha_target: f64,
	velocity_decay: f64,
	running: bool,
	random: Lcg,
}

impl Simulation {
	/// Creates `count` nodes laid out on a phyllotaxis spiral around the
	/// origin.
	pub fn new(count: usize) -> Self {
		let angle_step = PI * (3.0 - 5f64.sqrt());
		let nodes = (0..count)
			.map(|i| {
				let radius = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
				let angle = i as f64 * angle_step;
				SimNode {
					x: radius * angle.cos(),
					y: radius * angle.sin(),
					..SimNode::default()
				}
			})
			.collect();
		let alpha_min: f64 = 0.001;
		Self {
			nodes,
			forces: Vec::new(),
			alpha: 1.0,
			alpha_min,
			alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
			alpha_target: 0.0,
			velocity_decay: 0.6,
			running: true,
			random: Lcg::default(),
		}
	}

	pub fn with_force(mut self, force: impl Force + 'static) -> Self {
		self.forces.push(Box::new(force));
		self
	}

	pub fn nodes(&self) -> &[SimNode] {
		&self.nodes
	}

	pub fn position(&self, idx: usize) -> (f64, f64) {
		let n = &self.nodes[idx];
		(n.x, n.y)
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn set_alpha(&mut self, alpha: f64) {
		self.alpha = alpha;
	}

	#[cfg(test)]
	pub fn alpha_target(&self) -> f64 {
		self.alpha_target
	}

	pub fn set_alpha_target(&mut self, target: f64) {
		self.alpha_target = target;
	}

	pub fn is_running(&self) -> bool {
		self.running
	}

	pub fn restart(&mut self) {
		self.running = true;
	}

	pub fn stop(&mut self) {
		self.running = false;
	}

	pub fn pin(&mut self, idx: usize, x: f64, y: f64) {
		if let Some(node) = self.nodes.get_mut(idx) {
			node.fx = Some(x);
			node.fy = Some(y);
		}
	}

	pub fn unpin(&mut self, idx: usize) {
		if let Some(node) = self.nodes.get_mut(idx) {
			node.fx = None;
			node.fy = None;
		}
	}

	/// Advances one tick regardless of the running flag.
	pub fn tick(&mut self) {
		self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;
		for force in self.forces.iter_mut() {
			force.apply(&mut self.nodes, self.alpha, &mut self.random);
		}
		for node in self.nodes.iter_mut() {
			match node.fx {
				Some(fx) => {
					node.x = fx;
					node.vx = 0.0;
				}
				None => {
					node.vx *= self.velocity_decay;
					node.x += node.vx;
				}
			}
			match node.fy {
				Some(fy) => {
					node.y = fy;
					node.vy = 0.0;
				}
				None => {
					node.vy *= self.velocity_decay;
					node.y += node.vy;
				}
			}
		}
	}

	/// Scheduled step: ticks once while running and comes to rest when
	/// alpha falls below `alpha_min`. Returns whether a tick happened.
	pub fn step(&mut self) -> bool {
		if !self.running {
			return false;
		}
		self.tick();
		if self.alpha < self.alpha_min {
			self.running = false;
		}
		true
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn distance(a: &SimNode, b: &SimNode) -> f64 {
		((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
	}

	#[test]
	fn initial_layout_is_a_spiral_around_the_origin() {
		let sim = Simulation::new(3);
		let n0 = &sim.nodes()[0];
		assert!((n0.x - INITIAL_RADIUS * 0.5f64.sqrt()).abs() < 1e-9);
		assert_eq!(n0.y, 0.0);
		let r2 = (sim.nodes()[2].x.powi(2) + sim.nodes()[2].y.powi(2)).sqrt();
		assert!((r2 - INITIAL_RADIUS * 2.5f64.sqrt()).abs() < 1e-9);
	}

	#[test]
	fn alpha_decays_to_rest() {
		let mut sim = Simulation::new(4);
		let mut steps = 0;
		while sim.step() {
			steps += 1;
			assert!(steps < 1000);
		}
		// 0.001^(1/300) decay crosses alpha_min right around step 300.
		assert!((299..=301).contains(&steps));
		assert!(!sim.is_running());
		assert!(sim.alpha() < 0.001);
	}

	#[test]
	fn alpha_target_reheats_a_resting_simulation() {
		let mut sim = Simulation::new(2);
		sim.set_alpha(0.0005);
		sim.set_alpha_target(0.3);
		sim.restart();
		for _ in 0..50 {
			sim.step();
		}
		assert!(sim.is_running());
		assert!(sim.alpha() > 0.1);
	}

	#[test]
	fn pinned_node_stays_at_pin() {
		let mut sim = Simulation::new(3)
			.with_force(ManyBodyForce::new(-30.0))
			.with_force(CenterForce::new(0.0, 0.0));
		sim.pin(1, 50.0, -20.0);
		for _ in 0..10 {
			sim.tick();
		}
		assert_eq!(sim.position(1), (50.0, -20.0));
		sim.unpin(1);
		sim.tick();
		assert_eq!(sim.nodes()[1].fx, None);
	}

	#[test]
	fn center_force_moves_mean_to_center() {
		let mut sim = Simulation::new(5).with_force(CenterForce::new(200.0, 200.0));
		sim.tick();
		let n = sim.nodes().len() as f64;
		let mx = sim.nodes().iter().map(|n| n.x).sum::<f64>() / n;
		let my = sim.nodes().iter().map(|n| n.y).sum::<f64>() / n;
		assert!((mx - 200.0).abs() < 1e-6);
		assert!((my - 200.0).abs() < 1e-6);
	}

	#[test]
	fn collide_separates_overlapping_nodes() {
		let mut sim = Simulation::new(2).with_force(CollideForce::new(vec![10.0, 10.0]));
		for _ in 0..200 {
			sim.tick();
		}
		let nodes = sim.nodes();
		assert!(distance(&nodes[0], &nodes[1]) > 19.0);
	}

	#[test]
	fn link_force_pulls_toward_rest_distance() {
		let mut sim = Simulation::new(2).with_force(LinkForce::new(&[(0, 1)], 2, 30.0));
		sim.pin(0, 0.0, 0.0);
		sim.tick();
		sim.unpin(0);
		for _ in 0..300 {
			sim.tick();
		}
		let d = distance(&sim.nodes()[0], &sim.nodes()[1]);
		assert!((d - 30.0).abs() < 1.0, "distance {d}");
	}

	#[test]
	fn lcg_is_deterministic() {
		let (mut a, mut b) = (Lcg::default(), Lcg::default());
		for _ in 0..5 {
			let v = a.next_f64();
			assert_eq!(v, b.next_f64());
			assert!((0.0..1.0).contains(&v));
		}
	}
}
