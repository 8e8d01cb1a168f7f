//! Timed, eased interpolation between two snapshots of animated values.

/// Values that can be blended; `t = 0` yields `self`, `t = 1` yields `to`.
pub trait Interpolate: Clone {
	fn interpolate(&self, to: &Self, t: f64) -> Self;
}

impl Interpolate for f64 {
	fn interpolate(&self, to: &Self, t: f64) -> Self {
		self + (to - self) * t
	}
}

impl<A: Interpolate, B: Interpolate> Interpolate for (A, B) {
	fn interpolate(&self, to: &Self, t: f64) -> Self {
		(self.0.interpolate(&to.0, t), self.1.interpolate(&to.1, t))
	}
}

impl<T: Interpolate> Interpolate for Vec<T> {
	/// Blends element-wise; extra elements on either side are dropped.
	fn interpolate(&self, to: &Self, t: f64) -> Self {
		self.iter()
			.zip(to.iter())
			.map(|(a, b)| a.interpolate(b, t))
			.collect()
	}
}

pub fn ease_cubic_in_out(t: f64) -> f64 {
	let t = t.clamp(0.0, 1.0) * 2.0;
	if t <= 1.0 {
		t * t * t / 2.0
	} else {
		let t = t - 2.0;
		(t * t * t + 2.0) / 2.0
	}
}

#[derive(Clone, Debug)]
pub struct Transition<T> {
	from: T,
	to: T,
	elapsed: f64,
	duration: f64,
}

impl<T: Interpolate> Transition<T> {
	pub fn new(from: T, to: T, duration_ms: f64) -> Self {
		Self {
			from,
			to,
			elapsed: 0.0,
			duration: duration_ms.max(0.0),
		}
	}

	pub fn progress(&self) -> f64 {
		if self.duration == 0.0 {
			1.0
		} else {
			(self.elapsed / self.duration).min(1.0)
		}
	}

	pub fn is_finished(&self) -> bool {
		self.progress() >= 1.0
	}

	/// Moves the clock forward and returns the value to display.
	pub fn advance(&mut self, dt_ms: f64) -> T {
		self.elapsed += dt_ms.max(0.0);
		self.current()
	}

	pub fn current(&self) -> T {
		if self.is_finished() {
			return self.to.clone();
		}
		self.from
			.interpolate(&self.to, ease_cubic_in_out(self.progress()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn easing_hits_endpoints_and_midpoint() {
		assert_eq!(ease_cubic_in_out(0.0), 0.0);
		assert_eq!(ease_cubic_in_out(0.5), 0.5);
		assert_eq!(ease_cubic_in_out(1.0), 1.0);
		assert!(ease_cubic_in_out(0.25) < 0.25);
		assert!(ease_cubic_in_out(0.75) > 0.75);
	}

	#[test]
	fn transition_reaches_target_after_duration() {
		let mut tr = Transition::new((0.0, 0.0), (10.0, -10.0), 600.0);
		let mid = tr.advance(300.0);
		assert!((mid.0 - 5.0).abs() < 1e-9);
		assert!(!tr.is_finished());
		assert_eq!(tr.advance(400.0), (10.0, -10.0));
		assert!(tr.is_finished());
	}

	#[test]
	fn zero_duration_jumps_to_target() {
		let tr = Transition::new(1.0, 2.0, 0.0);
		assert_eq!(tr.current(), 2.0);
	}

	#[test]
	fn vectors_blend_elementwise() {
		let a = vec![0.0, 10.0];
		let b = vec![10.0, 20.0];
		assert_eq!(a.interpolate(&b, 0.5), vec![5.0, 15.0]);
	}
}
