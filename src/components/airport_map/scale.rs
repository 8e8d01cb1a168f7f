//! Linear scale from a data domain to a display range.

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearScale {
	domain: (f64, f64),
	range: (f64, f64),
	clamp: bool,
}

impl LinearScale {
	pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
		Self {
			domain,
			range,
			clamp: false,
		}
	}

	/// Builds a scale whose domain is the min/max of `values`. An empty set
	/// falls back to `[0, 1]`.
	pub fn from_extent(values: impl IntoIterator<Item = f64>, range: (f64, f64)) -> Self {
		let extent = values
			.into_iter()
			.filter(|v| !v.is_nan())
			.fold(None, |acc: Option<(f64, f64)>, v| match acc {
				Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
				None => Some((v, v)),
			});
		Self::new(extent.unwrap_or((0.0, 1.0)), range)
	}

	pub fn clamped(mut self, clamp: bool) -> Self {
		self.clamp = clamp;
		self
	}

	#[cfg(test)]
	pub fn domain(&self) -> (f64, f64) {
		self.domain
	}

	pub fn scale(&self, value: f64) -> f64 {
		let (d0, d1) = self.domain;
		let (r0, r1) = self.range;
		let span = d1 - d0;
		// Degenerate domain maps everything to the middle of the range.
		let mut t = if span == 0.0 { 0.5 } else { (value - d0) / span };
		if self.clamp {
			t = t.clamp(0.0, 1.0);
		}
		r0 + (r1 - r0) * t
	}
}
