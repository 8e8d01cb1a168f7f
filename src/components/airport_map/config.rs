/// Tunables for the airport visualization. `Default` reproduces the stock
/// 400×400 layout with the bundled data files.
#[derive(Clone, Debug, PartialEq)]
pub struct VisConfig {
	/// Logical drawing extent; the canvas letterboxes this into its real size.
	pub width: f64,
	pub height: f64,
	pub airports_url: String,
	pub world_url: String,
	/// Name of the boundary object inside the topology document.
	pub countries_object: String,
	/// Node radius range, mapped linearly from passenger volume.
	pub radius_range: (f64, f64),
	/// Added to the display radius to get the collision radius.
	pub collide_padding: f64,
	pub charge_strength: f64,
	pub position_strength: f64,
	pub link_distance: f64,
	/// Alpha target while a drag gesture is active.
	pub drag_alpha_target: f64,
	pub map_duration_ms: f64,
	pub force_duration_ms: f64,
	/// Tooltip offset from the node centre, in CSS pixels.
	pub tooltip_offset: (f64, f64),
}

impl Default for VisConfig {
	fn default() -> Self {
		Self {
			width: 400.0,
			height: 400.0,
			airports_url: "airports.json".into(),
			world_url: "world-110m.json".into(),
			countries_object: "countries".into(),
			radius_range: (5.0, 15.0),
			collide_padding: 10.0,
			charge_strength: 5.0,
			position_strength: 0.1,
			link_distance: 30.0,
			drag_alpha_target: 0.3,
			map_duration_ms: 1000.0,
			force_duration_ms: 600.0,
			tooltip_offset: (15.0, -30.0),
		}
	}
}

impl VisConfig {
	pub fn center(&self) -> (f64, f64) {
		(self.width / 2.0, self.height / 2.0)
	}
}
