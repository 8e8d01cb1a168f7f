//! TopoJSON decoding: shared arcs → per-country polygons and border lines.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::error::TopologyError;

/// Longitude, latitude in degrees.
pub type Position = (f64, f64);
pub type Ring = Vec<Position>;

#[derive(Clone, Debug, Deserialize)]
pub struct Transform {
	pub scale: [f64; 2],
	pub translate: [f64; 2],
}

/// Geometry objects of a topology. Types other than polygons, including a
/// null `type`, decode to `Unsupported` and are skipped.
#[derive(Clone, Debug, Deserialize)]
#[serde(remote = "Self", tag = "type")]
pub enum TopoGeometry {
	GeometryCollection {
		geometries: Vec<TopoGeometry>,
	},
	Polygon {
		arcs: Vec<Vec<i64>>,
		#[serde(default)]
		id: Option<Value>,
		#[serde(default)]
		properties: Option<Value>,
	},
	MultiPolygon {
		arcs: Vec<Vec<Vec<i64>>>,
		#[serde(default)]
		id: Option<Value>,
		#[serde(default)]
		properties: Option<Value>,
	},
	#[serde(other)]
	Unsupported,
}

impl<'de> Deserialize<'de> for TopoGeometry {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let value = Value::deserialize(deserializer)?;
		if value.get("type").is_none_or(Value::is_null) {
			return Ok(Self::Unsupported);
		}
		// inherent fn from the derive: dispatches on the tag
		TopoGeometry::deserialize(value).map_err(serde::de::Error::custom)
	}
}

#[derive(Clone, Debug, Deserialize)]
pub struct Topology {
	#[serde(default)]
	pub transform: Option<Transform>,
	pub arcs: Vec<Vec<Vec<f64>>>,
	pub objects: HashMap<String, TopoGeometry>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
	Polygon(Vec<Ring>),
	MultiPolygon(Vec<Vec<Ring>>),
}

impl Geometry {
	pub fn rings(&self) -> Box<dyn Iterator<Item = &Ring> + '_> {
		match self {
			Geometry::Polygon(rings) => Box::new(rings.iter()),
			Geometry::MultiPolygon(polys) => Box::new(polys.iter().flatten()),
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Feature {
	pub id: Option<Value>,
	pub properties: Value,
	pub geometry: Geometry,
}

/// Which arcs of an object end up in a mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Borders {
	All,
	/// Arcs shared by two different geometries.
	Interior,
	/// Arcs used by a single geometry (coastlines).
	Exterior,
}

impl Topology {
	fn object(&self, name: &str) -> Result<&TopoGeometry, TopologyError> {
		self.objects
			.get(name)
			.ok_or_else(|| TopologyError::MissingObject(name.to_string()))
	}

	/// Absolute positions of every arc, undoing quantization and delta
	/// encoding when the topology carries a transform.
	pub fn decoded_arcs(&self) -> Vec<Vec<Position>> {
		self.arcs
			.iter()
			.map(|arc| {
				let (mut x, mut y) = (0.0, 0.0);
				arc.iter()
					.filter(|p| p.len() >= 2)
					.map(|p| match &self.transform {
						Some(t) => {
							x += p[0];
							y += p[1];
							(
								x * t.scale[0] + t.translate[0],
								y * t.scale[1] + t.translate[1],
							)
						}
						None => (p[0], p[1]),
					})
					.collect()
			})
			.collect()
	}

	pub fn features(&self, object: &str) -> Result<Vec<Feature>, TopologyError> {
		let arcs = self.decoded_arcs();
		let mut out = Vec::new();
		collect_features(self.object(object)?, &arcs, &mut out)?;
		Ok(out)
	}

	pub fn mesh(&self, object: &str, borders: Borders) -> Result<Vec<Vec<Position>>, TopologyError> {
		let mut leaves = Vec::new();
		collect_leaves(self.object(object)?, &mut leaves);

		// arc -> (first geometry, last geometry), in first-seen order
		let mut order = Vec::new();
		let mut owners: HashMap<usize, (usize, usize)> = HashMap::new();
		for (g, leaf) in leaves.iter().enumerate() {
			for i in leaf_arcs(leaf) {
				let idx = arc_index(i);
				owners
					.entry(idx)
					.and_modify(|(_, last)| *last = g)
					.or_insert_with(|| {
						order.push(idx);
						(g, g)
					});
			}
		}

		let arcs = self.decoded_arcs();
		order
			.into_iter()
			.filter(|idx| {
				let (first, last) = owners[idx];
				match borders {
					Borders::All => true,
					Borders::Interior => first != last,
					Borders::Exterior => first == last,
				}
			})
			.map(|idx| {
				arcs.get(idx)
					.cloned()
					.ok_or(TopologyError::ArcOutOfRange(idx))
			})
			.collect()
	}
}

fn arc_index(i: i64) -> usize {
	if i < 0 { !i as usize } else { i as usize }
}

fn collect_leaves<'a>(geometry: &'a TopoGeometry, out: &mut Vec<&'a TopoGeometry>) {
	match geometry {
		TopoGeometry::GeometryCollection { geometries } => {
			for g in geometries {
				collect_leaves(g, out);
			}
		}
		TopoGeometry::Unsupported => {}
		leaf => out.push(leaf),
	}
}

fn leaf_arcs(geometry: &TopoGeometry) -> Vec<i64> {
	match geometry {
		TopoGeometry::Polygon { arcs, .. } => arcs.iter().flatten().copied().collect(),
		TopoGeometry::MultiPolygon { arcs, .. } => arcs.iter().flatten().flatten().copied().collect(),
		_ => Vec::new(),
	}
}

fn collect_features(
	geometry: &TopoGeometry,
	arcs: &[Vec<Position>],
	out: &mut Vec<Feature>,
) -> Result<(), TopologyError> {
	match geometry {
		TopoGeometry::GeometryCollection { geometries } => {
			for g in geometries {
				collect_features(g, arcs, out)?;
			}
		}
		TopoGeometry::Polygon {
			arcs: rings,
			id,
			properties,
		} => out.push(Feature {
			id: id.clone(),
			properties: properties.clone().unwrap_or(Value::Null),
			geometry: Geometry::Polygon(polygon(rings, arcs)?),
		}),
		TopoGeometry::MultiPolygon {
			arcs: polys,
			id,
			properties,
		} => out.push(Feature {
			id: id.clone(),
			properties: properties.clone().unwrap_or(Value::Null),
			geometry: Geometry::MultiPolygon(
				polys
					.iter()
					.map(|p| polygon(p, arcs))
					.collect::<Result<_, _>>()?,
			),
		}),
		TopoGeometry::Unsupported => {}
	}
	Ok(())
}

fn polygon(rings: &[Vec<i64>], arcs: &[Vec<Position>]) -> Result<Vec<Ring>, TopologyError> {
	rings.iter().map(|r| ring(r, arcs)).collect()
}

/// Stitches arcs end to end; each junction point is emitted once.
fn line(indices: &[i64], arcs: &[Vec<Position>]) -> Result<Vec<Position>, TopologyError> {
	let mut points: Vec<Position> = Vec::new();
	for &i in indices {
		let idx = arc_index(i);
		let arc = arcs.get(idx).ok_or(TopologyError::ArcOutOfRange(idx))?;
		points.pop();
		if i < 0 {
			points.extend(arc.iter().rev());
		} else {
			points.extend(arc.iter());
		}
	}
	Ok(points)
}

fn ring(indices: &[i64], arcs: &[Vec<Position>]) -> Result<Ring, TopologyError> {
	let mut points = line(indices, arcs)?;
	if points.len() < 4 {
		if let Some(&first) = points.first() {
			points.push(first);
		}
	}
	Ok(points)
}

/// Two unit squares side by side sharing the edge x = 1, plus a point.
#[cfg(test)]
pub(crate) const TWO_SQUARES: &str = r#"{
	"type": "Topology",
	"transform": {"scale": [1, 1], "translate": [10, 20]},
	"arcs": [
		[[1, 0], [0, 1]],
		[[1, 1], [-1, 0], [0, -1], [1, 0]],
		[[1, 0], [1, 0], [0, 1], [-1, 0]]
	],
	"objects": {
		"countries": {
			"type": "GeometryCollection",
			"geometries": [
				{"type": "Polygon", "id": "A", "arcs": [[0, 1]]},
				{"type": "Polygon", "id": "B", "properties": {"name": "Bee"}, "arcs": [[2, -1]]},
				{"type": "Point", "coordinates": [0, 0]}
			]
		}
	}
}"#;

#[cfg(test)]
mod tests {
	use super::*;

	fn topology() -> Topology {
		serde_json::from_str(TWO_SQUARES).unwrap()
	}

	#[test]
	fn decodes_delta_encoded_arcs() {
		let arcs = topology().decoded_arcs();
		assert_eq!(arcs[0], vec![(11.0, 20.0), (11.0, 21.0)]);
		assert_eq!(
			arcs[1],
			vec![(11.0, 21.0), (10.0, 21.0), (10.0, 20.0), (11.0, 20.0)]
		);
	}

	#[test]
	fn builds_closed_rings_and_reverses_negative_arcs() {
		let features = topology().features("countries").unwrap();
		assert_eq!(features.len(), 2);
		assert_eq!(features[0].id, Some(Value::from("A")));

		let Geometry::Polygon(rings) = &features[1].geometry else {
			panic!("expected polygon");
		};
		assert_eq!(
			rings[0],
			vec![
				(11.0, 20.0),
				(12.0, 20.0),
				(12.0, 21.0),
				(11.0, 21.0),
				(11.0, 20.0)
			]
		);
		assert_eq!(features[1].properties["name"], "Bee");
	}

	#[test]
	fn mesh_selects_arcs_by_ownership() {
		let topo = topology();
		assert_eq!(topo.mesh("countries", Borders::All).unwrap().len(), 3);
		let interior = topo.mesh("countries", Borders::Interior).unwrap();
		assert_eq!(interior, vec![vec![(11.0, 20.0), (11.0, 21.0)]]);
		assert_eq!(topo.mesh("countries", Borders::Exterior).unwrap().len(), 2);
	}

	#[test]
	fn null_geometries_are_skipped() {
		let topo: Topology = serde_json::from_str(
			r#"{
				"type": "Topology",
				"arcs": [[[0, 0], [1, 0], [1, 1], [0, 0]]],
				"objects": {
					"countries": {
						"type": "GeometryCollection",
						"geometries": [
							{"type": "Polygon", "arcs": [[0]]},
							{"type": null, "id": "-99"}
						]
					}
				}
			}"#,
		)
		.unwrap();
		let features = topo.features("countries").unwrap();
		assert_eq!(features.len(), 1);
		assert_eq!(topo.mesh("countries", Borders::All).unwrap().len(), 1);
	}

	#[test]
	fn missing_object_is_reported() {
		assert_eq!(
			topology().features("land").unwrap_err(),
			TopologyError::MissingObject("land".into())
		);
	}

	#[test]
	fn out_of_range_arc_is_reported() {
		let mut topo = topology();
		topo.objects.insert(
			"broken".into(),
			TopoGeometry::Polygon {
				arcs: vec![vec![7]],
				id: None,
				properties: None,
			},
		);
		assert_eq!(
			topo.features("broken").unwrap_err(),
			TopologyError::ArcOutOfRange(7)
		);
	}
}
