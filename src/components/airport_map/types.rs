use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use super::error::{LoadError, ParseLayoutModeError};

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct AirportNode {
	pub name: String,
	pub passengers: f64,
	pub longitude: f64,
	pub latitude: f64,
}

/// A link endpoint: either a position in `nodes` or a node name.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum NodeRef {
	Index(usize),
	Name(String),
}

impl fmt::Display for NodeRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			NodeRef::Index(i) => write!(f, "#{i}"),
			NodeRef::Name(name) => f.write_str(name),
		}
	}
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct RouteLink {
	pub source: NodeRef,
	pub target: NodeRef,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct AirportData {
	pub nodes: Vec<AirportNode>,
	#[serde(default)]
	pub links: Vec<RouteLink>,
}

impl AirportData {
	/// Resolves every link endpoint to a node index.
	pub fn resolve_links(&self) -> Result<Vec<(usize, usize)>, LoadError> {
		let by_name: HashMap<&str, usize> = self
			.nodes
			.iter()
			.enumerate()
			.map(|(i, n)| (n.name.as_str(), i))
			.collect();
		let resolve = |r: &NodeRef| -> Result<usize, LoadError> {
			match r {
				NodeRef::Index(i) if *i < self.nodes.len() => Ok(*i),
				NodeRef::Name(name) => by_name
					.get(name.as_str())
					.copied()
					.ok_or_else(|| LoadError::UnknownNode(r.to_string())),
				_ => Err(LoadError::UnknownNode(r.to_string())),
			}
		};
		self.links
			.iter()
			.map(|l| Ok((resolve(&l.source)?, resolve(&l.target)?)))
			.collect()
	}
}

/// Which coordinate source drives the rendered primitives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LayoutMode {
	#[default]
	Force,
	Map,
}

impl LayoutMode {
	pub fn as_str(self) -> &'static str {
		match self {
			LayoutMode::Force => "force",
			LayoutMode::Map => "map",
		}
	}
}

impl fmt::Display for LayoutMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for LayoutMode {
	type Err = ParseLayoutModeError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim() {
			"force" => Ok(LayoutMode::Force),
			"map" => Ok(LayoutMode::Map),
			other => Err(ParseLayoutModeError(other.to_string())),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn decodes_graph_document_with_mixed_link_refs() {
		let json = r#"{
			"nodes": [
				{"name": "ATL", "passengers": 100, "longitude": -84.4, "latitude": 33.6},
				{"name": "LAX", "passengers": 50, "longitude": -118.4, "latitude": 33.9}
			],
			"links": [{"source": 0, "target": "LAX"}]
		}"#;
		let data: AirportData = serde_json::from_str(json).unwrap();
		assert_eq!(data.nodes.len(), 2);
		assert_eq!(data.resolve_links().unwrap(), vec![(0, 1)]);
	}

	#[test]
	fn unknown_link_endpoint_is_an_error() {
		let data = AirportData {
			nodes: vec![AirportNode {
				name: "ATL".into(),
				passengers: 1.0,
				longitude: 0.0,
				latitude: 0.0,
			}],
			links: vec![RouteLink {
				source: NodeRef::Index(0),
				target: NodeRef::Index(3),
			}],
		};
		assert_eq!(
			data.resolve_links(),
			Err(LoadError::UnknownNode("#3".into()))
		);
	}

	#[test]
	fn parses_layout_modes() {
		assert_eq!("force".parse::<LayoutMode>(), Ok(LayoutMode::Force));
		assert_eq!("map".parse::<LayoutMode>(), Ok(LayoutMode::Map));
		assert!("globe".parse::<LayoutMode>().is_err());
		assert_eq!(LayoutMode::Map.to_string(), "map");
	}
}
