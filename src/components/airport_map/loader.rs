//! Fetches the airport graph and the world topology.

use futures::try_join;
use gloo_net::http::Request;
use log::info;
use serde::de::DeserializeOwned;

use super::config::VisConfig;
use super::error::LoadError;
use super::topology::Topology;
use super::types::AirportData;

/// Output of the load stage: both documents, decoded.
#[derive(Clone, Debug)]
pub struct Documents {
	pub airports: AirportData,
	pub world: Topology,
}

/// Loads both documents concurrently. The first failure wins and the
/// other request is dropped.
pub async fn load(config: &VisConfig) -> Result<Documents, LoadError> {
	let (airports, world) = try_join!(
		fetch_json::<AirportData>(&config.airports_url),
		fetch_json::<Topology>(&config.world_url),
	)?;
	info!(
		"loaded {} airports, {} routes, {} arcs",
		airports.nodes.len(),
		airports.links.len(),
		world.arcs.len()
	);
	Ok(Documents { airports, world })
}

async fn fetch_json<T: DeserializeOwned>(url: &str) -> Result<T, LoadError> {
	let request_error = |e: gloo_net::Error| LoadError::Request {
		url: url.to_string(),
		message: e.to_string(),
	};
	let resp = Request::get(url).send().await.map_err(request_error)?;
	if !resp.ok() {
		return Err(LoadError::Status {
			url: url.to_string(),
			status: resp.status(),
		});
	}
	let text = resp.text().await.map_err(request_error)?;
	decode(url, &text)
}

pub fn decode<T: DeserializeOwned>(url: &str, text: &str) -> Result<T, LoadError> {
	serde_json::from_str(text).map_err(|e| LoadError::Decode {
		url: url.to_string(),
		message: e.to_string(),
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn decode_reports_the_failing_document() {
		let err = decode::<AirportData>("airports.json", "{\"nodes\": 3}").unwrap_err();
		match err {
			LoadError::Decode { url, .. } => assert_eq!(url, "airports.json"),
			other => panic!("unexpected error {other:?}"),
		}
	}

	#[test]
	fn decode_accepts_a_minimal_topology() {
		let topo: Topology = decode(
			"world-110m.json",
			r#"{"type": "Topology", "arcs": [], "objects": {}}"#,
		)
		.unwrap();
		assert!(topo.transform.is_none());
	}
}
