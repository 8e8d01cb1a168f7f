use thiserror::Error;

/// Failures while decoding a topology document.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TopologyError {
	#[error("topology has no object named `{0}`")]
	MissingObject(String),
	#[error("arc index {0} is out of range")]
	ArcOutOfRange(usize),
}

/// Failures of the load → build → bind pipeline.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum LoadError {
	#[error("request for {url} failed: {message}")]
	Request { url: String, message: String },
	#[error("{url} answered with HTTP {status}")]
	Status { url: String, status: u16 },
	#[error("could not decode {url}: {message}")]
	Decode { url: String, message: String },
	#[error(transparent)]
	Topology(#[from] TopologyError),
	#[error("link references unknown node `{0}`")]
	UnknownNode(String),
}

#[derive(Clone, Debug, Error, PartialEq)]
#[error("unknown layout mode `{0}`")]
pub struct ParseLayoutModeError(pub String);
