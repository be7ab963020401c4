use thiserror::Error;

/// Errors raised below the discovery pipeline boundary.
///
/// None of these escape [`crate::DiscoveryPipeline::discover`]: search
/// failures become an advisory and per-item failures drop the item.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("candidate has no id")]
    MissingId,

    #[error("candidate {id} has no geometry")]
    MissingGeometry { id: String },

    #[error("unparseable geometry {raw:?}: {reason}")]
    GeometryParse { raw: String, reason: String },
}
