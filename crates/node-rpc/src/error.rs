use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    /// The request never produced a readable reply
    #[error("Failed to reach {endpoint}: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} from {endpoint}: {body}")]
    Http {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// The node answered with a non-empty `error`
    #[error("{method} failed: {message}")]
    Remote { method: String, message: String },

    #[error("Unexpected result for {method}: {source}")]
    Decode {
        method: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Wallet error: {0}")]
    Wallet(String),
}

pub type RpcResult<T> = Result<T, RpcError>;
