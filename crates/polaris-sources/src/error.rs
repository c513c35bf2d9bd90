//! # Source Error Taxonomy
//!
//! Adapter failures are local: they degrade confidence for one
//! (policy, source) pair and never abort the run. Timeouts are imposed by
//! the engine around `fetch` and tagged distinctly there; this module
//! covers the failures an adapter itself can observe.

use thiserror::Error;

use crate::record::SourceId;
use crate::transport::TransportError;

/// Failure of one adapter for one (device, policy) pair.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The backend call itself failed (connectivity, auth, 5xx).
    #[error("transport failure in {source}: {cause}")]
    Transport {
        /// The strategy whose backend call failed.
        source: SourceId,
        /// The underlying transport failure.
        #[source]
        cause: TransportError,
    },

    /// The backend responded, but the payload did not carry the fields
    /// the strategy needs.
    #[error("malformed payload from {source}: {detail}")]
    Malformed {
        /// The strategy that received the payload.
        source: SourceId,
        /// What was missing or unparseable.
        detail: String,
    },
}

impl SourceError {
    /// The strategy this failure belongs to.
    pub fn source_id(&self) -> SourceId {
        match self {
            Self::Transport { source, .. } => *source,
            Self::Malformed { source, .. } => *source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_names_the_source() {
        let err = SourceError::Transport {
            source: SourceId::PaginatedScan,
            cause: TransportError::Backend {
                detail: "HTTP 503".to_string(),
            },
        };
        let msg = format!("{err}");
        assert!(msg.contains("paginated_scan"));
        assert_eq!(err.source_id(), SourceId::PaginatedScan);
    }

    #[test]
    fn malformed_error_carries_detail() {
        let err = SourceError::Malformed {
            source: SourceId::PerSettingAggregation,
            detail: "missing \"state\" field".to_string(),
        };
        assert!(format!("{err}").contains("missing \"state\" field"));
        assert_eq!(err.source_id(), SourceId::PerSettingAggregation);
    }
}
