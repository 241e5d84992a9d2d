use opcua_types::StatusCode;

/// Errors produced while crawling an address space.
///
/// Distinguishes failures that come from the server or the transport
/// (retryable, or at least not a programming error) from violations of
/// the protocol invariants this crate depends on, which are not.
#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    /// A `Browse`, `BrowseNext` or `Read` service call failed at the
    /// transport/session level.
    #[error("transport error during {service}: {status}")]
    Transport {
        /// Name of the service call that failed, for diagnostics.
        service: &'static str,
        status: StatusCode,
    },

    /// The server returned a response that violates an assumption this
    /// crawler makes about well-behaved servers, e.g. a non-null
    /// continuation point where the protocol disallows one.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),
}

impl CrawlError {
    pub(crate) fn transport(service: &'static str, status: StatusCode) -> Self {
        Self::Transport { service, status }
    }
}
