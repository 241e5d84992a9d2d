use async_trait::async_trait;
use opcua_types::{BrowseDescription, BrowseResult, DataValue, ReadValueId, StatusCode, TimestampsToReturn};

use crate::error::CrawlError;

/// The subset of an OPC UA client session the crawler needs.
///
/// Kept narrow and trait-based so the crawler can run against the real
/// `opcua_client::Session`, or against a fake in tests, without dragging
/// in connection setup, subscriptions or any of the rest of the client.
#[async_trait]
pub trait CrawlSession {
    /// Issue a `Browse` service call.
    async fn browse(
        &self,
        nodes_to_browse: &[BrowseDescription],
    ) -> Result<Vec<BrowseResult>, StatusCode>;

    /// Issue a `BrowseNext` service call.
    ///
    /// The crawler never emits a non-null continuation point itself (see
    /// [`crate::browse_batcher`]), but implementations must still accept
    /// this call for servers that hand one back regardless.
    async fn browse_next(
        &self,
        continuation_points: &[opcua_types::ByteString],
    ) -> Result<Vec<BrowseResult>, StatusCode>;

    /// Issue a `Read` service call for a batch of attributes.
    async fn read(&self, nodes_to_read: &[ReadValueId]) -> Result<Vec<DataValue>, StatusCode>;
}

#[async_trait]
impl CrawlSession for opcua_client::Session {
    async fn browse(
        &self,
        nodes_to_browse: &[BrowseDescription],
    ) -> Result<Vec<BrowseResult>, StatusCode> {
        opcua_client::Session::browse(self, nodes_to_browse, 0, None).await
    }

    async fn browse_next(
        &self,
        continuation_points: &[opcua_types::ByteString],
    ) -> Result<Vec<BrowseResult>, StatusCode> {
        opcua_client::Session::browse_next(self, false, continuation_points).await
    }

    async fn read(&self, nodes_to_read: &[ReadValueId]) -> Result<Vec<DataValue>, StatusCode> {
        opcua_client::Session::read(self, nodes_to_read, TimestampsToReturn::Neither, 0.0).await
    }
}

pub(crate) async fn browse_checked<S: CrawlSession + ?Sized>(
    session: &S,
    nodes_to_browse: &[BrowseDescription],
) -> Result<Vec<BrowseResult>, CrawlError> {
    session.browse(nodes_to_browse).await.map_err(|status| {
        log::error!("Browse call failed: {status}");
        CrawlError::transport("Browse", status)
    })
}

pub(crate) async fn read_checked<S: CrawlSession + ?Sized>(
    session: &S,
    nodes_to_read: &[ReadValueId],
) -> Result<Vec<DataValue>, CrawlError> {
    session.read(nodes_to_read).await.map_err(|status| {
        log::error!("Read call failed: {status}");
        CrawlError::transport("Read", status)
    })
}
