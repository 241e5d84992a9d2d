use opcua_types::{AttributeId, NodeId, ReadValueId, VariableId};

use crate::error::CrawlError;
use crate::session::{read_checked, CrawlSession};

/// Fallback values used when a server doesn't expose its operation
/// limits, or reports zero (which OPC UA defines as "no limit", but
/// which we still have to turn into *some* finite batch size).
pub const DEFAULT_MAX_NODES_PER_READ: u32 = 500;
pub const DEFAULT_MAX_NODES_PER_BROWSE: u32 = 500;

/// Batch size ceilings the read and browse batchers must respect,
/// discovered once at the start of a crawl.
#[derive(Debug, Clone, Copy)]
pub struct OperationLimits {
    pub max_nodes_per_read: u32,
    pub max_nodes_per_browse: u32,
}

impl Default for OperationLimits {
    fn default() -> Self {
        Self {
            max_nodes_per_read: DEFAULT_MAX_NODES_PER_READ,
            max_nodes_per_browse: DEFAULT_MAX_NODES_PER_BROWSE,
        }
    }
}

/// Reads `Server_ServerCapabilities_OperationLimits_MaxNodesPerRead` and
/// `..._MaxNodesPerBrowse` from the server. Falls back to the defaults
/// for any attribute that comes back empty, non-Good, or zero, rather
/// than failing the whole crawl over an optional capability.
pub(crate) async fn read_operation_limits<S: CrawlSession + ?Sized>(
    session: &S,
) -> Result<OperationLimits, CrawlError> {
    let max_read_id: NodeId =
        VariableId::Server_ServerCapabilities_OperationLimits_MaxNodesPerRead.into();
    let max_browse_id: NodeId =
        VariableId::Server_ServerCapabilities_OperationLimits_MaxNodesPerBrowse.into();

    let to_read = [
        ReadValueId::new(max_read_id, AttributeId::Value),
        ReadValueId::new(max_browse_id, AttributeId::Value),
    ];

    let mut limits = OperationLimits::default();
    let results = match read_checked(session, &to_read).await {
        Ok(results) => results,
        Err(_) => {
            log::warn!("server did not report operation limits, using defaults");
            return Ok(limits);
        }
    };

    if let Some(value) = results.first().and_then(as_u32) {
        if value > 0 {
            limits.max_nodes_per_read = value;
        }
    }
    if let Some(value) = results.get(1).and_then(as_u32) {
        if value > 0 {
            limits.max_nodes_per_browse = value;
        }
    }
    Ok(limits)
}

fn as_u32(data_value: &opcua_types::DataValue) -> Option<u32> {
    if !data_value.status.unwrap_or(opcua_types::StatusCode::Good).is_good() {
        return None;
    }
    data_value
        .value
        .as_ref()
        .and_then(|v| v.clone().try_cast_to::<u32>().ok())
}
