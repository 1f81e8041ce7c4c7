//! JSON-RPC server over Unix socket.
//!
//! Listens on a Unix domain socket, accepts connections, and dispatches
//! JSON-RPC method calls to the appropriate command handlers.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use spindle_engine::EngineError;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;
use tracing::{debug, error, info, warn};

use crate::commands;
use crate::DaemonState;

/// JSON-RPC request.
#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    /// JSON-RPC version (must be "2.0").
    pub jsonrpc: String,
    /// Request ID.
    pub id: serde_json::Value,
    /// Method name.
    pub method: String,
    /// Parameters.
    #[serde(default)]
    pub params: serde_json::Value,
}

/// JSON-RPC response.
#[derive(Debug, Serialize)]
pub struct RpcResponse {
    /// JSON-RPC version.
    pub jsonrpc: String,
    /// Request ID.
    pub id: serde_json::Value,
    /// Result or error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

/// JSON-RPC error object.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RpcError {
    /// Error code.
    pub code: i32,
    /// Stable error name.
    pub message: String,
    /// Optional structured data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl RpcResponse {
    /// Create a success response.
    pub fn success(id: serde_json::Value, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: serde_json::Value, error: RpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

impl RpcError {
    // Standard JSON-RPC errors

    /// Parse error (-32700).
    pub fn parse_error() -> Self {
        Self {
            code: -32700,
            message: "PARSE_ERROR".to_string(),
            data: None,
        }
    }

    /// Method not found (-32601).
    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: "METHOD_NOT_FOUND".to_string(),
            data: Some(serde_json::json!({"method": method})),
        }
    }

    /// Invalid params (-32602).
    pub fn invalid_params(detail: &str) -> Self {
        Self {
            code: -32602,
            message: "INVALID_PARAMS".to_string(),
            data: Some(serde_json::json!({"detail": detail})),
        }
    }

    /// Internal error (-32603).
    pub fn internal_error(detail: &str) -> Self {
        Self {
            code: -32603,
            message: "INTERNAL_ERROR".to_string(),
            data: Some(serde_json::json!({"detail": detail})),
        }
    }

    /// Map an engine error to its stable wire code.
    pub fn from_engine(e: &EngineError) -> Self {
        let code = match e {
            EngineError::QuotaExhausted => -32020,
            EngineError::OutOfStock => -32021,
            EngineError::CampaignInactive => -32022,
            EngineError::CapExceeded { .. } => -32023,
            EngineError::InvalidTransition(_) => -32024,
            EngineError::AccessDenied => -32025,
            EngineError::NotFound(_) => -32026,
            EngineError::TransientConflict => -32027,
            EngineError::Store(_) | EngineError::Internal(_) => -32603,
        };
        Self {
            code,
            message: e.code().to_string(),
            data: Some(serde_json::json!({"detail": e.to_string()})),
        }
    }
}

/// The RPC server.
pub struct RpcServer {
    state: Arc<DaemonState>,
    socket_path: PathBuf,
}

impl RpcServer {
    /// Create a new RPC server.
    pub fn new(state: Arc<DaemonState>, socket_path: PathBuf) -> Self {
        Self { state, socket_path }
    }

    /// Run the server, accepting connections.
    pub async fn run(&self) -> anyhow::Result<()> {
        // Remove stale socket file
        let _ = std::fs::remove_file(&self.socket_path);

        let listener = UnixListener::bind(&self.socket_path)?;
        info!("IPC server listening on {:?}", self.socket_path);

        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    let state = self.state.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(state, stream).await {
                            warn!("Connection error: {}", e);
                        }
                    });
                }
                Err(e) => {
                    error!("Accept error: {}", e);
                }
            }
        }
    }
}

/// Handle a single client connection.
async fn handle_connection(
    state: Arc<DaemonState>,
    stream: tokio::net::UnixStream,
) -> anyhow::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;
        if bytes_read == 0 {
            break; // EOF
        }

        let response = match serde_json::from_str::<RpcRequest>(&line) {
            Ok(request) => dispatch_request(state.clone(), request).await,
            Err(_) => RpcResponse::error(serde_json::Value::Null, RpcError::parse_error()),
        };

        let mut response_json = serde_json::to_string(&response)?;
        response_json.push('\n');
        writer.write_all(response_json.as_bytes()).await?;
        writer.flush().await?;
    }

    Ok(())
}

/// Dispatch a JSON-RPC request to the appropriate command handler.
async fn dispatch_request(state: Arc<DaemonState>, request: RpcRequest) -> RpcResponse {
    let id = request.id.clone();
    let method = request.method.as_str();

    debug!("Dispatching RPC method: {}", method);

    let result = match method {
        // Provisioning
        "create_tenant" => commands::admin::create_tenant(&state, &request.params).await,
        "set_tenant_lock" => commands::admin::set_tenant_lock(&state, &request.params).await,
        "create_campaign" => commands::admin::create_campaign(&state, &request.params).await,
        "archive_campaign" => commands::admin::archive_campaign(&state, &request.params).await,
        "create_prize" => commands::admin::create_prize(&state, &request.params).await,
        "create_manager" => commands::admin::create_manager(&state, &request.params).await,
        "deactivate_manager" => commands::admin::deactivate_manager(&state, &request.params).await,
        "create_task" => commands::admin::create_task(&state, &request.params).await,
        "grant_limit_override" => {
            commands::admin::grant_limit_override(&state, &request.params).await
        }

        // End-user flows
        "enroll_user" => commands::spins::enroll_user(&state, &request.params).await,
        "admit_spin" => commands::spins::admit_spin(&state, &request.params).await,
        "get_entitlement" => commands::spins::get_entitlement(&state, &request.params).await,
        "submit_task_completion" => {
            commands::spins::submit_task_completion(&state, &request.params).await
        }

        // Staff flows
        "approve_task" => commands::staff::approve_task(&state, &request.params).await,
        "reject_task" => commands::staff::reject_task(&state, &request.params).await,
        "pending_completions" => {
            commands::staff::pending_completions(&state, &request.params).await
        }
        "grant_bonus" => commands::staff::grant_bonus(&state, &request.params).await,
        "query_audit_logs" => commands::staff::query_audit_logs(&state, &request.params).await,
        "get_usage" => commands::staff::get_usage(&state, &request.params).await,

        // Vouchers
        "redeem_voucher" => commands::vouchers::redeem_voucher(&state, &request.params).await,
        "void_voucher" => commands::vouchers::void_voucher(&state, &request.params).await,

        _ => Err(RpcError::method_not_found(method)),
    };

    match result {
        Ok(value) => RpcResponse::success(id, value),
        Err(err) => RpcResponse::error(id, err),
    }
}
