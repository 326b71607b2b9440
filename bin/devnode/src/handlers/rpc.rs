use crate::handlers::error::log_rejected;
use crate::node::NodeResult;
use crate::rpc::{dispatch, f64_param, str_param};
use crate::state::AppState;
use actix_web::{post, web, HttpResponse, Result as ActixResult};
use common::{RpcRequest, RpcResponse};
use node_rpc::methods;
use serde_json::{json, Value};
use tracing::debug;

/// JSON-RPC entry point. Failures are answered with 200 and an `error`
/// string, the way the node does.
#[post("/rpc")]
pub async fn rpc(
    req: web::Json<RpcRequest>,
    state: web::Data<AppState>,
) -> ActixResult<HttpResponse> {
    let RpcRequest {
        id, method, params, ..
    } = req.into_inner();
    debug!(id, method = %method, "POST /rpc");

    let outcome = if method == methods::PUT_FILE {
        put_file(&state, &params).await
    } else {
        dispatch(&mut state.node.lock(), &method, &params)
    };

    let id = Some(json!(id));
    let response = match outcome {
        Ok(result) => RpcResponse::success(id, result),
        Err(message) => {
            log_rejected("/rpc", &method, &message);
            RpcResponse::failure(id, message)
        }
    };
    Ok(HttpResponse::Ok().json(response))
}

/// Publishing hashes the file, so it is read before the node is locked
async fn put_file(state: &AppState, params: &[Value]) -> NodeResult<Value> {
    let path = str_param(params, 0)?;
    let cost = f64_param(params, 1)?;
    let contents = tokio::fs::read(path)
        .await
        .map_err(|e| format!("cannot read {}: {}", path, e))?;

    let mut node = state.node.lock();
    node.record_traffic();
    node.put_file(path, &contents, cost).map(Value::String)
}
