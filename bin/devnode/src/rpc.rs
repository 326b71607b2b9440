//! JSON-RPC method dispatch onto the simulated node

use crate::node::{NodeResult, NodeState};
use node_rpc::methods;
use serde::Serialize;
use serde_json::Value;

fn param<'a>(params: &'a [Value], index: usize) -> NodeResult<&'a Value> {
    params
        .get(index)
        .ok_or_else(|| format!("missing parameter {}", index))
}

pub fn str_param(params: &[Value], index: usize) -> NodeResult<&str> {
    param(params, index)?
        .as_str()
        .ok_or_else(|| format!("parameter {} must be a string", index))
}

fn i64_param(params: &[Value], index: usize) -> NodeResult<i64> {
    param(params, index)?
        .as_i64()
        .ok_or_else(|| format!("parameter {} must be an integer", index))
}

pub fn f64_param(params: &[Value], index: usize) -> NodeResult<f64> {
    param(params, index)?
        .as_f64()
        .ok_or_else(|| format!("parameter {} must be a number", index))
}

fn to_value<T: Serialize>(value: NodeResult<T>) -> NodeResult<Value> {
    value.and_then(|v| serde_json::to_value(v).map_err(|e| e.to_string()))
}

/// Run one method against the node. `p2p_putFile` is answered by the
/// handler because it reads the file first.
pub fn dispatch(node: &mut NodeState, method: &str, params: &[Value]) -> NodeResult<Value> {
    node.record_traffic();
    let p = params;
    match method {
        methods::REGISTER => to_value(node.register(
            str_param(p, 0)?,
            str_param(p, 1)?,
            str_param(p, 2)?,
        )),
        methods::LOGIN => to_value(node.login(str_param(p, 0)?, str_param(p, 1)?)),
        methods::LOGOUT => to_value(node.logout()),

        methods::DELETE_FILE => to_value(node.delete_file(str_param(p, 0)?)),
        methods::GET_UPLOADS => to_value(Ok(node.uploads())),
        methods::GET_DOWNLOADS => to_value(Ok(node.downloads())),
        methods::DISCOVER_FILE => to_value(Ok(node.discover_file(str_param(p, 0)?))),
        methods::DISCOVER_FILES => to_value(Ok(node.discover_files())),
        methods::GET_FILE => to_value(node.get_file(
            str_param(p, 0)?,
            str_param(p, 1)?,
            str_param(p, 2)?,
        )),

        methods::PAUSE => to_value(node.set_paused(i64_param(p, 0)?, true)),
        methods::RESUME => to_value(node.set_paused(i64_param(p, 0)?, false)),
        methods::GET_SESSION => to_value(node.get_session(i64_param(p, 0)?)),

        methods::GET_INCOMING_CHAT_REQUESTS => to_value(Ok(node.incoming_requests())),
        methods::GET_OUTGOING_CHAT_REQUESTS => to_value(Ok(node.outgoing_requests())),
        methods::SEND_CHAT_REQUEST => {
            to_value(node.send_chat_request(str_param(p, 0)?, str_param(p, 1)?))
        }
        methods::ACCEPT_CHAT_REQUEST => {
            to_value(node.accept_chat_request(str_param(p, 0)?, i64_param(p, 1)?))
        }
        methods::DECLINE_CHAT_REQUEST => {
            to_value(node.decline_chat_request(str_param(p, 0)?, i64_param(p, 1)?))
        }
        methods::CLOSE_CHAT => to_value(node.close_chat(str_param(p, 0)?, i64_param(p, 1)?)),
        methods::GET_MESSAGES => to_value(node.messages(str_param(p, 0)?, i64_param(p, 1)?)),
        methods::SEND_MESSAGE => to_value(node.send_message(
            str_param(p, 0)?,
            i64_param(p, 1)?,
            str_param(p, 2)?,
        )),

        methods::GET_ALL_PROXIES => to_value(Ok(node.proxies())),
        methods::CONNECT_TO_PROXY => to_value(node.connect_to_proxy(str_param(p, 0)?)),
        methods::DISCONNECT_FROM_PROXY => to_value(node.disconnect_from_proxy()),
        methods::REGISTER_AS_PROXY => {
            to_value(node.register_as_proxy(f64_param(p, 0)?, str_param(p, 1)?))
        }
        methods::UNREGISTER_AS_PROXY => to_value(node.unregister_as_proxy()),
        methods::GET_PROXY_BYTES => to_value(Ok(node.proxy_bytes(str_param(p, 0)?))),

        other => Err(format!("method not found: {}", other)),
    }
}
