//! JSON-RPC 2.0 client for the node's `POST /rpc` endpoint

use crate::api::{AccountApi, ChatApi, FileApi, ProxyApi, TransferApi};
use crate::error::{RpcError, RpcResult};
use crate::methods;
use async_trait::async_trait;
use common::{
    Chat, ChatMessage, ChatRequest, DiscoveredFile, DownloadRecord, Provider, ProxyBytes,
    ProxyRecord, RpcRequest, RpcResponse, SessionInfo, UploadedFile,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Handles requests to the node
pub struct RpcClient {
    http: reqwest::Client,
    endpoint: String,
    next_id: AtomicU64,
}

impl RpcClient {
    /// Create a client for e.g. `http://localhost:8081/rpc`
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Call `method` and decode its `result` as `T`
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> RpcResult<T> {
        let response = self.send(method, params).await?;
        decode_result(method, response)
    }

    /// Call `method` when only success matters
    pub async fn call_unit(&self, method: &str, params: Vec<Value>) -> RpcResult<()> {
        let response = self.send(method, params).await?;
        if let Some(message) = response.error_message() {
            return Err(RpcError::Remote {
                method: method.to_string(),
                message,
            });
        }
        Ok(())
    }

    async fn send(&self, method: &str, params: Vec<Value>) -> RpcResult<RpcResponse> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest::new(id, method, params);
        debug!(method, id, "Sending RPC request");

        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|source| self.transport(source))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| self.transport(source))?;

        match serde_json::from_str::<RpcResponse>(&body) {
            Ok(parsed) => Ok(parsed),
            Err(_) if !status.is_success() => Err(RpcError::Http {
                endpoint: self.endpoint.clone(),
                status: status.as_u16(),
                body,
            }),
            Err(source) => Err(RpcError::Decode {
                method: method.to_string(),
                source,
            }),
        }
    }

    fn transport(&self, source: reqwest::Error) -> RpcError {
        RpcError::Transport {
            endpoint: self.endpoint.clone(),
            source,
        }
    }
}

/// Non-empty `error` means failure; otherwise `result` is the answer
pub fn decode_result<T: DeserializeOwned>(method: &str, response: RpcResponse) -> RpcResult<T> {
    if let Some(message) = response.error_message() {
        return Err(RpcError::Remote {
            method: method.to_string(),
            message,
        });
    }
    serde_json::from_value(response.result.unwrap_or(Value::Null)).map_err(|source| {
        RpcError::Decode {
            method: method.to_string(),
            source,
        }
    })
}

#[async_trait]
impl AccountApi for RpcClient {
    async fn register(&self, username: &str, password: &str, seed: &str) -> RpcResult<String> {
        self.call(methods::REGISTER, vec![json!(username), json!(password), json!(seed)])
            .await
    }

    async fn login(&self, username: &str, password: &str) -> RpcResult<String> {
        self.call(methods::LOGIN, vec![json!(username), json!(password)])
            .await
    }

    async fn logout(&self) -> RpcResult<()> {
        self.call_unit(methods::LOGOUT, vec![]).await
    }
}

#[async_trait]
impl FileApi for RpcClient {
    async fn put_file(&self, path: &str, cost: f64) -> RpcResult<String> {
        self.call(methods::PUT_FILE, vec![json!(path), json!(cost)])
            .await
    }

    async fn delete_file(&self, cid: &str) -> RpcResult<()> {
        self.call_unit(methods::DELETE_FILE, vec![json!(cid)]).await
    }

    async fn get_uploads(&self) -> RpcResult<Vec<UploadedFile>> {
        self.call(methods::GET_UPLOADS, vec![]).await
    }

    async fn get_downloads(&self) -> RpcResult<Vec<DownloadRecord>> {
        self.call(methods::GET_DOWNLOADS, vec![]).await
    }

    async fn discover_file(&self, cid: &str) -> RpcResult<Vec<Provider>> {
        self.call(methods::DISCOVER_FILE, vec![json!(cid)]).await
    }

    async fn discover_files(&self) -> RpcResult<Vec<DiscoveredFile>> {
        self.call(methods::DISCOVER_FILES, vec![]).await
    }

    async fn get_file(&self, peer_id: &str, cid: &str, path: &str) -> RpcResult<i64> {
        self.call(methods::GET_FILE, vec![json!(peer_id), json!(cid), json!(path)])
            .await
    }
}

#[async_trait]
impl TransferApi for RpcClient {
    async fn pause(&self, session_id: i64) -> RpcResult<()> {
        self.call_unit(methods::PAUSE, vec![json!(session_id)]).await
    }

    async fn resume(&self, session_id: i64) -> RpcResult<()> {
        self.call_unit(methods::RESUME, vec![json!(session_id)]).await
    }

    async fn get_session(&self, session_id: i64) -> RpcResult<SessionInfo> {
        self.call(methods::GET_SESSION, vec![json!(session_id)]).await
    }
}

#[async_trait]
impl ChatApi for RpcClient {
    async fn get_incoming_chat_requests(&self) -> RpcResult<Vec<ChatRequest>> {
        self.call(methods::GET_INCOMING_CHAT_REQUESTS, vec![]).await
    }

    async fn get_outgoing_chat_requests(&self) -> RpcResult<Vec<ChatRequest>> {
        self.call(methods::GET_OUTGOING_CHAT_REQUESTS, vec![]).await
    }

    async fn send_chat_request(&self, peer_id: &str, file_cid: &str) -> RpcResult<ChatRequest> {
        self.call(methods::SEND_CHAT_REQUEST, vec![json!(peer_id), json!(file_cid)])
            .await
    }

    async fn accept_chat_request(&self, peer_id: &str, request_id: i64) -> RpcResult<Chat> {
        self.call(methods::ACCEPT_CHAT_REQUEST, vec![json!(peer_id), json!(request_id)])
            .await
    }

    async fn decline_chat_request(&self, peer_id: &str, request_id: i64) -> RpcResult<()> {
        self.call_unit(methods::DECLINE_CHAT_REQUEST, vec![json!(peer_id), json!(request_id)])
            .await
    }

    async fn close_chat(&self, peer_id: &str, chat_id: i64) -> RpcResult<Chat> {
        self.call(methods::CLOSE_CHAT, vec![json!(peer_id), json!(chat_id)])
            .await
    }

    async fn get_messages(&self, peer_id: &str, chat_id: i64) -> RpcResult<Vec<ChatMessage>> {
        self.call(methods::GET_MESSAGES, vec![json!(peer_id), json!(chat_id)])
            .await
    }

    async fn send_message(
        &self,
        peer_id: &str,
        chat_id: i64,
        text: &str,
    ) -> RpcResult<ChatMessage> {
        self.call(
            methods::SEND_MESSAGE,
            vec![json!(peer_id), json!(chat_id), json!(text)],
        )
        .await
    }
}

#[async_trait]
impl ProxyApi for RpcClient {
    async fn get_all_proxies(&self) -> RpcResult<Vec<ProxyRecord>> {
        self.call(methods::GET_ALL_PROXIES, vec![]).await
    }

    async fn connect_to_proxy(&self, peer_id: &str) -> RpcResult<()> {
        self.call_unit(methods::CONNECT_TO_PROXY, vec![json!(peer_id)])
            .await
    }

    async fn disconnect_from_proxy(&self) -> RpcResult<()> {
        self.call_unit(methods::DISCONNECT_FROM_PROXY, vec![]).await
    }

    async fn register_as_proxy(&self, price: f64, wallet_address: &str) -> RpcResult<()> {
        self.call_unit(methods::REGISTER_AS_PROXY, vec![json!(price), json!(wallet_address)])
            .await
    }

    async fn unregister_as_proxy(&self) -> RpcResult<()> {
        self.call_unit(methods::UNREGISTER_AS_PROXY, vec![]).await
    }

    async fn get_proxy_bytes(&self, peer_id: &str) -> RpcResult<ProxyBytes> {
        self.call(methods::GET_PROXY_BYTES, vec![json!(peer_id)]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(value: Value) -> RpcResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_decode_result_success() {
        let info: SessionInfo = decode_result(
            methods::GET_SESSION,
            response(json!({"jsonrpc": "2.0", "id": 1, "result": {
                "rx_bytes": 512, "total_bytes": 1024,
                "paused": false, "complete": false, "result": 0
            }})),
        )
        .unwrap();
        assert_eq!(info.rx_bytes, 512);
        assert_eq!(info.total_bytes, 1024);
    }

    #[test]
    fn test_decode_result_remote_error() {
        let err = decode_result::<String>(
            methods::LOGIN,
            response(json!({"error": "Incorrect username or password"})),
        )
        .unwrap_err();
        match err {
            RpcError::Remote { method, message } => {
                assert_eq!(method, "p2p_login");
                assert_eq!(message, "Incorrect username or password");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_decode_result_wrong_shape() {
        let err = decode_result::<i64>(methods::GET_FILE, response(json!({"result": "abc"})))
            .unwrap_err();
        assert!(matches!(err, RpcError::Decode { .. }));
    }

    #[test]
    fn test_request_ids_increase() {
        let client = RpcClient::new("http://localhost:8081/rpc");
        let first = client.next_id.fetch_add(1, Ordering::Relaxed);
        let second = client.next_id.fetch_add(1, Ordering::Relaxed);
        assert!(second > first);
        assert_eq!(client.endpoint(), "http://localhost:8081/rpc");
    }
}
