//! HTTP client for the wallet service

use crate::api::WalletApi;
use crate::error::{RpcError, RpcResult};
use async_trait::async_trait;
use common::{AccountRequest, TransferRequest, WalletResponse};
use tracing::{debug, info};

pub const BALANCE_ENDPOINT: &str = "/balance";
pub const ACCOUNT_ENDPOINT: &str = "/account";
pub const TRANSFER_ENDPOINT: &str = "/transfer";

pub struct WalletClient {
    http: reqwest::Client,
    base_url: String,
    account: String,
}

impl WalletClient {
    /// `base_url` like `http://localhost:8080`; `account` is the wallet account name
    pub fn new(base_url: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            account: account.into(),
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    fn transport(&self, endpoint: &str, source: reqwest::Error) -> RpcError {
        RpcError::Transport {
            endpoint: self.url(endpoint),
            source,
        }
    }

    async fn post<B: serde::Serialize>(&self, endpoint: &str, body: &B) -> RpcResult<String> {
        let response = self
            .http
            .post(self.url(endpoint))
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport(endpoint, e))?;
        let text = response
            .text()
            .await
            .map_err(|e| self.transport(endpoint, e))?;
        parse_wallet_response(&text)
    }
}

/// `{status: "success", message}` yields `message`; anything else is an error
pub fn parse_wallet_response(body: &str) -> RpcResult<String> {
    let response: WalletResponse = serde_json::from_str(body)
        .map_err(|e| RpcError::Wallet(format!("Malformed wallet response: {}", e)))?;
    if response.is_success() {
        Ok(response.message)
    } else {
        Err(RpcError::Wallet(response.message))
    }
}

/// `/balance` answers with a bare number
pub fn parse_balance(body: &str) -> RpcResult<f64> {
    body.trim()
        .parse::<f64>()
        .map_err(|_| RpcError::Wallet(format!("Invalid balance: {:?}", body.trim())))
}

#[async_trait]
impl WalletApi for WalletClient {
    async fn balance(&self) -> RpcResult<f64> {
        let response = self
            .http
            .get(self.url(BALANCE_ENDPOINT))
            .query(&[("q", self.account.as_str())])
            .send()
            .await
            .map_err(|e| self.transport(BALANCE_ENDPOINT, e))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport(BALANCE_ENDPOINT, e))?;
        if !status.is_success() {
            return Err(RpcError::Http {
                endpoint: self.url(BALANCE_ENDPOINT),
                status: status.as_u16(),
                body,
            });
        }
        parse_balance(&body)
    }

    async fn account_address(&self) -> RpcResult<String> {
        let request = AccountRequest {
            account: self.account.clone(),
        };
        self.post(ACCOUNT_ENDPOINT, &request).await
    }

    async fn transfer(&self, address: &str, amount: f64) -> RpcResult<String> {
        let request = TransferRequest {
            account: self.account.clone(),
            address: address.to_string(),
            amount,
        };
        debug!(address, amount, "Submitting transfer");
        let txid = self.post(TRANSFER_ENDPOINT, &request).await?;
        info!(address, amount, txid = %txid, "Transfer accepted");
        Ok(txid)
    }
}
