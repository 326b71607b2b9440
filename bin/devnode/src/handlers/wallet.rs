use crate::handlers::error::{handle_error, log_rejected};
use crate::state::AppState;
use actix_web::{get, post, web, HttpResponse, Result as ActixResult};
use common::{AccountRequest, TransferRequest, WalletResponse};
use serde::Deserialize;
use tracing::info;

#[derive(Deserialize)]
pub struct BalanceQuery {
    pub q: String,
}

/// Bare number body, like the wallet daemon
#[get("/balance")]
pub async fn balance(
    query: web::Query<BalanceQuery>,
    state: web::Data<AppState>,
) -> ActixResult<HttpResponse> {
    let balance = state
        .ledger
        .lock()
        .balance(&query.q)
        .map_err(|e| handle_error("Balance lookup failed", e))?;
    Ok(HttpResponse::Ok().body(balance.to_string()))
}

#[post("/account")]
pub async fn account(
    req: web::Json<AccountRequest>,
    state: web::Data<AppState>,
) -> ActixResult<HttpResponse> {
    let response = match state.ledger.lock().address(&req.account) {
        Ok(address) => WalletResponse::success(address),
        Err(message) => {
            log_rejected("/account", &req.account, &message);
            WalletResponse::error(message)
        }
    };
    Ok(HttpResponse::Ok().json(response))
}

#[post("/transfer")]
pub async fn transfer(
    req: web::Json<TransferRequest>,
    state: web::Data<AppState>,
) -> ActixResult<HttpResponse> {
    let req = req.into_inner();
    let result = state
        .ledger
        .lock()
        .transfer(&req.account, &req.address, req.amount);

    let response = match result {
        Ok(txid) => {
            info!(
                account = %req.account,
                address = %req.address,
                amount = req.amount,
                %txid,
                "POST /transfer"
            );
            WalletResponse::success(txid)
        }
        Err(message) => {
            log_rejected("/transfer", &req.account, &message);
            WalletResponse::error(message)
        }
    };
    Ok(HttpResponse::Ok().json(response))
}
