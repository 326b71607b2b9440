use actix_web::{get, HttpResponse, Result as ActixResult};
use common::HealthResponse;

#[get("/health")]
pub async fn health() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
    }))
}
