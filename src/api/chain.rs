use actix_web::{HttpResponse, Responder, get, web};

use super::models::{AppState, ErrorResponse, LastBlockResponse, ValidityResponse};

/// Get the full chain and its length. Peers fetch this during resolution.
#[get("/chain/")]
pub async fn get_chain(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.chain())
}

/// Validate our own chain.
#[get("/chain/validity/")]
pub async fn chain_validity(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(ValidityResponse {
        valid_chain: state.is_chain_valid(),
    })
}

#[get("/last_block/")]
pub async fn last_block(state: web::Data<AppState>) -> impl Responder {
    match state.last_block() {
        Ok(last_block) => HttpResponse::Ok().json(LastBlockResponse { last_block }),
        Err(e) => HttpResponse::InternalServerError().json(ErrorResponse {
            error: e.to_string(),
        }),
    }
}
