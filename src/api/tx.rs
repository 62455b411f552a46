use actix_web::{HttpResponse, Responder, get, post, web};
use log::{info, warn};

use super::models::{AppState, ErrorResponse, NewTxResponse, PendingResponse};
use crate::node::NodeError;
use crate::transaction::TransactionRequest;

/// Queue a transaction for the next mined block.
#[post("/transactions/new/")]
pub async fn post_transaction(
    state: web::Data<AppState>,
    body: web::Json<TransactionRequest>,
) -> impl Responder {
    match state.submit_transaction(body.into_inner()) {
        Ok(index) => {
            info!("POST /transactions/new/ - queued for block #{index}");
            HttpResponse::Created().json(NewTxResponse {
                message: format!("Transaction will be added to Block {index}"),
                index,
            })
        }
        Err(NodeError::Validation(e)) => {
            warn!("POST /transactions/new/ - rejected: {e}");
            HttpResponse::BadRequest().json(ErrorResponse {
                error: e.to_string(),
            })
        }
        Err(e) => HttpResponse::InternalServerError().json(ErrorResponse {
            error: e.to_string(),
        }),
    }
}

/// List the pending pool.
#[get("/transactions/pending/")]
pub async fn get_pending(state: web::Data<AppState>) -> impl Responder {
    let transactions = state.pending_transactions();
    HttpResponse::Ok().json(PendingResponse {
        size: transactions.len(),
        transactions,
    })
}
