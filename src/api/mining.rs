use actix_web::{HttpResponse, Responder, post, web};
use log::{error, info, warn};

use super::models::{AppState, ErrorResponse, MineResponse, SubmitProofRequest};
use crate::blockchain::{Block, LedgerError};
use crate::node::NodeError;

fn error_response(e: &NodeError) -> HttpResponse {
    let body = ErrorResponse {
        error: e.to_string(),
    };
    match e {
        NodeError::InvalidProof => HttpResponse::BadRequest().json(body),
        NodeError::MiningContended { .. } => HttpResponse::Conflict().json(body),
        NodeError::Ledger(LedgerError::StaleTip { .. }) => {
            HttpResponse::Conflict().json(body)
        }
        _ => HttpResponse::InternalServerError().json(body),
    }
}

async fn forged(state: &AppState, block: Block) -> HttpResponse {
    if state.config().broadcast_blocks {
        let delivered = state.broadcast_block(&block).await;
        info!("MINER - block #{} broadcast to {delivered} peers", block.index);
    }
    HttpResponse::Ok().json(MineResponse::from(block))
}

/// Mine a block from the pending pool:
/// - search a proof for the current tip on the blocking pool
/// - seal pool + reward, retrying if the tip moved
/// - broadcast the block to peers
#[post("/mine/")]
pub async fn mine_block(state: web::Data<AppState>) -> impl Responder {
    let node = state.clone();
    let block = match web::block(move || node.mine()).await {
        Ok(Ok(block)) => block,
        Ok(Err(e)) => {
            warn!("MINER - {e}");
            return error_response(&e);
        }
        Err(e) => {
            error!("MINER - blocking task failed: {e}");
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: e.to_string(),
            });
        }
    };

    forged(&state, block).await
}

/// Seal with a proof found by an external miner.
#[post("/mine/submit/")]
pub async fn submit_proof(
    state: web::Data<AppState>,
    body: web::Json<SubmitProofRequest>,
) -> impl Responder {
    match state.submit_proof(body.proof) {
        Ok(block) => forged(&state, block).await,
        Err(e) => {
            warn!("POST /mine/submit/ - {e}");
            error_response(&e)
        }
    }
}
