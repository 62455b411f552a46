use actix_web::{HttpResponse, Responder, get, post, web};
use log::{info, warn};

use super::models::{
    AppState, BlockReceiptResponse, ErrorResponse, NewBlockRequest, NodesResponse,
    RegisterNodesRequest, ResolveResponse,
};
use crate::consensus::{BlockVerdict, RejectReason};

#[get("/nodes/")]
pub async fn get_nodes(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(NodesResponse {
        message: "Known nodes".to_string(),
        total_nodes: state.peer_list(),
        rejected: Vec::new(),
    })
}

#[post("/nodes/register/")]
pub async fn register_nodes(
    state: web::Data<AppState>,
    body: web::Json<RegisterNodesRequest>,
) -> impl Responder {
    let nodes = match body.into_inner().nodes {
        Some(nodes) if !nodes.is_empty() => nodes,
        _ => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "please supply a valid list of nodes".to_string(),
            });
        }
    };

    let rejected: Vec<String> = state
        .register_peers(&nodes)
        .into_iter()
        .map(|e| e.to_string())
        .collect();
    for reason in &rejected {
        warn!("POST /nodes/register/ - {reason}");
    }

    HttpResponse::Ok().json(NodesResponse {
        message: "New nodes have been added".to_string(),
        total_nodes: state.peer_list(),
        rejected,
    })
}

/// Run longest-valid-chain consensus against every known peer.
#[get("/nodes/resolve/")]
pub async fn resolve(state: web::Data<AppState>) -> impl Responder {
    let replaced = state.resolve_conflicts().await;
    let message = if replaced {
        "Our chain was replaced"
    } else {
        "Our chain is authoritative"
    };
    HttpResponse::Ok().json(ResolveResponse {
        message: message.to_string(),
        replaced,
        chain: state.chain().chain,
    })
}

/// Receive a block broadcast by a peer.
#[post("/block/new/")]
pub async fn receive_block(
    state: web::Data<AppState>,
    body: web::Json<NewBlockRequest>,
) -> impl Responder {
    let block = body.into_inner().block;
    let index = block.index;

    let (verdict, replaced) = match state.receive_block(block).await {
        Ok(outcome) => outcome,
        Err(e) => {
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: e.to_string(),
            });
        }
    };

    match verdict {
        BlockVerdict::Accepted => {
            info!("POST /block/new/ - block #{index} accepted");
            HttpResponse::Ok().json(BlockReceiptResponse {
                message: "Block accepted".to_string(),
                accepted: true,
                replaced: false,
            })
        }
        BlockVerdict::Rejected(reason) => {
            let message = match reason {
                RejectReason::PreviousHashMismatch => "Block rejected: previous hash mismatch",
                RejectReason::InvalidProof => "Block rejected: invalid proof",
            };
            HttpResponse::BadRequest().json(BlockReceiptResponse {
                message: message.to_string(),
                accepted: false,
                replaced: false,
            })
        }
        BlockVerdict::NeedsResync => HttpResponse::Conflict().json(BlockReceiptResponse {
            message: "Block does not extend our tip; resynced with peers".to_string(),
            accepted: false,
            replaced,
        }),
    }
}
