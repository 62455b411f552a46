pub mod client;
mod chain;
mod health;
mod mining;
pub mod models;
mod nodes;
mod tx;

use actix_web::web::{self, ServiceConfig};

pub use client::HttpPeerClient;
pub use models::AppState;

pub fn init_routes(cfg: &mut ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(health::health_check)
            .service(chain::get_chain)
            .service(chain::chain_validity)
            .service(chain::last_block)
            .service(mining::mine_block)
            .service(mining::submit_proof)
            .service(tx::post_transaction)
            .service(tx::get_pending)
            .service(nodes::get_nodes)
            .service(nodes::register_nodes)
            .service(nodes::resolve)
            .service(nodes::receive_block),
    );
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use actix_web::http::StatusCode;
    use actix_web::{App, test, web};
    use serde_json::{Value, json};

    use super::{AppState, HttpPeerClient, init_routes};
    use crate::blockchain::{Block, ProofOfWork};
    use crate::config::NodeConfig;
    use crate::consensus::ChainSnapshot;
    use crate::node::Node;

    fn state() -> web::Data<AppState> {
        let config = NodeConfig {
            node_id: "api-node".into(),
            difficulty: 1,
            peer_timeout: Duration::from_millis(200),
            ..NodeConfig::default()
        };
        let client = HttpPeerClient::new(config.peer_timeout).unwrap();
        web::Data::new(Node::new(config, client))
    }

    #[actix_web::test]
    async fn transaction_intake_validates_fields() {
        let state = state();
        let app = test::init_service(App::new().app_data(state.clone()).configure(init_routes)).await;

        let req = test::TestRequest::post()
            .uri("/api/v1/transactions/new/")
            .set_json(json!({ "sender": "a", "recipient": "b", "amount": 5 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["index"], 2);

        let req = test::TestRequest::post()
            .uri("/api/v1/transactions/new/")
            .set_json(json!({ "sender": "a", "amount": 5 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(state.pending_transactions().len(), 1);
    }

    #[actix_web::test]
    async fn mine_forges_block_with_reward() {
        let state = state();
        let app = test::init_service(App::new().app_data(state.clone()).configure(init_routes)).await;

        let req = test::TestRequest::post().uri("/api/v1/mine/").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["index"], 2);
        assert_eq!(body["transactions"][0]["sender"], "0");
        assert_eq!(body["transactions"][0]["recipient"], "api-node");

        let req = test::TestRequest::get().uri("/api/v1/chain/").to_request();
        let snapshot: ChainSnapshot = test::call_and_read_body_json(&app, req).await;
        assert_eq!(snapshot.length, 2);

        let req = test::TestRequest::get()
            .uri("/api/v1/chain/validity/")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["valid_chain"], true);
    }

    #[actix_web::test]
    async fn submitted_proof_is_checked() {
        let state = state();
        let app = test::init_service(App::new().app_data(state.clone()).configure(init_routes)).await;

        let reference = Block::genesis().canonical_bytes();
        let pow = ProofOfWork::new(1);
        let bad = (0..).find(|p| !pow.is_valid_proof(&reference, *p)).unwrap();

        let req = test::TestRequest::post()
            .uri("/api/v1/mine/submit/")
            .set_json(json!({ "proof": bad }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/api/v1/mine/submit/")
            .set_json(json!({ "proof": pow.find_proof(&reference) }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
        assert_eq!(state.chain().length, 2);
    }

    #[actix_web::test]
    async fn forged_broadcast_block_is_rejected() {
        let state = state();
        let app = test::init_service(App::new().app_data(state.clone()).configure(init_routes)).await;

        let genesis = Block::genesis();
        let pow = ProofOfWork::new(1);
        let forged = (0..)
            .find(|p| !pow.is_valid_proof(&genesis.canonical_bytes(), *p))
            .unwrap();
        let block = Block::new(2, Vec::new(), forged, genesis.hash());

        let req = test::TestRequest::post()
            .uri("/api/v1/block/new/")
            .set_json(json!({ "block": block }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(state.chain().length, 1);
    }

    #[actix_web::test]
    async fn block_from_the_future_asks_for_resync() {
        let state = state();
        let app = test::init_service(App::new().app_data(state.clone()).configure(init_routes)).await;

        let block = Block::new(9, Vec::new(), 0, "f".repeat(64));
        let req = test::TestRequest::post()
            .uri("/api/v1/block/new/")
            .set_json(json!({ "block": block }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["replaced"], false);
    }

    #[actix_web::test]
    async fn node_registration() {
        let state = state();
        let app = test::init_service(App::new().app_data(state.clone()).configure(init_routes)).await;

        let req = test::TestRequest::post()
            .uri("/api/v1/nodes/register/")
            .set_json(json!({}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/api/v1/nodes/register/")
            .set_json(json!({ "nodes": ["http://127.0.0.1:5001", "127.0.0.1:5001/x", "http://"] }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total_nodes"], json!(["127.0.0.1:5001"]));
        assert_eq!(body["rejected"].as_array().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn last_block_and_health() {
        let state = state();
        let app = test::init_service(App::new().app_data(state.clone()).configure(init_routes)).await;

        let req = test::TestRequest::get().uri("/api/v1/last_block/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["last_block"]["index"], 1);
        assert_eq!(body["last_block"]["previous_hash"], "1");

        let req = test::TestRequest::get().uri("/api/v1/health/").to_request();
        assert!(test::call_service(&app, req).await.status().is_success());
    }
}
