mod api;
mod blockchain;
mod config;
mod consensus;
mod node;
mod transaction;

use std::fs;
use std::io;
use std::path::Path;

use actix_web::{App, HttpServer, rt, web};
use dotenvy::dotenv;
use log::{info, warn};

use api::{AppState, HttpPeerClient};
use blockchain::{Ledger, LedgerSnapshot};
use config::NodeConfig;
use node::Node;

fn load_ledger(config: &NodeConfig) -> io::Result<Ledger> {
    let Some(path) = config.snapshot_path.as_deref().filter(|p| p.exists()) else {
        return Ok(Ledger::new(config.difficulty));
    };

    let raw = fs::read(path)?;
    let snapshot: LedgerSnapshot = serde_json::from_slice(&raw).map_err(io::Error::other)?;
    Ledger::from_snapshot(snapshot, config.difficulty).map_err(io::Error::other)
}

fn save_ledger(path: &Path, snapshot: &LedgerSnapshot) -> io::Result<()> {
    let raw = serde_json::to_vec_pretty(snapshot).map_err(io::Error::other)?;
    fs::write(path, raw)?;
    info!(
        "💾 Saved {} blocks to {}",
        snapshot.chain.len(),
        path.display()
    );
    Ok(())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    let _ = dotenv();
    env_logger::init();

    let config = NodeConfig::from_env();
    let (host, port) = (config.host.clone(), config.port);

    let client = HttpPeerClient::new(config.peer_timeout).map_err(io::Error::other)?;
    let ledger = load_ledger(&config)?;
    let state: web::Data<AppState> = web::Data::new(Node::with_ledger(ledger, config, client));

    println!(
        "⛓️ Starting ledger node {} at http://{host}:{port} (difficulty {})",
        state.config().node_id,
        state.config().difficulty
    );

    if let Some(every) = state.config().resolve_interval {
        let node = state.clone();
        rt::spawn(async move {
            let mut ticker = rt::time::interval(every);
            loop {
                ticker.tick().await;
                if node.resolve_conflicts().await {
                    info!("🔄 Chain replaced by periodic resolution");
                }
            }
        });
    }

    let server_state = state.clone();
    HttpServer::new(move || {
        App::new()
            .app_data(server_state.clone())
            .configure(api::init_routes)
    })
    .bind((host.as_str(), port))?
    .run()
    .await?;

    if let Some(path) = &state.config().snapshot_path {
        if let Err(e) = save_ledger(path, &state.ledger_snapshot()) {
            warn!("could not save snapshot to {}: {e}", path.display());
        }
    }
    Ok(())
}
