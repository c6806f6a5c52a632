//! Order Engine Binary
//!
//! Replays a command journal through the order engine and prints the
//! resulting orders and positions as JSON.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin order-engine -- journal.jsonl
//! ```
//!
//! # Environment Variables
//!
//! - `ORDER_ENGINE_CONFIG`: Config file path (default: config.yaml)
//! - `RUST_LOG`: Log filter, overrides `observability.logging.level`

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use serde::Serialize;

use order_engine::application::dto::{OrderDto, PositionDto};
use order_engine::application::ports::TracingEventPublisher;
use order_engine::config::{config_path, load_config};
use order_engine::domain::order_execution::{Order, OrderSnapshot};
use order_engine::domain::position::PositionSnapshot;
use order_engine::infrastructure::Container;
use order_engine::infrastructure::journal::{ReplaySummary, read_journal, replay};
use order_engine::telemetry::init_logging;

/// Everything printed after a replay.
#[derive(Debug, Serialize)]
struct ReplayReport {
    summary: ReplaySummary,
    orders: Vec<OrderSnapshot>,
    positions: Vec<PositionSnapshot>,
    views: Views,
}

/// Rounded, API-shaped views of the final state.
#[derive(Debug, Serialize)]
struct Views {
    orders: Vec<OrderDto>,
    positions: Vec<PositionDto>,
}

#[tokio::main]
async fn main() -> Result<()> {
    load_dotenv();

    let path = config_path(None);
    let config = load_config(Some(&path)).context("Failed to load configuration")?;
    init_logging(&config.observability.logging).context("Failed to initialize logging")?;

    tracing::info!(
        config_path = %path,
        from_file = Path::new(&path).exists(),
        max_order_quantity = %config.engine.max_order_quantity,
        price_scale = config.engine.price_scale,
        "Configuration loaded"
    );

    let journal_path = std::env::args()
        .nth(1)
        .or_else(|| config.journal.path.clone())
        .ok_or_else(|| anyhow!("usage: order-engine <journal.jsonl> (or set journal.path)"))?;

    let container = Container::new(&config.engine, Arc::new(TracingEventPublisher));

    let entries = read_journal(&journal_path)
        .await
        .with_context(|| format!("Failed to load journal {journal_path}"))?;
    tracing::info!(journal = %journal_path, commands = entries.len(), "Replaying journal");

    let summary = replay(container.orders().as_ref(), entries).await;

    let scale = config.engine.price_scale;
    let orders = container.order_repo().snapshots().await;
    let positions = container.position_repo().snapshots().await;
    let views = Views {
        orders: orders
            .iter()
            .cloned()
            .map(|snapshot| Order::from_snapshot(snapshot).map(|o| OrderDto::from_order(&o, scale)))
            .collect::<Result<_, _>>()?,
        positions: container
            .positions()
            .all_positions()
            .await?
            .iter()
            .map(|p| PositionDto::from_position(p, scale))
            .collect(),
    };

    let report = ReplayReport {
        summary,
        orders,
        positions,
        views,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

/// Load .env file from current or ancestor directories.
fn load_dotenv() {
    if dotenvy::dotenv().is_err() {
        let Ok(mut dir) = std::env::current_dir() else {
            return;
        };
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent.to_path_buf();
        }
    }
}
