//! Command journal.
//!
//! A journal is a JSON-lines file, one command per line, tagged by `"op"`:
//!
//! ```text
//! {"op":"place","order_id":"o-1","user_id":"u-1","symbol":"TCS","side":"BUY","order_type":"MARKET","quantity":"10"}
//! {"op":"submit","order_id":"o-1","broker_order_id":"b-1"}
//! {"op":"fill","order_id":"o-1","quantity":"10","price":"3900.5","commission":"1.2"}
//! {"op":"mark","user_id":"u-1","symbol":"TCS","price":"3950"}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. Replay applies every
//! command through the order service; a command the engine refuses is
//! recorded in the summary and replay moves on.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::dto::PlaceOrderDto;
use crate::application::ports::EventPublisherPort;
use crate::application::use_cases::OrderService;
use crate::domain::order_execution::{Fill, OrderRepository};
use crate::domain::position::PositionRepository;
use crate::domain::shared::{BrokerId, Money, OrderId, Quantity, Symbol, Timestamp, UserId};
use crate::error::{EngineError, ErrorCode};

/// Errors reading a journal.
#[derive(Debug, Error)]
pub enum JournalError {
    /// The file could not be read.
    #[error("Failed to read journal {path}: {source}")]
    Io {
        /// Journal path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A line is not a valid command.
    #[error("Invalid journal command on line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// Parser message.
        message: String,
    },
}

/// One journal command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum JournalCommand {
    /// Place a new order.
    Place(PlaceOrderDto),
    /// Venue acknowledgement.
    Submit {
        /// Order ID.
        order_id: OrderId,
        /// Venue's ID.
        #[serde(default)]
        broker_order_id: Option<BrokerId>,
    },
    /// Execution report.
    Fill {
        /// Order ID.
        order_id: OrderId,
        /// Executed quantity.
        quantity: Quantity,
        /// Execution price.
        price: Money,
        /// Commission charged.
        #[serde(default)]
        commission: Money,
        /// Venue's execution ID.
        #[serde(default)]
        fill_id: Option<String>,
        /// Execution time.
        #[serde(default)]
        timestamp: Option<Timestamp>,
    },
    /// Cancel an order.
    Cancel {
        /// Order ID.
        order_id: OrderId,
        /// Why.
        #[serde(default)]
        reason: Option<String>,
    },
    /// Venue rejection.
    Reject {
        /// Order ID.
        order_id: OrderId,
        /// Venue's message.
        reason: String,
    },
    /// Mark a position to market.
    Mark {
        /// Owner.
        user_id: UserId,
        /// Symbol.
        symbol: Symbol,
        /// Market price.
        price: Money,
    },
}

impl JournalCommand {
    /// The command's `op` tag.
    #[must_use]
    pub const fn op(&self) -> &'static str {
        match self {
            Self::Place(_) => "place",
            Self::Submit { .. } => "submit",
            Self::Fill { .. } => "fill",
            Self::Cancel { .. } => "cancel",
            Self::Reject { .. } => "reject",
            Self::Mark { .. } => "mark",
        }
    }
}

/// A command with its line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    /// 1-based line number.
    pub line: usize,
    /// Parsed command.
    pub command: JournalCommand,
}

/// A command the engine refused during replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayFailure {
    /// 1-based line number.
    pub line: usize,
    /// Command tag.
    pub op: &'static str,
    /// Error code.
    pub code: ErrorCode,
    /// Error message.
    pub message: String,
}

/// Outcome of a replay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    /// Commands applied.
    pub applied: usize,
    /// Commands refused.
    pub failed: Vec<ReplayFailure>,
}

/// Parse journal text.
///
/// # Errors
///
/// Returns `Parse` with the line number of the first malformed command.
pub fn parse_journal(text: &str) -> Result<Vec<JournalEntry>, JournalError> {
    text.lines()
        .enumerate()
        .map(|(idx, raw)| (idx + 1, raw.trim()))
        .filter(|(_, raw)| !raw.is_empty() && !raw.starts_with('#'))
        .map(|(line, raw)| {
            serde_json::from_str(raw)
                .map(|command| JournalEntry { line, command })
                .map_err(|e| JournalError::Parse {
                    line,
                    message: e.to_string(),
                })
        })
        .collect()
}

/// Read and parse a journal file.
///
/// # Errors
///
/// Returns `Io` if the file cannot be read and `Parse` if a line is invalid.
pub async fn read_journal(path: impl AsRef<Path>) -> Result<Vec<JournalEntry>, JournalError> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| JournalError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    parse_journal(&text)
}

/// Apply journal entries in order.
pub async fn replay<O, P, E>(
    service: &OrderService<O, P, E>,
    entries: Vec<JournalEntry>,
) -> ReplaySummary
where
    O: OrderRepository,
    P: PositionRepository,
    E: EventPublisherPort,
{
    let mut summary = ReplaySummary::default();

    for JournalEntry { line, command } in entries {
        let op = command.op();
        match apply(service, command).await {
            Ok(()) => summary.applied += 1,
            Err(err) => {
                tracing::warn!(line, op, code = %err.code(), error = %err, "Journal command refused");
                summary.failed.push(ReplayFailure {
                    line,
                    op,
                    code: err.code(),
                    message: err.to_string(),
                });
            }
        }
    }

    tracing::info!(
        applied = summary.applied,
        failed = summary.failed.len(),
        "Journal replay complete"
    );
    summary
}

async fn apply<O, P, E>(
    service: &OrderService<O, P, E>,
    command: JournalCommand,
) -> Result<(), EngineError>
where
    O: OrderRepository,
    P: PositionRepository,
    E: EventPublisherPort,
{
    match command {
        JournalCommand::Place(dto) => {
            service.place_order(dto.into_command()).await?;
        }
        JournalCommand::Submit {
            order_id,
            broker_order_id,
        } => {
            service.submit(&order_id, broker_order_id).await?;
        }
        JournalCommand::Fill {
            order_id,
            quantity,
            price,
            commission,
            fill_id,
            timestamp,
        } => {
            let mut fill = Fill::new(quantity, price).with_commission(commission);
            if let Some(id) = fill_id {
                fill = fill.with_id(id);
            }
            if let Some(at) = timestamp {
                fill = fill.at(at);
            }
            service.record_fill(&order_id, fill).await?;
        }
        JournalCommand::Cancel { order_id, reason } => {
            service.cancel(&order_id, reason).await?;
        }
        JournalCommand::Reject { order_id, reason } => {
            service.reject(&order_id, reason).await?;
        }
        JournalCommand::Mark {
            user_id,
            symbol,
            price,
        } => {
            service
                .positions()
                .mark_to_market(&user_id, &symbol, price)
                .await?;
        }
    }
    Ok(())
}
