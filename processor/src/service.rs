use market_db::entity::{evm_call_traces::EvmCallTraces, evm_logs::EvmLogs};
use std::{env, error::Error};

use crate::{
    defaults,
    events::{self, MarketEvent},
    handlers::{self, HandlerContext},
    redis_client::{channels, RedisPublisher},
};

/// Drain queued logs and call traces: decode, handle, dual-write to Redis.
///
/// A decode failure or handler skip still consumes the queue row: every
/// failure mode degrades to "this event produced no state change". Redis
/// publish errors never fail the batch.
pub async fn process_pending(
    ctx: &HandlerContext,
    redis: &mut RedisPublisher,
) -> Result<(), Box<dyn Error>> {
    let batch_size = env::var("BATCH_SIZE")
        .or::<String>(Ok(defaults::BATCH_SIZE.into()))?
        .parse::<i32>()?;

    let unprocessed_logs = EvmLogs::find_all(batch_size, &ctx.db_pool).await?;

    for log in unprocessed_logs {
        let log_id = log.id;

        match events::decode_event(&log) {
            Ok(MarketEvent::Transfer(event)) => {
                if let Err(e) = handlers::transfer::handle(ctx, &event).await {
                    eprintln!("Transfer handler error (log_id={}): {}", log_id, e);
                } else {
                    publish(redis, channels::TRANSFER, &event).await;
                }
            }
            Ok(MarketEvent::OrdersMatched(event)) => {
                if let Err(e) = handlers::orders_matched::handle(ctx, &event).await {
                    eprintln!("Settlement handler error (log_id={}): {}", log_id, e);
                } else {
                    publish(redis, channels::SETTLEMENT, &event).await;
                }
            }
            Err(e) => {
                // Log unknown/undecodable events but don't fail
                eprintln!("Event decode skipped (log_id={}): {}", log_id, e);
            }
        }

        // Delete from the queue (processed, skipped included)
        if let Err(error) = EvmLogs::delete(log_id, &ctx.db_pool).await {
            eprintln!("Error deleting log {}: {}", log_id, error);
        }
    }

    let unprocessed_traces = EvmCallTraces::find_all(batch_size, &ctx.db_pool).await?;

    for trace in unprocessed_traces {
        let trace_id = trace.id;

        match events::atomic_match::decode(&trace) {
            Ok(event) => match handlers::atomic_match::handle(ctx, &event).await {
                Ok(Some(sale)) => publish(redis, channels::SALE, &sale).await,
                Ok(None) => {}
                Err(e) => {
                    eprintln!("Atomic match handler error (trace_id={}): {}", trace_id, e);
                }
            },
            Err(e) => {
                eprintln!("Call decode skipped (trace_id={}): {}", trace_id, e);
            }
        }

        if let Err(error) = EvmCallTraces::delete(trace_id, &ctx.db_pool).await {
            eprintln!("Error deleting call trace {}: {}", trace_id, error);
        }
    }

    Ok(())
}

async fn publish<T: serde::Serialize>(redis: &mut RedisPublisher, channel: &str, value: &T) {
    let payload = match serde_json::to_string(value) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Payload serialization error: {}", e);
            return;
        }
    };

    match redis.publish(channel, &payload).await {
        Ok(_) => {
            println!("Published to {}: {} bytes", channel, payload.len());
        }
        Err(e) => {
            eprintln!("Redis publish error: {}", e);
            // Continue processing - don't fail the whole batch for Redis errors
        }
    }
}
