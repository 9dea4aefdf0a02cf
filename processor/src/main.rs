use market_db::{
    entity::{EvmCallTraces, EvmLogs},
    initialize_database,
};
use redis_client::RedisPublisher;
use service::process_pending;
use std::{env, error::Error};
use tokio::time::{sleep, Duration};

mod error;
mod events;
mod exchange;
pub mod handlers;
mod ids;
mod redis_client;
mod service;
mod utils;

mod defaults {
    pub const POLL_INTERVAL: &str = "10";
    pub const BATCH_SIZE: &str = "25";
    /// Legacy exchange (Wyvern v1) mainnet deployment
    pub const EXCHANGE_ADDRESS: &str = "0x7Be8076f4EA4A4AD08075C2508e481d6C946D12b";
    /// The exchange's atomicizer contract; bundle sales delegate through it
    pub const ATOMICIZER_ADDRESS: &str = "0xC99f70bFD82fb7c8f8191fdfbFB735606b15e5c5";
    pub const EXCHANGE_TAG: &str = "wyvern_v1";
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    println!("Starting marketplace sale processor (Dual-Write: Postgres + Redis)...");

    // Initialize database connection
    let db_pool = initialize_database().await?;
    println!("Connected to Postgres");

    // Initialize Redis publisher
    let mut redis = RedisPublisher::new().await?;

    let poll_interval = env::var("POLL_INTERVAL")
        .or::<String>(Ok(defaults::POLL_INTERVAL.into()))?
        .parse::<u64>()?;

    let sleep_duration = Duration::from_secs(poll_interval);

    let ctx = handlers::HandlerContext::new(
        db_pool.clone(),
        env::var("EXCHANGE_ADDRESS").unwrap_or(String::from(defaults::EXCHANGE_ADDRESS)),
        env::var("BUNDLE_ATOMICIZER_ADDRESS")
            .unwrap_or(String::from(defaults::ATOMICIZER_ADDRESS)),
        env::var("EXCHANGE_TAG").unwrap_or(String::from(defaults::EXCHANGE_TAG)),
    );

    println!("Processor started. Polling every {} seconds...", poll_interval);

    loop {
        let pending = match (
            EvmLogs::count(&db_pool).await,
            EvmCallTraces::count(&db_pool).await,
        ) {
            (Ok(logs), Ok(traces)) => logs.unwrap_or(0) + traces.unwrap_or(0),
            (Err(err), _) | (_, Err(err)) => {
                eprintln!(
                    "Error counting unprocessed work: {err}. Sleeping for {} seconds...",
                    sleep_duration.as_secs()
                );

                sleep(sleep_duration).await;
                continue;
            }
        };

        if pending > 0 {
            println!("Found {pending} unprocessed items. Processing...");

            if let Err(err) = process_pending(&ctx, &mut redis).await {
                eprintln!("Error processing queue: {err}");
            }
        } else {
            println!(
                "No unprocessed work. Sleeping for {} seconds...",
                sleep_duration.as_secs()
            );
            sleep(sleep_duration).await;
        }
    }
}
