//! Watch command - long-lived cache that re-reads keys on an interval

use std::collections::BTreeMap;
use std::time::Duration;

use clap::Args;
use tracing::{error, info, warn};

use super::KeyArgs;
use crate::domain::FallbackPolicy;
use crate::infrastructure::cache::ExpiringConfigCache;
use crate::infrastructure::source::SourceFactory;

/// Arguments for the watch command
#[derive(Args, Clone, Debug)]
pub struct WatchArgs {
    #[command(flatten)]
    pub keys: KeyArgs,

    /// Seconds between reads
    #[arg(long, default_value_t = 30)]
    pub interval_secs: u64,

    /// Cache expiry in milliseconds (overrides config)
    #[arg(long, allow_hyphen_values = true)]
    pub expiry_ms: Option<i64>,

    /// Behaviour when a refresh fails: fail_soft or fail_hard (overrides config)
    #[arg(long)]
    pub fallback: Option<FallbackPolicy>,
}

/// Read every key each interval, printing a JSON line when values change
pub async fn run(args: WatchArgs) -> anyhow::Result<()> {
    let config = super::bootstrap();
    let keys = args.keys.resolve(&config)?;

    let source = SourceFactory::create(&config.source).await?;
    let cache = ExpiringConfigCache::builder(source, keys)
        .expiry_ms(args.expiry_ms.unwrap_or(config.cache.expiry_ms))
        .policy(args.fallback.unwrap_or(config.cache.fallback))
        .build()?;

    cache.on_refresh(|| info!("Config values refreshed"));
    cache.on_refresh_error(|e| warn!(error = %e, "Config refresh failed, serving cached values"));

    info!(
        keys = %cache.key_set(),
        expiry_ms = %cache.expiry().as_millis(),
        policy = %cache.policy(),
        "Watching parameter store keys"
    );

    let mut ticker = tokio::time::interval(Duration::from_secs(args.interval_secs.max(1)));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut last: Option<BTreeMap<String, String>> = None;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match cache.values().await {
                    Ok(values) => {
                        let values: BTreeMap<String, String> = values.into_iter().collect();
                        if last.as_ref() != Some(&values) {
                            println!("{}", serde_json::to_string(&values)?);
                            last = Some(values);
                        }
                    }
                    Err(e) => error!(error = %e, "Failed to read config values"),
                }
            }
            _ = &mut shutdown => {
                info!("Shutting down");
                break;
            }
        }
    }

    Ok(())
}
