//! Get command - one-shot read of a set of keys

use std::collections::BTreeMap;

use clap::Args;

use super::KeyArgs;
use crate::infrastructure::cache::batch_read;
use crate::infrastructure::source::SourceFactory;

/// Arguments for the get command
#[derive(Args, Clone, Debug)]
pub struct GetArgs {
    #[command(flatten)]
    pub keys: KeyArgs,
}

/// Read every key once and print a JSON object to stdout
pub async fn run(args: GetArgs) -> anyhow::Result<()> {
    let config = super::bootstrap();
    let keys = args.keys.resolve(&config)?;

    let source = SourceFactory::create(&config.source).await?;
    let values: BTreeMap<String, String> = batch_read(source, keys).await?.into_iter().collect();

    println!("{}", serde_json::to_string_pretty(&values)?);
    Ok(())
}
