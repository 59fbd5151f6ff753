//! Scan command - trigger a wireless scan and print the results.

use std::time::Duration;

use clap::Args;
use netwatch::{Nl80211Listener, Result};

use crate::Silent;

#[derive(Args)]
pub struct ScanArgs {
    /// Interface index of the wireless device
    #[arg(short, long)]
    pub ifindex: i32,

    /// Seconds to wait for the scan to complete
    #[arg(long, default_value_t = 3)]
    pub wait: u64,

    /// Only show networks we are connected or authenticated to
    #[arg(long)]
    pub connected: bool,
}

pub async fn run(args: ScanArgs, json: bool) -> Result<()> {
    let listener = Nl80211Listener::start(Silent).await?;

    listener.trigger_scan(args.ifindex).await?;
    tokio::time::sleep(Duration::from_secs(args.wait)).await;

    let entries = listener
        .dump_scan_results(args.ifindex, args.connected)
        .await?;

    if json {
        println!("{}", serde_json::to_string(&entries).unwrap());
    } else {
        for entry in &entries {
            println!(
                "{} [{}]",
                String::from_utf8_lossy(&entry.ssid),
                entry.status.as_str(),
            );
        }
    }

    Ok(())
}
