//! Watch command - stream network state changes.

use clap::Args;
use netwatch::{
    AddressRecord, ChangeAction, Error, LinkRecord, Nl80211Listener, Observer, Result,
    RouteRecord, RtnlListener, WlanEvent,
};

#[derive(Args)]
pub struct WatchArgs {
    /// Skip wireless (nl80211) monitoring even when available
    #[arg(long)]
    pub no_wireless: bool,
}

/// Observer that prints every change as a line of text or JSON.
struct Printer {
    json: bool,
}

impl Observer for Printer {
    fn link_change(&mut self, action: ChangeAction, link: LinkRecord) -> Result<()> {
        if self.json {
            let line = serde_json::json!({
                "kind": "link",
                "action": action,
                "record": link,
            });
            println!("{line}");
        } else {
            println!(
                "LINK  {:<6} ifindex={} name={} flags=0x{:x}",
                action.as_str(),
                link.ifindex,
                link.name.as_deref().unwrap_or("?"),
                link.flags,
            );
        }
        Ok(())
    }

    fn addr_change(&mut self, action: ChangeAction, addr: AddressRecord) -> Result<()> {
        if self.json {
            let line = serde_json::json!({
                "kind": "addr",
                "action": action,
                "record": addr,
            });
            println!("{line}");
        } else {
            println!(
                "ADDR  {:<6} ifindex={} local={}",
                action.as_str(),
                addr.ifindex,
                addr.local.as_deref().unwrap_or("?"),
            );
        }
        Ok(())
    }

    fn route_change(&mut self, action: ChangeAction, route: RouteRecord) -> Result<()> {
        if self.json {
            let line = serde_json::json!({
                "kind": "route",
                "action": action,
                "record": route,
            });
            println!("{line}");
        } else {
            println!(
                "ROUTE {:<6} table={} dst={} ifindex={}",
                action.as_str(),
                route.table,
                route.dst,
                route.ifindex,
            );
        }
        Ok(())
    }

    fn wlan_event(&mut self, event: WlanEvent) -> Result<()> {
        if self.json {
            let line = serde_json::json!({
                "kind": "wlan",
                "record": event,
            });
            println!("{line}");
        } else {
            match &event.ssids {
                Some(ssids) => {
                    println!(
                        "WLAN  {:<18} ifindex={} ({} networks)",
                        event.command,
                        event.ifindex,
                        ssids.len(),
                    );
                    for entry in ssids {
                        println!(
                            "      {} [{}]",
                            String::from_utf8_lossy(&entry.ssid),
                            entry.status.as_str(),
                        );
                    }
                }
                None => {
                    println!("WLAN  {:<18} ifindex={}", event.command, event.ifindex);
                }
            }
        }
        Ok(())
    }
}

pub async fn run(args: WatchArgs, json: bool) -> Result<()> {
    let mut rtnl = RtnlListener::start(Printer { json }).await?;

    // Wireless is best-effort: machines without an nl80211 stack still
    // get link/address/route monitoring.
    let mut wifi = if args.no_wireless {
        None
    } else {
        match Nl80211Listener::start(Printer { json }).await {
            Ok(listener) => Some(listener),
            Err(Error::FamilyNotFound { name }) => {
                tracing::warn!(family = %name, "wireless unavailable, continuing without");
                None
            }
            Err(err) => return Err(err),
        }
    };

    loop {
        match &mut wifi {
            Some(wlan) => {
                tokio::select! {
                    ready = rtnl.readable() => {
                        ready?;
                        if let Err(err) = rtnl.pump() {
                            tracing::warn!(%err, "rtnetlink pump error");
                        }
                    }
                    ready = wlan.readable() => {
                        ready?;
                        if let Err(err) = wlan.pump().await {
                            tracing::warn!(%err, "nl80211 pump error");
                        }
                    }
                }
            }
            None => {
                rtnl.readable().await?;
                if let Err(err) = rtnl.pump() {
                    tracing::warn!(%err, "rtnetlink pump error");
                }
            }
        }
    }
}
