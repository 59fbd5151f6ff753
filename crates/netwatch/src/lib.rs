//! Live kernel network-state monitoring over netlink.
//!
//! This crate watches the kernel's networking state (links, addresses,
//! routes, and wireless scan/association activity) and delivers structured
//! change records to a caller-supplied observer. It also exposes a small
//! control surface: toggling link administrative flags, triggering wireless
//! scans, and dumping scan results.
//!
//! Two listeners do the work:
//!
//! - [`RtnlListener`] subscribes to RTNetlink link/address/route multicast
//!   groups and replays the current kernel state as `NEW` events on startup.
//! - [`Nl80211Listener`] resolves the `nl80211` generic-netlink family at
//!   runtime, subscribes to its `scan` and `mlme` groups, and decodes
//!   wireless events including BSS information elements.
//!
//! Both are driven by an external readiness loop: poll [`fileno`] (or await
//! `readable`), then call `pump` to drain pending notifications. An error
//! returned by an observer callback is captured in a single-slot fault store
//! and returned by that `pump` call, after which delivery resumes normally.
//!
//! [`fileno`]: RtnlListener::fileno
//!
//! # Example
//!
//! ```ignore
//! use netwatch::{ChangeAction, LinkRecord, Observer, Result, RtnlListener};
//!
//! struct Print;
//!
//! impl Observer for Print {
//!     fn link_change(&mut self, action: ChangeAction, link: LinkRecord) -> Result<()> {
//!         println!("{} link {}", action.as_str(), link.ifindex);
//!         Ok(())
//!     }
//!     // ...
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let mut listener = RtnlListener::start(Print).await?;
//!     loop {
//!         listener.readable().await?;
//!         listener.pump()?;
//!     }
//! }
//! ```

pub mod netlink;

// Re-export common types at crate root for convenience
pub use netlink::nl80211::Nl80211Listener;
pub use netlink::observe::{
    AddressRecord, BssStatus, ChangeAction, LinkRecord, Observer, RouteRecord, ScanEntry,
    WlanEvent,
};
pub use netlink::rtnl::RtnlListener;
pub use netlink::{Error, NetlinkSocket, Protocol, Result};
