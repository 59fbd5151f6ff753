//! Netlink protocol plumbing and the two kernel-state listeners.

pub mod attr;
pub mod builder;
pub mod error;
pub mod exchange;
pub mod genl;
pub mod message;
pub mod nl80211;
pub mod observe;
pub mod rtnl;
pub mod socket;

pub(crate) mod fault;

#[cfg(test)]
pub(crate) mod fixtures;

pub use error::{Error, Result};
pub use socket::{NetlinkSocket, Protocol};
