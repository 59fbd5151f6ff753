//! Change records and the observer contract.
//!
//! Every kernel notification is decoded into one of the record types below
//! and handed to the registered [`Observer`] exactly once, in arrival order.
//! Records are plain values: the listener keeps no reference after delivery.

use serde::{Serialize, Serializer};

use super::error::Result;

/// The kind of change a notification reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeAction {
    Unspec,
    New,
    Del,
    Get,
    Set,
    Change,
}

impl ChangeAction {
    /// Mnemonic used in textual output.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeAction::Unspec => "UNSPEC",
            ChangeAction::New => "NEW",
            ChangeAction::Del => "DEL",
            ChangeAction::Get => "GET",
            ChangeAction::Set => "SET",
            ChangeAction::Change => "CHANGE",
        }
    }
}

/// A network interface's administrative/operational state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkRecord {
    pub ifindex: i32,
    pub flags: u32,
    pub arptype: u16,
    pub family: u8,
    pub name: Option<String>,
}

/// One assigned address on an interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressRecord {
    pub ifindex: i32,
    pub flags: u32,
    pub family: u8,
    pub scope: u8,
    /// Local address as "addr/prefixlen", when one was carried.
    pub local: Option<String>,
}

/// One routing table entry.
///
/// For multipath routes only the first next hop's interface index is
/// reported; `ifindex` is -1 when no next hop resolved at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteRecord {
    pub family: u8,
    pub route_type: u8,
    pub table: u32,
    /// Destination as "addr/prefixlen", or "default" when unspecified.
    pub dst: String,
    pub ifindex: i32,
}

/// Connection status of a scanned BSS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BssStatus {
    Connected,
    Authenticated,
    Joined,
    #[serde(rename = "no status")]
    NoStatus,
}

impl BssStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BssStatus::Connected => "Connected",
            BssStatus::Authenticated => "Authenticated",
            BssStatus::Joined => "Joined",
            BssStatus::NoStatus => "no status",
        }
    }
}

/// One BSS from a wireless scan dump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanEntry {
    /// Raw SSID bytes from the SSID information element. Not guaranteed
    /// to be UTF-8; serialized lossily.
    #[serde(serialize_with = "ser_ssid")]
    pub ssid: Vec<u8>,
    pub status: BssStatus,
}

fn ser_ssid<S: Serializer>(ssid: &[u8], ser: S) -> std::result::Result<S::Ok, S::Error> {
    ser.serialize_str(&String::from_utf8_lossy(ssid))
}

/// A decoded nl80211 event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WlanEvent {
    /// Kernel command mnemonic, "UNKNOWN" for commands this crate does not
    /// have a name for.
    pub command: String,
    /// Interface the event concerns, -1 when the kernel did not say.
    pub ifindex: i32,
    /// Scan results attached to scan/association events.
    pub ssids: Option<Vec<ScanEntry>>,
}

/// Contract implemented by the consumer of both listeners.
///
/// An `Err` returned from any method is captured as that listener's fault
/// and replayed by the pump call that was draining the socket; no further
/// callbacks run until the fault is drained.
pub trait Observer {
    fn link_change(&mut self, action: ChangeAction, link: LinkRecord) -> Result<()>;
    fn addr_change(&mut self, action: ChangeAction, addr: AddressRecord) -> Result<()>;
    fn route_change(&mut self, action: ChangeAction, route: RouteRecord) -> Result<()>;
    fn wlan_event(&mut self, event: WlanEvent) -> Result<()>;
}
