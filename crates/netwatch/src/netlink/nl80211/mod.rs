//! nl80211 (wireless) protocol definitions and decoding.

mod listener;

pub use listener::Nl80211Listener;

use super::attr::{AttrIter, get};
use super::genl::{GENL_HDRLEN, GenlMsgHdr};
use super::observe::{BssStatus, ScanEntry};
use zerocopy::FromBytes;

/// nl80211 commands used on the control surface.
pub mod cmd {
    pub const GET_INTERFACE: u8 = 5;
    pub const NEW_INTERFACE: u8 = 7;
    pub const GET_SCAN: u8 = 32;
    pub const TRIGGER_SCAN: u8 = 33;
    pub const NEW_SCAN_RESULTS: u8 = 34;
    pub const ASSOCIATE: u8 = 38;
}

/// nl80211 attributes.
pub mod attr {
    pub const IFINDEX: u16 = 3;
    pub const SCAN_SSIDS: u16 = 45;
    pub const BSS: u16 = 47;
}

/// Nested BSS attributes.
pub mod bss {
    pub const BSSID: u16 = 1;
    pub const INFORMATION_ELEMENTS: u16 = 6;
    pub const STATUS: u16 = 9;

    // NL80211_BSS_STATUS values
    pub const STATUS_AUTHENTICATED: u32 = 0;
    pub const STATUS_ASSOCIATED: u32 = 1;
    pub const STATUS_IBSS_JOINED: u32 = 2;
}

/// Information element tag for the SSID.
pub const IE_SSID: u8 = 0;

/// Command mnemonics, in kernel enum order.
const COMMAND_NAMES: &[&str] = &[
    "UNSPEC",
    "GET_WIPHY",
    "SET_WIPHY",
    "NEW_WIPHY",
    "DEL_WIPHY",
    "GET_INTERFACE",
    "SET_INTERFACE",
    "NEW_INTERFACE",
    "DEL_INTERFACE",
    "GET_KEY",
    "SET_KEY",
    "NEW_KEY",
    "DEL_KEY",
    "GET_BEACON",
    "SET_BEACON",
    "START_AP",
    "STOP_AP",
    "GET_STATION",
    "SET_STATION",
    "NEW_STATION",
    "DEL_STATION",
    "GET_MPATH",
    "SET_MPATH",
    "NEW_MPATH",
    "DEL_MPATH",
    "SET_BSS",
    "SET_REG",
    "REQ_SET_REG",
    "GET_MESH_CONFIG",
    "SET_MESH_CONFIG",
    "SET_MGMT_EXTRA_IE",
    "GET_REG",
    "GET_SCAN",
    "TRIGGER_SCAN",
    "NEW_SCAN_RESULTS",
    "SCAN_ABORTED",
    "REG_CHANGE",
    "AUTHENTICATE",
    "ASSOCIATE",
    "DEAUTHENTICATE",
    "DISASSOCIATE",
    "MICHAEL_MIC_FAILURE",
    "REG_BEACON_HINT",
    "JOIN_IBSS",
    "LEAVE_IBSS",
    "TESTMODE",
    "CONNECT",
    "ROAM",
    "DISCONNECT",
    "SET_WIPHY_NETNS",
    "GET_SURVEY",
    "NEW_SURVEY_RESULTS",
    "SET_PMKSA",
    "DEL_PMKSA",
    "FLUSH_PMKSA",
    "REMAIN_ON_CHANNEL",
    "CANCEL_REMAIN_ON_CHANNEL",
    "SET_TX_BITRATE_MASK",
    "REGISTER_FRAME",
    "FRAME",
    "FRAME_TX_STATUS",
    "SET_POWER_SAVE",
    "GET_POWER_SAVE",
    "SET_CQM",
    "NOTIFY_CQM",
    "SET_CHANNEL",
    "SET_WDS_PEER",
    "FRAME_WAIT_CANCEL",
    "JOIN_MESH",
    "LEAVE_MESH",
    "UNPROT_DEAUTHENTICATE",
    "UNPROT_DISASSOCIATE",
    "NEW_PEER_CANDIDATE",
    "GET_WOWLAN",
    "SET_WOWLAN",
    "START_SCHED_SCAN",
    "STOP_SCHED_SCAN",
    "SCHED_SCAN_RESULTS",
    "SCHED_SCAN_STOPPED",
    "SET_REKEY_OFFLOAD",
    "PMKSA_CANDIDATE",
    "TDLS_OPER",
    "TDLS_MGMT",
    "UNEXPECTED_FRAME",
    "PROBE_CLIENT",
    "REGISTER_BEACONS",
    "UNEXPECTED_4ADDR_FRAME",
    "SET_NOACK_MAP",
    "CH_SWITCH_NOTIFY",
    "START_P2P_DEVICE",
    "STOP_P2P_DEVICE",
    "CONN_FAILED",
    "SET_MCAST_RATE",
    "SET_MAC_ACL",
    "RADAR_DETECT",
    "GET_PROTOCOL_FEATURES",
    "UPDATE_FT_IES",
    "FT_EVENT",
    "CRIT_PROTOCOL_START",
    "CRIT_PROTOCOL_STOP",
    "GET_COALESCE",
    "SET_COALESCE",
    "CHANNEL_SWITCH",
    "VENDOR",
    "SET_QOS_MAP",
];

/// Mnemonic for an nl80211 command. Commands past the known range are
/// reported as "UNKNOWN", never an error.
pub fn command_name(cmd: u8) -> &'static str {
    COMMAND_NAMES.get(cmd as usize).copied().unwrap_or("UNKNOWN")
}

/// Decode an nl80211 event payload into (command, ifindex).
///
/// `ifindex` is -1 when the event carries no NL80211_ATTR_IFINDEX.
/// `None` means the payload is too short to hold a GENL header.
pub(crate) fn parse_event(payload: &[u8]) -> Option<(u8, i32)> {
    let (genl, attrs) = GenlMsgHdr::read_from_prefix(payload).ok()?;

    let mut ifindex = -1;
    for (kind, data) in AttrIter::new(attrs) {
        if kind == attr::IFINDEX
            && let Ok(idx) = get::u32_ne(data)
        {
            ifindex = idx as i32;
        }
    }

    Some((genl.cmd, ifindex))
}

/// Find the first information element with the given tag in a raw IE
/// buffer. Elements are framed linearly as [tag, len, data]; a truncated
/// element ends the scan.
pub fn find_ie(ies: &[u8], tag: u8) -> Option<&[u8]> {
    let mut pos = 0;
    while pos + 1 < ies.len() {
        let len = ies[pos + 1] as usize;
        if pos + 2 + len > ies.len() {
            break;
        }
        if ies[pos] == tag {
            return Some(&ies[pos + 2..pos + 2 + len]);
        }
        pos += 2 + len;
    }
    None
}

/// Decode one NL80211_ATTR_BSS payload into a scan entry.
///
/// An entry without a status attribute is dropped entirely when
/// `only_connected` is set. A BSS whose information elements carry no
/// decodable SSID is dropped; entries already collected are unaffected.
pub(crate) fn parse_bss(payload: &[u8], only_connected: bool) -> Option<ScanEntry> {
    let mut status = None;
    let mut ies: Option<&[u8]> = None;

    for (kind, data) in AttrIter::new(payload) {
        match kind {
            bss::STATUS => status = get::u32_ne(data).ok(),
            bss::INFORMATION_ELEMENTS => ies = Some(data),
            _ => {}
        }
    }

    let status = match status {
        Some(bss::STATUS_ASSOCIATED) => BssStatus::Connected,
        Some(bss::STATUS_AUTHENTICATED) => BssStatus::Authenticated,
        Some(bss::STATUS_IBSS_JOINED) => BssStatus::Joined,
        Some(_) => BssStatus::NoStatus,
        None if only_connected => return None,
        None => BssStatus::NoStatus,
    };

    let ssid = find_ie(ies?, IE_SSID)?;

    Some(ScanEntry {
        ssid: ssid.to_vec(),
        status,
    })
}
