//! RTNetlink fixed headers and record decoding.

use std::net::{Ipv4Addr, Ipv6Addr};

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::netlink::attr::{AttrIter, get};
use crate::netlink::observe::{AddressRecord, LinkRecord, RouteRecord};

/// Interface info message header (mirrors struct ifinfomsg).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct IfInfoMsg {
    pub ifi_family: u8,
    pub _ifi_pad: u8,
    /// ARP hardware type.
    pub ifi_type: u16,
    pub ifi_index: i32,
    pub ifi_flags: u32,
    /// Mask of flags a change request applies to.
    pub ifi_change: u32,
}

/// Interface address message header (mirrors struct ifaddrmsg).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct IfAddrMsg {
    pub ifa_family: u8,
    pub ifa_prefixlen: u8,
    pub ifa_flags: u8,
    pub ifa_scope: u8,
    pub ifa_index: u32,
}

/// Route message header (mirrors struct rtmsg).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct RtMsg {
    pub rtm_family: u8,
    pub rtm_dst_len: u8,
    pub rtm_src_len: u8,
    pub rtm_tos: u8,
    pub rtm_table: u8,
    pub rtm_protocol: u8,
    pub rtm_scope: u8,
    pub rtm_type: u8,
    pub rtm_flags: u32,
}

/// Link attributes (IFLA_*).
pub mod ifla {
    pub const IFNAME: u16 = 3;
}

/// Address attributes (IFA_*).
pub mod ifa {
    pub const ADDRESS: u16 = 1;
    pub const LOCAL: u16 = 2;
    /// 32-bit flags, overrides the 8-bit header field when present.
    pub const FLAGS: u16 = 8;
}

/// Route attributes (RTA_*).
pub mod rta {
    pub const DST: u16 = 1;
    pub const OIF: u16 = 4;
    pub const GATEWAY: u16 = 5;
    pub const MULTIPATH: u16 = 9;
    /// 32-bit table id, overrides the 8-bit header field when present.
    pub const TABLE: u16 = 15;
}

/// Size of struct rtnexthop (len, flags, hops, ifindex).
const RTNH_LEN: usize = 8;

/// Decode a link notification payload. `None` means the payload could not
/// be decoded and the message should be skipped.
pub fn parse_link(payload: &[u8]) -> Option<LinkRecord> {
    let (ifi, attrs) = IfInfoMsg::read_from_prefix(payload).ok()?;

    let mut name = None;
    for (kind, data) in AttrIter::new(attrs) {
        if kind == ifla::IFNAME {
            name = get::string(data).ok().map(str::to_owned);
        }
    }

    Some(LinkRecord {
        ifindex: ifi.ifi_index,
        flags: ifi.ifi_flags,
        arptype: ifi.ifi_type,
        family: ifi.ifi_family,
        name,
    })
}

/// Decode an address notification payload.
pub fn parse_addr(payload: &[u8]) -> Option<AddressRecord> {
    let (hdr, attrs) = IfAddrMsg::read_from_prefix(payload).ok()?;

    let mut flags = hdr.ifa_flags as u32;
    let mut local = None;
    let mut address = None;
    for (kind, data) in AttrIter::new(attrs) {
        match kind {
            ifa::LOCAL => local = format_addr(hdr.ifa_family, data),
            ifa::ADDRESS => address = format_addr(hdr.ifa_family, data),
            ifa::FLAGS => {
                if let Ok(f) = get::u32_ne(data) {
                    flags = f;
                }
            }
            _ => {}
        }
    }

    // Point-to-point interfaces carry the peer in IFA_ADDRESS and the
    // local address in IFA_LOCAL; everywhere else they coincide.
    let local = local.or(address).map(|a| format!("{}/{}", a, hdr.ifa_prefixlen));

    Some(AddressRecord {
        ifindex: hdr.ifa_index as i32,
        flags,
        family: hdr.ifa_family,
        scope: hdr.ifa_scope,
        local,
    })
}

/// Decode a route notification payload.
pub fn parse_route(payload: &[u8]) -> Option<RouteRecord> {
    let (hdr, attrs) = RtMsg::read_from_prefix(payload).ok()?;

    let mut table = hdr.rtm_table as u32;
    let mut dst = None;
    let mut oif = None;
    let mut nexthop = None;
    for (kind, data) in AttrIter::new(attrs) {
        match kind {
            rta::DST => {
                dst = format_addr(hdr.rtm_family, data)
                    .map(|a| format!("{}/{}", a, hdr.rtm_dst_len));
            }
            rta::OIF => oif = get::i32_ne(data).ok(),
            rta::MULTIPATH => nexthop = first_nexthop_ifindex(data),
            rta::TABLE => {
                if let Ok(t) = get::u32_ne(data) {
                    table = t;
                }
            }
            _ => {}
        }
    }

    Some(RouteRecord {
        family: hdr.rtm_family,
        route_type: hdr.rtm_type,
        table,
        dst: dst.unwrap_or_else(|| "default".to_owned()),
        ifindex: oif.or(nexthop).unwrap_or(-1),
    })
}

/// First next hop's interface index from an RTA_MULTIPATH payload.
///
/// Multipath routes get only their first next hop reported. That is a
/// deliberate narrowing carried over from the consumers of this crate,
/// which treat such routes as single-homed.
fn first_nexthop_ifindex(data: &[u8]) -> Option<i32> {
    if data.len() < RTNH_LEN {
        return None;
    }
    // rtnh_ifindex sits after len (u16), flags (u8), hops (u8).
    get::i32_ne(&data[4..8]).ok()
}

fn format_addr(family: u8, data: &[u8]) -> Option<String> {
    match family as i32 {
        libc::AF_INET if data.len() >= 4 => {
            let octets: [u8; 4] = data[..4].try_into().ok()?;
            Some(Ipv4Addr::from(octets).to_string())
        }
        libc::AF_INET6 if data.len() >= 16 => {
            let octets: [u8; 16] = data[..16].try_into().ok()?;
            Some(Ipv6Addr::from(octets).to_string())
        }
        _ => None,
    }
}
