//! Netlink message fixtures for testing.
//!
//! Notification payloads are spelled out byte by byte so the tests double
//! as wire-format documentation; control messages and generic-netlink
//! blobs are assembled with [`MessageBuilder`] and stripped of the outer
//! header where only the payload is under test.

use crate::netlink::builder::MessageBuilder;
use crate::netlink::genl::{CtrlAttr, CtrlAttrMcastGrp, GenlMsgHdr};
use crate::netlink::message::{NLMSG_HDRLEN, NlMsgHdr, NlMsgType};
use crate::netlink::nl80211::{IE_SSID, attr as nlattr80211, bss};

/// Wrap a payload in a netlink message with the given type and sequence.
pub fn message(msg_type: u16, seq: u32, payload: &[u8]) -> Vec<u8> {
    let mut builder = MessageBuilder::new(msg_type, 0);
    builder.append_bytes(payload);
    builder.set_seq(seq);
    builder.finish()
}

/// NLMSG_ERROR carrying a kernel error code (negative errno).
pub fn error_message(seq: u32, code: i32) -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend_from_slice(&code.to_ne_bytes());
    payload.extend_from_slice(NlMsgHdr::new(0, 0).as_bytes());
    message(NlMsgType::ERROR, seq, &payload)
}

/// NLMSG_ERROR with code 0: an ACK.
pub fn ack_message(seq: u32) -> Vec<u8> {
    error_message(seq, 0)
}

/// NLMSG_DONE ending a multi-part dump.
pub fn done_message(seq: u32) -> Vec<u8> {
    message(NlMsgType::DONE, seq, &0i32.to_ne_bytes())
}

/// Link message payload for an ethernet interface.
pub fn link_eth0() -> Vec<u8> {
    vec![
        // ifinfomsg: family=0, pad=0, type=1 (ARPHRD_ETHER), index=2,
        // flags=0x11043 (UP|BROADCAST|RUNNING|MULTICAST|LOWER_UP), change=0
        0x00, 0x00, // family, pad
        0x01, 0x00, // type = 1 (ARPHRD_ETHER)
        0x02, 0x00, 0x00, 0x00, // index = 2
        0x43, 0x10, 0x01, 0x00, // flags = 0x11043
        0x00, 0x00, 0x00, 0x00, // change = 0
        // IFLA_IFNAME = "eth0"
        0x09, 0x00, // len = 9
        0x03, 0x00, // type = IFLA_IFNAME (3)
        b'e', b't', b'h', b'0', 0x00, // "eth0\0"
        0x00, 0x00, 0x00, // padding
    ]
}

/// Link message payload for a wireless interface (down).
pub fn link_wlan0() -> Vec<u8> {
    vec![
        // ifinfomsg: family=0, pad=0, type=1, index=3, flags=0x1002 (BROADCAST|MULTICAST), change=0
        0x00, 0x00, // family, pad
        0x01, 0x00, // type = 1 (ARPHRD_ETHER)
        0x03, 0x00, 0x00, 0x00, // index = 3
        0x02, 0x10, 0x00, 0x00, // flags = 0x1002
        0x00, 0x00, 0x00, 0x00, // change = 0
        // IFLA_IFNAME = "wlan0"
        0x0a, 0x00, // len = 10
        0x03, 0x00, // type = IFLA_IFNAME (3)
        b'w', b'l', b'a', b'n', b'0', 0x00, // "wlan0\0"
        0x00, 0x00, // padding
    ]
}

/// Address message payload for 192.168.1.10/24 on ifindex 2.
///
/// Carries an IFA_FLAGS attribute (0x181) that must override the 8-bit
/// header flags (0x80).
pub fn addr_eth0_v4() -> Vec<u8> {
    vec![
        // ifaddrmsg: family=AF_INET, prefixlen=24, flags=0x80, scope=0, index=2
        0x02, // family = AF_INET
        0x18, // prefixlen = 24
        0x80, // flags = IFA_F_PERMANENT
        0x00, // scope = RT_SCOPE_UNIVERSE
        0x02, 0x00, 0x00, 0x00, // index = 2
        // IFA_ADDRESS = 192.168.1.10
        0x08, 0x00, // len = 8
        0x01, 0x00, // type = IFA_ADDRESS (1)
        0xc0, 0xa8, 0x01, 0x0a, // 192.168.1.10
        // IFA_LOCAL = 192.168.1.10
        0x08, 0x00, // len = 8
        0x02, 0x00, // type = IFA_LOCAL (2)
        0xc0, 0xa8, 0x01, 0x0a, // 192.168.1.10
        // IFA_FLAGS = 0x181
        0x08, 0x00, // len = 8
        0x08, 0x00, // type = IFA_FLAGS (8)
        0x81, 0x01, 0x00, 0x00, // flags = 0x181
    ]
}

/// Address message payload for ::1/128 on the loopback interface.
pub fn addr_lo_v6() -> Vec<u8> {
    vec![
        // ifaddrmsg: family=AF_INET6, prefixlen=128, flags=0x80, scope=RT_SCOPE_HOST, index=1
        0x0a, // family = AF_INET6
        0x80, // prefixlen = 128
        0x80, // flags = IFA_F_PERMANENT
        0xfe, // scope = RT_SCOPE_HOST (254)
        0x01, 0x00, 0x00, 0x00, // index = 1
        // IFA_ADDRESS = ::1
        0x14, 0x00, // len = 20
        0x01, 0x00, // type = IFA_ADDRESS (1)
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // ::1 (first 8 bytes)
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, // ::1 (last 8 bytes)
    ]
}

/// Route message payload for a default route via 192.168.1.1 dev 2.
pub fn route_default_v4() -> Vec<u8> {
    vec![
        // rtmsg: family=AF_INET, dst_len=0, src_len=0, tos=0, table=RT_TABLE_MAIN,
        // protocol=RTPROT_STATIC, scope=RT_SCOPE_UNIVERSE, type=RTN_UNICAST
        0x02, // family = AF_INET
        0x00, // dst_len = 0 (default route)
        0x00, // src_len = 0
        0x00, // tos = 0
        0xfe, // table = RT_TABLE_MAIN (254)
        0x04, // protocol = RTPROT_STATIC (4)
        0x00, // scope = RT_SCOPE_UNIVERSE (0)
        0x01, // type = RTN_UNICAST (1)
        0x00, 0x00, 0x00, 0x00, // flags = 0
        // RTA_GATEWAY = 192.168.1.1
        0x08, 0x00, // len = 8
        0x05, 0x00, // type = RTA_GATEWAY (5)
        0xc0, 0xa8, 0x01, 0x01, // 192.168.1.1
        // RTA_OIF = 2
        0x08, 0x00, // len = 8
        0x04, 0x00, // type = RTA_OIF (4)
        0x02, 0x00, 0x00, 0x00, // oif = 2
    ]
}

/// Route message payload for a host route, table id in an RTA_TABLE
/// attribute rather than the 8-bit header field.
pub fn route_host_v4() -> Vec<u8> {
    vec![
        // rtmsg: family=AF_INET, dst_len=32, table=0 (in attribute), type=RTN_UNICAST
        0x02, // family = AF_INET
        0x20, // dst_len = 32
        0x00, // src_len = 0
        0x00, // tos = 0
        0x00, // table = RT_TABLE_UNSPEC (see RTA_TABLE)
        0x03, // protocol = RTPROT_BOOT (3)
        0x00, // scope = RT_SCOPE_UNIVERSE (0)
        0x01, // type = RTN_UNICAST (1)
        0x00, 0x00, 0x00, 0x00, // flags = 0
        // RTA_DST = 10.0.0.5
        0x08, 0x00, // len = 8
        0x01, 0x00, // type = RTA_DST (1)
        0x0a, 0x00, 0x00, 0x05, // 10.0.0.5
        // RTA_OIF = 3
        0x08, 0x00, // len = 8
        0x04, 0x00, // type = RTA_OIF (4)
        0x03, 0x00, 0x00, 0x00, // oif = 3
        // RTA_TABLE = 254
        0x08, 0x00, // len = 8
        0x0f, 0x00, // type = RTA_TABLE (15)
        0xfe, 0x00, 0x00, 0x00, // table = 254
    ]
}

/// Route message payload with two next hops in RTA_MULTIPATH.
pub fn route_multipath_v4() -> Vec<u8> {
    vec![
        // rtmsg: family=AF_INET, dst_len=24, table=RT_TABLE_MAIN, type=RTN_UNICAST
        0x02, // family = AF_INET
        0x18, // dst_len = 24
        0x00, // src_len = 0
        0x00, // tos = 0
        0xfe, // table = RT_TABLE_MAIN (254)
        0x03, // protocol = RTPROT_BOOT (3)
        0x00, // scope = RT_SCOPE_UNIVERSE (0)
        0x01, // type = RTN_UNICAST (1)
        0x00, 0x00, 0x00, 0x00, // flags = 0
        // RTA_DST = 10.1.0.0
        0x08, 0x00, // len = 8
        0x01, 0x00, // type = RTA_DST (1)
        0x0a, 0x01, 0x00, 0x00, // 10.1.0.0
        // RTA_MULTIPATH with two rtnexthop entries
        0x14, 0x00, // len = 20
        0x09, 0x00, // type = RTA_MULTIPATH (9)
        0x08, 0x00, 0x00, 0x00, // rtnh: len=8, flags=0, hops=0
        0x04, 0x00, 0x00, 0x00, // rtnh_ifindex = 4
        0x08, 0x00, 0x00, 0x00, // rtnh: len=8, flags=0, hops=0
        0x05, 0x00, 0x00, 0x00, // rtnh_ifindex = 5
    ]
}

/// Route message payload with no next hop at all (blackhole).
pub fn route_blackhole_v4() -> Vec<u8> {
    vec![
        // rtmsg: family=AF_INET, dst_len=0, table=RT_TABLE_MAIN, type=RTN_BLACKHOLE
        0x02, // family = AF_INET
        0x00, // dst_len = 0
        0x00, // src_len = 0
        0x00, // tos = 0
        0xfe, // table = RT_TABLE_MAIN (254)
        0x03, // protocol = RTPROT_BOOT (3)
        0x00, // scope = RT_SCOPE_UNIVERSE (0)
        0x06, // type = RTN_BLACKHOLE (6)
        0x00, 0x00, 0x00, 0x00, // flags = 0
    ]
}

/// Attribute set of a CTRL_CMD_GETFAMILY reply for nl80211: family id
/// 0x1c with "config", "mlme", and "scan" multicast groups.
pub fn nl80211_family_attrs() -> Vec<u8> {
    let mut builder = MessageBuilder::new(0, 0);
    builder.append_attr_str(CtrlAttr::FamilyName as u16, "nl80211");
    builder.append_attr_u16(CtrlAttr::FamilyId as u16, 0x1c);
    let groups = builder.nest_start(CtrlAttr::McastGroups as u16);
    for (idx, (name, id)) in [("config", 1u32), ("mlme", 3), ("scan", 5)]
        .into_iter()
        .enumerate()
    {
        let grp = builder.nest_start((idx + 1) as u16);
        builder.append_attr_str(CtrlAttrMcastGrp::Name as u16, name);
        builder.append_attr_u32(CtrlAttrMcastGrp::Id as u16, id);
        builder.nest_end(grp);
    }
    builder.nest_end(groups);
    builder.finish()[NLMSG_HDRLEN..].to_vec()
}

fn bss_payload(status: Option<u32>, ssid: Option<&[u8]>) -> Vec<u8> {
    let mut builder = MessageBuilder::new(0, 0);
    builder.append_attr(bss::BSSID, &[0x02, 0x00, 0x00, 0xaa, 0xbb, 0xcc]);
    if let Some(ssid) = ssid {
        let mut ies = vec![IE_SSID, ssid.len() as u8];
        ies.extend_from_slice(ssid);
        // Supported-rates element after the SSID.
        ies.extend_from_slice(&[0x01, 0x02, 0x82, 0x84]);
        builder.append_attr(bss::INFORMATION_ELEMENTS, &ies);
    }
    if let Some(status) = status {
        builder.append_attr_u32(bss::STATUS, status);
    }
    builder.finish()[NLMSG_HDRLEN..].to_vec()
}

/// BSS attribute payload for an associated network.
pub fn bss_connected(ssid: &[u8]) -> Vec<u8> {
    bss_payload(Some(bss::STATUS_ASSOCIATED), Some(ssid))
}

/// BSS attribute payload without a status attribute.
pub fn bss_no_status(ssid: &[u8]) -> Vec<u8> {
    bss_payload(None, Some(ssid))
}

/// BSS attribute payload with a status but no information elements.
pub fn bss_connected_no_ie() -> Vec<u8> {
    bss_payload(Some(bss::STATUS_ASSOCIATED), None)
}

/// nl80211 event payload: genl header plus NL80211_ATTR_IFINDEX.
pub fn nl80211_event(cmd: u8, ifindex: i32) -> Vec<u8> {
    let mut builder = MessageBuilder::new(0x1c, 0);
    builder.append(&GenlMsgHdr::new(cmd, 0));
    builder.append_attr_u32(nlattr80211::IFINDEX, ifindex as u32);
    builder.finish()[NLMSG_HDRLEN..].to_vec()
}

/// nl80211 event payload with no interface attribute.
pub fn nl80211_event_no_ifindex(cmd: u8) -> Vec<u8> {
    let mut builder = MessageBuilder::new(0x1c, 0);
    builder.append(&GenlMsgHdr::new(cmd, 0));
    builder.finish()[NLMSG_HDRLEN..].to_vec()
}
