//! RTNetlink listener: link, address, and route monitoring.
//!
//! [`RtnlListener::start`] subscribes to the kernel's link/address/route
//! multicast groups and then replays the current kernel state to the
//! observer as `NEW` events, so the consumer always begins from a complete
//! snapshot. Afterwards the host event loop awaits
//! [`readable`](RtnlListener::readable) (or polls
//! [`fileno`](RtnlListener::fileno)) and calls
//! [`pump`](RtnlListener::pump) to drain live notifications.

use std::collections::HashMap;
use std::os::unix::io::{AsRawFd, RawFd};

use crate::netlink::builder::MessageBuilder;
use crate::netlink::error::{Error, Result};
use crate::netlink::exchange::send_and_await;
use crate::netlink::fault::FaultSlot;
use crate::netlink::message::{MessageIter, NLM_F_ACK, NLM_F_DUMP, NLM_F_REQUEST, NlMsgType};
use crate::netlink::observe::{ChangeAction, LinkRecord, Observer};
use crate::netlink::socket::{NetlinkSocket, Protocol, rtnetlink_groups};

pub mod types;

use types::{IfAddrMsg, IfInfoMsg, RtMsg, parse_addr, parse_link, parse_route};

/// Interface is administratively up (IFF_UP).
pub const IFF_UP: u32 = 0x1;

/// Demux core shared by the initial replay and the live pump: decodes one
/// message, maintains the link cache, and delivers to the observer unless
/// a fault is pending.
struct Core<O> {
    observer: O,
    links: HashMap<i32, LinkRecord>,
    fault: FaultSlot,
}

impl<O: Observer> Core<O> {
    fn handle_message(&mut self, msg_type: u16, payload: &[u8]) {
        if self.fault.is_set() {
            return;
        }

        let result = match msg_type {
            NlMsgType::RTM_NEWLINK | NlMsgType::RTM_DELLINK => {
                let Some(link) = parse_link(payload) else {
                    tracing::debug!(msg_type, "skipping undecodable link message");
                    return;
                };
                // The kernel reports both appearance and modification as
                // RTM_NEWLINK; the cache tells the two apart.
                let action = if msg_type == NlMsgType::RTM_DELLINK {
                    self.links.remove(&link.ifindex);
                    ChangeAction::Del
                } else if self.links.insert(link.ifindex, link.clone()).is_some() {
                    ChangeAction::Change
                } else {
                    ChangeAction::New
                };
                self.observer.link_change(action, link)
            }
            NlMsgType::RTM_NEWADDR | NlMsgType::RTM_DELADDR => {
                let Some(addr) = parse_addr(payload) else {
                    tracing::debug!(msg_type, "skipping undecodable address message");
                    return;
                };
                self.observer.addr_change(rtm_action(msg_type), addr)
            }
            NlMsgType::RTM_NEWROUTE | NlMsgType::RTM_DELROUTE => {
                let Some(route) = parse_route(payload) else {
                    tracing::debug!(msg_type, "skipping undecodable route message");
                    return;
                };
                self.observer.route_change(rtm_action(msg_type), route)
            }
            _ => return,
        };

        if let Err(err) = result {
            self.fault.set(err);
        }
    }
}

/// Action encoded in the low bits of an RTM message type.
fn rtm_action(msg_type: u16) -> ChangeAction {
    match (msg_type - NlMsgType::RTM_BASE) & 0x3 {
        0 => ChangeAction::New,
        1 => ChangeAction::Del,
        2 => ChangeAction::Get,
        _ => ChangeAction::Set,
    }
}

/// Listener for RTNetlink state changes.
pub struct RtnlListener<O> {
    socket: NetlinkSocket,
    core: Core<O>,
}

impl<O: Observer> RtnlListener<O> {
    /// Subscribe to link/address/route notifications and replay the
    /// current kernel state to `observer` as `NEW` events.
    ///
    /// Nothing stays subscribed on failure; an error returned by the
    /// observer during the replay aborts startup with that error.
    pub async fn start(observer: O) -> Result<Self> {
        let mut socket = NetlinkSocket::new(Protocol::Route)?;
        // Links first, then addresses, then routes. A failed membership
        // drops the socket and with it the groups joined so far.
        for group in [
            rtnetlink_groups::RTNLGRP_LINK,
            rtnetlink_groups::RTNLGRP_IPV4_IFADDR,
            rtnetlink_groups::RTNLGRP_IPV6_IFADDR,
            rtnetlink_groups::RTNLGRP_IPV4_ROUTE,
            rtnetlink_groups::RTNLGRP_IPV6_ROUTE,
        ] {
            socket.add_membership(group)?;
        }

        let mut core = Core {
            observer,
            links: HashMap::new(),
            fault: FaultSlot::default(),
        };

        // Replay over a short-lived control socket so dump replies never
        // interleave with multicast events, filling the link cache along
        // the way.
        let control = NetlinkSocket::new(Protocol::Route)?;
        replay_dump(&control, NlMsgType::RTM_GETLINK, &mut core).await?;
        replay_dump(&control, NlMsgType::RTM_GETADDR, &mut core).await?;
        replay_dump(&control, NlMsgType::RTM_GETROUTE, &mut core).await?;

        if let Some(fault) = core.fault.take() {
            return Err(fault);
        }

        tracing::debug!(links = core.links.len(), "rtnetlink listener started");

        Ok(Self { socket, core })
    }

    /// File descriptor of the event socket, for external readiness polling.
    pub fn fileno(&self) -> RawFd {
        self.socket.as_raw_fd()
    }

    /// Wait until the event socket has pending notifications.
    pub async fn readable(&self) -> Result<()> {
        self.socket.readable().await
    }

    /// Deliver all pending notifications to the observer, in kernel order.
    ///
    /// If an observer callback returned an error, delivery stops for the
    /// rest of this call and that error is returned once the socket is
    /// drained; the next `pump` delivers normally again.
    pub fn pump(&mut self) -> Result<()> {
        while let Some(data) = self.socket.try_recv()? {
            for item in MessageIter::new(&data) {
                let Ok((header, payload)) = item else { break };
                self.core.handle_message(header.nlmsg_type, payload);
            }
        }

        match self.core.fault.take() {
            Some(fault) => Err(fault),
            None => Ok(()),
        }
    }

    /// Set administrative flags on a link (bitwise or into its current
    /// flags, as cached from kernel notifications).
    pub async fn set_link_flags(&self, ifindex: i32, flags: u32) -> Result<()> {
        self.change_link_flags(ifindex, flags, true).await
    }

    /// Clear administrative flags on a link.
    pub async fn unset_link_flags(&self, ifindex: i32, flags: u32) -> Result<()> {
        self.change_link_flags(ifindex, flags, false).await
    }

    /// Issue a synchronous flag change over a fresh socket. The cache is
    /// not touched: the authoritative update arrives as a notification.
    async fn change_link_flags(&self, ifindex: i32, flags: u32, set: bool) -> Result<()> {
        let req = flag_change_request(&self.core.links, ifindex, flags, set)?;

        let socket = NetlinkSocket::new(Protocol::Route)?;
        let mut builder = MessageBuilder::new(NlMsgType::RTM_NEWLINK, NLM_F_REQUEST | NLM_F_ACK);
        builder.append(&req);

        let seq = socket.next_seq();
        builder.set_seq(seq);
        builder.set_pid(socket.pid());

        send_and_await(&socket, builder.finish(), seq, |_, _| Ok(())).await
    }
}

/// Build the ifinfomsg for a flag change from the cached link state.
/// Fails without touching the kernel when the link is not cached.
fn flag_change_request(
    links: &HashMap<i32, LinkRecord>,
    ifindex: i32,
    flags: u32,
    set: bool,
) -> Result<IfInfoMsg> {
    let link = links.get(&ifindex).ok_or(Error::LinkNotFound { ifindex })?;
    let ifi_flags = if set {
        link.flags | flags
    } else {
        link.flags & !flags
    };
    Ok(IfInfoMsg {
        ifi_family: link.family,
        _ifi_pad: 0,
        ifi_type: link.arptype,
        ifi_index: ifindex,
        ifi_flags,
        ifi_change: flags,
    })
}

async fn replay_dump<O: Observer>(
    socket: &NetlinkSocket,
    msg_type: u16,
    core: &mut Core<O>,
) -> Result<()> {
    let mut builder = MessageBuilder::new(msg_type, NLM_F_REQUEST | NLM_F_DUMP);
    match msg_type {
        NlMsgType::RTM_GETLINK => builder.append(&IfInfoMsg::default()),
        NlMsgType::RTM_GETADDR => builder.append(&IfAddrMsg::default()),
        _ => builder.append(&RtMsg::default()),
    }

    let seq = socket.next_seq();
    builder.set_seq(seq);
    builder.set_pid(socket.pid());

    // Dump replies arrive as RTM_NEW* messages, so they take the same
    // decode path as live notifications and surface as NEW events.
    send_and_await(socket, builder.finish(), seq, |header, payload| {
        core.handle_message(header.nlmsg_type, payload);
        Ok(())
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlink::fixtures;

    /// Observer that records one line per callback and can be told to
    /// fail from the nth call onward.
    #[derive(Default)]
    struct Collector {
        calls: Vec<String>,
        fail_from: Option<usize>,
    }

    impl Collector {
        fn push(&mut self, line: String) -> Result<()> {
            if self.fail_from == Some(self.calls.len()) {
                return Err(Error::observer("induced fault"));
            }
            self.calls.push(line);
            Ok(())
        }
    }

    impl Observer for Collector {
        fn link_change(&mut self, action: ChangeAction, link: LinkRecord) -> Result<()> {
            self.push(format!("link {} {}", action.as_str(), link.ifindex))
        }
        fn addr_change(
            &mut self,
            action: ChangeAction,
            addr: crate::netlink::observe::AddressRecord,
        ) -> Result<()> {
            self.push(format!("addr {} {}", action.as_str(), addr.ifindex))
        }
        fn route_change(
            &mut self,
            action: ChangeAction,
            route: crate::netlink::observe::RouteRecord,
        ) -> Result<()> {
            self.push(format!("route {} {}", action.as_str(), route.dst))
        }
        fn wlan_event(&mut self, _event: crate::netlink::observe::WlanEvent) -> Result<()> {
            unreachable!("no wlan events on the rtnetlink path")
        }
    }

    fn core() -> Core<Collector> {
        Core {
            observer: Collector::default(),
            links: HashMap::new(),
            fault: FaultSlot::default(),
        }
    }

    #[test]
    fn test_one_call_per_notification_in_order() {
        let mut core = core();
        core.handle_message(NlMsgType::RTM_NEWLINK, &fixtures::link_eth0());
        core.handle_message(NlMsgType::RTM_NEWADDR, &fixtures::addr_eth0_v4());
        core.handle_message(NlMsgType::RTM_NEWROUTE, &fixtures::route_default_v4());
        core.handle_message(NlMsgType::RTM_DELADDR, &fixtures::addr_eth0_v4());

        assert_eq!(
            core.observer.calls,
            vec!["link NEW 2", "addr NEW 2", "route NEW default", "addr DEL 2"]
        );
    }

    #[test]
    fn test_link_new_change_del() {
        let mut core = core();
        core.handle_message(NlMsgType::RTM_NEWLINK, &fixtures::link_eth0());
        core.handle_message(NlMsgType::RTM_NEWLINK, &fixtures::link_eth0());
        core.handle_message(NlMsgType::RTM_DELLINK, &fixtures::link_eth0());
        core.handle_message(NlMsgType::RTM_NEWLINK, &fixtures::link_eth0());

        assert_eq!(
            core.observer.calls,
            vec!["link NEW 2", "link CHANGE 2", "link DEL 2", "link NEW 2"]
        );
    }

    #[test]
    fn test_malformed_payload_skipped() {
        let mut core = core();
        core.handle_message(NlMsgType::RTM_NEWLINK, &[0x00, 0x01]);
        core.handle_message(NlMsgType::RTM_NEWROUTE, &[0x02]);
        core.handle_message(NlMsgType::RTM_NEWLINK, &fixtures::link_eth0());

        assert_eq!(core.observer.calls, vec!["link NEW 2"]);
        assert!(!core.fault.is_set());
    }

    #[test]
    fn test_fault_suppresses_and_replays_once() {
        let mut core = core();
        core.observer.fail_from = Some(1);

        core.handle_message(NlMsgType::RTM_NEWLINK, &fixtures::link_eth0());
        core.handle_message(NlMsgType::RTM_NEWLINK, &fixtures::link_wlan0());
        core.handle_message(NlMsgType::RTM_NEWADDR, &fixtures::addr_eth0_v4());

        // First call delivered, second faulted, third suppressed.
        assert_eq!(core.observer.calls, vec!["link NEW 2"]);
        let fault = core.fault.take().expect("fault captured");
        assert!(fault.to_string().contains("induced fault"));
        assert!(core.fault.take().is_none());

        // Delivery resumes after the fault is drained.
        core.observer.fail_from = None;
        core.handle_message(NlMsgType::RTM_NEWADDR, &fixtures::addr_eth0_v4());
        assert_eq!(core.observer.calls, vec!["link NEW 2", "addr NEW 2"]);
    }

    #[test]
    fn test_flag_change_requires_cached_link() {
        let links = HashMap::new();
        let err = flag_change_request(&links, 7, IFF_UP, true).unwrap_err();
        assert!(matches!(err, Error::LinkNotFound { ifindex: 7 }));
    }

    #[test]
    fn test_flag_change_request_bits() {
        let mut links = HashMap::new();
        links.insert(
            2,
            LinkRecord {
                ifindex: 2,
                flags: 0x1002,
                arptype: 1,
                family: 0,
                name: Some("eth0".into()),
            },
        );

        let set = flag_change_request(&links, 2, IFF_UP, true).unwrap();
        assert_eq!(set.ifi_flags, 0x1003);
        assert_eq!(set.ifi_change, IFF_UP);
        assert_eq!(set.ifi_index, 2);

        let unset = flag_change_request(&links, 2, 0x1000, false).unwrap();
        assert_eq!(unset.ifi_flags, 0x2);
        assert_eq!(unset.ifi_change, 0x1000);
    }

    #[test]
    fn test_rtm_action_mapping() {
        assert_eq!(rtm_action(NlMsgType::RTM_NEWROUTE), ChangeAction::New);
        assert_eq!(rtm_action(NlMsgType::RTM_DELADDR), ChangeAction::Del);
        assert_eq!(rtm_action(NlMsgType::RTM_GETLINK), ChangeAction::Get);
        assert_eq!(rtm_action(NlMsgType::RTM_SETLINK), ChangeAction::Set);
    }
}
