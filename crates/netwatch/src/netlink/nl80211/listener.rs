//! NL80211 listener: wireless event monitoring and scan control.

use std::os::unix::io::{AsRawFd, RawFd};

use super::{attr, cmd, command_name, parse_bss, parse_event};
use crate::netlink::builder::MessageBuilder;
use crate::netlink::error::Result;
use crate::netlink::exchange::send_and_await;
use crate::netlink::fault::FaultSlot;
use crate::netlink::genl::{GenlMsgHdr, resolve_family};
use crate::netlink::message::{MessageIter, NLM_F_ACK, NLM_F_DUMP, NLM_F_REQUEST};
use crate::netlink::observe::{Observer, ScanEntry, WlanEvent};
use crate::netlink::socket::{NetlinkSocket, Protocol};

const FAMILY_NAME: &str = "nl80211";

/// Which scan dump, if any, an event gets attached automatically.
/// `Some(only_connected)` mirrors the dump filter.
fn auto_dump(command: u8) -> Option<bool> {
    match command {
        cmd::NEW_SCAN_RESULTS => Some(false),
        cmd::ASSOCIATE | cmd::NEW_INTERFACE => Some(true),
        _ => None,
    }
}

/// Listener for nl80211 wireless events.
///
/// The event socket is dedicated to multicast notifications; every control
/// operation (family resolution aside, which happens once in
/// [`start`](Self::start)) runs over its own short-lived socket so slow
/// scans never back up event delivery.
pub struct Nl80211Listener<O> {
    socket: NetlinkSocket,
    observer: O,
    family_id: u16,
    fault: FaultSlot,
}

impl<O: Observer> Nl80211Listener<O> {
    /// Resolve the nl80211 family, subscribe to its "scan" and "mlme"
    /// multicast groups, and replay the current wireless interface
    /// inventory to `observer` as NEW_INTERFACE events.
    pub async fn start(observer: O) -> Result<Self> {
        let control = NetlinkSocket::new(Protocol::Generic)?;
        let family = resolve_family(&control, FAMILY_NAME).await?;
        let scan_group = family.group("scan")?;
        let mlme_group = family.group("mlme")?;

        let mut socket = NetlinkSocket::new(Protocol::Generic)?;
        socket.add_membership(mlme_group)?;
        socket.add_membership(scan_group)?;

        let mut listener = Self {
            socket,
            observer,
            family_id: family.id,
            fault: FaultSlot::default(),
        };

        // Initial inventory goes through the same decode path as live
        // notifications, so existing interfaces surface as NEW_INTERFACE
        // events (with a connected-only scan dump attached, like any
        // other NEW_INTERFACE).
        let events = listener.dump_interfaces(&control).await?;
        for (command, ifindex) in events {
            listener.deliver_event(command, ifindex).await;
        }
        if let Some(fault) = listener.fault.take() {
            return Err(fault);
        }

        tracing::debug!(family_id = family.id, "nl80211 listener started");

        Ok(listener)
    }

    /// File descriptor of the event socket, for external readiness polling.
    pub fn fileno(&self) -> RawFd {
        self.socket.as_raw_fd()
    }

    /// Wait until the event socket has pending notifications.
    pub async fn readable(&self) -> Result<()> {
        self.socket.readable().await
    }

    /// Deliver all pending wireless events to the observer, in kernel
    /// order. Fault handling matches [`RtnlListener::pump`]: the first
    /// observer error stops delivery for this call and is returned once
    /// the socket is drained.
    ///
    /// [`RtnlListener::pump`]: crate::netlink::rtnl::RtnlListener::pump
    pub async fn pump(&mut self) -> Result<()> {
        while let Some(data) = self.socket.try_recv()? {
            let mut events = Vec::new();
            for item in MessageIter::new(&data) {
                let Ok((header, payload)) = item else { break };
                if header.nlmsg_type != self.family_id {
                    continue;
                }
                if let Some(event) = parse_event(payload) {
                    events.push(event);
                }
            }
            for (command, ifindex) in events {
                self.deliver_event(command, ifindex).await;
            }
        }

        match self.fault.take() {
            Some(fault) => Err(fault),
            None => Ok(()),
        }
    }

    /// Ask the kernel to scan all SSIDs on an interface.
    ///
    /// The request carries a single empty SSID in its scan list, which
    /// the kernel takes as a broadcast (wildcard) scan. Results arrive as
    /// a NEW_SCAN_RESULTS event on the event socket.
    pub async fn trigger_scan(&self, ifindex: i32) -> Result<()> {
        let socket = NetlinkSocket::new(Protocol::Generic)?;

        let mut builder = MessageBuilder::new(self.family_id, NLM_F_REQUEST | NLM_F_ACK);
        builder.append(&GenlMsgHdr::new(cmd::TRIGGER_SCAN, 0));
        builder.append_attr_u32(attr::IFINDEX, ifindex as u32);
        let ssids = builder.nest_start(attr::SCAN_SSIDS);
        builder.append_attr(1, &[]);
        builder.nest_end(ssids);

        let seq = socket.next_seq();
        builder.set_seq(seq);
        builder.set_pid(socket.pid());

        send_and_await(&socket, builder.finish(), seq, |_, _| Ok(())).await
    }

    /// Dump the current BSS list for an interface.
    ///
    /// With `only_connected` set, entries lacking a status attribute are
    /// omitted; otherwise they are reported with "no status".
    pub async fn dump_scan_results(
        &self,
        ifindex: i32,
        only_connected: bool,
    ) -> Result<Vec<ScanEntry>> {
        let socket = NetlinkSocket::new(Protocol::Generic)?;

        let mut builder = MessageBuilder::new(self.family_id, NLM_F_REQUEST | NLM_F_DUMP);
        builder.append(&GenlMsgHdr::new(cmd::GET_SCAN, 0));
        builder.append_attr_u32(attr::IFINDEX, ifindex as u32);

        let seq = socket.next_seq();
        builder.set_seq(seq);
        builder.set_pid(socket.pid());

        let mut entries = Vec::new();
        send_and_await(&socket, builder.finish(), seq, |_header, payload| {
            if payload.len() < crate::netlink::genl::GENL_HDRLEN {
                return Ok(());
            }
            for (kind, data) in crate::netlink::attr::AttrIter::new(
                &payload[crate::netlink::genl::GENL_HDRLEN..],
            ) {
                if kind == attr::BSS
                    && let Some(entry) = parse_bss(data, only_connected)
                {
                    entries.push(entry);
                }
            }
            Ok(())
        })
        .await?;

        Ok(entries)
    }

    async fn dump_interfaces(&self, control: &NetlinkSocket) -> Result<Vec<(u8, i32)>> {
        let mut builder = MessageBuilder::new(self.family_id, NLM_F_REQUEST | NLM_F_DUMP);
        builder.append(&GenlMsgHdr::new(cmd::GET_INTERFACE, 0));

        let seq = control.next_seq();
        builder.set_seq(seq);
        builder.set_pid(control.pid());

        let mut events = Vec::new();
        send_and_await(control, builder.finish(), seq, |_header, payload| {
            if let Some(event) = parse_event(payload) {
                events.push(event);
            }
            Ok(())
        })
        .await?;

        Ok(events)
    }

    /// Build and deliver one event, attaching scan results where the
    /// command calls for them. A dump failure counts as a fault just like
    /// an observer error.
    async fn deliver_event(&mut self, command: u8, ifindex: i32) {
        if self.fault.is_set() {
            return;
        }

        let ssids = match auto_dump(command).filter(|_| ifindex > 0) {
            Some(only_connected) => {
                match self.dump_scan_results(ifindex, only_connected).await {
                    Ok(entries) => Some(entries),
                    Err(err) => {
                        self.fault.set(err);
                        return;
                    }
                }
            }
            None => None,
        };

        let event = WlanEvent {
            command: command_name(command).to_owned(),
            ifindex,
            ssids,
        };
        if let Err(err) = self.observer.wlan_event(event) {
            self.fault.set(err);
        }
    }
}
