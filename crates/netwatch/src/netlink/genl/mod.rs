//! Generic Netlink (GENL) support.
//!
//! Generic netlink families are registered dynamically; their numeric ids
//! and multicast group ids must be resolved at runtime through the fixed
//! control family. [`resolve_family`] performs that lookup, which is all
//! the GENL infrastructure the nl80211 listener needs.

mod header;

pub use header::{GENL_HDRLEN, GenlMsgHdr};

use std::collections::HashMap;

use super::attr::{AttrIter, get};
use super::builder::MessageBuilder;
use super::error::{Error, Result};
use super::exchange::send_and_await;
use super::message::{NLM_F_ACK, NLM_F_REQUEST};
use super::socket::NetlinkSocket;

// Control family constants (fixed, not dynamically assigned)
pub const GENL_ID_CTRL: u16 = 0x10;

/// Control family commands
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtrlCmd {
    Unspec = 0,
    NewFamily = 1,
    DelFamily = 2,
    GetFamily = 3,
}

/// Control family attributes
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtrlAttr {
    Unspec = 0,
    FamilyId = 1,
    FamilyName = 2,
    Version = 3,
    HdrSize = 4,
    MaxAttr = 5,
    Ops = 6,
    McastGroups = 7,
}

/// Control family multicast group attributes
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtrlAttrMcastGrp {
    Unspec = 0,
    Name = 1,
    Id = 2,
}

/// A resolved Generic Netlink family.
#[derive(Debug, Clone)]
pub struct FamilyInfo {
    /// The family name this was resolved from.
    pub name: String,
    /// Dynamically assigned family ID (used as nlmsg_type).
    pub id: u16,
    /// Multicast groups: name -> group ID.
    pub mcast_groups: HashMap<String, u32>,
}

impl FamilyInfo {
    /// Look up a multicast group id by name.
    pub fn group(&self, group: &str) -> Result<u32> {
        self.mcast_groups
            .get(group)
            .copied()
            .ok_or_else(|| Error::GroupNotFound {
                family: self.name.clone(),
                group: group.to_owned(),
            })
    }
}

/// Resolve a family's numeric id and multicast groups by name.
pub async fn resolve_family(socket: &NetlinkSocket, name: &str) -> Result<FamilyInfo> {
    let mut builder = MessageBuilder::new(GENL_ID_CTRL, NLM_F_REQUEST | NLM_F_ACK);
    builder.append(&GenlMsgHdr::new(CtrlCmd::GetFamily as u8, 1));
    builder.append_attr_str(CtrlAttr::FamilyName as u16, name);

    let seq = socket.next_seq();
    builder.set_seq(seq);
    builder.set_pid(socket.pid());

    let mut info = None;
    let result = send_and_await(socket, builder.finish(), seq, |_header, payload| {
        if payload.len() < GENL_HDRLEN {
            return Ok(());
        }
        info = Some(parse_family_attrs(name, &payload[GENL_HDRLEN..])?);
        Ok(())
    })
    .await;

    match result {
        Ok(()) => info.ok_or_else(|| Error::FamilyNotFound {
            name: name.to_owned(),
        }),
        // ENOENT from the control family means the family does not exist.
        Err(err) if err.is_not_found() => Err(Error::FamilyNotFound {
            name: name.to_owned(),
        }),
        Err(err) => Err(err),
    }
}

/// Parse the attribute set of a CTRL_CMD_GETFAMILY reply.
fn parse_family_attrs(name: &str, data: &[u8]) -> Result<FamilyInfo> {
    let mut id = None;
    let mut mcast_groups = HashMap::new();

    for (attr_type, payload) in AttrIter::new(data) {
        match attr_type {
            t if t == CtrlAttr::FamilyId as u16 => {
                id = Some(get::u16_ne(payload)?);
            }
            t if t == CtrlAttr::McastGroups as u16 => {
                mcast_groups = parse_mcast_groups(payload);
            }
            _ => {}
        }
    }

    let id = id.ok_or_else(|| Error::InvalidMessage("missing family ID".into()))?;

    Ok(FamilyInfo {
        name: name.to_owned(),
        id,
        mcast_groups,
    })
}

/// Parse the nested group array of CTRL_ATTR_MCAST_GROUPS. Groups missing
/// a name or id are dropped.
fn parse_mcast_groups(data: &[u8]) -> HashMap<String, u32> {
    let mut groups = HashMap::new();

    // One nested attribute per group, indexed by position.
    for (_group_idx, group_payload) in AttrIter::new(data) {
        let mut name = None;
        let mut grp_id = None;

        for (attr_type, payload) in AttrIter::new(group_payload) {
            match attr_type {
                t if t == CtrlAttrMcastGrp::Name as u16 => {
                    name = get::string(payload).ok().map(str::to_owned);
                }
                t if t == CtrlAttrMcastGrp::Id as u16 => {
                    grp_id = get::u32_ne(payload).ok();
                }
                _ => {}
            }
        }

        if let (Some(name), Some(id)) = (name, grp_id) {
            groups.insert(name, id);
        }
    }

    groups
}
