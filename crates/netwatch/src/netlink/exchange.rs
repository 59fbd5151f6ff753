//! Synchronous request/response exchange.
//!
//! [`send_and_await`] is the single request loop used by every control
//! operation and state dump in the crate: it sends one request, then reads
//! replies until the kernel acknowledges, reports an error, or finishes a
//! multi-part dump. Every other reply for the request's sequence number is
//! handed to the caller's handler.

use super::error::{Error, Result};
use super::message::{MessageIter, NlMsgError, NlMsgHdr};
use super::socket::NetlinkSocket;

/// Outcome of processing one datagram of replies.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    /// More replies expected.
    Continue,
    /// ACK or DONE seen, exchange complete.
    Done,
}

/// Send `msg` and drive the receive loop to completion.
///
/// The message buffer is consumed: once handed over it belongs to the
/// exchange whether or not the send succeeds. `valid_handler` is invoked
/// for every in-sequence reply that is neither an ACK, an error, nor a
/// DONE marker; an error it returns aborts the exchange.
pub async fn send_and_await<F>(
    socket: &NetlinkSocket,
    msg: Vec<u8>,
    seq: u32,
    mut valid_handler: F,
) -> Result<()>
where
    F: FnMut(&NlMsgHdr, &[u8]) -> Result<()>,
{
    socket.send(&msg).await?;
    drop(msg);

    loop {
        let data = socket.recv_msg().await?;
        if process_datagram(&data, seq, &mut valid_handler)? == Flow::Done {
            return Ok(());
        }
    }
}

fn process_datagram<F>(data: &[u8], seq: u32, valid_handler: &mut F) -> Result<Flow>
where
    F: FnMut(&NlMsgHdr, &[u8]) -> Result<()>,
{
    for item in MessageIter::new(data) {
        let (header, payload) = item?;

        // Replies to someone else's request (or stray multicasts).
        if header.nlmsg_seq != seq {
            continue;
        }

        if header.is_error() {
            let err = NlMsgError::from_bytes(payload)?;
            if err.is_ack() {
                return Ok(Flow::Done);
            }
            return Err(Error::from_errno(err.error));
        }

        if header.is_done() {
            return Ok(Flow::Done);
        }

        valid_handler(header, payload)?;
    }

    Ok(Flow::Continue)
}
