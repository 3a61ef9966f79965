//! rtnetlink decoding for link events and router-advertised resolvers.

use ferrous_frontend_domain::network::SOURCE_SLAAC;
use ferrous_frontend_domain::RouteMessage;

pub const NLMSG_HDRLEN: usize = 16;
pub const RTM_NEWLINK: u16 = 16;
pub const RTM_DELLINK: u16 = 17;
pub const RTM_NEWNDUSEROPT: u16 = 68;

pub const RTMGRP_LINK: u32 = 0x1;
pub const RTNLGRP_ND_USEROPT: u32 = 20;

const IFINFOMSG_LEN: usize = 16;
const NDUSEROPTMSG_LEN: usize = 16;
const ND_OPT_RDNSS: u8 = 25;
const RDNSS_HEADER_LEN: usize = 8;

/// Multicast group bit for an `RTNLGRP_*` number.
pub const fn group_mask(group: u32) -> u32 {
    1 << (group - 1)
}

/// Splits a datagram read from the route socket into the messages the
/// frontend cares about. Malformed trailing data ends the walk.
pub fn parse_messages(buf: &[u8]) -> Vec<RouteMessage> {
    let mut messages = Vec::new();
    let mut offset = 0;

    while offset + NLMSG_HDRLEN <= buf.len() {
        let len = u32::from_ne_bytes([
            buf[offset],
            buf[offset + 1],
            buf[offset + 2],
            buf[offset + 3],
        ]) as usize;
        let kind = u16::from_ne_bytes([buf[offset + 4], buf[offset + 5]]);
        if len < NLMSG_HDRLEN || offset + len > buf.len() {
            break;
        }
        let body = &buf[offset + NLMSG_HDRLEN..offset + len];

        match kind {
            RTM_NEWLINK => {
                if let Some(if_index) = link_index(body) {
                    messages.push(RouteMessage::InterfaceInfo { if_index });
                }
            }
            RTM_DELLINK => {
                if let Some(if_index) = link_index(body) {
                    messages.push(RouteMessage::InterfaceDeparture { if_index });
                }
            }
            RTM_NEWNDUSEROPT => messages.extend(resolver_proposals(body)),
            _ => {}
        }
        offset += align(len);
    }
    messages
}

fn align(len: usize) -> usize {
    (len + 3) & !3
}

fn read_index(body: &[u8]) -> Option<u32> {
    let raw = i32::from_ne_bytes(body.get(4..8)?.try_into().ok()?);
    u32::try_from(raw).ok()
}

fn link_index(body: &[u8]) -> Option<u32> {
    if body.len() < IFINFOMSG_LEN {
        return None;
    }
    read_index(body)
}

/// RDNSS options carried in an ND user option message. A zero lifetime
/// withdraws the interface's router-advertised resolvers.
fn resolver_proposals(body: &[u8]) -> Vec<RouteMessage> {
    let mut proposals = Vec::new();
    if body.len() < NDUSEROPTMSG_LEN {
        return proposals;
    }
    let family = u16::from(body[0]);
    let options_len = u16::from_ne_bytes([body[2], body[3]]) as usize;
    let Some(if_index) = read_index(body) else {
        return proposals;
    };
    let Some(mut options) = body.get(NDUSEROPTMSG_LEN..NDUSEROPTMSG_LEN + options_len) else {
        return proposals;
    };

    while options.len() >= 2 {
        let option_type = options[0];
        let option_len = usize::from(options[1]) * 8;
        if option_len == 0 || option_len > options.len() {
            break;
        }
        let option = &options[..option_len];
        if option_type == ND_OPT_RDNSS && option_len >= RDNSS_HEADER_LEN {
            let lifetime = u32::from_be_bytes([option[4], option[5], option[6], option[7]]);
            let addresses = &option[RDNSS_HEADER_LEN..];
            let payload = if lifetime == 0 {
                Vec::new()
            } else {
                addresses.to_vec()
            };
            proposals.push(RouteMessage::ResolverProposal {
                if_index,
                source: SOURCE_SLAAC,
                family,
                payload,
            });
        }
        options = &options[option_len..];
    }
    proposals
}
