use crate::ports::BackendPort;
use ferrous_frontend_domain::{
    AddressFamily, BackendRequest, DomainError, ResolverProposal, RouteMessage,
};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkEvent {
    Proposal(ResolverProposal),
    Changed,
}

/// Maps routing-layer notifications to engine messages.
pub struct NetworkChangeMonitor {
    backend: Arc<dyn BackendPort>,
}

impl NetworkChangeMonitor {
    pub fn new(backend: Arc<dyn BackendPort>) -> Self {
        Self { backend }
    }

    pub fn handle(&self, message: RouteMessage) -> Result<Option<NetworkEvent>, DomainError> {
        let Some(event) = classify(message) else {
            return Ok(None);
        };
        let request = match &event {
            NetworkEvent::Proposal(proposal) => BackendRequest::ReplaceResolvers(proposal.clone()),
            NetworkEvent::Changed => BackendRequest::NetworkChanged,
        };
        self.backend.send(request)?;
        Ok(Some(event))
    }
}

pub fn classify(message: RouteMessage) -> Option<NetworkEvent> {
    match message {
        RouteMessage::InterfaceArrival { .. } => None,
        RouteMessage::InterfaceDeparture { if_index } => {
            debug!(if_index, "Interface departed");
            Some(NetworkEvent::Proposal(ResolverProposal::withdrawal(if_index)))
        }
        RouteMessage::InterfaceInfo { .. } => Some(NetworkEvent::Changed),
        RouteMessage::ResolverProposal {
            if_index,
            source,
            family,
            payload,
        } => {
            let Some(family) = address_family(family) else {
                warn!(if_index, family, "Invalid address family in resolver proposal");
                return None;
            };
            if payload.len() % family.address_len() != 0 {
                warn!(
                    if_index,
                    len = payload.len(),
                    "Invalid resolver proposal payload length"
                );
                return None;
            }
            Some(NetworkEvent::Proposal(ResolverProposal {
                if_index,
                source,
                family,
                addresses: decode_addresses(family, &payload),
            }))
        }
    }
}

fn address_family(raw: u16) -> Option<AddressFamily> {
    match raw as libc::c_int {
        libc::AF_INET => Some(AddressFamily::Inet),
        libc::AF_INET6 => Some(AddressFamily::Inet6),
        _ => None,
    }
}

fn decode_addresses(family: AddressFamily, payload: &[u8]) -> Vec<IpAddr> {
    payload
        .chunks_exact(family.address_len())
        .filter_map(|chunk| match family {
            AddressFamily::Inet => <[u8; 4]>::try_from(chunk)
                .ok()
                .map(|b| IpAddr::V4(Ipv4Addr::from(b))),
            AddressFamily::Inet6 => <[u8; 16]>::try_from(chunk)
                .ok()
                .map(|b| IpAddr::V6(Ipv6Addr::from(b))),
        })
        .collect()
}
