mod helpers;

use ferrous_frontend_application::use_cases::network_change::classify;
use ferrous_frontend_application::use_cases::{NetworkChangeMonitor, NetworkEvent};
use ferrous_frontend_domain::network::SOURCE_SLAAC;
use ferrous_frontend_domain::{AddressFamily, BackendRequest, ResolverProposal, RouteMessage};
use helpers::*;
use std::net::IpAddr;
use std::sync::Arc;

fn proposal(family: libc::c_int, payload: Vec<u8>) -> RouteMessage {
    RouteMessage::ResolverProposal {
        if_index: 3,
        source: SOURCE_SLAAC,
        family: family as u16,
        payload,
    }
}

#[test]
fn test_departure_becomes_withdrawal() {
    let event = classify(RouteMessage::InterfaceDeparture { if_index: 4 }).unwrap();
    match event {
        NetworkEvent::Proposal(p) => {
            assert_eq!(p, ResolverProposal::withdrawal(4));
            assert!(p.is_withdrawal());
            assert_eq!(p.source, 0);
            assert_eq!(p.family, AddressFamily::Inet);
        }
        other => panic!("expected withdrawal, got {:?}", other),
    }
}

#[test]
fn test_interface_info_is_network_changed() {
    assert_eq!(
        classify(RouteMessage::InterfaceInfo { if_index: 2 }),
        Some(NetworkEvent::Changed)
    );
}

#[test]
fn test_arrival_is_ignored() {
    assert_eq!(classify(RouteMessage::InterfaceArrival { if_index: 2 }), None);
}

#[test]
fn test_ipv4_proposal_decodes_addresses() {
    let event = classify(proposal(libc::AF_INET, vec![192, 0, 2, 53, 198, 51, 100, 53])).unwrap();
    let NetworkEvent::Proposal(p) = event else {
        panic!("expected proposal");
    };
    assert_eq!(p.if_index, 3);
    assert_eq!(p.source, SOURCE_SLAAC);
    assert_eq!(
        p.addresses,
        vec![
            "192.0.2.53".parse::<IpAddr>().unwrap(),
            "198.51.100.53".parse::<IpAddr>().unwrap()
        ]
    );
}

#[test]
fn test_ipv6_proposal_decodes_addresses() {
    let addr: std::net::Ipv6Addr = "2001:db8::53".parse().unwrap();
    let event = classify(proposal(libc::AF_INET6, addr.octets().to_vec())).unwrap();
    let NetworkEvent::Proposal(p) = event else {
        panic!("expected proposal");
    };
    assert_eq!(p.family, AddressFamily::Inet6);
    assert_eq!(p.addresses, vec![IpAddr::V6(addr)]);
}

#[test]
fn test_misaligned_payload_is_discarded() {
    assert_eq!(classify(proposal(libc::AF_INET, vec![192, 0, 2])), None);
    assert_eq!(classify(proposal(libc::AF_INET6, vec![0; 20])), None);
}

#[test]
fn test_unknown_family_is_discarded() {
    assert_eq!(classify(proposal(libc::AF_UNIX, vec![0; 4])), None);
}

#[test]
fn test_monitor_forwards_to_backend() {
    let backend = Arc::new(MockBackend::new());
    let monitor = NetworkChangeMonitor::new(backend.clone());

    monitor.handle(RouteMessage::InterfaceInfo { if_index: 1 }).unwrap();
    monitor.handle(RouteMessage::InterfaceDeparture { if_index: 5 }).unwrap();
    monitor.handle(proposal(libc::AF_INET, vec![1, 2, 3])).unwrap();

    assert_eq!(
        backend.sent(),
        vec![
            BackendRequest::NetworkChanged,
            BackendRequest::ReplaceResolvers(ResolverProposal::withdrawal(5)),
        ]
    );
}
