use std::net::IpAddr;

/// Source priority carried by a proposal that withdraws an interface's resolvers.
pub const SOURCE_WITHDRAWN: u8 = 0;
/// Source priority for resolvers learned from router advertisements.
pub const SOURCE_SLAAC: u8 = 59;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressFamily {
    Inet,
    Inet6,
}

impl AddressFamily {
    pub fn address_len(self) -> usize {
        match self {
            AddressFamily::Inet => 4,
            AddressFamily::Inet6 => 16,
        }
    }

    /// One-byte tag used on the backend channel.
    pub fn tag(self) -> u8 {
        match self {
            AddressFamily::Inet => 4,
            AddressFamily::Inet6 => 6,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            4 => Some(AddressFamily::Inet),
            6 => Some(AddressFamily::Inet6),
            _ => None,
        }
    }
}

/// Validated set of resolver addresses proposed for one interface.
/// An empty address list withdraws whatever the interface proposed before.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverProposal {
    pub if_index: u32,
    pub source: u8,
    pub family: AddressFamily,
    pub addresses: Vec<IpAddr>,
}

impl ResolverProposal {
    pub fn withdrawal(if_index: u32) -> Self {
        Self {
            if_index,
            source: SOURCE_WITHDRAWN,
            family: AddressFamily::Inet,
            addresses: Vec::new(),
        }
    }

    pub fn is_withdrawal(&self) -> bool {
        self.addresses.is_empty()
    }
}

/// Routing-layer notification before validation.
///
/// `family` is the operating system's raw address family value and
/// `payload` the concatenated raw addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteMessage {
    InterfaceArrival {
        if_index: u32,
    },
    InterfaceDeparture {
        if_index: u32,
    },
    InterfaceInfo {
        if_index: u32,
    },
    ResolverProposal {
        if_index: u32,
        source: u8,
        family: u16,
        payload: Vec<u8>,
    },
}
