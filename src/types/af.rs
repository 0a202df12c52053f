use log::trace;
use zerocopy::{IntoBytes, NetworkEndian, U128, U32};

//------------ TrieEntry ----------------------------------------------------

/// The node a walk over an address of a certain family starts from.
///
/// IPv6 addresses are walked from the root of the trie over all of their 16
/// bytes. IPv4 addresses live under the IPv4-mapped IPv6 prefix, so their
/// walks start at the node right below that prefix and only consume the 4
/// IPv4 bytes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TrieEntry {
    Root,
    Ipv4Mapped,
}

/// The 12 bytes that precede an IPv4 address in its IPv4-mapped IPv6 form.
pub const IPV4_MAPPED_PREFIX: [u8; 12] =
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0xff, 0xff];

//------------ AddressFamily (trait) ----------------------------------------
//
/// The address family of an IP address as a Trait.
///
/// Each family has a separate type that holds exactly the bytes of an
/// address in network byte order, so that the trie can walk them directly
/// with [IntoBytes::as_bytes].
pub trait AddressFamily:
    std::fmt::Debug
    + Eq
    + Ord
    + Copy
    + zerocopy::FromBytes
    + zerocopy::IntoBytes
    + zerocopy::KnownLayout
    + zerocopy::Immutable
    + zerocopy::Unaligned
{
    /// The number of bits in the byte representation of the family.
    const BITS: u8;

    /// Where walks for addresses of this family start in the trie.
    const ENTRY: TrieEntry;

    /// The std::net type that the value of self belongs to. So,
    /// [std::net::Ipv4Addr], and [std::net::Ipv6Addr] for IPv4, and IPv6
    /// respectively.
    type InnerIpAddr;

    fn from_ipaddr(ip_addr: Self::InnerIpAddr) -> Self;

    /// Turn self in to a [std::net::IpAddr].
    fn into_ipaddr(self) -> std::net::IpAddr;

    /// A prefix mask of `len` leading one bits. A `len` of zero, or larger
    /// than the width of the family saturates to all zeros, or all ones
    /// respectively.
    fn prefix_mask(len: u8) -> Self;

    /// The canonical 16 byte representation of self, IPv4 addresses are
    /// returned in their IPv4-mapped IPv6 form.
    fn into_mapped_bytes(self) -> [u8; 16];
}

//-------------- Ipv4 Type --------------------------------------------------

/// Exactly fitting IPv4 bytes (4 octets).
pub type IPv4 = zerocopy::U32<NetworkEndian>;

impl AddressFamily for IPv4 {
    const BITS: u8 = 32;
    const ENTRY: TrieEntry = TrieEntry::Ipv4Mapped;
    type InnerIpAddr = std::net::Ipv4Addr;

    fn from_ipaddr(ip_addr: Self::InnerIpAddr) -> Self {
        IPv4::from(ip_addr.octets())
    }

    fn into_ipaddr(self) -> std::net::IpAddr {
        std::net::IpAddr::V4(std::net::Ipv4Addr::from(u32::from(self)))
    }

    fn prefix_mask(len: u8) -> Self {
        trace!("IPv4 prefix mask for len {}", len);
        let shift = 32_u32.saturating_sub(len as u32);
        U32::<NetworkEndian>::from(u32::MAX.checked_shl(shift).unwrap_or(0))
    }

    fn into_mapped_bytes(self) -> [u8; 16] {
        let mut bytes = [0_u8; 16];
        let (prefix, addr) = bytes.split_at_mut(IPV4_MAPPED_PREFIX.len());
        prefix.copy_from_slice(&IPV4_MAPPED_PREFIX);
        addr.copy_from_slice(self.as_bytes());
        bytes
    }
}

//-------------- Ipv6 Type --------------------------------------------------

/// Exactly fitting IPv6 bytes (16 octets).
pub type IPv6 = U128<NetworkEndian>;

impl AddressFamily for IPv6 {
    const BITS: u8 = 128;
    const ENTRY: TrieEntry = TrieEntry::Root;
    type InnerIpAddr = std::net::Ipv6Addr;

    fn from_ipaddr(ip_addr: Self::InnerIpAddr) -> Self {
        IPv6::from(ip_addr.octets())
    }

    fn into_ipaddr(self) -> std::net::IpAddr {
        std::net::IpAddr::V6(std::net::Ipv6Addr::from(u128::from(self)))
    }

    fn prefix_mask(len: u8) -> Self {
        trace!("IPv6 prefix mask for len {}", len);
        let shift = 128_u32.saturating_sub(len as u32);
        U128::<NetworkEndian>::from(u128::MAX.checked_shl(shift).unwrap_or(0))
    }

    fn into_mapped_bytes(self) -> [u8; 16] {
        self.to_bytes()
    }
}
