use std::cmp::Ordering;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;
use std::sync::OnceLock;

use inetnum::addr::Prefix;
use log::trace;
use num_bigint::BigUint;
use num_traits::{One, Zero};
use zerocopy::IntoBytes;

use super::af::{AddressFamily, IPv4, IPv6};
use super::errors::AddressSpecError;

//------------ SpecKind ------------------------------------------------------

/// The two shapes an address specification can take.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SpecKind {
    /// A prefix. `address` is the address as it was written, `prefix` the
    /// network it belongs to, i.e. `address` truncated to the prefix
    /// length.
    Cidr { address: IpAddr, prefix: Prefix },
    /// An explicit range of addresses, both endpoints inclusive. `low` is
    /// always strictly smaller than `high`, and both are of the same
    /// address family.
    Range { low: IpAddr, high: IpAddr },
}

//------------ AddressSpec ---------------------------------------------------

/// A parsed and normalized address specification, either a CIDR prefix or
/// an explicit range.
///
/// An `AddressSpec` is created by parsing one of the textual forms
/// `<addr>`, `<addr>/<len>`, or `<addr1>-<addr2>`:
///
/// ```
/// use iprange_store::AddressSpec;
///
/// let spec: AddressSpec = "192.168.100.1-192.168.100.100".parse().unwrap();
/// assert_eq!(spec.cardinality(), &100_u32.into());
/// assert_eq!(spec.to_string(), "192.168.100.1-192.168.100.100");
/// ```
///
/// The number of addresses covered by an `AddressSpec` is calculated on
/// first use and cached. IPv6 specifications can cover more addresses than
/// fit in any primitive integer, so this is an arbitrary precision number.
#[derive(Clone, Debug)]
pub struct AddressSpec {
    kind: SpecKind,
    cardinality: OnceLock<BigUint>,
}

impl AddressSpec {
    /// Parse a textual address specification.
    ///
    /// Text containing a `-` is parsed as a range, everything else as a
    /// CIDR prefix. A bare address is a prefix with the host length of its
    /// family (`/32` or `/128`).
    pub fn parse(s: &str) -> Result<Self, AddressSpecError> {
        let s = s.trim();
        if s.contains('-') {
            Self::parse_range(s)
        } else {
            Self::parse_cidr(s)
        }
    }

    fn parse_range(s: &str) -> Result<Self, AddressSpecError> {
        let mut parts = s.split('-');
        let (Some(low), Some(high), None) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(AddressSpecError::MalformedRange);
        };

        let low = parse_addr(low)?;
        let high = parse_addr(high)?;

        if low.is_ipv4() != high.is_ipv4() {
            return Err(AddressSpecError::MixedFamilies);
        }

        // Within one family the order of IpAddr is the order of its bytes.
        if low >= high {
            return Err(AddressSpecError::EmptyRange);
        }

        trace!("parsed range {}-{}", low, high);
        Ok(Self {
            kind: SpecKind::Range { low, high },
            cardinality: OnceLock::new(),
        })
    }

    fn parse_cidr(s: &str) -> Result<Self, AddressSpecError> {
        let (addr, len) = match s.split_once('/') {
            Some((addr, len)) => (addr, Some(len)),
            None => (s, None),
        };

        let address = parse_addr(addr)?;
        let max_len = family_bits(&address);

        let cardinality = OnceLock::new();
        let len = match len {
            Some(len) => len
                .trim()
                .parse::<u8>()
                .map_err(|_| AddressSpecError::PrefixLengthInvalid)?,
            None => {
                // A bare address is a single host, no need to go through
                // the mask to find that out.
                let _ = cardinality.set(BigUint::one());
                max_len
            }
        };

        if len == 0 {
            return Err(AddressSpecError::ZeroPrefixLength);
        }
        if len > max_len {
            return Err(AddressSpecError::PrefixLengthInvalid);
        }

        let prefix = Prefix::new_relaxed(address, len)
            .map_err(|_| AddressSpecError::PrefixLengthInvalid)?;

        trace!("parsed cidr {} (network {}/{})", address, prefix.addr(), len);
        Ok(Self {
            kind: SpecKind::Cidr { address, prefix },
            cardinality,
        })
    }

    pub fn kind(&self) -> &SpecKind {
        &self.kind
    }

    pub fn is_ipv4(&self) -> bool {
        self.first().is_ipv4()
    }

    pub fn is_ipv6(&self) -> bool {
        self.first().is_ipv6()
    }

    /// The prefix mask of a CIDR specification in the canonical 16 byte
    /// form. IPv4 masks are preceded by 12 bytes of all ones, so that they
    /// line up with the IPv4-mapped form of the address. Ranges have no
    /// mask.
    pub fn mask(&self) -> Option<[u8; 16]> {
        let SpecKind::Cidr { prefix, .. } = self.kind else {
            return None;
        };

        let mask = match prefix.addr() {
            IpAddr::V4(_) => {
                let mut mask = [u8::MAX; 16];
                let (_, v4) = mask.split_at_mut(12);
                v4.copy_from_slice(IPv4::prefix_mask(prefix.len()).as_bytes());
                mask
            }
            IpAddr::V6(_) => IPv6::prefix_mask(prefix.len()).to_bytes(),
        };
        Some(mask)
    }

    /// The lowest address covered by this specification.
    pub fn first(&self) -> IpAddr {
        match self.kind {
            SpecKind::Cidr { prefix, .. } => prefix.addr(),
            SpecKind::Range { low, .. } => low,
        }
    }

    /// The highest address covered by this specification.
    pub fn last(&self) -> IpAddr {
        match self.kind {
            SpecKind::Range { high, .. } => high,
            SpecKind::Cidr { prefix, .. } => match prefix.addr() {
                IpAddr::V4(net) => {
                    let host = !u32::from(IPv4::prefix_mask(prefix.len()));
                    Ipv4Addr::from(u32::from(net) | host).into()
                }
                IpAddr::V6(net) => {
                    let host = !u128::from(IPv6::prefix_mask(prefix.len()));
                    Ipv6Addr::from(u128::from(net) | host).into()
                }
            },
        }
    }

    /// Whether `addr` lies between the first and the last address of this
    /// specification. Only addresses of the same family as the
    /// specification are considered, IPv4-mapped IPv6 addresses count as
    /// IPv4.
    pub fn covers(&self, addr: IpAddr) -> bool {
        let addr = addr.to_canonical();
        if addr.is_ipv4() != self.is_ipv4() {
            return false;
        }
        self.first() <= addr && addr <= self.last()
    }

    /// The number of addresses covered by this specification.
    pub fn cardinality(&self) -> &BigUint {
        self.cardinality.get_or_init(|| self.count_addresses())
    }

    /// Compare the number of addresses covered by `self` and `other`.
    pub fn cmp_cardinality(&self, other: &Self) -> Ordering {
        self.cardinality().cmp(other.cardinality())
    }

    fn count_addresses(&self) -> BigUint {
        match self.kind {
            SpecKind::Cidr { .. } => {
                let mut count = BigUint::zero();
                let mut partial = false;
                for m in self.mask().unwrap_or([u8::MAX; 16]) {
                    count <<= 8_usize;
                    // A prefix mask has at most one byte that is neither
                    // all ones nor all zeros, and only bytes of all zeros
                    // after it.
                    if m != u8::MAX && !partial {
                        count += 256_u32 - u32::from(m);
                        partial = true;
                    }
                }
                if partial {
                    count
                } else {
                    BigUint::one()
                }
            }
            SpecKind::Range { low, high } => {
                // high > low, guaranteed by the parser.
                BigUint::from_bytes_be(&mapped_bytes(high))
                    - BigUint::from_bytes_be(&mapped_bytes(low))
                    + BigUint::one()
            }
        }
    }
}

impl PartialEq for AddressSpec {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Eq for AddressSpec {}

impl FromStr for AddressSpec {
    type Err = AddressSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for AddressSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SpecKind::Range { low, high } => write!(f, "{}-{}", low, high),
            SpecKind::Cidr { address, .. } if self.cardinality().is_one() => {
                write!(f, "{}", address)
            }
            SpecKind::Cidr { prefix, .. } => {
                write!(f, "{}/{}", prefix.addr(), prefix.len())
            }
        }
    }
}

impl serde::Serialize for AddressSpec {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for AddressSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        AddressSpec::parse(&s).map_err(serde::de::Error::custom)
    }
}

//------------ Helpers -------------------------------------------------------

fn parse_addr(s: &str) -> Result<IpAddr, AddressSpecError> {
    IpAddr::from_str(s.trim()).map_err(|_| AddressSpecError::MalformedAddress)
}

fn family_bits(addr: &IpAddr) -> u8 {
    match addr {
        IpAddr::V4(_) => IPv4::BITS,
        IpAddr::V6(_) => IPv6::BITS,
    }
}

/// The canonical 16 byte form of `addr`.
pub(crate) fn mapped_bytes(addr: IpAddr) -> [u8; 16] {
    match addr {
        IpAddr::V4(addr) => IPv4::from_ipaddr(addr).into_mapped_bytes(),
        IpAddr::V6(addr) => IPv6::from_ipaddr(addr).into_mapped_bytes(),
    }
}
