use std::fmt;

/// Possible errors returned while parsing an address specification. All of
/// these errors mean the same thing to the caller: the text is not a valid
/// specification, and nothing was constructed from it. The variant tells
/// why.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressSpecError {
    /// The text, or one of its parts, is not an IPv4 or IPv6 address.
    MalformedAddress,
    /// The text contains a `-`, but does not consist of exactly two
    /// addresses separated by it.
    MalformedRange,
    /// The lower endpoint of a range is not strictly smaller than the
    /// higher endpoint. A range over a single address should be written as
    /// that address instead.
    EmptyRange,
    /// The two endpoints of a range are of different address families.
    MixedFamilies,
    /// A prefix length of zero was requested. Prefixes covering the whole
    /// address space are not supported.
    ZeroPrefixLength,
    /// The prefix length is not a number, or is larger than the width of
    /// the address family.
    PrefixLengthInvalid,
}

impl std::error::Error for AddressSpecError {}

impl fmt::Display for AddressSpecError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            AddressSpecError::MalformedAddress => {
                write!(f, "Error: The address cannot be parsed.")
            }
            AddressSpecError::MalformedRange => {
                write!(
                    f,
                    "Error: A range should consist of exactly two \
                    addresses separated by '-'."
                )
            }
            AddressSpecError::EmptyRange => {
                write!(
                    f,
                    "Error: The first address of the range should be \
                    smaller than the last address."
                )
            }
            AddressSpecError::MixedFamilies => {
                write!(
                    f,
                    "Error: The endpoints of the range belong to different \
                    address families."
                )
            }
            AddressSpecError::ZeroPrefixLength => {
                write!(f, "Error: A prefix length of zero is not supported.")
            }
            AddressSpecError::PrefixLengthInvalid => {
                write!(f, "Error: The specified Prefix length is invalid.")
            }
        }
    }
}
