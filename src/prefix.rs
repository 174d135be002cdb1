use std::cmp::Ordering;
use std::fmt;

use crate::af::Address;
use crate::error::PrefixError;

//------------ Prefix ---------------------------------------------------------

/// An address paired with a prefix length.
///
/// Host bits (the bits beyond `len`) are preserved verbatim: they are part
/// of the value for display and for [`PartialEq`]/[`Eq`]/[`Hash`], but every
/// trie operation masks them off first, so two prefixes that differ only in
/// host bits occupy the same trie slot even though they do not compare
/// equal as `Prefix` values.
#[derive(Copy, Clone)]
pub struct Prefix<AF: Address> {
    addr: AF,
    len: u8,
}

impl<AF: Address> Prefix<AF> {
    /// Builds a prefix, rejecting a length wider than the address family.
    pub fn new(addr: AF, len: u8) -> Result<Self, PrefixError> {
        if len > AF::BITS {
            return Err(PrefixError::LengthOutOfRange {
                len,
                max: AF::BITS,
            });
        }
        Ok(Prefix { addr, len })
    }

    /// Builds a prefix without checking `len`.
    ///
    /// # Panics
    /// Panics (in debug builds) if `len > AF::BITS`; callers outside this
    /// crate should prefer [`Prefix::new`].
    pub(crate) fn new_unchecked(addr: AF, len: u8) -> Self {
        debug_assert!(len <= AF::BITS);
        Prefix { addr, len }
    }

    pub fn address(&self) -> AF {
        self.addr
    }

    pub fn len(&self) -> u8 {
        self.len
    }

    pub fn is_host(&self) -> bool {
        self.len == AF::BITS
    }

    /// The address with host bits cleared -- the canonical trie key.
    pub fn network(&self) -> AF {
        self.addr.mask(self.len)
    }

    /// A copy of this prefix with host bits cleared.
    pub fn masked(&self) -> Self {
        Prefix {
            addr: self.network(),
            len: self.len,
        }
    }

    pub(crate) fn bit_at(&self, pos: u8) -> u8 {
        self.addr.bit(pos)
    }
}

impl<AF: Address> fmt::Display for Prefix<AF> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network().fmt_network(), self.len)
    }
}

impl<AF: Address> fmt::Debug for Prefix<AF> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} ({:?})", self.addr.fmt_network(), self.len, self.addr)
    }
}

// PartialEq/Hash compare the literal value (including host bits), per
// §9's note on preserving ambiguous source behaviour: two prefixes that
// share a trie slot because they mask to the same network are not
// necessarily `==` as values.
impl<AF: Address> PartialEq for Prefix<AF> {
    fn eq(&self, other: &Self) -> bool {
        self.addr == other.addr && self.len == other.len
    }
}

impl<AF: Address> Eq for Prefix<AF> {}

impl<AF: Address> std::hash::Hash for Prefix<AF> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.addr.hash(state);
        self.len.hash(state);
    }
}

// Ord/PartialOrd order by masked address first (so prefixes sort into
// lexicographic trie order), then by length (shorter, i.e. less specific,
// first) to break ties between a prefix and one it contains.
impl<AF: Address> PartialOrd for Prefix<AF> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<AF: Address> Ord for Prefix<AF> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.network()
            .cmp(&other.network())
            .then(self.len.cmp(&other.len))
    }
}

#[cfg(feature = "serde")]
impl<AF: Address + serde::Serialize> serde::Serialize for Prefix<AF> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("Prefix", 2)?;
        s.serialize_field("addr", &self.addr)?;
        s.serialize_field("len", &self.len)?;
        s.end()
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawPrefix<AF> {
    addr: AF,
    len: u8,
}

#[cfg(feature = "serde")]
impl<'de, AF: Address + serde::Deserialize<'de>> serde::Deserialize<'de>
    for Prefix<AF>
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawPrefix::<AF>::deserialize(deserializer)?;
        Prefix::new(raw.addr, raw.len).map_err(serde::de::Error::custom)
    }
}

//------------ inetnum interop -------------------------------------------------

impl TryFrom<inetnum::addr::Prefix> for Prefix<u32> {
    type Error = PrefixError;

    fn try_from(value: inetnum::addr::Prefix) -> Result<Self, Self::Error> {
        match value.addr() {
            std::net::IpAddr::V4(addr) => {
                Prefix::new(u32::from(addr), value.len())
            }
            std::net::IpAddr::V6(_) => Err(PrefixError::LengthOutOfRange {
                len: value.len(),
                max: u32::BITS as u8,
            }),
        }
    }
}

impl TryFrom<inetnum::addr::Prefix> for Prefix<u128> {
    type Error = PrefixError;

    fn try_from(value: inetnum::addr::Prefix) -> Result<Self, Self::Error> {
        match value.addr() {
            std::net::IpAddr::V6(addr) => {
                Prefix::new(u128::from(addr), value.len())
            }
            std::net::IpAddr::V4(addr) => Prefix::new(
                u128::from(addr.to_ipv6_mapped()),
                value.len() + 96,
            ),
        }
    }
}

impl From<Prefix<u32>> for inetnum::addr::Prefix {
    fn from(value: Prefix<u32>) -> Self {
        inetnum::addr::Prefix::new(value.addr.into_ip_addr(), value.len)
            .expect("Prefix<u32> always has a valid IPv4 length")
    }
}

impl From<Prefix<u128>> for inetnum::addr::Prefix {
    fn from(value: Prefix<u128>) -> Self {
        inetnum::addr::Prefix::new(value.addr.into_ip_addr(), value.len)
            .expect("Prefix<u128> always has a valid IPv6 length")
    }
}

//------------ Containment / compare primitives (§4.1) -------------------------

/// Result of `contains(shorter, longer)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Contains {
    pub matches: bool,
    pub exact: bool,
    pub common: u8,
    pub child: u8,
}

/// `shorter` must have `len <= longer.len`.
pub(crate) fn contains<AF: Address>(
    shorter: &Prefix<AF>,
    longer: &Prefix<AF>,
) -> Contains {
    debug_assert!(shorter.len <= longer.len);
    let common = shorter.network().common_prefix_len(
        longer.network(),
        shorter.len,
    );
    let matches = common == shorter.len;
    let exact = matches && shorter.len == longer.len;
    let child = if shorter.len < AF::BITS {
        longer.bit_at(common.min(AF::BITS - 1))
    } else {
        0
    };
    Contains {
        matches,
        exact,
        common,
        child,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Relation {
    Same,
    /// `a` contains `b` (`a` is shorter or equal and a prefix of `b`).
    Contains,
    /// `a` is contained by `b`.
    IsContained,
    Disjoint,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Compare {
    pub relation: Relation,
    pub reversed: bool,
    pub common: u8,
    pub child: u8,
}

/// Orients `contains` so callers need not pre-sort by length.
pub(crate) fn compare<AF: Address>(
    a: &Prefix<AF>,
    b: &Prefix<AF>,
) -> Compare {
    match a.len.cmp(&b.len) {
        Ordering::Equal => {
            let c = contains(a, b);
            Compare {
                relation: if c.matches {
                    Relation::Same
                } else {
                    Relation::Disjoint
                },
                reversed: false,
                common: c.common,
                child: c.child,
            }
        }
        Ordering::Less => {
            let c = contains(a, b);
            Compare {
                relation: if c.matches {
                    Relation::Contains
                } else {
                    Relation::Disjoint
                },
                reversed: false,
                common: c.common,
                child: c.child,
            }
        }
        Ordering::Greater => {
            let c = contains(b, a);
            Compare {
                relation: if c.matches {
                    Relation::IsContained
                } else {
                    Relation::Disjoint
                },
                reversed: true,
                common: c.common,
                child: c.child,
            }
        }
    }
}
