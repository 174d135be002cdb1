//! Range <-> prefix-set bridge (§4.9).

use std::fmt;

use crate::af::Address;
use crate::error::RangeError;
use crate::prefix::Prefix;

/// A non-empty, closed `[first, last]` address interval.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Range<AF: Address> {
    first: AF,
    last: AF,
}

impl<AF: Address> Range<AF> {
    pub fn new(first: AF, last: AF) -> Result<Self, RangeError> {
        if first > last {
            Err(RangeError::Empty)
        } else {
            Ok(Range { first, last })
        }
    }

    pub fn first(&self) -> AF {
        self.first
    }

    pub fn last(&self) -> AF {
        self.last
    }

    /// The range covered by a single prefix.
    pub fn from_prefix(prefix: &Prefix<AF>) -> Self {
        let first = prefix.network();
        let host_bits = AF::BITS - prefix.len();
        // `first` is network-masked, so its low `host_bits` bits are already
        // zero; setting them all to one gives the last address with no risk
        // of carrying into the network bits.
        let last = match AF::checked_pow2(host_bits) {
            Some(span) => {
                let offset = span
                    .checked_sub(pow2_one::<AF>())
                    .expect("2^n >= 1 for any n");
                first
                    .checked_add(offset)
                    .expect("network address plus host span stays within the address family")
            }
            None => AF::ALL_ONES,
        };
        Range { first, last }
    }

    /// Decomposes this range into the minimal list of power-of-two-aligned
    /// prefixes that exactly cover it (§4.9).
    ///
    /// Greedily emits, at each step, the largest prefix starting at `first`
    /// that both aligns on a power-of-two boundary and fits entirely within
    /// what remains of `[first, last]`.
    pub fn to_prefixes(&self) -> Vec<Prefix<AF>> {
        let mut out = Vec::new();
        let mut first = self.first;
        loop {
            let align: u8 = if first == AF::ZERO {
                AF::BITS
            } else {
                first.trailing_zeros() as u8
            };
            let max_host_bits = span_to_max_host_bits::<AF>(first, self.last);
            let host_bits = align.min(max_host_bits);
            out.push(Prefix::new_unchecked(first, AF::BITS - host_bits));
            match AF::checked_pow2(host_bits) {
                Some(block) => match first.checked_add(block) {
                    Some(next) if next <= self.last => first = next,
                    _ => break,
                },
                None => break, // host_bits == BITS: block was the whole space
            }
        }
        out
    }
}

/// The largest number of host bits `h` such that `first + (2^h - 1) <= last`.
fn span_to_max_host_bits<AF: Address>(first: AF, last: AF) -> u8 {
    if first == AF::ZERO && last == AF::ALL_ONES {
        return AF::BITS;
    }
    // span + 1 cannot overflow: span == ALL_ONES is only possible when
    // first == ZERO and last == ALL_ONES, already handled above.
    let span = last.checked_sub(first).expect("last >= first by construction");
    let successor = span
        .checked_add(pow2_one::<AF>())
        .expect("span + 1 cannot overflow once the whole-space case is excluded");
    // successor == 2^h_max exactly or lies strictly between 2^(h_max-1) and
    // 2^h_max; either way bit_length(successor) - 1 is the largest h with
    // 2^h <= successor.
    successor.bit_length() - 1
}

fn pow2_one<AF: Address>() -> AF {
    AF::checked_pow2(0).expect("2^0 always fits")
}

impl<AF: Address> fmt::Display for Range<AF> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}]",
            self.first.fmt_network(),
            self.last.fmt_network()
        )
    }
}

/// Merges adjacent/overlapping prefix-derived ranges from a lexicographically
/// ordered sequence of prefixes into the minimal set of ranges.
pub(crate) fn prefixes_to_ranges<AF: Address>(
    prefixes: impl IntoIterator<Item = Prefix<AF>>,
) -> Vec<Range<AF>> {
    let mut out: Vec<Range<AF>> = Vec::new();
    for prefix in prefixes {
        let r = Range::from_prefix(&prefix);
        match out.last_mut() {
            Some(prev)
                if prev
                    .last
                    .checked_add(pow2_one::<AF>())
                    .is_some_and(|succ| succ == r.first) =>
            {
                prev.last = r.last;
            }
            _ => out.push(r),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_range() {
        assert_eq!(Range::new(5u32, 4u32), Err(RangeError::Empty));
        assert!(Range::new(5u32, 5u32).is_ok());
    }

    #[test]
    fn range_to_prefixes_scenario() {
        let r = Range::new(
            u32::from(std::net::Ipv4Addr::new(7, 0, 37, 17)),
            u32::from(std::net::Ipv4Addr::new(13, 8, 222, 113)),
        )
        .unwrap();
        let prefixes = r.to_prefixes();
        assert_eq!(prefixes.len(), 33);
        assert_eq!(prefixes[0], Prefix::new_unchecked(r.first(), 32));
        assert_eq!(
            prefixes[1],
            Prefix::new_unchecked(
                u32::from(std::net::Ipv4Addr::new(7, 0, 37, 18)),
                31
            )
        );
        assert_eq!(
            *prefixes.last().unwrap(),
            Prefix::new_unchecked(
                u32::from(std::net::Ipv4Addr::new(13, 8, 222, 112)),
                31
            )
        );
    }

    #[test]
    fn range_to_set_to_ranges_roundtrip() {
        let r = Range::new(10u32, 20u32).unwrap();
        let prefixes = r.to_prefixes();
        let back = prefixes_to_ranges(prefixes);
        assert_eq!(back, vec![r]);
    }

    #[test]
    fn single_element_range() {
        let r = Range::new(42u32, 42u32).unwrap();
        assert_eq!(r.to_prefixes(), vec![Prefix::new_unchecked(42, 32)]);
    }

    #[test]
    fn whole_address_space() {
        let r = Range::new(0u32, u32::MAX).unwrap();
        assert_eq!(r.to_prefixes(), vec![Prefix::new_unchecked(0, 0)]);
    }
}
