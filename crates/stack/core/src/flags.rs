//! Fixed-universe flag sets over small closed enums.
//!
//! A [`FlagSet`] stores one bit per enum variant plus a wildcard bit that
//! implies every variant. The wildcard backs configuration lists written as
//! `["ALL"]` and is kept separate from the bit storage, so the set never has to
//! enumerate the universe to answer a membership query.

use std::fmt;
use std::marker::PhantomData;

use strum::{EnumCount, IntoEnumIterator};

/// Name accepted in configuration lists for the wildcard.
pub const WILDCARD: &str = "ALL";

/// Enums that can index a [`FlagSet`].
pub trait FlagKind: Copy + Eq + EnumCount + IntoEnumIterator + 'static {
    /// Position of the variant in declaration order.
    fn ordinal(self) -> usize;
}

/// Implements [`FlagKind`] for fieldless enums using their discriminant.
#[macro_export]
macro_rules! impl_flag_kind {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::flags::FlagKind for $ty {
                #[inline]
                fn ordinal(self) -> usize {
                    self as usize
                }
            }
        )*
    };
}

/// Boolean states tracked on every entity stack.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumCount,
    strum::EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum EntityFlag {
    /// A death transaction is between its unstack and its commit.
    DeathTransaction,
    /// The stack reached zero and its representative is scheduled for removal.
    Removed,
    /// Experience owed by an earlier suppressed death is waiting to drop.
    PendingExperience,
}

impl_flag_kind!(EntityFlag);

/// Bitset over the variants of `E` with an "implies all" wildcard.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlagSet<E: FlagKind> {
    bits: u64,
    wildcard: bool,
    _kind: PhantomData<E>,
}

impl<E: FlagKind> FlagSet<E> {
    const FITS: () = assert!(E::COUNT <= 64, "flag universe exceeds 64 variants");

    /// Creates an empty set.
    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::FITS;
        Self {
            bits: 0,
            wildcard: false,
            _kind: PhantomData,
        }
    }

    /// Creates a set whose wildcard implies every variant.
    pub fn all() -> Self {
        let mut set = Self::new();
        set.wildcard = true;
        set
    }

    #[inline]
    fn mask(flag: E) -> u64 {
        1u64 << flag.ordinal()
    }

    fn full_bits() -> u64 {
        if E::COUNT == 64 {
            u64::MAX
        } else {
            (1u64 << E::COUNT) - 1
        }
    }

    /// Returns true if `flag` is set explicitly or implied by the wildcard.
    #[inline]
    pub fn contains(&self, flag: E) -> bool {
        self.wildcard || self.bits & Self::mask(flag) != 0
    }

    /// Sets `flag`. Returns true if it was not already contained.
    pub fn insert(&mut self, flag: E) -> bool {
        let was = self.contains(flag);
        self.bits |= Self::mask(flag);
        !was
    }

    /// Clears `flag`. Returns true if it was contained.
    ///
    /// Removing from a wildcard set materializes the wildcard into explicit
    /// bits first, so every other variant stays contained.
    pub fn remove(&mut self, flag: E) -> bool {
        let was = self.contains(flag);
        if self.wildcard {
            self.wildcard = false;
            self.bits = Self::full_bits();
        }
        self.bits &= !Self::mask(flag);
        was
    }

    /// Sets or clears `flag` depending on `value`.
    pub fn set(&mut self, flag: E, value: bool) {
        if value {
            self.insert(flag);
        } else {
            self.remove(flag);
        }
    }

    /// Turns on the wildcard.
    pub fn insert_all(&mut self) {
        self.wildcard = true;
    }

    /// Clears every bit and the wildcard.
    pub fn clear(&mut self) {
        self.bits = 0;
        self.wildcard = false;
    }

    /// Returns true if the wildcard is on.
    pub fn is_wildcard(&self) -> bool {
        self.wildcard
    }

    pub fn is_empty(&self) -> bool {
        !self.wildcard && self.bits == 0
    }

    /// Iterates contained variants in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = E> + '_ {
        E::iter().filter(move |flag| self.contains(*flag))
    }
}

impl<E: FlagKind> Default for FlagSet<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: FlagKind> FromIterator<E> for FlagSet<E> {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        let mut set = Self::new();
        for flag in iter {
            set.insert(flag);
        }
        set
    }
}

impl<E: FlagKind + fmt::Debug> fmt::Debug for FlagSet<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.wildcard {
            return f.write_str("FlagSet(ALL)");
        }
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use std::fmt;
    use std::marker::PhantomData;
    use std::str::FromStr;

    use serde::de::{self, SeqAccess, Visitor};
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::{FlagKind, FlagSet, WILDCARD};

    impl<E: FlagKind + AsRef<str>> Serialize for FlagSet<E> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            if self.is_wildcard() {
                let mut seq = serializer.serialize_seq(Some(1))?;
                seq.serialize_element(WILDCARD)?;
                return seq.end();
            }
            let flags: Vec<E> = self.iter().collect();
            let mut seq = serializer.serialize_seq(Some(flags.len()))?;
            for flag in &flags {
                seq.serialize_element(flag.as_ref())?;
            }
            seq.end()
        }
    }

    struct FlagSetVisitor<E>(PhantomData<E>);

    impl<'de, E: FlagKind + FromStr> Visitor<'de> for FlagSetVisitor<E> {
        type Value = FlagSet<E>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "a list of names or \"{WILDCARD}\"")
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut set = FlagSet::new();
            while let Some(name) = seq.next_element::<String>()? {
                if name.eq_ignore_ascii_case(WILDCARD) {
                    set.insert_all();
                    continue;
                }
                let flag = E::from_str(&name)
                    .map_err(|_| de::Error::custom(format!("unknown name `{name}`")))?;
                set.insert(flag);
            }
            Ok(set)
        }
    }

    impl<'de, E: FlagKind + FromStr> Deserialize<'de> for FlagSet<E> {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_seq(FlagSetVisitor(PhantomData))
        }
    }
}
