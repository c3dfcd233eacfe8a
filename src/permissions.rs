//! Owner/group/other permission sets.
//!
//! [`Permissions`] is the portable, semantic view of the nine POSIX permission
//! bits. The engine stores permissions as native mode bits; the translation in
//! both directions goes through one fixed table, so bits outside the nine
//! listed there are ignored when reading and never produced when writing.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign, Not};

/// A set of read/write/execute permissions for owner, group and others.
///
/// # Example
///
/// ```rust
/// use archivum::Permissions;
///
/// let perms = Permissions::READ_OWNER | Permissions::WRITE_OWNER | Permissions::READ_GROUP;
/// assert!(perms.contains(Permissions::READ_OWNER));
/// assert_eq!(perms.to_mode(), 0o640);
/// assert_eq!(Permissions::from_mode(0o100640), perms);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Permissions(u16);

impl Permissions {
    /// Owner may read.
    pub const READ_OWNER: Self = Self(1 << 0);
    /// Owner may write.
    pub const WRITE_OWNER: Self = Self(1 << 1);
    /// Owner may execute.
    pub const EXE_OWNER: Self = Self(1 << 2);
    /// Group may read.
    pub const READ_GROUP: Self = Self(1 << 3);
    /// Group may write.
    pub const WRITE_GROUP: Self = Self(1 << 4);
    /// Group may execute.
    pub const EXE_GROUP: Self = Self(1 << 5);
    /// Others may read.
    pub const READ_OTHER: Self = Self(1 << 6);
    /// Others may write.
    pub const WRITE_OTHER: Self = Self(1 << 7);
    /// Others may execute.
    pub const EXE_OTHER: Self = Self(1 << 8);

    /// The single-permission flags, in table order.
    pub const FLAGS: [Permissions; 9] = [
        Self::READ_OWNER,
        Self::WRITE_OWNER,
        Self::EXE_OWNER,
        Self::READ_GROUP,
        Self::WRITE_GROUP,
        Self::EXE_GROUP,
        Self::READ_OTHER,
        Self::WRITE_OTHER,
        Self::EXE_OTHER,
    ];

    /// The empty set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// All nine permissions.
    pub const fn all() -> Self {
        Self(0x1ff)
    }

    /// Builds a set from its raw flag bits; bits above the ninth are dropped.
    pub const fn from_bits_truncate(bits: u16) -> Self {
        Self(bits & 0x1ff)
    }

    /// Returns the raw flag bits (not mode bits; see [`to_mode`](Self::to_mode)).
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Combines two sets in a `const` context.
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns true if every flag of `other` is set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns true if no flag is set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Translates native mode bits into a permission set.
    pub fn from_mode(mode: u32) -> Self {
        MODE_TABLE
            .iter()
            .filter(|(_, bit)| mode & bit != 0)
            .fold(Self::empty(), |acc, (flag, _)| acc | *flag)
    }

    /// Translates the set into native mode bits.
    pub fn to_mode(self) -> u32 {
        MODE_TABLE
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .fold(0, |acc, (_, bit)| acc | bit)
    }
}

/// Semantic flag ↔ native mode bit.
const MODE_TABLE: [(Permissions, u32); 9] = [
    (Permissions::READ_OWNER, 0o400),
    (Permissions::WRITE_OWNER, 0o200),
    (Permissions::EXE_OWNER, 0o100),
    (Permissions::READ_GROUP, 0o040),
    (Permissions::WRITE_GROUP, 0o020),
    (Permissions::EXE_GROUP, 0o010),
    (Permissions::READ_OTHER, 0o004),
    (Permissions::WRITE_OTHER, 0o002),
    (Permissions::EXE_OTHER, 0o001),
];

impl BitOr for Permissions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for Permissions {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Permissions {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl Not for Permissions {
    type Output = Self;

    fn not(self) -> Self {
        Self(!self.0 & 0x1ff)
    }
}

impl fmt::Debug for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Permissions({self})")
    }
}

/// Formats as `ls`-style `rwxr-xr-x`.
impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const LETTERS: [char; 3] = ['r', 'w', 'x'];
        for (i, flag) in Self::FLAGS.iter().enumerate() {
            let c = if self.contains(*flag) { LETTERS[i % 3] } else { '-' };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}
