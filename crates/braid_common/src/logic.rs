//! Single 4-state logic values with IEEE 1164 truth tables.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor, Not};

/// One bit of a 4-state signal.
///
/// The encoding (`repr(u8)`) is relied upon by [`LogicVec`](crate::LogicVec)'s
/// packed storage: two bits per value, `0b00` through `0b11`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[repr(u8)]
pub enum Logic {
    /// Driven low.
    Zero = 0,
    /// Driven high.
    One = 1,
    /// Unknown: contention, uninitialized storage, or an unknown operand.
    X = 2,
    /// High impedance: nothing drives the bit.
    Z = 3,
}

impl Logic {
    /// Parses one pattern character. Accepts `0`, `1`, `x`/`X` and `z`/`Z`.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(Logic::Zero),
            '1' => Some(Logic::One),
            'x' | 'X' => Some(Logic::X),
            'z' | 'Z' => Some(Logic::Z),
            _ => None,
        }
    }

    /// The diagnostic rendering of this bit: one of `0`, `1`, `x`, `z`.
    pub fn to_char(self) -> char {
        match self {
            Logic::Zero => '0',
            Logic::One => '1',
            Logic::X => 'x',
            Logic::Z => 'z',
        }
    }

    /// Returns `true` for `Zero` and `One`.
    pub fn is_valid(self) -> bool {
        matches!(self, Logic::Zero | Logic::One)
    }

    pub(crate) fn from_bits(bits: u64) -> Self {
        match bits & 0b11 {
            0 => Logic::Zero,
            1 => Logic::One,
            2 => Logic::X,
            _ => Logic::Z,
        }
    }
}

impl From<bool> for Logic {
    fn from(value: bool) -> Self {
        if value {
            Logic::One
        } else {
            Logic::Zero
        }
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// ```text
///     0  1  X  Z
/// 0 | 0  0  0  0
/// 1 | 0  1  X  X
/// X | 0  X  X  X
/// Z | 0  X  X  X
/// ```
impl BitAnd for Logic {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        use Logic::*;
        match (self, rhs) {
            (Zero, _) | (_, Zero) => Zero,
            (One, One) => One,
            _ => X,
        }
    }
}

/// ```text
///     0  1  X  Z
/// 0 | 0  1  X  X
/// 1 | 1  1  1  1
/// X | X  1  X  X
/// Z | X  1  X  X
/// ```
impl BitOr for Logic {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        use Logic::*;
        match (self, rhs) {
            (One, _) | (_, One) => One,
            (Zero, Zero) => Zero,
            _ => X,
        }
    }
}

/// Any X or Z input makes the result X.
impl BitXor for Logic {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self {
        use Logic::*;
        match (self, rhs) {
            (Zero, Zero) | (One, One) => Zero,
            (Zero, One) | (One, Zero) => One,
            _ => X,
        }
    }
}

impl Not for Logic {
    type Output = Self;

    fn not(self) -> Self {
        use Logic::*;
        match self {
            Zero => One,
            One => Zero,
            X | Z => X,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Logic::{self, *};

    #[test]
    fn and_zero_dominates() {
        for v in [Zero, One, X, Z] {
            assert_eq!(Zero & v, Zero);
            assert_eq!(v & Zero, Zero);
        }
        assert_eq!(One & One, One);
        assert_eq!(One & X, X);
        assert_eq!(One & Z, X);
        assert_eq!(Z & Z, X);
    }

    #[test]
    fn or_one_dominates() {
        for v in [Zero, One, X, Z] {
            assert_eq!(One | v, One);
            assert_eq!(v | One, One);
        }
        assert_eq!(Zero | Zero, Zero);
        assert_eq!(Zero | X, X);
        assert_eq!(Z | Zero, X);
    }

    #[test]
    fn xor_unknown_poisons() {
        assert_eq!(Zero ^ One, One);
        assert_eq!(One ^ One, Zero);
        assert_eq!(Zero ^ Z, X);
        assert_eq!(X ^ One, X);
    }

    #[test]
    fn not_maps_z_to_x() {
        assert_eq!(!Zero, One);
        assert_eq!(!One, Zero);
        assert_eq!(!X, X);
        assert_eq!(!Z, X);
    }

    #[test]
    fn char_rendering_is_lowercase() {
        assert_eq!(X.to_char(), 'x');
        assert_eq!(format!("{Z}"), "z");
        assert_eq!(Logic::from_char('X'), Some(X));
        assert_eq!(Logic::from_char('2'), None);
    }

    #[test]
    fn validity() {
        assert!(Zero.is_valid());
        assert!(One.is_valid());
        assert!(!X.is_valid());
        assert!(!Z.is_valid());
        assert_eq!(Logic::from(true), One);
    }
}
