//! Immutable fixed-width vectors of 4-state logic values.
//!
//! [`LogicVec`] is the value type of every signal. All operators return a new
//! vector and leave their operands untouched. Operators follow hardware
//! simulator conventions:
//!
//! - bitwise operators combine per bit through the [`Logic`] truth tables;
//! - arithmetic and relational operators yield all-X as soon as any operand
//!   bit is X or Z, and division by zero yields all-X as well;
//! - binary operators require equal widths, except that a 1-bit operand is
//!   broadcast to the width of the other one.

use std::borrow::Cow;
use std::fmt;
use std::ops::Not;

use num_bigint::BigUint;
use num_traits::{One, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};

use crate::error::ValueError;
use crate::logic::Logic;

/// A vector of 4-state [`Logic`] values, bit 0 least significant.
///
/// Each value occupies 2 bits, 32 values per `u64` word. Bits of the last word
/// beyond `width` are kept at zero, so the derived `PartialEq` is exact
/// structural equality (`X != 0`, `Z != X`, and two identical X patterns are
/// equal).
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogicVec {
    width: u32,
    data: Vec<u64>,
}

/// Number of logic values packed per u64 word.
const VALUES_PER_WORD: u32 = 32;

impl LogicVec {
    /// Creates an all-zero vector of the given width.
    pub fn new(width: u32) -> Self {
        Self {
            width,
            data: vec![0; word_count(width)],
        }
    }

    /// Creates a vector with every bit set to `value`.
    pub fn filled(width: u32, value: Logic) -> Self {
        let mut v = Self::new(width);
        if value != Logic::Zero {
            for i in 0..width {
                v.set(i, value);
            }
        }
        v
    }

    /// Creates an all-zero vector.
    pub fn all_zero(width: u32) -> Self {
        Self::new(width)
    }

    /// Creates an all-one vector.
    pub fn all_one(width: u32) -> Self {
        Self::filled(width, Logic::One)
    }

    /// Creates an all-X vector.
    pub fn all_x(width: u32) -> Self {
        Self::filled(width, Logic::X)
    }

    /// Creates an all-Z vector.
    pub fn all_z(width: u32) -> Self {
        Self::filled(width, Logic::Z)
    }

    /// Creates a single-bit vector from a boolean.
    pub fn from_bool(value: bool) -> Self {
        Self::filled(1, Logic::from(value))
    }

    /// Creates a single-bit vector holding `value`.
    pub fn from_logic(value: Logic) -> Self {
        Self::filled(1, value)
    }

    /// Builds a vector from bits given least-significant first.
    pub fn from_logic_slice(bits: &[Logic]) -> Self {
        let mut v = Self::new(bits.len() as u32);
        for (i, bit) in bits.iter().enumerate() {
            v.set(i as u32, *bit);
        }
        v
    }

    /// Creates a vector from the low `width` bits of `value`.
    pub fn from_u64(value: u64, width: u32) -> Self {
        let mut v = Self::new(width);
        for i in 0..width.min(64) {
            if (value >> i) & 1 != 0 {
                v.set(i, Logic::One);
            }
        }
        v
    }

    /// Creates a vector from the low `width` bits of an arbitrary-precision integer.
    pub fn from_biguint(value: &BigUint, width: u32) -> Self {
        let bytes = value.to_bytes_le();
        let mut v = Self::new(width);
        for i in 0..width {
            let byte = bytes.get((i / 8) as usize).copied().unwrap_or(0);
            if (byte >> (i % 8)) & 1 != 0 {
                v.set(i, Logic::One);
            }
        }
        v
    }

    /// Parses a pattern like `"10xz"`, most significant bit first.
    ///
    /// Upper-case `X`/`Z` are accepted and `_` separators are skipped.
    pub fn from_binary_str(s: &str) -> Result<Self, ValueError> {
        let bits: Option<Vec<Logic>> = s
            .chars()
            .filter(|c| *c != '_')
            .rev()
            .map(Logic::from_char)
            .collect();
        bits.map(|b| Self::from_logic_slice(&b))
            .ok_or_else(|| ValueError::InvalidPattern(s.to_string()))
    }

    /// Alias of [`from_binary_str`](Self::from_binary_str).
    pub fn from_pattern(s: &str) -> Result<Self, ValueError> {
        Self::from_binary_str(s)
    }

    /// Returns the number of bits.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Gets the bit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn get(&self, index: u32) -> Logic {
        assert!(
            index < self.width,
            "index {index} out of bounds for width {}",
            self.width
        );
        let word_idx = (index / VALUES_PER_WORD) as usize;
        let bit_offset = (index % VALUES_PER_WORD) * 2;
        Logic::from_bits(self.data[word_idx] >> bit_offset)
    }

    fn set(&mut self, index: u32, value: Logic) {
        let word_idx = (index / VALUES_PER_WORD) as usize;
        let bit_offset = (index % VALUES_PER_WORD) * 2;
        let mask = !(0b11u64 << bit_offset);
        self.data[word_idx] = (self.data[word_idx] & mask) | ((value as u64) << bit_offset);
    }

    /// Iterates over the bits, least significant first.
    pub fn iter(&self) -> impl Iterator<Item = Logic> + '_ {
        (0..self.width).map(move |i| self.get(i))
    }

    /// Returns `true` if no bit is X or Z.
    pub fn is_valid(&self) -> bool {
        self.iter().all(Logic::is_valid)
    }

    /// Returns `true` if any bit is X or Z.
    pub fn has_xz(&self) -> bool {
        !self.is_valid()
    }

    /// Returns `true` if every bit is `Zero`.
    pub fn is_all_zero(&self) -> bool {
        self.data.iter().all(|w| *w == 0)
    }

    /// Returns `true` if every bit is `One`.
    pub fn is_all_one(&self) -> bool {
        self.iter().all(|b| b == Logic::One)
    }

    /// Returns `true` if the vector is valid and non-zero.
    pub fn to_bool(&self) -> bool {
        self.is_valid() && !self.is_all_zero()
    }

    /// Converts to `u64` when valid and no wider than 64 bits.
    pub fn to_u64(&self) -> Option<u64> {
        if self.width > 64 {
            return None;
        }
        self.to_biguint().and_then(|n| n.to_u64())
    }

    /// Converts to an arbitrary-precision integer when valid.
    pub fn to_biguint(&self) -> Option<BigUint> {
        if !self.is_valid() {
            return None;
        }
        let mut bytes = vec![0u8; self.width.div_ceil(8) as usize];
        for i in 0..self.width {
            if self.get(i) == Logic::One {
                bytes[(i / 8) as usize] |= 1 << (i % 8);
            }
        }
        Some(BigUint::from_bytes_le(&bytes))
    }

    // ---- bitwise ----

    /// Per-bit AND.
    pub fn and(&self, rhs: &LogicVec) -> Result<LogicVec, ValueError> {
        self.zip_bits("and", rhs, |a, b| a & b)
    }

    /// Per-bit OR.
    pub fn or(&self, rhs: &LogicVec) -> Result<LogicVec, ValueError> {
        self.zip_bits("or", rhs, |a, b| a | b)
    }

    /// Per-bit XOR.
    pub fn xor(&self, rhs: &LogicVec) -> Result<LogicVec, ValueError> {
        self.zip_bits("xor", rhs, |a, b| a ^ b)
    }

    fn zip_bits(
        &self,
        op: &'static str,
        rhs: &LogicVec,
        f: impl Fn(Logic, Logic) -> Logic,
    ) -> Result<LogicVec, ValueError> {
        let (l, r) = broadcast(op, self, rhs)?;
        let bits: Vec<Logic> = l.iter().zip(r.iter()).map(|(a, b)| f(a, b)).collect();
        Ok(LogicVec::from_logic_slice(&bits))
    }

    /// AND of all bits; any X/Z gives X.
    pub fn and_reduce(&self) -> LogicVec {
        if self.has_xz() {
            return LogicVec::all_x(1);
        }
        LogicVec::from_logic(self.iter().fold(Logic::One, |acc, b| acc & b))
    }

    /// OR of all bits; any X/Z gives X.
    pub fn or_reduce(&self) -> LogicVec {
        if self.has_xz() {
            return LogicVec::all_x(1);
        }
        LogicVec::from_logic(self.iter().fold(Logic::Zero, |acc, b| acc | b))
    }

    /// XOR of all bits (parity); any X/Z gives X.
    pub fn xor_reduce(&self) -> LogicVec {
        LogicVec::from_logic(self.iter().fold(Logic::Zero, |acc, b| acc ^ b))
    }

    /// 1 when more than one bit is set, 0 when at most one can be set,
    /// X when unknown bits leave the answer open.
    pub fn multi_hot(&self) -> LogicVec {
        let ones = self.iter().filter(|b| *b == Logic::One).count();
        let unknown = self.iter().filter(|b| !b.is_valid()).count();
        let result = if ones >= 2 {
            Logic::One
        } else if ones + unknown <= 1 {
            Logic::Zero
        } else {
            Logic::X
        };
        LogicVec::from_logic(result)
    }

    // ---- arithmetic ----

    /// Two's-complement negation.
    pub fn neg(&self) -> LogicVec {
        match self.to_biguint() {
            Some(a) => {
                let modulus = modulus(self.width);
                LogicVec::from_biguint(&((&modulus - a) % &modulus), self.width)
            }
            None => LogicVec::all_x(self.width),
        }
    }

    /// Wrapping addition.
    pub fn add(&self, rhs: &LogicVec) -> Result<LogicVec, ValueError> {
        self.arith("add", rhs, |a, b, _| Some(a + b))
    }

    /// Wrapping subtraction.
    pub fn sub(&self, rhs: &LogicVec) -> Result<LogicVec, ValueError> {
        self.arith("sub", rhs, |a, b, m| Some(a + m - b))
    }

    /// Wrapping multiplication.
    pub fn mul(&self, rhs: &LogicVec) -> Result<LogicVec, ValueError> {
        self.arith("mul", rhs, |a, b, _| Some(a * b))
    }

    /// Unsigned division; division by zero gives all-X.
    pub fn div(&self, rhs: &LogicVec) -> Result<LogicVec, ValueError> {
        self.arith("div", rhs, |a, b, _| (!b.is_zero()).then(|| a / b))
    }

    /// Unsigned remainder; a zero divisor gives all-X.
    pub fn rem(&self, rhs: &LogicVec) -> Result<LogicVec, ValueError> {
        self.arith("mod", rhs, |a, b, _| (!b.is_zero()).then(|| a % b))
    }

    /// Wrapping exponentiation.
    pub fn pow(&self, rhs: &LogicVec) -> Result<LogicVec, ValueError> {
        self.arith("pow", rhs, |a, b, m| Some(a.modpow(&b, m)))
    }

    fn arith(
        &self,
        op: &'static str,
        rhs: &LogicVec,
        f: impl Fn(BigUint, BigUint, &BigUint) -> Option<BigUint>,
    ) -> Result<LogicVec, ValueError> {
        let (l, r) = broadcast(op, self, rhs)?;
        let width = l.width();
        let modulus = modulus(width);
        let result = match (l.to_biguint(), r.to_biguint()) {
            (Some(a), Some(b)) => f(a, b, &modulus)
                .map(|v| LogicVec::from_biguint(&(v % &modulus), width))
                .unwrap_or_else(|| LogicVec::all_x(width)),
            _ => LogicVec::all_x(width),
        };
        Ok(result)
    }

    // ---- shifts ----

    /// Logical left shift by an amount of any width.
    pub fn shl(&self, amount: &LogicVec) -> LogicVec {
        self.shift(amount, |v, n, i| {
            if i >= n {
                v.get(i - n)
            } else {
                Logic::Zero
            }
        })
    }

    /// Logical right shift by an amount of any width.
    pub fn shr(&self, amount: &LogicVec) -> LogicVec {
        self.shift(amount, |v, n, i| {
            (i as u64 + n as u64)
                .try_into()
                .ok()
                .filter(|j: &u32| *j < v.width())
                .map_or(Logic::Zero, |j| v.get(j))
        })
    }

    /// Arithmetic right shift: vacated bits copy the sign bit.
    pub fn ashr(&self, amount: &LogicVec) -> LogicVec {
        self.shift(amount, |v, n, i| {
            let sign = v.get(v.width() - 1);
            (i as u64 + n as u64)
                .try_into()
                .ok()
                .filter(|j: &u32| *j < v.width())
                .map_or(sign, |j| v.get(j))
        })
    }

    fn shift(&self, amount: &LogicVec, bit: impl Fn(&LogicVec, u32, u32) -> Logic) -> LogicVec {
        if self.width == 0 {
            return self.clone();
        }
        let Some(n) = amount.to_biguint() else {
            return LogicVec::all_x(self.width);
        };
        let n = n.to_u32().unwrap_or(u32::MAX).min(self.width);
        let bits: Vec<Logic> = (0..self.width).map(|i| bit(self, n, i)).collect();
        LogicVec::from_logic_slice(&bits)
    }

    // ---- comparison ----

    /// Numeric equality (1 bit, X on unknown operands).
    pub fn cmp_eq(&self, rhs: &LogicVec) -> Result<LogicVec, ValueError> {
        self.compare("eq", rhs, |a, b| a == b)
    }

    /// Numeric inequality (1 bit, X on unknown operands).
    pub fn cmp_ne(&self, rhs: &LogicVec) -> Result<LogicVec, ValueError> {
        self.compare("neq", rhs, |a, b| a != b)
    }

    /// Unsigned less-than.
    pub fn cmp_lt(&self, rhs: &LogicVec) -> Result<LogicVec, ValueError> {
        self.compare("lt", rhs, |a, b| a < b)
    }

    /// Unsigned less-than-or-equal.
    pub fn cmp_le(&self, rhs: &LogicVec) -> Result<LogicVec, ValueError> {
        self.compare("lte", rhs, |a, b| a <= b)
    }

    /// Unsigned greater-than.
    pub fn cmp_gt(&self, rhs: &LogicVec) -> Result<LogicVec, ValueError> {
        self.compare("gt", rhs, |a, b| a > b)
    }

    /// Unsigned greater-than-or-equal.
    pub fn cmp_ge(&self, rhs: &LogicVec) -> Result<LogicVec, ValueError> {
        self.compare("gte", rhs, |a, b| a >= b)
    }

    fn compare(
        &self,
        op: &'static str,
        rhs: &LogicVec,
        f: impl Fn(&BigUint, &BigUint) -> bool,
    ) -> Result<LogicVec, ValueError> {
        let (l, r) = broadcast(op, self, rhs)?;
        Ok(match (l.to_biguint(), r.to_biguint()) {
            (Some(a), Some(b)) => LogicVec::from_bool(f(&a, &b)),
            _ => LogicVec::all_x(1),
        })
    }

    /// Exact 4-state equality (`===`): X matches X, Z matches Z.
    pub fn case_eq(&self, rhs: &LogicVec) -> bool {
        self == rhs
    }

    /// Matches against `pattern`, where Z bits of the pattern are wildcards.
    ///
    /// Returns X when an X/Z bit of `self` meets a non-wildcard pattern bit
    /// and no definite mismatch exists elsewhere.
    pub fn wildcard_match(&self, pattern: &LogicVec) -> Result<Logic, ValueError> {
        if self.width != pattern.width {
            return Err(ValueError::WidthMismatch {
                op: "casez",
                lhs: self.width,
                rhs: pattern.width,
            });
        }
        let mut result = Logic::One;
        for (s, p) in self.iter().zip(pattern.iter()) {
            match (s, p) {
                (_, Logic::Z) => {}
                (s, p) if s.is_valid() && p.is_valid() => {
                    if s != p {
                        return Ok(Logic::Zero);
                    }
                }
                _ => result = Logic::X,
            }
        }
        Ok(result)
    }

    // ---- selection and shaping ----

    /// Two-way select. An X/Z condition yields all-X.
    pub fn select(
        condition: &LogicVec,
        when_true: &LogicVec,
        when_false: &LogicVec,
    ) -> Result<LogicVec, ValueError> {
        if condition.width != 1 {
            return Err(ValueError::WidthMismatch {
                op: "mux condition",
                lhs: condition.width,
                rhs: 1,
            });
        }
        if when_true.width != when_false.width {
            return Err(ValueError::WidthMismatch {
                op: "mux",
                lhs: when_true.width,
                rhs: when_false.width,
            });
        }
        Ok(match condition.get(0) {
            Logic::One => when_true.clone(),
            Logic::Zero => when_false.clone(),
            Logic::X | Logic::Z => LogicVec::all_x(when_true.width),
        })
    }

    /// Extracts bits `high..=low`.
    pub fn slice(&self, high: u32, low: u32) -> Result<LogicVec, ValueError> {
        if high < low || high >= self.width {
            return Err(ValueError::InvalidSlice {
                high,
                low,
                width: self.width,
            });
        }
        let bits: Vec<Logic> = (low..=high).map(|i| self.get(i)).collect();
        Ok(LogicVec::from_logic_slice(&bits))
    }

    /// Pads with zeros up to `width`.
    pub fn zero_extend(&self, width: u32) -> Result<LogicVec, ValueError> {
        self.extend_with(width, Logic::Zero)
    }

    /// Pads with copies of the most significant bit up to `width`.
    pub fn sign_extend(&self, width: u32) -> Result<LogicVec, ValueError> {
        let sign = if self.width == 0 {
            Logic::Zero
        } else {
            self.get(self.width - 1)
        };
        self.extend_with(width, sign)
    }

    fn extend_with(&self, width: u32, fill: Logic) -> Result<LogicVec, ValueError> {
        if width < self.width {
            return Err(ValueError::InvalidExtension {
                from: self.width,
                to: width,
            });
        }
        let mut bits: Vec<Logic> = self.iter().collect();
        bits.resize(width as usize, fill);
        Ok(LogicVec::from_logic_slice(&bits))
    }

    /// Concatenates with the first element in the most significant position.
    pub fn swizzle(parts: &[LogicVec]) -> LogicVec {
        let bits: Vec<Logic> = parts.iter().rev().flat_map(|p| p.iter()).collect();
        LogicVec::from_logic_slice(&bits)
    }

    /// Concatenates with the first element in the least significant position.
    pub fn rswizzle(parts: &[LogicVec]) -> LogicVec {
        let bits: Vec<Logic> = parts.iter().flat_map(|p| p.iter()).collect();
        LogicVec::from_logic_slice(&bits)
    }
}

impl fmt::Display for LogicVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in (0..self.width).rev() {
            write!(f, "{}", self.get(i))?;
        }
        Ok(())
    }
}

impl fmt::Debug for LogicVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LogicVec({}'b{self})", self.width)
    }
}

impl Not for &LogicVec {
    type Output = LogicVec;

    fn not(self) -> LogicVec {
        let bits: Vec<Logic> = self.iter().map(|b| !b).collect();
        LogicVec::from_logic_slice(&bits)
    }
}

/// Aligns operand widths, broadcasting a 1-bit operand.
fn broadcast<'a>(
    op: &'static str,
    lhs: &'a LogicVec,
    rhs: &'a LogicVec,
) -> Result<(Cow<'a, LogicVec>, Cow<'a, LogicVec>), ValueError> {
    match (lhs.width, rhs.width) {
        (l, r) if l == r => Ok((Cow::Borrowed(lhs), Cow::Borrowed(rhs))),
        (1, r) => Ok((
            Cow::Owned(LogicVec::filled(r, lhs.get(0))),
            Cow::Borrowed(rhs),
        )),
        (l, 1) => Ok((
            Cow::Borrowed(lhs),
            Cow::Owned(LogicVec::filled(l, rhs.get(0))),
        )),
        (l, r) => Err(ValueError::WidthMismatch { op, lhs: l, rhs: r }),
    }
}

/// `2^width`, the wrap-around modulus of `width`-bit arithmetic.
fn modulus(width: u32) -> BigUint {
    BigUint::one() << width as usize
}

/// Returns the number of u64 words needed to store `width` logic values.
fn word_count(width: u32) -> usize {
    width.div_ceil(VALUES_PER_WORD) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> LogicVec {
        LogicVec::from_binary_str(s).unwrap()
    }

    fn n(value: u64, width: u32) -> LogicVec {
        LogicVec::from_u64(value, width)
    }

    #[test]
    fn pattern_roundtrip() {
        for p in ["0", "1", "x", "z", "10xz", "zzzz0000xxxx1111", "1_0"] {
            let expected = p.replace('_', "");
            assert_eq!(v(p).to_string(), expected);
        }
        assert_eq!(v("10XZ").to_string(), "10xz");
    }

    #[test]
    fn pattern_rejects_garbage() {
        assert!(matches!(
            LogicVec::from_binary_str("10a1"),
            Err(ValueError::InvalidPattern(_))
        ));
    }

    #[test]
    fn structural_equality_is_exact() {
        assert_eq!(LogicVec::all_x(4), LogicVec::all_x(4));
        assert_ne!(LogicVec::all_x(4), LogicVec::all_z(4));
        assert_ne!(LogicVec::all_x(4), LogicVec::all_zero(4));
        assert_ne!(n(3, 4), n(3, 5));
    }

    #[test]
    fn large_width_spanning_words() {
        let mut bits = vec![Logic::Zero; 100];
        bits[0] = Logic::One;
        bits[50] = Logic::X;
        bits[99] = Logic::Z;
        let value = LogicVec::from_logic_slice(&bits);
        assert_eq!(value.get(0), Logic::One);
        assert_eq!(value.get(50), Logic::X);
        assert_eq!(value.get(99), Logic::Z);
        assert_eq!(value.get(1), Logic::Zero);
    }

    #[test]
    fn bitwise_tables() {
        assert_eq!(v("1100").and(&v("1010")).unwrap(), v("1000"));
        assert_eq!(v("1100").or(&v("1010")).unwrap(), v("1110"));
        assert_eq!(v("1100").xor(&v("1010")).unwrap(), v("0110"));
        assert_eq!(v("01xz").and(&v("xxxx")).unwrap(), v("0xxx"));
        assert_eq!(!&v("10xz"), v("01xx"));
    }

    #[test]
    fn single_bit_broadcasts() {
        assert_eq!(v("1").and(&v("1010")).unwrap(), v("1010"));
        assert_eq!(v("0110").or(&v("1")).unwrap(), v("1111"));
    }

    #[test]
    fn width_mismatch_is_an_error() {
        assert_eq!(
            n(1, 8).add(&n(1, 4)),
            Err(ValueError::WidthMismatch {
                op: "add",
                lhs: 8,
                rhs: 4
            })
        );
        assert!(v("10").and(&v("101")).is_err());
    }

    #[test]
    fn reductions() {
        assert_eq!(v("1111").and_reduce(), v("1"));
        assert_eq!(v("11x1").and_reduce(), v("x"));
        assert_eq!(v("10x1").and_reduce(), v("x"));
        assert_eq!(v("00x0").or_reduce(), v("x"));
        assert_eq!(v("0z10").or_reduce(), v("x"));
        assert_eq!(v("0010").or_reduce(), v("1"));
        assert_eq!(v("1011").and_reduce(), v("0"));
        assert_eq!(v("1101").xor_reduce(), v("1"));
        assert_eq!(v("110z").xor_reduce(), v("x"));
    }

    #[test]
    fn arithmetic_wraps() {
        assert_eq!(n(250, 8).add(&n(10, 8)).unwrap(), n(4, 8));
        assert_eq!(n(3, 8).sub(&n(5, 8)).unwrap(), n(254, 8));
        assert_eq!(n(20, 8).mul(&n(13, 8)).unwrap(), n(4, 8));
        assert_eq!(n(17, 8).div(&n(5, 8)).unwrap(), n(3, 8));
        assert_eq!(n(17, 8).rem(&n(5, 8)).unwrap(), n(2, 8));
        assert_eq!(n(3, 8).pow(&n(5, 8)).unwrap(), n(243, 8));
        assert_eq!(n(2, 8).pow(&n(9, 8)).unwrap(), n(0, 8));
        assert_eq!(n(1, 8).neg(), n(255, 8));
    }

    #[test]
    fn arithmetic_beyond_64_bits() {
        let big = LogicVec::all_one(100);
        let sum = big.add(&n(1, 100)).unwrap();
        assert!(sum.is_all_zero());
        assert_eq!(sum.width(), 100);
    }

    #[test]
    fn unknown_operands_give_all_x() {
        assert_eq!(v("10x1").add(&n(1, 4)).unwrap(), LogicVec::all_x(4));
        assert_eq!(n(1, 4).mul(&v("z000")).unwrap(), LogicVec::all_x(4));
        assert_eq!(v("10x1").cmp_lt(&n(1, 4)).unwrap(), LogicVec::all_x(1));
        assert_eq!(v("xxxx").cmp_eq(&v("xxxx")).unwrap(), v("x"));
        assert_eq!(v("10x1").neg(), LogicVec::all_x(4));
    }

    #[test]
    fn division_by_zero_is_all_x() {
        assert_eq!(n(9, 8).div(&n(0, 8)).unwrap(), LogicVec::all_x(8));
        assert_eq!(n(9, 8).rem(&n(0, 8)).unwrap(), LogicVec::all_x(8));
    }

    #[test]
    fn comparisons() {
        assert_eq!(n(3, 8).cmp_lt(&n(4, 8)).unwrap(), v("1"));
        assert_eq!(n(4, 8).cmp_le(&n(4, 8)).unwrap(), v("1"));
        assert_eq!(n(4, 8).cmp_gt(&n(4, 8)).unwrap(), v("0"));
        assert_eq!(n(5, 8).cmp_ge(&n(4, 8)).unwrap(), v("1"));
        assert_eq!(n(5, 8).cmp_ne(&n(4, 8)).unwrap(), v("1"));
        assert_eq!(n(5, 8).cmp_eq(&n(5, 8)).unwrap(), v("1"));
    }

    #[test]
    fn shifts() {
        assert_eq!(v("0011").shl(&n(1, 2)), v("0110"));
        assert_eq!(v("1100").shr(&n(2, 3)), v("0011"));
        assert_eq!(v("1000").ashr(&n(2, 2)), v("1110"));
        assert_eq!(v("1011").shl(&n(9, 4)), v("0000"));
        assert_eq!(v("1011").shr(&v("x")), LogicVec::all_x(4));
    }

    #[test]
    fn wildcard_matching() {
        let pattern = v("1zz0");
        assert_eq!(v("1010").wildcard_match(&pattern).unwrap(), Logic::One);
        assert_eq!(v("1100").wildcard_match(&pattern).unwrap(), Logic::One);
        assert_eq!(v("1011").wildcard_match(&pattern).unwrap(), Logic::Zero);
        assert_eq!(v("x010").wildcard_match(&pattern).unwrap(), Logic::X);
        assert_eq!(v("x011").wildcard_match(&pattern).unwrap(), Logic::Zero);
        assert!(v("10").wildcard_match(&pattern).is_err());
    }

    #[test]
    fn multi_hot() {
        assert_eq!(v("0101").multi_hot(), v("1"));
        assert_eq!(v("0100").multi_hot(), v("0"));
        assert_eq!(v("0000").multi_hot(), v("0"));
        assert_eq!(v("0x00").multi_hot(), v("0"));
        assert_eq!(v("0x10").multi_hot(), v("x"));
    }

    #[test]
    fn select_semantics() {
        let t = n(0xa, 4);
        let f = n(0x5, 4);
        assert_eq!(LogicVec::select(&v("1"), &t, &f).unwrap(), t);
        assert_eq!(LogicVec::select(&v("0"), &t, &f).unwrap(), f);
        assert_eq!(
            LogicVec::select(&v("z"), &t, &f).unwrap(),
            LogicVec::all_x(4)
        );
        assert!(LogicVec::select(&v("10"), &t, &f).is_err());
    }

    #[test]
    fn slicing_and_extension() {
        let value = v("1100xz10");
        assert_eq!(value.slice(5, 2).unwrap(), v("00xz"));
        assert!(value.slice(8, 2).is_err());
        assert!(value.slice(1, 2).is_err());
        assert_eq!(v("101").zero_extend(5).unwrap(), v("00101"));
        assert_eq!(v("101").sign_extend(5).unwrap(), v("11101"));
        assert!(v("101").zero_extend(2).is_err());
    }

    #[test]
    fn swizzle_orders() {
        let parts = [v("11"), v("0"), v("x")];
        assert_eq!(LogicVec::swizzle(&parts), v("110x"));
        assert_eq!(LogicVec::rswizzle(&parts), v("x011"));
        let mut reversed = parts.to_vec();
        reversed.reverse();
        assert_eq!(LogicVec::swizzle(&parts), LogicVec::rswizzle(&reversed));
    }

    #[test]
    fn integer_conversions() {
        assert_eq!(n(0xa5, 8).to_string(), "10100101");
        assert_eq!(n(0xa5, 8).to_u64(), Some(0xa5));
        assert_eq!(v("1x").to_u64(), None);
        assert!(n(2, 4).to_bool());
        assert!(!v("x1").to_bool());
    }

    #[test]
    fn serde_roundtrip() {
        let value = v("10xz1010");
        let json = serde_json::to_string(&value).unwrap();
        let back: LogicVec = serde_json::from_str(&json).unwrap();
        assert_eq!(value, back);
    }
}
