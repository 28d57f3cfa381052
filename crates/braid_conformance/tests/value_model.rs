//! Properties of the 4-state value model.

use braid_common::{Logic, LogicVec};
use braid_conformance::lv;
use proptest::prelude::*;

fn any_vec(max_width: usize) -> impl Strategy<Value = LogicVec> {
    proptest::string::string_regex(&format!("[01xz]{{1,{max_width}}}"))
        .expect("valid regex")
        .prop_map(|s| LogicVec::from_pattern(&s).expect("valid pattern"))
}

proptest! {
    #[test]
    fn pattern_round_trips(pattern in "[01xz]{1,150}") {
        let v = LogicVec::from_pattern(&pattern).unwrap();
        prop_assert_eq!(v.width() as usize, pattern.len());
        prop_assert_eq!(v.to_string(), pattern);
    }

    #[test]
    fn swizzle_is_reversed_rswizzle(parts in proptest::collection::vec(any_vec(20), 0..6)) {
        let mut reversed = parts.clone();
        reversed.reverse();
        prop_assert_eq!(LogicVec::swizzle(&parts), LogicVec::rswizzle(&reversed));
    }

    #[test]
    fn swizzle_puts_first_element_highest(hi in any_vec(16), lo in any_vec(16)) {
        let cat = LogicVec::swizzle(&[hi.clone(), lo.clone()]);
        prop_assert_eq!(cat.to_string(), format!("{hi}{lo}"));
    }

    #[test]
    fn arithmetic_matches_integers(a in any::<u8>(), b in any::<u8>()) {
        let (x, y) = (lv(a as u64, 8), lv(b as u64, 8));
        prop_assert_eq!(x.add(&y).unwrap().to_u64(), Some(a.wrapping_add(b) as u64));
        prop_assert_eq!(x.sub(&y).unwrap().to_u64(), Some(a.wrapping_sub(b) as u64));
        prop_assert_eq!(x.mul(&y).unwrap().to_u64(), Some(a.wrapping_mul(b) as u64));
        prop_assert_eq!(x.cmp_lt(&y).unwrap(), LogicVec::from_bool(a < b));
        if b != 0 {
            prop_assert_eq!(x.div(&y).unwrap().to_u64(), Some((a / b) as u64));
            prop_assert_eq!(x.rem(&y).unwrap().to_u64(), Some((a % b) as u64));
        }
    }

    #[test]
    fn unknown_bits_poison_arithmetic(a in any::<u8>(), bit in 0u32..8) {
        let mut bits: Vec<Logic> = lv(a as u64, 8).iter().collect();
        bits[bit as usize] = Logic::X;
        let poisoned = LogicVec::from_logic_slice(&bits);
        let one = lv(1, 8);
        prop_assert_eq!(poisoned.add(&one).unwrap(), LogicVec::all_x(8));
        prop_assert_eq!(poisoned.cmp_eq(&one).unwrap(), LogicVec::all_x(1));
        prop_assert!(poisoned.case_eq(&poisoned));
    }

    #[test]
    fn reductions_over_unknown_bits_are_x(v in any_vec(40)) {
        prop_assume!(v.has_xz());
        let x = LogicVec::all_x(1);
        prop_assert_eq!(v.and_reduce(), x.clone());
        prop_assert_eq!(v.or_reduce(), x.clone());
        prop_assert_eq!(v.xor_reduce(), x);
    }

    #[test]
    fn reductions_match_integers(a in any::<u16>()) {
        let v = lv(a as u64, 16);
        prop_assert_eq!(v.and_reduce(), LogicVec::from_bool(a == u16::MAX));
        prop_assert_eq!(v.or_reduce(), LogicVec::from_bool(a != 0));
        prop_assert_eq!(v.xor_reduce(), LogicVec::from_bool(a.count_ones() % 2 == 1));
    }
}

#[test]
fn structural_equality_distinguishes_x_and_z() {
    assert_ne!(LogicVec::all_x(4), LogicVec::all_z(4));
    assert_ne!(LogicVec::all_x(4), LogicVec::all_zero(4));
    assert_eq!(LogicVec::all_x(4), LogicVec::all_x(4));
}

#[test]
fn bitwise_tables() {
    let zero = LogicVec::from_pattern("0").unwrap();
    let one = LogicVec::from_pattern("1").unwrap();
    let x = LogicVec::from_pattern("x").unwrap();
    let z = LogicVec::from_pattern("z").unwrap();
    assert_eq!(zero.and(&x).unwrap(), zero);
    assert_eq!(one.and(&x).unwrap(), x);
    assert_eq!(one.and(&z).unwrap(), x);
    assert_eq!(one.or(&x).unwrap(), one);
}

#[test]
fn division_by_zero_is_unknown() {
    assert_eq!(lv(9, 4).div(&lv(0, 4)).unwrap(), LogicVec::all_x(4));
    assert_eq!(lv(9, 4).rem(&lv(0, 4)).unwrap(), LogicVec::all_x(4));
}

#[test]
fn width_mismatch_is_an_error_but_single_bits_broadcast() {
    assert!(lv(1, 4).add(&lv(1, 5)).is_err());
    assert_eq!(lv(0b1010, 4).and(&lv(1, 1)).unwrap(), lv(0b1010, 4));
}

#[test]
fn serde_round_trip() {
    let v = LogicVec::from_pattern("10xz01").unwrap();
    let json = serde_json::to_string(&v).unwrap();
    let back: LogicVec = serde_json::from_str(&json).unwrap();
    assert_eq!(back, v);
}
