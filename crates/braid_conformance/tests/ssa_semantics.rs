//! End-to-end semantics of compiled combinational blocks.
//!
//! Each test compiles a block, drives its inputs through the settlement
//! engine and compares the outputs against a plain integer model.

use braid_common::LogicVec;
use braid_conformance::{drive, lv, value_of};
use braid_ir::{Expr, SignalRef};
use braid_sim::SignalGraph;
use braid_ssa::{Case, Combinational, SsaError, Statement};
use proptest::prelude::*;

proptest! {
    #[test]
    fn assigns_only_law(a in any::<u8>(), b in any::<u8>()) {
        let mut g = SignalGraph::new();
        let ia = g.add_signal("a", 8);
        let ib = g.add_signal("b", 8);
        let x = g.add_signal("x", 8);
        let y = g.add_signal("y", 8);
        Combinational::ssa(&mut g, |s| {
            vec![
                Statement::assign(x, s.get(ia)),
                Statement::assign(x, s.get(x) + 1),
                Statement::assign(y, s.get(x) * 2 + 1),
                Statement::assign(x, s.get(x) + s.get(y)),
                Statement::assign(y, s.get(y) + s.get(ib)),
            ]
        })
        .unwrap();
        drive(&mut g, &[(ia, a as u64), (ib, b as u64)]);

        let x1 = a.wrapping_add(1);
        let y1 = x1.wrapping_mul(2).wrapping_add(1);
        let x2 = x1.wrapping_add(y1);
        let y2 = y1.wrapping_add(b);
        prop_assert_eq!(value_of(&g, x), Some(x2 as u64));
        prop_assert_eq!(value_of(&g, y), Some(y2 as u64));
    }
}

#[test]
fn if_else_truth_table() {
    let mut g = SignalGraph::new();
    let a = g.add_signal("a", 8);
    let x = g.add_signal("x", 8);
    Combinational::ssa(&mut g, |s| {
        vec![
            Statement::assign(x, s.get(a) + 1),
            Statement::if_else(
                s.get(x).gt(3),
                vec![Statement::assign(x, s.get(x) + 2)],
                vec![Statement::assign(x, s.get(x) + 3)],
            ),
            Statement::assign(x, s.get(x) + 1),
        ]
    })
    .unwrap();
    for input in 0..50u64 {
        drive(&mut g, &[(a, input)]);
        let expected = if input + 1 > 3 { input + 4 } else { input + 5 };
        assert_eq!(value_of(&g, x), Some(expected), "a = {input}");
    }
    drive(&mut g, &[(a, 2)]);
    assert_eq!(value_of(&g, x), Some(7));
    drive(&mut g, &[(a, 3)]);
    assert_eq!(value_of(&g, x), Some(7));
}

#[test]
fn case_priority_with_default() {
    let mut g = SignalGraph::new();
    let a = g.add_signal("a", 8);
    let x = g.add_signal("x", 8);
    Combinational::ssa(&mut g, |s| {
        vec![
            Statement::assign(x, s.get(a)),
            Case::new(s.get(x) % 2)
                .item(s.get(x) % 3, vec![Statement::assign(x, s.get(x) + 10)])
                .item(s.get(x) % 5, vec![Statement::assign(x, s.get(x) + 20)])
                .default(vec![Statement::assign(x, 3)])
                .build(),
            Statement::assign(x, s.get(x) + 2),
        ]
    })
    .unwrap();

    let model = |a: u64| {
        let sel = a % 2;
        let x = if sel == a % 3 {
            a + 10
        } else if sel == a % 5 {
            a + 20
        } else {
            3
        };
        x + 2
    };
    let mut both_matched = 0;
    for input in 0..50u64 {
        if input % 2 == input % 3 && input % 2 == input % 5 {
            both_matched += 1;
        }
        drive(&mut g, &[(a, input)]);
        assert_eq!(value_of(&g, x), Some(model(input)), "a = {input}");
    }
    assert!(both_matched > 0, "the range must exercise first-match-wins");
}

#[test]
fn casez_wildcard_positions() {
    let mut g = SignalGraph::new();
    let op = g.add_signal("op", 4);
    let hit = g.add_signal("hit", 1);
    Combinational::ssa(&mut g, |s| {
        vec![Case::z(s.get(op))
            .item(
                LogicVec::from_pattern("1z0z").unwrap(),
                vec![Statement::assign(hit, 1)],
            )
            .default(vec![Statement::assign(hit, 0)])
            .build()]
    })
    .unwrap();
    for value in 0..16u64 {
        drive(&mut g, &[(op, value)]);
        let expected = (value & 0b1010 == 0b1000) as u64;
        assert_eq!(value_of(&g, hit), Some(expected), "op = {value:04b}");
    }
}

#[test]
fn exact_case_does_not_treat_z_as_wildcard() {
    let mut g = SignalGraph::new();
    let op = g.add_signal("op", 2);
    let hit = g.add_signal("hit", 1);
    Combinational::ssa(&mut g, |s| {
        vec![Case::new(s.get(op))
            .item(LogicVec::from_pattern("1z").unwrap(), vec![Statement::assign(hit, 1)])
            .default(vec![Statement::assign(hit, 0)])
            .build()]
    })
    .unwrap();
    drive(&mut g, &[(op, 0b10)]);
    assert_eq!(value_of(&g, hit), Some(0));
    g.inject(op, LogicVec::from_pattern("1z").unwrap()).unwrap();
    assert_eq!(value_of(&g, hit), Some(1));
}

#[test]
fn unique_case_takes_first_match_and_reports_overlap() {
    let mut g = SignalGraph::new();
    let op = g.add_signal("op", 2);
    let y = g.add_signal("y", 2);
    Combinational::ssa(&mut g, |s| {
        vec![Case::z(s.get(op))
            .item(LogicVec::from_pattern("1z").unwrap(), vec![Statement::assign(y, 1)])
            .item(LogicVec::from_pattern("z1").unwrap(), vec![Statement::assign(y, 2)])
            .default(vec![Statement::assign(y, 0)])
            .unique()
            .build()]
    })
    .unwrap();
    for value in 0..4u64 {
        let report = drive(&mut g, &[(op, value)]);
        let expected = if value & 0b10 != 0 {
            1
        } else if value & 0b01 != 0 {
            2
        } else {
            0
        };
        assert_eq!(value_of(&g, y), Some(expected), "op = {value:02b}");
        let conflicts: &[&str] = if value == 0b11 { &["op"] } else { &[] };
        assert_eq!(report.unique_conflicts, conflicts, "op = {value:02b}");
    }
}

#[test]
fn composite_partial_writes_keep_siblings() {
    let mut g = SignalGraph::new();
    let a = g.add_signal("a", 4);
    let b = g.add_signal("b", 4);
    let pair = g.add_struct("pair", &[("lo", 4), ("hi", 4)]);
    let lo = g.element(pair, 0).unwrap();
    let hi = g.element(pair, 1).unwrap();
    let whole = g.add_signal("whole", 8);
    let hi_seen = g.add_signal("hi_seen", 4);
    Combinational::ssa(&mut g, |s| {
        vec![
            Statement::assign(pair, Expr::swizzle([s.get(b), s.get(a)])),
            Statement::assign(lo, s.get(lo) + 1),
            Statement::assign(hi_seen, s.get(hi)),
            Statement::assign(whole, s.get(pair)),
        ]
    })
    .unwrap();
    for (va, vb) in [(0u64, 0u64), (3, 9), (15, 1)] {
        drive(&mut g, &[(a, va), (b, vb)]);
        let lo_value = (va + 1) & 0xf;
        assert_eq!(value_of(&g, hi_seen), Some(vb));
        assert_eq!(value_of(&g, whole), Some(vb << 4 | lo_value));
        assert_eq!(g.read(pair.into()).to_u64(), Some(vb << 4 | lo_value));
        assert_eq!(g.read(hi).to_u64(), Some(vb));
    }
}

#[test]
fn scratch_composite_copy() {
    let mut g = SignalGraph::new();
    let pkt = g.add_struct("pkt", &[("len", 4), ("ok", 1)]);
    let out = g.add_signal("out", 5);
    let ok = g.element(pkt, 1).and_then(SignalRef::as_signal).unwrap();
    let len = g.element(pkt, 0).and_then(SignalRef::as_signal).unwrap();
    Combinational::ssa(&mut g, |s| {
        let tmp = s.local_like(pkt, "tmp");
        let tmp_len = s.element(tmp, 0).unwrap();
        vec![
            Statement::assign(tmp, s.get(pkt)),
            Statement::assign(tmp_len, s.get(tmp_len) * 2),
            Statement::assign(out, s.get(tmp)),
        ]
    })
    .unwrap();
    drive(&mut g, &[(len, 5), (ok, 1)]);
    assert_eq!(value_of(&g, out), Some(1 << 4 | 10));
}

#[test]
fn uninitialized_read_is_deterministic() {
    for _ in 0..10 {
        let mut g = SignalGraph::new();
        let x = g.add_signal("x", 8);
        let err = Combinational::ssa(&mut g, |s| vec![Statement::assign(x, s.get(x) + 1)])
            .unwrap_err();
        assert_eq!(
            err,
            SsaError::UninitializedRead {
                signal: "x".into(),
                read: "x".into()
            }
        );
        assert!(!g.is_driven(x));
    }
}

#[test]
fn missing_else_on_fresh_output_is_a_latch() {
    let mut g = SignalGraph::new();
    let en = g.add_signal("en", 1);
    let y = g.add_signal("y", 4);
    let err = Combinational::ssa(&mut g, |s| {
        vec![Statement::if_then(s.get(en), vec![Statement::assign(y, 1)])]
    })
    .unwrap_err();
    assert!(matches!(err, SsaError::UninitializedRead { signal, .. } if signal == "y"));
}

#[test]
fn nested_blocks_compose() {
    let mut g = SignalGraph::new();
    let a = g.add_signal("a", 8);
    let y1 = g.add_signal("y1", 8);
    let y2 = g.add_signal("y2", 8);
    Combinational::ssa(&mut g, |s| {
        vec![Statement::assign(y1, s.get(a) * 3 + 1)]
    })
    .unwrap();
    Combinational::ssa(&mut g, |s| {
        vec![Statement::if_else(
            s.get(y1).gt(100),
            vec![Statement::assign(y2, s.get(y1) - 100)],
            vec![Statement::assign(y2, s.get(y1) + 7)],
        )]
    })
    .unwrap();

    let f1 = |a: u8| a.wrapping_mul(3).wrapping_add(1);
    let f2 = |y: u8| if y > 100 { y - 100 } else { y + 7 };
    for input in 0..=255u8 {
        drive(&mut g, &[(a, input as u64)]);
        assert_eq!(value_of(&g, y2), Some(f2(f1(input)) as u64), "a = {input}");
    }
}

#[test]
fn shared_expression_resolves_once() {
    let mut g = SignalGraph::new();
    let a = g.add_signal("a", 8);
    let x = g.add_signal("x", 8);
    let y = g.add_signal("y", 8);
    let z = g.add_signal("z", 8);
    Combinational::ssa(&mut g, |s| {
        let shared = s.get(x) * 3 + 1;
        vec![
            Statement::assign(x, s.get(a)),
            Statement::assign(y, shared.clone()),
            Statement::assign(z, shared ^ 0),
        ]
    })
    .unwrap();
    for input in [0u64, 7, 200] {
        drive(&mut g, &[(a, input)]);
        let expected = (input * 3 + 1) & 0xff;
        assert_eq!(value_of(&g, y), Some(expected));
        assert_eq!(value_of(&g, z), Some(expected));
    }
}

#[test]
fn shared_expression_reads_at_statement_position() {
    let mut g = SignalGraph::new();
    let a = g.add_signal("a", 8);
    let x = g.add_signal("x", 8);
    let y = g.add_signal("y", 8);
    let z = g.add_signal("z", 8);
    Combinational::ssa(&mut g, |s| {
        // Built before any statement exists; bound where it is used.
        let doubled = s.get(x) * 2;
        vec![
            Statement::assign(x, s.get(a)),
            Statement::assign(y, doubled.clone()),
            Statement::assign(x, s.get(x) + 1),
            Statement::assign(z, doubled),
        ]
    })
    .unwrap();
    drive(&mut g, &[(a, 10)]);
    assert_eq!(value_of(&g, y), Some(20));
    assert_eq!(value_of(&g, z), Some(22));
    assert_eq!(value_of(&g, x), Some(11));
}

#[test]
fn if_chain_selects_first_true_branch() {
    let mut g = SignalGraph::new();
    let a = g.add_signal("a", 8);
    let y = g.add_signal("y", 2);
    Combinational::ssa(&mut g, |s| {
        vec![Statement::if_chain(
            [
                (s.get(a).lt(10), vec![Statement::assign(y, 0)]),
                (s.get(a).lt(20), vec![Statement::assign(y, 1)]),
                (s.get(a).lt(30), vec![Statement::assign(y, 2)]),
            ],
            vec![Statement::assign(y, 3)],
        )]
    })
    .unwrap();
    for (input, expected) in [(5u64, 0u64), (10, 1), (25, 2), (99, 3)] {
        drive(&mut g, &[(a, input)]);
        assert_eq!(value_of(&g, y), Some(expected));
    }
}

#[test]
fn unknown_condition_yields_unknown_output() {
    let mut g = SignalGraph::new();
    let en = g.add_signal("en", 1);
    let y = g.add_signal("y", 4);
    let block = Combinational::ssa(&mut g, |s| {
        vec![Statement::if_else(
            s.get(en),
            vec![Statement::assign(y, 1)],
            vec![Statement::assign(y, 2)],
        )]
    })
    .unwrap();
    assert_eq!(block.outputs, vec![y]);
    g.inject(en, LogicVec::all_x(1)).unwrap();
    assert_eq!(g.value(y), &LogicVec::all_x(4));
    g.inject(en, lv(1, 1)).unwrap();
    assert_eq!(value_of(&g, y), Some(1));
}
