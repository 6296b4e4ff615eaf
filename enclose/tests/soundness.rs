//! Property-based soundness tests
//!
//! For random expressions and domains, every sampled point value must lie
//! within the single-shot enclosure, and refinement must stay sound while
//! never loosening the result.
use enclose::{
    bound::BoundConfig,
    context::Tree,
    eval::{eval_eq, eval_point},
    types::Interval,
    var::Domain,
};
use proptest::prelude::*;
use std::collections::BTreeMap;

/// Slack for rounding differences between point and interval evaluation
///
/// This scales with the enclosure as well as the value, since cancellation
/// between large intermediate values loses absolute precision.
fn slack(v: f64, out: Interval) -> f64 {
    let mag = [out.lower(), out.upper()]
        .into_iter()
        .filter(|b| b.is_finite())
        .fold(0.0f64, |m, b| m.max(b.abs()));
    1e-9 * (1.0 + v.abs() + mag)
}

/// Checks that `a` encloses `b`, up to rounding
fn encloses(a: Interval, b: Interval) -> bool {
    a.lower() - slack(a.lower(), a) <= b.lower()
        && b.upper() <= a.upper() + slack(a.upper(), a)
}

fn valid_interval(range: f64) -> impl Strategy<Value = (f64, f64)> {
    (-range..range, -range..range).prop_map(|(a, b)| (a.min(b), a.max(b)))
}

/// Arbitrary expressions, including operations which may be undefined
fn arb_tree() -> impl Strategy<Value = Tree> {
    let leaf = prop_oneof![
        Just(Tree::var("x")),
        Just(Tree::var("y")),
        (-4.0..4.0f64).prop_map(Tree::constant),
    ];
    leaf.prop_recursive(4, 32, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| a + b),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| a - b),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| a * b),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| a / b),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| a.min(b)),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| a.max(b)),
            (inner.clone(), -3..=4i32).prop_map(|(a, n)| a.pow(n)),
            (inner.clone(), 0.1..3.0f64).prop_map(|(a, e)| a.pow(e)),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| a.abs().pow(b)),
            inner.clone().prop_map(|a| a.square()),
            inner.clone().prop_map(|a| a.abs()),
            inner.clone().prop_map(|a| -a),
            inner.clone().prop_map(|a| a.recip()),
            inner.clone().prop_map(|a| a.sqrt()),
            inner.clone().prop_map(|a| a.sin()),
            inner.clone().prop_map(|a| a.cos()),
            inner.clone().prop_map(|a| a.tan()),
            inner.clone().prop_map(|a| a.exp()),
            inner.prop_map(|a| a.ln()),
        ]
    })
}

/// Bounds for one variable, sometimes half-infinite or unbounded
fn arb_bounds() -> impl Strategy<Value = (f64, f64)> {
    prop_oneof![
        4 => valid_interval(3.0),
        1 => (-3.0..3.0f64).prop_map(|a| (a, f64::INFINITY)),
        1 => (-3.0..3.0f64).prop_map(|a| (f64::NEG_INFINITY, a)),
        1 => Just((f64::NEG_INFINITY, f64::INFINITY)),
    ]
}

/// Sample points within an interval, including huge values if unbounded
fn samples(i: Interval) -> Vec<f64> {
    if i.is_bounded() {
        (0..=8)
            .map(|k| {
                (i.lower() + i.width() * k as f64 / 8.0)
                    .clamp(i.lower(), i.upper())
            })
            .collect()
    } else {
        [-1e6, -10.0, -1.0, 0.0, 1.0, 10.0, 1e6]
            .into_iter()
            .map(|v: f64| v.clamp(i.lower().max(-1e300), i.upper().min(1e300)))
            .chain([i.lower(), i.upper()].into_iter().filter(|b| b.is_finite()))
            .collect()
    }
}

fn check_contains(f: &Tree, d: &Domain, out: Interval) -> Result<(), String> {
    let (Some(xi), Some(yi)) = (d.get("x"), d.get("y")) else {
        return Err("missing variable".to_owned());
    };
    for x in samples(xi) {
        for y in samples(yi) {
            let v = eval_point(f, &BTreeMap::from([("x", x), ("y", y)]))
                .map_err(|e| e.to_string())?;
            // Undefined (or overflowing) points carry no information
            if !v.is_finite() {
                continue;
            }
            let s = slack(v, out);
            if !(out.lower() - s <= v && v <= out.upper() + s) {
                return Err(format!("f({x}, {y}) = {v} is not in {out}"));
            }
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_global_rejects: 1 << 16,
        ..ProptestConfig::default()
    })]

    #[test]
    fn single_shot_is_sound(
        f in arb_tree(),
        x in valid_interval(3.0),
        y in valid_interval(3.0),
    ) {
        let d = Domain::from([("x", x), ("y", y)]);
        let out = eval_eq(&f, &d);
        prop_assume!(out.is_ok());
        let r = check_contains(&f, &d, out.unwrap());
        prop_assert!(r.is_ok(), "{}", r.unwrap_err());
    }

    #[test]
    fn single_shot_is_sound_unbounded(
        f in arb_tree(),
        x in arb_bounds(),
        y in arb_bounds(),
    ) {
        let d = Domain::from([("x", x), ("y", y)]);
        let out = eval_eq(&f, &d);
        prop_assume!(out.is_ok());
        let r = check_contains(&f, &d, out.unwrap());
        prop_assert!(r.is_ok(), "{}", r.unwrap_err());
    }

    #[test]
    fn refinement_is_sound(
        f in arb_tree(),
        x in arb_bounds(),
        y in arb_bounds(),
        tolerance in prop_oneof![Just(None), (0.01..1.0f64).prop_map(Some)],
    ) {
        let d = Domain::from([("x", x), ("y", y)]);
        let base = eval_eq(&f, &d);
        prop_assume!(base.is_ok());
        let base = base.unwrap();
        let cfg = BoundConfig {
            tolerance,
            max_iterations: 256,
            rounds: 64,
            threads: None,
            ..BoundConfig::default()
        };
        let out = cfg.bound(&f, &d).unwrap();
        prop_assert!(encloses(base, out), "{} does not enclose {}", base, out);
        let r = check_contains(&f, &d, out);
        prop_assert!(r.is_ok(), "{}", r.unwrap_err());
    }

    #[test]
    fn refinement_is_monotone(
        f in arb_tree(),
        x in valid_interval(3.0),
        y in valid_interval(3.0),
    ) {
        let d = Domain::from([("x", x), ("y", y)]);
        prop_assume!(eval_eq(&f, &d).is_ok());
        let run = |t| BoundConfig {
            tolerance: Some(t),
            max_iterations: 256,
            threads: None,
            ..BoundConfig::default()
        }
        .bound(&f, &d)
        .unwrap();
        let loose = run(0.5);
        let tight = run(0.05);
        prop_assert!(encloses(loose, tight), "{} vs {}", loose, tight);
    }
}
