use approx::assert_relative_eq;
use enclose::{
    bound::{BoundConfig, eval_eqs_bounded},
    context::Tree,
    eval::{eval_eq, eval_eqs},
    solver::{ExprObjective, MultiStartConfig, opt_multi},
    types::Interval,
    var::Domain,
};

fn xy(x: (f64, f64), y: (f64, f64)) -> Domain {
    Domain::from([("x", x), ("y", y)])
}

#[test]
fn sin_is_tight_on_monotone_ranges() {
    let f = (Tree::var("x") + 0.01).sin();
    let out = eval_eq(&f, &Domain::from([("x", (0.20, 0.21))])).unwrap();
    assert_relative_eq!(out.lower(), 0.21f64.sin(), epsilon = 1e-9);
    assert_relative_eq!(out.upper(), 0.22f64.sin(), epsilon = 1e-9);
}

#[test]
fn batch_preserves_order() {
    let x = Tree::var("x");
    let res = eval_eqs(
        &[x.clone() + 0.1, x + 0.2],
        &[
            Domain::from([("x", (0.0, 1.0))]),
            Domain::from([("x", (1.0, 2.0))]),
        ],
    )
    .unwrap();
    assert_relative_eq!(res[0].lower(), 0.1, epsilon = 1e-9);
    assert_relative_eq!(res[0].upper(), 1.1, epsilon = 1e-9);
    assert_relative_eq!(res[1].lower(), 1.2, epsilon = 1e-9);
    assert_relative_eq!(res[1].upper(), 2.2, epsilon = 1e-9);
}

#[test]
fn refinement_converges_toward_true_range() {
    let x = Tree::var("x");
    let y = Tree::var("y");
    let f = x.clone() * x.clone() - 2.0 * x + y;
    let d = xy((1.0, 2.0), (1.0, 2.0));

    let res1 = eval_eqs(&[f.clone()], &[d.clone()]).unwrap()[0];
    let res2 = eval_eqs_bounded(&[f.clone()], &[d.clone()], Some(0.5), false)
        .unwrap()[0];
    let res3 = eval_eqs_bounded(&[f], &[d], Some(0.01), true).unwrap()[0];

    // The lower bound converges to 0 from below
    assert!(res1.lower() < res2.lower());
    assert!(res2.lower() < res3.lower());
    assert!(res3.lower() < 0.0);
    assert!(res2.lower() >= -0.5);
    assert!(res3.lower() >= -0.01);

    // One-sided refinement leaves the upper bound alone
    assert_eq!(res1.upper(), res2.upper());

    // Two-sided refinement brings it within tolerance of 2
    assert!(res3.upper() >= 2.0 && res3.upper() <= 2.01);
}

#[test]
fn refinement_without_tolerance() {
    let x = Tree::var("x");
    let y = Tree::var("y");
    let f: Tree = 2.0 * x.clone() + y - x;
    let d = xy((0.0, 1.0), (-0.2, -0.1));
    let res = eval_eqs_bounded(&[f.clone()], &[d.clone()], None, true).unwrap();
    assert_eq!(res.len(), 1);

    // True range is [-0.2, 0.9]
    let base = eval_eq(&f, &d).unwrap();
    assert!(base.encloses(res[0]));
    assert!(res[0].encloses(Interval::new(-0.2, 0.9)));
    assert!(res[0].width() < base.width());
}

#[test]
fn optimizer_leaves_the_box() {
    let f = |v: &[f64]| (1.0 - v[0] * v[0]) * v[1] - v[0];
    let b = vec![Interval::new(0.0, 1.0); 2];
    let res = opt_multi(&[(f, b)]).unwrap();
    assert_eq!(res[0].len(), 2);

    // f >= -1 over the unit box, so anything lower came from outside it
    assert!(f(&res[0]) < -1.0);
}

#[test]
fn optimizer_agrees_with_bounds() {
    let x = Tree::var("x");
    let y = Tree::var("y");
    let f = x.clone() * x.clone() - 2.0 * x + y.clone() * y.clone() - y;
    let d = xy((0.0, 2.0), (0.0, 1.0));

    let bounds = BoundConfig {
        tolerance: Some(0.05),
        ..BoundConfig::default()
    }
    .bound(&f, &d)
    .unwrap();

    let obj = ExprObjective::new(&f, &["x", "y"]);
    let b = [d.get("x").unwrap(), d.get("y").unwrap()];
    let min = MultiStartConfig::default().minimize(&obj, &b).unwrap();

    // The true minimum is -1.25 at (1, 0.5), inside the box
    assert_relative_eq!(min.value, -1.25, epsilon = 1e-8);
    assert!(bounds.lower() <= min.value);
    assert!(bounds.lower() >= -1.25 - 0.05);
}
