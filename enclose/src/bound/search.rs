//! Best-first subdivision for one side of an enclosure
use super::BoundConfig;
use crate::{
    Error, context::Expression, eval::eval_eq, types::Interval, var::Domain,
};
use log::{debug, trace};
use ordered_float::OrderedFloat;
use std::collections::BinaryHeap;

/// Which bound of the enclosure is being refined
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Side {
    Lower,
    Upper,
}

impl Side {
    /// Returns the bound of interest from an enclosure
    fn bound(self, i: Interval) -> f64 {
        match self {
            Side::Lower => i.lower(),
            Side::Upper => i.upper(),
        }
    }

    /// Returns the bound which is furthest out, i.e. the hull's bound
    fn outer(self, a: f64, b: f64) -> f64 {
        match self {
            Side::Lower => a.min(b),
            Side::Upper => a.max(b),
        }
    }

    /// Returns the more extreme of two attained values
    fn best(self, a: f64, b: f64) -> f64 {
        match self {
            Side::Lower => a.min(b),
            Side::Upper => a.max(b),
        }
    }

    /// Neutral starting value for [`Side::outer`]
    fn empty(self) -> f64 {
        match self {
            Side::Lower => f64::INFINITY,
            Side::Upper => f64::NEG_INFINITY,
        }
    }

    /// Conservative value actually attained at a point
    ///
    /// A point evaluation is (nearly) degenerate; taking the inner bound means
    /// the incumbent never overstates how good the extremum is.
    fn attained(self, i: Interval) -> f64 {
        match self {
            Side::Lower => i.upper(),
            Side::Upper => i.lower(),
        }
    }

    /// Distance between a guaranteed bound and an attained value
    fn gap(self, bound: f64, attained: f64) -> f64 {
        match self {
            Side::Lower => attained - bound,
            Side::Upper => bound - attained,
        }
    }

    /// Heap priority, where larger values are refined first
    fn priority(self, i: Interval) -> OrderedFloat<f64> {
        OrderedFloat(match self {
            Side::Lower => -i.lower(),
            Side::Upper => i.upper(),
        })
    }
}

/// A sub-box of the full domain, with its enclosure
struct Leaf {
    priority: OrderedFloat<f64>,
    /// Insertion order, used to break ties deterministically
    seq: usize,
    domain: Domain,
    value: Interval,
}

impl PartialEq for Leaf {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}
impl Eq for Leaf {}

impl PartialOrd for Leaf {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Leaf {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Refines one bound of `expr` over `domain` by best-first bisection
///
/// `vars` lists the variables which may be split, and `base` is the
/// single-shot enclosure over the full domain.  The returned bound is the
/// hull (on the requested side) of every leaf that could still contain the
/// extremum.
///
/// Sub-boxes where the expression is nowhere defined (i.e. evaluation fails
/// with [`Error::DomainError`]) hold no values and are dropped.  Center
/// samples which are undefined or not finite are ignored.
pub(crate) fn refine<E: Expression + ?Sized>(
    expr: &E,
    domain: &Domain,
    vars: &[&str],
    base: Interval,
    side: Side,
    cfg: &BoundConfig,
) -> Result<f64, Error> {
    let budget = match cfg.tolerance {
        Some(_) => cfg.max_iterations,
        None => cfg.rounds,
    };
    let sample = |d: &Domain| {
        eval_eq(expr, &d.center())
            .ok()
            .map(|i| side.attained(i))
            .filter(|v| v.is_finite())
    };

    let mut incumbent = sample(domain).unwrap_or(side.empty());
    let mut settled = side.empty();
    let mut heap = BinaryHeap::new();
    heap.push(Leaf {
        priority: side.priority(base),
        seq: 0,
        domain: domain.clone(),
        value: base,
    });
    let mut seq = 1;
    let mut iterations = 0;

    let current = |heap: &BinaryHeap<Leaf>, settled: f64| {
        let frontier = heap.peek().map(|q| side.bound(q.value));
        frontier.map_or(settled, |f| side.outer(f, settled))
    };

    loop {
        let bound = current(&heap, settled);
        if let Some(t) = cfg.tolerance {
            if side.gap(bound, incumbent) <= t {
                break;
            }
        }
        if iterations >= budget {
            break;
        }
        let Some(leaf) = heap.pop() else {
            break;
        };

        let split = leaf.domain.widest(vars.iter().copied()).and_then(
            |(name, i)| {
                let (a, b) = i.split();
                (i.width() > cfg.min_width && a != i && b != i)
                    .then_some((name, a, b))
            },
        );
        let Some((name, a, b)) = split else {
            // Too small (or too large) to split; its bound is final
            settled = side.outer(settled, side.bound(leaf.value));
            continue;
        };

        iterations += 1;
        for half in [a, b] {
            let domain = leaf.domain.with(name, half);
            let value = match eval_eq(expr, &domain) {
                Ok(v) => v,
                Err(Error::DomainError { .. }) => continue,
                Err(e) => return Err(e),
            };
            if let Some(v) = sample(&domain) {
                incumbent = side.best(incumbent, v);
            }

            // A box which cannot contain the extremum is dropped
            if side.gap(side.bound(value), incumbent) < 0.0 {
                continue;
            }
            heap.push(Leaf {
                priority: side.priority(value),
                seq,
                domain,
                value,
            });
            seq += 1;
        }
        trace!(
            "{side:?} split #{iterations} on `{name}`: bound {}, incumbent \
             {incumbent}",
            current(&heap, settled)
        );
    }

    let bound = current(&heap, settled);
    debug!(
        "{side:?} bound {bound} after {iterations} splits \
         (incumbent {incumbent}, {} open boxes)",
        heap.len()
    );
    Ok(bound)
}
