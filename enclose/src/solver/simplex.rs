//! Nelder-Mead downhill simplex
use super::{Minimum, MultiStartConfig, Objective};
use crate::Error;
use log::debug;
use nalgebra::DVector;

const REFLECT: f64 = 1.0;
const EXPAND: f64 = 2.0;
const CONTRACT: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Runs an unconstrained simplex search from `x0`
///
/// The initial simplex is built by offsetting `x0` by `step[i]` along each
/// axis.  Non-finite values at trial points are treated as `+∞`, so the
/// simplex steps away from them; a non-finite value at `x0` itself is an
/// error.  Hitting the iteration cap is not an error.
pub(super) fn nelder_mead<F: Objective + ?Sized>(
    f: &F,
    x0: DVector<f64>,
    step: &DVector<f64>,
    cfg: &MultiStartConfig,
) -> Result<Minimum, Error> {
    let n = x0.len();
    let eval = |x: &DVector<f64>| -> Result<f64, Error> {
        let v = f.eval(x.as_slice())?;
        Ok(if v.is_finite() { v } else { f64::INFINITY })
    };

    let f0 = f.eval(x0.as_slice())?;
    if !f0.is_finite() {
        return Err(Error::NonFiniteObjective(x0.as_slice().to_vec()));
    }
    let mut simplex = Vec::with_capacity(n + 1);
    for i in 0..n {
        let mut x = x0.clone();
        x[i] += step[i];
        let v = eval(&x)?;
        simplex.push((x, v));
    }
    simplex.insert(0, (x0, f0));

    let mut iterations = 0;
    loop {
        // Stable sort, so earlier vertices win ties
        simplex.sort_by(|a, b| a.1.total_cmp(&b.1));

        let spread = simplex[n].1 - simplex[0].1;
        let diameter = simplex[1..]
            .iter()
            .map(|(x, _)| (x - &simplex[0].0).amax())
            .fold(0.0, f64::max);
        if spread <= cfg.ftol && diameter <= cfg.xtol {
            break;
        }
        if iterations >= cfg.max_iterations {
            debug!(
                "simplex stopped at iteration cap with spread {spread}, \
                 diameter {diameter}"
            );
            break;
        }
        iterations += 1;

        let centroid = simplex[..n]
            .iter()
            .fold(DVector::zeros(n), |acc, (x, _)| acc + x)
            / n as f64;
        let (worst, f_worst) = (&simplex[n].0, simplex[n].1);

        let xr = &centroid + (&centroid - worst) * REFLECT;
        let fr = eval(&xr)?;
        if fr < simplex[0].1 {
            let xe = &centroid + (&xr - &centroid) * EXPAND;
            let fe = eval(&xe)?;
            simplex[n] = if fe < fr { (xe, fe) } else { (xr, fr) };
        } else if fr < simplex[n - 1].1 {
            simplex[n] = (xr, fr);
        } else {
            let xc = if fr < f_worst {
                &centroid + (&xr - &centroid) * CONTRACT
            } else {
                &centroid + (worst - &centroid) * CONTRACT
            };
            let fc = eval(&xc)?;
            if fc < fr.min(f_worst) {
                simplex[n] = (xc, fc);
            } else {
                let best = simplex[0].0.clone();
                for (x, v) in simplex[1..].iter_mut() {
                    *x = &best + (&*x - &best) * SHRINK;
                    *v = eval(x)?;
                }
            }
        }
    }

    let (point, value) = simplex.swap_remove(0);
    Ok(Minimum {
        point: point.as_slice().to_vec(),
        value,
        iterations,
    })
}
