//! Dual active-set method (Goldfarb-Idnani).
//!
//! Starts from the unconstrained minimiser `x = -P^-1 q`, which is dual
//! feasible for an empty working set, and repeatedly adds the most violated
//! constraint. Each addition takes partial steps (dropping inequality rows
//! whose multiplier reaches zero) until a full step makes the entering row
//! active. The objective increases monotonically, so no working set repeats
//! outside of degenerate ties.
//!
//! Reference: D. Goldfarb, A. Idnani, "A numerically stable dual method for
//! solving strictly convex quadratic programs", Math. Programming 27 (1983).

mod workspace;

use std::time::Instant;

use nalgebra::{DMatrix, DVector};

use crate::error::{QpError, QpResult};
use crate::linalg::{dense, sparse};
use crate::problem::{ProblemData, RowKind, SolveInfo, SolveResult, SolveStatus, SolverSettings};
use workspace::{ActiveConstraint, Workspace};

/// Outcome of trying to bring one constraint into the working set.
enum AddOutcome {
    Added,
    /// Satisfied equality whose normal is already spanned by the working set
    Redundant,
    Stop(SolveStatus, String),
}

/// Solve a strictly convex QP with the dual active-set method.
///
/// # Arguments
///
/// * `prob` - Problem data; `P` must be positive definite after `static_reg`
/// * `settings` - Solver settings
///
/// # Returns
///
/// `SolveResult` with solution, status, and diagnostics. Infeasibility and
/// iteration limits are statuses; only malformed or non-convex input is an
/// error.
pub fn solve_active_set(prob: &ProblemData, settings: &SolverSettings) -> QpResult<SolveResult> {
    prob.validate().map_err(QpError::InvalidProblem)?;

    let start = Instant::now();
    let m = prob.num_constraints();

    let chol = dense::factor_spd(&prob.P, settings.static_reg).ok_or(
        QpError::NotPositiveDefinite {
            static_reg: settings.static_reg,
        },
    )?;

    let q = DVector::from_column_slice(&prob.q);
    let mut x = -chol.solve(&q);
    let mut ws = Workspace::new(chol.inverse());

    let a = sparse::to_dense(&prob.A);
    let kinds = prob.row_kinds();
    let mut redundant = vec![false; m];
    let mut info = SolveInfo::default();

    let status = loop {
        let Some(entering) =
            select_entering(&a, &prob.b, &kinds, &x, &ws, &redundant, settings.tol_feas)
        else {
            break SolveStatus::Optimal;
        };

        if settings.verbose {
            log::debug!(
                "iter {:>3}: entering row {} (slack {:.3e}), working set size {}",
                info.iters,
                entering.row,
                entering.slack(&x),
                ws.len()
            );
        }

        let row = entering.row;
        match add_constraint(&mut ws, &mut x, entering, settings, &mut info) {
            AddOutcome::Added => {}
            AddOutcome::Redundant => redundant[row] = true,
            AddOutcome::Stop(status, message) => {
                info.message = message;
                break status;
            }
        }
    };

    let x: Vec<f64> = x.iter().copied().collect();

    // s = b - A x
    let mut s = prob.b.clone();
    sparse::spmv(&prob.A, &x, &mut s, -1.0, 1.0);

    let mut z = vec![0.0; m];
    for c in ws.constraints() {
        z[c.row] = c.orientation * c.multiplier;
    }

    info.primal_res = kinds
        .iter()
        .zip(&s)
        .map(|(kind, &si)| match kind {
            RowKind::Equality => si.abs(),
            RowKind::Inequality => (-si).max(0.0),
        })
        .fold(0.0, f64::max);
    info.solve_time_us = start.elapsed().as_micros() as u64;

    if settings.verbose {
        log::debug!(
            "active-set finished: {} after {} iters ({} adds, {} drops), primal_res={:.3e}",
            status,
            info.iters,
            info.adds,
            info.drops,
            info.primal_res
        );
    }

    Ok(SolveResult {
        status,
        obj_val: prob.objective(&x),
        active: ws.constraints().iter().map(|c| c.row).collect(),
        x,
        s,
        z,
        info,
    })
}

/// Pick the next constraint to enter the working set.
///
/// Equality rows come first, in row order, oriented so they are violated (or
/// tight). Then the most violated inequality row. `None` means `x` is optimal.
fn select_entering(
    a: &DMatrix<f64>,
    b: &[f64],
    kinds: &[RowKind],
    x: &DVector<f64>,
    ws: &Workspace,
    redundant: &[bool],
    tol_feas: f64,
) -> Option<ActiveConstraint> {
    let row_normal = |i: usize| -> DVector<f64> { -a.row(i).transpose() };

    for (i, kind) in kinds.iter().enumerate() {
        if *kind != RowKind::Equality || redundant[i] || ws.contains(i) {
            continue;
        }
        let mut c = ActiveConstraint {
            row: i,
            normal: row_normal(i),
            rhs: -b[i],
            orientation: 1.0,
            equality: true,
            multiplier: 0.0,
        };
        if c.slack(x) > 0.0 {
            c.normal.neg_mut();
            c.rhs = -c.rhs;
            c.orientation = -1.0;
        }
        return Some(c);
    }

    let mut worst: Option<(usize, f64)> = None;
    for (i, kind) in kinds.iter().enumerate() {
        if *kind != RowKind::Inequality || ws.contains(i) {
            continue;
        }
        // slack of a_i^T x <= b_i
        let slack = b[i] - a.row(i).transpose().dot(x);
        if slack < -tol_feas * (1.0 + b[i].abs()) && worst.map_or(true, |(_, w)| slack < w) {
            worst = Some((i, slack));
        }
    }

    worst.map(|(i, _)| ActiveConstraint {
        row: i,
        normal: row_normal(i),
        rhs: -b[i],
        orientation: 1.0,
        equality: false,
        multiplier: 0.0,
    })
}

/// Step 2 of the dual method: move until `entering` is active.
fn add_constraint(
    ws: &mut Workspace,
    x: &mut DVector<f64>,
    mut entering: ActiveConstraint,
    settings: &SolverSettings,
    info: &mut SolveInfo,
) -> AddOutcome {
    loop {
        if info.iters >= settings.max_iter {
            return AddOutcome::Stop(
                SolveStatus::MaxIters,
                format!("iteration limit {} reached", settings.max_iter),
            );
        }
        info.iters += 1;

        let Some(dir) = ws.directions(&entering.normal) else {
            return AddOutcome::Stop(
                SolveStatus::NumericalError,
                "working set normals became linearly dependent".to_string(),
            );
        };

        let slack = entering.slack(x);
        let full_step = if dir.curvature <= settings.tol_zero * dir.reference_curvature {
            None
        } else {
            Some((-slack / dir.curvature).max(0.0))
        };
        let partial_step = ws.blocking_constraint(&dir.dual, settings.tol_zero);

        match (full_step, partial_step) {
            (None, None) => {
                if entering.equality && slack.abs() <= settings.tol_feas * (1.0 + entering.rhs.abs()) {
                    return AddOutcome::Redundant;
                }
                return AddOutcome::Stop(
                    SolveStatus::PrimalInfeasible,
                    format!("row {} cannot be satisfied together with the working set", entering.row),
                );
            }
            (None, Some((k, t))) => {
                // Pure dual step: the entering normal is spanned by the working set.
                ws.shift_multipliers(&dir.dual, t);
                entering.multiplier += t;
                ws.remove(k);
                info.drops += 1;
            }
            (Some(t_full), partial) => {
                let (t, drop) = match partial {
                    Some((k, t_partial)) if t_partial < t_full => (t_partial, Some(k)),
                    _ => (t_full, None),
                };

                x.axpy(t, &dir.primal, 1.0);
                ws.shift_multipliers(&dir.dual, t);
                entering.multiplier += t;

                match drop {
                    Some(k) => {
                        ws.remove(k);
                        info.drops += 1;
                    }
                    None => {
                        ws.push(entering);
                        info.adds += 1;
                        return AddOutcome::Added;
                    }
                }
            }
        }
    }
}
