//! Implements a solver interface for Clarabel
//!
//! Clarabel solves `min 1/2 x'Px + q'x` subject to `Ax + s = b` with `s` in a cone. Equality
//! constraints and fixed variables go into a zero cone, every finite bound of the
//! remaining constraints and variables becomes a row of a nonnegative cone.
use ::clarabel::algebra::CscMatrix as ClarabelMatrix;
use ::clarabel::solver::{
    DefaultSettings, DefaultSolver, IPSolver, SolverStatus, SupportedConeT,
};
use nalgebra_sparse::{CooMatrix, CscMatrix};
use tracing::debug;

use crate::optimize::objective::{ObjectiveSense, ObjectiveTerm};
use crate::optimize::problem::Problem;
use crate::optimize::solvers::{Solver, SolverError};
use crate::optimize::{OptimizationStatus, ProblemSolution};

const NAME: &str = "clarabel";

/// Interior point solver for linear and convex quadratic problems
///
/// Supported attributes: `verbose` (bool), `max_iter` (int), `time_limit` (seconds),
/// `tol_feas`, `tol_gap_abs`, and `tol_gap_rel` (floats).
#[derive(Clone, Copy, Debug, Default)]
pub struct ClarabelSolver;

impl Solver for ClarabelSolver {
    fn name(&self) -> &'static str {
        NAME
    }

    fn quadratic_objective_capable(&self) -> bool {
        true
    }

    fn solve(&self, problem: &Problem) -> Result<ProblemSolution, SolverError> {
        let settings = settings_from_attributes(problem)?;
        let n = problem.n_variables();
        // Maximization problems are solved as minimization of the negated objective
        let sign = match problem.objective().sense() {
            ObjectiveSense::Minimize => 1.,
            ObjectiveSense::Maximize => -1.,
        };

        let q: Vec<f64> = problem
            .objective()
            .linear_coefficients(n)
            .into_iter()
            .map(|c| sign * c)
            .collect();
        let p = to_clarabel(&quadratic_matrix(problem, sign));

        let rows = ConeRows::build(problem);
        let a = to_clarabel(&rows.matrix(n));
        let cones = rows.cones();
        debug!(
            variables = n,
            rows = rows.b.len(),
            "Handing problem to clarabel"
        );

        let mut solver = DefaultSolver::new(&p, &q, &a, &rows.b, &cones, settings);
        solver.solve();

        let status = match solver.solution.status {
            SolverStatus::Solved => OptimizationStatus::Optimal,
            SolverStatus::AlmostSolved => OptimizationStatus::AlmostOptimal,
            SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
                OptimizationStatus::Infeasible
            }
            SolverStatus::DualInfeasible | SolverStatus::AlmostDualInfeasible => {
                OptimizationStatus::Unbounded
            }
            SolverStatus::NumericalError => OptimizationStatus::NumericalError,
            _ => OptimizationStatus::SolverHalted,
        };
        if !status.is_optimal() {
            return Ok(ProblemSolution::without_values(status));
        }

        let x = solver.solution.x.clone();
        let duals = rows.duals(&solver.solution.z, sign, problem.n_constraints());
        Ok(ProblemSolution {
            status,
            objective_value: Some(problem.objective_value(&x)),
            variable_values: Some(x),
            dual_values: Some(duals),
        })
    }
}

fn settings_from_attributes(problem: &Problem) -> Result<DefaultSettings<f64>, SolverError> {
    let mut settings = DefaultSettings::<f64>::default();
    settings.verbose = false;
    for (name, value) in problem.attributes() {
        let invalid = || SolverError::InvalidAttributeValue {
            solver: NAME,
            name: name.clone(),
            value: value.to_string(),
        };
        match name.as_str() {
            "verbose" => settings.verbose = value.as_bool().ok_or_else(invalid)?,
            "max_iter" => {
                settings.max_iter = value
                    .as_int()
                    .and_then(|v| u32::try_from(v).ok())
                    .ok_or_else(invalid)?
            }
            "time_limit" => settings.time_limit = positive_float(value.as_float()).ok_or_else(invalid)?,
            "tol_feas" => settings.tol_feas = positive_float(value.as_float()).ok_or_else(invalid)?,
            "tol_gap_abs" => {
                settings.tol_gap_abs = positive_float(value.as_float()).ok_or_else(invalid)?
            }
            "tol_gap_rel" => {
                settings.tol_gap_rel = positive_float(value.as_float()).ok_or_else(invalid)?
            }
            _ => {
                return Err(SolverError::UnknownAttribute {
                    solver: NAME,
                    name: name.clone(),
                })
            }
        }
    }
    Ok(settings)
}

fn positive_float(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v > 0.)
}

/// Upper triangle of P, where the quadratic part of the objective is 1/2 x'Px
fn quadratic_matrix(problem: &Problem, sign: f64) -> CscMatrix<f64> {
    let n = problem.n_variables();
    let mut coo = CooMatrix::new(n, n);
    for term in problem.objective().terms() {
        if let ObjectiveTerm::Quadratic { var1, var2, coef } = term {
            let (row, col) = if var1 <= var2 {
                (*var1, *var2)
            } else {
                (*var2, *var1)
            };
            // c*x_i*x_i contributes 2c to P_ii, c*x_i*x_j contributes c to P_ij and P_ji
            let value = if row == col { 2. * coef } else { *coef };
            coo.push(row, col, sign * value);
        }
    }
    CscMatrix::from(&coo)
}

fn to_clarabel(matrix: &CscMatrix<f64>) -> ClarabelMatrix<f64> {
    ClarabelMatrix::new(
        matrix.nrows(),
        matrix.ncols(),
        matrix.col_offsets().to_vec(),
        matrix.row_indices().to_vec(),
        matrix.values().to_vec(),
    )
}

/// Where the rows of a problem constraint ended up in the cone program
#[derive(Clone, Copy, Debug, Default)]
struct RowMap {
    equality: Option<usize>,
    upper: Option<usize>,
    lower: Option<usize>,
}

/// Rows of the cone program, zero cone rows first
struct ConeRows {
    zero: Vec<Vec<(usize, f64)>>,
    nonnegative: Vec<Vec<(usize, f64)>>,
    b: Vec<f64>,
    constraint_rows: Vec<RowMap>,
}

impl ConeRows {
    fn build(problem: &Problem) -> ConeRows {
        let mut zero: Vec<(Vec<(usize, f64)>, f64)> = Vec::new();
        let mut nonnegative: Vec<(Vec<(usize, f64)>, f64)> = Vec::new();
        let mut constraint_rows = Vec::with_capacity(problem.n_constraints());

        for constraint in problem.constraints() {
            let terms: Vec<(usize, f64)> = constraint
                .terms()
                .iter()
                .map(|t| (t.variable, t.coefficient))
                .collect();
            let (lb, ub) = constraint.bounds();
            let mut map = RowMap::default();
            if terms.is_empty() && lb <= 0. && 0. <= ub {
                // Trivially satisfied, leave it out
            } else if lb == ub {
                map.equality = Some(zero.len());
                zero.push((terms, ub));
            } else {
                if ub.is_finite() {
                    map.upper = Some(nonnegative.len());
                    nonnegative.push((terms.clone(), ub));
                }
                if lb.is_finite() {
                    map.lower = Some(nonnegative.len());
                    nonnegative.push((terms.iter().map(|(v, c)| (*v, -c)).collect(), -lb));
                }
            }
            constraint_rows.push(map);
        }

        for variable in problem.variables() {
            let (lb, ub) = (variable.lower_bound(), variable.upper_bound());
            let index = variable.index();
            if lb == ub {
                zero.push((vec![(index, 1.)], ub));
                continue;
            }
            if ub.is_finite() {
                nonnegative.push((vec![(index, 1.)], ub));
            }
            if lb.is_finite() {
                nonnegative.push((vec![(index, -1.)], -lb));
            }
        }

        // Nonnegative rows come after every zero row
        let offset = zero.len();
        for map in constraint_rows.iter_mut() {
            map.upper = map.upper.map(|r| r + offset);
            map.lower = map.lower.map(|r| r + offset);
        }
        let b = zero
            .iter()
            .chain(nonnegative.iter())
            .map(|(_, rhs)| *rhs)
            .collect();
        ConeRows {
            zero: zero.into_iter().map(|(terms, _)| terms).collect(),
            nonnegative: nonnegative.into_iter().map(|(terms, _)| terms).collect(),
            b,
            constraint_rows,
        }
    }

    fn matrix(&self, n_variables: usize) -> CscMatrix<f64> {
        let mut coo = CooMatrix::new(self.b.len(), n_variables);
        for (row, terms) in self.zero.iter().chain(self.nonnegative.iter()).enumerate() {
            for (col, coef) in terms {
                coo.push(row, *col, *coef);
            }
        }
        CscMatrix::from(&coo)
    }

    fn cones(&self) -> Vec<SupportedConeT<f64>> {
        let mut cones = Vec::with_capacity(2);
        if !self.zero.is_empty() {
            cones.push(SupportedConeT::ZeroConeT(self.zero.len()));
        }
        if !self.nonnegative.is_empty() {
            cones.push(SupportedConeT::NonnegativeConeT(self.nonnegative.len()));
        }
        cones
    }

    /// Change of the objective per unit increase of each constraint's bound
    fn duals(&self, z: &[f64], sign: f64, n_constraints: usize) -> Vec<f64> {
        let z_at = |row: Option<usize>| row.and_then(|r| z.get(r)).copied().unwrap_or(0.);
        (0..n_constraints)
            .map(|i| {
                let map = self.constraint_rows.get(i).copied().unwrap_or_default();
                let dual = match map.equality {
                    Some(row) => -z_at(Some(row)),
                    None => z_at(map.lower) - z_at(map.upper),
                };
                sign * dual
            })
            .collect()
    }
}
