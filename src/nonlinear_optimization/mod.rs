pub mod slsqp;

use std::cell::{Cell, RefCell};
use std::time::Duration;
use nalgebra::{DMatrix, DVector};
use optimization_engine::{constraints, SolverError};
use optimization_engine::alm::{AlmCache, AlmFactory, AlmOptimizer, AlmProblem, NO_JACOBIAN_MAPPING, NO_MAPPING, NO_SET};
use optimization_engine::core::ExitStatus;
use optimization_engine::panoc::PANOCCache;
use serde::{Serialize, Deserialize};
#[cfg(feature = "nlopt_optimization")]
use nlopt::*;
use crate::nonlinear_optimization::slsqp::SlsqpNonlinearOptimizer;
use crate::utils::utils_console::{optima_print, OptimaDebug, PrintColor, PrintMode};
use crate::utils::utils_errors::OptimaError;
use crate::utils::utils_math::finite_difference::FiniteDifferenceUtils;

/// A nonlinear program with equality constraints over a flat vector of decision variables:
///
/// minimize `cost(x)` subject to `equality_constraints(x) = 0`.
///
/// Evaluations take `&self`; implementors that need scratch memory keep it behind interior
/// mutability.  Solvers call the methods serially.
pub trait ConstrainedProblem {
    fn num_variables(&self) -> usize;
    fn num_equality_constraints(&self) -> usize;
    fn cost(&self, x: &[f64]) -> Result<f64, OptimaError>;
    /// Writes the `num_equality_constraints()` residuals at `x` into `out`.
    fn equality_constraints(&self, x: &[f64], out: &mut [f64]) -> Result<(), OptimaError>;
    /// Called with the current iterate after each solver iteration.
    fn iteration_callback(&self, _x: &[f64]) -> Result<(), OptimaError> { Ok(()) }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum NonlinearOptimizerType {
    /// SLSQP from `slsqp_rssl`.
    Slsqp,
    /// Augmented Lagrangian method from the Optimization Engine.
    OpEn,
    #[cfg(feature = "nlopt_optimization")]
    NloptSlsqp
}
impl Default for NonlinearOptimizerType {
    fn default() -> Self { Self::Slsqp }
}

#[derive(Clone, Debug)]
pub enum NonlinearOptimizer {
    Slsqp(SlsqpNonlinearOptimizer),
    OpEn(OpEnNonlinearOptimizer),
    #[cfg(feature = "nlopt_optimization")]
    Nlopt(NLoptNonlinearOptimizer)
}
impl NonlinearOptimizer {
    pub fn new(t: NonlinearOptimizerType) -> Self {
        match t {
            NonlinearOptimizerType::Slsqp => { Self::Slsqp(SlsqpNonlinearOptimizer::new()) }
            NonlinearOptimizerType::OpEn => { Self::OpEn(OpEnNonlinearOptimizer::new()) }
            #[cfg(feature = "nlopt_optimization")]
            NonlinearOptimizerType::NloptSlsqp => { Self::Nlopt(NLoptNonlinearOptimizer::new()) }
        }
    }
    /// Minimizes the problem starting at `x0`.  Failing to converge is reported through the
    /// result's `OptimizerStatus`; an `Err` means the problem itself failed to evaluate.
    pub fn optimize<P: ConstrainedProblem + ?Sized>(&self, problem: &P, x0: &[f64], parameters: &OptimizerParameters, debug: OptimaDebug) -> Result<OptimizerResult, OptimaError> {
        if x0.len() != problem.num_variables() {
            return Err(OptimaError::new_wrong_vec_length_error("NonlinearOptimizer::optimize", x0.len(), problem.num_variables(), file!(), line!()));
        }
        return match self {
            NonlinearOptimizer::Slsqp(o) => { o.optimize(problem, x0, parameters, debug) }
            NonlinearOptimizer::OpEn(o) => { o.optimize(problem, x0, parameters, debug) }
            #[cfg(feature = "nlopt_optimization")]
            NonlinearOptimizer::Nlopt(o) => { o.optimize(problem, x0, parameters, debug) }
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////

/// Wraps a `ConstrainedProblem` for the solver back ends.  Counts function evaluations, supplies
/// central finite-difference derivatives, and converts evaluation errors into NaN while keeping
/// the first error so it can be returned once the solver stops.
pub(crate) struct ProblemEvaluator<'a, P: ConstrainedProblem + ?Sized> {
    problem: &'a P,
    finite_difference_step: f64,
    num_function_evaluations: Cell<usize>,
    error: RefCell<Option<OptimaError>>
}
impl<'a, P: ConstrainedProblem + ?Sized> ProblemEvaluator<'a, P> {
    pub fn new(problem: &'a P, finite_difference_step: f64) -> Self {
        Self {
            problem,
            finite_difference_step,
            num_function_evaluations: Cell::new(0),
            error: RefCell::new(None)
        }
    }
    pub fn n(&self) -> usize { self.problem.num_variables() }
    pub fn m(&self) -> usize { self.problem.num_equality_constraints() }
    pub fn cost(&self, x: &[f64]) -> f64 {
        self.num_function_evaluations.set(self.num_function_evaluations.get() + 1);
        return match self.problem.cost(x) {
            Ok(c) => { c }
            Err(e) => { self.record_error(e); f64::NAN }
        }
    }
    pub fn constraints_into(&self, x: &[f64], out: &mut [f64]) {
        self.num_function_evaluations.set(self.num_function_evaluations.get() + 1);
        if let Err(e) = self.problem.equality_constraints(x, out) {
            self.record_error(e);
            out.iter_mut().for_each(|o| *o = f64::NAN);
        }
    }
    pub fn constraints(&self, x: &[f64]) -> DVector<f64> {
        let mut out = DVector::zeros(self.m());
        self.constraints_into(x, out.as_mut_slice());
        out
    }
    pub fn cost_gradient(&self, x: &[f64]) -> DVector<f64> {
        FiniteDifferenceUtils::central_gradient(|xx| self.cost(xx), x, self.finite_difference_step)
    }
    /// `m x n` Jacobian of the equality constraints.
    pub fn constraint_jacobian(&self, x: &[f64]) -> DMatrix<f64> {
        FiniteDifferenceUtils::central_jacobian(|xx, out| self.constraints_into(xx, out), x, self.m(), self.finite_difference_step)
    }
    pub fn callback(&self, x: &[f64]) {
        if let Err(e) = self.problem.iteration_callback(x) { self.record_error(e); }
    }
    pub fn num_function_evaluations(&self) -> usize {
        self.num_function_evaluations.get()
    }
    pub fn has_error(&self) -> bool {
        self.error.borrow().is_some()
    }
    pub fn take_error(&self) -> Option<OptimaError> {
        self.error.borrow_mut().take()
    }
    fn record_error(&self, e: OptimaError) {
        let mut error = self.error.borrow_mut();
        if error.is_none() { *error = Some(e); }
    }
}

/// Largest absolute entry.  NaN if any entry is NaN.
pub(crate) fn max_abs(v: &[f64]) -> f64 {
    if v.iter().any(|c| c.is_nan()) { return f64::NAN; }
    v.iter().fold(0.0, |acc: f64, c| acc.max(c.abs()))
}

////////////////////////////////////////////////////////////////////////////////////////////////////

/// Augmented Lagrangian back end built on the Optimization Engine (ALM outer loop, PANOC inner
/// solver).  The equality constraints are handled as an `F2(u) = 0` penalty mapping.  OpEn
/// exposes no per-iteration hook, so the problem's callback is called once on the final iterate.
///
/// The decision variables are kept within `search_radius` of `x0` in every coordinate.  If the
/// solver fails anyway, the result holds the evaluated iterate with the smallest constraint
/// violation (or `x0`), never a non-finite vector.
#[derive(Clone, Debug)]
pub struct OpEnNonlinearOptimizer {
    lbfgs_memory: usize,
    epsilon_tolerance: f64,
    max_inner_iterations: usize,
    search_radius: f64
}
impl OpEnNonlinearOptimizer {
    pub fn new() -> Self {
        Self {
            lbfgs_memory: 5,
            epsilon_tolerance: 1e-6,
            max_inner_iterations: 500,
            search_radius: 2.0 * std::f64::consts::PI
        }
    }
    pub fn with_search_radius(mut self, search_radius: f64) -> Self {
        self.search_radius = search_radius;
        self
    }
    pub fn optimize<P: ConstrainedProblem + ?Sized>(&self, problem: &P, x0: &[f64], parameters: &OptimizerParameters, debug: OptimaDebug) -> Result<OptimizerResult, OptimaError> {
        let start = instant::Instant::now();
        let evaluator = ProblemEvaluator::new(problem, parameters.finite_difference_step);
        let n = evaluator.n();
        let m = evaluator.m();

        let panoc_cache = PANOCCache::new(n, self.epsilon_tolerance, self.lbfgs_memory);
        let mut alm_cache = AlmCache::new(panoc_cache, 0, m);

        let lower: Vec<f64> = x0.iter().map(|x| x - self.search_radius).collect();
        let upper: Vec<f64> = x0.iter().map(|x| x + self.search_radius).collect();
        let bounds = constraints::Rectangle::new(Some(lower.as_slice()), Some(upper.as_slice()));

        let best_iterate: RefCell<Option<(f64, Vec<f64>)>> = RefCell::new(None);

        let f = |u: &[f64], cost: &mut f64| -> Result<(), SolverError> {
            *cost = evaluator.cost(u);
            if evaluator.has_error() { return Err(SolverError::Cost); }
            Ok(())
        };
        let df = |u: &[f64], grad: &mut [f64]| -> Result<(), SolverError> {
            let g = evaluator.cost_gradient(u);
            if evaluator.has_error() { return Err(SolverError::Cost); }
            grad.copy_from_slice(g.as_slice());
            Ok(())
        };
        let f2 = |u: &[f64], f2u: &mut [f64]| -> Result<(), SolverError> {
            evaluator.constraints_into(u, f2u);
            if evaluator.has_error() { return Err(SolverError::Cost); }
            let violation = max_abs(f2u);
            if violation.is_finite() && u.iter().all(|v| v.is_finite()) {
                let mut best = best_iterate.borrow_mut();
                let improved = match best.as_ref() { Some((b, _)) => { violation < *b } None => { true } };
                if improved { *best = Some((violation, u.to_vec())); }
            }
            Ok(())
        };
        let f2_jacobian_product = |u: &[f64], d: &[f64], res: &mut [f64]| -> Result<(), SolverError> {
            let jacobian = evaluator.constraint_jacobian(u);
            if evaluator.has_error() { return Err(SolverError::Cost); }
            let product = jacobian.transpose() * DVector::from_column_slice(d);
            res.copy_from_slice(product.as_slice());
            Ok(())
        };

        let factory = AlmFactory::new(
            f,
            df,
            NO_MAPPING,
            NO_JACOBIAN_MAPPING,
            Some(f2),
            Some(f2_jacobian_product),
            NO_SET,
            m,
        );

        let alm_problem = AlmProblem::new(
            bounds,
            NO_SET,
            NO_SET,
            |u: &[f64], xi: &[f64], cost: &mut f64| -> Result<(), SolverError> {
                factory.psi(u, xi, cost)
            },
            |u: &[f64], xi: &[f64], grad: &mut [f64]| -> Result<(), SolverError> {
                factory.d_psi(u, xi, grad)
            },
            NO_MAPPING,
            Some(f2),
            0,
            m
        );

        let mut alm_optimizer = AlmOptimizer::new(&mut alm_cache, alm_problem)
            .with_delta_tolerance(parameters.constraint_tolerance)
            .with_epsilon_tolerance(self.epsilon_tolerance)
            .with_max_outer_iterations(parameters.max_iterations)
            .with_max_inner_iterations(self.max_inner_iterations);
        if let Some(a) = &parameters.max_time { alm_optimizer = alm_optimizer.with_max_duration(*a); }

        let mut u = x0.to_vec();
        let solver_result = alm_optimizer.solve(&mut u);

        if let Some(e) = evaluator.take_error() { return Err(e); }

        if solver_result.is_err() || u.iter().any(|v| !v.is_finite()) {
            u = match best_iterate.borrow().as_ref() {
                Some((_, b)) => { b.clone() }
                None => { x0.to_vec() }
            };
        }

        let (status, num_iterations) = match solver_result {
            Ok(r) => {
                let status = match r.exit_status() {
                    ExitStatus::Converged => { OptimizerStatus::Converged }
                    ExitStatus::NotConvergedIterations => { OptimizerStatus::MaxIterationsReached }
                    ExitStatus::NotConvergedOutOfTime => { OptimizerStatus::MaxTimeReached }
                };
                (status, r.num_outer_iterations())
            }
            Err(e) => { (OptimizerStatus::BackendFailure(format!("{:?}", e)), 0) }
        };

        evaluator.callback(&u);
        if let Some(e) = evaluator.take_error() { return Err(e); }

        let cost = evaluator.cost(&u);
        let violation = max_abs(evaluator.constraints(&u).as_slice());
        let result = OptimizerResult::new(u, cost, violation, status, num_iterations, evaluator.num_function_evaluations(), start.elapsed(), parameters);
        if debug.is_on() { result.print_summary(); }

        Ok(result)
    }
}
impl Default for OpEnNonlinearOptimizer {
    fn default() -> Self { Self::new() }
}

////////////////////////////////////////////////////////////////////////////////////////////////////

/// NLopt's SLSQP with one vector-valued equality constraint.  The problem's callback runs
/// whenever NLopt asks for the objective gradient, which SLSQP does once per iteration.
///
/// NLopt only caps objective evaluations, so `max_iterations` is turned into an evaluation budget
/// of `evaluations_per_iteration` evaluations per iteration.  Running out of that budget is
/// reported as `MaxIterationsReached`.
#[cfg(feature = "nlopt_optimization")]
#[derive(Clone, Debug)]
pub struct NLoptNonlinearOptimizer {
    algorithm: Algorithm,
    evaluations_per_iteration: usize
}
#[cfg(feature = "nlopt_optimization")]
impl NLoptNonlinearOptimizer {
    pub fn new() -> Self {
        Self {
            algorithm: Algorithm::Slsqp,
            evaluations_per_iteration: 10
        }
    }
    pub fn optimize<P: ConstrainedProblem + ?Sized>(&self, problem: &P, x0: &[f64], parameters: &OptimizerParameters, debug: OptimaDebug) -> Result<OptimizerResult, OptimaError> {
        let start = instant::Instant::now();
        let evaluator = ProblemEvaluator::new(problem, parameters.finite_difference_step);
        let n = evaluator.n();
        let m = evaluator.m();
        let num_iterations = Cell::new(0);

        let obj_f = |x: &[f64], gradient: Option<&mut [f64]>, _params: &mut ()| -> f64 {
            let val = evaluator.cost(x);
            if let Some(gradient) = gradient {
                let g = evaluator.cost_gradient(x);
                gradient.copy_from_slice(g.as_slice());
                num_iterations.set(num_iterations.get() + 1);
                evaluator.callback(x);
            }
            return val;
        };
        let mut nlopt = Nlopt::new(self.algorithm.clone(), n, obj_f, Target::Minimize, ());

        let eq_con = |result: &mut [f64], x: &[f64], gradient: Option<&mut [f64]>, _params: &mut ()| {
            evaluator.constraints_into(x, result);
            if let Some(gradient) = gradient {
                let jacobian = evaluator.constraint_jacobian(x);
                for i in 0..m {
                    for j in 0..n { gradient[i * n + j] = jacobian[(i, j)]; }
                }
            }
        };
        let tolerances = vec![parameters.constraint_tolerance; m];
        let map_err = |e: FailState| OptimaError::new_generic_error_str(&format!("NLopt setup failed: {:?}", e), file!(), line!());
        nlopt.add_equality_mconstraint(m, eq_con, (), &tolerances).map_err(map_err)?;

        if let Some(a) = &parameters.max_time { nlopt.set_maxtime(a.as_secs_f64()).map_err(map_err)?; }
        let max_evaluations = parameters.max_iterations.saturating_mul(self.evaluations_per_iteration).min(u32::MAX as usize);
        nlopt.set_maxeval(max_evaluations as u32).map_err(map_err)?;
        nlopt.set_ftol_abs(parameters.ftol_abs).map_err(map_err)?;
        nlopt.set_xtol_abs1(parameters.xtol_abs).map_err(map_err)?;

        let mut x = x0.to_vec();
        let res = nlopt.optimize(&mut x);
        drop(nlopt);

        if let Some(e) = evaluator.take_error() { return Err(e); }

        let status = match res {
            Ok((s, _)) => {
                match s {
                    SuccessState::Success | SuccessState::FtolReached | SuccessState::XtolReached => { OptimizerStatus::Converged }
                    SuccessState::MaxEvalReached => { OptimizerStatus::MaxIterationsReached }
                    SuccessState::MaxTimeReached => { OptimizerStatus::MaxTimeReached }
                    SuccessState::StopValReached => { OptimizerStatus::BackendFailure("unexpected stopval".to_string()) }
                }
            }
            Err((FailState::RoundoffLimited, _)) => { OptimizerStatus::NumericalFailure }
            Err((e, _)) => { OptimizerStatus::BackendFailure(format!("{:?}", e)) }
        };

        let cost = evaluator.cost(&x);
        let violation = max_abs(evaluator.constraints(&x).as_slice());
        let result = OptimizerResult::new(x, cost, violation, status, num_iterations.get(), evaluator.num_function_evaluations(), start.elapsed(), parameters);
        if debug.is_on() { result.print_summary(); }

        Ok(result)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum OptimizerStatus {
    Converged,
    MaxIterationsReached,
    MaxTimeReached,
    LineSearchFailed,
    SingularSubproblem,
    NumericalFailure,
    /// The linearized constraints had no solution even after relaxation.
    IncompatibleConstraints,
    BackendFailure(String)
}
impl OptimizerStatus {
    pub fn is_converged(&self) -> bool {
        *self == OptimizerStatus::Converged
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OptimizerResult {
    x_min: DVector<f64>,
    cost: f64,
    max_constraint_violation: f64,
    status: OptimizerStatus,
    constraints_satisfied: bool,
    num_iterations: usize,
    num_function_evaluations: usize,
    solve_time: Duration
}
impl OptimizerResult {
    /// `status` is the back end's own exit reason.  Feasibility of `x_min` is checked separately
    /// against `constraint_tolerance` (a NaN violation is infeasible).
    pub(crate) fn new(x_min: Vec<f64>, cost: f64, max_constraint_violation: f64, status: OptimizerStatus, num_iterations: usize, num_function_evaluations: usize, solve_time: Duration, parameters: &OptimizerParameters) -> Self {
        let constraints_satisfied = max_constraint_violation <= parameters.constraint_tolerance;
        Self {
            x_min: DVector::from_vec(x_min),
            cost,
            max_constraint_violation,
            status,
            constraints_satisfied,
            num_iterations,
            num_function_evaluations,
            solve_time
        }
    }
    pub fn x_min(&self) -> &DVector<f64> {
        &self.x_min
    }
    pub fn cost(&self) -> f64 {
        self.cost
    }
    pub fn max_constraint_violation(&self) -> f64 {
        self.max_constraint_violation
    }
    pub fn status(&self) -> &OptimizerStatus {
        &self.status
    }
    pub fn constraints_satisfied(&self) -> bool {
        self.constraints_satisfied
    }
    /// Converged with the constraints met.
    pub fn is_success(&self) -> bool {
        self.status.is_converged() && self.constraints_satisfied
    }
    pub fn num_iterations(&self) -> usize {
        self.num_iterations
    }
    pub fn num_function_evaluations(&self) -> usize {
        self.num_function_evaluations
    }
    pub fn solve_time(&self) -> Duration {
        self.solve_time
    }
    pub fn print_summary(&self) {
        let color = if self.is_success() { PrintColor::Green } else { PrintColor::Red };
        optima_print(&format!("Status: {:?} (constraints satisfied: {})", self.status, self.constraints_satisfied), PrintMode::Println, color, true);
        optima_print(&format!("  cost: {:e}, max constraint violation: {:e}", self.cost, self.max_constraint_violation), PrintMode::Println, PrintColor::None, false);
        optima_print(&format!("  iterations: {}, function evaluations: {}, solve time: {:?}", self.num_iterations, self.num_function_evaluations, self.solve_time), PrintMode::Println, PrintColor::None, false);
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct OptimizerParameters {
    pub max_iterations: usize,
    pub max_time: Option<Duration>,
    pub ftol_abs: f64,
    pub xtol_abs: f64,
    pub constraint_tolerance: f64,
    pub finite_difference_step: f64
}
impl OptimizerParameters {
    pub fn new_empty() -> Self {
        Self::default()
    }
    pub fn set_max_time(&mut self, max_time: Duration) {
        self.max_time = Some(max_time);
    }
    pub fn set_max_iterations(&mut self, max_iterations: usize) {
        self.max_iterations = max_iterations;
    }
    pub fn set_constraint_tolerance(&mut self, constraint_tolerance: f64) {
        self.constraint_tolerance = constraint_tolerance;
    }
}
impl Default for OptimizerParameters {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            max_time: None,
            ftol_abs: 1e-10,
            xtol_abs: 1e-10,
            constraint_tolerance: 1e-8,
            finite_difference_step: 1e-6
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// minimize x0^2 + x1^2 subject to x0 + x1 - 1 = 0.  Solution (0.5, 0.5).
    struct LineProblem;
    impl ConstrainedProblem for LineProblem {
        fn num_variables(&self) -> usize { 2 }
        fn num_equality_constraints(&self) -> usize { 1 }
        fn cost(&self, x: &[f64]) -> Result<f64, OptimaError> { Ok(x[0] * x[0] + x[1] * x[1]) }
        fn equality_constraints(&self, x: &[f64], out: &mut [f64]) -> Result<(), OptimaError> {
            out[0] = x[0] + x[1] - 1.0;
            Ok(())
        }
    }

    struct BrokenProblem;
    impl ConstrainedProblem for BrokenProblem {
        fn num_variables(&self) -> usize { 1 }
        fn num_equality_constraints(&self) -> usize { 1 }
        fn cost(&self, _x: &[f64]) -> Result<f64, OptimaError> { Err(OptimaError::new_generic_error_str("broken", file!(), line!())) }
        fn equality_constraints(&self, _x: &[f64], out: &mut [f64]) -> Result<(), OptimaError> { out[0] = 0.0; Ok(()) }
    }

    #[test]
    fn open_solves_line_problem() {
        let mut params = OptimizerParameters::default();
        params.set_constraint_tolerance(1e-5);
        params.set_max_iterations(50);
        let optimizer = NonlinearOptimizer::new(NonlinearOptimizerType::OpEn);
        let res = optimizer.optimize(&LineProblem, &[3.0, -1.0], &params, OptimaDebug::False).unwrap();
        assert!(res.is_success(), "{:?}", res.status());
        assert_relative_eq!(res.x_min()[0], 0.5, epsilon = 1e-3);
        assert_relative_eq!(res.x_min()[1], 0.5, epsilon = 1e-3);
    }

    #[test]
    fn open_stays_near_the_start() {
        let mut params = OptimizerParameters::default();
        params.set_constraint_tolerance(1e-5);
        params.set_max_iterations(50);
        let optimizer = OpEnNonlinearOptimizer::new().with_search_radius(1.0);
        let res = optimizer.optimize(&LineProblem, &[3.0, -1.0], &params, OptimaDebug::False).unwrap();
        assert!(res.x_min().iter().all(|v| v.is_finite()));
        assert!(!matches!(res.status(), OptimizerStatus::BackendFailure(_)), "{:?}", res.status());
        assert!(res.x_min()[0] >= 2.0 - 1e-9 && res.x_min()[0] <= 4.0 + 1e-9);
        assert!(res.x_min()[1] >= -2.0 - 1e-9 && res.x_min()[1] <= 1e-9);
    }

    #[test]
    fn wrong_initial_length_is_an_error() {
        let optimizer = NonlinearOptimizer::new(NonlinearOptimizerType::Slsqp);
        assert!(optimizer.optimize(&LineProblem, &[0.0], &OptimizerParameters::default(), OptimaDebug::False).is_err());
    }

    #[test]
    fn evaluation_errors_propagate() {
        for t in [NonlinearOptimizerType::Slsqp, NonlinearOptimizerType::OpEn] {
            let res = NonlinearOptimizer::new(t).optimize(&BrokenProblem, &[0.0], &OptimizerParameters::default(), OptimaDebug::False);
            assert!(res.is_err());
        }
    }

    #[test]
    fn violated_result_is_not_success() {
        let params = OptimizerParameters::default();
        let r = OptimizerResult::new(vec![0.0], 0.0, 1e-3, OptimizerStatus::Converged, 1, 1, Duration::from_secs(0), &params);
        assert_eq!(*r.status(), OptimizerStatus::Converged);
        assert!(!r.constraints_satisfied());
        assert!(!r.is_success());
        let r = OptimizerResult::new(vec![0.0], 0.0, f64::NAN, OptimizerStatus::Converged, 1, 1, Duration::from_secs(0), &params);
        assert!(!r.constraints_satisfied());
        assert!(!r.is_success());
    }

    #[test]
    fn exit_reason_is_kept_when_constraints_are_violated() {
        let params = OptimizerParameters::default();
        let r = OptimizerResult::new(vec![0.0], 0.0, 1e-3, OptimizerStatus::MaxIterationsReached, 100, 1, Duration::from_secs(0), &params);
        assert_eq!(*r.status(), OptimizerStatus::MaxIterationsReached);
        let r = OptimizerResult::new(vec![0.0], 0.0, 1e-3, OptimizerStatus::MaxTimeReached, 3, 1, Duration::from_secs(0), &params);
        assert_eq!(*r.status(), OptimizerStatus::MaxTimeReached);
        let r = OptimizerResult::new(vec![0.0], 0.0, 1e-12, OptimizerStatus::Converged, 3, 1, Duration::from_secs(0), &params);
        assert!(r.constraints_satisfied());
        assert!(r.is_success());
    }
}
