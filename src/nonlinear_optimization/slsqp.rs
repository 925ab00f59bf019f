use std::cell::RefCell;
use std::collections::VecDeque;
use slsqp_rssl::{Constraint, Slsqp, SlsqpError, SlsqpMode};
use crate::nonlinear_optimization::{ConstrainedProblem, max_abs, OptimizerParameters, OptimizerResult, OptimizerStatus, ProblemEvaluator};
use crate::utils::utils_console::{optima_print, OptimaDebug, PrintColor, PrintMode};
use crate::utils::utils_errors::OptimaError;

/// Kraft's SLSQP through `slsqp_rssl`, a Rust port of the Fortran routine behind scipy's
/// `fmin_slsqp`.  Each residual of the problem becomes one `Constraint::Eq`; the solver estimates
/// derivatives itself with forward differences.
///
/// The solver is stepped manually rather than through `fmin_slsqp` so that the problem's
/// callback runs after every accepted line search, evaluation errors stop the solve right away,
/// and `max_time` is honored.
#[derive(Clone, Debug)]
pub struct SlsqpNonlinearOptimizer;
impl SlsqpNonlinearOptimizer {
    pub fn new() -> Self {
        Self
    }
    pub fn optimize<P: ConstrainedProblem + ?Sized>(&self, problem: &P, x0: &[f64], parameters: &OptimizerParameters, debug: OptimaDebug) -> Result<OptimizerResult, OptimaError> {
        let start = instant::Instant::now();
        let evaluator = ProblemEvaluator::new(problem, parameters.finite_difference_step);
        let n = evaluator.n();
        let m = evaluator.m();

        // evaluation errors at the start point are returned before the solver sees any NaN.
        evaluator.cost(x0);
        evaluator.constraints(x0);
        if let Some(e) = evaluator.take_error() { return Err(e); }

        // one forward-difference Jacobian visits n + 1 points per residual.
        let cache = ResidualCache::new(&evaluator, n + 2);
        let constraints: Vec<Constraint> = (0..m).map(|i| {
            let cache = &cache;
            Constraint::Eq(Box::new(move |x: &[f64]| cache.residual(x, i)))
        }).collect();

        let mut solver = Slsqp::new_with_observer(
            x0.to_vec(),
            &[],
            Box::new(|x: &[f64]| evaluator.cost(x)),
            constraints,
            parameters.max_iterations,
            parameters.ftol_abs,
            ()
        );

        let mut mode = SlsqpMode::Init;
        let mut num_iterations = 0;
        let status = loop {
            let previous_mode = mode;
            match solver.step() {
                Ok(new_mode) => { mode = new_mode; }
                Err(e) => { break Self::status_from_error(e); }
            }
            if evaluator.has_error() { break OptimizerStatus::NumericalFailure; }

            if previous_mode == SlsqpMode::LineSearch {
                num_iterations += 1;
                evaluator.callback(&solver.x);
                if evaluator.has_error() { break OptimizerStatus::NumericalFailure; }
                if debug.is_on() {
                    optima_print(&format!("slsqp iteration {}: ", num_iterations), PrintMode::Print, PrintColor::Blue, true);
                    optima_print(&format!("cost {:e}, max |c| {:e}", solver.f, max_abs(&cache.latest(&solver.x))), PrintMode::Println, PrintColor::None, false);
                }
            }

            if mode == SlsqpMode::Success { break OptimizerStatus::Converged; }
            if let Some(max_time) = &parameters.max_time {
                if start.elapsed() > *max_time { break OptimizerStatus::MaxTimeReached; }
            }
        };

        if let Some(e) = evaluator.take_error() { return Err(e); }

        let x = solver.x.clone();
        let cost = evaluator.cost(&x);
        let violation = max_abs(evaluator.constraints(&x).as_slice());
        let result = OptimizerResult::new(x, cost, violation, status, num_iterations, evaluator.num_function_evaluations(), start.elapsed(), parameters);
        if debug.is_on() { result.print_summary(); }

        Ok(result)
    }
    fn status_from_error(e: SlsqpError) -> OptimizerStatus {
        return match e {
            SlsqpError::IterationLimitExceeded => { OptimizerStatus::MaxIterationsReached }
            SlsqpError::PositiveDirectionalDerivative => { OptimizerStatus::LineSearchFailed }
            SlsqpError::SingularMatrixE | SlsqpError::SingularMatrixC | SlsqpError::RankDeficientHFTI => { OptimizerStatus::SingularSubproblem }
            SlsqpError::IncompatibleConstraints => { OptimizerStatus::IncompatibleConstraints }
            SlsqpError::IterationLimitExceededLSQ => { OptimizerStatus::NumericalFailure }
            SlsqpError::MoreEqualityConstraints => { OptimizerStatus::BackendFailure(e.message().to_string()) }
        }
    }
}
impl Default for SlsqpNonlinearOptimizer {
    fn default() -> Self { Self::new() }
}

/// Recently evaluated constraint vectors, keyed by the exact point.  `slsqp_rssl` asks for every
/// residual through its own closure, so without this each residual would cost a full evaluation.
struct ResidualCache<'e, 'a, P: ConstrainedProblem + ?Sized> {
    evaluator: &'e ProblemEvaluator<'a, P>,
    capacity: usize,
    entries: RefCell<VecDeque<(Vec<f64>, Vec<f64>)>>
}
impl<'e, 'a, P: ConstrainedProblem + ?Sized> ResidualCache<'e, 'a, P> {
    fn new(evaluator: &'e ProblemEvaluator<'a, P>, capacity: usize) -> Self {
        Self {
            evaluator,
            capacity: capacity.max(1),
            entries: RefCell::new(VecDeque::with_capacity(capacity.max(1)))
        }
    }
    fn residual(&self, x: &[f64], i: usize) -> f64 {
        self.latest(x)[i]
    }
    fn latest(&self, x: &[f64]) -> Vec<f64> {
        let hit = self.entries.borrow().iter().rev().find(|(xx, _)| xx.as_slice() == x).map(|(_, c)| c.clone());
        if let Some(c) = hit { return c; }

        let mut c = vec![0.0; self.evaluator.m()];
        self.evaluator.constraints_into(x, &mut c);
        let mut entries = self.entries.borrow_mut();
        if entries.len() == self.capacity { entries.pop_front(); }
        entries.push_back((x.to_vec(), c.clone()));
        c
    }
}
