use std::cell::RefCell;
use std::time::Duration;
use nalgebra::{DVector, Isometry3};
use serde::{Serialize, Deserialize};
use crate::nonlinear_optimization::{ConstrainedProblem, NonlinearOptimizer, NonlinearOptimizerType, OptimizerParameters, OptimizerResult};
use crate::robot_modules::robot::Robot;
use crate::robot_modules::robot_kinematics_module::{RobotKinematicsData, RobotKinematicsModule};
use crate::utils::utils_console::{optima_print, OptimaDebug, PrintColor, PrintMode};
use crate::utils::utils_errors::OptimaError;
use crate::utils::utils_se3::lie_group::SE3LieGroupUtils;
use crate::visualization::RobotVisualizer;

pub const RIGHT_TARGET_OBJECT: &str = "world/targetR";
pub const LEFT_TARGET_OBJECT: &str = "world/targetL";
const TARGET_BOX_DIMS: [f64; 3] = [0.1, 0.03, 0.03];

/// Places both feet of a biped at fixed SE(3) targets while staying close to a reference posture.
///
/// Decision variables are tangent vectors `x` integrated from the anchor configuration `q0`
/// (the robot's neutral configuration), so the optimizer works in a flat space while
/// configurations stay on the manifold.
///
/// * cost: `|difference(refQ, q)[offset..]|^2` where `offset` skips the free-flyer part.
/// * equality constraints: the `log6` error twist of the right foot (entries 0..6) followed by the
///   left foot (entries 6..12).
///
/// Kinematic scratch data is owned by the problem and overwritten on every constraint
/// evaluation, so a problem must not be evaluated from several threads.
pub struct BipedFootPlacementProblem<'a> {
    robot: &'a Robot,
    data: RefCell<RobotKinematicsData>,
    visualizer: RefCell<Option<Box<dyn RobotVisualizer>>>,
    left_frame_id: usize,
    right_frame_id: usize,
    left_target: Isometry3<f64>,
    right_target: Isometry3<f64>,
    q0: DVector<f64>,
    reference_configuration: DVector<f64>,
    cost_tangent_offset: usize,
    callback_pause: Duration,
    last_residuals: RefCell<DVector<f64>>
}
impl<'a> BipedFootPlacementProblem<'a> {
    /// Targets at `[0, 0.3, 0]` (left) and `[0, -0.3, 0]` (right) with identity orientation.
    pub fn new(robot: &'a Robot, data: RobotKinematicsData, visualizer: Option<Box<dyn RobotVisualizer>>) -> Result<Self, OptimaError> {
        return Self::new_from_config(robot, data, visualizer, &BipedIKConfig::default());
    }
    pub fn new_from_config(robot: &'a Robot, data: RobotKinematicsData, visualizer: Option<Box<dyn RobotVisualizer>>, config: &BipedIKConfig) -> Result<Self, OptimaError> {
        let model = robot.robot_model_module();
        let conf = robot.robot_configuration_module();

        let left_frame_id = model.get_frame_id(&config.left_frame_name)?;
        let right_frame_id = model.get_frame_id(&config.right_frame_name)?;

        let cost_tangent_offset = config.cost_tangent_offset.unwrap_or(conf.root_joint_type().nv());
        if cost_tangent_offset > conf.nv() {
            return Err(OptimaError::new_idx_out_of_bound_error(cost_tangent_offset, conf.nv() + 1, file!(), line!()));
        }

        let q0 = conf.neutral_configuration();
        let num_residuals = conf.nv() - cost_tangent_offset;

        let out_self = Self {
            robot,
            data: RefCell::new(data),
            visualizer: RefCell::new(visualizer),
            left_frame_id,
            right_frame_id,
            left_target: SE3LieGroupUtils::isometry_from_xyz_rpy(&config.left_target_xyz, &config.left_target_rpy),
            right_target: SE3LieGroupUtils::isometry_from_xyz_rpy(&config.right_target_xyz, &config.right_target_rpy),
            reference_configuration: q0.clone(),
            q0,
            cost_tangent_offset,
            callback_pause: config.callback_pause,
            last_residuals: RefCell::new(DVector::zeros(num_residuals))
        };

        out_self.init_display()?;

        Ok(out_self)
    }
    fn init_display(&self) -> Result<(), OptimaError> {
        let mut visualizer = self.visualizer.borrow_mut();
        if let Some(v) = visualizer.as_mut() {
            v.add_box(RIGHT_TARGET_OBJECT, TARGET_BOX_DIMS, [1.0, 0.0, 0.0, 1.0])?;
            v.add_box(LEFT_TARGET_OBJECT, TARGET_BOX_DIMS, [0.0, 1.0, 0.0, 1.0])?;
            v.apply_configuration(RIGHT_TARGET_OBJECT, SE3LieGroupUtils::isometry_to_xyz_quat(&self.right_target))?;
            v.apply_configuration(LEFT_TARGET_OBJECT, SE3LieGroupUtils::isometry_to_xyz_quat(&self.left_target))?;
            v.refresh()?;
        }
        Ok(())
    }
    /// `q0 ⊕ v`.
    pub fn configuration_from_tangent(&self, v: &DVector<f64>) -> Result<DVector<f64>, OptimaError> {
        self.robot.robot_configuration_module().integrate(&self.q0, v)
    }
    /// `q ⊖ q0`.
    pub fn tangent_from_configuration(&self, q: &DVector<f64>) -> Result<DVector<f64>, OptimaError> {
        self.robot.robot_configuration_module().difference(&self.q0, q)
    }
    /// Squared distance to the reference posture, ignoring the first `cost_tangent_offset`
    /// tangent components.  The residuals are kept for `last_residuals`.
    pub fn cost(&self, x: &[f64]) -> Result<f64, OptimaError> {
        let q = self.configuration_from_tangent(&DVector::from_column_slice(x))?;
        let diff = self.robot.robot_configuration_module().difference(&self.reference_configuration, &q)?;
        let residuals = diff.rows(self.cost_tangent_offset, diff.len() - self.cost_tangent_offset).into_owned();
        let out = residuals.norm_squared();
        *self.last_residuals.borrow_mut() = residuals;
        Ok(out)
    }
    /// Error twist `log6(target⁻¹ · oMf[frame_id])` at `x`.  Zero iff the frame is on target.
    pub fn foot_constraint(&self, x: &[f64], frame_id: usize, target: &Isometry3<f64>) -> Result<[f64; 6], OptimaError> {
        let q = self.configuration_from_tangent(&DVector::from_column_slice(x))?;
        let mut data = self.data.borrow_mut();
        RobotKinematicsModule::forward_kinematics(self.robot.robot_configuration_module(), &mut data, &q)?;
        RobotKinematicsModule::update_frame_placements(self.robot.robot_model_module(), &mut data);
        let placement = data.frame_placement(frame_id)?;
        let error = SE3LieGroupUtils::log6(&(target.inverse() * placement));
        Ok(error.to_array())
    }
    /// Right foot error twist followed by left foot error twist.
    pub fn constraint(&self, x: &[f64]) -> Result<[f64; 12], OptimaError> {
        let right = self.foot_constraint(x, self.right_frame_id, &self.right_target)?;
        let left = self.foot_constraint(x, self.left_frame_id, &self.left_target)?;
        let mut out = [0.0; 12];
        out[0..6].copy_from_slice(&right);
        out[6..12].copy_from_slice(&left);
        Ok(out)
    }
    /// Displays the configuration for `x` and pauses.  Does nothing without a visualizer.
    pub fn callback(&self, x: &[f64]) -> Result<(), OptimaError> {
        let mut visualizer = self.visualizer.borrow_mut();
        if let Some(v) = visualizer.as_mut() {
            let q = self.configuration_from_tangent(&DVector::from_column_slice(x))?;
            v.display(&q)?;
            if !self.callback_pause.is_zero() { std::thread::sleep(self.callback_pause); }
        }
        Ok(())
    }
    pub fn set_reference_configuration(&mut self, q: DVector<f64>) -> Result<(), OptimaError> {
        let nq = self.robot.robot_configuration_module().nq();
        if q.len() != nq {
            return Err(OptimaError::new_wrong_vec_length_error("set_reference_configuration", q.len(), nq, file!(), line!()));
        }
        self.reference_configuration = q;
        Ok(())
    }
    pub fn reference_configuration(&self) -> &DVector<f64> {
        &self.reference_configuration
    }
    pub fn q0(&self) -> &DVector<f64> {
        &self.q0
    }
    /// Residuals of the most recent `cost` evaluation.
    pub fn last_residuals(&self) -> DVector<f64> {
        self.last_residuals.borrow().clone()
    }
    pub fn left_frame_id(&self) -> usize {
        self.left_frame_id
    }
    pub fn right_frame_id(&self) -> usize {
        self.right_frame_id
    }
    pub fn left_target(&self) -> &Isometry3<f64> {
        &self.left_target
    }
    pub fn right_target(&self) -> &Isometry3<f64> {
        &self.right_target
    }
    pub fn cost_tangent_offset(&self) -> usize {
        self.cost_tangent_offset
    }
    pub fn robot(&self) -> &Robot {
        self.robot
    }
}
impl<'a> ConstrainedProblem for BipedFootPlacementProblem<'a> {
    fn num_variables(&self) -> usize {
        self.robot.robot_configuration_module().nv()
    }
    fn num_equality_constraints(&self) -> usize {
        12
    }
    fn cost(&self, x: &[f64]) -> Result<f64, OptimaError> {
        BipedFootPlacementProblem::cost(self, x)
    }
    fn equality_constraints(&self, x: &[f64], out: &mut [f64]) -> Result<(), OptimaError> {
        if out.len() != 12 {
            return Err(OptimaError::new_wrong_vec_length_error("equality_constraints", out.len(), 12, file!(), line!()));
        }
        out.copy_from_slice(&self.constraint(x)?);
        Ok(())
    }
    fn iteration_callback(&self, x: &[f64]) -> Result<(), OptimaError> {
        self.callback(x)
    }
}

/// Everything needed to set up and solve a foot placement problem.  Missing fields take their
/// default values when deserialized.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BipedIKConfig {
    pub robot_name: String,
    pub left_frame_name: String,
    pub right_frame_name: String,
    pub left_target_xyz: [f64; 3],
    pub left_target_rpy: [f64; 3],
    pub right_target_xyz: [f64; 3],
    pub right_target_rpy: [f64; 3],
    /// Number of leading tangent components left out of the cost.  `None` means the root joint's
    /// tangent dimension (6 for a free-flyer).
    pub cost_tangent_offset: Option<usize>,
    pub optimizer_type: NonlinearOptimizerType,
    pub optimizer_parameters: OptimizerParameters,
    pub callback_pause: Duration,
    /// Starting and reference posture.  `None` uses the robot's default configuration.
    pub reference_configuration_name: Option<String>
}
impl Default for BipedIKConfig {
    fn default() -> Self {
        Self {
            robot_name: "biped_legs".to_string(),
            left_frame_name: "left_sole_link".to_string(),
            right_frame_name: "right_sole_link".to_string(),
            left_target_xyz: [0.0, 0.3, 0.0],
            left_target_rpy: [0.0; 3],
            right_target_xyz: [0.0, -0.3, 0.0],
            right_target_rpy: [0.0; 3],
            cost_tangent_offset: None,
            optimizer_type: NonlinearOptimizerType::default(),
            optimizer_parameters: OptimizerParameters::default(),
            callback_pause: Duration::from_millis(100),
            reference_configuration_name: None
        }
    }
}

#[derive(Clone, Debug)]
pub struct BipedIKSolution {
    pub x: DVector<f64>,
    pub q_opt: DVector<f64>,
    pub result: OptimizerResult
}
impl BipedIKSolution {
    pub fn print_summary(&self) {
        self.result.print_summary();
        let s: Vec<String> = self.q_opt.iter().map(|v| format!("{:.6}", v)).collect();
        optima_print("q_opt: ", PrintMode::Print, PrintColor::Blue, true);
        optima_print(&format!("[{}]", s.join(", ")), PrintMode::Println, PrintColor::None, false);
    }
}

/// Solves the foot placement problem for `robot` starting from its default (or the configured
/// reference) configuration, which is also used as the cost's reference posture.  The optimizer's
/// status is returned as is; a non-converged solve is not an `Err`.
pub fn solve_biped_foot_placement(robot: &Robot, config: &BipedIKConfig, visualizer: Option<Box<dyn RobotVisualizer>>, debug: OptimaDebug) -> Result<BipedIKSolution, OptimaError> {
    let mut problem = BipedFootPlacementProblem::new_from_config(robot, robot.spawn_kinematics_data(), visualizer, config)?;

    let q_start = match &config.reference_configuration_name {
        None => { robot.q0().clone() }
        Some(name) => { robot.reference_configuration(name)? }
    };
    problem.set_reference_configuration(q_start.clone())?;

    let x0 = problem.tangent_from_configuration(&q_start)?;
    let optimizer = NonlinearOptimizer::new(config.optimizer_type);
    let result = optimizer.optimize(&problem, x0.as_slice(), &config.optimizer_parameters, debug)?;

    let x = result.x_min().clone();
    let q_opt = problem.configuration_from_tangent(&x)?;

    Ok(BipedIKSolution {
        x,
        q_opt,
        result
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_targets_and_frames() {
        let robot = Robot::new_from_embedded("biped_legs").unwrap();
        let problem = BipedFootPlacementProblem::new(&robot, robot.spawn_kinematics_data(), None).unwrap();
        assert_relative_eq!(problem.left_target().translation.vector[1], 0.3);
        assert_relative_eq!(problem.right_target().translation.vector[1], -0.3);
        assert_eq!(problem.cost_tangent_offset(), 6);
        assert_eq!(problem.num_variables(), 18);
        assert_eq!(problem.reference_configuration(), problem.q0());
    }

    #[test]
    fn cost_residuals_skip_root() {
        let robot = Robot::new_from_embedded("biped_legs").unwrap();
        let problem = BipedFootPlacementProblem::new(&robot, robot.spawn_kinematics_data(), None).unwrap();
        let mut x = vec![0.0; 18];
        x[0] = 0.5;
        x[3] = 0.2;
        assert_relative_eq!(problem.cost(&x).unwrap(), 0.0, epsilon = 1e-20);
        x[10] = 0.3;
        assert_relative_eq!(problem.cost(&x).unwrap(), 0.09, epsilon = 1e-12);
        assert_eq!(problem.last_residuals().len(), 12);
        assert_relative_eq!(problem.last_residuals()[4], 0.3, epsilon = 1e-12);
    }

    #[test]
    fn config_round_trips_through_ron_and_json() {
        use crate::utils::utils_traits::{ToAndFromJsonString, ToAndFromRonString};
        let mut config = BipedIKConfig::default();
        config.optimizer_type = NonlinearOptimizerType::OpEn;
        config.cost_tangent_offset = Some(0);
        let ron = config.convert_to_ron_string().unwrap();
        assert_eq!(BipedIKConfig::load_from_ron_string(&ron).unwrap(), config);
        let json = config.convert_to_json_string().unwrap();
        assert_eq!(BipedIKConfig::load_from_json_string(&json).unwrap(), config);
        let partial: BipedIKConfig = BipedIKConfig::load_from_json_string(r#"{"left_target_xyz": [0.1, 0.3, 0.0]}"#).unwrap();
        assert_eq!(partial.right_frame_name, "right_sole_link");
        assert_eq!(partial.left_target_xyz, [0.1, 0.3, 0.0]);
    }

    #[test]
    fn oversized_cost_offset_is_rejected() {
        let robot = Robot::new_from_embedded("biped_legs").unwrap();
        let mut config = BipedIKConfig::default();
        config.cost_tangent_offset = Some(19);
        assert!(BipedFootPlacementProblem::new_from_config(&robot, robot.spawn_kinematics_data(), None, &config).is_err());
    }
}
