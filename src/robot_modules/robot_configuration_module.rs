use std::collections::HashMap;
use std::f64::consts::PI;
use nalgebra::{DVector, Isometry3, Quaternion, Translation3, UnitQuaternion, Vector3};
use rand::Rng;
use serde::{Serialize, Deserialize};
use crate::robot_modules::robot_model_module::RobotModelModule;
use crate::utils::utils_console::{optima_print, optima_print_new_line, PrintColor, PrintMode};
use crate::utils::utils_errors::OptimaError;
use crate::utils::utils_robot::urdf_joint::JointTypeWrapper;
use crate::utils::utils_se3::lie_group::{Motion, SE3LieGroupUtils};

/// The joint that connects the root link of the robot to the world.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum RootJointType {
    /// The root link is welded to the world.
    Fixed,
    /// The root link can move freely in SE(3).  Its configuration is `[x, y, z, qx, qy, qz, qw]`
    /// and its tangent is `[vx, vy, vz, wx, wy, wz]` expressed in the local root frame.
    FreeFlyer
}
impl RootJointType {
    pub fn nq(&self) -> usize {
        match self {
            RootJointType::Fixed => { 0 }
            RootJointType::FreeFlyer => { 7 }
        }
    }
    pub fn nv(&self) -> usize {
        match self {
            RootJointType::Fixed => { 0 }
            RootJointType::FreeFlyer => { 6 }
        }
    }
}

/// A `RobotConfigurationModule` is a description of a robot model one abstraction layer above the
/// `RobotModelModule`.  It fixes how the robot is attached to the world (the root joint) and lays
/// out the robot's configuration vector `q` (length `nq`) and tangent vector `v` (length `nv`).
///
/// Configurations live on a manifold (the free-flyer root carries a unit quaternion), so they are
/// never added or subtracted directly.  `integrate` and `difference` are the only supported ways
/// to move between configurations and tangent vectors.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RobotConfigurationModule {
    robot_model_module: RobotModelModule,
    root_joint_type: RootJointType,
    joint_idx_qs: Vec<Option<usize>>,
    joint_idx_vs: Vec<Option<usize>>,
    actuated_joint_idxs: Vec<usize>,
    nq: usize,
    nv: usize
}
impl RobotConfigurationModule {
    pub fn new(robot_model_module: RobotModelModule, root_joint_type: RootJointType) -> Self {
        let num_joints = robot_model_module.joints().len();
        let mut joint_idx_qs = vec![None; num_joints];
        let mut joint_idx_vs = vec![None; num_joints];
        let mut actuated_joint_idxs = vec![];

        let mut nq = root_joint_type.nq();
        let mut nv = root_joint_type.nv();

        for link_idx in robot_model_module.kinematic_order() {
            let link = &robot_model_module.links()[*link_idx];
            if let Some(joint_idx) = link.preceding_joint_idx() {
                let joint = &robot_model_module.joints()[joint_idx];
                if joint.nq() > 0 {
                    joint_idx_qs[joint_idx] = Some(nq);
                    joint_idx_vs[joint_idx] = Some(nv);
                    actuated_joint_idxs.push(joint_idx);
                    nq += joint.nq();
                    nv += joint.nv();
                }
            }
        }

        Self {
            robot_model_module,
            root_joint_type,
            joint_idx_qs,
            joint_idx_vs,
            actuated_joint_idxs,
            nq,
            nv
        }
    }
    pub fn robot_model_module(&self) -> &RobotModelModule {
        &self.robot_model_module
    }
    pub fn root_joint_type(&self) -> RootJointType {
        self.root_joint_type
    }
    pub fn nq(&self) -> usize {
        self.nq
    }
    pub fn nv(&self) -> usize {
        self.nv
    }
    /// Joint indices of all joints with at least one degree of freedom, in configuration order.
    pub fn actuated_joint_idxs(&self) -> &Vec<usize> {
        &self.actuated_joint_idxs
    }
    pub fn joint_idx_q(&self, joint_idx: usize) -> Option<usize> {
        self.joint_idx_qs.get(joint_idx).copied().flatten()
    }
    pub fn joint_idx_v(&self, joint_idx: usize) -> Option<usize> {
        self.joint_idx_vs.get(joint_idx).copied().flatten()
    }
    /// The configuration with identity root placement and all joints at zero.
    pub fn neutral_configuration(&self) -> DVector<f64> {
        let mut q = DVector::zeros(self.nq);
        if self.root_joint_type == RootJointType::FreeFlyer { q[6] = 1.0; }
        q
    }
    /// Returns `q ⊕ v`: the configuration reached by following tangent `v` for unit time from `q`.
    /// Continuous joint angles are wrapped into `(-pi, pi]`, so `difference(q, integrate(q, v))`
    /// gives back `v` only while those components of `v` stay within `(-pi, pi]`.
    pub fn integrate(&self, q: &DVector<f64>, v: &DVector<f64>) -> Result<DVector<f64>, OptimaError> {
        self.check_q_length("integrate", q)?;
        self.check_v_length("integrate", v)?;

        let mut out = q.clone();

        if self.root_joint_type == RootJointType::FreeFlyer {
            let m0 = Self::free_flyer_placement(q);
            let dm = SE3LieGroupUtils::exp6(&Motion::new(Vector3::new(v[0], v[1], v[2]), Vector3::new(v[3], v[4], v[5])));
            let m1 = m0 * dm;
            Self::write_free_flyer_placement(&m1, &mut out);
        }

        for joint_idx in &self.actuated_joint_idxs {
            let idx_q = self.joint_idx_qs[*joint_idx].unwrap_or(0);
            let idx_v = self.joint_idx_vs[*joint_idx].unwrap_or(0);
            let sum = q[idx_q] + v[idx_v];
            out[idx_q] = match self.robot_model_module.joints()[*joint_idx].joint_type() {
                JointTypeWrapper::Continuous => { Self::wrap_angle(sum) }
                _ => { sum }
            };
        }

        Ok(out)
    }
    /// Returns `q1 ⊖ q0`: the tangent vector `v` such that `integrate(q0, v) == q1`.
    pub fn difference(&self, q0: &DVector<f64>, q1: &DVector<f64>) -> Result<DVector<f64>, OptimaError> {
        self.check_q_length("difference", q0)?;
        self.check_q_length("difference", q1)?;

        let mut out = DVector::zeros(self.nv);

        if self.root_joint_type == RootJointType::FreeFlyer {
            let m0 = Self::free_flyer_placement(q0);
            let m1 = Self::free_flyer_placement(q1);
            let log = SE3LieGroupUtils::log6(&(m0.inverse() * m1));
            out.fixed_rows_mut::<6>(0).copy_from(&log.to_vector());
        }

        for joint_idx in &self.actuated_joint_idxs {
            let idx_q = self.joint_idx_qs[*joint_idx].unwrap_or(0);
            let idx_v = self.joint_idx_vs[*joint_idx].unwrap_or(0);
            let diff = q1[idx_q] - q0[idx_q];
            out[idx_v] = match self.robot_model_module.joints()[*joint_idx].joint_type() {
                JointTypeWrapper::Continuous => { Self::wrap_angle(diff) }
                _ => { diff }
            };
        }

        Ok(out)
    }
    /// Samples a configuration.  The root translation is drawn from `[-1, 1]^3` with a uniformly
    /// random orientation; joints are drawn within their limits (or `[-pi, pi]` when unlimited).
    pub fn random_configuration<R: Rng>(&self, rng: &mut R) -> DVector<f64> {
        let mut q = self.neutral_configuration();

        if self.root_joint_type == RootJointType::FreeFlyer {
            let t = Vector3::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
            let r = UnitQuaternion::from_euler_angles(rng.gen_range(-PI..PI), rng.gen_range(-PI / 2.0..PI / 2.0), rng.gen_range(-PI..PI));
            Self::write_free_flyer_placement(&Isometry3::from_parts(Translation3::from(t), r), &mut q);
        }

        for joint_idx in &self.actuated_joint_idxs {
            let idx_q = self.joint_idx_qs[*joint_idx].unwrap_or(0);
            let (lower, upper) = self.robot_model_module.joints()[*joint_idx].bounds();
            let lower = if lower.is_finite() { lower } else { -PI };
            let upper = if upper.is_finite() { upper } else { PI };
            q[idx_q] = if upper > lower { rng.gen_range(lower..upper) } else { lower };
        }

        q
    }
    /// Builds a full configuration from a named description (root pose plus joint values by
    /// name).  Joints that are not mentioned stay at zero.
    pub fn configuration_from_reference(&self, reference: &RobotReferenceConfiguration) -> Result<DVector<f64>, OptimaError> {
        let mut q = self.neutral_configuration();

        if self.root_joint_type == RootJointType::FreeFlyer {
            let b = &reference.base_xyz;
            let r = &reference.base_quat_xyzw;
            let rotation = UnitQuaternion::from_quaternion(Quaternion::new(r[3], r[0], r[1], r[2]));
            Self::write_free_flyer_placement(&Isometry3::from_parts(Translation3::new(b[0], b[1], b[2]), rotation), &mut q);
        }

        for (joint_name, value) in &reference.joint_values {
            let joint_idx = self.robot_model_module.get_joint_idx_from_name(joint_name).ok_or_else(|| {
                OptimaError::new_generic_error_str(&format!("Reference configuration mentions unknown joint {}.", joint_name), file!(), line!())
            })?;
            let idx_q = self.joint_idx_q(joint_idx).ok_or_else(|| {
                OptimaError::new_generic_error_str(&format!("Reference configuration sets fixed joint {}.", joint_name), file!(), line!())
            })?;
            q[idx_q] = *value;
        }

        Ok(q)
    }
    /// Placement of the root link in the world for configuration `q`.
    pub fn root_placement(&self, q: &DVector<f64>) -> Isometry3<f64> {
        return match self.root_joint_type {
            RootJointType::Fixed => { Isometry3::identity() }
            RootJointType::FreeFlyer => { Self::free_flyer_placement(q) }
        }
    }
    pub fn print_summary(&self) {
        optima_print(&format!("Root joint: {:?}, nq: {}, nv: {}", self.root_joint_type, self.nq, self.nv), PrintMode::Println, PrintColor::Magenta, true);
        for joint_idx in &self.actuated_joint_idxs {
            let joint = &self.robot_model_module.joints()[*joint_idx];
            optima_print(&format!("  q[{}] / v[{}] ", self.joint_idx_qs[*joint_idx].unwrap_or(0), self.joint_idx_vs[*joint_idx].unwrap_or(0)), PrintMode::Print, PrintColor::Cyan, false);
            optima_print(joint.name(), PrintMode::Print, PrintColor::None, false);
            optima_print_new_line();
        }
    }
    fn free_flyer_placement(q: &DVector<f64>) -> Isometry3<f64> {
        let rotation = UnitQuaternion::new_unchecked(Quaternion::new(q[6], q[3], q[4], q[5]));
        return Isometry3::from_parts(Translation3::new(q[0], q[1], q[2]), rotation);
    }
    fn write_free_flyer_placement(m: &Isometry3<f64>, q: &mut DVector<f64>) {
        let xyz_quat = SE3LieGroupUtils::isometry_to_xyz_quat(m);
        for (i, v) in xyz_quat.iter().enumerate() { q[i] = *v; }
    }
    /// Maps `theta` into `(-pi, pi]`.  Angles already in range are returned untouched.
    fn wrap_angle(theta: f64) -> f64 {
        if theta > -PI && theta <= PI { return theta; }
        let wrapped = (theta + PI).rem_euclid(2.0 * PI) - PI;
        if wrapped <= -PI { wrapped + 2.0 * PI } else { wrapped }
    }
    fn check_q_length(&self, function_name: &str, q: &DVector<f64>) -> Result<(), OptimaError> {
        if q.len() != self.nq {
            return Err(OptimaError::new_wrong_vec_length_error(function_name, q.len(), self.nq, file!(), line!()));
        }
        Ok(())
    }
    fn check_v_length(&self, function_name: &str, v: &DVector<f64>) -> Result<(), OptimaError> {
        if v.len() != self.nv {
            return Err(OptimaError::new_wrong_vec_length_error(function_name, v.len(), self.nv, file!(), line!()));
        }
        Ok(())
    }
}

/// A named configuration stored alongside a robot's urdf (e.g., a default standing posture).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RobotReferenceConfiguration {
    #[serde(default)]
    pub base_xyz: [f64; 3],
    #[serde(default = "RobotReferenceConfiguration::default_base_quat_xyzw")]
    pub base_quat_xyzw: [f64; 4],
    #[serde(default)]
    pub joint_values: HashMap<String, f64>
}
impl RobotReferenceConfiguration {
    fn default_base_quat_xyzw() -> [f64; 4] { [0.0, 0.0, 0.0, 1.0] }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const ARM_URDF: &str = r#"<robot name="arm">
        <link name="base"/><link name="l1"/><link name="l2"/><link name="l3"/><link name="tip"/>
        <joint name="j1" type="revolute"><parent link="base"/><child link="l1"/><axis xyz="0 0 1"/><limit lower="-2" upper="2" effort="1" velocity="1"/></joint>
        <joint name="j2" type="continuous"><parent link="l1"/><child link="l2"/><origin xyz="0 0 0.3"/><axis xyz="0 1 0"/></joint>
        <joint name="j3" type="prismatic"><parent link="l2"/><child link="l3"/><axis xyz="1 0 0"/><limit lower="0" upper="0.5" effort="1" velocity="1"/></joint>
        <joint name="jtip" type="fixed"><parent link="l3"/><child link="tip"/><origin xyz="0.1 0 0"/></joint>
    </robot>"#;

    fn module(root: RootJointType) -> RobotConfigurationModule {
        RobotConfigurationModule::new(RobotModelModule::new_from_urdf_string(ARM_URDF).unwrap(), root)
    }

    #[test]
    fn layout_of_free_flyer_robot() {
        let m = module(RootJointType::FreeFlyer);
        assert_eq!(m.nq(), 10);
        assert_eq!(m.nv(), 9);
        let q = m.neutral_configuration();
        assert_eq!(q[6], 1.0);
        assert_eq!(m.joint_idx_q(0), Some(7));
        assert_eq!(m.joint_idx_v(0), Some(6));
        assert_eq!(m.joint_idx_q(3), None);
    }

    #[test]
    fn zero_tangent_integrates_to_same_configuration() {
        let m = module(RootJointType::FreeFlyer);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let q = m.random_configuration(&mut rng);
        let out = m.integrate(&q, &DVector::zeros(m.nv())).unwrap();
        assert_eq!(out, q);
    }

    #[test]
    fn integrate_and_difference_round_trip() {
        let m = module(RootJointType::FreeFlyer);
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..20 {
            let q0 = m.random_configuration(&mut rng);
            let q1 = m.random_configuration(&mut rng);
            let v = m.difference(&q0, &q1).unwrap();
            let q1_back = m.integrate(&q0, &v).unwrap();
            assert_relative_eq!(m.difference(&q1, &q1_back).unwrap().norm(), 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn continuous_joint_difference_is_wrapped() {
        let m = module(RootJointType::Fixed);
        let q0 = DVector::from_vec(vec![0.0, 3.0, 0.0]);
        let q1 = DVector::from_vec(vec![0.0, -3.0, 0.0]);
        let v = m.difference(&q0, &q1).unwrap();
        assert_relative_eq!(v[1], 2.0 * PI - 6.0, epsilon = 1e-12);
    }

    #[test]
    fn continuous_joint_integrate_is_wrapped() {
        let m = module(RootJointType::Fixed);
        let q0 = DVector::from_vec(vec![0.0, 3.0, 0.0]);

        let q1 = m.integrate(&q0, &DVector::from_vec(vec![0.0, 0.5, 0.0])).unwrap();
        assert_relative_eq!(q1[1], 3.5 - 2.0 * PI, epsilon = 1e-12);
        assert_relative_eq!(m.difference(&q0, &q1).unwrap()[1], 0.5, epsilon = 1e-12);

        // beyond half a turn the round trip returns the wrapped tangent.
        let v = DVector::from_vec(vec![0.0, 4.0, 0.0]);
        let q2 = m.integrate(&q0, &v).unwrap();
        assert!(q2[1] > -PI && q2[1] <= PI);
        assert_relative_eq!(m.difference(&q0, &q2).unwrap()[1], 4.0 - 2.0 * PI, epsilon = 1e-12);

        // revolute joints are not wrapped.
        let q3 = m.integrate(&q0, &DVector::from_vec(vec![4.0, 0.0, 0.0])).unwrap();
        assert_eq!(q3[0], 4.0);
    }

    #[test]
    fn wrong_lengths_are_rejected() {
        let m = module(RootJointType::Fixed);
        let res = m.integrate(&DVector::zeros(2), &DVector::zeros(3));
        assert!(matches!(res, Err(OptimaError::WrongVecLengthError(_))));
    }

    #[test]
    fn reference_configuration_by_joint_name() {
        let m = module(RootJointType::FreeFlyer);
        let mut joint_values = HashMap::new();
        joint_values.insert("j3".to_string(), 0.2);
        let reference = RobotReferenceConfiguration { base_xyz: [0.0, 0.0, 1.0], base_quat_xyzw: [0.0, 0.0, 0.0, 1.0], joint_values };
        let q = m.configuration_from_reference(&reference).unwrap();
        assert_eq!(q[2], 1.0);
        assert_eq!(q[9], 0.2);

        let mut bad = reference.clone();
        bad.joint_values.insert("jtip".to_string(), 1.0);
        assert!(m.configuration_from_reference(&bad).is_err());
    }
}
