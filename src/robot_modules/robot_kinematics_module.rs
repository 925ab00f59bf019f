use nalgebra::{DVector, Isometry3};
use serde::{Serialize, Deserialize};
use crate::robot_modules::robot_configuration_module::RobotConfigurationModule;
use crate::robot_modules::robot_model_module::RobotModelModule;
use crate::utils::utils_console::{optima_print, PrintColor, PrintMode};
use crate::utils::utils_errors::OptimaError;
use crate::utils::utils_se3::lie_group::SE3LieGroupUtils;

/// Scratch buffer for kinematic computations on one configuration.  It holds the world placement
/// of every joint (`oMi`, indexed by joint index) and of every frame (`oMf`, indexed by frame id,
/// i.e., link index).  A `RobotKinematicsData` is meant to be spawned once and overwritten by
/// every call to `RobotKinematicsModule::forward_kinematics`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RobotKinematicsData {
    root_placement: Isometry3<f64>,
    joint_placements: Vec<Isometry3<f64>>,
    frame_placements: Vec<Isometry3<f64>>
}
impl RobotKinematicsData {
    pub fn new(robot_model_module: &RobotModelModule) -> Self {
        Self {
            root_placement: Isometry3::identity(),
            joint_placements: vec![Isometry3::identity(); robot_model_module.joints().len()],
            frame_placements: vec![Isometry3::identity(); robot_model_module.num_frames()]
        }
    }
    pub fn root_placement(&self) -> &Isometry3<f64> {
        &self.root_placement
    }
    pub fn joint_placement(&self, joint_idx: usize) -> Result<&Isometry3<f64>, OptimaError> {
        return self.joint_placements.get(joint_idx).ok_or_else(|| OptimaError::new_idx_out_of_bound_error(joint_idx, self.joint_placements.len(), file!(), line!()));
    }
    /// World placement of the given frame as of the last `update_frame_placements`.
    pub fn frame_placement(&self, frame_id: usize) -> Result<&Isometry3<f64>, OptimaError> {
        return self.frame_placements.get(frame_id).ok_or_else(|| OptimaError::new_idx_out_of_bound_error(frame_id, self.frame_placements.len(), file!(), line!()));
    }
    pub fn frame_placements(&self) -> &Vec<Isometry3<f64>> {
        &self.frame_placements
    }
    pub fn print_summary(&self, robot_model_module: &RobotModelModule) {
        for (frame_id, placement) in self.frame_placements.iter().enumerate() {
            let name = robot_model_module.get_frame_name(frame_id).unwrap_or("?");
            let xyz_quat = SE3LieGroupUtils::isometry_to_xyz_quat(placement);
            optima_print(&format!("Frame {} {} ---> ", frame_id, name), PrintMode::Print, PrintColor::Blue, true);
            optima_print(&format!("{:?}", xyz_quat), PrintMode::Println, PrintColor::None, false);
        }
    }
}

/// The `RobotKinematicsModule` performs forward kinematics: it takes a robot configuration and
/// writes the SE(3) placements of all joints and frames into a `RobotKinematicsData`.
pub struct RobotKinematicsModule;
impl RobotKinematicsModule {
    /// Recomputes every joint placement (`oMi`) for configuration `q`.  Frame placements are left
    /// untouched until `update_frame_placements` is called.
    pub fn forward_kinematics(robot_configuration_module: &RobotConfigurationModule, data: &mut RobotKinematicsData, q: &DVector<f64>) -> Result<(), OptimaError> {
        if q.len() != robot_configuration_module.nq() {
            return Err(OptimaError::new_wrong_vec_length_error("forward_kinematics", q.len(), robot_configuration_module.nq(), file!(), line!()));
        }
        let model = robot_configuration_module.robot_model_module();
        if data.joint_placements.len() != model.joints().len() || data.frame_placements.len() != model.num_frames() {
            return Err(OptimaError::new_generic_error_str("RobotKinematicsData was spawned from a different robot model.", file!(), line!()));
        }

        data.root_placement = robot_configuration_module.root_placement(q);

        for link_idx in model.kinematic_order() {
            let link = &model.links()[*link_idx];
            let joint_idx = match link.preceding_joint_idx() {
                None => { continue; }
                Some(joint_idx) => { joint_idx }
            };
            let joint = &model.joints()[joint_idx];

            let parent_placement = match link.preceding_link_idx().and_then(|p| model.links()[p].preceding_joint_idx()) {
                None => { data.root_placement }
                Some(parent_joint_idx) => { data.joint_placements[parent_joint_idx] }
            };

            let mut placement = parent_placement;
            if joint.has_origin_offset() { placement = placement * joint.origin_offset_pose(); }
            if let Some(idx_q) = robot_configuration_module.joint_idx_q(joint_idx) {
                placement = placement * joint.motion_pose(q[idx_q]);
            }

            data.joint_placements[joint_idx] = placement;
        }

        Ok(())
    }
    /// Copies joint placements into frame placements: each frame sits at the placement of the
    /// joint that precedes it, and the root frame at the root placement.
    pub fn update_frame_placements(robot_model_module: &RobotModelModule, data: &mut RobotKinematicsData) {
        for link in robot_model_module.links() {
            data.frame_placements[link.link_idx()] = match link.preceding_joint_idx() {
                None => { data.root_placement }
                Some(joint_idx) => { data.joint_placements[joint_idx] }
            };
        }
    }
    /// `forward_kinematics` followed by `update_frame_placements`.
    pub fn compute_frame_placements(robot_configuration_module: &RobotConfigurationModule, data: &mut RobotKinematicsData, q: &DVector<f64>) -> Result<(), OptimaError> {
        Self::forward_kinematics(robot_configuration_module, data, q)?;
        Self::update_frame_placements(robot_configuration_module.robot_model_module(), data);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;
    use crate::robot_modules::robot_configuration_module::RootJointType;

    const PLANAR_ARM_URDF: &str = r#"<robot name="planar">
        <link name="base"/><link name="l1"/><link name="l2"/><link name="tip"/>
        <joint name="j1" type="revolute"><parent link="base"/><child link="l1"/><axis xyz="0 0 1"/><limit lower="-3" upper="3" effort="1" velocity="1"/></joint>
        <joint name="j2" type="revolute"><parent link="l1"/><child link="l2"/><origin xyz="1 0 0"/><axis xyz="0 0 1"/><limit lower="-3" upper="3" effort="1" velocity="1"/></joint>
        <joint name="jtip" type="fixed"><parent link="l2"/><child link="tip"/><origin xyz="1 0 0"/></joint>
    </robot>"#;

    #[test]
    fn planar_arm_tip_placement() {
        let model = RobotModelModule::new_from_urdf_string(PLANAR_ARM_URDF).unwrap();
        let conf = RobotConfigurationModule::new(model.clone(), RootJointType::Fixed);
        let mut data = RobotKinematicsData::new(&model);
        let q = DVector::from_vec(vec![std::f64::consts::FRAC_PI_2, -std::f64::consts::FRAC_PI_2]);
        RobotKinematicsModule::compute_frame_placements(&conf, &mut data, &q).unwrap();
        let tip = data.frame_placement(model.get_frame_id("tip").unwrap()).unwrap();
        assert_relative_eq!(tip.translation.vector, Vector3::new(1.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn free_flyer_moves_every_frame() {
        let model = RobotModelModule::new_from_urdf_string(PLANAR_ARM_URDF).unwrap();
        let conf = RobotConfigurationModule::new(model.clone(), RootJointType::FreeFlyer);
        let mut data = RobotKinematicsData::new(&model);
        let mut q = conf.neutral_configuration();
        q[2] = 0.5;
        RobotKinematicsModule::compute_frame_placements(&conf, &mut data, &q).unwrap();
        let base = data.frame_placement(model.get_frame_id("base").unwrap()).unwrap();
        let tip = data.frame_placement(model.get_frame_id("tip").unwrap()).unwrap();
        assert_relative_eq!(base.translation.vector, Vector3::new(0.0, 0.0, 0.5), epsilon = 1e-12);
        assert_relative_eq!(tip.translation.vector, Vector3::new(2.0, 0.0, 0.5), epsilon = 1e-12);
    }

    #[test]
    fn frame_placements_wait_for_update() {
        let model = RobotModelModule::new_from_urdf_string(PLANAR_ARM_URDF).unwrap();
        let conf = RobotConfigurationModule::new(model.clone(), RootJointType::Fixed);
        let mut data = RobotKinematicsData::new(&model);
        RobotKinematicsModule::forward_kinematics(&conf, &mut data, &DVector::zeros(2)).unwrap();
        let tip_id = model.get_frame_id("tip").unwrap();
        assert_eq!(*data.frame_placement(tip_id).unwrap(), Isometry3::identity());
        RobotKinematicsModule::update_frame_placements(&model, &mut data);
        assert_relative_eq!(data.frame_placement(tip_id).unwrap().translation.vector, Vector3::new(2.0, 0.0, 0.0), epsilon = 1e-12);
        assert!(data.frame_placement(99).is_err());
    }
}
