use std::collections::HashMap;
use std::path::Path;
use nalgebra::DVector;
use serde::{Serialize, Deserialize};
use crate::robot_modules::robot_configuration_module::{RobotConfigurationModule, RobotReferenceConfiguration, RootJointType};
use crate::robot_modules::robot_kinematics_module::RobotKinematicsData;
use crate::robot_modules::robot_model_module::RobotModelModule;
use crate::utils::utils_console::{optima_print, PrintColor, PrintMode};
use crate::utils::utils_errors::OptimaError;
use crate::utils::utils_files::{load_object_from_json_string, RobotAssetUtils};

/// Name of the reference configuration used as the robot's default standing posture.
pub const DEFAULT_REFERENCE_CONFIGURATION: &str = "half_sitting";

/// A `Robot` bundles the kinematic model of a robot, its configuration layout, its named
/// reference configurations, and its default configuration `q0`.  The `Robot` is read only
/// during kinematic computations; mutable state lives in a `RobotKinematicsData` spawned from it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Robot {
    robot_configuration_module: RobotConfigurationModule,
    reference_configurations: HashMap<String, RobotReferenceConfiguration>,
    q0: DVector<f64>
}
impl Robot {
    /// Loads one of the robots embedded in the crate (e.g., `biped_legs`) with a free-flyer root.
    pub fn new_from_embedded(robot_name: &str) -> Result<Self, OptimaError> {
        let urdf_string = RobotAssetUtils::urdf_string(robot_name)?;
        let robot_model_module = RobotModelModule::new_from_urdf_string(&urdf_string)?;
        let reference_configurations = match RobotAssetUtils::reference_configurations_string(robot_name) {
            None => { HashMap::new() }
            Some(s) => { load_object_from_json_string(&s)? }
        };
        return Self::new(robot_model_module, RootJointType::FreeFlyer, reference_configurations);
    }
    pub fn new_from_urdf_path<P: AsRef<Path>>(path: P, root_joint_type: RootJointType) -> Result<Self, OptimaError> {
        let robot_model_module = RobotModelModule::new_from_urdf_path(path)?;
        return Self::new(robot_model_module, root_joint_type, HashMap::new());
    }
    pub fn new_from_urdf_string(urdf_string: &str, root_joint_type: RootJointType) -> Result<Self, OptimaError> {
        let robot_model_module = RobotModelModule::new_from_urdf_string(urdf_string)?;
        return Self::new(robot_model_module, root_joint_type, HashMap::new());
    }
    /// `q0` is the `half_sitting` reference configuration when the robot has one, and the
    /// neutral configuration otherwise.
    pub fn new(robot_model_module: RobotModelModule, root_joint_type: RootJointType, reference_configurations: HashMap<String, RobotReferenceConfiguration>) -> Result<Self, OptimaError> {
        let robot_configuration_module = RobotConfigurationModule::new(robot_model_module, root_joint_type);
        let q0 = match reference_configurations.get(DEFAULT_REFERENCE_CONFIGURATION) {
            None => { robot_configuration_module.neutral_configuration() }
            Some(r) => { robot_configuration_module.configuration_from_reference(r)? }
        };

        Ok(Self {
            robot_configuration_module,
            reference_configurations,
            q0
        })
    }
    pub fn robot_configuration_module(&self) -> &RobotConfigurationModule {
        &self.robot_configuration_module
    }
    pub fn robot_model_module(&self) -> &RobotModelModule {
        self.robot_configuration_module.robot_model_module()
    }
    pub fn robot_name(&self) -> &str {
        self.robot_model_module().robot_name()
    }
    pub fn q0(&self) -> &DVector<f64> {
        &self.q0
    }
    pub fn set_q0(&mut self, q0: DVector<f64>) -> Result<(), OptimaError> {
        if q0.len() != self.robot_configuration_module.nq() {
            return Err(OptimaError::new_wrong_vec_length_error("set_q0", q0.len(), self.robot_configuration_module.nq(), file!(), line!()));
        }
        self.q0 = q0;
        Ok(())
    }
    pub fn reference_configuration_names(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self.reference_configurations.keys().map(|k| k.as_str()).collect();
        out.sort();
        out
    }
    pub fn reference_configuration(&self, name: &str) -> Result<DVector<f64>, OptimaError> {
        let reference = self.reference_configurations.get(name).ok_or_else(|| {
            OptimaError::new_generic_error_str(&format!("Robot {} has no reference configuration named {}.  Available: {:?}", self.robot_name(), name, self.reference_configuration_names()), file!(), line!())
        })?;
        return self.robot_configuration_module.configuration_from_reference(reference);
    }
    pub fn spawn_kinematics_data(&self) -> RobotKinematicsData {
        RobotKinematicsData::new(self.robot_model_module())
    }
    pub fn print_summary(&self) {
        self.robot_model_module().print_summary();
        self.robot_configuration_module.print_summary();
        optima_print(&format!("q0: {:?}", self.q0.as_slice()), PrintMode::Println, PrintColor::Cyan, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;
    use crate::robot_modules::robot_kinematics_module::RobotKinematicsModule;

    #[test]
    fn embedded_biped_layout() {
        let robot = Robot::new_from_embedded("biped_legs").unwrap();
        assert_eq!(robot.robot_configuration_module().nq(), 19);
        assert_eq!(robot.robot_configuration_module().nv(), 18);
        assert_eq!(robot.reference_configuration_names(), vec!["half_sitting"]);
    }

    #[test]
    fn half_sitting_puts_soles_on_the_ground() {
        let robot = Robot::new_from_embedded("biped_legs").unwrap();
        let mut data = robot.spawn_kinematics_data();
        RobotKinematicsModule::compute_frame_placements(robot.robot_configuration_module(), &mut data, robot.q0()).unwrap();
        let model = robot.robot_model_module();
        let left = data.frame_placement(model.get_frame_id("left_sole_link").unwrap()).unwrap();
        let right = data.frame_placement(model.get_frame_id("right_sole_link").unwrap()).unwrap();
        assert_relative_eq!(left.translation.vector, Vector3::new(0.0, 0.085, 0.0), epsilon = 1e-5);
        assert_relative_eq!(right.translation.vector, Vector3::new(0.0, -0.085, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn urdf_file_on_disk_matches_embedded_robot() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("robots").join("biped_legs").join("biped_legs.urdf");
        let robot = Robot::new_from_urdf_path(&path, RootJointType::FreeFlyer).unwrap();
        let embedded = Robot::new_from_embedded("biped_legs").unwrap();
        assert_eq!(robot.robot_configuration_module().nq(), embedded.robot_configuration_module().nq());
        assert!(robot.reference_configuration_names().is_empty());
        assert_eq!(robot.q0(), &robot.robot_configuration_module().neutral_configuration());

        let fixed = Robot::new_from_urdf_path(&path, RootJointType::Fixed).unwrap();
        assert_eq!(fixed.robot_configuration_module().nv(), 12);

        assert!(Robot::new_from_urdf_path(path.with_extension("missing"), RootJointType::Fixed).is_err());
    }

    #[test]
    fn set_q0_checks_length() {
        let mut robot = Robot::new_from_embedded("biped_legs").unwrap();
        assert!(robot.set_q0(DVector::zeros(3)).is_err());
        assert!(robot.reference_configuration("crouching").is_err());
    }
}
