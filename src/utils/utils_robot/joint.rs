use nalgebra::{Isometry3, Translation3, Unit, UnitQuaternion, Vector3};
use serde::{Serialize, Deserialize};
use crate::utils::utils_console::{optima_print, PrintColor, PrintMode};
use crate::utils::utils_errors::OptimaError;
use crate::utils::utils_robot::urdf_joint::{JointTypeWrapper, URDFJoint};
use crate::utils::utils_se3::lie_group::SE3LieGroupUtils;

/// A Joint holds all necessary information about a robot joint (specified by a robot URDF file)
/// in order to do kinematic computations on a robot model.  Supported joints have either zero
/// (fixed) or one (revolute, continuous, prismatic) degree of freedom.  The free-flyer root of a
/// legged robot is not a URDF joint; it is handled by the `RobotConfigurationModule`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Joint {
    name: String,
    joint_idx: usize,
    preceding_link_idx: Option<usize>,
    child_link_idx: Option<usize>,
    origin_offset_pose: Isometry3<f64>,
    has_origin_offset: bool,
    axis: Unit<Vector3<f64>>,
    bounds: (f64, f64),
    urdf_joint: URDFJoint
}
impl Joint {
    /// Returns a joint corresponding to the given URDFJoint.  This will be automatically called
    /// by the RobotModelModule.
    pub fn new(urdf_joint: URDFJoint, joint_idx: usize) -> Result<Self, OptimaError> {
        match urdf_joint.joint_type() {
            JointTypeWrapper::Floating | JointTypeWrapper::Planar | JointTypeWrapper::Spherical => {
                return Err(OptimaError::new_unsupported_operation_error("Joint::new", &format!("Joint {} has type {:?}, which is not supported.  Use a free-flyer root instead of a floating urdf joint.", urdf_joint.name(), urdf_joint.joint_type()), file!(), line!()));
            }
            _ => {}
        }

        let rpy = urdf_joint.origin_rpy();
        let xyz = urdf_joint.origin_xyz();

        let axis = if urdf_joint.axis().norm() == 0.0 { Vector3::new(1., 0., 0.) } else { urdf_joint.axis() };
        let bounds = if urdf_joint.includes_limits() { (urdf_joint.limits_lower(), urdf_joint.limits_upper()) } else { (-f64::INFINITY, f64::INFINITY) };

        Ok(Self {
            name: urdf_joint.name().to_string(),
            joint_idx,
            preceding_link_idx: None,
            child_link_idx: None,
            origin_offset_pose: SE3LieGroupUtils::isometry_from_xyz_rpy(&[xyz[0], xyz[1], xyz[2]], &[rpy[0], rpy[1], rpy[2]]),
            has_origin_offset: rpy.norm() != 0.0 || xyz.norm() != 0.0,
            axis: Unit::new_normalize(axis),
            bounds,
            urdf_joint
        })
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn joint_idx(&self) -> usize {
        self.joint_idx
    }
    pub fn preceding_link_idx(&self) -> Option<usize> {
        self.preceding_link_idx
    }
    pub fn child_link_idx(&self) -> Option<usize> {
        self.child_link_idx
    }
    pub fn has_origin_offset(&self) -> bool {
        self.has_origin_offset
    }
    pub fn origin_offset_pose(&self) -> &Isometry3<f64> {
        &self.origin_offset_pose
    }
    pub fn joint_type(&self) -> &JointTypeWrapper {
        self.urdf_joint.joint_type()
    }
    pub fn axis(&self) -> &Unit<Vector3<f64>> {
        &self.axis
    }
    pub fn bounds(&self) -> (f64, f64) {
        self.bounds
    }
    pub fn urdf_joint(&self) -> &URDFJoint {
        &self.urdf_joint
    }
    /// Number of configuration coordinates of the joint.
    pub fn nq(&self) -> usize {
        match self.joint_type() {
            JointTypeWrapper::Fixed => { 0 }
            _ => { 1 }
        }
    }
    /// Number of tangent (velocity) coordinates of the joint.
    pub fn nv(&self) -> usize {
        self.nq()
    }
    /// The transform contributed by the joint's motion for the given joint value, expressed in
    /// the joint frame (i.e., after the origin offset).
    pub fn motion_pose(&self, value: f64) -> Isometry3<f64> {
        match self.joint_type() {
            JointTypeWrapper::Revolute | JointTypeWrapper::Continuous => {
                Isometry3::from_parts(Translation3::identity(), UnitQuaternion::from_axis_angle(&self.axis, value))
            }
            JointTypeWrapper::Prismatic => {
                let t = self.axis.into_inner() * value;
                Isometry3::from_parts(Translation3::from(t), UnitQuaternion::identity())
            }
            _ => { Isometry3::identity() }
        }
    }
    pub fn set_preceding_link_idx(&mut self, preceding_link_idx: Option<usize>) {
        self.preceding_link_idx = preceding_link_idx;
    }
    pub fn set_child_link_idx(&mut self, child_link_idx: Option<usize>) {
        self.child_link_idx = child_link_idx;
    }
    pub fn print_summary(&self) {
        optima_print(&format!(">> Joint index: "), PrintMode::Print, PrintColor::Blue, true);
        optima_print(&format!(" {} ", self.joint_idx), PrintMode::Print, PrintColor::None, false);
        optima_print(&format!("  Joint name: "), PrintMode::Print, PrintColor::Blue, true);
        optima_print(&format!(" {} ", self.name), PrintMode::Print, PrintColor::None, false);
        optima_print(&format!("  Type: "), PrintMode::Print, PrintColor::Blue, true);
        optima_print(&format!(" {:?} ", self.joint_type()), PrintMode::Print, PrintColor::None, false);
        if self.nq() > 0 {
            optima_print(&format!("  Axis: "), PrintMode::Print, PrintColor::Cyan, false);
            optima_print(&format!(" {:?} ", self.axis.as_ref().as_slice()), PrintMode::Print, PrintColor::None, false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn urdf_joint(xml_type: &str) -> URDFJoint {
        let xml = format!(r#"<robot name="r">
            <link name="a"/><link name="b"/>
            <joint name="j" type="{}">
                <parent link="a"/><child link="b"/>
                <origin xyz="0 0 -0.5" rpy="0 0 0"/>
                <axis xyz="0 1 0"/>
                <limit lower="-1.0" upper="1.0" effort="10" velocity="1"/>
            </joint>
        </robot>"#, xml_type);
        let robot = urdf_rs::read_from_string(&xml).expect("parse");
        URDFJoint::new_from_urdf_joint(&robot.joints[0])
    }

    #[test]
    fn revolute_motion_rotates_about_axis() {
        let j = Joint::new(urdf_joint("revolute"), 0).unwrap();
        assert_eq!(j.nq(), 1);
        assert_eq!(j.bounds(), (-1.0, 1.0));
        let p = j.motion_pose(std::f64::consts::FRAC_PI_2) * nalgebra::Point3::new(1.0, 0.0, 0.0);
        assert_relative_eq!(p.coords, Vector3::new(0.0, 0.0, -1.0), epsilon = 1e-12);
    }

    #[test]
    fn prismatic_motion_translates_along_axis() {
        let j = Joint::new(urdf_joint("prismatic"), 0).unwrap();
        let m = j.motion_pose(0.25);
        assert_relative_eq!(m.translation.vector, Vector3::new(0.0, 0.25, 0.0), epsilon = 1e-15);
    }

    #[test]
    fn floating_urdf_joint_is_rejected() {
        let res = Joint::new(urdf_joint("floating"), 0);
        assert!(matches!(res, Err(OptimaError::UnsupportedOperationError(_))));
    }
}
