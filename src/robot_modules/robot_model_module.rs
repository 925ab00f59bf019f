use std::collections::HashMap;
use std::path::Path;
use serde::{Serialize, Deserialize};
use crate::utils::utils_console::{optima_print, optima_print_new_line, PrintColor, PrintMode};
use crate::utils::utils_errors::OptimaError;
use crate::utils::utils_robot::joint::Joint;
use crate::utils::utils_robot::link::Link;
use crate::utils::utils_robot::urdf_joint::URDFJoint;

/// The RobotModelModule holds the kinematic tree of a robot as described by its URDF: its links
/// (which double as the robot's frames), its joints, and the order in which the tree must be
/// traversed for forward kinematics.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RobotModelModule {
    robot_name: String,
    links: Vec<Link>,
    joints: Vec<Joint>,
    root_link_idx: usize,
    kinematic_order: Vec<usize>,
    link_name_to_idx_hashmap: HashMap<String, usize>,
    joint_name_to_idx_hashmap: HashMap<String, usize>
}
impl RobotModelModule {
    pub fn new_from_urdf_string(urdf_string: &str) -> Result<Self, OptimaError> {
        let urdf_robot = urdf_rs::read_from_string(urdf_string)
            .map_err(|e| OptimaError::new_urdf_parse_error(&e.to_string(), file!(), line!()))?;
        return Self::new_from_urdf_robot(&urdf_robot);
    }
    pub fn new_from_urdf_path<P: AsRef<Path>>(path: P) -> Result<Self, OptimaError> {
        let urdf_robot = urdf_rs::read_file(path.as_ref())
            .map_err(|e| OptimaError::new_urdf_parse_error(&format!("{:?}: {}", path.as_ref(), e), file!(), line!()))?;
        return Self::new_from_urdf_robot(&urdf_robot);
    }
    fn new_from_urdf_robot(urdf_robot: &urdf_rs::Robot) -> Result<Self, OptimaError> {
        let mut joints = vec![];
        let mut links = vec![];

        let mut link_name_to_idx_hashmap = HashMap::new();
        let mut joint_name_to_idx_hashmap = HashMap::new();

        for (i, j) in urdf_robot.joints.iter().enumerate() {
            joint_name_to_idx_hashmap.insert(j.name.clone(), i);
            joints.push(Joint::new(URDFJoint::new_from_urdf_joint(j), i)?);
        }
        for (i, l) in urdf_robot.links.iter().enumerate() {
            link_name_to_idx_hashmap.insert(l.name.clone(), i);
            links.push(Link::new(&l.name, i));
        }

        let mut out_self = Self {
            robot_name: urdf_robot.name.clone(),
            links,
            joints,
            root_link_idx: 0,
            kinematic_order: vec![],
            link_name_to_idx_hashmap,
            joint_name_to_idx_hashmap
        };

        out_self.assign_all_connections()?;
        out_self.set_root_link_idx()?;
        out_self.set_kinematic_order();

        Ok(out_self)
    }
    fn assign_all_connections(&mut self) -> Result<(), OptimaError> {
        for joint_idx in 0..self.joints.len() {
            let parent_name = self.joints[joint_idx].urdf_joint().parent_link().to_string();
            let child_name = self.joints[joint_idx].urdf_joint().child_link().to_string();

            let parent_idx = self.get_link_idx_from_name(&parent_name).ok_or_else(|| {
                OptimaError::new_generic_error_str(&format!("Joint {} refers to unknown parent link {}.", self.joints[joint_idx].name(), parent_name), file!(), line!())
            })?;
            let child_idx = self.get_link_idx_from_name(&child_name).ok_or_else(|| {
                OptimaError::new_generic_error_str(&format!("Joint {} refers to unknown child link {}.", self.joints[joint_idx].name(), child_name), file!(), line!())
            })?;

            if self.links[child_idx].preceding_joint_idx().is_some() {
                return Err(OptimaError::new_generic_error_str(&format!("Link {} has more than one parent joint.", child_name), file!(), line!()));
            }

            self.joints[joint_idx].set_preceding_link_idx(Some(parent_idx));
            self.joints[joint_idx].set_child_link_idx(Some(child_idx));

            self.links[child_idx].set_preceding_link_idx(Some(parent_idx));
            self.links[child_idx].set_preceding_joint_idx(Some(joint_idx));
            self.links[parent_idx].add_child_link_idx(child_idx);
            self.links[parent_idx].add_child_joint_idx(joint_idx);
        }

        Ok(())
    }
    fn set_root_link_idx(&mut self) -> Result<(), OptimaError> {
        let roots: Vec<usize> = self.links.iter().filter(|l| l.preceding_link_idx().is_none()).map(|l| l.link_idx()).collect();
        if roots.len() != 1 {
            return Err(OptimaError::new_generic_error_str(&format!("Robot {} must have exactly one root link, found {}.", self.robot_name, roots.len()), file!(), line!()));
        }
        self.root_link_idx = roots[0];
        Ok(())
    }
    /// Depth-first order over links starting at the root, children visited in urdf order.  A
    /// link always comes after its parent.
    fn set_kinematic_order(&mut self) {
        self.kinematic_order = vec![];
        let mut stack = vec![self.root_link_idx];
        while let Some(link_idx) = stack.pop() {
            self.kinematic_order.push(link_idx);
            for child in self.links[link_idx].children_link_idxs().iter().rev() {
                stack.push(*child);
            }
        }
    }
    pub fn robot_name(&self) -> &str {
        &self.robot_name
    }
    pub fn links(&self) -> &Vec<Link> {
        &self.links
    }
    pub fn joints(&self) -> &Vec<Joint> {
        &self.joints
    }
    pub fn root_link_idx(&self) -> usize {
        self.root_link_idx
    }
    pub fn kinematic_order(&self) -> &Vec<usize> {
        &self.kinematic_order
    }
    pub fn num_frames(&self) -> usize {
        self.links.len()
    }
    pub fn get_link_by_idx(&self, idx: usize) -> Result<&Link, OptimaError> {
        return self.links.get(idx).ok_or_else(|| OptimaError::new_idx_out_of_bound_error(idx, self.links.len(), file!(), line!()));
    }
    pub fn get_joint_by_idx(&self, idx: usize) -> Result<&Joint, OptimaError> {
        return self.joints.get(idx).ok_or_else(|| OptimaError::new_idx_out_of_bound_error(idx, self.joints.len(), file!(), line!()));
    }
    /// Returns the id of the frame with the given name.  Frames are the robot's links.
    pub fn get_frame_id(&self, frame_name: &str) -> Result<usize, OptimaError> {
        return match self.link_name_to_idx_hashmap.get(frame_name) {
            None => { Err(OptimaError::new_frame_not_found_error(frame_name, &self.robot_name, file!(), line!())) }
            Some(idx) => { Ok(*idx) }
        }
    }
    pub fn get_frame_name(&self, frame_id: usize) -> Result<&str, OptimaError> {
        return Ok(self.get_link_by_idx(frame_id)?.name());
    }
    pub fn get_joint_idx_from_name(&self, joint_name: &str) -> Option<usize> {
        return self.joint_name_to_idx_hashmap.get(joint_name).copied();
    }
    fn get_link_idx_from_name(&self, link_name: &str) -> Option<usize> {
        return self.link_name_to_idx_hashmap.get(link_name).copied();
    }
    pub fn print_summary(&self) {
        optima_print(&format!("Robot {}: {} links, {} joints.", self.robot_name, self.links.len(), self.joints.len()), PrintMode::Println, PrintColor::Magenta, true);
        for link_idx in &self.kinematic_order {
            let link = &self.links[*link_idx];
            optima_print(&format!(">> Frame {} ", link.link_idx()), PrintMode::Print, PrintColor::Blue, true);
            optima_print(&format!("{}", link.name()), PrintMode::Print, PrintColor::None, false);
            if let Some(joint_idx) = link.preceding_joint_idx() {
                optima_print(" <-- ", PrintMode::Print, PrintColor::None, false);
                self.joints[joint_idx].print_summary();
            }
            optima_print_new_line();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_BRANCH_URDF: &str = r#"<robot name="tree">
        <link name="base"/><link name="a1"/><link name="a2"/><link name="b1"/>
        <joint name="ja1" type="revolute"><parent link="base"/><child link="a1"/><axis xyz="0 0 1"/></joint>
        <joint name="jb1" type="revolute"><parent link="base"/><child link="b1"/><axis xyz="0 0 1"/></joint>
        <joint name="ja2" type="fixed"><parent link="a1"/><child link="a2"/></joint>
    </robot>"#;

    #[test]
    fn kinematic_order_is_depth_first() {
        let m = RobotModelModule::new_from_urdf_string(TWO_BRANCH_URDF).unwrap();
        let names: Vec<&str> = m.kinematic_order().iter().map(|i| m.links()[*i].name()).collect();
        assert_eq!(names, vec!["base", "a1", "a2", "b1"]);
        assert_eq!(m.links()[m.root_link_idx()].name(), "base");
    }

    #[test]
    fn frame_lookup() {
        let m = RobotModelModule::new_from_urdf_string(TWO_BRANCH_URDF).unwrap();
        let id = m.get_frame_id("a2").unwrap();
        assert_eq!(m.get_frame_name(id).unwrap(), "a2");
        assert!(matches!(m.get_frame_id("missing_link"), Err(OptimaError::FrameNotFoundError(_))));
    }

    #[test]
    fn unknown_link_in_joint_is_an_error() {
        let bad = r#"<robot name="bad"><link name="base"/>
            <joint name="j" type="fixed"><parent link="base"/><child link="nowhere"/></joint></robot>"#;
        assert!(RobotModelModule::new_from_urdf_string(bad).is_err());
    }
}
