use nalgebra::DVector;
use crate::utils::utils_console::{optima_print, PrintColor, PrintMode};
use crate::utils::utils_errors::OptimaError;

/// A rendering sink for robot configurations and simple marker geometry.  Rendering is a side
/// channel: nothing a visualizer does feeds back into kinematics or optimization.
pub trait RobotVisualizer {
    /// Adds a box named `name` with side lengths `dims` and RGBA `color` (each channel in [0, 1]).
    fn add_box(&mut self, name: &str, dims: [f64; 3], color: [f64; 4]) -> Result<(), OptimaError>;
    /// Places a named object at `[x, y, z, qx, qy, qz, qw]`.
    fn apply_configuration(&mut self, name: &str, xyz_quat: [f64; 7]) -> Result<(), OptimaError>;
    fn refresh(&mut self) -> Result<(), OptimaError>;
    /// Shows the robot at configuration `q`.
    fn display(&mut self, q: &DVector<f64>) -> Result<(), OptimaError>;
}

/// Prints every visualization request to the console.
pub struct ConsoleRobotVisualizer {
    robot_name: String,
    objects: Vec<String>,
    num_displays: usize
}
impl ConsoleRobotVisualizer {
    pub fn new(robot_name: &str) -> Self {
        Self {
            robot_name: robot_name.to_string(),
            objects: vec![],
            num_displays: 0
        }
    }
    pub fn objects(&self) -> &Vec<String> {
        &self.objects
    }
    pub fn num_displays(&self) -> usize {
        self.num_displays
    }
}
impl RobotVisualizer for ConsoleRobotVisualizer {
    fn add_box(&mut self, name: &str, dims: [f64; 3], color: [f64; 4]) -> Result<(), OptimaError> {
        if self.objects.iter().any(|o| o == name) {
            return Err(OptimaError::new_generic_error_str(&format!("Visualizer object {} already exists.", name), file!(), line!()));
        }
        self.objects.push(name.to_string());
        optima_print(&format!("[viewer] add box {} ", name), PrintMode::Print, PrintColor::Cyan, true);
        optima_print(&format!("dims {:?} color {:?}", dims, color), PrintMode::Println, PrintColor::None, false);
        Ok(())
    }
    fn apply_configuration(&mut self, name: &str, xyz_quat: [f64; 7]) -> Result<(), OptimaError> {
        if !self.objects.iter().any(|o| o == name) {
            return Err(OptimaError::new_generic_error_str(&format!("Visualizer object {} does not exist.", name), file!(), line!()));
        }
        optima_print(&format!("[viewer] place {} ", name), PrintMode::Print, PrintColor::Cyan, true);
        optima_print(&format!("at {:?}", xyz_quat), PrintMode::Println, PrintColor::None, false);
        Ok(())
    }
    fn refresh(&mut self) -> Result<(), OptimaError> {
        optima_print("[viewer] refresh", PrintMode::Println, PrintColor::Cyan, true);
        Ok(())
    }
    fn display(&mut self, q: &DVector<f64>) -> Result<(), OptimaError> {
        self.num_displays += 1;
        optima_print(&format!("[viewer] {} #{} ", self.robot_name, self.num_displays), PrintMode::Print, PrintColor::Blue, true);
        let s: Vec<String> = q.iter().map(|v| format!("{:.4}", v)).collect();
        optima_print(&format!("q = [{}]", s.join(", ")), PrintMode::Println, PrintColor::None, false);
        Ok(())
    }
}

/// Accepts and drops every request.
#[derive(Clone, Debug, Default)]
pub struct NullRobotVisualizer;
impl RobotVisualizer for NullRobotVisualizer {
    fn add_box(&mut self, _name: &str, _dims: [f64; 3], _color: [f64; 4]) -> Result<(), OptimaError> { Ok(()) }
    fn apply_configuration(&mut self, _name: &str, _xyz_quat: [f64; 7]) -> Result<(), OptimaError> { Ok(()) }
    fn refresh(&mut self) -> Result<(), OptimaError> { Ok(()) }
    fn display(&mut self, _q: &DVector<f64>) -> Result<(), OptimaError> { Ok(()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn console_visualizer_tracks_objects() {
        let mut v = ConsoleRobotVisualizer::new("biped_legs");
        v.add_box("world/targetR", [0.1, 0.03, 0.03], [1.0, 0.0, 0.0, 1.0]).unwrap();
        assert!(v.add_box("world/targetR", [0.1, 0.03, 0.03], [1.0, 0.0, 0.0, 1.0]).is_err());
        assert!(v.apply_configuration("world/targetL", [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0]).is_err());
        v.display(&DVector::zeros(3)).unwrap();
        assert_eq!(v.num_displays(), 1);
        assert_eq!(v.objects().len(), 1);
    }
}
