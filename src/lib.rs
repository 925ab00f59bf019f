//! Optimization-based foot placement for legged robots.  A robot is loaded from a URDF into a
//! kinematic model with a free-flyer root, and a nonlinear program places its feet at given
//! SE(3) targets while keeping the posture close to a reference configuration.
//!
//! The crate is organized the way the optima toolbox is: robot modules for kinematics, a
//! nonlinear optimization layer with several back ends, and class-function style utils.

pub mod inverse_kinematics;
pub mod nonlinear_optimization;
pub mod robot_modules;
pub mod utils;
pub mod visualization;
