pub mod robot_model_module;
pub mod robot_configuration_module;
pub mod robot_kinematics_module;
pub mod robot;
