extern crate optima_biped_ik;

use std::env;
use std::process;
use optima_biped_ik::inverse_kinematics::{BipedIKConfig, solve_biped_foot_placement};
use optima_biped_ik::robot_modules::robot::Robot;
use optima_biped_ik::utils::utils_console::{optima_print, OptimaDebug, PrintColor, PrintMode};
use optima_biped_ik::utils::utils_errors::OptimaError;
use optima_biped_ik::utils::utils_files::FileUtils;
use optima_biped_ik::visualization::ConsoleRobotVisualizer;

fn run(args: &[String]) -> Result<bool, OptimaError> {
    // optional config file (.json or .ron); defaults reproduce the standard two-feet problem
    let config: BipedIKConfig = match args.get(1) {
        None => { BipedIKConfig::default() }
        Some(path) => { FileUtils::load_object_from_file(path)? }
    };

    let robot = Robot::new_from_embedded(&config.robot_name)?;
    robot.print_summary();

    let visualizer = ConsoleRobotVisualizer::new(robot.robot_name());
    let solution = solve_biped_foot_placement(&robot, &config, Some(Box::new(visualizer)), OptimaDebug::True)?;
    solution.print_summary();

    Ok(solution.result.is_success())
}

fn main() {
    let args: Vec<String> = env::args().collect();
    match run(&args) {
        Ok(true) => {}
        Ok(false) => { process::exit(1); }
        Err(e) => {
            optima_print(&format!("{}", e), PrintMode::Println, PrintColor::Red, true);
            process::exit(2);
        }
    }
}
