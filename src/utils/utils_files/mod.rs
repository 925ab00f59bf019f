use std::fs::File;
use std::io::Read;
use std::path::Path;
use rust_embed::RustEmbed;
use serde::de::DeserializeOwned;
use crate::utils::utils_console::{optima_print, PrintColor, PrintMode};
use crate::utils::utils_errors::OptimaError;

/// Robot description files bundled into the binary.  Each robot lives in its own directory named
/// after the robot and holds `<robot_name>.urdf` plus an optional
/// `reference_configurations.json`.
#[derive(RustEmbed, Debug)]
#[folder = "robots/"]
#[exclude = "*/.DS_Store"]
struct RobotAssetEmbed;

/// Convenience struct that holds class functions for accessing embedded robot assets.
pub struct RobotAssetUtils;
impl RobotAssetUtils {
    /// Names of all embedded robots.
    pub fn embedded_robot_names() -> Vec<String> {
        let mut out = vec![];
        for f in RobotAssetEmbed::iter() {
            if let Some((dir, _)) = f.split_once('/') {
                if !out.iter().any(|n: &String| n == dir) { out.push(dir.to_string()); }
            }
        }
        out.sort();
        out
    }
    pub fn urdf_string(robot_name: &str) -> Result<String, OptimaError> {
        return Self::embedded_file_to_string(&format!("{}/{}.urdf", robot_name, robot_name));
    }
    /// Returns `None` if the robot has no embedded reference configurations.
    pub fn reference_configurations_string(robot_name: &str) -> Option<String> {
        Self::embedded_file_to_string(&format!("{}/reference_configurations.json", robot_name)).ok()
    }
    fn embedded_file_to_string(path: &str) -> Result<String, OptimaError> {
        let file = RobotAssetEmbed::get(path).ok_or_else(|| {
            OptimaError::new_generic_error_str(&format!("Embedded asset {} does not exist.  Available robots: {:?}", path, Self::embedded_robot_names()), file!(), line!())
        })?;
        return String::from_utf8(file.data.into_owned())
            .map_err(|e| OptimaError::new_generic_error_str(&format!("Embedded asset {} is not valid utf-8: {}", path, e), file!(), line!()));
    }
}

/// Convenience struct that holds class functions related to file utils.
pub struct FileUtils;
impl FileUtils {
    /// Reads contents of file and outputs it to a string.
    pub fn read_file_contents_to_string<P: AsRef<Path>>(p: P) -> Result<String, OptimaError> {
        let mut f = File::open(p.as_ref())
            .map_err(|e| OptimaError::new_generic_error_str(&format!("Could not open {:?}: {}", p.as_ref(), e), file!(), line!()))?;
        let mut contents = String::new();
        f.read_to_string(&mut contents)
            .map_err(|e| OptimaError::new_generic_error_str(&format!("Could not read {:?}: {}", p.as_ref(), e), file!(), line!()))?;
        Ok(contents)
    }
    /// Returns file extension of path as string.
    pub fn get_file_extension_string<P: AsRef<Path>>(p: P) -> Option<String> {
        return match p.as_ref().extension() {
            None => { None }
            Some(o) => { o.to_str().map(|s| s.to_string()) }
        }
    }
    /// Loads an object from a file, picking the deserializer from the extension (`.ron` for RON,
    /// anything else for JSON).
    pub fn load_object_from_file<T: DeserializeOwned, P: AsRef<Path>>(p: P) -> Result<T, OptimaError> {
        let contents = Self::read_file_contents_to_string(p.as_ref())?;
        return match Self::get_file_extension_string(p.as_ref()).as_deref() {
            Some("ron") => { load_object_from_ron_string(&contents) }
            _ => { load_object_from_json_string(&contents) }
        }
    }
}

pub fn load_object_from_json_string<T: DeserializeOwned>(json_str: &str) -> Result<T, OptimaError> {
    let o_res = serde_json::from_str(json_str);
    return match o_res {
        Ok(o) => {
            Ok(o)
        }
        Err(e) => {
            optima_print(json_str, PrintMode::Println, PrintColor::Red, false);
            Err(OptimaError::new_generic_error_str(&format!("load_object_from_json_string() failed.  The given json_string is incompatible with the requested type: {}", e), file!(), line!()))
        }
    }
}

pub fn load_object_from_ron_string<T: DeserializeOwned>(ron_str: &str) -> Result<T, OptimaError> {
    return ron::from_str(ron_str)
        .map_err(|e| OptimaError::new_generic_error_str(&format!("load_object_from_ron_string() failed: {}", e), file!(), line!()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn biped_assets_are_embedded() {
        assert!(RobotAssetUtils::embedded_robot_names().contains(&"biped_legs".to_string()));
        let urdf = RobotAssetUtils::urdf_string("biped_legs").unwrap();
        assert!(urdf.contains("left_sole_link"));
        assert!(RobotAssetUtils::reference_configurations_string("biped_legs").is_some());
    }

    #[test]
    fn missing_robot_is_an_error() {
        assert!(RobotAssetUtils::urdf_string("no_such_robot").is_err());
    }

    #[test]
    fn json_and_ron_strings() {
        let v: Vec<f64> = load_object_from_json_string("[1.0, 2.0]").unwrap();
        assert_eq!(v, vec![1.0, 2.0]);
        let w: Vec<f64> = load_object_from_ron_string("[3.0]").unwrap();
        assert_eq!(w, vec![3.0]);
        assert!(load_object_from_json_string::<Vec<f64>>("{").is_err());
    }
}
