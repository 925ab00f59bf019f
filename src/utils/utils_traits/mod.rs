use serde::de::DeserializeOwned;
use serde::{Serialize};
use crate::utils::utils_errors::OptimaError;
use crate::utils::utils_files::{load_object_from_json_string, load_object_from_ron_string};

pub trait ToAndFromRonString: Serialize + DeserializeOwned {
    fn convert_to_ron_string(&self) -> Result<String, OptimaError> {
        return ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| OptimaError::new_generic_error_str(&format!("Could not convert to ron string: {}", e), file!(), line!()));
    }
    fn load_from_ron_string(ron_string: &str) -> Result<Self, OptimaError> where Self: Sized {
        load_object_from_ron_string(ron_string)
    }
}
impl <T> ToAndFromRonString for T where T: Serialize + DeserializeOwned {  }

pub trait ToAndFromJsonString: Serialize + DeserializeOwned {
    fn convert_to_json_string(&self) -> Result<String, OptimaError> {
        return serde_json::to_string_pretty(self)
            .map_err(|e| OptimaError::new_generic_error_str(&format!("Could not convert to json string: {}", e), file!(), line!()));
    }
    fn load_from_json_string(json_str: &str) -> Result<Self, OptimaError> where Self: Sized {
        load_object_from_json_string(json_str)
    }
}
impl <T> ToAndFromJsonString for T where T: Serialize + DeserializeOwned {  }
