use std::fmt;

/// A common error type returned by functions throughout the crate.
#[derive(Clone, Debug, PartialEq)]
pub enum OptimaError {
    GenericError(String),
    IdxOutOfBoundError(String),
    UnsupportedOperationError(String),
    FrameNotFoundError(String),
    WrongVecLengthError(String),
    UrdfParseError(String)
}
impl OptimaError {
    pub fn new_generic_error_str(s: &str, file: &str, line: u32) -> Self {
        let s = format!("ERROR: {} -- File: {}, Line: {}", s, file, line);
        return Self::GenericError(s);
    }
    pub fn new_idx_out_of_bound_error(given_idx: usize, length_of_array: usize, file: &str, line: u32) -> Self {
        let s = format!("ERROR: Index {:?} is too large for the array of length {:?} -- File: {}, Line: {}", given_idx, length_of_array, file, line);
        return Self::IdxOutOfBoundError(s)
    }
    pub fn new_unsupported_operation_error(function_name: &str, message: &str, file: &str, line: u32) -> Self {
        let s = format!("ERROR: Unsupported operation error in function {}.  {} -- File: {}, Line: {}", function_name, message, file, line);
        return Self::UnsupportedOperationError(s);
    }
    pub fn new_frame_not_found_error(frame_name: &str, robot_name: &str, file: &str, line: u32) -> Self {
        let s = format!("ERROR: Frame {:?} does not exist in robot {:?} -- File: {}, Line: {}", frame_name, robot_name, file, line);
        return Self::FrameNotFoundError(s);
    }
    pub fn new_wrong_vec_length_error(function_name: &str, given_length: usize, correct_length: usize, file: &str, line: u32) -> Self {
        let s = format!("ERROR: Vector given to function {} has length {} but should have length {} -- File: {}, Line: {}", function_name, given_length, correct_length, file, line);
        return Self::WrongVecLengthError(s);
    }
    pub fn new_urdf_parse_error(message: &str, file: &str, line: u32) -> Self {
        let s = format!("ERROR: Could not parse urdf.  {} -- File: {}, Line: {}", message, file, line);
        return Self::UrdfParseError(s);
    }
    pub fn message(&self) -> &str {
        match self {
            OptimaError::GenericError(s) => { s }
            OptimaError::IdxOutOfBoundError(s) => { s }
            OptimaError::UnsupportedOperationError(s) => { s }
            OptimaError::FrameNotFoundError(s) => { s }
            OptimaError::WrongVecLengthError(s) => { s }
            OptimaError::UrdfParseError(s) => { s }
        }
    }
}
impl fmt::Display for OptimaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
impl std::error::Error for OptimaError { }
