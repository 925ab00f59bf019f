pub mod joint;
pub mod link;
pub mod urdf_joint;
