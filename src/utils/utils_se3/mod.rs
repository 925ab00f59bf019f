pub mod lie_group;
