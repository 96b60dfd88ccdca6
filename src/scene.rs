pub mod light;
pub mod mesh;
pub mod viewer;
