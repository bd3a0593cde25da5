pub mod color;
pub mod surface;
pub mod display_list;
pub mod shape;
pub mod cycle;
pub mod scene;
pub mod clock;
pub mod camera;
pub mod config;
pub mod gpu;

#[cfg(not(target_arch = "wasm32"))]
pub mod cli;
#[cfg(not(target_arch = "wasm32"))]
pub mod window;

#[cfg(target_arch = "wasm32")]
pub mod wasm;
