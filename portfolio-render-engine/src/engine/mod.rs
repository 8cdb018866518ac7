pub mod errors;

pub mod assets;
pub mod core;
pub mod input;
pub mod loading;
pub mod scroll;
pub mod systems;
pub mod viewport;
