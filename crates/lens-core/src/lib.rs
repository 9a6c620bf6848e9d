pub mod config;
pub mod consts;
pub mod error;
pub mod resource;
pub mod rotate;
pub mod viewer;
pub mod viewport;

pub use resource::ResourceKey;
pub use viewer::{ViewCommand, Viewer};
