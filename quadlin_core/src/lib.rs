// quadlin_core/src/lib.rs

// Public modules of the library.
pub mod error;
pub mod estimation;
pub mod frames;
pub mod linearization;
pub mod models;
pub mod prelude;
pub mod symbolic;
pub mod types;
