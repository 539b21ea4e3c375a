pub mod context;
pub mod executor;
pub mod index;
pub mod ladder;
pub mod model;
