pub mod classifier;
pub mod locator;
pub mod model;
pub mod rules;
pub mod scanner;
