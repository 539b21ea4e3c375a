pub mod detector;
pub mod markers;
