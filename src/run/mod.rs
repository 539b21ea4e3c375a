pub mod coordinator;
pub mod guard;
