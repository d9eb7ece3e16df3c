pub mod crossing;
pub mod partition;
pub mod repair;
