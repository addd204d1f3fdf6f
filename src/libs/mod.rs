pub mod detection;
pub mod mode;
pub mod mutators;
pub mod reporter;
pub mod resolver;
pub mod shells;
pub mod store;
