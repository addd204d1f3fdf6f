pub mod fnm;
pub mod package_manager;
