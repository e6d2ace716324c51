pub mod daos;
pub mod proposals;
pub mod status;
pub mod tasks;
pub mod upload;
