pub mod directory;
pub mod middleware;
pub mod roles;
