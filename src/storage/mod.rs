pub mod database;
pub mod local;

pub use local::LocalBackend;
