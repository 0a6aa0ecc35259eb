pub mod auth;
pub mod paths;

pub use auth::{require_admin, AdminSession};
pub use paths::block_legacy_admin_paths;
