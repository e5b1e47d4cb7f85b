pub mod directory_service;
pub mod permission_service;
pub mod user_service;

// Re-export commonly used functions
pub use directory_service::{load_directory, persist_directory, seed_directory};
pub use permission_service::{
    decode_permission_map, encode_permission_key, has_access, status_permissions, PermissionGroupStatus,
    PermissionStatus,
};
pub use user_service::{generate_password_hash, random_session_id, verify_password};
