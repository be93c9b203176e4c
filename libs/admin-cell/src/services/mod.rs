pub mod auth;
pub mod providers;

pub use auth::AdminAuthService;
pub use providers::ProviderAdminService;
