// Export all route modules
pub mod admin_firms;
pub mod admin_founders;
pub mod admin_import;
pub mod admin_investors;
pub mod auth;
pub mod captable;
pub mod company;
pub mod investor;
pub mod matching;

pub use admin_firms::*;
pub use admin_founders::*;
pub use admin_import::*;
pub use admin_investors::*;
pub use auth::*;
pub use captable::*;
pub use company::*;
pub use investor::*;
pub use matching::*;
