/// Request extractors: audit context, authenticated user, validated input
pub mod auth;
pub mod validation;

pub use auth::{AdminUser, CurrentUser, RequestContext};
pub use validation::{ValidatedJson, ValidatedQuery};
