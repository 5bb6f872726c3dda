//! Cross-cutting value types shared by every layer.

pub mod api_response;
pub mod cents;
pub mod phone;

pub use api_response::ApiResponse;
pub use cents::Cents;
pub use phone::Phone;
