//! Data Transfer Objects for REST request/response serialization.
//!
//! Point amounts arrive as JSON numbers and are checked to be whole before
//! they reach a service. Domain entities are returned as-is.

pub mod banner_dto;
pub mod batch_dto;
pub mod common_dto;
pub mod invoice_dto;
pub mod member_dto;
pub mod store_dto;

pub use banner_dto::*;
pub use batch_dto::*;
pub use common_dto::*;
pub use invoice_dto::*;
pub use member_dto::*;
pub use store_dto::*;
