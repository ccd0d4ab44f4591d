//! Shared response types.

mod pagination;
mod response;

pub use pagination::{Paginated, PaginationMeta};
pub use response::{ApiResponse, Created};
