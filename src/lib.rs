pub mod api_router;
pub mod catalog;
pub mod shared;
