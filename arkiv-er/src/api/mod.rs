//! HTTP API handlers for arkiv-er

pub mod context;
pub mod error;
pub mod fields;
pub mod health;
pub mod items;

pub use context::{RequestContext, EPERSON_HEADER};
pub use error::{ApiError, ApiResult};
pub use fields::list_fields;
pub use health::health_routes;
pub use items::{
    add_metadata, count_comments, get_item, get_metadata, get_rating, list_bitstreams,
    list_comments, remove_metadata, replace_metadata,
};
