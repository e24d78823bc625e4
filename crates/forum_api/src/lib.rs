//! Request handlers exposing the forum reply core to a request dispatcher.

pub mod api;

pub use api::{ApiResponse, ForumHandlers, NoticeView, RequestError};
