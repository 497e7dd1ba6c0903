//! Route handlers for the session API.

pub mod health;
pub mod sessions;

pub use health::health_routes;
pub use sessions::{
    AddValuesRequest, CreateSessionRequest, RemoveValuesRequest, SessionResponse,
    SuccessResponse, add_value_handler, add_values_handler, create_session_handler,
    get_session_handler, invalidate_session_handler, remove_value_handler,
    remove_values_handler,
};
