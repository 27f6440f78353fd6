pub mod json_body;
pub mod request_id;
pub mod session;

pub use json_body::JsonBody;
pub use request_id::{make_span_with_request_id, request_id_middleware, RequestId, REQUEST_ID_HEADER};
pub use session::{clear_session_cookie, session_cookie, session_token, SESSION_COOKIE};
