pub mod account;
pub mod completion;
pub mod place;
pub mod session;

pub use account::{Account, LoginRequest, NewAccount, RegisterRequest};
pub use completion::{
    ApiErrorBody, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, Usage,
};
pub use place::{
    NewPlace, Place, PlaceFilter, PlaceForm, PlaceRow, PlaceType, SearchQuery, MAX_RATING,
    MIN_RATING,
};
pub use session::RequestContext;
