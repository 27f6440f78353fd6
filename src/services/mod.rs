pub mod accounts;
pub mod assistant;
pub mod gateway;
pub mod media;
pub mod recommendations;
pub mod reviews;
pub mod suggestion_filter;

pub use accounts::AccountService;
pub use assistant::Assistant;
pub use gateway::{CompletionClient, GroqClient};
pub use media::{MediaStorage, UploadedFile};
pub use recommendations::Recommender;
pub use reviews::ReviewService;
