pub mod api;
pub mod app;
pub mod cli;
pub mod session;
pub mod store;
pub mod ui;
pub mod utils;

pub use api::{ApiClient, ApiError, MessagingApi};
pub use app::AppState;
pub use session::{AuthError, UserSession};
pub use store::{ChatController, ChatError, DeliveryStatus};
