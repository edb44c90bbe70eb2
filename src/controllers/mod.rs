//! Page logic
//!
//! Controllers turn service results into the view models served by the
//! routes.

pub mod auth_controller;
pub mod home_controller;
pub mod publish_controller;
pub mod requests_controller;
pub mod search_controller;

pub use auth_controller::AuthController;
pub use home_controller::HomeController;
pub use publish_controller::PublishController;
pub use requests_controller::RequestsController;
pub use search_controller::SearchController;
