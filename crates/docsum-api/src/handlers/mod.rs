pub mod health;
pub mod home;
pub mod upload;

pub use health::HealthResponse;
pub use upload::SummaryResponse;
