pub mod dashboard;
mod error;
pub mod session;
mod subscription;

pub use dashboard::{DashboardModel, DashboardStats};
pub use error::{Error, Result};
pub use session::{AdminSession, LoginRequest, LoginResponse, SESSION_COOKIE_NAME};
pub use subscription::{PlanId, StatusTone, SubscriptionStatus, UserSubscription};
