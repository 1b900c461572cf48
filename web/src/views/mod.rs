mod components;

mod login;
pub use login::Login;

mod dashboard;
pub use dashboard::Dashboard;
