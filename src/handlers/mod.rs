pub mod auth;
pub mod draw;
pub mod live;
pub mod student;

pub use auth::auth_config;
pub use draw::draw_config;
pub use live::live_config;
pub use student::student_config;
