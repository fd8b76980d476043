pub mod auth;
pub mod common;
pub mod draw;
pub mod live;
pub mod pagination;
pub mod student;

pub use auth::*;
pub use common::*;
pub use draw::*;
pub use live::*;
pub use pagination::*;
pub use student::*;
