pub mod auth_service;
pub mod draw_engine;
pub mod draw_item_service;
pub mod live_service;
pub mod notifier;
pub mod student_service;

pub use auth_service::AuthService;
pub use draw_engine::DrawEngine;
pub use draw_item_service::DrawItemService;
pub use live_service::LiveService;
pub use notifier::{ChangeNotifier, ChangedTable};
pub use student_service::StudentService;
