pub mod draw_items;
pub mod draw_live_events;
pub mod draw_settings;
pub mod draw_winners;
pub mod students;

pub use draw_items as draw_item_entity;
pub use draw_live_events as draw_live_event_entity;
pub use draw_settings as draw_setting_entity;
pub use draw_winners as draw_winner_entity;
pub use students as student_entity;

pub use draw_settings::SETTINGS_ROW_ID;
