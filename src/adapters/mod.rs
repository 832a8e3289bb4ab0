pub mod chat_handler;
pub mod health_handler;
pub mod metrics_handler;
pub mod telephony;
pub mod tool_handler;
pub mod ui_handler;
