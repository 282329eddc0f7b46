pub mod ai_tool;
pub mod subscription_record;
pub mod usage_record;
pub mod user;
