pub mod dispatch;
pub mod login;
pub mod search;
pub mod shared;
pub mod status_config;
pub mod watch;
