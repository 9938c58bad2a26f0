pub mod app;
pub mod commands;
pub mod detect;
pub mod dispatch;
pub mod env;
pub mod output;
pub mod page;
pub mod reply;
pub mod runtime;
pub mod scan;

pub use detect::{cmd_detect, DetectArgs};
pub use reply::{cmd_reply, ReplyArgs};
pub use scan::{cmd_scan, ScanArgs};
