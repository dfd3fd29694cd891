pub mod init;
pub mod source;
pub mod dispatch;
pub mod process;
pub mod preview;
