pub mod avatar;
pub mod course;
pub mod export;
pub mod init;
pub mod serve;
