pub mod avatar;
pub mod catalog;
pub mod config;
pub mod course;
pub mod error;
pub mod io;
pub mod moment;
pub mod package;
pub mod paths;
pub mod scaffold;
pub mod template;
pub mod types;

pub use error::{CoursePressError, Result};
