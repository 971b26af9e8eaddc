pub mod error;
pub mod key;
pub mod path;
