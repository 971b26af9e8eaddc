pub mod demo;
pub mod keys;
pub mod send;
