pub mod classify;
pub mod config;
pub mod credential;
pub mod decode;
pub mod dispatch;
pub mod error;
pub mod pipeline;
pub mod prompt;
pub mod response;
pub mod server;
pub mod tools;
