#![forbid(unsafe_code)]

pub mod chapters;
pub mod cli;
pub mod corrections;
pub mod export;
pub mod formats;
pub mod inspect;
pub mod logging;
pub mod parse;
pub mod pipeline;
pub mod populate;
pub mod registry;
pub mod server;
pub mod store;
pub mod view;
