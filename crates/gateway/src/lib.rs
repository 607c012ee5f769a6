pub mod error;
pub mod flow;
pub mod render;
pub mod server;

pub use {
    error::FlowError,
    flow::{FlowController, Page, Route},
    server::{build_app, start_server},
};
