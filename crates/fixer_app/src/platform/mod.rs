pub(crate) mod app;
mod button;
pub(crate) mod config;
mod push;
mod terminal;
