//! storytime binary entry point.

mod app;
mod commands;
mod config;
mod history;
mod identity;
mod logging;
mod navigation;
mod recording;
mod session;
mod setup;
mod story;
mod ui;

#[tokio::main]
async fn main() {
    if let Err(e) = app::run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
