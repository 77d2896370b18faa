mod app;
mod backend;
mod config;
mod controller;
mod library;
mod logging;
mod playlist;
mod runtime;
mod selection;
mod store;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
