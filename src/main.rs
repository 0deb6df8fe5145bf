mod app;
mod audio;
mod config;
mod controller;
mod error;
mod library;
mod mpris;
mod runtime;
mod ui;

fn main() -> Result<(), error::Error> {
    runtime::run()
}
