//! The girih binary: argument handling, logging setup, and the hand-off
//! to the window manager run loop.
use girih::{
    config::{self, Config},
    core::WindowManager,
    draw::XDraw,
    x::XConn,
    x11rb::RustConn,
    Result,
};
use std::{env, process};
use tracing_subscriber::{prelude::*, EnvFilter};

fn main() {
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "-v" => {
                eprintln!("girih-{}", girih::VERSION);
                process::exit(1);
            }
            _ => {
                eprintln!("usage: girih [-v]");
                process::exit(1);
            }
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .finish()
        .init();

    if let Err(e) = run() {
        eprintln!("girih: {e}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = Config::default();
    let keys = config::key_bindings(&config);
    let buttons = config::mouse_bindings(&config);

    let conn = RustConn::new()?;
    conn.become_wm()?;

    let draw = XDraw::new(&config.fonts, config.normal_scheme)?;

    WindowManager::new(config, keys, buttons, conn, draw).run()
}
