#[cfg(target_arch = "wasm32")]
fn main() {
    use log::{error, info};

    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    console_log::init_with_level(landing_fx::config::log_level()).expect("error initializing log");

    info!("Starting landing page enhancements");
    if let Err(err) = landing_fx::web::start() {
        error!("landing page enhancements disabled: {err}");
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    eprintln!("landing-fx runs in the browser; build it for wasm32-unknown-unknown");
}
