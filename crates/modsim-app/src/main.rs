//! Main application entry point (native).

#[cfg(feature = "native")]
fn main() {
    env_logger::init();
    log::info!("Starting ModSim");

    let mut config = modsim_app::AppConfig::default();
    if let Some(path) = std::env::args().nth(1) {
        match modsim_core::ViewConfig::load(&path) {
            Ok(view) => {
                log::info!("Loaded view configuration from {}", path);
                config.view = view;
            }
            Err(e) => {
                log::error!("Failed to load {}: {}", path, e);
                std::process::exit(1);
            }
        }
    }

    if let Err(e) = pollster::block_on(modsim_app::App::run(config)) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}
