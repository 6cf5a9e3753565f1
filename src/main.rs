//! Point d'entrée de webshell.
//!
//! Pas d'arguments : la fenêtre s'ouvre sur la page d'accueil configurée.
//! Voir [`webshell::config`] pour l'emplacement du fichier `config.toml`.

use tracing::warn;
use winit::event_loop::EventLoop;

use webshell::config::Config;
use webshell::error::ShellError;

fn main() -> Result<(), ShellError> {
    // ── 1. Provider crypto TLS ─────────────────────────────────────────
    if rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .is_err()
    {
        warn!("Provider crypto rustls déjà installé");
    }

    // ── 2. Logging / Tracing ───────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    #[cfg(debug_assertions)]
    warn!("Running in DEBUG mode — pages will load very slowly. Use `cargo run --release` for normal speed.");

    // ── 3. Lecteur de ressources Servo ─────────────────────────────────
    webshell::resources::init();

    // ── 4. Configuration ───────────────────────────────────────────────
    let config = Config::load();

    // ── 5. Boucle d'événements Winit ───────────────────────────────────
    let event_loop = EventLoop::with_user_event().build()?;
    let mut app = webshell::browser::App::new(&event_loop, config);

    event_loop.run_app(&mut app)?;
    Ok(())
}
