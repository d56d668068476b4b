/// ledcube - Rotating wireframe on a serpentine LED panel
///
/// Renders to a terminal preview of the panel, or headless into memory.
/// Controls (preview):
///   - Q/ESC: Quit, clearing the panel

fn main() -> anyhow::Result<()> {
    let Some(options) = ledcube_terminal::parse_args(std::env::args().skip(1))? else {
        println!("{}", ledcube_terminal::USAGE);
        return Ok(());
    };

    // The preview owns the screen, so only warnings get through there.
    let default_filter = if options.headless { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();

    log::info!("ledcube starting...");
    ledcube_terminal::run(options)
}
