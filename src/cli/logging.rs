use tracing_subscriber::EnvFilter;

/// Filter for a `-v` count; `RUST_LOG` wins when set.
pub fn filter_for(verbose: u8) -> EnvFilter {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("element_discovery={level},bridge={level}")))
}

/// Install the global subscriber. Logs go to stderr so stdout stays free for
/// reports and discovery JSON.
pub fn init(verbose: u8, json: bool) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter_for(verbose))
        .with_writer(std::io::stderr)
        .with_target(true);

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = installed {
        eprintln!("logging already initialised: {}", e);
    }
}
