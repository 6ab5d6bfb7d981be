//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_module_path(false)
        .init();

    if let Err(err) = geocampus_cli::run() {
        eprintln!("geocampus: {err}");
        std::process::exit(1);
    }
}
