use clap::Parser;
use hexfont_build::cli::Cli;
use hexfont_build::run;
use log::info;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    info!("hexfont-build {}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(cli) {
        log::error!("Build failed: {}", e);
        std::process::exit(1);
    }
}
