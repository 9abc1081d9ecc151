use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use paramdb::settings::{DEFAULT_SETTINGS, Settings};
use paramdb::store::Store;
use paramdb::{ErrorKind, ParamError};

fn main() {
    let name = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_SETTINGS.to_string());
    let settings = match Settings::load(&name) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("paramdb: {e}");
            std::process::exit(to_exit_code(e.kind()));
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let exit_code = match run(&settings) {
        Ok(()) => 0,
        Err(e) => {
            error!(error = %e, "paramdb failed");
            to_exit_code(e.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run(settings: &Settings) -> Result<(), ParamError> {
    let mut store = Store::new();
    let read = settings.load_sources(store.input())?;
    info!(read, keys = store.keys().len(), "sources loaded");

    let store = store.reader();
    match &settings.output {
        Some(path) => store.write_text_file(path, settings.output_env_path.as_deref()),
        None => store.print(),
    }
}

fn to_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Config => 2,
        ErrorKind::Resource => 3,
        ErrorKind::Format => 4,
        ErrorKind::State | ErrorKind::Lookup => 1,
    }
}
