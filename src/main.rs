use std::env;
use std::path::Path;

use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let raw_args: Vec<String> = env::args().collect();
    if raw_args.get(1).map(|s| s.as_str()) == Some("serve") {
        let port = raw_args
            .get(2)
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(8080);
        let table_path = raw_args.get(3).map(Path::new);
        let table = match mortgage_sim::api::load_program_table(table_path) {
            Ok(table) => table,
            Err(e) => {
                error!("program table error: {e}");
                std::process::exit(1);
            }
        };
        if let Err(e) = mortgage_sim::api::run_http_server(port, table).await {
            error!("server error: {e}");
            std::process::exit(1);
        }
        return;
    }

    std::process::exit(mortgage_sim::api::run_cli());
}
