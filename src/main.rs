use std::env;

use tracing_subscriber::EnvFilter;

use gradedash::app;

/// Default input file, relative to the working directory.
const DEFAULT_FILE: &str = "Student.xlsx";

/// Default listen port, overridden by the PORT environment variable.
const DEFAULT_PORT: u16 = 8050;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();

    // First argument overrides the input file path
    let file_path = if args.len() >= 2 {
        args[1].clone()
    } else {
        DEFAULT_FILE.to_string()
    };

    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    // Start the web application
    app::run(&file_path, port).await?;

    Ok(())
}
