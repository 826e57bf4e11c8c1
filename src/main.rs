use std::env;

use tradfiwife::quotes::QuoteConfig;

#[tokio::main]
async fn main() {
    env_logger::init();

    let raw_args: Vec<String> = env::args().collect();
    if raw_args.get(1).map(|s| s.as_str()) == Some("serve") {
        let port = raw_args
            .get(2)
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(8080);
        let config = QuoteConfig::from_env();
        if config.api_key.is_empty() {
            log::warn!(
                "FINNHUB_API_KEY is not set; live quote lookups will fail and fallback prices will be served"
            );
        }
        if let Err(e) = tradfiwife::api::run_http_server(port, config).await {
            eprintln!("Server error: {e}");
            std::process::exit(1);
        }
        return;
    }

    eprintln!("Usage: cargo run -- serve [port]");
    std::process::exit(1);
}
