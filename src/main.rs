use std::env;
use std::time::Duration;

use dotenv::dotenv;
use rand::Rng;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use treasurebot::bot::Bot;
use treasurebot::client::RestClient;
use treasurebot::heuristic::WeightedExplorer;

fn get_env_var_u64(key: &str) -> Option<u64> {
    env::var(key).ok().and_then(|val| val.parse::<u64>().ok())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("treasurebot=debug,info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_logging();

    let server = env::var("TREASUREBOT_SERVER")
        .unwrap_or_else(|_| "http://localhost:3000".to_string());
    let name = env::var("TREASUREBOT_NAME")
        .unwrap_or_else(|_| format!("treasurebot-{}", rand::rng().random_range(0..100)));
    let think_delay =
        Duration::from_millis(get_env_var_u64("TREASUREBOT_THINK_DELAY_MS").unwrap_or(200));

    tracing::info!("playing as {} against {}", name, server);

    let client = RestClient::new(server, name.clone());
    let mut bot = Bot::new(client, WeightedExplorer::new(name), think_delay);
    let outcome = bot.run().await?;

    tracing::info!("finished: {:?}", outcome);

    Ok(())
}
