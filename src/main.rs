use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use fanto::config::Config;
use fanto::console::{print_board, print_scene, read_commands, Board, USAGE};
use fanto::kernel::event::Notice;
use fanto::scene::load_reference;
use fanto::services::background::BackgroundService;
use fanto::services::image::ImageService;
use fanto::services::llm::LLMService;
use fanto::services::Services;
use fanto::Reactor;
use tokio::io::BufReader;
use tokio::sync::{mpsc, watch};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Setup Logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // 2. Config + Services
    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(&PathBuf::from(path))?,
        None => Config::from_env(),
    };

    let services = Services {
        text: Arc::new(LLMService::from_config(&config)),
        images: Arc::new(ImageService::from_config(&config)),
        background: Arc::new(BackgroundService::from_config(&config)),
    };
    let reference = load_reference(&config.character.base_image).await;

    // 3. Reactor
    let (tx, rx) = mpsc::channel(100);
    let mut reactor = Reactor::new(rx, tx.clone(), services, &config, reference);
    let name = config.character.name.clone();

    tracing::info!("{} is getting ready...", name);
    for notice in reactor.initialize().await {
        if let Notice::Banner(banner) = notice {
            println!("!! {}", banner);
        }
    }
    print_board(&reactor, &name);

    let (board_tx, board_rx) = watch::channel(Board::capture(&reactor));

    // 4. Console Input
    println!("{}", USAGE);
    tokio::spawn(read_commands(BufReader::new(tokio::io::stdin()), tx, board_rx));

    // 5. Run Kernel
    reactor
        .run(|reactor, notice| {
            match notice {
                Notice::SlotsChanged | Notice::CustomAdded(_) => print_board(reactor, &name),
                Notice::Rejected { text, reason } => println!("!! '{}' rejected: {}", text, reason),
                Notice::Dispatched(batch) => println!(">> {} is processing: {}", name, batch.join(" and ")),
                Notice::SceneUpdated => print_scene(reactor),
                Notice::RenderSkipped => println!("!! render failed, keeping the previous image"),
                Notice::Rewritten { original, outcome } => match outcome {
                    Ok(text) => println!("?? '{}' -> '{}' (type '+{}' to add it)", original, text, text),
                    Err(rejection) => println!("?? '{}' invalid: {}", original, rejection),
                },
                Notice::Banner(banner) => println!("!! {}", banner),
            }
            let _ = board_tx.send(Board::capture(reactor));
        })
        .await;

    Ok(())
}
