use rusty_library_lending::{
    application::lending::{Library, ReservationClient},
    config::LendingConfig,
    console::Console,
    domain::{Book, Member},
    ports::LibraryManager,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing (stderr so logs do not interleave with the menu)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rusty_library_lending=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = LendingConfig::from_env().unwrap_or_else(|e| {
        tracing::warn!("{}; falling back to defaults", e);
        LendingConfig::default()
    });

    tracing::info!("Reservation TTL: {:?}", config.reservation_ttl);

    // Initialize library and seed data
    let library = Arc::new(Library::new(config));
    library
        .add_book(Book::new(
            1,
            "The Go Programming Language",
            "Donovan & Kernighan",
        ))
        .await;
    library
        .add_book(Book::new(2, "Clean Code", "Robert C. Martin"))
        .await;
    library.add_member(Member::new(1, "Alice")).await;
    library.add_member(Member::new(2, "Bob")).await;

    // Start reservation worker
    let (reservations, _worker) = ReservationClient::spawn(library.clone());

    // Start console UI
    let input = tokio::io::BufReader::new(tokio::io::stdin());
    let mut console = Console::new(input, tokio::io::stdout(), library, reservations);

    if let Err(e) = console.run().await {
        tracing::error!("Console error: {}", e);
        std::process::exit(1);
    }
}
