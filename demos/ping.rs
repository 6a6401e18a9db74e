//! Checks a set of settings against a Bookie server, then syncs.
//!
//! This example shows how to:
//! - Verify settings with a ping before trusting them
//! - Subscribe to `api:loaded` notifications
//! - Read the typed `Sync` payload
//!
//! Run with: `cargo run --example ping -- https://bookie.example.com/api/v1 alice API_KEY`

use bookie_client::{
    check_connection, events, ApiClient, ApiEvent, CallbackSet, ConnectionCheck, Error, Route,
    Settings, SyncPayload,
};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("bookie_client=debug,ping=info")
        .init();

    let mut args = std::env::args().skip(1);
    let settings = Settings {
        api_url: args
            .next()
            .unwrap_or_else(|| "http://127.0.0.1:6543/api/v1".to_string()),
        api_username: args.next().unwrap_or_else(|| "admin".to_string()),
        api_key: args.next().unwrap_or_default(),
        cache_content: false,
    };

    // Log every successful response, whoever made it.
    let mut loaded = events::global().subscribe();
    tokio::spawn(async move {
        while let Ok(ApiEvent::Loaded { url, response }) = loaded.recv().await {
            println!("api:loaded {} ({:?})", url, response.latency);
        }
    });

    println!("=== Ping ===");
    match check_connection(&settings).await? {
        ConnectionCheck::Verified => println!("Saved your settings..."),
        ConnectionCheck::Rejected { message } => {
            println!(
                "I could not Ping the server with your settings. Server said: {}",
                message
            );
            return Ok(());
        }
    }

    println!("=== Sync ===");
    ApiClient::builder()
        .credentials(settings.credentials())
        .route(Route::sync())
        .build()?
        .call(
            CallbackSet::new()
                .on_success(|data, _raw, _ctx| match data.parse::<SyncPayload>() {
                    Ok(payload) => println!("{} bookmarks stored", payload.hash_list.len()),
                    Err(e) => println!("unexpected sync payload: {}", e),
                })
                .on_error(|data, status_text, _raw, _ctx| {
                    println!("sync failed ({}): {:?}", status_text, data.message());
                }),
        )
        .await?;

    Ok(())
}
