//! Saves a bookmark, looks it up again, then deletes it.
//!
//! Run with: `cargo run --example save_bookmark -- https://bookie.example.com/api/v1 alice API_KEY`

use bookie_client::{ApiClient, CallbackSet, Credentials, Error, Route};
use serde::Serialize;
use std::sync::{Arc, Mutex};

#[derive(Serialize)]
struct Bookmark {
    url: String,
    description: String,
    tags: String,
}

fn report(action: &'static str) -> CallbackSet {
    CallbackSet::new()
        .on_success(move |data, raw, _ctx| {
            println!("{}: {} {}", action, raw.status_text, data.as_ref());
        })
        .on_error(move |data, status_text, _raw, _ctx| {
            println!("{} failed ({}): {:?}", action, status_text, data.message());
        })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("bookie_client=debug")
        .init();

    let mut args = std::env::args().skip(1);
    let credentials = Credentials::new(
        args.next()
            .unwrap_or_else(|| "http://127.0.0.1:6543/api/v1".to_string()),
        args.next().unwrap_or_else(|| "admin".to_string()),
        args.next().unwrap_or_default(),
    );

    let bookmark = Bookmark {
        url: "https://www.rust-lang.org/".to_string(),
        description: "Rust Programming Language".to_string(),
        tags: "rust programming".to_string(),
    };

    let client = |route: Route| {
        ApiClient::builder()
            .credentials(credentials.clone())
            .route(route)
            .build()
    };

    let saved = Arc::new(Mutex::new(None));
    let slot = Arc::clone(&saved);
    client(Route::user_bmark_save(&bookmark)?)?
        .call(report("save").on_complete(move |data, _raw, _ctx| {
            if let Some(hash_id) = data["bmark"]["hash_id"].as_str() {
                if let Ok(mut slot) = slot.lock() {
                    *slot = Some(hash_id.to_string());
                }
            }
        }))
        .await?;

    let Some(hash_id) = saved.lock().ok().and_then(|mut s| s.take()) else {
        println!("server did not return a hash id, stopping");
        return Ok(());
    };

    client(Route::bmark(&hash_id, &bookmark.url, &bookmark.description))?
        .call(report("load"))
        .await?;

    client(Route::tag_complete())?
        .complete_tags("ru", vec!["programming".to_string()], report("complete"))
        .await?;

    client(Route::user_bmark_delete(&hash_id))?
        .call(report("delete"))
        .await?;

    Ok(())
}
