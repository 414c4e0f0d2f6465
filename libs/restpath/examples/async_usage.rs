//! Async usage example for the restpath client
//!
//! Talks to the public GitHub REST API by chaining path segments.
//!
//! To run this example:
//! ```bash
//! export RESTPATH_BASE_URL="https://api.github.com"   # Optional
//! cargo run --example async_usage
//! ```

use restpath::{Client, ClientOptions, chain};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let base_url = std::env::var(restpath::BASE_URL_ENV)
        .unwrap_or_else(|_| "https://api.github.com".to_owned());

    let options = ClientOptions::default()
        .header("Accept", "application/vnd.github+json")
        .header("User-Agent", "restpath-example");
    let client = Client::new(base_url, options)?;

    println!("=== Example 1: Named chaining ===\n");

    // `rust-lang` is not an identifier, so mix in call-style chaining.
    let repo = chain!(client => repos)?.call(["rust-lang", "rust"])?;
    println!("URL: {repo}");

    let response = repo.get().await?;
    println!("Status: {}", response.status());
    let data: serde_json::Value = response.json().await?;
    println!("Stars: {}\n", data["stargazers_count"]);

    println!("=== Example 2: Extra segments and call-time params ===\n");

    let response = client
        .get()
        .segments(["repos", "rust-lang", "rust", "issues"])
        .param("per_page", "3")
        .await?;
    let issues: serde_json::Value = response.json().await?;
    if let Some(items) = issues.as_array() {
        for issue in items {
            println!("#{} {}", issue["number"], issue["title"]);
        }
    }

    Ok(())
}
