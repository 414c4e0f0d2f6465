//! Blocking (sync) usage example for the restpath client
//!
//! Suitable for build scripts and other code without an async runtime.
//!
//! To run this example:
//! ```bash
//! export RESTPATH_BASE_URL="https://httpbin.org"
//! export RESTPATH_TIMEOUT="10s"          # Optional
//! cargo run --example blocking_usage
//! ```

use restpath::Client;
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Base URL and session options from the environment
    let client = Client::from_env()?;

    println!("=== Example 1: Blocking GET ===\n");

    let response = client.segment("get")?.get().param("q", "1").send_blocking()?;
    println!("Status: {}", response.status());
    let data: serde_json::Value = response.json_blocking()?;
    println!("Echoed args: {}\n", data["args"]);

    println!("=== Example 2: Blocking POST with form body ===\n");

    let response = client
        .post()
        .segment("post")
        .form(&[("name", "restpath")])?
        .send_blocking()?;
    println!("Status: {}", response.status());
    println!("Body: {}\n", response.text_blocking()?);

    println!("=== Example 3: Blocking PUT with JSON body ===\n");

    let response = client
        .put()
        .segment("put")
        .json(&json!({"id": 1}))?
        .send_blocking()?;
    println!("Status: {}", response.status());

    Ok(())
}
