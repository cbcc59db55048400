use graphql_fetch::{Client, ClientConfig, MemoryCache, RequestOptions};
use std::env;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let url = env::var("GRAPHQL_URL")
        .unwrap_or_else(|_| "https://countries.trevorblades.com/graphql".to_string());

    let client = Client::new(ClientConfig::new(url))?.with_cache(Arc::new(MemoryCache::default()));
    let options = RequestOptions::cached("continents", 300);

    for _ in 0..2 {
        let response = client
            .execute_raw("{ continents { code name } }", None, &options)
            .await?;
        println!("status: {}", response.status);
        println!("data: {}", response.data);
    }

    Ok(())
}
