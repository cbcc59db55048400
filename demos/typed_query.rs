use graphql_fetch::header::{HeaderValue, AUTHORIZATION};
use graphql_fetch::{Client, ClientConfig, Operation, RequestOptions};
use serde::{Deserialize, Serialize};
use std::env;

struct CountryByCode;

#[derive(Serialize)]
struct Vars {
    code: String,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Data {
    country: Option<Country>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Country {
    name: String,
    capital: Option<String>,
}

impl Operation for CountryByCode {
    const QUERY: &'static str = "query($code: ID!) { country(code: $code) { name capital } }";
    type Variables = Vars;
    type Response = Data;
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let url = env::var("GRAPHQL_URL")
        .unwrap_or_else(|_| "https://countries.trevorblades.com/graphql".to_string());

    let mut client = Client::new(ClientConfig::new(url))?;
    if let Ok(token) = env::var("GRAPHQL_TOKEN") {
        client.set_header(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}"))?);
    }

    let vars = Vars {
        code: env::args().nth(1).unwrap_or_else(|| "NO".to_string()),
    };
    let response = client
        .execute_operation::<CountryByCode>(Some(&vars), &RequestOptions::default())
        .await?;

    println!("response: {response:?}");
    Ok(())
}
