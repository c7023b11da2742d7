//! Look up the actual charges of a room from the command line.
//!
//! ```sh
//! export ZKHB_BASE_URL='http://billing.example.com'
//! cargo run --bin zkhb-query -- 12 'Property fee' 1-1-101 '2024-01-01 00:00:00'
//! ```
//!
//! Records are printed as pretty JSON. `ZKHB_TIMEOUT_SECS` sets the request
//! timeout; `RUST_LOG` controls logging.

use std::time::Duration;

use tracing_subscriber::EnvFilter;
use zkhb_api::{ActualChargeQuery, EstateId, RequestOptions, ZkhbClient};

const USAGE: &str = "usage: zkhb-query <estate_id> <types> <room_no> <end_date>";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [estate_id, types, room_no, end_date] = args.as_slice() else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };

    let base_url = std::env::var("ZKHB_BASE_URL").unwrap_or_else(|_| {
        eprintln!("Error: ZKHB_BASE_URL environment variable is not set.");
        std::process::exit(1);
    });

    let mut options = RequestOptions::new();
    if let Ok(secs) = std::env::var("ZKHB_TIMEOUT_SECS") {
        match secs.parse::<u64>() {
            Ok(secs) => options = options.with_timeout(Duration::from_secs(secs)),
            Err(_) => {
                eprintln!("Error: ZKHB_TIMEOUT_SECS must be a whole number of seconds, got {secs:?}");
                std::process::exit(1);
            }
        }
    }

    let client = ZkhbClient::new(base_url).unwrap_or_else(|e| {
        eprintln!("Error: Failed to create client: {e}");
        std::process::exit(1);
    });

    let query = ActualChargeQuery::new(
        parse_estate_id(estate_id),
        types.as_str(),
        room_no.as_str(),
        end_date.as_str(),
    );

    let records = client
        .query_actual_charge_list(&query, options)
        .await
        .unwrap_or_else(|e| {
            eprintln!("Error: {e}");
            std::process::exit(2);
        });

    tracing::info!(count = records.len(), base_url = client.base_url(), "Query finished");

    match serde_json::to_string_pretty(&records) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error: Failed to encode records: {e}");
            std::process::exit(1);
        }
    }
}

/// Numeric arguments are sent as numbers, anything else as a code.
fn parse_estate_id(arg: &str) -> EstateId {
    match arg.parse::<i64>() {
        Ok(n) => EstateId::Number(n),
        Err(_) => EstateId::Code(arg.to_string()),
    }
}
