//! `accredit events`: poll the ledger event log.

use clap::Args;
use serde::Deserialize;

use accredit_core::EventRecord;

use crate::client::NodeClient;

#[derive(Args, Debug)]
pub struct EventsArgs {
    /// First sequence number to return.
    #[arg(long, default_value_t = 0)]
    pub since: u64,

    /// Print raw JSON records instead of one line per event.
    #[arg(long)]
    pub json: bool,
}

#[derive(Deserialize)]
struct EventsResponse {
    events: Vec<EventRecord>,
    next: u64,
}

pub async fn run(client: &NodeClient, args: &EventsArgs) -> anyhow::Result<()> {
    let data: EventsResponse = client.get(&format!("events?since={}", args.since)).await?;

    for record in &data.events {
        if args.json {
            println!("{}", serde_json::to_string(record)?);
        } else {
            println!("#{:<6} {}  {:?}", record.seq, record.at, record.event);
        }
    }
    if !args.json {
        println!("{} event(s); next cursor: {}", data.events.len(), data.next);
    }
    Ok(())
}
