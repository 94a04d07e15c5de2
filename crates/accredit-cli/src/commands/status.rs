use serde::Deserialize;

use crate::client::NodeClient;

#[derive(Deserialize)]
struct StatusResponse {
    version: String,
    uptime_secs: u64,
    ledger: LedgerStatus,
}

#[derive(Deserialize)]
struct LedgerStatus {
    admins: usize,
    institutions: usize,
    credentials: usize,
    companies: usize,
    events: u64,
}

pub async fn run(client: &NodeClient) -> anyhow::Result<()> {
    let data: StatusResponse = client.get("status").await?;

    println!("Accredit Node Status");
    println!("  Version:       {}", data.version);
    println!("  Uptime:        {}s", data.uptime_secs);
    println!("  Admins:        {}", data.ledger.admins);
    println!("  Institutions:  {}", data.ledger.institutions);
    println!("  Credentials:   {}", data.ledger.credentials);
    println!("  Companies:     {}", data.ledger.companies);
    println!("  Events:        {}", data.ledger.events);
    Ok(())
}
