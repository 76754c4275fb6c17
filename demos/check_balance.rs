use smm_panel::{Settings, SmmClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let client = SmmClient::from_settings(&Settings::from_env())?;

    let balance = client.balance().await?;
    match balance.amount() {
        Some(amount) => println!("balance: {amount} {}", balance.currency),
        None => println!("balance (unparsed): {} {}", balance.balance, balance.currency),
    }

    Ok(())
}
