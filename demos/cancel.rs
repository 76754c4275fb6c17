use std::io;

use smm_panel::{OrderId, Orders, RequestOutcome, Settings, SmmClient};

/// Parse `SMM_ORDER_IDS` (comma-separated).
fn order_ids_from_env() -> Result<Vec<OrderId>, Box<dyn std::error::Error>> {
    let raw = std::env::var("SMM_ORDER_IDS").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "SMM_ORDER_IDS environment variable is required (comma-separated ids)",
        )
    })?;
    let ids = raw
        .split(',')
        .map(|id| id.trim().parse::<u64>().map(OrderId::new))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ids)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let ids = order_ids_from_env()?;

    let client = SmmClient::from_settings(&Settings::from_env())?;
    let results = client.cancel(Orders::many(ids)?).await?;
    for (order, item) in results {
        match item.cancel {
            RequestOutcome::Accepted(code) => println!("#{order}: accepted ({code})"),
            RequestOutcome::Rejected(details) => println!("#{order}: rejected {details:?}"),
        }
    }

    Ok(())
}
