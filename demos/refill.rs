use std::io;

use smm_panel::{OrderId, OrderReply, Orders, Settings, SmmClient};

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
    let request = if let [single] = ids[..] {
        Orders::one(single)
    } else {
        Orders::many(ids)?
    };

    let client = SmmClient::from_settings(&Settings::from_env())?;
    match client.refill(request).await? {
        OrderReply::Single(refill) => println!("#{}: {:?}", refill.order, refill.refill),
        OrderReply::Batch(refills) => {
            for (order, refill) in refills {
                println!("#{order}: {:?}", refill.refill);
            }
        }
    }

    Ok(())
}
