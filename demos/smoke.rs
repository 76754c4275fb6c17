//! Walk through services, balance, a (usually simulated) order and its status.
//!
//! Run with `DRY_RUN=1` unless you mean to spend balance.

use smm_panel::{AddOrder, ServiceSelector, Settings, SmmClient, workflow::select_service};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let settings = Settings::from_env();
    let client = SmmClient::from_settings(&settings)?;

    println!("[1/4] services");
    let services = client.services().await?;
    println!("  {} services available", services.len());

    let mut followers: Vec<_> = services
        .iter()
        .filter(|service| service.name.contains("Follow"))
        .collect();
    followers.sort_by_key(|service| {
        let rate = service.rate_value();
        (rate.is_none(), rate)
    });
    println!("  cheapest 'Followers' services:");
    for service in followers.iter().take(3) {
        println!(
            "  #{} {} | rate={} min={} max={} cancel={:?} refill={:?}",
            service.service,
            service.name,
            service.rate,
            service.min,
            service.max,
            service.cancel,
            service.refill
        );
    }

    println!("[2/4] balance");
    let balance = client.balance().await?;
    println!("  {} {}", balance.balance, balance.currency);

    println!("[3/4] add order (dry_run={})", settings.dry_run);
    let demo = match followers.first() {
        Some(service) => *service,
        None => select_service(&services, &ServiceSelector::Cheapest)?,
    };
    let order = client
        .add_order(AddOrder::new(demo.service, "https://example.com/demo")?)
        .await?;
    println!("  order id {} (simulated: {})", order.order, order.simulated);

    println!("[4/4] status");
    let status = client.order_status(order.order).await?;
    println!("  {status:?}");

    Ok(())
}
