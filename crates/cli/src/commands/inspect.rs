//! Show what a request for an order would look like, without sending it.

use kom::klarna::{ApiRegion, Operation, base_url};
use kom::{KomConfig, MemoryOrderStore, OrderStore};
use kom_core::OrderId;
use tracing::info;

use super::Files;

/// Print the resolved environment, base URL and retrieve request.
///
/// # Errors
///
/// Returns an error if the files cannot be read, the order is not a Klarna
/// order, or its credentials do not resolve.
pub fn run(
    files: &Files,
    config: &KomConfig,
    order_id: OrderId,
) -> Result<(), Box<dyn std::error::Error>> {
    let orders = MemoryOrderStore::load_file(&files.orders)?;
    let order = orders.load(order_id)?;
    let client = super::client(files, config)?;

    let variant = order
        .variant()
        .ok_or_else(|| format!("Order {order_id} was not paid with Klarna"))?;
    let environment = client.environment(variant);
    let region = ApiRegion::for_country(&order.country);

    info!("Order:       {order_id} ({variant}, {})", order.country.as_str());
    info!("Environment: {environment:?}");
    info!("Base URL:    {}", base_url(region, environment)?);

    let request = client.prepare(&order, &Operation::Retrieve)?;
    info!("Request:     {} {}", request.method, request.url);
    if let Some(body) = &request.body {
        info!("Body:        {}", serde_json::to_string_pretty(body)?);
    }
    Ok(())
}
