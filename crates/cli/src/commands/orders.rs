//! Order inspection commands.

use souq_core::order::Order;
use souq_storefront::db::OrderRepository;

use super::CommandError;

/// One line of the order listing.
fn summary_line(order: &Order) -> String {
    format!(
        "{}  {}  {:<10}  {:>3} item(s)  {:>12}  {}",
        order.id,
        order.created_at.format("%Y-%m-%d %H:%M"),
        order.status,
        order.item_count(),
        order.total_amount.display(),
        order.user_email.as_deref().unwrap_or("-"),
    )
}

/// Print every order, newest first.
pub async fn list(limit: Option<usize>) -> Result<(), CommandError> {
    let pool = super::connect().await?;
    let orders = OrderRepository::new(&pool).list_all().await?;

    tracing::info!(count = orders.len(), "Loaded orders");

    #[allow(clippy::print_stdout)]
    for order in orders.iter().take(limit.unwrap_or(usize::MAX)) {
        println!("{}", summary_line(order));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use souq_core::{OrderId, OrderStatus, PaymentMethod, Price, UserId};

    use super::*;

    #[test]
    fn test_summary_line() {
        let order = Order {
            id: OrderId::generate(),
            user_id: UserId::new(1),
            user_email: Some("amira@souq.test".to_owned()),
            customer_name: "Amira".to_owned(),
            phone: "0100".to_owned(),
            address: "Cairo".to_owned(),
            payment_method: PaymentMethod::Cash,
            items: Vec::new(),
            total_amount: Price::from_minor(12_000).unwrap(),
            status: OrderStatus::Pending,
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap(),
        };

        let line = summary_line(&order);
        assert!(line.contains("2026-03-01 09:30"));
        assert!(line.contains("pending"));
        assert!(line.contains("120.00 EGP"));
        assert!(line.ends_with("amira@souq.test"));
    }
}
