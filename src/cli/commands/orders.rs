use crate::api::{Order, OrderQuery, SortOrder};
use crate::cli::commands::{confirm, print_page_footer, report, with_session, Console};
use crate::views::{AdvanceEvent, OrderDetailView};
use crate::workflows::{next_status, OrderStatus, OrderStatusWorkflow};
use anyhow::Result;
use std::sync::Arc;

fn status_icon(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Confirm => "🆕",
        OrderStatus::Roasting => "🔥",
        OrderStatus::Shipped => "🚚",
        OrderStatus::Complete => "✅",
        OrderStatus::Cancelled => "🚫",
    }
}

fn print_order(order: &Order) {
    println!(
        "{} Order #{} - {} ({})",
        status_icon(order.status),
        order.id,
        order.customer_name,
        order.status.label()
    );
    println!("   📧 {}", order.customer_email);
    let address = order.address();
    if !address.is_empty() {
        println!("   🏠 {address}");
    }
    if !order.phone_number.is_empty() {
        match &order.alternative_phone_number {
            Some(alt) if !alt.is_empty() => println!("   📞 {} / {alt}", order.phone_number),
            _ => println!("   📞 {}", order.phone_number),
        }
    }
    println!("   📅 {}", order.created_at.format("%Y-%m-%d %H:%M"));
    if !order.items.is_empty() {
        println!("   🛒 Items:");
        for item in &order.items {
            println!(
                "      • {} {} ({}) x{} @ {:.2} = {:.2}",
                item.bean_name,
                item.form_name,
                item.roasted,
                item.order_quantity,
                item.price,
                item.line_total()
            );
        }
    }
    println!("   💰 Total: {:.2}", order.total_price);
}

pub struct OrdersListCommand {
    pub status: Option<OrderStatus>,
    pub sort: SortOrder,
    pub page: u32,
    pub limit: Option<u32>,
}

impl OrdersListCommand {
    pub async fn execute(&self, console: &Console) -> Result<()> {
        let page = console.page(self.page, self.limit);
        let query = OrderQuery {
            status: self.status,
            sort: self.sort,
            offset: Some(page.offset()),
            limit: Some(page.limit),
        };

        with_session(console, |client, _session| async move {
            let workflow = OrderStatusWorkflow::new(Arc::new(client), console.cache.clone());
            let orders = workflow.list_orders(&query).await.map_err(report)?;

            println!();
            if orders.is_empty() {
                println!("📋 No orders found");
                return Ok(());
            }
            println!("📋 ORDERS");
            println!("─────────");
            for order in &orders {
                println!(
                    "{} #{:<6} {:<24} {:<10} {:>10.2}  {}",
                    status_icon(order.status),
                    order.id,
                    order.customer_name,
                    order.status.as_str(),
                    order.total_price,
                    order.created_at.format("%Y-%m-%d")
                );
            }
            print_page_footer(page, orders.len());
            Ok(())
        })
        .await
    }
}

pub struct OrderShowCommand {
    pub id: String,
}

impl OrderShowCommand {
    pub async fn execute(&self, console: &Console) -> Result<()> {
        with_session(console, |client, session| async move {
            let workflow = OrderStatusWorkflow::new(Arc::new(client), console.cache.clone());
            let mut view = OrderDetailView::new(workflow, self.id.clone(), session.role);
            let order = view.load().await.map_err(report)?.clone();

            println!();
            print_order(&order);
            println!();
            println!("   ⏭️  {}", view.next_status_label());
            if view.can_advance() {
                println!("   💡 Run 'roastery orders advance {}' to move it forward", order.id);
            }
            Ok(())
        })
        .await
    }
}

pub struct OrderAdvanceCommand {
    pub id: String,
    pub auto_approve: bool,
}

impl OrderAdvanceCommand {
    pub async fn execute(&self, console: &Console) -> Result<()> {
        with_session(console, |client, session| async move {
            let workflow = OrderStatusWorkflow::new(Arc::new(client), console.cache.clone());
            let mut view = OrderDetailView::new(workflow, self.id.clone(), session.role.clone());
            let current = view.load().await.map_err(report)?.status;

            let Some(target) = view.begin_advance() else {
                println!();
                if current.is_terminal() {
                    println!("🔒 Order #{} is {}; nothing to advance", self.id, current.as_str());
                } else if !session.role.can_advance_orders() {
                    println!("🔒 Only super admins can update order status");
                } else {
                    println!("⏳ {}", view.next_status_label());
                }
                return Ok(());
            };

            println!();
            let prompt = format!(
                "Move order #{} from {} to {}?",
                self.id,
                current.as_str(),
                target.as_str()
            );
            if !confirm(&prompt, self.auto_approve)? {
                view.cancel_advance();
                return Ok(());
            }

            println!("🔄 Updating...");
            match view.confirm_advance().await {
                Some(AdvanceEvent::Refreshed(order)) => {
                    if let Some(notification) = view.notification() {
                        println!("✅ {notification}");
                    }
                    println!();
                    print_order(&order);
                    Ok(())
                }
                Some(AdvanceEvent::Failed(error)) => {
                    if let Some(notification) = view.notification() {
                        println!("✅ {notification}");
                    }
                    Err(report(error))
                }
                None => {
                    println!("⏳ Another update for this order is still running");
                    Ok(())
                }
            }
        })
        .await
    }
}

pub struct NextStatusCommand {
    pub status: String,
}

impl NextStatusCommand {
    pub fn execute(&self) -> Result<()> {
        let current: OrderStatus = self.status.parse()?;
        match next_status(current) {
            Some(next) => println!("{next}"),
            None => println!("none ({} is terminal)", current),
        }
        Ok(())
    }
}
