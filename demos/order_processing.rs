//! E-commerce Order Processing
//!
//! An order lifecycle driven by events, with services supplied through the
//! dependency container.
//!
//! Key concepts:
//! - Guards enforce business rules (positive total, address present)
//! - Hooks reach payment and shipping services injected by name
//! - One transition shared by several source states
//! - Cancellation from any state through a wildcard source
//! - Subscribers notified after each committed transition
//!
//! Run with: cargo run --example order_processing

use std::sync::Arc;
use turnstile::{
    event_enum, state_enum, BoxError, Context, Hook, Listener, StateMachine, StateMachineBuilder,
    TransitionBuilder,
};

state_enum! {
    enum OrderState {
        Draft,
        Paid,
        Warehouse,
        Shipped,
        Delivered,
        Cancelled,
    }
    final: [Delivered, Cancelled]
}

event_enum! {
    enum OrderEvent {
        Pay,
        Store,
        Ship,
        Deliver,
        Cancel,
    }
}

#[derive(Clone, Debug)]
struct Order {
    id: u64,
    total: f64,
    items: Vec<String>,
    shipping_address: Option<String>,
    transaction: Option<String>,
    tracking: Option<String>,
}

// Services

trait PaymentGateway: Send + Sync {
    fn charge(&self, order_id: u64, amount: f64) -> Result<String, BoxError>;
}

trait ShippingService: Send + Sync {
    fn create_shipment(&self, order_id: u64, address: &str) -> Result<String, BoxError>;
}

struct MockGateway;

impl PaymentGateway for MockGateway {
    fn charge(&self, order_id: u64, amount: f64) -> Result<String, BoxError> {
        println!("  [Payment] Charging ${amount:.2}");
        Ok(format!("TXN-{}", order_id * 100))
    }
}

struct MockCarrier;

impl ShippingService for MockCarrier {
    fn create_shipment(&self, order_id: u64, address: &str) -> Result<String, BoxError> {
        println!("  [Shipping] Creating shipment to {address}");
        Ok(format!("TRACK-{}", order_id * 1000))
    }
}

type Gateway = Arc<dyn PaymentGateway>;
type Carrier = Arc<dyn ShippingService>;

// Guards

fn can_pay(ctx: &Context<Order>, _: &()) -> bool {
    ctx.data.total > 0.0 && !ctx.data.items.is_empty()
}

fn can_ship(ctx: &Context<Order>, _: &()) -> bool {
    ctx.data.shipping_address.is_some()
}

// Hooks

fn process_payment(ctx: &mut Context<Order>, _: &()) -> Result<(), BoxError> {
    let gateway = ctx.get::<Gateway>("payments").ok_or("payment gateway missing")?;
    let transaction = gateway.charge(ctx.data.id, ctx.data.total)?;
    ctx.data.transaction = Some(transaction);
    Ok(())
}

fn ship_order(ctx: &mut Context<Order>, _: &()) -> Result<(), BoxError> {
    let carrier = ctx.get::<Carrier>("shipping").ok_or("carrier missing")?;
    let address = ctx
        .data
        .shipping_address
        .as_deref()
        .ok_or("missing shipping address")?;
    let tracking = carrier.create_shipment(ctx.data.id, address)?;
    ctx.data.tracking = Some(tracking);
    Ok(())
}

fn order_machine(order: Order) -> Result<StateMachine<OrderState, OrderEvent, Order>, BoxError> {
    let machine = StateMachineBuilder::with_data(order.clone())
        .id(format!("order-{}", order.id))
        .initial(OrderState::Draft)
        .inject_value("payments", Arc::new(MockGateway) as Gateway)
        .inject("shipping", || {
            println!("  [Container] Connecting to carrier");
            Ok::<Carrier, BoxError>(Arc::new(MockCarrier))
        })
        .transition(
            TransitionBuilder::new()
                .on(OrderEvent::Pay)
                .from(OrderState::Draft)
                .to(OrderState::Paid)
                .when(can_pay)
                .on_enter(Hook::from_fn(process_payment)),
        )?
        .transition(
            TransitionBuilder::new()
                .on(OrderEvent::Store)
                .from(OrderState::Paid)
                .to(OrderState::Warehouse),
        )?
        .transition(
            TransitionBuilder::new()
                .on(OrderEvent::Ship)
                .from_states([OrderState::Paid, OrderState::Warehouse])
                .to(OrderState::Shipped)
                .when(can_ship)
                .on_enter(Hook::from_fn(ship_order)),
        )?
        .transition(
            TransitionBuilder::new()
                .on(OrderEvent::Deliver)
                .from(OrderState::Shipped)
                .to(OrderState::Delivered),
        )?
        .transition(
            TransitionBuilder::new()
                .on(OrderEvent::Cancel)
                .from_any()
                .to(OrderState::Cancelled),
        )?
        .subscribe_all(Listener::from_fn(|n| {
            println!(
                "  [Notification] {}: {:?} -> {:?}",
                n.machine_id, n.from, n.to
            );
            Ok(())
        }))
        .build()?;
    Ok(machine)
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    println!("=== E-commerce Order Processing ===\n");

    let order = Order {
        id: 12345,
        total: 149.99,
        items: vec!["Book".to_string(), "Pen".to_string()],
        shipping_address: Some("123 Main St, City, State 12345".to_string()),
        transaction: None,
        tracking: None,
    };
    println!("Processing order {}:", order.id);
    println!("  Total: ${:.2}", order.total);
    println!("  Items: {}\n", order.items.join(", "));

    let machine = order_machine(order)?;

    println!("Step 1: Pay");
    machine.fire(OrderEvent::Pay).await?;

    println!("\nStep 2: Ship straight from Paid");
    machine.fire(OrderEvent::Ship).await?;

    println!("\nStep 3: Deliver");
    machine.fire(OrderEvent::Deliver).await?;

    let receipt = machine
        .inspect(|ctx| (ctx.data.transaction.clone(), ctx.data.tracking.clone()))
        .await;
    println!("\nReceipt: {receipt:?}");

    println!("\nAn order with nothing in it cannot be paid:");
    let empty = order_machine(Order {
        id: 67890,
        total: 0.0,
        items: Vec::new(),
        shipping_address: None,
        transaction: None,
        tracking: None,
    })?;
    if let Err(e) = empty.fire(OrderEvent::Pay).await {
        println!("  {e}");
    }
    println!("  can cancel: {}", empty.can(OrderEvent::Cancel, ()).await?);
    empty.fire(OrderEvent::Cancel).await?;

    println!("\n=== Example Complete ===");
    Ok(())
}
