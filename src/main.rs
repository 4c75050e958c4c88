use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::Duration;
use restaurant_pos::{
    build_floor, AppError, Clock, Fulfillment, InMemoryCatalog, ItemStatus, KitchenService,
    KitchenTicket, Order, PaymentMethod, PosConfig, Priority, Product, ProductCatalog,
    RegisterService, Station, SystemClock,
};
use uuid::Uuid;

fn product(
    name: &str,
    price: &str,
    barcode: &str,
    category: &str,
    stock: u32,
) -> Result<Product, AppError> {
    let unit_price = BigDecimal::from_str(price)
        .map_err(|e| AppError::Config(format!("bad seed price '{}': {}", price, e)))?;
    Ok(Product {
        product_id: Uuid::new_v4(),
        name: name.to_string(),
        barcode: barcode.to_string(),
        unit_price,
        category: category.to_string(),
        stock_level: stock,
    })
}

fn seed_catalog() -> Result<InMemoryCatalog, AppError> {
    Ok(InMemoryCatalog::new(vec![
        product("Margherita Pizza", "16.99", "1234567890123", "pizza", 25)?,
        product("Caesar Salad", "12.49", "1234567890124", "salads", 30)?,
        product("Grilled Chicken", "18.99", "1234567890125", "mains", 20)?,
        product("Fish & Chips", "15.99", "1234567890126", "mains", 18)?,
        product("Chocolate Cake", "7.99", "1234567890127", "desserts", 15)?,
        product("Coca-Cola", "3.99", "1234567890128", "beverages", 50)?,
        product("BBQ Burger", "14.99", "1234567890129", "burgers", 22)?,
        product("Pasta Carbonara", "16.49", "1234567890130", "pasta", 20)?,
        product("French Fries", "5.99", "1234567890131", "sides", 40)?,
        product("Tiramisu", "8.99", "1234567890132", "desserts", 12)?,
    ]))
}

fn find_id(catalog: &InMemoryCatalog, term: &str) -> Result<Uuid, AppError> {
    catalog
        .search(term, None)
        .first()
        .map(|p| p.product_id)
        .ok_or_else(|| AppError::Config(format!("seed catalog has no '{}'", term)))
}

fn main() -> Result<(), AppError> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = PosConfig::from_env()?;
    let clock = SystemClock;
    let catalog = seed_catalog()?;
    log::info!(
        "Catalog loaded: {} products in {} categories, tax rate {}",
        catalog.products().len(),
        catalog.categories().len(),
        config.tax_rate
    );

    let pizza = find_id(&catalog, "margherita")?;
    let cola = find_id(&catalog, "coca-cola")?;
    let cake = find_id(&catalog, "chocolate cake")?;
    let fries = find_id(&catalog, "french fries")?;

    let mut kitchen = KitchenService::new(catalog.clone());
    let mut register = RegisterService::new(catalog);
    let mut floor = build_floor(
        &config,
        &[(1, 2), (2, 4), (3, 6), (4, 2), (5, 4), (6, 8), (7, 2), (8, 4)],
    )?;

    // Counter takeout sale.
    let mut takeout = Order::new(config.tax_rate.clone());
    register.add_product(&mut takeout, pizza, 2)?;
    register.add_product(&mut takeout, cola, 1)?;
    takeout.apply_discount(BigDecimal::from(10))?;
    let shown = takeout.compute_totals().rounded();
    log::info!(
        "Takeout: subtotal {} discount {} tax {} total {}",
        shown.subtotal,
        shown.discount_amount,
        shown.tax,
        shown.total
    );
    let pickup = Fulfillment::takeout("John Smith", "555-0101")?.with_instructions("Extra napkins");
    let takeout_ticket = kitchen.submit(
        KitchenTicket::from_order(&takeout, &pickup, clock.now()).with_priority(Priority::High),
    );
    register.checkout(&mut takeout, PaymentMethod::Card, clock.now())?;

    // Delivery that the customer cancels after paying.
    let mut delivery = Order::new(config.tax_rate.clone());
    register.add_product(&mut delivery, fries, 3)?;
    let drop_off = Fulfillment::delivery("Emma Wilson", "555-0102", "12 Elm St")?;
    kitchen.submit(KitchenTicket::from_order(&delivery, &drop_off, clock.now()));
    let refunded = register.checkout(&mut delivery, PaymentMethod::Digital, clock.now())?;
    register.refund(refunded.id, clock.now())?;

    // Dine-in service at table 5.
    let now = clock.now();
    floor.reserve(3, "Sarah Johnson", 4, now + Duration::minutes(30), now)?;
    floor.seat(5, "Mike Davis", 3, Some("Bob"), now)?;
    floor.begin_ordering(5)?;
    {
        let order = floor.order_mut(5)?;
        register.add_product(order, pizza, 1)?;
        register.add_product(order, cake, 2)?;
        order.set_note(pizza, "Extra cheese")?;
    }
    let ticket = kitchen.submit(floor.send_order_to_kitchen(5, clock.now())?);
    log::info!(
        "Pizza station: {} tickets",
        kitchen.queue(Some(Station::Pizza)).len()
    );
    for id in [pizza, cake] {
        kitchen.advance_item(ticket, id, ItemStatus::Preparing)?;
        kitchen.advance_item(ticket, id, ItemStatus::Ready)?;
    }
    for id in [pizza, cola] {
        kitchen.advance_item(takeout_ticket, id, ItemStatus::Preparing)?;
        kitchen.advance_item(takeout_ticket, id, ItemStatus::Ready)?;
    }
    for id in [ticket, takeout_ticket] {
        kitchen.bump(id)?;
    }
    log::info!(
        "Kitchen: {}",
        serde_json::to_string(&kitchen.summary(&clock)).unwrap_or_default()
    );

    for card in floor.board(&clock) {
        log::info!(
            "Table {} ({} seats): {} {}",
            card.number,
            card.capacity,
            card.status,
            card.elapsed_label.unwrap_or_default()
        );
    }

    floor.request_bill(5)?;
    let receipt = floor.complete_checkout(5)?;
    register.record_receipt(receipt, PaymentMethod::Cash, clock.now());
    floor.mark_clean(5)?;

    let counts = floor.status_counts();
    log::info!("Floor: {:?}", counts);
    let summary = register.summary().rounded();
    log::info!(
        "Sales: {}",
        serde_json::to_string(&summary).unwrap_or_default()
    );

    Ok(())
}
