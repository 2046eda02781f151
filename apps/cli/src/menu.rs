//! # Interactive Menu
//!
//! The numbered menu loop and its prompt helpers. Every handler follows
//! the same shape: gather input, abort on the first invalid value with a
//! printed message, call one `App` operation, render the outcome. No
//! state survives between menu round-trips.

use std::io::{self, Write};

use tracing::debug;

use crate::app::App;
use crate::error::AppResult;
use crate::render;
use stockroom_core::{Money, OrderLine, ProductPatch};

const AUDIT_HISTORY_LIMIT: usize = 10;
const DB_HISTORY_LIMIT: i64 = 50;

/// Runs the menu loop until the user exits.
pub async fn run(app: &App) -> AppResult<()> {
    println!("\nWelcome to Stockroom!");

    loop {
        print_menu();
        let choice = prompt("\nEnter your choice (1-9): ")?;

        let outcome = match choice.as_str() {
            "1" => view_products(app).await,
            "2" => add_product(app).await,
            "3" => update_product(app).await,
            "4" => view_customers(app).await,
            "5" => add_customer(app).await,
            "6" => make_purchase(app).await,
            "7" => view_purchase_history(app).await,
            "8" => view_audit_history(app),
            "9" => {
                app.db().close().await;
                println!("\nExiting Stockroom. Goodbye!");
                return Ok(());
            }
            other => {
                debug!(choice = %other, "Invalid menu choice");
                println!("\nInvalid choice. Please try again.");
                Ok(())
            }
        };

        if let Err(e) = outcome {
            println!("\nError: {e}");
        }

        prompt("\nPress Enter to continue...")?;
    }
}

fn print_menu() {
    println!();
    println!("{}", "=".repeat(50));
    println!("                    STOCKROOM                     ");
    println!("{}", "=".repeat(50));
    println!("1. View Products");
    println!("2. Add Product");
    println!("3. Update Product");
    println!("4. View Customers");
    println!("5. Add Customer");
    println!("6. Make Purchase");
    println!("7. View Purchase History");
    println!("8. View Audit Purchase History");
    println!("9. Exit");
    println!("{}", "=".repeat(50));
}

// =============================================================================
// Handlers
// =============================================================================

async fn view_products(app: &App) -> AppResult<()> {
    let products = app.list_products().await?;

    if products.is_empty() {
        println!("\nNo products found in inventory.");
    } else {
        println!("\n{}", render::product_table(&products));
    }

    Ok(())
}

async fn add_product(app: &App) -> AppResult<()> {
    println!("\n=== Add New Product ===");

    let name = prompt_io("Enter product name: ")?;
    if name.is_empty() {
        println!("Product name cannot be empty.");
        return Ok(());
    }

    // UX shortcut; the unique constraint still decides on races.
    if app.db().products().get_by_name(&name).await?.is_some() {
        println!("A product with name '{name}' already exists.");
        return Ok(());
    }

    let price: Money = match prompt_io("Enter price: $")?.parse() {
        Ok(price) => price,
        Err(e) => {
            println!("{e}");
            return Ok(());
        }
    };

    let quantity: i64 = match prompt_io("Enter quantity: ")?.parse() {
        Ok(quantity) => quantity,
        Err(_) => {
            println!("Invalid input. Quantity must be an integer.");
            return Ok(());
        }
    };

    let category = optional(prompt_io("Enter category (optional): ")?);

    let product = app
        .add_product(&name, price, quantity, category.as_deref())
        .await?;
    println!("\nProduct '{}' added successfully (id {}).", product.name, product.id);

    Ok(())
}

async fn update_product(app: &App) -> AppResult<()> {
    view_products(app).await?;

    let id: i64 = match prompt_io("\nEnter product ID to update: ")?.parse() {
        Ok(id) => id,
        Err(_) => {
            println!("Invalid input. ID must be an integer.");
            return Ok(());
        }
    };

    let Some(current) = app.db().products().get_by_id(id).await? else {
        println!("No product found with ID {id}.");
        return Ok(());
    };

    println!("\nUpdating product: {}", current.name);
    println!("(Press Enter to keep current value)");

    let name = optional(prompt_io(&format!("Name [{}]: ", current.name))?);
    let price_input = optional(prompt_io(&format!("Price [{}]: ", current.price()))?);
    let quantity_input = optional(prompt_io(&format!("Quantity [{}]: ", current.quantity))?);
    let category = optional(prompt_io(&format!(
        "Category [{}]: ",
        current.category.as_deref().unwrap_or("None")
    ))?);

    let price: Option<Money> = match price_input.map(|p| p.parse()).transpose() {
        Ok(price) => price,
        Err(e) => {
            println!("{e}");
            return Ok(());
        }
    };

    let quantity: Option<i64> = match quantity_input.map(|q| q.parse()).transpose() {
        Ok(quantity) => quantity,
        Err(_) => {
            println!("Invalid input. Quantity must be an integer.");
            return Ok(());
        }
    };

    let patch = ProductPatch {
        name,
        price,
        quantity,
        category,
    };

    if patch.is_empty() {
        println!("Nothing to update.");
        return Ok(());
    }

    let (product, change) = app.update_product_audited(id, patch).await?;
    println!("\nProduct #{} updated successfully.", product.id);
    if let Some(change) = change {
        println!("Stock: {} -> {}", change.previous, change.current);
    }

    Ok(())
}

async fn view_customers(app: &App) -> AppResult<()> {
    let customers = app.list_customers().await?;

    if customers.is_empty() {
        println!("\nNo customers found.");
    } else {
        println!("\n{}", render::customer_table(&customers));
    }

    Ok(())
}

async fn add_customer(app: &App) -> AppResult<()> {
    println!("\n=== Add New Customer ===");

    let name = prompt_io("Enter customer name: ")?;
    if name.is_empty() {
        println!("Customer name cannot be empty.");
        return Ok(());
    }

    let email = optional(prompt_io("Enter email (optional): ")?);
    let phone = optional(prompt_io("Enter phone (optional): ")?);

    if let Some(email) = &email {
        if app.db().customers().get_by_email(email).await?.is_some() {
            println!("A customer with email '{email}' already exists.");
            return Ok(());
        }
    }

    let customer = app
        .add_customer(&name, email.as_deref(), phone.as_deref())
        .await?;
    println!(
        "\nCustomer '{}' added successfully (id {}).",
        customer.name, customer.id
    );

    Ok(())
}

async fn make_purchase(app: &App) -> AppResult<()> {
    view_customers(app).await?;

    let customer_id: i64 = match prompt_io("\nEnter customer ID (0 for anonymous): ")?.parse() {
        Ok(id) => id,
        Err(_) => {
            println!("Invalid input. ID must be an integer.");
            return Ok(());
        }
    };

    let customer_id = if customer_id == 0 {
        None
    } else {
        let Some(customer) = app.db().customers().get_by_id(customer_id).await? else {
            println!("No customer found with ID {customer_id}.");
            return Ok(());
        };
        println!("Purchasing as {}.", customer.name);
        Some(customer.id)
    };

    view_products(app).await?;

    println!("\n=== Add Products to Purchase ===");
    println!("(Enter 0 for product ID to finish)");

    let mut lines: Vec<OrderLine> = Vec::new();
    loop {
        let product_id: i64 = match prompt_io("\nEnter product ID: ")?.parse() {
            Ok(id) => id,
            Err(_) => {
                println!("Invalid input. ID must be an integer.");
                continue;
            }
        };
        if product_id == 0 {
            break;
        }

        let Some(product) = app.db().products().get_by_id(product_id).await? else {
            println!("No product found with ID {product_id}.");
            continue;
        };

        let quantity: i64 = match prompt_io(&format!(
            "Enter quantity for {} (available: {}): ",
            product.name, product.quantity
        ))?
        .parse()
        {
            Ok(quantity) => quantity,
            Err(_) => {
                println!("Invalid input. Quantity must be an integer.");
                continue;
            }
        };

        if quantity <= 0 {
            println!("Quantity must be positive.");
            continue;
        }
        if !product.can_deduct(quantity) {
            println!("Error: Only {} units available.", product.quantity);
            continue;
        }

        lines.push(OrderLine {
            product_id,
            quantity,
        });
        println!("Added {} x {} to cart.", quantity, product.name);
    }

    if lines.is_empty() {
        println!("Purchase cancelled - no items selected.");
        return Ok(());
    }

    let receipt = app.make_purchase(customer_id, &lines).await?;
    println!(
        "\nPurchase completed successfully! Purchase ID: {}, total {}.",
        receipt.purchase_id, receipt.total
    );
    for line in &receipt.lines {
        println!("  {} x{} @ {}", line.product, line.quantity, line.unit_price);
    }

    Ok(())
}

async fn view_purchase_history(app: &App) -> AppResult<()> {
    let purchases = app.purchase_history(DB_HISTORY_LIMIT).await?;

    if purchases.is_empty() {
        println!("\nNo purchase history found.");
        return Ok(());
    }

    println!("\n{}", render::purchase_table(&purchases));

    let purchase_id: i64 =
        match prompt_io("\nEnter purchase ID to view details (0 to cancel): ")?.parse() {
            Ok(id) => id,
            Err(_) => {
                println!("Invalid input. ID must be an integer.");
                return Ok(());
            }
        };
    if purchase_id == 0 {
        return Ok(());
    }

    let items = app.purchase_items(purchase_id).await?;
    if items.is_empty() {
        println!("No items found for purchase #{purchase_id}.");
    } else {
        println!("\n{}", render::item_table(&items));
    }

    Ok(())
}

fn view_audit_history(app: &App) -> AppResult<()> {
    let history = app.audit_purchase_history(AUDIT_HISTORY_LIMIT)?;

    if history.is_empty() {
        println!("\nNo audit purchase history found.");
        return Ok(());
    }

    for (i, entry) in history.iter().enumerate() {
        println!("\n{}. {}", i + 1, entry.trim_end());
    }

    Ok(())
}

// =============================================================================
// Prompt Helpers
// =============================================================================

/// Reads one trimmed line from stdin after printing `label`.
fn prompt(label: &str) -> io::Result<String> {
    print!("{label}");
    io::stdout().flush()?;

    let mut buffer = String::new();
    io::stdin().read_line(&mut buffer)?;
    Ok(buffer.trim().to_string())
}

/// `prompt` lifted into the shell's error type.
fn prompt_io(label: &str) -> AppResult<String> {
    Ok(prompt(label)?)
}

/// Empty input becomes `None` ("keep current" / "skip optional field").
fn optional(input: String) -> Option<String> {
    if input.is_empty() {
        None
    } else {
        Some(input)
    }
}
