//! Cart commands.
//!
//! Wires the configured inventory client, file storage and tracing notifier
//! into a [`CartContext`], runs one operation and prints the cart.

use shoecart::config::CartConfig;
use shoecart::inventory::{HttpInventoryClient, InventoryError};
use shoecart::notify::TracingNotifier;
use shoecart::storage::FileStorage;
use shoecart::{CartContext, CartStore, UpdateProductAmount};
use shoecart_core::{Cart, ProductId};
use thiserror::Error;

/// Errors that stop a command before it reaches the cart.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Failed to create inventory client: {0}")]
    Inventory(#[from] InventoryError),
    #[error("Failed to render cart: {0}")]
    Render(#[from] serde_json::Error),
}

/// A single cart operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartCommand {
    Show,
    Add(ProductId),
    Remove(ProductId),
    Update { product_id: ProductId, amount: i64 },
}

/// Run `command` against the configured cart and print the result.
///
/// Returns `Ok(false)` when the operation failed and a notification was
/// reported.
///
/// # Errors
///
/// Returns error if the inventory client cannot be built or the cart cannot
/// be rendered.
pub async fn run(command: CartCommand, config: &CartConfig) -> Result<bool, CommandError> {
    let inventory = HttpInventoryClient::new(&config.inventory)?;
    let storage = FileStorage::new(&config.storage_path);
    let store = CartStore::load(inventory, storage, config.storage_key.as_str());
    let mut context = CartContext::new(store, TracingNotifier);

    let succeeded = match command {
        CartCommand::Show => true,
        CartCommand::Add(product_id) => context.add_product(product_id).await,
        CartCommand::Remove(product_id) => context.remove_product(product_id),
        CartCommand::Update { product_id, amount } => {
            context
                .update_product_amount(UpdateProductAmount { product_id, amount })
                .await
        }
    };

    tracing::info!(
        items = context.cart().len(),
        quantity = context.cart().total_quantity(),
        total = %context.cart().total(),
        "Cart ready"
    );
    print_cart(context.cart())?;
    Ok(succeeded)
}

#[allow(clippy::print_stdout)] // Printing the cart is the command's output
fn print_cart(cart: &Cart) -> Result<(), serde_json::Error> {
    println!("{}", render_cart(cart)?);
    Ok(())
}

fn render_cart(cart: &Cart) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(cart)
}
