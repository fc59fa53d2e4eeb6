//! # Command Shell
//!
//! Line-oriented front end for the cashier. Each line is parsed into a
//! [`Command`], executed against the session, and rendered as text.
//!
//! ```text
//! > add TEA-100 6
//! Order 1 · walk-in · Take Away
//!   TEA-100   B-01      Tea                    6 x 10.00          60.00
//!   ...
//! > pay cash 100
//! Invoice INV-0042 paid (cash) · total Rs. 64.80 · change Rs. 35.20
//! > qty TEA-100 B-01 9999
//! ! [INSUFFICIENT_STOCK] Insufficient stock for TEA-100 (batch B-01): ...
//! ```
//!
//! Errors are printed with a leading `!` and the shell keeps reading.

use std::io::{self, Write};
use std::str::FromStr;

use payshia_core::{Fulfillment, Money, PaymentMethod, ProductVariant};
use payshia_erp::CheckoutReceipt;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use crate::commands::{self, CartResponse, OrderSummary, SelectionResponse};
use crate::error::ApiError;
use crate::state::{ConfigState, ErpState, SessionState};

const HELP: &str = "\
Orders
  orders                         list open orders
  new                            start a new order (current one is kept)
  select <n|id>                  resume an order
  park                           park the current order and start a new one
  clear                          discard the current order
Items
  catalog [query]                search products
  stock <sku>                    open an item and show its batches
  batch <code>                   pick another batch for the open item
  confirm <qty> [discount]       add the open item to the order
  cancel                         close the open item
  add <sku> <qty> [discount]     open, take the first batch, confirm
  qty <sku> <batch> <n>          change a line's quantity (0 removes)
  rm <sku> <batch>               remove a line
Order details
  discount <amount>              order discount
  service <amount>               service charge
  customer <id>                  set the customer
  type takeaway|delivery|dinein [table] [steward]
  totals                         show the current order
Checkout
  pay <cash|card|credit> [tendered]
  hold                           save as a pending invoice
Other
  help
  quit";

/// One parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Catalog(String),
    Orders,
    New,
    Select(String),
    Park,
    Clear,
    Stock(String),
    Batch(String),
    Confirm { quantity: i64, discount: Money },
    Cancel,
    Add { sku: String, quantity: i64, discount: Money },
    Quantity { sku: String, batch: String, quantity: i64 },
    Remove { sku: String, batch: String },
    Discount(Money),
    Service(Money),
    Customer(String),
    Type(Fulfillment),
    Totals,
    Pay { method: PaymentMethod, tendered: Option<Money> },
    Hold,
    Quit,
}

impl FromStr for Command {
    type Err = ApiError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let name = words.next().unwrap_or_default().to_lowercase();
        let args: Vec<&str> = words.collect();

        let command = match name.as_str() {
            "help" | "?" => Command::Help,
            "catalog" | "search" => Command::Catalog(args.join(" ")),
            "orders" => Command::Orders,
            "new" => Command::New,
            "select" => Command::Select(arg(&args, 0, "order")?.to_string()),
            "park" => Command::Park,
            "clear" => Command::Clear,
            "stock" => Command::Stock(arg(&args, 0, "sku")?.to_string()),
            "batch" => Command::Batch(arg(&args, 0, "batch code")?.to_string()),
            "confirm" => Command::Confirm {
                quantity: parse_quantity(arg(&args, 0, "quantity")?)?,
                discount: optional_amount(&args, 1)?.unwrap_or_default(),
            },
            "cancel" => Command::Cancel,
            "add" => Command::Add {
                sku: arg(&args, 0, "sku")?.to_string(),
                quantity: parse_quantity(arg(&args, 1, "quantity")?)?,
                discount: optional_amount(&args, 2)?.unwrap_or_default(),
            },
            "qty" => Command::Quantity {
                sku: arg(&args, 0, "sku")?.to_string(),
                batch: arg(&args, 1, "batch code")?.to_string(),
                quantity: parse_quantity(arg(&args, 2, "quantity")?)?,
            },
            "rm" | "remove" => Command::Remove {
                sku: arg(&args, 0, "sku")?.to_string(),
                batch: arg(&args, 1, "batch code")?.to_string(),
            },
            "discount" => Command::Discount(Money::parse_decimal(arg(&args, 0, "amount")?)?),
            "service" => Command::Service(Money::parse_decimal(arg(&args, 0, "amount")?)?),
            "customer" => Command::Customer(arg(&args, 0, "customer id")?.to_string()),
            "type" => Command::Type(parse_fulfillment(&args)?),
            "totals" | "cart" => Command::Totals,
            "pay" => Command::Pay {
                method: PaymentMethod::from_str(arg(&args, 0, "payment method")?)?,
                tendered: optional_amount(&args, 1)?,
            },
            "hold" => Command::Hold,
            "quit" | "exit" => Command::Quit,
            other => {
                return Err(ApiError::validation(format!(
                    "Unknown command '{}', type 'help'",
                    other
                )))
            }
        };
        Ok(command)
    }
}

fn arg<'a>(args: &[&'a str], index: usize, what: &str) -> Result<&'a str, ApiError> {
    args.get(index)
        .copied()
        .ok_or_else(|| ApiError::validation(format!("Missing {}", what)))
}

fn optional_amount(args: &[&str], index: usize) -> Result<Option<Money>, ApiError> {
    match args.get(index) {
        Some(raw) => Ok(Some(Money::parse_decimal(raw)?)),
        None => Ok(None),
    }
}

fn parse_quantity(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::validation(format!("'{}' is not a whole quantity", raw)))
}

fn parse_fulfillment(args: &[&str]) -> Result<Fulfillment, ApiError> {
    let kind = arg(args, 0, "order type")?.to_lowercase();
    match kind.as_str() {
        "takeaway" | "take_away" => Ok(Fulfillment::TakeAway),
        "delivery" => Ok(Fulfillment::Delivery),
        "dinein" | "dine_in" => Ok(Fulfillment::DineIn {
            table: args.get(1).map(|s| s.to_string()),
            steward: args.get(2).map(|s| s.to_string()),
        }),
        other => Err(ApiError::validation(format!(
            "Unknown order type '{}' (takeaway, delivery, dinein)",
            other
        ))),
    }
}

/// Whether the shell should keep reading after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Shell<'a> {
    session: &'a SessionState,
    erp: &'a ErpState,
    config: &'a ConfigState,
}

impl<'a> Shell<'a> {
    pub fn new(session: &'a SessionState, erp: &'a ErpState, config: &'a ConfigState) -> Self {
        Shell {
            session,
            erp,
            config,
        }
    }

    /// Reads commands until end of input or `quit`.
    pub async fn run<R, W>(&self, reader: R, out: &mut W) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        writeln!(
            out,
            "{} · {} products · type 'help' for commands",
            self.config.store_name,
            self.erp.catalog().len()
        )?;

        let mut lines = reader.lines();
        loop {
            write!(out, "> ")?;
            out.flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            if self.handle_line(&line, out).await? == Flow::Quit {
                break;
            }
        }
        Ok(())
    }

    /// Parses, executes and renders one line.
    pub async fn handle_line<W: Write>(&self, line: &str, out: &mut W) -> io::Result<Flow> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Flow::Continue);
        }

        let result = match line.parse::<Command>() {
            Ok(Command::Quit) => return Ok(Flow::Quit),
            Ok(command) => self.execute(command).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(text) => writeln!(out, "{}", text)?,
            Err(e) => {
                debug!(code = e.code.as_str(), "Command failed");
                writeln!(out, "! {}", e)?
            }
        }
        Ok(Flow::Continue)
    }

    /// Runs a command and renders its response.
    pub async fn execute(&self, command: Command) -> Result<String, ApiError> {
        let (session, erp) = (self.session, self.erp);
        let text = match command {
            Command::Help => HELP.to_string(),
            Command::Catalog(query) => self.render_catalog(&commands::catalog::search_catalog(erp, &query)?),
            Command::Orders => self.render_orders(&commands::order::list_orders(session, erp)?),
            Command::New => self.render_cart(&commands::order::new_order(session, erp)?),
            Command::Select(key) => self.render_cart(&commands::order::select_order(session, erp, &key)?),
            Command::Park => {
                let parked = commands::order::park_order(session, erp)?;
                format!(
                    "Parked {}\n{}",
                    parked.parked.name,
                    self.render_cart(&parked.cart)
                )
            }
            Command::Clear => {
                let cleared = commands::order::clear_order(session, erp)?;
                format!("Cleared {}\n{}", cleared.cleared, self.render_cart(&cleared.cart))
            }
            Command::Stock(key) => {
                self.render_selection(&commands::stock::open_item(session, erp, &key).await?)
            }
            Command::Batch(code) => {
                self.render_selection(&commands::stock::select_batch(session, &code)?)
            }
            Command::Confirm { quantity, discount } => {
                self.render_cart(&commands::stock::confirm_item(session, erp, quantity, discount)?)
            }
            Command::Cancel => {
                commands::stock::cancel_item(session);
                "Item closed".to_string()
            }
            Command::Add {
                sku,
                quantity,
                discount,
            } => self.render_cart(
                &commands::stock::add_item(session, erp, &sku, quantity, discount).await?,
            ),
            Command::Quantity {
                sku,
                batch,
                quantity,
            } => self.render_cart(&commands::cart::update_quantity(
                session, erp, &sku, &batch, quantity,
            )?),
            Command::Remove { sku, batch } => {
                self.render_cart(&commands::cart::remove_item(session, erp, &sku, &batch)?)
            }
            Command::Discount(amount) => {
                self.render_cart(&commands::cart::set_order_discount(session, erp, amount)?)
            }
            Command::Service(amount) => {
                self.render_cart(&commands::cart::set_service_charge(session, erp, amount)?)
            }
            Command::Customer(id) => {
                self.render_cart(&commands::cart::set_customer(session, erp, &id)?)
            }
            Command::Type(fulfillment) => {
                self.render_cart(&commands::cart::set_fulfillment(session, erp, fulfillment)?)
            }
            Command::Totals => self.render_cart(&commands::cart::get_cart(session, erp)?),
            Command::Pay { method, tendered } => {
                self.render_receipt(&commands::checkout::pay(session, erp, method, tendered).await?)
            }
            Command::Hold => self.render_receipt(&commands::checkout::hold(session, erp).await?),
            Command::Quit => String::new(),
        };
        Ok(text)
    }

    fn money(&self, amount: Money) -> String {
        self.config.format_currency(amount)
    }

    fn render_catalog(&self, variants: &[ProductVariant]) -> String {
        if variants.is_empty() {
            return "No products found".to_string();
        }
        variants
            .iter()
            .map(|v| format!("  {:<12} {:<30} {:>12}", v.sku, v.name, self.money(v.unit_price)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render_orders(&self, orders: &[OrderSummary]) -> String {
        orders
            .iter()
            .map(|o| {
                format!(
                    "{} {:<10} {:>3} lines {:>5} items {:>12}  {} · {}",
                    if o.current { "*" } else { " " },
                    o.name,
                    o.line_count,
                    o.total_quantity,
                    self.money(o.total),
                    o.customer_id,
                    o.fulfillment
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render_cart(&self, cart: &CartResponse) -> String {
        let mut text = format!(
            "{} · {} · {}\n",
            cart.order_name, cart.customer_id, cart.fulfillment
        );

        if cart.lines.is_empty() {
            text.push_str("  (no items)\n");
        }
        for line in &cart.lines {
            text.push_str(&format!(
                "  {:<10} {:<10} {:<22} {:>4} x {:>10} {:>10} {:>12}\n",
                line.sku,
                line.batch_code,
                line.name,
                line.quantity,
                line.unit_price,
                if line.discount.is_zero() {
                    String::new()
                } else {
                    format!("-{}", line.discount)
                },
                line.net()
            ));
        }

        let t = &cart.totals;
        let rows = [
            ("Subtotal", t.subtotal),
            ("Item discounts", -t.item_discounts),
            ("Tax", t.tax),
            ("Service charge", t.service_charge),
            ("Order discount", -t.order_discount),
        ];
        for (label, amount) in rows {
            if !amount.is_zero() || label == "Subtotal" {
                text.push_str(&format!("  {:<16} {:>14}\n", label, self.money(amount)));
            }
        }
        text.push_str(&format!("  {:<16} {:>14}", "Total", self.money(t.total)));
        text
    }

    fn render_selection(&self, selection: &SelectionResponse) -> String {
        let mut text = format!(
            "{} {} @ {} · {} in stock\n",
            selection.sku,
            selection.name,
            self.money(selection.unit_price),
            selection.total_stock
        );

        if let Some(reason) = &selection.stock_error {
            text.push_str(&format!("  stock unavailable: {}\n", reason));
        }
        if selection.batches.is_empty() {
            text.push_str("  no batches on hand");
            return text;
        }

        let rows: Vec<String> = selection
            .batches
            .iter()
            .map(|b| {
                let marker = if selection.selected_batch.as_deref() == Some(b.batch_code.as_str()) {
                    "*"
                } else {
                    " "
                };
                let expiry = b
                    .expiry_date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".to_string());
                format!("{} {:<12} exp {:<10} {:>6}", marker, b.batch_code, expiry, b.quantity)
            })
            .collect();
        text.push_str(&rows.join("\n"));
        text
    }

    fn render_receipt(&self, receipt: &CheckoutReceipt) -> String {
        let mut text = match receipt.payment_method {
            Some(method) => format!(
                "Invoice {} paid ({}) · total {} · tendered {} · change {}",
                receipt.invoice_number,
                method,
                self.money(receipt.totals.total),
                self.money(receipt.tendered),
                self.money(receipt.change)
            ),
            None => format!(
                "Invoice {} held as pending · total {}",
                receipt.invoice_number,
                self.money(receipt.totals.total)
            ),
        };
        if let Some(url) = &receipt.print_url {
            text.push_str(&format!("\nPrint: {}", url));
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add_with_discount() {
        let command: Command = "add TEA-100 6 1.50".parse().unwrap();
        assert_eq!(
            command,
            Command::Add {
                sku: "TEA-100".into(),
                quantity: 6,
                discount: Money::from_cents(150),
            }
        );
    }

    #[test]
    fn test_parse_confirm_defaults_discount() {
        let command: Command = "confirm 2".parse().unwrap();
        assert_eq!(
            command,
            Command::Confirm {
                quantity: 2,
                discount: Money::zero(),
            }
        );
    }

    #[test]
    fn test_parse_pay() {
        let command: Command = "PAY cash 5000".parse().unwrap();
        assert_eq!(
            command,
            Command::Pay {
                method: PaymentMethod::Cash,
                tendered: Some(Money::from_cents(500_000)),
            }
        );

        let command: Command = "pay card".parse().unwrap();
        assert_eq!(
            command,
            Command::Pay {
                method: PaymentMethod::Card,
                tendered: None,
            }
        );
    }

    #[test]
    fn test_parse_dine_in() {
        let command: Command = "type dinein T4 S2".parse().unwrap();
        assert_eq!(
            command,
            Command::Type(Fulfillment::DineIn {
                table: Some("T4".into()),
                steward: Some("S2".into()),
            })
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!("qty TEA-100 B-01".parse::<Command>().is_err());
        assert!("qty TEA-100 B-01 two".parse::<Command>().is_err());
        assert!("pay bitcoin".parse::<Command>().is_err());
        assert!("discount abc".parse::<Command>().is_err());
        assert!("teleport".parse::<Command>().is_err());
    }
}
