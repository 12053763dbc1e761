//! Product code generation
//!
//! Builds the filename prefix the prepress hotfolder parses:
//!
//! ```text
//! <Order>-<Position>#<Customer>-<Product>#<Machine>_<PaperTag>_<Paper>#<Quantity>#D-<Paper>#
//! ```
//!
//! The layout is an external contract and must stay byte-for-byte stable.
//! Generation is a pure function of the form and the catalog.

use tracing::{debug, warn};

use crate::config::catalog::{Catalog, Category};
use crate::constants::naming::*;
use crate::constants::validation::{POSITION_MAX, POSITION_MIN};
use crate::form::{FormData, PaperClass};

/// Generate the product code, or an empty string while any field is missing
pub fn generate(form: &FormData, catalog: &Catalog) -> String {
    let missing = form.missing_fields();
    if !missing.is_empty() {
        debug!(missing = ?missing, "Product code incomplete");
        return String::new();
    }

    let order = normalize_order(&form.auftragsnummer);
    let position = form.auftragsposition.trim();
    check_position(position);
    let customer = sanitize_customer(&form.kunde);
    if customer.is_empty() {
        warn!(customer = %form.kunde, "Customer has no letters or digits usable in the code");
        return String::new();
    }
    let product = catalog.resolve_code(Category::Products, &form.produkt);
    let machine = catalog.resolve_code(Category::Machines, &form.maschine);
    let paper_tag = PaperClass::parse(&form.papierart).tag();
    let paper = catalog.resolve_code(Category::Papers, &form.papiername);
    let quantity = strip_thousands_separators(form.auflage.trim());

    format!(
        "{order}-{position}#{customer}-{product}#{machine}_{paper_tag}_{paper}#{quantity}#{PAPER_SEGMENT_PREFIX}{paper}#"
    )
}

/// Upper-case and make sure the order number starts with the order prefix
pub fn normalize_order(order: &str) -> String {
    let order = order.trim().to_uppercase();
    if order.starts_with(ORDER_PREFIX) {
        order
    } else {
        format!("{ORDER_PREFIX}{order}")
    }
}

/// Keep letters (umlauts and ß included) and digits, cut to the maximum length
pub fn sanitize_customer(customer: &str) -> String {
    customer
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || "äöüÄÖÜß".contains(*c))
        .take(CUSTOMER_MAX_CHARS)
        .collect()
}

/// Remove thousands separators. `.` and `,` only count as separators when every
/// group after the first has exactly three digits, so `1,5` is left alone.
pub fn strip_thousands_separators(quantity: &str) -> String {
    let grouped = quantity
        .split(THOUSANDS_SEPARATORS)
        .skip(1)
        .all(|group| group.len() == 3 && group.bytes().all(|b| b.is_ascii_digit()));
    quantity
        .chars()
        .filter(|c| !THOUSANDS_SEPARATORS.contains(c) || (!grouped && DECIMAL_MARKS.contains(c)))
        .collect()
}

/// Quantity as an integer, separators ignored
pub fn parse_quantity(quantity: &str) -> Option<u64> {
    strip_thousands_separators(quantity.trim()).parse().ok()
}

// The form limits positions to 0-999 but the code carries whatever was entered
fn check_position(position: &str) {
    match position.parse::<i64>() {
        Ok(value) if (POSITION_MIN..=POSITION_MAX).contains(&value) => {}
        _ => warn!(position = %position, "Order position outside {POSITION_MIN}-{POSITION_MAX}, emitting as entered"),
    }
}
