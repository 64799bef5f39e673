//! Plain-text rendering for the CLI.

use std::fmt::Write;

use mariam_core::{CartLine, CartTotals, PendingSale, Product};

use crate::checkout::CheckoutReceipt;

/// Formats an amount as currency, e.g. `$1,234.50`.
pub fn money(amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.abs();
    let whole = (cents / 100).to_string();

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

/// Quantity as shown to the user: whole pieces without decimals, bulk
/// quantities with up to three.
pub fn quantity(line: &CartLine) -> String {
    if line.is_bulk() || line.quantity.fract() != 0.0 {
        let text = format!("{:.3}", line.quantity);
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        format!("{}", line.quantity)
    }
}

/// The cart as a table followed by totals.
pub fn cart(lines: &[CartLine], totals: &CartTotals) -> String {
    if lines.is_empty() {
        return "Cart is empty\n".to_string();
    }

    let mut out = String::new();
    for line in lines {
        let key = match &line.presentation_id {
            Some(p) => format!("{}/{}", line.product_id, p),
            None => line.product_id.clone(),
        };
        let _ = writeln!(
            out,
            "{:<10} {:<32} {:>8} x {:>10} = {:>12}",
            key,
            line.display_name(),
            quantity(line),
            money(line.unit_price),
            money(line.total),
        );
    }

    let _ = writeln!(
        out,
        "{} line(s), {} item(s), total {}",
        totals.line_count,
        totals.item_count,
        money(totals.total)
    );
    out
}

pub fn pending_sales(sales: &[PendingSale]) -> String {
    if sales.is_empty() {
        return "No pending sales\n".to_string();
    }

    let mut out = String::new();
    for sale in sales {
        let _ = writeln!(
            out,
            "{:<8} {:<12} {:<24} {:>12}  {}",
            sale.id.as_deref().unwrap_or("-"),
            sale.code.as_deref().unwrap_or("-"),
            sale.client_name.as_deref().unwrap_or("-"),
            sale.total.map(money).unwrap_or_else(|| "-".to_string()),
            sale.created_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
        );
    }
    out
}

/// Search results: code, name, listing price and presentation count.
pub fn products(products: &[Product]) -> String {
    if products.is_empty() {
        return "No products found\n".to_string();
    }

    let mut out = String::new();
    for product in products {
        let _ = writeln!(
            out,
            "{:<16} {:<32} {:>12}  {}{}",
            product.code.as_deref().unwrap_or("-"),
            product.name,
            money(product.display_price()),
            product.sale_type(),
            match product.presentations.len() {
                0 => String::new(),
                n => format!(", {} presentation(s)", n),
            },
        );
    }
    out
}

pub fn receipt(receipt: &CheckoutReceipt) -> String {
    format!(
        "Sent to cashier: code {} for {} ({} line(s), {})\n",
        receipt.code,
        receipt.client_name,
        receipt.line_count,
        money(receipt.total)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use mariam_core::{Cart, NewCartLine, SaleType};

    #[test]
    fn test_money() {
        assert_eq!(money(0.0), "$0.00");
        assert_eq!(money(137.5), "$137.50");
        assert_eq!(money(1234567.891), "$1,234,567.89");
        assert_eq!(money(-12.0), "-$12.00");
    }

    #[test]
    fn test_quantity() {
        let piece = NewCartLine::new("1", "Goma", 3.0, 2.0).into_line();
        assert_eq!(quantity(&piece), "3");

        let bulk = NewCartLine::new("2", "Azúcar", 5.5, 25.0)
            .with_sale_type(SaleType::Granel)
            .into_line();
        assert_eq!(quantity(&bulk), "5.5");
    }

    #[test]
    fn test_cart_table() {
        let mut cart = Cart::new();
        cart.add_line(NewCartLine::new("12", "Cuaderno", 2.0, 35.0).with_presentation("3", "Pack"));
        let text = super::cart(cart.lines(), &CartTotals::from(&cart));

        assert!(text.contains("12/3"));
        assert!(text.contains("Cuaderno - Pack"));
        assert!(text.ends_with("1 line(s), 2 item(s), total $70.00\n"));

        assert_eq!(super::cart(&[], &CartTotals::from(&Cart::new())), "Cart is empty\n");
    }

    #[test]
    fn test_product_listing() {
        let found: Vec<Product> = serde_json::from_str(
            r#"[{"id": 8, "name": "Refresco", "price": 18, "code": "7501", "saleType": "Pieza",
                 "presentations": [{"id": 2, "name": "Six", "quantity": 6, "unitPrice": 99, "isDefault": true}]},
                {"id": 9, "name": "Azúcar", "price": 25, "saleType": "granel"}]"#,
        )
        .unwrap();
        let text = products(&found);
        let rows: Vec<&str> = text.lines().collect();

        assert!(rows[0].starts_with("7501"));
        assert!(rows[0].contains("$99.00"));
        assert!(rows[0].ends_with(", 1 presentation(s)"));
        assert!(rows[1].starts_with("-"));
        assert!(rows[1].contains("$25.00"));

        assert_eq!(products(&[]), "No products found\n");
    }
}
