//! Plain-text rendering for terminal output.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::fmt::Write as _;

use kedai::resources::coupons::Coupon;
use kedai::resources::dashboard::Summary;
use kedai::resources::employees::{self, Employee};
use kedai::resources::orders::{Order, Page, format_idr};
use kedai::resources::products::Catalog;
use kedai::resources::users::User;
use kedai::session::Session;

/// Left-aligned columns separated by two spaces.
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let mut out = String::new();
    let header: Vec<String> = headers.iter().map(|h| (*h).to_owned()).collect();
    push_row(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, &rule, &widths);
    for row in rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let mut line = String::new();
    for (i, width) in widths.iter().enumerate() {
        let cell = cells.get(i).map_or("", String::as_str);
        if i > 0 {
            line.push_str("  ");
        }
        line.push_str(cell);
        line.extend(std::iter::repeat_n(' ', width.saturating_sub(cell.chars().count())));
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

fn or_dash(value: Option<&str>) -> String {
    value.filter(|v| !v.trim().is_empty()).unwrap_or("-").to_owned()
}

pub fn users(list: &[User]) -> String {
    if list.is_empty() {
        return "No users.\n".to_owned();
    }
    let rows: Vec<Vec<String>> = list
        .iter()
        .enumerate()
        .map(|(i, u)| vec![(i + 1).to_string(), u.id.clone(), u.nama.clone(), or_dash(u.email.as_deref())])
        .collect();
    table(&["#", "ID", "NAMA", "EMAIL"], &rows)
}

pub fn catalog(catalog: &Catalog) -> String {
    if catalog.is_empty() {
        return "No products.\n".to_owned();
    }
    let mut out = String::new();
    for (category, products) in catalog {
        let _ = writeln!(out, "== {category} ({}) ==", products.len());
        if products.is_empty() {
            out.push_str("(empty)\n\n");
            continue;
        }
        let rows: Vec<Vec<String>> = products
            .iter()
            .map(|p| {
                vec![p.id.clone(), p.judul.clone(), format_idr(p.harga), p.point.to_string(), p.stock.to_string()]
            })
            .collect();
        out.push_str(&table(&["ID", "JUDUL", "HARGA", "POINT", "STOCK"], &rows));
        out.push('\n');
    }
    out
}

pub fn coupons(list: &[Coupon]) -> String {
    if list.is_empty() {
        return "No coupons.\n".to_owned();
    }
    let rows: Vec<Vec<String>> = list
        .iter()
        .map(|c| {
            vec![
                c.id.clone(),
                c.code.clone(),
                c.kupon_type.clone(),
                c.potongan.map_or_else(|| "-".to_owned(), |p| p.to_string()),
                c.jumlah.to_string(),
                format_idr(c.minimal_pembelian),
                or_dash(c.deskripsi.as_deref()),
            ]
        })
        .collect();
    table(&["ID", "CODE", "TYPE", "POTONGAN", "JUMLAH", "MIN. BELANJA", "DESKRIPSI"], &rows)
}

pub fn employees(list: &[Employee]) -> String {
    if list.is_empty() {
        return "No employees.\n".to_owned();
    }
    let rows: Vec<Vec<String>> = list
        .iter()
        .map(|e| vec![e.id.clone(), e.nama.clone(), e.username.clone(), e.role.to_string()])
        .collect();
    table(&["ID", "NAMA", "USERNAME", "ROLE"], &rows)
}

/// Account picker shown before login.
pub fn roster(list: &[Employee]) -> String {
    let mut out = format!("{} accounts, {} admin\n", list.len(), employees::admin_count(list));
    for e in list {
        let _ = writeln!(out, "  {}  @{}  ({})", e.nama, e.username, e.role);
    }
    out
}

pub fn receipt(order: &Order) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Order #{}  {}", order.id, order.tanggal.as_deref().unwrap_or("-"));
    for item in &order.data {
        let _ = writeln!(
            out,
            "  {}  {} x {} = {}",
            item.nama,
            item.quantity,
            format_idr(item.harga),
            format_idr(item.line_total())
        );
        if let Some(note) = item.keterangan.as_deref().filter(|n| !n.trim().is_empty()) {
            let _ = writeln!(out, "    {note}");
        }
    }
    let _ = writeln!(out, "  Subtotal  {}", format_idr(order.subtotal()));
    if let Some(kupon) = &order.kupon {
        let cut = match kupon.potongan {
            Some(percent) if percent > 0 => format!("-{percent}%"),
            _ => format!("-{}", format_idr(order.discount())),
        };
        let _ = writeln!(out, "  Kupon ({})  {cut}", kupon.label());
    }
    let _ = writeln!(out, "  Total  {}", format_idr(order.after_coupon()));
    if let Some(note) = order.kupon.as_ref().and_then(|k| k.keterangan.as_deref()) {
        let _ = writeln!(out, "  {note}");
    }
    out
}

pub fn orders_page(page: &Page<'_>) -> String {
    if page.total == 0 {
        return "No orders.\n".to_owned();
    }
    let mut out = String::new();
    for order in page.orders {
        out.push_str(&receipt(order));
        out.push('\n');
    }
    let _ = writeln!(
        out,
        "Showing {}-{} of {} orders. Page {} / {}",
        page.start + 1,
        page.start + page.orders.len(),
        page.total,
        page.number,
        page.pages
    );
    out
}

pub fn dashboard(summary: &Summary) -> String {
    let count = |n: Option<usize>| n.map_or_else(|| "-".to_owned(), |n| n.to_string());
    let rows = vec![
        vec!["Users".to_owned(), count(summary.users)],
        vec!["Products".to_owned(), count(summary.products)],
        vec!["Coupons".to_owned(), count(summary.coupons)],
        vec!["Employees".to_owned(), count(summary.employees)],
        vec!["Orders".to_owned(), count(summary.orders)],
    ];
    table(&["SCREEN", "COUNT"], &rows)
}

pub fn status(api_url: &str, session: &Session) -> String {
    let mut out = format!("API: {api_url}\n");
    let _ = writeln!(out, "Reachable: {}", if session.api_reachable { "yes" } else { "no" });
    match &session.user {
        Some(user) => {
            let _ = writeln!(out, "Signed in: {} (@{}, {})", user.display_name, user.username, user.role);
        }
        None => out.push_str("Signed in: no\n"),
    }
    out
}
