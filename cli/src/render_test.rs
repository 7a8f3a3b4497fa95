use kedai::resources::orders;
use kedai::session::UserProfile;
use serde_json::json;

use super::*;

fn order() -> Order {
    serde_json::from_value(json!({
        "id": 12,
        "tanggal": "2024-08-17 10:00",
        "data": [{"id": 1, "nama": "Es Teh", "quantity": 2, "harga": 5000, "keterangan": "less sugar"}],
        "total_harga": 10000,
        "total_setelah_kupon": 8000,
        "kupon": {"code": "HEMAT", "keterangan": "Promo kemerdekaan"}
    }))
    .unwrap()
}

#[test]
fn table_aligns_columns() {
    let out = table(&["ID", "NAMA"], &[vec!["1".to_owned(), "Sari".to_owned()], vec!["10".to_owned(), "Jo".to_owned()]]);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "ID  NAMA");
    assert_eq!(lines[1], "--  ----");
    assert_eq!(lines[2], "1   Sari");
    assert_eq!(lines[3], "10  Jo");
}

#[test]
fn receipt_shows_rupiah_discount() {
    let out = receipt(&order());
    assert!(out.contains("Order #12  2024-08-17 10:00"));
    assert!(out.contains("Es Teh  2 x Rp 5.000 = Rp 10.000"));
    assert!(out.contains("less sugar"));
    assert!(out.contains("Kupon (HEMAT)  -Rp 2.000"));
    assert!(out.contains("Total  Rp 8.000"));
    assert!(out.contains("Promo kemerdekaan"));
}

#[test]
fn receipt_shows_percentage_coupon() {
    let mut o = order();
    if let Some(k) = o.kupon.as_mut() {
        k.potongan = Some(20);
    }
    assert!(receipt(&o).contains("Kupon (HEMAT)  -20%"));
}

#[test]
fn orders_page_footer() {
    let list: Vec<Order> = (0..11).map(|_| order()).collect();
    let out = orders_page(&orders::page(&list, 2));
    assert!(out.ends_with("Showing 10-11 of 11 orders. Page 2 / 2\n"));
    assert_eq!(orders_page(&orders::page(&[], 1)), "No orders.\n");
}

#[test]
fn dashboard_marks_missing_counts() {
    let summary = Summary { users: Some(3), products: None, ..Summary::default() };
    let out = dashboard(&summary);
    assert!(out.contains("Users      3"));
    assert!(out.contains("Products   -"));
}

#[test]
fn roster_lists_handles_and_admin_count() {
    let list: Vec<Employee> = serde_json::from_value(json!([
        {"id": 1, "username": "jay", "nama": "Jay", "role": "admin"},
        {"id": 2, "username": "sari", "nama": "Sari", "role": "karyawan"}
    ]))
    .unwrap();
    let out = roster(&list);
    assert!(out.starts_with("2 accounts, 1 admin\n"));
    assert!(out.contains("Sari  @sari  (karyawan)"));
}

#[test]
fn status_reports_user() {
    let mut session = Session::signed_out();
    assert!(status("https://api.test", &session).contains("Signed in: no"));

    session.api_reachable = true;
    session.user = Some(UserProfile::new("1".to_owned(), "jay", "Jay", kedai::net::Role::Admin));
    let out = status("https://api.test", &session);
    assert!(out.contains("Reachable: yes"));
    assert!(out.contains("Signed in: Jay (@jay, admin)"));
}

#[test]
fn users_table_is_numbered() {
    let list: Vec<User> = serde_json::from_value(json!([{"id": 7, "nama": "Budi"}])).unwrap();
    let out = users(&list);
    assert!(out.lines().nth(2).unwrap().starts_with("1  7   Budi  -"));
}
