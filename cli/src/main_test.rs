use kedai::net::Role;

use super::*;

fn coupon_fields(args: &[&str]) -> (String, CouponFields) {
    let argv = ["kedai", "coupons", "update"].iter().chain(args);
    match Cli::try_parse_from(argv).unwrap().command {
        Command::Coupons(CouponCommand { command: CouponSubcommand::Update { id, fields } }) => (id, fields),
        other => panic!("unexpected command: {other:?}"),
    }
}

fn stored_coupon_form() -> CouponInput {
    CouponInput {
        kupon_type: CouponType::PotonganRupiah,
        code: "HEMAT5".to_owned(),
        jumlah: 40,
        minimal_pembelian: 50_000,
        potongan: Some(5_000),
        kategori: Some("Minuman".to_owned()),
        ..CouponInput::default()
    }
}

#[test]
fn server_down_with_saved_token_is_not_a_login_prompt() {
    let session = Session::signed_out();
    assert!(matches!(denial(&session, true), CliError::ServerUnavailable));
}

#[test]
fn no_saved_token_asks_for_login() {
    let session = Session::signed_out();
    assert!(matches!(denial(&session, false), CliError::LoginRequired { route: "/login" }));
}

#[test]
fn reachable_server_without_user_asks_for_login() {
    let session = Session { api_reachable: true, ..Session::signed_out() };
    assert!(matches!(denial(&session, true), CliError::LoginRequired { .. }));
}

#[test]
fn coupon_update_keeps_unset_fields() {
    let (id, fields) = coupon_fields(&["5", "--code", "HEMAT10"]);
    assert_eq!(id, "5");

    let input = fields.apply(stored_coupon_form());

    assert_eq!(input.code, "HEMAT10");
    assert_eq!(input.kupon_type, CouponType::PotonganRupiah);
    assert_eq!(input.jumlah, 40);
    assert_eq!(input.minimal_pembelian, 50_000);
    assert_eq!(input.potongan, Some(5_000));
    assert_eq!(input.kategori.as_deref(), Some("Minuman"));
}

#[test]
fn coupon_update_overrides_given_fields() {
    let (_, fields) = coupon_fields(&["5", "--type", "diskon", "--potongan", "15", "--jumlah", "3"]);

    let input = fields.apply(stored_coupon_form());

    assert_eq!(input.kupon_type, CouponType::Diskon);
    assert_eq!(input.potongan, Some(15));
    assert_eq!(input.jumlah, 3);
    assert_eq!(input.code, "HEMAT5");
}

#[test]
fn coupon_create_starts_from_form_defaults() {
    let argv = ["kedai", "coupons", "create", "--code", "BARU", "--potongan", "10"];
    let Command::Coupons(CouponCommand { command: CouponSubcommand::Create(fields) }) =
        Cli::try_parse_from(argv).unwrap().command
    else {
        panic!("expected coupons create");
    };

    let input = fields.apply(CouponInput::default());

    assert_eq!(input.kupon_type, CouponType::Diskon);
    assert_eq!(input.jumlah, 1);
    assert!(input.validate().is_ok());
}

#[test]
fn employee_update_never_resends_old_password() {
    let current = EmployeeInput::from_employee(&kedai::resources::employees::Employee {
        id: "2".to_owned(),
        username: "sari".to_owned(),
        nama: "Sari".to_owned(),
        role: Role::Staff,
    });
    let fields = EmployeeFields { nama: None, username: None, password: None, role: Some("admin".to_owned()) };

    let input = fields.apply(current);

    assert_eq!(input.role, Role::Admin);
    assert_eq!(input.password, None);
    assert_eq!(input.nama, "Sari");
}
