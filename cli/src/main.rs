mod render;

#[cfg(test)]
#[path = "main_test.rs"]
mod main_test;

use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use kedai::guard::{self, Access};
use kedai::net::gateway::roster_entries;
use kedai::net::{AuthGateway, NetError, ReqwestTransport};
use kedai::resources::coupons::{self, CouponInput, CouponType};
use kedai::resources::employees::{self, EmployeeInput};
use kedai::resources::products::{self, ProductInput};
use kedai::resources::{ApiClient, ResourceError, dashboard, orders, users};
use kedai::session::{FileStorage, Session, SessionOptions, SessionStore};
use kedai::{AuthError, Config, ConfigError};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("could not build HTTP client: {0}")]
    Client(NetError),
    #[error("{0}")]
    Auth(#[from] AuthError),
    #[error("not signed in; run `kedai login` first (redirect: {route})")]
    LoginRequired { route: &'static str },
    #[error("API server unreachable; the saved session was kept, try again later")]
    ServerUnavailable,
    #[error("session expired; run `kedai login` again")]
    SessionExpired,
    #[error("no token available; set KEDAI_API_TOKEN or log in first")]
    MissingToken,
    #[error("{0}")]
    Resource(ResourceError),
    #[error("API server unreachable: {0}")]
    Unreachable(NetError),
    #[error("server returned HTTP {status}: {message}")]
    Api { status: u16, message: String },
    #[error("could not read password: {0}")]
    Io(#[from] io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "kedai", about = "Kedai staff administration CLI")]
struct Cli {
    /// Overrides KEDAI_API_URL.
    #[arg(long)]
    api_url: Option<String>,

    /// Overrides KEDAI_STATE_DIR.
    #[arg(long)]
    state_dir: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        username: String,
        /// Read from stdin when omitted.
        #[arg(long, env = "KEDAI_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    Logout,
    Status,
    /// Staff accounts available for login.
    Accounts,
    Dashboard,
    Users(ListOnly),
    Products(ProductCommand),
    Coupons(CouponCommand),
    Employees(EmployeeCommand),
    Orders(OrderCommand),
}

#[derive(Args, Debug)]
struct ListOnly {
    #[command(subcommand)]
    command: ListSubcommand,
}

#[derive(Subcommand, Debug)]
enum ListSubcommand {
    List,
}

#[derive(Args, Debug)]
struct ProductCommand {
    #[command(subcommand)]
    command: ProductSubcommand,
}

#[derive(Subcommand, Debug)]
enum ProductSubcommand {
    List,
    Create(ProductFields),
    Update {
        id: String,
        #[command(flatten)]
        fields: ProductFields,
    },
    Delete {
        id: String,
    },
}

/// Unset flags keep the current value on update.
#[derive(Args, Debug)]
struct ProductFields {
    #[arg(long)]
    judul: Option<String>,
    #[arg(long)]
    kategori: Option<String>,
    #[arg(long)]
    harga: Option<i64>,
    #[arg(long)]
    point: Option<i64>,
    #[arg(long)]
    stock: Option<i64>,
    #[arg(long)]
    gambar: Option<String>,
    #[arg(long)]
    deskripsi: Option<String>,
}

impl ProductFields {
    fn apply(self, mut input: ProductInput) -> ProductInput {
        if let Some(v) = self.judul {
            input.judul = v;
        }
        if let Some(v) = self.kategori {
            input.kategori = v;
        }
        if let Some(v) = self.harga {
            input.harga = v;
        }
        if let Some(v) = self.point {
            input.point = v;
        }
        if let Some(v) = self.stock {
            input.stock = v;
        }
        if self.gambar.is_some() {
            input.gambar = self.gambar;
        }
        if self.deskripsi.is_some() {
            input.deskripsi = self.deskripsi;
        }
        input
    }
}

#[derive(Args, Debug)]
struct CouponCommand {
    #[command(subcommand)]
    command: CouponSubcommand,
}

#[derive(Subcommand, Debug)]
enum CouponSubcommand {
    List {
        /// Filter by code, type, description, or category.
        #[arg(long, default_value = "")]
        search: String,
    },
    Create(CouponFields),
    Update {
        id: String,
        #[command(flatten)]
        fields: CouponFields,
    },
    /// Delete one or more coupons.
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

/// Unset flags keep the current value on update and the form default on create.
#[derive(Args, Debug)]
struct CouponFields {
    #[arg(long = "type")]
    kupon_type: Option<CouponType>,
    #[arg(long)]
    code: Option<String>,
    #[arg(long)]
    jumlah: Option<i64>,
    #[arg(long)]
    minimal_pembelian: Option<i64>,
    #[arg(long)]
    potongan: Option<i64>,
    #[arg(long)]
    insentif: Option<String>,
    #[arg(long)]
    deskripsi: Option<String>,
    #[arg(long)]
    kategori: Option<String>,
    #[arg(long)]
    free_item_sku: Option<String>,
    #[arg(long)]
    free_item_qty: Option<i64>,
}

impl CouponFields {
    fn apply(self, mut input: CouponInput) -> CouponInput {
        if let Some(v) = self.kupon_type {
            input.kupon_type = v;
        }
        if let Some(v) = self.code {
            input.code = v;
        }
        if let Some(v) = self.jumlah {
            input.jumlah = v;
        }
        if let Some(v) = self.minimal_pembelian {
            input.minimal_pembelian = v;
        }
        for (field, value) in [
            (&mut input.insentif, self.insentif),
            (&mut input.deskripsi, self.deskripsi),
            (&mut input.kategori, self.kategori),
            (&mut input.free_item_sku, self.free_item_sku),
        ] {
            if value.is_some() {
                *field = value;
            }
        }
        if self.potongan.is_some() {
            input.potongan = self.potongan;
        }
        if self.free_item_qty.is_some() {
            input.free_item_qty = self.free_item_qty;
        }
        input
    }
}

#[derive(Args, Debug)]
struct EmployeeCommand {
    #[command(subcommand)]
    command: EmployeeSubcommand,
}

#[derive(Subcommand, Debug)]
enum EmployeeSubcommand {
    List,
    Create(EmployeeFields),
    Update {
        id: String,
        #[command(flatten)]
        fields: EmployeeFields,
    },
    Delete {
        id: String,
    },
}

/// Unset flags keep the current value on update; the password is only
/// changed when given.
#[derive(Args, Debug)]
struct EmployeeFields {
    #[arg(long)]
    nama: Option<String>,
    #[arg(long)]
    username: Option<String>,
    #[arg(long)]
    password: Option<String>,
    /// `admin` or `karyawan`.
    #[arg(long)]
    role: Option<String>,
}

impl EmployeeFields {
    fn apply(self, mut input: EmployeeInput) -> EmployeeInput {
        if let Some(v) = self.nama {
            input.nama = v;
        }
        if let Some(v) = self.username {
            input.username = v;
        }
        if let Some(v) = self.role {
            input.role = kedai::net::Role::from_wire(&v);
        }
        input.password = self.password;
        input
    }
}

#[derive(Args, Debug)]
struct OrderCommand {
    #[command(subcommand)]
    command: OrderSubcommand,
}

#[derive(Subcommand, Debug)]
enum OrderSubcommand {
    List {
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is normal.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = Config::from_env()?;
    if let Some(url) = cli.api_url {
        config.api_url = kedai::config::normalize_base_url(&url);
    }
    if let Some(dir) = cli.state_dir {
        config.state_dir = dir;
    }

    let transport = ReqwestTransport::from_config(&config).map_err(CliError::Client)?;
    let storage = Arc::new(FileStorage::new(config.state_dir.clone()));
    let mut store = SessionStore::new(AuthGateway::new(Arc::new(transport)), storage, SessionOptions::from(&config));
    tracing::debug!(api_url = %config.api_url, state_dir = %config.state_dir.display(), "starting");

    match cli.command {
        Command::Login { username, password } => run_login(&mut store, &username, password).await,
        Command::Logout => {
            store.logout();
            println!("Logged out.");
            Ok(())
        }
        Command::Status => {
            let session = store.initialize().await;
            print!("{}", render::status(&config.api_url, session));
            Ok(())
        }
        Command::Accounts => run_accounts(&store).await,
        command => {
            let client = authorized(&mut store).await?;
            let result = run_protected(&client, command).await;
            settle(&mut store, result)
        }
    }
}

async fn run_login(store: &mut SessionStore, username: &str, password: Option<String>) -> Result<(), CliError> {
    let password = match password {
        Some(p) => p,
        None => prompt_password()?,
    };
    let success = store.login(username, &password).await?;
    println!("{}", success.message);
    println!("{} (@{}, {})", success.user.display_name, success.user.username, success.user.role);
    Ok(())
}

fn prompt_password() -> Result<String, CliError> {
    eprint!("Password: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}

async fn run_accounts(store: &SessionStore) -> Result<(), CliError> {
    let token = store.stored_token().ok_or(CliError::MissingToken)?;
    let response = store.gateway().fetch_roster(&token).await.map_err(CliError::Unreachable)?;
    if !response.is_success() {
        return Err(CliError::Api { status: response.status, message: response.message() });
    }
    print!("{}", render::roster(&roster_entries(response.body.as_ref())));
    Ok(())
}

/// Validate the stored session and pass the route guard.
async fn authorized(store: &mut SessionStore) -> Result<ApiClient, CliError> {
    let access = guard::check(store.initialize().await);
    match access {
        Access::Granted => Ok(ApiClient::new(store.gateway().transport(), store.token())),
        Access::Pending | Access::Denied => Err(denial(store.session(), store.stored_token().is_some())),
    }
}

/// A signed-out session with a kept token means the API could not be reached,
/// not that the credentials are bad.
fn denial(session: &Session, has_stored_token: bool) -> CliError {
    if !session.api_reachable && has_stored_token {
        CliError::ServerUnavailable
    } else {
        CliError::LoginRequired { route: guard::redirect_target(Access::Denied).unwrap_or(guard::LOGIN_ROUTE) }
    }
}

/// A 401 from any screen ends the session.
fn settle(store: &mut SessionStore, result: Result<(), ResourceError>) -> Result<(), CliError> {
    match result {
        Ok(()) => Ok(()),
        Err(ResourceError::Unauthorized) => {
            store.revoke();
            Err(CliError::SessionExpired)
        }
        Err(e) => Err(CliError::Resource(e)),
    }
}

async fn run_protected(client: &ApiClient, command: Command) -> Result<(), ResourceError> {
    match command {
        Command::Dashboard => print!("{}", render::dashboard(&dashboard::summary(client).await?)),
        Command::Users(_) => print!("{}", render::users(&users::list(client).await?)),
        Command::Products(cmd) => run_products(client, cmd.command).await?,
        Command::Coupons(cmd) => run_coupons(client, cmd.command).await?,
        Command::Employees(cmd) => run_employees(client, cmd.command).await?,
        Command::Orders(OrderCommand { command: OrderSubcommand::List { page } }) => {
            let list = orders::list(client).await?;
            print!("{}", render::orders_page(&orders::page(&list, page)));
        }
        Command::Login { .. } | Command::Logout | Command::Status | Command::Accounts => {}
    }
    Ok(())
}

async fn run_products(client: &ApiClient, command: ProductSubcommand) -> Result<(), ResourceError> {
    match command {
        ProductSubcommand::List => print!("{}", render::catalog(&products::list(client).await?)),
        ProductSubcommand::Create(fields) => {
            products::create(client, &fields.apply(ProductInput::default())).await?;
            println!("Product created.");
        }
        ProductSubcommand::Update { id, fields } => {
            let catalog = products::list(client).await?;
            let current = catalog
                .values()
                .flatten()
                .find(|p| p.id == id)
                .ok_or_else(|| ResourceError::NotFound { kind: "product", id: id.clone() })?;
            products::update(client, &id, &fields.apply(ProductInput::from_product(current))).await?;
            println!("Product {id} updated.");
        }
        ProductSubcommand::Delete { id } => {
            products::delete(client, &id).await?;
            println!("Product {id} deleted.");
        }
    }
    Ok(())
}

async fn run_coupons(client: &ApiClient, command: CouponSubcommand) -> Result<(), ResourceError> {
    match command {
        CouponSubcommand::List { search } => {
            let list: Vec<_> = coupons::list(client).await?.into_iter().filter(|c| c.matches(&search)).collect();
            print!("{}", render::coupons(&list));
        }
        CouponSubcommand::Create(fields) => {
            coupons::create(client, &fields.apply(CouponInput::default())).await?;
            println!("Coupon created.");
        }
        CouponSubcommand::Update { id, fields } => {
            let list = coupons::list(client).await?;
            let mut current = list
                .into_iter()
                .find(|c| c.id == id)
                .ok_or_else(|| ResourceError::NotFound { kind: "coupon", id: id.clone() })?;
            if let Some(kind) = fields.kupon_type {
                current.kupon_type = kind.as_str().to_owned();
            }
            let input = fields.apply(CouponInput::from_coupon(&current)?);
            coupons::update(client, &id, &input).await?;
            println!("Coupon {id} updated.");
        }
        CouponSubcommand::Delete { ids } => {
            coupons::delete(client, &ids).await?;
            println!("Deleted {} coupon(s).", ids.len());
        }
    }
    Ok(())
}

async fn run_employees(client: &ApiClient, command: EmployeeSubcommand) -> Result<(), ResourceError> {
    match command {
        EmployeeSubcommand::List => print!("{}", render::employees(&employees::list(client).await?)),
        EmployeeSubcommand::Create(fields) => {
            employees::create(client, &fields.apply(EmployeeInput::default())).await?;
            println!("Employee created.");
        }
        EmployeeSubcommand::Update { id, fields } => {
            let roster = employees::list(client).await?;
            let current = roster
                .iter()
                .find(|e| e.id == id)
                .ok_or_else(|| ResourceError::NotFound { kind: "employee", id: id.clone() })?;
            employees::update(client, &id, &fields.apply(EmployeeInput::from_employee(current))).await?;
            println!("Employee {id} updated.");
        }
        EmployeeSubcommand::Delete { id } => {
            employees::delete(client, &id).await?;
            println!("Employee {id} deleted.");
        }
    }
    Ok(())
}
