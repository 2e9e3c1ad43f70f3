//! Bootstrap binary: loads the configuration, opens the store, reads the
//! static catalog, and prints the current shopping state. The interactive
//! surface lives elsewhere; this entry point exists to initialize the
//! database and to inspect state from a terminal.

use dotenvy::dotenv;
use std::{env, fs, path::Path};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tulista::app::{App, CurrentView};
use tulista::core::view::ViewRow;
use tulista::errors::{Error, Result};
use tulista::store::Store;
use tulista::{config, db};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Load the application configuration, with env overrides
    let config_path =
        env::var("TULISTA_CONFIG").unwrap_or_else(|_| "tulista.toml".to_owned());
    let mut app_config = config::load_config(&config_path)?;
    if let Ok(url) = env::var("DATABASE_URL") {
        app_config.database_url = url;
    }
    if let Ok(path) = env::var("TULISTA_CATALOG") {
        app_config.catalog_path = path;
    }
    info!("configuration loaded from {:?}", config_path);

    // 4. Initialize the database-backed store
    ensure_parent_dir(&app_config.database_url)?;
    let db = db::connect(&app_config.database_url)
        .await
        .inspect(|_| info!("database initialized successfully"))
        .inspect_err(|e| error!("failed to initialize database: {}", e))?;
    db::create_tables(&db).await?;
    let store = Store::new(db);

    // 5. Read the static catalog source; failure here is fatal
    let catalog_json =
        fs::read_to_string(&app_config.catalog_path).map_err(|e| Error::CatalogLoad {
            message: format!(
                "could not read catalog source {:?}: {e}",
                app_config.catalog_path
            ),
        })?;

    // 6. Build the application state and report it
    let app = App::load(store, &catalog_json, app_config.decrement_policy)
        .await
        .inspect_err(|e| error!("failed to load application state: {}", e))?;

    print_state(&app);
    Ok(())
}

/// Creates the directory holding a file-backed `SQLite` database, so a
/// first run does not fail on a missing `data/` folder.
fn ensure_parent_dir(database_url: &str) -> Result<()> {
    let Some(path) = database_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() || path.starts_with(':') {
        return Ok(()); // in-memory
    }
    if let Some(parent) = Path::new(path).parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn format_price(price: Option<f64>) -> String {
    price.map_or_else(|| "—".to_owned(), |p| format!("{p:.2} €"))
}

fn print_row(row: &ViewRow<'_>) {
    let mark = if row.checked { "x" } else { " " };
    println!(
        "  [{mark}] {:<24} {:>8}  x{}",
        row.product.name,
        format_price(row.price),
        row.qty
    );
}

fn print_state(app: &App) {
    let totals = app.totals();
    println!(
        "Marcados: {} · Unidades: {} · Total: {}",
        totals.marked,
        totals.units,
        format_price(Some(totals.total))
    );

    match app.current_view() {
        CurrentView::Catalog(rows) => {
            println!("— Catálogo ({} productos) —", rows.len());
            for row in &rows {
                print_row(row);
            }
        }
        CurrentView::Shopping(view) => {
            println!("— Pendientes —");
            for row in &view.pending {
                print_row(row);
            }
            println!("— En el carro —");
            for row in &view.purchased {
                print_row(row);
            }
        }
    }
}
