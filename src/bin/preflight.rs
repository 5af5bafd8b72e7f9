use catalog_admin::infra::config::{Config, StoreBackend};
use catalog_admin::infra::logging;
use catalog_admin::{CatalogService, Category, JsonFileStore, Product};

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: cargo run --bin preflight -- [--init-data-if-missing]\n\
         \n\
         Reads env vars (or .env):\n\
           STORE_BACKEND=file|rest|postgres (default file)\n\
           DATA_DIR (file), REMOTE_URL + REMOTE_API_KEY (rest), DATABASE_URL (postgres)\n\
           STORE_TIMEOUT_SECS (default 10)\n"
    );
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }
    let init_data_if_missing = args.iter().any(|a| a == "--init-data-if-missing");

    logging::init();

    let config = Config::from_env()?;

    println!("> Preflight:");
    println!("  STORE_BACKEND={}", config.backend.as_str());
    println!("  STORE_TIMEOUT_SECS={}", config.store_timeout.as_secs());
    match config.backend {
        StoreBackend::File => {
            println!("  DATA_DIR={}", config.data_dir.display());
            for path in [config.categories_path(), config.products_path()] {
                if path.exists() {
                    println!("  {} exists.", path.display());
                } else if init_data_if_missing {
                    println!("  {} missing -> writing an empty collection...", path.display());
                } else {
                    println!("  {} missing (treated as an empty collection).", path.display());
                }
            }
            if init_data_if_missing {
                JsonFileStore::<Category>::new(config.categories_path())
                    .init_if_missing()
                    .await?;
                JsonFileStore::<Product>::new(config.products_path())
                    .init_if_missing()
                    .await?;
            }
        }
        StoreBackend::Rest => {
            println!("  REMOTE_URL={}", config.remote_url.as_deref().unwrap_or_default());
        }
        StoreBackend::Postgres => {
            println!("  DATABASE_URL is set.");
        }
    }

    let catalog = CatalogService::from_config(&config).await?;

    // Basic connectivity
    catalog
        .ping()
        .await
        .map_err(|e| anyhow::anyhow!("Store is not reachable: {}", e))?;
    println!("  Store is reachable.");

    // Sample data, same check as reading one row from the products table.
    let products = catalog.products().list().await?;
    let categories = catalog.categories().list().await?;
    println!(
        "  Collections readable: {} categories, {} products.",
        categories.len(),
        products.len()
    );
    if let Some(sample) = products.first() {
        println!("  Sample product: {}", serde_json::to_string(sample)?);
    }

    println!("> Preflight OK.");
    Ok(())
}
