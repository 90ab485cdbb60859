//! Afiliado CLI - Shopee Affiliate API tools.
//!
//! # Usage
//!
//! ```bash
//! # Check credentials and connectivity
//! afiliado test-connection
//!
//! # Search product offers by keyword, highest commission first
//! afiliado products --keyword "fone bluetooth" --limit 10
//!
//! # Official shops sorted by popularity
//! afiliado shops --shop-type official --sort popular
//!
//! # Generate an affiliate short link with tracking sub IDs
//! afiliado short-link https://shopee.com.br/product/123/456 --sub-id telegram
//!
//! # Every conversion in a purchase time range
//! afiliado conversions --from 1704067200 --to 1706745599
//! ```
//!
//! Results are written to stdout as JSON. Logs go to stderr; set `RUST_LOG`
//! to adjust verbosity and `AFILIADO_LOG_JSON=1` for JSON log lines.
//!
//! # Environment Variables
//!
//! See [`afiliado_shopee::config`] for the Shopee settings. Additionally:
//!
//! - `SENTRY_DSN` - Report errors to Sentry (optional)
//! - `SENTRY_ENVIRONMENT` - Sentry environment name (optional)

#![cfg_attr(not(test), forbid(unsafe_code))]

use afiliado_core::{
    CategoryId, ItemId, OfferSortType, ProductSortType, ShopId, ShopSortType, ShopType,
};
use afiliado_shopee::{RateLimited, ShopeeClient, ShopeeConfig};
use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "afiliado")]
#[command(author, version, about = "Shopee Affiliate API tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a signed introspection query to check credentials
    TestConnection,
    /// Search product offers (productOfferV2)
    Products {
        /// Search keyword
        #[arg(short, long)]
        keyword: Option<String>,

        /// Only products from this shop
        #[arg(long)]
        shop_id: Option<ShopId>,

        /// A single item
        #[arg(long)]
        item_id: Option<ItemId>,

        /// Product category ID
        #[arg(long)]
        category: Option<CategoryId>,

        /// Sort order (`relevance`, `sales`, `price_desc`, `price_asc`, `commission`)
        #[arg(short, long)]
        sort: Option<ProductSortType>,

        #[arg(short, long, default_value_t = 1)]
        page: u32,

        #[arg(short, long, default_value_t = 20)]
        limit: u32,

        /// Only offers with extra seller commission
        #[arg(long)]
        ams: bool,

        /// Only key sellers
        #[arg(long)]
        key_seller: bool,
    },
    /// Search shop offers (shopOfferV2)
    Shops {
        #[arg(short, long)]
        keyword: Option<String>,

        #[arg(long)]
        shop_id: Option<ShopId>,

        /// Shop type filter, repeatable (`official`, `preferred`, `preferred_plus`)
        #[arg(long = "shop-type")]
        shop_types: Vec<ShopType>,

        /// Sort order (`latest`, `commission`, `popular`)
        #[arg(short, long)]
        sort: Option<ShopSortType>,

        #[arg(short, long, default_value_t = 1)]
        page: u32,

        #[arg(short, long, default_value_t = 10)]
        limit: u32,

        /// Only key sellers
        #[arg(long)]
        key_seller: bool,
    },
    /// Search Shopee campaign and collection offers (shopeeOfferV2)
    Offers {
        #[arg(short, long)]
        keyword: Option<String>,

        /// Sort order (`latest`, `commission`)
        #[arg(short, long)]
        sort: Option<OfferSortType>,

        #[arg(short, long, default_value_t = 1)]
        page: u32,

        #[arg(short, long, default_value_t = 10)]
        limit: u32,
    },
    /// Generate an affiliate short link
    ShortLink {
        /// Shopee product or shop URL
        url: String,

        /// Tracking sub ID, repeatable (at most 5 are sent)
        #[arg(long = "sub-id")]
        sub_ids: Vec<String>,
    },
    /// Fetch every conversion in a purchase time range
    Conversions {
        /// Range start (unix seconds)
        #[arg(long)]
        from: i64,

        /// Range end (unix seconds)
        #[arg(long)]
        to: i64,

        /// Stop after this many pages (0 for no limit)
        #[arg(long)]
        max_pages: Option<u32>,

        /// Pause between pages in milliseconds
        #[arg(long, default_value_t = 1000)]
        delay_ms: u64,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry() -> Option<sentry::ClientInitGuard> {
    let dsn = std::env::var("SENTRY_DSN").ok().filter(|v| !v.is_empty())?;

    let guard = sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: std::env::var("SENTRY_ENVIRONMENT")
                .ok()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Map tracing levels to Sentry: errors and warnings become events, the rest
/// breadcrumbs.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "afiliado_shopee=info,afiliado_cli=info".into());

    // Logs go to stderr so stdout stays valid JSON
    let json_logs = std::env::var("AFILIADO_LOG_JSON").is_ok();
    let json_layer = json_logs.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer =
        (!json_logs).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    // Load .env before Sentry so SENTRY_DSN can live there too
    let _ = dotenvy::dotenv();

    let sentry_guard = init_sentry();
    init_tracing();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        drop(sentry_guard);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = ShopeeConfig::from_env()?;
    let api = RateLimited::from_config(ShopeeClient::new(&config), &config);

    api.inner().connect().await?;
    let result = dispatch(&api, cli.command).await;
    api.inner().close().await;

    commands::log_rate_status(&api.status());
    result
}

async fn dispatch(
    api: &RateLimited<ShopeeClient>,
    command: Commands,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::TestConnection => commands::connection::test(api).await?,
        Commands::Products {
            keyword,
            shop_id,
            item_id,
            category,
            sort,
            page,
            limit,
            ams,
            key_seller,
        } => {
            let mut search = afiliado_shopee::ProductSearch::new()
                .sort_type(sort.unwrap_or_default())
                .page(page)
                .limit(limit);
            if let Some(keyword) = keyword {
                search = search.keyword(keyword);
            }
            if let Some(shop_id) = shop_id {
                search = search.shop_id(shop_id);
            }
            if let Some(item_id) = item_id {
                search = search.item_id(item_id);
            }
            if let Some(category) = category {
                search = search.category(category);
            }
            if ams {
                search = search.ams_offer(true);
            }
            if key_seller {
                search = search.key_seller(true);
            }
            commands::offers::products(api, &search).await?;
        }
        Commands::Shops {
            keyword,
            shop_id,
            shop_types,
            sort,
            page,
            limit,
            key_seller,
        } => {
            let mut search = afiliado_shopee::ShopSearch::new()
                .sort_type(sort.unwrap_or_default())
                .page(page)
                .limit(limit);
            if let Some(keyword) = keyword {
                search = search.keyword(keyword);
            }
            if let Some(shop_id) = shop_id {
                search = search.shop_id(shop_id);
            }
            for shop_type in shop_types {
                search = search.shop_type(shop_type);
            }
            if key_seller {
                search = search.key_seller(true);
            }
            commands::offers::shops(api, &search).await?;
        }
        Commands::Offers {
            keyword,
            sort,
            page,
            limit,
        } => {
            let mut search = afiliado_shopee::OfferSearch::new()
                .sort_type(sort.unwrap_or_default())
                .page(page)
                .limit(limit);
            if let Some(keyword) = keyword {
                search = search.keyword(keyword);
            }
            commands::offers::offers(api, &search).await?;
        }
        Commands::ShortLink { url, sub_ids } => {
            commands::short_link::generate(api, &url, sub_ids).await?;
        }
        Commands::Conversions {
            from,
            to,
            max_pages,
            delay_ms,
        } => {
            commands::conversions::fetch_all(api, from, to, max_pages, delay_ms).await?;
        }
    }
    Ok(())
}
