//! `catalog`: terminal front end for the catalog API

mod cli;
mod render;

use anyhow::Context as _;
use catalog_client::{
    ApiError, CatalogApi, CategoryId, ClientConfig, HttpCatalogClient, ProductFilter, ProductId,
};
use catalog_store::{CatalogContext, CategoryDraft, FetchOutcome, Notice, Severity, StoreConfig};
use clap::ArgMatches;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    init_tracing();
    let matches = cli::build().get_matches();
    let json = matches.get_flag("json");

    let context = match build_context(&matches) {
        Ok(context) => context,
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(2);
        }
    };
    let mut notices = context.notifier().subscribe();

    let result = match matches.subcommand() {
        Some(("categories", args)) => categories(&context, args, json).await,
        Some(("products", args)) => products(&context, args, json).await,
        _ => Ok(()),
    };

    let reported = flush_notices(&mut notices);
    if let Err(err) = result {
        report_failure(&err, reported);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn build_context(matches: &ArgMatches) -> anyhow::Result<CatalogContext> {
    let config = client_config(matches)?;
    let store_config = StoreConfig::from_env().context("invalid store configuration")?;
    let client = HttpCatalogClient::new(&config).context("failed to build catalog client")?;
    tracing::debug!(base_url = client.base_url(), "catalog client ready");

    let api: Arc<dyn CatalogApi> = Arc::new(client);
    Ok(CatalogContext::new(api, store_config))
}

/// Environment first, then command line flags
fn client_config(matches: &ArgMatches) -> anyhow::Result<ClientConfig> {
    let mut config = ClientConfig::from_env().context("invalid client configuration")?;
    if let Some(base_url) = matches.get_one::<String>("base-url") {
        config = config.with_base_url(base_url.as_str());
    }
    if let Some(api_key) = matches.get_one::<String>("api-key") {
        config = config.with_api_key(api_key.as_str());
    }
    if let Some(secs) = matches.get_one::<u64>("timeout") {
        config = config.with_timeout_secs(*secs);
    }
    config.validate().context("invalid client configuration")?;
    Ok(config)
}

async fn categories(context: &CatalogContext, args: &ArgMatches, json: bool) -> anyhow::Result<()> {
    let view = context.category_view();

    match args.subcommand() {
        Some(("list", _)) => {
            settled(view.mount().await)?;
            let categories = view.categories();
            if json {
                print_json(&categories)?;
            } else {
                print!("{}", render::categories(&categories));
            }
        }
        Some(("get", args)) => {
            let category = context.api().get_category(CategoryId(cli::id(args))).await?;
            if json {
                print_json(&category)?;
            } else {
                print!("{}", render::categories(std::slice::from_ref(&category)));
            }
        }
        Some(("create", args)) => {
            let draft = CategoryDraft::new(string_arg(args, "name").unwrap_or_default())
                .with_description(string_arg(args, "description").unwrap_or_default());
            let created = view.submit(None, &draft).await?;
            if json {
                print_json(&created)?;
            } else {
                println!("Created category {} ({})", created.id, created.name);
            }
        }
        Some(("update", args)) => {
            let id = CategoryId(cli::id(args));
            let current = context.api().get_category(id).await?;
            let mut draft = CategoryDraft::from_category(&current);
            if let Some(name) = string_arg(args, "name") {
                draft.name = name;
            }
            if let Some(description) = string_arg(args, "description") {
                draft.description = description;
            }
            let updated = view.submit(Some(id), &draft).await?;
            if json {
                print_json(&updated)?;
            } else {
                println!("Updated category {} ({})", updated.id, updated.name);
            }
        }
        Some(("delete", args)) => {
            let id = CategoryId(cli::id(args));
            view.delete(id).await?;
            if !json {
                println!("Deleted category {id}");
            }
        }
        _ => {}
    }
    Ok(())
}

async fn products(context: &CatalogContext, args: &ArgMatches, json: bool) -> anyhow::Result<()> {
    let mut view = context.product_view();

    match args.subcommand() {
        Some(("list", args)) => {
            view.set_filter(product_filter(args));
            // A failed category refresh only degrades the category column.
            let (products, _) = view.mount().await;
            settled(products)?;

            let products = view.products();
            if json {
                print_json(&products)?;
            } else {
                print!(
                    "{}",
                    render::products(&products, view.empty_hint(), |p| view.category_label(p))
                );
            }
        }
        Some(("get", args)) => {
            let product = context.api().get_product(ProductId(cli::id(args))).await?;
            if json {
                print_json(&product)?;
            } else {
                print!(
                    "{}",
                    render::products(std::slice::from_ref(&product), "", |p| view.category_label(p))
                );
            }
        }
        Some(("create", args)) => {
            let mut draft = view.open_create().await?;
            draft.name = string_arg(args, "name").unwrap_or_default();
            draft.price = args.get_one::<f64>("price").copied();
            draft.category_id = args.get_one::<u64>("category-id").copied().map(CategoryId);
            if let Some(in_stock) = args.get_one::<bool>("in-stock") {
                draft.in_stock = *in_stock;
            }
            let created = view.submit(None, &draft).await?;
            if json {
                print_json(&created)?;
            } else {
                println!("Created product {} ({})", created.id, created.name);
            }
        }
        Some(("update", args)) => {
            let id = ProductId(cli::id(args));
            let mut draft = view.open_edit(id).await?;
            if let Some(name) = string_arg(args, "name") {
                draft.name = name;
            }
            if let Some(price) = args.get_one::<f64>("price") {
                draft.price = Some(*price);
            }
            if let Some(category_id) = args.get_one::<u64>("category-id") {
                draft.category_id = Some(CategoryId(*category_id));
            }
            if let Some(in_stock) = args.get_one::<bool>("in-stock") {
                draft.in_stock = *in_stock;
            }
            let updated = view.submit(Some(id), &draft).await?;
            if json {
                print_json(&updated)?;
            } else {
                println!("Updated product {} ({})", updated.id, updated.name);
            }
        }
        Some(("delete", args)) => {
            let id = ProductId(cli::id(args));
            view.delete(id).await?;
            if !json {
                println!("Deleted product {id}");
            }
        }
        _ => {}
    }
    Ok(())
}

fn product_filter(args: &ArgMatches) -> ProductFilter {
    let mut filter = ProductFilter::all();
    if let Some(id) = args.get_one::<u64>("category-id") {
        filter = filter.with_category(CategoryId(*id));
    }
    if let Some(in_stock) = args.get_one::<bool>("in-stock") {
        filter = filter.with_in_stock(*in_stock);
    }
    filter
}

fn string_arg(args: &ArgMatches, name: &str) -> Option<String> {
    args.get_one::<String>(name).cloned()
}

/// A fetch that did not reach the server counts as a failure
fn settled(outcome: FetchOutcome) -> Result<(), ApiError> {
    match outcome {
        FetchOutcome::Failed(err) => Err(err),
        FetchOutcome::Refreshed { .. } | FetchOutcome::Empty | FetchOutcome::Skipped => Ok(()),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print pending notices to stderr; returns how many were errors
fn flush_notices(rx: &mut broadcast::Receiver<Notice>) -> usize {
    let mut errors = 0;
    loop {
        match rx.try_recv() {
            Ok(notice) => {
                if notice.severity == Severity::Error {
                    errors += 1;
                }
                eprintln!("{}", render::notice(&notice));
            }
            Err(TryRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "notices dropped");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => return errors,
        }
    }
}

fn report_failure(err: &anyhow::Error, error_notices: usize) {
    match err.downcast_ref::<ApiError>() {
        Some(ApiError::Validation(fields)) if error_notices == 0 => {
            eprintln!("invalid input:\n{}", render::field_errors(fields));
        }
        Some(_) if error_notices > 0 => {}
        _ => eprintln!("error: {err:#}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_flags_become_filter() {
        let matches = cli::build()
            .try_get_matches_from(["catalog", "products", "list", "--in-stock", "true"])
            .unwrap();
        let (_, products) = matches.subcommand().unwrap();
        let (_, list) = products.subcommand().unwrap();

        assert_eq!(product_filter(list), ProductFilter::all().with_in_stock(true));
    }

    #[test]
    fn flags_override_environment_defaults() {
        let matches = cli::build()
            .try_get_matches_from([
                "catalog",
                "--base-url",
                "http://catalog.test/api/",
                "--timeout",
                "3",
                "categories",
                "list",
            ])
            .unwrap();

        let config = client_config(&matches).unwrap();
        assert_eq!(config.base_url, "http://catalog.test/api");
        assert_eq!(config.timeout_secs, 3);
    }

    #[test]
    fn only_failed_fetches_are_errors() {
        assert!(settled(FetchOutcome::Skipped).is_ok());
        assert!(settled(FetchOutcome::Empty).is_ok());
        assert_eq!(
            settled(FetchOutcome::Failed(ApiError::network())),
            Err(ApiError::network())
        );
    }
}
