use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};

pub(crate) fn build() -> Command {
    Command::new("catalog")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Manage catalog categories and products")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .global(true)
                .help("API base URL (overrides CATALOG_API_BASE_URL)"),
        )
        .arg(
            Arg::new("api-key")
                .long("api-key")
                .global(true)
                .help("API key for mutating requests (overrides CATALOG_API_KEY)"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .global(true)
                .value_parser(value_parser!(u64))
                .help("Request timeout in seconds (overrides CATALOG_API_TIMEOUT_SECS)"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Print results as JSON"),
        )
        .subcommand(
            Command::new("categories")
                .about("Category operations")
                .subcommand_required(true)
                .subcommand(Command::new("list").about("List categories"))
                .subcommand(Command::new("get").about("Show one category").arg(id_arg()))
                .subcommand(
                    Command::new("create")
                        .about("Create a category")
                        .arg(name_arg().required(true))
                        .arg(description_arg()),
                )
                .subcommand(
                    Command::new("update")
                        .about("Update a category; omitted fields keep their value")
                        .arg(id_arg())
                        .arg(name_arg())
                        .arg(description_arg()),
                )
                .subcommand(Command::new("delete").about("Delete a category").arg(id_arg())),
        )
        .subcommand(
            Command::new("products")
                .about("Product operations")
                .subcommand_required(true)
                .subcommand(
                    Command::new("list")
                        .about("List products")
                        .arg(category_arg())
                        .arg(in_stock_arg()),
                )
                .subcommand(Command::new("get").about("Show one product").arg(id_arg()))
                .subcommand(
                    Command::new("create")
                        .about("Create a product")
                        .arg(name_arg().required(true))
                        .arg(price_arg().required(true))
                        .arg(category_arg().required(true))
                        .arg(in_stock_arg()),
                )
                .subcommand(
                    Command::new("update")
                        .about("Update a product; omitted fields keep their value")
                        .arg(id_arg())
                        .arg(name_arg())
                        .arg(price_arg())
                        .arg(category_arg())
                        .arg(in_stock_arg()),
                )
                .subcommand(Command::new("delete").about("Delete a product").arg(id_arg())),
        )
}

fn id_arg() -> Arg {
    Arg::new("id")
        .required(true)
        .value_parser(value_parser!(u64))
        .help("Resource id")
}

fn name_arg() -> Arg {
    Arg::new("name").long("name").help("Display name")
}

fn description_arg() -> Arg {
    Arg::new("description")
        .long("description")
        .help("Free-form description")
}

fn price_arg() -> Arg {
    Arg::new("price")
        .long("price")
        .value_parser(value_parser!(f64))
        .help("Unit price, greater than 0")
}

fn category_arg() -> Arg {
    Arg::new("category-id")
        .long("category-id")
        .value_parser(value_parser!(u64))
        .help("Owning category id")
}

fn in_stock_arg() -> Arg {
    Arg::new("in-stock")
        .long("in-stock")
        .value_parser(value_parser!(bool))
        .help("Stock flag (true/false)")
}

/// Required positional id; clap enforces presence
pub(crate) fn id(args: &ArgMatches) -> u64 {
    args.get_one::<u64>("id").copied().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_is_well_formed() {
        build().debug_assert();
    }

    #[test]
    fn global_flags_reach_nested_commands() {
        let matches = build()
            .try_get_matches_from([
                "catalog",
                "products",
                "list",
                "--category-id",
                "3",
                "--base-url",
                "http://example.test/api",
                "--json",
            ])
            .unwrap();

        assert_eq!(
            matches.get_one::<String>("base-url").map(String::as_str),
            Some("http://example.test/api")
        );
        assert!(matches.get_flag("json"));

        let (_, products) = matches.subcommand().unwrap();
        let (name, list) = products.subcommand().unwrap();
        assert_eq!(name, "list");
        assert_eq!(list.get_one::<u64>("category-id"), Some(&3));
        assert_eq!(list.get_one::<bool>("in-stock"), None);
    }

    #[test]
    fn create_requires_name() {
        let result = build().try_get_matches_from(["catalog", "categories", "create"]);
        assert!(result.is_err());
    }

    #[test]
    fn product_flags_are_typed() {
        let result = build().try_get_matches_from([
            "catalog",
            "products",
            "create",
            "--name",
            "Hammer",
            "--price",
            "cheap",
            "--category-id",
            "1",
        ]);
        assert!(result.is_err());
    }
}
