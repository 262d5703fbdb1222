use std::path::Path;

use super::*;

#[test]
fn parses_harvest_without_options() {
    let cli = Cli::try_parse_from(["tabak-cli", "harvest"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Harvest {
            brand: None,
            limit: None,
            output: None,
            static_pages: false,
        }
    ));
}

#[test]
fn parses_harvest_with_all_options() {
    let cli = Cli::try_parse_from([
        "tabak-cli",
        "harvest",
        "--brand",
        "darkside",
        "--limit",
        "10",
        "--output",
        "out.json",
        "--static",
    ])
    .expect("expected valid cli args");

    match cli.command {
        Commands::Harvest {
            brand,
            limit,
            output,
            static_pages,
        } => {
            assert_eq!(brand.as_deref(), Some("darkside"));
            assert_eq!(limit, Some(10));
            assert_eq!(output.as_deref(), Some(Path::new("out.json")));
            assert!(static_pages);
        }
        other @ Commands::Brands { .. } => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parses_brands_command() {
    let cli =
        Cli::try_parse_from(["tabak-cli", "brands", "--static"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Brands {
            output: None,
            static_pages: true,
        }
    ));
}

#[test]
fn rejects_non_numeric_limit() {
    assert!(Cli::try_parse_from(["tabak-cli", "harvest", "--limit", "many"]).is_err());
}

#[test]
fn subcommand_is_required() {
    assert!(Cli::try_parse_from(["tabak-cli"]).is_err());
}
