use super::*;

#[test]
fn parses_address_command() {
    let cli = Cli::try_parse_from([
        "vastgoed-cli",
        "address",
        "--postal-code",
        "1015MN",
        "--house-number",
        "72",
        "--addition",
        "1",
        "--city",
        "Amsterdam",
    ])
    .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Address {
            ref postal_code,
            ref house_number,
            addition: Some(ref addition),
            ref street,
            no_summary: false,
            ..
        } if postal_code == "1015MN" && house_number == "72" && addition == "1" && street.is_empty()
    ));
}

#[test]
fn parses_area_command_with_no_summary() {
    let cli = Cli::try_parse_from([
        "vastgoed-cli",
        "area",
        "--postal-code",
        "1015MN",
        "--no-summary",
    ])
    .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Area {
            ref postal_code,
            no_summary: true,
        } if postal_code == "1015MN"
    ));
}

#[test]
fn address_requires_house_number() {
    assert!(Cli::try_parse_from(["vastgoed-cli", "address", "--postal-code", "1015MN"]).is_err());
}

#[test]
fn a_subcommand_is_required() {
    assert!(Cli::try_parse_from(["vastgoed-cli"]).is_err());
}
