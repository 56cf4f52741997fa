use clap::{CommandFactory, Parser};
use vfstub::tooling::cli::{Cli, Commands};

#[test]
fn parse_valid_command_matrix() {
    let cases: Vec<Vec<&str>> = vec![
        vec!["vfstub", "mirror", "./src", "--out", "layout.json"],
        vec!["vfstub", "mirror", "./src", "--out", "layout.json", "--platform", "osx"],
        vec!["vfstub", "tree", "layout.json"],
        vec!["vfstub", "tree", "layout.json", "--format", "json"],
        vec!["vfstub", "cat", "layout.json", r"C:\a\b.txt"],
        vec!["vfstub", "watch", "layout.json", "--debounce-ms", "250"],
        vec!["vfstub", "--config", "vfstub.toml", "tree", "layout.json"],
        vec!["vfstub", "tree", "layout.json", "--log-level", "debug", "--log-output", "stdout"],
    ];

    for args in cases {
        let parsed = Cli::try_parse_from(args.clone());
        assert!(parsed.is_ok(), "expected valid parse for args: {args:?}");
    }
}

#[test]
fn parse_rejects_incomplete_commands() {
    assert!(Cli::try_parse_from(["vfstub", "mirror", "./src"]).is_err());
    assert!(Cli::try_parse_from(["vfstub", "cat", "layout.json"]).is_err());
    assert!(Cli::try_parse_from(["vfstub", "mirror", ".", "--out", "o.json", "--platform", "beos"]).is_err());
    assert!(Cli::try_parse_from(["vfstub"]).is_err());
}

#[test]
fn watch_debounce_is_optional() {
    let cli = Cli::try_parse_from(["vfstub", "watch", "layout.json"]).unwrap();
    assert!(matches!(cli.command, Commands::Watch { debounce_ms: None, .. }));
}

#[test]
fn help_lists_every_command() {
    let help = Cli::command().render_long_help().to_string();
    for command in ["mirror", "tree", "cat", "watch"] {
        assert!(help.contains(command), "help is missing {command}");
    }
}
