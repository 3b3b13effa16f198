use clap::{CommandFactory, Parser};
use outliner::tooling::cli::{Cli, Commands};

#[test]
fn parse_valid_command_matrix() {
    let cases: Vec<Vec<&str>> = vec![
        vec!["outliner", "show"],
        vec!["outliner", "show", "--format", "table"],
        vec!["outliner", "import", "bookmarks.json", "--label", "Inbox"],
        vec!["outliner", "import", "list.txt", "--format", "yaml"],
        vec!["outliner", "add-folder", "--title", "Work"],
        vec!["outliner", "add-document", "--parent", "abc", "--resource", "./a.png"],
        vec!["outliner", "graft", "./photos", "--at", "1.0"],
        vec!["outliner", "expand", "abc"],
        vec!["outliner", "move", "abc", "--to", "0.2"],
        vec!["outliner", "rename", "abc", "New title"],
        vec!["outliner", "remove", "a", "b", "-y"],
        vec!["outliner", "--workspace", "/tmp", "--log-level", "debug", "config"],
    ];
    for args in cases {
        let parsed = Cli::try_parse_from(args.clone());
        assert!(parsed.is_ok(), "expected valid parse for args: {args:?}");
    }
}

#[test]
fn parse_rejects_invalid_commands() {
    let cases: Vec<Vec<&str>> = vec![
        vec!["outliner"],
        vec!["outliner", "graft"],
        vec!["outliner", "graft", "./x", "--at", "1..2"],
        vec!["outliner", "move", "a", "--to", "0", "--into", "b"],
        vec!["outliner", "remove"],
        vec!["outliner", "add-document"],
    ];
    for args in cases {
        assert!(
            Cli::try_parse_from(args.clone()).is_err(),
            "expected parse failure for args: {args:?}"
        );
    }
}

#[test]
fn remove_collects_ids() {
    let cli = Cli::try_parse_from(["outliner", "remove", "x", "y"]).unwrap();
    match cli.command {
        Commands::Remove { ids, yes } => {
            assert_eq!(ids, vec!["x", "y"]);
            assert!(!yes);
        }
        other => panic!("unexpected command {:?}", other),
    }
}

#[test]
fn command_definition_is_consistent() {
    Cli::command().debug_assert();
}
