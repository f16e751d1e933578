use super::*;

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["postcraft"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn scrape_defaults_to_all_profiles() {
    let cli = Cli::try_parse_from(["postcraft", "scrape"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Scrape {
            profile: None,
            max_pages: None,
            dry_run: false
        })
    ));
}

#[test]
fn scrape_with_profile_pages_and_dry_run() {
    let cli = Cli::try_parse_from([
        "postcraft",
        "scrape",
        "--profile",
        "aarongolbin",
        "--max-pages",
        "2",
        "--dry-run",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Scrape {
            profile: Some(ref p),
            max_pages: Some(2),
            dry_run: true
        }) if p == "aarongolbin"
    ));
}

#[test]
fn scrape_rejects_non_numeric_max_pages() {
    assert!(Cli::try_parse_from(["postcraft", "scrape", "--max-pages", "many"]).is_err());
}

#[test]
fn parses_analyze() {
    let cli = Cli::try_parse_from(["postcraft", "analyze"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::Analyze)));
}

#[test]
fn generate_collects_repeated_keywords() {
    let cli = Cli::try_parse_from([
        "postcraft",
        "generate",
        "--keyword",
        "ai",
        "--keyword",
        "creative testing",
    ])
    .unwrap();
    match cli.command {
        Some(Commands::Generate {
            keywords,
            no_trends,
        }) => {
            assert_eq!(keywords, vec!["ai", "creative testing"]);
            assert!(!no_trends);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn generate_no_trends_flag() {
    let cli = Cli::try_parse_from(["postcraft", "generate", "--no-trends"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Generate {
            no_trends: true,
            ..
        })
    ));
}

#[test]
fn parses_refine_without_keywords() {
    let cli = Cli::try_parse_from(["postcraft", "refine"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Refine { ref keywords }) if keywords.is_empty()
    ));
}

#[test]
fn feedback_requires_post_id_and_comment() {
    assert!(Cli::try_parse_from(["postcraft", "feedback", "--post-id", "p1"]).is_err());

    let cli = Cli::try_parse_from([
        "postcraft",
        "feedback",
        "--post-id",
        "p1",
        "--comment",
        "fewer emojis",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Feedback { ref post_id, ref comment })
            if post_id == "p1" && comment == "fewer emojis"
    ));
}

#[test]
fn history_limit_defaults_to_twenty() {
    let cli = Cli::try_parse_from(["postcraft", "history"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::History { limit: 20 })));

    let cli = Cli::try_parse_from(["postcraft", "history", "--limit", "5"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::History { limit: 5 })));
}

#[test]
fn preview_flattens_and_truncates() {
    assert_eq!(preview("Short\n\npost", 50), "Short post");
    assert_eq!(preview("abcdefghij", 4), "abcd...");
}
