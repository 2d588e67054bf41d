//! Property-based tests for the argument builder.
//!
//! These cover the guarantees the rest of the engine leans on: building is
//! deterministic, secrets never reach a display rendering, and a missing
//! required field always blocks the command.

use proptest::prelude::*;
use sbarc_core::{
    ConvertConfig, DownloadConfig, OperationConfig, REDACTED_PLACEHOLDER, Secret, ValidationError,
    build, build_convert, build_download, preview,
};
use std::path::PathBuf;

fn substack_url() -> impl Strategy<Value = String> {
    "[a-z]{3,12}".prop_map(|name| format!("https://{name}.substack.com/"))
}

fn destination() -> impl Strategy<Value = String> {
    "/[a-z]{1,8}(/[a-z0-9_]{1,8}){0,2}"
}

fn cookie_value() -> impl Strategy<Value = String> {
    // Long enough that an accidental substring match is not a concern.
    "[A-Za-z0-9%:._-]{16,48}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn build_is_deterministic(
        url in substack_url(),
        dest in destination(),
        rate in prop::option::of(1u32..20),
        verbose in any::<bool>(),
        archive in any::<bool>(),
    ) {
        let mut config = DownloadConfig::new(url, dest).with_verbose(verbose);
        config.create_archive = archive;
        if let Some(rate) = rate {
            config = config.with_rate_limit(rate.to_string());
        }
        let config: OperationConfig = config.into();

        prop_assert_eq!(build(&config), build(&config));
        prop_assert_eq!(preview(&config), preview(&config));
    }

    #[test]
    fn cookie_never_appears_in_display(
        url in substack_url(),
        dest in destination(),
        cookie in cookie_value(),
    ) {
        let config = DownloadConfig::new(url, dest)
            .with_cookie("substack.sid", Secret::new(cookie.clone()));
        let cmd = build_download(&config).unwrap();

        let shown = cmd.display();
        prop_assert!(!shown.contains(&cookie));
        prop_assert!(shown.contains(REDACTED_PLACEHOLDER));
        prop_assert!(!format!("{cmd:?}").contains(&cookie), "Debug output leaked the cookie");
        prop_assert!(!cmd.redacted_tokens().iter().any(|t| t.contains(&cookie)));

        // The real token list still carries the value for the process.
        prop_assert_eq!(cmd.tokens().last().cloned(), Some(cookie));
    }

    #[test]
    fn blank_destination_always_fails(
        url in substack_url(),
        blank in "[ \t]{0,4}",
    ) {
        let config = DownloadConfig::new(url, blank);
        let errors = build_download(&config).unwrap_err();
        prop_assert!(
            errors.contains(&ValidationError::Missing { field: "destination" }),
            "expected Missing destination error"
        );
    }

    #[test]
    fn convert_inputs_keep_their_order(
        names in prop::collection::vec("[a-z]{1,8}", 1..6),
    ) {
        let inputs: Vec<PathBuf> = names.iter().map(|n| PathBuf::from(format!("/posts/{n}.md"))).collect();
        let config = ConvertConfig::new("/posts", inputs.clone(), "/out/book.epub");
        let tokens = build_convert(&config).unwrap().tokens();

        let expected: Vec<String> = inputs.iter().map(|p| p.display().to_string()).collect();
        prop_assert_eq!(&tokens[1..=expected.len()], expected.as_slice());
    }
}

#[test]
fn validation_error_messages_name_the_field() {
    let errors = build_download(&DownloadConfig::new("https://x.substack.com/", "")).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].to_string(), "destination required");
}

#[test]
fn preview_and_command_agree_for_convert() {
    let config = ConvertConfig::new(
        "/posts",
        vec![PathBuf::from("/posts/a.md"), PathBuf::from("/posts/b c.md")],
        "/out/book.epub",
    )
    .with_title("My Book");
    let cmd = build_convert(&config).unwrap();
    assert_eq!(preview(&config.into()).unwrap(), cmd.display());
    assert!(!cmd.has_secret());
}
