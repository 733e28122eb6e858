use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use reviewbox_core::{AppConfig, DeviceToken, Rating, RelayEndpoint, RelayOutcome, Review, ReviewId};

use crate::cli::{AdminCommands, CompletionShell, ConfigInitArgs, ExportFormat, RelayKind};
use crate::commands::add::run_add;
use crate::commands::admin::run_admin;
use crate::commands::clear::run_clear;
use crate::commands::common::{
    format_relative_time, format_review_lines, normalize_content, parse_review_id,
    relay_advisory, review_preview, review_to_list_item,
};
use crate::commands::completions::{render_completions, run_completions};
use crate::commands::config::{redacted, resolve_relay_endpoint, run_config_init};
use crate::commands::delete::run_delete;
use crate::commands::edit::run_edit;
use crate::commands::export::{resolve_export_path, run_export};
use crate::commands::sync::{format_sweep_report, run_sync};
use crate::error::CliError;

struct TestDir {
    root: PathBuf,
}

impl TestDir {
    fn new() -> Self {
        static NEXT_TEST_DIR_ID: AtomicU64 = AtomicU64::new(0);

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |duration| duration.as_nanos());
        let sequence = NEXT_TEST_DIR_ID.fetch_add(1, Ordering::Relaxed);
        let root =
            std::env::temp_dir().join(format!("reviewbox-cli-test-{timestamp}-{sequence}"));
        std::fs::create_dir_all(&root).unwrap();
        Self { root }
    }

    fn db(&self) -> PathBuf {
        self.root.join("reviews.db")
    }

    fn config(&self) -> PathBuf {
        self.root.join("config.json")
    }

    fn write_config(&self, config: &AppConfig) {
        config.save_to_path(&self.config()).unwrap();
    }
}

impl Drop for TestDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

fn text(value: &str) -> Vec<String> {
    vec![value.to_string()]
}

fn sample_review(token: &str, synced: bool) -> Review {
    Review {
        id: ReviewId::from_millis(1_700_000_000_000),
        name: "anna".to_string(),
        service: Some("Facial".to_string()),
        rating: Rating::new(4).unwrap(),
        text: "Calm room,   great hands".to_string(),
        date: "14.11.2023".to_string(),
        timestamp: 1_700_000_000_000,
        owner_token: DeviceToken::from(token),
        synced,
    }
}

fn closed_local_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/hook")
}

async fn add_review(dir: &TestDir, name: &str, body: &str) -> Review {
    run_add(
        Some(name),
        None,
        Some(5),
        &text(body),
        &dir.db(),
        &dir.config(),
    )
    .await
    .unwrap()
}

async fn login_as_admin(dir: &TestDir) {
    dir.write_config(&AppConfig {
        admin_secret: Some("letmein".to_string()),
        ..AppConfig::default()
    });
    run_admin(
        AdminCommands::Login {
            password: Some("letmein".to_string()),
        },
        &dir.db(),
        &dir.config(),
    )
    .await
    .unwrap();
}

#[test]
fn normalize_content_trims_and_rejects_empty() {
    assert_eq!(normalize_content("  hello  "), Some("hello".to_string()));
    assert_eq!(normalize_content(" \n\t "), None);
}

#[test]
fn format_relative_time_units() {
    let now = 10_000_000;
    assert_eq!(format_relative_time(now - 30_000, now), "just now");
    assert_eq!(format_relative_time(now - 120_000, now), "2m ago");
    assert_eq!(format_relative_time(now - 2 * 60 * 60_000, now), "2h ago");
}

#[test]
fn parse_review_id_rejects_empty_and_garbage() {
    assert!(matches!(parse_review_id("  "), Err(CliError::EmptyReviewId)));
    assert!(matches!(
        parse_review_id("abc"),
        Err(CliError::InvalidReviewId(_))
    ));
    assert_eq!(
        parse_review_id(" 1700000000000 ").unwrap(),
        ReviewId::from_millis(1_700_000_000_000)
    );
}

#[test]
fn review_preview_collapses_whitespace_and_truncates() {
    let review = sample_review("user_a", false);
    assert_eq!(review_preview(&review, 100), "Calm room, great hands");
    assert_eq!(review_preview(&review, 10), "Calm ro...");
}

#[test]
fn review_lines_mark_own_and_pending_reviews() {
    let session = reviewbox_core::Session::new(
        DeviceToken::from("user_a"),
        reviewbox_core::Role::Standard,
    );
    let lines = format_review_lines(
        &[sample_review("user_a", false), sample_review("user_b", true)],
        &session,
    );

    assert!(lines[0].contains("[A] anna"));
    assert!(lines[0].contains("★★★★☆"));
    assert!(lines[0].contains("(your review)"));
    assert!(lines[0].contains("*pending"));
    assert!(!lines[1].contains("(your review)"));
    assert!(!lines[1].contains("*pending"));
}

#[test]
fn list_item_carries_permissions() {
    let admin = reviewbox_core::Session::new(
        DeviceToken::from("user_z"),
        reviewbox_core::Role::Privileged,
    );
    let item = review_to_list_item(&sample_review("user_a", false), &admin);
    assert!(item.can_edit);
    assert!(item.can_delete);
    assert!(!item.is_own);

    let json = serde_json::to_string(&item).unwrap();
    assert!(!json.contains("user_a"));
}

#[test]
fn relay_advisory_only_for_undelivered() {
    assert_eq!(relay_advisory(&RelayOutcome::Delivered), None);
    let advisory = relay_advisory(&RelayOutcome::Unreachable("timed out".to_string())).unwrap();
    assert!(advisory.contains("Saved on this device"));
    assert!(advisory.contains("timed out"));
}

#[tokio::test]
async fn add_persists_review_owned_by_this_device() {
    let dir = TestDir::new();
    let review = run_add(
        Some("  Anna "),
        Some("Facial"),
        Some(5),
        &["Great".to_string(), "massage".to_string()],
        &dir.db(),
        &dir.config(),
    )
    .await
    .unwrap();

    assert_eq!(review.name, "Anna");
    assert_eq!(review.text, "Great massage");
    assert_eq!(review.service.as_deref(), Some("Facial"));
    assert!(!review.synced);
    assert!(review.owner_token.as_str().starts_with("user_"));
}

#[tokio::test]
async fn add_reports_first_missing_field() {
    let dir = TestDir::new();
    let error = run_add(None, None, None, &text("body"), &dir.db(), &dir.config())
        .await
        .unwrap_err();
    assert_eq!(error.to_string(), "Please enter your name");

    let error = run_add(Some("Anna"), None, None, &text("body"), &dir.db(), &dir.config())
        .await
        .unwrap_err();
    assert_eq!(error.to_string(), "Please choose a rating");
}

#[tokio::test]
async fn add_with_unreachable_relay_still_succeeds() {
    let dir = TestDir::new();
    dir.write_config(&AppConfig {
        relay: Some(RelayEndpoint::Json {
            url: closed_local_url(),
        }),
        relay_timeout_secs: 2,
        ..AppConfig::default()
    });

    let review = add_review(&dir, "Anna", "offline").await;
    assert!(!review.synced);

    let report = run_sync(&dir.db(), &dir.config()).await.unwrap();
    assert_eq!(report.attempted, 1);
    assert_eq!(report.failed, 1);
}

#[tokio::test]
async fn sync_without_relay_is_an_error() {
    let dir = TestDir::new();
    let error = run_sync(&dir.db(), &dir.config()).await.unwrap_err();
    assert!(matches!(error, CliError::RelayNotConfigured));
}

#[tokio::test]
async fn owner_can_delete_own_review() {
    let dir = TestDir::new();
    let first = add_review(&dir, "Anna", "first").await;
    let removed = run_delete(&first.id.to_string(), &dir.db(), &dir.config())
        .await
        .unwrap();
    assert_eq!(removed.id, first.id);

    let error = run_delete(&first.id.to_string(), &dir.db(), &dir.config())
        .await
        .unwrap_err();
    assert!(error.to_string().contains("only delete your own"));
}

#[tokio::test]
async fn edit_requires_admin_mode() {
    let dir = TestDir::new();
    let review = add_review(&dir, "Anna", "before").await;
    let id = review.id.to_string();

    let error = run_edit(
        &id,
        None,
        None,
        None,
        Some("after".to_string()),
        &dir.db(),
        &dir.config(),
    )
    .await
    .unwrap_err();
    assert!(matches!(error, CliError::AdminRequired));

    login_as_admin(&dir).await;
    let updated = run_edit(
        &id,
        None,
        Some(String::new()),
        Some(2),
        Some("after".to_string()),
        &dir.db(),
        &dir.config(),
    )
    .await
    .unwrap();
    assert_eq!(updated.text, "after");
    assert_eq!(updated.rating.value(), 2);
    assert_eq!(updated.owner_token, review.owner_token);
}

#[tokio::test]
async fn edit_rejects_blank_name_and_keeps_review() {
    let dir = TestDir::new();
    let review = add_review(&dir, "Anna", "before").await;
    let id = review.id.to_string();
    login_as_admin(&dir).await;

    let error = run_edit(
        &id,
        Some(String::new()),
        None,
        None,
        None,
        &dir.db(),
        &dir.config(),
    )
    .await
    .unwrap_err();
    assert_eq!(error.to_string(), "Please enter your name");

    let error = run_edit(
        &id,
        None,
        None,
        None,
        Some("  \n ".to_string()),
        &dir.db(),
        &dir.config(),
    )
    .await
    .unwrap_err();
    assert_eq!(error.to_string(), "Please write a review");

    let updated = run_edit(
        &id,
        Some("  Ben ".to_string()),
        None,
        None,
        None,
        &dir.db(),
        &dir.config(),
    )
    .await
    .unwrap();
    assert_eq!(updated.name, "Ben");
    assert_eq!(updated.text, "before");
}

#[tokio::test]
async fn edit_rejects_empty_update_and_unknown_id() {
    let dir = TestDir::new();
    login_as_admin(&dir).await;

    let error = run_edit("42", None, None, None, None, &dir.db(), &dir.config())
        .await
        .unwrap_err();
    assert!(matches!(error, CliError::EmptyUpdate));

    let error = run_edit(
        "42",
        Some("Ben".to_string()),
        None,
        None,
        None,
        &dir.db(),
        &dir.config(),
    )
    .await
    .unwrap_err();
    assert!(matches!(error, CliError::ReviewNotFound(_)));
}

#[tokio::test]
async fn clear_requires_confirmation_and_admin() {
    let dir = TestDir::new();
    add_review(&dir, "Anna", "a").await;
    add_review(&dir, "Ben", "b").await;

    let error = run_clear(false, &dir.db(), &dir.config()).await.unwrap_err();
    assert!(matches!(error, CliError::ConfirmationRequired));

    let error = run_clear(true, &dir.db(), &dir.config()).await.unwrap_err();
    assert_eq!(error.to_string(), "Only an administrator can delete all reviews");

    login_as_admin(&dir).await;
    assert_eq!(run_clear(true, &dir.db(), &dir.config()).await.unwrap(), 2);
}

#[tokio::test]
async fn admin_login_rejects_wrong_password_and_requires_secret() {
    let dir = TestDir::new();
    let error = run_admin(
        AdminCommands::Login {
            password: Some("x".to_string()),
        },
        &dir.db(),
        &dir.config(),
    )
    .await
    .unwrap_err();
    assert!(matches!(error, CliError::AdminNotConfigured));

    dir.write_config(&AppConfig {
        admin_secret: Some("letmein".to_string()),
        ..AppConfig::default()
    });
    let error = run_admin(
        AdminCommands::Login {
            password: Some("wrong".to_string()),
        },
        &dir.db(),
        &dir.config(),
    )
    .await
    .unwrap_err();
    assert_eq!(error.to_string(), "Incorrect password");

    login_as_admin(&dir).await;
    let session = run_admin(AdminCommands::Status, &dir.db(), &dir.config())
        .await
        .unwrap();
    assert!(session.is_privileged());

    let session = run_admin(AdminCommands::Logout, &dir.db(), &dir.config())
        .await
        .unwrap();
    assert!(!session.is_privileged());
}

#[tokio::test]
async fn export_into_directory_uses_generated_name() {
    let dir = TestDir::new();
    add_review(&dir, "Anna", "She said \"wow\"").await;

    let out_dir = dir.root.join("exports");
    std::fs::create_dir_all(&out_dir).unwrap();
    run_export(ExportFormat::Csv, Some(&out_dir), &dir.db(), &dir.config())
        .await
        .unwrap();

    let entries = std::fs::read_dir(&out_dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect::<Vec<_>>();
    assert_eq!(entries.len(), 1);
    let file_name = entries[0].file_name().unwrap().to_string_lossy().to_string();
    assert!(file_name.starts_with("reviews-export-"));
    assert!(file_name.ends_with(".csv"));

    let exported = std::fs::read_to_string(&entries[0]).unwrap();
    assert!(exported.starts_with("Date,Name,Service,Rating,Review\n"));
    assert!(exported.contains("\"Anna\",\"\",5,\"She said \"\"wow\"\"\""));
}

#[test]
fn resolve_export_path_keeps_file_targets() {
    let file = Path::new("/definitely/not/a/dir/out.json");
    assert_eq!(resolve_export_path(file, ExportFormat::Json, 7), file);
}

#[test]
fn relay_endpoint_flags_build_and_patch() {
    let args = ConfigInitArgs {
        relay: Some(RelayKind::GoogleForms),
        relay_url: Some("https://docs.google.com/forms/d/e/x/formResponse".to_string()),
        name_field: Some("entry.1".to_string()),
        rating_field: Some("entry.2".to_string()),
        service_field: Some("entry.3".to_string()),
        text_field: Some("entry.4".to_string()),
        ..ConfigInitArgs::default()
    };
    let error = resolve_relay_endpoint(&args, None).unwrap_err();
    assert!(error.to_string().contains("--date-field"));

    let args = ConfigInitArgs {
        date_field: Some("entry.5".to_string()),
        ..args
    };
    let endpoint = resolve_relay_endpoint(&args, None).unwrap().unwrap();
    assert_eq!(endpoint.kind(), "google_forms");

    let patch = ConfigInitArgs {
        relay_url: Some("https://docs.google.com/forms/d/e/y/formResponse".to_string()),
        ..ConfigInitArgs::default()
    };
    let patched = resolve_relay_endpoint(&patch, Some(endpoint)).unwrap().unwrap();
    assert_eq!(
        patched.url(),
        "https://docs.google.com/forms/d/e/y/formResponse"
    );
    let RelayEndpoint::GoogleForms { fields, .. } = patched else {
        panic!("expected google forms endpoint");
    };
    assert_eq!(fields.date, "entry.5");

    let url_only = ConfigInitArgs {
        relay_url: Some("https://formspree.io/f/abc".to_string()),
        ..ConfigInitArgs::default()
    };
    assert!(resolve_relay_endpoint(&url_only, None).is_err());
}

#[test]
fn config_init_merges_with_existing_file() {
    let dir = TestDir::new();
    run_config_init(
        ConfigInitArgs {
            relay: Some(RelayKind::Formspree),
            relay_url: Some(" https://formspree.io/f/abc ".to_string()),
            admin_secret: Some("letmein".to_string()),
            ..ConfigInitArgs::default()
        },
        &dir.config(),
    )
    .unwrap();

    let updated = run_config_init(
        ConfigInitArgs {
            max_relay_attempts: Some(0),
            ..ConfigInitArgs::default()
        },
        &dir.config(),
    )
    .unwrap();
    assert_eq!(updated.max_relay_attempts, 0);
    assert_eq!(updated.admin_secret.as_deref(), Some("letmein"));
    assert_eq!(
        updated.relay.as_ref().map(RelayEndpoint::url),
        Some("https://formspree.io/f/abc")
    );

    let shown = serde_json::to_string(&redacted(updated)).unwrap();
    assert!(!shown.contains("letmein"));
}

#[test]
fn config_init_rejects_invalid_date_format() {
    let dir = TestDir::new();
    let result = run_config_init(
        ConfigInitArgs {
            date_format: Some("%Q".to_string()),
            ..ConfigInitArgs::default()
        },
        &dir.config(),
    );
    assert!(result.is_err());
    assert!(!dir.config().exists());
}

#[test]
fn sweep_report_summary() {
    let report = reviewbox_core::sync::SweepReport {
        attempted: 3,
        delivered: 2,
        failed: 1,
        skipped: 0,
    };
    assert_eq!(
        format_sweep_report(&report),
        "Relayed 2 of 3 pending reviews, 1 failed"
    );
    assert_eq!(
        format_sweep_report(&reviewbox_core::sync::SweepReport::default()),
        "Nothing to relay"
    );
}

#[test]
fn completions_name_the_binary() {
    let script = String::from_utf8(render_completions(CompletionShell::Bash)).unwrap();
    assert!(script.contains("reviewbox"));
    for subcommand in ["add", "sync", "export"] {
        assert!(script.contains(subcommand), "missing {subcommand}");
    }

    let zsh = String::from_utf8(render_completions(CompletionShell::Zsh)).unwrap();
    assert!(zsh.starts_with("#compdef reviewbox"));

    let dir = TestDir::new();
    let output = dir.root.join("reviewbox.fish");
    run_completions(CompletionShell::Fish, Some(&output)).unwrap();
    assert!(std::fs::read_to_string(output).unwrap().contains("reviewbox"));
}
