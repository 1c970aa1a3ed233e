//! Integration tests for the `stockroom` CLI binary.
//!
//! Argument parsing, help, completions and exit codes run without a
//! server; catalog commands run against a wiremock API with the session
//! store in a temp directory.
#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `stockroom` binary with env isolation.
///
/// Clears all `STOCKROOM_*` env vars and points config and data
/// directories into `home` so tests never touch real state.
fn stockroom_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("stockroom");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env_remove("STOCKROOM_PROFILE")
        .env_remove("STOCKROOM_API_URL")
        .env_remove("STOCKROOM_OUTPUT")
        .env_remove("STOCKROOM_INSECURE")
        .env_remove("STOCKROOM_TIMEOUT")
        .env_remove("STOCKROOM_STORE")
        .env_remove("STOCKROOM_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

/// A temp home plus a store file, optionally seeded with a session token.
struct Sandbox {
    home: TempDir,
    store: PathBuf,
}

impl Sandbox {
    fn new(token: Option<&str>) -> Self {
        let home = tempfile::tempdir().unwrap();
        let store = home.path().join("store.json");
        if let Some(token) = token {
            let body = json!({ "token": token }).to_string();
            std::fs::write(&store, body).unwrap();
        }
        Self { home, store }
    }

    fn cmd(&self, server: Option<&MockServer>) -> assert_cmd::Command {
        let mut cmd = stockroom_cmd(self.home.path());
        cmd.arg("--store").arg(&self.store);
        if let Some(server) = server {
            cmd.arg("--api-url").arg(server.uri());
        }
        cmd
    }

    fn stored(&self) -> serde_json::Value {
        let raw = std::fs::read_to_string(&self.store).unwrap();
        serde_json::from_str(&raw).unwrap()
    }
}

/// Run a prepared command off the async runtime so the mock server keeps
/// serving while the binary blocks.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

async fn mount_products(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "_id": "1", "name": "Chair", "sku": "CH1", "price": 40 },
            { "_id": "2", "name": "Table", "sku": "TB1", "price": 120 }
        ])))
        .mount(server)
        .await;
}

async fn mount_chair(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/products/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "1", "name": "Chair", "sku": "CH1", "price": 40
        })))
        .mount(server)
        .await;
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = tempfile::tempdir().unwrap();
    let output = stockroom_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Usage") || stdout(&output).contains("Usage"));
}

#[test]
fn test_help_lists_commands() {
    let home = tempfile::tempdir().unwrap();
    stockroom_cmd(home.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("catalog")
            .and(predicate::str::contains("products"))
            .and(predicate::str::contains("favorites"))
            .and(predicate::str::contains("search")),
    );
}

#[test]
fn test_version_flag() {
    let home = tempfile::tempdir().unwrap();
    stockroom_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("stockroom"));
}

#[test]
fn test_completions_zsh() {
    let home = tempfile::tempdir().unwrap();
    stockroom_cmd(home.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_invalid_output_format() {
    let home = tempfile::tempdir().unwrap();
    stockroom_cmd(home.path())
        .args(["--output", "xml", "products", "list"])
        .assert()
        .code(2);
}

// ── Session gating ──────────────────────────────────────────────────

#[test]
fn test_products_require_login() {
    let sandbox = Sandbox::new(None);
    sandbox
        .cmd(None)
        .args(["products", "list"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("stockroom login"));
}

#[test]
fn test_create_rejects_bad_price_before_network() {
    let sandbox = Sandbox::new(Some("tok"));
    sandbox
        .cmd(None)
        .args(["products", "create", "--sku", "X", "--name", "Y", "--price", "cheap"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("price"));
}

#[test]
fn test_unreachable_api_is_connection_error() {
    let sandbox = Sandbox::new(Some("tok"));
    sandbox
        .cmd(None)
        .args(["--api-url", "http://127.0.0.1:9", "products", "list"])
        .assert()
        .code(7);
}

// ── Auth ────────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_login_stores_token_and_logout_clears_it() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({ "email": "a@b.c", "password": "pw" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "fresh" })))
        .mount(&server)
        .await;

    let sandbox = Sandbox::new(None);
    let mut cmd = sandbox.cmd(Some(&server));
    cmd.env("STOCKROOM_PASSWORD", "pw").args(["login", "a@b.c"]);
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(sandbox.stored()["token"], "fresh");

    let mut cmd = sandbox.cmd(Some(&server));
    cmd.arg("logout");
    let output = run(cmd).await;
    assert!(output.status.success());
    assert!(sandbox.stored().get("token").is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_failure_is_auth_exit_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid credentials" })),
        )
        .mount(&server)
        .await;

    let sandbox = Sandbox::new(None);
    let mut cmd = sandbox.cmd(Some(&server));
    cmd.env("STOCKROOM_PASSWORD", "wrong").args(["login", "a@b.c"]);
    let output = run(cmd).await;
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("Invalid credentials"));
}

// ── Products ────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_products_list_plain() {
    let server = MockServer::start().await;
    mount_products(&server).await;

    let sandbox = Sandbox::new(Some("tok"));
    let mut cmd = sandbox.cmd(Some(&server));
    cmd.args(["-o", "plain", "products", "list"]);
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "1\n2");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_products_list_favorites_only_uses_cache() {
    let server = MockServer::start().await;
    mount_products(&server).await;

    let sandbox = Sandbox::new(None);
    let body = json!({ "token": "tok", "favoriteProducts": r#"["2"]"# }).to_string();
    std::fs::write(&sandbox.store, body).unwrap();

    let mut cmd = sandbox.cmd(Some(&server));
    cmd.args(["-o", "plain", "products", "list", "--favorites"]);
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "2");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_products_get_json() {
    let server = MockServer::start().await;
    mount_chair(&server).await;

    let sandbox = Sandbox::new(Some("tok"));
    let mut cmd = sandbox.cmd(Some(&server));
    cmd.args(["-o", "json-compact", "products", "get", "1"]);
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", stderr(&output));
    let value: serde_json::Value = serde_json::from_str(stdout(&output).trim()).unwrap();
    assert_eq!(value["_id"], "1");
    assert_eq!(value["sku"], "CH1");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_products_get_missing_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products/nope"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Not found" })))
        .mount(&server)
        .await;

    let sandbox = Sandbox::new(Some("tok"));
    let mut cmd = sandbox.cmd(Some(&server));
    cmd.args(["products", "get", "nope"]);
    let output = run(cmd).await;
    assert_eq!(output.status.code(), Some(4));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_without_yes_refuses_non_interactive() {
    let server = MockServer::start().await;
    mount_chair(&server).await;

    let sandbox = Sandbox::new(Some("tok"));
    let mut cmd = sandbox.cmd(Some(&server));
    cmd.args(["products", "delete", "1"]);
    let output = run(cmd).await;
    assert_eq!(output.status.code(), Some(2));

    let deletes = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.method.as_str() == "DELETE")
        .count();
    assert_eq!(deletes, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_with_yes() {
    let server = MockServer::start().await;
    mount_chair(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/api/products/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "deleted" })))
        .expect(1)
        .mount(&server)
        .await;

    let sandbox = Sandbox::new(Some("tok"));
    let mut cmd = sandbox.cmd(Some(&server));
    cmd.args(["--yes", "products", "delete", "1"]);
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", stderr(&output));
}

// ── Favorites & search ──────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_favorites_toggle_updates_server_and_cache() {
    let server = MockServer::start().await;
    mount_chair(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/favorites/update"))
        .and(header("authorization", "Bearer tok"))
        .and(body_json(json!({ "productIds": ["1"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let sandbox = Sandbox::new(Some("tok"));
    let mut cmd = sandbox.cmd(Some(&server));
    cmd.args(["favorites", "toggle", "1"]);
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stderr(&output).contains("Added 'Chair' to favorites"));

    let cached = sandbox.stored()["favoriteProducts"]
        .as_str()
        .unwrap()
        .to_owned();
    assert!(cached.contains("\"_id\":\"1\""));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_favorites_sync_prunes_cache() {
    let server = MockServer::start().await;
    mount_products(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/favorites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "productIds": ["2"] })))
        .mount(&server)
        .await;

    let sandbox = Sandbox::new(None);
    let body = json!({ "token": "tok", "favoriteProducts": r#"["1","2"]"# }).to_string();
    std::fs::write(&sandbox.store, body).unwrap();

    let mut cmd = sandbox.cmd(Some(&server));
    cmd.args(["-o", "plain", "favorites", "list", "--sync"]);
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "2");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_search_matches_sku() {
    let server = MockServer::start().await;
    mount_products(&server).await;

    let sandbox = Sandbox::new(Some("tok"));
    let mut cmd = sandbox.cmd(Some(&server));
    cmd.args(["-o", "plain", "search", "tb"]);
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "2");
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_set_then_show() {
    let home = tempfile::tempdir().unwrap();
    stockroom_cmd(home.path())
        .args(["config", "set", "api_url", "https://shop.example.com"])
        .assert()
        .success();
    stockroom_cmd(home.path())
        .args(["-o", "json", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://shop.example.com"));
}

#[test]
fn test_config_set_unknown_key() {
    let home = tempfile::tempdir().unwrap();
    stockroom_cmd(home.path())
        .args(["config", "set", "colour", "red"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown config key"));
}

#[test]
fn test_config_use_missing_profile() {
    let home = tempfile::tempdir().unwrap();
    stockroom_cmd(home.path())
        .args(["config", "use", "ghost"])
        .assert()
        .code(4);
}
