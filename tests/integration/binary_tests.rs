// Exit contract of the price-watch binary

use std::process::{Command, Output};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

fn run_binary(env: &HashMap<String, String>, args: &[&str]) -> Output {
    let workdir = TempDir::new().unwrap();
    Command::new(env!("CARGO_BIN_EXE_price-watch"))
        .args(args)
        .current_dir(workdir.path())
        .env_clear()
        .envs(env)
        .output()
        .expect("binary runs")
}

#[test]
fn test_unreachable_page_still_exits_zero() {
    let env = test_env("http://127.0.0.1:9/dp/B0TESTITEM", "50");

    let output = run_binary(&env, &["--json"]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["outcome"]["outcome"], "unavailable");
    assert_eq!(report["outcome"]["reason"]["kind"], "transport");
    assert_eq!(report["notification"]["status"], "not_required");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_above_target_exits_zero() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PRODUCT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(product_page("$75.00")))
        .mount(&server)
        .await;
    let env = test_env(&format!("{}{}", server.uri(), PRODUCT_PATH), "50");

    let output = tokio::task::spawn_blocking(move || run_binary(&env, &["--json"])).await.unwrap();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["outcome"]["outcome"], "above_target");
    assert_eq!(report["outcome"]["quote"]["source_text"], "$75.00");
}

#[cfg(unix)]
#[test]
fn test_non_unicode_environment_variable_is_ignored() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let env = test_env("http://127.0.0.1:9/dp/B0TESTITEM", "50");
    let workdir = TempDir::new().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_price-watch"))
        .arg("--json")
        .current_dir(workdir.path())
        .env_clear()
        .envs(&env)
        .env("LEGACY_LOCALE_VALUE", OsStr::from_bytes(b"caf\xe9"))
        .output()
        .expect("binary runs");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["outcome"]["outcome"], "unavailable");
}

#[test]
fn test_missing_configuration_exits_non_zero() {
    let mut env = test_env("http://127.0.0.1:9/dp/B0TESTITEM", "50");
    env.remove("PRODUCT_URL");

    let output = run_binary(&env, &[]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("PRODUCT_URL is required"));
}

#[test]
fn test_missing_config_file_exits_non_zero() {
    let env = test_env("http://127.0.0.1:9/dp/B0TESTITEM", "50");

    let output = run_binary(&env, &["--config", "does-not-exist.toml"]);

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}
