use std::fs;
use std::path::Path;

use assert_cmd::Command;
use tempfile::TempDir;

const SOUP: &str = r#"{"name": "Leek soup", "hash": "h1", "ingredients": "2 leeks\n1 potato",
    "directions": "Simmer.", "categories": ["Dinner", "Soup"]}"#;

fn p2n(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("p2n").unwrap();
    cmd.env("P2N_CONFIG", home.join("config.json"))
        .env_remove("NOTION_TOKEN")
        .env_remove("NOTION_RECIPE_DB_ID")
        .env_remove("NOTION_API_URL")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_commands() {
    let temp = TempDir::new().unwrap();
    let output = p2n(temp.path()).arg("--help").output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    for command in ["import", "preview", "verify"] {
        assert!(stdout.contains(command), "missing {command} in {stdout}");
    }
}

#[test]
fn preview_prints_page_properties() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("soup.json");
    fs::write(&file, SOUP).unwrap();

    let output = p2n(temp.path())
        .args(["preview", "--json"])
        .arg(&file)
        .output()
        .unwrap();

    assert!(output.status.success(), "{output:?}");
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["identity_key"], "h1");
    assert_eq!(json["hash_verified"], false);
    let props = &json["properties"];
    assert_eq!(props["Recipe"]["title"][0]["text"]["content"], "Leek soup");
    assert_eq!(props["Tags"]["multi_select"][1]["name"], "Soup");
    assert_eq!(props["Meal Type"]["select"]["name"], "From Paprika");
}

#[test]
fn import_without_token_fails_with_config_exit_code() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("soup.json"), SOUP).unwrap();

    let output = p2n(temp.path())
        .env("NOTION_RECIPE_DB_ID", "db")
        .arg("import")
        .arg(temp.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("MISSING_TOKEN"), "{stderr}");
}

#[test]
fn import_with_unreachable_api_records_failures() {
    let temp = TempDir::new().unwrap();
    let recipes = temp.path().join("recipes");
    fs::create_dir(&recipes).unwrap();
    fs::write(recipes.join("soup.json"), SOUP).unwrap();
    let failures = temp.path().join("failed.jsonl");

    let output = p2n(temp.path())
        .env("NOTION_TOKEN", "secret")
        .env("NOTION_RECIPE_DB_ID", "db")
        .env("NOTION_API_URL", "http://127.0.0.1:1")
        .env("P2N_RETRY_DELAY_MS", "0")
        .args(["import", "--json", "--failures"])
        .arg(&failures)
        .arg(&recipes)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(6));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["created"], 0);
    assert_eq!(json["failed"][0]["identity_key"], "h1");
    assert_eq!(json["failed"][0]["kind"], "remote_unavailable");
    assert_eq!(
        json["failed"][0]["source"],
        recipes.join("soup.json").display().to_string()
    );

    let written = fs::read_to_string(&failures).unwrap();
    assert_eq!(written.lines().count(), 1);
}

#[test]
fn verify_reports_stale_hash() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("soup.json");
    fs::write(&file, SOUP).unwrap();

    let output = p2n(temp.path())
        .args(["verify", "--json"])
        .arg(&file)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(3));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["mismatched"], 1);
    assert_eq!(json["files"][0]["status"], "mismatch");
}
