//! End-to-end tests for the spendwise binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn spendwise(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("spendwise").unwrap();
    cmd.env("SPENDWISE_DATA_DIR", dir.path())
        .env_remove("SPENDWISE_USER")
        .env_remove("SPENDWISE_PORT")
        .env_remove("SPENDWISE_BIND")
        .env("RUST_LOG", "warn");
    cmd
}

fn add_user(dir: &TempDir, name: &str, email: &str) {
    spendwise(dir)
        .args(["user", "add", name, email])
        .assert()
        .success()
        .stdout(predicate::str::contains("API token:"));
}

#[test]
fn init_writes_config_and_lists_globals() {
    let dir = TempDir::new().unwrap();

    spendwise(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Food, Transport"));

    assert!(dir.path().join("config.json").exists());
    assert!(dir.path().join("data").join("categories.json").exists());
}

#[test]
fn config_shows_paths_and_defaults() {
    let dir = TempDir::new().unwrap();

    spendwise(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("127.0.0.1:3000"))
        .stdout(predicate::str::contains("Export row limit:   5000"));
}

#[test]
fn duplicate_email_is_rejected() {
    let dir = TempDir::new().unwrap();
    add_user(&dir, "Ada", "ada@example.com");

    spendwise(&dir)
        .args(["user", "add", "Ada Again", "ADA@example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn commands_need_a_user() {
    let dir = TempDir::new().unwrap();

    spendwise(&dir)
        .args(["expense", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No users yet"));
}

#[test]
fn expense_and_monthly_report() {
    let dir = TempDir::new().unwrap();
    add_user(&dir, "Ada", "ada@example.com");

    spendwise(&dir)
        .args([
            "expense", "add", "1234.50", "Rent", "--category", "housing", "--date", "2025-03-01",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Housing"));

    spendwise(&dir)
        .args(["expense", "add", "5000", "Suya", "--currency", "NGN", "--date", "2025-03-02"])
        .assert()
        .success();

    spendwise(&dir)
        .args(["expense", "list", "--currency", "ngn"])
        .assert()
        .success()
        .stdout(predicate::str::contains("NGN 5,000.00"))
        .stdout(predicate::str::contains("Rent").not());

    spendwise(&dir)
        .args(["report", "monthly", "--month", "2025-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1,234.50"))
        .stdout(predicate::str::contains("Housing"));
}

#[test]
fn custom_category_delete_uncategorizes() {
    let dir = TempDir::new().unwrap();
    add_user(&dir, "Ada", "ada@example.com");

    spendwise(&dir)
        .args(["category", "create", "Pets", "--color", "#112233"])
        .assert()
        .success();

    spendwise(&dir)
        .args(["category", "create", "pets"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    spendwise(&dir)
        .args(["expense", "add", "20", "Kibble", "--category", "Pets"])
        .assert()
        .success();

    spendwise(&dir)
        .args(["category", "delete", "Pets"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 expense(s) moved to Uncategorized"));

    spendwise(&dir)
        .args(["expense", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Uncategorized"));
}

#[test]
fn global_categories_cannot_be_deleted() {
    let dir = TempDir::new().unwrap();
    add_user(&dir, "Ada", "ada@example.com");

    spendwise(&dir)
        .args(["category", "delete", "Food"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Forbidden"));
}

#[test]
fn budget_set_updates_in_place() {
    let dir = TempDir::new().unwrap();
    add_user(&dir, "Ada", "ada@example.com");

    for amount in ["300", "450"] {
        spendwise(&dir)
            .args(["budget", "set", amount, "--category", "Food", "--month", "2025-04"])
            .assert()
            .success();
    }

    spendwise(&dir)
        .args(["budget", "list", "--month", "2025-04"])
        .assert()
        .success()
        .stdout(predicate::str::contains("450.00"))
        .stdout(predicate::str::contains("300.00").not());
}

#[test]
fn import_then_export_csv() {
    let dir = TempDir::new().unwrap();
    add_user(&dir, "Ada", "ada@example.com");

    let csv_path = dir.path().join("import.csv");
    std::fs::write(
        &csv_path,
        "date,description,category,amount,currency\n\
         2025-01-05,Groceries,Food,42.10,USD\n\
         2025-01-06,Bus fare,Transport,1500,NGN\n\
         2025-01-06,Bus fare,Transport,1500,NGN\n\
         not-a-date,Broken,,1,USD\n",
    )
    .unwrap();

    spendwise(&dir)
        .args(["expense", "import"])
        .arg(&csv_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 expense(s)"))
        .stdout(predicate::str::contains("Skipped 1 duplicate(s)"))
        .stdout(predicate::str::contains("1 row(s) failed"));

    let out_path = dir.path().join("out.csv");
    spendwise(&dir)
        .args(["export", "csv", "--from", "2025-01-01", "--to", "2025-01-31", "--output"])
        .arg(&out_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 2 expense(s)"));

    let body = std::fs::read_to_string(&out_path).unwrap();
    assert!(body.starts_with('\u{FEFF}'));
    assert!(body.contains("2025-01-05, Groceries, Food, USD 42.10"));
    assert!(body.contains("NGN 1,500.00"));
}

#[test]
fn trends_rejects_too_many_months() {
    let dir = TempDir::new().unwrap();
    add_user(&dir, "Ada", "ada@example.com");

    spendwise(&dir)
        .args(["report", "trends", "--months", "30"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("months"));
}

#[test]
fn import_reports_malformed_amounts_by_row() {
    let dir = TempDir::new().unwrap();
    add_user(&dir, "Ada", "ada@example.com");

    let csv_path = dir.path().join("amounts.csv");
    std::fs::write(
        &csv_path,
        "date,description,amount\n\
         2025-02-01,Snack,1.5€\n\
         2025-02-02,Juice,10.999\n\
         2025-02-03,Bread,2.25\n",
    )
    .unwrap();

    spendwise(&dir)
        .args(["expense", "import"])
        .arg(&csv_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 1 expense(s)"))
        .stdout(predicate::str::contains("row 1: Invalid amount '1.5€'"))
        .stdout(predicate::str::contains("row 2: Invalid amount '10.999'"));
}

#[test]
fn user_history_lists_changes() {
    let dir = TempDir::new().unwrap();
    add_user(&dir, "Ada", "ada@example.com");

    spendwise(&dir)
        .args(["expense", "add", "12.00", "Lunch", "--date", "2025-03-04"])
        .assert()
        .success();

    spendwise(&dir)
        .args(["user", "history", "ada@example.com", "--limit", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CREATE Expense"));
}
