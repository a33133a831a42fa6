use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

// Isolate every run from the user's config file
fn uvlambda(config_home: &TempDir) -> Result<Command> {
    let mut cmd = Command::cargo_bin("uvlambda")?;
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env_remove("UVLAMBDA_OUT");
    Ok(cmd)
}

#[test]
fn test_version_command() -> Result<()> {
    let home = TempDir::new()?;
    uvlambda(&home)?
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("uvlambda 0.1.0"));
    Ok(())
}

#[test]
fn test_version_subcommand() -> Result<()> {
    let home = TempDir::new()?;
    uvlambda(&home)?
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("uvlambda 0.1.0"));
    Ok(())
}

#[test]
fn test_help_command() -> Result<()> {
    let home = TempDir::new()?;
    uvlambda(&home)?
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Bundles uv-managed Python packages into serverless function assets",
        ))
        .stdout(predicate::str::contains("synth"));
    Ok(())
}

#[test]
fn test_plan_prints_recipe() -> Result<()> {
    let home = TempDir::new()?;
    let workspace = TempDir::new()?;
    uvlambda(&home)?
        .arg("plan")
        .arg("demo-lambda1")
        .arg("--path")
        .arg(workspace.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("uv sync --package demo-lambda1"))
        .stdout(predicate::str::contains("--python 3.11"))
        .stdout(predicate::str::contains("\"UV_LINK_MODE\": \"copy\""))
        .stdout(predicate::str::contains("\"SOURCE_DATE_EPOCH\": \"444444444\""))
        .stdout(predicate::str::contains(
            "demo_lambda1.lambda_function.lambda_handler",
        ));
    Ok(())
}

#[test]
fn test_plan_rejects_architecture_mismatch() -> Result<()> {
    let home = TempDir::new()?;
    uvlambda(&home)?
        .args(["plan", "demo-lambda1", "--architecture", "arm_64"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Only architecture=x86_64 is supported with the default bundling image",
        ));
    Ok(())
}

#[test]
fn test_plan_rejects_unknown_architecture() -> Result<()> {
    let home = TempDir::new()?;
    uvlambda(&home)?
        .args(["plan", "demo-lambda1", "--architecture", "mips"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "[demo-lambda1] Unknown architecture 'mips'",
        ));
    Ok(())
}

#[test]
fn test_plan_rejects_invalid_runtime() -> Result<()> {
    let home = TempDir::new()?;
    uvlambda(&home)?
        .args(["plan", "demo-lambda1", "--runtime", "python3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("[demo-lambda1] Invalid runtime 'python3'"))
        .stderr(predicate::str::contains("[]").not());
    Ok(())
}

#[test]
fn test_plan_warns_on_unpinned_image() -> Result<()> {
    let home = TempDir::new()?;
    uvlambda(&home)?
        .args([
            "plan",
            "demo-lambda1",
            "--architecture",
            "arm_64",
            "--runtime",
            "python3.12",
            "--bundling-image",
            "ghcr.io/astral-sh/uv:python3.12-bookworm-slim",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("--python 3.12"))
        .stdout(predicate::str::contains("\"platform\": \"arm64\""))
        .stderr(predicate::str::contains(
            "Docker image was not provided with hash",
        ));
    Ok(())
}

#[test]
fn test_synth_fails_before_building() -> Result<()> {
    let home = TempDir::new()?;
    let dir = TempDir::new()?;
    std::fs::write(
        dir.path().join("uvlambda.toml"),
        r#"
[[stacks]]
name = "Lambda1Stack"
function_id = "Lambda1"
package_name = "demo-lambda1"
runtime = "python3.12"
"#,
    )?;

    uvlambda(&home)?
        .arg("synth")
        .arg("--out")
        .arg(dir.path().join("cdk.out"))
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Only runtime=python3.11 is supported with the default bundling image",
        ));
    assert!(!dir.path().join("cdk.out").exists());
    Ok(())
}

#[test]
fn test_verify_requires_target() -> Result<()> {
    let home = TempDir::new()?;
    uvlambda(&home)?
        .args(["verify", "--expect", "1"])
        .assert()
        .failure();
    Ok(())
}
