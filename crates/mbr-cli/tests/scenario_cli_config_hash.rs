use predicates::prelude::*;

#[test]
fn config_hash_prints_hash_and_canonical_json() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let base = dir.path().join("base.yaml");
    let site = dir.path().join("site.yaml");
    std::fs::write(&base, "thresholds:\n  warning_pct: 0.5\n  acceptable_pct: 0.3\n")?;
    std::fs::write(&site, "thresholds:\n  acceptable_pct: 0.2\n")?;

    let expected = mbr_config::load_layered_yaml(&[
        base.to_string_lossy().as_ref(),
        site.to_string_lossy().as_ref(),
    ])?;

    let mut cmd = assert_cmd::Command::cargo_bin("mbr")?;
    cmd.current_dir(dir.path())
        .args(["config-hash"])
        .arg(&base)
        .arg(&site);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "config_hash={}",
            expected.config_hash
        )))
        .stdout(predicate::str::contains(
            r#"{"thresholds":{"acceptable_pct":0.2,"warning_pct":0.5}}"#,
        ));
    Ok(())
}

#[test]
fn config_hash_fails_on_missing_layer() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut cmd = assert_cmd::Command::cargo_bin("mbr")?;
    cmd.current_dir(dir.path())
        .args(["config-hash", "does-not-exist.yaml"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("failed to read yaml path"));
    Ok(())
}
