//! Integration tests for the CLI binary.

use assert_cmd::Command;
use predicates::str::contains;
use tempfile::TempDir;

fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("starlog"))
}

fn write_fixture(root: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(root.join("song_data"))?;
    std::fs::create_dir_all(root.join("log_data"))?;
    std::fs::write(
        root.join("song_data/catalog.json"),
        r#"{"song_id":"SOSAMPLE","title":"Test Track","artist_id":"AR1","artist_name":"Test Artist","year":2000,"duration":180.0}
"#,
    )?;
    std::fs::write(
        root.join("log_data/events.json"),
        r#"{"userId":"10","firstName":"Jo","lastName":"Doe","gender":"F","level":"paid","song":"Test Track","artist":"Test Artist","sessionId":5,"page":"NextSong","ts":1541990258796}
"#,
    )?;
    Ok(())
}

#[test]
fn cli_runs_full_pipeline_and_reports_counts() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = TempDir::new()?;
    let input = tmp.path().join("input");
    let output = tmp.path().join("output");
    write_fixture(&input)?;

    cli()
        .args([
            "--input-data",
            input.to_string_lossy().as_ref(),
            "--output-data",
            output.to_string_lossy().as_ref(),
        ])
        .assert()
        .success()
        .stdout(contains("1 songplays"));

    assert!(
        output
            .join("songplay/year=2018/month=11/part-00000.parquet")
            .exists()
    );
    Ok(())
}

#[test]
fn cli_accepts_locations_from_environment() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = TempDir::new()?;
    let input = tmp.path().join("input");
    let output = tmp.path().join("output");
    write_fixture(&input)?;

    cli()
        .env("STARLOG_INPUT_DATA", &input)
        .env("STARLOG_OUTPUT_DATA", &output)
        .assert()
        .success();
    Ok(())
}

#[test]
fn cli_fails_when_input_root_is_missing() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = TempDir::new()?;

    cli()
        .args([
            "--input-data",
            tmp.path().join("nope").to_string_lossy().as_ref(),
            "--output-data",
            tmp.path().join("out").to_string_lossy().as_ref(),
        ])
        .assert()
        .failure()
        .stderr(contains("Pipeline run failed"));
    Ok(())
}

#[test]
fn cli_requires_both_locations() {
    cli()
        .env_remove("STARLOG_INPUT_DATA")
        .env_remove("STARLOG_OUTPUT_DATA")
        .assert()
        .failure();
}
