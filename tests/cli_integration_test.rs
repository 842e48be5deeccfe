//! CLI integration tests for command orchestration.
//!
//! Tests cover:
//! - Settings parsing from INI files on disk (build_settings)
//! - split / summary / volatility exports against a temp directory
//! - dashboard rendering with config title, custom template and selection
//! - Exit codes for malformed input, unknown securities and bad config

mod common;

use approx::assert_relative_eq;
use clap::Parser;
use common::*;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use stockdash::adapters::file_config_adapter::FileConfigAdapter;
use stockdash::cli::{self, Cli};
use stockdash::domain::error::StockdashError;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn write_csv(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn run(args: &[&str]) -> ExitCode {
    let mut argv = vec!["stockdash"];
    argv.extend_from_slice(args);
    cli::run(Cli::try_parse_from(argv).unwrap())
}

const VALID_INI: &str = r#"
[data]
path = data/csv/all_stocks.csv

[dashboard]
top_n = 5
recent_rows = 10
cumulative_top = 3

[report]
title = Weekly Market Review
"#;

mod config_loading {
    use super::*;

    #[test]
    fn build_settings_from_file() {
        let file = write_temp_ini(VALID_INI);
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        let settings = cli::build_settings(&adapter).unwrap();
        assert_eq!(settings.top_n, 5);
        assert_eq!(settings.recent_rows, 10);
        assert_eq!(settings.cumulative_top, 3);
    }

    #[test]
    fn negative_recent_rows_is_invalid() {
        let adapter = FileConfigAdapter::from_string("[dashboard]\nrecent_rows = -4\n").unwrap();
        assert!(matches!(
            cli::build_settings(&adapter),
            Err(StockdashError::ConfigInvalid { ref key, .. }) if key == "recent_rows"
        ));
    }

    #[test]
    fn data_path_comes_from_config() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        assert_eq!(
            cli::resolve_input(None, &adapter),
            PathBuf::from("data/csv/all_stocks.csv")
        );
    }

    #[test]
    fn missing_config_file_exits_with_config_code() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = write_csv(dir.path(), "all.csv", COMBINED_CSV);
        let code = run(&[
            "symbols",
            "--input",
            input.to_str().unwrap(),
            "--config",
            "/nonexistent/stockdash.ini",
        ]);
        assert_eq!(code, ExitCode::from(2));
    }

    #[test]
    fn zero_top_n_in_config_exits_with_config_code() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = write_csv(dir.path(), "all.csv", COMBINED_CSV);
        let ini = write_temp_ini("[dashboard]\ntop_n = 0\n");
        let code = run(&[
            "dashboard",
            "--input",
            input.to_str().unwrap(),
            "--config",
            ini.path().to_str().unwrap(),
            "--output",
            dir.path().join("r.typ").to_str().unwrap(),
        ]);
        assert_eq!(code, ExitCode::from(2));
        assert!(!dir.path().join("r.typ").exists());
    }
}

mod exports {
    use super::*;

    #[test]
    fn split_writes_one_sorted_file_per_security() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = write_csv(dir.path(), "all.csv", COMBINED_CSV);
        let out = dir.path().join("stocks");

        let code = run(&[
            "split",
            "--input",
            input.to_str().unwrap(),
            "--output-dir",
            out.to_str().unwrap(),
        ]);
        assert_eq!(code, ExitCode::SUCCESS);

        let mut files: Vec<String> = fs::read_dir(&out)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        files.sort();
        assert_eq!(files, vec!["AAA.csv", "BBB.csv", "CCC.csv"]);

        let aaa = fs::read_to_string(out.join("AAA.csv")).unwrap();
        let lines: Vec<&str> = aaa.lines().collect();
        assert_eq!(lines[0], "Date,Symbol,Open,High,Low,Close,Volume");
        assert!(lines[1].starts_with("2024-01-01,AAA"));
        assert!(lines[3].starts_with("2024-01-03,AAA"));
    }

    #[test]
    fn split_preserves_input_columns() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = write_csv(
            dir.path(),
            "all.csv",
            "Date,Ticker,Close,Volume,Adj Close\n\
             2024-01-02,AAA,10,100,9.9\n\
             2024-01-01,AAA,9,100,8.9\n",
        );
        let out = dir.path().join("stocks");

        let code = run(&[
            "split",
            "--input",
            input.to_str().unwrap(),
            "--output-dir",
            out.to_str().unwrap(),
        ]);
        assert_eq!(code, ExitCode::SUCCESS);
        assert_eq!(
            fs::read_to_string(out.join("AAA.csv")).unwrap(),
            "Date,Ticker,Close,Volume,Adj Close\n\
             2024-01-01,AAA,9,100,8.9\n\
             2024-01-02,AAA,10,100,9.9\n"
        );
    }

    #[test]
    fn split_refuses_identifier_outside_output_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = write_csv(
            dir.path(),
            "all.csv",
            "Date,Symbol,Close,Volume\n2024-01-01,../escape,1,1\n",
        );
        let out = dir.path().join("stocks");

        let code = run(&[
            "split",
            "--input",
            input.to_str().unwrap(),
            "--output-dir",
            out.to_str().unwrap(),
        ]);
        assert_eq!(code, ExitCode::from(6));
        assert!(!dir.path().join("escape.csv").exists());
    }

    #[test]
    fn split_output_reloads_as_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = write_csv(dir.path(), "all.csv", COMBINED_CSV);
        let out = dir.path().join("stocks");
        run(&[
            "split",
            "--input",
            input.to_str().unwrap(),
            "--output-dir",
            out.to_str().unwrap(),
        ]);

        let summary = dir.path().join("summary.csv");
        let code = run(&[
            "summary",
            "--input",
            out.to_str().unwrap(),
            "--output",
            summary.to_str().unwrap(),
        ]);
        assert_eq!(code, ExitCode::SUCCESS);

        let text = fs::read_to_string(summary).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "Symbol,Yearly Return (%),Average Price,Average Volume"
        );
        assert_eq!(lines.len(), 4);
        let aaa: Vec<&str> = lines[1].split(',').collect();
        assert_eq!(aaa[0], "AAA");
        assert_relative_eq!(aaa[1].parse::<f64>().unwrap(), 20.0, epsilon = 1e-9);
        assert_relative_eq!(aaa[2].parse::<f64>().unwrap(), 11.0);
        // A single observation has no return; the cell stays empty.
        let ccc: Vec<&str> = lines[3].split(',').collect();
        assert_eq!(ccc[0], "CCC");
        assert_eq!(ccc[1], "");
        assert_relative_eq!(ccc[2].parse::<f64>().unwrap(), 5.0);
    }

    #[test]
    fn volatility_respects_top_flag() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = write_csv(dir.path(), "all.csv", COMBINED_CSV);
        let output = dir.path().join("vol.csv");

        let code = run(&[
            "volatility",
            "--input",
            input.to_str().unwrap(),
            "--top",
            "1",
            "--output",
            output.to_str().unwrap(),
        ]);
        assert_eq!(code, ExitCode::SUCCESS);

        let text = fs::read_to_string(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Symbol,Volatility");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn malformed_input_exits_with_code_3() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = write_csv(
            dir.path(),
            "bad.csv",
            "Date,Symbol,Close,Volume\nnot-a-date,AAA,1.0,10\n",
        );
        let code = run(&["symbols", "--input", input.to_str().unwrap()]);
        assert_eq!(code, ExitCode::from(3));
    }

    #[test]
    fn missing_input_exits_with_code_1() {
        let code = run(&["symbols", "--input", "/nonexistent/all.csv"]);
        assert_eq!(code, ExitCode::from(1));
    }
}

mod dashboard_command {
    use super::*;

    #[test]
    fn renders_report_with_config_title() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = write_csv(dir.path(), "all.csv", COMBINED_CSV);
        let ini = write_temp_ini(VALID_INI);
        let output = dir.path().join("dash.typ");

        let code = run(&[
            "dashboard",
            "--input",
            input.to_str().unwrap(),
            "--config",
            ini.path().to_str().unwrap(),
            "--select",
            "BBB",
            "--output",
            output.to_str().unwrap(),
        ]);
        assert_eq!(code, ExitCode::SUCCESS);

        let text = fs::read_to_string(output).unwrap();
        assert!(text.contains("= Weekly Market Review"));
        assert!(text.contains("== BBB -- Recent Data"));
        assert!(!text.contains("{{"));
    }

    #[test]
    fn custom_template_from_config() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = write_csv(dir.path(), "all.csv", COMBINED_CSV);
        let template = write_csv(dir.path(), "t.typ", "#{{SELECTED}}# {{SECURITY_LIST}}");
        let ini = write_temp_ini(&format!(
            "[report]\ntemplate_path = {}\n",
            template.display()
        ));
        let output = dir.path().join("dash.typ");

        let code = run(&[
            "dashboard",
            "--input",
            input.to_str().unwrap(),
            "--config",
            ini.path().to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
        ]);
        assert_eq!(code, ExitCode::SUCCESS);
        assert_eq!(
            fs::read_to_string(output).unwrap(),
            "#AAA# *AAA*, BBB, CCC\n"
        );
    }

    #[test]
    fn unknown_selection_exits_with_code_4() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = write_csv(dir.path(), "all.csv", COMBINED_CSV);
        let code = run(&[
            "dashboard",
            "--input",
            input.to_str().unwrap(),
            "--select",
            "ZZZ",
            "--output",
            dir.path().join("dash.typ").to_str().unwrap(),
        ]);
        assert_eq!(code, ExitCode::from(4));
    }

    #[test]
    fn show_unknown_ticker_exits_with_code_4() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = write_csv(dir.path(), "all.csv", COMBINED_CSV);
        let code = run(&["show", "--input", input.to_str().unwrap(), "--ticker", "ZZZ"]);
        assert_eq!(code, ExitCode::from(4));
        let code = run(&[
            "show",
            "--input",
            input.to_str().unwrap(),
            "--ticker",
            "AAA",
            "--rows",
            "2",
        ]);
        assert_eq!(code, ExitCode::SUCCESS);
    }
}
