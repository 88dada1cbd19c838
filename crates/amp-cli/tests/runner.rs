//! Integration tests for the line-oriented runner.

use std::io::Cursor;

use amp_cli::config::{ConfigFormat, parse_config};
use amp_cli::runner::{RunStats, run_lines};
use amp_transform::{AmplitudeTransformation, BatmobileFilter, WebUserId};

fn run<T: amp_transform::Transformation>(transformation: &T, input: &str) -> (RunStats, String) {
    let mut output = Vec::new();
    let stats = run_lines(transformation, Cursor::new(input), &mut output).expect("run");
    (stats, String::from_utf8(output).expect("utf-8 output"))
}

#[test]
fn web_uid_recipe_writes_one_result_per_line() {
    let input = concat!(
        r#"{"Data": {"platform": "web", "app_id": "shop", "user_id": "u-1"}}"#,
        "\n",
        r#"{"Data": {"platform": "srv", "app_id": "shop"}}"#,
        "\n",
        "\n",
        "not json\n",
        r#"{"Data": {"platform": "web", "app_id": "blog", "domain_userid": "d-9"}}"#,
        "\n",
    );
    let (stats, output) = run(&WebUserId, input);
    assert_eq!(
        stats,
        RunStats {
            lines: 4,
            transformed: 2,
            filtered: 1,
            failed: 1,
        }
    );
    insta::assert_snapshot!(output.trim_end(), @r#"
    {"Data":{"app_id":"shop","platform":"web","uid":"u-1","user_id":"u-1"},"PartitionKey":"shop"}
    {"FilterOut":true}
    {"Data":{"app_id":"blog","domain_userid":"d-9","platform":"web","uid":"d-9"},"PartitionKey":"blog"}
    "#);
}

#[test]
fn amplitude_run_promotes_atomic_timestamps() {
    let raw = parse_config(
        r#"
apiKey = "12345"
includeEntities = "none"
amplitudeTime = "eventProperty"
timeProp = "derived_tstamp"
"#,
        ConfigFormat::Toml,
    )
    .expect("parse config");
    let transformation = AmplitudeTransformation::from_raw(raw).expect("valid config");
    let input = r#"{"Data": {"event_name": "page_view", "derived_tstamp": "2022-08-01T10:00:00.042Z"}}"#;
    let (stats, output) = run(&transformation, input);
    assert_eq!(stats.transformed, 1);

    let result: serde_json::Value = serde_json::from_str(output.trim()).expect("json output");
    assert_eq!(result["Data"]["api_key"], "12345");
    assert_eq!(result["Data"]["events"][0]["time"], 1_659_348_000_042_i64);
    assert_eq!(result["Data"]["events"][0]["event_type"], "page_view");
}

#[test]
fn empty_input_yields_no_output() {
    let (stats, output) = run(&WebUserId, "");
    assert_eq!(stats, RunStats::default());
    assert!(output.is_empty());
}

#[test]
fn batmobile_recipe_reads_json_text_data() {
    let input = concat!(
        r#"{"Data": "{\"batmobileCount\": 0, \"id\": \"b-1\"}"}"#,
        "\n",
        r#"{"Data": "{\"batmobileCount\": 2, \"id\": \"b-2\"}"}"#,
        "\n",
    );
    let (stats, output) = run(&BatmobileFilter, input);
    assert_eq!(stats.failed, 0);
    assert_eq!(stats.filtered, 1);
    insta::assert_snapshot!(output.trim_end(), @r#"
    {"FilterOut":true}
    {"Data":{"batmobileCount":2,"id":"b-2","name":"Bruce Wayne"},"PartitionKey":"b-2"}
    "#);
}
