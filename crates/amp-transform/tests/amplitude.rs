//! End-to-end tests for the Amplitude transformation.

use amp_model::{EngineInput, RawTransformConfig};
use amp_transform::{AmplitudeTransformation, Transformation};
use serde_json::{Value, json};

fn tag_config() -> Value {
    json!({
        "apiKey": "12345",
        "includeSelfDescribingEvent": true,
        "extractFromArray": true,
        "includeEntities": "none",
        "entityMappingRules": [
            {
                "key": "iglu:com.acme/user/jsonschema/1-0-0",
                "mappedKey": "user",
                "propertiesObjectToPopulate": "user_properties",
                "version": "control"
            },
            {
                "key": "contexts_com_snowplowanalytics_snowplow_web_page_1",
                "target": "event_properties",
                "version": "free"
            }
        ],
        "entityExclusionRules": [
            {
                "key": "iglu:com.snowplowanalytics.snowplow/client_session/jsonschema/1-0-2",
                "version": "control"
            }
        ],
        "includeCommonEventProperties": true,
        "eventMappingRules": [
            { "key": "unstruct_event_com_acme_click_1.target", "mappedKey": "click_target" }
        ],
        "includeCommonUserProperties": false,
        "mktToUserUtm": true,
        "userMappingRules": [],
        "forwardIp": false,
        "amplitudeTime": "eventProperty",
        "timeProp": "collector_tstamp"
    })
}

fn web_event() -> Value {
    json!({
        "app_id": "shop",
        "platform": "web",
        "event_id": "e-1",
        "event_name": "click",
        "domain_userid": "d-1",
        "user_id": "u-1",
        "user_ipaddress": "203.0.113.9",
        "collector_tstamp": "2022-08-01T10:00:00.123Z",
        "page_url": "https://shop.test/",
        "page_title": "Shop",
        "dvce_screenwidth": 1920,
        "dvce_screenheight": 1080,
        "mkt_source": "mail",
        "br_lang": "en-GB",
        "unstruct_event_com_acme_click_1": { "target": "cta" },
        "contexts_com_acme_user_1": [{ "plan": "pro" }],
        "contexts_com_acme_other_1": [{ "x": 1 }],
        "contexts_com_snowplowanalytics_snowplow_web_page_1": [{ "id": "pv-1" }],
        "contexts_com_snowplowanalytics_snowplow_client_session_1": [
            { "firstEventTimestamp": "2022-08-01T09:30:00.000Z", "sessionIndex": 3 }
        ]
    })
}

fn transformation(config: Value) -> AmplitudeTransformation {
    let raw: RawTransformConfig = serde_json::from_value(config).expect("deserialize config");
    AmplitudeTransformation::from_raw(raw).expect("valid config")
}

fn input(event: Value) -> EngineInput {
    let mut input: EngineInput =
        serde_json::from_value(json!({ "Data": event })).expect("deserialize input");
    input.data.promote_atomic_timestamps();
    input
}

#[test]
fn web_event_becomes_amplitude_upload() {
    let output = transformation(tag_config()).run(&input(web_event()));
    insta::assert_json_snapshot!(output, @r#"
    {
      "Data": {
        "api_key": "12345",
        "events": [
          {
            "event_type": "click",
            "device_id": "d-1",
            "user_id": "u-1",
            "time": 1659348000123,
            "session_id": 1659346200000,
            "event_properties": {
              "click_target": "cta",
              "contexts_com_snowplowanalytics_snowplow_web_page_1": {
                "id": "pv-1"
              },
              "page_location": "https://shop.test/",
              "page_title": "Shop",
              "screen_resolution": "1920x1080",
              "self_describing_event_com_acme_click_1": {
                "target": "cta"
              }
            },
            "user_properties": {
              "user": {
                "plan": "pro"
              },
              "utm_source": "mail"
            },
            "platform": "web",
            "language": "en-GB",
            "insert_id": "e-1"
          }
        ]
      }
    }
    "#);
}

#[test]
fn forward_ip_exposes_client_address() {
    let mut config = tag_config();
    config["forwardIp"] = json!(true);
    let outcome = transformation(config).transform(&input(web_event()));
    let payload = outcome.data().expect("amplitude never filters");
    assert_eq!(payload.events[0].ip.as_deref(), Some("203.0.113.9"));
}

#[test]
fn time_setting_no_omits_time() {
    let mut config = tag_config();
    config["amplitudeTime"] = json!("no");
    let outcome = transformation(config).transform(&input(web_event()));
    assert_eq!(outcome.data().unwrap().events[0].time, None);
}

#[test]
fn time_setting_current_uses_wall_clock() {
    let mut config = tag_config();
    config["amplitudeTime"] = json!("current");
    let before = chrono::Utc::now().timestamp_millis();
    let outcome = transformation(config).transform(&input(web_event()));
    let after = chrono::Utc::now().timestamp_millis();
    let time = outcome.data().unwrap().events[0].time.expect("time set");
    assert!((before..=after).contains(&time));
}

#[test]
fn non_numeric_time_property_omits_time() {
    let mut config = tag_config();
    config["timeProp"] = json!("page_title");
    let outcome = transformation(config).transform(&input(web_event()));
    assert_eq!(outcome.data().unwrap().events[0].time, None);
}

#[test]
fn include_all_passes_unmatched_entities_through() {
    let mut config = tag_config();
    config["includeEntities"] = json!("all");
    let outcome = transformation(config).transform(&input(web_event()));
    let props = &outcome.data().unwrap().events[0].event_properties;
    assert!(props.contains_key("contexts_com_acme_other_1"));
    assert!(!props.contains_key("contexts_com_snowplowanalytics_snowplow_client_session_1"));
}

#[test]
fn invalid_configuration_lists_every_error() {
    let mut config = tag_config();
    config["apiKey"] = json!("");
    config["includeEntities"] = json!("some");
    let raw: RawTransformConfig = serde_json::from_value(config).unwrap();
    let err = AmplitudeTransformation::from_raw(raw).unwrap_err();
    match err {
        amp_validate::ConfigError::Invalid { issues } => assert_eq!(issues.len(), 2),
        other => panic!("expected validation failure, got {other:?}"),
    }
}
