use amp_model::{RawExclusionRule, RawInclusionRule, RawSimpleRule, RawTransformConfig};
use amp_validate::{ConfigError, Severity, into_config, validate};

fn tag_config() -> RawTransformConfig {
    serde_json::from_value(serde_json::json!({
        "apiKey": "12345",
        "includeSelfDescribingEvent": false,
        "extractFromArray": true,
        "includeEntities": "all",
        "entityMappingRules": [
            {
                "key": "iglu:com.youtube/youtube/jsonschema/1-0-0",
                "mappedKey": "youtube",
                "propertiesObjectToPopulate": "event_properties",
                "version": "free"
            },
            {
                "key": "contexts_com_google_tag-manager_server-side_user_data_1",
                "mappedKey": "user_data",
                "propertiesObjectToPopulate": "user_properties",
                "version": "control"
            }
        ],
        "entityExclusionRules": [
            { "key": "contexts_com_snowplowanalytics_snowplow_web_page_5", "version": "free" },
            {
                "key": "iglu:com.snowplowanalytics.snowplow/client_session/jsonschema/1-0-2",
                "version": "control"
            }
        ],
        "includeCommonEventProperties": true,
        "eventMappingRules": [
            {
                "key": "unstruct_event_com_snowplowanalytics_snowplow_media_player_event_1.type",
                "mappedKey": "media_event_type"
            },
            { "key": "name_tracker", "mappedKey": "tracker" }
        ],
        "includeCommonUserProperties": true,
        "mktToUserUtm": false,
        "userMappingRules": [
            {
                "key": "contexts_com_google_tag-manager_server-side_user_data_1.0.email_address",
                "mappedKey": "email"
            }
        ],
        "forwardIp": false,
        "amplitudeTime": "eventProperty",
        "timeProp": "collector_tstamp"
    }))
    .expect("tag config")
}

#[test]
fn tag_configuration_is_valid() {
    assert!(validate(&tag_config()));
    let config = into_config(tag_config()).expect("typed config");
    assert_eq!(config.entity_mapping_rules.len(), 2);
    assert_eq!(config.event_mapping_rules.len(), 2);
}

#[test]
fn empty_rule_lists_are_valid() {
    let config = RawTransformConfig {
        entity_mapping_rules: vec![],
        entity_exclusion_rules: vec![],
        event_mapping_rules: vec![],
        user_mapping_rules: vec![],
        ..tag_config()
    };
    assert!(validate(&config));
}

#[test]
fn missing_api_key_is_invalid() {
    let config = RawTransformConfig {
        api_key: String::new(),
        ..tag_config()
    };
    assert!(!validate(&config));
}

#[test]
fn disallowed_enum_values_are_invalid() {
    let include = RawTransformConfig {
        include_entities: "some".to_string(),
        ..tag_config()
    };
    assert!(!validate(&include));

    let time = RawTransformConfig {
        amplitude_time: "yesterday".to_string(),
        ..tag_config()
    };
    assert!(!validate(&time));

    let mut target = tag_config();
    target.entity_mapping_rules[0].target = "group_properties".to_string();
    assert!(!validate(&target));

    let mut version = tag_config();
    version.entity_exclusion_rules[1].version = "latest".to_string();
    assert!(!validate(&version));
}

#[test]
fn rules_need_keys() {
    let inclusion = RawTransformConfig {
        entity_mapping_rules: vec![RawInclusionRule {
            key: String::new(),
            mapped_key: None,
            target: "event_properties".to_string(),
            version: "free".to_string(),
        }],
        ..tag_config()
    };
    assert!(!validate(&inclusion));

    let exclusion = RawTransformConfig {
        entity_exclusion_rules: vec![RawExclusionRule {
            key: String::new(),
            version: "free".to_string(),
        }],
        ..tag_config()
    };
    assert!(!validate(&exclusion));

    let event = RawTransformConfig {
        event_mapping_rules: vec![RawSimpleRule {
            key: String::new(),
            mapped_key: Some("x".to_string()),
        }],
        ..tag_config()
    };
    assert!(!validate(&event));
}

#[test]
fn event_property_time_requires_time_prop() {
    let config = RawTransformConfig {
        time_prop: String::new(),
        ..tag_config()
    };
    assert!(!validate(&config));

    let current = RawTransformConfig {
        amplitude_time: "current".to_string(),
        time_prop: String::new(),
        ..tag_config()
    };
    assert!(validate(&current));
}

#[test]
fn into_config_reports_every_error() {
    let config = RawTransformConfig {
        api_key: String::new(),
        include_entities: String::new(),
        ..tag_config()
    };
    match into_config(config) {
        Err(ConfigError::Invalid { issues }) => {
            assert_eq!(issues.len(), 2);
            assert!(issues.iter().all(|i| i.severity == Severity::Error));
        }
        other => panic!("expected invalid configuration, got {other:?}"),
    }
}

#[test]
fn validation_does_not_mutate_configuration() {
    let config = tag_config();
    let before = config.clone();
    let _ = validate(&config);
    assert_eq!(config, before);
}
