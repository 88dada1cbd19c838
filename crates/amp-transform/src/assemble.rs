//! Amplitude event assembly.

use amp_model::contexts::{MOBILE_CONTEXT, YAUAA_CONTEXT};
use amp_model::{AmplitudeEvent, EventData, EventValue, PropertyMap, TransformConfig};

/// Inputs derived before assembly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Derived {
    pub time: Option<i64>,
    pub session_id: Option<i64>,
    pub event_properties: PropertyMap,
    pub user_properties: PropertyMap,
}

/// Removes top-level null values.
pub fn strip_nulls(props: &mut PropertyMap) {
    props.retain(|_, value| !value.is_null());
}

fn text(value: Option<&EventValue>) -> Option<String> {
    value.and_then(EventValue::as_str).map(str::to_string)
}

fn number(value: Option<&EventValue>) -> Option<f64> {
    value.and_then(EventValue::as_f64)
}

/// Builds the Amplitude event for `event`.
///
/// Device fields come from the YAUAA context first, then the mobile context.
/// A mobile context, when attached, sets all of its fields, so a field it
/// lacks clears the YAUAA or `ip_organization` value.
pub fn assemble(event: &EventData, config: &TransformConfig, derived: Derived) -> AmplitudeEvent {
    let field = |name: &str| text(event.get(name));

    let mut out = AmplitudeEvent {
        event_type: field("event_name"),
        device_id: field("domain_userid"),
        user_id: field("user_id"),
        ip: if config.forward_ip {
            field("user_ipaddress")
        } else {
            None
        },
        time: derived.time,
        session_id: derived.session_id,
        event_properties: derived.event_properties,
        user_properties: derived.user_properties,
        platform: field("platform"),
        country: field("geo_country"),
        region: field("geo_region"),
        city: field("geo_city"),
        location_lat: number(event.get("geo_latitude")),
        location_lng: number(event.get("geo_longitude")),
        carrier: field("ip_organization"),
        language: field("br_lang"),
        insert_id: field("event_id"),
        ..AmplitudeEvent::default()
    };
    strip_nulls(&mut out.event_properties);
    strip_nulls(&mut out.user_properties);

    if let Some(yauaa) = event.first_entity(YAUAA_CONTEXT) {
        out.os_name = text(yauaa.get("operatingSystemName"));
        out.os_version = text(yauaa.get("operatingSystemVersion"));
        out.device_brand = text(yauaa.get("deviceBrand"));
        out.device_model = text(yauaa.get("deviceName"));
    }

    if let Some(mobile) = event.first_entity(MOBILE_CONTEXT) {
        let overrides = [
            (&mut out.os_name, "osType"),
            (&mut out.os_version, "osVersion"),
            (&mut out.device_manufacturer, "deviceManufacturer"),
            (&mut out.device_model, "deviceModel"),
            (&mut out.carrier, "carrier"),
            (&mut out.idfa, "appleIdfa"),
            (&mut out.idfv, "appleIdfv"),
            (&mut out.adid, "androidIdfa"),
        ];
        for (slot, name) in overrides {
            *slot = text(mobile.get(name));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    fn event() -> EventData {
        serde_json::from_value(json!({
            "event_name": "page_view",
            "event_id": "c6ef3124-b53a-4b13-a233-0088f79dcbcb",
            "domain_userid": "d-1",
            "user_ipaddress": "203.0.113.9",
            "platform": "web",
            "geo_country": "GB",
            "geo_latitude": 51.5,
            "geo_longitude": -0.12,
            "ip_organization": "Acme ISP",
            "br_lang": "en-GB",
        }))
        .unwrap()
    }

    #[test]
    fn maps_atomic_fields() {
        let out = assemble(&event(), &TransformConfig::new("key"), Derived::default());
        assert_eq!(out.event_type.as_deref(), Some("page_view"));
        assert_eq!(out.device_id.as_deref(), Some("d-1"));
        assert_eq!(out.insert_id.as_deref(), Some("c6ef3124-b53a-4b13-a233-0088f79dcbcb"));
        assert_eq!(out.country.as_deref(), Some("GB"));
        assert_eq!(out.location_lat, Some(51.5));
        assert_eq!(out.location_lng, Some(-0.12));
        assert_eq!(out.carrier.as_deref(), Some("Acme ISP"));
        assert_eq!(out.language.as_deref(), Some("en-GB"));
        assert_eq!(out.user_id, None);
        assert_eq!(out.region, None);
    }

    #[test]
    fn ip_is_forwarded_only_when_enabled() {
        let hidden = assemble(&event(), &TransformConfig::new("key"), Derived::default());
        assert_eq!(hidden.ip, None);

        let config = TransformConfig {
            forward_ip: true,
            ..TransformConfig::new("key")
        };
        let shown = assemble(&event(), &config, Derived::default());
        assert_eq!(shown.ip.as_deref(), Some("203.0.113.9"));
    }

    #[test]
    fn mobile_context_replaces_yauaa_fields() {
        let event = event()
            .with(
                YAUAA_CONTEXT,
                json!([{
                    "operatingSystemName": "Android",
                    "operatingSystemVersion": "13",
                    "deviceBrand": "Google",
                    "deviceName": "Pixel 7"
                }]),
            )
            .with(
                MOBILE_CONTEXT,
                json!([{
                    "osType": "android",
                    "osVersion": "13.0",
                    "deviceManufacturer": "Google",
                    "androidIdfa": "adid-1"
                }]),
            );
        let out = assemble(&event, &TransformConfig::new("key"), Derived::default());
        assert_eq!(out.os_name.as_deref(), Some("android"));
        assert_eq!(out.os_version.as_deref(), Some("13.0"));
        assert_eq!(out.device_brand.as_deref(), Some("Google"));
        assert_eq!(out.device_model, None);
        assert_eq!(out.device_manufacturer.as_deref(), Some("Google"));
        assert_eq!(out.carrier, None);
        assert_eq!(out.adid.as_deref(), Some("adid-1"));
        assert_eq!(out.idfa, None);
    }

    #[test]
    fn yauaa_and_organization_survive_without_mobile_context() {
        let event = event().with(
            YAUAA_CONTEXT,
            json!([{ "operatingSystemName": "Android", "deviceName": "Pixel 7" }]),
        );
        let out = assemble(&event, &TransformConfig::new("key"), Derived::default());
        assert_eq!(out.os_name.as_deref(), Some("Android"));
        assert_eq!(out.device_model.as_deref(), Some("Pixel 7"));
        assert_eq!(out.carrier.as_deref(), Some("Acme ISP"));
    }

    #[test]
    fn property_maps_lose_nulls() {
        let derived = Derived {
            event_properties: PropertyMap::from([
                ("a".to_string(), EventValue::Null),
                ("b".to_string(), EventValue::from("kept")),
            ]),
            user_properties: PropertyMap::from([("c".to_string(), EventValue::Null)]),
            ..Derived::default()
        };
        let out = assemble(&event(), &TransformConfig::new("key"), derived);
        assert_eq!(out.event_properties.len(), 1);
        assert!(out.user_properties.is_empty());
    }

    fn event_value() -> impl Strategy<Value = EventValue> {
        prop_oneof![
            Just(EventValue::Null),
            any::<bool>().prop_map(EventValue::Bool),
            any::<i64>().prop_map(EventValue::Int),
            "[a-z]{0,8}".prop_map(EventValue::Text),
            Just(EventValue::Array(vec![EventValue::Null])),
        ]
    }

    proptest! {
        #[test]
        fn strip_nulls_is_idempotent(
            entries in prop::collection::btree_map("[a-z]{1,6}", event_value(), 0..12)
        ) {
            let mut once: PropertyMap = entries;
            strip_nulls(&mut once);
            let mut twice = once.clone();
            strip_nulls(&mut twice);
            prop_assert_eq!(&once, &twice);
            prop_assert!(once.values().all(|v| !v.is_null()));
        }
    }
}
