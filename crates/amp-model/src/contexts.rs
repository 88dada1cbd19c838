//! Entity properties with a fixed meaning for the Amplitude mapping.

/// Google Tag Manager server-side `user_data` entity.
pub const SGTM_USER_DATA: &str = "contexts_com_google_tag-manager_server-side_user_data_1";
/// Snowplow `client_session` entity.
pub const CLIENT_SESSION: &str = "contexts_com_snowplowanalytics_snowplow_client_session_1";
/// Snowplow `mobile_context` entity.
pub const MOBILE_CONTEXT: &str = "contexts_com_snowplowanalytics_snowplow_mobile_context_1";
/// YAUAA user-agent parsing entity.
pub const YAUAA_CONTEXT: &str = "contexts_nl_basjes_yauaa_context_1";
