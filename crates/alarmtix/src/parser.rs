//! # 🔍 THE EVENT PARSER
//!
//! 🎬 COLD OPEN: INT. ON-CALL LAPTOP: 3:12 AM
//!
//! A CloudWatch alarm fires. SNS wraps it in an envelope. The envelope holds a
//! string. The string is JSON. Inside that JSON is another string. That string
//! is also JSON. Somewhere, a JSON parser sheds a single tear.
//!
//! This module unwraps all three layers and turns them into [`TicketFields`]:
//!
//! ```text
//!   Records[0].Sns.Message ──▶ AlarmPayload ──▶ AlarmDescription ──▶ TicketRouting
//!        (JSON)                 (JSON string)      (JSON string)
//! ```
//!
//! Structural problems come back as a [`ParseError`] with a [`ParseErrorKind`],
//! so the orchestrator can tell "the envelope is junk" apart from "someone
//! fat-fingered the alarm description". 🦆

use serde_json::Value;
use thiserror::Error;

use crate::alias::AccountAliasResolver;
use crate::common::TicketFields;

// 🌎 Hard coded to us-east-1: the alarm console is only linked for that region for now.
const ALARM_URL_PREFIX: &str =
    "https://console.aws.amazon.com/cloudwatch/home?region=us-east-1#alarm:alarmFilter=ANY;name=";
const RUNBOOK_URL_PREFIX: &str = "https://almtools.ldschurch.org/fhconfluence/dosearchsite.action?where=ORB&spaceSearch=true&queryString=";

/// ⚠️ Characters the ticketing search index treats as syntax.
pub const SEARCH_SPECIAL_CHARACTERS: &[char] = &[
    '+', '&', '|', '!', '(', ')', '{', '}', '^', '~', '*', '?', ':', '[', ']', '-',
];

/// 🏷️ Which way the alarm envelope let us down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// no `Records[0].Sns` to be found
    EnvelopeMalformed,
    /// `AlarmDescription` is not valid JSON
    AlarmDescriptionInvalid,
    /// the outer document or the `Message` string is not valid JSON
    InvalidJson,
    /// some other expected key is missing
    MissingField,
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("envelope malformed: JSON document does not contain Records[0].Sns")]
    EnvelopeMalformed,

    #[error("alarm description invalid: AlarmDescription is not valid JSON")]
    AlarmDescriptionInvalid(#[source] serde_json::Error),

    #[error("{what} is not valid JSON")]
    InvalidJson {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("expected field '{field}' is missing from the {section}")]
    MissingField {
        section: &'static str,
        field: &'static str,
    },
}

impl ParseError {
    pub fn kind(&self) -> ParseErrorKind {
        match self {
            ParseError::EnvelopeMalformed => ParseErrorKind::EnvelopeMalformed,
            ParseError::AlarmDescriptionInvalid(_) => ParseErrorKind::AlarmDescriptionInvalid,
            ParseError::InvalidJson { .. } => ParseErrorKind::InvalidJson,
            ParseError::MissingField { .. } => ParseErrorKind::MissingField,
        }
    }
}

/// 📦 Turns raw alarm envelopes into ticket fields.
#[derive(Debug)]
pub struct EventParser {
    alias_resolver: AccountAliasResolver,
}

impl EventParser {
    pub fn new(alias_resolver: AccountAliasResolver) -> Self {
        Self { alias_resolver }
    }

    /// 🚀 Parse one alarm envelope.
    ///
    /// The envelope is fully validated before the alias lookup runs, so a
    /// broken event never costs an IAM call.
    pub async fn parse(&self, raw_event: &[u8]) -> Result<TicketFields, ParseError> {
        let the_alarm = AlarmParts::decode(raw_event)?;
        let the_alias = sanitize_for_search(&self.alias_resolver.friendly_name().await);
        Ok(the_alarm.into_ticket_fields(&the_alias))
    }
}

/// 🧩 The bits of one alarm we actually care about, pulled out of all three layers.
#[derive(Debug, Clone, PartialEq, Eq)]
struct AlarmParts {
    alarm_name: String,
    region: String,
    new_state_reason: String,
    aws_account_id: String,
    project: String,
    component: String,
    priority: String,
    recipient: String,
}

impl AlarmParts {
    fn decode(raw_event: &[u8]) -> Result<Self, ParseError> {
        let the_envelope: Value =
            serde_json::from_slice(raw_event).map_err(|source| ParseError::InvalidJson {
                what: "alarm envelope",
                source,
            })?;

        // 📬 Records[0].Sns, or bust
        let the_sns = the_envelope
            .get("Records")
            .and_then(Value::as_array)
            .and_then(|records| records.first())
            .and_then(|record| record.get("Sns"))
            .filter(|sns| sns.is_object())
            .ok_or(ParseError::EnvelopeMalformed)?;

        let the_message = string_field(the_sns, "notification", "Message")?;
        let the_payload: Value =
            serde_json::from_str(&the_message).map_err(|source| ParseError::InvalidJson {
                what: "alarm message",
                source,
            })?;

        let the_description = string_field(&the_payload, "alarm payload", "AlarmDescription")?;
        let the_routing: Value =
            serde_json::from_str(&the_description).map_err(ParseError::AlarmDescriptionInvalid)?;

        Ok(Self {
            alarm_name: string_field(&the_payload, "alarm payload", "AlarmName")?,
            region: string_field(&the_payload, "alarm payload", "Region")?,
            new_state_reason: string_field(&the_payload, "alarm payload", "NewStateReason")?,
            aws_account_id: string_field(&the_payload, "alarm payload", "AWSAccountId")?,
            project: string_field(&the_routing, "alarm description", "project")?,
            component: string_field(&the_routing, "alarm description", "component")?,
            priority: string_field(&the_routing, "alarm description", "priority")?,
            recipient: string_field(&the_routing, "alarm description", "recipient")?,
        })
    }

    fn into_ticket_fields(self, account_alias: &str) -> TicketFields {
        let summary = format!(
            "CloudWatch Alert [ {} - {} ] - {}",
            account_alias, self.region, self.alarm_name
        );
        let summary_search = sanitize_for_search(&summary);
        let description = format!(
            "Reason:  {} \nAlarm Link: {}\nRunbook Link: {}",
            self.new_state_reason,
            alarm_url(&self.alarm_name),
            runbook_url(&summary_search)
        );

        TicketFields {
            summary,
            summary_search,
            project: self.project,
            component: self.component,
            priority: self.priority,
            recipient: self.recipient,
            description,
            aws_account_id: self.aws_account_id,
        }
    }
}

/// 🔎 Read `field` from `object` as text. Strings come back as-is, numbers and
/// booleans as their JSON text. Anything else counts as missing.
fn string_field(
    object: &Value,
    section: &'static str,
    field: &'static str,
) -> Result<String, ParseError> {
    match object.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(scalar @ (Value::Number(_) | Value::Bool(_))) => Ok(scalar.to_string()),
        _ => Err(ParseError::MissingField { section, field }),
    }
}

/// 🧹 Replace every search-index special character with a single space.
pub fn sanitize_for_search(text: &str) -> String {
    text.chars()
        .map(|c| {
            if SEARCH_SPECIAL_CHARACTERS.contains(&c) {
                ' '
            } else {
                c
            }
        })
        .collect()
}

/// 🔗 Form-encode `value`, then turn every `+` into `%20`.
///
/// Form encoding writes spaces as `+`, and the CloudWatch console does not
/// read `+` as a space. A literal `+` in the input is already `%2B` by then.
pub fn encode_url_value(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

pub fn alarm_url(alarm_name: &str) -> String {
    format!("{}{}", ALARM_URL_PREFIX, encode_url_value(alarm_name))
}

pub fn runbook_url(summary_search: &str) -> String {
    format!("{}{}", RUNBOOK_URL_PREFIX, encode_url_value(summary_search))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alias::UNKNOWN_ALIAS;
    use crate::backends::in_mem::FixedAlias;
    use crate::test_fixtures::{
        TEST_ACCOUNT_ALIAS, TEST_AWS_ACCOUNT_ID, malformed_description_event, sample_event,
    };

    fn the_parser() -> EventParser {
        EventParser::new(AccountAliasResolver::new(Box::new(FixedAlias::Alias(
            TEST_ACCOUNT_ALIAS.to_string(),
        ))))
    }

    async fn parse_sample() -> TicketFields {
        the_parser()
            .parse(sample_event().as_bytes())
            .await
            .expect("💀 The sample alarm should parse. It's the sample. It's in the name.")
    }

    #[tokio::test]
    async fn the_one_where_the_routing_fields_come_through_verbatim() {
        let the_fields = parse_sample().await;

        assert_eq!(the_fields.aws_account_id, TEST_AWS_ACCOUNT_ID);
        assert_eq!(the_fields.project, "DPT");
        assert_eq!(the_fields.component, "Platform");
        assert_eq!(the_fields.priority, "3");
        assert_eq!(the_fields.recipient, "test");
    }

    #[tokio::test]
    async fn the_one_where_the_summary_wears_the_sanitized_alias() {
        let the_fields = parse_sample().await;

        assert_eq!(
            the_fields.summary,
            "CloudWatch Alert [ my cool account - US - N. Virginia ] - paas sps s3 Check WorkflowsTimedOut"
        );
    }

    #[tokio::test]
    async fn the_one_where_summary_search_has_no_special_characters_left() {
        let the_fields = parse_sample().await;

        assert!(
            !the_fields.summary_search.contains(SEARCH_SPECIAL_CHARACTERS),
            "💀 summary_search still has syntax in it: '{}'",
            the_fields.summary_search
        );
        assert_eq!(
            the_fields.summary_search,
            "CloudWatch Alert   my cool account   US   N. Virginia     paas sps s3 Check WorkflowsTimedOut"
        );
    }

    #[tokio::test]
    async fn the_one_where_the_description_links_to_the_alarm_console() {
        let the_fields = parse_sample().await;

        let the_expected_link = "https://console.aws.amazon.com/cloudwatch/home?region=us-east-1#alarm:alarmFilter=ANY;name=paas%20sps%20s3%20Check%20WorkflowsTimedOut";
        assert!(
            the_fields.description.contains(the_expected_link),
            "Alarm URL is wrong. Expected '{}' to contain '{}'",
            the_fields.description,
            the_expected_link
        );
    }

    #[tokio::test]
    async fn the_one_where_the_description_is_three_labelled_lines() {
        let the_fields = parse_sample().await;

        assert!(the_fields.description.contains("Reason"));
        assert!(the_fields.description.contains("Runbook Link"));

        let the_lines: Vec<&str> = the_fields.description.split('\n').collect();
        assert_eq!(the_lines.len(), 3);
        assert_eq!(
            the_lines[0],
            "Reason:  Threshold Crossed: 1 datapoint (1.0) was greater than or equal to the threshold (0.0). "
        );
        assert!(the_lines[1].starts_with("Alarm Link: https://console.aws.amazon.com/"));
        assert_eq!(
            the_lines[2],
            "Runbook Link: https://almtools.ldschurch.org/fhconfluence/dosearchsite.action?where=ORB&spaceSearch=true&queryString=CloudWatch%20Alert%20%20%20my%20cool%20account%20%20%20US%20%20%20N.%20Virginia%20%20%20%20%20paas%20sps%20s3%20Check%20WorkflowsTimedOut"
        );
    }

    #[tokio::test]
    async fn the_one_where_a_broken_alias_lookup_still_files_the_ticket() {
        let the_parser = EventParser::new(AccountAliasResolver::new(Box::new(FixedAlias::Broken)));

        let the_fields = the_parser
            .parse(sample_event().as_bytes())
            .await
            .expect("💀 A missing alias must never stop the parse.");

        assert!(the_fields.summary.contains(&format!("[ {} - ", UNKNOWN_ALIAS)));
    }

    #[tokio::test]
    async fn the_one_where_there_are_no_records_at_all() {
        let the_err = the_parser()
            .parse(br#"{"key1":"value1"}"#)
            .await
            .expect_err("💀 No Records should be a parse error");

        assert_eq!(the_err.kind(), ParseErrorKind::EnvelopeMalformed);
    }

    #[tokio::test]
    async fn the_one_where_the_records_are_there_but_empty_or_sns_less() {
        for the_event in [r#"{"Records":[]}"#, r#"{"Records":[{"EventSource":"aws:sns"}]}"#] {
            let the_err = the_parser()
                .parse(the_event.as_bytes())
                .await
                .expect_err("💀 No Sns should be a parse error");

            assert_eq!(the_err.kind(), ParseErrorKind::EnvelopeMalformed, "event: {}", the_event);
        }
    }

    #[tokio::test]
    async fn the_one_where_the_alarm_description_is_not_json() {
        let the_err = the_parser()
            .parse(malformed_description_event().as_bytes())
            .await
            .expect_err("💀 A broken AlarmDescription should be a parse error");

        assert_eq!(the_err.kind(), ParseErrorKind::AlarmDescriptionInvalid);
    }

    #[tokio::test]
    async fn the_one_where_the_envelope_is_not_even_json() {
        let the_err = the_parser()
            .parse(b"this is not the alarm you are looking for")
            .await
            .expect_err("💀 Plain text is not an envelope");

        assert_eq!(the_err.kind(), ParseErrorKind::InvalidJson);
    }

    #[tokio::test]
    async fn the_one_where_the_envelope_is_fine_but_the_message_is_not_json() {
        let the_err = the_parser()
            .parse(br#"{"Records":[{"Sns":{"Message":"not json"}}]}"#)
            .await
            .expect_err("💀 A plain-text Message is not an alarm");

        assert_eq!(the_err.kind(), ParseErrorKind::InvalidJson);
        match the_err {
            ParseError::InvalidJson { what, .. } => assert_eq!(what, "alarm message"),
            plot_twist => panic!("💀 Expected InvalidJson for the message, got {:?}", plot_twist),
        }
    }

    #[tokio::test]
    async fn the_one_where_the_region_went_missing() {
        let the_message = serde_json::json!({
            "AlarmName": "x",
            "AlarmDescription": r#"{"project":"DPT","component":"Platform","priority":"3","recipient":"test"}"#,
            "AWSAccountId": TEST_AWS_ACCOUNT_ID,
            "NewStateReason": "because",
        });
        let the_event = serde_json::json!({
            "Records": [{ "Sns": { "Message": the_message.to_string() } }]
        });

        let the_err = the_parser()
            .parse(the_event.to_string().as_bytes())
            .await
            .expect_err("💀 No Region should be a parse error");

        assert_eq!(the_err.kind(), ParseErrorKind::MissingField);
        assert!(the_err.to_string().contains("Region"));
    }

    #[tokio::test]
    async fn the_one_where_a_numeric_priority_is_still_a_priority() {
        let the_message = serde_json::json!({
            "AlarmName": "x",
            "AlarmDescription": r#"{"project":"DPT","component":"Platform","priority":3,"recipient":"test"}"#,
            "AWSAccountId": TEST_AWS_ACCOUNT_ID,
            "NewStateReason": "because",
            "Region": "US - N. Virginia",
        });
        let the_event = serde_json::json!({
            "Records": [{ "Sns": { "Message": the_message.to_string() } }]
        });

        let the_fields = the_parser()
            .parse(the_event.to_string().as_bytes())
            .await
            .expect("💀 priority 3 without quotes is still priority 3");

        assert_eq!(the_fields.priority, "3");
    }

    #[test]
    fn the_one_where_every_special_character_becomes_a_space() {
        assert_eq!(
            sanitize_for_search("a+b&c|d!e(f)g{h}i^j~k*l?m:n[o]p-q"),
            "a b c d e f g h i j k l m n o p q"
        );
        assert_eq!(sanitize_for_search("nothing to see here."), "nothing to see here.");
    }

    #[test]
    fn the_one_where_spaces_become_percent_twenty_not_plus() {
        let the_encoded = encode_url_value("paas sps s3 Check WorkflowsTimedOut");

        assert!(!the_encoded.contains('+'));
        assert_eq!(the_encoded, "paas%20sps%20s3%20Check%20WorkflowsTimedOut");
    }

    #[test]
    fn the_one_where_a_real_plus_survives_as_percent_two_b() {
        assert_eq!(encode_url_value("a+b c"), "a%2Bb%20c");
        assert_eq!(encode_url_value("safe-chars_.*"), "safe-chars_.*");
        assert_eq!(encode_url_value("caf\u{e9}/x"), "caf%C3%A9%2Fx");
    }
}
