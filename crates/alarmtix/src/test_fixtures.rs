//! 🧪 Shared test fixtures: one real-looking SNS alarm envelope and its evil twin.

use serde_json::json;

pub(crate) const TEST_AWS_ACCOUNT_ID: &str = "000111222333";
pub(crate) const TEST_ACCOUNT_ALIAS: &str = "my-cool-account";

const VALID_ALARM_DESCRIPTION: &str =
    r#"{"project":"DPT","component":"Platform","priority":"3","recipient":"test"}"#;
// 💀 note the ';' after "component"
const BROKEN_ALARM_DESCRIPTION: &str =
    r#"{"project":"DPT","component";"Platform","priority":"3","recipient":"test"}"#;

pub(crate) fn sample_event() -> String {
    event_with(
        "paas sps s3 Check WorkflowsTimedOut",
        VALID_ALARM_DESCRIPTION,
    )
}

pub(crate) fn malformed_description_event() -> String {
    event_with("test", BROKEN_ALARM_DESCRIPTION)
}

pub(crate) fn credentials_json(username: &str, password: &str) -> String {
    format!(
        r#"{{"username" : "{}", "password" : "{}"}}"#,
        username, password
    )
}

fn event_with(alarm_name: &str, alarm_description: &str) -> String {
    let the_message = json!({
        "AlarmName": alarm_name,
        "AlarmDescription": alarm_description,
        "AWSAccountId": TEST_AWS_ACCOUNT_ID,
        "NewStateValue": "ALARM",
        "NewStateReason": "Threshold Crossed: 1 datapoint (1.0) was greater than or equal to the threshold (0.0).",
        "StateChangeTime": "2015-05-18T21:29:02.273+0000",
        "Region": "US - N. Virginia",
        "OldStateValue": "OK",
        "Trigger": {
            "MetricName": "WorkflowsCompleted",
            "Namespace": "AWS/SWF",
            "Statistic": "SUM",
            "Unit": null,
            "Dimensions": [
                { "name": "WorkflowTypeVersion", "value": "0.0.1" },
                { "name": "Domain", "value": "paas-sps" },
                { "name": "WorkflowTypeName", "value": "S3Provisioner.check" }
            ],
            "Period": 60,
            "EvaluationPeriods": 1,
            "ComparisonOperator": "GreaterThanOrEqualToThreshold",
            "Threshold": 0.0
        }
    });

    json!({
        "Records": [{
            "EventSource": "aws:sns",
            "EventVersion": "1.0",
            "EventSubscriptionArn": format!("arn:aws:sns:us-east-1:{}:test-topic:1a1c3a30-271d-4a73-a840-97a26d3a0581", TEST_AWS_ACCOUNT_ID),
            "Sns": {
                "Type": "Notification",
                "MessageId": "55e9f511-b020-57bd-be60-b8c5ebfe07d7",
                "TopicArn": format!("arn:aws:sns:us-east-1:{}:test-topic", TEST_AWS_ACCOUNT_ID),
                "Subject": "ALARM: \"paas-sps-s3-check-completed\" in US - N. Virginia",
                "Message": the_message.to_string(),
                "Timestamp": "2015-05-18T21:29:02.335Z",
                "SignatureVersion": "1",
                "MessageAttributes": {}
            }
        }]
    })
    .to_string()
}
