use anyhow::Result;
use httpmock::prelude::*;
use postmark_client::{BatchMail, Mail, PostmarkError};

fn messages() -> Vec<Mail> {
    (1..=2)
        .map(|i| Mail {
            api_key: Some("test".to_string()),
            sender: Some("from@example.com".to_string()),
            to: vec![format!("to{}@example.com", i)],
            subject: Some("Subject".to_string()),
            text_body: Some("Body".to_string()),
            ..Mail::default()
        })
        .collect()
}

fn batch(api_url: String) -> BatchMail {
    BatchMail {
        api_url,
        ..BatchMail::new(messages(), "test")
    }
}

#[test]
fn test_batch_send_success() -> Result<()> {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/email/batch")
            .header("X-Postmark-Server-Token", "test")
            .body_contains(r#""To":"to1@example.com""#)
            .body_contains(r#""To":"to2@example.com""#);
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!([
                {
                    "To": "to1@example.com",
                    "SubmittedAt": "2014-02-17T07:25:01.4178645-05:00",
                    "MessageID": "b7bc2f4a-e38e-4336-af7d-e6c392c2f817",
                    "ErrorCode": 0,
                    "Message": "OK"
                },
                {
                    "ErrorCode": 406,
                    "Message": "You tried to send to a recipient that has been marked as inactive."
                }
            ]));
    });

    let responses = batch(server.base_url()).send()?;

    api_mock.assert();
    assert_eq!(responses.len(), 2);
    assert!(responses[0].is_success());
    assert_eq!(responses[1].error_code, 406);
    Ok(())
}

#[test]
fn test_406_error_inactive_recipient() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path("/email/batch");
        then.status(422)
            .body(r#"{"Message": "", "ErrorCode": 406}"#);
    });

    let result = batch(server.base_url()).send();

    api_mock.assert();
    assert!(matches!(
        result,
        Err(PostmarkError::InactiveRecipient { .. })
    ));
}

#[test]
fn test_422_error_unprocessable_entity() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path("/email/batch");
        then.status(422)
            .body(r#"{"Message": "", "ErrorCode": 422}"#);
    });

    let result = batch(server.base_url()).send();

    api_mock.assert();
    assert!(matches!(
        result,
        Err(PostmarkError::UnprocessableEntity { .. })
    ));
}

#[test]
fn test_500_error_server_error() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path("/email/batch");
        then.status(500);
    });

    let result = batch(server.base_url()).send();

    api_mock.assert();
    assert!(matches!(result, Err(PostmarkError::ServerError { .. })));
}
