use anyhow::Result;
use httpmock::prelude::*;
use postmark_client::{AttachmentSource, Mail, PostmarkError};

fn plain_mail(api_url: String) -> Mail {
    Mail {
        api_key: Some("test".to_string()),
        sender: Some("from@example.com".to_string()),
        to: vec!["to@example.com".to_string()],
        subject: Some("Subject".to_string()),
        text_body: Some("Body".to_string()),
        api_url,
        ..Mail::default()
    }
}

fn template_mail(api_url: String) -> Mail {
    Mail {
        api_key: Some("test".to_string()),
        sender: Some("from@example.com".to_string()),
        to: vec!["to@example.com".to_string()],
        template_id: Some(1),
        template_model: Some(serde_json::json!({"junk": "more junk"})),
        api_url,
        ..Mail::default()
    }
}

#[test]
fn test_send_success() -> Result<()> {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/email")
            .header("X-Postmark-Server-Token", "test")
            .header("Content-Type", "application/json")
            .body_contains(r#""From":"from@example.com""#)
            .body_contains(r#""Subject":"Subject""#)
            .body_contains(r#""TextBody":"Body""#);
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "To": "to@example.com",
                "SubmittedAt": "2014-02-17T07:25:01.4178645-05:00",
                "MessageID": "0a129aee-e1cd-480d-b08d-4f48548ff48d",
                "ErrorCode": 0,
                "Message": "OK"
            }));
    });

    let response = plain_mail(server.base_url()).send()?;

    api_mock.assert();
    assert!(response.is_success());
    assert_eq!(response.to.as_deref(), Some("to@example.com"));
    Ok(())
}

#[test]
fn test_406_error_inactive_recipient() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path("/email");
        then.status(422)
            .header("Content-Type", "application/json")
            .body(r#"{"Message": "", "ErrorCode": 406}"#);
    });

    let result = plain_mail(server.base_url()).send();

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
        when.method(POST).path("/email");
        then.status(422)
            .header("Content-Type", "application/json")
            .body(r#"{"Message": "", "ErrorCode": 422}"#);
    });

    let result = plain_mail(server.base_url()).send();

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
        when.method(POST).path("/email");
        then.status(500);
    });

    let result = plain_mail(server.base_url()).send();

    api_mock.assert();
    assert!(matches!(result, Err(PostmarkError::ServerError { .. })));
}

#[test]
fn test_401_unauthorized() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path("/email");
        then.status(401)
            .body(r#"{"ErrorCode": 10, "Message": "Bad or missing API token"}"#);
    });

    let result = plain_mail(server.base_url()).send();

    api_mock.assert();
    assert!(matches!(result, Err(PostmarkError::Unauthorized)));
}

#[test]
fn test_missing_subject_never_reaches_server() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path("/email");
        then.status(200);
    });

    let mail = Mail {
        subject: None,
        ..plain_mail(server.base_url())
    };

    match mail.send() {
        Err(PostmarkError::MissingValue { parameter }) => {
            assert_eq!(parameter, "Cannot send an e-mail without a subject")
        }
        other => panic!("unexpected result: {:?}", other),
    }
    api_mock.assert_hits(0);
}

#[test]
fn test_send_with_template() -> Result<()> {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/email/withTemplate")
            .body_contains(r#""TemplateId":1"#)
            .body_contains(r#""TemplateModel":{"junk":"more junk"}"#);
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "To": "to@example.com",
                "MessageID": "b7bc2f4a-e38e-4336-af7d-e6c392c2f817",
                "ErrorCode": 0,
                "Message": "OK"
            }));
    });

    let response = template_mail(server.base_url()).send_with_template()?;

    api_mock.assert();
    assert!(response.is_success());
    Ok(())
}

#[test]
fn test_send_with_template_requires_both_fields() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path("/email/withTemplate");
        then.status(200);
    });

    let base = template_mail(server.base_url());
    let candidates = [
        plain_mail(server.base_url()),
        Mail {
            template_model: None,
            ..base.clone()
        },
        Mail {
            template_id: None,
            ..base.clone()
        },
    ];

    for mail in candidates {
        match mail.send_with_template() {
            Err(PostmarkError::MissingValue { parameter }) => assert_eq!(
                parameter,
                "Cannot send a template e-mail without a both template_id and template_model set"
            ),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    let with_subject = Mail {
        subject: Some("Subject".to_string()),
        ..base
    };
    match with_subject.send_with_template() {
        Err(PostmarkError::MissingValue { parameter }) => assert_eq!(
            parameter,
            "If using Postmark templates, do not set the subject value"
        ),
        other => panic!("unexpected result: {:?}", other),
    }

    api_mock.assert_hits(0);
}

#[test]
fn test_inline_image_is_sent_as_cid_attachment() -> Result<()> {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/email")
            .body_contains(r#""Name":"logo.png""#)
            .body_contains(r#""ContentType":"image/png""#)
            .body_contains(r#""ContentID":"cid:logo""#)
            .body_contains(r#""Content":"aW1hZ2UtYnl0ZXM=""#);
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"ErrorCode": 0, "Message": "OK"}));
    });

    let mime_part = b"Content-Type: image/png\r\n\
                      Content-Transfer-Encoding: base64\r\n\
                      Content-ID: <logo>\r\n\
                      Content-Disposition: inline; filename=\"logo.png\"\r\n\
                      \r\n\
                      aW1hZ2UtYnl0ZXM=\r\n"
        .to_vec();

    let mail = Mail {
        html_body: Some(r#"<img src="cid:logo">"#.to_string()),
        attachments: vec![AttachmentSource::Mime(mime_part)],
        ..plain_mail(server.base_url())
    };

    mail.send()?;
    api_mock.assert();
    Ok(())
}
