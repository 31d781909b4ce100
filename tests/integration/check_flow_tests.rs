// End-to-end checks: HTTP fetch -> extraction -> decision -> email rendering

use price_watch::models::{CheckFailure, ExtractionFailure, NotificationStatus};
use price_watch::{CheckOutcome, Currency};
use rust_decimal::Decimal;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

async fn serve(status: u16, body: String) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PRODUCT_PATH))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .expect(1)
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_price_below_target_emails_alert() {
    let server = serve(200, product_page("$49.99")).await;
    let env = test_env(&format!("{}{}", server.uri(), PRODUCT_PATH), "50.00");
    let transport = RecordingTransport::default();
    let tracker = create_tracker(load_config(&env), Box::new(transport.clone()));

    let report = tracker.check_price().await;

    match &report.outcome {
        CheckOutcome::Alert { quote, savings, .. } => {
            assert_eq!(quote.amount(), Decimal::new(4999, 2));
            assert_eq!(quote.currency(), Currency::Usd);
            assert_eq!(*savings, Decimal::new(1, 2));
        }
        other => panic!("expected alert, got {:?}", other),
    }
    assert_eq!(report.notification, NotificationStatus::Sent);

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Price Alert: Integration Widget - Now $49.99!");
    assert_eq!(sent[0].to, "me@example.com");
    assert!(sent[0].html_body.contains("$49.99"));
    assert!(sent[0].html_body.contains("$0.01"));
    assert!(sent[0].text_body.contains("Savings: $0.01"));
}

#[tokio::test]
async fn test_price_equal_to_target_is_alert() {
    let server = serve(200, product_page("$50.00")).await;
    let env = test_env(&format!("{}{}", server.uri(), PRODUCT_PATH), "50");
    let transport = RecordingTransport::default();
    let tracker = create_tracker(load_config(&env), Box::new(transport.clone()));

    let report = tracker.check_price().await;

    assert!(report.outcome.is_alert());
    assert!(transport.sent()[0].text_body.contains("Savings: $0.00"));
}

#[tokio::test]
async fn test_price_above_target_sends_nothing() {
    let server = serve(200, product_page("$1,234.56")).await;
    let env = test_env(&format!("{}{}", server.uri(), PRODUCT_PATH), "999.99");
    let transport = RecordingTransport::default();
    let tracker = create_tracker(load_config(&env), Box::new(transport.clone()));

    let report = tracker.check_price().await;

    match report.outcome {
        CheckOutcome::AboveTarget { difference, .. } => assert_eq!(difference, Decimal::new(23457, 2)),
        other => panic!("expected above target, got {:?}", other),
    }
    assert_eq!(report.notification, NotificationStatus::NotRequired);
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn test_misdecoded_pound_sign_alert() {
    let server = serve(200, product_page("Â£899.00")).await;
    let env = test_env(&format!("{}{}", server.uri(), PRODUCT_PATH), "900");
    let transport = RecordingTransport::default();
    let tracker = create_tracker(load_config(&env), Box::new(transport.clone()));

    let report = tracker.check_price().await;

    assert_eq!(report.outcome.quote().unwrap().currency(), Currency::Gbp);
    assert_eq!(transport.sent()[0].subject, "Price Alert: Integration Widget - Now £899.00!");
}

#[tokio::test]
async fn test_legacy_markup_still_extracts() {
    let body = r#"<html><body><span id="priceblock_dealprice">$19.99</span></body></html>"#.to_string();
    let server = serve(200, body).await;
    let env = test_env(&format!("{}{}", server.uri(), PRODUCT_PATH), "20");
    let tracker = create_tracker(load_config(&env), Box::new(RecordingTransport::default()));

    let report = tracker.check_price().await;

    let quote = report.outcome.quote().unwrap();
    assert_eq!(quote.selector(), "span#priceblock_dealprice");
    assert_eq!(quote.source_text(), "$19.99");
}

#[tokio::test]
async fn test_challenge_page_is_unavailable() {
    let body = format!(
        "{}<p>To discuss automated access to Amazon data please contact api-services-support@amazon.com.</p>",
        product_page("$5.00")
    );
    let server = serve(200, body).await;
    let env = test_env(&format!("{}{}", server.uri(), PRODUCT_PATH), "50");
    let transport = RecordingTransport::default();
    let tracker = create_tracker(load_config(&env), Box::new(transport.clone()));

    let report = tracker.check_price().await;

    assert!(matches!(
        report.outcome,
        CheckOutcome::Unavailable {
            reason: CheckFailure::Extraction(ExtractionFailure::BotChallenge { .. })
        }
    ));
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn test_server_error_with_notify_on_error_sends_failure_email() {
    let server = serve(503, "Service Unavailable".to_string()).await;
    let mut env = test_env(&format!("{}{}", server.uri(), PRODUCT_PATH), "50");
    env.insert("NOTIFY_ON_ERROR".to_string(), "true".to_string());
    let transport = RecordingTransport::default();
    let tracker = create_tracker(load_config(&env), Box::new(transport.clone()));

    let report = tracker.check_price().await;

    assert_eq!(
        report.outcome,
        CheckOutcome::Unavailable {
            reason: CheckFailure::HttpStatus(503)
        }
    );
    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Price Check Failed - Integration Widget");
    assert!(sent[0].html_body.contains(PRODUCT_PATH));
}

#[tokio::test]
async fn test_transport_error_notifies_only_when_configured() {
    // Nothing listens on port 9 locally
    let url = "http://127.0.0.1:9/dp/B0TESTITEM";

    for notify_on_error in [false, true] {
        let mut env = test_env(url, "50");
        env.insert("NOTIFY_ON_ERROR".to_string(), notify_on_error.to_string());
        let transport = RecordingTransport::default();
        let tracker = create_tracker(load_config(&env), Box::new(transport.clone()));

        let report = tracker.check_price().await;

        assert!(matches!(
            report.outcome,
            CheckOutcome::Unavailable {
                reason: CheckFailure::Transport(_)
            }
        ));
        assert_eq!(transport.sent().len(), usize::from(notify_on_error));
    }
}

#[tokio::test]
async fn test_rejected_email_does_not_fail_the_check() {
    let server = serve(200, product_page("$10.00")).await;
    let env = test_env(&format!("{}{}", server.uri(), PRODUCT_PATH), "50");
    let tracker = create_tracker(load_config(&env), Box::new(RejectingTransport));

    let report = tracker.check_price().await;

    assert!(report.outcome.is_alert());
    assert!(matches!(report.notification, NotificationStatus::Failed(ref e) if e.contains("535")));
}

#[tokio::test]
async fn test_report_serializes_to_json() {
    let server = serve(200, product_page("$49.99")).await;
    let env = test_env(&format!("{}{}", server.uri(), PRODUCT_PATH), "50");
    let tracker = create_tracker(load_config(&env), Box::new(RecordingTransport::default()));

    let report = tracker.check_price().await;
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["product_name"], "Integration Widget");
    assert_eq!(json["outcome"]["outcome"], "alert");
    assert_eq!(json["outcome"]["quote"]["currency"], "USD");
    assert_eq!(json["notification"]["status"], "sent");
}
