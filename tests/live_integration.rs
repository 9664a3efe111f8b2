use printess_api::{ErrorKind, Filters, PrintessClient};
use serde_json::json;

fn live_client() -> Option<PrintessClient> {
    match std::env::var("PRINTESS_API_KEY") {
        Ok(key) if !key.trim().is_empty() => {
            Some(PrintessClient::from_env().expect("PRINTESS_API_KEY must be a valid API key"))
        }
        _ => {
            eprintln!("skipping live test: PRINTESS_API_KEY not set");
            None
        }
    }
}

#[tokio::test]
async fn live_directories_and_templates() {
    let Some(printess) = live_client() else {
        return;
    };

    let root = printess
        .directories()
        .load(&json!({}), &Filters::new())
        .await
        .expect("directory tree must load");

    let Some(directory) = root.children.first() else {
        return;
    };

    let templates = printess
        .templates()
        .load_from_user(&json!({ "directoryId": directory.id }), &Filters::new())
        .await
        .expect("templates must load");
    assert!(!templates.user_id.is_empty());
}

#[tokio::test]
async fn live_unknown_job_is_reported() {
    let Some(printess) = live_client() else {
        return;
    };

    let result = printess
        .production()
        .get_simple_status(&json!({ "jobId": "does-not-exist" }), &Filters::new())
        .await;

    if let Err(err) = result {
        assert!(matches!(err.kind(), ErrorKind::Api | ErrorKind::Decode));
        assert!(err.to_string().starts_with('['));
    }
}
