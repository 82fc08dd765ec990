//! Mock tests for the spreadsheet webhook client

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::config::{MemoryConfigProvider, SheetsConfig};
    use crate::core::ServiceClient;
    use crate::services::sheets::SheetsWebhookClient;

    fn create_test_client(mock_server: &MockServer, sheet_name: &str) -> SheetsWebhookClient {
        SheetsWebhookClient::new_with_config(SheetsConfig {
            webhook_url: format!("{}/macros/exec", mock_server.uri()),
            sheet_id: "sheet-123".to_string(),
            sheet_name: sheet_name.to_string(),
            timeout_seconds: 5,
        })
        .expect("Failed to build webhook client")
    }

    #[tokio::test]
    async fn test_send_row_query_parameters() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/macros/exec"))
            .and(query_param("question", "Czy są zniżki?"))
            .and(query_param("answer", "Tak & nie"))
            .and(query_param("isRated", "false"))
            .and(query_param("sheetId", "sheet-123"))
            .and(query_param("sheetName", "Sheet1"))
            .and(query_param("callback", "noop"))
            .respond_with(ResponseTemplate::new(200).set_body_string("noop({\"ok\":true})"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server, "Sheet1");
        let result = client
            .send_row([
                ("question", "Czy są zniżki?"),
                ("answer", "Tak & nie"),
                ("isRated", "false"),
            ])
            .await;

        tokio_test::assert_ok!(result);
    }

    #[tokio::test]
    async fn test_send_row_failure_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/macros/exec"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Script error"))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server, "Feedback");
        let error = client.send_row([("question", "q")]).await.unwrap_err();

        assert_eq!(error.status_code(), Some(500));
        assert_eq!(error.remote_detail(), "Script error");
    }

    #[test]
    fn test_row_url_order() {
        let client = SheetsWebhookClient::new_with_config(SheetsConfig {
            webhook_url: "https://script.example.com/exec?deployment=1".to_string(),
            sheet_id: "abc".to_string(),
            sheet_name: "Arkusz 1".to_string(),
            timeout_seconds: 5,
        })
        .unwrap();

        let url = client.row_url([("question", "a b")]);
        assert_eq!(
            url.as_str(),
            "https://script.example.com/exec?deployment=1&question=a+b&sheetId=abc&sheetName=Arkusz+1&callback=noop"
        );
        assert_eq!(client.sheet_name(), "Arkusz 1");
        assert_eq!(client.name(), "sheets");
    }

    #[test]
    fn test_row_url_replaces_existing_parameters() {
        let client = SheetsWebhookClient::new_with_config(SheetsConfig {
            webhook_url: "https://script.example.com/exec?sheetName=Old&deployment=1&callback=cb".to_string(),
            sheet_id: "abc".to_string(),
            sheet_name: "Sheet1".to_string(),
            timeout_seconds: 5,
        })
        .unwrap();

        let url = client.row_url([("question", "q")]);
        assert_eq!(
            url.as_str(),
            "https://script.example.com/exec?deployment=1&question=q&sheetId=abc&sheetName=Sheet1&callback=noop"
        );

        let callbacks: Vec<_> = url.query_pairs().filter(|(key, _)| key == "callback").collect();
        assert_eq!(callbacks.len(), 1);
    }

    #[test]
    fn test_from_provider_disabled_without_settings() {
        let mut provider = MemoryConfigProvider::new();
        provider.set("google_webhook_url", "https://script.example.com/exec");

        let client = SheetsWebhookClient::from_provider(&provider).unwrap();
        assert!(client.is_none());
    }
}
