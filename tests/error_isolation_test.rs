use anyhow::Result;
use httpmock::prelude::*;
use httpmock::Method::PATCH;
use response_rater::{
    NotionStore, OpenAiRater, RaterConfig, RatingEngine, RatingPipeline, Secrets,
};
use serde_json::json;

const DB_ID: &str = "a1b2c3d4e5f6a1b2c3d4e5f6a1b2c3d4";
const STANDARDS_PAGE_ID: &str = "0f1e2d3c4b5a0f1e2d3c4b5a0f1e2d3c";

fn test_secrets() -> Secrets {
    Secrets {
        notion_api_key: "secret_notion_test".to_string(),
        openai_api_key: "sk-test-123".to_string(),
        responses_db_id: DB_ID.to_string(),
        standards_page_id: STANDARDS_PAGE_ID.to_string(),
    }
}

/// 單一頁面評分失敗只影響該頁：它被標成 Error，其他頁照常完成。
/// 缺欄位的頁面也一樣標成 Error 而不是被丟掉。
#[tokio::test]
async fn failures_are_isolated_per_page() -> Result<()> {
    let notion_server = MockServer::start();
    let openai_server = MockServer::start();

    notion_server.mock(|when, then| {
        when.method(GET)
            .path(format!("/v1/blocks/{}/children", STANDARDS_PAGE_ID));
        then.status(200).json_body(json!({
            "results": [{
                "type": "paragraph",
                "paragraph": { "rich_text": [{ "plain_text": "Be helpful." }] }
            }],
            "has_more": false,
            "next_cursor": null
        }));
    });

    // 三列：一列正常、一列模型會失敗、一列缺 AI Response 欄位
    notion_server.mock(|when, then| {
        when.method(POST)
            .path(format!("/v1/databases/{}/query", DB_ID));
        then.status(200).json_body(json!({
            "results": [
                {
                    "id": "page-good",
                    "properties": {
                        "Prompt": { "title": [{ "plain_text": "first question" }] },
                        "AI Response": { "rich_text": [{ "plain_text": "first answer" }] }
                    }
                },
                {
                    "id": "page-bad-model",
                    "properties": {
                        "Prompt": { "title": [{ "plain_text": "second question" }] },
                        "AI Response": { "rich_text": [{ "plain_text": "second answer" }] }
                    }
                },
                {
                    "id": "page-malformed",
                    "properties": {
                        "Prompt": { "title": [{ "plain_text": "third question" }] }
                    }
                }
            ],
            "has_more": false,
            "next_cursor": null
        }));
    });

    // 模型對兩個完整的頁面各收到一次請求，第二個回 500
    let good_completion = openai_server.mock(|when, then| {
        when.method(POST)
            .path("/v1/chat/completions")
            .body_contains("first question");
        then.status(200).json_body(json!({
            "choices": [{
                "message": {
                    "content": "{\"helpfulness_score\": 9, \"evaluation_notes\": \"Good.\"}"
                }
            }]
        }));
    });
    let failing_completion = openai_server.mock(|when, then| {
        when.method(POST)
            .path("/v1/chat/completions")
            .body_contains("second question");
        then.status(500).body("internal error");
    });

    let rated_update = notion_server.mock(|when, then| {
        when.method(PATCH).path("/v1/pages/page-good").json_body_partial(
            r#"{ "properties": {
                "Status": { "select": { "name": "Rated" } },
                "Helpfulness Score": { "number": 9.0 }
            } }"#,
        );
        then.status(200).json_body(json!({ "id": "page-good" }));
    });
    let model_error_update = notion_server.mock(|when, then| {
        when.method(PATCH)
            .path("/v1/pages/page-bad-model")
            .json_body_partial(r#"{ "properties": { "Status": { "select": { "name": "Error" } } } }"#);
        then.status(200).json_body(json!({ "id": "page-bad-model" }));
    });
    let malformed_update = notion_server.mock(|when, then| {
        when.method(PATCH)
            .path("/v1/pages/page-malformed")
            .json_body_partial(r#"{ "properties": { "Status": { "select": { "name": "Error" } } } }"#);
        then.status(200).json_body(json!({ "id": "page-malformed" }));
    });

    let mut config = RaterConfig::default();
    config.notion.base_url = notion_server.base_url();
    config.openai.base_url = openai_server.base_url();
    let secrets = test_secrets();

    let store = NotionStore::new(&config, &secrets)?;
    let rater = OpenAiRater::new(&config, &secrets)?;
    let engine = RatingEngine::new(RatingPipeline::new(store, rater));

    let summary = engine.run().await?;

    assert_eq!(summary.fetched, 3);
    assert_eq!(summary.rated, 1);
    assert_eq!(summary.failed, 2);

    good_completion.assert();
    failing_completion.assert();
    rated_update.assert();
    model_error_update.assert();
    malformed_update.assert();

    println!("✅ Error isolation test passed!");
    Ok(())
}

/// 寫回評分失敗時退而求其次把頁面標成 Error
#[tokio::test]
async fn write_failure_falls_back_to_error_status() -> Result<()> {
    let notion_server = MockServer::start();
    let openai_server = MockServer::start();

    notion_server.mock(|when, then| {
        when.method(GET)
            .path(format!("/v1/blocks/{}/children", STANDARDS_PAGE_ID));
        then.status(200).json_body(json!({
            "results": [{
                "type": "paragraph",
                "paragraph": { "rich_text": [{ "plain_text": "Be helpful." }] }
            }],
            "has_more": false,
            "next_cursor": null
        }));
    });

    notion_server.mock(|when, then| {
        when.method(POST)
            .path(format!("/v1/databases/{}/query", DB_ID));
        then.status(200).json_body(json!({
            "results": [{
                "id": "page-1",
                "properties": {
                    "Prompt": { "title": [{ "plain_text": "a question" }] },
                    "AI Response": { "rich_text": [{ "plain_text": "an answer" }] }
                }
            }],
            "has_more": false,
            "next_cursor": null
        }));
    });

    openai_server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200).json_body(json!({
            "choices": [{
                "message": {
                    "content": "{\"clarity_score\": 6, \"evaluation_notes\": \"ok\"}"
                }
            }]
        }));
    });

    // 完整更新（帶 Rated 狀態）失敗，之後的 Error 標記成功
    let rejected_update = notion_server.mock(|when, then| {
        when.method(PATCH)
            .path("/v1/pages/page-1")
            .json_body_partial(r#"{ "properties": { "Status": { "select": { "name": "Rated" } } } }"#);
        then.status(400).body("validation error");
    });
    let fallback_update = notion_server.mock(|when, then| {
        when.method(PATCH)
            .path("/v1/pages/page-1")
            .json_body_partial(r#"{ "properties": { "Status": { "select": { "name": "Error" } } } }"#);
        then.status(200).json_body(json!({ "id": "page-1" }));
    });

    let mut config = RaterConfig::default();
    config.notion.base_url = notion_server.base_url();
    config.openai.base_url = openai_server.base_url();
    let secrets = test_secrets();

    let store = NotionStore::new(&config, &secrets)?;
    let rater = OpenAiRater::new(&config, &secrets)?;
    let engine = RatingEngine::new(RatingPipeline::new(store, rater));

    let summary = engine.run().await?;

    assert_eq!(summary.fetched, 1);
    assert_eq!(summary.rated, 0);
    assert_eq!(summary.failed, 1);

    rejected_update.assert();
    fallback_update.assert();

    Ok(())
}
