use serde_json::{json, Value};
use reqwest::StatusCode;
use wallpaper_sync::pages::{
    check_status, delete_confirmed, parse_envelope, parse_list, parse_page, FlarumClient,
};
use wallpaper_sync_core::contract::{NewPage, PageUpdate};
use wallpaper_sync_core::month::MonthKey;
use wallpaper_sync_core::SyncError;

fn client() -> FlarumClient {
    FlarumClient::new("https://forum.example.com/", "abc123").expect("client should build")
}

fn body_json(request: &reqwest::Request) -> Value {
    let bytes = request
        .body()
        .and_then(|b| b.as_bytes())
        .expect("request should carry a buffered body");
    serde_json::from_slice(bytes).unwrap()
}

fn query(request: &reqwest::Request) -> Vec<(String, String)> {
    request.url().query_pairs().into_owned().collect()
}

#[test]
fn test_create_request_shape() {
    let month = MonthKey::parse("2025-06").unwrap();
    let request = client()
        .create_request(&NewPage::for_month(&month, "# June".into()))
        .unwrap();

    assert_eq!(request.method(), reqwest::Method::POST);
    assert_eq!(request.url().as_str(), "https://forum.example.com/api/pages");
    assert_eq!(
        request.headers()[reqwest::header::AUTHORIZATION],
        "Token abc123"
    );
    assert_eq!(
        body_json(&request),
        json!({
            "data": {
                "type": "pages",
                "attributes": {
                    "title": "Bing Wallpaper (2025-06)",
                    "content": "# June",
                    "slug": "bing-wallpaper-2025-06",
                    "isHidden": false,
                    "isHtml": false
                }
            }
        })
    );
}

#[test]
fn test_create_request_omits_absent_slug() {
    let page = NewPage {
        title: "Untitled".into(),
        content: "".into(),
        slug: None,
        is_hidden: true,
        is_html: true,
    };
    let body = body_json(&client().create_request(&page).unwrap());
    let attributes = &body["data"]["attributes"];
    assert!(attributes.get("slug").is_none());
    assert_eq!(attributes["isHidden"], json!(true));
    assert_eq!(attributes["isHtml"], json!(true));
}

#[test]
fn test_update_request_sends_only_given_fields() {
    let fields = PageUpdate::content("new body").with_title("Bing Wallpaper (2025-06)");
    let request = client().update_request(17, &fields).unwrap();

    assert_eq!(request.method(), reqwest::Method::PATCH);
    assert_eq!(request.url().path(), "/api/pages/17");
    assert_eq!(
        body_json(&request),
        json!({
            "data": {
                "type": "pages",
                "id": "17",
                "attributes": { "title": "Bing Wallpaper (2025-06)", "content": "new body" }
            }
        })
    );
}

#[test]
fn test_lookup_and_listing_requests() {
    let c = client();

    let by_id = c.get_request(5).unwrap();
    assert_eq!(by_id.method(), reqwest::Method::GET);
    assert_eq!(by_id.url().path(), "/api/pages/5");

    let by_slug = c.slug_request("bing-wallpaper-2025-06").unwrap();
    assert_eq!(
        query(&by_slug),
        vec![("filter[slug]".to_string(), "bing-wallpaper-2025-06".to_string())]
    );

    let visible = c.list_request(false).unwrap();
    assert_eq!(
        query(&visible),
        vec![("filter[isHidden]".to_string(), "0".to_string())]
    );
    let all = c.list_request(true).unwrap();
    assert!(all.url().query().is_none());

    let delete = c.delete_request(5).unwrap();
    assert_eq!(delete.method(), reqwest::Method::DELETE);
    assert_eq!(delete.url().path(), "/api/pages/5");
    assert_eq!(delete.headers()[reqwest::header::AUTHORIZATION], "Token abc123");
}

#[test]
fn test_parse_envelope_full_resource() {
    let body = json!({
        "data": {
            "type": "pages",
            "id": "42",
            "attributes": {
                "title": "Bing Wallpaper (2025-06)",
                "slug": "bing-wallpaper-2025-06",
                "content": "# June",
                "isHidden": false,
                "isHtml": true,
                "time": "2025-06-01T08:00:00+00:00",
                "editTime": "2025-06-02T09:30:00Z"
            }
        }
    });
    let page = parse_envelope(&body).unwrap();

    assert_eq!(page.id, 42);
    assert_eq!(page.slug, "bing-wallpaper-2025-06");
    assert!(page.is_html);
    assert!(!page.is_hidden);
    assert_eq!(page.created_at.to_rfc3339(), "2025-06-01T08:00:00+00:00");
    assert_eq!(
        page.edited_at.map(|t| t.to_rfc3339()).as_deref(),
        Some("2025-06-02T09:30:00+00:00")
    );
}

#[test]
fn test_parse_page_defaults_for_sparse_attributes() {
    let page = parse_page(&json!({ "id": 7, "attributes": {} })).unwrap();
    assert_eq!(page.id, 7);
    assert_eq!(page.title, "");
    assert_eq!(page.slug, "");
    assert!(!page.is_hidden);
    assert!(page.edited_at.is_none());
}

#[test]
fn test_malformed_envelopes_are_parse_failures() {
    let cases = vec![
        json!({}),
        json!({ "data": [] }),
        json!({ "data": { "id": "abc", "attributes": {} } }),
        json!({ "data": { "id": "1" } }),
        json!({ "errors": [{ "status": "422" }] }),
    ];
    for body in cases {
        assert!(
            matches!(parse_envelope(&body), Err(SyncError::ParseFailure(_))),
            "expected parse failure for {body}"
        );
    }
}

#[test]
fn test_parse_list_drops_malformed_items() {
    let body = json!({
        "data": [
            { "id": "1", "attributes": { "title": "one" } },
            { "id": "two", "attributes": {} },
            { "id": "3", "attributes": { "title": "three" } }
        ]
    });
    let pages = parse_list(&body).unwrap();
    let ids: Vec<i64> = pages.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 3]);

    assert!(matches!(
        parse_list(&json!({ "data": {} })),
        Err(SyncError::ParseFailure(_))
    ));
}

#[test]
fn test_duplicate_slug_on_create_is_a_conflict() {
    for status in [StatusCode::CONFLICT, StatusCode::UNPROCESSABLE_ENTITY] {
        let err = check_status(status, StatusCode::CREATED, "slug taken".into()).unwrap_err();
        assert_eq!(err, SyncError::Conflict("slug taken".into()));
    }
}

#[test]
fn test_check_status_requires_the_exact_expected_status() {
    let body = check_status(StatusCode::CREATED, StatusCode::CREATED, "{}".into()).unwrap();
    assert_eq!(body, "{}");

    // A 200 is still a failure for a create, which must answer 201.
    let err = check_status(StatusCode::OK, StatusCode::CREATED, "{}".into()).unwrap_err();
    assert_eq!(
        err,
        SyncError::UnexpectedStatus {
            status: 200,
            body: "{}".into()
        }
    );

    let err = check_status(StatusCode::NOT_FOUND, StatusCode::OK, "gone".into()).unwrap_err();
    assert_eq!(err, SyncError::NotFound("gone".into()));
}

#[test]
fn test_delete_is_confirmed_only_by_no_content() {
    assert!(delete_confirmed(StatusCode::NO_CONTENT));
    assert!(!delete_confirmed(StatusCode::OK));
    assert!(!delete_confirmed(StatusCode::NOT_FOUND));
}
