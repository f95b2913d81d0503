use mockito::Matcher;
use pmoprestashop::{PrestashopError, PrestashopWebService, RequestOptions};

const CATEGORY_DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<prestashop xmlns:xlink="http://www.w3.org/1999/xlink">
  <category>
    <id>3</id>
    <active>1</active>
    <name>
      <language id="1">Shoes</language>
    </name>
  </category>
</prestashop>"#;

const ERROR_DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<prestashop xmlns:xlink="http://www.w3.org/1999/xlink">
<errors>
<error>
<code><![CDATA[1]]></code>
<message><![CDATA[Invalid ID]]></message>
</error>
</errors>
</prestashop>"#;

fn client_for(server: &mockito::ServerGuard) -> PrestashopWebService {
    PrestashopWebService::new(&server.url(), "ZQ88PRJX5VWQHCWE4EE7SQ7HPNX00RAJ", false).unwrap()
}

#[test]
fn get_returns_parsed_resource_document() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/api/categories")
        .with_status(200)
        .with_header("content-type", "text/xml")
        .with_body(CATEGORY_DOCUMENT)
        .create();

    let ws = client_for(&server);
    let xml = ws.get(&RequestOptions::resource("categories")).unwrap();

    assert_eq!(xml.name, "prestashop");
    let first_child = xml.children.iter().find_map(|n| n.as_element()).unwrap();
    assert_eq!(first_child.name, "category");
    mock.assert();
}

#[test]
fn get_forwards_recognized_query_parameters() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/api/orders")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("filter[current_state]".into(), "3".into()),
            Matcher::UrlEncoded("limit".into(), "5".into()),
        ]))
        .with_status(200)
        .with_body("<prestashop><orders/></prestashop>")
        .create();

    let ws = client_for(&server);
    let options = RequestOptions::resource("orders")
        .with_param("filter[current_state]", "3")
        .with_param("limit", "5")
        .with_param("unrelated", "dropped");
    ws.get(&options).unwrap();
    mock.assert();
}

#[test]
fn request_error_exposes_status_and_server_message() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("GET", "/api/categories")
        .with_status(404)
        .with_body(ERROR_DOCUMENT)
        .create();

    let ws = client_for(&server);
    let err = ws.get(&RequestOptions::resource("categories")).unwrap_err();

    match &err {
        PrestashopError::Request { status, reason, .. } => {
            assert_eq!(*status, 404);
            assert_eq!(reason, "Not Found");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.has_response());
    assert_eq!(err.server_error_message().as_deref(), Some("Invalid ID"));
    assert_eq!(err.server_error_code(), Some(1));
}

#[test]
fn unknown_status_maps_to_transport_error() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("GET", "/api/categories")
        .with_status(999)
        .with_body("<prestashop/>")
        .create();

    let ws = client_for(&server);
    let err = ws.get(&RequestOptions::resource("categories")).unwrap_err();

    assert!(matches!(err, PrestashopError::Transport(_)));
    assert!(err.to_string().contains("999"));
}

#[test]
fn empty_body_on_success_is_a_transport_error() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("GET", "/api/categories")
        .with_status(200)
        .with_body("")
        .create();

    let ws = client_for(&server);
    let err = ws.get(&RequestOptions::resource("categories")).unwrap_err();

    assert!(matches!(err, PrestashopError::Transport(_)));
    assert!(err.to_string().contains("HTTP response is empty"));
}

#[test]
fn malformed_body_is_an_xml_parse_error() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("GET", "/api/categories")
        .with_status(200)
        .with_body("<malformed>")
        .create();

    let ws = client_for(&server);
    let err = ws.get(&RequestOptions::resource("categories")).unwrap_err();

    assert!(matches!(err, PrestashopError::XmlParse(_)));
}

#[test]
fn unsupported_version_aborts_without_caching() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("GET", "/api/categories")
        .with_status(200)
        .with_header("PSWS-Version", "99.99.99.9999")
        .with_body(CATEGORY_DOCUMENT)
        .create();

    let ws = client_for(&server);
    let err = ws.get(&RequestOptions::resource("categories")).unwrap_err();

    assert!(matches!(err, PrestashopError::UnsupportedVersion(_)));
    assert_eq!(ws.version(), None);
}

#[test]
fn announced_version_is_negotiated_and_cached() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("GET", "/api/categories")
        .with_status(200)
        .with_header("PSWS-Version", "1.7.8.0")
        .with_body(CATEGORY_DOCUMENT)
        .create();

    let ws = client_for(&server);
    assert_eq!(ws.version(), None);
    ws.get(&RequestOptions::resource("categories")).unwrap();
    assert_eq!(ws.version().as_deref(), Some("1.7.8.0"));
}

#[test]
fn add_posts_the_xml_payload() {
    let payload = "<prestashop><category><name>New</name></category></prestashop>";
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/api/categories")
        .match_body(Matcher::Exact(payload.to_string()))
        .with_status(201)
        .with_body(CATEGORY_DOCUMENT)
        .create();

    let ws = client_for(&server);
    let xml = ws
        .add(&RequestOptions::resource("categories").with_post_xml(payload))
        .unwrap();

    assert_eq!(xml.name, "prestashop");
    mock.assert();
}

#[test]
fn add_appends_shop_identifiers() {
    let payload = "<prestashop/>";
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/api/categories")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("id_shop".into(), "2".into()),
            Matcher::UrlEncoded("id_group_shop".into(), "1".into()),
        ]))
        .with_status(201)
        .with_body(CATEGORY_DOCUMENT)
        .create();

    let ws = client_for(&server);
    ws.add(
        &RequestOptions::resource("categories")
            .with_post_xml(payload)
            .with_id_shop(2)
            .with_id_group_shop(1),
    )
    .unwrap();
    mock.assert();
}

#[test]
fn edit_puts_to_the_identified_resource() {
    let payload = "<prestashop><category><id>5</id></category></prestashop>";
    let mut server = mockito::Server::new();
    let mock = server
        .mock("PUT", "/api/categories/5")
        .match_body(Matcher::Exact(payload.to_string()))
        .with_status(200)
        .with_body(CATEGORY_DOCUMENT)
        .create();

    let ws = client_for(&server);
    ws.edit(
        &RequestOptions::resource("categories")
            .with_id(5)
            .with_put_xml(payload),
    )
    .unwrap();
    mock.assert();
}

#[test]
fn delete_targets_a_single_id() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("DELETE", "/api/orders/3")
        .with_status(200)
        .with_body("<prestashop/>")
        .create();

    let ws = client_for(&server);
    ws.delete(&RequestOptions::resource("orders").with_id(3))
        .unwrap();
    mock.assert();
}

#[test]
fn delete_serializes_id_lists_in_brackets() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("DELETE", "/api/orders/")
        .match_query(Matcher::Regex("1,2".to_string()))
        .with_status(200)
        .with_body("<prestashop/>")
        .create();

    let ws = client_for(&server);
    ws.delete(&RequestOptions::resource("orders").with_id(vec![1, 2]))
        .unwrap();
    mock.assert();
}

#[test]
fn get_json_requests_json_output() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/api/orders")
        .match_query(Matcher::UrlEncoded("output_format".into(), "JSON".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"orders":[{"id":1},{"id":2}]}"#)
        .create();

    let ws = client_for(&server);
    let value: serde_json::Value = ws.get_json(&RequestOptions::resource("orders")).unwrap();

    assert_eq!(value["orders"].as_array().unwrap().len(), 2);
    mock.assert();
}

#[test]
fn get_schema_requests_the_blank_variant() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/api/categories")
        .match_query(Matcher::UrlEncoded("schema".into(), "blank".into()))
        .with_status(200)
        .with_body("<prestashop><category><id/><name/></category></prestashop>")
        .create();

    let ws = client_for(&server);
    let schema = ws.get_blank_schema("categories").unwrap();

    assert_eq!(schema.name, "prestashop");
    assert!(
        schema
            .children
            .iter()
            .filter_map(|n| n.as_element())
            .any(|e| e.name == "category")
    );
    mock.assert();
}

#[test]
fn head_returns_the_response_header_block() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("HEAD", "/api/orders")
        .with_status(200)
        .with_header("X-Resource-Count", "42")
        .create();

    let ws = client_for(&server);
    let header_block = ws.head(&RequestOptions::resource("orders")).unwrap();

    assert!(header_block.to_lowercase().contains("x-resource-count: 42"));
    mock.assert();
}

#[test]
fn mutating_operations_reject_incomplete_options_before_any_request() {
    // No server at all: the options are rejected before network I/O.
    let ws = PrestashopWebService::new("http://127.0.0.1:1", "KEY", false).unwrap();

    let add = ws.add(&RequestOptions::default().with_post_xml("<x/>"));
    assert!(matches!(add, Err(PrestashopError::BadParameters(_))));

    let edit = ws.edit(&RequestOptions::default().with_put_xml("<x/>"));
    assert!(matches!(edit, Err(PrestashopError::BadParameters(_))));

    let delete = ws.delete(&RequestOptions::default());
    assert!(matches!(delete, Err(PrestashopError::BadParameters(_))));
}

#[test]
fn connection_failure_is_a_transport_error() {
    // Port 1 refuses connections.
    let ws = PrestashopWebService::new("http://127.0.0.1:1", "KEY", false).unwrap();
    let err = ws.get(&RequestOptions::resource("categories")).unwrap_err();
    assert!(matches!(err, PrestashopError::Transport(_)));
}
