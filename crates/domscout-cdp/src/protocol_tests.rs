use super::*;

#[test]
fn test_cdp_request_serialize() {
    let req = CdpRequest {
        id: 7,
        method: "DOM.querySelectorAll".to_string(),
        params: Some(serde_json::json!({"nodeId": 1, "selector": "body *"})),
        session_id: Some("SESSION".to_string()),
    };
    let json: Value = serde_json::to_value(&req).unwrap();
    assert_eq!(json["id"], 7);
    assert_eq!(json["method"], "DOM.querySelectorAll");
    assert_eq!(json["params"]["selector"], "body *");
    assert_eq!(json["sessionId"], "SESSION");
}

#[test]
fn test_cdp_request_omits_empty_fields() {
    let req = CdpRequest {
        id: 1,
        method: "Target.getTargets".to_string(),
        params: None,
        session_id: None,
    };
    let json = serde_json::to_string(&req).unwrap();
    assert!(!json.contains("params"));
    assert!(!json.contains("sessionId"));
}

#[test]
fn test_cdp_response_deserialize() {
    let json = r#"{"id": 1, "result": {"frameId": "abc"}}"#;
    let resp: CdpResponse = serde_json::from_str(json).unwrap();
    assert_eq!(resp.id, Some(1));
    assert!(resp.result.is_some());
    assert!(resp.error.is_none());
}

#[test]
fn test_cdp_error_response_deserialize() {
    let json = r#"{"id": 4, "error": {"code": -32000, "message": "Could not find node with given id"}, "sessionId": "S"}"#;
    let resp: CdpResponse = serde_json::from_str(json).unwrap();
    let error = resp.error.unwrap();
    assert_eq!(error.code, -32000);
    assert_eq!(resp.session_id.as_deref(), Some("S"));
}

#[test]
fn test_cdp_event_deserialize() {
    let json = r#"{"method": "Page.frameNavigated", "params": {"frame": {}}, "sessionId": "S"}"#;
    let resp: CdpResponse = serde_json::from_str(json).unwrap();
    assert!(resp.id.is_none());
    assert_eq!(resp.method.as_deref(), Some("Page.frameNavigated"));
}

#[test]
fn test_browser_version_deserialize() {
    let json = r#"{
        "Browser": "Chrome/131.0.6778.85",
        "Protocol-Version": "1.3",
        "User-Agent": "Mozilla/5.0",
        "V8-Version": "13.1.201.9",
        "webSocketDebuggerUrl": "ws://127.0.0.1:9222/devtools/browser/abc"
    }"#;
    let version: BrowserVersion = serde_json::from_str(json).unwrap();
    assert_eq!(version.browser, "Chrome/131.0.6778.85");
    assert!(version.web_socket_debugger_url.starts_with("ws://"));
}

#[test]
fn test_dom_node_with_frame_deserialize() {
    let json = r##"{
        "nodeId": 10, "backendNodeId": 20, "nodeType": 1, "nodeName": "IFRAME",
        "localName": "iframe", "attributes": ["id", "checkout"],
        "frameId": "F1",
        "contentDocument": {
            "nodeId": 11, "backendNodeId": 21, "nodeType": 9, "nodeName": "#document",
            "documentURL": "https://pay.example.com/"
        }
    }"##;
    let node: DomNode = serde_json::from_str(json).unwrap();
    let doc = node.content_document.unwrap();
    assert_eq!(doc.node_id, 11);
    assert_eq!(doc.document_url.as_deref(), Some("https://pay.example.com/"));
    assert!(node.children.is_none());
}

#[test]
fn test_box_model_deserialize() {
    let json = r#"{
        "content": [1, 1, 9, 1, 9, 5, 1, 5],
        "padding": [0, 0, 10, 0, 10, 6, 0, 6],
        "border": [0, 0, 10, 0, 10, 6, 0, 6],
        "margin": [0, 0, 10, 0, 10, 6, 0, 6],
        "width": 10, "height": 6
    }"#;
    let model: BoxModel = serde_json::from_str(json).unwrap();
    assert_eq!(model.border.len(), 8);
    assert_eq!(model.width, 10);
}

#[test]
fn test_null_remote_object_has_no_id() {
    let json = r#"{"type": "object", "subtype": "null", "value": null}"#;
    let object: RemoteObject = serde_json::from_str(json).unwrap();
    assert!(object.object_id.is_none());
    assert_eq!(object.subtype.as_deref(), Some("null"));
}

#[test]
fn test_exception_message_prefers_description() {
    let json = r#"{
        "exceptionId": 1, "text": "Uncaught", "lineNumber": 0, "columnNumber": 5,
        "exception": {"type": "object", "subtype": "error", "description": "TypeError: x is null"}
    }"#;
    let details: ExceptionDetails = serde_json::from_str(json).unwrap();
    assert_eq!(details.message(), "TypeError: x is null");
}
