use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::rc::Rc;

use reqline::app::open_engine;
use reqline::{
    parse_request, parse_request_with, Config, Engine, ExecutionError, PersistenceError, Persist,
    ResponseBody, Transport, TransportError, WireRequest, WireResponse,
};

/// Answers known `METHOD url` pairs with a canned status and body and
/// fails everything else like an unreachable host.
#[derive(Default)]
struct StubTransport {
    routes: HashMap<String, (u16, &'static str)>,
    calls: Rc<RefCell<Vec<WireRequest>>>,
}

impl StubTransport {
    fn route(mut self, method: &str, url: &str, status: u16, body: &'static str) -> Self {
        self.routes
            .insert(format!("{} {}", method, url), (status, body));
        self
    }
}

impl Transport for StubTransport {
    fn execute(&self, request: WireRequest) -> Result<WireResponse, TransportError> {
        let key = format!("{} {}", request.method(), request.uri());
        self.calls.borrow_mut().push(request);
        let (status, body) = self
            .routes
            .get(&key)
            .copied()
            .ok_or_else(|| format!("Connection failed: no route for {}", key))?;
        Ok(http::Response::builder()
            .status(status)
            .body(ResponseBody::from(body))?)
    }
}

/// Writer that keeps every payload it is given
fn capture() -> (Rc<RefCell<Vec<Vec<u8>>>>, Box<dyn Persist>) {
    let writes = Rc::new(RefCell::new(Vec::new()));
    let sink = writes.clone();
    let writer = move |bytes: &[u8]| -> io::Result<()> {
        sink.borrow_mut().push(bytes.to_vec());
        Ok(())
    };
    (writes, Box::new(writer))
}

fn last_write(writes: &Rc<RefCell<Vec<Vec<u8>>>>) -> String {
    String::from_utf8(writes.borrow().last().cloned().unwrap_or_default()).unwrap()
}

#[test]
fn execute_records_one_history_entry() {
    let transport = StubTransport::default().route("POST", "https://my-api.com/posts", 201, "{}");
    let (writes, writer) = capture();
    let engine = Engine::new(transport)
        .with_history(
            &br#"[{"request":"GET https://pkg.go.dev","responseCode":200}]"#[..],
            Some(writer),
        )
        .unwrap();

    let request = parse_request(r#"POST https://my-api.com/posts {"title":"x"}"#).unwrap();
    let (engine, result) = engine.execute(request);
    let execution = result.unwrap();

    assert_eq!(execution.response.status(), 201);
    assert_eq!(execution.entry.response_code, 201);
    assert!(execution.record_error.is_none());
    assert_eq!(engine.history().len(), 2);
    assert_eq!(writes.borrow().len(), 1);
    assert_eq!(
        last_write(&writes),
        r#"[{"request":"GET https://pkg.go.dev","responseCode":200},{"request":"POST https://my-api.com/posts {\"title\":\"x\"}","responseCode":201}]"#
    );
}

#[test]
fn error_status_still_counts_as_executed() {
    let transport = StubTransport::default().route("GET", "https://x/missing", 404, "not found");
    let (engine, result) = Engine::new(transport).execute(parse_request("GET https://x/missing").unwrap());

    assert_eq!(result.unwrap().entry.response_code, 404);
    assert_eq!(engine.history()[0].response_code, 404);
}

#[test]
fn in_memory_engine_records_without_writing() {
    let transport = StubTransport::default().route("GET", "https://x/", 200, "");
    let (engine, result) = Engine::new(transport).execute(parse_request("GET https://x").unwrap());

    assert!(result.unwrap().record_error.is_none());
    assert_eq!(engine.history().len(), 1);
}

#[test]
fn transport_failure_leaves_history_unchanged() {
    let (writes, writer) = capture();
    let engine = Engine::new(StubTransport::default())
        .with_history(&b""[..], Some(writer))
        .unwrap();

    let (engine, result) = engine.execute(parse_request("GET https://unreachable.test").unwrap());

    assert!(matches!(result.unwrap_err(), ExecutionError::Transport(_)));
    assert!(engine.history().is_empty());
    assert!(writes.borrow().is_empty());
}

#[test]
fn write_failure_keeps_response_and_entry() {
    let transport = StubTransport::default().route("DELETE", "https://x/1", 204, "");
    let writer = |_: &[u8]| -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::Other, "disk full"))
    };
    let engine = Engine::new(transport)
        .with_history(&b""[..], Some(Box::new(writer)))
        .unwrap();

    let (engine, result) = engine.execute(parse_request("DELETE https://x/1").unwrap());
    let execution = result.unwrap();

    assert_eq!(execution.response.status(), 204);
    assert!(matches!(
        execution.record_error,
        Some(PersistenceError::Write(_))
    ));
    assert_eq!(engine.history().len(), 1);
}

#[test]
fn wire_request_carries_params_and_headers() {
    let transport = StubTransport::default().route(
        "GET",
        "https://x/search?q=rust&page=2",
        200,
        "[]",
    );
    let calls = transport.calls.clone();
    let request = parse_request(r#"GET https://x/search?q=go q=?rust page=?2 Accept=:"application/json""#).unwrap();
    let (engine, result) = Engine::new(transport).execute(request);
    assert!(result.is_ok());

    let calls = calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].headers()["accept"], "application/json");
    assert!(calls[0].body().is_empty());
    // history keeps the url as written
    assert_eq!(engine.history()[0].request.url, "https://x/search?q=go");
}

#[test]
fn templated_request_is_rendered_before_execution() {
    let transport = StubTransport::default().route("PUT", "https://x/users/42", 200, "ok");
    let data = serde_json::json!({"user": {"id": 42, "name": "ada"}});
    let request = parse_request_with(
        r#"PUT https://x/users/{{.user.id}} {"name": "{{user.name}}"}"#,
        Some(&data),
    )
    .unwrap();

    assert_eq!(request.json_body.as_deref(), Some(r#"{"name": "ada"}"#));
    let (engine, result) = Engine::new(transport).execute(request);
    assert!(result.is_ok());
    assert_eq!(
        engine.history()[0].request.raw,
        r#"PUT https://x/users/42 {"name": "ada"}"#
    );
}

#[test]
fn save_and_remove_rewrite_the_collection() {
    let (writes, writer) = capture();
    let engine = Engine::new(StubTransport::default())
        .with_saved_requests(&b""[..], Some(writer))
        .unwrap();

    let (engine, result) = engine.save_request(parse_request("GET https://pkg.go.dev").unwrap());
    result.unwrap();
    let (engine, result) =
        engine.save_request(parse_request("POST https:/my-api.com/posts").unwrap());
    result.unwrap();
    assert_eq!(
        last_write(&writes),
        r#"["GET https://pkg.go.dev","POST https:/my-api.com/posts"]"#
    );

    let (engine, result) = engine.remove_saved_request(0);
    result.unwrap();
    assert_eq!(last_write(&writes), r#"["POST https:/my-api.com/posts"]"#);
    assert_eq!(engine.saved_requests().len(), 1);
    assert_eq!(writes.borrow().len(), 3);
}

#[test]
fn remove_out_of_range_changes_nothing() {
    let (writes, writer) = capture();
    let engine = Engine::new(StubTransport::default())
        .with_saved_requests(&br#"["GET https://a"]"#[..], Some(writer))
        .unwrap();

    let (engine, result) = engine.remove_saved_request(1);

    assert!(matches!(
        result.unwrap_err(),
        PersistenceError::IndexOutOfRange { index: 1, len: 1 }
    ));
    assert_eq!(engine.saved_requests().len(), 1);
    assert!(writes.borrow().is_empty());
}

#[test]
fn saved_requests_survive_a_reload() {
    let (writes, writer) = capture();
    let engine = Engine::new(StubTransport::default())
        .with_saved_requests(&b""[..], Some(writer))
        .unwrap();
    let request = parse_request(r#"POST https://x/items Expires=:"Wed, 21 Oct 2015 07:28:00 GMT" name=a b=?"c d""#).unwrap();
    let (engine, result) = engine.save_request(request.clone());
    result.unwrap();
    drop(engine);

    let persisted = writes.borrow().last().cloned().unwrap();
    let reloaded = Engine::new(StubTransport::default())
        .with_saved_requests(&persisted[..], None)
        .unwrap();

    assert_eq!(reloaded.saved_requests(), &vec![request]);
}

#[test]
fn load_fails_fast_on_bad_entry() {
    let bytes = br#"[{"request":"GET https://a","responseCode":200},{"request":"FETCH https://b","responseCode":200}]"#;
    let err = Engine::new(StubTransport::default())
        .with_history(&bytes[..], None)
        .unwrap_err();

    assert!(matches!(err, PersistenceError::ReParseOnLoad { index: 1, .. }));
}

#[test]
fn open_engine_persists_to_configured_files() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        history_file: dir.path().join("state/history.json"),
        saved_requests_file: dir.path().join("state/saved_requests.json"),
        ..Config::default()
    };

    let engine = open_engine(StubTransport::default(), &config).unwrap();
    assert!(engine.history().is_empty());
    let (_, result) = engine.save_request(parse_request("GET https://a").unwrap());
    result.unwrap();

    assert_eq!(
        std::fs::read_to_string(&config.saved_requests_file).unwrap(),
        r#"["GET https://a"]"#
    );
    let engine = open_engine(StubTransport::default(), &config).unwrap();
    assert_eq!(engine.saved_requests()[0].url, "https://a");
}

#[test]
fn open_engine_without_persist_never_writes() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        history_file: dir.path().join("history.json"),
        saved_requests_file: dir.path().join("saved_requests.json"),
        persist: false,
        ..Config::default()
    };

    let engine = open_engine(StubTransport::default(), &config).unwrap();
    let (engine, result) = engine.save_request(parse_request("GET https://a").unwrap());
    result.unwrap();

    assert_eq!(engine.saved_requests().len(), 1);
    assert!(!config.saved_requests_file.exists());
}
