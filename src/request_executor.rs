use std::time::Duration;

use log::debug;
use reqwest::blocking::Client;
use reqwest::Proxy;

use crate::context::{Context, COOKIES_KEY, PROXIES_KEY};
use crate::errors::FatalError;
use crate::request::Request;
use crate::response::Response;

/// Everything the single outbound call needs beyond the request itself:
/// a client carrying the proxy and timeout settings, plus the cookie
/// header value from the context.
pub struct ExecutionContext {
    client: Client,
    cookies: Option<String>,
}

impl ExecutionContext {
    pub fn new(
        context: &Context,
        timeout: Option<Duration>,
    ) -> Result<ExecutionContext, FatalError> {
        // the blocking client defaults to 30s; without --timeout there is none
        let mut builder = Client::builder().timeout(timeout);
        if let Some(proxy_url) = context.get(PROXIES_KEY) {
            let proxy =
                Proxy::all(proxy_url).map_err(|e| FatalError::ConnectionFailure(e.to_string()))?;
            builder = builder.proxy(proxy);
        }
        let client = builder
            .build()
            .map_err(|e| FatalError::ConnectionFailure(e.to_string()))?;
        return Ok(ExecutionContext {
            client,
            cookies: context.get(COOKIES_KEY).map(str::to_string),
        });
    }
}

/// Make the one network call of the invocation and capture its result.
pub fn execute_request(
    request: &Request,
    context: &ExecutionContext,
) -> Result<Response, FatalError> {
    let method = request.method.to_uppercase();
    // GET and DELETE never carry a body; POST and PUT always do
    let mut builder = match method.as_str() {
        "GET" => context.client.get(&request.url),
        "POST" => context.client.post(&request.url).body(body_text(request)),
        "PUT" => context.client.put(&request.url).body(body_text(request)),
        "DELETE" => context.client.delete(&request.url),
        _ => return Err(FatalError::InvalidMethod(method)),
    };
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    if let Some(cookies) = &context.cookies {
        builder = builder.header("Cookie", cookies.as_str());
    }

    debug!("{} {}", method, request.url);
    let result = builder.send().map_err(|e| {
        if e.is_connect() {
            FatalError::ConnectionFailure(e.to_string())
        } else {
            FatalError::CommunicationFailure(e.to_string())
        }
    })?;

    let status = result.status();
    let headers = result
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.to_string(),
                String::from_utf8_lossy(value.as_bytes()).to_string(),
            )
        })
        .collect();
    let body = result
        .text()
        .map_err(|e| FatalError::CommunicationFailure(e.to_string()))?;
    debug!("response {} ({} body bytes)", status, body.len());

    return Ok(Response {
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or("").to_string(),
        headers,
        body,
    });
}

fn body_text(request: &Request) -> String {
    return request.body.clone().unwrap_or_default();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    const CANNED_RESPONSE: &str = "HTTP/1.1 200 OK\r\n\
        content-type: application/json\r\n\
        content-length: 2\r\n\
        connection: close\r\n\
        \r\n\
        {}";

    // One-shot server: answers a single request with CANNED_RESPONSE and
    // hands back the raw bytes it received.
    fn serve_once() -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (sender, receiver) = mpsc::channel();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut data = Vec::new();
            let mut buf = [0u8; 4096];
            while !request_complete(&data) {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                data.extend_from_slice(&buf[..n]);
            }
            stream.write_all(CANNED_RESPONSE.as_bytes()).unwrap();
            sender
                .send(String::from_utf8_lossy(&data).to_string())
                .unwrap();
        });
        (format!("http://{}/", addr), receiver)
    }

    fn request_complete(data: &[u8]) -> bool {
        let text = String::from_utf8_lossy(data);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..header_end]
            .to_lowercase()
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        text.len() - (header_end + 4) >= content_length
    }

    fn execution_context() -> ExecutionContext {
        ExecutionContext::new(&Context::default(), None).unwrap()
    }

    #[test]
    fn get_never_sends_a_body() {
        let (url, received) = serve_once();
        let request = Request {
            method: "get".to_string(),
            url,
            body: Some("ignored".to_string()),
            ..Request::default()
        };
        let response = execute_request(&request, &execution_context()).unwrap();
        assert_eq!(response.status, 200);
        let wire = received.recv().unwrap();
        assert!(wire.starts_with("GET / HTTP/1.1"));
        assert!(!wire.contains("ignored"));
    }

    #[test]
    fn delete_never_sends_a_body() {
        let (url, received) = serve_once();
        let request = Request {
            method: "DELETE".to_string(),
            url,
            body: Some("ignored".to_string()),
            ..Request::default()
        };
        execute_request(&request, &execution_context()).unwrap();
        let wire = received.recv().unwrap();
        assert!(wire.starts_with("DELETE / HTTP/1.1"));
        assert!(!wire.contains("ignored"));
    }

    #[test]
    fn post_sends_the_parsed_body_and_headers() {
        let (url, received) = serve_once();
        let request = Request {
            method: "POST".to_string(),
            url,
            headers: vec![("X-Token".to_string(), "abc".to_string())],
            body: Some("payload".to_string()),
            ..Request::default()
        };
        let response = execute_request(&request, &execution_context()).unwrap();
        assert!(response.is_json());
        let wire = received.recv().unwrap();
        assert!(wire.starts_with("POST / HTTP/1.1"));
        assert!(wire.to_lowercase().contains("x-token: abc"));
        assert!(wire.ends_with("payload"));
    }

    #[test]
    fn put_sends_an_empty_body_when_none_was_parsed() {
        let (url, received) = serve_once();
        let request = Request {
            method: "PUT".to_string(),
            url,
            ..Request::default()
        };
        execute_request(&request, &execution_context()).unwrap();
        let wire = received.recv().unwrap();
        assert!(wire.to_lowercase().contains("content-length: 0"));
    }

    #[test]
    fn cookies_from_the_context_travel_as_a_header() {
        let (url, received) = serve_once();
        let mut context = Context::default();
        context.set(COOKIES_KEY, "session=abc");
        let execution = ExecutionContext::new(&context, None).unwrap();
        let request = Request {
            method: "GET".to_string(),
            url,
            ..Request::default()
        };
        execute_request(&request, &execution).unwrap();
        let wire = received.recv().unwrap();
        assert!(wire.to_lowercase().contains("cookie: session=abc"));
    }

    #[test]
    fn unknown_methods_are_rejected_before_any_network_call() {
        let request = Request {
            method: "PATCH".to_string(),
            url: "http://127.0.0.1:1/".to_string(),
            ..Request::default()
        };
        let error = execute_request(&request, &execution_context()).unwrap_err();
        match error {
            FatalError::InvalidMethod(method) => assert_eq!(method, "PATCH"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn refused_connections_report_as_connection_failures() {
        let request = Request {
            method: "GET".to_string(),
            url: "http://127.0.0.1:1/".to_string(),
            ..Request::default()
        };
        let error = execute_request(&request, &execution_context()).unwrap_err();
        assert!(matches!(error, FatalError::ConnectionFailure(_)));
    }
}
