//! Minimal HTTP/1.1 server standing in for the account site in integration tests.
//!
//! Serves `GET /` (the account page, or a login form without a session
//! cookie), `POST /account/login`, `POST /download/delete` (bodies recorded)
//! and `GET /files/<name>` from a fixed set of bodies.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

pub const USERNAME: &str = "alice";
pub const PASSWORD: &str = "s3cret";
const SESSION_COOKIE: &str = "session=ok";
const HTML: &str = "Content-Type: text/html\r\n";

#[derive(Debug, Clone, Copy)]
pub struct ServerOptions {
    /// If false, login answers 200 for any credentials but never sets the
    /// session cookie (a site that silently rejects the login).
    pub grant_session: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            grant_session: true,
        }
    }
}

pub struct ServerState {
    pub page: String,
    pub files: HashMap<String, Vec<u8>>,
    pub delete_bodies: Mutex<Vec<String>>,
    pub logins: Mutex<u32>,
    pub options: ServerOptions,
}

pub struct AccountServer {
    pub base_url: String,
    pub state: Arc<ServerState>,
}

impl AccountServer {
    pub fn delete_bodies(&self) -> Vec<String> {
        self.state.delete_bodies.lock().unwrap().clone()
    }

    pub fn logins(&self) -> u32 {
        *self.state.logins.lock().unwrap()
    }

    pub fn file_url(&self, name: &str) -> String {
        format!("{}files/{}", self.base_url, name)
    }
}

/// One group as `(id, name, [(href, size text)])`.
pub type PageGroup<'a> = (&'a str, &'a str, Vec<(String, &'a str)>);

/// Renders an account page in the site's markup.
pub fn account_page(quota: &str, groups: &[PageGroup<'_>]) -> String {
    let mut html = format!(
        "<html><body>\n<div class=\"info login-info-box\"><table>\n\
         <tr><td>Login:</td><td><small>{USERNAME}</small></td></tr>\n\
         <tr><td>Account:</td><td><small>premium</small></td></tr>\n\
         <tr><td>Transfer:</td><td><small>{quota}</small></td></tr>\n\
         </table></div>\n"
    );
    for (id, name, files) in groups {
        html.push_str(&format!(
            "<div class=\"file-list\">\n\
             <div><input type=\"checkbox\" value=\"{id}\"><button>{name}</button></div>\n\
             <table class=\"files-list\"><tbody>\n"
        ));
        for (href, size) in files {
            html.push_str(&format!(
                "<tr><td><a href=\"{href}\">file</a></td><td></td><td></td><td>{size}</td></tr>\n"
            ));
        }
        html.push_str("</tbody></table>\n</div>\n");
    }
    html.push_str("</body></html>\n");
    html
}

/// Starts the server on an ephemeral port. `page` receives the base URL
/// and returns the account page; runs until the process exits.
pub fn start(page: impl FnOnce(&str) -> String, files: &[(&str, Vec<u8>)]) -> AccountServer {
    start_with_options(page, files, ServerOptions::default())
}

/// Like `start` but with non-default login behavior.
pub fn start_with_options(
    page: impl FnOnce(&str) -> String,
    files: &[(&str, Vec<u8>)],
    options: ServerOptions,
) -> AccountServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let base_url = format!("http://127.0.0.1:{port}/");
    let state = Arc::new(ServerState {
        page: page(&base_url),
        files: files
            .iter()
            .map(|(name, body)| (format!("/files/{name}"), body.clone()))
            .collect(),
        delete_bodies: Mutex::new(Vec::new()),
        logins: Mutex::new(0),
        options,
    });
    let shared = Arc::clone(&state);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let state = Arc::clone(&shared);
            thread::spawn(move || handle(stream, &state));
        }
    });
    AccountServer { base_url, state }
}

struct Request {
    method: String,
    path: String,
    has_session: bool,
    body: String,
}

fn read_request(stream: &mut TcpStream) -> Option<Request> {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buf[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };
    let head = String::from_utf8_lossy(&data[..header_end]).into_owned();
    let mut lines = head.lines();
    let mut first = lines.next()?.split_whitespace();
    let method = first.next()?.to_string();
    let path = first.next()?.to_string();

    let mut content_length = 0usize;
    let mut has_session = false;
    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        if name.eq_ignore_ascii_case("content-length") {
            content_length = value.trim().parse().unwrap_or(0);
        } else if name.eq_ignore_ascii_case("cookie") {
            has_session |= value.contains(SESSION_COOKIE);
        }
    }
    while data.len() < header_end + content_length {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);
    }
    let body = String::from_utf8_lossy(&data[header_end..]).into_owned();
    Some(Request {
        method,
        path,
        has_session,
        body,
    })
}

fn respond(stream: &mut TcpStream, status: &str, extra_headers: &str, body: &[u8]) {
    let head = format!(
        "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n{extra_headers}\r\n",
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
}

fn handle(mut stream: TcpStream, state: &ServerState) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let Some(req) = read_request(&mut stream) else {
        return;
    };

    match (req.method.as_str(), req.path.as_str()) {
        ("POST", "/account/login") if !state.options.grant_session => {
            *state.logins.lock().unwrap() += 1;
            respond(&mut stream, "200 OK", "", b"welcome");
        }
        ("POST", "/account/login") => {
            let expected = format!("username={USERNAME}&password={PASSWORD}");
            if req.body == expected {
                *state.logins.lock().unwrap() += 1;
                let cookie = format!("Set-Cookie: {SESSION_COOKIE}; Path=/\r\n");
                respond(&mut stream, "200 OK", &cookie, b"welcome");
            } else {
                respond(&mut stream, "403 Forbidden", "", b"bad credentials");
            }
        }
        ("GET", "/") => {
            if req.has_session {
                respond(&mut stream, "200 OK", HTML, state.page.as_bytes());
            } else {
                let form = b"<html><body><form action=\"/account/login\"></form></body></html>";
                respond(&mut stream, "200 OK", HTML, form);
            }
        }
        ("POST", "/download/delete") if req.has_session => {
            state.delete_bodies.lock().unwrap().push(req.body);
            respond(&mut stream, "200 OK", "", b"deleted");
        }
        ("GET", path) => match state.files.get(path) {
            Some(body) => respond(&mut stream, "200 OK", "", body),
            None => respond(&mut stream, "404 Not Found", "", b"not found"),
        },
        _ => respond(&mut stream, "403 Forbidden", "", b""),
    }
}
