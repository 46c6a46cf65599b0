//! Rapidhost account client: login session, inventory scraping, group deletion.
//!
//! Uses one libcurl handle with the in-memory cookie engine so the login
//! session carries across requests. All calls are blocking.

mod page;

use anyhow::{anyhow, Context, Result};
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

use crate::inventory::RawSnapshot;
use crate::remote::RemoteAccount;

pub use page::parse_account_page;

const LOGIN_PATH: &str = "/account/login";
const DELETE_PATH: &str = "/download/delete";

struct Session {
    easy: curl::easy::Easy,
    logged_in: bool,
}

/// Logged-in view of one Rapidhost account.
pub struct RapidhostClient {
    base: Url,
    username: String,
    password: String,
    session: Mutex<Session>,
}

impl std::fmt::Debug for RapidhostClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RapidhostClient")
            .field("base", &self.base.as_str())
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

fn form_body(pairs: &[(&str, &str)]) -> String {
    let mut form = url::form_urlencoded::Serializer::new(String::new());
    for (k, v) in pairs {
        form.append_pair(k, v);
    }
    form.finish()
}

impl RapidhostClient {
    /// Creates a client; no request is made until the first snapshot.
    pub fn new(
        base_url: &str,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        let base = Url::parse(base_url).with_context(|| format!("invalid base URL: {base_url}"))?;
        let mut easy = curl::easy::Easy::new();
        // Empty path enables the cookie engine without a backing file.
        easy.cookie_file("")?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(Duration::from_secs(15))?;
        easy.timeout(Duration::from_secs(60))?;
        Ok(Self {
            base,
            username: username.into(),
            password: password.into(),
            session: Mutex::new(Session {
                easy,
                logged_in: false,
            }),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .with_context(|| format!("join {path} onto {}", self.base))
    }

    /// GET (no form) or POST (form) `url`; returns status and body.
    fn request(
        easy: &mut curl::easy::Easy,
        url: &Url,
        form: Option<&str>,
    ) -> Result<(u32, String)> {
        easy.url(url.as_str())?;
        match form {
            Some(body) => {
                easy.post(true)?;
                easy.post_fields_copy(body.as_bytes())?;
            }
            None => easy.get(true)?,
        }

        let mut body = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer
                .perform()
                .with_context(|| format!("request to {url} failed"))?;
        }
        let code = easy.response_code().context("no response code")?;
        Ok((code, String::from_utf8_lossy(&body).into_owned()))
    }

    fn login(&self, session: &mut Session) -> Result<()> {
        let url = self.endpoint(LOGIN_PATH)?;
        tracing::debug!(username = %self.username, "logging in");
        let form = form_body(&[
            ("username", self.username.as_str()),
            ("password", self.password.as_str()),
        ]);
        let (code, _) = Self::request(&mut session.easy, &url, Some(&form))?;
        if !(200..300).contains(&code) {
            anyhow::bail!("login returned HTTP {code}");
        }
        session.logged_in = true;
        Ok(())
    }

    fn load_page(&self, session: &mut Session) -> Result<RawSnapshot> {
        let (code, html) = Self::request(&mut session.easy, &self.base, None)?;
        if !(200..300).contains(&code) {
            anyhow::bail!("GET {} returned HTTP {code}", self.base);
        }
        parse_account_page(&html, &self.base)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Session>> {
        self.session
            .lock()
            .map_err(|_| anyhow!("account session lock poisoned"))
    }
}

impl RemoteAccount for RapidhostClient {
    fn fetch_snapshot(&self) -> Result<RawSnapshot> {
        let mut session = self.lock()?;
        if !session.logged_in {
            self.login(&mut session)?;
        }
        let snapshot = self.load_page(&mut session)?;
        if snapshot.quota_text.is_some() || !snapshot.groups.is_empty() {
            return Ok(snapshot);
        }

        tracing::warn!("account page shows no session; logging in again");
        self.login(&mut session)?;
        let snapshot = self.load_page(&mut session)?;
        if snapshot.quota_text.is_none() && snapshot.groups.is_empty() {
            session.logged_in = false;
            anyhow::bail!("account page still shows no session after login (check credentials)");
        }
        Ok(snapshot)
    }

    fn delete_group(&self, group_id: &str) -> Result<()> {
        let url = self.endpoint(DELETE_PATH)?;
        let mut session = self.lock()?;
        if !session.logged_in {
            self.login(&mut session)?;
        }
        let form = form_body(&[("ids[]", group_id)]);
        let (code, _) = Self::request(&mut session.easy, &url, Some(&form))?;
        if !(200..300).contains(&code) {
            anyhow::bail!("delete of group {group_id} returned HTTP {code}");
        }
        Ok(())
    }
}
