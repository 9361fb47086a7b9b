// API client module: a small blocking HTTP client for the contacts service.
// Login hands back a `Session` which every later call takes explicitly; the
// client itself keeps no credentials.

use crate::config::ServiceConfig;
use crate::error::{ApiError, Result};
use crate::types::{AuthRequest, AuthResponse, ContactEntry, ContactsFeed};
use crate::walker::{ContinuationToken, Page, PageFetcher};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::IF_MATCH;
use reqwest::Url;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Authenticated session returned by `ContactsClient::login`.
pub struct Session {
    email: String,
    token: SecretString,
}

impl Session {
    pub fn new(email: impl Into<String>, token: SecretString) -> Self {
        Session {
            email: email.into(),
            token,
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

/// Blocking client bound to one service base URL.
pub struct ContactsClient {
    client: Client,
    base_url: String,
    source: String,
}

impl ContactsClient {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(ContactsClient {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            source: config.source.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Exchange credentials for a session token. Rejected credentials map to
    /// `ApiError::BadAuthentication`.
    pub fn login(&self, email: &str, password: SecretString) -> Result<Session> {
        let url = self.endpoint("auth")?;
        let req = AuthRequest {
            email: email.to_string(),
            password,
            source: self.source.clone(),
        };
        tracing::debug!(%url, email, "login");
        let res = self.client.post(url).json(&req).send()?;
        let status = res.status().as_u16();
        if status == 401 || status == 403 {
            tracing::warn!(email, status, "login rejected");
            return Err(ApiError::BadAuthentication);
        }
        let resp: AuthResponse = read_json(res)?;
        Ok(Session::new(email, SecretString::new(resp.token)))
    }

    /// First page of the contacts feed, `max_results` entries at most.
    pub fn get_contacts(&self, session: &Session, max_results: u32) -> Result<ContactsFeed> {
        let url = self.contacts_url(max_results)?;
        self.get_feed_url(session, url)
    }

    /// Fetch the feed page behind a `next_link`. Relative links resolve
    /// against the base URL.
    pub fn get_feed(&self, session: &Session, link: &str) -> Result<ContactsFeed> {
        let url = self.resolve_link(link)?;
        self.get_feed_url(session, url)
    }

    /// Replace an entry on the server and return the stored version.
    pub fn update(&self, session: &Session, entry: &ContactEntry) -> Result<ContactEntry> {
        let url = self.entry_url(&entry.id)?;
        tracing::debug!(%url, "update contact");
        let req = self.authed(self.client.put(url).json(entry), session, entry.etag.as_deref());
        read_json(req.send()?)
    }

    pub fn delete(&self, session: &Session, entry: &ContactEntry) -> Result<()> {
        let url = self.entry_url(&entry.id)?;
        tracing::debug!(%url, "delete contact");
        let req = self.authed(self.client.delete(url), session, entry.etag.as_deref());
        check(req.send()?)?;
        Ok(())
    }

    pub fn contacts_url(&self, max_results: u32) -> Result<Url> {
        let mut url = self.endpoint("contacts")?;
        url.query_pairs_mut()
            .append_pair("max-results", &max_results.to_string());
        Ok(url)
    }

    pub fn entry_url(&self, id: &str) -> Result<Url> {
        let mut url = self.endpoint("contacts")?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidLink {
                link: self.base_url.clone(),
                reason: "base URL cannot carry a path".to_string(),
            })?
            .push(id);
        Ok(url)
    }

    pub fn resolve_link(&self, link: &str) -> Result<Url> {
        Url::parse(&format!("{}/", self.base_url))
            .and_then(|base| base.join(link))
            .map_err(|e| ApiError::InvalidLink {
                link: link.to_string(),
                reason: e.to_string(),
            })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let raw = format!("{}/{}", self.base_url, path);
        Url::parse(&raw).map_err(|e| ApiError::InvalidLink {
            link: raw,
            reason: e.to_string(),
        })
    }

    fn get_feed_url(&self, session: &Session, url: Url) -> Result<ContactsFeed> {
        tracing::debug!(%url, "GET contacts feed");
        let req = self.authed(self.client.get(url), session, None);
        read_json(req.send()?)
    }

    /// Attach the bearer token and, when known, the entry's etag.
    fn authed(&self, mut req: RequestBuilder, session: &Session, etag: Option<&str>) -> RequestBuilder {
        req = req.bearer_auth(session.token.expose_secret());
        if let Some(etag) = etag {
            req = req.header(IF_MATCH, etag);
        }
        req
    }
}

fn check(res: Response) -> Result<Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().unwrap_or_default();
    tracing::warn!(status = status.as_u16(), %body, "request failed");
    Err(ApiError::Status {
        status: status.as_u16(),
        body,
    })
}

fn read_json<T: DeserializeOwned>(res: Response) -> Result<T> {
    let body = check(res)?.text()?;
    Ok(serde_json::from_str(&body)?)
}

/// Plugs the client into `FeedWalker`: every continuation token is a
/// `next_link` fetched with the given session.
pub struct ContactsFetcher<'a> {
    client: &'a ContactsClient,
    session: &'a Session,
}

impl<'a> ContactsFetcher<'a> {
    pub fn new(client: &'a ContactsClient, session: &'a Session) -> Self {
        ContactsFetcher { client, session }
    }
}

impl PageFetcher for ContactsFetcher<'_> {
    type Record = ContactEntry;
    type Error = ApiError;

    fn fetch_next(&mut self, token: &ContinuationToken) -> Result<Page<ContactEntry>> {
        Ok(self.client.get_feed(self.session, token.as_str())?.into())
    }
}
