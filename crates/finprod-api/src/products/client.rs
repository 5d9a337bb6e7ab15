// Async HTTP client for the financial products REST API.
//
// Base path: configurable (e.g. `http://localhost:3002/bp`)
// Endpoints: /products, /products/{id}, /products/verification/{id}

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::types::{
    ErrorBody, ListResponse, MessageResponse, ProductEnvelope, ProductRecord, ProductUpdateRecord,
};
use crate::error::Error;
use crate::transport::TransportConfig;

const PRODUCTS: &str = "products";
const VERIFICATION: &str = "verification";

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the products API.
///
/// Stateless: every call is a single request. Caching and refresh after
/// mutations live in `finprod-core`.
pub struct ProductsClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ProductsClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a base URL and transport config.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::from_reqwest(base_url, http)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Validate the base URL and strip anything that isn't a path.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw.trim())?;
        if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
            return Err(Error::InvalidBaseUrl(raw.to_owned()));
        }
        url.set_query(None);
        url.set_fragment(None);
        Ok(url)
    }

    /// The API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append escaped path segments to the base URL.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // normalize_base_url rejects cannot-be-a-base URLs.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        Self::handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, Error> {
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        Self::handle_response(resp).await
    }

    async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, Error> {
        debug!("PUT {url}");

        let resp = self.http.put(url).json(body).send().await?;
        Self::handle_response(resp).await
    }

    async fn delete<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("DELETE {url}");

        let resp = self.http.delete(url).send().await?;
        Self::handle_response(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();

        let message = match serde_json::from_str::<ErrorBody>(&raw) {
            Ok(ErrorBody {
                message: Some(message),
            }) => message,
            _ if raw.is_empty() => status.to_string(),
            _ => raw,
        };

        debug!(status = status.as_u16(), %message, "request failed");
        Error::from_status(status.as_u16(), message)
    }

    // ── Products ─────────────────────────────────────────────────────

    /// `GET /products`
    pub async fn list_products(&self) -> Result<Vec<ProductRecord>, Error> {
        let resp: ListResponse = self.get(self.url(&[PRODUCTS])).await?;
        Ok(resp.data)
    }

    /// `POST /products`
    pub async fn create_product(&self, product: &ProductRecord) -> Result<ProductRecord, Error> {
        let resp: ProductEnvelope = self.post(self.url(&[PRODUCTS]), product).await?;
        if let Some(ref message) = resp.message {
            debug!(id = %resp.data.id, %message, "product created");
        }
        Ok(resp.data)
    }

    /// `PUT /products/{id}`
    pub async fn update_product(
        &self,
        id: &str,
        changes: &ProductUpdateRecord,
    ) -> Result<ProductRecord, Error> {
        let resp: ProductEnvelope = self.put(self.url(&[PRODUCTS, id]), changes).await?;
        if let Some(ref message) = resp.message {
            debug!(%id, %message, "product updated");
        }
        Ok(resp.data)
    }

    /// `DELETE /products/{id}`, returning the server's confirmation message.
    pub async fn delete_product(&self, id: &str) -> Result<String, Error> {
        let resp: MessageResponse = self.delete(self.url(&[PRODUCTS, id])).await?;
        Ok(resp.message)
    }

    /// `GET /products/verification/{id}`: `true` when the id is taken.
    pub async fn verify_product_id(&self, id: &str) -> Result<bool, Error> {
        self.get(self.url(&[PRODUCTS, VERIFICATION, id])).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> ProductsClient {
        ProductsClient::from_reqwest(base, reqwest::Client::new()).unwrap()
    }

    #[test]
    fn url_appends_under_base_path() {
        let c = client("http://localhost:3002/bp");
        assert_eq!(
            c.url(&[PRODUCTS]).as_str(),
            "http://localhost:3002/bp/products"
        );
    }

    #[test]
    fn url_tolerates_trailing_slash() {
        let c = client("http://localhost:3002/bp/");
        assert_eq!(
            c.url(&[PRODUCTS, "abc"]).as_str(),
            "http://localhost:3002/bp/products/abc"
        );

        let root = client("http://localhost:3002");
        assert_eq!(
            root.url(&[PRODUCTS]).as_str(),
            "http://localhost:3002/products"
        );
    }

    #[test]
    fn url_escapes_ids() {
        let c = client("http://localhost:3002/bp");
        assert_eq!(
            c.url(&[PRODUCTS, VERIFICATION, "a/b c"]).as_str(),
            "http://localhost:3002/bp/products/verification/a%2Fb%20c"
        );
    }

    #[test]
    fn rejects_non_http_base() {
        let err = ProductsClient::from_reqwest("mailto:ops@example.com", reqwest::Client::new());
        assert!(matches!(err, Err(Error::InvalidBaseUrl(_))));

        let err = ProductsClient::from_reqwest("not a url", reqwest::Client::new());
        assert!(matches!(err, Err(Error::InvalidUrl(_))));
    }
}
