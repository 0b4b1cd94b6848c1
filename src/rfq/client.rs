use reqwest::{
    Client as ReqwestClient, Method,
    header::{HeaderMap, HeaderValue},
};
use url::Url;

use super::types::response::Listing;
use super::types::{
    ConfirmFillRequest, ConfirmFillResponse, CreateOrderRequest, FillRequestRequest,
    FillRequestResponse, OrdersRequest, RfqDeclaration, RfqMakerMeta, RfqOrder,
};
use crate::{Result, ToQueryParams as _};

/// HTTP client for the RFQ desk REST API.
///
/// # Example
///
/// ```no_run
/// use keeta_rfq_client::rfq::{Client, types::OrdersRequest};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::new("https://wallet.example.net")?;
///
/// let request = OrdersRequest::builder().pair("ETH-USDC").build();
/// for order in client.orders(&request).await? {
///     println!("{} {} {} @ {}", order.id, order.side, order.size, order.price);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Client {
    host: Url,
    client: ReqwestClient,
}

impl Client {
    /// Creates a new RFQ API client for `host`.
    ///
    /// # Errors
    ///
    /// Returns an error if the host URL is invalid or the HTTP client fails to build.
    pub fn new(host: &str) -> Result<Client> {
        let mut headers = HeaderMap::new();

        headers.insert("User-Agent", HeaderValue::from_static("keeta_rfq_client"));
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        headers.insert("Connection", HeaderValue::from_static("keep-alive"));
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = ReqwestClient::builder().default_headers(headers).build()?;

        Ok(Self {
            host: Url::parse(host)?,
            client,
        })
    }

    /// Returns the host URL for the client.
    #[must_use]
    pub fn host(&self) -> &Url {
        &self.host
    }

    fn url(&self, path: &str) -> String {
        format!("{}api/rfq/{path}", self.host)
    }

    /// Lists orders, optionally for a single pair.
    pub async fn orders(&self, request: &OrdersRequest) -> Result<Vec<RfqOrder>> {
        let params = request.query_params(None);
        let request = self
            .client
            .request(Method::GET, self.url(&format!("orders{params}")))
            .build()?;

        let listing: Listing<RfqOrder> = crate::request(&self.client, request).await?;
        Ok(listing.into_vec())
    }

    /// Fetches a single order.
    pub async fn order(&self, order_id: &str) -> Result<RfqOrder> {
        let request = self
            .client
            .request(Method::GET, self.url(&format!("orders/{order_id}")))
            .build()?;

        crate::request(&self.client, request).await
    }

    /// Publishes a new quote and returns the stored order.
    pub async fn create_order(&self, request: &CreateOrderRequest) -> Result<RfqOrder> {
        let request = self
            .client
            .request(Method::POST, self.url("orders"))
            .json(request)
            .build()?;

        crate::request(&self.client, request).await
    }

    /// Withdraws a quote. The response body is ignored.
    pub async fn delete_order(&self, order_id: &str) -> Result<()> {
        let request = self
            .client
            .request(Method::DELETE, self.url(&format!("orders/{order_id}")))
            .build()?;

        crate::request_discarding_body(&self.client, request).await
    }

    /// Lists every known maker profile.
    pub async fn makers(&self) -> Result<Vec<RfqMakerMeta>> {
        let request = self
            .client
            .request(Method::GET, self.url("makers"))
            .build()?;

        let listing: Listing<RfqMakerMeta> = crate::request(&self.client, request).await?;
        Ok(listing.into_vec())
    }

    /// Submits a taker's fill against an order.
    pub async fn fill_request(
        &self,
        order_id: &str,
        request: &FillRequestRequest,
    ) -> Result<FillRequestResponse> {
        let request = self
            .client
            .request(
                Method::POST,
                self.url(&format!("orders/{order_id}/fill-request")),
            )
            .json(request)
            .build()?;

        crate::request(&self.client, request).await
    }

    /// Maker-side approval or rejection of a declaration.
    pub async fn confirm_fill(
        &self,
        order_id: &str,
        request: &ConfirmFillRequest,
    ) -> Result<ConfirmFillResponse> {
        let request = self
            .client
            .request(Method::POST, self.url(&format!("orders/{order_id}/confirm")))
            .json(request)
            .build()?;

        crate::request(&self.client, request).await
    }

    /// Declarations against a maker's orders.
    pub async fn fill_requests(&self, maker_id: &str) -> Result<Vec<RfqDeclaration>> {
        let request = self
            .client
            .request(
                Method::GET,
                self.url(&format!("makers/{maker_id}/fill-requests")),
            )
            .build()?;

        let listing: Listing<RfqDeclaration> =
            crate::request(&self.client, request).await?;
        Ok(listing.into_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_should_join_host_and_path() {
        let client = Client::new("http://localhost:4000").unwrap();
        assert_eq!(
            client.url("orders/order-1/fill-request"),
            "http://localhost:4000/api/rfq/orders/order-1/fill-request"
        );
    }

    #[test]
    fn invalid_host_should_fail() {
        Client::new("not a url").unwrap_err();
    }
}
