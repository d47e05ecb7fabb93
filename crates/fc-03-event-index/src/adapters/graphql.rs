//! GraphQL event index client.
//!
//! Pages are fetched with HTTP POST queries. Live feeds use the `graphql-ws`
//! subscription protocol; every `data` frame becomes one push.

use crate::domain::{selection, IndexError};
use crate::ports::{EventIndex, IndexSubscription, PageQuery};
use async_trait::async_trait;
use fc_02_storage::EntityKind;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shared_types::Address;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::SEC_WEBSOCKET_PROTOCOL;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, warn};
use uuid::Uuid;

const HTTP_TIMEOUT_SECS: u64 = 30;
const PUSH_BUFFER: usize = 16;

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: Value,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

/// Frames of the `graphql-ws` protocol we act on.
#[derive(Debug, Deserialize)]
struct WsFrame {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Option<Value>,
}

/// Client for a GraphQL event index.
pub struct GraphQlIndexClient {
    http_client: reqwest::Client,
    http_url: String,
    ws_url: String,
}

impl GraphQlIndexClient {
    /// Creates a client for the index at `http_url` / `ws_url`.
    pub fn new(http_url: impl Into<String>, ws_url: impl Into<String>) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http_client,
            http_url: http_url.into(),
            ws_url: ws_url.into(),
        }
    }

    fn page_query(kind: EntityKind) -> String {
        format!(
            "query ($contractAddress: Bytes!, $uts: BigInt!, $skip: Int!, $limit: Int!) {{ \
             {entity}(skip: $skip, first: $limit, orderBy: uts, orderDirection: asc, \
             where: {{contractAddress: $contractAddress, uts_gt: $uts}}) {{ {fields} }} }}",
            entity = kind.index_entity(),
            fields = selection(kind),
        )
    }

    fn subscription_query(kind: EntityKind) -> String {
        format!(
            "subscription ($contractAddress: Bytes!) {{ \
             {entity}(orderBy: uts, orderDirection: desc, first: 1, \
             where: {{contractAddress: $contractAddress}}) {{ id }} }}",
            entity = kind.index_entity(),
        )
    }
}

fn address_variable(address: Address) -> String {
    format!("{address:?}")
}

#[async_trait]
impl EventIndex for GraphQlIndexClient {
    async fn subscribe(
        &self,
        kind: EntityKind,
        contract: Address,
    ) -> Result<IndexSubscription, IndexError> {
        let mut request = self.ws_url.as_str().into_client_request()?;
        request
            .headers_mut()
            .insert(SEC_WEBSOCKET_PROTOCOL, HeaderValue::from_static("graphql-ws"));
        let (stream, _) = connect_async(request).await?;
        let (mut write, mut read) = stream.split();

        let init = json!({ "type": "connection_init", "payload": {} });
        write.send(Message::Text(init.to_string().into())).await?;

        let start = json!({
            "id": Uuid::new_v4().to_string(),
            "type": "start",
            "payload": {
                "query": Self::subscription_query(kind),
                "variables": { "contractAddress": address_variable(contract) },
            },
        });
        write.send(Message::Text(start.to_string().into())).await?;

        let (tx, rx) = mpsc::channel(PUSH_BUFFER);
        let task = tokio::spawn(async move {
            while let Some(frame) = read.next().await {
                match frame {
                    Ok(Message::Text(text)) => {
                        let Ok(frame) = serde_json::from_str::<WsFrame>(&text) else {
                            continue;
                        };
                        match frame.kind.as_str() {
                            "data" => {
                                // Full buffer means a sweep is already pending.
                                let _ = tx.try_send(());
                            }
                            "connection_ack" | "ka" => {}
                            "error" | "connection_error" => {
                                warn!(%kind, payload = ?frame.payload, "Subscription error frame");
                            }
                            "complete" => break,
                            other => debug!(%kind, frame = other, "Ignoring frame"),
                        }
                    }
                    Ok(Message::Ping(data)) => {
                        if write.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!(%kind, error = %e, "Subscription stream failed");
                        break;
                    }
                }
            }
            debug!(%kind, "Subscription stream ended");
        });

        Ok(IndexSubscription::new(rx, Some(task)))
    }

    async fn query(&self, kind: EntityKind, page: &PageQuery) -> Result<Vec<Value>, IndexError> {
        let query = Self::page_query(kind);
        let request = GraphQlRequest {
            query: &query,
            variables: json!({
                "contractAddress": address_variable(page.contract_address),
                "uts": page.uts_after.to_string(),
                "skip": page.skip,
                "limit": page.limit,
            }),
        };

        let response: GraphQlResponse = self
            .http_client
            .post(&self.http_url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(error) = response.errors.first() {
            return Err(IndexError::Query {
                kind,
                reason: error.message.clone(),
            });
        }
        match response
            .data
            .and_then(|mut data| data.get_mut(kind.index_entity()).map(Value::take))
        {
            Some(Value::Array(records)) => Ok(records),
            Some(Value::Null) | None => Ok(Vec::new()),
            Some(other) => Err(IndexError::Query {
                kind,
                reason: format!("expected a list, got {other}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_query_shape() {
        let query = GraphQlIndexClient::page_query(EntityKind::StakeRequested);
        assert!(query.contains("stakeRequesteds(skip: $skip, first: $limit"));
        assert!(query.contains("uts_gt: $uts"));
        assert!(query.contains("orderBy: uts, orderDirection: asc"));
        assert!(query.contains("stakerProxy"));
    }

    #[test]
    fn test_subscription_query_names_entity() {
        let query = GraphQlIndexClient::subscription_query(EntityKind::GatewayProven);
        assert!(query.starts_with("subscription"));
        assert!(query.contains("gatewayProvens("));
    }

    #[test]
    fn test_address_variable_is_full_hex() {
        let variable = address_variable(Address::repeat_byte(0xab));
        assert_eq!(variable.len(), 42);
        assert!(variable.starts_with("0xabab"));
    }
}
