//! REST API backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use super::wire::{
    WireComment, WireNewComment, WireNewTicket, WireStats, WireStatus, WireTicket,
    WireTicketList, WireTransition, WireTransitionResponse, error_message,
};
use super::{BackendMode, TicketBackend};
use crate::error::{DeskError, Result};
use crate::ticket::{
    Comment, NewComment, NewTicket, Ticket, TicketFilter, TicketStats, TransitionRequest,
};

/// Timeout applied to every request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a backend rooted at `base_url` (e.g. `http://localhost:8000/api`).
    pub fn new(base_url: &str) -> Result<Self> {
        let parsed = url::Url::parse(base_url.trim())
            .map_err(|e| DeskError::Config(format!("invalid API URL '{base_url}': {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(DeskError::Config(format!(
                "invalid API URL '{base_url}': scheme must be http or https"
            )));
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DeskError::Unexpected(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.url(path))
            .header(reqwest::header::ACCEPT, "application/json")
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await.map_err(classify_send_error)?;
        let status = response.status();
        tracing::debug!(url = %response.url(), %status, "ticket API response");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(request_error(status, &body))
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = self.send(builder).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| DeskError::Connection(e.to_string()))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| DeskError::Unexpected(format!("malformed response: {e}")))
    }
}

fn classify_send_error(error: reqwest::Error) -> DeskError {
    if error.is_connect() || error.is_timeout() || error.is_request() {
        DeskError::Connection(error.to_string())
    } else {
        DeskError::Unexpected(error.to_string())
    }
}

fn request_error(status: StatusCode, body: &str) -> DeskError {
    tracing::debug!(%status, body, "ticket API error");
    DeskError::Request {
        status: status.as_u16(),
        message: error_message(body),
    }
}

#[async_trait]
impl TicketBackend for HttpBackend {
    fn mode(&self) -> BackendMode {
        BackendMode::Http
    }

    async fn list_tickets(&self, filter: &TicketFilter) -> Result<Vec<Ticket>> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(status) = filter.status {
            query.push(("estado", WireStatus::from(status).as_str().to_string()));
        }
        if let Some(search) = filter.search_text() {
            query.push(("search", search.to_string()));
        }

        let list: WireTicketList = self
            .send_json(self.request(Method::GET, "tickets/").query(&query))
            .await?;
        Ok(list.into_tickets())
    }

    async fn get_ticket(&self, id: u64) -> Result<Ticket> {
        let ticket: WireTicket = self
            .send_json(self.request(Method::GET, &format!("tickets/{id}/")))
            .await?;
        Ok(ticket.into())
    }

    async fn create_ticket(&self, fields: NewTicket) -> Result<Ticket> {
        let body = WireNewTicket::from(&fields);
        let ticket: WireTicket = self
            .send_json(self.request(Method::POST, "tickets/").json(&body))
            .await?;
        Ok(ticket.into())
    }

    async fn transition_ticket(&self, id: u64, request: TransitionRequest) -> Result<Ticket> {
        let body = WireTransition::from(&request);
        let response: WireTransitionResponse = self
            .send_json(
                self.request(Method::PATCH, &format!("tickets/{id}/transition/"))
                    .json(&body),
            )
            .await?;
        Ok(response.ticket.into())
    }

    async fn list_comments(&self, ticket_id: u64) -> Result<Vec<Comment>> {
        let comments: Vec<WireComment> = self
            .send_json(self.request(Method::GET, &format!("tickets/{ticket_id}/comments/")))
            .await?;
        Ok(comments.into_iter().map(Comment::from).collect())
    }

    async fn add_comment(&self, ticket_id: u64, comment: NewComment) -> Result<Comment> {
        let body = WireNewComment::from(&comment);
        let created: WireComment = self
            .send_json(
                self.request(Method::POST, &format!("tickets/{ticket_id}/comments/"))
                    .json(&body),
            )
            .await?;
        Ok(created.into())
    }

    async fn stats(&self) -> Result<TicketStats> {
        let stats: WireStats = self
            .send_json(self.request(Method::GET, "tickets/stats/"))
            .await?;
        Ok(stats.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TicketPriority, TicketStatus};
    use mockito::Matcher;

    const TICKET_JSON: &str = r#"{
        "id": 12,
        "titulo": "Printer jam on 3rd floor",
        "descripcion": "Printer is stuck and beeping",
        "prioridad": "media",
        "solicitante": "Jon Doe",
        "email": null,
        "estado": "nuevo",
        "fecha_creacion": "2024-08-20T10:00:00Z",
        "fecha_actualizacion": "2024-08-20T10:00:00Z",
        "comentarios": [
            {"id": 40, "autor": "Sistema", "contenido": "Ticket creado por Jon Doe", "fecha_creacion": "2024-08-20T10:00:00Z"}
        ]
    }"#;

    fn backend(server: &mockito::Server) -> HttpBackend {
        HttpBackend::new(&format!("{}/api/", server.url())).unwrap()
    }

    #[test]
    fn test_rejects_bad_urls() {
        assert!(HttpBackend::new("not a url").is_err());
        assert!(HttpBackend::new("ftp://example.com/api").is_err());
        let backend = HttpBackend::new("http://localhost:8000/api/").unwrap();
        assert_eq!(backend.base_url(), "http://localhost:8000/api");
        assert_eq!(backend.url("tickets/"), "http://localhost:8000/api/tickets/");
    }

    #[tokio::test]
    async fn test_list_sends_filters() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/tickets/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("estado".into(), "resuelto".into()),
                Matcher::UrlEncoded("search".into(), "garcía".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[]")
            .expect(1)
            .create_async()
            .await;

        let filter = TicketFilter::default()
            .with_status(TicketStatus::Resolved)
            .with_search(" garcía ");
        let tickets = backend(&server).list_tickets(&filter).await.unwrap();
        assert!(tickets.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_posts_wire_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/tickets/")
            .match_body(Matcher::Json(serde_json::json!({
                "titulo": "Printer jam on 3rd floor",
                "descripcion": "Printer is stuck and beeping",
                "prioridad": "media",
                "solicitante": "Jon Doe"
            })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(TICKET_JSON)
            .create_async()
            .await;

        let ticket = backend(&server)
            .create_ticket(NewTicket {
                title: "Printer jam on 3rd floor".to_string(),
                description: "Printer is stuck and beeping".to_string(),
                priority: TicketPriority::Medium,
                requester: "Jon Doe".to_string(),
                email: None,
            })
            .await
            .unwrap();
        assert_eq!(ticket.id, 12);
        assert_eq!(ticket.status, TicketStatus::New);
        assert_eq!(ticket.comment_count(), 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_transition_unwraps_ticket() {
        let mut server = mockito::Server::new_async().await;
        let response = format!(
            r#"{{"message": "Ticket transicionado a En Proceso", "ticket": {}}}"#,
            TICKET_JSON.replace("\"nuevo\"", "\"en_proceso\"")
        );
        let mock = server
            .mock("PATCH", "/api/tickets/12/transition/")
            .match_body(Matcher::Json(serde_json::json!({
                "nuevo_estado": "en_proceso",
                "comentario": "on it"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(response)
            .create_async()
            .await;

        let ticket = backend(&server)
            .transition_ticket(
                12,
                TransitionRequest::new(TicketStatus::InProgress).with_comment("on it"),
            )
            .await
            .unwrap();
        assert_eq!(ticket.status, TicketStatus::InProgress);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_comments_roundtrip_paths() {
        let mut server = mockito::Server::new_async().await;
        let list = server
            .mock("GET", "/api/tickets/12/comments/")
            .with_status(200)
            .with_body(r#"[{"id": 1, "ticket": 12, "autor": "Sistema", "contenido": "hola", "fecha_creacion": "2024-08-20T10:00:00Z"}]"#)
            .create_async()
            .await;
        let add = server
            .mock("POST", "/api/tickets/12/comments/")
            .match_body(Matcher::Json(serde_json::json!({"autor": "User", "contenido": "Any news?"})))
            .with_status(201)
            .with_body(r#"{"id": 2, "ticket": 12, "autor": "User", "contenido": "Any news?", "fecha_creacion": "2024-08-20T11:00:00Z"}"#)
            .create_async()
            .await;

        let backend = backend(&server);
        let comments = backend.list_comments(12).await.unwrap();
        assert_eq!(comments.len(), 1);
        let created = backend
            .add_comment(
                12,
                NewComment {
                    author: "User".to_string(),
                    content: "Any news?".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(created.id, 2);
        list.assert_async().await;
        add.assert_async().await;
    }

    #[tokio::test]
    async fn test_bad_request_carries_payload_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PATCH", "/api/tickets/4/transition/")
            .with_status(400)
            .with_body(r#"{"nuevo_estado": ["Transición inválida."]}"#)
            .create_async()
            .await;

        let err = backend(&server)
            .transition_ticket(4, TransitionRequest::new(TicketStatus::New))
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "nuevo_estado: Transición inválida.");
    }

    #[tokio::test]
    async fn test_status_errors() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/tickets/99/")
            .with_status(404)
            .with_body(r#"{"detail": "No encontrado."}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/api/tickets/stats/")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let backend = backend(&server);
        let missing = backend.get_ticket(99).await.unwrap_err();
        assert_eq!(missing.user_message(), "Resource not found.");
        let broken = backend.stats().await.unwrap_err();
        assert_eq!(broken.user_message(), "Internal server error. Please try again.");
    }

    #[tokio::test]
    async fn test_malformed_body_is_unexpected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/tickets/1/")
            .with_status(200)
            .with_body("{not json")
            .create_async()
            .await;

        let err = backend(&server).get_ticket(1).await.unwrap_err();
        assert!(matches!(err, DeskError::Unexpected(_)));
        assert_eq!(err.user_message(), "Unexpected error. Please try again.");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_connection_error() {
        // Port 9 (discard) on localhost is not expected to accept connections
        let backend = HttpBackend::new("http://127.0.0.1:9/api").unwrap();
        let err = backend.list_tickets(&TicketFilter::default()).await.unwrap_err();
        assert!(matches!(err, DeskError::Connection(_)), "got {err:?}");
        assert_eq!(
            err.user_message(),
            "Could not connect to the server. Check your connection."
        );
    }
}
