//! JSON shapes of the REST API.
//!
//! The API speaks Spanish field and enum names (`titulo`, `estado: "en_proceso"`,
//! ...). These types exist only to translate between that format and the
//! domain types.

use std::collections::HashMap;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ticket::{
    Comment, NewComment, NewTicket, PriorityCount, StatusCount, Ticket, TicketStats,
    TransitionRequest,
};
use crate::types::{TicketPriority, TicketStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(super) enum WireStatus {
    Nuevo,
    EnProceso,
    Resuelto,
    Cerrado,
}

impl WireStatus {
    pub(super) fn as_str(self) -> &'static str {
        match self {
            WireStatus::Nuevo => "nuevo",
            WireStatus::EnProceso => "en_proceso",
            WireStatus::Resuelto => "resuelto",
            WireStatus::Cerrado => "cerrado",
        }
    }
}

impl From<TicketStatus> for WireStatus {
    fn from(status: TicketStatus) -> Self {
        match status {
            TicketStatus::New => WireStatus::Nuevo,
            TicketStatus::InProgress => WireStatus::EnProceso,
            TicketStatus::Resolved => WireStatus::Resuelto,
            TicketStatus::Closed => WireStatus::Cerrado,
        }
    }
}

impl From<WireStatus> for TicketStatus {
    fn from(status: WireStatus) -> Self {
        match status {
            WireStatus::Nuevo => TicketStatus::New,
            WireStatus::EnProceso => TicketStatus::InProgress,
            WireStatus::Resuelto => TicketStatus::Resolved,
            WireStatus::Cerrado => TicketStatus::Closed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(super) enum WirePriority {
    Baja,
    Media,
    Alta,
}

impl WirePriority {
    fn as_str(self) -> &'static str {
        match self {
            WirePriority::Baja => "baja",
            WirePriority::Media => "media",
            WirePriority::Alta => "alta",
        }
    }
}

impl From<TicketPriority> for WirePriority {
    fn from(priority: TicketPriority) -> Self {
        match priority {
            TicketPriority::Low => WirePriority::Baja,
            TicketPriority::Medium => WirePriority::Media,
            TicketPriority::High => WirePriority::Alta,
        }
    }
}

impl From<WirePriority> for TicketPriority {
    fn from(priority: WirePriority) -> Self {
        match priority {
            WirePriority::Baja => TicketPriority::Low,
            WirePriority::Media => TicketPriority::Medium,
            WirePriority::Alta => TicketPriority::High,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct WireComment {
    pub id: u64,
    pub autor: String,
    pub contenido: String,
    pub fecha_creacion: Timestamp,
}

impl From<WireComment> for Comment {
    fn from(c: WireComment) -> Self {
        Comment {
            id: c.id,
            author: c.autor,
            content: c.contenido,
            created_at: c.fecha_creacion,
        }
    }
}

/// Ticket as returned by both the list and the detail endpoints. The list
/// shape carries `total_comentarios`, the detail shape `comentarios`.
#[derive(Debug, Clone, Deserialize)]
pub(super) struct WireTicket {
    pub id: u64,
    pub titulo: String,
    pub descripcion: String,
    pub prioridad: WirePriority,
    pub solicitante: String,
    #[serde(default)]
    pub email: Option<String>,
    pub estado: WireStatus,
    pub fecha_creacion: Timestamp,
    pub fecha_actualizacion: Timestamp,
    #[serde(default)]
    pub total_comentarios: Option<usize>,
    #[serde(default)]
    pub comentarios: Vec<WireComment>,
}

impl From<WireTicket> for Ticket {
    fn from(t: WireTicket) -> Self {
        let comments: Vec<Comment> = t.comentarios.into_iter().map(Comment::from).collect();
        Ticket {
            id: t.id,
            title: t.titulo,
            description: t.descripcion,
            priority: t.prioridad.into(),
            status: t.estado.into(),
            requester: t.solicitante,
            email: t.email.filter(|e| !e.trim().is_empty()),
            created_at: t.fecha_creacion,
            updated_at: t.fecha_actualizacion,
            comment_total: t.total_comentarios.unwrap_or(comments.len()),
            comments,
        }
    }
}

/// List responses are either a bare array or a paginated envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum WireTicketList {
    Page { results: Vec<WireTicket> },
    Plain(Vec<WireTicket>),
}

impl WireTicketList {
    pub(super) fn into_tickets(self) -> Vec<Ticket> {
        let items = match self {
            WireTicketList::Page { results } => results,
            WireTicketList::Plain(items) => items,
        };
        items.into_iter().map(Ticket::from).collect()
    }
}

#[derive(Debug, Serialize)]
pub(super) struct WireNewTicket<'a> {
    pub titulo: &'a str,
    pub descripcion: &'a str,
    pub prioridad: WirePriority,
    pub solicitante: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<&'a str>,
}

impl<'a> From<&'a NewTicket> for WireNewTicket<'a> {
    fn from(t: &'a NewTicket) -> Self {
        WireNewTicket {
            titulo: &t.title,
            descripcion: &t.description,
            prioridad: t.priority.into(),
            solicitante: &t.requester,
            email: t.email.as_deref(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct WireTransition<'a> {
    pub nuevo_estado: WireStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comentario: Option<&'a str>,
}

impl<'a> From<&'a TransitionRequest> for WireTransition<'a> {
    fn from(r: &'a TransitionRequest) -> Self {
        WireTransition {
            nuevo_estado: r.status.into(),
            comentario: r.user_comment(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct WireTransitionResponse {
    #[serde(default)]
    #[allow(dead_code)]
    pub message: Option<String>,
    pub ticket: WireTicket,
}

#[derive(Debug, Serialize)]
pub(super) struct WireNewComment<'a> {
    pub autor: &'a str,
    pub contenido: &'a str,
}

impl<'a> From<&'a NewComment> for WireNewComment<'a> {
    fn from(c: &'a NewComment) -> Self {
        WireNewComment {
            autor: &c.author,
            contenido: &c.content,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct WireCount {
    #[serde(default)]
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub(super) struct WireStats {
    pub total_tickets: usize,
    #[serde(default)]
    pub por_estado: HashMap<String, WireCount>,
    #[serde(default)]
    pub por_prioridad: HashMap<String, WireCount>,
}

impl From<WireStats> for TicketStats {
    fn from(s: WireStats) -> Self {
        let count_of = |map: &HashMap<String, WireCount>, key: &str| {
            map.get(key).map(|c| c.count).unwrap_or(0)
        };
        TicketStats {
            total: s.total_tickets,
            by_status: TicketStatus::ALL
                .iter()
                .map(|status| StatusCount {
                    status: *status,
                    label: status.label().to_string(),
                    count: count_of(&s.por_estado, WireStatus::from(*status).as_str()),
                })
                .collect(),
            by_priority: TicketPriority::ALL
                .iter()
                .map(|priority| PriorityCount {
                    priority: *priority,
                    label: priority.label().to_string(),
                    count: count_of(&s.por_prioridad, WirePriority::from(*priority).as_str()),
                })
                .collect(),
        }
    }
}

/// Pull a human-readable message out of an error response body.
///
/// Looks at the conventional keys first (`errors`, `error`, `detail`,
/// `message`), then falls back to flattening a field-error map such as
/// `{"titulo": ["too short"]}` into `titulo: too short`.
pub(super) fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match &value {
        Value::String(s) => non_empty(s.clone()),
        Value::Array(_) => flatten(&value),
        Value::Object(map) => {
            for key in ["errors", "error", "detail", "message"] {
                if let Some(found) = map.get(key).and_then(flatten) {
                    return Some(found);
                }
            }
            let fields: Vec<String> = map
                .iter()
                .filter_map(|(field, v)| flatten(v).map(|m| format!("{field}: {m}")))
                .collect();
            non_empty(fields.join("; "))
        }
        _ => None,
    }
}

fn flatten(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_empty(s.clone()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(flatten).collect();
            non_empty(parts.join(" "))
        }
        Value::Object(map) => {
            let parts: Vec<String> = map
                .iter()
                .filter_map(|(field, v)| flatten(v).map(|m| format!("{field}: {m}")))
                .collect();
            non_empty(parts.join("; "))
        }
        _ => None,
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() { None } else { Some(s) }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DETAIL: &str = r#"{
        "id": 7,
        "titulo": "Printer jam on 3rd floor",
        "descripcion": "Printer is stuck and beeping",
        "prioridad": "media",
        "prioridad_display": "Media",
        "solicitante": "Jon Doe",
        "email": "",
        "estado": "en_proceso",
        "estado_display": "En Proceso",
        "fecha_creacion": "2024-08-15T09:30:00.123456Z",
        "fecha_actualizacion": "2024-08-15T11:45:00+00:00",
        "comentarios": [
            {"id": 1, "ticket": 7, "autor": "Sistema", "contenido": "Ticket creado por Jon Doe", "fecha_creacion": "2024-08-15T09:30:00Z"}
        ],
        "transiciones_validas": [{"estado": "resuelto", "nombre": "Resuelto"}]
    }"#;

    #[test]
    fn test_detail_to_ticket() {
        let wire: WireTicket = serde_json::from_str(DETAIL).unwrap();
        let ticket = Ticket::from(wire);
        assert_eq!(ticket.id, 7);
        assert_eq!(ticket.status, TicketStatus::InProgress);
        assert_eq!(ticket.priority, TicketPriority::Medium);
        assert_eq!(ticket.email, None);
        assert_eq!(ticket.comment_count(), 1);
        assert_eq!(ticket.comments[0].author, "Sistema");
    }

    #[test]
    fn test_list_shapes() {
        let summary = r#"{"id": 1, "titulo": "Login error", "descripcion": "Cannot sign in at all",
            "prioridad": "alta", "solicitante": "María García", "email": null, "estado": "nuevo",
            "fecha_creacion": "2024-08-15T09:30:00Z", "fecha_actualizacion": "2024-08-15T09:30:00Z",
            "total_comentarios": 3}"#;

        let plain: WireTicketList = serde_json::from_str(&format!("[{summary}]")).unwrap();
        let tickets = plain.into_tickets();
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].comment_count(), 3);
        assert!(tickets[0].comments.is_empty());

        let page: WireTicketList =
            serde_json::from_str(&format!(r#"{{"count": 1, "results": [{summary}]}}"#)).unwrap();
        assert_eq!(page.into_tickets()[0].priority, TicketPriority::High);
    }

    #[test]
    fn test_request_bodies() {
        let new = NewTicket {
            title: "Printer jam".to_string(),
            description: "Printer is stuck".to_string(),
            priority: TicketPriority::High,
            requester: "Jon".to_string(),
            email: None,
        };
        let body = serde_json::to_value(WireNewTicket::from(&new)).unwrap();
        assert_eq!(body["prioridad"], "alta");
        assert!(body.get("email").is_none());

        let request = TransitionRequest::new(TicketStatus::InProgress).with_comment(" ");
        let body = serde_json::to_value(WireTransition::from(&request)).unwrap();
        assert_eq!(body, serde_json::json!({"nuevo_estado": "en_proceso"}));
    }

    #[test]
    fn test_stats_conversion() {
        let body = r#"{"total_tickets": 3,
            "por_estado": {"nuevo": {"nombre": "Nuevo", "count": 2}, "cerrado": {"nombre": "Cerrado", "count": 1}},
            "por_prioridad": {"alta": {"nombre": "Alta", "count": 3}}}"#;
        let stats = TicketStats::from(serde_json::from_str::<WireStats>(body).unwrap());
        assert_eq!(stats.total, 3);
        assert_eq!(stats.status_count(TicketStatus::New), 2);
        assert_eq!(stats.status_count(TicketStatus::InProgress), 0);
        assert_eq!(stats.status_count(TicketStatus::Closed), 1);
        assert_eq!(stats.priority_count(TicketPriority::High), 3);
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(r#"{"error": "Transición inválida"}"#).as_deref(),
            Some("Transición inválida")
        );
        assert_eq!(
            error_message(r#"{"nuevo_estado": ["Transición inválida."]}"#).as_deref(),
            Some("nuevo_estado: Transición inválida.")
        );
        assert_eq!(
            error_message(r#"{"detail": "Not found."}"#).as_deref(),
            Some("Not found.")
        );
        assert_eq!(error_message("<html>oops</html>"), None);
        assert_eq!(error_message("{}"), None);
    }
}
