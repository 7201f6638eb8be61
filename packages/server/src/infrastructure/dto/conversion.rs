//! Conversion logic between wire DTOs and domain events.

use thiserror::Error;

use crate::domain::{
    DisplayName, EventKind, InboundEvent, MessageContent, MessageEvent, RoomId, ServerMessage,
    ValueObjectError,
};
use crate::infrastructure::dto::websocket as dto;
use parlor_shared::time::timestamp_to_rfc3339;

/// An inbound frame that cannot be turned into an `InboundEvent`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedEvent {
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Binary frames are not supported")]
    BinaryFrame,

    #[error("Invalid '{field}': {source}")]
    InvalidField {
        field: &'static str,
        source: ValueObjectError,
    },

    #[error("Chat events require a payload")]
    MissingPayload,
}

impl MalformedEvent {
    fn field(field: &'static str) -> impl FnOnce(ValueObjectError) -> Self {
        move |source| MalformedEvent::InvalidField { field, source }
    }
}

// ========================================
// DTO → Domain
// ========================================

impl From<dto::EventKindDto> for EventKind {
    fn from(dto: dto::EventKindDto) -> Self {
        match dto {
            dto::EventKindDto::Join => EventKind::Join,
            dto::EventKindDto::Chat => EventKind::Chat,
            dto::EventKindDto::Typing => EventKind::Typing,
            dto::EventKindDto::StopTyping => EventKind::StopTyping,
            dto::EventKindDto::Leave => EventKind::Leave,
        }
    }
}

impl TryFrom<dto::InboundEventDto> for InboundEvent {
    type Error = MalformedEvent;

    fn try_from(dto: dto::InboundEventDto) -> Result<Self, Self::Error> {
        let kind = EventKind::from(dto.kind);

        let room = dto
            .room
            .map(RoomId::new)
            .transpose()
            .map_err(MalformedEvent::field("room"))?;

        // 表示名を記録するのは join だけ。それ以外の不正な user は無視する
        let user = match kind {
            EventKind::Join => dto
                .user
                .map(DisplayName::new)
                .transpose()
                .map_err(MalformedEvent::field("user"))?,
            _ => dto.user.and_then(|user| DisplayName::new(user).ok()),
        };

        // payload は chat のみ意味を持つ（presence イベントでは無視）
        let content = match kind {
            EventKind::Chat => {
                let payload = dto.payload.ok_or(MalformedEvent::MissingPayload)?;
                Some(MessageContent::new(payload).map_err(MalformedEvent::field("payload"))?)
            }
            _ => None,
        };

        Ok(InboundEvent {
            kind,
            room,
            user,
            content,
        })
    }
}

/// Decode one text frame into a validated inbound event
pub fn decode_inbound(text: &str) -> Result<InboundEvent, MalformedEvent> {
    let dto: dto::InboundEventDto =
        serde_json::from_str(text).map_err(|e| MalformedEvent::InvalidJson(e.to_string()))?;
    dto.try_into()
}

// ========================================
// Domain → DTO
// ========================================

impl From<EventKind> for dto::EventKindDto {
    fn from(kind: EventKind) -> Self {
        match kind {
            EventKind::Join => dto::EventKindDto::Join,
            EventKind::Chat => dto::EventKindDto::Chat,
            EventKind::Typing => dto::EventKindDto::Typing,
            EventKind::StopTyping => dto::EventKindDto::StopTyping,
            EventKind::Leave => dto::EventKindDto::Leave,
        }
    }
}

impl From<&MessageEvent> for dto::OutboundEventDto {
    fn from(event: &MessageEvent) -> Self {
        Self {
            kind: event.kind.into(),
            room: event.room.as_str().to_string(),
            user: event.user.clone(),
            payload: event.payload.clone(),
            timestamp: timestamp_to_rfc3339(event.timestamp.value()),
        }
    }
}

impl From<&ServerMessage> for dto::ServerMessageDto {
    fn from(message: &ServerMessage) -> Self {
        match message {
            ServerMessage::Event(event) => dto::ServerMessageDto::Event(event.into()),
            ServerMessage::Error { reason } => dto::ServerMessageDto::Error(dto::ErrorNoticeDto {
                kind: dto::NoticeKindDto::Error,
                reason: reason.clone(),
            }),
        }
    }
}

/// Encode a server message as one JSON text frame
pub fn encode_server_message(message: &ServerMessage) -> Result<String, serde_json::Error> {
    serde_json::to_string(&dto::ServerMessageDto::from(message))
}
