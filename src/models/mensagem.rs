//! Direct messages (`mensagem` table) and the conversation aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::usuario::UsuarioResumo;

/// A direct message between two residents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mensagem {
    pub id: i64,
    pub conteudo: String,
    pub id_usuario_origem: String,
    pub id_usuario_destino: String,
    #[serde(default)]
    pub lida: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_criacao: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usuario_origem: Option<UsuarioResumo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usuario_destino: Option<UsuarioResumo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MensagemCreate {
    pub conteudo: String,
    pub id_usuario_origem: String,
    pub id_usuario_destino: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lida: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MensagemUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lida: Option<bool>,
}

/// One conversation partner with the latest message and unread count.
/// Assembled client-side by `MensagemService::find_conversas`; not a table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversa {
    /// The other participant
    pub usuario: UsuarioResumo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ultima_mensagem: Option<Mensagem>,
    #[serde(default)]
    pub nao_lidas_count: u32,
}
