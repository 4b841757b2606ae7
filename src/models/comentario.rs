//! Comments on bulletin posts (`aviso_comentario` table).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::usuario::UsuarioResumo;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comentario {
    pub id: i64,
    pub conteudo: String,
    pub id_aviso: i64,
    pub id_usuario: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_criacao: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_atualizacao: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usuario: Option<UsuarioResumo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComentarioCreate {
    pub conteudo: String,
    pub id_aviso: i64,
    pub id_usuario: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ComentarioUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conteudo: Option<String>,
    /// Stamped by the service on every update
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_atualizacao: Option<DateTime<Utc>>,
}
