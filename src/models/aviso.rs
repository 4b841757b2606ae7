//! Bulletin-board posts (`aviso` and `aviso_like` tables).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::usuario::UsuarioResumo;

/// Kind of bulletin post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TipoAviso {
    Alerta,
    Recado,
    Evento,
}

/// Post priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Prioridade {
    Baixa,
    #[default]
    Media,
    Alta,
}

/// A bulletin-board post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Aviso {
    pub id: i64,
    pub titulo: String,
    pub conteudo: String,
    pub tipo: TipoAviso,
    pub prioridade: Prioridade,
    pub id_usuario: String,
    pub id_condominio: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comentarios: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_criacao: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_atualizacao: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usuario: Option<UsuarioResumo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvisoCreate {
    pub titulo: String,
    pub conteudo: String,
    pub tipo: TipoAviso,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prioridade: Option<Prioridade>,
    pub id_usuario: String,
    pub id_condominio: i64,
    /// Filled in by the service; new posts start with zero likes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub likes: Option<i64>,
    /// Filled in by the service; new posts start with zero comments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comentarios: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AvisoUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub titulo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conteudo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo: Option<TipoAviso>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prioridade: Option<Prioridade>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub likes: Option<i64>,
    /// Stamped by the service on every update
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_atualizacao: Option<DateTime<Utc>>,
}

/// A like on a post, one row per (post, user) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvisoLike {
    pub id: i64,
    pub id_aviso: i64,
    pub id_usuario: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_criacao: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvisoLikeCreate {
    pub id_aviso: i64,
    pub id_usuario: String,
}
