//! Interest groups (`grupo` and `grupo_membro` tables).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::usuario::UsuarioResumo;

/// An interest group inside a community.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grupo {
    pub id: i64,
    pub nome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,
    pub id_condominio: i64,
    pub id_criador: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_criacao: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criador: Option<UsuarioResumo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub membros_count: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrupoCreate {
    pub nome: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,
    pub id_condominio: i64,
    pub id_criador: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GrupoUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,
}

/// Membership row, one per (group, user) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrupoMembro {
    pub id: i64,
    pub id_grupo: i64,
    pub id_usuario: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_entrada: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usuario: Option<UsuarioResumo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrupoMembroCreate {
    pub id_grupo: i64,
    pub id_usuario: String,
}
