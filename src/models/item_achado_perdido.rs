//! Lost-and-found items (`item_achado_perdido` table).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::usuario::UsuarioResumo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TipoItem {
    Achado,
    Perdido,
}

/// A lost or found item reported by a resident.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemAchadoPerdido {
    pub id: i64,
    pub titulo: String,
    pub descricao: String,
    pub tipo: TipoItem,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foto_url: Option<String>,
    pub id_usuario: String,
    pub id_condominio: i64,
    #[serde(default)]
    pub resolvido: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_criacao: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usuario: Option<UsuarioResumo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemAchadoPerdidoCreate {
    pub titulo: String,
    pub descricao: String,
    pub tipo: TipoItem,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foto_url: Option<String>,
    pub id_usuario: String,
    pub id_condominio: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolvido: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ItemAchadoPerdidoUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub titulo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo: Option<TipoItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foto_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolvido: Option<bool>,
}
