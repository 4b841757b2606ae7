//! Package tracking (`encomenda` table).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::usuario::UsuarioResumo;

/// Pickup status of a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StatusEncomenda {
    /// Waiting at the front desk
    #[default]
    Aguardando,
    /// Picked up by the resident
    Retirada,
}

/// A package registered at the front desk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Encomenda {
    pub id: i64,
    pub descricao: String,
    pub status: StatusEncomenda,
    pub id_usuario: String,
    pub id_condominio: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_criacao: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_retirada: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usuario: Option<UsuarioResumo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncomendaCreate {
    pub descricao: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusEncomenda>,
    pub id_usuario: String,
    pub id_condominio: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EncomendaUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusEncomenda>,
    /// Stamped by the service when the status flips to `Retirada`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_retirada: Option<DateTime<Utc>>,
    /// Stamped by the service on every update
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}
