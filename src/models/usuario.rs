//! Resident profile rows (`usuario` table).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::condominio::Condominio;

/// Role of a resident inside the community.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Perfil {
    /// Regular resident
    #[default]
    Morador,
    /// Community manager
    Sindico,
    /// Front-desk staff
    Portaria,
}

/// How the resident proved they belong to the community.
/// Informational only; verification no longer gates access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetodoVerificacao {
    Comprovante,
    Convite,
    CodigoPostal,
}

/// A resident profile.
///
/// The `id` is the auth identity id (UUID), so the profile row and the auth
/// user stay 1:1. `condominio` is only populated when the read embedded the
/// relation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usuario {
    pub id: String,
    pub nome: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telefone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unidade: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foto_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interesses: Option<Vec<String>>,
    #[serde(default)]
    pub perfil: Perfil,
    #[serde(default)]
    pub verificado: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metodo_verificacao: Option<MetodoVerificacao>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_condominio: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condominio: Option<Condominio>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_criacao: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Usuario {
    /// Minimal profile synthesized from an auth identity when the full
    /// profile could not be loaded in time. Named after the email's
    /// local-part, unverified, with no community link.
    pub fn minimal(id: impl Into<String>, email: &str) -> Self {
        let local_part = email.split('@').next().unwrap_or_default();
        let nome = if local_part.is_empty() {
            email.to_string()
        } else {
            local_part.to_string()
        };
        Self {
            id: id.into(),
            nome,
            email: email.to_string(),
            telefone: None,
            unidade: None,
            foto_url: None,
            bio: None,
            interesses: None,
            perfil: Perfil::Morador,
            verificado: false,
            metodo_verificacao: None,
            id_condominio: None,
            condominio: None,
            data_criacao: None,
            updated_at: None,
        }
    }
}

/// Fields accepted when creating a profile row.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UsuarioCreate {
    pub nome: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unidade: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub perfil: Option<Perfil>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verificado: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_condominio: Option<i64>,
}

/// Partial update of a profile row; absent fields are left untouched.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UsuarioUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unidade: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foto_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interesses: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub perfil: Option<Perfil>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_condominio: Option<i64>,
    /// Stamped by the service on every update
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Short profile shape returned by relation embeds
/// (e.g. `usuario:usuario(id, nome, foto_url)`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsuarioResumo {
    pub id: String,
    pub nome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foto_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unidade: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfil_wire_names() {
        assert_eq!(serde_json::to_string(&Perfil::Morador).unwrap(), "\"morador\"");
        assert_eq!(serde_json::to_string(&Perfil::Sindico).unwrap(), "\"sindico\"");
        assert_eq!(serde_json::to_string(&Perfil::Portaria).unwrap(), "\"portaria\"");
    }

    #[test]
    fn test_metodo_verificacao_wire_names() {
        assert_eq!(
            serde_json::to_string(&MetodoVerificacao::CodigoPostal).unwrap(),
            "\"codigo_postal\""
        );
    }

    #[test]
    fn test_minimal_profile_uses_email_local_part() {
        let usuario = Usuario::minimal("u-1", "ana.silva@example.com");
        assert_eq!(usuario.nome, "ana.silva");
        assert_eq!(usuario.email, "ana.silva@example.com");
        assert_eq!(usuario.perfil, Perfil::Morador);
        assert!(!usuario.verificado);
        assert!(usuario.id_condominio.is_none());
    }

    #[test]
    fn test_update_serializes_only_present_fields() {
        let update = UsuarioUpdate {
            foto_url: Some("https://cdn.example.com/a.png".into()),
            ..Default::default()
        };
        let json = serde_json::to_string(&update).unwrap();
        assert!(json.contains("foto_url"));
        assert!(!json.contains("nome"));
        assert!(!json.contains("id_condominio"));
    }

    #[test]
    fn test_usuario_deserializes_without_optional_fields() {
        let json = r#"{"id":"u-1","nome":"Ana","email":"ana@example.com","verificado":true}"#;
        let usuario: Usuario = serde_json::from_str(json).unwrap();
        assert!(usuario.verificado);
        assert_eq!(usuario.perfil, Perfil::Morador);
        assert!(usuario.condominio.is_none());
    }
}
