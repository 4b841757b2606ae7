//! Main Vizinha client with builder pattern.
//!
//! Wires the transport, the credential layer, the table executor, the
//! storage client and the session manager together from one configuration.

use std::sync::Arc;
use std::time::Duration;

use crate::auth::{ApiAuth, AuthClient};
use crate::error::{Result, VizinhaLinkError};
use crate::services::{
    AgendaService, AjudaMutuaService, AvisoService, ComentarioService, CondominioService,
    EncomendaService, GrupoService, ItemAchadoPerdidoService, LocalizacaoMapaService,
    MensagemService, UsuarioService,
};
use crate::session::{MemorySessionStore, SessionManager, SessionStore};
use crate::storage::StorageClient;
use crate::table::TableExecutor;
use crate::timeouts::VizinhaLinkTimeouts;

/// Main client for a Vizinha backend.
///
/// Use [`VizinhaLinkClientBuilder`] to construct instances with custom
/// configuration. Cloning is cheap: clones share the connection pool, the
/// credential cell and the session manager.
///
/// # Examples
///
/// ```rust,no_run
/// use vizinha_link::VizinhaLinkClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = VizinhaLinkClient::builder()
///     .base_url("https://example.supabase.co")
///     .api_key("public-anon-key")
///     .build()?;
///
/// client.session().sign_in("ana@example.com", "secret").await?;
/// let avisos = client.avisos().find_by_condominio(7).await?;
/// println!("{} posts", avisos.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct VizinhaLinkClient {
    base_url: String,
    tables: TableExecutor,
    storage: StorageClient,
    session: Arc<SessionManager>,
    timeouts: VizinhaLinkTimeouts,
}

impl VizinhaLinkClient {
    /// Create a new builder for configuring the client
    pub fn builder() -> VizinhaLinkClientBuilder {
        VizinhaLinkClientBuilder::new()
    }

    /// The configured backend base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Generic table access, for tables without a dedicated service
    pub fn tables(&self) -> &TableExecutor {
        &self.tables
    }

    /// File storage (buckets)
    pub fn storage(&self) -> &StorageClient {
        &self.storage
    }

    /// The session manager owning authentication state
    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    /// Restore a persisted session on a background task after a short
    /// deferral (`timeouts.bootstrap_delay`), so route guards evaluate
    /// against the default anonymous state first and reconcile
    /// asynchronously. Never fails; see [`SessionManager::bootstrap`].
    pub fn spawn_bootstrap(&self) -> tokio::task::JoinHandle<()> {
        let session = Arc::clone(&self.session);
        let delay = self.timeouts.bootstrap_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            session.bootstrap().await;
        })
    }

    /// The configured timeouts
    pub fn timeouts(&self) -> &VizinhaLinkTimeouts {
        &self.timeouts
    }

    pub fn usuarios(&self) -> UsuarioService {
        UsuarioService::new(self.tables.clone())
    }

    pub fn condominios(&self) -> CondominioService {
        CondominioService::new(
            self.tables.clone(),
            self.usuarios(),
            Arc::clone(&self.session),
        )
    }

    pub fn avisos(&self) -> AvisoService {
        AvisoService::new(self.tables.clone())
    }

    pub fn comentarios(&self) -> ComentarioService {
        ComentarioService::new(self.tables.clone())
    }

    pub fn encomendas(&self) -> EncomendaService {
        EncomendaService::new(self.tables.clone())
    }

    pub fn agendas(&self) -> AgendaService {
        AgendaService::new(self.tables.clone())
    }

    pub fn grupos(&self) -> GrupoService {
        GrupoService::new(self.tables.clone())
    }

    pub fn mensagens(&self) -> MensagemService {
        MensagemService::new(self.tables.clone())
    }

    pub fn ajudas_mutuas(&self) -> AjudaMutuaService {
        AjudaMutuaService::new(self.tables.clone())
    }

    pub fn itens_achados_perdidos(&self) -> ItemAchadoPerdidoService {
        ItemAchadoPerdidoService::new(self.tables.clone())
    }

    pub fn localizacoes_mapa(&self) -> LocalizacaoMapaService {
        LocalizacaoMapaService::new(self.tables.clone())
    }
}

/// Builder for configuring [`VizinhaLinkClient`] instances.
pub struct VizinhaLinkClientBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    timeouts: VizinhaLinkTimeouts,
    session_store: Option<Arc<dyn SessionStore>>,
}

impl VizinhaLinkClientBuilder {
    fn new() -> Self {
        Self {
            base_url: None,
            api_key: None,
            timeouts: VizinhaLinkTimeouts::default(),
            session_store: None,
        }
    }

    /// Set the backend base URL (required)
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the public API key (required)
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the timeout configuration for all operations
    pub fn timeouts(mut self, timeouts: VizinhaLinkTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Set where the session is persisted across restarts.
    /// Defaults to an in-memory store.
    pub fn session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.session_store = Some(store);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<VizinhaLinkClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| VizinhaLinkError::ConfigurationError("base_url is required".into()))?
            .trim_end_matches('/')
            .to_string();
        let api_key = self
            .api_key
            .ok_or_else(|| VizinhaLinkError::ConfigurationError("api_key is required".into()))?;

        // Pooled connections outlive individual requests; keep-alive saves
        // a handshake per call against the same host.
        let http_client = reqwest::Client::builder()
            .timeout(self.timeouts.request_timeout)
            .connect_timeout(self.timeouts.connection_timeout)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| VizinhaLinkError::ConfigurationError(e.to_string()))?;

        let api_auth = ApiAuth::new(api_key.clone());
        let tables = TableExecutor::new(base_url.clone(), http_client.clone(), api_auth.clone());
        let auth = AuthClient::new(base_url.clone(), http_client.clone(), api_key);
        let storage = StorageClient::new(base_url.clone(), http_client, api_auth.clone());

        let store = self
            .session_store
            .unwrap_or_else(|| Arc::new(MemorySessionStore::new()));
        let session = Arc::new(SessionManager::new(
            auth,
            api_auth,
            UsuarioService::new(tables.clone()),
            store,
            self.timeouts.clone(),
        ));

        Ok(VizinhaLinkClient {
            base_url,
            tables,
            storage,
            session,
            timeouts: self.timeouts,
        })
    }
}
