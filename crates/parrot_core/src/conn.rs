use mod_keyshare::KeyShareKeys;
use parrot_traits::{CipherSuite, OsRandom, ProtocolVersion, RandSource, TlsExtension};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Unconfigured,
    /// A fingerprint was applied successfully; the hello can be marshalled.
    Configured,
}

#[derive(Debug, Clone, Default)]
pub struct UConnConfig {
    /// Host the connection targets. IP literals are never sent as SNI.
    pub server_name: Option<String>,
}

/// A client connection in the ClientHello construction phase.
///
/// Owns its randomness source and, after a successful apply, the resolved
/// extension list plus the private halves of every generated key share.
pub struct UConn {
    pub(crate) config: UConnConfig,
    pub(crate) rand: Box<dyn RandSource + Send>,
    pub(crate) state: ConnectionState,
    pub(crate) extensions: Vec<TlsExtension>,
    pub(crate) cipher_suites: Vec<CipherSuite>,
    pub(crate) compression_methods: Vec<u8>,
    pub(crate) vers_min: ProtocolVersion,
    pub(crate) vers_max: ProtocolVersion,
    pub(crate) client_random: [u8; 32],
    pub(crate) session_id: Vec<u8>,
    pub(crate) keys: KeyShareKeys,
}

impl UConn {
    pub fn new(config: UConnConfig, rand: impl RandSource + Send + 'static) -> Self {
        Self {
            config,
            rand: Box::new(rand),
            state: ConnectionState::Unconfigured,
            extensions: Vec::new(),
            cipher_suites: Vec::new(),
            compression_methods: Vec::new(),
            vers_min: ProtocolVersion::TLS10,
            vers_max: ProtocolVersion::TLS12,
            client_random: [0; 32],
            session_id: Vec::new(),
            keys: KeyShareKeys::new(),
        }
    }

    /// Connection to `server_name` backed by the OS random source.
    pub fn client(server_name: impl Into<String>) -> Self {
        Self::new(
            UConnConfig { server_name: Some(server_name.into()) },
            OsRandom,
        )
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn server_name(&self) -> Option<&str> {
        self.config.server_name.as_deref()
    }

    pub fn extensions(&self) -> &[TlsExtension] {
        &self.extensions
    }

    pub fn cipher_suites(&self) -> &[CipherSuite] {
        &self.cipher_suites
    }

    pub fn compression_methods(&self) -> &[u8] {
        &self.compression_methods
    }

    pub fn version_bounds(&self) -> (ProtocolVersion, ProtocolVersion) {
        (self.vers_min, self.vers_max)
    }

    pub fn client_random(&self) -> &[u8; 32] {
        &self.client_random
    }

    pub fn session_id(&self) -> &[u8] {
        &self.session_id
    }

    /// Private key state the handshake layer completes key agreement with.
    pub fn key_share_keys(&self) -> &KeyShareKeys {
        &self.keys
    }

    /// Drops the private key handles once the handshake no longer needs them.
    pub fn clear_key_state(&mut self) {
        self.keys.clear();
    }
}
