pub mod apply;
pub mod config;
pub mod conn;
pub mod error;
pub mod grease;
pub mod hello;

pub use conn::{ConnectionState, UConn, UConnConfig};
pub use error::{ApplyError, HelloError};
pub use mod_keyshare::{EcdhPrivateKey, KemPrivateKey, KeySharePrivate, KeyShareKeys};
pub use mod_profiles::ClientHelloId;

use anyhow::Result;
use parrot_traits::{OsRandom, RandSource, RngSource};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::str::FromStr;

/// Builds a configured connection from a [`config::Config`].
///
/// `profile` is tried as a built-in id first, then as a document path.
pub fn connect_from_config(config: &config::Config) -> Result<UConn> {
    let rand: Box<dyn RandSource + Send> = match config.deterministic_seed {
        Some(seed) => {
            tracing::warn!("Using deterministic randomness (seed {}); output is reproducible", seed);
            Box::new(RngSource(StdRng::seed_from_u64(seed)))
        }
        None => Box::new(OsRandom),
    };

    let mut conn = UConn::new(
        UConnConfig { server_name: Some(config.server_name.clone()) },
        rand,
    );
    match ClientHelloId::from_str(&config.profile) {
        Ok(id) => conn.apply_hello_id(id)?,
        Err(_) => {
            let spec = mod_profiles::load_file(&config.profile)?;
            conn.apply_preset(&spec)?;
        }
    }
    Ok(conn)
}
