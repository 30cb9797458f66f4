//! # Configuración
//!
//! Se construye una sola vez al arrancar, a partir del entorno (y del archivo
//! `.env` si existe), y se pasa explícitamente al transporte.
//!
//! ```env
//! HOTEL_API_URL=http://localhost:3000
//! HOTEL_API_USERNAME=admin
//! HOTEL_API_PASSWORD=secreto
//! HOTEL_API_TIMEOUT_SECS=30
//! BIND_ADDRESS=0.0.0.0:8080
//! ```

use std::env;
use std::fmt;
use std::time::Duration;

use crate::api::{AppError, AppResult};

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone)]
pub struct Config {
    /// URL base de la API, sin `/` final
    pub api_url: String,
    pub username: String,
    pub password: String,
    pub timeout: Duration,
    /// Dirección donde escucha el panel
    pub bind_address: String,
}

impl Config {
    /// Lee la configuración de las variables de entorno.
    ///
    /// # Errores
    /// - `Config`: si falta alguna variable requerida o tiene un valor inválido
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|clave| env::var(clave).ok())
    }

    /// Igual que [`Config::from_env`] pero con una fuente de valores arbitraria.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let requerida = |clave: &str| -> AppResult<String> {
            lookup(clave)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| AppError::Config(format!("falta la variable {}", clave)))
        };

        let api_url = requerida("HOTEL_API_URL")?
            .trim_end_matches('/')
            .to_string();
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(AppError::Config(format!(
                "HOTEL_API_URL debe empezar con http:// o https:// (valor: {})",
                api_url
            )));
        }

        let username = requerida("HOTEL_API_USERNAME")?;
        let password = requerida("HOTEL_API_PASSWORD")?;

        let timeout_secs = match lookup("HOTEL_API_TIMEOUT_SECS") {
            Some(valor) => valor.trim().parse::<u64>().map_err(|_| {
                AppError::Config(format!("HOTEL_API_TIMEOUT_SECS inválido: {}", valor))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let bind_address =
            lookup("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        Ok(Self {
            api_url,
            username,
            password,
            timeout: Duration::from_secs(timeout_secs),
            bind_address,
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_url", &self.api_url)
            .field("username", &self.username)
            .field("password", &"***")
            .field("timeout", &self.timeout)
            .field("bind_address", &self.bind_address)
            .finish()
    }
}
