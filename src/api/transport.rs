//! # Transporte HTTP
//!
//! Construye la URL completa y las cabeceras (`Content-Type` y credenciales
//! Basic) de cada llamada a la API del hotel. Los controladores solo ven el
//! trait [`Transporte`], así las pruebas pueden sustituir la red.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

use super::{AppError, AppResult};
use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metodo {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Metodo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        })
    }
}

impl From<Metodo> for reqwest::Method {
    fn from(metodo: Metodo) -> Self {
        match metodo {
            Metodo::Get => reqwest::Method::GET,
            Metodo::Post => reqwest::Method::POST,
            Metodo::Put => reqwest::Method::PUT,
            Metodo::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Petición relativa a la URL base de la API.
#[derive(Debug, Clone, PartialEq)]
pub struct Peticion {
    pub metodo: Metodo,
    /// Ruta que empieza con `/`, por ejemplo `/api/persona/3`
    pub ruta: String,
    pub query: Vec<(String, String)>,
    pub cuerpo: Option<Value>,
}

impl Peticion {
    fn nueva(metodo: Metodo, ruta: impl Into<String>, cuerpo: Option<Value>) -> Self {
        Self {
            metodo,
            ruta: ruta.into(),
            query: Vec::new(),
            cuerpo,
        }
    }

    pub fn get(ruta: impl Into<String>) -> Self {
        Self::nueva(Metodo::Get, ruta, None)
    }

    pub fn post(ruta: impl Into<String>, cuerpo: Value) -> Self {
        Self::nueva(Metodo::Post, ruta, Some(cuerpo))
    }

    pub fn put(ruta: impl Into<String>, cuerpo: Value) -> Self {
        Self::nueva(Metodo::Put, ruta, Some(cuerpo))
    }

    pub fn delete(ruta: impl Into<String>) -> Self {
        Self::nueva(Metodo::Delete, ruta, None)
    }

    pub fn with_query(mut self, clave: &str, valor: impl Into<String>) -> Self {
        self.query.push((clave.to_string(), valor.into()));
        self
    }

    /// Ruta con la query ya codificada, tal como viaja en la URL.
    pub fn destino(&self) -> String {
        if self.query.is_empty() {
            return self.ruta.clone();
        }
        let pares: Vec<String> = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        format!("{}?{}", self.ruta, pares.join("&"))
    }
}

/// Estado HTTP y cuerpo sin interpretar.
#[derive(Debug, Clone, PartialEq)]
pub struct Respuesta {
    pub status: u16,
    pub cuerpo: String,
}

impl Respuesta {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait Transporte: Send + Sync + 'static {
    /// Envía la petición y devuelve la respuesta sea cual sea su estado HTTP.
    ///
    /// # Errores
    /// - `Transport`: la petición no llegó a completarse (red, timeout)
    async fn enviar(&self, peticion: Peticion) -> AppResult<Respuesta>;
}

/// Transporte real sobre `reqwest`.
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
    authorization: HeaderValue,
}

impl HttpTransport {
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Config(format!("no se pudo crear el cliente HTTP: {}", e)))?;

        let credenciales = STANDARD.encode(format!("{}:{}", config.username, config.password));
        let mut authorization = HeaderValue::from_str(&format!("Basic {}", credenciales))
            .map_err(|e| AppError::Config(format!("credenciales inválidas: {}", e)))?;
        authorization.set_sensitive(true);

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            authorization,
        })
    }

    pub fn url(&self, ruta: &str) -> String {
        format!("{}{}", self.base_url, ruta)
    }

    pub fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, self.authorization.clone());
        headers
    }
}

#[async_trait]
impl Transporte for HttpTransport {
    async fn enviar(&self, peticion: Peticion) -> AppResult<Respuesta> {
        let request_id = Uuid::new_v4();
        let operacion = format!("{} {}", peticion.metodo, peticion.ruta);
        tracing::debug!(
            request_id = %request_id,
            metodo = %peticion.metodo,
            destino = %peticion.destino(),
            "Enviando petición a la API"
        );

        let mut builder = self
            .http
            .request(peticion.metodo.into(), self.url(&peticion.ruta))
            .headers(self.headers());
        if !peticion.query.is_empty() {
            builder = builder.query(&peticion.query);
        }
        if let Some(cuerpo) = &peticion.cuerpo {
            builder = builder.json(cuerpo);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| AppError::transport(&operacion, e))?;
        let status = resp.status().as_u16();
        let cuerpo = resp
            .text()
            .await
            .map_err(|e| AppError::transport(&operacion, e))?;

        tracing::debug!(request_id = %request_id, status = status, "Respuesta recibida");
        Ok(Respuesta { status, cuerpo })
    }
}
