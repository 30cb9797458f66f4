//! Transporte en memoria para pruebas: respuestas programadas por destino
//! (`"GET /api/persona"`) y registro de todas las peticiones enviadas.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use super::transport::{Metodo, Peticion, Respuesta, Transporte};
use super::{AppError, AppResult};

type Observador = Box<dyn Fn(&Peticion) + Send + Sync>;

#[derive(Default)]
pub struct TransporteSimulado {
    respuestas: Mutex<HashMap<String, VecDeque<AppResult<Respuesta>>>>,
    peticiones: Mutex<Vec<Peticion>>,
    observador: Mutex<Option<Observador>>,
    retenidas: Mutex<HashMap<String, VecDeque<Arc<Notify>>>>,
}

fn clave(metodo: Metodo, destino: &str) -> String {
    format!("{} {}", metodo, destino)
}

impl TransporteSimulado {
    pub fn new() -> Self {
        Self::default()
    }

    /// Programa una respuesta JSON para `metodo destino`. Se consumen en orden.
    pub fn responder(&self, metodo: Metodo, destino: &str, status: u16, cuerpo: Value) -> &Self {
        self.encolar(
            metodo,
            destino,
            Ok(Respuesta {
                status,
                cuerpo: cuerpo.to_string(),
            }),
        )
    }

    /// Programa un fallo de transporte (la petición no llega a completarse).
    pub fn fallar(&self, metodo: Metodo, destino: &str) -> &Self {
        self.encolar(
            metodo,
            destino,
            Err(AppError::Internal("conexión rechazada".to_string())),
        )
    }

    fn encolar(&self, metodo: Metodo, destino: &str, respuesta: AppResult<Respuesta>) -> &Self {
        self.respuestas
            .lock()
            .unwrap()
            .entry(clave(metodo, destino))
            .or_default()
            .push_back(respuesta);
        self
    }

    /// La próxima petición a `metodo destino` queda registrada pero no se
    /// responde hasta que se avise al `Notify` devuelto.
    pub fn retener(&self, metodo: Metodo, destino: &str) -> Arc<Notify> {
        let aviso = Arc::new(Notify::new());
        self.retenidas
            .lock()
            .unwrap()
            .entry(clave(metodo, destino))
            .or_default()
            .push_back(aviso.clone());
        aviso
    }

    /// Se invoca con cada petición justo antes de responderla.
    pub fn observar<F>(&self, f: F)
    where
        F: Fn(&Peticion) + Send + Sync + 'static,
    {
        *self.observador.lock().unwrap() = Some(Box::new(f));
    }

    pub fn peticiones(&self) -> Vec<Peticion> {
        self.peticiones.lock().unwrap().clone()
    }

    pub fn enviadas(&self, metodo: Metodo) -> usize {
        self.peticiones
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.metodo == metodo)
            .count()
    }
}

#[async_trait]
impl Transporte for TransporteSimulado {
    async fn enviar(&self, peticion: Peticion) -> AppResult<Respuesta> {
        if let Some(observador) = self.observador.lock().unwrap().as_ref() {
            observador(&peticion);
        }
        self.peticiones.lock().unwrap().push(peticion.clone());

        let destino = clave(peticion.metodo, &peticion.destino());
        let retenida = self
            .retenidas
            .lock()
            .unwrap()
            .get_mut(&destino)
            .and_then(VecDeque::pop_front);
        if let Some(aviso) = retenida {
            aviso.notified().await;
        }

        self.respuestas
            .lock()
            .unwrap()
            .get_mut(&destino)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Err(AppError::Internal(format!("sin respuesta simulada para {}", destino))))
    }
}
