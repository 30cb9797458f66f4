//! # Controlador genérico de recursos
//!
//! Un [`ResourceController`] mantiene en memoria la lista de una colección
//! remota (`/api/persona`, `/api/habitacion`, `/api/reserva`) y la reconcilia
//! tras cada llamada con el registro que devuelve el servidor, nunca con el
//! borrador enviado. El controlador es el único que escribe su lista.
//!
//! Las operaciones que modifican toman `&mut self`, así que las llamadas de
//! un mismo recurso quedan serializadas.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;

use super::envelope::{interpretar, Envelope};
use super::middleware::ErrorLogExt;
use super::transport::{Peticion, Transporte};
use super::{AppError, AppResult, ResultExt};
use crate::modelos::{Recurso, RecursoId};

/// Resultado de una eliminación con confirmación previa.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted { message: String },
    /// El usuario no confirmó; no se envió ninguna petición
    Declined,
}

/// Marca la carga como activa mientras vive; al soltarse la desactiva,
/// termine la llamada como termine.
struct LoadingGuard<'a>(&'a watch::Sender<bool>);

impl<'a> LoadingGuard<'a> {
    fn start(loading: &'a watch::Sender<bool>) -> Self {
        loading.send_replace(true);
        Self(loading)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.send_replace(false);
    }
}

/// Estado del formulario: borrador y modo edición.
///
/// El borrador de alta lleva `id: None`; al editar es una copia del registro.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Formulario<R> {
    borrador: R,
    editando: bool,
}

impl<R: Recurso> Formulario<R> {
    pub fn nuevo() -> Self {
        Self {
            borrador: R::default(),
            editando: false,
        }
    }

    pub fn editar(registro: &R) -> Self {
        Self {
            borrador: registro.clone(),
            editando: true,
        }
    }

    pub fn borrador(&self) -> &R {
        &self.borrador
    }

    pub fn borrador_mut(&mut self) -> &mut R {
        &mut self.borrador
    }

    pub fn is_editing(&self) -> bool {
        self.editando
    }

    /// Descarta el borrador y vuelve al modo alta.
    pub fn cancelar(&mut self) {
        *self = Self::nuevo();
    }
}

pub struct ResourceController<R: Recurso> {
    transporte: Arc<dyn Transporte>,
    items: Vec<R>,
    loading: watch::Sender<bool>,
}

impl<R: Recurso> ResourceController<R> {
    pub fn new(transporte: Arc<dyn Transporte>) -> Self {
        let (loading, _) = watch::channel(false);
        Self {
            transporte,
            items: Vec::new(),
            loading,
        }
    }

    /// Lista en el orden en que la entregó el servidor.
    pub fn items(&self) -> &[R] {
        &self.items
    }

    pub fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }

    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    fn nombre() -> String {
        R::NOMBRE.to_lowercase()
    }

    /// Reemplaza la lista con la colección remota.
    ///
    /// Cualquier respuesta que no sea un sobre `success` con una secuencia en
    /// `data` deja la lista vacía; el fallo solo se registra en el log.
    pub async fn load(&mut self) -> &[R] {
        let _guard = LoadingGuard::start(&self.loading);
        let contexto = format!("al cargar {}", R::RUTA);

        let cargados = match self
            .transporte
            .enviar(Peticion::get(R::RUTA))
            .await
            .log_error_context(&contexto)
        {
            Ok(respuesta) => {
                let lista = Envelope::parse(&respuesta.cuerpo)
                    .filter(|e| respuesta.is_success() && e.is_success())
                    .and_then(|e| e.data_list::<R>());
                if lista.is_none() {
                    tracing::warn!(
                        ruta = R::RUTA,
                        status = respuesta.status,
                        "Respuesta de carga inesperada, se deja la lista vacía"
                    );
                }
                lista.unwrap_or_default()
            }
            Err(_) => Vec::new(),
        };

        tracing::debug!(ruta = R::RUTA, total = cargados.len(), "Lista cargada");
        self.items = cargados;
        &self.items
    }

    /// Obtiene un registro del servidor sin tocar la lista.
    pub async fn get(&self, id: &RecursoId) -> AppResult<R> {
        let respuesta = self
            .transporte
            .enviar(Peticion::get(R::ruta_item(id)))
            .await
            .log_error_context(&format!("al obtener {} {}", R::NOMBRE, id))?;
        let defecto = format!("No se pudo obtener la {}.", Self::nombre());
        interpretar(&respuesta, &defecto)?.data_as()
    }

    /// Da de alta el borrador y agrega el registro devuelto al final de la lista.
    ///
    /// # Retorna
    /// El mensaje del servidor o uno por defecto
    ///
    /// # Errores
    /// - `Validation*`: el borrador no cumple las restricciones de campo (no se envía nada)
    /// - `Api`, `Transport`, `Decode`: la lista no se modifica
    pub async fn create(&mut self, borrador: &R) -> AppResult<String> {
        borrador.validar()?;
        let cuerpo = serde_json::to_value(borrador).map_err_internal("serializando borrador")?;

        let respuesta = self
            .transporte
            .enviar(Peticion::post(R::RUTA, cuerpo))
            .await
            .log_error_context(&format!("al crear {}", R::NOMBRE))?;
        let envelope = interpretar(&respuesta, "Operacion fallida")
            .log_warn_context(&format!("al crear {}", R::NOMBRE))?;

        let creado: R = envelope.data_as()?;
        if creado.id().is_none() {
            return Err(AppError::Decode(format!("{} creada sin id", R::NOMBRE)));
        }

        tracing::info!(ruta = R::RUTA, id = ?creado.id(), "Registro creado");
        self.items.push(creado);
        Ok(envelope
            .message
            .unwrap_or_else(|| format!("{} creada exitosamente", R::NOMBRE)))
    }

    /// Actualiza el registro `id` y reemplaza en su sitio el elemento que
    /// coincide con el id del registro devuelto.
    pub async fn update(&mut self, id: &RecursoId, borrador: &R) -> AppResult<String> {
        borrador.validar()?;
        let cuerpo = serde_json::to_value(borrador).map_err_internal("serializando borrador")?;

        let respuesta = self
            .transporte
            .enviar(Peticion::put(R::ruta_item(id), cuerpo))
            .await
            .log_error_context(&format!("al actualizar {} {}", R::NOMBRE, id))?;
        let envelope = interpretar(&respuesta, "Operacion fallida")
            .log_warn_context(&format!("al actualizar {} {}", R::NOMBRE, id))?;

        let actualizado: R = envelope.data_as()?;
        let objetivo = actualizado.id().cloned().unwrap_or_else(|| id.clone());

        match self.items.iter_mut().find(|item| item.id() == Some(&objetivo)) {
            Some(slot) => *slot = actualizado,
            None => tracing::debug!(ruta = R::RUTA, id = %objetivo, "Registro actualizado no estaba en la lista"),
        }

        Ok(envelope
            .message
            .unwrap_or_else(|| format!("{} actualizada exitosamente", R::NOMBRE)))
    }

    /// Elimina el registro `id` si `confirmar` lo aprueba.
    ///
    /// `confirmar` recibe la pregunta a mostrar al usuario. Si devuelve
    /// `false` no se envía nada y la lista queda igual.
    pub async fn delete<F>(&mut self, id: &RecursoId, confirmar: F) -> AppResult<DeleteOutcome>
    where
        F: FnOnce(&str) -> bool,
    {
        let pregunta = format!(
            "¿Estas seguro de que deseas eliminar la {} con ID: {}?",
            Self::nombre(),
            id
        );
        if !confirmar(&pregunta) {
            tracing::debug!(ruta = R::RUTA, id = %id, "Eliminación cancelada por el usuario");
            return Ok(DeleteOutcome::Declined);
        }

        let respuesta = self
            .transporte
            .enviar(Peticion::delete(R::ruta_item(id)))
            .await
            .log_error_context(&format!("al eliminar {} {}", R::NOMBRE, id))?;
        let defecto = format!("No se pudo eliminar la {}.", Self::nombre());
        let envelope = interpretar(&respuesta, &defecto)
            .log_warn_context(&format!("al eliminar {} {}", R::NOMBRE, id))?;

        self.items.retain(|item| item.id() != Some(id));
        tracing::info!(ruta = R::RUTA, id = %id, "Registro eliminado");

        Ok(DeleteOutcome::Deleted {
            message: envelope
                .message
                .unwrap_or_else(|| format!("{} eliminada exitosamente", R::NOMBRE)),
        })
    }

    /// Copia `registro` a un formulario en modo edición. No hace llamadas.
    pub fn edit(&self, registro: &R) -> Formulario<R> {
        Formulario::editar(registro)
    }

    /// Envía el formulario: alta o actualización según el modo.
    /// Si sale bien, el formulario vuelve a quedar en blanco.
    pub async fn submit(&mut self, formulario: &mut Formulario<R>) -> AppResult<String> {
        let mensaje = if formulario.is_editing() {
            let id = formulario
                .borrador()
                .id()
                .cloned()
                .ok_or_else(|| AppError::Validation("El registro a editar no tiene id".to_string()))?;
            self.update(&id, formulario.borrador()).await?
        } else {
            self.create(formulario.borrador()).await?
        };

        formulario.cancelar();
        Ok(mensaje)
    }
}
