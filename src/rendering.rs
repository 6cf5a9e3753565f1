//! Factory pour le contexte de rendu GPU.
//!
//! Isole la création du `WindowRenderingContext` (surfman/OpenGL) du reste
//! de l'application.

use std::rc::Rc;

use servo::{RenderingContext, WindowRenderingContext};
use winit::dpi::PhysicalSize;
use winit::raw_window_handle::{DisplayHandle, WindowHandle};

use crate::error::{Result, ShellError};

/// Crée un contexte de rendu lié à la fenêtre Winit et le rend courant.
///
/// Le contexte doit être courant avant d'être passé à `WebViewBuilder`.
/// Un échec (pas de driver compatible, handles invalides) est fatal pour
/// le navigateur : l'appelant journalise l'erreur et quitte.
pub fn create_rendering_context(
    display_handle: DisplayHandle<'_>,
    window_handle: WindowHandle<'_>,
    size: PhysicalSize<u32>,
) -> Result<Rc<WindowRenderingContext>> {
    let rendering_context = WindowRenderingContext::new(display_handle, window_handle, size)
        .map_err(|e| ShellError::rendering("WindowRenderingContext::new", e))?;

    rendering_context
        .make_current()
        .map_err(|e| ShellError::rendering("make_current", e))?;

    Ok(Rc::new(rendering_context))
}
