//! Boucle d'événements Winit et cycle de vie du navigateur.
//!
//! ## Pattern "Two-Phase App"
//!
//! Winit 0.30 impose que les fenêtres soient créées dans `resumed()`, et non
//! dans `main()`. Servo a besoin d'un handle de fenêtre pour son contexte de
//! rendu, d'où un enum à deux états :
//!
//! ```text
//! App::Initial { waker, config }  →  [resumed()]  →  App::Running(Rc<AppState>)
//! ```
//!
//! ## Architecture du rendu
//!
//! ```text
//! Window
//! ┌──────────────────────────────────────────────────────┐
//! │ < > R H [ champ de recherche        ] Go AB D         │  barre d'outils (GL)
//! ├──────────────────────────────────────────────────────┤
//! │ Servo WebView — OffscreenRenderingContext             │
//! │ blitté dans la zone restante                          │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! Les clics dans la barre d'outils passent par [`ToolbarLayout::hit_test`]
//! puis [`Shell::activate`] ; tout le reste est transmis à Servo.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use euclid::Scale;
use servo::{InputEvent, WheelDelta, WheelEvent, WheelMode};
use servo::{MouseButton as ServoMouseButton, MouseButtonAction, MouseButtonEvent};
use servo::{MouseLeftViewportEvent, MouseMoveEvent};
use servo::{
    OffscreenRenderingContext, RenderingContext, Servo, ServoBuilder, WebViewBuilder,
    WindowRenderingContext,
};
use tracing::{error, info};
use webrender_api::units::DevicePoint;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalPosition, LogicalSize, PhysicalSize};
use winit::event::{
    ElementState, KeyEvent, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent,
};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::ModifiersState;
use winit::raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::window::{Window, WindowAttributes};

use crate::chrome::{ChromeRenderer, ToolbarFrame};
use crate::config::Config;
use crate::error::Result;
use crate::filter::NetworkProfile;
use crate::preferences::build_servo_preferences;
use crate::privacy::FilterListEngine;
use crate::rendering;
use crate::servo_glue::{ServoView, Waker, WakerEvent};
use crate::shell::Shell;
use crate::theme::Palette;
use crate::toolbar::{Control, KeyAction, ToolbarLayout, key_action};

// ─────────────────────────────────────────────────────────────────────────────
// AppState : état partagé entre Winit et Servo
// ─────────────────────────────────────────────────────────────────────────────

/// État de l'application, créé lors de `resumed()`.
///
/// Encapsulé dans `Rc` : `WebViewDelegate` attend un `Rc<dyn WebViewDelegate>`
/// et tout vit sur le thread principal.
pub struct AppState {
    pub window: Window,
    pub servo: Servo,

    /// Contexte fenêtre : barre d'outils + blit du FBO.
    pub window_rendering_context: Rc<WindowRenderingContext>,

    /// FBO dans lequel Servo peint la WebView.
    pub offscreen_context: Rc<OffscreenRenderingContext>,

    pub config: Config,

    /// Profil réseau : porte le filtre de requêtes actif.
    pub profile: Rc<NetworkProfile>,

    pub shell: RefCell<Shell<ServoView>>,

    pub layout: RefCell<ToolbarLayout>,

    pub chrome: ChromeRenderer,

    /// Position courante du curseur en device pixels.
    pub cursor_position: Cell<DevicePoint>,

    pub modifiers: Cell<ModifiersState>,
}

impl AppState {
    fn toolbar_height(&self) -> f32 {
        self.config.toolbar.height as f32
    }

    /// Transmet un événement d'entrée à la WebView, si elle existe.
    fn forward_input(&self, event: InputEvent) {
        if let Some(webview) = self.shell.borrow().view().webview() {
            webview.notify_input_event(event);
        }
    }

    fn activate(&self, control: Control) {
        self.shell.borrow_mut().activate(control);
        self.window.request_redraw();
    }

    fn redraw(&self) {
        let inner_size = self.window.inner_size();
        let toolbar_h = self.config.toolbar.height;

        // 1. Servo peint dans le FBO
        if let Some(webview) = self.shell.borrow().view().webview() {
            webview.paint();
        }

        // 2. Blit du FBO sous la barre d'outils (coordonnées GL : origine en bas)
        self.window_rendering_context.prepare_for_rendering();
        if let Some(blit) = self.offscreen_context.render_to_parent_callback() {
            let gl = self.window_rendering_context.glow_gl_api();
            let target_rect = euclid::default::Rect::new(
                euclid::default::Point2D::new(0, 0),
                euclid::default::Size2D::new(
                    inner_size.width as i32,
                    inner_size.height.saturating_sub(toolbar_h) as i32,
                ),
            );
            blit(&gl, target_rect);
        }

        // 3. Barre d'outils
        let shell = self.shell.borrow();
        let field = shell.field();
        let checked: Vec<Control> = Control::ALL
            .into_iter()
            .filter(|c| shell.is_checked(*c))
            .collect();
        let layout = self.layout.borrow();
        let frame = ToolbarFrame {
            layout: &layout,
            style: shell.style(),
            field_text: field.text(),
            cursor: field.is_focused().then(|| field.cursor_char_offset()),
            checked: &checked,
        };
        unsafe {
            self.chrome
                .draw(inner_size.width, inner_size.height, &frame);
        }

        // 4. Présenter
        self.window_rendering_context.present();
    }

    /// Applique une touche pressée. Retourne `false` si elle va au moteur.
    fn handle_key(&self, event: &KeyEvent) -> bool {
        let focused = self.shell.borrow().field().is_focused();
        match key_action(&event.logical_key, self.modifiers.get(), focused) {
            KeyAction::Activate(control) => self.activate(control),
            KeyAction::Edit(edit) => {
                self.shell.borrow_mut().field_mut().apply(&edit);
                self.window.request_redraw();
            }
            KeyAction::Ignore => {}
            KeyAction::Forward => return false,
        }
        true
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// App : enum deux phases
// ─────────────────────────────────────────────────────────────────────────────

pub enum App {
    /// En attente de `resumed()`.
    Initial { waker: Waker, config: Config },

    /// Navigateur actif.
    Running(Rc<AppState>),

    /// Le démarrage a échoué ; la boucle est en train de se terminer.
    Failed,
}

impl App {
    pub fn new(event_loop: &EventLoop<WakerEvent>, config: Config) -> Self {
        Self::Initial {
            waker: Waker::new(event_loop),
            config,
        }
    }

    fn running(&self) -> Option<&Rc<AppState>> {
        match self {
            Self::Running(state) => Some(state),
            _ => None,
        }
    }
}

/// Taille de la WebView : fenêtre moins la barre d'outils.
fn webview_size(window_size: PhysicalSize<u32>, toolbar_height: u32) -> PhysicalSize<u32> {
    PhysicalSize::new(
        window_size.width,
        window_size.height.saturating_sub(toolbar_height),
    )
}

/// Titre, taille et position initiales de la fenêtre.
fn window_attributes(config: &Config) -> WindowAttributes {
    Window::default_attributes()
        .with_title(config.general.window_title.clone())
        .with_inner_size(LogicalSize::new(
            config.window.width as f64,
            config.window.height as f64,
        ))
        .with_position(LogicalPosition::new(
            config.window.x as f64,
            config.window.y as f64,
        ))
}

/// Crée la fenêtre, les contextes GL, Servo et le shell, puis navigue vers
/// la page d'accueil.
fn start(event_loop: &ActiveEventLoop, waker: Waker, config: Config) -> Result<Rc<AppState>> {
    // ── 1. Fenêtre ───────────────────────────────────────────────────────
    let window = event_loop.create_window(window_attributes(&config))?;

    // ── 2. Contextes de rendu ────────────────────────────────────────────
    let window_rendering_context = rendering::create_rendering_context(
        event_loop.display_handle()?,
        window.window_handle()?,
        window.inner_size(),
    )?;
    let wv_size = webview_size(window.inner_size(), config.toolbar.height);
    let offscreen_context = Rc::new(window_rendering_context.offscreen_context(wv_size));

    // ── 3. Barre d'outils, avec la palette sombre fixe ───────────────────
    let gl = window_rendering_context.glow_gl_api();
    let chrome = unsafe { ChromeRenderer::new(gl, &config.toolbar, Palette::dark())? };
    let layout = ToolbarLayout::compute(window.inner_size().width, &config.toolbar);

    // ── 4. Servo ─────────────────────────────────────────────────────────
    let servo = ServoBuilder::default()
        .preferences(build_servo_preferences(&config.engine))
        .event_loop_waker(Box::new(waker))
        .build();

    // ── 5. Shell ─────────────────────────────────────────────────────────
    let profile = Rc::new(NetworkProfile::new());
    let filter_lists = if config.adblock.filter_lists {
        FilterListEngine::load()
    } else {
        None
    };
    let shell = Shell::new(ServoView::new(profile.clone()), &config).with_filter_lists(filter_lists);

    let app_state = Rc::new(AppState {
        window,
        servo,
        window_rendering_context,
        offscreen_context: offscreen_context.clone(),
        config,
        profile,
        shell: RefCell::new(shell),
        layout: RefCell::new(layout),
        chrome,
        cursor_position: Cell::new(DevicePoint::zero()),
        modifiers: Cell::new(ModifiersState::default()),
    });

    // ── 6. WebView, puis page d'accueil ──────────────────────────────────
    let scale_factor = app_state.window.scale_factor() as f32;
    let webview = WebViewBuilder::new(
        &app_state.servo,
        offscreen_context as Rc<dyn RenderingContext>,
    )
    .hidpi_scale_factor(Scale::new(scale_factor))
    .delegate(app_state.clone())
    .build();

    {
        let shell = app_state.shell.borrow();
        shell.view().attach(webview);
        shell.home();
    }

    info!(home = %app_state.config.general.home_url, "Navigateur démarré");
    Ok(app_state)
}

// ─────────────────────────────────────────────────────────────────────────────
// ApplicationHandler : dispatch des événements Winit
// ─────────────────────────────────────────────────────────────────────────────

impl ApplicationHandler<WakerEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Self::Initial { waker, config } = self else {
            return;
        };
        let (waker, config) = (waker.clone(), config.clone());

        *self = match start(event_loop, waker, config) {
            Ok(state) => Self::Running(state),
            Err(e) => {
                error!(error = %e, "Échec du démarrage");
                event_loop.exit();
                Self::Failed
            }
        };
    }

    /// Un `WakerEvent` arrive depuis les threads Servo.
    fn user_event(&mut self, _event_loop: &ActiveEventLoop, _event: WakerEvent) {
        if let Some(state) = self.running() {
            state.servo.spin_event_loop();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        if let WindowEvent::CloseRequested = event {
            event_loop.exit();
            return;
        }

        let Some(state) = self.running() else {
            return;
        };
        // Toujours faire tourner la boucle Servo en premier.
        state.servo.spin_event_loop();
        let toolbar_h = state.toolbar_height();

        match event {
            WindowEvent::RedrawRequested => state.redraw(),

            WindowEvent::Resized(new_size) => {
                state.window_rendering_context.resize(new_size);
                state
                    .offscreen_context
                    .resize(webview_size(new_size, state.config.toolbar.height));
                *state.layout.borrow_mut() =
                    ToolbarLayout::compute(new_size.width, &state.config.toolbar);
                state.window.request_redraw();
            }

            WindowEvent::ModifiersChanged(new_modifiers) => {
                state.modifiers.set(new_modifiers.state());
            }

            WindowEvent::CursorMoved { position, .. } => {
                let point = DevicePoint::new(position.x as f32, position.y as f32);
                state.cursor_position.set(point);
                if point.y >= toolbar_h {
                    let adjusted = DevicePoint::new(point.x, point.y - toolbar_h);
                    state.forward_input(InputEvent::MouseMove(MouseMoveEvent::new(
                        adjusted.into(),
                    )));
                }
            }

            WindowEvent::CursorLeft { .. } => {
                state.forward_input(InputEvent::MouseLeftViewport(
                    MouseLeftViewportEvent::default(),
                ));
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let pos = state.cursor_position.get();
                if pos.y >= toolbar_h {
                    let (x, y, mode) = match delta {
                        MouseScrollDelta::LineDelta(dx, dy) => {
                            ((dx * 76.0) as f64, (dy * 76.0) as f64, WheelMode::DeltaLine)
                        }
                        MouseScrollDelta::PixelDelta(delta) => {
                            (delta.x, delta.y, WheelMode::DeltaPixel)
                        }
                    };
                    let adjusted = DevicePoint::new(pos.x, pos.y - toolbar_h);
                    state.forward_input(InputEvent::Wheel(WheelEvent::new(
                        WheelDelta { x, y, z: 0.0, mode },
                        adjusted.into(),
                    )));
                }
            }

            WindowEvent::MouseInput {
                state: btn_state,
                button,
                ..
            } => {
                let pos = state.cursor_position.get();
                let pressed = btn_state == ElementState::Pressed;

                if pos.y < toolbar_h {
                    if pressed && button == WinitMouseButton::Left {
                        let hit = state.layout.borrow().hit_test(pos.x, pos.y);
                        if let Some(control) = hit {
                            state.activate(control);
                        }
                    }
                    return;
                }

                // Clic dans la page : le champ perd le focus.
                if pressed && state.shell.borrow().field().is_focused() {
                    state.shell.borrow_mut().field_mut().unfocus();
                    state.window.request_redraw();
                }

                let servo_button = match button {
                    WinitMouseButton::Left => ServoMouseButton::Left,
                    WinitMouseButton::Right => ServoMouseButton::Right,
                    WinitMouseButton::Middle => ServoMouseButton::Middle,
                    WinitMouseButton::Back => ServoMouseButton::Back,
                    WinitMouseButton::Forward => ServoMouseButton::Forward,
                    WinitMouseButton::Other(id) => ServoMouseButton::Other(id),
                };
                let action = if pressed {
                    MouseButtonAction::Down
                } else {
                    MouseButtonAction::Up
                };
                let adjusted = DevicePoint::new(pos.x, pos.y - toolbar_h);
                state.forward_input(InputEvent::MouseButton(MouseButtonEvent::new(
                    action,
                    servo_button,
                    adjusted.into(),
                )));
            }

            WindowEvent::KeyboardInput { event, .. } => {
                let consumed = match event.state {
                    ElementState::Pressed => state.handle_key(&event),
                    ElementState::Released => state.shell.borrow().field().is_focused(),
                };
                if consumed {
                    return;
                }

                let keyboard_event =
                    crate::keyutils::keyboard_event_from_winit(&event, state.modifiers.get());
                state.forward_input(InputEvent::Keyboard(keyboard_event));
            }

            _ => (),
        }
    }
}

#[cfg(test)]
mod tests {
    use winit::dpi::{Position, Size};

    use super::*;

    #[test]
    fn test_webview_size_subtracts_toolbar() {
        let size = webview_size(PhysicalSize::new(800, 600), 40);
        assert_eq!(size, PhysicalSize::new(800, 560));
    }

    #[test]
    fn test_webview_size_saturates() {
        let size = webview_size(PhysicalSize::new(800, 20), 40);
        assert_eq!(size.height, 0);
    }

    #[test]
    fn test_window_opens_at_configured_geometry() {
        let attrs = window_attributes(&Config::default());
        assert_eq!(attrs.title, "My Web Browser");
        assert_eq!(
            attrs.position,
            Some(Position::Logical(LogicalPosition::new(100.0, 100.0)))
        );
        assert_eq!(
            attrs.inner_size,
            Some(Size::Logical(LogicalSize::new(800.0, 600.0)))
        );
    }
}
