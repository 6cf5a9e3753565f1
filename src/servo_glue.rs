//! Couche d'intégration entre Servo et le shell.
//!
//! 1. **[`Waker`] / [`WakerEvent`]** : le pont `Send + Sync` entre les threads
//!    internes de Servo et le thread principal Winit.
//!
//! 2. **[`ServoView`]** : implémentation de [`EmbeddedView`] pour une `WebView`
//!    Servo. C'est la seule porte d'entrée du shell vers le moteur.
//!
//! 3. **[`WebViewDelegate`] pour [`AppState`]** : callbacks Servo (nouveau frame,
//!    changement d'URL, interception des requêtes pour l'ad-block).

use std::cell::OnceCell;
use std::rc::Rc;

use servo::{WebResourceLoad, WebResourceResponse, WebView, WebViewDelegate};
use tracing::{debug, warn};
use url::Url;
use winit::event_loop::{EventLoop, EventLoopProxy};

use crate::browser::AppState;
use crate::filter::{NetworkProfile, RequestFilter};
use crate::shell::EmbeddedView;

// ─────────────────────────────────────────────────────────────────────────────
// Waker : pont Servo → Winit
// ─────────────────────────────────────────────────────────────────────────────

/// Événement marqueur envoyé à travers l'`EventLoopProxy` de Winit.
///
/// La boucle Winit le reçoit dans `user_event()` et appelle
/// `servo.spin_event_loop()` en réponse.
#[derive(Debug)]
pub struct WakerEvent;

/// Pont thread-safe entre les threads Servo et la boucle Winit.
#[derive(Clone)]
pub struct Waker(EventLoopProxy<WakerEvent>);

impl Waker {
    pub fn new(event_loop: &EventLoop<WakerEvent>) -> Self {
        Self(event_loop.create_proxy())
    }
}

impl embedder_traits::EventLoopWaker for Waker {
    fn clone_box(&self) -> Box<dyn embedder_traits::EventLoopWaker> {
        Box::new(Self(self.0.clone()))
    }

    fn wake(&self) {
        if let Err(error) = self.0.send_event(WakerEvent) {
            warn!(?error, "Échec du réveil de la boucle d'événements Winit");
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ServoView : le moteur vu par le shell
// ─────────────────────────────────────────────────────────────────────────────

/// `WebView` Servo + profil réseau portant le filtre actif.
///
/// La `WebView` est attachée après sa construction, car son delegate
/// (`AppState`) doit exister avant elle.
pub struct ServoView {
    webview: OnceCell<WebView>,
    profile: Rc<NetworkProfile>,
}

impl ServoView {
    pub fn new(profile: Rc<NetworkProfile>) -> Self {
        Self {
            webview: OnceCell::new(),
            profile,
        }
    }

    pub fn attach(&self, webview: WebView) {
        if self.webview.set(webview).is_err() {
            warn!("WebView déjà attachée, la nouvelle est ignorée");
        }
    }

    pub fn webview(&self) -> Option<&WebView> {
        self.webview.get()
    }
}

impl EmbeddedView for ServoView {
    fn navigate(&self, address: &str) {
        // Servo veut une URL parsée ; une adresse invalide est abandonnée
        // comme le ferait la page d'erreur du moteur.
        let url = match Url::parse(address) {
            Ok(url) => url,
            Err(e) => {
                warn!(address, error = %e, "Adresse invalide, navigation ignorée");
                return;
            }
        };
        match self.webview.get() {
            Some(webview) => {
                debug!(%url, "Navigation");
                webview.load(url);
            }
            None => warn!(%url, "Navigation avant l'attachement de la WebView"),
        }
    }

    fn go_back(&self) {
        if let Some(webview) = self.webview.get() {
            webview.go_back(1);
        }
    }

    fn go_forward(&self) {
        if let Some(webview) = self.webview.get() {
            webview.go_forward(1);
        }
    }

    fn reload(&self) {
        if let Some(webview) = self.webview.get() {
            webview.reload();
        }
    }

    fn set_request_filter(&self, filter: Option<Rc<dyn RequestFilter>>) {
        self.profile.set_request_filter(filter);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Titre de fenêtre
// ─────────────────────────────────────────────────────────────────────────────

/// Texte d'une URL pour le titre de fenêtre.
///
/// Les domaines punycode (`xn--`) sont signalés et les caractères invisibles
/// (zero-width, BOM, séparateurs) retirés.
fn display_url(url: &Url) -> String {
    if url.host_str().is_some_and(|h| h.starts_with("xn--")) {
        return format!("{url} (Punycode)");
    }
    url.as_str()
        .chars()
        .filter(|c| {
            !matches!(
                *c,
                '\u{200B}'..='\u{200D}' | '\u{2060}' | '\u{FEFF}' | '\u{034F}' | '\u{2028}' | '\u{2029}'
            )
        })
        .collect()
}

fn window_title(prefix: &str, subject: &str) -> String {
    format!("{prefix} — {subject}")
}

// ─────────────────────────────────────────────────────────────────────────────
// WebViewDelegate : callbacks Servo → embedder
// ─────────────────────────────────────────────────────────────────────────────

/// Les callbacks sont protégés par `catch_unwind` : une panique (RefCell déjà
/// empruntée, etc.) ne doit jamais remonter dans Servo.
impl WebViewDelegate for AppState {
    fn notify_new_frame_ready(&self, _webview: WebView) {
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            self.window.request_redraw();
        }));
    }

    fn notify_url_changed(&self, _webview: WebView, url: Url) {
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            self.window
                .set_title(&window_title(&self.config.general.window_title, &display_url(&url)));
            self.profile.page_changed(url.as_str());
        }));
    }

    fn notify_page_title_changed(&self, _webview: WebView, title: Option<String>) {
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            if let Some(title) = title {
                self.window
                    .set_title(&window_title(&self.config.general.window_title, &title));
            }
        }));
    }

    /// Consulte le filtre enregistré pour chaque requête émise par Servo.
    ///
    /// Sans filtre (ad-block désactivé), la requête passe. En cas de panique,
    /// la requête passe aussi.
    fn load_web_resource(&self, _webview: WebView, load: WebResourceLoad) {
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let request = load.request();
            let address = request.url.as_str();

            if self
                .profile
                .decide_request(address, request.is_for_main_frame)
                .is_block()
            {
                debug!(address, "Requête bloquée par l'ad-block");
                let response = WebResourceResponse::new(request.url.clone());
                load.intercept(response).cancel();
            }
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_url_plain() {
        let url = Url::parse("https://example.com/path?q=1").unwrap();
        assert_eq!(display_url(&url), "https://example.com/path?q=1");
    }

    #[test]
    fn test_display_url_flags_punycode() {
        let url = Url::parse("https://xn--ggle-0nd.com/").unwrap();
        let shown = display_url(&url);
        assert!(shown.contains("xn--ggle-0nd.com"), "{shown}");
        assert!(shown.ends_with("(Punycode)"), "{shown}");
    }

    #[test]
    fn test_window_title_format() {
        assert_eq!(
            window_title("My Web Browser", "Google"),
            "My Web Browser — Google"
        );
    }

    #[test]
    fn test_servo_view_filter_goes_to_profile() {
        let profile = Rc::new(NetworkProfile::new());
        let view = ServoView::new(profile.clone());
        view.set_request_filter(Some(Rc::new(crate::filter::AdFilter::new())));
        assert!(profile.has_filter());
        view.set_request_filter(None);
        assert!(!profile.has_filter());
    }

    #[test]
    fn test_servo_view_navigation_without_webview_is_noop() {
        let view = ServoView::new(Rc::new(NetworkProfile::new()));
        view.navigate("https://www.google.com");
        view.navigate("http://what is 1.5");
        view.go_back();
        view.go_forward();
        view.reload();
        assert!(view.webview().is_none());
    }
}
