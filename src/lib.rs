//! # webshell — navigateur minimal sur Servo
//!
//! Une fenêtre, une WebView, une barre d'outils : précédent, suivant,
//! recharger, accueil, champ de recherche, bouton de recherche, et deux
//! bascules (ad-block, thème sombre).
//!
//! ## Architecture des modules
//!
//! - [`shell`] : état et actions du navigateur, indépendants du moteur via le
//!   trait [`shell::EmbeddedView`].
//! - [`filter`] : filtre de requêtes (sous-chaînes `ads` / `advertisements`)
//!   et [`filter::NetworkProfile`] qui le porte.
//! - [`privacy`] : listes de filtres EasyList optionnelles via le crate `adblock`.
//! - [`searchbar`] : champ de saisie et résolution texte → adresse.
//! - [`theme`] : thèmes clair/sombre et palette sombre fixe.
//! - [`toolbar`] : contrôles et géométrie de la barre d'outils.
//! - [`chrome`] : rendu OpenGL de la barre d'outils (`glow` + `fontdue`).
//! - [`browser`] : boucle d'événements Winit, pattern "Two-Phase App".
//! - [`servo_glue`] : `Waker`, `ServoView` et `WebViewDelegate`.
//! - [`rendering`], [`preferences`], [`resources`], [`keyutils`] : plomberie Servo.
//! - [`config`], [`error`] : configuration TOML et type d'erreur.

pub mod browser;
pub mod chrome;
pub mod config;
pub mod error;
pub mod filter;
pub mod keyutils;
pub mod preferences;
pub mod privacy;
pub mod rendering;
pub mod resources;
pub mod searchbar;
pub mod servo_glue;
pub mod shell;
pub mod theme;
pub mod toolbar;
