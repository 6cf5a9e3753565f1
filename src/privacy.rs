//! Moteur de listes de filtres (format Adblock Plus), en complément du
//! filtre par sous-chaîne de [`crate::filter::AdFilter`].
//!
//! Encapsule le moteur `adblock` de Brave. Désactivé par défaut ; activé par
//! `[adblock] filter_lists = true` dans la configuration.
//!
//! ## Utilisation
//!
//! 1. Placer les fichiers de filtres (`.txt`) dans `resources/filters/`
//! 2. `FilterListEngine::load()` les charge au démarrage
//! 3. Si le dossier est vide ou absent, seul le filtre par sous-chaîne s'applique
//!
//! ## Listes de filtres recommandées
//!
//! - EasyList : <https://easylist.to/easylist/easylist.txt>
//! - EasyPrivacy : <https://easylist.to/easylist/easyprivacy.txt>

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use adblock::Engine;
use adblock::lists::{FilterSet, ParseOptions};
use tracing::{debug, info, warn};

use crate::filter::{FilterDecision, RequestContext, RequestFilter};

/// Wrapper autour du moteur `adblock::Engine`.
pub struct FilterListEngine {
    engine: Engine,
    /// Cache (adresse, page source) → décision. Vidé à chaque navigation
    /// via `reset()`.
    cache: RefCell<HashMap<(String, String), FilterDecision>>,
}

impl FilterListEngine {
    /// Charge les listes depuis `resources/filters/`.
    ///
    /// Retourne `None` si aucune liste n'est trouvée.
    pub fn load() -> Option<Self> {
        let dir = find_filters_dir()?;
        Self::load_from(&dir)
    }

    /// Charge toutes les listes `*.txt` d'un dossier.
    pub fn load_from(dir: &Path) -> Option<Self> {
        let entries: Vec<PathBuf> = fs::read_dir(dir)
            .ok()?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "txt"))
            .collect();

        if entries.is_empty() {
            warn!(
                dir = %dir.display(),
                "Dossier filters/ trouvé mais vide, listes de filtres désactivées"
            );
            return None;
        }

        let mut lists = Vec::with_capacity(entries.len());
        for path in &entries {
            match fs::read_to_string(path) {
                Ok(content) => {
                    info!(
                        path = %path.display(),
                        lines = content.lines().count(),
                        "Liste de filtres chargée"
                    );
                    lists.push(content);
                }
                Err(e) => warn!(path = %path.display(), error = %e, "Liste illisible"),
            }
        }

        if lists.is_empty() {
            return None;
        }
        Some(Self::from_lists(&lists))
    }

    /// Construit le moteur à partir de listes déjà en mémoire.
    pub fn from_lists<S: AsRef<str>>(lists: &[S]) -> Self {
        let mut filter_set = FilterSet::new(false);
        for list in lists {
            filter_set.add_filter_list(list.as_ref(), ParseOptions::default());
        }
        let engine = Engine::from_filter_set(filter_set, true);
        info!(lists = lists.len(), "Moteur adblock initialisé");

        Self {
            engine,
            cache: RefCell::new(HashMap::new()),
        }
    }

    fn check(&self, address: &str, context: &RequestContext<'_>) -> FilterDecision {
        let request_type = if context.main_frame { "document" } else { "other" };
        // Adresses non parsables par adblock (data:, blob:) : autorisées.
        let Ok(request) = adblock::request::Request::new(address, context.source, request_type)
            .or_else(|_| adblock::request::Request::new(address, "", "other"))
        else {
            return FilterDecision::Allow;
        };
        if self.engine.check_network_request(&request).matched {
            FilterDecision::Block
        } else {
            FilterDecision::Allow
        }
    }
}

impl RequestFilter for FilterListEngine {
    fn decide(&self, address: &str) -> FilterDecision {
        self.decide_in(address, &RequestContext::default())
    }

    fn decide_in(&self, address: &str, context: &RequestContext<'_>) -> FilterDecision {
        let key = (address.to_owned(), context.source.to_owned());
        if let Some(&cached) = self.cache.borrow().get(&key) {
            return cached;
        }
        let decision = self.check(address, context);
        if decision.is_block() {
            debug!(address, source = context.source, "Requête bloquée par liste de filtres");
        }
        self.cache.borrow_mut().insert(key, decision);
        decision
    }

    fn reset(&self) {
        self.cache.borrow_mut().clear();
    }
}

/// Cherche le dossier `resources/filters/` selon la même logique que `resources.rs`.
fn find_filters_dir() -> Option<PathBuf> {
    let dir = crate::resources::find_resources_dir()?.join("filters");
    if dir.is_dir() {
        return Some(dir);
    }
    warn!("Dossier resources/filters/ introuvable, listes de filtres désactivées");
    None
}
