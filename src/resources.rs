//! Lecteur de ressources Servo.
//!
//! Servo a besoin de fichiers de ressources (préférences, certificats,
//! domaines publics, etc.). L'embedder fournit une implémentation de
//! `ResourceReaderMethods` enregistrée via `servo::resources::set()`.
//!
//! Le dossier `resources/` est cherché dans cet ordre :
//! 1. Variable d'environnement `SERVO_RESOURCES_PATH`
//! 2. À côté de l'exécutable, ou à la racine du projet pendant `cargo run`
//! 3. Dans le répertoire courant

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::{env, fs};

use servo::resources::{self, Resource};
use tracing::{error, info};

static RESOURCES_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Initialise le lecteur de ressources Servo.
///
/// Doit être appelé avant `ServoBuilder::build()`.
pub fn init() {
    match find_resources_dir() {
        Some(dir) => info!(dir = %dir.display(), "Ressources Servo trouvées"),
        None => error!(
            "Dossier 'resources/' introuvable. Définissez SERVO_RESOURCES_PATH \
             ou placez le dossier à côté de l'exécutable."
        ),
    }
    resources::set(Box::new(ResourceReader));
}

/// Chemin du dossier `resources/`, résolu une seule fois.
pub fn find_resources_dir() -> Option<PathBuf> {
    RESOURCES_DIR.get_or_init(locate_resources_dir).clone()
}

struct ResourceReader;

impl resources::ResourceReaderMethods for ResourceReader {
    fn read(&self, file: Resource) -> Vec<u8> {
        // Servo ne peut pas démarrer sans ses ressources : l'échec est fatal.
        let Some(dir) = find_resources_dir() else {
            panic!("Ressource {:?} demandée sans dossier resources/", file.filename());
        };
        let path = contained_path(&dir, file.filename())
            .unwrap_or_else(|| panic!("Chemin de ressource refusé : {}", file.filename()));
        fs::read(&path)
            .unwrap_or_else(|e| panic!("Impossible de lire {} : {e}", path.display()))
    }

    fn sandbox_access_files_dirs(&self) -> Vec<PathBuf> {
        find_resources_dir().into_iter().collect()
    }

    fn sandbox_access_files(&self) -> Vec<PathBuf> {
        vec![]
    }
}

/// Résout `name` sous `base` et refuse tout chemin qui en sort (`../`, liens).
fn contained_path(base: &Path, name: &str) -> Option<PathBuf> {
    let base = base.canonicalize().ok()?;
    let candidate = base.join(name).canonicalize().ok()?;
    candidate.starts_with(&base).then_some(candidate)
}

fn locate_resources_dir() -> Option<PathBuf> {
    if let Ok(path) = env::var("SERVO_RESOURCES_PATH") {
        let path = PathBuf::from(path);
        if path.is_dir() {
            return Some(path);
        }
    }

    if let Ok(exe_path) = env::current_exe()
        && let Ok(canonical) = exe_path.canonicalize()
        && let Some(exe_dir) = canonical.parent()
    {
        let path = exe_dir.join("resources");
        if path.is_dir() {
            return Some(path);
        }

        // target/{debug,release}/ → racine du projet
        if let Some(target_dir) = exe_dir.parent()
            && target_dir.file_name().is_some_and(|n| n == "target")
            && let Some(project_root) = target_dir.parent()
        {
            let path = project_root.join("resources");
            if path.is_dir() {
                return Some(path);
            }
        }
    }

    let path = env::current_dir().ok()?.join("resources");
    path.is_dir().then_some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("webshell-resources-{name}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_contained_path_accepts_file_inside_base() {
        let dir = scratch_dir("inside");
        fs::write(dir.join("prefs.json"), b"{}").unwrap();

        let resolved = contained_path(&dir, "prefs.json").unwrap();
        assert!(resolved.ends_with("prefs.json"));
        assert!(resolved.is_absolute());
    }

    #[test]
    fn test_contained_path_rejects_traversal() {
        let parent = scratch_dir("traversal");
        let base = parent.join("resources");
        fs::create_dir_all(&base).unwrap();
        fs::write(parent.join("secret.txt"), b"nope").unwrap();

        assert!(contained_path(&base, "../secret.txt").is_none());
    }

    #[test]
    fn test_contained_path_missing_file() {
        let dir = scratch_dir("missing");
        assert!(contained_path(&dir, "does-not-exist.json").is_none());
    }
}
