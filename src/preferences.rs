//! Servo engine preferences derived from the `[engine]` config section.

use tracing::info;

use crate::config::EngineConfig;

/// Builds Servo `Preferences` sized for the current machine.
#[allow(clippy::field_reassign_with_default)]
pub fn build_servo_preferences(config: &EngineConfig) -> servo::Preferences {
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get() as i64)
        .unwrap_or(4);

    let mut prefs = servo::Preferences::default();

    prefs.layout_threads = layout_threads(config.layout_threads, cpus);
    prefs.threadpools_async_runtime_workers_max = (cpus * 2).min(16);
    prefs.threadpools_image_cache_workers_max = cpus.min(8);
    prefs.threadpools_webrender_workers_max = (cpus / 2).clamp(2, 8);
    prefs.threadpools_resource_workers_max = cpus.min(8);
    prefs.network_http_cache_size = config.cache_size;

    if !config.user_agent.is_empty() {
        prefs.user_agent = config.user_agent.clone();
    }

    info!(
        cpus,
        layout_threads = prefs.layout_threads,
        cache_size = prefs.network_http_cache_size,
        "Servo preferences configured"
    );

    prefs
}

/// 0 = auto (CPU count, at most 8). Explicit values are kept, minimum 1.
fn layout_threads(configured: i64, cpus: i64) -> i64 {
    if configured <= 0 {
        cpus.clamp(1, 8)
    } else {
        configured
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_threads_auto_bounded() {
        assert_eq!(layout_threads(0, 32), 8);
        assert_eq!(layout_threads(0, 2), 2);
        assert_eq!(layout_threads(-3, 0), 1);
    }

    #[test]
    fn test_layout_threads_explicit() {
        assert_eq!(layout_threads(12, 4), 12);
    }

    #[test]
    fn test_preferences_cache_size_from_config() {
        let config = EngineConfig {
            cache_size: 1234,
            ..EngineConfig::default()
        };
        let prefs = build_servo_preferences(&config);
        assert_eq!(prefs.network_http_cache_size, 1234);
    }

    #[test]
    fn test_preferences_user_agent_override() {
        let config = EngineConfig {
            user_agent: "webshell-test".to_string(),
            ..EngineConfig::default()
        };
        assert_eq!(build_servo_preferences(&config).user_agent, "webshell-test");
    }

    #[test]
    fn test_preferences_webrender_workers_bounded() {
        let prefs = build_servo_preferences(&EngineConfig::default());
        assert!(prefs.threadpools_webrender_workers_max >= 2);
        assert!(prefs.threadpools_webrender_workers_max <= 8);
    }
}
