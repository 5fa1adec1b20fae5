use stg_engine::{ActionMap, ActionMapError, ConfigAnomaly, LoopConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::gameplay::{self, MovementSimulation};

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) action_map: ActionMap,
    pub(crate) simulation: MovementSimulation,
}

pub(crate) fn build_app<I, S>(args: I) -> Result<AppWiring, ActionMapError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    init_tracing();
    info!("=== STG Startup ===");

    let (mut config, mut anomalies) = LoopConfig::resolve(args);
    let action_map = bind_controls(&mut config, &mut anomalies)?;
    for anomaly in &anomalies {
        warn!(anomaly = %anomaly, "config_anomaly");
    }
    info!(
        target_fps = config.target_fps,
        slow_frame_ms = config.simulated_slow_frame_ms,
        anomalies = anomalies.len(),
        "config_resolved"
    );

    Ok(AppWiring {
        config,
        action_map,
        simulation: MovementSimulation::new(),
    })
}

/// Builds the default bindings and moves the toggle and quit keys off them.
fn bind_controls(
    config: &mut LoopConfig,
    anomalies: &mut Vec<ConfigAnomaly>,
) -> Result<ActionMap, ActionMapError> {
    let action_map = default_action_map()?;
    anomalies.extend(config.reconcile_with_bindings(&action_map));
    Ok(action_map)
}

pub(crate) fn default_action_map() -> Result<ActionMap, ActionMapError> {
    ActionMap::from_sources(&gameplay::DEFAULT_BINDINGS)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use stg_engine::{ActionSlot, FrameScheduler, ScanCode, SystemClock};

    use super::*;

    #[test]
    fn default_map_binds_arrows_in_slot_order() {
        let map = default_action_map().expect("default map");
        let sources = map
            .bindings()
            .iter()
            .map(|binding| binding.source)
            .collect::<Vec<_>>();

        assert_eq!(
            sources,
            vec![
                Some(ScanCode::LEFT),
                Some(ScanCode::RIGHT),
                Some(ScanCode::DOWN),
                Some(ScanCode::UP),
            ]
        );
        assert_eq!(map.slot_for_source(ScanCode::UP), Some(ActionSlot(3)));
    }

    #[test]
    fn default_map_leaves_control_keys_free() {
        let map = default_action_map().expect("default map");
        let config = LoopConfig::default();

        assert_eq!(map.slot_for_source(config.remap_toggle_key), None);
        if let Some(quit_key) = config.quit_key {
            assert_eq!(map.slot_for_source(quit_key), None);
        }
    }

    #[test]
    fn configured_toggle_on_a_movement_key_is_moved_before_scheduling() {
        let mut config = LoopConfig::default();
        let mut anomalies = config.apply_config_json("inline", r#"{ "remap_toggle_key": 80 }"#);

        let map = bind_controls(&mut config, &mut anomalies).expect("default map");

        assert_eq!(anomalies.len(), 1);
        assert_eq!(config.remap_toggle_key, ScanCode::Q);
        assert!(FrameScheduler::new(&config, map, SystemClock::new()).is_ok());
    }
}
