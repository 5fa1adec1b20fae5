use std::process::ExitCode;

use stg_engine::{run_app, AppError};
use tracing::{error, info};

use super::bootstrap::AppWiring;

pub(crate) fn run(app: AppWiring) -> ExitCode {
    let AppWiring {
        config,
        action_map,
        mut simulation,
    } = app;

    match run_app(config, action_map, &mut simulation) {
        Ok(summary) => {
            let model = simulation.model();
            info!(
                ticks = summary.totals.ticks,
                overruns = summary.totals.overruns,
                final_x = model.position.x,
                final_y = model.position.y,
                "exit"
            );
            ExitCode::SUCCESS
        }
        Err(err @ AppError::Render(_)) => {
            error!(error = %err, "run_failed");
            ExitCode::FAILURE
        }
        Err(err) => {
            error!(error = %err, "startup_failed");
            ExitCode::FAILURE
        }
    }
}
