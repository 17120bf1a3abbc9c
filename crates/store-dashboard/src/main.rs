mod bootstrap;
mod report;

use anyhow::{Context, Result};
use dashboard_core::settings::Settings;
use dashboard_data::analysis::{run_pipeline, PipelineOptions};
use dashboard_ui::app::App;

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();
    settings.validate()?;

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("store-dashboard v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Product: {}, View: {}, Theme: {}",
        settings.product_id,
        settings.view,
        settings.theme
    );

    let data_dir = bootstrap::resolve_data_dir(settings.data_dir.as_deref())?;
    let options = PipelineOptions {
        product_id: settings.product_id.clone(),
    };

    let dataset = run_pipeline(&data_dir, &options)
        .with_context(|| format!("loading reports from {}", data_dir.display()))?;

    match settings.view.as_str() {
        "dashboard" => {
            let app = App::new(dataset, &settings.theme, settings.currency.clone());
            app.run(|| run_pipeline(&data_dir, &options))?;
        }
        "summary" => {
            print!("{}", report::render_summary(&dataset, &settings.currency));
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&dataset)?);
        }
        unknown => {
            anyhow::bail!("Unknown view mode: {}", unknown);
        }
    }

    Ok(())
}
