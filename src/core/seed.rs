//! Default template seeding.
//!
//! On first start the catalog is empty; seed it with the stock workload
//! templates so the launchable set is never blank. Seeding is skipped
//! whenever any template already exists, so it is safe to run on every
//! startup.

use anyhow::Result;
use tracing::info;

use crate::domain::Template;
use crate::store::TemplateStore;

/// Seed the stock templates into an empty catalog.
///
/// Returns the number of templates written (zero when the catalog was
/// already populated).
pub async fn seed_default_templates(store: &dyn TemplateStore) -> Result<usize> {
    if store.count().await? > 0 {
        return Ok(0);
    }

    info!("Initializing template catalog");

    let defaults = [
        template(
            "VS Code",
            "code-server:latest",
            8080,
            "vscode",
            "Web-based VS Code development environment",
        ),
        template(
            "Jupyter Notebook",
            "jupyter:latest",
            8888,
            "jupyter",
            "Data analysis and Python notebooks",
        ),
        template(
            "Streamlit",
            "streamlit-base:latest",
            8501,
            "streamlit",
            "Python web-app dashboards (data visualization)",
        ),
    ];

    let count = defaults.len();
    for t in defaults {
        store.save(t).await?;
    }

    info!(count, "Template catalog initialized");
    Ok(count)
}

fn template(name: &str, image: &str, port: u16, icon: &str, description: &str) -> Template {
    let mut t = Template::new(name, image, port);
    t.icon = icon.to_string();
    t.description = description.to_string();
    t
}
