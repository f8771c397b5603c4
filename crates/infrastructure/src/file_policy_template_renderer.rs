use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use datamesh_application::{PolicyTemplateRenderer, TemplateConfig};
use datamesh_core::{AppError, AppResult};
use tracing::debug;

/// Default directory holding policy templates.
pub const DEFAULT_POLICY_TEMPLATE_DIR: &str = "resources/policy_templates";

/// Renders mustache policy templates from a directory.
///
/// `{{name}}` is HTML-escaped and `{{{name}}}` is substituted raw.
#[derive(Debug, Clone)]
pub struct FilePolicyTemplateRenderer {
    root: PathBuf,
}

impl FilePolicyTemplateRenderer {
    /// Creates a renderer reading templates below `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn template_path(&self, template_file: &str) -> AppResult<PathBuf> {
        let relative = Path::new(template_file);
        let confined = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if template_file.is_empty() || !confined {
            return Err(AppError::Validation(format!(
                "policy template '{template_file}' must be a relative path inside the template directory"
            )));
        }

        Ok(self.root.join(relative))
    }
}

impl Default for FilePolicyTemplateRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_POLICY_TEMPLATE_DIR)
    }
}

impl PolicyTemplateRenderer for FilePolicyTemplateRenderer {
    fn render(&self, template_file: &str, config: &TemplateConfig) -> AppResult<String> {
        let path = self.template_path(template_file)?;
        let source = std::fs::read_to_string(&path).map_err(|error| match error.kind() {
            ErrorKind::NotFound => AppError::NotFound(format!(
                "policy template '{}' does not exist",
                path.display()
            )),
            _ => AppError::upstream("read policy template", error),
        })?;

        let template = mustache::compile_str(source.as_str()).map_err(|error| {
            AppError::Validation(format!("policy template '{template_file}' is invalid: {error}"))
        })?;
        let rendered = template.render_to_string(config).map_err(|error| {
            AppError::Internal(format!(
                "failed to render policy template '{template_file}': {error}"
            ))
        })?;

        debug!(template = %template_file, "rendered policy template");
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use datamesh_application::{PolicyTemplateRenderer, TemplateConfig};
    use datamesh_core::AppError;

    use super::FilePolicyTemplateRenderer;

    fn template_dir(name: &str, body: &str) -> tempfile::TempDir {
        let dir = match tempfile::tempdir() {
            Ok(dir) => dir,
            Err(error) => panic!("temp dir unavailable: {error}"),
        };
        if let Err(error) = std::fs::write(dir.path().join(name), body) {
            panic!("failed to write template: {error}");
        }
        dir
    }

    fn config(pairs: &[(&str, &str)]) -> TemplateConfig {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect()
    }

    #[test]
    fn renders_values_into_template() {
        let dir = template_dir(
            "consumer_policy.pystache",
            r#"{"Resource":"arn:aws:iam::{{data_mesh_account_id}}:role/AwsDataMesh/DataMeshAdminConsumer"}"#,
        );
        let renderer = FilePolicyTemplateRenderer::new(dir.path());

        let rendered = renderer.render(
            "consumer_policy.pystache",
            &config(&[("data_mesh_account_id", "999999999999")]),
        );

        assert!(matches!(
            rendered.as_deref(),
            Ok(r#"{"Resource":"arn:aws:iam::999999999999:role/AwsDataMesh/DataMeshAdminConsumer"}"#)
        ));
    }

    #[test]
    fn double_braces_escape_and_triple_braces_do_not() {
        let dir = template_dir("escape.pystache", "{{value}}|{{{value}}}");
        let renderer = FilePolicyTemplateRenderer::new(dir.path());

        let rendered = renderer.render("escape.pystache", &config(&[("value", "a&b")]));

        assert!(matches!(rendered.as_deref(), Ok("a&amp;b|a&b")));
    }

    #[test]
    fn missing_template_is_not_found() {
        let dir = template_dir("present.pystache", "{}");
        let renderer = FilePolicyTemplateRenderer::new(dir.path());

        let rendered = renderer.render("absent.pystache", &TemplateConfig::new());

        assert!(matches!(rendered, Err(AppError::NotFound(_))));
    }

    #[test]
    fn rejects_paths_leaving_the_template_directory() {
        let dir = template_dir("present.pystache", "{}");
        let renderer = FilePolicyTemplateRenderer::new(dir.path());

        let rendered = renderer.render("../present.pystache", &TemplateConfig::new());

        assert!(matches!(rendered, Err(AppError::Validation(_))));
    }

    #[test]
    fn ships_consumer_policy_template() {
        let renderer = FilePolicyTemplateRenderer::new(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../../resources/policy_templates"
        ));

        let rendered = renderer.render(
            "consumer_policy.pystache",
            &config(&[
                ("data_mesh_account_id", "999999999999"),
                ("consumer_account_id", "111111111111"),
            ]),
        );

        let Ok(rendered) = rendered else {
            panic!("bundled template should render");
        };
        assert!(rendered.contains("arn:aws:iam::999999999999:role/AwsDataMesh/DataMeshAdminConsumer"));
        assert!(!rendered.contains("{{"));
    }
}
