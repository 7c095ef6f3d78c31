use std::path::{Path, PathBuf};

use async_trait::async_trait;
use garden_form::{AnswerMap, AnswerSet, Meta, SubmitError, SubmitHandler};
use tracing::info;

/// Writes the submitted answers as an `AnswerSet` JSON file.
pub struct FileSubmitHandler {
    path: PathBuf,
    form_id: String,
    spec_version: String,
    applicant: Option<String>,
}

impl FileSubmitHandler {
    pub fn new(
        out_dir: &Path,
        form_id: &str,
        spec_version: &str,
        applicant: Option<String>,
    ) -> Self {
        Self {
            path: out_dir.join(format!("{}.answers.json", form_id)),
            form_id: form_id.to_string(),
            spec_version: spec_version.to_string(),
            applicant,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SubmitHandler for FileSubmitHandler {
    async fn submit(&self, answers: &AnswerMap) -> Result<(), SubmitError> {
        let answer_set = AnswerSet {
            form_id: self.form_id.clone(),
            spec_version: self.spec_version.clone(),
            answers: answers.clone(),
            meta: Some(Meta {
                applicant: self.applicant.clone(),
                submitted_at: Some(chrono::Utc::now().to_rfc3339()),
            }),
        };
        let body = answer_set.to_json_pretty()?;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, body).await?;
        info!(path = %self.path.display(), "answers written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use garden_form::AnswerValue;
    use tempfile::TempDir;

    #[tokio::test]
    async fn writes_answer_set_file() {
        let dir = TempDir::new().expect("temp dir");
        let handler = FileSubmitHandler::new(dir.path(), "garden", "1.0", Some("ada".into()));
        let answers = AnswerMap::from_iter([(1, AnswerValue::Text("Ada".into()))]);
        handler.submit(&answers).await.expect("submit");

        let written = std::fs::read_to_string(handler.path()).expect("read");
        let set: AnswerSet = serde_json::from_str(&written).expect("answer set");
        assert_eq!(set.form_id, "garden");
        assert_eq!(set.answers, answers);
        assert_eq!(set.meta.and_then(|meta| meta.applicant).as_deref(), Some("ada"));
    }
}
