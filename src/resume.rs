//! Resume import (PDF → text) and AI structuring of the raw text.

use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::error::{AutofillError, Result};
use crate::gemini_client::{strip_code_fences, TextModel};
use crate::profile::{Details, Profile, ProfileStore, StructuredResume};

/// Plain text of a resume file. PDFs go through `pdf-extract`; `.txt` and
/// `.md` files are read as-is.
pub async fn extract_text(path: &Path) -> Result<String> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("txt") | Some("md") => Ok(tokio::fs::read_to_string(path).await?),
        _ => {
            let bytes = tokio::fs::read(path).await?;
            pdf_extract::extract_text_from_mem(&bytes).map_err(|e| {
                AutofillError::PdfExtraction(format!(
                    "Failed to extract text from PDF '{}': {}",
                    path.display(),
                    e
                ))
            })
        }
    }
}

/// Read the resume at `resume_path` and write a fresh profile with the key,
/// the raw text and the personal details.
pub async fn import_resume(
    store: &ProfileStore,
    api_key: &str,
    resume_path: &Path,
    details: Details,
) -> Result<Profile> {
    let resume_path = absolutize(resume_path)?;
    if !tokio::fs::try_exists(&resume_path).await.unwrap_or(false) {
        return Err(AutofillError::InvalidInput(format!(
            "can't find your resume at {}",
            resume_path.display()
        )));
    }

    let text = extract_text(&resume_path).await?;
    info!("extracted {} chars from {}", text.len(), resume_path.display());

    let mut profile = Profile::new(api_key.trim(), text);
    profile.resume_path = Some(resume_path);
    profile.details = Some(details);
    store.save(&profile).await?;
    Ok(profile)
}

pub fn structuring_prompt(resume_raw: &str) -> String {
    format!(
        "Extract structured information from this resume text:\n\
         {resume_raw}\n\n\
         Format as JSON with fields: name, email, phone, skills, experience, education, projects.\n\
         Return only the JSON object.\n"
    )
}

/// Parse the model's reply after dropping any markdown fences.
pub fn parse_structured(reply: &str) -> Result<StructuredResume> {
    let cleaned = strip_code_fences(reply);
    serde_json::from_str(&cleaned).map_err(|e| {
        debug!("structured resume parse error: {e}");
        AutofillError::AiResponseInvalid { raw: cleaned }
    })
}

/// Ask `model` to structure the stored raw resume, merge the result into the
/// profile and save it. The file is untouched when the reply can't be parsed.
pub async fn derive_structured_resume<M>(model: &M, store: &ProfileStore) -> Result<StructuredResume>
where
    M: TextModel + ?Sized,
{
    let mut profile = store.load().await?;
    if profile.resume_raw.trim().is_empty() {
        return Err(AutofillError::ConfigurationMissing(
            "profile has no resume text. Run `job-autofill setup` first.".to_string(),
        ));
    }

    let reply = model
        .generate(&structuring_prompt(&profile.resume_raw))
        .await
        .map_err(|e| AutofillError::AiGenerationFailed(format!("{e:#}")))?;

    let structured = parse_structured(&reply)?;
    profile.merge_structured(structured.clone());
    store.save(&profile).await?;
    Ok(structured)
}

fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
