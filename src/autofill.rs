//! AI-driven form filling: inventory the page, ask the model for one value per
//! control, then apply each value by control type.

use anyhow::Context;
use log::{debug, info, warn};
use serde_json::Value;

use crate::error::{AutofillError, Result};
use crate::gemini_client::TextModel;
use crate::mapping::{js_string, js_truthy, ValueMapping};
use crate::page::{ControlTag, FormControlDescriptor, FormPage};
use crate::profile::{Details, Profile, StructuredResume};

/// Read descriptors for every control currently on the page.
pub async fn collect_descriptors<P>(page: &P) -> Result<Vec<FormControlDescriptor>>
where
    P: FormPage + ?Sized,
{
    let controls = page.list_controls().await.map_err(browser_error)?;
    let mut descriptors = Vec::with_capacity(controls.len());
    for (i, control) in controls.iter().enumerate() {
        let d = page
            .describe_control(control, i)
            .await
            .with_context(|| format!("reading metadata of control #{i}"))
            .map_err(browser_error)?;
        descriptors.push(d);
    }
    Ok(descriptors)
}

pub fn build_prompt(
    resume: Option<&StructuredResume>,
    details: Option<&Details>,
    descriptors: &[FormControlDescriptor],
) -> Result<String> {
    let resume_json = serde_json::to_string_pretty(&resume)?;
    let details_json = match details {
        Some(d) => serde_json::to_string_pretty(d)?,
        None => "{}".to_string(),
    };
    let elements_json = serde_json::to_string_pretty(descriptors)?;

    Ok(format!(
        "You are a helpful assistant that fills web forms for job applications.\n\
         Use the provided resume and personal details to choose the best answers for each form control.\n\
         Resume (JSON): {resume_json}\n\n\
         Personal details (JSON): {details_json}\n\n\
         The form contains {count} elements. Here are their metadata objects (index matches DOM order):\n\
         {elements_json}\n\n\
         Return ONLY valid JSON with the shape:\n\
         {{ \"values\": [ v0, v1, v2, ... ] }}\n\
         where values[i] is the string/value to set for element at index i. \
         The array must contain exactly {count} entries.\n\
         - For text inputs/textarea return the text to fill.\n\
         - For select return the option value to select.\n\
         - For checkboxes/radio return true/false.\n\
         Be concise and pick the best reasonable mapping from the resume and personal details.\n",
        count = descriptors.len(),
    ))
}

/// Fill every form control on `page` using values inferred by `model`.
///
/// Zero controls is not an error. A failure on one control is logged and the
/// remaining controls are still attempted.
pub async fn fill_form<P, M>(page: &P, model: &M, profile: &Profile) -> Result<()>
where
    P: FormPage + ?Sized,
    M: TextModel + ?Sized,
{
    let descriptors = collect_descriptors(page).await?;
    if descriptors.is_empty() {
        println!("No form controls (input/textarea/select) found on the page.");
        return Ok(());
    }
    info!("found {} form controls", descriptors.len());

    let prompt = build_prompt(
        profile.resume_structured.as_ref(),
        profile.details.as_ref(),
        &descriptors,
    )?;
    debug!("autofill prompt is {} chars", prompt.len());

    let reply = model
        .generate(&prompt)
        .await
        .map_err(|e| AutofillError::AiGenerationFailed(format!("{e:#}")))?;

    let mapping = ValueMapping::parse(&reply)?;
    if mapping.len() != descriptors.len() {
        warn!(
            "model returned {} values for {} controls; missing entries are skipped",
            mapping.len(),
            descriptors.len()
        );
    }

    // Fresh handles; assumed index-aligned with the descriptors since nothing
    // navigated in between.
    let handles = page.list_controls().await.map_err(browser_error)?;

    let mut filled = 0usize;
    for (i, handle) in handles.iter().enumerate() {
        let Some(value) = mapping.get(i) else {
            continue;
        };

        let Some(descriptor) = descriptors.get(i) else {
            report_failure(i, "unknown", "control appeared after the page was inventoried");
            continue;
        };

        match apply_value(page, handle, descriptor, value).await {
            Ok(()) => {
                filled += 1;
                println!("✏️  Filled element #{i} ({})", descriptor.short_label());
            }
            Err(e) => report_failure(i, descriptor.tag.as_str(), &format!("{e:#}")),
        }
    }

    info!("filled {filled} of {} controls", handles.len());
    Ok(())
}

/// Dispatch one value by control type.
async fn apply_value<P>(
    page: &P,
    control: &P::Control,
    descriptor: &FormControlDescriptor,
    value: &Value,
) -> anyhow::Result<()>
where
    P: FormPage + ?Sized,
{
    match descriptor.tag {
        ControlTag::Select => page.select_option(control, &js_string(value)).await,
        ControlTag::Input if descriptor.is_toggle() => {
            page.set_checked(control, js_truthy(value)).await
        }
        ControlTag::Input | ControlTag::Textarea => {
            page.set_value(control, &js_string(value)).await
        }
        ControlTag::Other => page.assign_value(control, &js_string(value)).await,
    }
}

fn report_failure(index: usize, tag: &str, reason: &str) {
    let err = AutofillError::ElementApply {
        index,
        tag: tag.to_string(),
        reason: reason.to_string(),
    };
    warn!("{err}");
    println!("⚠️  {err}");
}

fn browser_error(e: anyhow::Error) -> AutofillError {
    AutofillError::Browser(format!("{e:#}"))
}
