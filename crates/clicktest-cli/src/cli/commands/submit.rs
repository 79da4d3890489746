use super::super::args::{GlobalArgs, SubmitArgs};
use crate::exit_codes::EXIT_SUCCESS;
use anyhow::Context;
use clicktest_core::TrialSubmission;
use std::io::Read;

pub(crate) fn run(global: &GlobalArgs, args: SubmitArgs) -> anyhow::Result<i32> {
    let cfg = super::load_config(global)?;
    let arena = super::open_arena(&cfg)?;

    let payload = build_payload(&args)?;
    let receipt = arena.submit_payload(args.user_id, payload)?;
    super::print_json(&receipt)?;
    Ok(EXIT_SUCCESS)
}

/// The payload file (if any) is the base; flags override single fields.
fn build_payload(args: &SubmitArgs) -> anyhow::Result<TrialSubmission> {
    let mut payload = match &args.file {
        Some(path) => {
            let raw = if path.as_os_str() == "-" {
                let mut s = String::new();
                std::io::stdin()
                    .read_to_string(&mut s)
                    .context("failed to read payload from stdin")?;
                s
            } else {
                std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read payload {}", path.display()))?
            };
            TrialSubmission::from_json(&raw)?
        }
        None => TrialSubmission::default(),
    };

    if let Some(v) = args.duration_ms {
        payload.duration_ms = Some(v);
    }
    if let Some(v) = args.clicks {
        payload.total_clicks = Some(v);
    }
    if let Some(v) = &args.cps {
        payload.cps = Some(serde_json::Value::String(v.clone()));
    }
    if let Some(v) = args.started_at {
        payload.started_at = Some(v);
    }
    if let Some(v) = args.ended_at {
        payload.ended_at = Some(v);
    }
    if let Some(v) = &args.device_type {
        payload.device_type = Some(v.clone());
    }
    if let Some(v) = &args.browser {
        payload.browser = Some(v.clone());
    }
    if let Some(v) = &args.user_agent {
        payload.user_agent = Some(v.clone());
    }
    Ok(payload)
}
