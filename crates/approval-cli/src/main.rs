//! Approval route command line tool
//!
//! Builds the approval route for one requester against the HR backend (or
//! an offline fixture file), then prints the payload or submits the draft.
//! Reviewer decisions on submitted documents are relayed with `--approve`,
//! `--reject` and `--comment-on`.

mod fixtures;

use anyhow::{bail, Context};
use approval_core::clients::{
    DirectoryProvider, HrApiClient, RecordingGateway, ReviewGateway, RouteTemplateStore,
    SubmissionGateway,
};
use approval_core::{
    to_submission_payload, ApprovalConfig, BuilderMode, DocumentDraft, DraftId, MemberId,
    ReviewerAction, RouteBuilder, RoutingConfig, StageMode, StepChange, StepType,
    SubmissionService,
};
use clap::{Arg, ArgAction, ArgMatches, Command};
use fixtures::Fixtures;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;

/// Backend boundaries the run talks to
struct Collaborators {
    directory: Arc<dyn DirectoryProvider>,
    templates: Arc<dyn RouteTemplateStore>,
    submissions: Arc<dyn SubmissionGateway>,
    reviews: Arc<dyn ReviewGateway>,
    offline: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with INFO as default if RUST_LOG not set
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = cli().get_matches();

    let (collaborators, mut routing) = connect(&matches)?;
    if let Some(mode) = matches.get_one::<String>("non-approval-mode") {
        routing.non_approval_mode = parse_stage_mode(mode)?;
    }

    if let Some((document_id, action)) = review_action(&matches)? {
        let service = SubmissionService::new(
            collaborators.submissions.clone(),
            collaborators.reviews.clone(),
            routing,
        );
        return relay_review(&service, &document_id, &action).await;
    }

    check_mode_args(&matches)?;

    let requester = MemberId::new(required(&matches, "requester")?.as_str());
    let mut builder = RouteBuilder::load(
        requester,
        collaborators.directory.as_ref(),
        collaborators.templates.as_ref(),
        routing.clone(),
    )
    .await;

    let mode = required(&matches, "mode")?;
    match mode.as_str() {
        "auto" => builder.enter_mode(BuilderMode::Auto),
        "manual" => {
            builder.enter_mode(BuilderMode::Manual);
            for candidate in matches.get_many::<String>("add").into_iter().flatten() {
                add_candidate(&mut builder, candidate)?;
            }
        }
        _ => {
            if let Some(template_id) = matches.get_one::<String>("template") {
                builder
                    .apply_template(template_id)
                    .with_context(|| format!("Cannot apply template {}", template_id))?;
            }
        }
    }

    for notice in builder.take_notices() {
        log::warn!("{}", notice);
    }

    if let Some(name) = matches.get_one::<String>("save-template") {
        let description = matches
            .get_one::<String>("template-description")
            .map(String::as_str);
        let saved = builder
            .save_as_template(name, description, collaborators.templates.as_ref())
            .await
            .context("Failed to save approval route template")?;
        log::info!("Saved template '{}' as {}", saved.name, saved.id);
    }

    let final_order = builder.final_order();
    let route = builder
        .finalize()
        .context("The approval route cannot be submitted")?;

    if !matches.get_flag("submit") {
        let preview = json!({
            "finalOrder": final_order,
            "customRoute": to_submission_payload(&route.steps, routing.non_approval_mode),
        });
        println!("{}", serde_json::to_string_pretty(&preview)?);
        return Ok(());
    }

    let draft_id = match matches.get_one::<String>("draft") {
        Some(id) => DraftId::new(id.as_str()),
        None if collaborators.offline => DraftId::new(uuid::Uuid::new_v4().to_string()),
        None => bail!("--draft is required to submit to the HR backend"),
    };
    let title = matches
        .get_one::<String>("title")
        .map(String::as_str)
        .unwrap_or("결재 문서");
    let mut draft = DocumentDraft::new(draft_id, title);

    let service = SubmissionService::new(
        collaborators.submissions.clone(),
        collaborators.reviews.clone(),
        routing,
    );
    let comment = matches.get_one::<String>("comment").map(String::as_str);
    let submitted = service
        .submit(&mut draft, &route, comment)
        .await
        .with_context(|| format!("Failed to submit draft {}", draft.id))?;

    println!("{}", serde_json::to_string_pretty(&submitted)?);
    Ok(())
}

fn cli() -> Command {
    Command::new("approval-cli")
        .version("1.0.0")
        .about("Build and submit approval routes")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("FILE")
                .help("Configuration file path")
                .required_unless_present("fixtures"),
        )
        .arg(
            Arg::new("fixtures")
                .long("fixtures")
                .value_name("FILE")
                .help("Run offline against users and templates from a JSON file"),
        )
        .arg(
            Arg::new("requester")
                .long("requester")
                .short('r')
                .value_name("ID")
                .help("Directory id of the document author")
                .required_unless_present_any(["approve", "reject", "comment-on"]),
        )
        .arg(
            Arg::new("mode")
                .long("mode")
                .value_name("MODE")
                .help("How the route is produced")
                .value_parser(["template", "auto", "manual"])
                .default_value("template"),
        )
        .arg(
            Arg::new("template")
                .long("template")
                .value_name("ID")
                .help("Template to apply in template mode"),
        )
        .arg(
            Arg::new("add")
                .long("add")
                .value_name("ID:TYPE")
                .help("Add a reviewer in manual mode, e.g. u2:APPROVAL or u2:결재")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("save-template")
                .long("save-template")
                .value_name("NAME")
                .help("Save the manual route as a personal template"),
        )
        .arg(
            Arg::new("template-description")
                .long("template-description")
                .value_name("TEXT")
                .help("Description stored with --save-template")
                .requires("save-template"),
        )
        .arg(
            Arg::new("draft")
                .long("draft")
                .value_name("ID")
                .help("Draft to submit"),
        )
        .arg(
            Arg::new("title")
                .long("title")
                .value_name("TEXT")
                .help("Draft title"),
        )
        .arg(
            Arg::new("comment")
                .long("comment")
                .value_name("TEXT")
                .help("Submission comment, or the reviewer comment for a review action"),
        )
        .arg(
            Arg::new("approve")
                .long("approve")
                .value_name("DOC")
                .help("Approve a submitted document")
                .conflicts_with_all(["reject", "comment-on", "submit"]),
        )
        .arg(
            Arg::new("reject")
                .long("reject")
                .value_name("DOC")
                .help("Reject a submitted document")
                .conflicts_with_all(["comment-on", "submit"]),
        )
        .arg(
            Arg::new("comment-on")
                .long("comment-on")
                .value_name("DOC")
                .help("Leave a comment on a submitted document")
                .requires("comment")
                .conflicts_with("submit"),
        )
        .arg(
            Arg::new("non-approval-mode")
                .long("non-approval-mode")
                .value_name("MODE")
                .help("Stage mode for non-approval steps")
                .value_parser(["parallel", "all"]),
        )
        .arg(
            Arg::new("submit")
                .long("submit")
                .help("Submit the draft instead of printing the payload")
                .action(ArgAction::SetTrue),
        )
}

fn connect(matches: &ArgMatches) -> anyhow::Result<(Collaborators, RoutingConfig)> {
    if let Some(path) = matches.get_one::<String>("fixtures") {
        let routing = match matches.get_one::<String>("config") {
            Some(config_path) => load_config(config_path)?.routing,
            None => RoutingConfig::default(),
        };

        let (directory, templates) = Fixtures::from_file(Path::new(path))?.into_collaborators();
        let gateway = Arc::new(RecordingGateway::new());
        log::info!("Running offline with fixtures from {}", path);

        let collaborators = Collaborators {
            directory: Arc::new(directory),
            templates: Arc::new(templates),
            submissions: gateway.clone(),
            reviews: gateway,
            offline: true,
        };
        return Ok((collaborators, routing));
    }

    let config_path = required(matches, "config")?;
    let config = load_config(config_path)?;
    let client = Arc::new(HrApiClient::new(config.hr_api.clone())?);
    log::info!("Using HR API at {}", config.hr_api.base_url);

    let collaborators = Collaborators {
        directory: client.clone(),
        templates: client.clone(),
        submissions: client.clone(),
        reviews: client,
        offline: false,
    };
    Ok((collaborators, config.routing))
}

fn load_config(path: &str) -> anyhow::Result<ApprovalConfig> {
    let config = ApprovalConfig::from_file(path)
        .with_context(|| format!("Failed to load configuration from {}", path))?;
    log::info!("Loaded configuration from {}", path);
    Ok(config)
}

/// Route-building flags only make sense in the mode that reads them
fn check_mode_args(matches: &ArgMatches) -> anyhow::Result<()> {
    let mode = required(matches, "mode")?.as_str();

    if matches.contains_id("template") && mode != "template" {
        bail!("--template only applies to --mode template, not {}", mode);
    }
    if matches.contains_id("add") && mode != "manual" {
        bail!("--add only applies to --mode manual, not {}", mode);
    }
    if matches.contains_id("save-template") && mode != "manual" {
        bail!("--save-template needs a manual route, not --mode {}", mode);
    }
    Ok(())
}

fn review_action(matches: &ArgMatches) -> anyhow::Result<Option<(String, ReviewerAction)>> {
    let comment = matches.get_one::<String>("comment").cloned();

    if let Some(document_id) = matches.get_one::<String>("approve") {
        return Ok(Some((document_id.clone(), ReviewerAction::Approve { comment })));
    }
    if let Some(document_id) = matches.get_one::<String>("reject") {
        return Ok(Some((document_id.clone(), ReviewerAction::Reject { comment })));
    }
    if let Some(document_id) = matches.get_one::<String>("comment-on") {
        let content = comment.context("--comment-on needs --comment")?;
        return Ok(Some((document_id.clone(), ReviewerAction::Comment { content })));
    }
    Ok(None)
}

async fn relay_review(
    service: &SubmissionService,
    document_id: &str,
    action: &ReviewerAction,
) -> anyhow::Result<()> {
    let verb = match action {
        ReviewerAction::Approve { .. } => "approve",
        ReviewerAction::Reject { .. } => "reject",
        ReviewerAction::Comment { .. } => "comment",
    };

    service
        .relay(document_id, action)
        .await
        .with_context(|| format!("Failed to {} document {}", verb, document_id))?;

    log::info!("Relayed {} on document {}", verb, document_id);
    Ok(())
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> anyhow::Result<&'a String> {
    matches
        .get_one::<String>(name)
        .with_context(|| format!("--{} is required", name))
}

fn add_candidate(builder: &mut RouteBuilder, candidate: &str) -> anyhow::Result<()> {
    let (member_id, step_type) = candidate
        .split_once(':')
        .with_context(|| format!("Expected ID:TYPE, got '{}'", candidate))?;
    let step_type = parse_step_type(step_type)?;

    let change = builder.add_candidate(&MemberId::new(member_id), step_type)?;
    if let StepChange::Added(step_id) = change {
        log::debug!("Added {} as {} ({})", member_id, step_type, step_id);
    }
    Ok(())
}

/// Accepts the wire name or the Korean label
fn parse_step_type(value: &str) -> anyhow::Result<StepType> {
    StepType::ALL
        .into_iter()
        .find(|t| t.to_string().eq_ignore_ascii_case(value) || t.label() == value)
        .with_context(|| format!("Unknown step type '{}'", value))
}

fn parse_stage_mode(value: &str) -> anyhow::Result<StageMode> {
    match value {
        "parallel" => Ok(StageMode::Parallel),
        "all" => Ok(StageMode::All),
        other => bail!("Unsupported stage mode '{}'", other),
    }
}
