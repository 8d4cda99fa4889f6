use anyhow::{Context, bail};
use attend_core::model::{AdvisorSettings, Session, Subject, SubjectDraft, SubjectPatch};
use attend_core::report::pluralize_classes;
use attend_core::{AttendanceInput, ProjectionReport};
use serde_json::json;
use services::AppServices;
use tracing::warn;

use crate::cli::SubjectsCommand;

const SIGN_IN_HINT: &str = "not signed in; run `attend login <email>` first";

/// Sample subjects added by `attend seed`: name, attended, total, target.
const SAMPLE_SUBJECTS: [(&str, u32, u32, u8); 4] = [
    ("Quantum Physics", 18, 20, 90),
    ("Organic Chemistry", 22, 25, 85),
    ("Advanced Calculus", 12, 15, 80),
    ("World History", 30, 35, 90),
];

pub fn calc(attended: u32, total: u32, target: f64) -> anyhow::Result<()> {
    let input = AttendanceInput::new(attended, total, target)
        .map_err(|err| anyhow::anyhow!("{}: {err}", err.field()))?;
    let report = ProjectionReport::new(input.project(), input.target());
    println!("{}", report.headline());
    println!("{}", report.detail());
    Ok(())
}

pub async fn login(services: &AppServices, email: &str, password: Option<&str>) -> anyhow::Result<()> {
    let session = services.auth().login(email, password).await?;
    if let Some(user) = session.user() {
        println!("Signed in as {}.", user.email());
    }
    Ok(())
}

pub async fn logout(services: &AppServices) -> anyhow::Result<()> {
    services.auth().logout().await?;
    println!("Signed out.");
    Ok(())
}

pub fn whoami(session: &Session) {
    match session.user() {
        Some(user) => println!("{}", user.email()),
        None => println!("guest"),
    }
}

pub async fn subjects(
    services: &AppServices,
    session: &Session,
    command: SubjectsCommand,
) -> anyhow::Result<()> {
    let subjects = services.subjects();
    match command {
        SubjectsCommand::List => {
            let list = subjects.list(session).await?;
            if list.is_empty() {
                println!("No subjects yet. Add one with `attend subjects add --name <name>`.");
            }
            for subject in &list {
                println!("{}", subject_line(subject));
            }
        }
        SubjectsCommand::Add { name, target } => {
            let subject = subjects
                .add(session, SubjectDraft::new(name, target))
                .await?
                .context(SIGN_IN_HINT)?;
            println!("Added {}", subject_line(&subject));
        }
        SubjectsCommand::Present { id } => {
            let subject = subjects.mark_present(session, id).await?.context(SIGN_IN_HINT)?;
            println!("{}", subject_line(&subject));
        }
        SubjectsCommand::Absent { id } => {
            let subject = subjects.mark_absent(session, id).await?.context(SIGN_IN_HINT)?;
            println!("{}", subject_line(&subject));
        }
        SubjectsCommand::Update {
            id,
            name,
            attended,
            total,
            target,
        } => {
            let patch = SubjectPatch {
                name,
                attended,
                total,
                target,
            };
            if patch.is_empty() {
                bail!("nothing to update; pass --name, --attended, --total or --target");
            }
            let subject = subjects
                .update(session, id, patch)
                .await?
                .context(SIGN_IN_HINT)?;
            println!("Updated {}", subject_line(&subject));
        }
        SubjectsCommand::Delete { id } => {
            if !subjects.delete(session, id).await? {
                bail!(SIGN_IN_HINT);
            }
            println!("Deleted {id}.");
        }
    }
    Ok(())
}

pub async fn dashboard(services: &AppServices, session: &Session, as_json: bool) -> anyhow::Result<()> {
    let subjects = services.subjects();
    let summary = subjects.dashboard(session).await?;
    let list = subjects.list(session).await?;

    if as_json {
        let entries: Vec<_> = list
            .iter()
            .map(|subject| json!({ "subject": subject, "projection": subject.projection() }))
            .collect();
        let body = json!({ "summary": summary, "subjects": entries });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    if !session.is_authenticated() {
        println!("Sign in to see your dashboard.");
        return Ok(());
    }

    println!(
        "Total subjects: {}   Overall attendance: {}%",
        summary.subject_count, summary.overall_attendance
    );
    for subject in &list {
        println!();
        println!("{}", subject_line(subject));
        let report = ProjectionReport::new(subject.projection(), f64::from(subject.target()));
        println!("  {}", report.detail());
    }
    Ok(())
}

pub async fn tips(
    services: &AppServices,
    session: &Session,
    settings: &AdvisorSettings,
) -> anyhow::Result<()> {
    if !settings.is_enabled() {
        warn!("tip backend is not configured; set ATTEND_AI_API_KEY");
    }

    let tips = services.tips().generate_for(session).await?;
    if tips.is_empty() {
        println!("No tips right now. Every subject is on track.");
    }
    for tip in tips {
        println!("{}: {}", tip.subject, tip.tip);
    }
    Ok(())
}

pub async fn seed(services: &AppServices, session: Session, email: Option<&str>) -> anyhow::Result<()> {
    let session = match email {
        Some(email) => services.auth().login(email, None).await?,
        None => session,
    };
    if !session.is_authenticated() {
        bail!("{SIGN_IN_HINT}, or pass --email");
    }

    let subjects = services.subjects();
    for (name, attended, total, target) in SAMPLE_SUBJECTS {
        let subject = subjects
            .add(&session, SubjectDraft::new(name, target))
            .await?
            .context(SIGN_IN_HINT)?;
        let patch = SubjectPatch {
            attended: Some(attended),
            total: Some(total),
            ..SubjectPatch::default()
        };
        subjects.update(&session, subject.id(), patch).await?;
    }
    println!("Added {} sample subjects.", SAMPLE_SUBJECTS.len());
    Ok(())
}

fn subject_line(subject: &Subject) -> String {
    let flag = if subject.is_below_target() { "  below target" } else { "" };
    format!(
        "{id}  {name}  {attended}/{total} {noun}  {pct}% (target {target}%){flag}",
        id = subject.id(),
        name = subject.name(),
        attended = subject.attended(),
        total = subject.total(),
        noun = pluralize_classes(u64::from(subject.total())),
        pct = subject.attendance_percentage(),
        target = subject.target(),
    )
}
