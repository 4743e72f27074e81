//! Lessonforge - terminal wizard for AI-generated lesson plans.
//!
//! Uploads a course outline, configures a plan from the extracted data,
//! and renders or downloads the generated result.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lessonforge::workflow::FormField;
use lessonforge::{render, tui, Config, HttpPlanService, Session, Workflow};

/// Terminal wizard for AI-generated lesson plans
#[derive(Parser)]
#[command(name = "lessonforge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Bearer credential for the lesson-plan service
    #[arg(long, global = true, env = "LESSONFORGE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Base URL of the lesson-plan service (overrides config)
    #[arg(long, global = true, env = "LESSONFORGE_URL")]
    url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive wizard (default)
    Wizard,

    /// Fetch and print the standard dropdown options
    Options {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Upload a course outline and print the extracted data
    Extract {
        /// Path to the course-outline PDF
        file: PathBuf,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Run the whole pipeline non-interactively
    Generate {
        /// Path to the course-outline PDF
        file: PathBuf,

        /// Subject name (must match one extracted from the outline)
        #[arg(long)]
        subject: String,

        /// Lecture topic (must match one extracted from the outline)
        #[arg(long)]
        lecture: String,

        /// Focus topic (required when the lecture topic has focus topics)
        #[arg(long, default_value = "")]
        focus: String,

        /// Bloom's taxonomy level
        #[arg(long)]
        blooms: String,

        /// AQF level
        #[arg(long)]
        aqf: String,

        /// Lesson duration
        #[arg(long)]
        duration: String,

        /// Also download the rendered PDF artifact into this directory
        #[arg(long)]
        download_to: Option<PathBuf>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose { EnvFilter::new("debug") } else { EnvFilter::new("warn") };
    tracing_subscriber::registry().with(fmt::layer().with_target(false)).with(filter).init();

    match cli.command {
        None | Some(Commands::Wizard) => cmd_wizard(&cli),
        Some(Commands::Options { ref format }) => cmd_options(&cli, format),
        Some(Commands::Extract { ref file, ref format }) => cmd_extract(&cli, file, format),
        Some(Commands::Generate {
            ref file,
            ref subject,
            ref lecture,
            ref focus,
            ref blooms,
            ref aqf,
            ref duration,
            ref download_to,
        }) => cmd_generate(
            &cli,
            file,
            &GenerateArgs {
                subject: subject.clone(),
                lecture: lecture.clone(),
                focus: focus.clone(),
                blooms: blooms.clone(),
                aqf: aqf.clone(),
                duration: duration.clone(),
            },
            download_to.as_deref(),
        ),
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
    }
}

struct GenerateArgs {
    subject: String,
    lecture: String,
    focus: String,
    blooms: String,
    aqf: String,
    duration: String,
}

/// Build config, session, and HTTP service from CLI/env/config file.
fn build_service(cli: &Cli) -> Result<(Config, Arc<Session>, Arc<HttpPlanService>)> {
    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(url) = &cli.url {
        config.service.base_url = url.clone();
    }

    let token = cli.token.clone().unwrap_or_default();
    let session = Arc::new(Session::new(token.clone()));
    let service = Arc::new(HttpPlanService::new(config.service.base_url.clone(), token));
    Ok((config, session, service))
}

fn cmd_wizard(cli: &Cli) -> Result<()> {
    let (config, session, service) = build_service(cli)?;

    // Worker threads service the spawned requests while the main thread
    // runs the terminal event loop.
    let rt = tokio::runtime::Runtime::new()?;
    let app = tui::WizardApp::new(config, session, service, rt.handle().clone());
    tui::run_tui(app)
}

fn cmd_options(cli: &Cli, format: &str) -> Result<()> {
    let (_, session, service) = build_service(cli)?;
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        let mut workflow = Workflow::new(session);
        workflow.run_catalog(service.as_ref()).await;
        if let Some(error) = workflow.error() {
            bail!("{error}");
        }

        let catalog = workflow.catalog();
        if format == "json" {
            println!("{}", serde_json::to_string_pretty(catalog)?);
        } else {
            print_option_list("Bloom's taxonomy levels", &catalog.blooms_taxonomy);
            print_option_list("AQF levels", &catalog.aqf_levels);
            print_option_list("Lesson durations", &catalog.lesson_durations);
        }
        Ok(())
    })
}

fn print_option_list(title: &str, options: &[String]) {
    println!("{title}:");
    for option in options {
        println!("  - {option}");
    }
    println!();
}

fn cmd_extract(cli: &Cli, file: &std::path::Path, format: &str) -> Result<()> {
    let (_, session, service) = build_service(cli)?;
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        let mut workflow = Workflow::new(session);
        workflow.run_ingest(service.as_ref(), file).await;
        check_workflow(&workflow)?;

        let extraction = workflow
            .extraction()
            .context("Extraction did not complete")?;

        if format == "json" {
            println!("{}", serde_json::to_string_pretty(extraction)?);
        } else {
            println!("{}", extraction.summary());
            print_option_list("Subjects", &extraction.subject_names);
            print_option_list("Lecture topics", &extraction.lecture_topics);
            for (lecture, focuses) in &extraction.lecture_focus_mapping {
                print_option_list(&format!("Focus topics for {lecture}"), focuses);
            }
        }
        Ok(())
    })
}

fn cmd_generate(
    cli: &Cli,
    file: &std::path::Path,
    args: &GenerateArgs,
    download_to: Option<&std::path::Path>,
) -> Result<()> {
    let (_, session, service) = build_service(cli)?;
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        let mut workflow = Workflow::new(session);
        workflow.run_catalog(service.as_ref()).await;
        check_workflow(&workflow)?;

        workflow.run_ingest(service.as_ref(), file).await;
        check_workflow(&workflow)?;

        let form = workflow.form_mut();
        form.set(FormField::SubjectName, args.subject.clone());
        form.set(FormField::LectureTopic, args.lecture.clone());
        form.set(FormField::FocusTopic, args.focus.clone());
        form.set(FormField::BloomsTaxonomy, args.blooms.clone());
        form.set(FormField::AqfLevel, args.aqf.clone());
        form.set(FormField::LessonDuration, args.duration.clone());

        workflow.run_generation(service.as_ref()).await;
        check_workflow(&workflow)?;

        let plan = workflow.plan().context("Generation did not complete")?;
        print_plan(&plan.content);

        if let Some(dir) = download_to {
            workflow.run_download(service.as_ref(), dir).await;
            check_workflow(&workflow)?;
            if let Some(notice) = workflow.notice() {
                println!("\n{notice}");
            }
        }
        Ok(())
    })
}

/// Fail the command on session loss or a surfaced workflow error.
fn check_workflow(workflow: &Workflow) -> Result<()> {
    if workflow.is_exited() {
        bail!("Session is no longer valid. Please sign in again.");
    }
    if let Some(error) = workflow.error() {
        bail!("{error}");
    }
    Ok(())
}

/// Print segmented plan content to stdout.
fn print_plan(content: &str) {
    for block in render::segment(content) {
        match block {
            render::Block::Heading { text, lines } => {
                println!("{text}");
                for line in lines {
                    println!("    {line}");
                }
            }
            render::Block::Body { lines } => {
                for line in lines {
                    match line {
                        render::Line::Bullet(item) => println!("  - {item}"),
                        render::Line::Paragraph(text) => println!("{text}"),
                    }
                }
            }
        }
        println!();
    }
}
