//! examdoc CLI - exam template generator
//!
//! Writes the DOCX exam template and inspects generated templates.

use clap::{Parser, Subcommand};
use colored::*;
use examdoc::{Document, LineSpacing, TemplateOptions};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Exam template generation as DOCX
#[derive(Parser)]
#[command(
    name = "examdoc",
    version,
    about = "Generate the DOCX exam template",
    long_about = "examdoc - Generates a DOCX exam template with 1.5 cm margins, 1.5 line spacing\n\
                  and placeholder fields ({Matiere}, {Classe}, ...) for a templating tool."
)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the exam template (default)
    #[command(visible_alias = "gen")]
    Generate {
        /// Output file path
        #[arg(short, long, default_value = examdoc::DEFAULT_OUTPUT_PATH)]
        output: PathBuf,
    },

    /// Show the layout and placeholders of a template
    Info {
        /// Input file path
        input: PathBuf,

        /// Print the document model as JSON instead
        #[arg(long)]
        json: bool,

        /// Output compact JSON (no indentation)
        #[arg(long, requires = "json")]
        compact: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let command = cli.command.unwrap_or(Commands::Generate {
        output: PathBuf::from(examdoc::DEFAULT_OUTPUT_PATH),
    });

    match command {
        Commands::Generate { output } => {
            let options = TemplateOptions::new().with_output(output);
            tracing::debug!(output = %options.output.display(), "generating template");

            let pb = create_spinner("Generating template...");
            let result = examdoc::create_exam_template(&options);
            pb.finish_and_clear();
            let path = result?;

            let mut lines = status_lines(&path, &options).into_iter();
            if let Some(first) = lines.next() {
                println!("{} {}", "✓".green().bold(), first);
            }
            for line in lines {
                println!("{line}");
            }
        }

        Commands::Info {
            input,
            json,
            compact,
        } => {
            let pb = create_spinner("Reading template...");
            let result = examdoc::read_file(&input);
            pb.finish_and_clear();
            let doc = result?;

            if json {
                println!("{}", render_json(&doc, compact)?);
            } else {
                print_info(&input, &doc);
            }
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

fn print_info(input: &Path, doc: &Document) {
    println!("{}", "Template Information".cyan().bold());
    println!("{}", "─".repeat(40));
    println!(
        "{}: {}",
        "File".bold(),
        input.file_name().unwrap_or_default().to_string_lossy()
    );
    if let Some(ref title) = doc.metadata.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref application) = doc.metadata.application {
        println!("{}: {}", "Application".bold(), application);
    }
    println!("{}: {}", "Sections".bold(), doc.sections.len());

    for section in &doc.sections {
        let m = &section.layout.margins;
        println!(
            "{}: top {:.2} cm, bottom {:.2} cm, left {:.2} cm, right {:.2} cm",
            format!("Margins [{}]", section.index).bold(),
            m.top.as_cm(),
            m.bottom.as_cm(),
            m.left.as_cm(),
            m.right.as_cm()
        );
    }

    let paragraphs = doc.all_paragraphs();
    let mut rules: Vec<Option<LineSpacing>> = Vec::new();
    for para in &paragraphs {
        if !rules.contains(&para.line_spacing) {
            rules.push(para.line_spacing);
        }
    }
    let rules: Vec<String> = rules
        .iter()
        .map(|r| r.as_ref().map(describe_spacing).unwrap_or_else(|| "inherited".to_string()))
        .collect();
    println!(
        "{}: {} ({} paragraphs)",
        "Line spacing".bold(),
        rules.join(", "),
        paragraphs.len()
    );

    println!("\n{}", "Tables".cyan().bold());
    println!("{}", "─".repeat(40));
    for (i, table) in doc.tables().iter().enumerate() {
        println!(
            "{}: {} × {} ({})",
            format!("Table {}", i + 1).bold(),
            table.row_count(),
            table.column_count(),
            table.style_id.as_deref().unwrap_or("no style")
        );
    }

    println!("\n{}", "Placeholders".cyan().bold());
    println!("{}", "─".repeat(40));
    let counts = doc.placeholder_counts();
    for token in examdoc::PLACEHOLDERS {
        let count = counts.get(token).copied().unwrap_or(0);
        let mark = if count == 1 {
            "✓".green().bold()
        } else {
            "!".yellow().bold()
        };
        println!("{} {}: {}", mark, token.bold(), count);
    }
    for (token, count) in counts
        .iter()
        .filter(|(t, _)| !examdoc::PLACEHOLDERS.contains(&t.as_str()))
    {
        println!("{} {}: {}", "?".yellow().bold(), token.bold(), count);
    }
}

/// Confirmation printed after a successful generation.
fn status_lines(path: &Path, options: &TemplateOptions) -> Vec<String> {
    vec![
        format!("Template créé avec succès : {}", path.display()),
        format!("Marges : {} cm (tous côtés)", options.margin.as_cm()),
        format!("Interligne : {}", describe_spacing(&options.line_spacing)),
        "Formatage : Professionnel".to_string(),
    ]
}

fn render_json(doc: &Document, compact: bool) -> Result<String, serde_json::Error> {
    if compact {
        doc.to_json_compact()
    } else {
        doc.to_json()
    }
}

fn describe_spacing(spacing: &LineSpacing) -> String {
    match spacing {
        LineSpacing::Single => "1".to_string(),
        LineSpacing::OnePointFive => "1.5".to_string(),
        LineSpacing::Double => "2".to_string(),
        LineSpacing::Multiple(factor) => format!("{factor}"),
        LineSpacing::Exactly(h) => format!("exactly {} pt", h.as_pt()),
        LineSpacing::AtLeast(h) => format!("at least {} pt", h.as_pt()),
    }
}

fn print_version() {
    println!("{} {}", "examdoc".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("DOCX exam template generator");
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_generate_default_output() {
        let cli = Cli::try_parse_from(["examdoc", "generate"]).unwrap();
        match cli.command {
            Some(Commands::Generate { output }) => {
                assert_eq!(output, PathBuf::from(examdoc::DEFAULT_OUTPUT_PATH))
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn test_no_subcommand() {
        let cli = Cli::try_parse_from(["examdoc", "--verbose"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.verbose);
    }

    #[test]
    fn test_info_json_flags() {
        let cli = Cli::try_parse_from(["examdoc", "info", "t.docx", "--json", "--compact"]).unwrap();
        match cli.command {
            Some(Commands::Info { json, compact, .. }) => assert!(json && compact),
            _ => panic!("expected info"),
        }

        // --compact only makes sense with --json
        assert!(Cli::try_parse_from(["examdoc", "info", "t.docx", "--compact"]).is_err());
    }

    #[test]
    fn test_render_json_of_template() {
        let doc = examdoc::build_exam_template(&TemplateOptions::default());

        let pretty = render_json(&doc, false).unwrap();
        assert!(pretty.contains("\"title\": \"Template Examen\""));
        assert!(pretty.contains("{Exercices}"));

        let compact = render_json(&doc, true).unwrap();
        assert!(!compact.contains('\n'));
        assert!(compact.contains("\"style_id\":\"TableGrid\""));
    }

    #[test]
    fn test_status_lines() {
        let options = TemplateOptions::default();
        let lines = status_lines(Path::new("out.docx"), &options);
        assert_eq!(
            lines,
            vec![
                "Template créé avec succès : out.docx",
                "Marges : 1.5 cm (tous côtés)",
                "Interligne : 1.5",
                "Formatage : Professionnel",
            ]
        );
    }

    #[test]
    fn test_describe_spacing() {
        assert_eq!(describe_spacing(&LineSpacing::OnePointFive), "1.5");
        assert_eq!(describe_spacing(&LineSpacing::Double), "2");
    }
}
