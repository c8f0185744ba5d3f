//! PDF output through pandoc and xelatex.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

use crate::config::expand_home;

/// Turn a title into a safe file name ending in `.pdf`.
///
/// Runs of anything other than ASCII letters, digits, `_`, `.` and `-`
/// collapse to a single `_`.
pub fn sanitize_file_name(title: &str) -> String {
    let mut safe = String::with_capacity(title.len());
    let mut pending_sep = false;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
            if pending_sep && !safe.is_empty() {
                safe.push('_');
            }
            pending_sep = false;
            safe.push(c);
        } else {
            pending_sep = true;
        }
    }
    let mut safe = safe.trim_matches('_').to_string();
    if safe.is_empty() {
        safe.push_str("program");
    }
    if !safe.to_ascii_lowercase().ends_with(".pdf") {
        safe.push_str(".pdf");
    }
    safe
}

/// `<output_dir>/<sanitized title>.pdf`, with `~` expanded.
pub fn default_pdf_path(output_dir: &str, title: &str) -> PathBuf {
    expand_home(output_dir).join(sanitize_file_name(title))
}

/// pandoc arguments for a titled page with a `Generated <date>` footer on
/// the left and the page number on the right, and no header rule.
///
/// The title goes in as metadata so pandoc escapes it for LaTeX.
fn pandoc_args(title: &str, footer_date: &str) -> Vec<String> {
    let footer = format!(
        r"\fancyfoot[L]{{Generated {footer_date}}}\fancyfoot[R]{{Page \thepage}}"
    );
    let variables = [
        r"header-includes=\usepackage{titling}".to_string(),
        r"header-includes=\setlength{\droptitle}{-7em}".to_string(),
        "fontsize=12pt".to_string(),
        "geometry:margin=1in".to_string(),
        r"header-includes=\usepackage{fancyhdr}".to_string(),
        r"header-includes=\pagestyle{fancy}".to_string(),
        r"header-includes=\fancyhf{}".to_string(),
        r"header-includes=\renewcommand{\headrulewidth}{0pt}".to_string(),
        format!("header-includes={footer}"),
        // Title pages use the plain style.
        format!(
            r"header-includes=\fancypagestyle{{plain}}{{\fancyhf{{}}\renewcommand{{\headrulewidth}}{{0pt}}{footer}}}"
        ),
    ];

    let mut args = vec![
        "--from".to_string(),
        "markdown+raw_tex".to_string(),
        "--pdf-engine=xelatex".to_string(),
        "--metadata".to_string(),
        format!("title={title}"),
    ];
    for variable in variables {
        args.push("-V".to_string());
        args.push(variable);
    }
    args
}

/// Pipe Markdown into `pandoc --pdf-engine=xelatex` and write `path`.
///
/// `markdown` should not repeat the title; pandoc sets it from `title`.
pub fn write_pdf(markdown: &str, path: &Path, title: &str, footer_date: &str) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create directory {}", dir.display()))?;
    }

    debug!(path = %path.display(), "running pandoc");
    let mut child = Command::new("pandoc")
        .args(pandoc_args(title, footer_date))
        .arg("-o")
        .arg(path)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .context("failed to run pandoc; install pandoc and a xelatex engine to write PDFs")?;

    child
        .stdin
        .take()
        .context("pandoc stdin was not captured")?
        .write_all(markdown.as_bytes())
        .context("failed to send markdown to pandoc")?;

    let output = child
        .wait_with_output()
        .context("failed to wait for pandoc")?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("pandoc failed: {}", stderr.trim());
    }

    info!(path = %path.display(), "wrote PDF");
    Ok(())
}
