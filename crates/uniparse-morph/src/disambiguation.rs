// Constraint Grammar bridge: CG stream translation and the external
// disambiguator process.
//
// Analyses are written in the vislcg3 stream format, one cohort per token,
// with `<ana_N>` marking the position of each reading. Returned cohorts are
// matched to tokens by order and readings by their `<ana_N>` index.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::sync::LazyLock;
use std::thread;
use std::time::{Duration, Instant};

use regex::Regex;
use uniparse_core::token::{TokenTree, Tree};
use uniparse_core::wordform::{Wordform, escape_xml};

/// Cohort marking the end of a token group.
pub const SENT_BOUNDARY: &str = "\"<SENT_BOUNDARY>\"";

/// Default command of the CG processor.
pub const DEFAULT_CG_COMMAND: &str = "cg3";

static COHORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)"<[^<>]*>"\n(?:\t[^\n]*\n)*"#).unwrap());
static READING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<ana_([0-9]+)> *([^\r\n]*)").unwrap());
static PUNCT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[^\w]+$").unwrap());

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Failures of the external disambiguator. Never returned by
/// [`CgDisambiguator::disambiguate`], which falls back instead.
#[derive(Debug, thiserror::Error)]
pub enum DisambiguationError {
    #[error("cannot start {command:?}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("i/o with the CG process failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("CG process did not finish within {0:?}")]
    Timeout(Duration),
    #[error("CG process exited with {0}")]
    Failed(ExitStatus),
    #[error("CG output is not UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

// ============================================================================
// Stream translation
// ============================================================================

fn escape_cg(text: &str) -> String {
    escape_xml(text).replace('\n', "\\n")
}

fn unescape_cg(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}

/// One cohort with a reading per analysis.
fn cohort(analyses: &[Wordform]) -> String {
    let Some(first) = analyses.first() else {
        return String::new();
    };
    let wf = escape_cg(&first.wf);
    if analyses.len() == 1 && !first.is_analyzed() {
        if PUNCT.is_match(&first.wf) {
            return format!("\"<{wf}>\"\n\t\"{wf}\" punct\n");
        }
        return format!("\"<{wf}>\"\n");
    }
    let mut out = format!("\"<{wf}>\"\n");
    for (i, ana) in analyses.iter().enumerate() {
        let tags: Vec<String> = ana.tags().map(|t| escape_xml(t.trim())).collect();
        out.push_str(&format!("\t\"{}\" <ana_{i}>", escape_cg(&ana.lemma)));
        if !tags.is_empty() {
            out.push(' ');
            out.push_str(&tags.join(" "));
        }
        out.push('\n');
    }
    out
}

fn write_group(items: &[TokenTree], out: &mut String) {
    for item in items {
        match item {
            Tree::Leaf(analyses) => out.push_str(&cohort(analyses)),
            Tree::Group(inner) if inner.is_empty() => {}
            Tree::Group(inner) => {
                write_group(inner, out);
                out.push_str(SENT_BOUNDARY);
                out.push('\n');
            }
        }
    }
}

/// Translate analyses into a CG stream. Every nested group is followed by a
/// sentence boundary cohort; tokens without analyses are left out.
pub fn to_cg_stream(tree: &TokenTree) -> String {
    let mut out = String::new();
    match tree {
        Tree::Leaf(analyses) => out.push_str(&cohort(analyses)),
        Tree::Group(items) => write_group(items, &mut out),
    }
    out
}

/// Restrict one token's analyses to the readings kept in `block`.
///
/// Kept readings get the tags they share with the returned reading plus the
/// ones the disambiguator added. A token left without readings becomes a
/// placeholder.
fn apply_cohort(analyses: &mut Vec<Wordform>, block: &str) {
    if analyses.is_empty() || block.contains("\" punct") {
        return;
    }
    let wf = analyses[0].wf.clone();
    let mut kept: Vec<(usize, Vec<String>)> = Vec::new();
    for cap in READING.captures_iter(block) {
        let Ok(index) = cap[1].parse::<usize>() else {
            continue;
        };
        let tags = cap[2]
            .split(' ')
            .filter(|t| !t.is_empty())
            .map(unescape_cg)
            .collect();
        kept.push((index, tags));
    }

    let old = std::mem::take(analyses);
    for (i, mut ana) in old.into_iter().enumerate() {
        let Some((_, returned)) = kept.iter().find(|(index, _)| *index == i) else {
            continue;
        };
        let mut tags: Vec<String> = ana
            .tags()
            .map(str::trim)
            .filter(|t| returned.iter().any(|r| r == t))
            .map(str::to_string)
            .collect();
        for tag in returned {
            if !tags.contains(tag) {
                tags.push(tag.clone());
            }
        }
        ana.gramm = tags.join(",");
        analyses.push(ana);
    }
    if analyses.is_empty() {
        analyses.push(Wordform::placeholder(&wf));
    }
}

/// Apply a disambiguated stream to the analyses it was made from.
pub fn apply_cg_stream(tree: &mut TokenTree, stream: &str) {
    let normalized = stream.replace('\r', "\n").replace("\n\n", "\n");
    let mut blocks = COHORT
        .find_iter(&normalized)
        .map(|m| m.as_str())
        .filter(|b| !b.starts_with(SENT_BOUNDARY));
    for analyses in tree.leaves_mut() {
        if analyses.is_empty() {
            continue;
        }
        let Some(block) = blocks.next() else {
            log::warn!("CG output has fewer cohorts than the input");
            break;
        };
        apply_cohort(analyses, block);
    }
}

// ============================================================================
// External process
// ============================================================================

/// Runs a CG grammar over analyses with an external `cg3` process.
#[derive(Debug, Clone)]
pub struct CgDisambiguator {
    command: String,
    grammar_file: PathBuf,
    timeout: Duration,
}

impl CgDisambiguator {
    pub fn new(grammar_file: impl Into<PathBuf>) -> Self {
        Self {
            command: DEFAULT_CG_COMMAND.to_string(),
            grammar_file: grammar_file.into(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn grammar_file(&self) -> &Path {
        &self.grammar_file
    }

    /// Feed `input` to the CG process and return its output.
    pub fn run(&self, input: &str) -> Result<String, DisambiguationError> {
        let mut child = Command::new(&self.command)
            .arg("-g")
            .arg(&self.grammar_file)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| DisambiguationError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        let mut stdin = child.stdin.take();
        let mut stdout = child.stdout.take();
        let input = input.as_bytes().to_vec();
        let writer = thread::spawn(move || -> std::io::Result<()> {
            if let Some(pipe) = stdin.as_mut() {
                pipe.write_all(&input)?;
            }
            Ok(())
        });
        let reader = thread::spawn(move || -> std::io::Result<Vec<u8>> {
            let mut buf = Vec::new();
            if let Some(pipe) = stdout.as_mut() {
                pipe.read_to_end(&mut buf)?;
            }
            Ok(buf)
        });

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if Instant::now() >= deadline {
                // Killing closes the pipes, which ends both helper threads.
                let _ = child.kill();
                let _ = child.wait();
                return Err(DisambiguationError::Timeout(self.timeout));
            }
            thread::sleep(POLL_INTERVAL);
        };

        // A process that exits without reading all input breaks the pipe.
        let _ = writer.join();
        let output = match reader.join() {
            Ok(result) => result?,
            Err(_) => return Err(DisambiguationError::Io(std::io::Error::other("reader thread panicked"))),
        };
        if !status.success() {
            return Err(DisambiguationError::Failed(status));
        }
        Ok(String::from_utf8(output)?)
    }

    /// Disambiguate `tree` in place. Returns `false` and leaves the analyses
    /// untouched when the CG process fails.
    pub fn disambiguate(&self, tree: &mut TokenTree) -> bool {
        let input = to_cg_stream(tree);
        if input.is_empty() {
            return true;
        }
        match self.run(&input) {
            Ok(output) => {
                apply_cg_stream(tree, &output);
                true
            }
            Err(e) => {
                log::warn!("CG disambiguation skipped: {e}");
                false
            }
        }
    }
}
