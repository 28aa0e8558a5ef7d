//! Locating the world drawing and measuring its canvas.
//!
//! Dimensions come from a chain of [`DimensionProbe`]s tried in order: the
//! static `width`/`height`/`viewBox` attributes of the SVG root, then an
//! external renderer (`inkscape --query-width/--query-height`).

use anyhow::{anyhow, bail, Context};
use once_cell::sync::Lazy;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};

use crate::error::{ImportError, Result};

static LEADING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?\d+(?:\.\d+)?").expect("valid regex"));

/// Canvas size in whole pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Drawing file names tried for a world, most preferred first
pub fn drawing_candidates(world: &str) -> [String; 3] {
    [
        format!("{world}_states.svg"),
        format!("{world}_map.svg"),
        format!("{world}.svg"),
    ]
}

/// Find the drawing for a world next to (or one level above) its export files
pub fn find_drawing(world: &str, files: &[PathBuf]) -> Result<PathBuf> {
    let dirs = candidate_dirs(files);

    for name in drawing_candidates(world) {
        for dir in &dirs {
            let path = dir.join(&name);
            if path.is_file() {
                debug!(drawing = %path.display(), "found drawing");
                return Ok(path);
            }
        }
    }

    Err(ImportError::MissingDrawing {
        world: world.to_string(),
        searched: dirs,
    })
}

/// Directories of the files in order, then their parents, without duplicates
fn candidate_dirs(files: &[PathBuf]) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();
    let own: Vec<PathBuf> = files
        .iter()
        .filter_map(|f| f.parent())
        .map(absolute_dir)
        .collect();
    let parents: Vec<PathBuf> = own
        .iter()
        .filter_map(|d| d.parent())
        .map(Path::to_path_buf)
        .collect();

    for dir in own.into_iter().chain(parents) {
        if !dirs.contains(&dir) {
            dirs.push(dir);
        }
    }
    dirs
}

fn absolute_dir(dir: &Path) -> PathBuf {
    let dir = if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    };
    fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf())
}

/// A way of measuring a drawing's canvas in pixels.
///
/// `Ok(None)` means the probe found nothing usable; `Err` means it failed.
/// Either way the next probe in the chain is tried.
pub trait DimensionProbe {
    fn name(&self) -> &'static str;
    fn probe(&self, drawing: &Path) -> anyhow::Result<Option<(f64, f64)>>;
}

/// Reads `width`/`height` from the SVG root, falling back to its `viewBox`
#[derive(Debug, Default)]
pub struct SvgAttributes;

impl DimensionProbe for SvgAttributes {
    fn name(&self) -> &'static str {
        "svg attributes"
    }

    fn probe(&self, drawing: &Path) -> anyhow::Result<Option<(f64, f64)>> {
        let text = fs::read_to_string(drawing)
            .with_context(|| format!("Failed to read {:?}", drawing))?;
        svg_dimensions(&text)
    }
}

/// Asks inkscape to render the drawing and report its size
#[derive(Debug, Default)]
pub struct InkscapeQuery;

impl InkscapeQuery {
    fn query(program: &Path, flag: &str, drawing: &Path) -> anyhow::Result<Option<f64>> {
        let output = Command::new(program)
            .arg(flag)
            .arg(drawing)
            .output()
            .with_context(|| format!("Failed to run {:?}", program))?;

        if !output.status.success() {
            bail!(
                "inkscape {} exited with {}: {}",
                flag,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(parse_numeric(&String::from_utf8_lossy(&output.stdout)))
    }
}

impl DimensionProbe for InkscapeQuery {
    fn name(&self) -> &'static str {
        "inkscape"
    }

    fn probe(&self, drawing: &Path) -> anyhow::Result<Option<(f64, f64)>> {
        let program =
            which::which("inkscape").map_err(|e| anyhow!("inkscape is not available: {}", e))?;
        let width = Self::query(&program, "--query-width", drawing)?;
        let height = Self::query(&program, "--query-height", drawing)?;
        Ok(width.zip(height))
    }
}

/// Ordered fallback chain of dimension probes
pub struct DimensionResolver {
    probes: Vec<Box<dyn DimensionProbe>>,
}

impl DimensionResolver {
    pub fn new(probes: Vec<Box<dyn DimensionProbe>>) -> Self {
        Self { probes }
    }

    pub fn resolve(&self, drawing: &Path) -> Result<Dimensions> {
        let mut failures = Vec::new();

        for probe in &self.probes {
            match probe.probe(drawing) {
                Ok(Some((width, height))) => match to_pixels(width, height) {
                    Some(dims) => {
                        debug!(probe = probe.name(), ?dims, "resolved drawing dimensions");
                        return Ok(dims);
                    }
                    None => {
                        warn!(probe = probe.name(), width, height, "probe returned an unusable size");
                        failures.push(format!("{}: unusable size {}x{}", probe.name(), width, height));
                    }
                },
                Ok(None) => {
                    warn!(probe = probe.name(), drawing = %drawing.display(), "probe found no dimensions");
                    failures.push(format!("{}: no dimensions declared", probe.name()));
                }
                Err(e) => {
                    warn!(probe = probe.name(), drawing = %drawing.display(), "probe failed: {:#}", e);
                    failures.push(format!("{}: {:#}", probe.name(), e));
                }
            }
        }

        Err(ImportError::UnresolvableDimensions {
            drawing: drawing.to_path_buf(),
            reason: failures.join("; "),
        })
    }
}

impl Default for DimensionResolver {
    fn default() -> Self {
        Self::new(vec![Box::new(SvgAttributes), Box::new(InkscapeQuery)])
    }
}

fn to_pixels(width: f64, height: f64) -> Option<Dimensions> {
    let width = width.round();
    let height = height.round();
    let valid = |v: f64| v.is_finite() && v >= 1.0 && v <= u32::MAX as f64;
    (valid(width) && valid(height)).then(|| Dimensions {
        width: width as u32,
        height: height as u32,
    })
}

/// Leading numeric value of an attribute, ignoring unit suffixes (`"1000px"`)
pub fn parse_numeric(value: &str) -> Option<f64> {
    LEADING_NUMBER
        .find(value.trim())
        .and_then(|m| m.as_str().parse().ok())
}

/// Width and height declared on the root `<svg>` element
fn svg_dimensions(text: &str) -> anyhow::Result<Option<(f64, f64)>> {
    let mut reader = Reader::from_str(text);
    let (mut width, mut height, mut view_box) = (None, None, None);

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => {
                if e.local_name().as_ref() != b"svg" {
                    bail!("root element is not <svg>");
                }
                for attr in e.attributes() {
                    let attr = attr?;
                    let value = attr.unescape_value()?.into_owned();
                    match attr.key.local_name().as_ref() {
                        b"width" => width = parse_numeric(&value),
                        b"height" => height = parse_numeric(&value),
                        b"viewBox" => view_box = Some(value),
                        _ => {}
                    }
                }
                break;
            }
            Event::Eof => bail!("no <svg> element found"),
            _ => {}
        }
    }

    if width.is_none() || height.is_none() {
        if let Some(view_box) = view_box {
            let parts: Vec<&str> = view_box
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|p| !p.is_empty())
                .collect();
            if parts.len() == 4 {
                width = parse_numeric(parts[2]);
                height = parse_numeric(parts[3]);
            }
        }
    }

    Ok(width.zip(height))
}
