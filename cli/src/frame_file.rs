use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, bail};
use livelocals_core::{CodeMeta, Frame, Val, VarCell, livelocals_uncached};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// On-disk description of a frame: its declared variables and the values
/// bound when the frame is built.
///
/// Free variables listed in `values` get a fresh cell holding that value;
/// the others get an empty cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrameSpec {
    pub name: String,
    pub locals: Vec<String>,
    pub cellvars: Vec<String>,
    pub freevars: Vec<String>,
    pub values: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFormat {
    Json,
    Toml,
    Yaml,
}

impl FrameFormat {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        match ext.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "toml" => Ok(Self::Toml),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => bail!(
                "Unsupported frame file '{}': expected a .json, .toml, .yaml or .yml extension",
                path.display()
            ),
        }
    }
}

impl FrameSpec {
    pub fn parse(src: &str, format: FrameFormat) -> anyhow::Result<Self> {
        let parsed = match format {
            FrameFormat::Json => serde_json::from_str(src)?,
            FrameFormat::Toml => toml::from_str(src)?,
            FrameFormat::Yaml => serde_yaml::from_str(src)?,
        };
        Ok(parsed)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let format = FrameFormat::from_path(path)?;
        let src = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read frame file '{}'", path.display()))?;
        Self::parse(&src, format).with_context(|| format!("Invalid frame file '{}'", path.display()))
    }

    /// Builds a live frame: code metadata, free cells, then the initial bindings.
    pub fn build(&self) -> anyhow::Result<Arc<Frame>> {
        let name = if self.name.is_empty() { "<frame>" } else { self.name.as_str() };
        let code = CodeMeta::new(name, &as_strs(&self.locals), &as_strs(&self.cellvars), &as_strs(&self.freevars))?;

        let free = self
            .freevars
            .iter()
            .map(|var| match self.values.get(var) {
                Some(value) => VarCell::with_value(Val::from(value.clone())),
                None => VarCell::new(),
            })
            .collect();
        let frame = Frame::with_free_cells(code, free)?;

        let ll = livelocals_uncached(Some(&frame))?;
        for (var, value) in &self.values {
            if self.freevars.contains(var) {
                continue;
            }
            ll.set(var, Val::from(value.clone()))
                .with_context(|| format!("Cannot bind initial value of '{}'", var))?;
        }
        debug!(frame = %frame.id(), code = name, bound = self.values.len(), "frame file loaded");
        Ok(frame)
    }
}

fn as_strs(names: &[String]) -> Vec<&str> {
    names.iter().map(String::as_str).collect()
}
