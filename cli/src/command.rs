use std::str::FromStr;

use anyhow::{anyhow, bail};
use livelocals_core::{LiveLocals, Val};

pub const HELP: &str = "\
Commands:
  get NAME                 print the value of NAME
  set NAME VALUE           assign VALUE to NAME
  del NAME                 unassign NAME
  has NAME                 is NAME assigned?
  declared NAME            does the frame declare NAME?
  keys | values | items    list assigned variables in declared order
  len                      number of assigned variables
  clear                    unassign every variable
  setdefault NAME VALUE    value of NAME, assigning VALUE first if unassigned
  getor NAME VALUE         value of NAME, or VALUE if unavailable
  help                     show this message
VALUE is JSON (42, 1.5, true, null, \"s\", [1,2], {\"k\":1}); bare words are strings.";

/// One mapping command, parsed from a line like `set x 42`.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Get(String),
    Set(String, Val),
    Del(String),
    Has(String),
    Declared(String),
    Keys,
    Values,
    Items,
    Len,
    Clear,
    SetDefault(String, Val),
    GetOr(String, Val),
    Help,
}

/// JSON literal, falling back to the raw text as a string.
pub fn parse_value(raw: &str) -> Val {
    let raw = raw.trim();
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(json) => Val::from(json),
        Err(_) => Val::from(raw),
    }
}

/// Values print as JSON so strings and numbers stay distinguishable.
pub fn format_value(value: &Val) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| value.to_string())
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> anyhow::Result<Self> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let name = || -> anyhow::Result<String> {
            match rest.split_whitespace().collect::<Vec<_>>().as_slice() {
                [name] => Ok((*name).to_string()),
                [] => Err(anyhow!("`{}` needs a variable name", word)),
                _ => Err(anyhow!("`{}` takes exactly one variable name", word)),
            }
        };
        let name_value = || -> anyhow::Result<(String, Val)> {
            match rest.split_once(char::is_whitespace) {
                Some((name, value)) if !value.trim().is_empty() => Ok((name.to_string(), parse_value(value))),
                _ => Err(anyhow!("`{}` needs a variable name and a value", word)),
            }
        };
        let bare = |cmd: Command| -> anyhow::Result<Command> {
            if rest.is_empty() {
                Ok(cmd)
            } else {
                Err(anyhow!("`{}` takes no arguments", word))
            }
        };

        match word {
            "get" => Ok(Self::Get(name()?)),
            "set" => name_value().map(|(n, v)| Self::Set(n, v)),
            "del" => Ok(Self::Del(name()?)),
            "has" => Ok(Self::Has(name()?)),
            "declared" => Ok(Self::Declared(name()?)),
            "keys" => bare(Self::Keys),
            "values" => bare(Self::Values),
            "items" => bare(Self::Items),
            "len" => bare(Self::Len),
            "clear" => bare(Self::Clear),
            "setdefault" => name_value().map(|(n, v)| Self::SetDefault(n, v)),
            "getor" => name_value().map(|(n, v)| Self::GetOr(n, v)),
            "help" => bare(Self::Help),
            "" => bail!("empty command"),
            other => bail!("unknown command `{}` (try `help`)", other),
        }
    }
}

impl Command {
    /// Runs the command against `ll`. Returns the lines to print.
    pub fn execute(&self, ll: &LiveLocals) -> anyhow::Result<Vec<String>> {
        let out = match self {
            Self::Get(name) => vec![format_value(&ll.get(name)?)],
            Self::Set(name, value) => {
                ll.set(name, value.clone())?;
                Vec::new()
            }
            Self::Del(name) => {
                ll.delete(name)?;
                Vec::new()
            }
            Self::Has(name) => vec![ll.contains(name).to_string()],
            Self::Declared(name) => vec![ll.is_declared(name).to_string()],
            Self::Keys => ll.keys().map(|name| name.to_string()).collect(),
            Self::Values => ll.values().map(|value| format_value(&value)).collect(),
            Self::Items => ll
                .items()
                .map(|(name, value)| format!("{} = {}", name, format_value(&value)))
                .collect(),
            Self::Len => vec![ll.len().to_string()],
            Self::Clear => {
                ll.clear_all()?;
                Vec::new()
            }
            Self::SetDefault(name, value) => vec![format_value(&ll.setdefault(name, value.clone())?)],
            Self::GetOr(name, value) => vec![format_value(&ll.get_or(name, value.clone())?)],
            Self::Help => HELP.lines().map(str::to_string).collect(),
        };
        Ok(out)
    }
}
