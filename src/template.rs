//! Command templates with embedded parameter references, e.g.
//! `cp %(src)s %(dst)s`, and expanding them into runnable command lines.
//!
//! The syntax is printf-like: `%(name)s` refers to a parameter and `%%` is a
//! literal percent sign.  Any other use of `%` is rejected when parsing, so a
//! typo in a template surfaces before anything runs.

use crate::error::{BuildError, Result};
use crate::params::Params;
use crate::process::Cmdline;

/// One token within a Template, either literal text or a parameter reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Literal(String),
    Placeholder(String),
}

/// A parsed but unexpanded template string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template(Vec<Part>);

fn bad_template(text: &str, ofs: usize, why: &str) -> BuildError {
    BuildError::Config(format!("bad command template {:?} at offset {}: {}", text, ofs, why))
}

impl Template {
    pub fn parse(text: &str) -> Result<Self> {
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut rest = text;
        while let Some(pct) = rest.find('%') {
            literal.push_str(&rest[..pct]);
            let ofs = text.len() - rest.len() + pct;
            let after = &rest[pct + 1..];
            if let Some(tail) = after.strip_prefix('%') {
                literal.push('%');
                rest = tail;
                continue;
            }
            let inner = after
                .strip_prefix('(')
                .ok_or_else(|| bad_template(text, ofs, "expected '%(' or '%%'"))?;
            let close = inner
                .find(')')
                .ok_or_else(|| bad_template(text, ofs, "unterminated '%('"))?;
            let name = &inner[..close];
            if name.is_empty() {
                return Err(bad_template(text, ofs, "empty parameter name"));
            }
            rest = inner[close + 1..]
                .strip_prefix('s')
                .ok_or_else(|| bad_template(text, ofs, "expected 's' after ')'"))?;
            if !literal.is_empty() {
                parts.push(Part::Literal(std::mem::take(&mut literal)));
            }
            parts.push(Part::Placeholder(name.to_string()));
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            parts.push(Part::Literal(literal));
        }
        Ok(Template(parts))
    }

    pub fn parts(&self) -> &[Part] {
        &self.0
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter_map(|part| match part {
            Part::Placeholder(name) => Some(name.as_str()),
            Part::Literal(_) => None,
        })
    }

    /// If the whole template is a single reference, its name.
    fn lone_placeholder(&self) -> Option<&str> {
        match self.0.as_slice() {
            [Part::Placeholder(name)] => Some(name.as_str()),
            _ => None,
        }
    }

    pub fn expand(&self, params: &Params) -> Result<String> {
        let mut result = String::new();
        for part in &self.0 {
            match part {
                Part::Literal(s) => result.push_str(s),
                Part::Placeholder(name) => result.push_str(&lookup(params, name)?.render()),
            }
        }
        Ok(result)
    }
}

fn lookup<'a>(params: &'a Params, name: &str) -> Result<&'a crate::params::Value> {
    params
        .get(name)
        .ok_or_else(|| BuildError::Config(format!("command refers to unknown parameter {:?}", name)))
}

/// A command line to run as the action of a build, as either a single
/// shell string or an argument vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandTemplate {
    /// Run through `/bin/sh -c`.
    Shell(Template),
    /// Run directly, one template per argument.  An argument that is exactly
    /// one reference to a list expands to one argument per entry.
    Argv(Vec<Template>),
}

impl CommandTemplate {
    pub fn shell(text: &str) -> Result<Self> {
        Ok(CommandTemplate::Shell(Template::parse(text)?))
    }

    pub fn argv<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args = args
            .into_iter()
            .map(|arg| Template::parse(arg.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        if args.is_empty() {
            return Err(BuildError::Config("empty command".into()));
        }
        Ok(CommandTemplate::Argv(args))
    }

    pub fn placeholders(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        match self {
            CommandTemplate::Shell(t) => Box::new(t.placeholders()),
            CommandTemplate::Argv(ts) => Box::new(ts.iter().flat_map(|t| t.placeholders())),
        }
    }

    /// Verify every reference names one of `names`.
    pub fn check<'a>(&self, names: impl Iterator<Item = &'a str>) -> Result<()> {
        let names: Vec<&str> = names.collect();
        for name in self.placeholders() {
            if !names.contains(&name) {
                return Err(BuildError::Config(format!(
                    "command refers to unknown parameter {:?}",
                    name
                )));
            }
        }
        Ok(())
    }

    pub fn expand(&self, params: &Params) -> Result<Cmdline> {
        Ok(match self {
            CommandTemplate::Shell(t) => Cmdline::Shell(t.expand(params)?),
            CommandTemplate::Argv(ts) => {
                let mut args = Vec::new();
                for t in ts {
                    match t.lone_placeholder() {
                        Some(name) => args.extend(lookup(params, name)?.render_args()),
                        None => args.push(t.expand(params)?),
                    }
                }
                Cmdline::Argv(args)
            }
        })
    }
}
