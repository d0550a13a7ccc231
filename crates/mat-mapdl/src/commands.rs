//! Line tokenizer for MAPDL command scripts.
//!
//! Only the comma-separated command syntax emitted for material data is
//! understood: `KEYWORD,f1,f2,... ! comment`, parameter assignments
//! `name = 'value' ! comment` and full-line `!` comments.

use std::fs;
use std::path::Path;

use crate::error::{MapdlError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    pub lines: Vec<ScriptLine>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptLine {
    Command(Command),
    Declaration(Declaration),
    Comment { text: String, line: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub keyword: String,
    pub fields: Vec<String>,
    pub comment: Option<String>,
    pub line: usize,
}

/// `name = 'value'` parameter assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub value: String,
    pub comment: Option<String>,
    pub line: usize,
}

impl Script {
    pub fn parse_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::parse_str(&raw)
    }

    pub fn parse_str(raw: &str) -> Result<Self> {
        let mut lines = Vec::new();

        for (index, raw_line) in raw.lines().enumerate() {
            let line = index + 1;
            let trimmed = raw_line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if let Some(text) = trimmed.strip_prefix('!') {
                lines.push(ScriptLine::Comment {
                    text: text.trim().to_string(),
                    line,
                });
                continue;
            }

            let (body, comment) = match trimmed.split_once('!') {
                Some((body, comment)) => (body.trim(), Some(comment.trim().to_string())),
                None => (trimmed, None),
            };

            if let Some(declaration) = parse_declaration(body, comment.clone(), line) {
                lines.push(ScriptLine::Declaration(declaration));
                continue;
            }

            let mut parts = body.split(',');
            let keyword = parts.next().unwrap_or_default().trim();
            if keyword.is_empty() {
                return Err(MapdlError::Parse {
                    line,
                    message: "empty command keyword".to_string(),
                });
            }
            lines.push(ScriptLine::Command(Command {
                keyword: keyword.to_ascii_uppercase(),
                fields: parts.map(|p| p.trim().to_string()).collect(),
                comment,
                line,
            }));
        }

        Ok(Script { lines })
    }

    pub fn commands(&self) -> impl Iterator<Item = &Command> {
        self.lines.iter().filter_map(|l| match l {
            ScriptLine::Command(c) => Some(c),
            _ => None,
        })
    }
}

fn parse_declaration(body: &str, comment: Option<String>, line: usize) -> Option<Declaration> {
    let (name, value) = body.split_once('=')?;
    if name.contains(',') {
        return None;
    }
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some(Declaration {
        name: name.to_string(),
        value: value.trim().trim_matches('\'').to_string(),
        comment,
        line,
    })
}

impl Command {
    /// Field `index` (0-based, after the keyword), `None` when blank.
    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields
            .get(index)
            .map(|f| f.as_str())
            .filter(|f| !f.is_empty())
    }

    pub fn number(&self, index: usize) -> Result<Option<f64>> {
        self.field(index)
            .map(|raw| {
                raw.parse::<f64>()
                    .map_err(|_| self.error(format!("invalid number '{raw}' in field {}", index + 1)))
            })
            .transpose()
    }

    pub fn require_number(&self, index: usize, what: &str) -> Result<f64> {
        self.number(index)?
            .ok_or_else(|| self.error(format!("missing {what}")))
    }

    /// Integer field, also accepting integral reals such as `2.0`.
    pub fn integer(&self, index: usize) -> Result<Option<u32>> {
        let Some(raw) = self.field(index) else {
            return Ok(None);
        };
        if let Ok(value) = raw.parse::<u32>() {
            return Ok(Some(value));
        }
        match raw.parse::<f64>() {
            Ok(value) if value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as f64 => {
                Ok(Some(value as u32))
            }
            _ => Err(self.error(format!("invalid integer '{raw}' in field {}", index + 1))),
        }
    }

    pub fn require_integer(&self, index: usize, what: &str) -> Result<u32> {
        self.integer(index)?
            .ok_or_else(|| self.error(format!("missing {what}")))
    }

    /// Numbers from field `start` on. Trailing blanks are dropped; a blank
    /// between two values is an error.
    pub fn numbers_from(&self, start: usize) -> Result<Vec<f64>> {
        let last = self
            .fields
            .iter()
            .rposition(|f| !f.is_empty())
            .map_or(0, |i| i + 1);
        (start..last.max(start))
            .map(|i| {
                self.number(i)?
                    .ok_or_else(|| self.error(format!("blank value in field {}", i + 1)))
            })
            .collect()
    }

    pub(crate) fn error(&self, message: impl Into<String>) -> MapdlError {
        MapdlError::Parse {
            line: self.line,
            message: format!("{}: {}", self.keyword, message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_comments_and_declarations() {
        let src = r#"
! UserMat Constant 1: Modulus
Plastic Strain = 'UF01' !
MP,EX,2,1000000.0, , , ,  ! Pa
TB,ELASTIC,2,,,ISOT
"#;
        let script = Script::parse_str(src).expect("parser should succeed");
        assert_eq!(script.lines.len(), 4);
        assert!(matches!(
            &script.lines[0],
            ScriptLine::Comment { text, line: 2 } if text == "UserMat Constant 1: Modulus"
        ));
        let ScriptLine::Declaration(decl) = &script.lines[1] else {
            panic!("expected declaration");
        };
        assert_eq!(decl.name, "Plastic Strain");
        assert_eq!(decl.value, "UF01");

        let mp = script.commands().next().expect("MP command");
        assert_eq!(mp.keyword, "MP");
        assert_eq!(mp.field(0), Some("EX"));
        assert_eq!(mp.integer(1).unwrap(), Some(2));
        assert_eq!(mp.number(2).unwrap(), Some(1.0e6));
        assert_eq!(mp.field(3), None);
        assert_eq!(mp.comment.as_deref(), Some("Pa"));
    }

    #[test]
    fn numbers_drop_trailing_blanks() {
        let script = Script::parse_str("TBDATA,19,1.0,2.0,3.0,,,\n").unwrap();
        let cmd = script.commands().next().unwrap();
        assert_eq!(cmd.integer(0).unwrap(), Some(19));
        assert_eq!(cmd.numbers_from(1).unwrap(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn interior_blank_is_an_error() {
        let script = Script::parse_str("TBDATA,1,1.0,,3.0\n").unwrap();
        let cmd = script.commands().next().unwrap();
        let err = cmd.numbers_from(1).unwrap_err();
        assert!(matches!(err, MapdlError::Parse { line: 1, .. }));
    }

    #[test]
    fn fails_on_missing_keyword() {
        let err = Script::parse_str("MP,EX,1,2.0\n,1,2\n").expect_err("should fail");
        assert!(matches!(err, MapdlError::Parse { line: 2, .. }));
    }
}
