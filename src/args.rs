use std::sync::OnceLock;

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char},
    combinator::{all_consuming, map, opt, recognize, rest},
    multi::many0_count,
    sequence::{pair, preceded, tuple},
    IResult,
};
use regex::Regex;

use crate::error::FlagError;
use crate::flag::SettableEnum;

#[derive(Debug, Clone, PartialEq)]
enum Token<'a> {
    /// `--` on its own
    Terminator,
    Flag {
        name: &'a str,
        value: Option<&'a str>,
    },
    Positional,
}

fn parse_flag_name(i: &str) -> IResult<&str, &str> {
    recognize(pair(
        alpha1,
        many0_count(alt((alphanumeric1, tag("_"), tag("-")))),
    ))(i)
}

/// Parses `-name`, `--name`, `-name=value` or `--name=value`.
fn parse_flag(i: &str) -> IResult<&str, Token<'_>> {
    map(
        all_consuming(tuple((
            alt((tag("--"), tag("-"))),
            parse_flag_name,
            opt(preceded(char('='), rest)),
        ))),
        |(_, name, value)| Token::Flag { name, value },
    )(i)
}

fn tokenize(arg: &str) -> Result<Token<'_>, FlagError> {
    if arg == "--" {
        return Ok(Token::Terminator);
    }
    if arg.len() < 2 || !arg.starts_with('-') {
        return Ok(Token::Positional);
    }
    match parse_flag(arg) {
        Ok((_, token)) => Ok(token),
        Err(_) => {
            // A name no flag could be registered under is still only unknown,
            // unless it starts with `-` or `=`.
            let body = arg.strip_prefix("--").unwrap_or(&arg[1..]);
            let name = body.split('=').next().unwrap_or_default();
            if name.is_empty() || name.starts_with('-') {
                Err(FlagError::BadSyntax(arg.to_string()))
            } else {
                Err(FlagError::Unknown(name.to_string()))
            }
        }
    }
}

fn name_pattern() -> &'static Regex {
    static NAME: OnceLock<Regex> = OnceLock::new();
    NAME.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*$").expect("flag name pattern"))
}

struct Registered<'a> {
    name: String,
    usage: String,
    flag: &'a mut dyn SettableEnum,
}

/// Registry of named settable values, fed with raw argument strings.
///
/// Flags are borrowed for the lifetime of the set; once the set is dropped
/// the caller reads the values back from its own flags.
pub struct FlagSet<'a> {
    program: String,
    flags: Vec<Registered<'a>>,
}

impl<'a> FlagSet<'a> {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            flags: Vec::new(),
        }
    }

    /// Registers `flag` under `name`.
    pub fn var(
        &mut self,
        name: &str,
        usage: &str,
        flag: &'a mut dyn SettableEnum,
    ) -> Result<(), FlagError> {
        if !name_pattern().is_match(name) {
            return Err(FlagError::InvalidName(name.to_string()));
        }
        if self.flags.iter().any(|r| r.name == name) {
            return Err(FlagError::Duplicate(name.to_string()));
        }
        self.flags.push(Registered {
            name: name.to_string(),
            usage: usage.to_string(),
            flag,
        });
        Ok(())
    }

    /// Registers `flag` under its own name and usage text.
    pub fn register(&mut self, flag: &'a mut dyn SettableEnum) -> Result<(), FlagError> {
        let name = flag.name().to_string();
        let usage = flag.usage().to_string();
        self.var(&name, &usage, flag)
    }

    pub fn lookup(&self, name: &str) -> Option<&dyn SettableEnum> {
        self.flags
            .iter()
            .find(|r| r.name == name)
            .map(|r| &*r.flag as &dyn SettableEnum)
    }

    /// Applies every leading flag argument and returns what is left.
    ///
    /// Parsing stops at `--` (which is dropped) or at the first argument
    /// that is not a flag.
    pub fn parse<I, S>(&mut self, args: I) -> Result<Vec<String>, FlagError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        let mut i = 0;
        while i < args.len() {
            match tokenize(&args[i])? {
                Token::Terminator => {
                    i += 1;
                    break;
                }
                Token::Positional => break,
                Token::Flag { name, value } => {
                    let registered = self
                        .flags
                        .iter_mut()
                        .find(|r| r.name == name)
                        .ok_or_else(|| FlagError::Unknown(name.to_string()))?;
                    let value = match value {
                        Some(v) => v,
                        None => {
                            i += 1;
                            args.get(i)
                                .map(String::as_str)
                                .ok_or_else(|| FlagError::MissingValue(name.to_string()))?
                        }
                    };
                    registered.flag.set(value)?;
                }
            }
            i += 1;
        }
        Ok(args[i.min(args.len())..].to_vec())
    }

    /// Help text listing every registered flag in registration order.
    pub fn usage(&self) -> String {
        let mut out = format!("Usage of {}:\n", self.program);
        for r in &self.flags {
            out.push_str(&format!("  -{} value\n    \t{}\n", r.name, r.usage));
        }
        out
    }
}
