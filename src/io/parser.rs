// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! OpenSCAD .csg parser using pest

use crate::error::{Result, XcsgError};
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "io/csg.pest"]
struct CsgParser;

/// Literal argument value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Boolean(bool),
    String(String),
    Undef,
    Vector(Vec<Value>),
}

impl Value {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Flat list of numbers, `None` unless every element is a number
    pub fn as_numbers(&self) -> Option<Vec<f64>> {
        match self {
            Value::Vector(items) => items.iter().map(Value::as_number).collect(),
            _ => None,
        }
    }

    /// List of number lists, e.g. point arrays and matrices
    pub fn as_rows(&self) -> Option<Vec<Vec<f64>>> {
        match self {
            Value::Vector(items) => items.iter().map(Value::as_numbers).collect(),
            _ => None,
        }
    }
}

/// Call arguments, named and positional
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    named: Vec<(String, Value)>,
    positional: Vec<Value>,
}

impl Args {
    /// Named argument, falling back to the positional one at `position`
    pub fn get(&self, name: &str, position: usize) -> Option<&Value> {
        self.named
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
            .or_else(|| self.positional.get(position))
            .filter(|v| **v != Value::Undef)
    }

    pub fn named(&self, name: &str) -> Option<&Value> {
        self.named
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
            .filter(|v| **v != Value::Undef)
    }
}

/// A module call with its child statements
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub name: String,
    pub args: Args,
    pub children: Vec<Call>,
}

/// Parse .csg source into its top-level calls
pub fn parse_csg(source: &str) -> Result<Vec<Call>> {
    let mut pairs = CsgParser::parse(Rule::program, source).map_err(|e| XcsgError::CsgSyntax(e.to_string()))?;

    let mut calls = Vec::new();
    if let Some(program) = pairs.next() {
        for pair in program.into_inner() {
            if pair.as_rule() == Rule::statement {
                if let Some(call) = parse_statement(pair)? {
                    calls.push(call);
                }
            }
        }
    }
    Ok(calls)
}

fn parse_statement(pair: Pair<Rule>) -> Result<Option<Call>> {
    let mut inner = pair.into_inner();
    let Some(call) = inner.next() else {
        // empty statement
        return Ok(None);
    };

    let mut parts = call.into_inner();
    let name = parts
        .next()
        .ok_or_else(|| XcsgError::CsgSyntax("call without a name".into()))?
        .as_str()
        .to_string();
    let args = match parts.next() {
        Some(list) => parse_args(list)?,
        None => Args::default(),
    };

    let mut children = Vec::new();
    if let Some(block) = inner.next() {
        for statement in block.into_inner() {
            if let Some(child) = parse_statement(statement)? {
                children.push(child);
            }
        }
    }

    Ok(Some(Call { name, args, children }))
}

fn parse_args(pair: Pair<Rule>) -> Result<Args> {
    let mut args = Args::default();
    for arg in pair.into_inner() {
        let mut parts = arg.into_inner();
        let first = parts
            .next()
            .ok_or_else(|| XcsgError::CsgSyntax("empty argument".into()))?;
        match first.as_rule() {
            Rule::ident => {
                let value = parts
                    .next()
                    .ok_or_else(|| XcsgError::CsgSyntax(format!("argument '{}' has no value", first.as_str())))?;
                args.named.push((first.as_str().to_string(), parse_value(value)?));
            }
            _ => args.positional.push(parse_value(first)?),
        }
    }
    Ok(args)
}

fn parse_value(pair: Pair<Rule>) -> Result<Value> {
    let inner = pair
        .into_inner()
        .next()
        .ok_or_else(|| XcsgError::CsgSyntax("empty value".into()))?;

    match inner.as_rule() {
        Rule::number => inner
            .as_str()
            .parse::<f64>()
            .map(Value::Number)
            .map_err(|e| XcsgError::CsgSyntax(format!("bad number '{}': {}", inner.as_str(), e))),
        Rule::boolean => Ok(Value::Boolean(inner.as_str() == "true")),
        Rule::undef => Ok(Value::Undef),
        Rule::string => Ok(Value::String(
            inner.into_inner().next().map(|t| t.as_str().to_string()).unwrap_or_default(),
        )),
        Rule::vector => inner.into_inner().map(parse_value).collect::<Result<Vec<_>>>().map(Value::Vector),
        rule => Err(XcsgError::CsgSyntax(format!("unexpected {:?}", rule))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_calls() {
        let calls = parse_csg(
            "group() {\n  difference() {\n    cube(size = [1, 2, 3], center = false);\n    sphere($fn = 0, $fa = 12, $fs = 2, r = 1.5);\n  }\n}\n",
        )
        .unwrap();
        assert_eq!(calls.len(), 1);
        let difference = &calls[0].children[0];
        assert_eq!(difference.name, "difference");
        let names: Vec<&str> = difference.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["cube", "sphere"]);

        let cube = &difference.children[0];
        assert_eq!(cube.args.get("size", 0).and_then(Value::as_numbers), Some(vec![1.0, 2.0, 3.0]));
        assert_eq!(cube.args.get("center", 1).and_then(Value::as_bool), Some(false));
        assert_eq!(difference.children[1].args.named("r").and_then(Value::as_number), Some(1.5));
    }

    #[test]
    fn test_values() {
        let calls = parse_csg(r#"text(text = "a\"b", size = 1e-2, spacing = -.5, dir = undef, v = []);"#).unwrap();
        let args = &calls[0].args;
        assert_eq!(args.named("text"), Some(&Value::String(r#"a\"b"#.to_string())));
        assert_eq!(args.named("size").and_then(Value::as_number), Some(0.01));
        assert_eq!(args.named("spacing").and_then(Value::as_number), Some(-0.5));
        assert_eq!(args.named("dir"), None);
        assert_eq!(args.named("v"), Some(&Value::Vector(vec![])));
    }

    #[test]
    fn test_positional_and_comments() {
        let calls = parse_csg("// header\ncube(2); /* block */ ;").unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].args.get("size", 0).and_then(Value::as_number), Some(2.0));
    }

    #[test]
    fn test_syntax_error() {
        assert!(matches!(parse_csg("cube(size = ;"), Err(XcsgError::CsgSyntax(_))));
    }
}
